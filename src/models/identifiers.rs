/// Correlates a request with its eventual response.
/// A `TransactionId` is a 64-bit unsigned integer, unique per client instance.
pub type TransactionId = u64;

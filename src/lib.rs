//! Browser-side half of a host bridge: a correlated RPC client over a one-way
//! transport, plus the in-process host it talks to in the demo binary.

pub mod consts;
pub mod errors;
pub mod models;
pub mod rpc;
pub mod services;
pub mod state;

use crate::errors::{HostError, HostResult};
use serde_json::{Map, Value};

/// Typed access to a request's `parameters` object.
#[derive(Debug, Clone)]
pub struct Params {
    inner: Map<String, Value>,
}

impl Params {
    pub fn new(inner: Map<String, Value>) -> Self {
        Self { inner }
    }

    fn get(&self, key: &str) -> HostResult<&Value> {
        self.inner
            .get(key)
            .ok_or_else(|| HostError::NoParam(key.to_string()))
    }

    pub fn str(&self, key: &str) -> HostResult<String> {
        self.get(key)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| HostError::BadParam(key.to_string()))
    }

    /// Fails with `BadParam` for non-integers and values outside `i32`.
    pub fn i32(&self, key: &str) -> HostResult<i32> {
        self.get(key)?
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .ok_or_else(|| HostError::BadParam(key.to_string()))
    }
}

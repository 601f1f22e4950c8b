use std::sync::Arc;

use bytes::Bytes;

pub type ObjectMap = ahash::AHashMap<Arc<str>, Value>;
pub type MapMap = ahash::AHashMap<MapKey, Value>;

/// Keys a decoded Thrift map can carry without losing information.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Bool(bool),
    I64(i64),
    String(Arc<str>),
    Bytes(Bytes),
}

/// A natively decoded value: the result of interpreting a wire value against its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I64(i64),
    F64(f64),
    String(Arc<str>),
    Bytes(Bytes),
    Array(Vec<Value>),
    Object(ObjectMap),
    Map(MapMap),
}

impl Value {
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(Arc::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_only_their_variant() {
        assert_eq!(Value::from(7).as_i64(), Some(7));
        assert_eq!(Value::from("x").as_i64(), None);
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert!(Value::Bool(true).as_object().is_none());
        assert!(Value::Object(ObjectMap::new()).as_object().is_some());
    }
}

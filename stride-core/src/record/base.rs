//! Base implementation of records for logging.
use crate::error::StrideError;
use std::{
    collections::{
        hash_map::{Iter, Keys},
        HashMap,
    },
    convert::Into,
};

/// Represents possible types of values that can be stored in a [`Record`].
#[derive(Debug, Clone)]
pub enum RecordValue {
    /// A single floating-point value, typically used for metrics.
    Scalar(f32),

    /// A 1-dimensional array of floating-point values.
    Array1(Vec<f32>),

    /// A 2-dimensional array with shape information.
    Array2(Vec<f32>, [usize; 2]),

    /// A text value, useful for storing labels or descriptions.
    String(String),
}

/// A container for storing key-value pairs of various data types.
#[derive(Debug)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Returns true if the record holds no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merges two records, consuming both.
    ///
    /// If both records contain the same key, the value from the second
    /// record will overwrite the value from the first record.
    pub fn merge(self, record: Record) -> Self {
        Record(self.0.into_iter().chain(record.0).collect())
    }

    /// Gets a scalar value from the record.
    ///
    /// Returns an error if the key does not exist or the value is not a
    /// scalar.
    pub fn get_scalar(&self, k: &str) -> Result<f32, StrideError> {
        if let Some(v) = self.0.get(k) {
            match v {
                RecordValue::Scalar(v) => Ok(*v),
                _ => Err(StrideError::RecordValueTypeError("Scalar".to_string())),
            }
        } else {
            Err(StrideError::RecordKeyError(k.to_string()))
        }
    }

    /// Gets a 1-dimensional array from the record.
    ///
    /// Returns an error if the key does not exist or the value is not a
    /// 1-dimensional array.
    pub fn get_array1(&self, k: &str) -> Result<Vec<f32>, StrideError> {
        if let Some(v) = self.0.get(k) {
            match v {
                RecordValue::Array1(v) => Ok(v.clone()),
                _ => Err(StrideError::RecordValueTypeError("Array1".to_string())),
            }
        } else {
            Err(StrideError::RecordKeyError(k.to_string()))
        }
    }

    /// Gets a string from the record.
    ///
    /// Returns an error if the key does not exist or the value is not a
    /// string.
    pub fn get_string(&self, k: &str) -> Result<String, StrideError> {
        if let Some(v) = self.0.get(k) {
            match v {
                RecordValue::String(v) => Ok(v.clone()),
                _ => Err(StrideError::RecordValueTypeError("String".to_string())),
            }
        } else {
            Err(StrideError::RecordKeyError(k.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut record = Record::empty();
        assert!(record.is_empty());

        record.insert("Reward", RecordValue::Scalar(-1.0));
        record.insert("Obs", RecordValue::Array1(vec![1.0, 2.0, 3.0]));

        assert_eq!(record.get_scalar("Reward").unwrap(), -1.0);
        assert_eq!(record.get_array1("Obs").unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_missing_key() {
        let record = Record::from_scalar("Reward", 0.5);
        assert!(record.get_scalar("reward").is_err());
    }

    #[test]
    fn test_type_mismatch() {
        let record = Record::from_scalar("Reward", 0.5);
        assert!(record.get_array1("Reward").is_err());
    }

    #[test]
    fn test_merge_overwrites() {
        let a = Record::from_scalar("x", 1.0);
        let b = Record::from_slice(&[
            ("x", RecordValue::Scalar(2.0)),
            ("y", RecordValue::String("label".to_string())),
        ]);

        let merged = a.merge(b);
        assert_eq!(merged.get_scalar("x").unwrap(), 2.0);
        assert_eq!(merged.get_string("y").unwrap(), "label");
    }
}

use std::collections::HashMap;

use crate::error::{PdfError, Result};

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ParamValue {
    Integer(i64),
    Bool(bool),
    Name(String),
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Integer(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Integer(v as i64)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Name(v.to_string())
    }
}

/// Flat key/value configuration handed to a filter when it is created.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct FilterParams {
    entries: HashMap<String, ParamValue>,
}

impl FilterParams {
    pub fn new(entries: HashMap<String, ParamValue>) -> Self {
        Self { entries }
    }

    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<ParamValue>) {
        self.entries.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    pub fn entries(&self) -> &HashMap<String, ParamValue> {
        &self.entries
    }

    pub fn integer_or(&self, key: &str, default: i64) -> Result<i64> {
        match self.entries.get(key) {
            None => Ok(default),
            Some(ParamValue::Integer(v)) => Ok(*v),
            Some(v) => Err(PdfError::InvalidParameter(format!(
                "{} need an integer got:{:?}",
                key, v
            ))),
        }
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool> {
        match self.entries.get(key) {
            None => Ok(default),
            Some(ParamValue::Bool(v)) => Ok(*v),
            Some(ParamValue::Integer(v)) => Ok(*v != 0),
            Some(v) => Err(PdfError::InvalidParameter(format!(
                "{} need a bool got:{:?}",
                key, v
            ))),
        }
    }

    pub fn name(&self, key: &str) -> Result<Option<&str>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(ParamValue::Name(v)) => Ok(Some(v.as_str())),
            Some(v) => Err(PdfError::InvalidParameter(format!(
                "{} need a name got:{:?}",
                key, v
            ))),
        }
    }

    /// Integer that must lie in `min..=max`.
    pub fn ranged_or(&self, key: &str, default: i64, min: i64, max: i64) -> Result<i64> {
        let v = self.integer_or(key, default)?;
        if v < min || v > max {
            return Err(PdfError::InvalidParameter(format!(
                "{} must be between {} and {} got:{}",
                key, min, max, v
            )));
        }
        Ok(v)
    }
}

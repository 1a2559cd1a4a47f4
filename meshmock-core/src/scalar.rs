//! Loosely typed call arguments.
//!
//! Identifiers and state fields reach the mesh from scripts and config files,
//! so they are carried as a [`Scalar`] and checked at the call boundary
//! instead of being trusted as already-typed values.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MeshError, MeshResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Collect anything convertible into a list of scalars.
    pub fn list<I, T>(items: I) -> Vec<Scalar>
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        items.into_iter().map(Into::into).collect()
    }

    /// Integer payload, if this is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Coerce to a finite float. Text is parsed after trimming whitespace.
    pub fn to_f64(&self, field: &'static str) -> MeshResult<f64> {
        let value = match self {
            Scalar::Int(value) => *value as f64,
            Scalar::Float(value) => *value,
            Scalar::Text(text) => text.trim().parse::<f64>().map_err(|_| {
                MeshError::validation(field, format!("{text:?} is not a number"))
            })?,
        };
        if !value.is_finite() {
            return Err(MeshError::validation(field, format!("{value} is not finite")));
        }
        Ok(value)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(value) => write!(f, "{value}"),
            Scalar::Float(value) => write!(f, "{value}"),
            Scalar::Text(text) => write!(f, "{text:?}"),
        }
    }
}

macro_rules! scalar_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Scalar::Int(i64::from(value))
                }
            }
        )*
    };
}

scalar_from_int!(i8, i16, i32, i64, u8, u16, u32);

// Unsigned values past i64::MAX saturate; they stay integers and fail range checks.
impl From<usize> for Scalar {
    fn from(value: usize) -> Self {
        Scalar::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Scalar::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Scalar::Float(f64::from(value))
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

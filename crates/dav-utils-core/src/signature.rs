//! Runtime argument checking for dynamically supplied call arguments.
//!
//! Statically typed Rust functions never need this; it exists for entry
//! points that receive their arguments as JSON (scripts, RPC-style
//! dispatch) and want the same type-mismatch errors a [`TypeChecker`]
//! produces.
//!
//! [`TypeChecker`]: crate::TypeChecker

use crate::field::{FieldError, Validator};
use serde_json::{Map, Value};

/// Errors raised while checking call arguments.
#[derive(Debug, thiserror::Error)]
pub enum ArgumentError {
    /// An argument has the wrong type.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// A named argument does not match any declared parameter.
    #[error("unexpected argument `{name}`")]
    Unknown {
        /// The argument name.
        name: String,
    },

    /// More positional arguments than declared parameters.
    #[error("expected at most {expected} positional arguments, got {given}")]
    TooMany {
        /// Number of declared parameters.
        expected: usize,
        /// Number of supplied positional arguments.
        given: usize,
    },

    /// A parameter was supplied both positionally and by name.
    #[error("argument `{name}` given more than once")]
    Duplicate {
        /// The parameter name.
        name: String,
    },
}

/// An ordered list of typed parameters.
///
/// ```
/// use dav_utils_core::{Signature, StringType};
/// use serde_json::{json, Map};
///
/// let sig = Signature::new().param("val", StringType);
/// assert!(sig.check(&[json!("1")], &Map::new()).is_ok());
/// assert!(sig.check(&[json!(1)], &Map::new()).is_err());
/// ```
#[derive(Debug, Default)]
pub struct Signature {
    params: Vec<(String, Box<dyn Validator>)>,
}

impl Signature {
    /// Creates a signature without parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, validator: impl Validator + 'static) -> Self {
        self.params.push((name.into(), Box::new(validator)));
        self
    }

    /// Returns the declared parameter names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(name, _)| name.as_str())
    }

    /// Checks positional and named arguments against the parameters.
    ///
    /// Omitted parameters are not an error.
    ///
    /// # Errors
    ///
    /// Returns the first argument that fails its parameter's validator,
    /// or a structural [`ArgumentError`].
    pub fn check(
        &self,
        positional: &[Value],
        named: &Map<String, Value>,
    ) -> Result<(), ArgumentError> {
        if positional.len() > self.params.len() {
            return Err(ArgumentError::TooMany {
                expected: self.params.len(),
                given: positional.len(),
            });
        }

        for ((name, validator), value) in self.params.iter().zip(positional) {
            if named.contains_key(name) {
                return Err(ArgumentError::Duplicate { name: name.clone() });
            }
            validator.validate(name, value)?;
        }

        for (name, value) in named {
            let (_, validator) = self
                .params
                .iter()
                .find(|(param, _)| param == name)
                .ok_or_else(|| ArgumentError::Unknown { name: name.clone() })?;
            validator.validate(name, value)?;
        }

        Ok(())
    }
}

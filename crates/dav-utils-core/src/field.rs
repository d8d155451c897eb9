//! Validated fields: attribute slots that type-check every assignment.
//!
//! A [`TypeChecker`] pairs an attribute name with a [`Validator`]. Values are
//! dynamic ([`serde_json::Value`]) because they usually come straight from a
//! configuration file; the validator decides which shapes are acceptable.

use serde_json::Value;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors raised when a value is assigned to or read from a field.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    /// The value does not satisfy the field's predicate.
    #[error("{name}={value} is not a {expected}")]
    TypeMismatch {
        /// Attribute name.
        name: String,
        /// Offending value, rendered as JSON.
        value: String,
        /// Human-readable expected type.
        expected: String,
    },

    /// The target path (or its directory) is not writable.
    #[error("{name}: {} is not writable", path.display())]
    PermissionDenied {
        /// Attribute name.
        name: String,
        /// Path that failed the check.
        path: PathBuf,
    },

    /// The field was read before any value was stored.
    #[error("{name} is not set")]
    Unset {
        /// Attribute name.
        name: String,
    },
}

impl FieldError {
    /// Builds a [`FieldError::TypeMismatch`] for `value`.
    #[must_use]
    pub fn mismatch(name: &str, value: &Value, expected: impl Into<String>) -> Self {
        Self::TypeMismatch {
            name: name.to_string(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }
}

/// A type predicate for field values.
pub trait Validator: fmt::Debug + Send + Sync {
    /// Describes the accepted type, used in error messages.
    fn expected(&self) -> String;

    /// Returns `true` if `value` satisfies the predicate.
    fn accepts(&self, value: &Value) -> bool;

    /// Validates `value` for the attribute `name`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::TypeMismatch`] if the value is rejected.
    fn validate(&self, name: &str, value: &Value) -> Result<(), FieldError> {
        if self.accepts(value) {
            Ok(())
        } else {
            Err(FieldError::mismatch(name, value, self.expected()))
        }
    }
}

/// Accepts text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl Validator for StringType {
    fn expected(&self) -> String {
        "string".to_string()
    }

    fn accepts(&self, value: &Value) -> bool {
        value.is_string()
    }
}

/// Accepts integers (JSON numbers without a fractional part).
#[derive(Debug, Clone, Copy, Default)]
pub struct IntType;

impl Validator for IntType {
    fn expected(&self) -> String {
        "int".to_string()
    }

    fn accepts(&self, value: &Value) -> bool {
        value.is_i64() || value.is_u64()
    }
}

/// Accepts `true` / `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolType;

impl Validator for BoolType {
    fn expected(&self) -> String {
        "bool".to_string()
    }

    fn accepts(&self, value: &Value) -> bool {
        value.is_boolean()
    }
}

/// Accepts JSON objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct DictType;

impl Validator for DictType {
    fn expected(&self) -> String {
        "dict".to_string()
    }

    fn accepts(&self, value: &Value) -> bool {
        value.is_object()
    }
}

/// Accepts JSON arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListType;

impl Validator for ListType {
    fn expected(&self) -> String {
        "list".to_string()
    }

    fn accepts(&self, value: &Value) -> bool {
        value.is_array()
    }
}

/// Accepts text that parses as a UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidStringType;

impl Validator for UuidStringType {
    fn expected(&self) -> String {
        "uuid string".to_string()
    }

    fn accepts(&self, value: &Value) -> bool {
        value
            .as_str()
            .is_some_and(|s| uuid::Uuid::parse_str(s).is_ok())
    }
}

/// Accepts one of the HTTP request methods in [`HttpMethod::METHODS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpMethod;

impl HttpMethod {
    /// The closed set of accepted method tokens.
    pub const METHODS: &'static [&'static str] = &[
        "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH",
    ];
}

impl Validator for HttpMethod {
    fn expected(&self) -> String {
        format!("one of {}", Self::METHODS.join(", "))
    }

    fn accepts(&self, value: &Value) -> bool {
        value.as_str().is_some_and(|s| Self::METHODS.contains(&s))
    }
}

/// Wraps another validator and additionally accepts `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nullable<V>(pub V);

impl<V: Validator> Validator for Nullable<V> {
    fn expected(&self) -> String {
        format!("{} or null", self.0.expected())
    }

    fn accepts(&self, value: &Value) -> bool {
        value.is_null() || self.0.accepts(value)
    }

    fn validate(&self, name: &str, value: &Value) -> Result<(), FieldError> {
        if value.is_null() {
            return Ok(());
        }
        self.0
            .validate(name, value)
            .map_err(|_| FieldError::mismatch(name, value, self.expected()))
    }
}

/// Text or `null`.
pub type NullableStringType = Nullable<StringType>;
/// Integer or `null`.
pub type NullableIntType = Nullable<IntType>;
/// Object or `null`.
pub type NullableDictType = Nullable<DictType>;

/// A path the current process may write to.
///
/// The containing directory (`.` for a bare file name) must be writable by
/// the current process. If the path already exists it must be a regular
/// file the process can write.
#[derive(Debug, Clone, Copy, Default)]
pub struct WritableFile;

impl Validator for WritableFile {
    fn expected(&self) -> String {
        "writable file path".to_string()
    }

    fn accepts(&self, value: &Value) -> bool {
        self.validate("value", value).is_ok()
    }

    fn validate(&self, name: &str, value: &Value) -> Result<(), FieldError> {
        let Some(raw) = value.as_str() else {
            return Err(FieldError::mismatch(name, value, "string"));
        };
        let path = Path::new(raw);
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let denied = |p: &Path| FieldError::PermissionDenied {
            name: name.to_string(),
            path: p.to_path_buf(),
        };

        if !is_writable(dir) {
            return Err(denied(dir));
        }

        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => {
                if is_writable(path) {
                    Ok(())
                } else {
                    Err(denied(path))
                }
            }
            Ok(_) => Err(FieldError::mismatch(name, value, "regular file path")),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(_) => Err(denied(path)),
        }
    }
}

#[cfg(unix)]
fn is_writable(path: &Path) -> bool {
    rustix::fs::access(path, rustix::fs::Access::WRITE_OK).is_ok()
}

#[cfg(not(unix))]
fn is_writable(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| !m.permissions().readonly())
}

/// A validator built from a plain function.
#[derive(Debug, Clone)]
pub struct Predicate {
    expected: String,
    check: fn(&Value) -> bool,
}

impl Predicate {
    /// Creates a predicate validator; `expected` names the accepted type.
    #[must_use]
    pub fn new(expected: impl Into<String>, check: fn(&Value) -> bool) -> Self {
        Self {
            expected: expected.into(),
            check,
        }
    }
}

impl Validator for Predicate {
    fn expected(&self) -> String {
        self.expected.clone()
    }

    fn accepts(&self, value: &Value) -> bool {
        (self.check)(value)
    }
}

/// A named attribute slot that validates every assignment.
///
/// Once a value has been stored it always satisfies the validator; a
/// rejected assignment leaves the previous value in place.
#[derive(Debug)]
pub struct TypeChecker {
    name: String,
    validator: Box<dyn Validator>,
    value: Option<Value>,
}

impl TypeChecker {
    /// Creates an empty slot for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, validator: impl Validator + 'static) -> Self {
        Self {
            name: name.into(),
            validator: Box::new(validator),
            value: None,
        }
    }

    /// Returns the attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Describes the accepted type.
    #[must_use]
    pub fn expected(&self) -> String {
        self.validator.expected()
    }

    /// Validates `value` without storing it.
    ///
    /// # Errors
    ///
    /// Returns the validator's error if the value is rejected.
    pub fn check(&self, value: &Value) -> Result<(), FieldError> {
        self.validator.validate(&self.name, value)
    }

    /// Validates and stores `value`.
    ///
    /// # Errors
    ///
    /// Returns the validator's error; the stored value is then unchanged.
    pub fn set(&mut self, value: Value) -> Result<(), FieldError> {
        self.check(&value)?;
        self.value = Some(value);
        Ok(())
    }

    /// Returns the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Unset`] if nothing has been stored yet.
    pub fn get(&self) -> Result<&Value, FieldError> {
        self.value.as_ref().ok_or_else(|| FieldError::Unset {
            name: self.name.clone(),
        })
    }

    /// Returns the stored value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Removes and returns the stored value.
    pub fn clear(&mut self) -> Option<Value> {
        self.value.take()
    }
}

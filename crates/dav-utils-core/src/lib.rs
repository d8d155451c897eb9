//! # dav-utils-core
//!
//! Building blocks for small scripts that read their settings from JSON.
//!
//! This crate provides:
//!
//! - [`TypeChecker`] and the [`Validator`] family for type-checked fields
//! - [`AttrStore`] and the [`Reflect`] trait for listing and bulk-updating
//!   public attributes
//! - [`Signature`] for checking dynamically supplied call arguments
//! - [`utils`] with path checks, date conversion and file helpers
//!
//! ## Example
//!
//! ```
//! use dav_utils_core::{AttrStore, StringType, TypeChecker};
//! use serde_json::json;
//!
//! let mut attrs = AttrStore::new().with_field(TypeChecker::new("name", StringType));
//! attrs.set("name", json!("report")).unwrap();
//! assert!(attrs.set("name", json!(1)).is_err());
//! assert_eq!(attrs.public_attrs().len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod attrs;
mod field;
mod signature;

/// File, path and date helpers.
pub mod utils;

pub use attrs::{is_private, AttrError, AttrStore, Reflect, PRIVATE_PREFIX};
pub use field::{
    BoolType, DictType, FieldError, HttpMethod, IntType, ListType, Nullable, NullableDictType,
    NullableIntType, NullableStringType, Predicate, StringType, TypeChecker, UuidStringType,
    Validator, WritableFile,
};
pub use signature::{ArgumentError, Signature};
pub use utils::UtilError;

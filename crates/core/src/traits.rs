//! Core traits for crudkit
//!
//! Descriptors implement these so that contract checks, duplicate-key
//! detection and descriptor files work the same way for fields, columns and
//! actions.

use crate::error::{CrudError, CrudResult};
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashSet;

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for descriptors that can check their own contract
///
/// # Example
///
/// ```rust,ignore
/// use crudkit_core::{CrudError, CrudResult, Validatable};
///
/// struct Column {
///     key: String,
/// }
///
/// impl Validatable for Column {
///     fn validate(&self) -> CrudResult<()> {
///         if self.key.is_empty() {
///             return Err(CrudError::invalid_descriptor("column", "key cannot be empty"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the descriptor
    ///
    /// Returns `Ok(())` if valid, or the first contract violation found.
    fn validate(&self) -> CrudResult<()>;

    /// Check validity without error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

// ============================================================================
// Keyed Trait
// ============================================================================

/// Trait for descriptors identified by a key unique within their list
pub trait Keyed {
    /// The unique key; `None` opts the item out of uniqueness checks
    fn unique_key(&self) -> Option<String>;
}

/// Return the first key that occurs twice in `items`
pub fn first_duplicate_key<'a, T, I>(items: I) -> Option<String>
where
    T: Keyed + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter_map(Keyed::unique_key)
        .find(|key| !seen.insert(key.clone()))
}

// ============================================================================
// Persistable Trait
// ============================================================================

/// Trait for types that can be serialized to and deserialized from files
pub trait Persistable: Serialize + DeserializeOwned + Sized {
    /// Get the file extension for this type (without the dot)
    fn file_extension() -> &'static str;

    /// Get the schema version for migration purposes
    fn schema_version() -> u32 {
        1
    }

    /// Save to a JSON string
    fn to_json(&self) -> CrudResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Load from a JSON string
    fn from_json(json: &str) -> CrudResult<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Save to a file
    fn save_to_file(&self, path: &std::path::Path) -> CrudResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| CrudError::FileWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load from a file
    fn load_from_file(path: &std::path::Path) -> CrudResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| CrudError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Item(Option<&'static str>);

    impl Keyed for Item {
        fn unique_key(&self) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    #[test]
    fn test_first_duplicate_key() {
        let items = [Item(Some("a")), Item(None), Item(Some("b")), Item(None)];
        assert_eq!(first_duplicate_key(&items), None);

        let items = [Item(Some("a")), Item(Some("b")), Item(Some("a"))];
        assert_eq!(first_duplicate_key(&items), Some("a".to_string()));
    }

    struct TestValidatable {
        valid: bool,
    }

    impl Validatable for TestValidatable {
        fn validate(&self) -> CrudResult<()> {
            if self.valid {
                Ok(())
            } else {
                Err(CrudError::validation("Invalid state"))
            }
        }
    }

    #[test]
    fn test_validatable_trait() {
        let valid = TestValidatable { valid: true };
        assert!(valid.is_valid());
        assert!(valid.validation_errors().is_empty());

        let invalid = TestValidatable { valid: false };
        assert!(!invalid.is_valid());
        assert_eq!(
            invalid.validation_errors(),
            vec!["Validation error: Invalid state".to_string()]
        );
    }
}

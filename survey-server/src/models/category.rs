//! Category name validation

use super::ValidationError;

/// Minimum length for category names (after trimming)
const MIN_CATEGORY_NAME_LEN: usize = 2;

/// Validated category name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a new category name.
    ///
    /// # Rules
    /// - Surrounding whitespace is trimmed
    /// - At least 2 characters remain
    ///
    /// # Example
    /// ```
    /// use survey_server::models::CategoryName;
    ///
    /// assert!(CategoryName::new("Sports").is_ok());
    /// assert!(CategoryName::new("ab").is_ok());
    /// assert!(CategoryName::new("a").is_err());
    /// assert!(CategoryName::new("  a  ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }

        if trimmed.chars().count() < MIN_CATEGORY_NAME_LEN {
            return Err(ValidationError::TooShort {
                field: "name",
                min: MIN_CATEGORY_NAME_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

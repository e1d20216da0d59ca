//! Question text validation and update patches

use super::ValidationError;

/// Minimum length for question text (after trimming)
const MIN_QUESTION_LEN: usize = 10;

/// Maximum length for question text (after trimming)
const MAX_QUESTION_LEN: usize = 100;

/// Validated question text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionText(String);

impl QuestionText {
    /// Create a new question text.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Between 10 and 100 characters
    ///
    /// # Example
    /// ```
    /// use survey_server::models::QuestionText;
    ///
    /// assert!(QuestionText::new("Do you like football?").is_ok());
    /// assert!(QuestionText::new("short").is_err());
    /// assert!(QuestionText::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "question" });
        }

        let len = trimmed.chars().count();
        if len < MIN_QUESTION_LEN {
            return Err(ValidationError::TooShort {
                field: "question",
                min: MIN_QUESTION_LEN,
            });
        }

        if len > MAX_QUESTION_LEN {
            return Err(ValidationError::TooLong {
                field: "question",
                max: MAX_QUESTION_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Get the text as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for QuestionText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated partial update of a question.
///
/// `category` distinguishes "leave as is" (`None`) from "clear the
/// association" (`Some(None)`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPatch {
    pub question: Option<QuestionText>,
    pub category: Option<Option<i64>>,
}

impl QuestionPatch {
    /// Build a patch, rejecting one that changes nothing.
    pub fn new(
        question: Option<&str>,
        category: Option<Option<i64>>,
    ) -> Result<Self, ValidationError> {
        if question.is_none() && category.is_none() {
            return Err(ValidationError::NothingToUpdate);
        }

        Ok(Self {
            question: question.map(QuestionText::new).transpose()?,
            category,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_texts() {
        assert!(QuestionText::new("Do you like football?").is_ok());
        assert!(QuestionText::new("0123456789").is_ok());
        assert_eq!(
            QuestionText::new("   Is it raining?  ").unwrap().as_str(),
            "Is it raining?"
        );
    }

    #[test]
    fn rejects_short_text() {
        let err = QuestionText::new("short").unwrap_err();
        assert!(matches!(err, ValidationError::TooShort { min: 10, .. }));

        // padding does not count toward the length
        let err = QuestionText::new("   short   ").unwrap_err();
        assert!(matches!(err, ValidationError::TooShort { .. }));
    }

    #[test]
    fn rejects_whitespace_only() {
        let err = QuestionText::new(" \t ").unwrap_err();
        assert!(matches!(err, ValidationError::Empty { field: "question" }));
    }

    #[test]
    fn max_length() {
        assert!(QuestionText::new(&"q".repeat(100)).is_ok());

        let err = QuestionText::new(&"q".repeat(101)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 100, .. }));
    }

    #[test]
    fn empty_patch_is_rejected() {
        let err = QuestionPatch::new(None, None).unwrap_err();
        assert_eq!(err, ValidationError::NothingToUpdate);
    }

    #[test]
    fn patch_can_clear_category() {
        let patch = QuestionPatch::new(None, Some(None)).unwrap();
        assert_eq!(patch.category, Some(None));
        assert!(patch.question.is_none());
    }

    #[test]
    fn patch_validates_text() {
        assert!(QuestionPatch::new(Some("   "), None).is_err());
        assert!(QuestionPatch::new(Some("Is this long enough?"), Some(Some(3))).is_ok());
    }
}

//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod category;
pub mod question;

pub use validation::ValidationError;
pub use category::CategoryName;
pub use question::{QuestionPatch, QuestionText};

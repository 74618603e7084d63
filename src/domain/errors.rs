//! Domain error types
//!
//! These errors represent business-level failures. The HTTP mapping lives in
//! `api::mod`.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Per-field validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Resource not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    /// The user already has this book in their library.
    #[error("Book already owned")]
    AlreadyOwned,

    /// The purchase transaction was rolled back.
    #[error("Purchase of book {book_id} failed: {cause}")]
    PurchaseFailed { book_id: i32, cause: String },

    #[error("Not allowed: {0}")]
    AuthorizationDenied(String),

    #[error("Login required")]
    LoginRequired,

    #[error("Database error: {0}")]
    Database(String),
}

impl DomainError {
    /// Validation failure on a single field.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        DomainError::Validation(errors)
    }
}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_collects_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("title", "This field is required.");
        errors.add("price", "Enter a number.");
        errors.add("price", "Ensure this value is greater than or equal to 0.");

        assert_eq!(errors.get("price").map(|m| m.len()), Some(2));
        assert_eq!(
            serde_json::to_value(&errors).unwrap()["title"][0],
            "This field is required."
        );
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_empty_field_errors_is_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }
}

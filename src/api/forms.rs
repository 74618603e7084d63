//! HTML form payloads and their validation.
//!
//! Forms keep the raw submitted strings so a failed submission can be
//! re-rendered as typed.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::FieldErrors;
use crate::domain::money::{MAX_PRICE_CENTS, Money};
use crate::models::author::{Author, AuthorInput};
use crate::models::book::{Book, BookFormat, BookInput, PublicationState};
use crate::models::genre::{Genre, GenreInput};
use crate::models::user::{UserDto, UserUpdate};
use crate::services::account_service::NewAccount;

const REQUIRED: &str = "This field is required.";
const INVALID_CHOICE: &str = "Select a valid choice.";

fn required(errors: &mut FieldErrors, field: &str, value: &str, max_len: usize) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else if value.chars().count() > max_len {
        errors.add(
            field,
            format!("Ensure this value has at most {} characters.", max_len),
        );
    }
    value.to_string()
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn checked(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty() && v != "false" && v != "0")
}

fn valid_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

fn email(errors: &mut FieldErrors, field: &str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else if !valid_email(value) {
        errors.add(field, "Enter a valid email address.");
    }
    value.to_string()
}

/// Selected ids, each of which must be one of `available`.
fn choices(errors: &mut FieldErrors, field: &str, raw: &[String], available: &[i32]) -> Vec<i32> {
    let mut ids = BTreeSet::new();
    for value in raw.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        match value.parse::<i32>() {
            Ok(id) if available.contains(&id) => {
                ids.insert(id);
            }
            _ => errors.add(
                field,
                format!(
                    "Select a valid choice. {} is not one of the available choices.",
                    value
                ),
            ),
        }
    }
    ids.into_iter().collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub cover_url: String,
    #[serde(default)]
    pub publication_state: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub duration_minutes: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub authors: Vec<String>,
}

impl BookForm {
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            description: book.description.clone(),
            price: book.price.to_string(),
            cover_url: book.cover_url.clone().unwrap_or_default(),
            publication_state: enum_value(&book.publication_state),
            format: enum_value(&book.format),
            release_date: book.release_date.clone().unwrap_or_default(),
            duration_minutes: book
                .duration_minutes
                .map(|d| d.to_string())
                .unwrap_or_default(),
            genres: book.genres.iter().map(|g| g.id.to_string()).collect(),
            authors: book.authors.iter().map(|a| a.id.to_string()).collect(),
        }
    }

    pub fn validate(&self, genres: &[Genre], authors: &[Author]) -> Result<BookInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = required(&mut errors, "title", &self.title, 200);
        let price = parse_price(&mut errors, &self.price);

        let publication_state = PublicationState::parse(self.publication_state.trim());
        if publication_state.is_none() {
            errors.add("publication_state", INVALID_CHOICE);
        }
        let format = BookFormat::parse(self.format.trim());
        if format.is_none() {
            errors.add("format", INVALID_CHOICE);
        }

        let release_date = optional(&self.release_date);
        if let Some(date) = &release_date
            && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err()
        {
            errors.add("release_date", "Enter a valid date.");
        }

        let duration_minutes = match optional(&self.duration_minutes) {
            None => None,
            Some(raw) => match raw.parse::<i32>() {
                Ok(n) if n >= 0 => Some(n),
                Ok(_) => {
                    errors.add(
                        "duration_minutes",
                        "Ensure this value is greater than or equal to 0.",
                    );
                    None
                }
                Err(_) => {
                    errors.add("duration_minutes", "Enter a whole number.");
                    None
                }
            },
        };

        let genre_ids: Vec<i32> = genres.iter().map(|g| g.id).collect();
        let author_ids: Vec<i32> = authors.iter().map(|a| a.id).collect();
        let genre_ids = choices(&mut errors, "genres", &self.genres, &genre_ids);
        let author_ids = choices(&mut errors, "authors", &self.authors, &author_ids);

        match (price, publication_state, format) {
            (Some(price), Some(publication_state), Some(format)) if errors.is_empty() => {
                Ok(BookInput {
                    title,
                    description: self.description.trim().to_string(),
                    price,
                    cover_url: optional(&self.cover_url),
                    publication_state,
                    format,
                    release_date,
                    duration_minutes,
                    genre_ids,
                    author_ids,
                })
            }
            _ => Err(errors),
        }
    }
}

fn enum_value<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn parse_price(errors: &mut FieldErrors, raw: &str) -> Option<Money> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add("price", REQUIRED);
        return None;
    }
    let Ok(value) = Decimal::from_str(raw) else {
        errors.add("price", "Enter a number.");
        return None;
    };
    if value.is_sign_negative() && !value.is_zero() {
        errors.add("price", "Ensure this value is greater than or equal to 0.");
        return None;
    }
    match Money::from_decimal(value) {
        Some(money) if money.cents() <= MAX_PRICE_CENTS => Some(money),
        Some(_) => {
            errors.add("price", "Ensure that there are no more than 8 digits in total.");
            None
        }
        None => {
            errors.add(
                "price",
                "Ensure that there are no more than 2 decimal places.",
            );
            None
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenreForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl GenreForm {
    pub fn from_genre(genre: &Genre) -> Self {
        Self {
            name: genre.name.clone(),
            description: genre.description.clone(),
        }
    }

    pub fn validate(&self) -> Result<GenreInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required(&mut errors, "name", &self.name, 100);
        errors.into_field_result(GenreInput {
            name,
            description: self.description.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub biography: String,
    #[serde(default)]
    pub photo_url: String,
}

impl AuthorForm {
    pub fn from_author(author: &Author) -> Self {
        Self {
            name: author.name.clone(),
            biography: author.biography.clone(),
            photo_url: author.photo_url.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<AuthorInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required(&mut errors, "name", &self.name, 200);
        errors.into_field_result(AuthorInput {
            name,
            biography: self.biography.trim().to_string(),
            photo_url: optional(&self.photo_url),
        })
    }
}

/// Admin edit of an existing account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_staff: Option<String>,
    #[serde(default)]
    pub is_superuser: Option<String>,
}

impl UserForm {
    pub fn from_user(user: &UserDto) -> Self {
        Self {
            first_name: user.first_name.clone(),
            email: user.email.clone(),
            is_staff: user.is_staff.then(|| "on".to_string()),
            is_superuser: user.is_superuser.then(|| "on".to_string()),
        }
    }

    pub fn validate(&self) -> Result<UserUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        let first_name = self.first_name.trim().to_string();
        if first_name.chars().count() > 150 {
            errors.add("first_name", "Ensure this value has at most 150 characters.");
        }
        let email = email(&mut errors, "email", &self.email);
        errors.into_field_result(UserUpdate {
            first_name,
            email,
            is_staff: checked(&self.is_staff),
            is_superuser: checked(&self.is_superuser),
        })
    }
}

/// Admin creation of an account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUserForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub is_staff: Option<String>,
    #[serde(default)]
    pub is_superuser: Option<String>,
}

impl NewUserForm {
    pub fn validate(&self) -> Result<NewAccount, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = email(&mut errors, "email", &self.email);
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors.into_field_result(NewAccount {
            first_name: self.first_name.trim().to_string(),
            email,
            password: self.password.clone(),
            is_staff: checked(&self.is_staff),
            is_superuser: checked(&self.is_superuser),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default, skip_serializing)]
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<NewAccount, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = email(&mut errors, "email", &self.email);
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        } else if self.password != self.confirm_password {
            errors.add("confirm_password", "Passwords do not match.");
        }
        errors.into_field_result(NewAccount {
            first_name: self.full_name.trim().to_string(),
            email,
            password: self.password.clone(),
            is_staff: false,
            is_superuser: false,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

trait IntoFieldResult {
    fn into_field_result<T>(self, value: T) -> Result<T, FieldErrors>;
}

impl IntoFieldResult for FieldErrors {
    fn into_field_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genre(id: i32, name: &str) -> Genre {
        Genre {
            id,
            name: name.to_string(),
            description: String::new(),
        }
    }

    fn valid_book() -> BookForm {
        BookForm {
            title: " Dune ".to_string(),
            price: "9.99".to_string(),
            publication_state: "available".to_string(),
            format: "ebook".to_string(),
            genres: vec!["1".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_book_form() {
        let input = valid_book().validate(&[genre(1, "Sci-Fi")], &[]).unwrap();
        assert_eq!(input.title, "Dune");
        assert_eq!(input.price.cents(), 999);
        assert_eq!(input.publication_state, PublicationState::Available);
        assert_eq!(input.format, BookFormat::Ebook);
        assert_eq!(input.genre_ids, vec![1]);
        assert!(input.release_date.is_none());
    }

    #[test]
    fn test_book_form_collects_every_error() {
        let form = BookForm {
            title: "   ".to_string(),
            price: "-1".to_string(),
            publication_state: "draft".to_string(),
            format: "paperback".to_string(),
            release_date: "31/12/2024".to_string(),
            duration_minutes: "long".to_string(),
            genres: vec!["7".to_string()],
            ..Default::default()
        };
        let errors = form.validate(&[genre(1, "Sci-Fi")], &[]).unwrap_err();
        for field in [
            "title",
            "price",
            "publication_state",
            "format",
            "release_date",
            "duration_minutes",
            "genres",
        ] {
            assert!(errors.get(field).is_some(), "missing error for {}", field);
        }
    }

    #[test]
    fn test_price_precision_and_range() {
        let mut form = valid_book();
        form.price = "9.999".to_string();
        assert!(form.validate(&[genre(1, "Sci-Fi")], &[]).is_err());

        form.price = "1000000".to_string();
        assert!(form.validate(&[genre(1, "Sci-Fi")], &[]).is_err());

        form.price = "0".to_string();
        assert!(form.validate(&[genre(1, "Sci-Fi")], &[]).is_ok());
    }

    #[test]
    fn test_register_password_mismatch() {
        let form = RegisterForm {
            full_name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "one".to_string(),
            confirm_password: "two".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.get("confirm_password").is_some());
    }

    #[test]
    fn test_user_form_checkboxes() {
        let form = UserForm {
            first_name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            is_staff: Some("on".to_string()),
            is_superuser: None,
        };
        let update = form.validate().unwrap();
        assert!(update.is_staff);
        assert!(!update.is_superuser);
    }

    #[test]
    fn test_email_shape() {
        assert!(valid_email("a@b.c"));
        assert!(!valid_email("ab.c"));
        assert!(!valid_email("a@@b"));
        assert!(!valid_email("a b@c"));
    }
}

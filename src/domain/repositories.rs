//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::DomainError;
use super::search::{AuthorField, BookField, GenreField, OrderField, SearchFilter, UserField};
use crate::models::author::{Author, AuthorInput};
use crate::models::book::{Book, BookFormat, BookInput, PublicationState};
use crate::models::genre::{Genre, GenreInput};
use crate::models::order::OrderSummary;
use crate::models::user::{Credentials, NewUser, UserDto, UserUpdate};

/// Storefront catalog listing options
#[derive(Debug, Default, Clone)]
pub struct CatalogQuery {
    pub state: Option<PublicationState>,
    pub format: Option<BookFormat>,
    pub genre_id: Option<i32>,
    pub limit: Option<u64>,
}

/// Repository trait for Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Admin list: filtered, id ascending
    async fn search(&self, filter: &SearchFilter<BookField>) -> Result<Vec<Book>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError>;

    /// Book with the given id, only if it is in `state`
    async fn find_in_state(
        &self,
        id: i32,
        state: PublicationState,
    ) -> Result<Option<Book>, DomainError>;

    /// Available books newest first; upcoming books by release date.
    async fn catalog(&self, query: CatalogQuery) -> Result<Vec<Book>, DomainError>;

    async fn create(&self, input: BookInput) -> Result<Book, DomainError>;

    async fn update(&self, id: i32, input: BookInput) -> Result<Book, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

#[async_trait]
pub trait GenreRepository: Send + Sync {
    /// Filtered, name ascending
    async fn search(&self, filter: &SearchFilter<GenreField>) -> Result<Vec<Genre>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Genre>, DomainError>;

    async fn create(&self, input: GenreInput) -> Result<Genre, DomainError>;

    async fn update(&self, id: i32, input: GenreInput) -> Result<Genre, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Filtered, name ascending
    async fn search(&self, filter: &SearchFilter<AuthorField>)
    -> Result<Vec<Author>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Author>, DomainError>;

    async fn create(&self, input: AuthorInput) -> Result<Author, DomainError>;

    async fn update(&self, id: i32, input: AuthorInput) -> Result<Author, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Filtered, id ascending
    async fn search(&self, filter: &SearchFilter<UserField>) -> Result<Vec<UserDto>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<UserDto>, DomainError>;

    /// Login lookup by username, hash included
    async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>, DomainError>;

    /// Whether another account already uses `email` (case-insensitive)
    async fn email_taken(&self, email: &str, except: Option<i32>) -> Result<bool, DomainError>;

    async fn create(&self, user: NewUser) -> Result<UserDto, DomainError>;

    async fn update(&self, id: i32, update: UserUpdate) -> Result<UserDto, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Filtered, newest first
    async fn search(
        &self,
        filter: &SearchFilter<OrderField>,
    ) -> Result<Vec<OrderSummary>, DomainError>;
}

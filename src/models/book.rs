use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::money::Money;

/// Whether a book is on sale yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum PublicationState {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "upcoming")]
    Upcoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum BookFormat {
    #[sea_orm(string_value = "ebook")]
    Ebook,
    #[sea_orm(string_value = "audiobook")]
    Audiobook,
}

impl PublicationState {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "available" => Some(Self::Available),
            "upcoming" => Some(Self::Upcoming),
            _ => None,
        }
    }
}

impl BookFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ebook" => Some(Self::Ebook),
            "audiobook" => Some(Self::Audiobook),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: String,
    /// Current sale price in cents.
    pub price_cents: i64,
    pub cover_url: Option<String>,
    pub publication_state: PublicationState,
    pub format: BookFormat,
    /// `YYYY-MM-DD`
    pub release_date: Option<String>,
    pub duration_minutes: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::book_content::Entity")]
    Contents,
    #[sea_orm(has_many = "super::book_genres::Entity")]
    BookGenres,
    #[sea_orm(has_many = "super::book_authors::Entity")]
    BookAuthors,
    #[sea_orm(has_many = "super::library_entry::Entity")]
    LibraryEntries,
}

impl Related<super::book_content::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contents.def()
    }
}

impl Related<super::library_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LibraryEntries.def()
    }
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_authors::Relation::Author.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_authors::Relation::Book.def().rev())
    }
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_genres::Relation::Genre.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_genres::Relation::Book.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Id/name pair used for the genres and authors attached to a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: i32,
    pub name: String,
}

// DTO handed to views
#[derive(Debug, Clone, Serialize)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub price: Money,
    pub cover_url: Option<String>,
    pub publication_state: PublicationState,
    pub format: BookFormat,
    pub release_date: Option<String>,
    pub duration_minutes: Option<i32>,
    pub authors: Vec<NamedRef>,
    pub genres: Vec<NamedRef>,
}

impl From<Model> for Book {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            price: Money::from_cents(model.price_cents),
            cover_url: model.cover_url,
            publication_state: model.publication_state,
            format: model.format,
            release_date: model.release_date,
            duration_minutes: model.duration_minutes,
            authors: Vec::new(),
            genres: Vec::new(),
        }
    }
}

/// Validated input for creating or replacing a book.
#[derive(Debug, Clone, PartialEq)]
pub struct BookInput {
    pub title: String,
    pub description: String,
    pub price: Money,
    pub cover_url: Option<String>,
    pub publication_state: PublicationState,
    pub format: BookFormat,
    pub release_date: Option<String>,
    pub duration_minutes: Option<i32>,
    pub genre_ids: Vec<i32>,
    pub author_ids: Vec<i32>,
}

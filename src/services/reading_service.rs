//! Reading Service - loads the content a reader is allowed to see

use sea_orm::*;
use serde::Serialize;

use crate::domain::DomainError;
use crate::domain::reading::{self, ReadingPosition};
use crate::infrastructure::repositories::book_repository::with_relations;
use crate::models::Book;
use crate::models::book::{BookFormat, Entity as BookEntity};
use crate::models::book_content::{self, ContentType, Entity as BookContent};
use crate::models::user::UserDto;
use crate::services::purchase_service::owns_book;

/// Content row as shown to the reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentRef {
    pub id: i32,
    pub position: i32,
    pub media_url: String,
}

impl From<book_content::Model> for ContentRef {
    fn from(model: book_content::Model) -> Self {
        Self {
            id: model.id,
            position: model.position,
            media_url: model.media_url,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadingView {
    pub book: Book,
    #[serde(flatten)]
    pub position: ReadingPosition<ContentRef>,
}

/// Content rows of one type in reading order.
pub async fn contents(
    db: &DatabaseConnection,
    book_id: i32,
    content_type: ContentType,
) -> Result<Vec<ContentRef>, DbErr> {
    let rows = BookContent::find()
        .filter(book_content::Column::BookId.eq(book_id))
        .filter(book_content::Column::ContentType.eq(content_type))
        .order_by_asc(book_content::Column::Position)
        .order_by_asc(book_content::Column::Id)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(ContentRef::from).collect())
}

/// Open `book_id` at `requested_page` for `reader`.
///
/// Readers need a library entry for the book; superusers may preview any book.
pub async fn open_book(
    db: &DatabaseConnection,
    reader: &UserDto,
    book_id: i32,
    requested_page: i64,
) -> Result<ReadingView, DomainError> {
    let model = BookEntity::find_by_id(book_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    if !reader.is_superuser && !owns_book(db, reader.id, book_id).await? {
        tracing::warn!("User {} tried to read book {} without owning it", reader.id, book_id);
        return Err(DomainError::AuthorizationDenied(
            "Buy this book to start reading it.".to_string(),
        ));
    }

    let content_type = match model.format {
        BookFormat::Ebook => ContentType::Image,
        BookFormat::Audiobook => ContentType::Audio,
    };
    let format = model.format;
    let rows = contents(db, book_id, content_type).await?;
    let position = reading::resolve(format, rows, requested_page);

    Ok(ReadingView {
        book: with_relations(db, model).await?,
        position,
    })
}

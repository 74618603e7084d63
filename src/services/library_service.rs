//! Library Service - what a user owns

use sea_orm::*;

use crate::domain::DomainError;
use crate::infrastructure::repositories::book_repository::with_relations_all;
use crate::models::Book;
use crate::models::book::{self, BookFormat, Entity as BookEntity};
use crate::models::library_entry::{self, Entity as LibraryEntry};

/// Ids of every book in the user's library
pub async fn owned_book_ids(db: &DatabaseConnection, user_id: i32) -> Result<Vec<i32>, DbErr> {
    LibraryEntry::find()
        .select_only()
        .column(library_entry::Column::BookId)
        .filter(library_entry::Column::UserId.eq(user_id))
        .order_by_asc(library_entry::Column::BookId)
        .into_tuple()
        .all(db)
        .await
}

pub async fn owned_count(db: &DatabaseConnection, user_id: i32) -> Result<u64, DbErr> {
    LibraryEntry::find()
        .filter(library_entry::Column::UserId.eq(user_id))
        .count(db)
        .await
}

/// Owned books of one format, most recently acquired first
pub async fn owned_books(
    db: &DatabaseConnection,
    user_id: i32,
    format: BookFormat,
) -> Result<Vec<Book>, DomainError> {
    let models = BookEntity::find()
        .join(JoinType::InnerJoin, book::Relation::LibraryEntries.def())
        .filter(library_entry::Column::UserId.eq(user_id))
        .filter(book::Column::Format.eq(format))
        .order_by_desc(library_entry::Column::AcquiredAt)
        .order_by_desc(book::Column::Id)
        .all(db)
        .await?;

    Ok(with_relations_all(db, models).await?)
}

//! Purchase Service - order, order line and library grant in one transaction

use chrono::Utc;
use sea_orm::*;
use serde::Serialize;

use crate::domain::{DomainError, Money};
use crate::models::book::Entity as Book;
use crate::models::library_entry::{self, Entity as LibraryEntry};
use crate::models::order::{self, PaymentState};
use crate::models::order_line;

/// What a successful purchase created
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseReceipt {
    pub order_id: i32,
    pub order_line_id: i32,
    pub library_entry_id: i32,
    pub book_id: i32,
    /// Title at the time of purchase
    pub title: String,
    pub total_paid: Money,
    pub ordered_at: String,
}

enum PurchaseAbort {
    AlreadyOwned,
    Storage(DbErr),
}

impl From<DbErr> for PurchaseAbort {
    fn from(e: DbErr) -> Self {
        PurchaseAbort::Storage(e)
    }
}

/// Whether `user_id` already has `book_id` in their library.
pub async fn owns_book<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    book_id: i32,
) -> Result<bool, DbErr> {
    let count = LibraryEntry::find()
        .filter(library_entry::Column::UserId.eq(user_id))
        .filter(library_entry::Column::BookId.eq(book_id))
        .count(conn)
        .await?;
    Ok(count > 0)
}

/// Buy a book at its current price.
///
/// Payment is not processed; orders are recorded as completed. Nothing is
/// written unless all three rows are.
pub async fn purchase(
    db: &DatabaseConnection,
    user_id: i32,
    book_id: i32,
) -> Result<PurchaseReceipt, DomainError> {
    let book = Book::find_by_id(book_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let price = Money::from_cents(book.price_cents);
    let txn = db.begin().await.map_err(|e| failed(book_id, e))?;

    let outcome = record_purchase(&txn, user_id, book_id, &book.title, price).await;

    match outcome {
        Ok(receipt) => {
            txn.commit().await.map_err(|e| failed(book_id, e))?;
            tracing::info!(
                "User {} bought book {} for {} (order {})",
                user_id,
                book_id,
                receipt.total_paid,
                receipt.order_id
            );
            Ok(receipt)
        }
        Err(abort) => {
            if let Err(e) = txn.rollback().await {
                tracing::error!("Rollback of purchase of book {} failed: {}", book_id, e);
            }
            match abort {
                PurchaseAbort::AlreadyOwned => {
                    tracing::warn!("User {} already owns book {}", user_id, book_id);
                    Err(DomainError::AlreadyOwned)
                }
                PurchaseAbort::Storage(e) => {
                    if let Some(SqlErr::UniqueConstraintViolation(_)) = e.sql_err() {
                        tracing::warn!(
                            "Concurrent purchase of book {} by user {}",
                            book_id,
                            user_id
                        );
                        return Err(DomainError::AlreadyOwned);
                    }
                    tracing::error!("Purchase of book {} rolled back: {}", book_id, e);
                    Err(failed(book_id, e))
                }
            }
        }
    }
}

fn failed(book_id: i32, e: DbErr) -> DomainError {
    DomainError::PurchaseFailed {
        book_id,
        cause: e.to_string(),
    }
}

async fn record_purchase(
    txn: &DatabaseTransaction,
    user_id: i32,
    book_id: i32,
    title: &str,
    price: Money,
) -> Result<PurchaseReceipt, PurchaseAbort> {
    // 1. Re-purchase guard
    if owns_book(txn, user_id, book_id).await? {
        return Err(PurchaseAbort::AlreadyOwned);
    }

    let now = Utc::now();
    let ordered_at = now.format("%Y-%m-%d %H:%M:%S").to_string();

    // 2. Order
    let order = order::ActiveModel {
        user_id: Set(user_id),
        total_paid_cents: Set(price.cents()),
        payment_state: Set(PaymentState::Completed),
        ordered_at: Set(ordered_at.clone()),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    // 3. Line with the price snapshot
    let line = order_line::ActiveModel {
        order_id: Set(order.id),
        book_id: Set(Some(book_id)),
        price_cents: Set(price.cents()),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    // 4. Access grant
    let entry = library_entry::ActiveModel {
        user_id: Set(user_id),
        book_id: Set(book_id),
        acquired_at: Set(now.to_rfc3339()),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    Ok(PurchaseReceipt {
        order_id: order.id,
        order_line_id: line.id,
        library_entry_id: entry.id,
        book_id,
        title: title.to_string(),
        total_paid: price,
        ordered_at,
    })
}

//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    JoinType, ModelTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};

use super::filter;
use crate::domain::search::{BookField, SearchFilter};
use crate::domain::{BookRepository, CatalogQuery, DomainError};
use crate::models::book::{
    self, ActiveModel, Book, BookInput, Column, Entity as BookEntity, NamedRef, PublicationState,
};
use crate::models::{author, book_authors, book_genres, genre};

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Attach authors and genres (name ascending) to a book row.
pub(crate) async fn with_relations<C: ConnectionTrait>(
    conn: &C,
    model: book::Model,
) -> Result<Book, DbErr> {
    let authors = model
        .find_related(author::Entity)
        .order_by_asc(author::Column::Name)
        .all(conn)
        .await?;
    let genres = model
        .find_related(genre::Entity)
        .order_by_asc(genre::Column::Name)
        .all(conn)
        .await?;

    let mut dto = Book::from(model);
    dto.authors = authors
        .into_iter()
        .map(|a| NamedRef {
            id: a.id,
            name: a.name,
        })
        .collect();
    dto.genres = genres
        .into_iter()
        .map(|g| NamedRef {
            id: g.id,
            name: g.name,
        })
        .collect();
    Ok(dto)
}

pub(crate) async fn with_relations_all<C: ConnectionTrait>(
    conn: &C,
    models: Vec<book::Model>,
) -> Result<Vec<Book>, DbErr> {
    let mut books = Vec::with_capacity(models.len());
    for model in models {
        books.push(with_relations(conn, model).await?);
    }
    Ok(books)
}

/// Replace the genre and author links of a book.
async fn set_links<C: ConnectionTrait>(
    conn: &C,
    book_id: i32,
    genre_ids: &[i32],
    author_ids: &[i32],
) -> Result<(), DbErr> {
    book_genres::Entity::delete_many()
        .filter(book_genres::Column::BookId.eq(book_id))
        .exec(conn)
        .await?;
    book_authors::Entity::delete_many()
        .filter(book_authors::Column::BookId.eq(book_id))
        .exec(conn)
        .await?;

    if !genre_ids.is_empty() {
        book_genres::Entity::insert_many(genre_ids.iter().map(|&genre_id| {
            book_genres::ActiveModel {
                book_id: Set(book_id),
                genre_id: Set(genre_id),
            }
        }))
        .exec_without_returning(conn)
        .await?;
    }

    if !author_ids.is_empty() {
        book_authors::Entity::insert_many(author_ids.iter().map(|&author_id| {
            book_authors::ActiveModel {
                book_id: Set(book_id),
                author_id: Set(author_id),
            }
        }))
        .exec_without_returning(conn)
        .await?;
    }

    Ok(())
}

fn apply_input(model: &mut ActiveModel, input: &BookInput) {
    model.title = Set(input.title.clone());
    model.description = Set(input.description.clone());
    model.price_cents = Set(input.price.cents());
    model.cover_url = Set(input.cover_url.clone());
    model.publication_state = Set(input.publication_state);
    model.format = Set(input.format);
    model.release_date = Set(input.release_date.clone());
    model.duration_minutes = Set(input.duration_minutes);
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn search(&self, filter: &SearchFilter<BookField>) -> Result<Vec<Book>, DomainError> {
        let mut query = BookEntity::find();

        if filter.needs_distinct() {
            query = query
                .join(JoinType::LeftJoin, book::Relation::BookAuthors.def())
                .join(JoinType::LeftJoin, book_authors::Relation::Author.def())
                .join(JoinType::LeftJoin, book::Relation::BookGenres.def())
                .join(JoinType::LeftJoin, book_genres::Relation::Genre.def())
                .distinct();
        }

        if let Some(cond) = filter::condition(filter) {
            query = query.filter(cond);
        }

        let models = query.order_by_asc(Column::Id).all(&self.db).await?;
        Ok(with_relations_all(&self.db, models).await?)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError> {
        match BookEntity::find_by_id(id).one(&self.db).await? {
            Some(model) => Ok(Some(with_relations(&self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn find_in_state(
        &self,
        id: i32,
        state: PublicationState,
    ) -> Result<Option<Book>, DomainError> {
        let model = BookEntity::find_by_id(id)
            .filter(Column::PublicationState.eq(state))
            .one(&self.db)
            .await?;

        match model {
            Some(model) => Ok(Some(with_relations(&self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn catalog(&self, query: CatalogQuery) -> Result<Vec<Book>, DomainError> {
        let mut select = BookEntity::find();

        if let Some(state) = query.state {
            select = select.filter(Column::PublicationState.eq(state));
        }
        if let Some(format) = query.format {
            select = select.filter(Column::Format.eq(format));
        }
        if let Some(genre_id) = query.genre_id {
            select = select
                .join(JoinType::InnerJoin, book::Relation::BookGenres.def())
                .filter(book_genres::Column::GenreId.eq(genre_id));
        }

        select = match query.state {
            Some(PublicationState::Upcoming) => select
                .order_by_asc(Column::ReleaseDate)
                .order_by_asc(Column::Id),
            _ => select.order_by_desc(Column::Id),
        };

        if let Some(limit) = query.limit {
            select = select.limit(limit);
        }

        let models = select.all(&self.db).await?;
        Ok(with_relations_all(&self.db, models).await?)
    }

    async fn create(&self, input: BookInput) -> Result<Book, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.db.begin().await?;

        let mut model = ActiveModel {
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };
        apply_input(&mut model, &input);
        let saved = model.insert(&txn).await?;
        set_links(&txn, saved.id, &input.genre_ids, &input.author_ids).await?;

        let book = with_relations(&txn, saved).await?;
        txn.commit().await?;

        tracing::info!("Created book {} ({})", book.id, book.title);
        Ok(book)
    }

    async fn update(&self, id: i32, input: BookInput) -> Result<Book, DomainError> {
        let existing = BookEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let txn = self.db.begin().await?;
        let mut model: ActiveModel = existing.into();
        apply_input(&mut model, &input);
        model.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let saved = model.update(&txn).await?;
        set_links(&txn, id, &input.genre_ids, &input.author_ids).await?;

        let book = with_relations(&txn, saved).await?;
        txn.commit().await?;

        tracing::info!("Updated book {}", id);
        Ok(book)
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = BookEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        tracing::info!("Deleted book {}", id);
        Ok(())
    }
}

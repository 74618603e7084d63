//! SeaORM implementation of AuthorRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use super::filter;
use crate::domain::search::{AuthorField, SearchFilter};
use crate::domain::{AuthorRepository, DomainError};
use crate::models::author::{ActiveModel, Author, AuthorInput, Column, Entity as AuthorEntity};

/// SeaORM-based implementation of AuthorRepository
pub struct SeaOrmAuthorRepository {
    db: DatabaseConnection,
}

impl SeaOrmAuthorRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuthorRepository for SeaOrmAuthorRepository {
    async fn search(
        &self,
        filter: &SearchFilter<AuthorField>,
    ) -> Result<Vec<Author>, DomainError> {
        let mut query = AuthorEntity::find();
        if let Some(cond) = filter::condition(filter) {
            query = query.filter(cond);
        }

        Ok(query
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Author>, DomainError> {
        Ok(AuthorEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn create(&self, input: AuthorInput) -> Result<Author, DomainError> {
        let author = ActiveModel {
            name: Set(input.name),
            biography: Set(input.biography),
            photo_url: Set(input.photo_url),
            ..Default::default()
        };

        let result = author.insert(&self.db).await?;
        tracing::info!("Created author {} ({})", result.id, result.name);
        Ok(result)
    }

    async fn update(&self, id: i32, input: AuthorInput) -> Result<Author, DomainError> {
        let existing = AuthorEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut author: ActiveModel = existing.into();
        author.name = Set(input.name);
        author.biography = Set(input.biography);
        author.photo_url = Set(input.photo_url);

        Ok(author.update(&self.db).await?)
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = AuthorEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        tracing::info!("Deleted author {}", id);
        Ok(())
    }
}

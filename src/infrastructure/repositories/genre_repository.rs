//! SeaORM implementation of GenreRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use super::filter;
use crate::domain::search::{GenreField, SearchFilter};
use crate::domain::{DomainError, GenreRepository};
use crate::models::genre::{ActiveModel, Column, Entity as GenreEntity, Genre, GenreInput};

pub struct SeaOrmGenreRepository {
    db: DatabaseConnection,
}

impl SeaOrmGenreRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GenreRepository for SeaOrmGenreRepository {
    async fn search(&self, filter: &SearchFilter<GenreField>) -> Result<Vec<Genre>, DomainError> {
        let mut query = GenreEntity::find();
        if let Some(cond) = filter::condition(filter) {
            query = query.filter(cond);
        }

        Ok(query
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Genre>, DomainError> {
        Ok(GenreEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn create(&self, input: GenreInput) -> Result<Genre, DomainError> {
        let genre = ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            ..Default::default()
        };

        let saved = genre.insert(&self.db).await?;
        tracing::info!("Created genre {} ({})", saved.id, saved.name);
        Ok(saved)
    }

    async fn update(&self, id: i32, input: GenreInput) -> Result<Genre, DomainError> {
        let existing = GenreEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut genre: ActiveModel = existing.into();
        genre.name = Set(input.name);
        genre.description = Set(input.description);

        Ok(genre.update(&self.db).await?)
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = GenreEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        tracing::info!("Deleted genre {}", id);
        Ok(())
    }
}

//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};

use super::filter;
use crate::domain::search::{SearchFilter, UserField};
use crate::domain::{DomainError, UserRepository};
use crate::models::user::{
    ActiveModel, Column, Credentials, Entity as UserEntity, NewUser, UserDto, UserUpdate,
};

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn duplicate_user(e: sea_orm::DbErr) -> DomainError {
    if let Some(SqlErr::UniqueConstraintViolation(_)) = e.sql_err() {
        DomainError::invalid("email", "A user with that email already exists.")
    } else {
        e.into()
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn search(&self, filter: &SearchFilter<UserField>) -> Result<Vec<UserDto>, DomainError> {
        let mut query = UserEntity::find();
        if let Some(cond) = filter::condition(filter) {
            query = query.filter(cond);
        }

        let users = query.order_by_asc(Column::Id).all(&self.db).await?;
        Ok(users.into_iter().map(UserDto::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<UserDto>, DomainError> {
        let user = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(user.map(UserDto::from))
    }

    async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>, DomainError> {
        let user = UserEntity::find()
            .filter(Column::Username.eq(username))
            .one(&self.db)
            .await?;

        Ok(user.map(|u| Credentials {
            password_hash: u.password_hash.clone(),
            user: UserDto::from(u),
        }))
    }

    async fn email_taken(&self, email: &str, except: Option<i32>) -> Result<bool, DomainError> {
        let mut query = UserEntity::find().filter(
            Expr::expr(Func::lower(Expr::col(Column::Email))).eq(email.to_ascii_lowercase()),
        );
        if let Some(id) = except {
            query = query.filter(Column::Id.ne(id));
        }

        Ok(query.count(&self.db).await? > 0)
    }

    async fn create(&self, user: NewUser) -> Result<UserDto, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let model = ActiveModel {
            username: Set(user.username),
            email: Set(user.email),
            first_name: Set(user.first_name),
            password_hash: Set(user.password_hash),
            is_staff: Set(user.is_staff),
            is_superuser: Set(user.is_superuser),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let saved = model.insert(&self.db).await.map_err(duplicate_user)?;
        tracing::info!("Created user {} ({})", saved.id, saved.username);
        Ok(UserDto::from(saved))
    }

    async fn update(&self, id: i32, update: UserUpdate) -> Result<UserDto, DomainError> {
        let existing = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut model: ActiveModel = existing.into();
        model.first_name = Set(update.first_name);
        model.email = Set(update.email);
        model.is_staff = Set(update.is_staff);
        model.is_superuser = Set(update.is_superuser);
        model.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let saved = model.update(&self.db).await.map_err(duplicate_user)?;
        Ok(UserDto::from(saved))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = UserEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        tracing::info!("Deleted user {}", id);
        Ok(())
    }
}

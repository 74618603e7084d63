//! SeaORM implementation of OrderRepository

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use super::filter;
use crate::domain::search::{OrderField, SearchFilter};
use crate::domain::{DomainError, Money, OrderRepository};
use crate::models::order::{Column, Entity as OrderEntity, OrderSummary};
use crate::models::user;

pub struct SeaOrmOrderRepository {
    db: DatabaseConnection,
}

impl SeaOrmOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderRepository for SeaOrmOrderRepository {
    async fn search(
        &self,
        filter: &SearchFilter<OrderField>,
    ) -> Result<Vec<OrderSummary>, DomainError> {
        // The user join is always present, so user fields can be filtered on
        let mut query = OrderEntity::find().find_also_related(user::Entity);
        if let Some(cond) = filter::condition(filter) {
            query = query.filter(cond);
        }

        let rows = query
            .order_by_desc(Column::OrderedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(order, user)| OrderSummary {
                id: order.id,
                user_id: order.user_id,
                user_email: user.as_ref().map(|u| u.email.clone()),
                user_name: user.map(|u| u.first_name),
                total_paid: Money::from_cents(order.total_paid_cents),
                payment_state: order.payment_state,
                ordered_at: order.ordered_at,
            })
            .collect())
    }
}

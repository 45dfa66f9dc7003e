//! Read-only access to products and orders.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use super::entities::order::{self, Entity as OrderEntity};
use super::entities::order_item::{self, Entity as OrderItemEntity};
use super::entities::product::{self, Entity as ProductEntity};
use crate::domain::{Order, Product};
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn count_products(&self) -> AppResult<u64>;

    async fn count_orders(&self) -> AppResult<u64>;

    /// Products with `count_in_stock` strictly below `threshold`
    async fn count_low_stock(&self, threshold: i32) -> AppResult<u64>;

    /// Sum of `total_price` over paid orders
    async fn paid_revenue(&self) -> AppResult<Decimal>;

    /// Newest orders first, with line items
    async fn recent_orders(&self, limit: u64) -> AppResult<Vec<Order>>;

    /// Orders created at or after `since` (all orders when `None`), with line items
    async fn orders_since(&self, since: Option<DateTime<Utc>>) -> AppResult<Vec<Order>>;

    async fn products(&self) -> AppResult<Vec<Product>>;
}

pub struct CatalogStore {
    db: DatabaseConnection,
}

impl CatalogStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn with_items(&self, orders: Vec<order::Model>) -> AppResult<Vec<Order>> {
        let items = orders
            .load_many(
                OrderItemEntity::find().order_by_asc(order_item::Column::Position),
                &self.db,
            )
            .await
            .map_err(AppError::from)?;

        Ok(orders
            .into_iter()
            .zip(items)
            .map(|(order, items)| order.into_order(items))
            .collect())
    }
}

#[async_trait]
impl CatalogRepository for CatalogStore {
    async fn count_products(&self) -> AppResult<u64> {
        ProductEntity::find()
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }

    async fn count_orders(&self) -> AppResult<u64> {
        OrderEntity::find()
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }

    async fn count_low_stock(&self, threshold: i32) -> AppResult<u64> {
        ProductEntity::find()
            .filter(product::Column::CountInStock.lt(threshold))
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }

    async fn paid_revenue(&self) -> AppResult<Decimal> {
        let total: Option<Option<Decimal>> = OrderEntity::find()
            .select_only()
            .column_as(Expr::col(order::Column::TotalPrice).sum(), "total")
            .filter(order::Column::IsPaid.eq(true))
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }

    async fn recent_orders(&self, limit: u64) -> AppResult<Vec<Order>> {
        let orders = OrderEntity::find()
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        self.with_items(orders).await
    }

    async fn orders_since(&self, since: Option<DateTime<Utc>>) -> AppResult<Vec<Order>> {
        let mut query = OrderEntity::find()
            .order_by_asc(order::Column::CreatedAt)
            .order_by_asc(order::Column::Id);
        if let Some(since) = since {
            query = query.filter(order::Column::CreatedAt.gte(since));
        }

        let orders = query.all(&self.db).await.map_err(AppError::from)?;
        self.with_items(orders).await
    }

    async fn products(&self) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .order_by_asc(product::Column::CreatedAt)
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Product::from).collect())
    }
}

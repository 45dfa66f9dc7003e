//! Read-only views of products and orders.
//!
//! Products and orders are written elsewhere (checkout, catalog admin); this
//! service only reads snapshots of them for reporting and the dashboard.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub count_in_stock: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub qty: i32,
    pub price: Decimal,
}

impl OrderItem {
    /// Line revenue (`price × qty`)
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    /// May reference a user or a superuser
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub total_price: Decimal,
    pub is_paid: bool,
    pub is_delivered: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Customer fields joined onto an order for display
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CustomerRef {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    /// `None` when the referenced account no longer exists
    pub user: Option<CustomerRef>,
    pub total_price: Decimal,
    pub is_paid: bool,
    pub is_delivered: bool,
    pub created_at: DateTime<Utc>,
}

/// Admin dashboard figures
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_products: u64,
    pub total_orders: u64,
    /// Sum over paid orders only
    pub total_revenue: Decimal,
    pub recent_orders: Vec<OrderSummary>,
    pub low_stock_products: u64,
}

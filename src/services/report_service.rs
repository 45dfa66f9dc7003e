//! Report service - loads order and product snapshots and hands them to the
//! reporting aggregator.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{LOW_STOCK_THRESHOLD, RECENT_ORDER_LIMIT};
use crate::domain::reporting::{self, Report, ReportKind, ReportWindow};
use crate::domain::{CustomerRef, DashboardStats, Order, OrderSummary};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

#[async_trait]
pub trait ReportService: Send + Sync {
    /// Headline figures for the admin dashboard
    async fn dashboard_stats(&self) -> AppResult<DashboardStats>;

    /// Build one report over the orders inside `window`
    async fn report(&self, kind: ReportKind, window: ReportWindow) -> AppResult<Report>;
}

pub struct ReportManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ReportManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Join customer name/email onto orders. Orders may belong to a user or
    /// the superuser, so both stores are consulted.
    async fn summarize(&self, orders: Vec<Order>) -> AppResult<Vec<OrderSummary>> {
        let mut ids: Vec<Uuid> = orders.iter().map(|o| o.user_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let users = self.uow.users();
        let superusers = self.uow.superusers();
        let (users, superusers) =
            tokio::try_join!(users.find_many(ids.clone()), superusers.find_many(ids))?;

        let mut customers: HashMap<Uuid, CustomerRef> = users
            .into_iter()
            .map(|u| (u.id, CustomerRef { name: u.name, email: u.email }))
            .collect();
        customers.extend(
            superusers
                .into_iter()
                .map(|s| (s.id, CustomerRef { name: s.name, email: s.email })),
        );

        Ok(orders
            .into_iter()
            .map(|o| OrderSummary {
                id: o.id,
                user_id: o.user_id,
                user: customers.get(&o.user_id).cloned(),
                total_price: o.total_price,
                is_paid: o.is_paid,
                is_delivered: o.is_delivered,
                created_at: o.created_at,
            })
            .collect())
    }
}

#[async_trait]
impl<U: UnitOfWork> ReportService for ReportManager<U> {
    async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        let users = self.uow.users();
        let catalog = self.uow.catalog();

        let (total_users, total_products, total_orders, total_revenue, recent, low_stock_products) = tokio::try_join!(
            users.count(),
            catalog.count_products(),
            catalog.count_orders(),
            catalog.paid_revenue(),
            catalog.recent_orders(RECENT_ORDER_LIMIT),
            catalog.count_low_stock(LOW_STOCK_THRESHOLD),
        )?;

        Ok(DashboardStats {
            total_users,
            total_products,
            total_orders,
            total_revenue,
            recent_orders: self.summarize(recent).await?,
            low_stock_products,
        })
    }

    async fn report(&self, kind: ReportKind, window: ReportWindow) -> AppResult<Report> {
        let catalog = self.uow.catalog();
        let (orders, products) =
            tokio::try_join!(catalog.orders_since(window.start()), catalog.products())?;

        tracing::debug!(
            report = %kind,
            days = ?window.days(),
            orders = orders.len(),
            products = products.len(),
            "Building report"
        );

        Ok(reporting::generate(kind, &orders, &products, &window))
    }
}

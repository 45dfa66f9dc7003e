//! Reporting aggregator.
//!
//! Every report is a pure function of an order snapshot, a product snapshot and
//! a [`ReportWindow`]. Nothing is cached between calls.
//!
//! Breakdowns (categories, products, customers) keep entries in the order they
//! are first encountered while scanning orders, so rankings with equal values
//! are deterministic.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::catalog::{Order, Product};
use crate::config::{LOW_STOCK_THRESHOLD, TOP_CATEGORY_LIMIT};
use crate::errors::AppError;

// =============================================================================
// Report selection
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Overview,
    Sales,
    Products,
    Users,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Overview => "overview",
            ReportKind::Sales => "sales",
            ReportKind::Products => "products",
            ReportKind::Users => "users",
        }
    }
}

impl std::str::FromStr for ReportKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overview" => Ok(ReportKind::Overview),
            "sales" => Ok(ReportKind::Sales),
            "products" => Ok(ReportKind::Products),
            "users" => Ok(ReportKind::Users),
            other => Err(AppError::validation(format!(
                "Unknown report '{}'. Expected overview, sales, products or users",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trailing time window applied to orders before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    days: Option<u32>,
    now: DateTime<Utc>,
    offset: FixedOffset,
}

impl ReportWindow {
    /// Orders created within the last `days` days. `0` disables the window.
    pub fn trailing_days(days: u32, now: DateTime<Utc>) -> Self {
        Self {
            days: (days > 0).then_some(days),
            now,
            offset: Utc.fix(),
        }
    }

    pub fn all_time(now: DateTime<Utc>) -> Self {
        Self::trailing_days(0, now)
    }

    /// Offset used to decide which calendar day an order falls on.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn days(&self) -> Option<u32> {
        self.days
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Earliest included creation time, `None` when unbounded.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.days
            .map(|days| self.now - Duration::days(i64::from(days)))
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start().map_or(true, |start| at >= start)
    }

    pub fn select<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        orders.iter().filter(|o| self.contains(o.created_at)).collect()
    }
}

// =============================================================================
// Report records
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewReport {
    pub total_revenue: Decimal,
    pub total_orders: u64,
    pub average_order_value: Decimal,
    /// Percentage of orders delivered, 0 to 100
    pub completion_rate: Decimal,
    pub top_categories: Vec<CategoryRevenue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    pub date: NaiveDate,
    pub orders: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    /// One bucket per calendar day with orders, ascending
    pub daily_sales: Vec<DailySales>,
    pub total_revenue: Decimal,
    pub total_orders: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: Uuid,
    pub name: String,
    pub sold: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductReport {
    pub product_sales: Vec<ProductSales>,
    pub total_products: u64,
    pub low_stock_products: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerActivity {
    pub user_id: Uuid,
    pub orders: u64,
    pub total_spent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserReport {
    pub unique_customers: u64,
    /// Customers with more than one order in the window
    pub repeat_customers: u64,
    pub customer_data: Vec<CustomerActivity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Report {
    Overview(OverviewReport),
    Sales(SalesReport),
    Products(ProductReport),
    Users(UserReport),
}

// =============================================================================
// Aggregation
// =============================================================================

/// Accumulator that remembers first-insertion order of its keys.
struct Tally<K, V> {
    index: HashMap<K, usize>,
    entries: Vec<(K, V)>,
}

impl<K: Eq + Hash + Clone, V: Default> Tally<K, V> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn entry(&mut self, key: K) -> &mut V {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.entries.push((key.clone(), V::default()));
                self.index.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[slot].1
    }

    fn into_entries(self) -> Vec<(K, V)> {
        self.entries
    }
}

fn revenue_of(orders: &[&Order]) -> Decimal {
    orders.iter().map(|o| o.total_price).sum()
}

fn count(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

/// Revenue per category, highest first. Line items whose product is not in the
/// snapshot are skipped. Equal revenues keep first-encountered order.
pub fn top_categories(orders: &[&Order], products: &[Product], limit: usize) -> Vec<CategoryRevenue> {
    let categories: HashMap<Uuid, &str> = products
        .iter()
        .map(|p| (p.id, p.category.as_str()))
        .collect();

    let mut tally: Tally<&str, Decimal> = Tally::new();
    for item in orders.iter().flat_map(|o| o.items.iter()) {
        if let Some(category) = categories.get(&item.product_id) {
            *tally.entry(category) += item.line_total();
        }
    }

    let mut ranked = tally.into_entries();
    // sort_by is stable
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(limit)
        .map(|(category, revenue)| CategoryRevenue {
            category: category.to_string(),
            revenue,
        })
        .collect()
}

pub fn overview_report(orders: &[&Order], products: &[Product]) -> OverviewReport {
    let total_revenue = revenue_of(orders);
    let total_orders = count(orders.len());
    let delivered = count(orders.iter().filter(|o| o.is_delivered).count());

    let (average_order_value, completion_rate) = if total_orders == 0 {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        let n = Decimal::from(total_orders);
        (
            total_revenue / n,
            Decimal::from(delivered) * Decimal::ONE_HUNDRED / n,
        )
    };

    OverviewReport {
        total_revenue,
        total_orders,
        average_order_value,
        completion_rate,
        top_categories: top_categories(orders, products, TOP_CATEGORY_LIMIT),
    }
}

pub fn sales_report(orders: &[&Order], offset: FixedOffset) -> SalesReport {
    let mut buckets: BTreeMap<NaiveDate, DailySales> = BTreeMap::new();
    for order in orders {
        let date = order.created_at.with_timezone(&offset).date_naive();
        let bucket = buckets.entry(date).or_insert_with(|| DailySales {
            date,
            ..DailySales::default()
        });
        bucket.orders += 1;
        bucket.revenue += order.total_price;
    }

    let daily_sales: Vec<DailySales> = buckets.into_values().collect();
    SalesReport {
        total_revenue: daily_sales.iter().map(|d| d.revenue).sum(),
        total_orders: daily_sales.iter().map(|d| d.orders).sum(),
        daily_sales,
    }
}

pub fn product_report(orders: &[&Order], products: &[Product]) -> ProductReport {
    let mut tally: Tally<Uuid, ProductSales> = Tally::new();
    for item in orders.iter().flat_map(|o| o.items.iter()) {
        let sales = tally.entry(item.product_id);
        if sales.name.is_empty() {
            sales.product_id = item.product_id;
            sales.name = item.name.clone();
        }
        sales.sold += i64::from(item.qty);
        sales.revenue += item.line_total();
    }

    ProductReport {
        product_sales: tally.into_entries().into_iter().map(|(_, s)| s).collect(),
        total_products: count(products.len()),
        low_stock_products: count(
            products
                .iter()
                .filter(|p| p.count_in_stock < LOW_STOCK_THRESHOLD)
                .count(),
        ),
    }
}

pub fn user_report(orders: &[&Order]) -> UserReport {
    let mut tally: Tally<Uuid, CustomerActivity> = Tally::new();
    for order in orders {
        let activity = tally.entry(order.user_id);
        activity.user_id = order.user_id;
        activity.orders += 1;
        activity.total_spent += order.total_price;
    }

    let customer_data: Vec<CustomerActivity> =
        tally.into_entries().into_iter().map(|(_, a)| a).collect();
    let unique: HashSet<Uuid> = customer_data.iter().map(|c| c.user_id).collect();

    UserReport {
        unique_customers: count(unique.len()),
        repeat_customers: count(customer_data.iter().filter(|c| c.orders > 1).count()),
        customer_data,
    }
}

/// Filter `orders` through `window` and build the requested report.
pub fn generate(
    kind: ReportKind,
    orders: &[Order],
    products: &[Product],
    window: &ReportWindow,
) -> Report {
    let selected = window.select(orders);
    match kind {
        ReportKind::Overview => Report::Overview(overview_report(&selected, products)),
        ReportKind::Sales => Report::Sales(sales_report(&selected, window.offset())),
        ReportKind::Products => Report::Products(product_report(&selected, products)),
        ReportKind::Users => Report::Users(user_report(&selected)),
    }
}

// =============================================================================
// CSV export
// =============================================================================

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Overview(_) => ReportKind::Overview,
            Report::Sales(_) => ReportKind::Sales,
            Report::Products(_) => ReportKind::Products,
            Report::Users(_) => ReportKind::Users,
        }
    }

    /// Flatten into `(field, value)` pairs. Nested entries use dotted field names.
    pub fn rows(&self) -> Vec<(String, String)> {
        let mut rows = Vec::new();
        let mut push = |field: String, value: String| rows.push((field, value));

        match self {
            Report::Overview(r) => {
                push("totalRevenue".into(), r.total_revenue.to_string());
                push("totalOrders".into(), r.total_orders.to_string());
                push("averageOrderValue".into(), r.average_order_value.round_dp(2).to_string());
                push("completionRate".into(), r.completion_rate.round_dp(2).to_string());
                for c in &r.top_categories {
                    push(format!("topCategories.{}", c.category), c.revenue.to_string());
                }
            }
            Report::Sales(r) => {
                for day in &r.daily_sales {
                    push(format!("dailySales.{}.orders", day.date), day.orders.to_string());
                    push(format!("dailySales.{}.revenue", day.date), day.revenue.to_string());
                }
                push("totalRevenue".into(), r.total_revenue.to_string());
                push("totalOrders".into(), r.total_orders.to_string());
            }
            Report::Products(r) => {
                for p in &r.product_sales {
                    push(format!("productSales.{}.sold", p.product_id), p.sold.to_string());
                    push(format!("productSales.{}.revenue", p.product_id), p.revenue.to_string());
                }
                push("totalProducts".into(), r.total_products.to_string());
                push("lowStockProducts".into(), r.low_stock_products.to_string());
            }
            Report::Users(r) => {
                push("uniqueCustomers".into(), r.unique_customers.to_string());
                push("repeatCustomers".into(), r.repeat_customers.to_string());
                for c in &r.customer_data {
                    push(format!("customerData.{}.orders", c.user_id), c.orders.to_string());
                    push(format!("customerData.{}.totalSpent", c.user_id), c.total_spent.to_string());
                }
            }
        }
        rows
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::from("field,value\n");
        for (field, value) in self.rows() {
            out.push_str(&csv_field(&field));
            out.push(',');
            out.push_str(&csv_field(&value));
            out.push('\n');
        }
        out
    }

    /// Attachment name, e.g. `sales-report-2024-05-01.csv`
    pub fn csv_filename(&self, on: NaiveDate) -> String {
        format!("{}-report-{}.csv", self.kind(), on)
    }
}

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::OrderItem;
    use chrono::TimeZone;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn order(user_id: Uuid, total: i64, delivered: bool, created_at: DateTime<Utc>) -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id,
            items: Vec::new(),
            total_price: dec(total),
            is_paid: true,
            is_delivered: delivered,
            paid_at: None,
            delivered_at: None,
            created_at,
        }
    }

    fn item(product: &Product, qty: i32) -> OrderItem {
        OrderItem {
            product_id: product.id,
            name: product.name.clone(),
            qty,
            price: product.price,
        }
    }

    fn product(name: &str, category: &str, price: i64, stock: i32) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            price: dec(price),
            count_in_stock: stock,
        }
    }

    #[test]
    fn test_overview_empty_has_zero_rates() {
        let report = overview_report(&[], &[]);
        assert_eq!(report.total_orders, 0);
        assert_eq!(report.total_revenue, Decimal::ZERO);
        assert_eq!(report.average_order_value, Decimal::ZERO);
        assert_eq!(report.completion_rate, Decimal::ZERO);
        assert!(report.top_categories.is_empty());
    }

    #[test]
    fn test_overview_totals() {
        let user = Uuid::new_v4();
        let orders = [
            order(user, 100, true, at(1, 10)),
            order(user, 50, false, at(1, 11)),
        ];
        let selected: Vec<&Order> = orders.iter().collect();
        let report = overview_report(&selected, &[]);

        assert_eq!(report.total_revenue, dec(150));
        assert_eq!(report.total_orders, 2);
        assert_eq!(report.average_order_value, dec(75));
        assert_eq!(report.completion_rate, dec(50));
    }

    #[test]
    fn test_top_categories_ranked_and_truncated() {
        let products: Vec<Product> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .enumerate()
            .map(|(i, c)| product(c, c, (i as i64 + 1) * 10, 50))
            .collect();

        let mut o = order(Uuid::new_v4(), 0, false, at(1, 0));
        o.items = products.iter().map(|p| item(p, 1)).collect();
        let orders = [o];
        let selected: Vec<&Order> = orders.iter().collect();

        let ranked = top_categories(&selected, &products, TOP_CATEGORY_LIMIT);
        let names: Vec<&str> = ranked.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["f", "e", "d", "c", "b"]);
        assert_eq!(ranked[0].revenue, dec(60));
    }

    #[test]
    fn test_top_categories_ties_keep_first_encountered() {
        let books = product("novel", "books", 20, 5);
        let toys = product("kite", "toys", 10, 5);
        let games = product("chess", "games", 40, 5);

        let mut first = order(Uuid::new_v4(), 0, false, at(1, 0));
        first.items = vec![item(&toys, 2), item(&books, 1)];
        let mut second = order(Uuid::new_v4(), 0, false, at(2, 0));
        second.items = vec![item(&games, 1)];
        let orders = [first, second];
        let selected: Vec<&Order> = orders.iter().collect();

        let ranked = top_categories(&selected, &[books, toys, games], 5);
        let names: Vec<&str> = ranked.iter().map(|c| c.category.as_str()).collect();
        // games=40 first, then toys and books tie at 20 in encounter order
        assert_eq!(names, vec!["games", "toys", "books"]);
    }

    #[test]
    fn test_unknown_products_skipped_for_categories() {
        let known = product("lamp", "home", 15, 3);
        let ghost = product("ghost", "gone", 99, 0);
        let mut o = order(Uuid::new_v4(), 0, false, at(1, 0));
        o.items = vec![item(&known, 2), item(&ghost, 1)];
        let orders = [o];
        let selected: Vec<&Order> = orders.iter().collect();

        let ranked = top_categories(&selected, &[known], 5);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].revenue, dec(30));
    }

    #[test]
    fn test_window_filters_by_creation_time() {
        let now = at(10, 12);
        let user = Uuid::new_v4();
        let orders = [
            order(user, 10, false, at(2, 12)),
            order(user, 20, false, at(3, 12)),
            order(user, 30, false, at(9, 0)),
        ];

        let week = ReportWindow::trailing_days(7, now);
        let selected = week.select(&orders);
        assert_eq!(selected.len(), 2);
        assert_eq!(week.start(), Some(at(3, 12)));

        let all = ReportWindow::all_time(now);
        assert_eq!(all.select(&orders).len(), 3);
        assert_eq!(all.days(), None);
    }

    #[test]
    fn test_sales_grouped_by_day_ascending() {
        let user = Uuid::new_v4();
        let orders = [
            order(user, 30, false, at(3, 9)),
            order(user, 10, false, at(1, 9)),
            order(user, 15, false, at(1, 18)),
        ];
        let selected: Vec<&Order> = orders.iter().collect();
        let report = sales_report(&selected, Utc.fix());

        assert_eq!(report.daily_sales.len(), 2);
        assert_eq!(report.daily_sales[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(report.daily_sales[0].orders, 2);
        assert_eq!(report.daily_sales[0].revenue, dec(25));
        assert_eq!(report.total_revenue, dec(55));
        assert_eq!(report.total_orders, 3);
    }

    #[test]
    fn test_sales_day_follows_offset() {
        let orders = [order(Uuid::new_v4(), 10, false, at(1, 23))];
        let selected: Vec<&Order> = orders.iter().collect();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        let report = sales_report(&selected, plus_two);
        assert_eq!(report.daily_sales[0].date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    }

    #[test]
    fn test_product_report() {
        let mug = product("mug", "kitchen", 8, 3);
        let pan = product("pan", "kitchen", 30, 40);
        let mut first = order(Uuid::new_v4(), 0, false, at(1, 0));
        first.items = vec![item(&mug, 2), item(&pan, 1)];
        let mut second = order(Uuid::new_v4(), 0, false, at(2, 0));
        second.items = vec![item(&mug, 3)];
        let orders = [first, second];
        let selected: Vec<&Order> = orders.iter().collect();

        let report = product_report(&selected, &[mug.clone(), pan.clone()]);
        assert_eq!(report.total_products, 2);
        assert_eq!(report.low_stock_products, 1);
        assert_eq!(report.product_sales[0].product_id, mug.id);
        assert_eq!(report.product_sales[0].sold, 5);
        assert_eq!(report.product_sales[0].revenue, dec(40));
        assert_eq!(report.product_sales[1].product_id, pan.id);
    }

    #[test]
    fn test_low_stock_threshold_is_exclusive() {
        let report = product_report(
            &[],
            &[product("a", "x", 1, 9), product("b", "x", 1, 10)],
        );
        assert_eq!(report.low_stock_products, 1);
    }

    #[test]
    fn test_user_report() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let orders = [
            order(alice, 10, false, at(1, 0)),
            order(bob, 5, false, at(1, 1)),
            order(alice, 20, true, at(2, 0)),
        ];
        let selected: Vec<&Order> = orders.iter().collect();
        let report = user_report(&selected);

        assert_eq!(report.unique_customers, 2);
        assert_eq!(report.repeat_customers, 1);
        assert_eq!(report.customer_data[0].user_id, alice);
        assert_eq!(report.customer_data[0].orders, 2);
        assert_eq!(report.customer_data[0].total_spent, dec(30));
    }

    #[test]
    fn test_generate_applies_window() {
        let now = at(20, 0);
        let user = Uuid::new_v4();
        let orders = [order(user, 100, true, at(19, 0)), order(user, 999, true, at(1, 0))];
        let report = generate(
            ReportKind::Overview,
            &orders,
            &[],
            &ReportWindow::trailing_days(7, now),
        );
        match report {
            Report::Overview(r) => assert_eq!(r.total_revenue, dec(100)),
            other => panic!("unexpected report {:?}", other),
        }
    }

    #[test]
    fn test_report_json_is_tagged() {
        let report = Report::Users(user_report(&[]));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["type"], "users");
        assert_eq!(json["uniqueCustomers"], 0);
    }

    #[test]
    fn test_csv_export() {
        let user = Uuid::new_v4();
        let orders = [order(user, 100, true, at(1, 0)), order(user, 50, false, at(1, 0))];
        let selected: Vec<&Order> = orders.iter().collect();
        let report = Report::Overview(overview_report(&selected, &[]));

        let csv = report.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "field,value");
        assert_eq!(lines[1], "totalRevenue,150");
        assert_eq!(lines[2], "totalOrders,2");
        assert_eq!(lines[3], "averageOrderValue,75");
        assert_eq!(lines[4], "completionRate,50");

        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(report.csv_filename(day), "overview-report-2024-05-01.csv");
    }

    #[test]
    fn test_csv_quotes_special_characters() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_report_kind_parse() {
        assert_eq!("sales".parse::<ReportKind>().unwrap(), ReportKind::Sales);
        assert!("revenue".parse::<ReportKind>().is_err());
    }
}

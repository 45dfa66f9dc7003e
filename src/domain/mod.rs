//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.
//!
//! Contains: identities, roles, credentials, authorization decisions,
//! catalog snapshots and the reporting aggregator.

pub mod access;
pub mod catalog;
pub mod password;
pub mod reporting;
pub mod role;
pub mod superuser;
pub mod user;

pub use access::{Decision, DenyReason, Principal};
pub use catalog::{CustomerRef, DashboardStats, Order, OrderItem, OrderSummary, Product};
pub use password::{validate_plain, HashPolicy, Password};
pub use reporting::{Report, ReportKind, ReportWindow};
pub use role::Role;
pub use superuser::{NewSuperUser, SuperUser, SuperUserChanges, SuperUserProfile, SuperUserStatus};
pub use user::{normalize_email, NewUser, User, UserChanges, UserResponse};

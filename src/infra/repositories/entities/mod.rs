//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod order;
pub mod order_item;
pub mod product;
pub mod superuser;
pub mod user;

//! Order database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Order, OrderItem};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_price: Decimal,
    pub is_paid: bool,
    pub is_delivered: bool,
    pub paid_at: Option<DateTimeUtc>,
    pub delivered_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Assemble the domain order from this row and its line items, in
    /// placement order whatever order the rows arrived in.
    pub fn into_order(self, mut items: Vec<super::order_item::Model>) -> Order {
        items.sort_by_key(|item| item.position);

        Order {
            id: self.id,
            user_id: self.user_id,
            items: items.into_iter().map(OrderItem::from).collect(),
            total_price: self.total_price,
            is_paid: self.is_paid,
            is_delivered: self.is_delivered,
            paid_at: self.paid_at,
            delivered_at: self.delivered_at,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn row(order_id: Uuid, position: i32, name: &str) -> super::super::order_item::Model {
        super::super::order_item::Model {
            id: Uuid::new_v4(),
            order_id,
            position,
            product_id: Uuid::new_v4(),
            name: name.to_string(),
            qty: 1,
            price: Decimal::new(10, 0),
        }
    }

    #[test]
    fn test_into_order_keeps_placement_order() {
        let id = Uuid::new_v4();
        let model = Model {
            id,
            user_id: Uuid::new_v4(),
            total_price: Decimal::new(30, 0),
            is_paid: true,
            is_delivered: false,
            paid_at: None,
            delivered_at: None,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };

        let order = model.into_order(vec![row(id, 2, "third"), row(id, 0, "first"), row(id, 1, "second")]);

        let names: Vec<&str> = order.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
        assert_eq!(order.id, id);
    }
}

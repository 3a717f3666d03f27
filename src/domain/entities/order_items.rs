use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::order_items;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = order_items)]
pub struct OrderItemEntity {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub menu_id: Uuid,
    pub quantity: i32,
    pub subtotal: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = order_items)]
pub struct InsertOrderItemEntity {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub menu_id: Uuid,
    pub quantity: i32,
    pub subtotal: i64,
}

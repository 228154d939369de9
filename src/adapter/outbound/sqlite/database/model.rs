//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::cart_lines;

/// Database row for a cart line.
///
/// Prices are stored as decimal text and timestamps as RFC 3339 text.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = cart_lines)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CartLineRow {
    pub product_id: i64,
    pub title: String,
    pub price: String,
    pub image: String,
    pub quantity: i32,
    pub added_at: String,
}

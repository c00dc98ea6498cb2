use diesel::prelude::*;
use diesel::PgConnection;

use crate::domain::errors::DomainError;
use crate::domain::stock::{StockChangeView, StockMovement};
use crate::schema::stock_changes;

use super::models::{NewStockChangeRow, StockChangeRow};

/// Appends one `stock_changes` row per movement. Rows are never updated.
pub fn record(conn: &mut PgConnection, movements: &[StockMovement]) -> Result<usize, DomainError> {
    if movements.is_empty() {
        return Ok(0);
    }

    let rows: Vec<NewStockChangeRow> = movements
        .iter()
        .map(|m| NewStockChangeRow {
            pharmacy_drug_id: m.listing_id,
            final_stock: m.final_stock,
            delta: m.delta,
            reason: m.reason.as_str().to_string(),
        })
        .collect();

    let inserted = diesel::insert_into(stock_changes::table)
        .values(&rows)
        .execute(conn)?;
    Ok(inserted)
}

/// All recorded movements of a listing, oldest first.
pub fn history(
    conn: &mut PgConnection,
    listing_id: i64,
) -> Result<Vec<StockChangeView>, DomainError> {
    let rows = stock_changes::table
        .filter(stock_changes::pharmacy_drug_id.eq(listing_id))
        .order(stock_changes::id.asc())
        .select(StockChangeRow::as_select())
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|r| StockChangeView {
            id: r.id,
            listing_id: r.pharmacy_drug_id,
            final_stock: r.final_stock,
            delta: r.delta,
            reason: r.reason,
            created_at: r.created_at,
        })
        .collect())
}

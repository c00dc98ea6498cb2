//! Row-locked reads and writes of `pharmacy_drugs.stock`.
//!
//! Every function here must run inside an open transaction. Listings are
//! always locked in ascending id order so that checkout, cancellation and
//! manager adjustments cannot deadlock against each other.

use std::collections::BTreeMap;

use chrono::Utc;
use diesel::prelude::*;
use diesel::PgConnection;

use crate::domain::errors::DomainError;
use crate::domain::stock::ListingState;
use crate::schema::pharmacy_drugs;

use super::models::ListingRow;

impl From<ListingRow> for ListingState {
    fn from(row: ListingRow) -> Self {
        ListingState {
            listing_id: row.id,
            pharmacy_id: row.pharmacy_id,
            drug_id: row.drug_id,
            price: row.price,
            stock: row.stock,
        }
    }
}

/// `SELECT … FOR UPDATE` on the given listings, ascending by id.
pub fn lock_listings(
    conn: &mut PgConnection,
    listing_ids: &[i64],
) -> Result<Vec<ListingState>, DomainError> {
    let mut ids = listing_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let rows = pharmacy_drugs::table
        .filter(pharmacy_drugs::id.eq_any(&ids))
        .order(pharmacy_drugs::id.asc())
        .select(ListingRow::as_select())
        .for_update()
        .load(conn)?;

    if rows.len() != ids.len() {
        let missing = ids
            .iter()
            .find(|id| !rows.iter().any(|r| r.id == **id))
            .copied()
            .unwrap_or_default();
        return Err(DomainError::NotFound(format!(
            "Pharmacy drug listing {}",
            missing
        )));
    }

    Ok(rows.into_iter().map(ListingState::from).collect())
}

/// Adds `delta` to a listing already locked by this transaction and returns
/// the resulting stock.
pub fn apply_delta(
    conn: &mut PgConnection,
    listing_id: i64,
    delta: i32,
) -> Result<i32, DomainError> {
    let stock = diesel::update(pharmacy_drugs::table.find(listing_id))
        .set((
            pharmacy_drugs::stock.eq(pharmacy_drugs::stock + delta),
            pharmacy_drugs::updated_at.eq(Utc::now()),
        ))
        .returning(pharmacy_drugs::stock)
        .get_result(conn)?;
    Ok(stock)
}

/// Locks every listing in `demands` and subtracts the requested quantity.
///
/// The returned states carry the post-decrement stock, which is negative for
/// oversold listings.
pub fn lock_and_decrement(
    conn: &mut PgConnection,
    demands: &BTreeMap<i64, i32>,
) -> Result<Vec<ListingState>, DomainError> {
    let ids: Vec<i64> = demands.keys().copied().collect();
    let mut listings = lock_listings(conn, &ids)?;

    for listing in &mut listings {
        let quantity = demands.get(&listing.listing_id).copied().unwrap_or_default();
        listing.stock = apply_delta(conn, listing.listing_id, -quantity)?;
    }

    Ok(listings)
}

/// Locks every listing in `credits` and adds the quantity back.
pub fn lock_and_credit(
    conn: &mut PgConnection,
    credits: &BTreeMap<i64, i32>,
) -> Result<Vec<ListingState>, DomainError> {
    let ids: Vec<i64> = credits.keys().copied().collect();
    let mut listings = lock_listings(conn, &ids)?;

    for listing in &mut listings {
        let quantity = credits.get(&listing.listing_id).copied().unwrap_or_default();
        listing.stock = apply_delta(conn, listing.listing_id, quantity)?;
    }

    Ok(listings)
}

/// Overwrites a listing's stock under its row lock. Returns the previous and
/// the new state.
pub fn set_stock(
    conn: &mut PgConnection,
    listing_id: i64,
    stock: i32,
) -> Result<(ListingState, ListingState), DomainError> {
    let previous = lock_listings(conn, &[listing_id])?
        .pop()
        .ok_or_else(|| DomainError::NotFound(format!("Pharmacy drug listing {}", listing_id)))?;

    let mut current = previous.clone();
    current.stock = apply_delta(conn, listing_id, stock - previous.stock)?;
    Ok((previous, current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::test_support::{setup_db, Fixture};

    #[tokio::test]
    async fn decrement_returns_negative_stock_for_oversold_listing() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("connection");
        let fx = Fixture::new(&mut conn);
        let a = fx.listing(&mut conn, fx.pharmacy_a, 10);
        let b = fx.listing(&mut conn, fx.pharmacy_b, 4);

        let states = conn
            .transaction::<_, DomainError, _>(|conn| {
                lock_and_decrement(conn, &BTreeMap::from([(b, 3), (a, 12)]))
            })
            .expect("decrement failed");

        assert_eq!(states.len(), 2);
        assert!(states[0].listing_id < states[1].listing_id);
        let by_id: BTreeMap<i64, i32> = states.iter().map(|s| (s.listing_id, s.stock)).collect();
        assert_eq!(by_id[&a], -2);
        assert_eq!(by_id[&b], 1);
    }

    #[tokio::test]
    async fn missing_listing_is_not_found() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("connection");

        let err = conn
            .transaction::<_, DomainError, _>(|conn| lock_listings(conn, &[9_999]))
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound(msg) if msg.contains("9999")));
    }

    #[tokio::test]
    async fn set_stock_reports_previous_value() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("connection");
        let fx = Fixture::new(&mut conn);
        let a = fx.listing(&mut conn, fx.pharmacy_a, 10);

        let (previous, current) = conn
            .transaction::<_, DomainError, _>(|conn| set_stock(conn, a, 4))
            .expect("set stock failed");

        assert_eq!(previous.stock, 10);
        assert_eq!(current.stock, 4);
        assert_eq!(Fixture::stock_of(&mut conn, a), 4);
    }
}

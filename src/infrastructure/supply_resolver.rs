//! Finds sibling listings able to cover an oversold listing.
//!
//! A sibling listing sells the same drug at another pharmacy owned by the
//! same manager, lies within the configured radius and has stock left. This
//! query is the only place that rule is expressed.

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Integer};
use diesel::PgConnection;

use crate::domain::allocation::{Candidate, MAX_ALTERNATIVES};
use crate::domain::errors::DomainError;
use crate::domain::stock::ListingState;

/// Great-circle distance in km between `origin` and `p`, earth radius 6371 km.
const DISTANCE_KM: &str = "6371.0 * 2.0 * asin(least(1.0, sqrt(\
    power(sin(radians(p.latitude - origin.latitude) / 2.0), 2) + \
    cos(radians(origin.latitude)) * cos(radians(p.latitude)) * \
    power(sin(radians(p.longitude - origin.longitude) / 2.0), 2))))";

#[derive(Debug, QueryableByName)]
struct CandidateRow {
    #[diesel(sql_type = BigInt)]
    listing_id: i64,
    #[diesel(sql_type = BigInt)]
    pharmacy_id: i64,
    #[diesel(sql_type = Integer)]
    stock: i32,
    #[diesel(sql_type = Double)]
    distance_km: f64,
}

fn sibling_listings_sql() -> String {
    format!(
        "SELECT pd.id AS listing_id, pd.pharmacy_id, pd.stock, {distance} AS distance_km \
         FROM pharmacy_drugs pd \
         JOIN pharmacies p ON p.id = pd.pharmacy_id \
         JOIN pharmacies origin ON origin.id = $2 \
         WHERE pd.drug_id = $1 \
           AND pd.pharmacy_id <> origin.id \
           AND p.manager_id = origin.manager_id \
           AND pd.stock > 0 \
           AND {distance} <= $3 \
         ORDER BY distance_km ASC, pd.id ASC \
         LIMIT $4 \
         FOR UPDATE OF pd",
        distance = DISTANCE_KM
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupplyPolicy {
    pub radius_km: f64,
}

impl Default for SupplyPolicy {
    fn default() -> Self {
        Self { radius_km: 25.0 }
    }
}

/// Locks and returns at most [`MAX_ALTERNATIVES`] sibling listings for
/// `origin`, nearest first.
pub fn find_alternatives(
    conn: &mut PgConnection,
    origin: &ListingState,
    policy: &SupplyPolicy,
) -> Result<Vec<Candidate>, DomainError> {
    let rows: Vec<CandidateRow> = diesel::sql_query(sibling_listings_sql())
        .bind::<BigInt, _>(origin.drug_id)
        .bind::<BigInt, _>(origin.pharmacy_id)
        .bind::<Double, _>(policy.radius_km)
        .bind::<BigInt, _>(MAX_ALTERNATIVES as i64)
        .load(conn)?;

    log::debug!(
        "listing {} has {} sibling candidate(s) within {} km",
        origin.listing_id,
        rows.len(),
        policy.radius_km
    );

    Ok(rows
        .into_iter()
        .map(|r| Candidate {
            listing_id: r.listing_id,
            pharmacy_id: r.pharmacy_id,
            stock: r.stock,
            distance_km: r.distance_km,
        })
        .collect())
}

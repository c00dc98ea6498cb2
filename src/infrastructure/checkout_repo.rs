use std::collections::BTreeMap;

use chrono::Utc;
use diesel::prelude::*;

use crate::config::CheckoutSettings;
use crate::db::DbPool;
use crate::domain::checkout::{CheckoutRequest, LineOrigin};
use crate::domain::errors::DomainError;
use crate::domain::order::{OrderStatus, OrderView};
use crate::domain::ports::CheckoutRepository;
use crate::domain::stock::{StockChangeReason, StockMovement};
use crate::schema::{order_pharmacies, orders};

use super::coordinator::{self, set_lock_timeout};
use super::line_sources::{CartLines, LineSource, PrescriptionLines};
use super::{audit_ledger, order_assembler, stock_ledger};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselCheckoutRepository {
    pool: DbPool,
    settings: CheckoutSettings,
}

impl DieselCheckoutRepository {
    pub fn new(pool: DbPool, settings: CheckoutSettings) -> Self {
        Self { pool, settings }
    }
}

impl CheckoutRepository for DieselCheckoutRepository {
    fn checkout(&self, origin: LineOrigin, request: CheckoutRequest) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;

        let source: Box<dyn LineSource> = match origin {
            LineOrigin::Cart => Box::new(CartLines {
                user_id: request.user_id,
            }),
            LineOrigin::Prescription { prescription_id } => Box::new(PrescriptionLines {
                prescription_id,
                user_id: request.user_id,
            }),
        };

        coordinator::checkout(&mut conn, source.as_ref(), &request, &self.settings)
    }

    fn find_order(&self, id: i64) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;
        order_assembler::load_order(&mut conn, id)
    }

    fn cancel_order(&self, id: i64) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            set_lock_timeout(conn, &self.settings)?;

            // Lock the order row so two cancellations cannot both credit stock.
            let cancelled_at: Option<Option<chrono::DateTime<Utc>>> = orders::table
                .find(id)
                .select(orders::cancelled_at)
                .for_update()
                .first(conn)
                .optional()?;
            match cancelled_at {
                None => return Err(DomainError::NotFound(format!("Order {}", id))),
                Some(Some(_)) => {
                    return Err(DomainError::InvalidInput(format!(
                        "order {} is already cancelled",
                        id
                    )))
                }
                Some(None) => {}
            }

            let order = order_assembler::load_order(conn, id)?
                .ok_or_else(|| DomainError::NotFound(format!("Order {}", id)))?;
            if let Some(p) = order.pharmacies.iter().find(|p| !p.status.is_cancellable()) {
                return Err(DomainError::InvalidInput(format!(
                    "order {} has a sub-order in status {}",
                    id,
                    p.status.as_str()
                )));
            }

            let mut credits: BTreeMap<i64, i32> = BTreeMap::new();
            for item in order.pharmacies.iter().flat_map(|p| p.items.iter()) {
                *credits.entry(item.listing_id).or_insert(0) += item.quantity;
            }

            let listings = stock_ledger::lock_and_credit(conn, &credits)?;
            let movements: Vec<StockMovement> = listings
                .iter()
                .map(|l| StockMovement {
                    listing_id: l.listing_id,
                    final_stock: l.stock,
                    delta: credits.get(&l.listing_id).copied().unwrap_or_default(),
                    reason: StockChangeReason::OrderCancellation,
                })
                .collect();
            audit_ledger::record(conn, &movements)?;

            let now = Utc::now();
            diesel::update(order_pharmacies::table.filter(order_pharmacies::order_id.eq(id)))
                .set((
                    order_pharmacies::status.eq(OrderStatus::Cancelled.as_str()),
                    order_pharmacies::updated_at.eq(now),
                ))
                .execute(conn)?;
            diesel::update(orders::table.find(id))
                .set((
                    orders::cancelled_at.eq(Some(now)),
                    orders::updated_at.eq(now),
                ))
                .execute(conn)?;

            log::info!("order {} cancelled, {} listing(s) credited", id, listings.len());

            order_assembler::load_order(conn, id)?
                .ok_or_else(|| DomainError::NotFound(format!("Order {}", id)))
        })
    }
}

//! Turns a set of purchasable lines into a committed order in one
//! transaction, borrowing stock from sibling pharmacies where a listing is
//! oversold.
//!
//! Phases: `Started → LinesLocked → Reconciled → Committed`, with `Aborted`
//! reachable from every phase. Any error returned from inside the
//! transaction closure rolls back every write made so far.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use diesel::prelude::*;
use diesel::PgConnection;

use crate::config::CheckoutSettings;
use crate::domain::allocation::allocate;
use crate::domain::checkout::{CheckoutLine, CheckoutPhase, CheckoutRequest};
use crate::domain::errors::DomainError;
use crate::domain::stock::{ListingState, StockChangeReason, StockMovement};
use crate::schema::stock_mutation_requests;

use super::line_sources::LineSource;
use super::models::NewStockMutationRequestRow;
use super::supply_resolver::{find_alternatives, SupplyPolicy};
use super::{audit_ledger, order_assembler, stock_ledger};

/// Status given to mutation requests created while covering a checkout.
pub const AUTO_MUTATION_STATUS: &str = "approved";

#[derive(Debug, Default)]
struct Reconciliation {
    movements: Vec<StockMovement>,
    mutations: Vec<NewStockMutationRequestRow>,
    failed_line_ids: BTreeSet<i64>,
}

pub fn set_lock_timeout(conn: &mut PgConnection, settings: &CheckoutSettings) -> QueryResult<()> {
    diesel::sql_query(format!("SET LOCAL lock_timeout = '{}ms'", settings.lock_timeout_ms))
        .execute(conn)?;
    Ok(())
}

/// Runs a full checkout. Returns the new order id, or leaves the database
/// exactly as it was.
pub fn checkout(
    conn: &mut PgConnection,
    source: &dyn LineSource,
    request: &CheckoutRequest,
    settings: &CheckoutSettings,
) -> Result<i64, DomainError> {
    log::debug!("checkout for user {} {}", request.user_id, CheckoutPhase::Started);
    if let Err(e) = request.validate() {
        log::debug!("checkout for user {} {}: {}", request.user_id, CheckoutPhase::Aborted, e);
        return Err(e);
    }

    let result = conn.transaction::<_, DomainError, _>(|conn| {
        set_lock_timeout(conn, settings)?;

        let line_ids = request.line_ids();
        let lines = source.load(conn, &line_ids)?;
        check_groups(request, &lines)?;

        let demands = demands_by_listing(&lines)?;
        let mut listings = stock_ledger::lock_and_decrement(conn, &demands)?;
        audit_ledger::record(conn, &purchase_movements(&listings, &demands))?;
        log::debug!(
            "checkout for user {} {}: {} listing(s)",
            request.user_id,
            CheckoutPhase::LinesLocked,
            listings.len()
        );

        let policy = SupplyPolicy {
            radius_km: settings.sibling_radius_km,
        };
        let reconciliation = reconcile(conn, &mut listings, &lines, &policy)?;
        if !reconciliation.failed_line_ids.is_empty() {
            return Err(DomainError::InsufficientStock {
                line_ids: reconciliation.failed_line_ids.into_iter().collect(),
            });
        }
        audit_ledger::record(conn, &reconciliation.movements)?;
        if !reconciliation.mutations.is_empty() {
            diesel::insert_into(stock_mutation_requests::table)
                .values(&reconciliation.mutations)
                .execute(conn)?;
        }
        log::debug!(
            "checkout for user {} {}: {} mutation(s)",
            request.user_id,
            CheckoutPhase::Reconciled,
            reconciliation.mutations.len()
        );

        let lines_by_id: HashMap<i64, CheckoutLine> =
            lines.into_iter().map(|l| (l.line_id, l)).collect();
        let listings_by_id: HashMap<i64, ListingState> =
            listings.into_iter().map(|l| (l.listing_id, l)).collect();
        let order_id = order_assembler::assemble(conn, request, &lines_by_id, &listings_by_id)?;

        source.consume(conn, &line_ids, order_id)?;
        Ok(order_id)
    });

    match &result {
        Ok(order_id) => log::info!(
            "checkout for user {} {}: order {}",
            request.user_id,
            CheckoutPhase::Committed,
            order_id
        ),
        Err(e) => log::warn!(
            "checkout for user {} {}: {}",
            request.user_id,
            CheckoutPhase::Aborted,
            e
        ),
    }
    result
}

/// Every line must be sold by the pharmacy of the group it was submitted in.
fn check_groups(request: &CheckoutRequest, lines: &[CheckoutLine]) -> Result<(), DomainError> {
    let pharmacy_of: HashMap<i64, i64> = lines.iter().map(|l| (l.line_id, l.pharmacy_id)).collect();
    for group in &request.groups {
        for line_id in &group.line_ids {
            match pharmacy_of.get(line_id) {
                Some(pharmacy_id) if *pharmacy_id == group.pharmacy_id => {}
                Some(pharmacy_id) => {
                    return Err(DomainError::InvalidInput(format!(
                        "line {} belongs to pharmacy {}, not {}",
                        line_id, pharmacy_id, group.pharmacy_id
                    )))
                }
                None => return Err(DomainError::NotFound(format!("Line {}", line_id))),
            }
        }
    }
    Ok(())
}

/// Total quantity requested per listing, keyed in lock order.
fn demands_by_listing(lines: &[CheckoutLine]) -> Result<BTreeMap<i64, i32>, DomainError> {
    let mut demands = BTreeMap::new();
    for line in lines {
        if line.quantity <= 0 {
            return Err(DomainError::InvalidInput(format!(
                "line {} has non-positive quantity {}",
                line.line_id, line.quantity
            )));
        }
        let total = demands.entry(line.listing_id).or_insert(0i32);
        *total = total.checked_add(line.quantity).ok_or_else(|| {
            DomainError::InvalidInput(format!(
                "total quantity for listing {} is too large",
                line.listing_id
            ))
        })?;
    }
    Ok(demands)
}

fn purchase_movements(
    listings: &[ListingState],
    demands: &BTreeMap<i64, i32>,
) -> Vec<StockMovement> {
    listings
        .iter()
        .map(|l| StockMovement {
            listing_id: l.listing_id,
            final_stock: l.stock,
            delta: -demands.get(&l.listing_id).copied().unwrap_or_default(),
            reason: StockChangeReason::Purchase,
        })
        .collect()
}

/// Covers every oversold listing from its nearest siblings.
///
/// All oversold listings are processed even after one fails, so the failure
/// set names every uncovered line.
fn reconcile(
    conn: &mut PgConnection,
    listings: &mut [ListingState],
    lines: &[CheckoutLine],
    policy: &SupplyPolicy,
) -> Result<Reconciliation, DomainError> {
    let mut out = Reconciliation::default();

    for origin in listings.iter_mut().filter(|l| l.is_oversold()) {
        let mut candidates = find_alternatives(conn, origin, policy)?;
        let allocation = allocate(origin.deficit(), &mut candidates);

        for mutation in &allocation.mutations {
            let source_stock =
                stock_ledger::apply_delta(conn, mutation.source_listing_id, -mutation.amount)?;
            origin.stock = stock_ledger::apply_delta(conn, origin.listing_id, mutation.amount)?;

            out.movements.push(StockMovement {
                listing_id: mutation.source_listing_id,
                final_stock: source_stock,
                delta: -mutation.amount,
                reason: StockChangeReason::InterPharmacyTransfer,
            });
            out.movements.push(StockMovement {
                listing_id: origin.listing_id,
                final_stock: origin.stock,
                delta: mutation.amount,
                reason: StockChangeReason::InterPharmacyTransfer,
            });
            out.mutations.push(NewStockMutationRequestRow {
                source_pharmacy_id: mutation.source_pharmacy_id,
                target_pharmacy_id: origin.pharmacy_id,
                drug_id: origin.drug_id,
                quantity: mutation.amount,
                status: AUTO_MUTATION_STATUS.to_string(),
            });
        }

        if !allocation.is_sufficient() {
            log::debug!(
                "listing {} short by {} after {} mutation(s)",
                origin.listing_id,
                allocation.residual_deficit,
                allocation.mutations.len()
            );
            out.failed_line_ids.extend(
                lines
                    .iter()
                    .filter(|l| l.listing_id == origin.listing_id)
                    .map(|l| l.line_id),
            );
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(line_id: i64, listing_id: i64, pharmacy_id: i64, quantity: i32) -> CheckoutLine {
        CheckoutLine {
            line_id,
            listing_id,
            pharmacy_id,
            quantity,
        }
    }

    #[test]
    fn demands_sum_lines_sharing_a_listing() {
        let demands =
            demands_by_listing(&[line(1, 20, 1, 2), line(2, 10, 1, 1), line(3, 20, 1, 4)])
                .expect("valid lines");

        assert_eq!(demands.into_iter().collect::<Vec<_>>(), vec![(10, 1), (20, 6)]);
    }

    #[test]
    fn zero_quantity_line_is_rejected() {
        let err = demands_by_listing(&[line(1, 20, 1, 0)]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn demand_sum_overflow_is_rejected() {
        let err = demands_by_listing(&[line(1, 20, 1, i32::MAX), line(2, 20, 1, 1)]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(msg) if msg.contains("listing 20")));
    }

    #[test]
    fn purchase_movements_carry_negative_delta_and_post_balance() {
        let listings = vec![ListingState {
            listing_id: 10,
            pharmacy_id: 1,
            drug_id: 1,
            price: bigdecimal::BigDecimal::from(1),
            stock: -2,
        }];
        let demands = BTreeMap::from([(10, 12)]);

        let movements = purchase_movements(&listings, &demands);

        assert_eq!(
            movements,
            vec![StockMovement {
                listing_id: 10,
                final_stock: -2,
                delta: -12,
                reason: StockChangeReason::Purchase,
            }]
        );
    }
}

use diesel::prelude::*;

use crate::config::CheckoutSettings;
use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::InventoryRepository;
use crate::domain::stock::{ListingStock, StockChangeReason, StockChangeView, StockMovement};

use super::coordinator::set_lock_timeout;
use super::{audit_ledger, stock_ledger};

/// Manager-facing stock operations. Writes go through the same row locks as
/// checkout.
pub struct DieselInventoryRepository {
    pool: DbPool,
    settings: CheckoutSettings,
}

impl DieselInventoryRepository {
    pub fn new(pool: DbPool, settings: CheckoutSettings) -> Self {
        Self { pool, settings }
    }
}

impl InventoryRepository for DieselInventoryRepository {
    fn adjust_stock(&self, listing_id: i64, stock: i32) -> Result<ListingStock, DomainError> {
        if stock < 0 {
            return Err(DomainError::InvalidInput(format!(
                "stock must not be negative, got {}",
                stock
            )));
        }

        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            set_lock_timeout(conn, &self.settings)?;

            let (previous, current) = stock_ledger::set_stock(conn, listing_id, stock)?;
            let delta = current.stock - previous.stock;
            if delta != 0 {
                audit_ledger::record(
                    conn,
                    &[StockMovement {
                        listing_id,
                        final_stock: current.stock,
                        delta,
                        reason: StockChangeReason::ManualAdjustment,
                    }],
                )?;
                log::info!(
                    "listing {} stock adjusted {} -> {}",
                    listing_id,
                    previous.stock,
                    current.stock
                );
            }

            Ok(ListingStock {
                listing_id,
                stock: current.stock,
            })
        })
    }

    fn stock_history(&self, listing_id: i64) -> Result<Vec<StockChangeView>, DomainError> {
        let mut conn = self.pool.get()?;
        audit_ledger::history(&mut conn, listing_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::test_support::{setup_db, Fixture};

    #[tokio::test]
    async fn adjustment_is_audited_with_its_delta() {
        let (_container, pool) = setup_db().await;
        let repo = DieselInventoryRepository::new(pool.clone(), CheckoutSettings::default());
        let mut conn = pool.get().expect("connection");
        let fx = Fixture::new(&mut conn);
        let a = fx.listing(&mut conn, fx.pharmacy_a, 10);

        let result = repo.adjust_stock(a, 4).expect("adjust failed");
        assert_eq!(result, ListingStock { listing_id: a, stock: 4 });

        repo.adjust_stock(a, 4).expect("no-op adjust failed");
        repo.adjust_stock(a, 9).expect("adjust failed");

        let history = repo.stock_history(a).expect("history failed");
        let deltas: Vec<(i32, i32)> = history.iter().map(|h| (h.delta, h.final_stock)).collect();
        assert_eq!(deltas, vec![(-6, 4), (5, 9)]);
        assert!(history.iter().all(|h| h.reason == "manual_adjustment"));
        assert_eq!(Fixture::stock_of(&mut conn, a), 9);
    }

    #[tokio::test]
    async fn negative_target_is_rejected() {
        let (_container, pool) = setup_db().await;
        let repo = DieselInventoryRepository::new(pool.clone(), CheckoutSettings::default());
        let mut conn = pool.get().expect("connection");
        let fx = Fixture::new(&mut conn);
        let a = fx.listing(&mut conn, fx.pharmacy_a, 10);

        assert!(matches!(
            repo.adjust_stock(a, -1),
            Err(DomainError::InvalidInput(_))
        ));
        assert_eq!(Fixture::stock_of(&mut conn, a), 10);
    }

    #[tokio::test]
    async fn adjusting_unknown_listing_is_not_found() {
        let (_container, pool) = setup_db().await;
        let repo = DieselInventoryRepository::new(pool, CheckoutSettings::default());

        assert!(matches!(
            repo.adjust_stock(404, 1),
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn history_of_untouched_listing_is_empty() {
        let (_container, pool) = setup_db().await;
        let repo = DieselInventoryRepository::new(pool.clone(), CheckoutSettings::default());
        let mut conn = pool.get().expect("connection");
        let fx = Fixture::new(&mut conn);
        let a = fx.listing(&mut conn, fx.pharmacy_a, 10);

        assert!(repo.stock_history(a).expect("history failed").is_empty());
    }
}

//! Adapters that feed purchasable lines into the checkout coordinator.

use std::collections::HashSet;

use diesel::prelude::*;
use diesel::PgConnection;

use crate::domain::checkout::CheckoutLine;
use crate::domain::errors::DomainError;
use crate::schema::{cart_items, pharmacy_drugs, prescription_items, prescriptions};

use super::models::PrescriptionRow;

pub trait LineSource {
    /// Resolves every id in `line_ids`; a missing id is `NotFound`.
    fn load(&self, conn: &mut PgConnection, line_ids: &[i64])
        -> Result<Vec<CheckoutLine>, DomainError>;

    /// Marks the lines as turned into `order_id`.
    fn consume(
        &self,
        conn: &mut PgConnection,
        line_ids: &[i64],
        order_id: i64,
    ) -> Result<(), DomainError>;
}

fn ensure_all_present(
    kind: &str,
    line_ids: &[i64],
    lines: &[CheckoutLine],
) -> Result<(), DomainError> {
    let found: HashSet<i64> = lines.iter().map(|l| l.line_id).collect();
    match line_ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(DomainError::NotFound(format!("{} {}", kind, missing))),
        None => Ok(()),
    }
}

fn into_lines(rows: Vec<(i64, i64, i64, i32)>) -> Vec<CheckoutLine> {
    rows.into_iter()
        .map(|(line_id, listing_id, pharmacy_id, quantity)| CheckoutLine {
            line_id,
            listing_id,
            pharmacy_id,
            quantity,
        })
        .collect()
}

// ── Cart ─────────────────────────────────────────────────────────────────────

/// Lines from a user's shopping cart; deleted once ordered.
pub struct CartLines {
    pub user_id: i64,
}

impl LineSource for CartLines {
    fn load(
        &self,
        conn: &mut PgConnection,
        line_ids: &[i64],
    ) -> Result<Vec<CheckoutLine>, DomainError> {
        // Cart rows only; listing rows are locked later in their own order.
        // A concurrent checkout of the same cart blocks here and then finds
        // the rows deleted.
        let locked: Vec<i64> = cart_items::table
            .filter(cart_items::id.eq_any(line_ids))
            .filter(cart_items::user_id.eq(self.user_id))
            .order(cart_items::id.asc())
            .select(cart_items::id)
            .for_update()
            .load(conn)?;

        let rows = cart_items::table
            .inner_join(pharmacy_drugs::table)
            .filter(cart_items::id.eq_any(&locked))
            .order(cart_items::id.asc())
            .select((
                cart_items::id,
                cart_items::pharmacy_drug_id,
                pharmacy_drugs::pharmacy_id,
                cart_items::quantity,
            ))
            .load::<(i64, i64, i64, i32)>(conn)?;

        let lines = into_lines(rows);
        ensure_all_present("Cart line", line_ids, &lines)?;
        Ok(lines)
    }

    fn consume(
        &self,
        conn: &mut PgConnection,
        line_ids: &[i64],
        _order_id: i64,
    ) -> Result<(), DomainError> {
        let deleted = diesel::delete(
            cart_items::table
                .filter(cart_items::id.eq_any(line_ids))
                .filter(cart_items::user_id.eq(self.user_id)),
        )
        .execute(conn)?;

        if deleted != line_ids.len() {
            return Err(DomainError::NotFound(format!(
                "{} of cart lines {:?}",
                line_ids.len().saturating_sub(deleted),
                line_ids
            )));
        }
        Ok(())
    }
}

// ── Prescription ─────────────────────────────────────────────────────────────

/// Lines of a doctor-issued prescription. A prescription is ordered at most
/// once; its row stays locked for the rest of the checkout transaction.
pub struct PrescriptionLines {
    pub prescription_id: i64,
    pub user_id: i64,
}

impl LineSource for PrescriptionLines {
    fn load(
        &self,
        conn: &mut PgConnection,
        line_ids: &[i64],
    ) -> Result<Vec<CheckoutLine>, DomainError> {
        let prescription = prescriptions::table
            .find(self.prescription_id)
            .select(PrescriptionRow::as_select())
            .for_update()
            .first(conn)
            .optional()?
            .filter(|p| p.user_id == self.user_id)
            .ok_or_else(|| {
                DomainError::NotFound(format!("Prescription {}", self.prescription_id))
            })?;

        if let Some(order_id) = prescription.order_id {
            return Err(DomainError::InvalidInput(format!(
                "prescription {} was already ordered as order {}",
                prescription.id, order_id
            )));
        }

        let rows = prescription_items::table
            .inner_join(pharmacy_drugs::table)
            .filter(prescription_items::id.eq_any(line_ids))
            .filter(prescription_items::prescription_id.eq(self.prescription_id))
            .order(prescription_items::id.asc())
            .select((
                prescription_items::id,
                prescription_items::pharmacy_drug_id,
                pharmacy_drugs::pharmacy_id,
                prescription_items::quantity,
            ))
            .load::<(i64, i64, i64, i32)>(conn)?;

        let lines = into_lines(rows);
        ensure_all_present("Prescription line", line_ids, &lines)?;
        Ok(lines)
    }

    fn consume(
        &self,
        conn: &mut PgConnection,
        _line_ids: &[i64],
        order_id: i64,
    ) -> Result<(), DomainError> {
        diesel::update(prescriptions::table.find(self.prescription_id))
            .set(prescriptions::order_id.eq(Some(order_id)))
            .execute(conn)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::test_support::{setup_db, Fixture};

    #[tokio::test]
    async fn consuming_an_already_deleted_cart_line_is_not_found() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("connection");
        let fx = Fixture::new(&mut conn);
        let a = fx.listing(&mut conn, fx.pharmacy_a, 10);
        let line = Fixture::cart_line(&mut conn, 7, a, 2);
        let cart = CartLines { user_id: 7 };

        cart.consume(&mut conn, &[line], 1).expect("first consume");
        let err = cart.consume(&mut conn, &[line], 2).unwrap_err();

        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn cart_load_skips_lines_of_other_users() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("connection");
        let fx = Fixture::new(&mut conn);
        let a = fx.listing(&mut conn, fx.pharmacy_a, 10);
        let mine = Fixture::cart_line(&mut conn, 7, a, 2);
        let theirs = Fixture::cart_line(&mut conn, 8, a, 1);
        let cart = CartLines { user_id: 7 };

        let lines = conn
            .transaction::<_, DomainError, _>(|conn| cart.load(conn, &[mine]))
            .expect("load failed");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].listing_id, a);
        assert_eq!(lines[0].pharmacy_id, fx.pharmacy_a);

        let err = conn
            .transaction::<_, DomainError, _>(|conn| cart.load(conn, &[mine, theirs]))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(msg) if msg.contains(&theirs.to_string())));
    }
}

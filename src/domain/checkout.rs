use std::collections::HashSet;
use std::fmt;

use bigdecimal::{BigDecimal, Zero};

use super::errors::DomainError;

/// Where the purchased lines of a checkout come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOrigin {
    Cart,
    Prescription { prescription_id: i64 },
}

/// One pharmacy/courier grouping of a checkout. Courier and delivery fee are
/// chosen upstream and stored as given.
#[derive(Debug, Clone)]
pub struct PharmacyGroup {
    pub pharmacy_id: i64,
    pub courier_id: i64,
    pub delivery_fee: BigDecimal,
    pub subtotal: BigDecimal,
    pub line_ids: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub user_id: i64,
    pub address: String,
    pub total_amount: BigDecimal,
    pub groups: Vec<PharmacyGroup>,
}

impl CheckoutRequest {
    /// Structural checks that need no database access.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.groups.is_empty() {
            return Err(DomainError::InvalidInput(
                "checkout needs at least one pharmacy group".to_string(),
            ));
        }
        if self.address.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "delivery address is required".to_string(),
            ));
        }
        if self.total_amount < BigDecimal::zero() {
            return Err(DomainError::InvalidInput(
                "total amount must not be negative".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for group in &self.groups {
            if group.line_ids.is_empty() {
                return Err(DomainError::InvalidInput(format!(
                    "pharmacy {} has no lines",
                    group.pharmacy_id
                )));
            }
            if group.delivery_fee < BigDecimal::zero() || group.subtotal < BigDecimal::zero() {
                return Err(DomainError::InvalidInput(format!(
                    "pharmacy {} has a negative amount",
                    group.pharmacy_id
                )));
            }
            for line_id in &group.line_ids {
                if !seen.insert(*line_id) {
                    return Err(DomainError::InvalidInput(format!(
                        "line {} appears more than once",
                        line_id
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn line_ids(&self) -> Vec<i64> {
        self.groups
            .iter()
            .flat_map(|g| g.line_ids.iter().copied())
            .collect()
    }
}

/// A purchasable line resolved from a cart or a prescription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLine {
    pub line_id: i64,
    pub listing_id: i64,
    pub pharmacy_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    Started,
    LinesLocked,
    Reconciled,
    Committed,
    Aborted,
}

impl fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckoutPhase::Started => "started",
            CheckoutPhase::LinesLocked => "lines_locked",
            CheckoutPhase::Reconciled => "reconciled",
            CheckoutPhase::Committed => "committed",
            CheckoutPhase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

/// A listing as seen by the transaction that holds its row lock.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingState {
    pub listing_id: i64,
    pub pharmacy_id: i64,
    pub drug_id: i64,
    pub price: BigDecimal,
    pub stock: i32,
}

impl ListingState {
    pub fn is_oversold(&self) -> bool {
        self.stock < 0
    }

    /// Shortfall as a positive number, zero when the listing is not oversold.
    pub fn deficit(&self) -> i32 {
        if self.stock < 0 {
            -self.stock
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockChangeReason {
    Purchase,
    InterPharmacyTransfer,
    OrderCancellation,
    ManualAdjustment,
}

impl StockChangeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockChangeReason::Purchase => "purchase",
            StockChangeReason::InterPharmacyTransfer => "inter_pharmacy_transfer",
            StockChangeReason::OrderCancellation => "order_cancellation",
            StockChangeReason::ManualAdjustment => "manual_adjustment",
        }
    }
}

/// One audited movement: `final_stock` is the balance right after `delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockMovement {
    pub listing_id: i64,
    pub final_stock: i32,
    pub delta: i32,
    pub reason: StockChangeReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingStock {
    pub listing_id: i64,
    pub stock: i32,
}

#[derive(Debug, Clone)]
pub struct StockChangeView {
    pub id: i64,
    pub listing_id: i64,
    pub final_stock: i32,
    pub delta: i32,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

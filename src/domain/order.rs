use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use super::errors::DomainError;

/// Lifecycle of a per-pharmacy sub-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    AwaitingPayment,
    AwaitingConfirmation,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::AwaitingPayment => "awaiting_payment",
            OrderStatus::AwaitingConfirmation => "awaiting_confirmation",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "awaiting_payment" => Ok(OrderStatus::AwaitingPayment),
            "awaiting_confirmation" => Ok(OrderStatus::AwaitingConfirmation),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::Internal(format!(
                "unknown order status '{}'",
                other
            ))),
        }
    }

    /// Stock is still held for the sub-order and may be credited back.
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            OrderStatus::AwaitingPayment
                | OrderStatus::AwaitingConfirmation
                | OrderStatus::Processing
        )
    }
}

/// Frozen copy of what was bought. Holds values, never a reference to the
/// live listing price or drug name.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemSnapshot {
    pub listing_id: i64,
    pub drug_name: String,
    pub selling_unit: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub id: i64,
    pub listing_id: i64,
    pub drug_name: String,
    pub selling_unit: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct OrderPharmacyView {
    pub id: i64,
    pub pharmacy_id: i64,
    pub courier_id: i64,
    pub subtotal: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub status: OrderStatus,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: i64,
    pub user_id: i64,
    pub address: String,
    pub total_amount: BigDecimal,
    pub payment_proof: Option<String>,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub pharmacies: Vec<OrderPharmacyView>,
}

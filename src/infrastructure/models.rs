use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{
    cart_items, drugs, order_items, order_pharmacies, orders, pharmacies, pharmacy_drugs,
    prescription_items, prescriptions, stock_changes, stock_mutation_requests,
};

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = drugs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DrugRow {
    pub id: i64,
    pub name: String,
    pub selling_unit: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = drugs)]
pub struct NewDrugRow {
    pub name: String,
    pub selling_unit: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = pharmacies)]
pub struct NewPharmacyRow {
    pub manager_id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = pharmacy_drugs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ListingRow {
    pub id: i64,
    pub pharmacy_id: i64,
    pub drug_id: i64,
    pub price: BigDecimal,
    pub stock: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = pharmacy_drugs)]
pub struct NewListingRow {
    pub pharmacy_id: i64,
    pub drug_id: i64,
    pub price: BigDecimal,
    pub stock: i32,
}

// ── Line sources ─────────────────────────────────────────────────────────────

#[derive(Debug, Insertable)]
#[diesel(table_name = cart_items)]
pub struct NewCartItemRow {
    pub user_id: i64,
    pub pharmacy_drug_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = prescriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PrescriptionRow {
    pub id: i64,
    pub user_id: i64,
    pub doctor_id: i64,
    pub order_id: Option<i64>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = prescriptions)]
pub struct NewPrescriptionRow {
    pub user_id: i64,
    pub doctor_id: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = prescription_items)]
pub struct NewPrescriptionItemRow {
    pub prescription_id: i64,
    pub pharmacy_drug_id: i64,
    pub quantity: i32,
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: i64,
    pub user_id: i64,
    pub address: String,
    pub total_amount: BigDecimal,
    pub payment_proof: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub user_id: i64,
    pub address: String,
    pub total_amount: BigDecimal,
}

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = order_pharmacies)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderPharmacyRow {
    pub id: i64,
    pub order_id: i64,
    pub pharmacy_id: i64,
    pub courier_id: i64,
    pub subtotal: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub status: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_pharmacies)]
pub struct NewOrderPharmacyRow {
    pub order_id: i64,
    pub pharmacy_id: i64,
    pub courier_id: i64,
    pub subtotal: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub status: String,
}

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderPharmacyRow, foreign_key = order_pharmacy_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: i64,
    pub order_pharmacy_id: i64,
    pub pharmacy_drug_id: i64,
    pub drug_name: String,
    pub selling_unit: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub order_pharmacy_id: i64,
    pub pharmacy_drug_id: i64,
    pub drug_name: String,
    pub selling_unit: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

// ── Ledgers ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = stock_changes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StockChangeRow {
    pub id: i64,
    pub pharmacy_drug_id: i64,
    pub final_stock: i32,
    pub delta: i32,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = stock_changes)]
pub struct NewStockChangeRow {
    pub pharmacy_drug_id: i64,
    pub final_stock: i32,
    pub delta: i32,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = stock_mutation_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StockMutationRequestRow {
    pub id: i64,
    pub source_pharmacy_id: i64,
    pub target_pharmacy_id: i64,
    pub drug_id: i64,
    pub quantity: i32,
    pub status: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = stock_mutation_requests)]
pub struct NewStockMutationRequestRow {
    pub source_pharmacy_id: i64,
    pub target_pharmacy_id: i64,
    pub drug_id: i64,
    pub quantity: i32,
    pub status: String,
}

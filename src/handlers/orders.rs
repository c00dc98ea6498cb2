use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::order::OrderView;
use crate::errors::AppError;

use super::CheckoutData;

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i64,
    pub pharmacy_drug_id: i64,
    pub drug_name: String,
    pub selling_unit: String,
    pub unit_price: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderPharmacyResponse {
    pub id: i64,
    pub pharmacy_id: i64,
    pub courier_id: i64,
    pub subtotal: String,
    pub delivery_fee: String,
    pub status: String,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub user_id: i64,
    pub address: String,
    pub total_amount: String,
    pub payment_proof: Option<String>,
    pub created_at: String,
    pub cancelled_at: Option<String>,
    pub pharmacies: Vec<OrderPharmacyResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        OrderResponse {
            id: order.id,
            user_id: order.user_id,
            address: order.address,
            total_amount: order.total_amount.to_string(),
            payment_proof: order.payment_proof,
            created_at: order.created_at.to_rfc3339(),
            cancelled_at: order.cancelled_at.map(|t| t.to_rfc3339()),
            pharmacies: order
                .pharmacies
                .into_iter()
                .map(|p| OrderPharmacyResponse {
                    id: p.id,
                    pharmacy_id: p.pharmacy_id,
                    courier_id: p.courier_id,
                    subtotal: p.subtotal.to_string(),
                    delivery_fee: p.delivery_fee.to_string(),
                    status: p.status.as_str().to_string(),
                    items: p
                        .items
                        .into_iter()
                        .map(|i| OrderItemResponse {
                            id: i.id,
                            pharmacy_drug_id: i.listing_id,
                            drug_name: i.drug_name,
                            selling_unit: i.selling_unit,
                            unit_price: i.unit_price.to_string(),
                            quantity: i.quantity,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// GET /orders/{id}
///
/// Returns the order with its per-pharmacy sub-orders and the item snapshots
/// taken at checkout.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = i64, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: CheckoutData,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let result = web::block(move || service.get_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match result {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound(format!("Order {}", order_id))),
    }
}

/// POST /orders/{id}/cancel
///
/// Cancels every sub-order and puts the purchased quantities back on the
/// listings they came from.
#[utoipa::path(
    post,
    path = "/orders/{id}/cancel",
    params(
        ("id" = i64, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order cancelled", body = OrderResponse),
        (status = 400, description = "Order already cancelled or shipped"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn cancel_order(
    service: CheckoutData,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || service.cancel_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

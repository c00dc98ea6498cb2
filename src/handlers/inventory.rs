use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;

use super::InventoryData;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustStockRequest {
    /// New absolute stock, must not be negative.
    pub stock: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListingStockResponse {
    pub pharmacy_drug_id: i64,
    pub stock: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockChangeResponse {
    pub id: i64,
    pub final_stock: i32,
    pub delta: i32,
    pub reason: String,
    pub created_at: String,
}

/// PUT /pharmacy-drugs/{id}/stock
#[utoipa::path(
    put,
    path = "/pharmacy-drugs/{id}/stock",
    params(
        ("id" = i64, Path, description = "Pharmacy drug listing id"),
    ),
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Stock updated", body = ListingStockResponse),
        (status = 400, description = "Negative stock"),
        (status = 404, description = "Listing not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "inventory"
)]
pub async fn adjust_stock(
    service: InventoryData,
    path: web::Path<i64>,
    body: web::Json<AdjustStockRequest>,
) -> Result<HttpResponse, AppError> {
    let listing_id = path.into_inner();
    let stock = body.into_inner().stock;

    let result = web::block(move || service.adjust_stock(listing_id, stock))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListingStockResponse {
        pharmacy_drug_id: result.listing_id,
        stock: result.stock,
    }))
}

/// GET /pharmacy-drugs/{id}/stock-changes
///
/// Audit trail of the listing, oldest first.
#[utoipa::path(
    get,
    path = "/pharmacy-drugs/{id}/stock-changes",
    params(
        ("id" = i64, Path, description = "Pharmacy drug listing id"),
    ),
    responses(
        (status = 200, description = "Stock changes", body = [StockChangeResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "inventory"
)]
pub async fn stock_history(
    service: InventoryData,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let listing_id = path.into_inner();

    let changes = web::block(move || service.stock_history(listing_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<StockChangeResponse> = changes
        .into_iter()
        .map(|c| StockChangeResponse {
            id: c.id,
            final_stock: c.final_stock,
            delta: c.delta,
            reason: c.reason,
            created_at: c.created_at.to_rfc3339(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(body))
}

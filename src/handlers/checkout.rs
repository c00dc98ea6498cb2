use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::checkout::{CheckoutRequest, PharmacyGroup};
use crate::errors::AppError;

use super::CheckoutData;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct PharmacyGroupRequest {
    pub pharmacy_id: i64,
    pub courier_id: i64,
    /// Decimal amount as a string, e.g. "9000.00"
    pub delivery_fee: String,
    pub subtotal: String,
    pub line_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutBody {
    pub user_id: i64,
    pub address: String,
    pub total_amount: String,
    pub groups: Vec<PharmacyGroupRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InsufficientStockResponse {
    pub error: String,
    pub line_ids: Vec<i64>,
}

fn parse_amount(field: &str, value: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(value)
        .map_err(|e| AppError::BadRequest(format!("Invalid {} '{}': {}", field, value, e)))
}

impl TryFrom<CheckoutBody> for CheckoutRequest {
    type Error = AppError;

    fn try_from(body: CheckoutBody) -> Result<Self, Self::Error> {
        let groups = body
            .groups
            .into_iter()
            .map(|g| {
                Ok(PharmacyGroup {
                    pharmacy_id: g.pharmacy_id,
                    courier_id: g.courier_id,
                    delivery_fee: parse_amount("delivery_fee", &g.delivery_fee)?,
                    subtotal: parse_amount("subtotal", &g.subtotal)?,
                    line_ids: g.line_ids,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(CheckoutRequest {
            user_id: body.user_id,
            address: body.address,
            total_amount: parse_amount("total_amount", &body.total_amount)?,
            groups,
        })
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /checkout
///
/// Turns the listed cart lines into an order. Oversold listings are topped up
/// from sibling pharmacies of the same manager; if that is not enough the
/// whole checkout is rolled back and the uncovered line ids are returned.
#[utoipa::path(
    post,
    path = "/checkout",
    request_body = CheckoutBody,
    responses(
        (status = 201, description = "Order created", body = CheckoutResponse),
        (status = 400, description = "Malformed checkout"),
        (status = 404, description = "Cart line or listing not found"),
        (status = 409, description = "Stock cannot cover some lines", body = InsufficientStockResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "checkout"
)]
pub async fn create_cart_checkout(
    service: CheckoutData,
    body: web::Json<CheckoutBody>,
) -> Result<HttpResponse, AppError> {
    let request = CheckoutRequest::try_from(body.into_inner())?;

    let order_id = web::block(move || service.checkout_cart(request))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({ "id": order_id })))
}

/// POST /prescriptions/{id}/checkout
///
/// Same contract as `/checkout`, with the lines taken from a prescription.
#[utoipa::path(
    post,
    path = "/prescriptions/{id}/checkout",
    params(
        ("id" = i64, Path, description = "Prescription id"),
    ),
    request_body = CheckoutBody,
    responses(
        (status = 201, description = "Order created", body = CheckoutResponse),
        (status = 400, description = "Malformed checkout or prescription already ordered"),
        (status = 404, description = "Prescription, line or listing not found"),
        (status = 409, description = "Stock cannot cover some lines", body = InsufficientStockResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "checkout"
)]
pub async fn create_prescription_checkout(
    service: CheckoutData,
    path: web::Path<i64>,
    body: web::Json<CheckoutBody>,
) -> Result<HttpResponse, AppError> {
    let prescription_id = path.into_inner();
    let request = CheckoutRequest::try_from(body.into_inner())?;

    let order_id = web::block(move || service.checkout_prescription(prescription_id, request))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({ "id": order_id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(delivery_fee: &str) -> CheckoutBody {
        CheckoutBody {
            user_id: 5,
            address: "Jl. Gatot Subroto 2".to_string(),
            total_amount: "45000.50".to_string(),
            groups: vec![PharmacyGroupRequest {
                pharmacy_id: 1,
                courier_id: 2,
                delivery_fee: delivery_fee.to_string(),
                subtotal: "36000.50".to_string(),
                line_ids: vec![3, 4],
            }],
        }
    }

    #[test]
    fn body_converts_to_request() {
        let request = CheckoutRequest::try_from(body("9000")).expect("valid body");

        assert_eq!(request.total_amount, BigDecimal::from_str("45000.50").unwrap());
        assert_eq!(request.groups[0].delivery_fee, BigDecimal::from(9000));
        assert_eq!(request.groups[0].line_ids, vec![3, 4]);
    }

    #[test]
    fn malformed_amount_is_bad_request() {
        let err = CheckoutRequest::try_from(body("nine thousand")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("delivery_fee")));
    }
}

use std::collections::HashMap;

use diesel::prelude::*;
use diesel::PgConnection;

use crate::domain::checkout::{CheckoutLine, CheckoutRequest};
use crate::domain::errors::DomainError;
use crate::domain::order::{
    OrderItemSnapshot, OrderItemView, OrderPharmacyView, OrderStatus, OrderView,
};
use crate::domain::stock::ListingState;
use crate::schema::{drugs, order_items, order_pharmacies, orders};

use super::models::{
    DrugRow, NewOrderItemRow, NewOrderPharmacyRow, NewOrderRow, OrderItemRow, OrderPharmacyRow,
    OrderRow,
};

/// Copies the values an order line must keep forever.
pub fn snapshot(line: &CheckoutLine, listing: &ListingState, drug: &DrugRow) -> OrderItemSnapshot {
    OrderItemSnapshot {
        listing_id: listing.listing_id,
        drug_name: drug.name.clone(),
        selling_unit: drug.selling_unit.clone(),
        unit_price: listing.price.clone(),
        quantity: line.quantity,
    }
}

/// Writes the order, one sub-order per group and one frozen item per line.
/// Returns the order id.
///
/// `listings` must hold the states read under this transaction's row locks
/// so the copied price is the one actually charged.
pub fn assemble(
    conn: &mut PgConnection,
    request: &CheckoutRequest,
    lines: &HashMap<i64, CheckoutLine>,
    listings: &HashMap<i64, ListingState>,
) -> Result<i64, DomainError> {
    let drug_ids: Vec<i64> = listings.values().map(|l| l.drug_id).collect();
    let drugs: HashMap<i64, DrugRow> = drugs::table
        .filter(drugs::id.eq_any(&drug_ids))
        .select(DrugRow::as_select())
        .load(conn)?
        .into_iter()
        .map(|d| (d.id, d))
        .collect();

    let order_id: i64 = diesel::insert_into(orders::table)
        .values(&NewOrderRow {
            user_id: request.user_id,
            address: request.address.clone(),
            total_amount: request.total_amount.clone(),
        })
        .returning(orders::id)
        .get_result(conn)?;

    for group in &request.groups {
        let order_pharmacy_id: i64 = diesel::insert_into(order_pharmacies::table)
            .values(&NewOrderPharmacyRow {
                order_id,
                pharmacy_id: group.pharmacy_id,
                courier_id: group.courier_id,
                subtotal: group.subtotal.clone(),
                delivery_fee: group.delivery_fee.clone(),
                status: OrderStatus::AwaitingPayment.as_str().to_string(),
            })
            .returning(order_pharmacies::id)
            .get_result(conn)?;

        let mut items = Vec::with_capacity(group.line_ids.len());
        for line_id in &group.line_ids {
            let line = lines
                .get(line_id)
                .ok_or_else(|| DomainError::NotFound(format!("Line {}", line_id)))?;
            let listing = listings.get(&line.listing_id).ok_or_else(|| {
                DomainError::NotFound(format!("Pharmacy drug listing {}", line.listing_id))
            })?;
            let drug = drugs
                .get(&listing.drug_id)
                .ok_or_else(|| DomainError::NotFound(format!("Drug {}", listing.drug_id)))?;

            let item = snapshot(line, listing, drug);
            items.push(NewOrderItemRow {
                order_pharmacy_id,
                pharmacy_drug_id: item.listing_id,
                drug_name: item.drug_name,
                selling_unit: item.selling_unit,
                unit_price: item.unit_price,
                quantity: item.quantity,
            });
        }
        diesel::insert_into(order_items::table)
            .values(&items)
            .execute(conn)?;
    }

    Ok(order_id)
}

/// Reads an order with its sub-orders and frozen items.
pub fn load_order(conn: &mut PgConnection, order_id: i64) -> Result<Option<OrderView>, DomainError> {
    let order = orders::table
        .find(order_id)
        .select(OrderRow::as_select())
        .first(conn)
        .optional()?;

    let Some(order) = order else {
        return Ok(None);
    };

    let pharmacies = OrderPharmacyRow::belonging_to(&order)
        .order(order_pharmacies::id.asc())
        .select(OrderPharmacyRow::as_select())
        .load(conn)?;

    let items = OrderItemRow::belonging_to(&pharmacies)
        .order(order_items::id.asc())
        .select(OrderItemRow::as_select())
        .load(conn)?
        .grouped_by(&pharmacies);

    let pharmacies = pharmacies
        .into_iter()
        .zip(items)
        .map(|(p, items)| {
            Ok(OrderPharmacyView {
                id: p.id,
                pharmacy_id: p.pharmacy_id,
                courier_id: p.courier_id,
                subtotal: p.subtotal,
                delivery_fee: p.delivery_fee,
                status: OrderStatus::parse(&p.status)?,
                items: items
                    .into_iter()
                    .map(|i| OrderItemView {
                        id: i.id,
                        listing_id: i.pharmacy_drug_id,
                        drug_name: i.drug_name,
                        selling_unit: i.selling_unit,
                        unit_price: i.unit_price,
                        quantity: i.quantity,
                    })
                    .collect(),
            })
        })
        .collect::<Result<Vec<_>, DomainError>>()?;

    Ok(Some(OrderView {
        id: order.id,
        user_id: order.user_id,
        address: order.address,
        total_amount: order.total_amount,
        payment_proof: order.payment_proof,
        created_at: order.created_at,
        cancelled_at: order.cancelled_at,
        pharmacies,
    }))
}

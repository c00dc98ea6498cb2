use super::checkout::{CheckoutRequest, LineOrigin};
use super::errors::DomainError;
use super::order::OrderView;
use super::stock::{ListingStock, StockChangeView};

pub trait CheckoutRepository: Send + Sync + 'static {
    /// Turns the request's lines into a committed order, or changes nothing.
    fn checkout(&self, origin: LineOrigin, request: CheckoutRequest) -> Result<i64, DomainError>;
    fn find_order(&self, id: i64) -> Result<Option<OrderView>, DomainError>;
    fn cancel_order(&self, id: i64) -> Result<OrderView, DomainError>;
}

pub trait InventoryRepository: Send + Sync + 'static {
    fn adjust_stock(&self, listing_id: i64, stock: i32) -> Result<ListingStock, DomainError>;
    fn stock_history(&self, listing_id: i64) -> Result<Vec<StockChangeView>, DomainError>;
}

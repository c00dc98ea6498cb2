use crate::domain::errors::DomainError;
use crate::domain::ports::InventoryRepository;
use crate::domain::stock::{ListingStock, StockChangeView};

pub struct InventoryService<R> {
    repo: R,
}

impl<R: InventoryRepository> InventoryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn adjust_stock(&self, listing_id: i64, stock: i32) -> Result<ListingStock, DomainError> {
        self.repo.adjust_stock(listing_id, stock)
    }

    pub fn stock_history(&self, listing_id: i64) -> Result<Vec<StockChangeView>, DomainError> {
        self.repo.stock_history(listing_id)
    }
}

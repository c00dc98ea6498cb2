use actix_web::web;

use crate::application::checkout_service::CheckoutService;
use crate::application::inventory_service::InventoryService;
use crate::infrastructure::checkout_repo::DieselCheckoutRepository;
use crate::infrastructure::inventory_repo::DieselInventoryRepository;

pub mod checkout;
pub mod inventory;
pub mod orders;

pub type CheckoutData = web::Data<CheckoutService<DieselCheckoutRepository>>;
pub type InventoryData = web::Data<InventoryService<DieselInventoryRepository>>;

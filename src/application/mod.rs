pub mod checkout_service;
pub mod inventory_service;

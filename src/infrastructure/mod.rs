pub mod audit_ledger;
pub mod checkout_repo;
pub mod coordinator;
pub mod inventory_repo;
pub mod line_sources;
pub mod models;
pub mod order_assembler;
pub mod stock_ledger;
pub mod supply_resolver;

#[cfg(test)]
pub(crate) mod test_support;

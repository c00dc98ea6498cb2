use crate::domain::checkout::{CheckoutRequest, LineOrigin};
use crate::domain::errors::DomainError;
use crate::domain::order::OrderView;
use crate::domain::ports::CheckoutRepository;

pub struct CheckoutService<R> {
    repo: R,
}

impl<R: CheckoutRepository> CheckoutService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn checkout_cart(&self, request: CheckoutRequest) -> Result<i64, DomainError> {
        self.repo.checkout(LineOrigin::Cart, request)
    }

    pub fn checkout_prescription(
        &self,
        prescription_id: i64,
        request: CheckoutRequest,
    ) -> Result<i64, DomainError> {
        self.repo
            .checkout(LineOrigin::Prescription { prescription_id }, request)
    }

    pub fn get_order(&self, id: i64) -> Result<Option<OrderView>, DomainError> {
        self.repo.find_order(id)
    }

    pub fn cancel_order(&self, id: i64) -> Result<OrderView, DomainError> {
        self.repo.cancel_order(id)
    }
}

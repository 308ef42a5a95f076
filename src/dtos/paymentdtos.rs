// dtos/paymentdtos.rs
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::contractmodels::PaymentRequestStatus;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequestDto {
    pub contract_id: Uuid,
    #[validate(range(min = 1.0, message = "amount must be at least 1"))]
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentStatusDto {
    pub status: PaymentRequestStatus,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifySettlementDto {
    #[validate(length(min = 1, message = "gateway_order_id is required"))]
    pub gateway_order_id: String,
    #[validate(length(min = 1, message = "gateway_payment_id is required"))]
    pub gateway_payment_id: String,
    #[validate(length(min = 1, message = "signature is required"))]
    pub signature: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentQuery {
    pub contract_id: Option<Uuid>,
}

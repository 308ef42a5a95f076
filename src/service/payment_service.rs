// service/payment_service.rs
use std::sync::Arc;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::{
    config::Config,
    db::{contractdb::ContractExt, paymentdb::PaymentExt, userdb::UserExt},
    models::contractmodels::{Contract, PaymentRequest, PaymentRequestStatus},
    models::usermodel::User,
    service::error::ServiceError,
    service::order_resolver::{resolve_parties, OrderParties, OrderRef},
    utils::currency::rupees_to_paise,
    ws::{contract_topic, ChannelRegistry},
    DBClient,
};

const RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";
const GATEWAY_NAME: &str = "razorpay";

/// Everything the paying client needs to complete checkout against the
/// gateway.
#[derive(Debug, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub gateway_order_id: String,
    pub key_id: String,
    pub amount: i64,
    pub currency: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct PaymentService {
    db_client: Arc<DBClient>,
    channels: ChannelRegistry,
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
    currency: String,
}

impl PaymentService {
    pub fn new(db_client: Arc<DBClient>, channels: ChannelRegistry, config: &Config) -> Self {
        Self {
            db_client,
            channels,
            http: reqwest::Client::new(),
            key_id: config.razorpay_key_id.clone(),
            key_secret: config.razorpay_key_secret.clone(),
            currency: config.payment_currency.clone(),
        }
    }

    /// The freelancer side of the contract's order asks to be paid; the
    /// client side owes the amount.
    pub async fn create_request(
        &self,
        caller: &User,
        contract_id: Uuid,
        amount: f64,
    ) -> Result<PaymentRequest, ServiceError> {
        let (contract, _, parties) = self.contract_context(contract_id).await?;

        if !caller.is_client(parties.client) && !caller.is_freelancer(parties.freelancer) {
            return Err(ServiceError::ContractNotFound);
        }
        if !caller.is_freelancer(parties.freelancer) {
            return Err(ServiceError::Forbidden);
        }

        let payee = self
            .db_client
            .user_id_for_client_profile(parties.client)
            .await?
            .ok_or_else(|| ServiceError::Validation("payee identity not found".to_string()))?;

        let request = self
            .db_client
            .create_payment_request(contract.id, caller.id, payee, amount)
            .await?;

        self.broadcast_payment(&contract, &request, "payment.requested").await;
        Ok(request)
    }

    pub async fn list_for_contract(
        &self,
        caller: &User,
        contract_id: Uuid,
    ) -> Result<Vec<PaymentRequest>, ServiceError> {
        let (_, _, parties) = self.contract_context(contract_id).await?;

        if !caller.is_client(parties.client) && !caller.is_freelancer(parties.freelancer) {
            return Err(ServiceError::ContractNotFound);
        }

        Ok(self.db_client.list_requests_for_contract(contract_id).await?)
    }

    /// Manual status change by the payee: settle out of band or decline.
    pub async fn update_status(
        &self,
        caller: &User,
        request_id: Uuid,
        status: PaymentRequestStatus,
    ) -> Result<PaymentRequest, ServiceError> {
        let request = self.payee_request(caller, request_id).await?;
        require_pending(&request)?;

        if !matches!(
            status,
            PaymentRequestStatus::Completed | PaymentRequestStatus::Cancelled
        ) {
            return Err(ServiceError::Validation(
                "status can only be set to completed or cancelled".to_string(),
            ));
        }

        let updated = self.db_client.update_request_status(request_id, status).await?;

        if let Ok((contract, _, _)) = self.contract_context(updated.contract_id).await {
            self.broadcast_payment(&contract, &updated, "payment.updated").await;
        }
        Ok(updated)
    }

    /// Create the gateway-side order for a pending request. The amount
    /// crosses the wire in minor units.
    pub async fn create_gateway_order(
        &self,
        caller: &User,
        request_id: Uuid,
    ) -> Result<GatewayOrder, ServiceError> {
        let request = self.payee_request(caller, request_id).await?;
        require_pending(&request)?;

        if request.transaction_id.is_some() {
            return Err(ServiceError::InvalidState(
                "payment request already processed".to_string(),
            ));
        }

        let amount_paise = rupees_to_paise(request.amount);
        let payload = json!({
            "amount": amount_paise,
            "currency": self.currency,
            "receipt": request.id.to_string(),
            "notes": { "payment_request_id": request.id.to_string() },
        });

        let response = self
            .http
            .post(format!("{}/orders", RAZORPAY_API_BASE))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ServiceError::Gateway(e.to_string()))?;

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ServiceError::Gateway(e.to_string()))?;

        let gateway_order_id = match response_body["id"].as_str() {
            Some(id) => id.to_string(),
            None => {
                let reason = response_body["error"]["description"]
                    .as_str()
                    .unwrap_or("gateway order creation failed")
                    .to_string();
                return Err(ServiceError::Gateway(reason));
            }
        };

        self.db_client
            .set_gateway_order(request.id, &gateway_order_id)
            .await?;

        Ok(GatewayOrder {
            gateway_order_id,
            key_id: self.key_id.clone(),
            amount: amount_paise,
            currency: self.currency.clone(),
            description: format!("Payment request {}", request.id),
        })
    }

    /// Check the gateway's settlement signature and land the request in a
    /// terminal status. Every branch persists before returning.
    pub async fn verify_settlement(
        &self,
        caller: &User,
        request_id: Uuid,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
    ) -> Result<PaymentRequest, ServiceError> {
        let request = self.payee_request(caller, request_id).await?;
        require_pending(&request)?;

        // The callback must reference the gateway order this request created.
        if request.transaction_id.as_deref() != Some(gateway_order_id) {
            let updated = self
                .db_client
                .settle_payment_request(request.id, PaymentRequestStatus::Cancelled, None, None)
                .await?;
            self.broadcast_settlement(&updated).await;
            return Err(ServiceError::Gateway(
                "settlement does not match the gateway order on record".to_string(),
            ));
        }

        if !verify_signature(&self.key_secret, gateway_order_id, gateway_payment_id, signature) {
            tracing::warn!(
                "invalid settlement signature for payment request {}",
                request.id
            );
            let updated = self
                .db_client
                .settle_payment_request(request.id, PaymentRequestStatus::Failed, None, None)
                .await?;
            self.broadcast_settlement(&updated).await;
            return Err(ServiceError::Gateway(
                "settlement signature verification failed".to_string(),
            ));
        }

        let updated = self
            .db_client
            .settle_payment_request(
                request.id,
                PaymentRequestStatus::Completed,
                Some(gateway_payment_id),
                Some(GATEWAY_NAME),
            )
            .await?;

        self.broadcast_settlement(&updated).await;
        Ok(updated)
    }

    async fn contract_context(
        &self,
        contract_id: Uuid,
    ) -> Result<(Contract, OrderRef, OrderParties), ServiceError> {
        let contract = self
            .db_client
            .get_contract_by_id(contract_id)
            .await?
            .ok_or(ServiceError::ContractNotFound)?;

        let (kind, order_id) = contract.anchor().ok_or(ServiceError::InvalidAnchor)?;
        let order = OrderRef::new(kind, order_id);
        let parties = resolve_parties(&self.db_client, &order).await?;
        Ok((contract, order, parties))
    }

    /// Fetch a request the caller may settle. Non-participants get not-found;
    /// the requester is visible but cannot move money.
    async fn payee_request(
        &self,
        caller: &User,
        request_id: Uuid,
    ) -> Result<PaymentRequest, ServiceError> {
        let request = self
            .db_client
            .get_payment_request(request_id)
            .await?
            .ok_or(ServiceError::PaymentRequestNotFound)?;

        if caller.id != request.payee && caller.id != request.requested_by {
            return Err(ServiceError::PaymentRequestNotFound);
        }
        if caller.id != request.payee {
            return Err(ServiceError::Forbidden);
        }

        Ok(request)
    }

    async fn broadcast_settlement(&self, request: &PaymentRequest) {
        if let Ok((contract, _, _)) = self.contract_context(request.contract_id).await {
            self.broadcast_payment(&contract, request, "payment.updated").await;
        }
    }

    async fn broadcast_payment(&self, contract: &Contract, request: &PaymentRequest, event: &str) {
        let Some((kind, order_id)) = contract.anchor() else {
            return;
        };

        let payload = json!({
            "event": event,
            "payment_request": request,
        });

        self.channels
            .broadcast(&contract_topic(kind, order_id), payload.to_string())
            .await;
    }
}

fn require_pending(request: &PaymentRequest) -> Result<(), ServiceError> {
    match request.status.unwrap_or(PaymentRequestStatus::Pending) {
        PaymentRequestStatus::Pending => Ok(()),
        _ => Err(ServiceError::InvalidState(
            "payment request already processed".to_string(),
        )),
    }
}

/// Hex HMAC-SHA256 over "order_id|payment_id", keyed with the gateway
/// shared secret.
pub fn compute_signature(secret: &str, gateway_order_id: &str, gateway_payment_id: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(format!("{}|{}", gateway_order_id, gateway_payment_id).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

pub fn verify_signature(
    secret: &str,
    gateway_order_id: &str,
    gateway_payment_id: &str,
    signature: &str,
) -> bool {
    let expected = compute_signature(secret, gateway_order_id, gateway_payment_id);

    // Constant-time compare to avoid leaking the expected digest
    ConstantTimeEq::ct_eq(signature.as_bytes(), expected.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[test]
    fn valid_signature_verifies() {
        let signature = compute_signature("secret", "order_123", "pay_456");
        assert!(verify_signature("secret", "order_123", "pay_456", &signature));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let mut signature = compute_signature("secret", "order_123", "pay_456");
        signature.replace_range(0..1, if signature.starts_with('0') { "1" } else { "0" });
        assert!(!verify_signature("secret", "order_123", "pay_456", &signature));
    }

    #[test]
    fn signature_binds_order_and_payment_ids() {
        let signature = compute_signature("secret", "order_123", "pay_456");
        assert!(!verify_signature("secret", "order_999", "pay_456", &signature));
        assert!(!verify_signature("secret", "order_123", "pay_999", &signature));
        assert!(!verify_signature("other", "order_123", "pay_456", &signature));
    }

    fn request_with_status(status: Option<PaymentRequestStatus>) -> PaymentRequest {
        PaymentRequest {
            id: Uuid::new_v4(),
            contract_id: Uuid::new_v4(),
            requested_by: Uuid::new_v4(),
            payee: Uuid::new_v4(),
            amount: 250.0,
            status,
            transaction_id: None,
            payment_method: None,
            created_at: None::<DateTime<Utc>>,
            updated_at: None,
        }
    }

    #[test]
    fn only_pending_requests_can_be_processed() {
        assert!(require_pending(&request_with_status(Some(PaymentRequestStatus::Pending))).is_ok());
        assert!(require_pending(&request_with_status(None)).is_ok());

        for terminal in [
            PaymentRequestStatus::Completed,
            PaymentRequestStatus::Failed,
            PaymentRequestStatus::Cancelled,
        ] {
            assert!(matches!(
                require_pending(&request_with_status(Some(terminal))),
                Err(ServiceError::InvalidState(_))
            ));
        }
    }
}

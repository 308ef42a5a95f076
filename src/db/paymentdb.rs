// db/paymentdb.rs
use async_trait::async_trait;
use uuid::Uuid;
use sqlx::Error;

use super::db::DBClient;
use crate::models::contractmodels::{PaymentRequest, PaymentRequestStatus};

const PAYMENT_REQUEST_COLUMNS: &str =
    "id, contract_id, requested_by, payee, amount, status, transaction_id, \
     payment_method, created_at, updated_at";

#[async_trait]
pub trait PaymentExt {
    async fn create_payment_request(
        &self,
        contract_id: Uuid,
        requested_by: Uuid,
        payee: Uuid,
        amount: f64,
    ) -> Result<PaymentRequest, Error>;

    async fn get_payment_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<PaymentRequest>, Error>;

    async fn list_requests_for_contract(
        &self,
        contract_id: Uuid,
    ) -> Result<Vec<PaymentRequest>, Error>;

    async fn list_requests_for_user(&self, user_id: Uuid) -> Result<Vec<PaymentRequest>, Error>;

    async fn update_request_status(
        &self,
        request_id: Uuid,
        status: PaymentRequestStatus,
    ) -> Result<PaymentRequest, Error>;

    /// Record the gateway-side order id issued for this request.
    async fn set_gateway_order(
        &self,
        request_id: Uuid,
        gateway_order_id: &str,
    ) -> Result<PaymentRequest, Error>;

    /// Terminal settlement write: status plus, when known, the gateway
    /// payment id and method.
    async fn settle_payment_request(
        &self,
        request_id: Uuid,
        status: PaymentRequestStatus,
        transaction_id: Option<&str>,
        payment_method: Option<&str>,
    ) -> Result<PaymentRequest, Error>;
}

#[async_trait]
impl PaymentExt for DBClient {
    async fn create_payment_request(
        &self,
        contract_id: Uuid,
        requested_by: Uuid,
        payee: Uuid,
        amount: f64,
    ) -> Result<PaymentRequest, Error> {
        sqlx::query_as::<_, PaymentRequest>(&format!(
            r#"
            INSERT INTO payment_requests (contract_id, requested_by, payee, amount)
            VALUES ($1, $2, $3, $4)
            RETURNING {PAYMENT_REQUEST_COLUMNS}
            "#
        ))
        .bind(contract_id)
        .bind(requested_by)
        .bind(payee)
        .bind(amount)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_payment_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<PaymentRequest>, Error> {
        sqlx::query_as::<_, PaymentRequest>(&format!(
            r#"
            SELECT {PAYMENT_REQUEST_COLUMNS}
            FROM payment_requests
            WHERE id = $1
            "#
        ))
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_requests_for_contract(
        &self,
        contract_id: Uuid,
    ) -> Result<Vec<PaymentRequest>, Error> {
        sqlx::query_as::<_, PaymentRequest>(&format!(
            r#"
            SELECT {PAYMENT_REQUEST_COLUMNS}
            FROM payment_requests
            WHERE contract_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(contract_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_requests_for_user(&self, user_id: Uuid) -> Result<Vec<PaymentRequest>, Error> {
        sqlx::query_as::<_, PaymentRequest>(&format!(
            r#"
            SELECT {PAYMENT_REQUEST_COLUMNS}
            FROM payment_requests
            WHERE requested_by = $1 OR payee = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_request_status(
        &self,
        request_id: Uuid,
        status: PaymentRequestStatus,
    ) -> Result<PaymentRequest, Error> {
        sqlx::query_as::<_, PaymentRequest>(&format!(
            r#"
            UPDATE payment_requests
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {PAYMENT_REQUEST_COLUMNS}
            "#
        ))
        .bind(request_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn set_gateway_order(
        &self,
        request_id: Uuid,
        gateway_order_id: &str,
    ) -> Result<PaymentRequest, Error> {
        sqlx::query_as::<_, PaymentRequest>(&format!(
            r#"
            UPDATE payment_requests
            SET transaction_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {PAYMENT_REQUEST_COLUMNS}
            "#
        ))
        .bind(request_id)
        .bind(gateway_order_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn settle_payment_request(
        &self,
        request_id: Uuid,
        status: PaymentRequestStatus,
        transaction_id: Option<&str>,
        payment_method: Option<&str>,
    ) -> Result<PaymentRequest, Error> {
        sqlx::query_as::<_, PaymentRequest>(&format!(
            r#"
            UPDATE payment_requests
            SET status = $2,
                transaction_id = COALESCE($3, transaction_id),
                payment_method = COALESCE($4, payment_method),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PAYMENT_REQUEST_COLUMNS}
            "#
        ))
        .bind(request_id)
        .bind(status)
        .bind(transaction_id)
        .bind(payment_method)
        .fetch_one(&self.pool)
        .await
    }
}

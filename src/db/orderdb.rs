// db/orderdb.rs
use async_trait::async_trait;
use uuid::Uuid;
use sqlx::Error;

use super::db::DBClient;
use crate::models::ordermodels::*;

#[async_trait]
pub trait OrderExt {
    /// Uniform two-party view of an order. For service orders the freelancer
    /// is reached through the referenced service listing; proposal orders
    /// store it directly.
    async fn get_order_summary(
        &self,
        kind: OrderKind,
        order_id: Uuid,
    ) -> Result<Option<OrderSummary>, Error>;

    async fn update_order_status(
        &self,
        kind: OrderKind,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<OrderSummary>, Error>;
}

#[async_trait]
impl OrderExt for DBClient {
    async fn get_order_summary(
        &self,
        kind: OrderKind,
        order_id: Uuid,
    ) -> Result<Option<OrderSummary>, Error> {
        match kind {
            OrderKind::Service => {
                sqlx::query_as::<_, OrderSummary>(
                    r#"
                    SELECT o.id, 'service'::order_kind AS order_kind, o.client_id,
                           s.freelancer_id, o.status, o.message, o.created_at
                    FROM service_orders o
                    INNER JOIN services s ON s.id = o.service_id
                    WHERE o.id = $1
                    "#
                )
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await
            }
            OrderKind::Proposal => {
                sqlx::query_as::<_, OrderSummary>(
                    r#"
                    SELECT o.id, 'proposal'::order_kind AS order_kind, o.client_id,
                           o.freelancer_id, o.status, o.message, o.created_at
                    FROM proposal_orders o
                    WHERE o.id = $1
                    "#
                )
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await
            }
        }
    }

    async fn update_order_status(
        &self,
        kind: OrderKind,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<OrderSummary>, Error> {
        let updated: Option<Uuid> = match kind {
            OrderKind::Service => {
                sqlx::query_scalar::<_, Uuid>(
                    r#"
                    UPDATE service_orders SET status = $2 WHERE id = $1 RETURNING id
                    "#
                )
                .bind(order_id)
                .bind(status)
                .fetch_optional(&self.pool)
                .await?
            }
            OrderKind::Proposal => {
                sqlx::query_scalar::<_, Uuid>(
                    r#"
                    UPDATE proposal_orders SET status = $2 WHERE id = $1 RETURNING id
                    "#
                )
                .bind(order_id)
                .bind(status)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        match updated {
            Some(id) => self.get_order_summary(kind, id).await,
            None => Ok(None),
        }
    }
}

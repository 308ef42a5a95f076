// models/ordermodels.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The two commercial relationships an order can model: a purchase of a
/// pre-listed service, or an accepted custom proposal.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "order_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Service,
    Proposal,
}

impl OrderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderKind::Service => "service",
            OrderKind::Proposal => "proposal",
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
    Cancelled,
}

/// Uniform two-party view of an order regardless of its kind. The service
/// kind derives the freelancer through the referenced listing; proposal
/// orders store the freelancer directly.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct OrderSummary {
    pub id: Uuid,
    pub order_kind: OrderKind,
    pub client_id: Uuid,
    pub freelancer_id: Uuid,
    pub status: Option<OrderStatus>,
    pub message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

// models/contractmodels.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ordermodels::OrderKind;

/// Fixed, ordered sequence of workflow stages an accepted contract moves
/// through. `workflow_status` must always be a member of this list.
pub const WORKFLOW_STAGES: [&str; 10] = [
    "planning",
    "draft",
    "submitted",
    "negotiation",
    "accepted",
    "started",
    "milestone-1",
    "review",
    "completed",
    "paid",
];

pub fn stage_index(stage: &str) -> Option<usize> {
    WORKFLOW_STAGES.iter().position(|s| *s == stage)
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "contract_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Draft,
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Contract {
    pub id: Uuid,
    pub amount: f64,
    pub deadline: NaiveDate,
    pub terms: String,
    pub milestones: String,
    pub status: Option<ContractStatus>,
    pub workflow_status: String,
    pub service_order_id: Option<Uuid>,
    pub proposal_order_id: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Contract {
    /// The anchoring order. A check constraint guarantees exactly one anchor
    /// column is set, so `None` only occurs on rows that violated it.
    pub fn anchor(&self) -> Option<(OrderKind, Uuid)> {
        match (self.service_order_id, self.proposal_order_id) {
            (Some(id), None) => Some((OrderKind::Service, id)),
            (None, Some(id)) => Some((OrderKind::Proposal, id)),
            _ => None,
        }
    }

    /// Display-only progress ratio derived from the workflow stage position.
    pub fn progress(&self) -> f64 {
        match stage_index(&self.workflow_status) {
            Some(idx) => (idx + 1) as f64 / WORKFLOW_STAGES.len() as f64,
            None => 0.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payment_request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentRequestStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct PaymentRequest {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub requested_by: Uuid,
    pub payee: Uuid,
    pub amount: f64,
    pub status: Option<PaymentRequestStatus>,
    pub transaction_id: Option<String>,
    pub payment_method: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_index_knows_every_stage() {
        assert_eq!(stage_index("planning"), Some(0));
        assert_eq!(stage_index("milestone-1"), Some(6));
        assert_eq!(stage_index("paid"), Some(9));
        assert_eq!(stage_index("shipping"), None);
    }

    fn contract_at(stage: &str) -> Contract {
        Contract {
            id: Uuid::new_v4(),
            amount: 500.0,
            deadline: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            terms: "Two revisions included".to_string(),
            milestones: String::new(),
            status: Some(ContractStatus::Accepted),
            workflow_status: stage.to_string(),
            service_order_id: Some(Uuid::new_v4()),
            proposal_order_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn progress_is_position_over_length() {
        assert_eq!(contract_at("planning").progress(), 0.1);
        assert_eq!(contract_at("accepted").progress(), 0.5);
        assert_eq!(contract_at("paid").progress(), 1.0);
    }

    #[test]
    fn anchor_resolves_exactly_one_side() {
        let mut contract = contract_at("planning");
        let service_id = contract.service_order_id.unwrap();
        assert_eq!(contract.anchor(), Some((OrderKind::Service, service_id)));

        contract.service_order_id = None;
        assert_eq!(contract.anchor(), None);

        let proposal_id = Uuid::new_v4();
        contract.proposal_order_id = Some(proposal_id);
        assert_eq!(contract.anchor(), Some((OrderKind::Proposal, proposal_id)));
    }
}

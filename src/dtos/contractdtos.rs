// dtos/contractdtos.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::contractmodels::Contract;

#[derive(Debug, Deserialize, Validate)]
pub struct ProposeContractDto {
    #[validate(range(min = 0.0))]
    pub amount: f64,
    pub deadline: NaiveDate,
    #[validate(length(min = 10, max = 5000))]
    pub terms: String,
    pub milestones: Option<String>,
    pub service_order_id: Option<Uuid>,
    pub proposal_order_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdvanceStageDto {
    #[validate(length(min = 1, message = "workflow_status is required"))]
    pub workflow_status: String,
}

#[derive(Debug, Deserialize)]
pub struct AnchorQuery {
    pub order_type: Option<String>,
    pub order_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ContractResponse {
    pub contract: Contract,
    pub progress: f64,
}

impl From<Contract> for ContractResponse {
    fn from(contract: Contract) -> Self {
        let progress = contract.progress();
        Self { contract, progress }
    }
}

#[derive(Debug, Serialize)]
pub struct CounterpartsResponse {
    pub counterpart_user_ids: Vec<Uuid>,
    pub total: usize,
}

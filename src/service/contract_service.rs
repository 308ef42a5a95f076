// service/contract_service.rs
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use crate::{
    db::contractdb::ContractExt,
    models::contractmodels::{stage_index, Contract, ContractStatus},
    models::usermodel::User,
    service::error::ServiceError,
    service::order_resolver::{resolve_parties, OrderParties, OrderRef},
    ws::{contract_topic, ChannelRegistry},
    DBClient,
};

/// Collapse the optional anchor pair into a single order reference.
/// Both-or-neither is rejected before any row is touched.
pub fn anchor_ref(
    service_order_id: Option<Uuid>,
    proposal_order_id: Option<Uuid>,
) -> Result<OrderRef, ServiceError> {
    match (service_order_id, proposal_order_id) {
        (Some(id), None) => Ok(OrderRef::Service(id)),
        (None, Some(id)) => Ok(OrderRef::Proposal(id)),
        _ => Err(ServiceError::InvalidAnchor),
    }
}

/// Coarse status must still be open for a party decision.
fn validate_decision(current: Option<ContractStatus>) -> Result<(), ServiceError> {
    match current.unwrap_or(ContractStatus::Draft) {
        ContractStatus::Draft | ContractStatus::Pending => Ok(()),
        ContractStatus::Accepted => Err(ServiceError::InvalidState(
            "contract has already been accepted".to_string(),
        )),
        ContractStatus::Rejected => Err(ServiceError::InvalidState(
            "contract has already been rejected".to_string(),
        )),
    }
}

#[derive(Debug, Clone)]
pub struct ContractService {
    db_client: Arc<DBClient>,
    channels: ChannelRegistry,
}

impl ContractService {
    pub fn new(db_client: Arc<DBClient>, channels: ChannelRegistry) -> Self {
        Self { db_client, channels }
    }

    /// Create a contract in draft/planning, anchored to exactly one order.
    /// Only the order's freelancer proposes terms.
    pub async fn propose(
        &self,
        caller: &User,
        amount: f64,
        deadline: NaiveDate,
        terms: String,
        milestones: String,
        service_order_id: Option<Uuid>,
        proposal_order_id: Option<Uuid>,
    ) -> Result<Contract, ServiceError> {
        let order = anchor_ref(service_order_id, proposal_order_id)?;
        let parties = resolve_parties(&self.db_client, &order).await?;

        if !caller.is_freelancer(parties.freelancer) {
            return Err(ServiceError::Forbidden);
        }

        let contract = self
            .db_client
            .create_contract(
                amount,
                deadline,
                terms,
                milestones,
                service_order_id,
                proposal_order_id,
            )
            .await?;

        self.broadcast_contract(&contract, "contract.proposed").await;
        Ok(contract)
    }

    /// Fetch a contract the caller participates in. Outsiders get the same
    /// not-found as a missing row.
    pub async fn get_for_participant(
        &self,
        contract_id: Uuid,
        caller: &User,
    ) -> Result<(Contract, OrderRef, OrderParties), ServiceError> {
        let contract = self
            .db_client
            .get_contract_by_id(contract_id)
            .await?
            .ok_or(ServiceError::ContractNotFound)?;

        let (kind, order_id) = contract.anchor().ok_or(ServiceError::InvalidAnchor)?;
        let order = OrderRef::new(kind, order_id);
        let parties = resolve_parties(&self.db_client, &order).await?;

        if !caller.is_client(parties.client) && !caller.is_freelancer(parties.freelancer) {
            return Err(ServiceError::ContractNotFound);
        }

        Ok((contract, order, parties))
    }

    pub async fn accept(&self, contract_id: Uuid, caller: &User) -> Result<Contract, ServiceError> {
        self.decide(contract_id, caller, ContractStatus::Accepted, "contract.accepted")
            .await
    }

    pub async fn reject(&self, contract_id: Uuid, caller: &User) -> Result<Contract, ServiceError> {
        self.decide(contract_id, caller, ContractStatus::Rejected, "contract.rejected")
            .await
    }

    async fn decide(
        &self,
        contract_id: Uuid,
        caller: &User,
        decision: ContractStatus,
        event: &str,
    ) -> Result<Contract, ServiceError> {
        let (contract, _, parties) = self.get_for_participant(contract_id, caller).await?;

        // Acceptance is the paying side's call.
        if !caller.is_client(parties.client) {
            return Err(ServiceError::Forbidden);
        }

        validate_decision(contract.status)?;

        let updated = self
            .db_client
            .update_contract_status(contract_id, decision)
            .await?;

        self.broadcast_contract(&updated, event).await;
        Ok(updated)
    }

    /// Move the workflow pointer to another named stage. Membership in the
    /// fixed stage list is enforced; ordering is left to the parties.
    pub async fn advance_stage(
        &self,
        contract_id: Uuid,
        caller: &User,
        new_stage: &str,
    ) -> Result<Contract, ServiceError> {
        if stage_index(new_stage).is_none() {
            return Err(ServiceError::Validation(format!(
                "'{}' is not a workflow stage",
                new_stage
            )));
        }

        let _ = self.get_for_participant(contract_id, caller).await?;

        let updated = self
            .db_client
            .update_contract_stage(contract_id, new_stage)
            .await?;

        self.broadcast_contract(&updated, "contract.stage_changed").await;
        Ok(updated)
    }

    pub async fn list_for_anchor(
        &self,
        caller: &User,
        order: OrderRef,
    ) -> Result<Vec<Contract>, ServiceError> {
        let parties = resolve_parties(&self.db_client, &order).await?;

        if !caller.is_client(parties.client) && !caller.is_freelancer(parties.freelancer) {
            return Err(ServiceError::OrderNotFound(order.order_id()));
        }

        Ok(self
            .db_client
            .list_contracts_by_anchor(order.kind(), order.order_id())
            .await?)
    }

    /// Push the full updated contract to both parties' live connections.
    pub async fn broadcast_contract(&self, contract: &Contract, event: &str) {
        let Some((kind, order_id)) = contract.anchor() else {
            return;
        };

        let payload = json!({
            "event": event,
            "contract": contract,
            "progress": contract.progress(),
        });

        self.channels
            .broadcast(&contract_topic(kind, order_id), payload.to_string())
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_requires_exactly_one_order() {
        let service = Uuid::new_v4();
        let proposal = Uuid::new_v4();

        assert_eq!(
            anchor_ref(Some(service), None).unwrap(),
            OrderRef::Service(service)
        );
        assert_eq!(
            anchor_ref(None, Some(proposal)).unwrap(),
            OrderRef::Proposal(proposal)
        );
        assert!(matches!(
            anchor_ref(Some(service), Some(proposal)),
            Err(ServiceError::InvalidAnchor)
        ));
        assert!(matches!(anchor_ref(None, None), Err(ServiceError::InvalidAnchor)));
    }

    #[test]
    fn decisions_only_apply_to_open_contracts() {
        assert!(validate_decision(Some(ContractStatus::Draft)).is_ok());
        assert!(validate_decision(Some(ContractStatus::Pending)).is_ok());
        assert!(validate_decision(None).is_ok());

        assert!(matches!(
            validate_decision(Some(ContractStatus::Accepted)),
            Err(ServiceError::InvalidState(_))
        ));
        assert!(matches!(
            validate_decision(Some(ContractStatus::Rejected)),
            Err(ServiceError::InvalidState(_))
        ));
    }
}

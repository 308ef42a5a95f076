// db/contractdb.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;
use sqlx::Error;

use super::db::DBClient;
use crate::models::contractmodels::*;
use crate::models::ordermodels::OrderKind;

const CONTRACT_COLUMNS: &str =
    "id, amount, deadline, terms, milestones, status, workflow_status, \
     service_order_id, proposal_order_id, created_at, updated_at";

// Resolves both anchor kinds to the caller's profile columns.
const CONTRACT_PARTY_JOIN: &str =
    "LEFT JOIN service_orders so ON c.service_order_id = so.id \
     LEFT JOIN services s ON so.service_id = s.id \
     LEFT JOIN proposal_orders po ON c.proposal_order_id = po.id";

#[async_trait]
pub trait ContractExt {
    async fn create_contract(
        &self,
        amount: f64,
        deadline: NaiveDate,
        terms: String,
        milestones: String,
        service_order_id: Option<Uuid>,
        proposal_order_id: Option<Uuid>,
    ) -> Result<Contract, Error>;

    async fn get_contract_by_id(&self, contract_id: Uuid) -> Result<Option<Contract>, Error>;

    async fn list_contracts_by_anchor(
        &self,
        kind: OrderKind,
        order_id: Uuid,
    ) -> Result<Vec<Contract>, Error>;

    async fn list_contracts_for_parties(
        &self,
        client_profile: Option<Uuid>,
        freelancer_profile: Option<Uuid>,
    ) -> Result<Vec<Contract>, Error>;

    /// Accepted contracts whose workflow has not yet reached completion.
    async fn list_active_contracts_for_parties(
        &self,
        client_profile: Option<Uuid>,
        freelancer_profile: Option<Uuid>,
    ) -> Result<Vec<Contract>, Error>;

    /// Distinct users on the other side of the caller's contracts.
    async fn counterpart_user_ids(
        &self,
        client_profile: Option<Uuid>,
        freelancer_profile: Option<Uuid>,
    ) -> Result<Vec<Uuid>, Error>;

    async fn update_contract_status(
        &self,
        contract_id: Uuid,
        status: ContractStatus,
    ) -> Result<Contract, Error>;

    async fn update_contract_stage(
        &self,
        contract_id: Uuid,
        workflow_status: &str,
    ) -> Result<Contract, Error>;
}

#[async_trait]
impl ContractExt for DBClient {
    async fn create_contract(
        &self,
        amount: f64,
        deadline: NaiveDate,
        terms: String,
        milestones: String,
        service_order_id: Option<Uuid>,
        proposal_order_id: Option<Uuid>,
    ) -> Result<Contract, Error> {
        sqlx::query_as::<_, Contract>(&format!(
            r#"
            INSERT INTO contracts
                (amount, deadline, terms, milestones, service_order_id, proposal_order_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CONTRACT_COLUMNS}
            "#
        ))
        .bind(amount)
        .bind(deadline)
        .bind(terms)
        .bind(milestones)
        .bind(service_order_id)
        .bind(proposal_order_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_contract_by_id(&self, contract_id: Uuid) -> Result<Option<Contract>, Error> {
        sqlx::query_as::<_, Contract>(&format!(
            r#"
            SELECT {CONTRACT_COLUMNS}
            FROM contracts
            WHERE id = $1
            "#
        ))
        .bind(contract_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_contracts_by_anchor(
        &self,
        kind: OrderKind,
        order_id: Uuid,
    ) -> Result<Vec<Contract>, Error> {
        let anchor_column = match kind {
            OrderKind::Service => "service_order_id",
            OrderKind::Proposal => "proposal_order_id",
        };

        sqlx::query_as::<_, Contract>(&format!(
            r#"
            SELECT {CONTRACT_COLUMNS}
            FROM contracts
            WHERE {anchor_column} = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_contracts_for_parties(
        &self,
        client_profile: Option<Uuid>,
        freelancer_profile: Option<Uuid>,
    ) -> Result<Vec<Contract>, Error> {
        sqlx::query_as::<_, Contract>(&format!(
            r#"
            SELECT c.id, c.amount, c.deadline, c.terms, c.milestones, c.status,
                   c.workflow_status, c.service_order_id, c.proposal_order_id,
                   c.created_at, c.updated_at
            FROM contracts c
            {CONTRACT_PARTY_JOIN}
            WHERE so.client_id = $1 OR po.client_id = $1
               OR s.freelancer_id = $2 OR po.freelancer_id = $2
            ORDER BY c.updated_at DESC
            "#
        ))
        .bind(client_profile)
        .bind(freelancer_profile)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_active_contracts_for_parties(
        &self,
        client_profile: Option<Uuid>,
        freelancer_profile: Option<Uuid>,
    ) -> Result<Vec<Contract>, Error> {
        sqlx::query_as::<_, Contract>(&format!(
            r#"
            SELECT c.id, c.amount, c.deadline, c.terms, c.milestones, c.status,
                   c.workflow_status, c.service_order_id, c.proposal_order_id,
                   c.created_at, c.updated_at
            FROM contracts c
            {CONTRACT_PARTY_JOIN}
            WHERE (so.client_id = $1 OR po.client_id = $1
                   OR s.freelancer_id = $2 OR po.freelancer_id = $2)
              AND c.status = 'accepted'::contract_status
              AND c.workflow_status NOT IN ('completed', 'paid')
            ORDER BY c.updated_at DESC
            "#
        ))
        .bind(client_profile)
        .bind(freelancer_profile)
        .fetch_all(&self.pool)
        .await
    }

    async fn counterpart_user_ids(
        &self,
        client_profile: Option<Uuid>,
        freelancer_profile: Option<Uuid>,
    ) -> Result<Vec<Uuid>, Error> {
        sqlx::query_scalar::<_, Uuid>(&format!(
            r#"
            SELECT DISTINCT fp.user_id
            FROM contracts c
            {CONTRACT_PARTY_JOIN}
            INNER JOIN freelancer_profiles fp
                ON fp.id = COALESCE(s.freelancer_id, po.freelancer_id)
            WHERE so.client_id = $1 OR po.client_id = $1
            UNION
            SELECT DISTINCT cp.user_id
            FROM contracts c
            {CONTRACT_PARTY_JOIN}
            INNER JOIN client_profiles cp
                ON cp.id = COALESCE(so.client_id, po.client_id)
            WHERE s.freelancer_id = $2 OR po.freelancer_id = $2
            "#
        ))
        .bind(client_profile)
        .bind(freelancer_profile)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_contract_status(
        &self,
        contract_id: Uuid,
        status: ContractStatus,
    ) -> Result<Contract, Error> {
        sqlx::query_as::<_, Contract>(&format!(
            r#"
            UPDATE contracts
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {CONTRACT_COLUMNS}
            "#
        ))
        .bind(contract_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_contract_stage(
        &self,
        contract_id: Uuid,
        workflow_status: &str,
    ) -> Result<Contract, Error> {
        sqlx::query_as::<_, Contract>(&format!(
            r#"
            UPDATE contracts
            SET workflow_status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {CONTRACT_COLUMNS}
            "#
        ))
        .bind(contract_id)
        .bind(workflow_status)
        .fetch_one(&self.pool)
        .await
    }
}

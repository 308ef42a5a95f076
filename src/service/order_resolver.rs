// service/order_resolver.rs
use uuid::Uuid;

use crate::{
    db::orderdb::OrderExt,
    models::ordermodels::{OrderKind, OrderSummary},
    service::error::ServiceError,
    DBClient,
};

/// Tagged reference to a concrete order. The kind set is closed: anything
/// else fails at parse time, before any lookup happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderRef {
    Service(Uuid),
    Proposal(Uuid),
}

impl OrderRef {
    pub fn new(kind: OrderKind, order_id: Uuid) -> Self {
        match kind {
            OrderKind::Service => OrderRef::Service(order_id),
            OrderKind::Proposal => OrderRef::Proposal(order_id),
        }
    }

    pub fn parse(kind: &str, order_id: Uuid) -> Result<Self, ServiceError> {
        match kind {
            "service" => Ok(OrderRef::Service(order_id)),
            "proposal" => Ok(OrderRef::Proposal(order_id)),
            other => Err(ServiceError::InvalidOrderKind(other.to_string())),
        }
    }

    pub fn kind(&self) -> OrderKind {
        match self {
            OrderRef::Service(_) => OrderKind::Service,
            OrderRef::Proposal(_) => OrderKind::Proposal,
        }
    }

    pub fn order_id(&self) -> Uuid {
        match self {
            OrderRef::Service(id) | OrderRef::Proposal(id) => *id,
        }
    }
}

/// The two participant profiles every order kind resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderParties {
    pub client: Uuid,
    pub freelancer: Uuid,
}

pub async fn resolve_order(
    db_client: &DBClient,
    order: &OrderRef,
) -> Result<OrderSummary, ServiceError> {
    db_client
        .get_order_summary(order.kind(), order.order_id())
        .await?
        .ok_or(ServiceError::OrderNotFound(order.order_id()))
}

pub async fn resolve_parties(
    db_client: &DBClient,
    order: &OrderRef,
) -> Result<OrderParties, ServiceError> {
    let summary = resolve_order(db_client, order).await?;
    Ok(OrderParties {
        client: summary.client_id,
        freelancer: summary.freelancer_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_the_two_known_kinds() {
        let id = Uuid::new_v4();
        assert_eq!(OrderRef::parse("service", id).unwrap(), OrderRef::Service(id));
        assert_eq!(OrderRef::parse("proposal", id).unwrap(), OrderRef::Proposal(id));
    }

    #[test]
    fn parse_rejects_unknown_kind_before_lookup() {
        let err = OrderRef::parse("gig", Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOrderKind(kind) if kind == "gig"));
    }

    #[test]
    fn order_ref_round_trips_kind_and_id() {
        let id = Uuid::new_v4();
        let service = OrderRef::new(OrderKind::Service, id);
        assert_eq!(service.kind(), OrderKind::Service);
        assert_eq!(service.order_id(), id);

        let proposal = OrderRef::new(OrderKind::Proposal, id);
        assert_eq!(proposal.kind(), OrderKind::Proposal);
        assert_eq!(proposal.order_id(), id);
    }
}

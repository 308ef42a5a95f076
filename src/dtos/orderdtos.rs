// dtos/orderdtos.rs
use serde::Deserialize;

use crate::models::ordermodels::OrderStatus;

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusDto {
    pub status: OrderStatus,
}

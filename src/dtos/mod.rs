pub mod chatdtos;
pub mod contractdtos;
pub mod orderdtos;
pub mod paymentdtos;

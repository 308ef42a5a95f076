pub mod chatmodels;
pub mod contractmodels;
pub mod ordermodels;
pub mod usermodel;

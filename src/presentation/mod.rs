pub mod builders;
pub mod views;

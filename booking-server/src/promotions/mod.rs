//! Promotion domain logic: code validation and discount computation

pub mod discount;
pub mod validator;

pub use discount::compute_discount;
pub use validator::validate_promo_code;

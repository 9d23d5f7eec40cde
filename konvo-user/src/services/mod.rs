pub mod credit_service;
pub mod referral_service;

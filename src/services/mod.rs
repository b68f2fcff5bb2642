pub mod auth;
pub mod eligibility;
pub mod ordering;

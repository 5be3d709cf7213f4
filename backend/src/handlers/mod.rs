pub mod admin;
pub mod approvals;
pub mod auth;
pub mod regularizations;

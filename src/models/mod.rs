pub mod appointment;
pub mod audit;
pub mod auth;
pub mod dashboard;
pub mod payment;
pub mod report;

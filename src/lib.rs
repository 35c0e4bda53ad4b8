//! Egress IP reputation auditing and forum check-in automation.

pub mod checkin;
pub mod cli;
pub mod config;
pub mod core;
pub mod sources;

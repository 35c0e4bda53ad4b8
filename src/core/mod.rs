//! Engine, report model, and the other cross-cutting pieces.

pub mod engine;
pub mod error;
pub mod notify;
pub mod report;
pub mod state;

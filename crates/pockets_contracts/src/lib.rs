#![forbid(unsafe_code)]

pub mod access;
pub mod audit;
pub mod catalog;
pub mod common;
pub mod contact;
pub mod payment;
pub mod quiz;
pub mod session;

pub use common::{ContractViolation, MonotonicTimeNs, ReasonCodeId, SchemaVersion, Validate};

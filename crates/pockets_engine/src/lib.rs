#![forbid(unsafe_code)]

pub mod access;
pub mod auth;
pub mod contact_relay;
pub mod payment;
pub mod quiz;

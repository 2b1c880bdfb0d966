#![forbid(unsafe_code)]

pub mod kv;
pub mod profile;
pub mod repo;
pub mod trail;

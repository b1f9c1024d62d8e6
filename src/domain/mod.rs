//! Domain layer: accounts, transfers and the storage ports they are persisted through.

pub mod account;
pub mod ports;
pub mod transfer;

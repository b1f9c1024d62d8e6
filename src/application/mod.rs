//! Application layer containing the business operations.
//!
//! `AccountService` manages account records and `TransferExecutor` moves
//! funds between them. Both receive their storage backends at construction.

pub mod accounts;
pub mod executor;

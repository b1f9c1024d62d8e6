use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::application::executor::DEFAULT_MAX_RETRIES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// REST API for accounts and transfers between them.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "BANKAPI_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "BANKAPI_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Log filter directive, overridden by RUST_LOG
    #[arg(long, env = "BANKAPI_LOG", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Retries for a balance update that lost a concurrent-write race
    #[arg(long, env = "BANKAPI_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,
}

//! Process configuration.
//!
//! Every setting is a CLI flag with an environment fallback:
//!
//! | Flag               | Env                    | Default        |
//! |--------------------|------------------------|----------------|
//! | `--addr`           | `POSTS_ADDR`           | `0.0.0.0:3000` |
//! | `--log-level`      | `POSTS_LOG_LEVEL`      | `info`         |
//! | `--log-format`     | `POSTS_LOG_FORMAT`     | `pretty`       |
//! | `--max-body-bytes` | `POSTS_MAX_BODY_BYTES` | `1048576`      |
//!
//! `RUST_LOG`, when set, overrides `--log-level` entirely.

use std::net::SocketAddr;

use clap::{Parser, ValueEnum};

use crate::error::Error;
use crate::server::DEFAULT_BODY_LIMIT;

#[derive(Debug, Clone, Parser)]
#[command(name = "posts", version, about = "Blog-post JSON API")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "POSTS_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: String,

    /// Default log level when RUST_LOG is unset.
    #[arg(long, env = "POSTS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "POSTS_LOG_FORMAT", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Largest request body accepted; anything bigger gets 413.
    #[arg(long, env = "POSTS_MAX_BODY_BYTES", default_value_t = DEFAULT_BODY_LIMIT)]
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable, multi-line.
    Pretty,
    /// One JSON object per event.
    Json,
}

impl Config {
    pub fn socket_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.addr.parse()?)
    }
}

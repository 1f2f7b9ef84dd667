//! Blocking client for the Ilkbyte hosting API.
//!
//! # Overview
//! Account info, server lifecycle, snapshots, backups and domain/DNS
//! management, each exposed as one method on [`Ilkbyte`]. Every call is a
//! single authenticated GET whose JSON body is returned as
//! `serde_json::Value`.
//!
//! # Design
//! - `Credentials` are resolved once, from arguments or `ILKBYTE_*`
//!   environment variables; a missing value fails construction.
//! - `Session` appends the `secret`/`access` query pair to every request,
//!   overriding caller-supplied values under the same keys.
//! - `Operation` is the declarative catalog of endpoints; `Ilkbyte::invoke`
//!   is the single routine that executes any of them.
//! - The HTTP client sits behind the `Transport` trait. `UreqTransport` is
//!   the default; its errors reach the caller unchanged.
//!
//! ```no_run
//! use ilkbyte_core::{Ilkbyte, PowerAction};
//!
//! let client = Ilkbyte::from_env()?;
//! let account = client.get_account()?;
//! println!("{account}");
//! client.set_power("web1", PowerAction::Reboot)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod operation;
pub mod params;
pub mod session;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{ApiResult, Ilkbyte};
pub use config::Credentials;
pub use error::{ConfigError, Error, ResponseBody};
pub use http::{HttpRequest, HttpResponse, Transport, UreqTransport};
pub use operation::Operation;
pub use params::{ParamValue, Params};
pub use session::Session;
pub use types::{CreateServer, CronSchedule, DnsRecord, DnsRecordType, PowerAction};

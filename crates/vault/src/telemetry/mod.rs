//! Structured logging setup.
//!
//! # Telemetry invariants
//!
//! - **No plaintext field values or key material** may appear in any span
//!   attribute or log field. Collection names, record ids and field names are
//!   fine.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   overrides it.

pub mod init;

pub use init::init;

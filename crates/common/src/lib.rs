//! Common utilities and shared types for the CyberSecure Portal gateway.
//!
//! This crate provides foundational components used across all workspace crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: UUID identifiers via [`IdGenerator`]
//! - **Storage**: Evidence object storage backends (BaaS bucket, local filesystem)
//!
//! # Example
//!
//! ```no_run
//! use cybersecure_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Listening on {} with report {}", config.server.port, id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use storage::{
    BaasStorage, LocalStorage, StorageBackend, StorageConfig, UploadedFile, evidence_key,
    report_evidence_key,
};

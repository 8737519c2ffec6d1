//! filenest server
//!
//! A small personal file server: sandboxed directory browsing, built-in
//! static resources, and self-service account registration with optional
//! email confirmation. Confirmed accounts get a private storage root that is
//! handed to the file transfer server.

pub mod config;
pub mod dashboard;
pub mod email;
pub mod error;
pub mod pages;
pub mod provision;
pub mod registration;
pub mod resources;
pub mod router;
pub mod routes;
pub mod state;
pub mod store;
pub mod streamer;
pub mod transfer;

pub use config::{Cli, Config, ConfigError};
pub use dashboard::UploadStats;
pub use email::{ConsoleEmailSender, EmailSender, SmtpConfig, SmtpEmailSender};
pub use error::ServerError;
pub use provision::Provisioner;
pub use router::{MatchMode, PathRouter};
pub use state::AppState;
pub use store::{AccountStore, FileAccountStore, InMemoryAccountStore, PendingRegistrations};
pub use transfer::{LocalTransferServer, Permission, TransferEvent, TransferServer};

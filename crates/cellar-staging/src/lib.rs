//! Staging store: per-session temporary directories holding in-flight
//! deploy uploads, plus the session cookie that lets stateless PUTs
//! converge onto one directory.

pub mod session;
pub mod sidecar;
pub mod staging;

pub use session::Session;
pub use sidecar::SidecarMetadata;
pub use staging::{find_upload_dir, StagingDir};

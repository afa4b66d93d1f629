pub mod collaborators;
pub mod fakes;
pub mod finalize;
pub mod upload;

pub use collaborators::{BlobStore, ErrorReporter, JarRecord, MetadataDb, SearchIndex};
pub use finalize::{finalize_deploy, should_trigger_finalization, FinalizeLocks};
pub use upload::{extract_timestamp_version, handle_versioned_upload, upload_request};

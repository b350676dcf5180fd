//! I/O side of the pipeline: transport, staging file, bounded copy.

pub mod copy;
pub mod fetcher;
pub mod http;
pub mod reader;
pub mod staging;

pub use copy::{COPY_BUFFER_SIZE, PartialCopy, copy_with_context};
pub use fetcher::{Fetcher, download};
pub use http::{HttpClient, default_client};
pub use reader::ProgressReader;
pub use staging::{STAGING_PREFIX, StagingFile};

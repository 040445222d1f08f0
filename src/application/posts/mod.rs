//! Read and write services for blog posts.

pub mod read;
pub mod write;

pub use read::{BlogReadService, CacheDirective, ReadError};
pub use write::{BlogWriteAction, GENERIC_FAILURE_MESSAGE, PostSubmitter, SubmitError};

//! Application services layer.

pub mod error;
pub mod form;
pub mod posts;
pub mod remote;
pub mod server_form;

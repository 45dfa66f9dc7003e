//! Shared request and response types.

mod request;
mod response;

pub use request::blank_as_none;
pub use response::{Created, CsvAttachment, MessageResponse};

//! Data models shared across the pipeline.
//!
//! API responses are decoded into these plain value structs at the client
//! boundary; nothing downstream sees raw JSON or XML.

mod issue;
mod paper;

pub use issue::{CreatedIssue, RenderedIssue, RepoRef};
pub use paper::{ArxivPaper, PaperLink};

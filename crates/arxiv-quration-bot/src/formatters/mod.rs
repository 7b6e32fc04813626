//! Output formatters for issue Markdown.

mod markdown;

pub use markdown::*;

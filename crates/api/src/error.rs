use core::fmt::{self, Display};
use serde_json::error::Category;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// The request body could not be read in full.
    Body,
    /// JSON syntax error detected.
    Syntax,
    /// Unexpected JSON data types encountered.
    Data,
    /// The mail worker is no longer accepting messages.
    Closed,
    /// A notification could not be handed over to the mail server.
    Undeliverable,
    /// The mail settings name an unusable address or host.
    Misconfigured,
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => Self::Data,
            Category::Syntax | Category::Eof => Self::Syntax,
            Category::Io => Self::Body,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Body => "Failed to read the request body.",
            Self::Syntax => "Syntax error in JSON detected.",
            Self::Data => "Unexpected data types in JSON detected.",
            Self::Closed => "Oops! We could not pass your feedback along. Please try again later.",
            Self::Undeliverable => "Failed to deliver the feedback notification.",
            Self::Misconfigured => "Invalid mail server configuration.",
        })
    }
}

impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;

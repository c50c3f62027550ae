use core::fmt::{self, Display};
use hyper::http::{self, uri::InvalidUri};
use serde_json::error::Category;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// The request could not be constructed.
    Request,
    /// The server could not be reached or the connection broke midway.
    Transport,
    /// JSON syntax error detected.
    Syntax,
    /// Unexpected JSON data types encountered.
    Data,
    /// The server explicitly refused the submission.
    Rejected(Option<String>),
}

impl From<InvalidUri> for Error {
    fn from(_: InvalidUri) -> Self {
        Self::Request
    }
}

impl From<http::Error> for Error {
    fn from(_: http::Error) -> Self {
        Self::Request
    }
}

impl From<hyper::Error> for Error {
    fn from(_: hyper::Error) -> Self {
        Self::Transport
    }
}

impl From<hyper_util::client::legacy::Error> for Error {
    fn from(_: hyper_util::client::legacy::Error) -> Self {
        Self::Transport
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => Self::Data,
            Category::Syntax | Category::Eof => Self::Syntax,
            Category::Io => Self::Transport,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => f.write_str("Failed to build the feedback request."),
            Self::Transport => f.write_str("Failed to reach the feedback server."),
            Self::Syntax => f.write_str("Syntax error in JSON reply detected."),
            Self::Data => f.write_str("Unexpected data types in JSON reply detected."),
            Self::Rejected(Some(reason)) => write!(f, "The server rejected the feedback: {reason}"),
            Self::Rejected(None) => f.write_str("The server rejected the feedback."),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;

//! Client side of the feedback form: a view-model of the page, the submit handler that
//! posts answers to `/feedback` and the timed reset that brings the form back.

pub mod error;
pub mod handler;
pub mod schedule;
pub mod transport;
pub mod view;

pub use error::{Error, Result};
pub use handler::{LogSink, Outcome, Sink, SubmitEvent, Submitter};
pub use schedule::Schedule;
pub use transport::{HttpTransport, Transport};
pub use view::FeedbackForm;

use crate::{
    error::{Error, Result},
    schedule::Schedule,
    transport::Transport,
    view::{FeedbackForm, WAS_VALIDATED},
};
use model::Reply;
use std::sync::Arc;
use tokio::{sync::Mutex, task::JoinHandle};

pub const ENDPOINT: &str = "/feedback";

/// The submit event as dispatched by the page.
#[derive(Debug, Default)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    /// Stops the browser from navigating away with a native form post.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Native validation failed on the named field. Nothing was sent.
    Invalid(&'static str),
    /// The server accepted the feedback and the reset has been scheduled.
    Sent,
}

/// Receives every failed submission exactly once.
pub trait Sink {
    fn report(&self, err: &Error);
}

impl<F: Fn(&Error)> Sink for F {
    fn report(&self, err: &Error) {
        self(err)
    }
}

/// Sink that only writes to the log.
pub struct LogSink;

impl Sink for LogSink {
    fn report(&self, err: &Error) {
        log::error!("feedback submission failed: {err}");
    }
}

pub struct Submitter<T, S = LogSink> {
    form: Arc<Mutex<FeedbackForm>>,
    transport: T,
    sink: S,
    schedule: Schedule,
    /// Reset task of the most recent successful submission.
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Transport> Submitter<T> {
    pub fn new(form: FeedbackForm, transport: T) -> Self {
        Self::with_sink(form, transport, LogSink)
    }
}

impl<T: Transport, S: Sink> Submitter<T, S> {
    pub fn with_sink(form: FeedbackForm, transport: T, sink: S) -> Self {
        Self {
            form: Arc::new(Mutex::new(form)),
            transport,
            sink,
            schedule: Schedule::default(),
            pending: Mutex::new(None),
        }
    }

    pub fn schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Shared handle to the form, for the page to read from and write into.
    pub fn form(&self) -> &Arc<Mutex<FeedbackForm>> {
        &self.form
    }

    /// Handles a submit event from start to finish. Failures are both returned and
    /// reported to the sink. The form is left untouched on failure.
    pub async fn on_submit(&self, event: &mut SubmitEvent) -> Result<Outcome> {
        event.prevent_default();

        let payload = {
            let mut form = self.form.lock().await;
            form.classes.add(WAS_VALIDATED);
            if let Err(field) = form.check_validity() {
                return Ok(Outcome::Invalid(field));
            }
            form.payload()
        };

        let reply = match self.send(&payload).await {
            Ok(reply) => reply,
            Err(err) => return self.fail(err),
        };

        if !reply.success {
            return self.fail(Error::Rejected(reply.message));
        }

        // Only the latest reset may run, so an older cycle must be gone before the
        // confirmation goes up.
        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        self.form.lock().await.show_thank_you();
        *pending = Some(self.schedule.spawn(Arc::clone(&self.form)));
        drop(pending);

        log::debug!("feedback accepted, form resets in {:?}", self.schedule.deadline());
        Ok(Outcome::Sent)
    }

    async fn send(&self, payload: &model::Feedback) -> Result<Reply> {
        let body = serde_json::to_vec(payload)?;
        let bytes = self.transport.post_json(ENDPOINT, body).await?;
        let reply = serde_json::from_slice(&bytes)?;
        Ok(reply)
    }

    fn fail(&self, err: Error) -> Result<Outcome> {
        self.sink.report(&err);
        Err(err)
    }
}

use crate::error::{Error, Result};
use core::{fmt::Write, future::Future};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
        SUBMISSION_PORT,
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use model::Feedback;
use tokio::sync::mpsc;

pub const SUBJECT: &str = "User feedback on the jigsaw";

/// Number of notifications that may wait for the worker before submissions start to block.
pub const CAPACITY: usize = 10;

/// Writes `text` as a quoted, HTML-escaped string.
fn write_quoted(out: &mut String, text: &str) {
    out.push('"');
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

/// Renders the notification sent out for every submission.
pub fn render(feedback: &Feedback) -> String {
    let Feedback { quest, artwork, overall, quality, reason_to_buy, optional, buy_next } = feedback;
    let mut html = String::from("<p>Hello there,</p>\n\n<p>Somebody has left a feedback for the jigsaw. Here are the answers:\n<ul>\n");

    // Writing into a `String` never fails.
    let _ = writeln!(html, "<li>Quality: {quality}</li>");
    let _ = writeln!(html, "<li>Artwork: {artwork}</li>");
    let _ = writeln!(html, "<li>Quest: {quest}</li>");
    let _ = writeln!(html, "<li>Overall: {overall}</li>");

    html.push_str("<li>Buy next box: ");
    write_quoted(&mut html, buy_next.as_deref().unwrap_or_default());
    html.push_str("</li>\n<li>The reason to buy: ");
    write_quoted(&mut html, reason_to_buy);
    html.push_str("</li>\n<li>Anything to add: ");
    write_quoted(&mut html, optional);
    html.push_str("</li>\n</ul></p>\n\n<p>That's all for now.</p>\n\n<p>Have a nice day!</p>\n");
    html
}

/// A notification ready to be handed to a [`Deliver`] implementation.
#[derive(Debug)]
pub struct Mail {
    pub subject: &'static str,
    pub html: Box<str>,
}

pub trait Deliver {
    fn deliver(&self, mail: &Mail) -> impl Future<Output = Result<()>> + Send;
}

/// Delivery that writes every notification to the log instead of a mail server.
pub struct LogDelivery {
    from: Box<str>,
    to: Box<str>,
}

impl LogDelivery {
    pub fn new(from: Box<str>, to: Box<str>) -> Self {
        Self { from, to }
    }
}

impl Deliver for LogDelivery {
    fn deliver(&self, mail: &Mail) -> impl Future<Output = Result<()>> + Send {
        log::info!("mail from {} to {} with subject {:?}:\n{}", self.from, self.to, mail.subject, mail.html);
        core::future::ready(Ok(()))
    }
}

/// Settings of the mail server that receives the notifications.
#[derive(Clone, Debug, Default)]
pub struct SmtpConfig {
    pub host: String,
    /// Defaults to the submission port when absent.
    pub port: Option<u16>,
    /// Authentication is skipped when empty.
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

/// Delivery over SMTP, upgrading to TLS whenever the server offers `STARTTLS`.
pub struct SmtpDelivery {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpDelivery {
    pub fn new(config: SmtpConfig) -> Result<Self> {
        let SmtpConfig { host, port, username, password, from, to } = config;
        let from = from.parse().map_err(|_| Error::Misconfigured)?;
        let to = to.parse().map_err(|_| Error::Misconfigured)?;

        let tls = TlsParameters::new(host.clone()).map_err(|_| Error::Misconfigured)?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port.unwrap_or(SUBMISSION_PORT))
            .tls(Tls::Opportunistic(tls));
        if !username.is_empty() {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self { transport: builder.build(), from, to })
    }
}

impl Deliver for SmtpDelivery {
    fn deliver(&self, mail: &Mail) -> impl Future<Output = Result<()>> + Send {
        async move {
            let message = Message::builder()
                .from(self.from.clone())
                .to(self.to.clone())
                .subject(mail.subject)
                .header(ContentType::TEXT_HTML)
                .body(String::from(mail.html.as_ref()))
                .map_err(|_| Error::Undeliverable)?;

            log::info!("sending feedback notification to {}", self.to);
            self.transport.send(message).await.map_err(|err| {
                log::error!("smtp: {err}");
                Error::Undeliverable
            })?;
            Ok(())
        }
    }
}

/// Sending half of the mail queue. Cheap to clone.
#[derive(Clone)]
pub struct Outbox(mpsc::Sender<Box<str>>);

impl Outbox {
    /// Queues a rendered notification, waiting for room if the queue is full.
    pub async fn post(&self, html: String) -> Result<()> {
        self.0.send(html.into_boxed_str()).await.map_err(|_| Error::Closed)
    }
}

/// Receiving half of the mail queue.
pub struct Postman(mpsc::Receiver<Box<str>>);

impl Postman {
    /// Delivers queued notifications until every [`Outbox`] has been dropped.
    pub async fn run<D: Deliver>(mut self, delivery: D) {
        while let Some(html) = self.0.recv().await {
            let mail = Mail { subject: SUBJECT, html };
            match delivery.deliver(&mail).await {
                Ok(()) => log::info!("feedback notification sent"),
                Err(err) => log::error!("failed to send feedback notification: {err}"),
            }
        }
        log::info!("mail queue closed");
    }
}

#[cfg(test)]
impl Postman {
    /// Collects everything queued so far. Returns once every [`Outbox`] is gone.
    pub(crate) async fn drain(&mut self) -> Vec<Box<str>> {
        let mut queued = Vec::new();
        while let Some(html) = self.0.recv().await {
            queued.push(html);
        }
        queued
    }
}

pub fn channel(capacity: usize) -> (Outbox, Postman) {
    let (tx, rx) = mpsc::channel(capacity);
    (Outbox(tx), Postman(rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Box<str>>>);

    impl Deliver for &Recorder {
        fn deliver(&self, mail: &Mail) -> impl Future<Output = Result<()>> + Send {
            let mut sent = self.0.lock().unwrap();
            sent.push(mail.html.clone());

            // Every other delivery fails.
            let result = if sent.len() % 2 == 0 { Err(Error::Undeliverable) } else { Ok(()) };
            core::future::ready(result)
        }
    }

    #[test]
    fn renders_every_answer() {
        let feedback = Feedback {
            quest: 4,
            artwork: 5,
            overall: 3,
            quality: 2,
            reason_to_buy: String::from("Loved the story"),
            optional: String::new(),
            buy_next: Some(String::from("yes")),
        };
        let html = render(&feedback);
        assert!(html.contains("<li>Quality: 2</li>"));
        assert!(html.contains("<li>Artwork: 5</li>"));
        assert!(html.contains("<li>Quest: 4</li>"));
        assert!(html.contains("<li>Overall: 3</li>"));
        assert!(html.contains(r#"<li>Buy next box: "yes"</li>"#));
        assert!(html.contains(r#"<li>The reason to buy: "Loved the story"</li>"#));
        assert!(html.contains(r#"<li>Anything to add: ""</li>"#));
    }

    #[test]
    fn escapes_free_text() {
        let feedback = Feedback { optional: String::from("<script>\"hi\"</script>"), ..Default::default() };
        let html = render(&feedback);
        assert!(html.contains("&lt;script&gt;&quot;hi&quot;&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn keeps_delivering_after_failures() {
        let (outbox, postman) = channel(CAPACITY);
        for text in ["first", "second", "third"] {
            outbox.post(String::from(text)).await.unwrap();
        }
        drop(outbox);

        let recorder = Recorder::default();
        postman.run(&recorder).await;
        let sent = recorder.0.into_inner().unwrap();
        assert_eq!(sent.iter().map(|html| &**html).collect::<Vec<&str>>(), ["first", "second", "third"]);
    }

    fn smtp_config(port: u16) -> SmtpConfig {
        SmtpConfig {
            host: String::from("localhost"),
            port: Some(port),
            username: String::from("jigsaw"),
            password: String::from("hunter2"),
            from: String::from("jigsaw@example.com"),
            to: String::from("Owner <owner@example.com>"),
        }
    }

    #[test]
    fn rejects_invalid_mailboxes() {
        let config = SmtpConfig { from: String::from("not an address"), ..smtp_config(587) };
        assert!(matches!(SmtpDelivery::new(config), Err(Error::Misconfigured)));

        let config = SmtpConfig { to: String::new(), ..smtp_config(587) };
        assert!(matches!(SmtpDelivery::new(config), Err(Error::Misconfigured)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unreachable_mail_server_is_undeliverable() {
        let tcp = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let port = tcp.local_addr().unwrap().port();
        drop(tcp);

        let delivery = SmtpDelivery::new(smtp_config(port)).unwrap();
        let mail = Mail { subject: SUBJECT, html: "<p>Hello there,</p>".into() };
        assert_eq!(delivery.deliver(&mail).await, Err(Error::Undeliverable));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn post_fails_once_worker_is_gone() {
        let (outbox, postman) = channel(1);
        drop(postman);
        assert_eq!(outbox.post(String::from("lost")).await, Err(Error::Closed));
    }
}

//! Server side of the feedback form: request routing, the `/feedback` endpoint and the
//! queue that turns every submission into a notification mail.

pub mod error;
pub mod feedback;
pub mod mail;

use http_body_util::Full;
use hyper::{
    body::{Body, Bytes},
    header::{HeaderValue, CONTENT_TYPE},
    Method, Request, Response, StatusCode,
};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

fn text(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    let mut res = Response::new(Full::new(Bytes::from(body)));
    *res.status_mut() = status;
    assert!(res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN)).is_none());
    res
}

pub struct Service {
    greeting: Box<str>,
    outbox: mail::Outbox,
}

impl Service {
    pub fn new(name: &str, outbox: mail::Outbox) -> Self {
        Self { greeting: format!("Hello {name}!\n").into_boxed_str(), outbox }
    }

    pub async fn respond<B: Body>(&self, req: Request<B>) -> Response<Full<Bytes>> {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        match self.try_respond(req).await {
            Ok(res) => {
                log::debug!("{method} {path} -> {}", res.status());
                res
            }
            Err(code) => {
                log::warn!("{method} {path} -> {code}");
                let mut res = Response::new(Full::default());
                *res.status_mut() = code;
                res
            }
        }
    }

    async fn try_respond<B: Body>(&self, req: Request<B>) -> Result<Response<Full<Bytes>>, StatusCode> {
        let (parts, body) = req.into_parts();
        match parts.uri.path() {
            "/" if parts.method == Method::GET => Ok(text(StatusCode::OK, self.greeting.to_string())),
            "/feedback" if parts.method == Method::POST => feedback::try_respond(body, &self.outbox).await,
            "/feedback" => {
                let message = format!("Method {:?} is not supported", parts.method.as_str());
                Ok(text(StatusCode::METHOD_NOT_ALLOWED, message))
            }
            _ => Err(StatusCode::NOT_FOUND),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use model::Reply;

    fn request(method: Method, path: &'static str, body: &'static str) -> Request<Full<Bytes>> {
        Request::builder().method(method).uri(path).body(Full::new(Bytes::from_static(body.as_bytes()))).unwrap()
    }

    async fn read(res: Response<Full<Bytes>>) -> (StatusCode, Bytes) {
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, bytes)
    }

    #[tokio::test(flavor = "current_thread")]
    async fn greets_on_root() {
        let (outbox, _postman) = mail::channel(1);
        let service = Service::new("World!", outbox);
        let (status, body) = read(service.respond(request(Method::GET, "/", "")).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_ref(), b"Hello World!!\n");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn queues_valid_feedback() {
        let (outbox, mut postman) = mail::channel(mail::CAPACITY);
        let service = Service::new("World!", outbox);
        let payload = r#"{"quest":4,"artwork":5,"overall":3,"quality":2,"reasonToBuy":"Fun","optional":""}"#;

        let res = service.respond(request(Method::POST, "/feedback", payload)).await;
        assert_eq!(res.headers().get(CONTENT_TYPE).unwrap(), feedback::APPLICATION_JSON);
        let (status, body) = read(res).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_slice::<Reply>(&body).unwrap(), Reply::accepted());

        drop(service);
        let queued = postman.drain().await;
        assert_eq!(queued.len(), 1);
        assert!(queued[0].contains("<li>Quest: 4</li>"));
        assert!(queued[0].contains(r#"<li>The reason to buy: "Fun"</li>"#));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn malformed_feedback_is_rejected_in_reply() {
        let (outbox, mut postman) = mail::channel(mail::CAPACITY);
        let service = Service::new("World!", outbox);

        let (status, body) = read(service.respond(request(Method::POST, "/feedback", "{not json")).await).await;
        assert_eq!(status, StatusCode::OK);
        let reply: Reply = serde_json::from_slice(&body).unwrap();
        assert!(!reply.success);
        assert_eq!(reply.message.as_deref(), Some("Syntax error in JSON detected."));

        let (_, body) = read(service.respond(request(Method::POST, "/feedback", r#"{"quest":"five"}"#)).await).await;
        let reply: Reply = serde_json::from_slice(&body).unwrap();
        assert_eq!(reply.message.as_deref(), Some("Unexpected data types in JSON detected."));

        drop(service);
        assert!(postman.drain().await.is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn closed_queue_is_rejected_in_reply() {
        let (outbox, postman) = mail::channel(1);
        drop(postman);
        let service = Service::new("World!", outbox);

        let (_, body) = read(service.respond(request(Method::POST, "/feedback", "{}")).await).await;
        let reply: Reply = serde_json::from_slice(&body).unwrap();
        assert!(!reply.success);
        assert!(reply.message.is_some());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn refuses_other_methods_and_paths() {
        let (outbox, _postman) = mail::channel(1);
        let service = Service::new("World!", outbox);

        let (status, body) = read(service.respond(request(Method::GET, "/feedback", "")).await).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body.as_ref(), br#"Method "GET" is not supported"#);

        let (status, _) = read(service.respond(request(Method::POST, "/elsewhere", "{}")).await).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

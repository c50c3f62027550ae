use crate::error::Result;
use core::future::Future;
use http_body_util::{BodyExt, Full};
use hyper::{
    body::Bytes,
    header::{HeaderValue, CONTENT_TYPE},
    Method, Request, Uri,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

pub const APPLICATION_JSON: &str = "application/json";

/// Carries an encoded submission to the server and hands back the raw reply.
pub trait Transport {
    fn post_json(&self, path: &'static str, body: Vec<u8>) -> impl Future<Output = Result<Bytes>> + Send;
}

/// Plain HTTP transport rooted at the origin that served the form.
pub struct HttpTransport {
    origin: Box<str>,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HttpTransport {
    pub fn new(origin: &Uri) -> Self {
        let origin = origin.to_string().trim_end_matches('/').into();
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self { origin, client }
    }

    fn build_request(&self, path: &str, body: Vec<u8>) -> Result<Request<Full<Bytes>>> {
        let uri: Uri = [self.origin.as_ref(), path].concat().parse()?;
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))
            .body(Full::new(Bytes::from(body)))?;
        Ok(req)
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, path: &'static str, body: Vec<u8>) -> impl Future<Output = Result<Bytes>> + Send {
        async move {
            let req = self.build_request(path, body)?;
            let res = self.client.request(req).await?;

            // The verdict lives in the body whatever the status code says.
            log::debug!("feedback server answered with {}", res.status());
            let bytes = res.into_body().collect().await?.to_bytes();
            Ok(bytes)
        }
    }
}

use crate::{
    error::{Error, Result},
    mail::{self, Outbox},
};
use http_body_util::{BodyExt, Full};
use hyper::{
    body::{Body, Bytes},
    header::{HeaderValue, CONTENT_TYPE},
    Response, StatusCode,
};
use model::{Feedback, Reply};

pub const APPLICATION_JSON: &str = "application/json";

/// Decodes the submission and queues its notification.
async fn submit<B: Body>(body: B, outbox: &Outbox) -> Result<()> {
    let bytes = body.collect().await.map_err(|_| Error::Body)?.to_bytes();
    let feedback: Feedback = serde_json::from_slice(&bytes)?;
    drop(bytes);

    log::debug!("received feedback: {feedback:?}");
    outbox.post(mail::render(&feedback)).await
}

/// Always answers with a JSON [`Reply`]. Failures are reported in the reply itself rather
/// than through the status code, which is what the form expects.
pub async fn try_respond<B: Body>(body: B, outbox: &Outbox) -> core::result::Result<Response<Full<Bytes>>, StatusCode> {
    let reply = match submit(body, outbox).await {
        Ok(()) => Reply::accepted(),
        Err(err) => {
            log::warn!("rejected feedback: {err}");
            Reply::rejected(err.to_string())
        }
    };

    let bytes = serde_json::to_vec(&reply).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let mut res = Response::new(Full::new(Bytes::from(bytes)));
    assert!(res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON)).is_none());
    Ok(res)
}

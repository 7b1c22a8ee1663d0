//! Browser `Transport` over `fetch`.
//!
//! Each request races a `gloo-timers` sleep; when the timer wins the
//! request is aborted through its `AbortController` and the caller gets
//! `ApiError::Timeout`.

use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use gloo_net::http::{Method as HttpMethod, RequestBuilder};

use super::api::{ApiError, ApiRequest, Method, RawResponse, Transport};

pub struct FetchTransport {
    timeout: Duration,
}

impl FetchTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

fn http_method(method: Method) -> HttpMethod {
    match method {
        Method::Get => HttpMethod::GET,
        Method::Post => HttpMethod::POST,
    }
}

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let controller =
            web_sys::AbortController::new().map_err(|_| ApiError::Network("abort controller unavailable".to_owned()))?;
        let signal = controller.signal();

        let mut builder = RequestBuilder::new(&request.url)
            .method(http_method(request.method))
            .header("Content-Type", "application/json")
            .abort_signal(Some(&signal));
        if let Some(token) = &request.bearer {
            builder = builder.header("Authorization", &format!("Bearer {token}"));
        }
        let prepared = match request.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| ApiError::Network(e.to_string()))?;

        let exchange = async {
            let resp = prepared
                .send()
                .await
                .map_err(|e| ApiError::Network(e.to_string()))?;
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            Ok(RawResponse { status, body })
        }
        .fuse();
        let timer = gloo_timers::future::sleep(self.timeout).fuse();
        futures::pin_mut!(exchange, timer);

        futures::select! {
            result = exchange => result,
            () = timer => {
                controller.abort();
                log::warn!("{} {} timed out", request.method.as_str(), request.url);
                Err(ApiError::Timeout)
            }
        }
    }
}

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    decode::decode_json_response,
    request::{PreparedBody, PreparedRequest},
    retry, ClientOptions, HairscanError, Request, Result, Sleeper, TokioSleeper,
};

#[derive(Clone, Debug)]
/// HTTP client that retries transient failures with exponential backoff.
///
/// 2xx/3xx and 4xx responses are returned on the attempt that produced them.
/// 5xx responses and transport errors are retried according to the
/// [`RetryPolicy`](crate::RetryPolicy) in effect. Once attempts run out the
/// last transient outcome is returned exactly as seen.
pub struct ResilientClient {
    http: reqwest::Client,
    options: ClientOptions,
    sleeper: Arc<dyn Sleeper>,
}

impl Default for ResilientClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ResilientClient {
    /// Creates a client with default options.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            options: ClientOptions::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Creates a client configured from `HAIRSCAN_*` environment variables.
    ///
    /// See [`ClientOptions::from_env`].
    pub fn from_env() -> std::result::Result<Self, String> {
        Ok(Self::new().with_options(ClientOptions::from_env()?))
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Uses an existing `reqwest` client and its connection pool.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Replaces the timer used between attempts.
    pub fn with_sleeper<S: Sleeper + 'static>(mut self, sleeper: S) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Executes `request`, retrying transient failures.
    ///
    /// A 4xx or a 5xx that survives every attempt is returned as `Ok`; the
    /// caller inspects the status. Transport errors that survive every attempt
    /// are returned as [`HairscanError::Transport`].
    pub async fn send(&self, request: Request) -> Result<reqwest::Response> {
        let policy = request.retry.as_ref().unwrap_or(&self.options.retry);
        policy.validate()?;
        let prepared = request.prepare()?;

        retry::run(policy, self.sleeper.as_ref(), prepared.url.as_str(), |attempt| {
            debug!(url = %prepared.url, method = %prepared.method, attempt, "sending request");
            self.dispatch(&prepared)
        })
        .await
        .map_err(HairscanError::Transport)
    }

    /// Executes `request` and decodes a successful JSON response body.
    ///
    /// Non-2xx final statuses become [`HairscanError::Http`].
    pub async fn send_json<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        let response = self.send(request).await?;
        let status = response.status();
        let body = response.text().await.map_err(HairscanError::Transport)?;
        decode_json_response(status.as_u16(), &body)
    }

    fn dispatch(
        &self,
        prepared: &PreparedRequest,
    ) -> impl Future<Output = reqwest::Result<reqwest::Response>> {
        let mut builder = self
            .http
            .request(prepared.method.clone(), prepared.url.clone())
            .headers(prepared.headers.clone());

        if let Some(timeout_ms) = self.options.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }

        builder = match &prepared.body {
            PreparedBody::Empty => builder,
            PreparedBody::Bytes(data) => builder.body(data.clone()),
            PreparedBody::Multipart(parts) => builder.multipart(PreparedBody::form(parts)),
        };

        builder.send()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::ResilientClient;
    use crate::{ClientOptions, HairscanError, InstantSleeper, Request, RetryPolicy};

    #[tokio::test]
    async fn invalid_policy_is_rejected_before_any_request() {
        let client = ResilientClient::new().with_sleeper(InstantSleeper);
        let err = client
            .send(
                Request::get("http://127.0.0.1:9/")
                    .retry(RetryPolicy::new(0, Duration::from_millis(1), 2.0)),
            )
            .await
            .expect_err("policy must be rejected");
        assert!(matches!(err, HairscanError::InvalidPolicy(_)));
    }

    #[tokio::test]
    async fn invalid_request_is_rejected_before_any_request() {
        let client = ResilientClient::new().with_sleeper(InstantSleeper);
        let err = client
            .send(Request::get("::not-a-url::"))
            .await
            .expect_err("request must be rejected");
        assert!(matches!(err, HairscanError::InvalidRequest(_)));
    }

    #[test]
    fn with_options_replaces_defaults() {
        let opts = ClientOptions {
            timeout_ms: Some(2_500),
            retry: RetryPolicy::no_retry(),
        };
        let client = ResilientClient::new().with_options(opts.clone());
        assert_eq!(client.options(), &opts);
    }
}

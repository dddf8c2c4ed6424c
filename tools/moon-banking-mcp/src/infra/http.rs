use reqwest::{Client, Url, header};

use crate::{
    domain::{
        error::DispatchError,
        request::{Method, UpstreamRequest},
        response::UpstreamResponse,
        upstream::Upstream,
    },
    infra::config::{ApiKey, UpstreamConfig},
};

/// reqwest-backed upstream bound to one base URL and credential.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: Client,
    base_url: Url,
    api_key: ApiKey,
    timeout_ms: u128,
}

impl HttpUpstream {
    pub fn new(config: UpstreamConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("moon-banking-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url,
            api_key: config.api_key,
            timeout_ms: config.timeout.as_millis(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for a request: base URL, then each path segment
    /// percent-encoded by the url crate, then the query pairs in order.
    pub fn url_for(&self, request: &UpstreamRequest) -> Result<Url, DispatchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                DispatchError::Transport(format!("base url {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(&request.segments);
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(
                request
                    .query
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str())),
            );
        }
        Ok(url)
    }

    fn describe_failure(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!("request timed out after {} ms", self.timeout_ms)
        } else if err.is_connect() {
            format!("could not reach {}: {err}", self.base_url)
        } else {
            err.to_string()
        }
    }
}

impl Upstream for HttpUpstream {
    async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, DispatchError> {
        let url = self.url_for(request)?;
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
        };

        let response = self
            .client
            .request(method, url)
            .bearer_auth(self.api_key.expose())
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|err| DispatchError::Transport(self.describe_failure(&err)))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|err| DispatchError::Transport(self.describe_failure(&err)))?;

        Ok(UpstreamResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            content_type,
            body,
        })
    }
}

use rmcp::model::JsonObject;
use std::sync::Arc;

use crate::{
    app::registry::ToolRegistry,
    domain::{error::DispatchError, request::UpstreamRequest, upstream::Upstream},
};

/// Resolves an invocation against the exposed catalog and relays it upstream.
pub struct Dispatcher<U> {
    registry: ToolRegistry,
    upstream: Arc<U>,
}

impl<U> Clone for Dispatcher<U> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            upstream: self.upstream.clone(),
        }
    }
}

impl<U: Upstream> Dispatcher<U> {
    pub fn new(registry: ToolRegistry, upstream: Arc<U>) -> Self {
        Self { registry, upstream }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Build the request for `name` before touching the network, so unknown
    /// tools and malformed arguments never reach the upstream.
    pub fn prepare(
        &self,
        name: &str,
        arguments: Option<&JsonObject>,
    ) -> Result<UpstreamRequest, DispatchError> {
        let spec = self
            .registry
            .resolve(name)
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;
        let empty = JsonObject::new();
        UpstreamRequest::build(spec, arguments.unwrap_or(&empty))
    }

    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<&JsonObject>,
    ) -> Result<String, DispatchError> {
        let request = self.prepare(name, arguments)?;
        tracing::debug!(
            method = request.method.as_str(),
            path = %request.path(),
            query_len = request.query.len(),
            "forwarding to upstream"
        );
        let response = self.upstream.send(&request).await?;
        tracing::debug!(status = response.status, "upstream responded");
        response.into_text()
    }
}

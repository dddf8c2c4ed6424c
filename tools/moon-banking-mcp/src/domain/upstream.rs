use std::future::Future;

use crate::domain::{error::DispatchError, request::UpstreamRequest, response::UpstreamResponse};

/// The HTTP seam. Implementations return any response the server produced,
/// whatever its status; only failures to exchange the request at all are
/// errors, and those are always [`DispatchError::Transport`].
pub trait Upstream: Send + Sync + 'static {
    fn send(
        &self,
        request: &UpstreamRequest,
    ) -> impl Future<Output = Result<UpstreamResponse, DispatchError>> + Send;
}

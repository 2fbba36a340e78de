//! Shared secret check in front of the row resources.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use crate::config::ServiceConfig;
use crate::errors::{ServiceError, ServiceResult};
use crate::server::ServerState;

/// Check the configured access key against the request headers.
pub fn check_access_key(conf: &ServiceConfig, headers: &HeaderMap) -> ServiceResult<()> {
    let expected = conf.access_key.as_deref().ok_or(ServiceError::Forbidden)?;
    let provided = headers
        .get(&conf.access_key_header)
        .and_then(|v| v.to_str().ok())
        .ok_or(ServiceError::Forbidden)?;

    if provided.as_bytes().ct_eq(expected.as_bytes()).unwrap_u8() != 1 {
        return Err(ServiceError::Forbidden);
    }

    Ok(())
}

/// Middleware rejecting requests without a valid access key.
pub async fn require_access_key(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> ServiceResult<Response> {
    check_access_key(&state.config, request.headers())?;
    Ok(next.run(request).await)
}

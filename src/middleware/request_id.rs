//! Request ID middleware for request tracing

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::error::ErrorResponse;

/// Header name for request ID
pub const X_REQUEST_ID: &str = "x-request-id";

/// Sets a UUID v4 request ID when the client sent none, and echoes it on the response
pub fn request_id_layer() -> (SetRequestIdLayer<MakeRequestUuid>, PropagateRequestIdLayer) {
    let header_name = HeaderName::from_static(X_REQUEST_ID);

    (
        SetRequestIdLayer::new(header_name.clone(), MakeRequestUuid),
        PropagateRequestIdLayer::new(header_name),
    )
}

/// Extension trait for extracting request ID from headers
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&str>;
}

impl RequestIdExt for HeaderMap {
    fn request_id(&self) -> Option<&str> {
        self.get(X_REQUEST_ID)?.to_str().ok()
    }
}

/// Rewrites API error bodies to carry the request's ID.
///
/// Must sit inside [`SetRequestIdLayer`] so the header is already present.
pub async fn stamp_error_request_id(req: Request, next: Next) -> Response {
    let request_id = req.headers().request_id().map(str::to_owned);
    let mut response = next.run(req).await;

    let Some(request_id) = request_id else {
        return response;
    };

    match response.extensions_mut().remove::<ErrorResponse>() {
        Some(body) => (
            response.status(),
            Json(ErrorResponse {
                request_id: Some(request_id),
                ..body
            }),
        )
            .into_response(),
        None => response,
    }
}

//! Built-in static resources

use axum::extract::Path;
use axum::http::{HeaderMap, Method};
use axum::response::Response;

use crate::error::ServerError;
use crate::resources::{self, Resource};
use crate::streamer::{self, StaticContent};

fn serve(resource: &Resource, method: &Method, headers: &HeaderMap) -> Response {
    let content = StaticContent {
        data: resource.bytes(),
        mime: resource.mime.to_string(),
        etag: resource.etag(),
        disposition: None,
    };
    streamer::serve(content, method, headers)
}

/// GET /favicon.ico
pub async fn favicon(method: Method, headers: HeaderMap) -> Response {
    serve(&resources::FAVICON, &method, &headers)
}

/// GET /resources/
pub async fn no_resource() -> ServerError {
    ServerError::NoResource
}

/// GET /resources/*name
pub async fn resource(
    method: Method,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Response, ServerError> {
    tracing::debug!(name = %name, "Built-in resource requested");

    let resource = resources::find(&name).ok_or(ServerError::UnknownResource)?;
    Ok(serve(resource, &method, &headers))
}

//! HTTP routes for the file server

mod dir;
mod index;
mod register;
mod resources;
mod verify;

pub use dir::MAX_INLINE_FILE_SIZE;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::email::EmailSender;
use crate::pages;
use crate::state::AppState;
use crate::store::AccountStore;

/// Create the router with the built-in routes. Requests none of them claim
/// are handed to the registered path table.
pub fn create_router<A, E>(state: Arc<AppState<A, E>>) -> Router
where
    A: AccountStore + 'static,
    E: EmailSender + 'static,
{
    let mut router = Router::new()
        .route("/", get(index::index))
        .route("/index.html", get(index::index))
        .route("/favicon.ico", get(resources::favicon))
        .route(
            "/register-form",
            get(register::register_form).post(register::register_form),
        )
        .route(
            "/register",
            post(register::register).fallback(method_not_allowed),
        )
        .route("/verify/:token", get(verify::verify))
        .route("/confirm/:token", get(verify::verify))
        .route("/resources/", get(resources::no_resource))
        .route("/resources/*name", get(resources::resource));

    if state.config.filesystem_access {
        router = router
            .route("/dir", get(|| async { Redirect::permanent("/dir/") }))
            .route("/dir/", get(dir::browse_root))
            .route("/dir/*path", get(dir::browse));
    }

    router
        .fallback(registered)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Hand unmatched requests to the registered path table
async fn registered<A, E>(State(state): State<Arc<AppState<A, E>>>, req: Request) -> Response
where
    A: AccountStore + 'static,
    E: EmailSender + 'static,
{
    state.router.dispatch(req).await
}

async fn method_not_allowed() -> Response {
    let status = StatusCode::METHOD_NOT_ALLOWED;
    (status, Html(pages::error_page(status, "Method not allowed"))).into_response()
}

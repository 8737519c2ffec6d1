//! Confirmation links

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Html;

use crate::email::EmailSender;
use crate::error::ServerError;
use crate::pages;
use crate::registration;
use crate::state::AppState;
use crate::store::AccountStore;

/// GET /verify/:token and /confirm/:token
pub async fn verify<A, E>(
    State(state): State<Arc<AppState<A, E>>>,
    Path(token): Path<String>,
) -> Result<Html<String>, ServerError>
where
    A: AccountStore + 'static,
    E: EmailSender + 'static,
{
    tracing::debug!("Confirmation request");

    let account = tokio::task::spawn_blocking(move || registration::confirm(&state, &token))
        .await
        .map_err(|e| ServerError::Internal(format!("Confirmation task failed: {}", e)))??;
    tracing::info!(login = %account.login, "Registration confirmed");
    Ok(Html(pages::success_page(&account.login)))
}

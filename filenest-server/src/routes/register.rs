//! Registration endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use axum::Form;

use crate::email::EmailSender;
use crate::error::ServerError;
use crate::pages;
use crate::registration::{self, RegistrationForm, RegistrationOutcome};
use crate::state::AppState;
use crate::store::AccountStore;

/// GET|POST /register-form
pub async fn register_form() -> Html<&'static str> {
    Html(pages::register_form())
}

/// POST /register
pub async fn register<A, E>(
    State(state): State<Arc<AppState<A, E>>>,
    headers: HeaderMap,
    Form(form): Form<RegistrationForm>,
) -> Result<Html<String>, ServerError>
where
    A: AccountStore + 'static,
    E: EmailSender + 'static,
{
    tracing::debug!(login = %form.login, "Registration request");

    let base = registration::link_base(&state.config, &headers);
    match registration::register(&state, form, base).await? {
        RegistrationOutcome::Registered(account) => Ok(Html(pages::success_page(&account.login))),
        RegistrationOutcome::AwaitingConfirmation { .. } => {
            Ok(Html(pages::check_email_page().to_string()))
        }
    }
}

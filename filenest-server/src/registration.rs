//! Registration and confirmation workflow

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use filenest_core::account::{validate_format, validate_required};
use filenest_core::{parse_token, AccountRecord};
use serde::Deserialize;

use crate::config::Config;
use crate::email::EmailSender;
use crate::error::ServerError;
use crate::state::AppState;
use crate::store::{AccountStore, PendingRegistration};

/// Fields posted by the registration form
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub login: String,
    pub email: String,
    pub password: String,
}

impl From<RegistrationForm> for AccountRecord {
    fn from(form: RegistrationForm) -> Self {
        AccountRecord::new(form.login, form.email, form.password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The account was committed immediately
    Registered(AccountRecord),
    /// A confirmation link was mailed
    AwaitingConfirmation { token: u32 },
}

/// Base URL for confirmation links
pub fn link_base(config: &Config, headers: &HeaderMap) -> Option<String> {
    if let Some(url) = config.public_url.as_deref().filter(|u| !u.is_empty()) {
        return Some(url.trim_end_matches('/').to_string());
    }
    let host = headers.get(header::HOST)?.to_str().ok()?;
    if host.is_empty() {
        return None;
    }
    Some(format!("http://{}", host))
}

/// Run a registration attempt through validation and either commit it or
/// stage it behind a confirmation mail.
pub async fn register<A, E>(
    state: &Arc<AppState<A, E>>,
    form: RegistrationForm,
    link_base: Option<String>,
) -> Result<RegistrationOutcome, ServerError>
where
    A: AccountStore + 'static,
    E: EmailSender + 'static,
{
    let account = AccountRecord::from(form);

    validate_required(&account, state.email_sender.is_some())?;

    if state.accounts.contains(&account.login) {
        tracing::info!(login = %account.login, "Registration for existing login");
        return Err(ServerError::Conflict);
    }

    validate_format(&account)?;

    let Some(sender) = state.email_sender.clone() else {
        commit_blocking(state, account.clone()).await?;
        return Ok(RegistrationOutcome::Registered(account));
    };

    let domain = account.email_domain().unwrap_or_default();
    if !state.config.domain_allowed(domain) {
        tracing::info!(login = %account.login, domain = %domain, "Mail domain refused");
        return Err(ServerError::Policy);
    }

    let base = link_base
        .ok_or_else(|| ServerError::Internal("Can't generate a verification link".to_string()))?;

    let token = state.pending.generate_token()?;
    let link = format!("{}/verify/{}", base, token);
    let email = account.email.clone();
    let login = account.login.clone();

    // Reserved before mailing so a concurrent attempt cannot draw the same token
    state
        .pending
        .insert_pending(token, PendingRegistration::new(account))?;

    let sent = tokio::task::spawn_blocking(move || sender.send_confirmation(&email, &link))
        .await
        .map_err(|e| e.to_string())
        .and_then(|result| result);

    if let Err(e) = sent {
        state.pending.remove_pending(token);
        return Err(ServerError::Internal(format!(
            "Failed to send confirmation mail: {}",
            e
        )));
    }

    tracing::info!(login = %login, "Registration awaiting confirmation");
    Ok(RegistrationOutcome::AwaitingConfirmation { token })
}

/// Turn the pending registration behind `raw_token` into an account.
///
/// The entry is claimed by removing it before the commit, so of two
/// requests carrying the same token only one gets past the lookup. A failed
/// commit does not put the entry back: the login is taken or the account is
/// already in memory, and the link can never succeed.
///
/// Blocks on the account file; async callers go through `spawn_blocking`.
pub fn confirm<A, E>(state: &AppState<A, E>, raw_token: &str) -> Result<AccountRecord, ServerError>
where
    A: AccountStore,
    E: EmailSender,
{
    if state.email_sender.is_none() {
        return Err(ServerError::ConfirmationDisabled);
    }

    let token = parse_token(raw_token)?;
    let pending = state
        .pending
        .remove_pending(token)
        .ok_or_else(|| ServerError::NotFound("Invalid link".to_string()))?;

    if let Some(ttl) = state.config.pending_ttl() {
        if pending.is_expired(ttl, chrono::Utc::now()) {
            tracing::info!(login = %pending.account.login, "Confirmation link expired");
            return Err(ServerError::NotFound("Invalid link".to_string()));
        }
    }

    commit_account(state, pending.account.clone())?;

    Ok(pending.account)
}

/// Run [`commit_account`] on the blocking pool
async fn commit_blocking<A, E>(
    state: &Arc<AppState<A, E>>,
    account: AccountRecord,
) -> Result<(), ServerError>
where
    A: AccountStore + 'static,
    E: EmailSender + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || commit_account(&state, account))
        .await
        .map_err(|e| ServerError::Internal(format!("Commit task failed: {}", e)))?
}

/// Insert and persist an account, then provision its storage.
///
/// A login that appeared since validation is reported as a persistence
/// failure. A failed save leaves the account in memory.
pub fn commit_account<A, E>(state: &AppState<A, E>, account: AccountRecord) -> Result<(), ServerError>
where
    A: AccountStore,
    E: EmailSender,
{
    {
        let _guard = state.commit_lock.lock().unwrap_or_else(|e| e.into_inner());
        state.accounts.insert(account.clone()).map_err(|e| match e {
            ServerError::Conflict => {
                ServerError::Persistence(format!("Login {} was taken concurrently", account.login))
            }
            other => other,
        })?;
        state.accounts.save()?;
    }

    tracing::info!(login = %account.login, "Account registered");

    if state.config.filesystem_access {
        // Already logged; the account is usable without storage
        let _ = state.provisioner.provision(&account);
    }

    Ok(())
}

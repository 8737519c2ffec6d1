//! Index page

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;

use crate::email::EmailSender;
use crate::pages::{self, IndexLink};
use crate::state::AppState;
use crate::store::AccountStore;

/// GET / and /index.html
pub async fn index<A, E>(State(state): State<Arc<AppState<A, E>>>) -> Html<String>
where
    A: AccountStore,
    E: EmailSender,
{
    tracing::debug!("Rendering index");

    let mut links = Vec::new();
    if state.config.filesystem_access {
        links.push(IndexLink {
            href: "/dir/",
            title: "Observe directory structure",
        });
    }
    links.push(IndexLink {
        href: "/register-form",
        title: "Create a new account",
    });
    links.extend(state.router.entries().iter().map(|entry| IndexLink {
        href: &entry.pattern,
        title: &entry.description,
    }));

    Html(pages::index_page(&links))
}

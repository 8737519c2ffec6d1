//! Upload statistics fed by transfer events

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::response::{Html, IntoResponse};

use crate::pages::{self, encode_href, escape_html};
use crate::router::{MatchMode, PathRouter};
use crate::transfer::TransferEvent;

pub const MAX_RECENT_UPLOADS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentUpload {
    pub name: String,
    /// Path below the web root, when the file lives there
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UploadSnapshot {
    pub count: u64,
    /// Newest first
    pub recent: Vec<RecentUpload>,
}

#[derive(Default)]
struct Inner {
    count: u64,
    recent: VecDeque<RecentUpload>,
}

#[derive(Default)]
pub struct UploadStats {
    inner: Mutex<Inner>,
}

impl UploadStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, upload: RecentUpload) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.count += 1;
        inner.recent.push_front(upload);
        inner.recent.truncate(MAX_RECENT_UPLOADS);
    }

    pub fn snapshot(&self) -> UploadSnapshot {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        UploadSnapshot {
            count: inner.count,
            recent: inner.recent.iter().cloned().collect(),
        }
    }
}

/// File a transfer command operated on
fn event_target(event: &TransferEvent) -> PathBuf {
    let parameters = event.parameters.trim();
    if let Some(absolute) = parameters.strip_prefix('/') {
        event.user_root.join(absolute)
    } else {
        event
            .user_root
            .join(event.working_dir.trim_start_matches('/'))
            .join(parameters)
    }
}

/// Transfer hook counting completed `STOR` commands
pub fn upload_hook(
    stats: Arc<UploadStats>,
    web_root: PathBuf,
) -> impl Fn(&TransferEvent) + Send + Sync + 'static {
    move |event: &TransferEvent| {
        if !event.command.eq_ignore_ascii_case("STOR") {
            return;
        }
        let target = event_target(event);
        if !target.is_file() {
            return;
        }

        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let path = relative_to(&target, &web_root);

        tracing::debug!(file = %target.display(), "Upload recorded");
        stats.record(RecentUpload { name, path });
    }
}

fn relative_to(target: &Path, root: &Path) -> Option<String> {
    let relative = target.strip_prefix(root).ok()?;
    Some(relative.to_string_lossy().replace('\\', "/"))
}

pub fn render(snapshot: &UploadSnapshot) -> String {
    let items: String = snapshot
        .recent
        .iter()
        .map(|upload| match &upload.path {
            Some(path) => format!(
                "        <li><a href=\"{}\">{}</a></li>\n",
                encode_href(&format!("/dir/{}", path)),
                escape_html(&upload.name)
            ),
            None => format!("        <li>{}</li>\n", escape_html(&upload.name)),
        })
        .collect();
    pages::dashboard_page(snapshot.count, &items)
}

/// Add the `/dashboard` page to the registered routes
pub fn register(router: &mut PathRouter, stats: Arc<UploadStats>) {
    router.register(
        "/dashboard",
        "View statistics on dashboard",
        MatchMode::Strict,
        move |_req| {
            let page = render(&stats.snapshot());
            async move { Html(page).into_response() }
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn stor(user_root: &Path, working_dir: &str, parameters: &str) -> TransferEvent {
        TransferEvent {
            command: "STOR".to_string(),
            parameters: parameters.to_string(),
            working_dir: working_dir.to_string(),
            user_root: user_root.to_path_buf(),
        }
    }

    #[test]
    fn test_recent_uploads_are_bounded_and_newest_first() {
        let stats = UploadStats::new();
        for i in 0..25 {
            stats.record(RecentUpload {
                name: format!("file{}", i),
                path: None,
            });
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.count, 25);
        assert_eq!(snapshot.recent.len(), MAX_RECENT_UPLOADS);
        assert_eq!(snapshot.recent[0].name, "file24");
        assert_eq!(snapshot.recent[19].name, "file5");
    }

    #[test]
    fn test_hook_records_stored_files_only() {
        let web_root = tempdir().unwrap();
        let user_root = web_root.path().join("alice");
        fs::create_dir_all(user_root.join("docs")).unwrap();
        fs::write(user_root.join("docs/report.pdf"), b"pdf").unwrap();

        let stats = Arc::new(UploadStats::new());
        let hook = upload_hook(stats.clone(), web_root.path().to_path_buf());

        hook(&stor(&user_root, "/docs", "report.pdf"));
        hook(&stor(&user_root, "/", "missing.bin"));
        hook(&TransferEvent {
            command: "RETR".to_string(),
            ..stor(&user_root, "/docs", "report.pdf")
        });

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.count, 1);
        assert_eq!(
            snapshot.recent[0],
            RecentUpload {
                name: "report.pdf".to_string(),
                path: Some("alice/docs/report.pdf".to_string()),
            }
        );
    }

    #[test]
    fn test_render_links_under_dir() {
        let snapshot = UploadSnapshot {
            count: 2,
            recent: vec![
                RecentUpload {
                    name: "a b.txt".to_string(),
                    path: Some("alice/a b.txt".to_string()),
                },
                RecentUpload {
                    name: "outside".to_string(),
                    path: None,
                },
            ],
        };
        let page = render(&snapshot);
        assert!(page.contains("<b>2</b>"));
        assert!(page.contains("href=\"/dir/alice/a%20b.txt\""));
        assert!(page.contains("<li>outside</li>"));
    }
}

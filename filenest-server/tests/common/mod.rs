//! Common test utilities for server integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use axum_test::TestServer;
use filenest_server::{
    dashboard, routes, AppState, Config, EmailSender, FileAccountStore, LocalTransferServer,
    PathRouter, UploadStats,
};
use tempfile::TempDir;

/// Mock email sender that captures confirmation links
#[derive(Default, Clone)]
pub struct MockEmailSender {
    /// Captured (email, link) pairs
    pub sent: Arc<RwLock<Vec<(String, String)>>>,
    fail: Arc<AtomicBool>,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following send fail
    pub fn fail_sends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Get the last confirmation link sent to an email
    pub fn get_link(&self, email: &str) -> Option<String> {
        self.sent
            .read()
            .unwrap()
            .iter()
            .rev()
            .find(|(e, _)| e == email)
            .map(|(_, link)| link.clone())
    }

    /// Path part of the last link, ready for `server.get`
    pub fn get_link_path(&self, email: &str) -> Option<String> {
        self.get_link(email)
            .map(|link| link.trim_start_matches(PUBLIC_URL).to_string())
    }

    pub fn count(&self) -> usize {
        self.sent.read().unwrap().len()
    }
}

impl EmailSender for MockEmailSender {
    fn send_confirmation(&self, email: &str, link: &str) -> Result<(), String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("relay unavailable".to_string());
        }
        self.sent
            .write()
            .unwrap()
            .push((email.to_string(), link.to_string()));
        Ok(())
    }
}

pub const PUBLIC_URL: &str = "http://files.test";

pub type TestState = AppState<FileAccountStore, MockEmailSender>;

/// Knobs for [`create_test_server_with`]
pub struct TestOptions {
    pub confirmation: bool,
    pub filesystem_access: bool,
    pub allowed_email_domains: Vec<String>,
    pub denied_email_domains: Vec<String>,
    pub pending_ttl_minutes: Option<u64>,
    pub router: PathRouter,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            confirmation: false,
            filesystem_access: true,
            allowed_email_domains: Vec::new(),
            denied_email_domains: Vec::new(),
            pending_ttl_minutes: None,
            router: PathRouter::new(),
        }
    }
}

pub struct TestContext {
    pub server: TestServer,
    pub mail: MockEmailSender,
    pub state: Arc<TestState>,
    pub transfer: Arc<LocalTransferServer>,
    pub stats: Arc<UploadStats>,
    /// Keeps the temporary directories alive
    pub dir: TempDir,
}

impl TestContext {
    pub fn web_root(&self) -> PathBuf {
        self.dir.path().join("www")
    }

    pub fn passwd_path(&self) -> PathBuf {
        self.dir.path().join("config").join("passwd")
    }
}

/// Server without email confirmation
pub fn create_test_server() -> TestContext {
    create_test_server_with(TestOptions::default())
}

/// Server that stages registrations behind a confirmation mail
pub fn create_confirming_server() -> TestContext {
    create_test_server_with(TestOptions {
        confirmation: true,
        ..TestOptions::default()
    })
}

pub fn create_test_server_with(options: TestOptions) -> TestContext {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let web_root = dir.path().join("www");
    let config_dir = dir.path().join("config");
    std::fs::create_dir_all(&web_root).unwrap();
    std::fs::create_dir_all(&config_dir).unwrap();

    let config = Config {
        web_root,
        config_dir,
        filesystem_access: options.filesystem_access,
        public_url: Some(PUBLIC_URL.to_string()),
        allowed_email_domains: options.allowed_email_domains,
        denied_email_domains: options.denied_email_domains,
        pending_ttl_minutes: options.pending_ttl_minutes,
        ..Config::default()
    };

    let accounts = FileAccountStore::open(config.passwd_path()).unwrap();
    let transfer = Arc::new(LocalTransferServer::new());
    let stats = Arc::new(UploadStats::new());
    transfer.add_event_hook(dashboard::upload_hook(stats.clone(), config.web_root.clone()));

    let mut router = options.router;
    dashboard::register(&mut router, stats.clone());

    let mail = MockEmailSender::new();
    let sender = options.confirmation.then(|| mail.clone());

    let state = Arc::new(AppState::new(
        config,
        accounts,
        sender,
        transfer.clone(),
        router,
    ));
    state.provision_all();

    let app = routes::create_router(state.clone());
    let server = TestServer::new(app).expect("Failed to create test server");

    TestContext {
        server,
        mail,
        state,
        transfer,
        stats,
        dir,
    }
}

/// Form fields for a registration
pub fn form<'a>(login: &'a str, email: &'a str, password: &'a str) -> [(&'static str, &'a str); 3] {
    [("login", login), ("email", email), ("password", password)]
}

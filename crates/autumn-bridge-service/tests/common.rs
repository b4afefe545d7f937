//! Shared test harness: the real router over fake collaborators.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use autumn_bridge_client::{BillingApi, BillingRequest, BillingResponse, ClientError};
use autumn_bridge_core::{PluginConfig, SessionContext};
use autumn_bridge_service::collaborators::{
    BillingClientFactory, CredentialError, CredentialSource, MemberRole, OrganizationDirectory,
    OrganizationMember, OrganizationRecord, SecretKeyCheck, SessionProvider,
};
use autumn_bridge_service::{create_router, AppState, RequestContext, ServiceConfig};
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use serde_json::{json, Value};

pub const SECRET_KEY: &str = "am_sk_test_123";

/// Records every billing call and answers with a configurable response.
pub struct RecordingApi {
    requests: Mutex<Vec<BillingRequest>>,
    response: Mutex<BillingResponse>,
}

impl Default for RecordingApi {
    fn default() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: Mutex::new(BillingResponse {
                status: 200,
                body: json!({ "ok": true }),
            }),
        }
    }
}

impl RecordingApi {
    pub fn respond_with(&self, status: u16, body: Value) {
        *self.response.lock().unwrap() = BillingResponse { status, body };
    }

    pub fn requests(&self) -> Vec<BillingRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> BillingRequest {
        self.requests().pop().expect("no billing request recorded")
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl BillingApi for RecordingApi {
    async fn send(&self, request: BillingRequest) -> Result<BillingResponse, ClientError> {
        self.requests.lock().unwrap().push(request);
        Ok(self.response.lock().unwrap().clone())
    }
}

/// Hands out the shared [`RecordingApi`] and counts builds.
pub struct RecordingFactory {
    pub api: Arc<RecordingApi>,
    pub builds: AtomicUsize,
    pub last_key: Mutex<Option<String>>,
}

impl BillingClientFactory for RecordingFactory {
    fn build(&self, _base_url: &str, secret_key: &str) -> Result<Arc<dyn BillingApi>, ClientError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        *self.last_key.lock().unwrap() = Some(secret_key.to_string());
        Ok(self.api.clone())
    }
}

/// Returns the same session for every request.
pub struct StaticSessions(pub Option<SessionContext>);

#[async_trait]
impl SessionProvider for StaticSessions {
    async fn get_session(&self, _ctx: &RequestContext) -> Option<SessionContext> {
        self.0.clone()
    }
}

/// Credential source with a fixed answer.
pub struct FixedCredentials(pub SecretKeyCheck);

impl CredentialSource for FixedCredentials {
    fn check_secret_key(&self) -> SecretKeyCheck {
        self.0.clone()
    }
}

pub fn ann() -> SessionContext {
    SessionContext::new("u1", "a@x.com", "Ann")
}

pub fn ann_in_acme() -> SessionContext {
    ann().with_active_organization("org1")
}

pub fn acme_directory() -> OrganizationDirectory {
    OrganizationDirectory::from_records([OrganizationRecord {
        id: "org1".into(),
        name: Some("Acme".into()),
        members: vec![
            OrganizationMember {
                user_id: "u1".into(),
                email: "a@x.com".into(),
                role: MemberRole::Member,
            },
            OrganizationMember {
                user_id: "u0".into(),
                email: "owner@acme.com".into(),
                role: MemberRole::Owner,
            },
        ],
    }])
}

pub fn missing_key(error: Option<CredentialError>) -> FixedCredentials {
    FixedCredentials(SecretKeyCheck::Missing(error))
}

/// Builder for a [`TestHarness`].
pub struct HarnessBuilder {
    plugin: PluginConfig,
    session: Option<SessionContext>,
    credentials: Arc<dyn CredentialSource>,
}

impl HarnessBuilder {
    pub fn plugin(mut self, plugin: PluginConfig) -> Self {
        self.plugin = plugin;
        self
    }

    pub fn session(mut self, session: SessionContext) -> Self {
        self.session = Some(session);
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.session = None;
        self
    }

    pub fn credentials(mut self, credentials: impl CredentialSource + 'static) -> Self {
        self.credentials = Arc::new(credentials);
        self
    }

    pub fn build(self) -> TestHarness {
        let api = Arc::new(RecordingApi::default());
        let factory = Arc::new(RecordingFactory {
            api: api.clone(),
            builds: AtomicUsize::new(0),
            last_key: Mutex::new(None),
        });

        let state = AppState {
            plugin: Arc::new(self.plugin),
            config: ServiceConfig::default(),
            sessions: Arc::new(StaticSessions(self.session)),
            organizations: Arc::new(acme_directory()),
            credentials: self.credentials,
            clients: factory.clone(),
        };

        let server = TestServer::new(create_router(state)).expect("failed to start test server");

        TestHarness {
            server,
            api,
            factory,
        }
    }
}

/// The router under test plus handles on its fakes.
pub struct TestHarness {
    pub server: TestServer,
    pub api: Arc<RecordingApi>,
    pub factory: Arc<RecordingFactory>,
}

impl TestHarness {
    /// A harness with a configured secret key and Ann's session.
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            plugin: plugin_with_key().build().unwrap(),
            session: Some(ann()),
            credentials: Arc::new(missing_key(None)),
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn client_builds(&self) -> usize {
        self.factory.builds.load(Ordering::SeqCst)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

pub fn plugin_with_key() -> autumn_bridge_core::PluginConfigBuilder {
    PluginConfig::builder()
        .base_url("http://billing.test/v1")
        .secret_key(SECRET_KEY)
}

pub fn header(name: &'static str, value: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(name),
        HeaderValue::from_str(value).unwrap(),
    )
}

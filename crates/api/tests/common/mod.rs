//! Shared fixtures for the `luthier-api` integration tests.
//!
//! The collaborators are in-memory doubles, so these tests need neither
//! Postgres nor Redis. [`TestContext`] wires them into a real
//! [`AuthService`] and, through [`TestContext::app`], into the same router
//! and middleware stack production uses.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use tower::ServiceExt;

use luthier_api::auth::jwt::JwtConfig;
use luthier_api::cache::{CacheError, KeyValueCache};
use luthier_api::config::ServerConfig;
use luthier_api::oauth::google::GoogleConfig;
use luthier_api::oauth::{ExternalProfile, OAuthError, OAuthProvider};
use luthier_api::router::build_app_router;
use luthier_api::services::{AuthService, Registration, VerificationTicket};
use luthier_api::state::AppState;
use luthier_api::store::{AuthStore, StoreError};
use luthier_core::login_method::LoginMethod;
use luthier_core::policy::{FREE_TIER_PLAN_NAME, SUBSCRIPTION_STATUS_ACTIVE};
use luthier_core::types::{DbId, Timestamp};
use luthier_db::models::email_verification::EmailVerification;
use luthier_db::models::session::{NewSession, Session};
use luthier_db::models::subscription::{NewSubscription, Subscription, SubscriptionPlan};
use luthier_db::models::user::{NewUser, User};
use luthier_events::delivery::ResendConfig;
use luthier_events::{EmailConfig, EmailJob, EmailQueue, JobQueue, QueueError};

pub const PASSWORD: &str = "Pw123!";

fn unavailable() -> redis::RedisError {
    redis::RedisError::from((redis::ErrorKind::IoError, "connection refused"))
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        access_secret: "test-access-secret-that-is-long-enough".to_string(),
        refresh_secret: "test-refresh-secret-that-is-long-enough".to_string(),
        verification_secret: "test-verification-secret-long-enough".to_string(),
        access_token_expiry_mins: 15,
        refresh_token_expiry_days: 7,
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: "postgres://unused".to_string(),
        redis_url: "redis://unused".to_string(),
        email_queue_name: "email_queue_test".to_string(),
        client_url: "http://localhost:5173".to_string(),
        cookie_secure: false,
        session_cleanup_interval_secs: 3600,
        jwt: test_jwt_config(),
        google: GoogleConfig {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            redirect_url: "http://localhost:3000/api/v1/auth/google/callback".to_string(),
        },
        email: EmailConfig::Resend(ResendConfig {
            api_key: "re_test".to_string(),
            from: "Luthier Test <test@example.com>".to_string(),
            endpoint: "http://127.0.0.1:9/emails".to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Tables {
    next_id: DbId,
    users: Vec<User>,
    sessions: Vec<Session>,
    verifications: Vec<EmailVerification>,
    plans: Vec<SubscriptionPlan>,
    subscriptions: Vec<Subscription>,
}

impl Tables {
    fn id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// [`AuthStore`] over plain vectors. Every operation holds one lock, so each
/// call is atomic like a single statement or transaction.
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut tables = Tables::default();
        let id = tables.id();
        tables.plans.push(SubscriptionPlan {
            id,
            name: FREE_TIER_PLAN_NAME.to_string(),
            description: "Trial plan".to_string(),
            price_cents: 0,
            duration_days: 14,
        });
        Self {
            tables: Mutex::new(tables),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail like an unreachable database.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, Tables>, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.tables.lock().unwrap())
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        let tables = self.tables.lock().unwrap();
        tables.users.iter().find(|u| u.email == email).cloned()
    }

    pub fn soft_delete(&self, user_id: DbId) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == user_id) {
            user.deleted = true;
        }
    }

    pub fn sessions_for(&self, user_id: DbId) -> Vec<Session> {
        let tables = self.tables.lock().unwrap();
        tables
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn verification_for(&self, user_id: DbId) -> Option<EmailVerification> {
        let tables = self.tables.lock().unwrap();
        tables
            .verifications
            .iter()
            .find(|v| v.user_id == user_id)
            .cloned()
    }

    /// Push the stored code expiry into the past.
    pub fn expire_verification(&self, user_id: DbId) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(v) = tables.verifications.iter_mut().find(|v| v.user_id == user_id) {
            v.expires_at = Utc::now() - chrono::Duration::minutes(1);
        }
    }

    pub fn subscriptions_for(&self, user_id: DbId) -> Vec<Subscription> {
        let tables = self.tables.lock().unwrap();
        tables
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Insert a user directly, bypassing the flows.
    pub fn seed_user(&self, input: NewUser) -> User {
        let mut tables = self.tables.lock().unwrap();
        insert_user(&mut tables, &input)
    }
}

fn insert_user(tables: &mut Tables, input: &NewUser) -> User {
    let now = Utc::now();
    let user = User {
        id: tables.id(),
        email: input.email.clone(),
        password_hash: input.password_hash.clone(),
        login_method: input.login_method,
        google_id: input.google_id.clone(),
        role: input.role.clone(),
        first_name: input.first_name.clone(),
        last_name: input.last_name.clone(),
        phone: input.phone.clone(),
        address: input.address.clone(),
        country: input.country.clone(),
        workshop_name: input.workshop_name.clone(),
        is_active: true,
        deleted: false,
        verified: input.verified,
        last_login_at: None,
        created_at: now,
        updated_at: now,
    };
    tables.users.push(user.clone());
    user
}

fn insert_session(tables: &mut Tables, input: &NewSession) -> Session {
    let now = Utc::now();
    let session = Session {
        id: tables.id(),
        user_id: input.user_id,
        access_token_hash: input.access_token_hash.clone(),
        refresh_token_hash: input.refresh_token_hash.clone(),
        access_expires_at: input.access_expires_at,
        refresh_expires_at: input.refresh_expires_at,
        is_valid: true,
        device_info: input.device_info.clone(),
        created_at: now,
        updated_at: now,
    };
    tables.sessions.push(session.clone());
    session
}

#[async_trait]
impl AuthStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.guard()?;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        let tables = self.guard()?;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, input: &NewUser) -> Result<User, StoreError> {
        let mut tables = self.guard()?;
        if tables.users.iter().any(|u| u.email == input.email) {
            return Err(StoreError::Conflict("uq_users_email".to_string()));
        }
        if input.google_id.is_some()
            && tables.users.iter().any(|u| u.google_id == input.google_id)
        {
            return Err(StoreError::Conflict("uq_users_google_id".to_string()));
        }
        Ok(insert_user(&mut tables, input))
    }

    async fn update_last_login(&self, id: DbId, at: Timestamp) -> Result<(), StoreError> {
        let mut tables = self.guard()?;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == id) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn update_password(&self, id: DbId, password_hash: &str) -> Result<(), StoreError> {
        let mut tables = self.guard()?;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == id) {
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let tables = self.guard()?;
        Ok(tables.users.iter().any(|u| u.email == email))
    }

    async fn create_session(&self, input: &NewSession) -> Result<Session, StoreError> {
        let mut tables = self.guard()?;
        Ok(insert_session(&mut tables, input))
    }

    async fn find_session_by_access_hash(&self, hash: &str) -> Result<Option<Session>, StoreError> {
        let tables = self.guard()?;
        let now = Utc::now();
        Ok(tables
            .sessions
            .iter()
            .find(|s| s.access_token_hash == hash && s.is_valid && s.access_expires_at > now)
            .cloned())
    }

    async fn find_session_by_refresh_hash(
        &self,
        hash: &str,
    ) -> Result<Option<Session>, StoreError> {
        let tables = self.guard()?;
        let now = Utc::now();
        Ok(tables
            .sessions
            .iter()
            .find(|s| s.refresh_token_hash == hash && s.is_valid && s.refresh_expires_at > now)
            .cloned())
    }

    async fn delete_session_by_access_hash(&self, hash: &str) -> Result<bool, StoreError> {
        let mut tables = self.guard()?;
        let before = tables.sessions.len();
        tables.sessions.retain(|s| s.access_token_hash != hash);
        Ok(tables.sessions.len() < before)
    }

    async fn rotate_session(
        &self,
        old_id: DbId,
        input: &NewSession,
    ) -> Result<Option<Session>, StoreError> {
        let mut tables = self.guard()?;
        let Some(pos) = tables
            .sessions
            .iter()
            .position(|s| s.id == old_id && s.is_valid)
        else {
            return Ok(None);
        };
        tables.sessions.remove(pos);
        Ok(Some(insert_session(&mut tables, input)))
    }

    async fn delete_expired_sessions(&self) -> Result<u64, StoreError> {
        let mut tables = self.guard()?;
        let now = Utc::now();
        let before = tables.sessions.len();
        tables
            .sessions
            .retain(|s| s.is_valid && s.refresh_expires_at > now);
        Ok((before - tables.sessions.len()) as u64)
    }

    async fn create_email_verification(
        &self,
        user_id: DbId,
        code: &str,
        expires_at: Timestamp,
    ) -> Result<EmailVerification, StoreError> {
        let mut tables = self.guard()?;
        if tables.verifications.iter().any(|v| v.user_id == user_id) {
            return Err(StoreError::Conflict(
                "uq_email_verifications_user_id".to_string(),
            ));
        }
        let now = Utc::now();
        let record = EmailVerification {
            id: tables.id(),
            user_id,
            code: code.to_string(),
            expires_at,
            verified: false,
            created_at: now,
            updated_at: now,
        };
        tables.verifications.push(record.clone());
        Ok(record)
    }

    async fn find_verification_by_user(
        &self,
        user_id: DbId,
    ) -> Result<Option<EmailVerification>, StoreError> {
        let tables = self.guard()?;
        Ok(tables
            .verifications
            .iter()
            .find(|v| v.user_id == user_id)
            .cloned())
    }

    async fn update_verification_code(
        &self,
        id: DbId,
        code: &str,
        expires_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut tables = self.guard()?;
        if let Some(v) = tables.verifications.iter_mut().find(|v| v.id == id) {
            v.code = code.to_string();
            v.expires_at = expires_at;
            v.verified = false;
        }
        Ok(())
    }

    async fn complete_verification(&self, user_id: DbId) -> Result<(), StoreError> {
        let mut tables = self.guard()?;
        if let Some(v) = tables.verifications.iter_mut().find(|v| v.user_id == user_id) {
            v.verified = true;
        }
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == user_id) {
            user.verified = true;
        }
        Ok(())
    }

    async fn free_tier_plan(&self) -> Result<Option<SubscriptionPlan>, StoreError> {
        let tables = self.guard()?;
        Ok(tables
            .plans
            .iter()
            .find(|p| p.name == FREE_TIER_PLAN_NAME)
            .cloned())
    }

    async fn create_subscription(
        &self,
        input: &NewSubscription,
    ) -> Result<Subscription, StoreError> {
        let mut tables = self.guard()?;
        let plan_name = tables
            .plans
            .iter()
            .find(|p| p.id == input.plan_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let subscription = Subscription {
            id: tables.id(),
            user_id: input.user_id,
            plan_id: input.plan_id,
            plan_name,
            status: input.status.clone(),
            started_at: input.started_at,
            expires_at: input.expires_at,
        };
        tables.subscriptions.push(subscription.clone());
        Ok(subscription)
    }

    async fn find_active_subscription(
        &self,
        user_id: DbId,
    ) -> Result<Option<Subscription>, StoreError> {
        let tables = self.guard()?;
        let now = Utc::now();
        Ok(tables
            .subscriptions
            .iter()
            .filter(|s| {
                s.user_id == user_id
                    && s.status == SUBSCRIPTION_STATUS_ACTIVE
                    && s.expires_at > now
            })
            .last()
            .cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.guard().map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// MemoryCache
// ---------------------------------------------------------------------------

/// [`KeyValueCache`] over a map with real TTLs.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
    failing: AtomicBool,
}

impl MemoryCache {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn guard(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, (String, Instant)>>, CacheError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::Redis(unavailable()));
        }
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();
        entries.retain(|_, (_, deadline)| *deadline > now);
        Ok(entries)
    }

    pub fn peek(&self, key: &str) -> Option<String> {
        self.guard().ok()?.get(key).map(|(v, _)| v.clone())
    }

    /// Remaining lifetime of `key`.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.guard().ok()?;
        entries
            .get(key)
            .map(|(_, deadline)| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.entries.lock().unwrap().insert(
            key.to_string(),
            (value.to_string(), Instant::now() + Duration::from_secs(300)),
        );
    }
}

#[async_trait]
impl KeyValueCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.guard()?.get(key).map(|(v, _)| v.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.guard()?
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.guard()?.remove(key);
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.guard()?.remove(key).map(|(v, _)| v))
    }

    async fn increment(&self, key: &str, window: Duration) -> Result<u64, CacheError> {
        let mut entries = self.guard()?;
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| ("0".to_string(), Instant::now() + window));
        let count = entry.0.parse::<u64>().unwrap_or(0) + 1;
        entry.0 = count.to_string();
        Ok(count)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        self.guard().map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// MemoryQueue
// ---------------------------------------------------------------------------

/// [`JobQueue`] that records pushed payloads for inspection.
#[derive(Default)]
pub struct MemoryQueue {
    payloads: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl MemoryQueue {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn jobs(&self) -> Vec<EmailJob> {
        self.payloads
            .lock()
            .unwrap()
            .iter()
            .map(|p| serde_json::from_str(p).unwrap())
            .collect()
    }

    pub fn jobs_to(&self, email: &str) -> Vec<EmailJob> {
        self.jobs().into_iter().filter(|j| j.to == email).collect()
    }

    /// Code carried by the latest verification email sent to `email`.
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.jobs_to(email)
            .iter()
            .rev()
            .find(|j| j.subject.contains("Verificá"))
            .and_then(|j| j.body.rsplit(' ').next().map(str::to_string))
    }
}

#[async_trait]
impl JobQueue for MemoryQueue {
    async fn push(&self, payload: String) -> Result<(), QueueError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(QueueError::Store(unavailable()));
        }
        self.payloads.lock().unwrap().push(payload);
        Ok(())
    }

    async fn pop(&self) -> Result<String, QueueError> {
        let mut payloads = self.payloads.lock().unwrap();
        if payloads.is_empty() {
            return Err(QueueError::Closed);
        }
        Ok(payloads.remove(0))
    }
}

// ---------------------------------------------------------------------------
// FakeOAuth
// ---------------------------------------------------------------------------

pub const FAKE_AUTHORIZE_URL: &str = "https://accounts.example.test/o/oauth2/auth";

/// [`OAuthProvider`] returning a configurable profile.
pub struct FakeOAuth {
    profile: Mutex<ExternalProfile>,
    exchanges: AtomicUsize,
}

impl FakeOAuth {
    pub fn new() -> Self {
        Self {
            profile: Mutex::new(google_profile("g@x.com")),
            exchanges: AtomicUsize::new(0),
        }
    }

    pub fn set_profile(&self, profile: ExternalProfile) {
        *self.profile.lock().unwrap() = profile;
    }

    /// How many codes were exchanged with the provider.
    pub fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

pub fn google_profile(email: &str) -> ExternalProfile {
    ExternalProfile {
        external_id: format!("google-{email}"),
        email: email.to_string(),
        email_verified: true,
        display_name: "Ana Torres".to_string(),
    }
}

#[async_trait]
impl OAuthProvider for FakeOAuth {
    fn authorization_url(&self, state: &str) -> String {
        format!("{FAKE_AUTHORIZE_URL}?response_type=code&state={state}")
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if code == "bad-code" {
            return Err(OAuthError::Exchange("invalid_grant".to_string()));
        }
        Ok(format!("provider-token-for-{code}"))
    }

    async fn fetch_profile(&self, _access_token: &str) -> Result<ExternalProfile, OAuthError> {
        Ok(self.profile.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// TestContext
// ---------------------------------------------------------------------------

pub struct TestContext {
    pub service: Arc<AuthService>,
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCache>,
    pub queue: Arc<MemoryQueue>,
    pub oauth: Arc<FakeOAuth>,
    pub config: ServerConfig,
}

impl TestContext {
    pub fn new() -> Self {
        let config = test_config();
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(MemoryCache::default());
        let queue = Arc::new(MemoryQueue::default());
        let oauth = Arc::new(FakeOAuth::new());

        let service = Arc::new(AuthService::new(
            store.clone(),
            cache.clone(),
            EmailQueue::new(queue.clone()),
            oauth.clone(),
            config.jwt.clone(),
        ));

        Self {
            service,
            store,
            cache,
            queue,
            oauth,
            config,
        }
    }

    /// Build the full application router over this context's service.
    pub fn app(&self) -> Router {
        let state = AppState {
            config: Arc::new(self.config.clone()),
            auth: Arc::clone(&self.service),
        };
        build_app_router(state, &self.config)
    }

    pub async fn register(&self, email: &str) -> VerificationTicket {
        self.service
            .register(registration(email, PASSWORD))
            .await
            .expect("registration should succeed")
    }

    /// Register and verify `email`; returns the user.
    pub async fn register_verified(&self, email: &str) -> User {
        let ticket = self.register(email).await;
        let code = self.queue.last_code_for(email).expect("code was emailed");
        self.service
            .verify_email(&ticket.verification_token, &code)
            .await
            .expect("verification should succeed");
        self.store.user_by_email(email).expect("user exists")
    }

    /// Insert a verified Google account directly.
    pub fn seed_google_user(&self, email: &str) -> User {
        self.store.seed_user(NewUser {
            email: email.to_string(),
            password_hash: String::new(),
            login_method: LoginMethod::Google,
            google_id: Some(format!("google-{email}")),
            role: "user".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Torres".to_string(),
            phone: String::new(),
            address: String::new(),
            country: String::new(),
            workshop_name: String::new(),
            verified: true,
        })
    }
}

pub fn registration(email: &str, password: &str) -> Registration {
    Registration {
        email: email.to_string(),
        password: password.to_string(),
        first_name: "Ana".to_string(),
        last_name: "Torres".to_string(),
        phone: "+54 11 5555 0000".to_string(),
        address: "Av. Corrientes 1234".to_string(),
        country: "AR".to_string(),
        workshop_name: "Taller Torres".to_string(),
    }
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::get(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response {
    let request = Request::get(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::post(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_with_cookie(app: Router, uri: &str, cookie: &str) -> Response {
    let request = Request::post(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::post(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// All `Set-Cookie` header values of `response`.
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// Value assigned to cookie `name` by a `Set-Cookie` list.
pub fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    cookies.iter().find_map(|c| {
        let (pair, _) = c.split_once(';').unwrap_or((c, ""));
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(axum::http::header::LOCATION)
        .expect("redirect has a Location")
        .to_str()
        .unwrap()
        .to_string()
}

/// Parse the query string of a redirect target into a map.
pub fn query_of(target: &str) -> HashMap<String, String> {
    url::Url::parse(target)
        .unwrap()
        .query_pairs()
        .into_owned()
        .collect()
}

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use batches_common::store::MemoryStore;
use batches_common::{
    BatchSpec, BatchSpecMount, BatchesStore, GetBatchSpecMountOpts, GetBatchSpecOpts,
    ListBatchSpecMountsOpts, StoreError,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};

use batches_server::config::{
    AppConfig, CorsConfig, DatabaseConfig, ExecutorConfig, MountConfig, ServerConfig,
};
use batches_server::policy::PolicyKind;
use batches_server::state::AppState;

pub const EXECUTOR_TOKEN: &str = "executor-secret-for-tests";

/// Modification time as rendered by executor clients.
pub const MODIFIED: &str = "2022-08-15 19:30:25.410972423 +0000 UTC";

pub mod routes {
    pub fn spec(spec: &str) -> String {
        format!("/batches/mount/{spec}")
    }

    pub fn mount(spec: &str, mount: &str) -> String {
        format!("/batches/mount/{spec}/{mount}")
    }

    pub fn executor_spec(spec: &str) -> String {
        format!("/.executors/batches/mount/{spec}")
    }

    pub fn executor_mount(spec: &str, mount: &str) -> String {
        format!("/.executors/batches/mount/{spec}/{mount}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    GetBatchSpec,
    GetBatchSpecMount,
    CountBatchSpecMounts,
    UpsertBatchSpecMount,
}

/// A store call as observed by [`FakeStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    GetBatchSpec(GetBatchSpecOpts),
    GetBatchSpecMount(GetBatchSpecMountOpts),
    CountBatchSpecMounts(ListBatchSpecMountsOpts),
    UpsertBatchSpecMount(BatchSpecMount),
}

/// Test double for the store collaborator.
///
/// Delegates to a [`MemoryStore`], records every call and fails operations
/// on demand with a backend error carrying the given message.
#[derive(Default)]
pub struct FakeStore {
    pub inner: MemoryStore,
    calls: Mutex<Vec<StoreCall>>,
    failures: Mutex<HashMap<StoreOp, String>>,
    /// Upserts of these file names fail, others go through.
    upsert_failures: Mutex<HashMap<String, String>>,
}

impl FakeStore {
    pub fn fail(&self, op: StoreOp, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(op, message.to_string());
    }

    pub fn fail_upsert_of(&self, file_name: &str, message: &str) {
        self.upsert_failures
            .lock()
            .unwrap()
            .insert(file_name.to_string(), message.to_string());
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Mounts passed to `upsert_batch_spec_mount`, in call order.
    pub fn upserts(&self) -> Vec<BatchSpecMount> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::UpsertBatchSpecMount(mount) => Some(mount),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn injected(&self, op: StoreOp) -> Result<(), StoreError> {
        match self.failures.lock().unwrap().get(&op) {
            Some(message) => Err(StoreError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BatchesStore for FakeStore {
    async fn get_batch_spec(&self, opts: GetBatchSpecOpts) -> Result<BatchSpec, StoreError> {
        self.record(StoreCall::GetBatchSpec(opts.clone()));
        self.injected(StoreOp::GetBatchSpec)?;
        self.inner.get_batch_spec(opts).await
    }

    async fn get_batch_spec_mount(
        &self,
        opts: GetBatchSpecMountOpts,
    ) -> Result<BatchSpecMount, StoreError> {
        self.record(StoreCall::GetBatchSpecMount(opts.clone()));
        self.injected(StoreOp::GetBatchSpecMount)?;
        self.inner.get_batch_spec_mount(opts).await
    }

    async fn count_batch_spec_mounts(
        &self,
        opts: ListBatchSpecMountsOpts,
    ) -> Result<u64, StoreError> {
        self.record(StoreCall::CountBatchSpecMounts(opts.clone()));
        self.injected(StoreOp::CountBatchSpecMounts)?;
        self.inner.count_batch_spec_mounts(opts).await
    }

    async fn upsert_batch_spec_mount(
        &self,
        mount: &BatchSpecMount,
    ) -> Result<BatchSpecMount, StoreError> {
        self.record(StoreCall::UpsertBatchSpecMount(mount.clone()));
        self.injected(StoreOp::UpsertBatchSpecMount)?;
        if let Some(message) = self.upsert_failures.lock().unwrap().get(&mount.file_name) {
            return Err(StoreError::Backend(message.clone()));
        }
        self.inner.upsert_batch_spec_mount(mount).await
    }
}

/// One file of an upload form.
pub struct MountFile<'a> {
    pub name: &'a str,
    pub path: &'a str,
    pub content: &'a str,
    pub modified: &'a str,
}

/// Build an upload form the way executor clients do.
pub fn mount_form(files: &[MountFile<'_>]) -> Form {
    let mut form = Form::new().text("count", files.len().to_string());
    for (i, file) in files.iter().enumerate() {
        let part = Part::bytes(file.content.as_bytes().to_vec()).file_name(file.name.to_string());
        form = form
            .text(format!("filemod_{i}"), file.modified.to_string())
            .text(format!("filepath_{i}"), file.path.to_string())
            .part(format!("file_{i}"), part);
    }
    form
}

/// A running test server.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<FakeStore>,
}

/// Response captured for assertions.
pub struct TestResponse {
    pub status: u16,
    pub text: String,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.expect("Failed to read response body");
        Self { status, text }
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors: CorsConfig::default(),
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
        },
        mount: MountConfig::default(),
        executor: ExecutorConfig {
            token: Some(EXECUTOR_TOKEN.to_string()),
        },
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_policy(PolicyKind::AllowAll).await
    }

    pub async fn spawn_with_policy(policy: PolicyKind) -> Self {
        Self::spawn_with(|config| config.mount.policy = policy).await
    }

    /// Spawn with the default test config adjusted by `configure`.
    pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = test_config();
        configure(&mut config);

        let store = Arc::new(FakeStore::default());
        let state = AppState::new(store.clone(), config);
        let app = batches_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            store,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Register a batch spec with the backing store.
    pub async fn create_batch_spec(&self, rand_id: &str) -> BatchSpec {
        self.store.inner.insert_batch_spec(rand_id).await
    }

    /// Store a mount directly, bypassing the HTTP surface.
    pub async fn create_mount(&self, spec: &BatchSpec, file_name: &str, content: &str) -> String {
        let mount = BatchSpecMount::new(
            spec.id,
            "foo/bar",
            file_name,
            content.as_bytes().to_vec(),
            batches_common::timestamp::parse_modified_at(MODIFIED).unwrap(),
        );
        self.store
            .inner
            .upsert_batch_spec_mount(&mount)
            .await
            .expect("Failed to seed mount")
            .rand_id
    }

    pub async fn request(&self, method: Method, path: &str) -> TestResponse {
        let res = self
            .client
            .request(method, self.url(path))
            .send()
            .await
            .expect("Failed to send request");

        TestResponse::from_response(res).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path).await
    }

    pub async fn head(&self, path: &str) -> TestResponse {
        self.request(Method::HEAD, path).await
    }

    pub async fn upload(&self, path: &str, form: Form) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    pub async fn post_raw(
        &self,
        path: &str,
        content_type: &str,
        body: &'static str,
    ) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn executor_request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = self.client.request(method, self.url(path));
        if let Some(token) = token {
            req = req.header("Authorization", format!("token-executor {token}"));
        }
        let res = req.send().await.expect("Failed to send executor request");

        TestResponse::from_response(res).await
    }
}

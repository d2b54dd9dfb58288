//! Hand-written collaborators for router tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use quarry_cache::ManualClock;
use quarry_config::QuarryConfig;
use quarry_core::{
    AnswerDetail, Partition, PartitionCatalog, QueryRows, ReasoningService, RetrievalStore,
    RetrievedDocument, Role, Route, ServiceError, TabularEngine, VisibilityFilter,
};
use quarry_router::{Router, RouterDeps};
use tokio::sync::Notify;

/// What a scripted call does.
#[derive(Debug, Clone)]
pub enum Script<T> {
    Reply(T),
    Fail(ServiceError),
    Hang,
}

fn unavailable(service: &'static str) -> ServiceError {
    ServiceError::Unavailable {
        service,
        reason: "connection refused".into(),
    }
}

/// Parks one call so a test can act while it is in flight.
#[derive(Default)]
pub struct Gate {
    armed: AtomicBool,
    pub entered: Notify,
    pub release: Notify,
}

impl Gate {
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    async fn pass(&self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }
}

pub struct FakeReasoning {
    pub classify: Mutex<Script<Route>>,
    pub query: Mutex<Script<String>>,
    pub answer: Mutex<Script<String>>,
    /// One-shot answers played before `answer`, oldest first.
    pub queued_answers: Mutex<VecDeque<Script<String>>>,
    pub classify_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
    pub answer_calls: AtomicUsize,
    /// Schema descriptions seen by `generate_query`.
    pub schemas: Mutex<Vec<String>>,
    /// Context sources seen by `answer`, per call.
    pub contexts: Mutex<Vec<Vec<String>>>,
    /// Park the next `answer` call until `release` is notified.
    pub hold: Gate,
}

impl Default for FakeReasoning {
    fn default() -> Self {
        Self {
            classify: Mutex::new(Script::Reply(Route::Unstructured)),
            query: Mutex::new(Script::Fail(unavailable("reasoning"))),
            answer: Mutex::new(Script::Reply("From the documents.".into())),
            queued_answers: Mutex::new(VecDeque::new()),
            classify_calls: AtomicUsize::new(0),
            query_calls: AtomicUsize::new(0),
            answer_calls: AtomicUsize::new(0),
            schemas: Mutex::new(Vec::new()),
            contexts: Mutex::new(Vec::new()),
            hold: Gate::default(),
        }
    }
}

impl FakeReasoning {
    pub fn classify_with(&self, script: Script<Route>) {
        *self.classify.lock() = script;
    }

    pub fn query_with(&self, sql: &str) {
        *self.query.lock() = Script::Reply(sql.to_string());
    }

    pub fn answer_with(&self, script: Script<String>) {
        *self.answer.lock() = script;
    }

    pub fn answer_once(&self, script: Script<String>) {
        self.queued_answers.lock().push_back(script);
    }

    pub fn classify_calls(&self) -> usize {
        self.classify_calls.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn answer_calls(&self) -> usize {
        self.answer_calls.load(Ordering::SeqCst)
    }
}

async fn play<T: Clone>(script: Script<T>) -> Result<T, ServiceError> {
    match script {
        Script::Reply(value) => Ok(value),
        Script::Fail(e) => Err(e),
        Script::Hang => {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(unavailable("never"))
        }
    }
}

#[async_trait]
impl ReasoningService for FakeReasoning {
    async fn classify(&self, _question: &str) -> Result<Route, ServiceError> {
        self.classify_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.classify.lock().clone();
        play(script).await
    }

    async fn generate_query(
        &self,
        _question: &str,
        schema_description: &str,
        _allowed_tables: &[String],
    ) -> Result<String, ServiceError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.schemas.lock().push(schema_description.to_string());
        let script = self.query.lock().clone();
        play(script).await
    }

    async fn answer(
        &self,
        _question: &str,
        context: &[RetrievedDocument],
        _detail: AnswerDetail,
    ) -> Result<String, ServiceError> {
        self.answer_calls.fetch_add(1, Ordering::SeqCst);
        self.contexts
            .lock()
            .push(context.iter().map(|d| d.source.clone()).collect());
        self.hold.pass().await;
        let queued = self.queued_answers.lock().pop_front();
        let script = queued.unwrap_or_else(|| self.answer.lock().clone());
        play(script).await
    }
}

pub struct FakeEngine {
    pub result: Mutex<Script<QueryRows>>,
    pub executed: Mutex<Vec<String>>,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self {
            result: Mutex::new(Script::Reply(QueryRows {
                columns: vec!["count".into()],
                rows: vec![vec!["2".into()]],
            })),
            executed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TabularEngine for FakeEngine {
    async fn execute(&self, statement: &str) -> Result<QueryRows, ServiceError> {
        self.executed.lock().push(statement.to_string());
        let script = self.result.lock().clone();
        play(script).await
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub documents: Mutex<Vec<RetrievedDocument>>,
    pub filters: Mutex<Vec<(VisibilityFilter, usize)>>,
}

impl FakeStore {
    pub fn add(&self, source: &str, label: &str, content: &str) {
        self.documents.lock().push(RetrievedDocument {
            source: source.into(),
            label: label.into(),
            content: content.into(),
            score: 1.0,
        });
    }

    pub fn searches(&self) -> usize {
        self.filters.lock().len()
    }
}

#[async_trait]
impl RetrievalStore for FakeStore {
    async fn search(
        &self,
        _query: &str,
        filter: &VisibilityFilter,
        limit: usize,
    ) -> Result<Vec<RetrievedDocument>, ServiceError> {
        self.filters.lock().push((filter.clone(), limit));
        Ok(self
            .documents
            .lock()
            .iter()
            .filter(|d| filter.allows(&d.label))
            .take(limit)
            .cloned()
            .collect())
    }
}

pub struct FakeCatalog {
    pub partitions: Mutex<Vec<Partition>>,
    pub calls: AtomicUsize,
    /// Park the next lookup after it has read the partitions.
    pub hold: Gate,
}

impl Default for FakeCatalog {
    fn default() -> Self {
        Self {
            partitions: Mutex::new(vec![
                Partition::new(
                    "hr_data",
                    "hr",
                    vec!["name".into(), "department".into(), "performance_rating".into()],
                ),
                Partition::new("finance_data", "finance", vec!["quarter".into(), "revenue".into()]),
                Partition::new("holidays", "general", vec!["date".into(), "name".into()]),
            ]),
            calls: AtomicUsize::new(0),
            hold: Gate::default(),
        }
    }
}

impl FakeCatalog {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PartitionCatalog for FakeCatalog {
    async fn partitions(&self) -> Result<Vec<Partition>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let snapshot = self.partitions.lock().clone();
        self.hold.pass().await;
        Ok(snapshot)
    }
}

/// A router wired to fakes, with a manual clock.
pub struct Harness {
    pub reasoning: Arc<FakeReasoning>,
    pub engine: Arc<FakeEngine>,
    pub store: Arc<FakeStore>,
    pub catalog: Arc<FakeCatalog>,
    pub clock: ManualClock,
    pub router: Router,
}

pub fn test_config() -> QuarryConfig {
    let mut config = QuarryConfig::default();
    config.reasoning.classify_timeout_secs = 1;
    config.reasoning.generate_timeout_secs = 1;
    config.reasoning.answer_timeout_secs = 1;
    config.routing.execution_timeout_secs = 1;
    config.routing.search_timeout_secs = 1;
    config
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(&test_config())
    }

    pub fn with_config(config: &QuarryConfig) -> Self {
        let reasoning = Arc::new(FakeReasoning::default());
        let engine = Arc::new(FakeEngine::default());
        let store = Arc::new(FakeStore::default());
        let catalog = Arc::new(FakeCatalog::default());
        let clock = ManualClock::new();
        let deps = RouterDeps {
            reasoning: Arc::clone(&reasoning) as Arc<dyn ReasoningService>,
            engine: Arc::clone(&engine) as Arc<dyn TabularEngine>,
            store: Arc::clone(&store) as Arc<dyn RetrievalStore>,
            catalog: Arc::clone(&catalog) as Arc<dyn PartitionCatalog>,
        };
        let router = Router::with_clock(deps, config, Arc::new(clock.clone()));
        Self {
            reasoning,
            engine,
            store,
            catalog,
            clock,
            router,
        }
    }
}

pub fn role(raw: &str) -> Role {
    Role::new(raw).unwrap()
}

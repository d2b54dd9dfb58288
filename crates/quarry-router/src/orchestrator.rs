//! The request state machine.
//!
//! ```text
//! Start -> Classify -> StructuredAttempt | UnstructuredAttempt
//! StructuredAttempt -> (no partitions) -> UnstructuredAttempt
//! StructuredAttempt -> Generate -> Validate -> Execute -> [Structured]
//!                         \___________\___________\-> UnstructuredAttempt
//! UnstructuredAttempt -> [answered] | GeneralFallback | [empty]
//! GeneralFallback -> [answered via general] | [empty]
//! ```
//!
//! Every collaborator call runs under a deadline and every failure turns
//! into a fallback; [`Router::ask`] always returns an envelope.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use quarry_access::{AccessGate, AccessScope, CredentialVerifier};
use quarry_cache::{Clock, SystemClock, Ttl, TtlCache};
use quarry_config::QuarryConfig;
use quarry_core::{
    AnswerDetail, AnswerEnvelope, AnswerMode, CandidateQuery, ClassificationResult,
    FallbackReason, NO_ANSWER, NO_ROWS, Outcome, PartitionCatalog, ReasoningService, Rejection,
    RetrievalStore, Role, Route, ServiceError, TabularEngine,
};
use tracing::Instrument;

use crate::classifier::QueryClassifier;
use crate::events::AdminEvent;
use crate::normalize_question;
use crate::plan::RetrievalPlan;
use crate::schema::SchemaCache;
use crate::validator::validate;

/// The external collaborators a [`Router`] drives.
#[derive(Clone)]
pub struct RouterDeps {
    pub reasoning: Arc<dyn ReasoningService>,
    pub engine: Arc<dyn TabularEngine>,
    pub store: Arc<dyn RetrievalStore>,
    pub catalog: Arc<dyn PartitionCatalog>,
}

type AnswerKey = (Role, AnswerDetail, String);

/// Answers questions for authenticated roles.
pub struct Router {
    deps: RouterDeps,
    classifier: QueryClassifier,
    gate: AccessGate,
    credentials: Option<Arc<CredentialVerifier>>,
    schema: SchemaCache,
    answers: TtlCache<AnswerKey, AnswerEnvelope>,
    plans: TtlCache<(Role, AnswerDetail), RetrievalPlan>,
    config: QuarryConfig,
}

/// What the unstructured path produced.
struct Retrieved {
    answer: String,
    sources: Vec<String>,
}

impl Router {
    pub fn new(deps: RouterDeps, config: &QuarryConfig) -> Self {
        Self::with_clock(deps, config, Arc::new(SystemClock))
    }

    /// Construct with an explicit clock driving the answer and schema TTLs.
    pub fn with_clock(deps: RouterDeps, config: &QuarryConfig, clock: Arc<dyn Clock>) -> Self {
        let classifier = QueryClassifier::new(
            Arc::clone(&deps.reasoning),
            config.cache.classifier_capacity,
            config.reasoning.classify_timeout(),
            config.routing.inconclusive_route,
        );
        let gate = AccessGate::new(
            Arc::clone(&deps.catalog),
            &config.access.admin_role,
            &config.access.general_role,
        )
        .with_known_roles(&config.access.roles);
        Self {
            deps,
            classifier,
            gate,
            credentials: None,
            schema: SchemaCache::new(config.cache.schema_ttl(), Arc::clone(&clock)),
            answers: TtlCache::with_clock(Arc::clone(&clock)),
            plans: TtlCache::with_clock(clock),
            config: config.clone(),
        }
    }

    /// Attach a credential verifier so user events can invalidate it.
    #[must_use]
    pub fn with_credentials(mut self, verifier: Arc<CredentialVerifier>) -> Self {
        self.credentials = Some(verifier);
        self
    }

    /// Replace the registry taken from `access.roles`. Roles outside it
    /// (besides the administrative and general roles) are denied; role
    /// events keep it current.
    #[must_use]
    pub fn with_known_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.gate = self.gate.with_known_roles(roles);
        self
    }

    #[must_use]
    pub const fn access(&self) -> &AccessGate {
        &self.gate
    }

    #[must_use]
    pub const fn classifier(&self) -> &QueryClassifier {
        &self.classifier
    }

    #[must_use]
    pub fn credentials(&self) -> Option<&CredentialVerifier> {
        self.credentials.as_deref()
    }

    pub async fn classify(&self, question: &str) -> ClassificationResult {
        self.classifier.classify(question).await
    }

    pub async fn allowed_partitions(&self, role: &Role) -> BTreeSet<String> {
        self.gate.allowed_partitions(role).await
    }

    /// Validate a statement against `role`'s current allow-set.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] the validator produced.
    pub async fn validate_for_role(
        &self,
        candidate: &str,
        role: &Role,
    ) -> Result<CandidateQuery, Rejection> {
        let allowed = self.gate.allowed_partitions(role).await;
        validate(candidate, &allowed)
    }

    /// Answer `question` for `role`. Never fails.
    pub async fn ask(&self, question: &str, role: &Role, detail: AnswerDetail) -> AnswerEnvelope {
        let span = tracing::info_span!("ask", role = %role, detail = %detail);
        self.ask_inner(question, role, detail).instrument(span).await
    }

    async fn ask_inner(&self, question: &str, role: &Role, detail: AnswerDetail) -> AnswerEnvelope {
        let key: AnswerKey = (role.clone(), detail, normalize_question(question));
        if let Some(mut hit) = self.answers.get(&key) {
            tracing::debug!(mode = %hit.mode, "answer cache hit");
            hit.cached = true;
            return hit;
        }
        let generation = self.answers.generation();

        let classification = self.classifier.classify(question).await;
        tracing::debug!(
            route = %classification.route,
            provenance = %classification.provenance,
            counting_override = classification.counting_override,
            "classified"
        );

        let envelope = match classification.route {
            Route::Structured => match self.structured(question, role).await {
                Ok((answer, statement)) => AnswerEnvelope {
                    role: role.clone(),
                    answer,
                    mode: AnswerMode::Structured,
                    used_fallback: false,
                    outcome: Outcome::Answered,
                    attempted: Route::Structured,
                    classification,
                    source_query: Some(statement),
                    fallback_reason: None,
                    sources: Vec::new(),
                    cached: false,
                },
                Err(reason) => {
                    tracing::debug!(?reason, "structured path abandoned");
                    self.unstructured(question, role, detail, classification, Some(reason))
                        .await
                }
            },
            Route::Unstructured => {
                self.unstructured(question, role, detail, classification, None)
                    .await
            }
        };

        if envelope.is_answered() {
            self.answers.put_if_current(
                key,
                envelope.clone(),
                Ttl::For(self.config.cache.answer_ttl()),
                generation,
            );
        }
        tracing::debug!(mode = %envelope.mode, outcome = ?envelope.outcome, "answered");
        envelope
    }

    /// Generate, validate, and execute. Returns the rendered answer and the
    /// executed statement, or why the path was abandoned.
    async fn structured(&self, question: &str, role: &Role) -> Result<(String, String), FallbackReason> {
        let partitions = self.gate.partitions_for(role).await;
        if partitions.is_empty() {
            tracing::debug!("no accessible partitions");
            return Err(FallbackReason::NoAccessiblePartitions);
        }
        let allowed: BTreeSet<String> = partitions.iter().map(|p| p.name.clone()).collect();
        let tables: Vec<String> = allowed.iter().cloned().collect();
        let description = self.schema.describe(&partitions);

        let raw = with_deadline(
            "reasoning",
            self.config.reasoning.generate_timeout(),
            self.deps
                .reasoning
                .generate_query(question, &description, &tables),
        )
        .await
        .map_err(|e| service_failure(&e))?;

        let candidate = validate(&raw, &allowed).map_err(|rejection| {
            tracing::warn!(rejection = %rejection, kind = rejection.as_str(), "generated statement rejected");
            FallbackReason::Rejected { rejection }
        })?;
        tracing::debug!(tables = ?candidate.declared_tables, "statement accepted");

        let rows = with_deadline(
            "engine",
            self.config.routing.execution_timeout(),
            self.deps.engine.execute(&candidate.text),
        )
        .await
        .map_err(|e| service_failure(&e))?;

        let answer = if rows.is_empty() {
            NO_ROWS.to_string()
        } else {
            rows.to_markdown()
        };
        Ok((answer, candidate.text))
    }

    async fn unstructured(
        &self,
        question: &str,
        role: &Role,
        detail: AnswerDetail,
        classification: ClassificationResult,
        fallback_reason: Option<FallbackReason>,
    ) -> AnswerEnvelope {
        let attempted = classification.route;
        let plan = self.plan_for(role, detail);

        let mut via_general = false;
        let mut retrieved = self.retrieve_and_answer(question, &plan).await;
        if retrieved.is_none() && !self.gate.is_general(role) {
            tracing::debug!("role scope empty, trying general scope");
            via_general = true;
            let general = plan.with_filter(self.gate.general_filter());
            retrieved = self.retrieve_and_answer(question, &general).await;
        }

        let (answer, sources, outcome, via_general) = match retrieved {
            Some(found) => (found.answer, found.sources, Outcome::Answered, via_general),
            None => (NO_ANSWER.to_string(), Vec::new(), Outcome::Empty, false),
        };
        let mode = AnswerMode::unstructured(attempted, via_general);

        AnswerEnvelope {
            role: role.clone(),
            answer,
            mode,
            used_fallback: mode.route() != attempted,
            outcome,
            attempted,
            classification,
            source_query: None,
            fallback_reason,
            sources,
            cached: false,
        }
    }

    /// Search with `plan` and answer from the hits. `None` when nothing was
    /// found, the service failed, or the answer is the not-found reply.
    async fn retrieve_and_answer(&self, question: &str, plan: &RetrievalPlan) -> Option<Retrieved> {
        let documents = match with_deadline(
            "retrieval",
            self.config.routing.search_timeout(),
            self.deps.store.search(question, &plan.filter, plan.top_k),
        )
        .await
        {
            Ok(documents) if documents.is_empty() => return None,
            Ok(documents) => documents,
            Err(e) => {
                tracing::warn!(%e, "document search failed");
                return None;
            }
        };

        let answer = match with_deadline(
            "reasoning",
            self.config.reasoning.answer_timeout(),
            self.deps.reasoning.answer(question, &documents, plan.detail),
        )
        .await
        {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(%e, "answer generation failed");
                return None;
            }
        };

        if is_not_found_reply(&answer) {
            return None;
        }

        let mut sources: Vec<String> = Vec::new();
        for doc in &documents {
            if !sources.contains(&doc.source) {
                sources.push(doc.source.clone());
            }
        }
        Some(Retrieved { answer, sources })
    }

    fn plan_for(&self, role: &Role, detail: AnswerDetail) -> RetrievalPlan {
        let key = (role.clone(), detail);
        if let Some(plan) = self.plans.get(&key) {
            return plan;
        }
        let generation = self.plans.generation();
        let plan = RetrievalPlan {
            filter: self.gate.document_visibility_filter(role),
            top_k: RetrievalPlan::depth(&self.config.routing, self.gate.is_admin(role), detail),
            detail,
        };
        self.plans.put_if_current(key, plan.clone(), Ttl::Never, generation);
        plan
    }

    /// Drop cached access decisions and the retrieval plans built on them.
    pub fn invalidate_access(&self, scope: &AccessScope) {
        self.gate.invalidate_access(scope);
        match scope {
            AccessScope::Role(role) => self.plans.invalidate_where(|(r, _)| r == role),
            AccessScope::All => self.plans.invalidate_all(),
        }
    }

    pub fn invalidate_answer_cache(&self) {
        self.answers.invalidate_all();
        tracing::debug!("answer cache invalidated");
    }

    pub fn invalidate_schema_cache(&self) {
        self.schema.invalidate_all();
        tracing::debug!("schema cache invalidated");
    }

    /// Perform every invalidation `event` requires. Returns once they are
    /// visible to subsequent requests.
    pub fn apply_admin_event(&self, event: &AdminEvent) {
        tracing::info!(event = %event, "applying administrative change");
        match event {
            AdminEvent::UserChanged(username) | AdminEvent::UserRemoved(username) => {
                if let Some(credentials) = &self.credentials {
                    credentials.invalidate(username);
                }
            }
            AdminEvent::RoleCreated(role) => {
                self.gate.register_role(role);
                self.invalidate_access(&AccessScope::Role(role.clone()));
            }
            AdminEvent::RoleDeleted(role) => {
                self.gate.forget_role(role);
                if let Some(credentials) = &self.credentials {
                    credentials.invalidate_all();
                }
                self.invalidate_access(&AccessScope::All);
                self.invalidate_schema_cache();
                self.invalidate_answer_cache();
            }
            AdminEvent::DocumentIngested(role) => {
                self.invalidate_access(&AccessScope::Role(role.clone()));
                self.invalidate_answer_cache();
            }
            AdminEvent::PartitionIngested(_) | AdminEvent::PartitionRelabeled { .. } => {
                self.invalidate_access(&AccessScope::All);
                self.invalidate_schema_cache();
                self.invalidate_answer_cache();
            }
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("gate", &self.gate)
            .field("classifier", &self.classifier)
            .field("cached_answers", &self.answers.entry_count())
            .finish_non_exhaustive()
    }
}

async fn with_deadline<T>(
    service: &'static str,
    after: Duration,
    call: impl Future<Output = Result<T, ServiceError>>,
) -> Result<T, ServiceError> {
    tokio::time::timeout(after, call)
        .await
        .unwrap_or(Err(ServiceError::Timeout { service, after }))
}

fn service_failure(error: &ServiceError) -> FallbackReason {
    tracing::warn!(%error, service = error.service(), "structured path failed");
    FallbackReason::ServiceFailure {
        service: error.service().to_string(),
        message: error.to_string(),
    }
}

fn is_not_found_reply(answer: &str) -> bool {
    let trimmed = answer.trim().trim_matches(|c| c == '\'' || c == '"');
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NO_ANSWER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_reply_detection() {
        assert!(is_not_found_reply("  'I couldn't find an answer in the documents.' "));
        assert!(is_not_found_reply(""));
        assert!(!is_not_found_reply("Leave is 20 days."));
    }
}

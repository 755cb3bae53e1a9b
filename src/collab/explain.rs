//! Explanation requests for discovered conditions.
//!
//! The [`ExplanationService`] runs an [`Explainer`] on a worker thread.
//! The render loop submits requests and drains results with
//! [`ExplanationService::poll`]; it never waits. Any failure becomes a
//! static fallback text.

use std::fmt;
use std::sync::{mpsc, Arc};

use rustc_hash::FxHashMap;

use crate::discovery::ConditionRegistry;

/// Failure inside an explainer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplainError {
    /// The explainer has nothing for this condition.
    Unavailable(String),
    /// Transport or protocol failure talking to a remote backend.
    Backend(String),
    /// The backend answered with no text.
    Empty,
}

impl fmt::Display for ExplainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(id) => write!(f, "no explanation for {id}"),
            Self::Backend(msg) => write!(f, "explanation backend error: {msg}"),
            Self::Empty => write!(f, "explanation backend returned no text"),
        }
    }
}

impl std::error::Error for ExplainError {}

/// What to explain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainRequest {
    /// Condition id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short context (anatomy view, severity).
    pub context: String,
}

impl ExplainRequest {
    /// Prompt text for language-model backends.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!(
            "In two or three friendly sentences, explain the medical condition \
             \"{}\" to a curious visitor of an interactive anatomy exhibit. \
             Context: {}. Do not give medical advice.",
            self.name, self.context
        )
    }

    /// Text shown when no explanation could be produced.
    #[must_use]
    pub fn fallback_text(&self) -> String {
        format!("{}: no further details are available right now.", self.name)
    }
}

/// Produces explanation text, either whole or as a sequence of chunks.
///
/// Runs on a worker thread. `emit` may be called any number of times; each
/// call appends a chunk to the visible text.
pub trait Explainer: Send + Sync {
    /// Explain `request`, streaming text through `emit`.
    fn explain(
        &self,
        request: &ExplainRequest,
        emit: &mut dyn FnMut(&str),
    ) -> Result<(), ExplainError>;
}

// ---------------------------------------------------------------------------
// CannedExplainer
// ---------------------------------------------------------------------------

/// Serves the summaries from the condition table, one sentence per chunk.
#[derive(Debug, Clone, Default)]
pub struct CannedExplainer {
    summaries: FxHashMap<String, String>,
}

impl CannedExplainer {
    /// Index every non-empty summary in `registry`.
    #[must_use]
    pub fn from_registry(registry: &ConditionRegistry) -> Self {
        let summaries = registry
            .conditions()
            .iter()
            .filter(|c| !c.summary.is_empty())
            .map(|c| (c.id.clone(), c.summary.clone()))
            .collect();
        Self { summaries }
    }
}

impl Explainer for CannedExplainer {
    fn explain(
        &self,
        request: &ExplainRequest,
        emit: &mut dyn FnMut(&str),
    ) -> Result<(), ExplainError> {
        let summary = self
            .summaries
            .get(&request.id)
            .ok_or_else(|| ExplainError::Unavailable(request.id.clone()))?;
        for sentence in summary.split_inclusive(". ") {
            emit(sentence);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// HttpExplainer
// ---------------------------------------------------------------------------

/// Streams completions from an Ollama-style `/api/generate` endpoint.
#[cfg(feature = "llm")]
pub struct HttpExplainer {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
}

#[cfg(feature = "llm")]
impl HttpExplainer {
    /// Create a client for `endpoint` using `model`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(std::time::Duration::from_secs(30)))
            .build()
            .into();
        Self {
            agent,
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }
}

#[cfg(feature = "llm")]
impl Explainer for HttpExplainer {
    fn explain(
        &self,
        request: &ExplainRequest,
        emit: &mut dyn FnMut(&str),
    ) -> Result<(), ExplainError> {
        use std::io::BufRead;

        let body = serde_json::json!({
            "model": self.model,
            "prompt": request.prompt(),
            "stream": true,
        });
        let response = self
            .agent
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .send(body.to_string())
            .map_err(|e| ExplainError::Backend(e.to_string()))?;

        let reader = std::io::BufReader::new(response.into_body().into_reader());
        let mut produced = false;
        for line in reader.lines() {
            let line = line.map_err(|e| ExplainError::Backend(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            let chunk: serde_json::Value = serde_json::from_str(&line)
                .map_err(|e| ExplainError::Backend(e.to_string()))?;
            if let Some(text) = chunk["response"].as_str() {
                if !text.is_empty() {
                    produced = true;
                    emit(text);
                }
            }
            if chunk["done"].as_bool() == Some(true) {
                break;
            }
        }
        if produced {
            Ok(())
        } else {
            Err(ExplainError::Empty)
        }
    }
}

// ---------------------------------------------------------------------------
// ExplanationService
// ---------------------------------------------------------------------------

/// Progress of one explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplanationStatus {
    /// Requested, no text yet.
    Pending,
    /// Chunks are arriving.
    Streaming,
    /// Finished successfully.
    Complete,
    /// Failed; the text is the fallback.
    Fallback,
}

/// Visible explanation text for one condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    /// Accumulated text.
    pub text: String,
    /// Progress.
    pub status: ExplanationStatus,
}

enum Reply {
    Chunk(String, String),
    Done(String),
    Failed(String, ExplainError),
}

enum Job {
    Explain(ExplainRequest),
    Shutdown,
}

/// Runs an [`Explainer`] off the render loop and collects its output.
pub struct ExplanationService {
    job_tx: Option<mpsc::Sender<Job>>,
    reply_rx: mpsc::Receiver<Reply>,
    reply_tx: mpsc::Sender<Reply>,
    explainer: Arc<dyn Explainer>,
    thread: Option<std::thread::JoinHandle<()>>,
    requests: FxHashMap<String, ExplainRequest>,
    explanations: FxHashMap<String, Explanation>,
}

impl ExplanationService {
    /// Start the worker thread. If it cannot be spawned, requests run
    /// inline on the caller's thread.
    #[must_use]
    pub fn new(explainer: Arc<dyn Explainer>) -> Self {
        let (reply_tx, reply_rx) = mpsc::channel();
        let (job_tx, job_rx) = mpsc::channel::<Job>();

        let worker_explainer = Arc::clone(&explainer);
        let worker_tx = reply_tx.clone();
        let spawned = std::thread::Builder::new()
            .name("explainer".into())
            .spawn(move || {
                while let Ok(job) = job_rx.recv() {
                    match job {
                        Job::Explain(request) => {
                            run_request(&*worker_explainer, &request, &worker_tx);
                        }
                        Job::Shutdown => break,
                    }
                }
            });

        let (job_tx, thread) = match spawned {
            Ok(handle) => (Some(job_tx), Some(handle)),
            Err(e) => {
                log::warn!("explainer thread unavailable ({e}); running inline");
                (None, None)
            }
        };

        Self {
            job_tx,
            reply_rx,
            reply_tx,
            explainer,
            thread,
            requests: FxHashMap::default(),
            explanations: FxHashMap::default(),
        }
    }

    /// Ask for an explanation. Repeated requests for an id that already
    /// has one are ignored.
    pub fn request(&mut self, request: ExplainRequest) {
        if self.explanations.contains_key(&request.id) {
            return;
        }
        let _ = self.explanations.insert(
            request.id.clone(),
            Explanation {
                text: String::new(),
                status: ExplanationStatus::Pending,
            },
        );
        let _ = self.requests.insert(request.id.clone(), request.clone());

        match &self.job_tx {
            Some(tx) => {
                if tx.send(Job::Explain(request.clone())).is_err() {
                    run_request(&*self.explainer, &request, &self.reply_tx);
                }
            }
            None => run_request(&*self.explainer, &request, &self.reply_tx),
        }
    }

    /// Drain finished work. Returns the ids whose text changed.
    pub fn poll(&mut self) -> Vec<String> {
        let mut changed = Vec::new();
        while let Ok(reply) = self.reply_rx.try_recv() {
            let id = match reply {
                Reply::Chunk(id, chunk) => {
                    if let Some(e) = self.explanations.get_mut(&id) {
                        e.text.push_str(&chunk);
                        e.status = ExplanationStatus::Streaming;
                    }
                    id
                }
                Reply::Done(id) => {
                    let fallback = self.fallback_for(&id);
                    if let Some(e) = self.explanations.get_mut(&id) {
                        if e.text.trim().is_empty() {
                            e.status = ExplanationStatus::Fallback;
                            e.text = fallback;
                        } else {
                            e.status = ExplanationStatus::Complete;
                        }
                    }
                    id
                }
                Reply::Failed(id, error) => {
                    log::warn!("explanation for {id} failed: {error}");
                    let fallback = self.fallback_for(&id);
                    if let Some(e) = self.explanations.get_mut(&id) {
                        e.text = fallback;
                        e.status = ExplanationStatus::Fallback;
                    }
                    id
                }
            };
            if !changed.contains(&id) {
                changed.push(id);
            }
        }
        changed
    }

    fn fallback_for(&self, id: &str) -> String {
        self.requests.get(id).map_or_else(
            || format!("{id}: no further details are available right now."),
            ExplainRequest::fallback_text,
        )
    }

    /// Current text for a condition.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Explanation> {
        self.explanations.get(id)
    }

    /// Stop the worker thread.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.job_tx.take() {
            let _ = tx.send(Job::Shutdown);
        }
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ExplanationService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_request(
    explainer: &dyn Explainer,
    request: &ExplainRequest,
    tx: &mpsc::Sender<Reply>,
) {
    let mut emit = |chunk: &str| {
        let _ = tx.send(Reply::Chunk(request.id.clone(), chunk.to_owned()));
    };
    let reply = match explainer.explain(request, &mut emit) {
        Ok(()) => Reply::Done(request.id.clone()),
        Err(e) => Reply::Failed(request.id.clone(), e),
    };
    let _ = tx.send(reply);
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    struct Failing;

    impl Explainer for Failing {
        fn explain(
            &self,
            _request: &ExplainRequest,
            emit: &mut dyn FnMut(&str),
        ) -> Result<(), ExplainError> {
            emit("partial ");
            Err(ExplainError::Backend("connection refused".to_owned()))
        }
    }

    fn request(id: &str) -> ExplainRequest {
        ExplainRequest {
            id: id.to_owned(),
            name: "Rib Fracture".to_owned(),
            context: "torso".to_owned(),
        }
    }

    fn wait_for(service: &mut ExplanationService, id: &str) -> Explanation {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let _ = service.poll();
            let e = service.get(id).cloned().unwrap();
            let finished = matches!(
                e.status,
                ExplanationStatus::Complete | ExplanationStatus::Fallback
            );
            if finished || Instant::now() > deadline {
                return e;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn canned_explainer_streams_sentences() {
        let registry = ConditionRegistry::builtin().unwrap();
        let explainer = CannedExplainer::from_registry(&registry);
        let mut chunks = Vec::new();
        explainer
            .explain(&request("rib_fracture"), &mut |c| chunks.push(c.to_owned()))
            .unwrap();
        assert!(chunks.len() >= 2);
        assert_eq!(
            chunks.concat(),
            registry.get("rib_fracture").unwrap().summary
        );
    }

    #[test]
    fn service_delivers_full_text() {
        let registry = ConditionRegistry::builtin().unwrap();
        let mut service = ExplanationService::new(Arc::new(
            CannedExplainer::from_registry(&registry),
        ));
        service.request(request("rib_fracture"));
        assert_eq!(
            service.get("rib_fracture").unwrap().status,
            ExplanationStatus::Pending
        );
        let e = wait_for(&mut service, "rib_fracture");
        assert_eq!(e.status, ExplanationStatus::Complete);
        assert_eq!(e.text, registry.get("rib_fracture").unwrap().summary);
    }

    #[test]
    fn failures_degrade_to_fallback() {
        let mut service = ExplanationService::new(Arc::new(Failing));
        service.request(request("x"));
        let e = wait_for(&mut service, "x");
        assert_eq!(e.status, ExplanationStatus::Fallback);
        assert_eq!(e.text, request("x").fallback_text());
    }

    #[test]
    fn unknown_condition_falls_back() {
        let mut service =
            ExplanationService::new(Arc::new(CannedExplainer::default()));
        service.request(request("nothing"));
        let e = wait_for(&mut service, "nothing");
        assert_eq!(e.status, ExplanationStatus::Fallback);
    }
}

//! Export job system contract: cache by key, otherwise enqueue and poll.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;

use serde_json::Value;

use crate::{
    export::cache_key::CacheKey,
    foundation::error::{MotionError, MotionResult},
    layers::model::DetectedObject,
};

/// Opaque job identifier handed out by the backend.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the editor sends on "apply/export".
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExportRequest {
    pub image_path: String,
    pub animation_type: String,
    pub objects: Vec<DetectedObject>,
}

impl ExportRequest {
    pub fn cache_key(&self) -> MotionResult<CacheKey> {
        CacheKey::new(&self.image_path, &self.animation_type, &self.objects)
    }
}

/// Status of a submitted job. `Failed` is terminal and distinct from `Pending`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "status", content = "result", rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Finished(Value),
    Failed(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }

    /// HTTP status an export endpoint reports for this state.
    pub fn http_status(&self) -> u16 {
        match self {
            JobStatus::Pending => 202,
            JobStatus::Finished(_) => 200,
            JobStatus::Failed(_) => 500,
        }
    }
}

/// Result of submitting a request.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ExportOutcome {
    /// Served from cache; nothing was recomputed.
    Cached(Value),
    Queued(JobId),
}

/// The external job system: result cache plus job queue.
pub trait ExportBackend {
    fn cached(&self, key: &CacheKey) -> Option<Value>;

    fn store(&mut self, key: &CacheKey, result: Value);

    fn enqueue(&mut self, request: &ExportRequest) -> MotionResult<JobId>;

    /// Unknown ids are an [`MotionError::Export`].
    fn status(&self, job: &JobId) -> MotionResult<JobStatus>;
}

/// Work performed for one job.
pub type ExportWorker = Box<dyn FnMut(&ExportRequest) -> MotionResult<Value>>;

struct JobEntry {
    request: ExportRequest,
    status: JobStatus,
}

/// Single-process [`ExportBackend`]: jobs run when [`InMemoryExportQueue::run_pending`] is
/// called.
pub struct InMemoryExportQueue {
    cache: HashMap<CacheKey, Value>,
    jobs: BTreeMap<JobId, JobEntry>,
    queue: VecDeque<JobId>,
    worker: ExportWorker,
}

impl InMemoryExportQueue {
    pub fn new(worker: impl FnMut(&ExportRequest) -> MotionResult<Value> + 'static) -> Self {
        Self {
            cache: HashMap::new(),
            jobs: BTreeMap::new(),
            queue: VecDeque::new(),
            worker: Box::new(worker),
        }
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Run the next queued job. Returns its id, or `None` when the queue is empty.
    pub fn run_next(&mut self) -> Option<JobId> {
        let id = self.queue.pop_front()?;
        let entry = self.jobs.get_mut(&id)?;
        entry.status = match (self.worker)(&entry.request) {
            Ok(result) => JobStatus::Finished(result),
            Err(err) => {
                tracing::warn!(job = %id, error = %err, "export job failed");
                JobStatus::Failed(err.to_string())
            }
        };
        Some(id)
    }

    /// Run every queued job; returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut n = 0;
        while self.run_next().is_some() {
            n += 1;
        }
        n
    }
}

impl ExportBackend for InMemoryExportQueue {
    fn cached(&self, key: &CacheKey) -> Option<Value> {
        self.cache.get(key).cloned()
    }

    fn store(&mut self, key: &CacheKey, result: Value) {
        self.cache.insert(key.clone(), result);
    }

    fn enqueue(&mut self, request: &ExportRequest) -> MotionResult<JobId> {
        let id = JobId(uuid::Uuid::new_v4().to_string());
        self.jobs.insert(
            id.clone(),
            JobEntry {
                request: request.clone(),
                status: JobStatus::Pending,
            },
        );
        self.queue.push_back(id.clone());
        Ok(id)
    }

    fn status(&self, job: &JobId) -> MotionResult<JobStatus> {
        self.jobs
            .get(job)
            .map(|e| e.status.clone())
            .ok_or_else(|| MotionError::export(format!("unknown export job '{job}'")))
    }
}

/// Caller side of the export contract.
pub struct ExportClient<B: ExportBackend> {
    backend: B,
    keys: HashMap<JobId, CacheKey>,
}

impl<B: ExportBackend> ExportClient<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            keys: HashMap::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Serve from cache when the key is known, otherwise enqueue a job.
    #[tracing::instrument(skip_all, fields(image = %request.image_path, animation = %request.animation_type))]
    pub fn request(&mut self, request: &ExportRequest) -> MotionResult<ExportOutcome> {
        let key = request.cache_key()?;
        if let Some(result) = self.backend.cached(&key) {
            tracing::debug!(key = %key, "export served from cache");
            return Ok(ExportOutcome::Cached(result));
        }
        let job = self.backend.enqueue(request)?;
        tracing::debug!(key = %key, job = %job, "export job queued");
        self.keys.insert(job.clone(), key);
        Ok(ExportOutcome::Queued(job))
    }

    /// Current status of `job`. A finished result is cached under its request key; a
    /// terminal job stops being tracked either way.
    pub fn poll(&mut self, job: &JobId) -> MotionResult<JobStatus> {
        let status = self.backend.status(job)?;
        match &status {
            JobStatus::Finished(result) => {
                if let Some(key) = self.keys.remove(job) {
                    self.backend.store(&key, result.clone());
                }
            }
            JobStatus::Failed(_) => {
                self.keys.remove(job);
            }
            JobStatus::Pending => {}
        }
        Ok(status)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/jobs.rs"]
mod tests;

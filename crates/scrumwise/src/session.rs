//! The root object callers work with
//!
//! A `Session` pairs a `Connection` with the mirrored object graph and a queue
//! of pending write calls. Domain methods on projects, backlog items and tasks
//! only build `ApiCall`s; the caller decides whether to `enqueue` them for the
//! next `flush` or `execute` them right away.

use serde_json::Value;
use std::sync::Arc;
use tracing::{Instrument, Span, info, info_span};

use crate::client::{ApiResponse, Connection, HttpTransport, Transport};
use crate::collection::EntityCollection;
use crate::config::ScrumwiseConfig;
use crate::data::ScrumwiseData;
use crate::entity::Entity;
use crate::error::{Result, ScrumwiseError};
use crate::project::Project;
use crate::queue::{CallBatch, RequestQueue};
use crate::requests::ApiCall;
use crate::tag::Tag;
use crate::task::Task;

pub struct Session {
    connection: Connection,
    data: ScrumwiseData,
    queue: RequestQueue,
    last_snapshot: Option<Value>,
    span: Span,
}

impl Session {
    /// Creates a session that talks HTTPS to the configured host.
    pub fn new(config: ScrumwiseConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: ScrumwiseConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            connection: Connection::new(config, transport),
            data: ScrumwiseData::new(),
            queue: RequestQueue::new(),
            last_snapshot: None,
            span: Span::none(),
        }
    }

    /// Parent span for every network operation this session performs.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &ScrumwiseConfig {
        self.connection.config()
    }

    pub fn last_data_version(&self) -> i64 {
        self.connection.last_data_version()
    }

    pub fn data(&self) -> &ScrumwiseData {
        &self.data
    }

    pub fn projects(&self) -> &EntityCollection<Project> {
        &self.data.projects
    }

    pub fn persons(&self) -> Option<&Value> {
        self.data.persons.as_ref()
    }

    pub fn deleted_persons(&self) -> Option<&Value> {
        self.data.deleted_persons.as_ref()
    }

    /// Raw `result` of the most recent successful snapshot fetch.
    pub fn last_snapshot(&self) -> Option<&Value> {
        self.last_snapshot.as_ref()
    }

    /// Fetches a snapshot and merges it into the object graph.
    pub async fn open(&mut self) -> Result<()> {
        let span = info_span!(parent: &self.span, "scrumwise.open");
        self.refresh().instrument(span).await
    }

    async fn refresh(&mut self) -> Result<()> {
        let response = self.connection.execute(&ApiCall::GetSnapshot, false).await?;
        let result = response.result.unwrap_or(Value::Null);
        self.data.merge_snapshot(&result)?;
        info!(
            "[Session] Snapshot merged: dataVersion={}, projects={}",
            response.data_version,
            self.data.projects.len()
        );
        self.last_snapshot = Some(result);
        Ok(())
    }

    /// Merges an already fetched snapshot `result` without any network call.
    pub fn merge_snapshot(&mut self, result: &Value) -> Result<bool> {
        self.data.merge_snapshot(result)
    }

    /// Executes one call immediately, bypassing the queue.
    pub async fn execute(&mut self, call: &ApiCall) -> Result<ApiResponse> {
        let span = info_span!(parent: &self.span, "scrumwise.call", endpoint = call.endpoint());
        self.connection.execute(call, false).instrument(span).await
    }

    pub fn enqueue(&mut self, calls: impl Into<CallBatch>) {
        self.queue.append(calls);
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    /// Executes every queued call, clears the queue and refreshes the snapshot.
    ///
    /// On the first failing call the remaining calls are skipped and the error
    /// is returned; the queue is not cleared in that case. Calls that already
    /// went through stay applied on the server.
    pub async fn flush(&mut self) -> Result<()> {
        self.flush_with(false).await
    }

    /// Like `flush`, but every call requires the last known data version.
    pub async fn flush_with(&mut self, require_version: bool) -> Result<()> {
        let span = info_span!(
            parent: &self.span,
            "scrumwise.flush",
            queued = self.queue.len(),
            require_version
        );
        async {
            let executed = self
                .queue
                .execute_all(&mut self.connection, require_version)
                .await?;
            info!("[Session] Flushed {} call(s)", executed);
            self.queue.clear();
            self.refresh().await
        }
        .instrument(span)
        .await
    }

    /// Finds a task by id in any project.
    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.data.find_task(task_id)
    }

    /// The project a task belongs to.
    pub fn project_of(&self, task: &Task) -> Result<&Project> {
        let project_id = task
            .project_id
            .as_ref()
            .ok_or(ScrumwiseError::NotInitialised { kind: Task::KIND })?;
        self.data
            .projects
            .by_id(project_id.as_str())
            .ok_or_else(|| ScrumwiseError::UnknownProject {
                id: project_id.to_string(),
            })
    }

    /// Tags of the project a task belongs to.
    pub fn tags_for_task(&self, task: &Task) -> Result<&EntityCollection<Tag>> {
        Ok(&self.project_of(task)?.tags)
    }

    /// Queues the calls attaching the named tags missing from a task.
    pub fn set_tags_on_task<S: AsRef<str>>(&mut self, task_id: &str, names: &[S]) -> Result<usize> {
        let calls = {
            let task = self.require_task(task_id)?;
            task.set_tags_on_task(self.tags_for_task(task)?, names)?
        };
        let count = calls.len();
        self.enqueue(calls);
        Ok(count)
    }

    /// Queues the calls removing every tag from a task except the named ones.
    pub fn clean_all_tags_except<S: AsRef<str>>(
        &mut self,
        task_id: &str,
        names: &[S],
    ) -> Result<usize> {
        let calls = {
            let task = self.require_task(task_id)?;
            task.clean_all_tags_except(self.tags_for_task(task)?, names)?
        };
        let count = calls.len();
        self.enqueue(calls);
        Ok(count)
    }

    fn require_task(&self, task_id: &str) -> Result<&Task> {
        self.find_task(task_id).ok_or_else(|| ScrumwiseError::NotFound {
            kind: Task::KIND,
            name: task_id.to_string(),
        })
    }
}

//! Serialized library task queue
//!
//! Indexing, thumbnail generation and batch loading are long-running
//! synchronous jobs that must never overlap. Callers submit a
//! [`TaskRequest`] to the [`TaskQueue`]; the owning thread drains it with a
//! [`TaskExecutor`], one request at a time. Every finished request, whether
//! it succeeded or not, is published as a [`TaskCompleted`] message on the
//! queue's channel.

use crate::FamlibError;
use crate::catalog::AssetPattern;
use crate::host::{AssetHost, Workspace};
use crate::indexer::{IndexOptions, IndexReport, Indexer, PrunePolicy};
use crate::loader::{self, ConflictResolver, LoadError, LoadOutcome, LoadRequest};
use crate::placement::{DeferredPlacement, IdleSource};
use crate::thumbnails::{ThumbnailGenerator, ThumbnailReport};
use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info, warn};

/// Identifier handed out by [`TaskQueue::submit`]
pub type TaskId = u64;

/// Work a library session can ask for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRequest {
    /// Synchronize the catalog with the asset tree
    BuildIndex { root: PathBuf, prune: PrunePolicy },
    /// Render thumbnails, then optionally re-index
    GenerateThumbnails {
        root: PathBuf,
        pixel_size: u32,
        reindex: bool,
    },
    /// Import assets into the workspace
    LoadSelected(LoadRequest),
}

impl TaskRequest {
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        match self {
            Self::BuildIndex { .. } => TaskKind::BuildIndex,
            Self::GenerateThumbnails { .. } => TaskKind::GenerateThumbnails,
            Self::LoadSelected(_) => TaskKind::LoadSelected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    BuildIndex,
    GenerateThumbnails,
    LoadSelected,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BuildIndex => "build index",
            Self::GenerateThumbnails => "generate thumbnails",
            Self::LoadSelected => "load selected",
        };
        f.write_str(name)
    }
}

/// What a successful task produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    Indexed(IndexReport),
    Thumbnails {
        report: ThumbnailReport,
        index: Option<IndexReport>,
    },
    Loaded(LoadOutcome),
}

/// Notification published after every task
#[derive(Debug)]
pub struct TaskCompleted {
    pub id: TaskId,
    pub kind: TaskKind,
    pub result: Result<TaskResult, FamlibError>,
    /// Messages meant for the user, such as the first render failure
    pub notices: Vec<String>,
}

/// Runs one task to completion
pub trait TaskExecutor {
    /// # Errors
    ///
    /// Returns `FamlibError` if the task failed as a whole.
    fn execute(
        &mut self,
        request: &TaskRequest,
        notices: &mut Vec<String>,
    ) -> Result<TaskResult, FamlibError>;
}

/// FIFO of pending requests drained by a single owner
pub struct TaskQueue {
    pending: VecDeque<(TaskId, TaskRequest)>,
    next_id: TaskId,
    completed: Sender<TaskCompleted>,
}

impl TaskQueue {
    /// Create a queue and the receiving end of its completion channel
    #[must_use]
    pub fn new() -> (Self, Receiver<TaskCompleted>) {
        let (tx, rx) = mpsc::channel();
        let queue = Self {
            pending: VecDeque::new(),
            next_id: 1,
            completed: tx,
        };
        (queue, rx)
    }

    /// Queue a request and return its id
    pub fn submit(&mut self, request: TaskRequest) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        debug!(id, kind = %request.kind(), "task queued");
        self.pending.push_back((id, request));
        id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Run the oldest pending request
    ///
    /// Returns the id of the task that ran, or `None` if the queue was empty.
    pub fn run_next<E: TaskExecutor + ?Sized>(&mut self, executor: &mut E) -> Option<TaskId> {
        let (id, request) = self.pending.pop_front()?;
        let kind = request.kind();
        info!(id, %kind, "task started");

        let mut notices = Vec::new();
        let result = executor.execute(&request, &mut notices);
        if let Err(e) = &result {
            warn!(id, %kind, error = %e, "task failed");
        }

        let message = TaskCompleted {
            id,
            kind,
            result,
            notices,
        };
        if self.completed.send(message).is_err() {
            debug!(id, "completion receiver dropped");
        }
        Some(id)
    }

    /// Drain the queue, returning how many tasks ran
    pub fn run_all<E: TaskExecutor + ?Sized>(&mut self, executor: &mut E) -> usize {
        let mut ran = 0;
        while self.run_next(executor).is_some() {
            ran += 1;
        }
        ran
    }
}

/// Import capability used by [`LibraryExecutor`]
pub trait LoadRunner {
    /// # Errors
    ///
    /// Returns `LoadError` if the batch could not run.
    fn run(&mut self, request: &LoadRequest) -> Result<LoadOutcome, LoadError>;
}

/// Batch loader bound to one workspace, resolver and placement coordinator
pub struct WorkspaceLoader<'a, W, R, I>
where
    W: Workspace,
    R: ConflictResolver + ?Sized,
    I: IdleSource,
{
    pub workspace: &'a mut W,
    pub resolver: &'a mut R,
    pub placement: &'a mut DeferredPlacement<W::Variant, I>,
}

impl<W, R, I> LoadRunner for WorkspaceLoader<'_, W, R, I>
where
    W: Workspace,
    W::Variant: fmt::Display,
    R: ConflictResolver + ?Sized,
    I: IdleSource,
{
    fn run(&mut self, request: &LoadRequest) -> Result<LoadOutcome, LoadError> {
        loader::load_selected(&mut *self.workspace, request, &mut *self.resolver, &mut *self.placement)
    }
}

/// Executor running tasks against a host and an optional workspace
pub struct LibraryExecutor<'a, H: AssetHost> {
    host: &'a H,
    pattern: AssetPattern,
    loader: Option<Box<dyn LoadRunner + 'a>>,
}

impl<'a, H: AssetHost> LibraryExecutor<'a, H> {
    #[must_use]
    pub fn new(host: &'a H) -> Self {
        Self {
            host,
            pattern: AssetPattern::default(),
            loader: None,
        }
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: AssetPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Enable [`TaskRequest::LoadSelected`]
    #[must_use]
    pub fn with_loader(mut self, loader: impl LoadRunner + 'a) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    fn index(&self, root: &std::path::Path, prune: PrunePolicy) -> Result<IndexReport, FamlibError> {
        let options = IndexOptions {
            prune,
            pattern: self.pattern.clone(),
        };
        Ok(Indexer::new(self.host).with_options(options).build_index(root)?)
    }
}

impl<H: AssetHost> TaskExecutor for LibraryExecutor<'_, H> {
    fn execute(
        &mut self,
        request: &TaskRequest,
        notices: &mut Vec<String>,
    ) -> Result<TaskResult, FamlibError> {
        match request {
            TaskRequest::BuildIndex { root, prune } => {
                self.index(root, *prune).map(TaskResult::Indexed)
            }
            TaskRequest::GenerateThumbnails {
                root,
                pixel_size,
                reindex,
            } => {
                let mut notify = |msg: &str| notices.push(msg.to_string());
                let report = ThumbnailGenerator::new(self.host)
                    .with_pattern(self.pattern.clone())
                    .generate(root, *pixel_size, &mut notify)?;
                let index = if *reindex {
                    Some(self.index(root, PrunePolicy::Keep)?)
                } else {
                    None
                };
                Ok(TaskResult::Thumbnails { report, index })
            }
            TaskRequest::LoadSelected(load) => {
                let loader = self.loader.as_mut().ok_or_else(|| {
                    FamlibError::InvalidInput("no workspace available for loading".to_string())
                })?;
                Ok(TaskResult::Loaded(loader.run(load)?))
            }
        }
    }
}

//! xApp Task Framework
//!
//! The xApp runs a small set of long-lived async tasks next to the E2
//! runtime's own delivery threads:
//! - **Monitor Task**: issues the KPM subscriptions and removes them at shutdown
//! - **REST Task**: serves the control endpoint
//!
//! # Task Lifecycle
//!
//! Tasks follow a lifecycle managed by `TaskManager`:
//! 1. **Created**: Task is instantiated but not yet running
//! 2. **Running**: Task is actively working
//! 3. **Stopping**: Shutdown was requested, task is cleaning up
//! 4. **Stopped**: Task has terminated
//! 5. **Failed**: Task terminated due to an error
//!
//! Shutdown is cooperative. A [`ShutdownSignal`] is raised by the process
//! signal handler, by a fatal task error, or by the indication callback on a
//! schema violation; every task watches it and winds down.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Default timeout for tasks to finish after shutdown is signalled.
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 5000;

// ============================================================================
// Shutdown Signal
// ============================================================================

/// Why the xApp is shutting down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Process signal (SIGINT, SIGTERM)
    Signal(&'static str),
    /// Unrecoverable error; the process exits with failure
    Fatal(String),
    /// Orderly stop requested by the application
    Requested,
}

impl ShutdownReason {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShutdownReason::Fatal(_))
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Signal(name) => write!(f, "received {name}"),
            ShutdownReason::Fatal(cause) => write!(f, "fatal error: {cause}"),
            ShutdownReason::Requested => write!(f, "shutdown requested"),
        }
    }
}

/// Receiving side of the shutdown signal.
pub type ShutdownReceiver = watch::Receiver<Option<ShutdownReason>>;

/// Process-wide shutdown flag. The first reason raised wins.
#[derive(Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<Option<ShutdownReason>>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Raises the signal. Returns false if it was already raised.
    ///
    /// Safe to call from any thread, including runtime delivery threads.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        })
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        self.tx.borrow().clone()
    }

    pub fn is_triggered(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn subscribe(&self) -> ShutdownReceiver {
        self.tx.subscribe()
    }

    /// Waits until the signal is raised.
    pub async fn wait(&self) -> ShutdownReason {
        wait_for_shutdown(&mut self.subscribe()).await
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits on a receiver until a shutdown reason is present.
pub async fn wait_for_shutdown(rx: &mut ShutdownReceiver) -> ShutdownReason {
    loop {
        if let Some(reason) = rx.borrow_and_update().clone() {
            return reason;
        }
        if rx.changed().await.is_err() {
            return ShutdownReason::Requested;
        }
    }
}

// ============================================================================
// Task Lifecycle State
// ============================================================================

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    /// Task is created but not yet started
    #[default]
    Created,
    /// Task is running
    Running,
    /// Task is in the process of stopping
    Stopping,
    /// Task has stopped gracefully
    Stopped,
    /// Task terminated due to an error
    Failed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Created => write!(f, "Created"),
            TaskState::Running => write!(f, "Running"),
            TaskState::Stopping => write!(f, "Stopping"),
            TaskState::Stopped => write!(f, "Stopped"),
            TaskState::Failed => write!(f, "Failed"),
        }
    }
}

/// Task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskId {
    /// KPM subscription monitor
    Monitor,
    /// REST control endpoint
    Rest,
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Monitor => write!(f, "Monitor"),
            TaskId::Rest => write!(f, "REST"),
        }
    }
}

/// Information about a task.
#[derive(Debug)]
pub struct TaskInfo {
    /// Task identifier
    pub id: TaskId,
    /// Current state
    pub state: TaskState,
    /// Time when the task was started
    pub started_at: Option<Instant>,
    /// Time when the task was stopped
    pub stopped_at: Option<Instant>,
    /// Error message if task failed
    pub error: Option<String>,
}

/// Error type for task operations.
#[derive(Debug, Clone)]
pub struct TaskError {
    /// Task that failed
    pub task_id: TaskId,
    /// Error message
    pub message: String,
    /// Whether the failure must bring the xApp down
    pub fatal: bool,
}

impl TaskError {
    pub fn fatal(task_id: TaskId, message: impl Into<String>) -> Self {
        Self {
            task_id,
            message: message.into(),
            fatal: true,
        }
    }

    pub fn failed(task_id: TaskId, message: impl Into<String>) -> Self {
        Self {
            task_id,
            message: message.into(),
            fatal: false,
        }
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task {} error: {}", self.task_id, self.message)
    }
}

impl std::error::Error for TaskError {}

// ============================================================================
// Task Trait
// ============================================================================

/// A long-lived xApp task.
#[async_trait::async_trait]
pub trait Task: Send + 'static {
    /// Identifier used for lifecycle tracking.
    fn id(&self) -> TaskId;

    /// Runs until `shutdown` carries a reason or the task fails.
    async fn run(&mut self, shutdown: ShutdownReceiver) -> Result<(), TaskError>;
}

// ============================================================================
// Task Manager
// ============================================================================

/// Spawns tasks, tracks their state and coordinates shutdown.
pub struct TaskManager {
    signal: ShutdownSignal,
    task_states: HashMap<TaskId, TaskInfo>,
    join_handles: HashMap<TaskId, JoinHandle<Result<(), TaskError>>>,
}

impl TaskManager {
    pub fn new(signal: ShutdownSignal) -> Self {
        Self {
            signal,
            task_states: HashMap::new(),
            join_handles: HashMap::new(),
        }
    }

    pub fn signal(&self) -> &ShutdownSignal {
        &self.signal
    }

    /// Spawns `task` on the tokio runtime.
    ///
    /// A fatal error returned by the task raises the shutdown signal.
    pub fn spawn<T: Task>(&mut self, mut task: T) {
        let task_id = task.id();
        let rx = self.signal.subscribe();
        let signal = self.signal.clone();

        let handle = tokio::spawn(async move {
            let result = task.run(rx).await;
            if let Err(e) = &result {
                if e.fatal {
                    error!("{}", e);
                    signal.trigger(ShutdownReason::Fatal(e.to_string()));
                } else {
                    warn!("{}", e);
                }
            }
            result
        });

        self.task_states.insert(
            task_id,
            TaskInfo {
                id: task_id,
                state: TaskState::Running,
                started_at: Some(Instant::now()),
                stopped_at: None,
                error: None,
            },
        );
        self.join_handles.insert(task_id, handle);
        info!("{} task spawned", task_id);
    }

    /// Gets the current state of a task.
    pub fn get_task_state(&self, task_id: TaskId) -> Option<TaskState> {
        self.task_states.get(&task_id).map(|info| info.state)
    }

    /// Gets information about a task.
    pub fn get_task_info(&self, task_id: TaskId) -> Option<&TaskInfo> {
        self.task_states.get(&task_id)
    }

    /// Returns true if any task has failed.
    pub fn any_task_failed(&self) -> bool {
        self.task_states
            .values()
            .any(|info| info.state == TaskState::Failed)
    }

    fn mark_task_stopped(&mut self, task_id: TaskId) {
        if let Some(info) = self.task_states.get_mut(&task_id) {
            info.state = TaskState::Stopped;
            info.stopped_at = Some(Instant::now());
        }
    }

    fn mark_task_failed(&mut self, task_id: TaskId, error: String) {
        if let Some(info) = self.task_states.get_mut(&task_id) {
            info.state = TaskState::Failed;
            info.stopped_at = Some(Instant::now());
            info.error = Some(error);
        }
    }

    /// Raises the shutdown signal (if not raised yet) and waits for every
    /// task to finish, up to `timeout_ms` in total.
    pub async fn shutdown(&mut self, timeout_ms: u64) -> Result<(), TaskError> {
        self.signal.trigger(ShutdownReason::Requested);

        for info in self.task_states.values_mut() {
            if info.state == TaskState::Running {
                info.state = TaskState::Stopping;
            }
        }

        let timeout = tokio::time::Duration::from_millis(timeout_ms);
        let deadline = tokio::time::Instant::now() + timeout;

        let handles: Vec<_> = self.join_handles.drain().collect();
        let mut results: Vec<(TaskId, Result<(), String>)> = Vec::new();

        for (task_id, handle) in handles {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            let result = match tokio::time::timeout(remaining, handle).await {
                Ok(Ok(Ok(()))) => Ok(()),
                Ok(Ok(Err(e))) => Err(e.message),
                Ok(Err(_join_error)) => Err("Task panicked".to_string()),
                Err(_timeout) => Err("Shutdown timeout".to_string()),
            };
            results.push((task_id, result));
        }

        for (task_id, result) in results {
            match result {
                Ok(()) => self.mark_task_stopped(task_id),
                Err(msg) => self.mark_task_failed(task_id, msg),
            }
        }

        if let Some(info) = self
            .task_states
            .values()
            .find(|info| info.state == TaskState::Failed)
        {
            return Err(TaskError::failed(
                info.id,
                info.error.as_deref().unwrap_or("unknown error"),
            ));
        }

        Ok(())
    }

    /// Returns a summary of all task states.
    pub fn status_summary(&self) -> Vec<(TaskId, TaskState)> {
        self.task_states
            .iter()
            .map(|(id, info)| (*id, info.state))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

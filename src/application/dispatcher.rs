use crate::domain::jobs::{Invocation, JobRecord, JobStatus};
use crate::ports::runner::CommandRunner;
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// In-memory job records, shared between handlers and background tasks.
///
/// Holds at most `capacity` records once finished ones can be evicted; the
/// oldest finished record goes first. Running jobs are never evicted.
#[derive(Clone)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<Uuid, JobRecord>>>,
    capacity: usize,
}

impl JobRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            jobs: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    pub async fn insert(&self, record: JobRecord) {
        let mut jobs = self.jobs.write().await;
        while jobs.len() >= self.capacity {
            let oldest = jobs
                .values()
                .filter(|job| job.is_finished())
                .min_by_key(|job| job.started_at)
                .map(|job| job.id);
            match oldest {
                Some(id) => {
                    debug!(job_id = %id, "evicting job record");
                    jobs.remove(&id);
                }
                None => break,
            }
        }
        jobs.insert(record.id, record);
    }

    /// Drop every finished record, returning how many went.
    pub async fn prune_finished(&self) -> usize {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| !job.is_finished());
        before - jobs.len()
    }

    pub async fn get(&self, id: &Uuid) -> Option<JobRecord> {
        self.jobs.read().await.get(id).cloned()
    }

    pub async fn all(&self) -> Vec<JobRecord> {
        self.jobs.read().await.values().cloned().collect()
    }

    async fn finish(
        &self,
        id: Uuid,
        status: JobStatus,
        exit_code: Option<i32>,
        error: Option<String>,
    ) {
        if let Some(record) = self.jobs.write().await.get_mut(&id) {
            record.status = status;
            record.exit_code = exit_code;
            record.error = error;
            record.finished_at = Some(Utc::now());
        }
    }
}

/// Handle to a dispatched job. Dropping it detaches the task.
pub struct JobHandle {
    pub id: Uuid,
    pub task: JoinHandle<JobStatus>,
}

/// Launches processor runs on background tasks and records their outcome.
pub struct Dispatcher {
    runner: Arc<dyn CommandRunner>,
    registry: JobRegistry,
    remove_workspace: bool,
}

impl Dispatcher {
    /// `remove_workspace` deletes the job's workspace once the processor exits.
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        registry: JobRegistry,
        remove_workspace: bool,
    ) -> Self {
        Self {
            runner,
            registry,
            remove_workspace,
        }
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub async fn dispatch(
        &self,
        id: Uuid,
        invocation: Invocation,
        output_dir: PathBuf,
        workspace: PathBuf,
    ) -> JobHandle {
        self.registry
            .insert(JobRecord::running(id, output_dir, workspace.clone()))
            .await;

        let runner = self.runner.clone();
        let registry = self.registry.clone();
        let workspace = self.remove_workspace.then_some(workspace);

        let task = tokio::spawn(async move {
            info!(job_id = %id, command = %invocation, "starting processor");

            let (status, exit_code, error) = match runner.run(&invocation).await {
                Ok(Some(0)) => {
                    info!(job_id = %id, "processor finished");
                    (JobStatus::Succeeded, Some(0), None)
                }
                Ok(code) => {
                    warn!(job_id = %id, exit_code = ?code, "processor exited unsuccessfully");
                    (JobStatus::Failed, code, None)
                }
                Err(e) => {
                    error!(job_id = %id, error = %e, "failed to run processor");
                    (JobStatus::Failed, None, Some(e.to_string()))
                }
            };

            if let Some(dir) = workspace {
                if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
                    warn!(
                        job_id = %id,
                        dir = %dir.display(),
                        error = %e,
                        "failed to remove workspace"
                    );
                }
            }

            registry.finish(id, status, exit_code, error).await;
            status
        });

        JobHandle { id, task }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::runner::MockCommandRunner;
    use std::ffi::OsString;
    use std::io;
    use tempfile::tempdir;

    fn invocation() -> Invocation {
        Invocation {
            program: "python3.10".to_string(),
            args: vec![OsString::from("test.py")],
        }
    }

    fn dispatcher(mock: MockCommandRunner, remove_workspace: bool) -> Dispatcher {
        Dispatcher::new(Arc::new(mock), JobRegistry::new(16), remove_workspace)
    }

    async fn run_with(
        mock: MockCommandRunner,
        remove_workspace: bool,
        workspace: PathBuf,
    ) -> (JobRecord, JobStatus) {
        let dispatcher = dispatcher(mock, remove_workspace);
        let id = Uuid::new_v4();

        let handle = dispatcher
            .dispatch(id, invocation(), PathBuf::from("final"), workspace)
            .await;
        assert_eq!(handle.id, id);
        let status = handle.task.await.unwrap();

        (dispatcher.registry().get(&id).await.unwrap(), status)
    }

    #[tokio::test]
    async fn test_successful_run_is_recorded() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run()
            .withf(|inv| inv.program == "python3.10")
            .times(1)
            .returning(|_| Ok(Some(0)));

        let (record, status) = run_with(mock, false, PathBuf::from("tmp/ws")).await;

        assert_eq!(status, JobStatus::Succeeded);
        assert_eq!(record.status, JobStatus::Succeeded);
        assert_eq!(record.exit_code, Some(0));
        assert!(record.finished_at.is_some());
        assert_eq!(record.output_dir, PathBuf::from("final"));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_a_failure() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run().times(1).returning(|_| Ok(Some(2)));

        let (record, status) = run_with(mock, false, PathBuf::from("tmp/ws")).await;

        assert_eq!(status, JobStatus::Failed);
        assert_eq!(record.exit_code, Some(2));
        assert!(record.error.is_none());
    }

    #[tokio::test]
    async fn test_spawn_error_is_a_failure() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run()
            .times(1)
            .returning(|_| Err(io::Error::new(io::ErrorKind::NotFound, "python3.10 not found")));

        let (record, status) = run_with(mock, false, PathBuf::from("tmp/ws")).await;

        assert_eq!(status, JobStatus::Failed);
        assert_eq!(record.exit_code, None);
        assert_eq!(record.error.as_deref(), Some("python3.10 not found"));
    }

    #[tokio::test]
    async fn test_workspace_removed_only_when_requested() {
        let temp_dir = tempdir().unwrap();
        let kept = temp_dir.path().join("kept");
        let removed = temp_dir.path().join("removed");
        std::fs::create_dir_all(kept.join("video")).unwrap();
        std::fs::create_dir_all(removed.join("video")).unwrap();

        let mut mock = MockCommandRunner::new();
        mock.expect_run().returning(|_| Ok(Some(0)));
        run_with(mock, false, kept.clone()).await;

        let mut mock = MockCommandRunner::new();
        mock.expect_run().returning(|_| Ok(Some(1)));
        run_with(mock, true, removed.clone()).await;

        assert!(kept.exists());
        assert!(!removed.exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_record_is_running_until_the_task_finishes() {
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        let rx = std::sync::Mutex::new(rx);

        let mut mock = MockCommandRunner::new();
        mock.expect_run().returning(move |_| {
            rx.lock().unwrap().recv().unwrap();
            Ok(Some(0))
        });

        let dispatcher = dispatcher(mock, false);
        let id = Uuid::new_v4();
        let handle = dispatcher
            .dispatch(id, invocation(), PathBuf::from("final"), PathBuf::from("tmp/ws"))
            .await;

        let record = dispatcher.registry().get(&id).await.unwrap();
        assert_eq!(record.status, JobStatus::Running);
        assert!(!record.is_finished());

        tx.send(()).unwrap();
        handle.task.await.unwrap();
        assert!(dispatcher.registry().get(&id).await.unwrap().is_finished());
    }

    fn finished_record(started_secs_ago: i64) -> JobRecord {
        let mut record = JobRecord::running(Uuid::new_v4(), PathBuf::from("final"), PathBuf::new());
        record.started_at = Utc::now() - chrono::Duration::seconds(started_secs_ago);
        record.status = JobStatus::Succeeded;
        record.finished_at = Some(Utc::now());
        record
    }

    #[tokio::test]
    async fn test_registry_evicts_oldest_finished_record() {
        let registry = JobRegistry::new(3);
        let oldest = finished_record(30);
        let older = finished_record(20);
        let running = JobRecord::running(Uuid::new_v4(), PathBuf::from("final"), PathBuf::new());
        registry.insert(oldest.clone()).await;
        registry.insert(older.clone()).await;
        registry.insert(running.clone()).await;

        for _ in 0..10 {
            registry.insert(finished_record(0)).await;
        }

        assert_eq!(registry.all().await.len(), 3);
        assert!(registry.get(&oldest.id).await.is_none());
        assert!(registry.get(&older.id).await.is_none());
        assert!(registry.get(&running.id).await.is_some());
    }

    #[tokio::test]
    async fn test_running_records_are_never_evicted() {
        let registry = JobRegistry::new(1);
        let first = JobRecord::running(Uuid::new_v4(), PathBuf::from("final"), PathBuf::new());
        let second = JobRecord::running(Uuid::new_v4(), PathBuf::from("final"), PathBuf::new());
        registry.insert(first.clone()).await;
        registry.insert(second.clone()).await;

        assert!(registry.get(&first.id).await.is_some());
        assert!(registry.get(&second.id).await.is_some());
    }

    #[tokio::test]
    async fn test_prune_finished_keeps_running_jobs() {
        let registry = JobRegistry::new(8);
        let running = JobRecord::running(Uuid::new_v4(), PathBuf::from("final"), PathBuf::new());
        registry.insert(running.clone()).await;
        registry.insert(finished_record(5)).await;
        registry.insert(finished_record(1)).await;

        assert_eq!(registry.prune_finished().await, 2);
        let left = registry.all().await;
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, running.id);
    }
}

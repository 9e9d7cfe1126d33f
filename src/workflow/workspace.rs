//! Per-task working directories.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::task::Task;

/// Directory holding one task's manifest, kubeconfig and values file.
///
/// The directory name is derived from the task's correlation context and
/// kind, so a redelivered event reuses its directory while two different
/// tasks never share one.
#[derive(Debug, Clone)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    /// Create (or reuse) the workspace for `task` under `base`.
    pub fn create(base: &Path, task: &Task) -> Result<Self> {
        let dir = base.join(Self::task_id(task));
        fs::create_dir_all(&dir)?;
        tracing::debug!("Using work directory {}", dir.display());
        Ok(Self { dir })
    }

    fn task_id(task: &Task) -> String {
        let mut hasher = Sha256::new();
        hasher.update(task.context.keptn_context.as_bytes());
        hasher.update(b"\0");
        hasher.update(task.context.triggered_id.as_bytes());
        hasher.update(b"\0");
        hasher.update(task.kind.task_name().as_bytes());

        let result = hasher.finalize();
        format!("{}-{}", task.kind, hex::encode(&result[..8]))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Local path for the manifest resource `uri`.
    pub fn manifest_path(&self, uri: &str) -> PathBuf {
        let name = Path::new(uri)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "manifest.yaml".into());
        self.dir.join(name)
    }

    pub fn kubeconfig_path(&self) -> PathBuf {
        self.dir.join("kubeconfig")
    }

    pub fn values_path(&self) -> PathBuf {
        self.dir.join("values.yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TaskResult;
    use crate::task::{CorrelationContext, TaskKind, TaskStatus};
    use tempfile::TempDir;

    fn task(kind: TaskKind, triggered_id: &str) -> Task {
        Task {
            kind,
            project: "P".into(),
            stage: "T".into(),
            service: "S".into(),
            labels: None,
            context: CorrelationContext {
                keptn_context: "ctx".into(),
                triggered_id: triggered_id.into(),
            },
            status: TaskStatus::Triggered,
            result: TaskResult::Unset,
        }
    }

    #[test]
    fn same_task_reuses_directory() {
        let temp = TempDir::new().unwrap();
        let a = Workspace::create(temp.path(), &task(TaskKind::Setup, "1")).unwrap();
        let b = Workspace::create(temp.path(), &task(TaskKind::Setup, "1")).unwrap();

        assert_eq!(a.dir(), b.dir());
        assert!(a.dir().is_dir());
    }

    #[test]
    fn different_tasks_get_separate_directories() {
        let temp = TempDir::new().unwrap();
        let setup = Workspace::create(temp.path(), &task(TaskKind::Setup, "1")).unwrap();
        let other = Workspace::create(temp.path(), &task(TaskKind::Setup, "2")).unwrap();
        let teardown = Workspace::create(temp.path(), &task(TaskKind::Teardown, "1")).unwrap();

        assert_ne!(setup.dir(), other.dir());
        assert_ne!(setup.dir(), teardown.dir());
        assert!(setup
            .dir()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("environment-setup-"));
    }

    #[test]
    fn manifest_keeps_file_name() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::create(temp.path(), &task(TaskKind::Setup, "1")).unwrap();

        assert_eq!(
            ws.manifest_path("crossplane/cluster.yaml"),
            ws.dir().join("cluster.yaml")
        );
        assert_eq!(ws.kubeconfig_path(), ws.dir().join("kubeconfig"));
    }
}

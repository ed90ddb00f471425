use super::layout::WorkdirLayout;
use crate::core::models::mutation::MutationLabel;
use crate::core::models::stage::Stage;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("cannot probe checkpoint '{path}': {source}", path = path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read-only existence queries for stage checkpoint artifacts.
///
/// Implementations must be idempotent and side-effect free: the resolver
/// calls these repeatedly while planning, and a probe must never trigger
/// tool execution. "Exists" means syntactic completeness only (the artifact
/// is present); internal correctness of tool output is not verified.
pub trait CheckpointProber {
    /// Structure-scoped probe for the cleaned-structure artifact.
    fn clean_exists(&self, structure_id: &str) -> Result<bool, ProbeError>;

    /// Label-scoped probe for one of the four downstream stages.
    fn exists(
        &self,
        structure_id: &str,
        stage: Stage,
        label: &MutationLabel,
    ) -> Result<bool, ProbeError>;
}

/// Probes checkpoint artifacts on the local filesystem via the canonical
/// working-directory layout.
#[derive(Debug, Clone)]
pub struct FsCheckpointProber {
    layout: WorkdirLayout,
}

impl FsCheckpointProber {
    pub fn new(layout: WorkdirLayout) -> Self {
        Self { layout }
    }

    fn probe(&self, path: PathBuf) -> Result<bool, ProbeError> {
        match std::fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(ProbeError::Unreadable { path, source }),
        }
    }
}

impl CheckpointProber for FsCheckpointProber {
    fn clean_exists(&self, structure_id: &str) -> Result<bool, ProbeError> {
        self.probe(self.layout.clean_structure(structure_id))
    }

    fn exists(
        &self,
        structure_id: &str,
        stage: Stage,
        label: &MutationLabel,
    ) -> Result<bool, ProbeError> {
        self.probe(self.layout.stage_artifact(structure_id, stage, label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn label() -> MutationLabel {
        "A10G".parse().unwrap()
    }

    #[test]
    fn missing_artifacts_probe_false() {
        let dir = tempdir().unwrap();
        let prober = FsCheckpointProber::new(WorkdirLayout::new(dir.path()));

        assert!(!prober.clean_exists("1ABC").unwrap());
        assert!(!prober
            .exists("1ABC", Stage::Minimization, &label())
            .unwrap());
    }

    #[test]
    fn present_artifacts_probe_true() {
        let dir = tempdir().unwrap();
        let layout = WorkdirLayout::new(dir.path());
        let l = label();
        fs::create_dir_all(layout.label_dir("1ABC", &l)).unwrap();
        fs::write(layout.clean_structure("1ABC"), "ATOM").unwrap();
        fs::write(layout.stage_artifact("1ABC", Stage::Equilibration, &l), "").unwrap();

        let prober = FsCheckpointProber::new(layout);
        assert!(prober.clean_exists("1ABC").unwrap());
        assert!(prober.exists("1ABC", Stage::Equilibration, &l).unwrap());
        assert!(!prober.exists("1ABC", Stage::Production, &l).unwrap());
    }

    #[test]
    fn a_directory_at_the_artifact_path_is_not_a_checkpoint() {
        let dir = tempdir().unwrap();
        let layout = WorkdirLayout::new(dir.path());
        fs::create_dir_all(layout.clean_structure("1ABC")).unwrap();

        let prober = FsCheckpointProber::new(layout);
        assert!(!prober.clean_exists("1ABC").unwrap());
    }

    #[test]
    fn probing_never_creates_anything() {
        let dir = tempdir().unwrap();
        let prober = FsCheckpointProber::new(WorkdirLayout::new(dir.path()));

        let _ = prober.clean_exists("1ABC");
        let _ = prober.exists("1ABC", Stage::Production, &label());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}

use crate::core::models::mutation::MutationLabel;
use crate::core::models::stage::Stage;
use std::path::{Path, PathBuf};

/// Canonical working-directory layout of a run.
///
/// Per structure id under the run root:
/// - raw input `<id>/<id>.pdb`, cleaned structure `<id>/<id>_clean.pdb`
/// - one directory per mutation label holding the mutated structure
///   (`<label>.pdb`), the stage outputs (`em.gro`, `eq.gro`, `md.gro`), and
///   the per-item log (`prep.log`)
///
/// Template inputs (`mutate.xml`, `sys.top`, `*.mdp`) live at the root and
/// are staged into label directories by the MD adapter.
#[derive(Debug, Clone)]
pub struct WorkdirLayout {
    root: PathBuf,
}

impl WorkdirLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn structure_dir(&self, structure_id: &str) -> PathBuf {
        self.root.join(structure_id)
    }

    pub fn raw_structure(&self, structure_id: &str) -> PathBuf {
        self.structure_dir(structure_id)
            .join(format!("{structure_id}.pdb"))
    }

    pub fn clean_structure(&self, structure_id: &str) -> PathBuf {
        self.structure_dir(structure_id)
            .join(format!("{structure_id}_clean.pdb"))
    }

    pub fn label_dir(&self, structure_id: &str, label: &MutationLabel) -> PathBuf {
        self.structure_dir(structure_id).join(label.to_string())
    }

    pub fn mutated_structure(&self, structure_id: &str, label: &MutationLabel) -> PathBuf {
        self.label_dir(structure_id, label)
            .join(format!("{label}.pdb"))
    }

    pub fn item_log(&self, structure_id: &str, label: &MutationLabel) -> PathBuf {
        self.label_dir(structure_id, label).join("prep.log")
    }

    /// Path of the checkpoint artifact whose existence marks `stage` as
    /// complete for this (structure, label) pair.
    pub fn stage_artifact(
        &self,
        structure_id: &str,
        stage: Stage,
        label: &MutationLabel,
    ) -> PathBuf {
        match stage {
            Stage::StructureClean => self.clean_structure(structure_id),
            Stage::Mutagenesis => self.mutated_structure(structure_id, label),
            _ => self
                .label_dir(structure_id, label)
                .join(stage.artifact_file().expect("label stage has an artifact")),
        }
    }

    pub fn protocol_template(&self) -> PathBuf {
        self.root.join("mutate.xml")
    }

    pub fn topology_template(&self) -> PathBuf {
        self.root.join("sys.top")
    }

    pub fn mdp_template(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.mdp"))
    }
}

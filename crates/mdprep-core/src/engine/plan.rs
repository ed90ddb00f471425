use super::checkpoint::CheckpointProber;
use super::policy::{Decision, ReloadPolicy};
use crate::core::models::catalog::Catalog;
use crate::core::models::mutation::MutationLabel;
use crate::core::models::stage::Stage;
use tracing::{debug, info, warn};

/// Execution sets for one structure: per label-scoped stage, the mutation
/// labels that must (re)run, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructurePlan {
    pub structure_id: String,
    /// The cleaned-structure artifact is absent and cleaning must run before
    /// any label work.
    pub needs_clean: bool,
    execution: [Vec<MutationLabel>; Stage::LABEL_STAGES.len()],
    /// Labels with every checkpoint present and no forcing policy; reported
    /// for observability, never handed to the driver.
    pub skipped: Vec<MutationLabel>,
}

impl StructurePlan {
    pub fn labels_for(&self, stage: Stage) -> &[MutationLabel] {
        &self.execution[stage_index(stage)]
    }

    pub fn requires(&self, stage: Stage, label: &MutationLabel) -> bool {
        self.labels_for(stage).contains(label)
    }

    /// Labels needing work at any stage, in catalog order. Every stage set
    /// is a subset of the first stage that admitted the label, so the
    /// mutagenesis-stage scan plus later-only labels covers the union.
    pub fn worklist(&self) -> Vec<MutationLabel> {
        let mut out = Vec::new();
        for stage in Stage::LABEL_STAGES {
            for label in self.labels_for(stage) {
                if !out.contains(label) {
                    out.push(*label);
                }
            }
        }
        out
    }

    pub fn has_work(&self) -> bool {
        self.needs_clean || self.execution.iter().any(|set| !set.is_empty())
    }
}

/// The resolved plan for a run: per structure, per stage, the labels that
/// must execute. Derived state; recomputed each run from the catalog, the
/// reload policy, and checkpoint existence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagePlan {
    structures: Vec<StructurePlan>,
}

impl StagePlan {
    pub fn structures(&self) -> &[StructurePlan] {
        &self.structures
    }

    pub fn is_noop(&self) -> bool {
        self.structures.iter().all(|s| !s.has_work())
    }
}

/// Resolves the per-stage execution sets for every work item in the catalog.
///
/// Per structure, per label (catalog order), stages are walked in their
/// fixed order with a cascade flag: a label executes at a stage if the flag
/// is already set, the policy forces the stage, or the checkpoint artifact
/// is missing; executing sets the flag for all remaining stages. The flag
/// propagates forward only. A missing cleaned structure seeds the flag for
/// every label, since all downstream artifacts derive from it.
///
/// Probe failures count as "artifact missing": redoing work is always safe,
/// silently skipping is not.
pub fn resolve(
    catalog: &Catalog,
    policy: &ReloadPolicy,
    prober: &dyn CheckpointProber,
) -> StagePlan {
    let mut structures = Vec::with_capacity(catalog.items().len());

    for item in catalog.items() {
        let id = item.structure_id.as_str();
        let needs_clean = !probe_clean(prober, id);
        let mut execution: [Vec<MutationLabel>; Stage::LABEL_STAGES.len()] =
            std::array::from_fn(|_| Vec::new());
        let mut skipped = Vec::new();

        for label in &item.labels {
            let mut cascade = needs_clean;
            let mut scheduled = false;

            for (idx, stage) in Stage::LABEL_STAGES.into_iter().enumerate() {
                let forced = policy.decision(stage, id, label) == Decision::Force;
                let must_run = cascade || forced || !probe(prober, id, stage, label);

                if must_run {
                    if !cascade {
                        debug!(
                            structure = id,
                            label = %label,
                            stage = %stage,
                            forced,
                            "stage scheduled for execution"
                        );
                    }
                    cascade = true;
                    scheduled = true;
                    execution[idx].push(*label);
                }
            }

            if !scheduled {
                info!(structure = id, label = %label, "all checkpoints present, skipping");
                skipped.push(*label);
            }
        }

        structures.push(StructurePlan {
            structure_id: item.structure_id.clone(),
            needs_clean,
            execution,
            skipped,
        });
    }

    StagePlan { structures }
}

fn probe_clean(prober: &dyn CheckpointProber, structure_id: &str) -> bool {
    match prober.clean_exists(structure_id) {
        Ok(exists) => exists,
        Err(e) => {
            warn!(structure = structure_id, error = %e, "checkpoint probe failed, treating as missing");
            false
        }
    }
}

fn probe(
    prober: &dyn CheckpointProber,
    structure_id: &str,
    stage: Stage,
    label: &MutationLabel,
) -> bool {
    match prober.exists(structure_id, stage, label) {
        Ok(exists) => exists,
        Err(e) => {
            warn!(
                structure = structure_id,
                label = %label,
                stage = %stage,
                error = %e,
                "checkpoint probe failed, treating as missing"
            );
            false
        }
    }
}

fn stage_index(stage: Stage) -> usize {
    Stage::LABEL_STAGES
        .iter()
        .position(|s| *s == stage)
        .expect("stage is label-scoped")
}

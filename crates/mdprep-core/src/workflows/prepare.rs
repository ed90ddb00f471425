use crate::core::models::mutation::MutationLabel;
use crate::core::models::stage::Stage;
use crate::engine::checkpoint::CheckpointProber;
use crate::engine::layout::WorkdirLayout;
use crate::engine::plan::{StagePlan, StructurePlan};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tools::{MdEngine, MutagenesisEngine, StructureCleaner, ToolError};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{error, info, instrument, warn};

/// The external collaborators the driver delegates to, one per concern.
pub struct PipelineTools<'a> {
    pub cleaner: &'a dyn StructureCleaner,
    pub mutagenesis: &'a dyn MutagenesisEngine,
    pub md: &'a dyn MdEngine,
}

/// A stage that was invoked but did not yield its checkpoint artifact.
/// Scoped to one (structure, label); `label` is `None` only for
/// structure-cleaning failures, which abandon the whole structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub structure_id: String,
    pub label: Option<MutationLabel>,
    pub stage: Stage,
    pub reason: String,
}

/// Outcome of a run, enumerating every work item exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items that executed every scheduled stage and verified its artifact.
    pub completed: Vec<(String, MutationLabel)>,
    /// Items with every checkpoint already present; never invoked a tool.
    pub skipped: Vec<(String, MutationLabel)>,
    /// Items abandoned mid-pipeline, plus structure-level cleaning failures.
    pub failures: Vec<StageFailure>,
}

/// Append-only per-(structure, label) log inside the label directory.
/// An explicit handle owned by the driver for the item's span; if the log
/// cannot be opened the item still runs, just without its local log.
struct ItemLog {
    file: Option<std::fs::File>,
}

impl ItemLog {
    fn open(path: &Path) -> Self {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                warn!(path = %path.display(), error = %e, "cannot open item log");
                e
            })
            .ok();
        Self { file }
    }

    fn line(&mut self, message: &str) {
        if let Some(file) = &mut self.file {
            let _ = writeln!(file, "{message}");
        }
    }
}

/// Drives a resolved plan to completion, sequentially.
///
/// Per structure with pending work: run structure cleaning if scheduled,
/// then per label in catalog order, the label's scheduled stages in pipeline
/// order. After every tool invocation the stage's checkpoint artifact is
/// re-probed; a missing artifact is a [`StageFailure`] that abandons the
/// label's remaining stages and moves on. Nothing is retried or rolled
/// back; partial output stays on disk for inspection. External tools are
/// waited on without a timeout, so a hung tool stalls the run.
#[instrument(skip_all, name = "prepare_workflow")]
pub fn run(
    plan: &StagePlan,
    layout: &WorkdirLayout,
    prober: &dyn CheckpointProber,
    tools: &PipelineTools<'_>,
    reporter: &ProgressReporter,
) -> RunSummary {
    let mut summary = RunSummary::default();

    for structure in plan.structures() {
        let id = structure.structure_id.as_str();
        for label in &structure.skipped {
            summary.skipped.push((id.to_string(), *label));
        }
        if !structure.has_work() {
            info!(structure = id, "all work items up to date");
            continue;
        }

        reporter.report(Progress::StructureStart {
            structure_id: id.to_string(),
        });
        if !ensure_clean(structure, layout, prober, tools, reporter, &mut summary) {
            reporter.report(Progress::StructureFinish);
            continue;
        }

        for label in structure.worklist() {
            run_label(structure, &label, layout, prober, tools, reporter, &mut summary);
        }
        reporter.report(Progress::StructureFinish);
    }

    info!(
        completed = summary.completed.len(),
        skipped = summary.skipped.len(),
        failed = summary.failures.len(),
        "run finished"
    );
    summary
}

/// Runs structure cleaning when the plan requires it. Returns false if the
/// structure must be abandoned.
fn ensure_clean(
    structure: &StructurePlan,
    layout: &WorkdirLayout,
    prober: &dyn CheckpointProber,
    tools: &PipelineTools<'_>,
    reporter: &ProgressReporter,
    summary: &mut RunSummary,
) -> bool {
    let id = structure.structure_id.as_str();
    if !structure.needs_clean {
        return true;
    }

    reporter.report(Progress::Message(format!("cleaning structure {id}")));
    info!(structure = id, "running structure cleaning");
    let outcome = tools
        .cleaner
        .clean(layout, id)
        .and_then(|()| verify(prober.clean_exists(id), layout.clean_structure(id).as_path()));

    if let Err(e) = outcome {
        error!(structure = id, error = %e, "structure cleaning failed, abandoning structure");
        summary.failures.push(StageFailure {
            structure_id: id.to_string(),
            label: None,
            stage: Stage::StructureClean,
            reason: e.to_string(),
        });
        return false;
    }
    true
}

fn run_label(
    structure: &StructurePlan,
    label: &MutationLabel,
    layout: &WorkdirLayout,
    prober: &dyn CheckpointProber,
    tools: &PipelineTools<'_>,
    reporter: &ProgressReporter,
    summary: &mut RunSummary,
) {
    let id = structure.structure_id.as_str();
    reporter.report(Progress::ItemStart {
        structure_id: id.to_string(),
        label: label.to_string(),
    });

    let label_dir = layout.label_dir(id, label);
    if let Err(e) = std::fs::create_dir_all(&label_dir) {
        error!(structure = id, label = %label, error = %e, "cannot create label directory");
        summary.failures.push(StageFailure {
            structure_id: id.to_string(),
            label: Some(*label),
            stage: Stage::Mutagenesis,
            reason: format!("cannot create '{}': {e}", label_dir.display()),
        });
        reporter.report(Progress::ItemFinish);
        return;
    }
    let mut log = ItemLog::open(&layout.item_log(id, label));

    for stage in Stage::LABEL_STAGES {
        if !structure.requires(stage, label) {
            continue;
        }
        let stage_name = match stage {
            Stage::Mutagenesis => "mutagenesis",
            Stage::Minimization => "minimization",
            Stage::Equilibration => "equilibration",
            Stage::Production => "production",
            Stage::StructureClean => unreachable!("label stages only"),
        };
        reporter.report(Progress::StageStart { stage: stage_name });
        info!(structure = id, label = %label, stage = %stage, "running stage");
        log.line(&format!("running {stage}"));

        let outcome = invoke(stage, label, id, layout, tools).and_then(|()| {
            verify(
                prober.exists(id, stage, label),
                layout.stage_artifact(id, stage, label).as_path(),
            )
        });

        match outcome {
            Ok(()) => {
                log.line(&format!("{stage} complete"));
                reporter.report(Progress::StageFinish);
            }
            Err(e) => {
                error!(structure = id, label = %label, stage = %stage, error = %e, "stage failed, abandoning label");
                log.line(&format!("{stage} FAILED: {e}"));
                summary.failures.push(StageFailure {
                    structure_id: id.to_string(),
                    label: Some(*label),
                    stage,
                    reason: e.to_string(),
                });
                reporter.report(Progress::ItemFinish);
                return;
            }
        }
    }

    summary.completed.push((id.to_string(), *label));
    reporter.report(Progress::ItemFinish);
}

fn invoke(
    stage: Stage,
    label: &MutationLabel,
    structure_id: &str,
    layout: &WorkdirLayout,
    tools: &PipelineTools<'_>,
) -> Result<(), ToolError> {
    match stage {
        Stage::Mutagenesis => tools.mutagenesis.mutate(layout, structure_id, label),
        Stage::Minimization => tools.md.minimize(layout, structure_id, label),
        Stage::Equilibration => tools.md.equilibrate(layout, structure_id, label),
        Stage::Production => tools.md.production(layout, structure_id, label),
        Stage::StructureClean => unreachable!("structure cleaning is not label-scoped"),
    }
}

/// Maps a post-invocation probe to a tool error when the artifact is absent
/// or unreadable: invoking a stage whose output cannot be confirmed is a
/// stage failure either way.
fn verify(
    probe: Result<bool, crate::engine::checkpoint::ProbeError>,
    artifact: &Path,
) -> Result<(), ToolError> {
    match probe {
        Ok(true) => Ok(()),
        Ok(false) => Err(ToolError::MissingOutput {
            program: "external tool".to_string(),
            path: artifact.to_path_buf(),
        }),
        Err(e) => Err(ToolError::Io {
            path: artifact.to_path_buf(),
            source: std::io::Error::other(e.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::dataset::DatasetRow;
    use crate::core::models::catalog::Catalog;
    use crate::engine::checkpoint::FsCheckpointProber;
    use crate::engine::plan;
    use crate::engine::policy::ReloadPolicy;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::tempdir;

    /// Recording fakes: every invocation is appended to a shared journal,
    /// and each stage either drops its artifact or withholds it.
    #[derive(Default)]
    struct Journal {
        calls: RefCell<Vec<String>>,
    }

    impl Journal {
        fn record(&self, what: &str) {
            self.calls.borrow_mut().push(what.to_string());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    struct FakeCleaner<'a> {
        journal: &'a Journal,
        succeed: bool,
    }

    impl StructureCleaner for FakeCleaner<'_> {
        fn clean(&self, layout: &WorkdirLayout, structure_id: &str) -> Result<(), ToolError> {
            self.journal.record(&format!("clean {structure_id}"));
            if self.succeed {
                fs::create_dir_all(layout.structure_dir(structure_id)).unwrap();
                fs::write(layout.clean_structure(structure_id), "ATOM").unwrap();
            }
            Ok(())
        }
    }

    struct FakeMutagenesis<'a> {
        journal: &'a Journal,
    }

    impl MutagenesisEngine for FakeMutagenesis<'_> {
        fn mutate(
            &self,
            layout: &WorkdirLayout,
            structure_id: &str,
            label: &MutationLabel,
        ) -> Result<(), ToolError> {
            self.journal.record(&format!("mutate {structure_id}/{label}"));
            fs::write(layout.mutated_structure(structure_id, label), "ATOM").unwrap();
            Ok(())
        }
    }

    struct FakeMd<'a> {
        journal: &'a Journal,
        fail_at: Option<Stage>,
    }

    impl FakeMd<'_> {
        fn stage(
            &self,
            stage: Stage,
            layout: &WorkdirLayout,
            structure_id: &str,
            label: &MutationLabel,
        ) -> Result<(), ToolError> {
            self.journal
                .record(&format!("{stage} {structure_id}/{label}"));
            if self.fail_at != Some(stage) {
                fs::write(layout.stage_artifact(structure_id, stage, label), "").unwrap();
            }
            Ok(())
        }
    }

    impl MdEngine for FakeMd<'_> {
        fn minimize(
            &self,
            layout: &WorkdirLayout,
            structure_id: &str,
            label: &MutationLabel,
        ) -> Result<(), ToolError> {
            self.stage(Stage::Minimization, layout, structure_id, label)
        }

        fn equilibrate(
            &self,
            layout: &WorkdirLayout,
            structure_id: &str,
            label: &MutationLabel,
        ) -> Result<(), ToolError> {
            self.stage(Stage::Equilibration, layout, structure_id, label)
        }

        fn production(
            &self,
            layout: &WorkdirLayout,
            structure_id: &str,
            label: &MutationLabel,
        ) -> Result<(), ToolError> {
            self.stage(Stage::Production, layout, structure_id, label)
        }
    }

    fn catalog_one_item() -> Catalog {
        Catalog::from_rows(&[DatasetRow {
            pdb_id: "1ABC".to_string(),
            position: "10".to_string(),
            wild_type: "A".to_string(),
            mutation: "G".to_string(),
        }])
    }

    fn run_with(
        layout: &WorkdirLayout,
        catalog: &Catalog,
        clean_succeeds: bool,
        fail_at: Option<Stage>,
        journal: &Journal,
    ) -> RunSummary {
        let prober = FsCheckpointProber::new(layout.clone());
        let resolved = plan::resolve(catalog, &ReloadPolicy::default(), &prober);
        let cleaner = FakeCleaner {
            journal,
            succeed: clean_succeeds,
        };
        let mutagenesis = FakeMutagenesis { journal };
        let md = FakeMd { journal, fail_at };
        let tools = PipelineTools {
            cleaner: &cleaner,
            mutagenesis: &mutagenesis,
            md: &md,
        };
        run(
            &resolved,
            layout,
            &prober,
            &tools,
            &ProgressReporter::new(),
        )
    }

    #[test]
    fn a_fresh_item_runs_every_stage_in_order_and_completes() {
        let dir = tempdir().unwrap();
        let layout = WorkdirLayout::new(dir.path());
        let journal = Journal::default();

        let summary = run_with(&layout, &catalog_one_item(), true, None, &journal);

        assert_eq!(
            journal.calls(),
            [
                "clean 1ABC",
                "mutate 1ABC/A10G",
                "minimization 1ABC/A10G",
                "equilibration 1ABC/A10G",
                "production 1ABC/A10G",
            ]
        );
        assert_eq!(summary.completed.len(), 1);
        assert!(summary.failures.is_empty());
        assert!(layout.item_log("1ABC", &"A10G".parse().unwrap()).is_file());
    }

    #[test]
    fn a_minimization_failure_abandons_equilibration_and_production() {
        let dir = tempdir().unwrap();
        let layout = WorkdirLayout::new(dir.path());
        let journal = Journal::default();

        let summary = run_with(
            &layout,
            &catalog_one_item(),
            true,
            Some(Stage::Minimization),
            &journal,
        );

        let calls = journal.calls();
        assert!(calls.contains(&"minimization 1ABC/A10G".to_string()));
        assert!(!calls.iter().any(|c| c.starts_with("equilibration")));
        assert!(!calls.iter().any(|c| c.starts_with("production")));

        assert_eq!(summary.failures.len(), 1);
        let failure = &summary.failures[0];
        assert_eq!(failure.structure_id, "1ABC");
        assert_eq!(failure.label.unwrap().to_string(), "A10G");
        assert_eq!(failure.stage, Stage::Minimization);
        assert!(summary.completed.is_empty());
    }

    #[test]
    fn a_failed_label_leaves_partial_artifacts_in_place() {
        let dir = tempdir().unwrap();
        let layout = WorkdirLayout::new(dir.path());
        let journal = Journal::default();
        let label: MutationLabel = "A10G".parse().unwrap();

        run_with(
            &layout,
            &catalog_one_item(),
            true,
            Some(Stage::Equilibration),
            &journal,
        );

        assert!(layout.mutated_structure("1ABC", &label).is_file());
        assert!(layout
            .stage_artifact("1ABC", Stage::Minimization, &label)
            .is_file());
        assert!(!layout
            .stage_artifact("1ABC", Stage::Equilibration, &label)
            .is_file());
    }

    #[test]
    fn a_cleaning_failure_abandons_the_whole_structure() {
        let dir = tempdir().unwrap();
        let layout = WorkdirLayout::new(dir.path());
        let journal = Journal::default();

        let summary = run_with(&layout, &catalog_one_item(), false, None, &journal);

        assert_eq!(journal.calls(), ["clean 1ABC"]);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].stage, Stage::StructureClean);
        assert!(summary.failures[0].label.is_none());
        assert!(summary.completed.is_empty());
    }

    #[test]
    fn fully_checkpointed_items_never_invoke_a_tool() {
        let dir = tempdir().unwrap();
        let layout = WorkdirLayout::new(dir.path());
        let journal = Journal::default();
        let label: MutationLabel = "A10G".parse().unwrap();

        // Pre-populate every checkpoint.
        fs::create_dir_all(layout.label_dir("1ABC", &label)).unwrap();
        fs::write(layout.clean_structure("1ABC"), "ATOM").unwrap();
        fs::write(layout.mutated_structure("1ABC", &label), "ATOM").unwrap();
        for stage in [Stage::Minimization, Stage::Equilibration, Stage::Production] {
            fs::write(layout.stage_artifact("1ABC", stage, &label), "").unwrap();
        }

        let summary = run_with(&layout, &catalog_one_item(), true, None, &journal);

        assert!(journal.calls().is_empty());
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].1.to_string(), "A10G");
        assert!(summary.completed.is_empty());
    }

    #[test]
    fn a_failure_in_one_structure_does_not_stop_the_next() {
        let dir = tempdir().unwrap();
        let layout = WorkdirLayout::new(dir.path());
        let journal = Journal::default();
        let catalog = Catalog::from_rows(&[
            DatasetRow {
                pdb_id: "1ABC".to_string(),
                position: "10".to_string(),
                wild_type: "A".to_string(),
                mutation: "G".to_string(),
            },
            DatasetRow {
                pdb_id: "2XYZ".to_string(),
                position: "42".to_string(),
                wild_type: "K".to_string(),
                mutation: "E".to_string(),
            },
        ]);

        let summary = run_with(
            &layout,
            &catalog,
            true,
            Some(Stage::Production),
            &journal,
        );

        // Both structures were attempted all the way to production.
        assert_eq!(summary.failures.len(), 2);
        let failed: Vec<_> = summary
            .failures
            .iter()
            .map(|f| f.structure_id.as_str())
            .collect();
        assert_eq!(failed, ["1ABC", "2XYZ"]);
    }

    #[test]
    fn the_item_log_records_stage_outcomes() {
        let dir = tempdir().unwrap();
        let layout = WorkdirLayout::new(dir.path());
        let journal = Journal::default();
        let label: MutationLabel = "A10G".parse().unwrap();

        run_with(
            &layout,
            &catalog_one_item(),
            true,
            Some(Stage::Equilibration),
            &journal,
        );

        let log = fs::read_to_string(layout.item_log("1ABC", &label)).unwrap();
        assert!(log.contains("running mutagenesis"));
        assert!(log.contains("mutagenesis complete"));
        assert!(log.contains("equilibration FAILED"));
        assert!(!log.contains("running production"));
    }
}

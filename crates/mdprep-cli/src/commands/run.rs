use super::resolve_inputs;
use crate::cli::RunArgs;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use mdprep::engine::checkpoint::FsCheckpointProber;
use mdprep::engine::progress::ProgressReporter;
use mdprep::engine::tools::clean::PdbCleaner;
use mdprep::engine::tools::gromacs::GromacsEngine;
use mdprep::engine::tools::rosetta::RosettaMutagenesis;
use mdprep::workflows::prepare::{self, PipelineTools, RunSummary};
use tracing::info;

pub fn run(args: RunArgs) -> Result<()> {
    let inputs = resolve_inputs(&args.inputs)?;

    if inputs.catalog.is_empty() {
        println!("Nothing to do: the dataset yielded no valid work items.");
        return Ok(());
    }
    if inputs.plan.is_noop() {
        println!("All checkpoints present; nothing to recompute.");
        print_summary(&collect_skips_only(&inputs.plan));
        return Ok(());
    }

    let cleaner = PdbCleaner;
    let mutagenesis = RosettaMutagenesis::new(&args.rosetta);
    let md = GromacsEngine::new(&args.gmx);
    let tools = PipelineTools {
        cleaner: &cleaner,
        mutagenesis: &mutagenesis,
        md: &md,
    };
    let prober = FsCheckpointProber::new(inputs.layout.clone());

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting preparation pipeline...");
    info!("Invoking the preparation workflow...");
    let summary = prepare::run(&inputs.plan, &inputs.layout, &prober, &tools, &reporter);
    progress_handler.finish();

    print_summary(&summary);
    Ok(())
}

fn collect_skips_only(plan: &mdprep::engine::plan::StagePlan) -> RunSummary {
    let mut summary = RunSummary::default();
    for structure in plan.structures() {
        for label in &structure.skipped {
            summary
                .skipped
                .push((structure.structure_id.clone(), *label));
        }
    }
    summary
}

fn print_summary(summary: &RunSummary) {
    println!(
        "\nRun summary: {} completed, {} skipped, {} failed.",
        summary.completed.len(),
        summary.skipped.len(),
        summary.failures.len()
    );
    if !summary.skipped.is_empty() {
        println!("  Up to date:");
        for (structure_id, label) in &summary.skipped {
            println!("    {structure_id}/{label}");
        }
    }
    if !summary.completed.is_empty() {
        println!("  Completed:");
        for (structure_id, label) in &summary.completed {
            println!("    {structure_id}/{label}");
        }
    }
    if !summary.failures.is_empty() {
        println!("  Failed:");
        for failure in &summary.failures {
            match &failure.label {
                Some(label) => println!(
                    "    {}/{} at {}: {}",
                    failure.structure_id, label, failure.stage, failure.reason
                ),
                None => println!(
                    "    {} at {}: {}",
                    failure.structure_id, failure.stage, failure.reason
                ),
            }
        }
    }
}

use super::resolve_inputs;
use crate::cli::PlanArgs;
use crate::error::Result;
use mdprep::core::models::stage::Stage;

pub fn run(args: PlanArgs) -> Result<()> {
    let inputs = resolve_inputs(&args.inputs)?;

    if inputs.catalog.is_empty() {
        println!("Nothing to do: the dataset yielded no valid work items.");
        return Ok(());
    }

    for structure in inputs.plan.structures() {
        println!("{}:", structure.structure_id);
        if structure.needs_clean {
            println!("  structure-clean: required");
        }
        for stage in Stage::LABEL_STAGES {
            let labels = structure.labels_for(stage);
            if labels.is_empty() {
                continue;
            }
            let joined: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
            println!("  {stage}: {}", joined.join(", "));
        }
        if !structure.skipped.is_empty() {
            let joined: Vec<String> = structure.skipped.iter().map(|l| l.to_string()).collect();
            println!("  up to date: {}", joined.join(", "));
        }
        if !structure.has_work() {
            println!("  nothing to recompute");
        }
    }
    Ok(())
}

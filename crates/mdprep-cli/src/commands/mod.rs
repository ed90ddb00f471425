pub mod plan;
pub mod run;

use crate::cli::DatasetArgs;
use crate::error::{CliError, Result};
use mdprep::core::io::dataset;
use mdprep::core::models::catalog::Catalog;
use mdprep::engine::checkpoint::FsCheckpointProber;
use mdprep::engine::error::PrepError;
use mdprep::engine::layout::WorkdirLayout;
use mdprep::engine::plan::StagePlan;
use mdprep::engine::policy::ReloadPolicy;
use tracing::{info, warn};

/// Everything both subcommands derive from the shared input flags.
pub(crate) struct ResolvedInputs {
    pub catalog: Catalog,
    pub layout: WorkdirLayout,
    pub plan: StagePlan,
}

pub(crate) fn resolve_inputs(args: &DatasetArgs) -> Result<ResolvedInputs> {
    let delimiter = delimiter_byte(args.delimiter)?;

    info!("Loading dataset from {:?}", &args.dataset);
    let rows = dataset::load(&args.dataset, delimiter).map_err(PrepError::Dataset)?;
    let catalog = Catalog::from_rows(&rows);
    for rejected in catalog.rejected() {
        warn!(
            structure = %rejected.structure_id,
            "structure dropped: {} malformed row(s)",
            rejected.errors.len()
        );
        println!(
            "⚠ Structure {} dropped from this run ({} malformed dataset row(s)):",
            rejected.structure_id,
            rejected.errors.len()
        );
        for error in &rejected.errors {
            println!("    {error}");
        }
    }

    let policy = match &args.policy {
        Some(path) => {
            info!("Loading reload policy from {:?}", path);
            ReloadPolicy::load(path).map_err(PrepError::Policy)?
        }
        None => ReloadPolicy::default(),
    };

    let layout = WorkdirLayout::new(&args.workdir);
    let prober = FsCheckpointProber::new(layout.clone());
    let plan = mdprep::engine::plan::resolve(&catalog, &policy, &prober);

    Ok(ResolvedInputs {
        catalog,
        layout,
        plan,
    })
}

fn delimiter_byte(c: char) -> Result<u8> {
    u8::try_from(c).map_err(|_| {
        CliError::Argument(format!(
            "delimiter '{c}' is not a single-byte character"
        ))
    })
}

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "mdprep - checkpoint-aware preparation of molecular-dynamics runs for batches of point mutations.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the stage plan and execute it through the external tools.
    Run(RunArgs),
    /// Resolve and print the stage plan without invoking any tool.
    Plan(PlanArgs),
}

/// Inputs shared by plan resolution and execution.
#[derive(Args, Debug)]
pub struct DatasetArgs {
    /// Path to the mutation dataset (CSV with pdb_id, position, wild_type, mutation).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub dataset: PathBuf,

    /// Field delimiter of the dataset.
    #[arg(long, default_value = ";", value_name = "CHAR")]
    pub delimiter: char,

    /// Root of the working directory holding per-structure subdirectories.
    #[arg(short, long, default_value = ".", value_name = "PATH")]
    pub workdir: PathBuf,

    /// Path to a reload-policy file forcing recomputation of stages/labels.
    #[arg(long, value_name = "PATH")]
    pub policy: Option<PathBuf>,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub inputs: DatasetArgs,

    /// Path to the external mutagenesis tool binary.
    #[arg(long, default_value = "rosetta_scripts", value_name = "PATH")]
    pub rosetta: PathBuf,

    /// Path to the external physics-engine binary.
    #[arg(long, default_value = "gmx", value_name = "PATH")]
    pub gmx: PathBuf,
}

/// Arguments for the `plan` subcommand.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub inputs: DatasetArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_parses_with_defaults() {
        let cli = Cli::try_parse_from(["mdprep", "run", "--dataset", "muts.csv"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.inputs.dataset, PathBuf::from("muts.csv"));
        assert_eq!(args.inputs.delimiter, ';');
        assert_eq!(args.rosetta, PathBuf::from("rosetta_scripts"));
        assert_eq!(args.gmx, PathBuf::from("gmx"));
        assert!(args.inputs.policy.is_none());
    }

    #[test]
    fn dataset_is_required() {
        assert!(Cli::try_parse_from(["mdprep", "run"]).is_err());
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(
            Cli::try_parse_from(["mdprep", "run", "--dataset", "d.csv", "-v", "-q"]).is_err()
        );
    }

    #[test]
    fn plan_takes_no_tool_binaries() {
        let cli = Cli::try_parse_from([
            "mdprep", "plan", "--dataset", "d.csv", "--delimiter", ",", "--policy", "p.toml",
        ])
        .unwrap();
        let Commands::Plan(args) = cli.command else {
            panic!("expected plan command");
        };
        assert_eq!(args.inputs.delimiter, ',');
        assert_eq!(args.inputs.policy, Some(PathBuf::from("p.toml")));
    }
}

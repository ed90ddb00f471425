use super::{MdEngine, ToolError};
use crate::core::models::mutation::MutationLabel;
use crate::engine::layout::WorkdirLayout;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Forcefield and water-model selection fed to `pdb2gmx` on stdin.
const PDB2GMX_SELECTION: &str = "6\n1\n";
/// Solvent group selection fed to `genion` on stdin.
const GENION_SOLVENT_GROUP: &str = "13\n";
/// Ion concentration used to neutralize the solvated system (mol/l).
const ION_CONCENTRATION: &str = "0.1";

/// The MD stages driven through the `gmx` multi-tool.
///
/// Minimization covers the whole chain the original pipeline ran per label:
/// topology generation, box construction, vacuum minimization, solvation,
/// neutralizing ions, and the final in-solvent minimization producing
/// `em.gro`. Equilibration and production are single grompp/mdrun pairs over
/// the staged `eq.mdp` and `md.mdp` parameter files.
///
/// Exit status of each invocation is logged but not treated as failure; the
/// driver re-probes the stage's checkpoint artifact, which is the actual
/// completion signal.
#[derive(Debug, Clone)]
pub struct GromacsEngine {
    binary: PathBuf,
}

impl GromacsEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, dir: &Path, args: &[&str], stdin_input: Option<&str>) -> Result<(), ToolError> {
        debug!(binary = %self.binary.display(), ?args, "invoking gmx");
        let mut command = Command::new(&self.binary);
        command
            .args(args)
            .current_dir(dir)
            .stdout(Stdio::null())
            .stdin(if stdin_input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        let mut child = command.spawn().map_err(|source| ToolError::Spawn {
            program: self.binary.to_string_lossy().to_string(),
            source,
        })?;
        if let (Some(input), Some(mut stdin)) = (stdin_input, child.stdin.take()) {
            // The tool may exit before reading the whole selection; a broken
            // pipe here is not a failure of ours.
            let _ = stdin.write_all(input.as_bytes());
        }
        let status = child.wait().map_err(|source| ToolError::Spawn {
            program: self.binary.to_string_lossy().to_string(),
            source,
        })?;
        if !status.success() {
            warn!(?args, %status, "gmx exited non-zero");
        }
        Ok(())
    }

    /// Copies the run-root topology and parameter templates into the label
    /// directory. Idempotent; existing copies are overwritten.
    fn stage_inputs(
        &self,
        layout: &WorkdirLayout,
        structure_id: &str,
        label: &MutationLabel,
    ) -> Result<(), ToolError> {
        let dir = layout.label_dir(structure_id, label);
        let mut sources = vec![layout.topology_template()];
        for name in ["em", "eq", "md"] {
            sources.push(layout.mdp_template(name));
        }
        for source in sources {
            let file_name = source.file_name().expect("template paths have file names");
            std::fs::copy(&source, dir.join(file_name)).map_err(|e| ToolError::Io {
                path: source.clone(),
                source: e,
            })?;
        }
        Ok(())
    }
}

impl MdEngine for GromacsEngine {
    fn minimize(
        &self,
        layout: &WorkdirLayout,
        structure_id: &str,
        label: &MutationLabel,
    ) -> Result<(), ToolError> {
        self.stage_inputs(layout, structure_id, label)?;
        let dir = layout.label_dir(structure_id, label);
        let input = format!("{label}.pdb");

        // Topology and box.
        self.run(
            &dir,
            &[
                "pdb2gmx", "-f", &input, "-o", "pep.gro", "-p", "pep.top", "-ignh", "-q",
            ],
            Some(PDB2GMX_SELECTION),
        )?;
        self.run(
            &dir,
            &[
                "editconf", "-f", "pep.gro", "-o", "box.gro", "-d", "0.3", "-bt", "cubic", "-c",
            ],
            None,
        )?;
        derive_chain_include(&dir)?;

        // Vacuum minimization.
        self.run(
            &dir,
            &["grompp", "-f", "em", "-p", "sys", "-o", "emp", "-c", "box.gro"],
            None,
        )?;
        self.run(&dir, &["mdrun", "-deffnm", "emp", "-v"], None)?;

        // Solvation and neutralizing ions.
        self.run(
            &dir,
            &["solvate", "-cp", "emp.gro", "-cs", "-o", "s0.gro", "-p", "sys.top"],
            None,
        )?;
        self.run(
            &dir,
            &["grompp", "-f", "em", "-c", "s0", "-p", "sys", "-o", "ion"],
            None,
        )?;
        self.run(
            &dir,
            &[
                "genion", "-s", "ion", "-neutral", "-conc", ION_CONCENTRATION, "-p", "sys.top",
                "-o", "start.gro",
            ],
            Some(GENION_SOLVENT_GROUP),
        )?;

        // In-solvent minimization producing em.gro.
        self.run(
            &dir,
            &["grompp", "-f", "em", "-c", "start", "-p", "sys", "-o", "em"],
            None,
        )?;
        self.run(&dir, &["mdrun", "-deffnm", "em", "-v"], None)
    }

    fn equilibrate(
        &self,
        layout: &WorkdirLayout,
        structure_id: &str,
        label: &MutationLabel,
    ) -> Result<(), ToolError> {
        let dir = layout.label_dir(structure_id, label);
        self.run(
            &dir,
            &["grompp", "-f", "eq", "-c", "em", "-p", "sys", "-o", "eq"],
            None,
        )?;
        self.run(&dir, &["mdrun", "-deffnm", "eq", "-v"], None)
    }

    fn production(
        &self,
        layout: &WorkdirLayout,
        structure_id: &str,
        label: &MutationLabel,
    ) -> Result<(), ToolError> {
        let dir = layout.label_dir(structure_id, label);
        self.run(
            &dir,
            &["grompp", "-f", "md", "-c", "eq", "-p", "sys", "-o", "md"],
            None,
        )?;
        self.run(&dir, &["mdrun", "-deffnm", "md"], None)
    }
}

/// Derives the chain include (`pep.itp`) that `sys.top` references from the
/// `pep.top` written by pdb2gmx: the forcefield include lines are dropped
/// and everything from the position-restraint include onward is cut, closed
/// with a trailing `#endif`.
fn derive_chain_include(dir: &Path) -> Result<(), ToolError> {
    let top_path = dir.join("pep.top");
    let top = match std::fs::read_to_string(&top_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            // pdb2gmx produced nothing; the driver's checkpoint probe will
            // flag the stage.
            warn!(path = %top_path.display(), "pep.top missing, skipping chain include");
            return Ok(());
        }
        Err(source) => {
            return Err(ToolError::Io {
                path: top_path,
                source,
            });
        }
    };

    let itp_path = dir.join("pep.itp");
    std::fs::write(&itp_path, chain_include_from_topology(&top)).map_err(|source| {
        ToolError::Io {
            path: itp_path,
            source,
        }
    })
}

fn chain_include_from_topology(top: &str) -> String {
    let mut out = String::with_capacity(top.len());
    for line in top.lines() {
        if line.contains("amber") {
            continue;
        }
        out.push_str(line);
        out.push('\n');
        if line.contains("posre.itp") {
            break;
        }
    }
    out.push_str("#endif\n");
    out
}

use super::{MutagenesisEngine, ToolError};
use crate::core::models::mutation::MutationLabel;
use crate::engine::layout::WorkdirLayout;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Mutagenesis via RosettaScripts.
///
/// The adapter materializes a per-label `mutate.xml` from the run-root
/// protocol template, splicing in a `MutateResidue` mover for the label's
/// position and target residue, invokes the configured binary inside the
/// label directory, and renames the tool's `_0001.pdb` output to the
/// canonical mutated-structure path.
#[derive(Debug, Clone)]
pub struct RosettaMutagenesis {
    binary: PathBuf,
}

impl RosettaMutagenesis {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl MutagenesisEngine for RosettaMutagenesis {
    fn mutate(
        &self,
        layout: &WorkdirLayout,
        structure_id: &str,
        label: &MutationLabel,
    ) -> Result<(), ToolError> {
        let label_dir = layout.label_dir(structure_id, label);
        let template_path = layout.protocol_template();
        let template = std::fs::read_to_string(&template_path).map_err(|source| ToolError::Io {
            path: template_path.clone(),
            source,
        })?;
        let protocol = splice_protocol(&template, label, &template_path)?;
        let protocol_path = label_dir.join("mutate.xml");
        std::fs::write(&protocol_path, protocol).map_err(|source| ToolError::Io {
            path: protocol_path.clone(),
            source,
        })?;

        let clean = layout.clean_structure(structure_id);
        debug!(
            structure = structure_id,
            label = %label,
            binary = %self.binary.display(),
            "invoking mutagenesis"
        );
        let status = Command::new(&self.binary)
            .arg("-s")
            .arg(&clean)
            .arg("-parser:protocol")
            .arg("mutate.xml")
            .current_dir(&label_dir)
            .stdout(Stdio::null())
            .status()
            .map_err(|source| ToolError::Spawn {
                program: self.binary.to_string_lossy().to_string(),
                source,
            })?;
        if !status.success() {
            warn!(structure = structure_id, label = %label, %status, "mutagenesis exited non-zero");
        }

        // Rosetta names its decoy after the input structure.
        let decoy = label_dir.join(format!("{structure_id}_clean_0001.pdb"));
        if !decoy.is_file() {
            return Err(ToolError::MissingOutput {
                program: self.binary.to_string_lossy().to_string(),
                path: decoy,
            });
        }
        let target = layout.mutated_structure(structure_id, label);
        std::fs::rename(&decoy, &target).map_err(|source| ToolError::Io {
            path: target,
            source,
        })
    }
}

/// Splices the point-mutation mover into the protocol template: the mover
/// definition goes right before `</MOVERS>`, its activation right before
/// `</PROTOCOLS>`.
fn splice_protocol(
    template: &str,
    label: &MutationLabel,
    path: &Path,
) -> Result<String, ToolError> {
    let mover = format!(
        "<MutateResidue name=\"one_point_mutation\" target=\"{}A\" new_res=\"{}\" \
         preserve_atom_coords=\"false\" mutate_self=\"false\" \
         update_polymer_bond_dependent=\"false\"/>",
        label.position,
        label.mutant.three_letter()
    );
    let activation = "<Add mover=\"one_point_mutation\"/>";

    let mut out = String::with_capacity(template.len() + mover.len() + activation.len());
    let mut spliced_mover = false;
    let mut spliced_activation = false;
    for line in template.lines() {
        if line.contains("</MOVERS>") {
            out.push_str(&mover);
            out.push('\n');
            spliced_mover = true;
        } else if line.contains("</PROTOCOLS>") {
            out.push_str(activation);
            out.push('\n');
            spliced_activation = true;
        }
        out.push_str(line);
        out.push('\n');
    }

    if !spliced_mover || !spliced_activation {
        return Err(ToolError::Malformed {
            path: path.to_path_buf(),
            detail: "protocol template lacks </MOVERS> or </PROTOCOLS> markers".to_string(),
        });
    }
    Ok(out)
}

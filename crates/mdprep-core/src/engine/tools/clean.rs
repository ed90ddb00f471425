use super::{StructureCleaner, ToolError};
use crate::engine::layout::WorkdirLayout;
use std::path::Path;
use tracing::debug;

/// Rewrites a raw PDB into the cleaned-structure artifact.
///
/// Keeps the first pass over the chain: ATOM records are renumbered with
/// sequential atom serials and residue numbers, records after the residue
/// numbering first decreases (alternate models, repeated chains) are
/// dropped, HETATM records are dropped, and all other records pass through
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct PdbCleaner;

impl StructureCleaner for PdbCleaner {
    fn clean(&self, layout: &WorkdirLayout, structure_id: &str) -> Result<(), ToolError> {
        let input = layout.raw_structure(structure_id);
        let output = layout.clean_structure(structure_id);
        debug!(structure = structure_id, input = %input.display(), "cleaning structure");

        let content = std::fs::read_to_string(&input).map_err(|source| ToolError::Io {
            path: input.clone(),
            source,
        })?;
        let cleaned = clean_records(&content, &input)?;
        std::fs::write(&output, cleaned).map_err(|source| ToolError::Io {
            path: output.clone(),
            source,
        })
    }
}

fn clean_records(content: &str, path: &Path) -> Result<String, ToolError> {
    let mut out = String::with_capacity(content.len());
    let mut serial = 0u32;
    let mut new_res_no = 0u32;
    let mut last_res_no: Option<i32> = None;
    let mut first_pass = true;

    for line in content.lines() {
        if line.starts_with("ATOM") {
            if !first_pass {
                continue;
            }
            let res_no = field(line, 22, 26, path)?;
            if last_res_no.is_some_and(|prev| res_no < prev) {
                // Residue numbering restarted: a second model or chain copy.
                first_pass = false;
                continue;
            }
            if last_res_no != Some(res_no) {
                new_res_no += 1;
            }
            last_res_no = Some(res_no);
            serial += 1;
            out.push_str(&renumber(line, serial, new_res_no, path)?);
            out.push('\n');
        } else if !line.starts_with("HETATM") {
            out.push_str(line);
            out.push('\n');
        }
    }
    Ok(out)
}

fn field(line: &str, start: usize, end: usize, path: &Path) -> Result<i32, ToolError> {
    line.get(start..end)
        .and_then(|s| s.trim().parse::<i32>().ok())
        .ok_or_else(|| ToolError::Malformed {
            path: path.to_path_buf(),
            detail: format!("unparsable ATOM record: '{line}'"),
        })
}

fn renumber(line: &str, serial: u32, res_no: u32, path: &Path) -> Result<String, ToolError> {
    // ATOM records are fixed-width: serial in columns 7-11, residue
    // sequence number in columns 23-26 (1-based).
    if line.len() < 26 {
        return Err(ToolError::Malformed {
            path: path.to_path_buf(),
            detail: format!("truncated ATOM record: '{line}'"),
        });
    }
    Ok(format!(
        "{}{:>5}{}{:>4}{}",
        &line[..6],
        serial,
        &line[11..22],
        res_no,
        &line[26..]
    ))
}

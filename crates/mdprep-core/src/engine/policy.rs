use crate::core::models::mutation::{LabelParseError, MutationLabel};
use crate::core::models::stage::Stage;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read policy file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        #[source]
        source: Box<toml::de::Error>,
    },
    #[error("policy for stage '{stage}' has unexpected tag '{tag}' (expected 'all' or 'none')")]
    UnknownTag { stage: &'static str, tag: String },
    #[error("policy for stage '{stage}', structure '{structure_id}': {source}")]
    BadLabel {
        stage: &'static str,
        structure_id: String,
        #[source]
        source: LabelParseError,
    },
}

/// What the policy says about one (stage, structure, label) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Recompute regardless of checkpoint state.
    Force,
    /// Defer to the checkpoint prober.
    MaySkip,
}

/// Per-structure selection under a stage entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureSelection {
    All,
    Labels(HashSet<MutationLabel>),
}

/// Policy for a single stage: reload everything, nothing (the default), or
/// an explicit per-structure selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StagePolicy {
    All,
    #[default]
    None,
    PerStructure(HashMap<String, StructureSelection>),
}

/// User configuration forcing recomputation of specific stages and labels.
///
/// Loaded once at run start from a TOML document keyed by stage name
/// (`mutation`, `em`, `eq`, `md`); read-only for the rest of the run. A
/// stage or structure with no entry defaults to relying on checkpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadPolicy {
    stages: HashMap<Stage, StagePolicy>,
}

// Raw serde shape; tags and labels are validated in `interpret` so a typo is
// a PolicyError with stage context rather than an opaque untagged-enum
// mismatch.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyFile {
    mutation: Option<StageSpec>,
    em: Option<StageSpec>,
    eq: Option<StageSpec>,
    md: Option<StageSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StageSpec {
    Tag(String),
    PerStructure(HashMap<String, StructureSpec>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StructureSpec {
    Tag(String),
    Labels(Vec<String>),
}

impl ReloadPolicy {
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path).map_err(|e| PolicyError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            PolicyError::Toml { source, .. } => PolicyError::Toml {
                path: path.to_string_lossy().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, PolicyError> {
        let file: PolicyFile = toml::from_str(content).map_err(|e| PolicyError::Toml {
            path: String::new(),
            source: Box::new(e),
        })?;

        let mut stages = HashMap::new();
        for (stage, spec) in [
            (Stage::Mutagenesis, file.mutation),
            (Stage::Minimization, file.em),
            (Stage::Equilibration, file.eq),
            (Stage::Production, file.md),
        ] {
            if let Some(spec) = spec {
                let key = stage.policy_key().expect("label stage has a policy key");
                stages.insert(stage, interpret(key, spec)?);
            }
        }
        Ok(Self { stages })
    }

    /// Returns [`Decision::Force`] if the configured policy for `stage` is
    /// ALL, or names `label` for `structure_id`; otherwise
    /// [`Decision::MaySkip`]. Absent entries default to `MaySkip`.
    pub fn decision(&self, stage: Stage, structure_id: &str, label: &MutationLabel) -> Decision {
        match self.stages.get(&stage).unwrap_or(&StagePolicy::None) {
            StagePolicy::All => Decision::Force,
            StagePolicy::None => Decision::MaySkip,
            StagePolicy::PerStructure(map) => match map.get(structure_id) {
                Some(StructureSelection::All) => Decision::Force,
                Some(StructureSelection::Labels(labels)) if labels.contains(label) => {
                    Decision::Force
                }
                _ => Decision::MaySkip,
            },
        }
    }

    pub fn stage_policy(&self, stage: Stage) -> &StagePolicy {
        self.stages.get(&stage).unwrap_or(&StagePolicy::None)
    }
}

fn interpret(stage: &'static str, spec: StageSpec) -> Result<StagePolicy, PolicyError> {
    match spec {
        StageSpec::Tag(tag) => match tag.as_str() {
            "all" => Ok(StagePolicy::All),
            "none" => Ok(StagePolicy::None),
            _ => Err(PolicyError::UnknownTag { stage, tag }),
        },
        StageSpec::PerStructure(map) => {
            let mut out = HashMap::new();
            for (structure_id, spec) in map {
                let selection = match spec {
                    StructureSpec::Tag(tag) => match tag.as_str() {
                        "all" => StructureSelection::All,
                        "none" => StructureSelection::Labels(HashSet::new()),
                        _ => return Err(PolicyError::UnknownTag { stage, tag }),
                    },
                    StructureSpec::Labels(raw) => {
                        let mut labels = HashSet::new();
                        for s in raw {
                            let label =
                                s.parse::<MutationLabel>()
                                    .map_err(|source| PolicyError::BadLabel {
                                        stage,
                                        structure_id: structure_id.clone(),
                                        source,
                                    })?;
                            labels.insert(label);
                        }
                        StructureSelection::Labels(labels)
                    }
                };
                out.insert(structure_id, selection);
            }
            Ok(StagePolicy::PerStructure(out))
        }
    }
}

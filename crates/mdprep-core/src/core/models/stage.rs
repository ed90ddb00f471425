use std::fmt;

/// One step of the preparation pipeline, in strict dependency order.
///
/// Each stage has exactly one canonical checkpoint artifact whose presence
/// signals completion. [`Stage::StructureClean`] is structure-scoped; the
/// four remaining stages are scoped to a (structure, mutation label) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    StructureClean,
    Mutagenesis,
    Minimization,
    Equilibration,
    Production,
}

impl Stage {
    /// The label-scoped stages, in execution order. Structure cleaning is
    /// handled per structure by the driver, not per label.
    pub const LABEL_STAGES: [Stage; 4] = [
        Stage::Mutagenesis,
        Stage::Minimization,
        Stage::Equilibration,
        Stage::Production,
    ];

    /// Key identifying this stage in reload-policy files.
    pub fn policy_key(&self) -> Option<&'static str> {
        match self {
            Stage::StructureClean => None,
            Stage::Mutagenesis => Some("mutation"),
            Stage::Minimization => Some("em"),
            Stage::Equilibration => Some("eq"),
            Stage::Production => Some("md"),
        }
    }

    /// File name of the stage's checkpoint artifact inside a label directory.
    /// The mutated structure is named after the label itself, so it is
    /// resolved by the layout rather than listed here.
    pub fn artifact_file(&self) -> Option<&'static str> {
        match self {
            Stage::StructureClean | Stage::Mutagenesis => None,
            Stage::Minimization => Some("em.gro"),
            Stage::Equilibration => Some("eq.gro"),
            Stage::Production => Some("md.gro"),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::StructureClean => "structure-clean",
            Stage::Mutagenesis => "mutagenesis",
            Stage::Minimization => "minimization",
            Stage::Equilibration => "equilibration",
            Stage::Production => "production",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_totally_ordered() {
        assert!(Stage::StructureClean < Stage::Mutagenesis);
        assert!(Stage::Mutagenesis < Stage::Minimization);
        assert!(Stage::Minimization < Stage::Equilibration);
        assert!(Stage::Equilibration < Stage::Production);
    }

    #[test]
    fn label_stages_exclude_structure_clean_and_keep_order() {
        assert_eq!(Stage::LABEL_STAGES.len(), 4);
        assert!(!Stage::LABEL_STAGES.contains(&Stage::StructureClean));
        let mut sorted = Stage::LABEL_STAGES;
        sorted.sort();
        assert_eq!(sorted, Stage::LABEL_STAGES);
    }

    #[test]
    fn policy_keys_cover_exactly_the_label_stages() {
        assert_eq!(Stage::StructureClean.policy_key(), None);
        let keys: Vec<_> = Stage::LABEL_STAGES
            .iter()
            .map(|s| s.policy_key().unwrap())
            .collect();
        assert_eq!(keys, ["mutation", "em", "eq", "md"]);
    }
}

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AminoAcid {
    // --- Aliphatic, Nonpolar ---
    Alanine,    // Alanine (A / ALA)
    Glycine,    // Glycine (G / GLY)
    Isoleucine, // Isoleucine (I / ILE)
    Leucine,    // Leucine (L / LEU)
    Proline,    // Proline (P / PRO)
    Valine,     // Valine (V / VAL)

    // --- Aromatic ---
    Phenylalanine, // Phenylalanine (F / PHE)
    Tryptophan,    // Tryptophan (W / TRP)
    Tyrosine,      // Tyrosine (Y / TYR)

    // --- Polar, Uncharged ---
    Asparagine, // Asparagine (N / ASN)
    Cysteine,   // Cysteine (C / CYS)
    Glutamine,  // Glutamine (Q / GLN)
    Serine,     // Serine (S / SER)
    Threonine,  // Threonine (T / THR)
    Methionine, // Methionine (M / MET)

    // --- Positively Charged (Basic) ---
    Arginine,  // Arginine (R / ARG)
    Lysine,    // Lysine (K / LYS)
    Histidine, // Histidine (H / HIS)

    // --- Negatively Charged (Acidic) ---
    AsparticAcid, // Aspartic Acid (D / ASP)
    GlutamicAcid, // Glutamic Acid (E / GLU)
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("unrecognized one-letter amino-acid code '{0}'")]
pub struct UnknownResidueCode(pub char);

impl AminoAcid {
    /// Parses a one-letter residue code as used in the mutation dataset.
    pub fn from_one_letter(code: char) -> Result<Self, UnknownResidueCode> {
        use AminoAcid::*;
        match code.to_ascii_uppercase() {
            'A' => Ok(Alanine),
            'R' => Ok(Arginine),
            'N' => Ok(Asparagine),
            'D' => Ok(AsparticAcid),
            'C' => Ok(Cysteine),
            'E' => Ok(GlutamicAcid),
            'Q' => Ok(Glutamine),
            'G' => Ok(Glycine),
            'H' => Ok(Histidine),
            'I' => Ok(Isoleucine),
            'L' => Ok(Leucine),
            'K' => Ok(Lysine),
            'M' => Ok(Methionine),
            'F' => Ok(Phenylalanine),
            'P' => Ok(Proline),
            'S' => Ok(Serine),
            'T' => Ok(Threonine),
            'W' => Ok(Tryptophan),
            'Y' => Ok(Tyrosine),
            'V' => Ok(Valine),
            other => Err(UnknownResidueCode(other)),
        }
    }

    pub fn one_letter(&self) -> char {
        use AminoAcid::*;
        match self {
            Alanine => 'A',
            Arginine => 'R',
            Asparagine => 'N',
            AsparticAcid => 'D',
            Cysteine => 'C',
            GlutamicAcid => 'E',
            Glutamine => 'Q',
            Glycine => 'G',
            Histidine => 'H',
            Isoleucine => 'I',
            Leucine => 'L',
            Lysine => 'K',
            Methionine => 'M',
            Phenylalanine => 'F',
            Proline => 'P',
            Serine => 'S',
            Threonine => 'T',
            Tryptophan => 'W',
            Tyrosine => 'Y',
            Valine => 'V',
        }
    }

    /// Three-letter residue name as expected by mutagenesis protocol files.
    pub fn three_letter(&self) -> &'static str {
        use AminoAcid::*;
        match self {
            Alanine => "ALA",
            Arginine => "ARG",
            Asparagine => "ASN",
            AsparticAcid => "ASP",
            Cysteine => "CYS",
            GlutamicAcid => "GLU",
            Glutamine => "GLN",
            Glycine => "GLY",
            Histidine => "HIS",
            Isoleucine => "ILE",
            Leucine => "LEU",
            Lysine => "LYS",
            Methionine => "MET",
            Phenylalanine => "PHE",
            Proline => "PRO",
            Serine => "SER",
            Threonine => "THR",
            Tryptophan => "TRP",
            Tyrosine => "TYR",
            Valine => "VAL",
        }
    }
}

//! JSON parameter files and runtime dispatch.
//!
//! A [`ParamFile`] is the on-disk form of a [`Poseidon2Params`]: the field is
//! named, integers are decimal or `0x` hex strings of any size (reduced mod
//! `p`), and an optional `modulus` entry is cross-checked against the named
//! field. Because the core is generic over the field type and a const state
//! width, a loaded file is turned into a concrete instance through an
//! [`InstanceVisitor`].
//!
//! ```json
//! {
//!   "field": "bn254",
//!   "width": 3, "rate": 1, "capacity": 2,
//!   "full_rounds": 8, "partial_rounds": 0,
//!   "padding": "zero_fill",
//!   "round_constants": { "source": "seeded", "seed_hex": "6d79617070" },
//!   "external_matrix": { "source": "poseidon2" }
//! }
//! ```

use crate::error::{ErrorCode, Poseidon2Result};
use crate::field::{
    parse_integer, Bls12Fr, Bn254Fr, FieldElement, BLS12_381_MODULUS_DECIMAL,
    BN254_MODULUS_DECIMAL,
};
use crate::instances::reference_partial_rounds;
use crate::poseidon::{
    ConstantsSource, DiagonalSource, MatrixSource, Padding, Poseidon2, Poseidon2Params,
    DEFAULT_SBOX,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// State widths a runtime configuration can be dispatched to.
pub const SUPPORTED_WIDTHS: [usize; 8] = [2, 3, 4, 8, 12, 16, 20, 24];

/// Prime fields with a concrete implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldName {
    /// BN254 scalar field.
    #[serde(rename = "bn254")]
    Bn254,
    /// BLS12-381 scalar field.
    #[serde(rename = "bls12_381")]
    Bls12_381,
}

impl FieldName {
    /// Name as written in parameter files.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Bn254 => "bn254",
            FieldName::Bls12_381 => "bls12_381",
        }
    }

    /// Modulus in decimal.
    pub fn modulus_decimal(&self) -> &'static str {
        match self {
            FieldName::Bn254 => BN254_MODULUS_DECIMAL,
            FieldName::Bls12_381 => BLS12_381_MODULUS_DECIMAL,
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = ErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bn254" => Ok(FieldName::Bn254),
            "bls12_381" | "bls12-381" => Ok(FieldName::Bls12_381),
            other => Err(ErrorCode::E302_UnknownName(other.to_string())),
        }
    }
}

/// Named parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// All-external eight-round width-3 configuration of the circuit front end.
    Minimal,
    /// Two-phase Poseidon2, width 3, Grain constants.
    ///
    /// The partial round count follows the field. Over BN254 this is the
    /// published instance and its test vector.
    Reference,
}

impl Preset {
    /// Preset name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Minimal => "minimal",
            Preset::Reference => "reference",
        }
    }

    /// Parameters of this preset over `F`.
    pub fn params<F: FieldElement>(&self) -> Poseidon2Params<F> {
        match self {
            Preset::Minimal => Poseidon2Params::minimal(),
            Preset::Reference => Poseidon2Params::reference(3, reference_partial_rounds::<F>()),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = ErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimal" => Ok(Preset::Minimal),
            "reference" => Ok(Preset::Reference),
            other => Err(ErrorCode::E302_UnknownName(other.to_string())),
        }
    }
}

/// Round constants as written in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ConstantsEntry {
    /// Grain LFSR.
    Grain,
    /// Seed bytes in hex.
    Seeded {
        /// Hex-encoded seed.
        seed_hex: String,
    },
    /// Integer strings, one row per round.
    Literal {
        /// Table rows.
        rows: Vec<Vec<String>>,
    },
}

/// External matrix as written in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum MatrixEntry {
    /// Generated Poseidon2 matrix.
    Poseidon2,
    /// Integer strings.
    Literal {
        /// Matrix rows.
        rows: Vec<Vec<String>>,
    },
}

/// Internal diagonal as written in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DiagonalEntry {
    /// Published Poseidon2 diagonal.
    Poseidon2,
    /// Integer strings.
    Literal {
        /// Diagonal entries.
        diagonal: Vec<String>,
    },
}

impl Default for DiagonalEntry {
    fn default() -> Self {
        DiagonalEntry::Poseidon2
    }
}

fn default_sbox() -> u64 {
    DEFAULT_SBOX
}

fn default_domain_tag() -> String {
    "0".to_string()
}

/// On-disk parameter set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamFile {
    /// Prime field.
    pub field: FieldName,
    /// Optional modulus, checked against `field`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modulus: Option<String>,
    /// State width.
    pub width: usize,
    /// Rate lanes.
    pub rate: usize,
    /// Capacity lanes.
    pub capacity: usize,
    /// External rounds.
    pub full_rounds: usize,
    /// Internal rounds.
    pub partial_rounds: usize,
    /// S-box exponent.
    #[serde(default = "default_sbox")]
    pub sbox: u64,
    /// External mix before round 0.
    #[serde(default)]
    pub initial_linear_layer: bool,
    /// First capacity lane of a fresh sponge.
    #[serde(default = "default_domain_tag")]
    pub domain_tag: String,
    /// Final-block rule.
    pub padding: Padding,
    /// Round constants.
    pub round_constants: ConstantsEntry,
    /// External matrix.
    pub external_matrix: MatrixEntry,
    /// Internal diagonal.
    #[serde(default)]
    pub internal_diagonal: DiagonalEntry,
}

impl ParamFile {
    /// Read and parse a parameter file.
    pub fn load<P: AsRef<Path>>(path: P) -> Poseidon2Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ErrorCode::E300_InvalidParamFile(format!("{}: {}", path.display(), e))
        })?;
        let file = Self::from_json(&text)?;
        debug!(
            "loaded {}: field={} t={} R_f={} R_p={}",
            path.display(),
            file.field,
            file.width,
            file.full_rounds,
            file.partial_rounds
        );
        Ok(file)
    }

    /// Parse JSON text.
    pub fn from_json(text: &str) -> Poseidon2Result<Self> {
        serde_json::from_str(text).map_err(|e| ErrorCode::E300_InvalidParamFile(e.to_string()))
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Poseidon2Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ErrorCode::E300_InvalidParamFile(e.to_string()))
    }

    /// A named preset over a named field.
    pub fn preset(preset: Preset, field: FieldName) -> Self {
        match field {
            FieldName::Bn254 => Self::from_params(field, &preset.params::<Bn254Fr>()),
            FieldName::Bls12_381 => Self::from_params(field, &preset.params::<Bls12Fr>()),
        }
    }

    /// File form of `params`, with the modulus written out.
    pub fn from_params<F: FieldElement>(field: FieldName, params: &Poseidon2Params<F>) -> Self {
        let rows = |rows: &[Vec<F>]| -> Vec<Vec<String>> {
            rows.iter()
                .map(|row| row.iter().map(FieldElement::to_decimal).collect())
                .collect()
        };
        Self {
            field,
            modulus: Some(F::modulus().to_str_radix(10)),
            width: params.width,
            rate: params.rate,
            capacity: params.capacity,
            full_rounds: params.full_rounds,
            partial_rounds: params.partial_rounds,
            sbox: params.sbox,
            initial_linear_layer: params.initial_linear_layer,
            domain_tag: params.domain_tag.to_decimal(),
            padding: params.padding,
            round_constants: match &params.round_constants {
                ConstantsSource::Grain => ConstantsEntry::Grain,
                ConstantsSource::Seeded(seed) => ConstantsEntry::Seeded {
                    seed_hex: hex::encode(seed),
                },
                ConstantsSource::Literal(table) => ConstantsEntry::Literal { rows: rows(table) },
            },
            external_matrix: match &params.external_matrix {
                MatrixSource::Poseidon2 => MatrixEntry::Poseidon2,
                MatrixSource::Literal(matrix) => MatrixEntry::Literal { rows: rows(matrix) },
            },
            internal_diagonal: match &params.internal_diagonal {
                DiagonalSource::Poseidon2 => DiagonalEntry::Poseidon2,
                DiagonalSource::Literal(diagonal) => DiagonalEntry::Literal {
                    diagonal: diagonal.iter().map(FieldElement::to_decimal).collect(),
                },
            },
        }
    }

    /// Parameters over `F`.
    ///
    /// `F` must be the field the file names; a declared `modulus` must
    /// match it as well.
    pub fn to_params<F: FieldElement>(&self) -> Poseidon2Result<Poseidon2Params<F>> {
        let expected = F::modulus();
        let named = self.field.modulus_decimal();
        if expected.to_str_radix(10) != named {
            return Err(ErrorCode::E301_ModulusMismatch(
                expected.to_str_radix(10),
                named.to_string(),
            ));
        }
        if let Some(declared) = &self.modulus {
            if parse_integer(declared)? != expected {
                return Err(ErrorCode::E301_ModulusMismatch(
                    expected.to_str_radix(10),
                    declared.clone(),
                ));
            }
        }

        Ok(Poseidon2Params {
            width: self.width,
            rate: self.rate,
            capacity: self.capacity,
            full_rounds: self.full_rounds,
            partial_rounds: self.partial_rounds,
            sbox: self.sbox,
            initial_linear_layer: self.initial_linear_layer,
            domain_tag: F::from_integer_str(&self.domain_tag)?,
            padding: self.padding,
            round_constants: match &self.round_constants {
                ConstantsEntry::Grain => ConstantsSource::Grain,
                ConstantsEntry::Seeded { seed_hex } => ConstantsSource::Seeded(
                    hex::decode(seed_hex).map_err(|_| ErrorCode::E202_InvalidHex)?,
                ),
                ConstantsEntry::Literal { rows } => ConstantsSource::Literal(parse_rows(rows)?),
            },
            external_matrix: match &self.external_matrix {
                MatrixEntry::Poseidon2 => MatrixSource::Poseidon2,
                MatrixEntry::Literal { rows } => MatrixSource::Literal(parse_rows(rows)?),
            },
            internal_diagonal: match &self.internal_diagonal {
                DiagonalEntry::Poseidon2 => DiagonalSource::Poseidon2,
                DiagonalEntry::Literal { diagonal } => {
                    DiagonalSource::Literal(parse_row(diagonal)?)
                }
            },
        })
    }

    /// Build the instance this file describes and hand it to `visitor`.
    pub fn visit<V: InstanceVisitor>(&self, visitor: V) -> Poseidon2Result<V::Output> {
        match self.field {
            FieldName::Bn254 => visit_width(&self.to_params::<Bn254Fr>()?, visitor),
            FieldName::Bls12_381 => visit_width(&self.to_params::<Bls12Fr>()?, visitor),
        }
    }
}

fn parse_row<F: FieldElement>(row: &[String]) -> Poseidon2Result<Vec<F>> {
    row.iter().map(|s| F::from_integer_str(s)).collect()
}

fn parse_rows<F: FieldElement>(rows: &[Vec<String>]) -> Poseidon2Result<Vec<Vec<F>>> {
    rows.iter().map(|row| parse_row(row)).collect()
}

/// Receives a concrete instance built from a runtime configuration.
pub trait InstanceVisitor {
    /// What the visitor produces.
    type Output;

    /// Called once with the field and width resolved.
    fn visit<F: FieldElement, const T: usize>(
        self,
        instance: Poseidon2<F, T>,
    ) -> Poseidon2Result<Self::Output>;
}

/// Resolve `params.width` to a const width and build the instance.
pub fn visit_width<F: FieldElement, V: InstanceVisitor>(
    params: &Poseidon2Params<F>,
    visitor: V,
) -> Poseidon2Result<V::Output> {
    match params.width {
        2 => visitor.visit(Poseidon2::<F, 2>::new(params)?),
        3 => visitor.visit(Poseidon2::<F, 3>::new(params)?),
        4 => visitor.visit(Poseidon2::<F, 4>::new(params)?),
        8 => visitor.visit(Poseidon2::<F, 8>::new(params)?),
        12 => visitor.visit(Poseidon2::<F, 12>::new(params)?),
        16 => visitor.visit(Poseidon2::<F, 16>::new(params)?),
        20 => visitor.visit(Poseidon2::<F, 20>::new(params)?),
        24 => visitor.visit(Poseidon2::<F, 24>::new(params)?),
        0 => Err(ErrorCode::E100_ZeroWidth),
        other => Err(ErrorCode::E112_UnsupportedWidth(
            "state width".to_string(),
            other as u64,
        )),
    }
}

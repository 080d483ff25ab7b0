//! Poseidon2 CLI.
//!
//! Thin driver over the library: every command prints one JSON object,
//! `{"ok": ...}` on success or `{"err": {"code", "name", "message"}}` on
//! failure, and exits 0 or 1 accordingly. Field elements are accepted as
//! decimal or `0x` hex and printed in decimal.

use clap::{Parser, Subcommand};
use poseidon2_sponge::conformance::{CorpusRunner, TestResult};
use poseidon2_sponge::{
    ErrorCode, FieldElement, FieldName, InstanceVisitor, ParamFile, Poseidon2, Poseidon2Result,
    Preset,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "poseidon2")]
#[command(about = "Poseidon2 permutation and sponge hash", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON parameter file; takes precedence over --preset and --field
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    /// Named parameter set (minimal, reference)
    #[arg(long, global = true, default_value = "minimal")]
    preset: Preset,

    /// Prime field (bn254, bls12_381)
    #[arg(long, global = true, default_value = "bn254")]
    field: FieldName,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a preimage
    Hash {
        /// Preimage elements
        elements: Vec<String>,
        /// Number of output elements
        #[arg(long, default_value_t = 1)]
        count: usize,
    },

    /// Apply the bare permutation to a full state
    Permute {
        /// State elements, exactly one per lane
        elements: Vec<String>,
    },

    /// Apply the permutation and print every round
    Trace {
        /// State elements, exactly one per lane
        elements: Vec<String>,
    },

    /// Print the resolved parameter set
    Params,

    /// Run a known-answer vector file
    Verify {
        /// Vector file
        corpus: PathBuf,
    },
}

/// Command output plus whether the process should report success.
struct Outcome {
    value: Value,
    success: bool,
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Self {
            value,
            success: true,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(outcome) => {
            println!("{}", json!({ "ok": outcome.value }));
            if outcome.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            println!(
                "{}",
                json!({ "err": { "code": e.code(), "name": e.name(), "message": e.to_string() } })
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Poseidon2Result<Outcome> {
    if let Commands::Verify { corpus } = &cli.command {
        return verify(corpus);
    }

    let file = match &cli.params {
        Some(path) => ParamFile::load(path)?,
        None => ParamFile::preset(cli.preset, cli.field),
    };

    let value = match &cli.command {
        Commands::Hash { elements, count } => file.visit(HashCommand {
            elements,
            count: *count,
        })?,
        Commands::Permute { elements } => file.visit(PermuteCommand {
            elements,
            trace: false,
        })?,
        Commands::Trace { elements } => file.visit(PermuteCommand {
            elements,
            trace: true,
        })?,
        Commands::Params => {
            let mut summary = file.visit(ParamsCommand)?;
            summary["field"] = json!(file.field.as_str());
            summary
        }
        Commands::Verify { .. } => Value::Null,
    };
    Ok(value.into())
}

fn verify(path: &Path) -> Poseidon2Result<Outcome> {
    let runner = CorpusRunner::load(path)?;
    let results = runner.run_all()?;

    let failures: Vec<Value> = results
        .details
        .iter()
        .filter_map(|(id, result)| match result {
            TestResult::Pass => None,
            TestResult::Fail {
                expected,
                actual,
                first_diff,
            } => Some(json!({
                "id": id,
                "expected": expected,
                "actual": actual,
                "first_diff": first_diff,
            })),
            TestResult::Error { message } => Some(json!({ "id": id, "error": message })),
        })
        .collect();

    Ok(Outcome {
        value: json!({
            "name": runner.manifest().name,
            "passed": results.passed,
            "failed": results.failed,
            "errors": results.errors,
            "total": results.total(),
            "summary": results.summary(),
            "failures": failures,
        }),
        success: results.all_passed(),
    })
}

fn parse_elements<F: FieldElement>(elements: &[String]) -> Poseidon2Result<Vec<F>> {
    elements.iter().map(|e| F::from_integer_str(e)).collect()
}

fn decimals<F: FieldElement>(values: &[F]) -> Vec<String> {
    values.iter().map(FieldElement::to_decimal).collect()
}

struct HashCommand<'a> {
    elements: &'a [String],
    count: usize,
}

impl InstanceVisitor for HashCommand<'_> {
    type Output = Value;

    fn visit<F: FieldElement, const T: usize>(
        self,
        instance: Poseidon2<F, T>,
    ) -> Poseidon2Result<Value> {
        let preimage = parse_elements::<F>(self.elements)?;
        let digest = instance.hash_n(&preimage, self.count)?;
        Ok(json!({
            "preimage": decimals(&preimage),
            "digest": decimals(&digest),
        }))
    }
}

struct PermuteCommand<'a> {
    elements: &'a [String],
    trace: bool,
}

impl InstanceVisitor for PermuteCommand<'_> {
    type Output = Value;

    fn visit<F: FieldElement, const T: usize>(
        self,
        instance: Poseidon2<F, T>,
    ) -> Poseidon2Result<Value> {
        let input = parse_elements::<F>(self.elements)?;
        let state = <[F; T]>::try_from(input.as_slice())
            .map_err(|_| ErrorCode::E111_WidthMismatch(input.len() as u64, T as u64))?;

        if !self.trace {
            let output = instance.permute(&state);
            return Ok(json!({ "input": decimals(&state), "output": decimals(&output) }));
        }

        let (output, trace) = instance.permutation().permute_with_trace(&state);
        let rounds: Vec<Value> = trace
            .iter()
            .map(|round| {
                json!({
                    "index": round.index,
                    "kind": round.kind.as_str(),
                    "after_constants": decimals(&round.after_constants),
                    "after_sbox": decimals(&round.after_sbox),
                    "output": decimals(&round.output),
                })
            })
            .collect();
        Ok(json!({
            "input": decimals(&state),
            "rounds": rounds,
            "output": decimals(&output),
        }))
    }
}

struct ParamsCommand;

impl InstanceVisitor for ParamsCommand {
    type Output = Value;

    fn visit<F: FieldElement, const T: usize>(
        self,
        instance: Poseidon2<F, T>,
    ) -> Poseidon2Result<Value> {
        let permutation = instance.permutation();
        let config = instance.config();
        let linear = permutation.linear();
        Ok(json!({
            "modulus": F::modulus().to_str_radix(10),
            "width": T,
            "rate": config.rate(),
            "capacity": config.capacity(),
            "full_rounds": permutation.full_rounds(),
            "partial_rounds": permutation.partial_rounds(),
            "sbox": permutation.sbox_exponent(),
            "initial_linear_layer": permutation.has_initial_linear_layer(),
            "domain_tag": config.domain_tag().to_decimal(),
            "padding": config.padding(),
            "constants_fingerprint": hex::encode(permutation.constants().fingerprint()),
            "external_matrix": linear
                .external()
                .matrix()
                .rows()
                .iter()
                .map(|row| decimals(row))
                .collect::<Vec<_>>(),
            "internal_diagonal": linear.internal().map(|internal| decimals(internal.diagonal())),
        }))
    }
}

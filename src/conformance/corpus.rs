//! Known-answer vector files.
//!
//! A vector file pairs one parameter set with literal inputs and expected
//! outputs:
//!
//! ```json
//! {
//!   "manifest": { "name": "bn254-minimal", "description": "...", "constants_fingerprint": "..." },
//!   "params": { ...ParamFile... },
//!   "vectors": [
//!     { "id": "hash-1", "op": "hash", "input": ["1"], "expected": { "ok": ["1735..."] } },
//!     { "id": "empty", "op": "hash", "input": [], "expected": { "err": { "code": 200 } } }
//!   ]
//! }
//! ```
//!
//! Inputs and outputs are decimal or `0x` hex integers. A second
//! implementation that reproduces a file's outputs uses the same round
//! schedule, constants and matrices as this crate.

use crate::config::{InstanceVisitor, ParamFile};
use crate::error::{ErrorCode, Poseidon2Result};
use crate::field::FieldElement;
use crate::poseidon::Poseidon2;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Vector file metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusManifest {
    /// Short name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Hex SHA-256 fingerprint of the round constants, checked when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constants_fingerprint: Option<String>,
}

/// Operation a vector exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// `hash(input)`, one output element.
    Hash,
    /// `hash_n(input, count)`.
    HashN,
    /// `permute(input)`, input is a full state.
    Permute,
}

/// Expected outcome of a vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expected {
    /// Output elements.
    Ok(Vec<String>),
    /// Error code.
    Err {
        /// Numeric error code.
        code: u32,
    },
}

/// A single test vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestVector {
    /// Identifier, unique within the file.
    pub id: String,
    /// Operation to run.
    pub op: Op,
    /// Input elements.
    pub input: Vec<String>,
    /// Output count for `hash_n`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Expected result.
    pub expected: Expected,
}

/// A parameter set plus its vectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    /// Corpus metadata.
    pub manifest: CorpusManifest,
    /// Parameters every vector runs under.
    pub params: ParamFile,
    /// List of test vectors.
    pub vectors: Vec<TestVector>,
}

/// Outcome of one vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    /// Test passed.
    Pass,
    /// Output differs from the expected value.
    Fail {
        /// Rendered expectation.
        expected: String,
        /// Rendered output of this crate.
        actual: String,
        /// First differing output index, when both sides produced outputs.
        first_diff: Option<usize>,
    },
    /// The vector itself is malformed.
    Error {
        /// Error message.
        message: String,
    },
}

impl TestResult {
    /// Output matched.
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Output differed.
    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail { .. })
    }
}

/// Tally of a corpus run.
#[derive(Debug, Default)]
pub struct CorpusResults {
    /// Matching vectors.
    pub passed: usize,
    /// Mismatching vectors.
    pub failed: usize,
    /// Malformed vectors.
    pub errors: usize,
    /// Per-vector outcomes in file order.
    pub details: Vec<(String, TestResult)>,
}

impl CorpusResults {
    /// Empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one outcome.
    pub fn record(&mut self, id: &str, result: TestResult) {
        match &result {
            TestResult::Pass => self.passed += 1,
            TestResult::Fail { .. } => self.failed += 1,
            TestResult::Error { .. } => self.errors += 1,
        }
        self.details.push((id.to_string(), result));
    }

    /// Vectors run, including the fingerprint check.
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errors
    }

    /// No mismatches and no malformed vectors.
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }

    /// One-line tally.
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} errors (total: {})",
            self.passed,
            self.failed,
            self.errors,
            self.total()
        )
    }

    /// Mismatches only.
    pub fn failures(&self) -> Vec<&(String, TestResult)> {
        self.details.iter().filter(|(_, r)| r.is_fail()).collect()
    }

    /// Malformed vectors only.
    pub fn error_details(&self) -> Vec<&(String, TestResult)> {
        self.details
            .iter()
            .filter(|(_, r)| matches!(r, TestResult::Error { .. }))
            .collect()
    }
}

/// Runs a vector file against this crate.
pub struct CorpusRunner {
    corpus: Corpus,
}

impl CorpusRunner {
    /// Load a corpus from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> Poseidon2Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ErrorCode::E300_InvalidParamFile(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse a corpus from JSON text.
    pub fn from_json(text: &str) -> Poseidon2Result<Self> {
        let corpus: Corpus = serde_json::from_str(text)
            .map_err(|e| ErrorCode::E300_InvalidParamFile(e.to_string()))?;
        Ok(Self::new(corpus))
    }

    /// Wrap an in-memory corpus.
    pub fn new(corpus: Corpus) -> Self {
        Self { corpus }
    }

    /// File metadata.
    pub fn manifest(&self) -> &CorpusManifest {
        &self.corpus.manifest
    }

    /// Number of vectors, not counting the fingerprint check.
    pub fn vector_count(&self) -> usize {
        self.corpus.vectors.len()
    }

    /// Run all test vectors.
    ///
    /// Fails only when the corpus parameters cannot be built; individual
    /// vector problems are recorded in the results.
    pub fn run_all(&self) -> Poseidon2Result<CorpusResults> {
        debug!(
            "running corpus {} ({} vectors)",
            self.corpus.manifest.name,
            self.corpus.vectors.len()
        );
        self.corpus.params.visit(RunVectors {
            corpus: &self.corpus,
        })
    }
}

struct RunVectors<'a> {
    corpus: &'a Corpus,
}

impl InstanceVisitor for RunVectors<'_> {
    type Output = CorpusResults;

    fn visit<F: FieldElement, const T: usize>(
        self,
        instance: Poseidon2<F, T>,
    ) -> Poseidon2Result<CorpusResults> {
        let mut results = CorpusResults::new();

        if let Some(expected) = &self.corpus.manifest.constants_fingerprint {
            let actual = hex::encode(instance.permutation().constants().fingerprint());
            let result = if expected.eq_ignore_ascii_case(&actual) {
                TestResult::Pass
            } else {
                TestResult::Fail {
                    expected: expected.clone(),
                    actual,
                    first_diff: None,
                }
            };
            results.record("constants_fingerprint", result);
        }

        for vector in &self.corpus.vectors {
            let result = run_vector(&instance, vector);
            match &result {
                TestResult::Pass => trace!("{}: pass", vector.id),
                TestResult::Fail {
                    expected, actual, ..
                } => warn!("{}: expected {} got {}", vector.id, expected, actual),
                TestResult::Error { message } => warn!("{}: {}", vector.id, message),
            }
            results.record(&vector.id, result);
        }

        Ok(results)
    }
}

fn run_vector<F: FieldElement, const T: usize>(
    instance: &Poseidon2<F, T>,
    vector: &TestVector,
) -> TestResult {
    let input = match parse_elements::<F>(&vector.input) {
        Ok(input) => input,
        Err(e) => {
            return TestResult::Error {
                message: format!("bad input: {}", e),
            }
        }
    };

    let actual = match vector.op {
        Op::Hash => instance.hash(&input).map(|h| vec![h]),
        Op::HashN => match vector.count {
            Some(count) => instance.hash_n(&input, count),
            None => {
                return TestResult::Error {
                    message: "hash_n vector without count".to_string(),
                }
            }
        },
        Op::Permute => match <[F; T]>::try_from(input.as_slice()) {
            Ok(state) => Ok(instance.permute(&state).to_vec()),
            Err(_) => {
                return TestResult::Error {
                    message: format!("permute input has {} elements, state has {}", input.len(), T),
                }
            }
        },
    };

    compare(&vector.expected, actual)
}

fn compare<F: FieldElement>(expected: &Expected, actual: Poseidon2Result<Vec<F>>) -> TestResult {
    match (expected, actual) {
        (Expected::Ok(want), Ok(got)) => {
            let want = match parse_elements::<F>(want) {
                Ok(want) => want,
                Err(e) => {
                    return TestResult::Error {
                        message: format!("bad expected value: {}", e),
                    }
                }
            };
            if want == got {
                return TestResult::Pass;
            }
            let first_diff = want.iter().zip(got.iter()).position(|(a, b)| a != b);
            TestResult::Fail {
                expected: render(&want),
                actual: render(&got),
                first_diff: first_diff.or(Some(want.len().min(got.len()))),
            }
        }
        (Expected::Ok(want), Err(e)) => TestResult::Fail {
            expected: format!("ok: [{}]", want.join(", ")),
            actual: format!("err: {}", e),
            first_diff: None,
        },
        (Expected::Err { code }, Ok(got)) => TestResult::Fail {
            expected: format!("E{}", code),
            actual: format!("ok: {}", render(&got)),
            first_diff: None,
        },
        (Expected::Err { code }, Err(e)) => {
            if e.code() == *code {
                TestResult::Pass
            } else {
                TestResult::Fail {
                    expected: format!("E{}", code),
                    actual: format!("E{}", e.code()),
                    first_diff: None,
                }
            }
        }
    }
}

fn parse_elements<F: FieldElement>(values: &[String]) -> Poseidon2Result<Vec<F>> {
    values.iter().map(|v| F::from_integer_str(v)).collect()
}

fn render<F: FieldElement>(values: &[F]) -> String {
    let parts: Vec<String> = values.iter().map(FieldElement::to_decimal).collect();
    format!("[{}]", parts.join(", "))
}

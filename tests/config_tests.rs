//! Parameter file tests.
//!
//! Loading from disk, the shipped example files, and runtime dispatch to a
//! concrete field and width.

use poseidon2_sponge::config::{ConstantsEntry, DiagonalEntry, MatrixEntry};
use poseidon2_sponge::{
    instances, Bls12Fr, Bn254Fr, ErrorCode, FieldElement, FieldName, InstanceVisitor, ParamFile,
    Poseidon2, Poseidon2Result, Preset,
};
use std::io::Write;
use std::path::Path;

/// Hashes `[1, 2, 3]` and reports the width it ran at.
struct HashOneTwoThree;

impl InstanceVisitor for HashOneTwoThree {
    type Output = (usize, String);

    fn visit<F: FieldElement, const T: usize>(
        self,
        instance: Poseidon2<F, T>,
    ) -> Poseidon2Result<(usize, String)> {
        let input = [F::from(1u64), F::from(2u64), F::from(3u64)];
        Ok((T, instance.hash(&input)?.to_decimal()))
    }
}

fn shipped(name: &str) -> ParamFile {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("params").join(name);
    ParamFile::load(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
}

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

// ============================================================================
// Shipped parameter files
// ============================================================================

#[test]
fn shipped_minimal_matches_preset() {
    assert_eq!(
        shipped("bn254_minimal.json"),
        ParamFile::preset(Preset::Minimal, FieldName::Bn254)
    );
}

#[test]
fn shipped_reference_matches_preset() {
    let file = shipped("bn254_reference.json");
    assert_eq!(
        file.to_params::<Bn254Fr>().unwrap(),
        Preset::Reference.params::<Bn254Fr>()
    );
    assert_eq!(
        file.visit(HashOneTwoThree).unwrap(),
        (
            3,
            "19705930615138258157904484607065182127689008699104245151918243642302709178593"
                .to_string()
        )
    );
}

#[test]
fn reference_round_count_follows_field() {
    assert_eq!(Preset::Reference.params::<Bn254Fr>().partial_rounds, 56);
    assert_eq!(Preset::Reference.params::<Bls12Fr>().partial_rounds, 57);
    assert_eq!(
        ParamFile::preset(Preset::Reference, FieldName::Bls12_381).partial_rounds,
        57
    );

    let bls = instances::bls12_reference().unwrap();
    assert_eq!(bls.permutation().partial_rounds(), 57);
    assert_eq!(bls.permutation().constants().len(), 65);
    assert_eq!(
        Preset::Reference.params::<Bls12Fr>(),
        ParamFile::preset(Preset::Reference, FieldName::Bls12_381)
            .to_params::<Bls12Fr>()
            .unwrap()
    );
}

#[test]
fn shipped_seeded_width_four() {
    let file = shipped("bn254_seeded_t4.json");
    assert!(matches!(file.round_constants, ConstantsEntry::Seeded { .. }));
    assert_eq!(file.external_matrix, MatrixEntry::Poseidon2);
    assert!(matches!(file.internal_diagonal, DiagonalEntry::Literal { .. }));
    assert_eq!(
        file.visit(HashOneTwoThree).unwrap(),
        (
            4,
            "5064354260134048807278955386831199493520804524569880047384558694170196256957"
                .to_string()
        )
    );
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn load_round_trips_through_disk() {
    let original = ParamFile::preset(Preset::Reference, FieldName::Bls12_381);
    let tmp = write_temp(&original.to_json().unwrap());
    assert_eq!(ParamFile::load(tmp.path()).unwrap(), original);
}

#[test]
fn missing_file_is_e300() {
    let dir = tempfile::tempdir().unwrap();
    let err = ParamFile::load(dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.code(), 300);
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn malformed_json_is_e300() {
    let tmp = write_temp("{ \"field\": \"bn254\", ");
    assert_eq!(ParamFile::load(tmp.path()).unwrap_err().code(), 300);
}

#[test]
fn unknown_field_name_rejected() {
    let tmp = write_temp(
        r#"{"field":"goldilocks","width":3,"rate":1,"capacity":2,"full_rounds":8,
            "partial_rounds":0,"padding":"zero_fill","round_constants":{"source":"grain"},
            "external_matrix":{"source":"poseidon2"}}"#,
    );
    assert_eq!(ParamFile::load(tmp.path()).unwrap_err().code(), 300);
}

#[test]
fn declared_modulus_mismatch_is_e301() {
    let mut file = ParamFile::preset(Preset::Minimal, FieldName::Bls12_381);
    file.modulus = Some(FieldName::Bn254.modulus_decimal().to_string());
    let tmp = write_temp(&file.to_json().unwrap());

    let loaded = ParamFile::load(tmp.path()).unwrap();
    let err = loaded.visit(HashOneTwoThree).unwrap_err();
    assert!(matches!(err, ErrorCode::E301_ModulusMismatch(_, _)));
}

// ============================================================================
// Dispatch errors
// ============================================================================

#[test]
fn configuration_errors_surface_at_visit() {
    let mut file = ParamFile::preset(Preset::Reference, FieldName::Bn254);
    file.width = 5;
    file.rate = 4;
    assert_eq!(file.visit(HashOneTwoThree).unwrap_err().code(), 112);

    let mut file = ParamFile::preset(Preset::Reference, FieldName::Bn254);
    file.full_rounds = 7;
    assert_eq!(
        file.visit(HashOneTwoThree).unwrap_err(),
        ErrorCode::E104_OddFullRounds(7)
    );

    let mut file = ParamFile::preset(Preset::Minimal, FieldName::Bn254);
    file.round_constants = ConstantsEntry::Literal {
        rows: vec![vec!["1".to_string(); 3]; 7],
    };
    assert_eq!(
        file.visit(HashOneTwoThree).unwrap_err(),
        ErrorCode::E107_RoundConstantsLength(8, 7)
    );

    let mut file = ParamFile::preset(Preset::Minimal, FieldName::Bn254);
    file.domain_tag = "not-a-number".to_string();
    assert_eq!(file.visit(HashOneTwoThree).unwrap_err().code(), 201);
}

#[test]
fn errors_are_configuration_errors() {
    let mut file = ParamFile::preset(Preset::Minimal, FieldName::Bn254);
    file.sbox = 3;
    let err = file.visit(HashOneTwoThree).unwrap_err();
    assert!(err.is_configuration(), "{} is a configuration error", err);
}

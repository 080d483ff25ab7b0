//! Error codes for the Poseidon2 core.
//!
//! Every failure is a caller mistake surfaced at construction or parse time.
//! Codes are grouped by range:
//!
//! - `E1xx` configuration errors (bad dimensions, rate/capacity, rounds, matrices)
//! - `E2xx` input and encoding errors
//! - `E3xx` parameter file errors
//!
//! Numeric codes are stable and are what the CLI prints, so a front end can
//! match on them without parsing messages.

use thiserror::Error;

/// All error codes produced by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[allow(non_camel_case_types)]
pub enum ErrorCode {
    /// State width is zero (code 100)
    #[error("E100_ZeroWidth")]
    E100_ZeroWidth,

    /// Rate is zero (code 101)
    #[error("E101_ZeroRate")]
    E101_ZeroRate,

    /// Capacity is zero (code 102)
    #[error("E102_ZeroCapacity")]
    E102_ZeroCapacity,

    /// rate + capacity does not equal the width (code 103)
    #[error("E103_RateCapacityMismatch(rate={0}, capacity={1}, width={2})")]
    E103_RateCapacityMismatch(/* rate */ u64, /* capacity */ u64, /* width */ u64),

    /// Full round count must be even when partial rounds are present (code 104)
    #[error("E104_OddFullRounds({0})")]
    E104_OddFullRounds(/* count */ u64),

    /// The schedule has no rounds at all (code 105)
    #[error("E105_NoRounds")]
    E105_NoRounds,

    /// S-box exponent is not a permutation of the field (code 106)
    #[error("E106_InvalidSboxExponent({0})")]
    E106_InvalidSboxExponent(/* alpha */ u64),

    /// Round constant table has the wrong number of rows (code 107)
    #[error("E107_RoundConstantsLength(expected={0}, got={1})")]
    E107_RoundConstantsLength(/* expected */ u64, /* got */ u64),

    /// A round constant row has the wrong width (code 108)
    #[error("E108_RoundConstantsWidth(round={0}, got={1})")]
    E108_RoundConstantsWidth(/* index */ u64, /* length */ u64),

    /// Matrix or diagonal has the wrong dimension (code 109)
    #[error("E109_MatrixDimension({0}, got={1})")]
    E109_MatrixDimension(/* context */ String, /* length */ u64),

    /// Linear layer matrix has zero determinant (code 110)
    #[error("E110_SingularMatrix({0})")]
    E110_SingularMatrix(/* context */ String),

    /// Configured width differs from the compiled state width (code 111)
    #[error("E111_WidthMismatch(configured={0}, state={1})")]
    E111_WidthMismatch(/* configured */ u64, /* state */ u64),

    /// No generated layer exists for this width (code 112)
    #[error("E112_UnsupportedWidth({0}, width={1})")]
    E112_UnsupportedWidth(/* context */ String, /* width */ u64),

    /// Zero-fill padding with rate > 1 lets distinct preimages collide (code 113)
    #[error("E113_AmbiguousPadding(rate={0})")]
    E113_AmbiguousPadding(/* rate */ u64),

    /// Zero output elements requested (code 114)
    #[error("E114_ZeroOutputLength")]
    E114_ZeroOutputLength,

    /// Zero-fill sponge finalized without absorbing anything (code 200)
    #[error("E200_EmptyPreimage")]
    E200_EmptyPreimage,

    /// Integer text is not decimal or 0x-hex (code 201)
    #[error("E201_InvalidInteger({0})")]
    E201_InvalidInteger(/* value */ String),

    /// Hex text is malformed (code 202)
    #[error("E202_InvalidHex")]
    E202_InvalidHex,

    /// Byte encoding has the wrong length (code 203)
    #[error("E203_WrongLength(expected={0}, got={1})")]
    E203_WrongLength(/* expected */ String, /* got */ u64),

    /// Encoded value is not below the modulus (code 204)
    #[error("E204_NonCanonicalEncoding({0})")]
    E204_NonCanonicalEncoding(/* value */ String),

    /// Parameter or vector file could not be read or parsed (code 300)
    #[error("E300_InvalidParamFile({0})")]
    E300_InvalidParamFile(/* reason */ String),

    /// Parameter file modulus differs from the selected field (code 301)
    #[error("E301_ModulusMismatch(expected={0}, got={1})")]
    E301_ModulusMismatch(/* expected */ String, /* got */ String),

    /// Unknown field or preset name (code 302)
    #[error("E302_UnknownName({0})")]
    E302_UnknownName(/* value */ String),
}

impl ErrorCode {
    /// Get the numeric error code.
    pub fn code(&self) -> u32 {
        match self {
            ErrorCode::E100_ZeroWidth => 100,
            ErrorCode::E101_ZeroRate => 101,
            ErrorCode::E102_ZeroCapacity => 102,
            ErrorCode::E103_RateCapacityMismatch(_, _, _) => 103,
            ErrorCode::E104_OddFullRounds(_) => 104,
            ErrorCode::E105_NoRounds => 105,
            ErrorCode::E106_InvalidSboxExponent(_) => 106,
            ErrorCode::E107_RoundConstantsLength(_, _) => 107,
            ErrorCode::E108_RoundConstantsWidth(_, _) => 108,
            ErrorCode::E109_MatrixDimension(_, _) => 109,
            ErrorCode::E110_SingularMatrix(_) => 110,
            ErrorCode::E111_WidthMismatch(_, _) => 111,
            ErrorCode::E112_UnsupportedWidth(_, _) => 112,
            ErrorCode::E113_AmbiguousPadding(_) => 113,
            ErrorCode::E114_ZeroOutputLength => 114,
            ErrorCode::E200_EmptyPreimage => 200,
            ErrorCode::E201_InvalidInteger(_) => 201,
            ErrorCode::E202_InvalidHex => 202,
            ErrorCode::E203_WrongLength(_, _) => 203,
            ErrorCode::E204_NonCanonicalEncoding(_) => 204,
            ErrorCode::E300_InvalidParamFile(_) => 300,
            ErrorCode::E301_ModulusMismatch(_, _) => 301,
            ErrorCode::E302_UnknownName(_) => 302,
        }
    }

    /// Get the error name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::E100_ZeroWidth => "E100_ZeroWidth",
            ErrorCode::E101_ZeroRate => "E101_ZeroRate",
            ErrorCode::E102_ZeroCapacity => "E102_ZeroCapacity",
            ErrorCode::E103_RateCapacityMismatch(_, _, _) => "E103_RateCapacityMismatch",
            ErrorCode::E104_OddFullRounds(_) => "E104_OddFullRounds",
            ErrorCode::E105_NoRounds => "E105_NoRounds",
            ErrorCode::E106_InvalidSboxExponent(_) => "E106_InvalidSboxExponent",
            ErrorCode::E107_RoundConstantsLength(_, _) => "E107_RoundConstantsLength",
            ErrorCode::E108_RoundConstantsWidth(_, _) => "E108_RoundConstantsWidth",
            ErrorCode::E109_MatrixDimension(_, _) => "E109_MatrixDimension",
            ErrorCode::E110_SingularMatrix(_) => "E110_SingularMatrix",
            ErrorCode::E111_WidthMismatch(_, _) => "E111_WidthMismatch",
            ErrorCode::E112_UnsupportedWidth(_, _) => "E112_UnsupportedWidth",
            ErrorCode::E113_AmbiguousPadding(_) => "E113_AmbiguousPadding",
            ErrorCode::E114_ZeroOutputLength => "E114_ZeroOutputLength",
            ErrorCode::E200_EmptyPreimage => "E200_EmptyPreimage",
            ErrorCode::E201_InvalidInteger(_) => "E201_InvalidInteger",
            ErrorCode::E202_InvalidHex => "E202_InvalidHex",
            ErrorCode::E203_WrongLength(_, _) => "E203_WrongLength",
            ErrorCode::E204_NonCanonicalEncoding(_) => "E204_NonCanonicalEncoding",
            ErrorCode::E300_InvalidParamFile(_) => "E300_InvalidParamFile",
            ErrorCode::E301_ModulusMismatch(_, _) => "E301_ModulusMismatch",
            ErrorCode::E302_UnknownName(_) => "E302_UnknownName",
        }
    }

    /// True for configuration errors: fatal, detected before any hashing.
    pub fn is_configuration(&self) -> bool {
        (100..200).contains(&self.code())
    }
}

/// Result type for Poseidon2 operations.
pub type Poseidon2Result<T> = Result<T, ErrorCode>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_names() {
        let errors = [
            ErrorCode::E100_ZeroWidth,
            ErrorCode::E103_RateCapacityMismatch(2, 2, 3),
            ErrorCode::E113_AmbiguousPadding(2),
            ErrorCode::E204_NonCanonicalEncoding("ff".to_string()),
            ErrorCode::E302_UnknownName("goldilocks".to_string()),
        ];
        for err in errors {
            let digits = &err.name()[1..4];
            assert_eq!(digits.parse::<u32>().unwrap(), err.code());
        }
    }

    #[test]
    fn test_configuration_classifier() {
        assert!(ErrorCode::E102_ZeroCapacity.is_configuration());
        assert!(ErrorCode::E114_ZeroOutputLength.is_configuration());
        assert!(!ErrorCode::E200_EmptyPreimage.is_configuration());
        assert!(!ErrorCode::E301_ModulusMismatch("1".into(), "2".into()).is_configuration());
    }

    #[test]
    fn test_display_carries_parameters() {
        let err = ErrorCode::E103_RateCapacityMismatch(2, 2, 3);
        assert_eq!(
            err.to_string(),
            "E103_RateCapacityMismatch(rate=2, capacity=2, width=3)"
        );
    }
}

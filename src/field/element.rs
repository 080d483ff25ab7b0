//! Prime field element operations shared by every field the core runs over.
//!
//! `FieldElement` is blanket-implemented for all `ff::PrimeField` types, so
//! the modulus is chosen by the type parameter rather than hard-wired. The
//! trait adds what the permutation and its callers need on top of `ff`:
//! arbitrary-precision construction with reduction, strict canonical
//! encodings, and a public-exponent power for the S-box.

use crate::error::{ErrorCode, Poseidon2Result};
use ff::PrimeField;
use num_bigint::BigUint;

/// Arithmetic and encoding helpers for a residue modulo a prime `p`.
///
/// Addition, subtraction, multiplication and equality come from `ff`; all
/// of them reduce into `[0, p)` before a value can be observed.
pub trait FieldElement: PrimeField {
    /// The field modulus `p`.
    fn modulus() -> BigUint {
        (-Self::ONE).to_biguint() + 1u32
    }

    /// Length in bytes of a canonical encoding.
    fn byte_len() -> usize {
        (Self::NUM_BITS as usize + 7) / 8
    }

    /// Build an element from an arbitrary-precision integer, reducing mod `p`.
    fn from_biguint(value: &BigUint) -> Self {
        let radix = Self::from_u128(1u128 << 64);
        value
            .to_u64_digits()
            .iter()
            .rev()
            .fold(Self::ZERO, |acc, &limb| acc * radix + Self::from(limb))
    }

    /// Parse decimal or `0x`-prefixed hex text of any length, reducing mod `p`.
    fn from_integer_str(text: &str) -> Poseidon2Result<Self> {
        parse_integer(text).map(|value| Self::from_biguint(&value))
    }

    /// The canonical integer in `[0, p)`.
    fn to_biguint(&self) -> BigUint {
        let repr = self.to_repr();
        if repr_is_little_endian::<Self>() {
            BigUint::from_bytes_le(repr.as_ref())
        } else {
            BigUint::from_bytes_be(repr.as_ref())
        }
    }

    /// Canonical decimal representation.
    fn to_decimal(&self) -> String {
        self.to_biguint().to_str_radix(10)
    }

    /// Canonical little-endian encoding, exactly [`byte_len`](Self::byte_len) bytes.
    fn to_canonical_le(&self) -> Vec<u8> {
        let mut bytes = self.to_biguint().to_bytes_le();
        bytes.resize(Self::byte_len(), 0);
        bytes
    }

    /// Canonical big-endian encoding, exactly [`byte_len`](Self::byte_len) bytes.
    fn to_canonical_be(&self) -> Vec<u8> {
        let mut bytes = self.to_canonical_le();
        bytes.reverse();
        bytes
    }

    /// Decode a canonical little-endian encoding.
    ///
    /// Unlike [`from_biguint`](Self::from_biguint) this rejects values `>= p`,
    /// so every element has exactly one accepted encoding.
    fn from_canonical_le(bytes: &[u8]) -> Poseidon2Result<Self> {
        if bytes.len() != Self::byte_len() {
            return Err(ErrorCode::E203_WrongLength(
                Self::byte_len().to_string(),
                bytes.len() as u64,
            ));
        }
        let value = BigUint::from_bytes_le(bytes);
        if value >= Self::modulus() {
            return Err(ErrorCode::E204_NonCanonicalEncoding(hex::encode(bytes)));
        }
        Ok(Self::from_biguint(&value))
    }

    /// Decode a canonical big-endian encoding.
    fn from_canonical_be(bytes: &[u8]) -> Poseidon2Result<Self> {
        let mut le = bytes.to_vec();
        le.reverse();
        Self::from_canonical_le(&le)
    }

    /// `0x`-prefixed big-endian hex, zero-padded to the full encoding width.
    fn to_hex_be(&self) -> String {
        format!("0x{}", hex::encode(self.to_canonical_be()))
    }

    /// Parse big-endian hex (`0x` optional, leading zeros optional).
    ///
    /// The value must already be canonical.
    fn from_hex_be(text: &str) -> Poseidon2Result<Self> {
        let digits = strip_hex_prefix(text.trim()).unwrap_or_else(|| text.trim());
        if digits.is_empty() {
            return Err(ErrorCode::E202_InvalidHex);
        }
        let padded = if digits.len() % 2 == 1 {
            format!("0{}", digits)
        } else {
            digits.to_string()
        };
        let bytes = hex::decode(padded).map_err(|_| ErrorCode::E202_InvalidHex)?;
        if bytes.len() > Self::byte_len() {
            return Err(ErrorCode::E203_WrongLength(
                Self::byte_len().to_string(),
                bytes.len() as u64,
            ));
        }
        let mut be = vec![0u8; Self::byte_len() - bytes.len()];
        be.extend_from_slice(&bytes);
        Self::from_canonical_be(&be)
    }

    /// `self^exponent` by square-and-multiply.
    ///
    /// The operation sequence depends only on the (public) exponent.
    fn power(&self, exponent: u64) -> Self {
        let mut result = Self::ONE;
        for bit in (0..u64::BITS - exponent.leading_zeros()).rev() {
            result = result.square();
            if (exponent >> bit) & 1 == 1 {
                result *= self;
            }
        }
        result
    }

    /// Multiplicative inverse, `None` for zero.
    fn inverse(&self) -> Option<Self> {
        Option::from(self.invert())
    }
}

impl<F: PrimeField> FieldElement for F {}

/// Parse a non-negative integer written in decimal or `0x` hex.
pub fn parse_integer(text: &str) -> Poseidon2Result<BigUint> {
    let text = text.trim();
    let invalid = || ErrorCode::E201_InvalidInteger(text.to_string());

    let (digits, radix) = match strip_hex_prefix(text) {
        Some(hex_digits) => (hex_digits, 16),
        None => (text, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }
    BigUint::parse_bytes(digits.as_bytes(), radix).ok_or_else(invalid)
}

fn strip_hex_prefix(text: &str) -> Option<&str> {
    text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
}

/// `ff` leaves the byte order of `Repr` to each field; detect it from ONE.
fn repr_is_little_endian<F: PrimeField>() -> bool {
    F::ONE.to_repr().as_ref().first() == Some(&1)
}

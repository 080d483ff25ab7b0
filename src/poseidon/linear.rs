//! Linear diffusion layers.
//!
//! Full rounds use a dense `T x T` external matrix. Partial rounds use the
//! Poseidon2 internal matrix `J + diag(d)` (`J` the all-ones matrix), which
//! costs one sum and `T` multiplications instead of `T^2`.
//!
//! Both layers are checked for full rank when built, so a layer that exists
//! is invertible.

use super::params::{DiagonalSource, MatrixSource};
use crate::error::{ErrorCode, Poseidon2Result};
use crate::field::FieldElement;

/// The 4x4 block of the Poseidon2 external matrix.
const M4: [[u64; 4]; 4] = [[5, 7, 1, 3], [4, 6, 1, 1], [1, 3, 5, 7], [1, 1, 4, 6]];

/// Square matrix over `F`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix<F, const T: usize> {
    rows: [[F; T]; T],
}

impl<F: FieldElement, const T: usize> Matrix<F, T> {
    /// Wrap a fixed-size array of rows.
    pub fn new(rows: [[F; T]; T]) -> Self {
        Self { rows }
    }

    /// Build from runtime rows, checking every dimension.
    pub fn from_rows(context: &str, rows: &[Vec<F>]) -> Poseidon2Result<Self> {
        if rows.len() != T {
            return Err(ErrorCode::E109_MatrixDimension(
                context.to_string(),
                rows.len() as u64,
            ));
        }
        let mut out = [[F::ZERO; T]; T];
        for (dst, src) in out.iter_mut().zip(rows) {
            *dst = <[F; T]>::try_from(src.as_slice()).map_err(|_| {
                ErrorCode::E109_MatrixDimension(context.to_string(), src.len() as u64)
            })?;
        }
        Ok(Self { rows: out })
    }

    /// Circulant matrix whose row `i` is `first_row` rotated right by `i`.
    pub fn circulant(first_row: &[F; T]) -> Self {
        let mut rows = [[F::ZERO; T]; T];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                *entry = first_row[(j + T - i) % T];
            }
        }
        Self { rows }
    }

    /// `J + diag(diagonal)`.
    pub fn ones_plus_diagonal(diagonal: &[F; T]) -> Self {
        let mut rows = [[F::ONE; T]; T];
        for (i, row) in rows.iter_mut().enumerate() {
            row[i] += diagonal[i];
        }
        Self { rows }
    }

    /// Rows of the matrix.
    pub fn rows(&self) -> &[[F; T]; T] {
        &self.rows
    }

    /// `M * v`.
    pub fn mul_vec(&self, v: &[F; T]) -> [F; T] {
        let mut out = [F::ZERO; T];
        for (dst, row) in out.iter_mut().zip(self.rows.iter()) {
            *dst = row.iter().zip(v.iter()).fold(F::ZERO, |acc, (m, x)| acc + *m * x);
        }
        out
    }

    /// Determinant by Gaussian elimination.
    pub fn determinant(&self) -> F {
        determinant(self.rows.iter().map(|row| row.to_vec()).collect())
    }

    /// Non-zero determinant.
    pub fn is_invertible(&self) -> bool {
        self.determinant() != F::ZERO
    }

    /// Every square submatrix is non-singular.
    ///
    /// Exhaustive over row and column subsets, so only practical for small
    /// widths.
    pub fn is_mds(&self) -> bool {
        let Some(limit) = 1u64.checked_shl(T as u32) else {
            return false;
        };
        for row_mask in 1..limit {
            let size = row_mask.count_ones();
            for col_mask in (1..limit).filter(|m| m.count_ones() == size) {
                let sub: Vec<Vec<F>> = (0..T)
                    .filter(|i| row_mask >> i & 1 == 1)
                    .map(|i| {
                        (0..T)
                            .filter(|j| col_mask >> j & 1 == 1)
                            .map(|j| self.rows[i][j])
                            .collect::<Vec<F>>()
                    })
                    .collect();
                if determinant(sub) == F::ZERO {
                    return false;
                }
            }
        }
        true
    }
}

fn determinant<F: FieldElement>(mut m: Vec<Vec<F>>) -> F {
    let n = m.len();
    let mut det = F::ONE;
    for col in 0..n {
        let Some(pivot) = (col..n).find(|&r| m[r][col] != F::ZERO) else {
            return F::ZERO;
        };
        if pivot != col {
            m.swap(pivot, col);
            det = -det;
        }
        let pivot_value = m[col][col];
        det *= pivot_value;
        let Some(inv) = pivot_value.inverse() else {
            return F::ZERO;
        };
        for row in col + 1..n {
            let factor = m[row][col] * inv;
            if factor == F::ZERO {
                continue;
            }
            for k in col..n {
                let above = m[col][k];
                m[row][k] -= factor * above;
            }
        }
    }
    det
}

/// Dense layer used by full rounds and the optional initial mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLayer<F, const T: usize> {
    matrix: Matrix<F, T>,
}

impl<F: FieldElement, const T: usize> ExternalLayer<F, T> {
    /// Use `matrix`, rejecting singular ones.
    pub fn new(matrix: Matrix<F, T>) -> Poseidon2Result<Self> {
        if !matrix.is_invertible() {
            return Err(ErrorCode::E110_SingularMatrix("external matrix".to_string()));
        }
        Ok(Self { matrix })
    }

    /// The generated Poseidon2 external matrix.
    ///
    /// `circ(2, 1)` and `circ(2, 1, 1)` for widths 2 and 3, `M4` for width
    /// 4, and for widths 8 to 24 the block matrix with `2 * M4` on the
    /// diagonal blocks and `M4` elsewhere.
    pub fn poseidon2() -> Poseidon2Result<Self> {
        let two = F::from(2u64);
        let matrix = match T {
            2 | 3 => {
                let mut first_row = [F::ONE; T];
                first_row[0] = two;
                Matrix::circulant(&first_row)
            }
            4 | 8 | 12 | 16 | 20 | 24 => {
                let mut rows = [[F::ZERO; T]; T];
                for (i, row) in rows.iter_mut().enumerate() {
                    for (j, entry) in row.iter_mut().enumerate() {
                        let block = F::from(M4[i % 4][j % 4]);
                        *entry = if T > 4 && i / 4 == j / 4 { block * two } else { block };
                    }
                }
                Matrix::new(rows)
            }
            _ => {
                return Err(ErrorCode::E112_UnsupportedWidth(
                    "external matrix".to_string(),
                    T as u64,
                ))
            }
        };
        Self::new(matrix)
    }

    /// Build from a [`MatrixSource`].
    pub fn from_source(source: &MatrixSource<F>) -> Poseidon2Result<Self> {
        match source {
            MatrixSource::Poseidon2 => Self::poseidon2(),
            MatrixSource::Literal(rows) => Self::new(Matrix::from_rows("external matrix", rows)?),
        }
    }

    /// The dense matrix.
    pub fn matrix(&self) -> &Matrix<F, T> {
        &self.matrix
    }

    /// `state' = M * state`.
    #[inline]
    pub fn apply(&self, state: &[F; T]) -> [F; T] {
        self.matrix.mul_vec(state)
    }
}

/// Structured layer `J + diag(d)` used by partial rounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalLayer<F, const T: usize> {
    diagonal: [F; T],
}

impl<F: FieldElement, const T: usize> InternalLayer<F, T> {
    /// Use `diagonal`, rejecting one whose dense form is singular.
    pub fn new(diagonal: [F; T]) -> Poseidon2Result<Self> {
        if !Matrix::ones_plus_diagonal(&diagonal).is_invertible() {
            return Err(ErrorCode::E110_SingularMatrix("internal matrix".to_string()));
        }
        Ok(Self { diagonal })
    }

    /// Published diagonals: `[1, 2]` for width 2, `[1, 1, 2]` for width 3.
    pub fn poseidon2() -> Poseidon2Result<Self> {
        let mut diagonal = [F::ONE; T];
        match T {
            2 | 3 => diagonal[T - 1] = F::from(2u64),
            _ => {
                return Err(ErrorCode::E112_UnsupportedWidth(
                    "internal diagonal".to_string(),
                    T as u64,
                ))
            }
        }
        Self::new(diagonal)
    }

    /// Build from a [`DiagonalSource`].
    pub fn from_source(source: &DiagonalSource<F>) -> Poseidon2Result<Self> {
        match source {
            DiagonalSource::Poseidon2 => Self::poseidon2(),
            DiagonalSource::Literal(diagonal) => {
                let diagonal = <[F; T]>::try_from(diagonal.as_slice()).map_err(|_| {
                    ErrorCode::E109_MatrixDimension(
                        "internal diagonal".to_string(),
                        diagonal.len() as u64,
                    )
                })?;
                Self::new(diagonal)
            }
        }
    }

    /// The diagonal `d`.
    pub fn diagonal(&self) -> &[F; T] {
        &self.diagonal
    }

    /// Dense form `J + diag(d)`.
    pub fn matrix(&self) -> Matrix<F, T> {
        Matrix::ones_plus_diagonal(&self.diagonal)
    }

    /// `state'[i] = d[i] * state[i] + sum(state)`.
    #[inline]
    pub fn apply(&self, state: &[F; T]) -> [F; T] {
        let sum = state.iter().fold(F::ZERO, |acc, x| acc + x);
        let mut out = *state;
        for (x, d) in out.iter_mut().zip(self.diagonal.iter()) {
            *x = *x * d + sum;
        }
        out
    }
}

/// External layer plus the internal layer when the schedule has partial rounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearLayer<F, const T: usize> {
    external: ExternalLayer<F, T>,
    internal: Option<InternalLayer<F, T>>,
}

impl<F: FieldElement, const T: usize> LinearLayer<F, T> {
    /// Pair an external layer with an optional internal layer.
    pub fn new(external: ExternalLayer<F, T>, internal: Option<InternalLayer<F, T>>) -> Self {
        Self { external, internal }
    }

    /// The external layer.
    pub fn external(&self) -> &ExternalLayer<F, T> {
        &self.external
    }

    /// The internal layer, if any.
    pub fn internal(&self) -> Option<&InternalLayer<F, T>> {
        self.internal.as_ref()
    }

    /// Dense mix of full rounds.
    #[inline]
    pub fn external_mix(&self, state: &[F; T]) -> [F; T] {
        self.external.apply(state)
    }

    /// Mix of partial rounds.
    ///
    /// Without an internal layer every round is external, so this falls
    /// back to [`external_mix`](Self::external_mix).
    #[inline]
    pub fn internal_mix(&self, state: &[F; T]) -> [F; T] {
        match &self.internal {
            Some(internal) => internal.apply(state),
            None => self.external.apply(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Bn254Fr;
    use ff::Field;

    fn fr(v: u64) -> Bn254Fr {
        Bn254Fr::from(v)
    }

    fn small(rows: [[u64; 3]; 3]) -> Matrix<Bn254Fr, 3> {
        Matrix::new(rows.map(|row| row.map(fr)))
    }

    #[test]
    fn test_determinant() {
        assert_eq!(small([[2, 1, 1], [1, 2, 1], [1, 1, 3]]).determinant(), fr(7));
        assert!(small([[2, 1, 1], [1, 2, 1], [1, 1, 3]]).is_mds());
        assert_eq!(small([[2, 1, 1], [1, 2, 1], [1, 1, 2]]).determinant(), fr(4));
        assert_eq!(small([[1, 2, 3], [2, 4, 6], [0, 0, 1]]).determinant(), Bn254Fr::ZERO);
        // Row swap needed for the first pivot.
        assert_eq!(small([[0, 1, 0], [1, 0, 0], [0, 0, 1]]).determinant(), -Bn254Fr::ONE);
    }

    #[test]
    fn test_mul_vec() {
        let m = small([[2, 1, 1], [1, 2, 1], [1, 1, 3]]);
        assert_eq!(m.mul_vec(&[fr(32), fr(32), fr(243)]), [fr(339), fr(339), fr(793)]);
    }

    #[test]
    fn test_generated_external_matrices() {
        let t3 = ExternalLayer::<Bn254Fr, 3>::poseidon2().unwrap();
        assert_eq!(t3.matrix(), &small([[2, 1, 1], [1, 2, 1], [1, 1, 2]]));
        assert!(t3.matrix().is_mds());

        let t2 = ExternalLayer::<Bn254Fr, 2>::poseidon2().unwrap();
        assert_eq!(t2.matrix().rows(), &[[fr(2), fr(1)], [fr(1), fr(2)]]);

        let t4 = ExternalLayer::<Bn254Fr, 4>::poseidon2().unwrap();
        assert_eq!(t4.matrix().rows()[0], [fr(5), fr(7), fr(1), fr(3)]);
        assert!(t4.matrix().is_mds());

        let t8 = ExternalLayer::<Bn254Fr, 8>::poseidon2().unwrap();
        assert_eq!(t8.matrix().rows()[0][0], fr(10));
        assert_eq!(t8.matrix().rows()[0][4], fr(5));
        assert!(t8.matrix().is_invertible());
    }

    #[test]
    fn test_unsupported_width() {
        assert_eq!(
            ExternalLayer::<Bn254Fr, 5>::poseidon2(),
            Err(ErrorCode::E112_UnsupportedWidth("external matrix".to_string(), 5))
        );
        assert!(matches!(
            InternalLayer::<Bn254Fr, 4>::poseidon2(),
            Err(ErrorCode::E112_UnsupportedWidth(_, 4))
        ));
    }

    #[test]
    fn test_singular_rejected() {
        let singular = small([[1, 1, 1], [1, 1, 1], [1, 1, 1]]);
        assert!(matches!(
            ExternalLayer::new(singular),
            Err(ErrorCode::E110_SingularMatrix(_))
        ));
        // J + diag(-3, 0, 0) has two equal rows.
        let d = [-fr(3), Bn254Fr::ZERO, Bn254Fr::ZERO];
        assert!(!Matrix::ones_plus_diagonal(&d).is_invertible());
        assert!(matches!(
            InternalLayer::new(d),
            Err(ErrorCode::E110_SingularMatrix(_))
        ));
    }

    #[test]
    fn test_literal_dimension_errors() {
        let rows = vec![vec![Bn254Fr::ONE; 3]; 2];
        assert!(matches!(
            ExternalLayer::<Bn254Fr, 3>::from_source(&MatrixSource::Literal(rows)),
            Err(ErrorCode::E109_MatrixDimension(_, 2))
        ));
        assert!(matches!(
            InternalLayer::<Bn254Fr, 3>::from_source(&DiagonalSource::Literal(vec![fr(1)])),
            Err(ErrorCode::E109_MatrixDimension(_, 1))
        ));
    }

    #[test]
    fn test_internal_matches_dense_form() {
        let internal = InternalLayer::<Bn254Fr, 3>::poseidon2().unwrap();
        let state = [fr(3), fr(5), fr(11)];
        assert_eq!(internal.apply(&state), internal.matrix().mul_vec(&state));
        assert_eq!(internal.apply(&state), [fr(22), fr(24), fr(41)]);
    }

    #[test]
    fn test_internal_mix_without_internal_layer() {
        let external = ExternalLayer::new(small([[2, 1, 1], [1, 2, 1], [1, 1, 3]])).unwrap();
        let layer = LinearLayer::new(external, None);
        let state = [fr(1), fr(2), fr(3)];
        assert_eq!(layer.internal_mix(&state), layer.external_mix(&state));
    }
}

//! Dense, row-major matrix storage with the elementary operations the
//! perturbation kernel needs (spec.md §4.1).
//!
//! # Design
//!
//! Storage is a single flat `Vec<f64>` in row-major order — element `(i, j)`
//! lives at `data[i * cols + j]`. This mirrors the original C++
//! implementation's flat-array layout (`original_source/src/data_structures/Matrix.hxx`)
//! rather than `Vec<Vec<f64>>`: one allocation, cache-friendly row scans, and
//! the resize-as-copy operations (`copy_and_add_rows_cols_with_zeros`) are a
//! single `memcpy`-shaped loop instead of a vector-of-vectors rebuild.
//!
//! Only the operations spec.md's perturbation kernel actually needs are
//! implemented — no general-purpose linear-algebra library, per spec.md §1's
//! explicit non-goal. `determinant` uses closed-form formulas for 1x1..3x3
//! and Laplace expansion above that; it exists for the singularity check in
//! `Propagation::Original`, not as a performance-critical path.

use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Sub, SubAssign};

use crate::error::{MatrixError, MatrixResult};

/// Added to a divisor before dividing, to avoid division by zero while
/// keeping the result numerically close to the true normalised value.
/// Matches the original implementation's constant (spec.md §3).
pub const NORMALIZE_EPSILON: f64 = 1e-20;

/// A dense, row-major matrix of `f64`.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    // ── Construction ────────────────────────────────────────────────────────

    /// A `rows x cols` matrix with every entry zero.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// A `size x size` identity matrix.
    pub fn identity(size: usize) -> Self {
        let mut m = Self::zeros(size, size);
        for i in 0..size {
            m.data[i * size + i] = 1.0;
        }
        m
    }

    /// Build a matrix from row-major nested rows. Fails if any row's length
    /// differs from the first row's.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> MatrixResult<Self> {
        if rows.is_empty() {
            return Ok(Self::zeros(0, 0));
        }
        let cols = rows[0].len();
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(MatrixError::RaggedRows {
                    row: i,
                    got: row.len(),
                    expected: cols,
                });
            }
            data.extend(row);
        }
        let n = data.len() / cols.max(1);
        Ok(Self {
            rows: n,
            cols,
            data,
        })
    }

    /// Build an `nrows x ncols` matrix from a flat row-major value slice.
    /// `ncols` defaults to 1 (a column vector) when `ncols == 0` is passed.
    pub fn from_flat(values: &[f64], nrows: usize, ncols: usize) -> MatrixResult<Self> {
        let ncols = if ncols == 0 { 1 } else { ncols };
        if values.len() != nrows * ncols {
            return Err(MatrixError::VectorLengthMismatch {
                got: values.len(),
                expected: nrows * ncols,
            });
        }
        Ok(Self {
            rows: nrows,
            cols: ncols,
            data: values.to_vec(),
        })
    }

    /// A column vector (`n x 1`) from a slice.
    pub fn column_from_slice(values: &[f64]) -> Self {
        Self {
            rows: values.len(),
            cols: 1,
            data: values.to_vec(),
        }
    }

    // ── Dimensions ──────────────────────────────────────────────────────────

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// A matrix with exactly one column and at least one row.
    #[inline]
    pub fn is_vector(&self) -> bool {
        self.rows >= 1 && self.cols == 1
    }

    /// View a column-vector matrix as a plain `Vec<f64>`.
    pub fn as_vector(&self) -> MatrixResult<Vec<f64>> {
        if !self.is_vector() {
            return Err(MatrixError::NotAVector {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.data.clone())
    }

    /// Raw row-major backing slice.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    fn check_bounds(&self, i: usize, j: usize) -> MatrixResult<()> {
        if i < self.rows && j < self.cols {
            Ok(())
        } else {
            Err(MatrixError::IndexOutOfRange {
                row: i,
                col: j,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Bounds-checked element read.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> MatrixResult<f64> {
        self.check_bounds(i, j)?;
        Ok(self.data[i * self.cols + j])
    }

    /// Bounds-checked element write.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) -> MatrixResult<()> {
        self.check_bounds(i, j)?;
        self.data[i * self.cols + j] = value;
        Ok(())
    }

    fn same_shape(&self, other: &Matrix) -> MatrixResult<()> {
        if self.rows == other.rows && self.cols == other.cols {
            Ok(())
        } else {
            Err(MatrixError::DimensionMismatch {
                lhs_rows: self.rows,
                lhs_cols: self.cols,
                rhs_rows: other.rows,
                rhs_cols: other.cols,
            })
        }
    }

    // ── Structural transforms ──────────────────────────────────────────────

    /// A new matrix with rows/columns transposed.
    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.data[j * out.cols + i] = self.data[i * self.cols + j];
            }
        }
        out
    }

    /// A new, larger matrix of size `(rows + extra_rows) x (cols + extra_cols)`
    /// with `self` placed in the top-left block and zeros elsewhere.
    /// Spec.md §8 property 2: the prefix block equals `self` exactly.
    pub fn copy_and_add_rows_cols_with_zeros(&self, extra_rows: usize, extra_cols: usize) -> Matrix {
        let mut out = Matrix::zeros(self.rows + extra_rows, self.cols + extra_cols);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.data[i * out.cols + j] = self.data[i * self.cols + j];
            }
        }
        out
    }

    /// Insert `values` as a new row at `pos`, shifting subsequent rows down.
    /// `values.len()` must equal `self.cols` (or `self.cols` is zero, in
    /// which case the matrix adopts `values`'s width).
    pub fn add_row(&mut self, pos: usize, values: &[f64]) -> MatrixResult<()> {
        if self.cols != 0 && values.len() != self.cols {
            return Err(MatrixError::VectorLengthMismatch {
                got: values.len(),
                expected: self.cols,
            });
        }
        let cols = if self.cols == 0 { values.len() } else { self.cols };
        let pos = pos.min(self.rows);
        let insert_at = pos * cols;
        self.cols = cols;
        self.data.splice(insert_at..insert_at, values.iter().copied());
        self.rows += 1;
        Ok(())
    }

    /// Insert `values` as a new column at `pos`, shifting subsequent columns
    /// right. `values.len()` must equal `self.rows`.
    pub fn add_column(&mut self, pos: usize, values: &[f64]) -> MatrixResult<()> {
        if self.rows != 0 && values.len() != self.rows {
            return Err(MatrixError::VectorLengthMismatch {
                got: values.len(),
                expected: self.rows,
            });
        }
        let rows = if self.rows == 0 { values.len() } else { self.rows };
        let pos = pos.min(self.cols);
        let new_cols = self.cols + 1;
        let mut out = Vec::with_capacity(rows * new_cols);
        for i in 0..rows {
            let old_row_start = i * self.cols;
            out.extend_from_slice(&self.data[old_row_start..old_row_start + pos]);
            out.push(values[i]);
            out.extend_from_slice(&self.data[old_row_start + pos..old_row_start + self.cols]);
        }
        self.rows = rows;
        self.cols = new_cols;
        self.data = out;
        Ok(())
    }

    // ── Normalisation ───────────────────────────────────────────────────────

    /// Divide every entry in column `j` by `v[j] + NORMALIZE_EPSILON`.
    /// Never divides by exact zero, regardless of zeros in `v`
    /// (spec.md §8 property 3).
    pub fn normalize_by_vector_column(&mut self, v: &[f64]) -> MatrixResult<&mut Self> {
        if v.len() != self.cols {
            return Err(MatrixError::VectorLengthMismatch {
                got: v.len(),
                expected: self.cols,
            });
        }
        for j in 0..self.cols {
            let denom = v[j] + NORMALIZE_EPSILON;
            for i in 0..self.rows {
                self.data[i * self.cols + j] /= denom;
            }
        }
        Ok(self)
    }

    /// Divide every entry in row `i` by `v[i] + NORMALIZE_EPSILON`.
    pub fn normalize_by_vector_row(&mut self, v: &[f64]) -> MatrixResult<&mut Self> {
        if v.len() != self.rows {
            return Err(MatrixError::VectorLengthMismatch {
                got: v.len(),
                expected: self.rows,
            });
        }
        for i in 0..self.rows {
            let denom = v[i] + NORMALIZE_EPSILON;
            for j in 0..self.cols {
                self.data[i * self.cols + j] /= denom;
            }
        }
        Ok(self)
    }

    // ── Arithmetic (in place) ──────────────────────────────────────────────

    pub fn add_assign_checked(&mut self, rhs: &Matrix) -> MatrixResult<()> {
        self.same_shape(rhs)?;
        for (a, b) in self.data.iter_mut().zip(&rhs.data) {
            *a += b;
        }
        Ok(())
    }

    pub fn sub_assign_checked(&mut self, rhs: &Matrix) -> MatrixResult<()> {
        self.same_shape(rhs)?;
        for (a, b) in self.data.iter_mut().zip(&rhs.data) {
            *a -= b;
        }
        Ok(())
    }

    /// In-place matrix product `self *= rhs`; requires `self.cols == rhs.rows`
    /// and replaces `self` with the `rows x rhs.cols` product.
    pub fn mul_assign_matrix(&mut self, rhs: &Matrix) -> MatrixResult<()> {
        let product = (&*self).mul_matrix(rhs)?;
        *self = product;
        Ok(())
    }

    // ── Arithmetic (out of place) ───────────────────────────────────────────

    pub fn add(&self, rhs: &Matrix) -> MatrixResult<Matrix> {
        let mut out = self.clone();
        out.add_assign_checked(rhs)?;
        Ok(out)
    }

    pub fn sub(&self, rhs: &Matrix) -> MatrixResult<Matrix> {
        let mut out = self.clone();
        out.sub_assign_checked(rhs)?;
        Ok(out)
    }

    pub fn mul_matrix(&self, rhs: &Matrix) -> MatrixResult<Matrix> {
        if self.cols != rhs.rows {
            return Err(MatrixError::DimensionMismatch {
                lhs_rows: self.rows,
                lhs_cols: self.cols,
                rhs_rows: rhs.rows,
                rhs_cols: rhs.cols,
            });
        }
        let mut out = Matrix::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.data[i * self.cols + k];
                if a == 0.0 {
                    continue;
                }
                for j in 0..rhs.cols {
                    out.data[i * out.cols + j] += a * rhs.data[k * rhs.cols + j];
                }
            }
        }
        Ok(out)
    }

    /// Multiply by a column vector (a `cols`-length slice), returning a
    /// `rows`-length result. Equivalent to `self * column_vector`.
    pub fn mul_vector(&self, v: &[f64]) -> MatrixResult<Vec<f64>> {
        if v.len() != self.cols {
            return Err(MatrixError::VectorLengthMismatch {
                got: v.len(),
                expected: self.cols,
            });
        }
        let mut out = vec![0.0; self.rows];
        for i in 0..self.rows {
            let row = &self.data[i * self.cols..(i + 1) * self.cols];
            out[i] = row.iter().zip(v).map(|(a, b)| a * b).sum();
        }
        Ok(out)
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        let mut out = self.clone();
        for x in out.data.iter_mut() {
            *x *= factor;
        }
        out
    }

    // ── Determinant ─────────────────────────────────────────────────────────

    /// Determinant via closed-form formulas for 1x1..3x3 and Laplace
    /// expansion along the first row above that (spec.md §4.1 — a
    /// high-performance general determinant is explicitly not required).
    pub fn determinant(&self) -> MatrixResult<f64> {
        if self.rows != self.cols {
            return Err(MatrixError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.determinant_unchecked())
    }

    fn determinant_unchecked(&self) -> f64 {
        let n = self.rows;
        match n {
            0 => 1.0,
            1 => self.data[0],
            2 => self.data[0] * self.data[3] - self.data[1] * self.data[2],
            3 => {
                let a = |i: usize, j: usize| self.data[i * 3 + j];
                a(0, 0) * (a(1, 1) * a(2, 2) - a(1, 2) * a(2, 1))
                    - a(0, 1) * (a(1, 0) * a(2, 2) - a(1, 2) * a(2, 0))
                    + a(0, 2) * (a(1, 0) * a(2, 1) - a(1, 1) * a(2, 0))
            }
            _ => {
                let mut det = 0.0;
                let mut sign = 1.0;
                for j in 0..n {
                    let a0j = self.data[j];
                    if a0j != 0.0 {
                        det += sign * a0j * self.minor(0, j).determinant_unchecked();
                    }
                    sign = -sign;
                }
                det
            }
        }
    }

    /// The `(n-1) x (n-1)` submatrix formed by deleting row `i` and column `j`.
    fn minor(&self, i: usize, j: usize) -> Matrix {
        let mut out = Matrix::zeros(self.rows - 1, self.cols - 1);
        let mut oi = 0;
        for r in 0..self.rows {
            if r == i {
                continue;
            }
            let mut oj = 0;
            for c in 0..self.cols {
                if c == j {
                    continue;
                }
                out.data[oi * out.cols + oj] = self.data[r * self.cols + c];
                oj += 1;
            }
            oi += 1;
        }
        out
    }

    // ── nalgebra interop (used by pert-operators for the pseudoinverse) ────

    /// Convert to a dense `nalgebra::DMatrix<f64>` for operations this crate
    /// intentionally does not implement itself (SVD, pseudoinverse).
    pub fn to_nalgebra(&self) -> nalgebra::DMatrix<f64> {
        nalgebra::DMatrix::from_row_slice(self.rows, self.cols, &self.data)
    }

    /// Build a `Matrix` from a dense `nalgebra::DMatrix<f64>`.
    pub fn from_nalgebra(m: &nalgebra::DMatrix<f64>) -> Matrix {
        let rows = m.nrows();
        let cols = m.ncols();
        let mut data = vec![0.0; rows * cols];
        for i in 0..rows {
            for j in 0..cols {
                data[i * cols + j] = m[(i, j)];
            }
        }
        Matrix { rows, cols, data }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;
    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.cols + j]
    }
}

impl AddAssign<&Matrix> for Matrix {
    fn add_assign(&mut self, rhs: &Matrix) {
        self.add_assign_checked(rhs).expect("Matrix += shape mismatch");
    }
}

impl SubAssign<&Matrix> for Matrix {
    fn sub_assign(&mut self, rhs: &Matrix) {
        self.sub_assign_checked(rhs).expect("Matrix -= shape mismatch");
    }
}

impl MulAssign<f64> for Matrix {
    fn mul_assign(&mut self, rhs: f64) {
        for x in self.data.iter_mut() {
            *x *= rhs;
        }
    }
}

impl DivAssign<f64> for Matrix {
    fn div_assign(&mut self, rhs: f64) {
        for x in self.data.iter_mut() {
            *x /= rhs;
        }
    }
}

impl Add<&Matrix> for &Matrix {
    type Output = Matrix;
    fn add(self, rhs: &Matrix) -> Matrix {
        self.add(rhs).expect("Matrix + shape mismatch")
    }
}

impl Sub<&Matrix> for &Matrix {
    type Output = Matrix;
    fn sub(self, rhs: &Matrix) -> Matrix {
        self.sub(rhs).expect("Matrix - shape mismatch")
    }
}

impl Mul<&Matrix> for &Matrix {
    type Output = Matrix;
    fn mul(self, rhs: &Matrix) -> Matrix {
        self.mul_matrix(rhs).expect("Matrix * shape mismatch")
    }
}

impl Mul<f64> for &Matrix {
    type Output = Matrix;
    fn mul(self, rhs: f64) -> Matrix {
        self.scale(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_and_get_set() {
        let mut m = Matrix::zeros(2, 3);
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        m.set(1, 2, 5.0).unwrap();
        assert_eq!(m.get(1, 2).unwrap(), 5.0);
    }

    #[test]
    fn out_of_range_is_an_error() {
        let m = Matrix::zeros(2, 2);
        assert!(m.get(5, 0).is_err());
    }

    #[test]
    fn transpose_swaps_dims() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let t = m.transpose();
        assert_eq!((t.rows(), t.cols()), (3, 2));
        assert_eq!(t.get(2, 1).unwrap(), 6.0);
    }

    #[test]
    fn copy_and_add_rows_cols_with_zeros_preserves_prefix() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let bigger = m.copy_and_add_rows_cols_with_zeros(1, 2);
        assert_eq!((bigger.rows(), bigger.cols()), (3, 4));
        for i in 0..2 {
            for j in 0..2 {
                assert_eq!(bigger.get(i, j).unwrap(), m.get(i, j).unwrap());
            }
        }
        for j in 0..4 {
            assert_eq!(bigger.get(2, j).unwrap(), 0.0);
        }
        for i in 0..3 {
            assert_eq!(bigger.get(i, 3).unwrap(), 0.0);
        }
    }

    #[test]
    fn normalize_by_vector_column_never_divides_by_zero() {
        let mut m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        m.normalize_by_vector_column(&[0.0, 0.0]).unwrap();
        assert!(m.get(0, 0).unwrap().is_finite());
        assert!(m.get(0, 0).unwrap() > 1e10);
    }

    #[test]
    fn mul_vector_matches_matrix_semantics() {
        let m = Matrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let v = vec![3.0, 4.0];
        assert_eq!(m.mul_vector(&v).unwrap(), v);
    }

    #[test]
    fn determinant_1_2_3() {
        assert_eq!(Matrix::from_rows(vec![vec![5.0]]).unwrap().determinant().unwrap(), 5.0);
        let m2 = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m2.determinant().unwrap(), -2.0);
        let m3 = Matrix::identity(3);
        assert_eq!(m3.determinant().unwrap(), 1.0);
    }

    #[test]
    fn determinant_laplace_4x4_identity() {
        assert_eq!(Matrix::identity(4).determinant().unwrap(), 1.0);
    }

    #[test]
    fn add_row_and_column() {
        let mut m = Matrix::from_rows(vec![vec![1.0, 2.0]]).unwrap();
        m.add_row(1, &[3.0, 4.0]).unwrap();
        assert_eq!(m.get(1, 0).unwrap(), 3.0);
        m.add_column(0, &[9.0, 9.0]).unwrap();
        assert_eq!((m.rows(), m.cols()), (2, 3));
        assert_eq!(m.get(0, 0).unwrap(), 9.0);
        assert_eq!(m.get(0, 1).unwrap(), 1.0);
    }

    #[test]
    fn as_vector_requires_single_column() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0]]).unwrap();
        assert!(m.as_vector().is_err());
        let col = Matrix::column_from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(col.as_vector().unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn nalgebra_roundtrip() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let back = Matrix::from_nalgebra(&m.to_nalgebra());
        assert_eq!(m, back);
    }
}

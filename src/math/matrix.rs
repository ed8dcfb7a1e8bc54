use rand::Rng;
use serde::ser::{Error as _, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use std::ops::{AddAssign, Index, IndexMut, MulAssign, SubAssign};

use crate::error::{Error, Result};
use crate::persist::Document;

/// Dense row-major matrix of `f64`.
///
/// Element `(x, y)` lives at offset `cols * x + y` of a single owned buffer.
/// Cloning is the only way to duplicate one; `Copy` is deliberately absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "MatrixDocument")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Matrix of the given shape filled uniformly from [0, 1).
    pub fn random(rows: usize, cols: usize) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        res.randomize();
        res
    }

    /// Builds a matrix from nested rows.
    ///
    /// Fails with `MalformedLiteral` if there are no rows, the rows are empty,
    /// or any row differs in length from the first.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let cols = match data.first() {
            Some(first) if !first.is_empty() => first.len(),
            Some(_) => return Err(Error::MalformedLiteral("rows must not be empty".into())),
            None => return Err(Error::MalformedLiteral("literal has no rows".into())),
        };

        if let Some((row, bad)) = data.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(Error::MalformedLiteral(format!(
                "row {row} has {} columns, expected {cols}",
                bad.len()
            )));
        }

        Ok(Matrix {
            rows: data.len(),
            cols,
            data: data.into_iter().flatten().collect(),
        })
    }

    /// Builds a `values.len() x 1` column vector.
    pub fn from_column(values: &[f64]) -> Matrix {
        Matrix {
            rows: values.len(),
            cols: 1,
            data: values.to_vec(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checked element read.
    pub fn get(&self, x: usize, y: usize) -> Result<f64> {
        self.offset(x, y).map(|i| self.data[i])
    }

    /// Checked element write.
    pub fn set(&mut self, x: usize, y: usize, value: f64) -> Result<()> {
        let i = self.offset(x, y)?;
        self.data[i] = value;
        Ok(())
    }

    fn offset(&self, x: usize, y: usize) -> Result<usize> {
        if x < self.rows && y < self.cols {
            Ok(self.cols * x + y)
        } else {
            Err(Error::OutOfBounds {
                x,
                y,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, f64> {
        self.data.iter_mut()
    }

    /// Borrow of row `x`. Panics if `x >= rows`.
    pub fn row(&self, x: usize) -> &[f64] {
        let start = x * self.cols;
        &self.data[start..start + self.cols]
    }

    pub fn rows_iter(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).map(move |x| self.row(x))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Elements in row-major order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.clone()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    pub fn randomize(&mut self) {
        self.randomize_with(&mut rand::thread_rng());
    }

    /// Fills every element independently from [0, 1) using `rng`.
    pub fn randomize_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for v in self.data.iter_mut() {
            *v = rng.gen::<f64>();
        }
    }

    pub fn add_scalar(&mut self, value: f64) {
        for v in self.data.iter_mut() {
            *v += value;
        }
    }

    pub fn scale(&mut self, factor: f64) {
        for v in self.data.iter_mut() {
            *v *= factor;
        }
    }

    /// Element-wise `self += other`.
    pub fn add(&mut self, other: &Matrix) -> Result<()> {
        self.ensure_same_shape("add", other)?;
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += b;
        }
        Ok(())
    }

    /// Element-wise (Hadamard) `self *= other`.
    pub fn hadamard(&mut self, other: &Matrix) -> Result<()> {
        self.ensure_same_shape("hadamard", other)?;
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a *= b;
        }
        Ok(())
    }

    /// Matrix product `a · b`. Requires `a.cols == b.rows`.
    pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix> {
        if a.cols != b.rows {
            return Err(Error::mismatch("multiply", a.shape(), b.shape()));
        }

        let mut res = Matrix::zeros(a.rows, b.cols);

        for i in 0..res.rows {
            let lhs = a.row(i);
            for j in 0..res.cols {
                let mut sum = 0.0;

                for (k, l) in lhs.iter().enumerate() {
                    sum += l * b.data[k * b.cols + j];
                }

                res.data[i * res.cols + j] = sum;
            }
        }

        Ok(res)
    }

    /// Element-wise `a - b`.
    pub fn subtract(a: &Matrix, b: &Matrix) -> Result<Matrix> {
        a.ensure_same_shape("subtract", b)?;
        Ok(Matrix {
            rows: a.rows,
            cols: a.cols,
            data: a.data.iter().zip(b.data.iter()).map(|(x, y)| x - y).collect(),
        })
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for (i, row) in self.rows_iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                res.data[j * res.cols + i] = *v;
            }
        }

        res
    }

    /// New matrix with `functor` applied to every element.
    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }

    pub fn map_in_place<F>(&mut self, functor: F)
    where
        F: Fn(f64) -> f64,
    {
        for v in self.data.iter_mut() {
            *v = functor(*v);
        }
    }

    fn ensure_same_shape(&self, op: &'static str, other: &Matrix) -> Result<()> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(Error::mismatch(op, self.shape(), other.shape()))
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl<const R: usize, const C: usize> From<[[f64; C]; R]> for Matrix {
    fn from(literal: [[f64; C]; R]) -> Self {
        Matrix {
            rows: R,
            cols: C,
            data: literal.iter().flatten().copied().collect(),
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (x, y): (usize, usize)) -> &f64 {
        debug_assert!(x < self.rows && y < self.cols);
        &self.data[self.cols * x + y]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut f64 {
        debug_assert!(x < self.rows && y < self.cols);
        &mut self.data[self.cols * x + y]
    }
}

impl AddAssign<f64> for Matrix {
    fn add_assign(&mut self, rhs: f64) {
        self.add_scalar(rhs);
    }
}

impl SubAssign<f64> for Matrix {
    fn sub_assign(&mut self, rhs: f64) {
        self.add_scalar(-rhs);
    }
}

impl MulAssign<f64> for Matrix {
    fn mul_assign(&mut self, rhs: f64) {
        self.scale(rhs);
    }
}

impl<'a> IntoIterator for &'a Matrix {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

// ---------------------------------------------------------------------------
// Document form: { "rows", "columns", "data": [[..], ..] }
// ---------------------------------------------------------------------------

struct RowsView<'a>(&'a Matrix);

impl Serialize for RowsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.rows_iter())
    }
}

impl Serialize for Matrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if let Some(v) = self.data.iter().find(|v| !v.is_finite()) {
            return Err(S::Error::custom(format!("matrix holds non-finite value {v}")));
        }

        let mut doc = serializer.serialize_struct("Matrix", 3)?;
        doc.serialize_field("rows", &self.rows)?;
        doc.serialize_field("columns", &self.cols)?;
        doc.serialize_field("data", &RowsView(self))?;
        doc.end()
    }
}

impl Document for Matrix {}

#[derive(Deserialize)]
struct MatrixDocument {
    rows: usize,
    columns: usize,
    data: Vec<Vec<f64>>,
}

impl TryFrom<MatrixDocument> for Matrix {
    type Error = Error;

    fn try_from(doc: MatrixDocument) -> Result<Matrix> {
        if doc.rows == 0 || doc.columns == 0 {
            return Err(Error::Parse(format!(
                "matrix shape {}x{} has a zero dimension",
                doc.rows, doc.columns
            )));
        }
        if doc.data.len() != doc.rows {
            return Err(Error::Parse(format!(
                "matrix declares {} rows but data has {}",
                doc.rows,
                doc.data.len()
            )));
        }
        if let Some((i, row)) = doc.data.iter().enumerate().find(|(_, r)| r.len() != doc.columns) {
            return Err(Error::Parse(format!(
                "matrix declares {} columns but data row {i} has {}",
                doc.columns,
                row.len()
            )));
        }

        Ok(Matrix {
            rows: doc.rows,
            cols: doc.columns,
            data: doc.data.into_iter().flatten().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn zeros_has_requested_shape() {
        let m = Matrix::zeros(2, 3);
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.len(), 6);
        assert!(m.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn from_data_is_row_major() {
        let m = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(m.shape(), (3, 2));
        assert_eq!(m.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m[(2, 1)], 6.0);
        assert_eq!(m, Matrix::from([[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]));
    }

    #[test]
    fn ragged_literal_is_rejected() {
        let err = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedLiteral);

        let err = Matrix::from_data(vec![]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedLiteral);

        let err = Matrix::from_data(vec![vec![], vec![]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedLiteral);
    }

    #[test]
    fn scalar_add_in_place() {
        let mut m = Matrix::from([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        m += 1.0;
        assert_eq!(m, Matrix::from([[2.0, 3.0, 4.0], [5.0, 6.0, 7.0], [8.0, 9.0, 10.0]]));
    }

    #[test]
    fn scalar_multiply_in_place() {
        let mut m = Matrix::from([[1.0, -2.0], [0.5, 4.0]]);
        m *= 2.0;
        assert_eq!(m, Matrix::from([[2.0, -4.0], [1.0, 8.0]]));
    }

    #[test]
    fn elementwise_add_and_hadamard() {
        let mut m = Matrix::from([[1.0, 2.0], [3.0, 4.0]]);
        m.add(&Matrix::from([[10.0, 20.0], [30.0, 40.0]])).unwrap();
        assert_eq!(m, Matrix::from([[11.0, 22.0], [33.0, 44.0]]));

        m.hadamard(&Matrix::from([[2.0, 0.0], [1.0, -1.0]])).unwrap();
        assert_eq!(m, Matrix::from([[22.0, 0.0], [33.0, -44.0]]));
    }

    #[test]
    fn elementwise_ops_reject_mismatched_shapes() {
        let mut m = Matrix::zeros(2, 3);
        let before = m.clone();
        let other = Matrix::zeros(3, 2);

        assert_eq!(m.add(&other).unwrap_err().kind(), ErrorKind::DimensionMismatch);
        assert_eq!(m.hadamard(&other).unwrap_err().kind(), ErrorKind::DimensionMismatch);
        assert_eq!(
            Matrix::subtract(&m, &other).unwrap_err().kind(),
            ErrorKind::DimensionMismatch
        );
        assert_eq!(m, before);
    }

    #[test]
    fn multiply_known_product() {
        let a = Matrix::from([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let b = Matrix::from([[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]]);
        let c = Matrix::multiply(&a, &b).unwrap();
        assert_eq!(c, Matrix::from([[58.0, 64.0], [139.0, 154.0]]));
    }

    #[test]
    fn multiply_rejects_incompatible_inner_dimension() {
        let a = Matrix::from([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        match Matrix::multiply(&a, &a) {
            Err(Error::DimensionMismatch { op, left, right }) => {
                assert_eq!(op, "multiply");
                assert_eq!(left, (2, 3));
                assert_eq!(right, (2, 3));
            }
            other => panic!("expected dimension mismatch, got {other:?}"),
        }
    }

    #[test]
    fn subtract_elementwise() {
        let a = Matrix::from([[5.0, 5.0], [5.0, 5.0]]);
        let b = Matrix::from([[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(Matrix::subtract(&a, &b).unwrap(), Matrix::from([[4.0, 3.0], [2.0, 1.0]]));
    }

    #[test]
    fn transpose_swaps_axes() {
        let m = Matrix::from([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(m.transpose(), Matrix::from([[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]]));
    }

    #[test]
    fn checked_access() {
        let mut m = Matrix::zeros(2, 2);
        m.set(1, 0, 3.5).unwrap();
        assert_eq!(m.get(1, 0).unwrap(), 3.5);
        assert_eq!(m.get(2, 0).unwrap_err().kind(), ErrorKind::OutOfBounds);
        assert_eq!(m.set(0, 2, 1.0).unwrap_err().kind(), ErrorKind::OutOfBounds);
    }

    #[test]
    fn randomize_stays_in_unit_interval() {
        let mut m = Matrix::zeros(8, 8);
        m.randomize_with(&mut StdRng::seed_from_u64(3));
        assert!(m.iter().all(|&v| (0.0..1.0).contains(&v)));
        assert!(m.iter().any(|&v| v != 0.0));
    }

    #[test]
    fn random_and_randomize_fill_unit_interval() {
        let m = Matrix::random(4, 5);
        assert_eq!(m.shape(), (4, 5));
        assert!(m.iter().all(|&v| (0.0..1.0).contains(&v)));
        assert!(m.iter().any(|&v| v != 0.0));

        let mut z = Matrix::zeros(6, 3);
        z.randomize();
        assert_eq!(z.shape(), (6, 3));
        assert!(z.iter().all(|&v| (0.0..1.0).contains(&v)));
        assert!(z.iter().any(|&v| v != 0.0));
    }

    #[test]
    fn index_mut_writes_row_major() {
        let mut m = Matrix::zeros(2, 3);
        m[(1, 2)] = 7.0;
        m[(0, 1)] += 2.5;
        assert_eq!(m.as_slice(), &[0.0, 2.5, 0.0, 0.0, 0.0, 7.0]);
    }

    #[test]
    fn map_and_map_in_place_agree() {
        let mut m = Matrix::from([[1.0, 2.0], [3.0, 4.0]]);
        let doubled = m.map(|x| x * 2.0);
        m.map_in_place(|x| x * 2.0);
        assert_eq!(m, doubled);
    }

    #[test]
    fn column_round_trip_through_flat_buffer() {
        let col = Matrix::from_column(&[1.0, 2.0, 3.0]);
        assert_eq!(col.shape(), (3, 1));
        assert_eq!(col.to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn clone_is_independent() {
        let a = Matrix::from([[1.0, 2.0]]);
        let mut b = a.clone();
        b += 1.0;
        assert_eq!(a, Matrix::from([[1.0, 2.0]]));
        assert_ne!(a, b);
    }

    #[test]
    fn serializes_nested_rows() {
        let m = Matrix::from([[1.0, 2.0], [3.0, 4.5]]);
        let value = serde_json::to_value(&m).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "rows": 2, "columns": 2, "data": [[1.0, 2.0], [3.0, 4.5]] })
        );
    }

    #[test]
    fn document_shape_is_validated() {
        let short_row = r#"{ "rows": 2, "columns": 2, "data": [[1, 2], [3]] }"#;
        assert!(serde_json::from_str::<Matrix>(short_row).is_err());

        let missing_row = r#"{ "rows": 3, "columns": 2, "data": [[1, 2], [3, 4]] }"#;
        assert!(serde_json::from_str::<Matrix>(missing_row).is_err());

        let no_columns = r#"{ "rows": 1, "data": [[1, 2]] }"#;
        assert!(serde_json::from_str::<Matrix>(no_columns).is_err());
    }

    #[test]
    fn dump_then_parse_is_exact() {
        let m = Matrix::from([[0.1, -2.0 / 3.0], [1e-300, 123456.789]]);
        assert_eq!(Matrix::parse(&m.dump().unwrap()).unwrap(), m);
    }

    #[test]
    fn parse_errors_are_parse_kind() {
        let err = Matrix::parse(r#"{ "rows": 2, "columns": 1, "data": [[1]] }"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
        assert!(err.to_string().contains("declares 2 rows"));

        let err = Matrix::parse("{ not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }

    #[test]
    fn non_finite_values_refuse_to_dump() {
        let mut m = Matrix::from([[1.0, 2.0]]);
        m.set(0, 1, f64::NAN).unwrap();
        assert_eq!(m.dump().unwrap_err().kind(), ErrorKind::Serialize);

        m.set(0, 1, f64::NEG_INFINITY).unwrap();
        assert_eq!(m.dump_pretty().unwrap_err().kind(), ErrorKind::Serialize);
    }

    #[test]
    fn zero_sized_document_is_rejected() {
        let wide = r#"{ "rows": 0, "columns": 1000000000000, "data": [] }"#;
        assert_eq!(Matrix::parse(wide).unwrap_err().kind(), ErrorKind::ParseError);

        let narrow = r#"{ "rows": 2, "columns": 0, "data": [[], []] }"#;
        assert_eq!(Matrix::parse(narrow).unwrap_err().kind(), ErrorKind::ParseError);
    }

    #[test]
    fn parse_from_value_tree() {
        let value = serde_json::json!({ "columns": 1, "rows": 2, "data": [[3.0], [4.0]] });
        assert_eq!(Matrix::from_value(&value).unwrap(), Matrix::from_column(&[3.0, 4.0]));
    }
}

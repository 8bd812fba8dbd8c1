use num::Num;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::vector::ZeroSpVec;

/// Row-major sparse matrix.
/// Every row has dimension `n_cols`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "CsMatrixData<N>",
    bound(
        serialize = "N: Num + Copy + Serialize",
        deserialize = "N: Num + Copy + Deserialize<'de>"
    )
)]
pub struct CsMatrix<N>
where
    N: Num,
{
    n_cols: usize,
    rows: Vec<ZeroSpVec<N>>,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "N: Num + Copy + Deserialize<'de>"))]
struct CsMatrixData<N>
where
    N: Num + Copy,
{
    n_cols: usize,
    rows: Vec<ZeroSpVec<N>>,
}

impl<N> TryFrom<CsMatrixData<N>> for CsMatrix<N>
where
    N: Num + Copy,
{
    type Error = String;

    fn try_from(data: CsMatrixData<N>) -> Result<Self, Self::Error> {
        if let Some((i, row)) = data
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != data.n_cols)
        {
            return Err(format!(
                "row {i} has dimension {} but matrix has {} columns",
                row.len(),
                data.n_cols
            ));
        }
        Ok(CsMatrix {
            n_cols: data.n_cols,
            rows: data.rows,
        })
    }
}

impl<N> CsMatrix<N>
where
    N: Num + Copy,
{
    /// Build from rows. Returns `None` if any row dimension differs from `n_cols`.
    pub fn from_rows(n_cols: usize, rows: Vec<ZeroSpVec<N>>) -> Option<Self> {
        CsMatrix::try_from(CsMatrixData { n_cols, rows }).ok()
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    #[inline]
    pub fn row(&self, i: usize) -> Option<&ZeroSpVec<N>> {
        self.rows.get(i)
    }

    pub fn rows(&self) -> &[ZeroSpVec<N>] {
        &self.rows
    }
}

impl<N> CsMatrix<N>
where
    N: Num + Copy + Into<f64> + Send + Sync,
{
    /// Linear kernel between one query row and every matrix row.
    /// `result[i] = <query, row_i>`, in row order.
    pub fn linear_kernel(&self, query: &ZeroSpVec<N>) -> Vec<f64> {
        debug_assert_eq!(query.len(), self.n_cols);
        if query.nnz() == 0 {
            return vec![0.0; self.rows.len()];
        }
        self.rows
            .par_iter()
            .map(|row| query.dot::<f64>(row))
            .collect()
    }
}

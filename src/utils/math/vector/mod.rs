pub mod math;
pub mod serde;

use std::fmt::{self, Debug};

use num::Num;

use crate::utils::sort::radix_sort_u32_soa;

/// ZeroSpVec is a sparse vector that treats zero elements as implicit.
/// It keeps two parallel arrays:
/// - `inds` holds the dimension index of every stored element
/// - `vals` holds the value of every stored element
///
/// `inds` is always strictly ascending and every index is `< len`.
#[derive(Clone, PartialEq)]
pub struct ZeroSpVec<N>
where
    N: Num,
{
    inds: Vec<u32>,
    vals: Vec<N>,
    len: usize,
}

impl<N> ZeroSpVec<N>
where
    N: Num,
{
    #[inline]
    pub fn new() -> Self {
        ZeroSpVec {
            inds: Vec::new(),
            vals: Vec::new(),
            len: 0,
        }
    }

    /// All-zero vector of dimension `len`.
    #[inline]
    pub fn zeros(len: usize) -> Self {
        ZeroSpVec {
            inds: Vec::new(),
            vals: Vec::new(),
            len,
        }
    }

    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        ZeroSpVec {
            inds: Vec::with_capacity(cap),
            vals: Vec::with_capacity(cap),
            len: 0,
        }
    }

    #[inline]
    pub fn shrink_to_fit(&mut self) {
        self.inds.shrink_to_fit();
        self.vals.shrink_to_fit();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Dimension of the vector (zeros included)
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of stored (non-zero) elements
    #[inline]
    pub fn nnz(&self) -> usize {
        self.inds.len()
    }

    /// Append one dense element. Zeros only extend the dimension.
    #[inline]
    pub fn push(&mut self, elem: N) {
        if elem != N::zero() {
            self.inds.push(self.len as u32);
            self.vals.push(elem);
        }
        self.len += 1;
    }

    #[inline]
    fn ind_binary_search(&self, index: usize) -> Result<usize, usize> {
        self.inds.binary_search(&(index as u32))
    }

    /// Element at `index`, zero included. `None` when out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<N>
    where
        N: Copy,
    {
        if index >= self.len {
            return None;
        }
        match self.ind_binary_search(index) {
            Ok(pos) => self.vals.get(pos).copied(),
            Err(_) => Some(N::zero()),
        }
    }

    /// Iterate stored elements as `(index, &value)` in ascending index order.
    #[inline]
    pub fn raw_iter(&self) -> impl Iterator<Item = (usize, &N)> + '_ {
        self.inds.iter().map(|&i| i as usize).zip(self.vals.iter())
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.inds
    }

    #[inline]
    pub fn values(&self) -> &[N] {
        &self.vals
    }

    #[inline]
    pub(crate) fn values_mut(&mut self) -> &mut [N] {
        &mut self.vals
    }
}

impl<N> ZeroSpVec<N>
where
    N: Num + Copy,
{
    /// Build from `(index, value)` pairs in any order.
    /// Duplicate indices are summed, zero results are dropped.
    ///
    /// # Panics
    /// Panics if an index is `>= len`.
    pub fn from_pairs<I>(len: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, N)>,
    {
        let (mut inds, mut vals): (Vec<u32>, Vec<N>) = pairs
            .into_iter()
            .map(|(i, v)| {
                assert!(i < len, "index {i} out of range for dimension {len}");
                (i as u32, v)
            })
            .unzip();
        radix_sort_u32_soa(&mut inds, &mut vals);

        let mut out = ZeroSpVec {
            inds: Vec::with_capacity(inds.len()),
            vals: Vec::with_capacity(vals.len()),
            len,
        };
        for (i, v) in inds.into_iter().zip(vals) {
            match out.inds.last() {
                Some(&last) if last == i => {
                    if let Some(acc) = out.vals.last_mut() {
                        *acc = *acc + v;
                    }
                }
                _ => {
                    out.inds.push(i);
                    out.vals.push(v);
                }
            }
        }
        out.drop_zeros();
        out
    }

    /// Build from sorted, unique `(index, value)` pairs.
    /// Returns `None` if the pairs are unsorted, duplicated or out of range.
    pub fn try_from_sorted(len: usize, pairs: Vec<(u64, N)>) -> Option<Self> {
        let mut out = ZeroSpVec::with_capacity(pairs.len());
        out.len = len;
        for (i, v) in pairs {
            if i >= len as u64 || i > u32::MAX as u64 {
                return None;
            }
            if out.inds.last().is_some_and(|&last| last as u64 >= i) {
                return None;
            }
            out.inds.push(i as u32);
            out.vals.push(v);
        }
        out.drop_zeros();
        Some(out)
    }

    fn drop_zeros(&mut self) {
        if self.vals.iter().all(|v| *v != N::zero()) {
            return;
        }
        let (inds, vals): (Vec<u32>, Vec<N>) = self
            .inds
            .iter()
            .copied()
            .zip(self.vals.iter().copied())
            .filter(|(_, v)| *v != N::zero())
            .unzip();
        self.inds = inds;
        self.vals = vals;
    }

    /// Dense copy
    pub fn to_dense(&self) -> Vec<N> {
        let mut dense = vec![N::zero(); self.len];
        for (i, v) in self.raw_iter() {
            dense[i] = *v;
        }
        dense
    }
}

impl<N> From<Vec<N>> for ZeroSpVec<N>
where
    N: Num,
{
    fn from(vec: Vec<N>) -> Self {
        let mut sp = ZeroSpVec::with_capacity(vec.len());
        for v in vec {
            sp.push(v);
        }
        sp.shrink_to_fit();
        sp
    }
}

impl<N> Default for ZeroSpVec<N>
where
    N: Num,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Num + Debug> Debug for ZeroSpVec<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_struct("ZeroSpVec")
                .field("len", &self.len)
                .field("nnz", &self.inds.len())
                .finish()
        } else {
            f.debug_map().entries(self.raw_iter()).finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_skips_zero_storage() {
        let sp = ZeroSpVec::from(vec![0.0, 1.5, 0.0, 2.0]);
        assert_eq!(sp.len(), 4);
        assert_eq!(sp.nnz(), 2);
        assert_eq!(sp.indices(), &[1, 3]);
        assert_eq!(sp.get(0), Some(0.0));
        assert_eq!(sp.get(3), Some(2.0));
        assert_eq!(sp.get(4), None);
    }

    #[test]
    fn from_pairs_sorts_and_merges_duplicates() {
        let sp = ZeroSpVec::from_pairs(10, vec![(7, 1.0), (2, 3.0), (7, 2.0), (5, 0.0)]);
        assert_eq!(sp.indices(), &[2, 7]);
        assert_eq!(sp.values(), &[3.0, 3.0]);
        assert_eq!(sp.to_dense()[7], 3.0);
    }

    #[test]
    fn try_from_sorted_rejects_bad_input() {
        assert!(ZeroSpVec::try_from_sorted(4, vec![(0, 1.0f64), (3, 2.0)]).is_some());
        assert!(ZeroSpVec::try_from_sorted(4, vec![(3, 1.0f64), (1, 2.0)]).is_none());
        assert!(ZeroSpVec::try_from_sorted(4, vec![(1, 1.0f64), (1, 2.0)]).is_none());
        assert!(ZeroSpVec::try_from_sorted(4, vec![(4, 1.0f64)]).is_none());
    }

    #[test]
    #[should_panic]
    fn from_pairs_panics_out_of_range() {
        let _ = ZeroSpVec::from_pairs(2, vec![(2usize, 1.0f64)]);
    }
}

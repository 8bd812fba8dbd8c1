use std::cmp::Ordering;

use num::{Float, Num};

use super::ZeroSpVec;

impl<N> ZeroSpVec<N>
where
    N: Num + Copy,
{
    /// ドット積
    /// Merge-walks both index lists, so cost is O(nnz_a + nnz_b).
    #[inline]
    pub fn dot<R>(&self, other: &Self) -> R
    where
        R: Num + Copy,
        N: Into<R>,
    {
        debug_assert_eq!(
            self.len(),
            other.len(),
            "Vectors must be of the same length to compute dot product."
        );

        let (a_inds, a_vals) = (self.indices(), self.values());
        let (b_inds, b_vals) = (other.indices(), other.values());
        let mut result = R::zero();
        let (mut i, mut j) = (0, 0);
        while i < a_inds.len() && j < b_inds.len() {
            match a_inds[i].cmp(&b_inds[j]) {
                Ordering::Equal => {
                    result = result + a_vals[i].into() * b_vals[j].into();
                    i += 1;
                    j += 1;
                }
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
            }
        }
        result
    }

    #[inline]
    pub fn norm_sq<R>(&self) -> R
    where
        R: Num + Copy,
        N: Into<R>,
    {
        self.values().iter().fold(R::zero(), |acc, &v| {
            let v: R = v.into();
            acc + v * v
        })
    }

    /// Multiply each stored element by the dense weight at its index.
    /// `weights.len()` must equal `self.len()`.
    #[inline]
    pub fn mul_dense(&mut self, weights: &[N]) {
        debug_assert_eq!(self.len(), weights.len());
        let inds: Vec<u32> = self.indices().to_vec();
        for (v, i) in self.values_mut().iter_mut().zip(inds) {
            *v = *v * weights[i as usize];
        }
    }
}

impl<N> ZeroSpVec<N>
where
    N: Float,
{
    /// Euclidean norm
    #[inline]
    pub fn norm(&self) -> N {
        self.values()
            .iter()
            .fold(N::zero(), |acc, &v| acc + v * v)
            .sqrt()
    }

    /// Scale to unit L2 norm. An all-zero vector is left untouched.
    #[inline]
    pub fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm == N::zero() {
            return;
        }
        for v in self.values_mut() {
            *v = *v / norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_only_counts_shared_indices() {
        let a = ZeroSpVec::from(vec![1.0f64, 0.0, 2.0, 0.0]);
        let b = ZeroSpVec::from(vec![3.0f64, 5.0, 0.0, 7.0]);
        assert_eq!(a.dot::<f64>(&b), 3.0);
        assert_eq!(a.norm_sq::<f64>(), 5.0);
    }

    #[test]
    fn l2_normalize_gives_unit_norm() {
        let mut a = ZeroSpVec::from(vec![3.0f64, 0.0, 4.0]);
        a.l2_normalize();
        assert!((a.norm() - 1.0).abs() < 1e-12);
        assert_eq!(a.to_dense(), vec![0.6, 0.0, 0.8]);

        let mut z: ZeroSpVec<f64> = ZeroSpVec::zeros(3);
        z.l2_normalize();
        assert_eq!(z.nnz(), 0);
    }

    #[test]
    fn mul_dense_weights_stored_elements() {
        let mut a = ZeroSpVec::from(vec![1.0f64, 0.0, 2.0]);
        a.mul_dense(&[2.0, 9.0, 0.5]);
        assert_eq!(a.to_dense(), vec![2.0, 0.0, 1.0]);
    }
}

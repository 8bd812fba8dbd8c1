use core::mem;

/// Stable u32-key radix sort for SoA (inds/vals).
/// - Sorts by inds ascending
/// - Reorders vals accordingly
/// - Equal keys keep their input order
///
/// Complexity: at most 4 passes, each O(n + 256).
/// A pass is skipped when every key shares the same byte at that position.
#[inline]
pub fn radix_sort_u32_soa<N: Copy>(inds: &mut [u32], vals: &mut [N]) {
    assert_eq!(inds.len(), vals.len());
    let n = inds.len();
    if n <= 1 {
        return;
    }

    // Small sizes: insertion sort is often faster than allocating scratch.
    if n <= 32 {
        insertion_sort_u32_soa(inds, vals);
        return;
    }

    let mut src_inds = inds.to_vec();
    let mut src_vals = vals.to_vec();
    let mut dst_inds = vec![0u32; n];
    let mut dst_vals = src_vals.clone();

    // LSD: byte 0..3
    for shift in [0u32, 8, 16, 24] {
        let mut count = [0usize; 256];
        for &k in src_inds.iter() {
            count[((k >> shift) & 0xFF) as usize] += 1;
        }
        // 全キーがこのバイトで同値なら並びは変わらない
        if count.iter().any(|&c| c == n) {
            continue;
        }

        // Prefix sum -> starting positions
        let mut sum = 0usize;
        for c in count.iter_mut() {
            let tmp = *c;
            *c = sum;
            sum += tmp;
        }

        // Distribute (stable)
        for (idx, &k) in src_inds.iter().enumerate() {
            let b = ((k >> shift) & 0xFF) as usize;
            let pos = count[b];
            count[b] = pos + 1;
            dst_inds[pos] = k;
            dst_vals[pos] = src_vals[idx];
        }

        mem::swap(&mut src_inds, &mut dst_inds);
        mem::swap(&mut src_vals, &mut dst_vals);
    }

    inds.copy_from_slice(&src_inds);
    vals.copy_from_slice(&src_vals);
}

/// Tiny insertion sort for small n (SoA).
#[inline]
fn insertion_sort_u32_soa<N: Copy>(inds: &mut [u32], vals: &mut [N]) {
    let n = inds.len();
    for i in 1..n {
        let mut j = i;
        while j > 0 && inds[j] < inds[j - 1] {
            inds.swap(j, j - 1);
            vals.swap(j, j - 1);
            j -= 1;
        }
    }
}

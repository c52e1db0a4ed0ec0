//! Bulk data-parallel primitives shared by the graph and grid cores.
//!
//! Every operation here is a single phase: it runs to completion before
//! the caller starts the next phase, which is the only ordering the
//! components rely on. Element order within a phase is unspecified.

use rayon::prelude::*;

/// Stable argsort: the permutation that sorts `key(0..len)` ascending.
///
/// Equal keys keep their relative order, so side arrays permuted with
/// the same result stay row-aligned for duplicate keys.
pub fn sort_permutation<K, F>(len: usize, key: F) -> Vec<u32>
where
    K: Ord + Send,
    F: Fn(usize) -> K + Sync,
{
    let mut perm: Vec<u32> = (0..len as u32).collect();
    perm.par_sort_by_key(|&i| key(i as usize));
    perm
}

/// Apply a permutation: `out[i] = values[perm[i]]`.
pub fn gather<T: Clone + Send + Sync>(perm: &[u32], values: &[T]) -> Vec<T> {
    perm.par_iter()
        .map(|&i| values[i as usize].clone())
        .collect()
}

/// Exclusive prefix sum with a trailing total; output length is
/// `counts.len() + 1`.
pub fn exclusive_scan(counts: &[usize]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(counts.len() + 1);
    let mut running = 0usize;
    offsets.push(0);
    for &c in counts {
        running += c;
        offsets.push(running);
    }
    offsets
}

/// CSR offsets for a sorted key sequence: `offsets[k]..offsets[k + 1]`
/// spans the rows whose key equals `k`.
///
/// Reduce-by-key (a per-segment count) followed by an exclusive scan.
/// Keys must be sorted ascending and less than `segments`.
pub fn segment_offsets(sorted_keys: &[u32], segments: usize) -> Vec<usize> {
    let mut counts = vec![0usize; segments];
    for &k in sorted_keys {
        counts[k as usize] += 1;
    }
    exclusive_scan(&counts)
}

/// Sorted set difference `a \ b`.
///
/// Both inputs must be sorted ascending; duplicates in `a` are kept
/// unless matched in `b`, so pass deduplicated inputs for set semantics.
pub fn sorted_set_difference<T: Ord + Copy>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(a.len());
    let mut j = 0usize;
    for &x in a {
        while j < b.len() && b[j] < x {
            j += 1;
        }
        if j >= b.len() || b[j] != x {
            out.push(x);
        }
    }
    out
}

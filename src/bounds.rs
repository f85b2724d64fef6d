//! Exact integer evaluation of the conjectured closed-form bounds.
//!
//! Every run report prints the conjectured value next to the solved optimum,
//! so a mismatch is visible at a glance. All arithmetic is exact `u128` with
//! floor division where the conjectures divide.

/// Computes \(\binom{n}{k}\) exactly.
///
/// Exact for every `n <= 64`; each intermediate product divides evenly.
pub fn binomial(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc * (n - i) as u128 / (i + 1) as u128;
    }
    acc
}

/// Sperner's bound on the largest antichain of \(2^{[n]}\): \(\binom{n}{\lfloor n/2 \rfloor}\).
#[inline]
pub fn sperner_bound(n: usize) -> u128 {
    binomial(n, n / 2)
}

/// Conjectured largest antichain of diameter at most `d`: \(\binom{n}{\lfloor d/2 \rfloor}\).
#[inline]
pub fn diameter_bound(n: usize, d: usize) -> u128 {
    binomial(n, d / 2)
}

/// Conjectured largest diversity of a k-uniform intersecting family:
/// \(\binom{n-3}{k-2}\). `None` when a factor is undefined.
pub fn uniform_diversity_bound(n: usize, k: usize) -> Option<u128> {
    Some(binomial(n.checked_sub(3)?, k.checked_sub(2)?))
}

/// Conjectured largest diversity of an intersecting family of \(2^{[2k]}\):
/// \(\lfloor \binom{2k-1}{k-1}/2 \rfloor + \sum_{i=k+1}^{2k-1} \binom{2k-1}{i}\).
pub fn powerset_diversity_bound(k: usize) -> Option<u128> {
    let half = 2usize.checked_mul(k)?.checked_sub(1)?;
    let mut total = binomial(half, k - 1) / 2;
    for i in (k + 1)..=half {
        total += binomial(half, i);
    }
    Some(total)
}

/// Size of an s-subset-regular k-uniform intersecting family predicted by the
/// quotient formula
/// \(\binom{n}{k} \big/ \bigl(1 + \binom{n-k}{k} / \binom{n-k-s-2}{k-s-2}\bigr)\),
/// evaluated exactly as \(\binom{n}{k} B / (A + B)\) with floor division.
///
/// `None` when an inner binomial is undefined or zero.
pub fn subset_regular_bound(n: usize, k: usize, s: usize) -> Option<u128> {
    let inner_n = n.checked_sub(k)?.checked_sub(s + 2)?;
    let inner_k = k.checked_sub(s + 2)?;
    let b = binomial(inner_n, inner_k);
    if b == 0 {
        return None;
    }
    let a = binomial(n - k, k);
    Some(binomial(n, k) * b / (a + b))
}

/// Kruskal-Katona style cap on triangles in a graph with `n` vertices and `m`
/// edges: \(\lfloor (n-2) m / 3 \rfloor\).
#[inline]
pub fn triangle_count_bound(n: usize, m: usize) -> u128 {
    (n.saturating_sub(2) as u128) * (m as u128) / 3
}

/// Conjectured largest edge count of a kK3-free complete-multipartite subgraph
/// with exactly four parts of equal size `p`: \(4p^2 + (k-1)p\).
#[inline]
pub fn four_part_kk3_bound(p: usize, k: usize) -> u128 {
    let p = p as u128;
    4 * p * p + (k.saturating_sub(1) as u128) * p
}

/// Historical comparison value for the no-4-pairwise-disjoint-members family
/// at `(n, m) = (9, 4)`. Recorded from the original study; not derived from a
/// closed form.
pub const DISJOINT_FOUR_REFERENCE: u128 = 480;

// ============================================================================
// Tests
// ============================================================================

//! Ground sets, subset codes, and object-space enumeration (currently \(n \le 64\)).

use crate::bounds::binomial;

// ============================================================================
// Bit helpers
// ============================================================================

/// The largest ground set this implementation supports: one `u64` code per subset.
pub const MAX_GROUND: usize = 64;

/// Returns a mask with the lowest `n` bits set.
#[inline(always)]
pub const fn low_bits(n: usize) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

// ============================================================================
// GroundSet
// ============================================================================

/// A ground set of `n` labeled elements.
///
/// Elements are displayed with labels `1..=n`. Internally element `p` (0-based
/// position) occupies bit `n-1-p` of a subset code, so the first element is the
/// most significant bit. Under this placement the exclude-before-include
/// recursions below emit codes in ascending numeric order, and
/// \(A \subsetneq B\) implies `code(A) < code(B)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroundSet {
    n: usize,
}

impl GroundSet {
    /// Creates a ground set of `n` elements.
    ///
    /// # Panics
    /// Panics in debug builds if `n > 64`. Validated entry points reject such
    /// parameters before reaching this constructor.
    #[inline]
    pub fn new(n: usize) -> Self {
        debug_assert!(n <= MAX_GROUND, "This implementation assumes n <= 64");
        Self { n }
    }

    /// Returns the number of elements.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Returns whether the ground set has no elements.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Returns the code bit of position `p`.
    #[inline(always)]
    pub fn position_bit(&self, p: usize) -> u64 {
        debug_assert!(p < self.n, "position {p} out of range for n = {}", self.n);
        1u64 << (self.n - 1 - p)
    }

    /// Returns the subset containing every element.
    #[inline(always)]
    pub fn full(&self) -> Subset {
        Subset(low_bits(self.n))
    }

    /// Returns whether `s` contains the element at position `p`.
    #[inline(always)]
    pub fn contains(&self, s: Subset, p: usize) -> bool {
        (s.0 & self.position_bit(p)) != 0
    }

    /// Iterates the positions of `s` in ascending position order.
    pub fn positions(self, s: Subset) -> impl Iterator<Item = usize> {
        (0..self.n).filter(move |&p| (s.0 & self.position_bit(p)) != 0)
    }

    /// Builds a subset from a list of positions.
    ///
    /// # Panics
    /// Panics in debug builds on out-of-range positions.
    pub fn subset_at(&self, positions: &[usize]) -> Subset {
        let mut bits = 0u64;
        for &p in positions {
            bits |= self.position_bit(p);
        }
        Subset(bits)
    }

    /// Renders `s` with 1-based element labels, e.g. `{1, 3, 7}`.
    pub fn label_set(&self, s: Subset) -> String {
        let mut out = String::from("{");
        let mut first = true;
        for p in 0..self.n {
            if (s.0 & self.position_bit(p)) != 0 {
                if !first {
                    out.push_str(", ");
                }
                out.push_str(&(p + 1).to_string());
                first = false;
            }
        }
        out.push('}');
        out
    }
}

// ============================================================================
// Subset
// ============================================================================

/// A subset of a ground set packed into a single `u64` code.
///
/// The code doubles as the subset's integer encoding: object spaces store
/// subsets in ascending code order, and a subset's index within its space is
/// the variable index of every model built over that space. `Ord` is code
/// order, so spaces can be binary-searched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subset(u64);

impl Subset {
    /// The empty subset.
    pub const EMPTY: Subset = Subset(0);

    /// Wraps a raw code.
    #[inline(always)]
    pub const fn from_bits(bits: u64) -> Self {
        Subset(bits)
    }

    /// Returns the raw code.
    #[inline(always)]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Returns the number of elements.
    #[inline(always)]
    pub const fn weight(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns whether the subset has no elements.
    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

// ============================================================================
// VertexParts
// ============================================================================

/// A multipartite vertex layout: consecutive position blocks of given sizes.
///
/// The original study addressed part `i`, vertex `j` with a uniform stride,
/// which only works when all parts share one size; here offsets are prefix
/// sums, so unequal parts address correctly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexParts {
    sizes: Vec<usize>,
    offsets: Vec<usize>,
    total: usize,
}

impl VertexParts {
    /// Creates a layout from part sizes, in declaration order.
    pub fn new(sizes: &[usize]) -> Self {
        let mut offsets = Vec::with_capacity(sizes.len());
        let mut total = 0usize;
        for &s in sizes {
            offsets.push(total);
            total += s;
        }
        Self {
            sizes: sizes.to_vec(),
            offsets,
            total,
        }
    }

    /// Returns the number of parts.
    #[inline(always)]
    pub fn count(&self) -> usize {
        self.sizes.len()
    }

    /// Returns the total number of vertices across all parts.
    #[inline(always)]
    pub fn total_vertices(&self) -> usize {
        self.total
    }

    /// Returns the size of part `i`.
    #[inline(always)]
    pub fn size(&self, i: usize) -> usize {
        self.sizes[i]
    }

    /// Returns the position offset of part `i`.
    #[inline(always)]
    pub fn offset(&self, i: usize) -> usize {
        self.offsets[i]
    }

    /// Returns the ground set spanning every part.
    #[inline]
    pub fn ground(&self) -> GroundSet {
        GroundSet::new(self.total)
    }

    /// Returns the code mask covering the vertices of part `i`.
    pub fn mask(&self, i: usize) -> u64 {
        let ground = self.ground();
        let mut mask = 0u64;
        for j in 0..self.sizes[i] {
            mask |= ground.position_bit(self.offsets[i] + j);
        }
        mask
    }
}

// ============================================================================
// ObjectSpace
// ============================================================================

/// An enumerated object space: the arena every model indexes into.
///
/// Objects are stored in strictly ascending code order with no duplicates, so
/// `index_of` is a binary search and index `i` of a space lines up with
/// variable `i` of the block allocated for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectSpace {
    ground: GroundSet,
    objects: Vec<Subset>,
    uniform_weight: Option<usize>,
}

impl ObjectSpace {
    fn finish(ground: GroundSet, objects: Vec<Subset>, uniform_weight: Option<usize>) -> Self {
        debug_assert!(
            objects.windows(2).all(|w| w[0] < w[1]),
            "object codes must be strictly ascending"
        );
        Self {
            ground,
            objects,
            uniform_weight,
        }
    }

    /// Enumerates every subset of `ground` via a depth-`n` binary decision
    /// recursion, exclude branch before include branch.
    pub fn power_set(ground: GroundSet) -> Self {
        let mut objects = Vec::with_capacity(1usize << ground.len().min(20));
        push_power_set(ground, 0, 0, &mut objects);
        tracing::debug!(n = ground.len(), objects = objects.len(), "enumerated power set");
        Self::finish(ground, objects, None)
    }

    /// Enumerates every weight-`k` subset of `ground`.
    ///
    /// Two prunes bound the recursion: a branch emits as soon as `k` elements
    /// are chosen, and abandons as soon as the remaining positions cannot
    /// reach `k`. `k > n` yields an empty space.
    pub fn k_subsets(ground: GroundSet, k: usize) -> Self {
        Self::k_subsets_filtered(ground, k, |_| true)
    }

    /// Enumerates weight-`k` subsets, keeping those accepted by `keep`.
    pub fn k_subsets_filtered<F>(ground: GroundSet, k: usize, keep: F) -> Self
    where
        F: Fn(Subset) -> bool,
    {
        let mut objects = Vec::new();
        push_k_subsets(ground, k, 0, 0, 0, &keep, &mut objects);
        tracing::debug!(
            n = ground.len(),
            k,
            objects = objects.len(),
            "enumerated k-subsets"
        );
        Self::finish(ground, objects, Some(k))
    }

    /// Enumerates subsets selecting at most one vertex per part, across
    /// exactly `active` parts (`active = 2` gives edges, `3` gives triangles
    /// of the complete multipartite graph).
    pub fn multipartite(parts: &VertexParts, active: usize) -> Self {
        let mut objects = Vec::new();
        push_multipartite(parts, active, 0, 0, 0, &mut objects);
        tracing::debug!(
            parts = parts.count(),
            active,
            objects = objects.len(),
            "enumerated multipartite tuples"
        );
        Self::finish(parts.ground(), objects, Some(active))
    }

    /// Enumerates concatenations of a `k`-subset of the first `n1` positions
    /// with an `l`-subset of the last `n2` positions.
    pub fn two_part(n1: usize, n2: usize, k: usize, l: usize) -> Self {
        debug_assert!(n1 + n2 <= MAX_GROUND, "This implementation assumes n <= 64");
        let first = Self::k_subsets(GroundSet::new(n1), k);
        let second = Self::k_subsets(GroundSet::new(n2), l);
        let ground = GroundSet::new(n1 + n2);

        let mut objects = Vec::with_capacity(first.len() * second.len());
        for a in first.iter() {
            // n2 < 64 whenever the first part is non-empty
            let high = if n1 == 0 { 0 } else { a.bits() << n2 };
            for b in second.iter() {
                objects.push(Subset::from_bits(high | b.bits()));
            }
        }
        tracing::debug!(n1, n2, k, l, objects = objects.len(), "enumerated two-part space");
        Self::finish(ground, objects, Some(k + l))
    }

    /// Returns the number of objects.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns whether the space holds no objects.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Returns the object at index `i`.
    #[inline(always)]
    pub fn get(&self, i: usize) -> Subset {
        self.objects[i]
    }

    /// Iterates objects in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = Subset> + '_ {
        self.objects.iter().copied()
    }

    /// Returns the index of `s`, if present. `O(log n)` binary search.
    #[inline]
    pub fn index_of(&self, s: Subset) -> Option<usize> {
        self.objects.binary_search(&s).ok()
    }

    /// Returns the ground set.
    #[inline(always)]
    pub fn ground(&self) -> GroundSet {
        self.ground
    }

    /// Returns the common weight of all objects, when one was declared.
    #[inline(always)]
    pub fn uniform_weight(&self) -> Option<usize> {
        self.uniform_weight
    }

    // ------------------------------------------------------------------------
    // Count prechecks
    // ------------------------------------------------------------------------
    //
    // Validated entry points compare these against the object budget BEFORE
    // enumerating anything.

    /// Number of objects `power_set` would produce.
    #[inline]
    pub fn power_set_len(n: usize) -> u128 {
        debug_assert!(n <= MAX_GROUND);
        1u128 << n
    }

    /// Number of objects `k_subsets` would produce.
    #[inline]
    pub fn k_subsets_len(n: usize, k: usize) -> u128 {
        binomial(n, k)
    }

    /// Number of objects `multipartite` would produce: the elementary
    /// symmetric polynomial of degree `active` in the part sizes.
    pub fn multipartite_len(parts: &VertexParts, active: usize) -> u128 {
        let mut acc = vec![0u128; active + 1];
        acc[0] = 1;
        for i in 0..parts.count() {
            let s = parts.size(i) as u128;
            for j in (1..=active).rev() {
                acc[j] += acc[j - 1] * s;
            }
        }
        acc[active]
    }

    /// Number of objects `two_part` would produce.
    #[inline]
    pub fn two_part_len(n1: usize, n2: usize, k: usize, l: usize) -> u128 {
        binomial(n1, k) * binomial(n2, l)
    }
}

// ============================================================================
// Enumeration recursions
// ============================================================================

fn push_power_set(ground: GroundSet, pos: usize, acc: u64, out: &mut Vec<Subset>) {
    if pos == ground.len() {
        out.push(Subset(acc));
        return;
    }
    push_power_set(ground, pos + 1, acc, out);
    push_power_set(ground, pos + 1, acc | ground.position_bit(pos), out);
}

fn push_k_subsets<F>(
    ground: GroundSet,
    k: usize,
    pos: usize,
    chosen: usize,
    acc: u64,
    keep: &F,
    out: &mut Vec<Subset>,
) where
    F: Fn(Subset) -> bool,
{
    if chosen == k {
        let s = Subset(acc);
        if keep(s) {
            out.push(s);
        }
        return;
    }
    if pos == ground.len() || chosen + (ground.len() - pos) < k {
        return;
    }
    push_k_subsets(ground, k, pos + 1, chosen, acc, keep, out);
    push_k_subsets(ground, k, pos + 1, chosen + 1, acc | ground.position_bit(pos), keep, out);
}

fn push_multipartite(
    parts: &VertexParts,
    active: usize,
    part: usize,
    picked: usize,
    acc: u64,
    out: &mut Vec<Subset>,
) {
    if picked == active {
        out.push(Subset(acc));
        return;
    }
    if part == parts.count() || picked + (parts.count() - part) < active {
        return;
    }
    push_multipartite(parts, active, part + 1, picked, acc, out);
    // Earlier positions carry higher bits, so descending j keeps codes ascending.
    let ground = parts.ground();
    for j in (0..parts.size(part)).rev() {
        let b = ground.position_bit(parts.offset(part) + j);
        push_multipartite(parts, active, part + 1, picked + 1, acc | b, out);
    }
}

// ============================================================================
// Tests
// ============================================================================

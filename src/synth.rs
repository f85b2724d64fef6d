//! Constraint synthesis: turning exact predicates and backtracking searches
//! into linear rows over the variables of an object space.
//!
//! Every function here iterates its space in index order, so synthesis is
//! deterministic and idempotent: the same inputs emit identical rows in
//! identical order. Each emission passes through the constraint budget and
//! fails fast once it is exhausted.

use crate::model::{BuildError, Constraint, Limits, LinExpr, Model, VarBlock};
use crate::relation;
use crate::space::{ObjectSpace, Subset};

// ============================================================================
// Pairwise exclusion
// ============================================================================

/// Governing predicate of a pairwise exclusion pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairRule {
    /// One subset contains the other (antichain violation).
    Comparable,
    /// The symmetric difference exceeds the given diameter.
    DiameterOver(u32),
    /// The subsets share no element (intersecting-family violation).
    Disjoint,
}

impl PairRule {
    /// Returns whether the pair must be excluded under this rule.
    #[inline]
    pub fn excludes(self, a: Subset, b: Subset) -> bool {
        match self {
            PairRule::Comparable => relation::comparable(a, b),
            PairRule::DiameterOver(d) => relation::symmetric_difference_exceeds(a, b, d),
            PairRule::Disjoint => relation::intersection_empty(a, b),
        }
    }
}

/// Emits `x_i + x_j <= 1` for every index pair `i < j` whose objects violate
/// one of `rules`. A pair violating several rules gets one row per rule.
///
/// Codes ascend with containment, so the `i < j` sweep meets every comparable
/// pair with the subset first. Returns the number of rows emitted.
pub fn pairwise_exclusion(
    model: &mut Model,
    space: &ObjectSpace,
    vars: VarBlock,
    rules: &[PairRule],
    limits: &Limits,
) -> Result<usize, BuildError> {
    debug_assert_eq!(space.len(), vars.len());
    let mut emitted = 0usize;
    for i in 0..space.len() {
        let a = space.get(i);
        for j in (i + 1)..space.len() {
            let b = space.get(j);
            for rule in rules {
                if rule.excludes(a, b) {
                    let mut expr = LinExpr::with_capacity(2);
                    expr.push(vars.var(i), 1);
                    expr.push(vars.var(j), 1);
                    model.try_add_constraint(Constraint::le(expr, 1), limits, "pairwise exclusion")?;
                    emitted += 1;
                }
            }
        }
    }
    tracing::debug!(emitted, "pairwise exclusion rows");
    Ok(emitted)
}

// ============================================================================
// Disjoint groups
// ============================================================================

/// Visits every index combination `i1 < ... < im` of pairwise-disjoint
/// objects, in lexicographic index order.
///
/// A candidate overlapping the running union is skipped; a branch that cannot
/// fill the group from the remaining indices is abandoned.
pub fn for_each_disjoint_group<F>(
    space: &ObjectSpace,
    m: usize,
    f: &mut F,
) -> Result<(), BuildError>
where
    F: FnMut(&[usize]) -> Result<(), BuildError>,
{
    let mut chosen = Vec::with_capacity(m);
    visit_disjoint_groups(space, m, 0, 0, &mut chosen, f)
}

fn visit_disjoint_groups<F>(
    space: &ObjectSpace,
    m: usize,
    start: usize,
    used: u64,
    chosen: &mut Vec<usize>,
    f: &mut F,
) -> Result<(), BuildError>
where
    F: FnMut(&[usize]) -> Result<(), BuildError>,
{
    if chosen.len() == m {
        return f(chosen);
    }
    let needed = m - chosen.len();
    for idx in start..space.len() {
        if space.len() - idx < needed {
            break;
        }
        let s = space.get(idx);
        if s.bits() & used != 0 {
            continue;
        }
        chosen.push(idx);
        visit_disjoint_groups(space, m, idx + 1, used | s.bits(), chosen, f)?;
        chosen.pop();
    }
    Ok(())
}

/// Emits `sum(group) <= m - 1` for every group of `m` pairwise-disjoint
/// objects. Returns the number of rows emitted.
pub fn disjoint_group_exclusion(
    model: &mut Model,
    space: &ObjectSpace,
    vars: VarBlock,
    m: usize,
    limits: &Limits,
) -> Result<usize, BuildError> {
    debug_assert_eq!(space.len(), vars.len());
    let mut emitted = 0usize;
    for_each_disjoint_group(space, m, &mut |group| {
        let expr = LinExpr::sum(group.iter().map(|&i| vars.var(i)));
        model.try_add_constraint(Constraint::le(expr, m as i64 - 1), limits, "disjoint group")?;
        emitted += 1;
        Ok(())
    })?;
    tracing::debug!(emitted, m, "disjoint group rows");
    Ok(emitted)
}

// ============================================================================
// Chains
// ============================================================================

/// Visits every strictly nested chain of exactly `l + 1` members of `space`,
/// top first.
///
/// Every object of weight at least `l` is taken as a chain top. From a top,
/// the recursion walks the working set's positions highest bit first; each
/// position is either kept, dropped while carving continues, or dropped with
/// the carved subset committed as the next member. Every proper subset of the
/// working set is committed exactly once (at its lowest dropped bit), so no
/// chain repeats. Per-branch state is two `u64` words and one push/pop stack.
pub fn for_each_chain<F>(space: &ObjectSpace, l: usize, f: &mut F) -> Result<(), BuildError>
where
    F: FnMut(&[Subset]) -> Result<(), BuildError>,
{
    debug_assert!(l >= 1, "chains need at least two members");
    let mut chain = Vec::with_capacity(l + 1);
    for top in space.iter() {
        if (top.weight() as usize) < l {
            continue;
        }
        chain.push(top);
        carve_chains(top.bits(), top.bits(), l + 1, &mut chain, f)?;
        chain.pop();
    }
    Ok(())
}

fn carve_chains<F>(
    rest: u64,
    working: u64,
    target: usize,
    chain: &mut Vec<Subset>,
    f: &mut F,
) -> Result<(), BuildError>
where
    F: FnMut(&[Subset]) -> Result<(), BuildError>,
{
    if chain.len() == target {
        return f(chain);
    }
    // Carving can only commit while an open bit remains, and a commit reopens
    // the bits this pass kept, so the working weight bounds further members.
    if rest == 0 || chain.len() + (working.count_ones() as usize) < target {
        return Ok(());
    }

    let b = 1u64 << (63 - rest.leading_zeros());
    let rest = rest & !b;

    carve_chains(rest, working, target, chain, f)?;
    carve_chains(rest, working & !b, target, chain, f)?;

    let committed = working & !b;
    chain.push(Subset::from_bits(committed));
    carve_chains(committed, committed, target, chain, f)?;
    chain.pop();
    Ok(())
}

/// Emits `sum(chain) <= l` for every strictly nested chain of `l + 1` members.
///
/// The space must contain every subset of its own members (a power set does).
/// Returns the number of rows emitted.
pub fn chain_free(
    model: &mut Model,
    space: &ObjectSpace,
    vars: VarBlock,
    l: usize,
    limits: &Limits,
) -> Result<usize, BuildError> {
    debug_assert_eq!(space.len(), vars.len());
    let mut emitted = 0usize;
    for_each_chain(space, l, &mut |chain| {
        let mut expr = LinExpr::with_capacity(chain.len());
        for &member in chain {
            let idx = space.index_of(member);
            debug_assert!(idx.is_some(), "chain member missing from the space");
            if let Some(i) = idx {
                expr.push(vars.var(i), 1);
            }
        }
        model.try_add_constraint(Constraint::le(expr, l as i64), limits, "chain")?;
        emitted += 1;
        Ok(())
    })?;
    tracing::debug!(emitted, l, "chain rows");
    Ok(emitted)
}

// ============================================================================
// Stars and regularity
// ============================================================================

/// Emits, for each element `i > 0`, the row
/// \(\sum_{A \ni i} x_A - \sum_{A \ni e_0} x_A \le 0\):
/// no star may outgrow the star of the reference element.
///
/// Rows are built coefficient-wise, one net term per variable; an object
/// containing both elements contributes nothing. Returns `n - 1`.
pub fn star_domination(
    model: &mut Model,
    space: &ObjectSpace,
    vars: VarBlock,
    limits: &Limits,
) -> Result<usize, BuildError> {
    debug_assert_eq!(space.len(), vars.len());
    let ground = space.ground();
    if ground.is_empty() {
        return Ok(0);
    }
    let reference = ground.position_bit(0);
    for p in 1..ground.len() {
        let bit = ground.position_bit(p);
        let mut expr = LinExpr::new();
        for (i, s) in space.iter().enumerate() {
            let coef = i64::from(s.bits() & bit != 0) - i64::from(s.bits() & reference != 0);
            expr.push(vars.var(i), coef);
        }
        model.try_add_constraint(Constraint::le(expr, 0), limits, "star domination")?;
    }
    Ok(ground.len() - 1)
}

/// Emits, for every s-subset `R'` other than the reference anchor `R0`, the
/// equality \(\sum_{B \supseteq R_0} x_B - \sum_{B \supseteq R'} x_B = 0\).
///
/// Any s-subset works as the anchor; the first enumerated one is used. The
/// original also compared the anchor against itself; that trivial empty row
/// is dropped here. Returns `C(n, s) - 1` (or 0 when no anchor exists).
pub fn subset_regular_equalities(
    model: &mut Model,
    space: &ObjectSpace,
    vars: VarBlock,
    s: usize,
    limits: &Limits,
) -> Result<usize, BuildError> {
    debug_assert_eq!(space.len(), vars.len());
    let anchors = ObjectSpace::k_subsets(space.ground(), s);
    if anchors.is_empty() {
        return Ok(0);
    }
    let reference = anchors.get(0);
    let mut emitted = 0usize;
    for anchor in anchors.iter().skip(1) {
        let mut expr = LinExpr::new();
        for (i, b) in space.iter().enumerate() {
            let coef = i64::from(relation::is_subset_of(reference, b))
                - i64::from(relation::is_subset_of(anchor, b));
            expr.push(vars.var(i), coef);
        }
        model.try_add_constraint(Constraint::eq(expr, 0), limits, "subset regularity")?;
        emitted += 1;
    }
    Ok(emitted)
}

/// Emits, for each ground position `p`, the row
/// \(\sum_{A:\, p \notin A} x_A \ge 1\): some selected member must avoid `p`.
///
/// When nothing avoids `p` the empty row `0 >= 1` still goes in; the model is
/// honestly infeasible. Returns `n`.
pub fn coverage(
    model: &mut Model,
    space: &ObjectSpace,
    vars: VarBlock,
    limits: &Limits,
) -> Result<usize, BuildError> {
    debug_assert_eq!(space.len(), vars.len());
    let ground = space.ground();
    for p in 0..ground.len() {
        let bit = ground.position_bit(p);
        let mut expr = LinExpr::new();
        for (i, s) in space.iter().enumerate() {
            if s.bits() & bit == 0 {
                expr.push(vars.var(i), 1);
            }
        }
        model.try_add_constraint(Constraint::ge(expr, 1), limits, "coverage")?;
    }
    Ok(ground.len())
}

// ============================================================================
// Triangles
// ============================================================================

/// Pushes the three edges of `tri` (drop one of its three bits, three ways)
/// onto `expr` with unit coefficients.
fn push_triangle_edges(
    expr: &mut LinExpr,
    tri: Subset,
    edges: &ObjectSpace,
    edge_vars: VarBlock,
) {
    debug_assert_eq!(tri.weight(), 3, "triangles have exactly three vertices");
    let mut bits = tri.bits();
    while bits != 0 {
        let b = 1u64 << bits.trailing_zeros();
        bits &= bits - 1;
        let edge = Subset::from_bits(tri.bits() & !b);
        let idx = edges.index_of(edge);
        debug_assert!(idx.is_some(), "edge missing from the edge space");
        if let Some(e) = idx {
            expr.push(edge_vars.var(e), 1);
        }
    }
}

/// Emits, for each triangle `T` with edges `e1, e2, e3`, the row
/// \(x_{e_1} + x_{e_2} + x_{e_3} - 3 x_T \ge 0\): a selected triangle needs
/// all three edges. Returns the number of triangles.
pub fn triangle_support(
    model: &mut Model,
    triangles: &ObjectSpace,
    tri_vars: VarBlock,
    edges: &ObjectSpace,
    edge_vars: VarBlock,
    limits: &Limits,
) -> Result<usize, BuildError> {
    debug_assert_eq!(triangles.len(), tri_vars.len());
    debug_assert_eq!(edges.len(), edge_vars.len());
    for (t, tri) in triangles.iter().enumerate() {
        let mut expr = LinExpr::with_capacity(4);
        push_triangle_edges(&mut expr, tri, edges, edge_vars);
        expr.push(tri_vars.var(t), -3);
        model.try_add_constraint(Constraint::ge(expr, 0), limits, "triangle support")?;
    }
    Ok(triangles.len())
}

/// Emits the global equality `sum(edges) = m`.
pub fn edge_total(
    model: &mut Model,
    edge_vars: VarBlock,
    m: usize,
    limits: &Limits,
) -> Result<(), BuildError> {
    model.try_add_constraint(
        Constraint::eq(LinExpr::sum(edge_vars.iter()), m as i64),
        limits,
        "edge total",
    )
}

/// Emits, for every group of `k` vertex-disjoint triangles, the row
/// \(\sum (\text{its } 3k \text{ edge variables}) \le 3k - 1\): at least one
/// edge of every candidate packing stays out.
///
/// Triangles carry no variables of their own here; the row speaks entirely in
/// edge variables. Returns the number of rows emitted.
pub fn forbid_disjoint_triangle_groups(
    model: &mut Model,
    triangles: &ObjectSpace,
    edges: &ObjectSpace,
    edge_vars: VarBlock,
    k: usize,
    limits: &Limits,
) -> Result<usize, BuildError> {
    debug_assert_eq!(edges.len(), edge_vars.len());
    let mut emitted = 0usize;
    for_each_disjoint_group(triangles, k, &mut |group| {
        let mut expr = LinExpr::with_capacity(3 * group.len());
        for &t in group {
            push_triangle_edges(&mut expr, triangles.get(t), edges, edge_vars);
        }
        model.try_add_constraint(
            Constraint::le(expr, 3 * k as i64 - 1),
            limits,
            "triangle packing",
        )?;
        emitted += 1;
        Ok(())
    })?;
    tracing::debug!(emitted, k, "triangle packing rows");
    Ok(emitted)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sense;
    use crate::space::{GroundSet, VertexParts};

    fn space_with_vars(space: ObjectSpace) -> (Model, ObjectSpace, VarBlock) {
        let mut model = Model::new();
        let vars = model.add_binary_block(space.len());
        (model, space, vars)
    }

    fn row_indices(c: &Constraint) -> Vec<usize> {
        let mut idx: Vec<usize> = c.expr().terms().iter().map(|&(v, _)| v.index()).collect();
        idx.sort_unstable();
        idx
    }

    // -------------------------------------------------------------------------
    // Pairwise exclusion
    // -------------------------------------------------------------------------

    #[test]
    fn comparable_pairs_of_the_three_cube() {
        let (mut model, space, vars) =
            space_with_vars(ObjectSpace::power_set(GroundSet::new(3)));
        let emitted = pairwise_exclusion(
            &mut model,
            &space,
            vars,
            &[PairRule::Comparable],
            &Limits::default(),
        )
        .unwrap();
        // sum over B of (2^|B| - 1) proper subsets
        assert_eq!(emitted, 19);
        assert_eq!(model.constraints().len(), 19);
        for c in model.constraints() {
            assert_eq!(c.expr().len(), 2);
            assert_eq!(c.sense(), Sense::Le);
            assert_eq!(c.rhs(), 1);
        }
    }

    #[test]
    fn each_rule_contributes_its_own_rows() {
        let space = ObjectSpace::power_set(GroundSet::new(4));
        let mut brute_comparable = 0usize;
        let mut brute_far = 0usize;
        for i in 0..space.len() {
            for j in (i + 1)..space.len() {
                let (a, b) = (space.get(i), space.get(j));
                brute_comparable += usize::from(relation::comparable(a, b));
                brute_far += usize::from(relation::symmetric_difference_exceeds(a, b, 2));
            }
        }

        let (mut model, space, vars) = space_with_vars(space);
        let emitted = pairwise_exclusion(
            &mut model,
            &space,
            vars,
            &[PairRule::Comparable, PairRule::DiameterOver(2)],
            &Limits::default(),
        )
        .unwrap();
        assert_eq!(emitted, brute_comparable + brute_far);
    }

    #[test]
    fn disjoint_rule_on_two_subsets() {
        let (mut model, space, vars) =
            space_with_vars(ObjectSpace::k_subsets(GroundSet::new(4), 2));
        let emitted =
            pairwise_exclusion(&mut model, &space, vars, &[PairRule::Disjoint], &Limits::default())
                .unwrap();
        // the three perfect matchings of K4
        assert_eq!(emitted, 3);
    }

    #[test]
    fn pairwise_respects_the_constraint_budget() {
        let limits = Limits {
            max_objects: 1 << 20,
            max_constraints: 5,
        };
        let (mut model, space, vars) =
            space_with_vars(ObjectSpace::power_set(GroundSet::new(4)));
        let err = pairwise_exclusion(&mut model, &space, vars, &[PairRule::Comparable], &limits)
            .unwrap_err();
        assert!(matches!(err, BuildError::TooManyConstraints { .. }));
        assert_eq!(model.constraints().len(), 5);
    }

    // -------------------------------------------------------------------------
    // Disjoint groups
    // -------------------------------------------------------------------------

    #[test]
    fn disjoint_pairs_of_the_three_cube() {
        let space = ObjectSpace::power_set(GroundSet::new(3));
        let mut groups = Vec::new();
        for_each_disjoint_group(&space, 2, &mut |g| {
            groups.push(g.to_vec());
            Ok(())
        })
        .unwrap();
        // ordered disjoint pairs are 3^3 (in A / in B / in neither), minus the
        // empty-empty pair, halved
        assert_eq!(groups.len(), 13);
        for g in &groups {
            assert!(g[0] < g[1]);
            assert!(relation::intersection_empty(space.get(g[0]), space.get(g[1])));
        }
    }

    #[test]
    fn only_one_disjoint_quadruple_fits_in_three_elements() {
        let space = ObjectSpace::power_set(GroundSet::new(3));
        let mut groups = Vec::new();
        for_each_disjoint_group(&space, 4, &mut |g| {
            groups.push(g.to_vec());
            Ok(())
        })
        .unwrap();
        // the empty set plus the three singletons
        assert_eq!(groups, vec![vec![0, 1, 2, 4]]);
    }

    #[test]
    fn group_rows_carry_group_size_minus_one() {
        let (mut model, space, vars) =
            space_with_vars(ObjectSpace::power_set(GroundSet::new(3)));
        let emitted =
            disjoint_group_exclusion(&mut model, &space, vars, 2, &Limits::default()).unwrap();
        assert_eq!(emitted, 13);
        for c in model.constraints() {
            assert_eq!(c.expr().len(), 2);
            assert_eq!((c.sense(), c.rhs()), (Sense::Le, 1));
        }
    }

    // -------------------------------------------------------------------------
    // Chains
    // -------------------------------------------------------------------------

    fn collect_chains(n: usize, l: usize) -> Vec<Vec<u64>> {
        let space = ObjectSpace::power_set(GroundSet::new(n));
        let mut chains = Vec::new();
        for_each_chain(&space, l, &mut |chain| {
            chains.push(chain.iter().map(|s| s.bits()).collect());
            Ok(())
        })
        .unwrap();
        chains
    }

    #[test]
    fn two_member_chains_are_the_comparable_pairs() {
        assert_eq!(collect_chains(3, 1).len(), 19);
    }

    #[test]
    fn chains_are_strictly_nested_and_unique() {
        for (n, l, expected) in [(3, 2, 18), (4, 2, 110)] {
            let chains = collect_chains(n, l);
            assert_eq!(chains.len(), expected, "count for n = {n}, l = {l}");
            for chain in &chains {
                assert_eq!(chain.len(), l + 1);
                for w in chain.windows(2) {
                    assert_ne!(w[0], w[1]);
                    assert_eq!(w[1] & !w[0], 0, "not nested: {chain:?}");
                }
            }
            let mut sorted = chains.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), chains.len(), "duplicate chain emitted");
        }
    }

    #[test]
    fn chains_match_a_brute_force_sweep() {
        let mut brute = Vec::new();
        for a in 0u64..16 {
            for b in 0u64..16 {
                for c in 0u64..16 {
                    if a != b && b != c && (b & !a) == 0 && (c & !b) == 0 {
                        brute.push(vec![a, b, c]);
                    }
                }
            }
        }
        let mut chains = collect_chains(4, 2);
        brute.sort();
        chains.sort();
        assert_eq!(chains, brute);
    }

    #[test]
    fn maximal_chains_are_one_per_ground_permutation() {
        let ground = GroundSet::new(3);
        let space = ObjectSpace::power_set(ground);
        let mut chains = Vec::new();
        for_each_chain(&space, 3, &mut |chain| {
            chains.push(chain.to_vec());
            Ok(())
        })
        .unwrap();
        // A four-member chain in 2^[3] drops exactly one element per step, so
        // there is one chain per ordering of the ground set.
        assert_eq!(chains.len(), 6);
        // This descent keeps position 0 through every carving pass.
        let descent = vec![
            ground.subset_at(&[0, 1, 2]),
            ground.subset_at(&[0, 1]),
            ground.subset_at(&[0]),
            Subset::EMPTY,
        ];
        assert!(chains.contains(&descent), "missing {descent:?}");
    }

    #[test]
    fn single_drop_chains_equal_comparable_pair_rows() {
        let limits = Limits::default();
        let (mut chain_model, space, vars) =
            space_with_vars(ObjectSpace::power_set(GroundSet::new(4)));
        chain_free(&mut chain_model, &space, vars, 1, &limits).unwrap();

        let (mut pair_model, space, vars) =
            space_with_vars(ObjectSpace::power_set(GroundSet::new(4)));
        pairwise_exclusion(&mut pair_model, &space, vars, &[PairRule::Comparable], &limits)
            .unwrap();

        let normalize = |m: &Model| {
            let mut rows: Vec<Vec<usize>> = m.constraints().iter().map(row_indices).collect();
            rows.sort();
            rows
        };
        assert_eq!(normalize(&chain_model), normalize(&pair_model));
    }

    // -------------------------------------------------------------------------
    // Stars, regularity, coverage
    // -------------------------------------------------------------------------

    #[test]
    fn star_domination_emits_one_row_per_non_reference_element() {
        let (mut model, space, vars) =
            space_with_vars(ObjectSpace::k_subsets(GroundSet::new(7), 3));
        let emitted = star_domination(&mut model, &space, vars, &Limits::default()).unwrap();
        assert_eq!(emitted, 6);
        assert_eq!(model.constraints().len(), 6);
        for c in model.constraints() {
            assert_eq!((c.sense(), c.rhs()), (Sense::Le, 0));
            // sets containing exactly one of the two elements: 2 * C(5, 2)
            assert_eq!(c.expr().len(), 20);
            assert!(c.expr().terms().iter().all(|&(_, k)| k == 1 || k == -1));
        }
    }

    #[test]
    fn star_domination_net_coefficients_cancel_shared_members() {
        let (mut model, space, vars) =
            space_with_vars(ObjectSpace::k_subsets(GroundSet::new(4), 2));
        star_domination(&mut model, &space, vars, &Limits::default()).unwrap();
        let ground = space.ground();
        for (p, c) in model.constraints().iter().enumerate() {
            for &(v, coef) in c.expr().terms() {
                let s = space.get(v.index() - vars.var(0).index());
                let expected = i64::from(ground.contains(s, p + 1)) - i64::from(ground.contains(s, 0));
                assert_eq!(coef, expected);
                assert_ne!(expected, 0);
            }
        }
    }

    #[test]
    fn regularity_rows_compare_anchor_stars() {
        let (mut model, space, vars) =
            space_with_vars(ObjectSpace::k_subsets(GroundSet::new(7), 3));
        let emitted =
            subset_regular_equalities(&mut model, &space, vars, 1, &Limits::default()).unwrap();
        assert_eq!(emitted, 6);
        for c in model.constraints() {
            assert_eq!((c.sense(), c.rhs()), (Sense::Eq, 0));
            // 3-sets holding the reference element but not the anchor, and the
            // other way around: 2 * C(5, 2)
            assert_eq!(c.expr().len(), 20);
        }
    }

    #[test]
    fn coverage_rows_count_the_objects_missing_each_position() {
        let (mut model, space, vars) = space_with_vars(ObjectSpace::two_part(3, 3, 2, 2));
        let emitted = coverage(&mut model, &space, vars, &Limits::default()).unwrap();
        assert_eq!(emitted, 6);
        for c in model.constraints() {
            assert_eq!((c.sense(), c.rhs()), (Sense::Ge, 1));
            // dropping one element of either triple leaves C(2,2) * C(3,2) objects
            assert_eq!(c.expr().len(), 3);
        }
    }

    #[test]
    fn coverage_over_a_space_with_a_universal_element_is_empty_rowed() {
        // every object contains position 0
        let g = GroundSet::new(3);
        let space = ObjectSpace::k_subsets_filtered(g, 2, |s| g.contains(s, 0));
        let (mut model, space, vars) = space_with_vars(space);
        coverage(&mut model, &space, vars, &Limits::default()).unwrap();
        assert!(model.constraints()[0].expr().is_empty());
        assert!(!model.constraints()[0].satisfied_by(&[true, true]));
    }

    // -------------------------------------------------------------------------
    // Triangles
    // -------------------------------------------------------------------------

    #[test]
    fn triangle_support_ties_each_triangle_to_its_edges() {
        let g = GroundSet::new(4);
        let triangles = ObjectSpace::k_subsets(g, 3);
        let edges = ObjectSpace::k_subsets(g, 2);
        let mut model = Model::new();
        let tri_vars = model.add_binary_block(triangles.len());
        let edge_vars = model.add_binary_block(edges.len());

        let emitted = triangle_support(
            &mut model,
            &triangles,
            tri_vars,
            &edges,
            edge_vars,
            &Limits::default(),
        )
        .unwrap();
        assert_eq!(emitted, 4);
        for (t, c) in model.constraints().iter().enumerate() {
            assert_eq!((c.sense(), c.rhs()), (Sense::Ge, 0));
            assert_eq!(c.expr().len(), 4);
            let tri = triangles.get(t);
            for &(v, coef) in c.expr().terms() {
                if coef == -3 {
                    assert_eq!(v, tri_vars.var(t));
                } else {
                    assert_eq!(coef, 1);
                    let edge = edges.get(v.index() - edge_vars.var(0).index());
                    assert!(relation::is_subset_of(edge, tri));
                    assert_eq!(edge.weight(), 2);
                }
            }
        }
    }

    #[test]
    fn packing_rows_name_six_edges_for_disjoint_triangle_pairs() {
        let parts = VertexParts::new(&[2, 2, 2]);
        let triangles = ObjectSpace::multipartite(&parts, 3);
        let edges = ObjectSpace::multipartite(&parts, 2);
        let mut model = Model::new();
        let edge_vars = model.add_binary_block(edges.len());

        let emitted = forbid_disjoint_triangle_groups(
            &mut model,
            &triangles,
            &edges,
            edge_vars,
            2,
            &Limits::default(),
        )
        .unwrap();
        // triangles pair off with their part-wise complements
        assert_eq!(emitted, 4);
        for c in model.constraints() {
            assert_eq!((c.sense(), c.rhs()), (Sense::Le, 5));
            assert_eq!(c.expr().len(), 6);
            assert_eq!(row_indices(c).len(), 6, "edge variables must be distinct");
        }
    }

    #[test]
    fn edge_total_is_a_single_equality() {
        let mut model = Model::new();
        let edges = model.add_binary_block(6);
        edge_total(&mut model, edges, 4, &Limits::default()).unwrap();
        let c = &model.constraints()[0];
        assert_eq!((c.sense(), c.rhs()), (Sense::Eq, 4));
        assert_eq!(c.expr().len(), 6);
    }
}

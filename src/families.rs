//! Ready-made binary programs for the conjectures under study.
//!
//! Each builder validates its parameters, admits the object counts against
//! the budget, enumerates the spaces, synthesizes the constraint families and
//! the objective, and hands back a [`FamilyModel`] carrying everything a
//! caller needs to solve and report: the model, the spaces with their
//! variable blocks, the conjectured bound when one is wired in, and rendering
//! hints.
//!
//! Builders fail fast: parameter errors surface before any enumeration, and
//! nothing here panics on bad input.

use crate::bounds;
use crate::model::{BuildError, Limits, LinExpr, Model, VarBlock};
use crate::relation;
use crate::space::{GroundSet, ObjectSpace, Subset, VertexParts, MAX_GROUND};
use crate::synth::{self, PairRule};

// ============================================================================
// Family models
// ============================================================================

/// An object space together with the variable block indexing it.
#[derive(Clone, Debug)]
pub struct SpaceBlock {
    /// What the objects are, for reports ("sets", "edges", "triangles").
    pub name: &'static str,
    /// The enumerated space.
    pub space: ObjectSpace,
    /// One binary variable per object, in space order.
    pub vars: VarBlock,
}

/// A built binary program plus the context needed to interpret its solution.
#[derive(Clone, Debug)]
pub struct FamilyModel {
    /// The program itself.
    pub model: Model,
    /// The space the objective ranges over.
    pub primary: SpaceBlock,
    /// A supporting space with its own variables, if the family has one.
    pub secondary: Option<SpaceBlock>,
    /// Conjectured optimum, when a closed form is wired in.
    pub bound: Option<u128>,
    /// Human-readable description of the instance.
    pub label: String,
    /// The objective counts only members avoiding the reference element, and
    /// equals the family's diversity under the star domination rows.
    pub diversity_objective: bool,
    /// Render selected members largest-first.
    pub report_reversed: bool,
}

impl FamilyModel {
    /// Members of the primary space selected by `values`.
    pub fn selected(&self, values: &[bool]) -> Vec<Subset> {
        collect_block(&self.primary, values)
    }

    /// Members of the secondary space selected by `values`, or empty.
    pub fn secondary_selected(&self, values: &[bool]) -> Vec<Subset> {
        self.secondary
            .as_ref()
            .map_or_else(Vec::new, |block| collect_block(block, values))
    }
}

fn collect_block(block: &SpaceBlock, values: &[bool]) -> Vec<Subset> {
    block
        .space
        .iter()
        .enumerate()
        .filter(|&(i, _)| values[block.vars.var(i).index()])
        .map(|(_, s)| s)
        .collect()
}

/// Diversity of a family: its size minus the size of its largest star.
pub fn family_diversity(family: &[Subset]) -> i64 {
    let mut occupancy = [0i64; 64];
    for s in family {
        let mut bits = s.bits();
        while bits != 0 {
            occupancy[bits.trailing_zeros() as usize] += 1;
            bits &= bits - 1;
        }
    }
    let busiest = occupancy.iter().copied().max().unwrap_or(0);
    family.len() as i64 - busiest
}

// ============================================================================
// Shared validation
// ============================================================================

fn ground_set(n: usize) -> Result<GroundSet, BuildError> {
    if n == 0 {
        return Err(BuildError::EmptyGroundSet);
    }
    if n > MAX_GROUND {
        return Err(BuildError::GroundSetTooLarge { n });
    }
    Ok(GroundSet::new(n))
}

fn uniform_ground(n: usize, k: usize) -> Result<GroundSet, BuildError> {
    let ground = ground_set(n)?;
    if k > n {
        return Err(BuildError::CardinalityTooLarge { k, n });
    }
    Ok(ground)
}

fn block_model(space: &ObjectSpace) -> (Model, VarBlock) {
    let mut model = Model::new();
    let vars = model.add_binary_block(space.len());
    (model, vars)
}

/// Objective that counts selected members avoiding the reference element.
/// Under star domination this equals the family's diversity.
fn diversity_objective(model: &mut Model, space: &ObjectSpace, vars: VarBlock) {
    let e0 = space.ground().position_bit(0);
    let mut obj = LinExpr::new();
    for (i, s) in space.iter().enumerate() {
        obj.push(vars.var(i), i64::from(s.bits() & e0 == 0));
    }
    model.set_objective(obj);
}

// ============================================================================
// Antichains and chains
// ============================================================================

/// Largest antichain in the power set of `[n]`: no member contains another.
pub fn antichain(n: usize, limits: &Limits) -> Result<FamilyModel, BuildError> {
    let ground = ground_set(n)?;
    limits.admit_objects(ObjectSpace::power_set_len(n))?;
    let space = ObjectSpace::power_set(ground);
    let (mut model, vars) = block_model(&space);
    synth::pairwise_exclusion(&mut model, &space, vars, &[PairRule::Comparable], limits)?;
    model.set_objective(LinExpr::sum(vars.iter()));
    Ok(FamilyModel {
        model,
        primary: SpaceBlock {
            name: "sets",
            space,
            vars,
        },
        secondary: None,
        bound: Some(bounds::sperner_bound(n)),
        label: format!("antichain in 2^[{n}]"),
        diversity_objective: false,
        report_reversed: true,
    })
}

/// Largest antichain in `2^[n]` whose members pairwise differ in at most `d`
/// elements.
pub fn antichain_with_diameter(
    n: usize,
    d: usize,
    limits: &Limits,
) -> Result<FamilyModel, BuildError> {
    let ground = ground_set(n)?;
    limits.admit_objects(ObjectSpace::power_set_len(n))?;
    let space = ObjectSpace::power_set(ground);
    let (mut model, vars) = block_model(&space);
    synth::pairwise_exclusion(
        &mut model,
        &space,
        vars,
        &[PairRule::Comparable, PairRule::DiameterOver(d as u32)],
        limits,
    )?;
    model.set_objective(LinExpr::sum(vars.iter()));
    Ok(FamilyModel {
        model,
        primary: SpaceBlock {
            name: "sets",
            space,
            vars,
        },
        secondary: None,
        bound: Some(bounds::diameter_bound(n, d)),
        label: format!("antichain of diameter {d} in 2^[{n}]"),
        diversity_objective: false,
        report_reversed: true,
    })
}

/// Largest family in `2^[n]` of diameter at most `d` containing no chain of
/// `l + 1` strictly nested members.
pub fn chain_free_family(
    n: usize,
    d: usize,
    l: usize,
    limits: &Limits,
) -> Result<FamilyModel, BuildError> {
    let ground = ground_set(n)?;
    if l < 1 {
        return Err(BuildError::ParameterTooSmall {
            name: "l",
            value: l,
            min: 1,
        });
    }
    limits.admit_objects(ObjectSpace::power_set_len(n))?;
    let space = ObjectSpace::power_set(ground);
    let (mut model, vars) = block_model(&space);
    synth::pairwise_exclusion(
        &mut model,
        &space,
        vars,
        &[PairRule::DiameterOver(d as u32)],
        limits,
    )?;
    synth::chain_free(&mut model, &space, vars, l, limits)?;
    model.set_objective(LinExpr::sum(vars.iter()));
    Ok(FamilyModel {
        model,
        primary: SpaceBlock {
            name: "sets",
            space,
            vars,
        },
        secondary: None,
        bound: None,
        label: format!("{}-chain-free family of diameter {d} in 2^[{n}]", l + 1),
        diversity_objective: false,
        report_reversed: true,
    })
}

// ============================================================================
// Intersecting families and diversity
// ============================================================================

/// Maximum diversity of an intersecting family of `k`-subsets of `[n]`.
///
/// Star domination pins the busiest element to the reference one, so the
/// objective "members avoiding the reference element" is the diversity.
pub fn uniform_intersecting_diversity(
    n: usize,
    k: usize,
    limits: &Limits,
) -> Result<FamilyModel, BuildError> {
    let ground = uniform_ground(n, k)?;
    if k < 1 {
        return Err(BuildError::ParameterTooSmall {
            name: "k",
            value: k,
            min: 1,
        });
    }
    limits.admit_objects(ObjectSpace::k_subsets_len(n, k))?;
    let space = ObjectSpace::k_subsets(ground, k);
    let (mut model, vars) = block_model(&space);
    synth::pairwise_exclusion(&mut model, &space, vars, &[PairRule::Disjoint], limits)?;
    synth::star_domination(&mut model, &space, vars, limits)?;
    diversity_objective(&mut model, &space, vars);
    Ok(FamilyModel {
        model,
        primary: SpaceBlock {
            name: "sets",
            space,
            vars,
        },
        secondary: None,
        bound: bounds::uniform_diversity_bound(n, k),
        label: format!("diversity of an intersecting {k}-family on [{n}]"),
        diversity_objective: true,
        report_reversed: false,
    })
}

/// Maximum diversity of an intersecting family in the power set of `[2k]`.
pub fn powerset_intersecting_diversity(
    k: usize,
    limits: &Limits,
) -> Result<FamilyModel, BuildError> {
    if k < 1 {
        return Err(BuildError::ParameterTooSmall {
            name: "k",
            value: k,
            min: 1,
        });
    }
    let n = 2 * k;
    let ground = ground_set(n)?;
    limits.admit_objects(ObjectSpace::power_set_len(n))?;
    let space = ObjectSpace::power_set(ground);
    let (mut model, vars) = block_model(&space);
    synth::pairwise_exclusion(&mut model, &space, vars, &[PairRule::Disjoint], limits)?;
    synth::star_domination(&mut model, &space, vars, limits)?;
    diversity_objective(&mut model, &space, vars);
    Ok(FamilyModel {
        model,
        primary: SpaceBlock {
            name: "sets",
            space,
            vars,
        },
        secondary: None,
        bound: bounds::powerset_diversity_bound(k),
        label: format!("diversity of an intersecting family in 2^[{n}]"),
        diversity_objective: true,
        report_reversed: false,
    })
}

/// Largest intersecting family of two-part sets: `k` elements from the first
/// part of `n1`, `l` from the second part of `n2`, every ground element
/// avoided by some member.
pub fn two_part_intersecting(
    n1: usize,
    n2: usize,
    k: usize,
    l: usize,
    limits: &Limits,
) -> Result<FamilyModel, BuildError> {
    let n = n1 + n2;
    if n == 0 {
        return Err(BuildError::EmptyGroundSet);
    }
    if n > MAX_GROUND {
        return Err(BuildError::GroundSetTooLarge { n });
    }
    if k > n1 {
        return Err(BuildError::CardinalityTooLarge { k, n: n1 });
    }
    if l > n2 {
        return Err(BuildError::CardinalityTooLarge { k: l, n: n2 });
    }
    limits.admit_objects(ObjectSpace::two_part_len(n1, n2, k, l))?;
    let space = ObjectSpace::two_part(n1, n2, k, l);
    let (mut model, vars) = block_model(&space);
    synth::pairwise_exclusion(&mut model, &space, vars, &[PairRule::Disjoint], limits)?;
    synth::coverage(&mut model, &space, vars, limits)?;
    model.set_objective(LinExpr::sum(vars.iter()));
    Ok(FamilyModel {
        model,
        primary: SpaceBlock {
            name: "sets",
            space,
            vars,
        },
        secondary: None,
        bound: None,
        label: format!("two-part intersecting ({k}, {l})-family on [{n1}] + [{n2}]"),
        diversity_objective: false,
        report_reversed: false,
    })
}

/// One part of a declared ground partition, with its overlap threshold.
#[derive(Clone, Debug)]
pub struct PartThreshold {
    /// Ground positions of the part.
    pub members: Vec<usize>,
    /// Minimum overlap every family member must have with the part.
    pub min_overlap: usize,
}

/// Largest intersecting family of `k`-subsets meeting every declared part in
/// at least its threshold.
///
/// The parts must partition `[n]` exactly; thresholds above a part's size are
/// rejected. Thresholds that merely exceed `k` in total leave an empty space
/// and an honestly trivial model.
pub fn partition_intersecting(
    n: usize,
    k: usize,
    parts: &[PartThreshold],
    limits: &Limits,
) -> Result<FamilyModel, BuildError> {
    let ground = uniform_ground(n, k)?;
    let mut masks = Vec::with_capacity(parts.len());
    let mut covered = 0u64;
    for part in parts {
        let mut mask = 0u64;
        for &p in &part.members {
            if p >= n {
                return Err(BuildError::PartitionOutOfRange { position: p, n });
            }
            let bit = ground.position_bit(p);
            if covered & bit != 0 {
                return Err(BuildError::PartitionOverlap { position: p });
            }
            covered |= bit;
            mask |= bit;
        }
        masks.push(mask);
    }
    if covered != ground.full().bits() {
        return Err(BuildError::PartitionMismatch {
            covered: covered.count_ones() as usize,
            n,
        });
    }
    for (index, part) in parts.iter().enumerate() {
        if part.min_overlap > part.members.len() {
            return Err(BuildError::ThresholdUnreachable {
                index,
                min_overlap: part.min_overlap,
                size: part.members.len(),
            });
        }
    }

    // Admission uses the unfiltered count; the filter only shrinks it.
    limits.admit_objects(ObjectSpace::k_subsets_len(n, k))?;
    let space = ObjectSpace::k_subsets_filtered(ground, k, |s| {
        masks
            .iter()
            .zip(parts)
            .all(|(&mask, part)| relation::meets_threshold(s, mask, part.min_overlap as u32))
    });
    let (mut model, vars) = block_model(&space);
    synth::pairwise_exclusion(&mut model, &space, vars, &[PairRule::Disjoint], limits)?;
    model.set_objective(LinExpr::sum(vars.iter()));
    Ok(FamilyModel {
        model,
        primary: SpaceBlock {
            name: "sets",
            space,
            vars,
        },
        secondary: None,
        bound: None,
        label: format!(
            "partition intersecting {k}-family on [{n}] with {} parts",
            parts.len()
        ),
        diversity_objective: false,
        report_reversed: false,
    })
}

/// Largest intersecting family of `k`-subsets that is `s`-subset-regular:
/// every `s`-subset is contained in equally many members.
pub fn subset_regular_intersecting(
    n: usize,
    k: usize,
    s: usize,
    limits: &Limits,
) -> Result<FamilyModel, BuildError> {
    let ground = uniform_ground(n, k)?;
    if s >= k {
        return Err(BuildError::RegularityOrderTooLarge { s, k });
    }
    limits.admit_objects(ObjectSpace::k_subsets_len(n, k))?;
    limits.admit_objects(ObjectSpace::k_subsets_len(n, s))?;
    let space = ObjectSpace::k_subsets(ground, k);
    let (mut model, vars) = block_model(&space);
    synth::pairwise_exclusion(&mut model, &space, vars, &[PairRule::Disjoint], limits)?;
    synth::subset_regular_equalities(&mut model, &space, vars, s, limits)?;
    model.set_objective(LinExpr::sum(vars.iter()));
    Ok(FamilyModel {
        model,
        primary: SpaceBlock {
            name: "sets",
            space,
            vars,
        },
        secondary: None,
        bound: bounds::subset_regular_bound(n, k, s),
        label: format!("{s}-subset-regular intersecting {k}-family on [{n}]"),
        diversity_objective: false,
        report_reversed: false,
    })
}

/// Largest family in `2^[n]` without `m` pairwise disjoint members.
pub fn family_without_disjoint_group(
    n: usize,
    m: usize,
    limits: &Limits,
) -> Result<FamilyModel, BuildError> {
    let ground = ground_set(n)?;
    if m < 2 {
        return Err(BuildError::ParameterTooSmall {
            name: "m",
            value: m,
            min: 2,
        });
    }
    limits.admit_objects(ObjectSpace::power_set_len(n))?;
    let space = ObjectSpace::power_set(ground);
    let (mut model, vars) = block_model(&space);
    synth::disjoint_group_exclusion(&mut model, &space, vars, m, limits)?;
    model.set_objective(LinExpr::sum(vars.iter()));
    // The reference value is specific to nine elements and groups of four.
    let bound = if (n, m) == (9, 4) {
        Some(bounds::DISJOINT_FOUR_REFERENCE)
    } else {
        None
    };
    Ok(FamilyModel {
        model,
        primary: SpaceBlock {
            name: "sets",
            space,
            vars,
        },
        secondary: None,
        bound,
        label: format!("family on [{n}] without {m} pairwise disjoint members"),
        diversity_objective: false,
        report_reversed: false,
    })
}

// ============================================================================
// Graphs
// ============================================================================

/// Maximum number of triangles in a graph on `n` vertices with exactly `m`
/// edges. Triangle variables come first, then edge variables.
pub fn max_triangles(n: usize, m: usize, limits: &Limits) -> Result<FamilyModel, BuildError> {
    let ground = uniform_ground(n, 3)?;
    limits.admit_objects(ObjectSpace::k_subsets_len(n, 3))?;
    limits.admit_objects(ObjectSpace::k_subsets_len(n, 2))?;
    let triangles = ObjectSpace::k_subsets(ground, 3);
    let edges = ObjectSpace::k_subsets(ground, 2);
    let mut model = Model::new();
    let tri_vars = model.add_binary_block(triangles.len());
    let edge_vars = model.add_binary_block(edges.len());
    synth::triangle_support(&mut model, &triangles, tri_vars, &edges, edge_vars, limits)?;
    synth::edge_total(&mut model, edge_vars, m, limits)?;
    model.set_objective(LinExpr::sum(tri_vars.iter()));
    Ok(FamilyModel {
        model,
        primary: SpaceBlock {
            name: "triangles",
            space: triangles,
            vars: tri_vars,
        },
        secondary: Some(SpaceBlock {
            name: "edges",
            space: edges,
            vars: edge_vars,
        }),
        bound: Some(bounds::triangle_count_bound(n, m)),
        label: format!("max triangles on {n} vertices with {m} edges"),
        diversity_objective: false,
        report_reversed: false,
    })
}

/// Maximum number of edges in a multipartite graph with the given part sizes
/// containing no `k` vertex-disjoint triangles.
///
/// Only edges carry variables; candidate triangles exist just long enough to
/// drive the packing rows.
pub fn multipartite_kk3_free(
    part_sizes: &[usize],
    k: usize,
    limits: &Limits,
) -> Result<FamilyModel, BuildError> {
    if part_sizes.len() < 3 {
        return Err(BuildError::TooFewParts {
            needed: 3,
            parts: part_sizes.len(),
        });
    }
    for (index, &size) in part_sizes.iter().enumerate() {
        if size < 2 {
            return Err(BuildError::PartTooSmall {
                index,
                size,
                min: 2,
            });
        }
    }
    if k < 1 {
        return Err(BuildError::ParameterTooSmall {
            name: "k",
            value: k,
            min: 1,
        });
    }
    let total: usize = part_sizes.iter().sum();
    if total > MAX_GROUND {
        return Err(BuildError::GroundSetTooLarge { n: total });
    }

    let parts = VertexParts::new(part_sizes);
    limits.admit_objects(ObjectSpace::multipartite_len(&parts, 2))?;
    limits.admit_objects(ObjectSpace::multipartite_len(&parts, 3))?;
    let edges = ObjectSpace::multipartite(&parts, 2);
    let triangles = ObjectSpace::multipartite(&parts, 3);
    let (mut model, edge_vars) = block_model(&edges);
    synth::forbid_disjoint_triangle_groups(&mut model, &triangles, &edges, edge_vars, k, limits)?;
    model.set_objective(LinExpr::sum(edge_vars.iter()));

    let equal_four = part_sizes.len() == 4 && part_sizes.iter().all(|&s| s == part_sizes[0]);
    let bound = if equal_four {
        Some(bounds::four_part_kk3_bound(part_sizes[0], k))
    } else {
        None
    };
    Ok(FamilyModel {
        model,
        primary: SpaceBlock {
            name: "edges",
            space: edges,
            vars: edge_vars,
        },
        secondary: None,
        bound,
        label: format!("{k}K3-free multipartite graph with parts {part_sizes:?}"),
        diversity_objective: false,
        report_reversed: false,
    })
}

// ============================================================================
// Tests
// ============================================================================

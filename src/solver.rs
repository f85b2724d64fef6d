//! Solving binary programs behind a backend trait.
//!
//! [`SolverBackend`] is the seam between model construction and optimization:
//! rows go in as plain `(expr, sense, rhs)` triples, a verdict comes back.
//! [`BranchBound`] is the bundled exact backend, a depth-first branch and
//! bound over 0/1 assignments with per-row interval propagation, an objective
//! upper bound, and a randomized greedy warm start for the first incumbent.

use crate::model::{LinExpr, Model, Sense, VarId};
use rand::prelude::*;
use rand::rngs::SmallRng;
use std::collections::BTreeMap;

// ============================================================================
// Outcomes and errors
// ============================================================================

/// A feasible assignment together with its objective value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    /// Objective value of the assignment.
    pub objective: i64,
    /// One value per variable, in handle order.
    pub values: Vec<bool>,
}

/// Verdict of a solve.
///
/// Infeasibility is a normal outcome, not an error: several constraint
/// families are expected to rule out every assignment for some parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveOutcome {
    /// A provably optimal assignment.
    Optimal(Solution),
    /// No assignment satisfies every row.
    Infeasible,
    /// The objective can grow without bound. Binary programs are finite, so
    /// the bundled backend never reports this; the variant exists for
    /// backends with a relaxation phase.
    Unbounded,
}

/// Failure of the solve itself, as opposed to a verdict about the model.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SolverError {
    /// The node budget ran out before the tree was exhausted. Any incumbent
    /// found so far is unproven and is deliberately not returned.
    #[error("node limit reached after {explored} nodes")]
    NodeLimit {
        /// Nodes explored before giving up.
        explored: u64,
    },
    /// An external backend failed for reasons of its own.
    #[error("solver backend failure: {0}")]
    Backend(String),
}

// ============================================================================
// Backend trait
// ============================================================================

/// An optimizer for binary programs.
///
/// Variables are created one at a time and must be handed out with sequential
/// indices starting at zero, matching the handles of the [`Model`] being
/// loaded. The objective is always maximized.
pub trait SolverBackend {
    /// Creates the next binary variable.
    fn add_variable(&mut self) -> VarId;
    /// Loads one linear row.
    fn add_constraint(&mut self, expr: &LinExpr, sense: Sense, rhs: i64);
    /// Replaces the objective.
    fn set_objective(&mut self, expr: &LinExpr);
    /// Runs the optimization.
    fn solve(&mut self) -> Result<SolveOutcome, SolverError>;
}

/// Loads `model` into `backend` and solves it.
pub fn solve(
    model: &Model,
    backend: &mut impl SolverBackend,
) -> Result<SolveOutcome, SolverError> {
    for i in 0..model.binary_count() {
        let v = backend.add_variable();
        debug_assert_eq!(v.index(), i, "backend handles must be sequential");
    }
    for c in model.constraints() {
        backend.add_constraint(c.expr(), c.sense(), c.rhs());
    }
    backend.set_objective(model.objective());
    backend.solve()
}

// ============================================================================
// Bundled branch and bound
// ============================================================================

/// Knobs of the bundled backend.
#[derive(Clone, Debug)]
pub struct BranchBoundConfig {
    /// Base seed for the warm-start randomization. The exact phase is
    /// deterministic regardless.
    pub seed: u64,
    /// Greedy warm-start attempts before the exact phase. Zero disables the
    /// warm start.
    pub warm_starts: usize,
    /// Maximum assignments the exact phase may apply.
    pub node_limit: u64,
}

impl Default for BranchBoundConfig {
    fn default() -> Self {
        Self {
            seed: 0xD1CE_5EED,
            warm_starts: 4,
            node_limit: 100_000_000,
        }
    }
}

/// One canonicalized row: duplicate variables folded, zero coefficients
/// dropped, terms sorted by variable.
#[derive(Clone, Debug)]
struct Row {
    terms: Vec<(u32, i64)>,
    sense: Sense,
    rhs: i64,
}

/// Exact depth-first branch and bound over 0/1 assignments.
#[derive(Clone, Debug, Default)]
pub struct BranchBound {
    cfg: BranchBoundConfig,
    vars: u32,
    rows: Vec<Row>,
    objective: Vec<(u32, i64)>,
}

impl BranchBound {
    /// Creates a backend with the given knobs.
    pub fn new(cfg: BranchBoundConfig) -> Self {
        Self {
            cfg,
            ..Self::default()
        }
    }
}

fn canonical_terms(expr: &LinExpr) -> Vec<(u32, i64)> {
    let mut folded: BTreeMap<u32, i64> = BTreeMap::new();
    for &(v, c) in expr.terms() {
        *folded.entry(v.index() as u32).or_insert(0) += c;
    }
    folded.into_iter().filter(|&(_, c)| c != 0).collect()
}

impl SolverBackend for BranchBound {
    fn add_variable(&mut self) -> VarId {
        let v = VarId::new(self.vars);
        self.vars += 1;
        v
    }

    fn add_constraint(&mut self, expr: &LinExpr, sense: Sense, rhs: i64) {
        let terms = canonical_terms(expr);
        debug_assert!(
            terms.iter().all(|&(v, _)| v < self.vars),
            "row names a variable that was never created"
        );
        self.rows.push(Row { terms, sense, rhs });
    }

    fn set_objective(&mut self, expr: &LinExpr) {
        let terms = canonical_terms(expr);
        debug_assert!(terms.iter().all(|&(v, _)| v < self.vars));
        self.objective = terms;
    }

    fn solve(&mut self) -> Result<SolveOutcome, SolverError> {
        let mut search = Search::new(self);

        // A row violated with everything still open stays violated forever.
        // This also settles rows with no variables at all.
        for r in 0..search.row_rhs.len() {
            if !search.row_ok(r) {
                return Ok(SolveOutcome::Infeasible);
            }
        }

        let n = self.vars as usize;
        if n == 0 {
            return Ok(SolveOutcome::Optimal(Solution {
                objective: 0,
                values: Vec::new(),
            }));
        }

        // Branch on the most valuable variables first.
        let mut order: Vec<u32> = (0..self.vars).collect();
        order.sort_by_key(|&v| (std::cmp::Reverse(search.obj[v as usize]), v));

        let mut incumbent: Option<(i64, Vec<bool>)> = None;
        for attempt in 0..self.cfg.warm_starts {
            let mut rng = SmallRng::seed_from_u64(splitmix64(self.cfg.seed ^ attempt as u64));
            let mut shuffled = order.clone();
            shuffled.shuffle(&mut rng);
            if let Some((objective, values)) = search.greedy_attempt(&shuffled, &mut rng) {
                if incumbent.as_ref().is_none_or(|(best, _)| objective > *best) {
                    tracing::debug!(attempt, objective, "warm start found an incumbent");
                    incumbent = Some((objective, values));
                }
            }
        }

        search.exact(&order, incumbent, self.cfg.node_limit)
    }
}

// ============================================================================
// Search state
// ============================================================================

/// Working state of one solve: per-row interval bookkeeping with undo, plus
/// the objective's fixed part and remaining positive room.
struct Search {
    columns: Vec<Vec<(u32, i64)>>,
    row_sense: Vec<Sense>,
    row_rhs: Vec<i64>,
    row_fixed: Vec<i64>,
    row_neg: Vec<i64>,
    row_pos: Vec<i64>,
    obj: Vec<i64>,
    obj_fixed: i64,
    obj_pos_room: i64,
    values: Vec<bool>,
    explored: u64,
}

/// One branching decision. `second` marks the flipped retry.
struct Frame {
    var: u32,
    value: bool,
    second: bool,
}

impl Search {
    fn new(backend: &BranchBound) -> Self {
        let n = backend.vars as usize;
        let mut columns = vec![Vec::new(); n];
        let mut row_sense = Vec::with_capacity(backend.rows.len());
        let mut row_rhs = Vec::with_capacity(backend.rows.len());
        let mut row_neg = Vec::with_capacity(backend.rows.len());
        let mut row_pos = Vec::with_capacity(backend.rows.len());
        for (r, row) in backend.rows.iter().enumerate() {
            let mut neg = 0i64;
            let mut pos = 0i64;
            for &(v, c) in &row.terms {
                columns[v as usize].push((r as u32, c));
                if c < 0 {
                    neg += c;
                } else {
                    pos += c;
                }
            }
            row_sense.push(row.sense);
            row_rhs.push(row.rhs);
            row_neg.push(neg);
            row_pos.push(pos);
        }

        let mut obj = vec![0i64; n];
        for &(v, c) in &backend.objective {
            obj[v as usize] = c;
        }
        let obj_pos_room = obj.iter().map(|&c| c.max(0)).sum();

        Self {
            columns,
            row_sense,
            row_rhs,
            row_fixed: vec![0; backend.rows.len()],
            row_neg,
            row_pos,
            obj,
            obj_fixed: 0,
            obj_pos_room,
            values: vec![false; n],
            explored: 0,
        }
    }

    /// Whether some completion of the current partial assignment can still
    /// satisfy row `r`, judged by its value interval.
    #[inline]
    fn row_ok(&self, r: usize) -> bool {
        let lo = self.row_fixed[r] + self.row_neg[r];
        let hi = self.row_fixed[r] + self.row_pos[r];
        match self.row_sense[r] {
            Sense::Le => lo <= self.row_rhs[r],
            Sense::Ge => hi >= self.row_rhs[r],
            Sense::Eq => lo <= self.row_rhs[r] && hi >= self.row_rhs[r],
        }
    }

    /// Checks the rows touched by `v`. Untouched rows kept their intervals.
    #[inline]
    fn touched_ok(&self, v: u32) -> bool {
        self.columns[v as usize]
            .iter()
            .all(|&(r, _)| self.row_ok(r as usize))
    }

    #[inline]
    fn assign(&mut self, v: u32, value: bool) {
        self.values[v as usize] = value;
        for &(r, c) in &self.columns[v as usize] {
            let r = r as usize;
            if value {
                self.row_fixed[r] += c;
            }
            if c < 0 {
                self.row_neg[r] -= c;
            } else {
                self.row_pos[r] -= c;
            }
        }
        let oc = self.obj[v as usize];
        if value {
            self.obj_fixed += oc;
        }
        if oc > 0 {
            self.obj_pos_room -= oc;
        }
    }

    #[inline]
    fn unassign(&mut self, v: u32, value: bool) {
        for &(r, c) in &self.columns[v as usize] {
            let r = r as usize;
            if value {
                self.row_fixed[r] -= c;
            }
            if c < 0 {
                self.row_neg[r] += c;
            } else {
                self.row_pos[r] += c;
            }
        }
        let oc = self.obj[v as usize];
        if value {
            self.obj_fixed -= oc;
        }
        if oc > 0 {
            self.obj_pos_room += oc;
        }
    }

    /// No completion can beat `best`, so the branch is dead.
    #[inline]
    fn beats(&self, incumbent: &Option<(i64, Vec<bool>)>) -> bool {
        match incumbent {
            Some((best, _)) => self.obj_fixed + self.obj_pos_room > *best,
            None => true,
        }
    }

    /// Value worth trying first: the one that grows the objective.
    #[inline]
    fn preferred(&self, v: u32) -> bool {
        self.obj[v as usize] >= 0
    }

    /// One randomized greedy pass over `order`: assign each variable its
    /// preferred value, flip on an interval violation, give up when both
    /// values break a row. Restores the state before returning.
    fn greedy_attempt(
        &mut self,
        order: &[u32],
        rng: &mut SmallRng,
    ) -> Option<(i64, Vec<bool>)> {
        let mut log: Vec<(u32, bool)> = Vec::with_capacity(order.len());
        let mut complete = true;
        for &v in order {
            let mut want = match self.obj[v as usize] {
                c if c > 0 => true,
                c if c < 0 => false,
                _ => rng.random_bool(0.5),
            };
            if rng.random_bool(0.1) {
                want = !want;
            }
            self.assign(v, want);
            if !self.touched_ok(v) {
                self.unassign(v, want);
                self.assign(v, !want);
                if !self.touched_ok(v) {
                    self.unassign(v, !want);
                    complete = false;
                    break;
                }
                log.push((v, !want));
            } else {
                log.push((v, want));
            }
        }

        let result = if complete {
            Some((self.obj_fixed, self.values.clone()))
        } else {
            None
        };
        for &(v, value) in log.iter().rev() {
            self.unassign(v, value);
        }
        result
    }

    /// Exhausts the branching tree rooted at the empty assignment. Every
    /// applied assignment costs one node against `node_limit`.
    fn exact(
        &mut self,
        order: &[u32],
        mut incumbent: Option<(i64, Vec<bool>)>,
        node_limit: u64,
    ) -> Result<SolveOutcome, SolverError> {
        let n = order.len();
        let mut stack: Vec<Frame> = Vec::with_capacity(n);

        let first = order[0];
        let value = self.preferred(first);
        self.assign(first, value);
        self.explored = 1;
        stack.push(Frame {
            var: first,
            value,
            second: false,
        });

        while let Some(top) = stack.last() {
            if self.explored > node_limit {
                return Err(SolverError::NodeLimit {
                    explored: self.explored,
                });
            }

            let alive = self.touched_ok(top.var) && self.beats(&incumbent);
            if alive {
                if stack.len() == n {
                    // Strict improvement only; the incumbent bound already
                    // rules out ties.
                    incumbent = Some((self.obj_fixed, self.values.clone()));
                } else {
                    let v = order[stack.len()];
                    let value = self.preferred(v);
                    self.assign(v, value);
                    self.explored += 1;
                    stack.push(Frame {
                        var: v,
                        value,
                        second: false,
                    });
                    continue;
                }
            }

            // Backtrack to the deepest untried flip.
            while let Some(frame) = stack.pop() {
                self.unassign(frame.var, frame.value);
                if !frame.second {
                    let flipped = !frame.value;
                    self.assign(frame.var, flipped);
                    self.explored += 1;
                    stack.push(Frame {
                        var: frame.var,
                        value: flipped,
                        second: true,
                    });
                    break;
                }
            }
        }

        tracing::debug!(nodes = self.explored, "exact phase exhausted the tree");
        match incumbent {
            Some((objective, values)) => Ok(SolveOutcome::Optimal(Solution { objective, values })),
            None => Ok(SolveOutcome::Infeasible),
        }
    }
}

/// SplitMix64 mixer for deriving per-attempt seeds from a base seed.
#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

// ============================================================================
// Tests
// ============================================================================

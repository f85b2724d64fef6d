//! Binary integer program containers: variables, rows, budgets, build errors.

use std::fmt;

// ============================================================================
// Variables
// ============================================================================

/// Handle to one binary variable of a model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(u32);

impl VarId {
    /// Wraps a raw variable index.
    #[inline(always)]
    pub const fn new(raw: u32) -> Self {
        VarId(raw)
    }

    /// Returns the index into a dense assignment vector.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A contiguous block of variable handles, one per object of a space.
///
/// Object index `i` of the space maps to `block.var(i)` in `O(1)`; there is no
/// per-object lookup table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VarBlock {
    start: u32,
    len: u32,
}

impl VarBlock {
    /// Returns the handle of the `i`-th variable in the block.
    #[inline(always)]
    pub fn var(self, i: usize) -> VarId {
        debug_assert!(i < self.len as usize, "variable {i} outside block of {}", self.len);
        VarId(self.start + i as u32)
    }

    /// Returns the number of variables in the block.
    #[inline(always)]
    pub const fn len(self) -> usize {
        self.len as usize
    }

    /// Returns whether the block is empty.
    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    /// Iterates the handles of the block in index order.
    pub fn iter(self) -> impl Iterator<Item = VarId> {
        (self.start..self.start + self.len).map(VarId)
    }
}

// ============================================================================
// Rows
// ============================================================================

/// Row sense: how the left-hand side compares to the right-hand side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sense {
    /// Left-hand side at most the right-hand side.
    Le,
    /// Left-hand side equal to the right-hand side.
    Eq,
    /// Left-hand side at least the right-hand side.
    Ge,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Le => write!(f, "<="),
            Sense::Eq => write!(f, "="),
            Sense::Ge => write!(f, ">="),
        }
    }
}

/// A linear expression: integer-weighted binary variables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinExpr {
    terms: Vec<(VarId, i64)>,
}

impl LinExpr {
    /// Creates an empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty expression with reserved capacity.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            terms: Vec::with_capacity(cap),
        }
    }

    /// Builds the unit-coefficient sum of `vars`.
    pub fn sum<I: IntoIterator<Item = VarId>>(vars: I) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1)).collect(),
        }
    }

    /// Appends `coef * var`. Zero coefficients are dropped, so callers can
    /// push net coefficients without filtering first.
    #[inline]
    pub fn push(&mut self, var: VarId, coef: i64) {
        if coef != 0 {
            self.terms.push((var, coef));
        }
    }

    /// Returns the terms in insertion order.
    #[inline(always)]
    pub fn terms(&self) -> &[(VarId, i64)] {
        &self.terms
    }

    /// Returns the number of terms.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns whether the expression has no terms.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression under a dense 0/1 assignment.
    pub fn evaluate(&self, values: &[bool]) -> i64 {
        self.terms
            .iter()
            .map(|&(v, c)| if values[v.index()] { c } else { 0 })
            .sum()
    }
}

/// One linear row of a model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    expr: LinExpr,
    sense: Sense,
    rhs: i64,
}

impl Constraint {
    /// Builds `expr <= rhs`.
    pub fn le(expr: LinExpr, rhs: i64) -> Self {
        Self {
            expr,
            sense: Sense::Le,
            rhs,
        }
    }

    /// Builds `expr = rhs`.
    pub fn eq(expr: LinExpr, rhs: i64) -> Self {
        Self {
            expr,
            sense: Sense::Eq,
            rhs,
        }
    }

    /// Builds `expr >= rhs`.
    pub fn ge(expr: LinExpr, rhs: i64) -> Self {
        Self {
            expr,
            sense: Sense::Ge,
            rhs,
        }
    }

    /// Returns the left-hand side.
    #[inline(always)]
    pub fn expr(&self) -> &LinExpr {
        &self.expr
    }

    /// Returns the sense.
    #[inline(always)]
    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Returns the right-hand side.
    #[inline(always)]
    pub fn rhs(&self) -> i64 {
        self.rhs
    }

    /// Checks the row under a dense 0/1 assignment.
    pub fn satisfied_by(&self, values: &[bool]) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            Sense::Le => lhs <= self.rhs,
            Sense::Eq => lhs == self.rhs,
            Sense::Ge => lhs >= self.rhs,
        }
    }
}

// ============================================================================
// Budgets
// ============================================================================

/// Safety budgets on combinatorial growth.
///
/// Object counts are admitted from `u128` prechecks before anything is
/// enumerated; constraint counts are admitted row by row during synthesis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Largest admissible object space.
    pub max_objects: usize,
    /// Largest admissible number of rows in one model.
    pub max_constraints: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_objects: 1 << 20,
            max_constraints: 2_000_000,
        }
    }
}

impl Limits {
    /// Admits an object count, returning it narrowed to `usize`.
    pub fn admit_objects(&self, required: u128) -> Result<usize, BuildError> {
        if required > self.max_objects as u128 {
            return Err(BuildError::TooManyObjects {
                required,
                limit: self.max_objects,
            });
        }
        Ok(required as usize)
    }

    /// Admits one more constraint on top of `current` rows.
    #[inline]
    pub fn admit_constraint(&self, current: usize, family: &'static str) -> Result<(), BuildError> {
        if current >= self.max_constraints {
            return Err(BuildError::TooManyConstraints {
                family,
                limit: self.max_constraints,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Model
// ============================================================================

/// A binary integer program: binary variables, linear rows, and a maximize
/// objective. Built once, then handed to a solver backend.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Model {
    binaries: u32,
    constraints: Vec<Constraint>,
    objective: LinExpr,
}

impl Model {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a contiguous block of `len` fresh binary variables.
    pub fn add_binary_block(&mut self, len: usize) -> VarBlock {
        debug_assert!(len <= u32::MAX as usize - self.binaries as usize);
        let block = VarBlock {
            start: self.binaries,
            len: len as u32,
        };
        self.binaries += len as u32;
        block
    }

    /// Returns the number of variables.
    #[inline(always)]
    pub fn binary_count(&self) -> usize {
        self.binaries as usize
    }

    /// Appends a row unconditionally.
    pub fn add_constraint(&mut self, c: Constraint) {
        self.constraints.push(c);
    }

    /// Appends a row if the budget admits one more.
    pub fn try_add_constraint(
        &mut self,
        c: Constraint,
        limits: &Limits,
        family: &'static str,
    ) -> Result<(), BuildError> {
        limits.admit_constraint(self.constraints.len(), family)?;
        self.constraints.push(c);
        Ok(())
    }

    /// Returns the rows in emission order.
    #[inline(always)]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Sets the maximize objective.
    pub fn set_objective(&mut self, objective: LinExpr) {
        self.objective = objective;
    }

    /// Returns the maximize objective.
    #[inline(always)]
    pub fn objective(&self) -> &LinExpr {
        &self.objective
    }
}

// ============================================================================
// Build errors
// ============================================================================

/// Parameter and budget failures raised while building a model.
///
/// Degenerate-but-coherent inputs are not errors: raw generators are total
/// and a filtered space may legitimately come out empty. These variants cover
/// structurally impossible parameters and exhausted safety budgets.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// The ground set has no elements.
    #[error("ground set must have at least one element")]
    EmptyGroundSet,
    /// The ground set does not fit one `u64` code.
    #[error("ground set has {n} elements; this implementation supports n <= 64")]
    GroundSetTooLarge {
        /// Requested element count.
        n: usize,
    },
    /// A uniform subset size exceeds the ground set.
    #[error("subset size {k} exceeds ground set size {n}")]
    CardinalityTooLarge {
        /// Requested subset size.
        k: usize,
        /// Ground set size.
        n: usize,
    },
    /// A numeric parameter is below its admissible minimum.
    #[error("parameter {name} is {value}; it must be at least {min}")]
    ParameterTooSmall {
        /// Parameter name as spelled in the builder signature.
        name: &'static str,
        /// Offending value.
        value: usize,
        /// Smallest admissible value.
        min: usize,
    },
    /// The regularity order must leave room inside the subsets it constrains.
    #[error("regularity order {s} must be smaller than subset size {k}")]
    RegularityOrderTooLarge {
        /// Requested regularity order.
        s: usize,
        /// Uniform subset size.
        k: usize,
    },
    /// Declared parts miss some ground elements.
    #[error("parts cover {covered} of {n} ground elements")]
    PartitionMismatch {
        /// Number of positions covered by the parts.
        covered: usize,
        /// Ground set size.
        n: usize,
    },
    /// Declared parts reuse a ground element.
    #[error("ground position {position} appears in more than one part")]
    PartitionOverlap {
        /// The repeated position.
        position: usize,
    },
    /// A declared part names a position the ground set does not have.
    #[error("part names position {position} but the ground set has {n} elements")]
    PartitionOutOfRange {
        /// The out-of-range position.
        position: usize,
        /// Ground set size.
        n: usize,
    },
    /// A part demands more overlap than it has members.
    #[error("part {index} asks for overlap {min_overlap} but has only {size} members")]
    ThresholdUnreachable {
        /// Part index in declaration order.
        index: usize,
        /// Requested minimum overlap.
        min_overlap: usize,
        /// Member count of the part.
        size: usize,
    },
    /// A vertex part is too small for the structure it must host.
    #[error("part {index} has {size} vertices; every part needs at least {min}")]
    PartTooSmall {
        /// Part index in declaration order.
        index: usize,
        /// Declared size.
        size: usize,
        /// Smallest admissible size.
        min: usize,
    },
    /// Fewer parts were declared than the structure spans.
    #[error("{needed} parts are needed but only {parts} were declared")]
    TooFewParts {
        /// Parts the structure spans.
        needed: usize,
        /// Parts declared.
        parts: usize,
    },
    /// The object space would blow the object budget.
    #[error("{required} objects requested but the budget allows {limit}")]
    TooManyObjects {
        /// Objects the parameters would enumerate.
        required: u128,
        /// Configured object budget.
        limit: usize,
    },
    /// Synthesis would blow the constraint budget.
    #[error("constraint budget of {limit} exhausted while emitting {family} rows")]
    TooManyConstraints {
        /// Constraint family being emitted.
        family: &'static str,
        /// Configured constraint budget.
        limit: usize,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Blocks and handles
    // -------------------------------------------------------------------------

    #[test]
    fn blocks_allocate_contiguously() {
        let mut model = Model::new();
        let a = model.add_binary_block(3);
        let b = model.add_binary_block(2);
        assert_eq!(model.binary_count(), 5);
        assert_eq!(a.var(0).index(), 0);
        assert_eq!(a.var(2).index(), 2);
        assert_eq!(b.var(0).index(), 3);
        assert_eq!(b.var(1).index(), 4);
        assert_eq!(a.iter().map(VarId::index).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(b.len(), 2);
        assert!(!b.is_empty());
        assert!(Model::new().add_binary_block(0).is_empty());
    }

    // -------------------------------------------------------------------------
    // Expressions and rows
    // -------------------------------------------------------------------------

    #[test]
    fn push_drops_zero_coefficients() {
        let mut expr = LinExpr::new();
        expr.push(VarId::new(0), 1);
        expr.push(VarId::new(1), 0);
        expr.push(VarId::new(2), -3);
        assert_eq!(expr.len(), 2);
        assert_eq!(expr.terms(), &[(VarId::new(0), 1), (VarId::new(2), -3)]);
    }

    #[test]
    fn evaluate_weighs_selected_variables() {
        let mut expr = LinExpr::sum((0..3).map(VarId::new));
        expr.push(VarId::new(3), -3);
        assert_eq!(expr.evaluate(&[true, false, true, false]), 2);
        assert_eq!(expr.evaluate(&[true, true, true, true]), 0);
        assert_eq!(LinExpr::new().evaluate(&[]), 0);
    }

    #[test]
    fn senses_check_as_written() {
        let expr = LinExpr::sum((0..2).map(VarId::new));
        let both = [true, true];
        let one = [true, false];
        assert!(Constraint::le(expr.clone(), 1).satisfied_by(&one));
        assert!(!Constraint::le(expr.clone(), 1).satisfied_by(&both));
        assert!(Constraint::eq(expr.clone(), 2).satisfied_by(&both));
        assert!(!Constraint::eq(expr.clone(), 2).satisfied_by(&one));
        assert!(Constraint::ge(expr.clone(), 2).satisfied_by(&both));
        assert!(!Constraint::ge(expr, 2).satisfied_by(&one));
    }

    #[test]
    fn sense_display_matches_convention() {
        assert_eq!(Sense::Le.to_string(), "<=");
        assert_eq!(Sense::Eq.to_string(), "=");
        assert_eq!(Sense::Ge.to_string(), ">=");
    }

    // -------------------------------------------------------------------------
    // Budgets
    // -------------------------------------------------------------------------

    #[test]
    fn object_budget_admits_up_to_the_limit() {
        let limits = Limits {
            max_objects: 100,
            max_constraints: 10,
        };
        assert_eq!(limits.admit_objects(100), Ok(100));
        let err = limits.admit_objects(101).unwrap_err();
        assert_eq!(
            err,
            BuildError::TooManyObjects {
                required: 101,
                limit: 100
            }
        );
    }

    #[test]
    fn constraint_budget_stops_further_rows() {
        let limits = Limits {
            max_objects: 100,
            max_constraints: 2,
        };
        let mut model = Model::new();
        let block = model.add_binary_block(2);
        let row = || Constraint::le(LinExpr::sum(block.iter()), 1);
        assert!(model.try_add_constraint(row(), &limits, "pairwise").is_ok());
        assert!(model.try_add_constraint(row(), &limits, "pairwise").is_ok());
        let err = model.try_add_constraint(row(), &limits, "pairwise").unwrap_err();
        assert_eq!(
            err,
            BuildError::TooManyConstraints {
                family: "pairwise",
                limit: 2
            }
        );
        assert_eq!(model.constraints().len(), 2);
    }

    #[test]
    fn identically_built_models_compare_equal() {
        let build = || {
            let mut model = Model::new();
            let block = model.add_binary_block(3);
            model.add_constraint(Constraint::le(LinExpr::sum(block.iter()), 2));
            model.set_objective(LinExpr::sum(block.iter()));
            model
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn errors_render_lowercase_messages() {
        let err = BuildError::CardinalityTooLarge { k: 9, n: 4 };
        assert_eq!(err.to_string(), "subset size 9 exceeds ground set size 4");
        let err = BuildError::TooManyObjects {
            required: 1 << 30,
            limit: 1 << 20,
        };
        assert!(err.to_string().contains("budget"));
    }
}

//! # Extremal Combinatorics Explorer
//!
//! A Rust library for testing conjectured bounds in extremal set theory and
//! extremal graph theory by exact optimization.
//!
//! This crate provides:
//! - Compact `u64`-coded enumeration of combinatorial object spaces (power
//!   sets, uniform layers, multipartite edge and triangle sets) in ascending
//!   code order, so containment never points backwards.
//! - Constraint synthesis turning exact predicates and backtracking searches
//!   (chains, disjoint groups, triangle packings) into linear rows.
//! - A binary-program container with object and constraint budgets, solved
//!   behind a backend trait by a bundled exact branch and bound.
//! - Ready-made models for the conjectures under study, with their
//!   conjectured closed-form bounds wired in, and a parallel batch driver.
//!
//! ## Quick Start
//!
//! ```
//! use extremal::families;
//! use extremal::model::Limits;
//! use extremal::solver::{solve, BranchBound, BranchBoundConfig, SolveOutcome};
//!
//! // Sperner: the largest antichain in 2^[3] has 3 members
//! let fm = families::antichain(3, &Limits::default()).unwrap();
//! let mut backend = BranchBound::new(BranchBoundConfig::default());
//! match solve(&fm.model, &mut backend).unwrap() {
//!     SolveOutcome::Optimal(sol) => {
//!         assert_eq!(sol.objective, 3);
//!         assert_eq!(Some(sol.objective as u128), fm.bound);
//!     }
//!     other => panic!("unexpected verdict: {other:?}"),
//! }
//! ```
//!
//! ## Running a Batch
//!
//! ```no_run
//! use extremal::runner::{demo_suite, run_batch, RunConfig};
//!
//! // Solve a small instance of every family in parallel
//! let reports = run_batch(&demo_suite(), &RunConfig::default());
//! assert_eq!(reports.len(), 12);
//! ```
//!
//! ## Working with Spaces Directly
//!
//! ```
//! use extremal::space::{GroundSet, ObjectSpace};
//!
//! let ground = GroundSet::new(4);
//! let pairs = ObjectSpace::k_subsets(ground, 2);
//! assert_eq!(pairs.len(), 6);
//! assert!(pairs.iter().all(|s| s.weight() == 2));
//!
//! // codes ascend, and a subset always precedes its supersets
//! let full = ObjectSpace::power_set(ground);
//! assert_eq!(full.len(), 16);
//! ```
//!
//! ## Modules
//!
//! - [`space`]: Ground sets, subset codes, and object space enumeration.
//! - [`relation`]: Exact pairwise and group predicates on subsets.
//! - [`synth`]: Constraint synthesis from predicates and backtracking.
//! - [`model`]: Binary-program container, budgets, and build errors.
//! - [`solver`]: Backend trait and the bundled exact branch and bound.
//! - [`bounds`]: Conjectured closed-form bounds and exact binomials.
//! - [`families`]: Ready-made models for each conjecture.
//! - [`runner`]: Parallel batch driver and reporting.
//!
//! ## Performance Notes
//!
//! - Object codes are single `u64` words, limiting ground sets to 64
//!   elements.
//! - Spaces are sorted arenas; membership lookup is a binary search.
//! - The bundled solver is exact and exponential in the worst case; size
//!   instances accordingly or raise its node limit deliberately.
//! - For maximum performance, compile with: `RUSTFLAGS="-C target-cpu=native" cargo build --release`

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::inline_always)] // Intentional for hot-path code
#![allow(clippy::many_single_char_names)] // Mathematical variable names
#![allow(clippy::needless_range_loop)] // Often clearer for coefficient indexing
#![allow(clippy::doc_markdown)] // LaTeX-style notation in docs
#![allow(clippy::multiple_crate_versions)] // Cargo.lock management is external

pub mod bounds;
pub mod families;
pub mod model;
pub mod relation;
pub mod runner;
pub mod solver;
pub mod space;
pub mod synth;

/// Re-export commonly used types for convenience.
pub mod prelude {
    pub use crate::families::{FamilyModel, PartThreshold, SpaceBlock};
    pub use crate::model::{BuildError, Limits, Model};
    pub use crate::runner::{demo_suite, run_batch, RunConfig, RunOutcome, RunReport, RunRequest};
    pub use crate::solver::{
        solve, BranchBound, BranchBoundConfig, SolveOutcome, SolverBackend, SolverError,
    };
    pub use crate::space::{GroundSet, ObjectSpace, Subset};
}

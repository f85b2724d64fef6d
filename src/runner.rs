//! Batch driver: building, solving, and reporting family models in parallel.
//!
//! Requests fan out over a rayon pool; each worker builds its model, solves
//! it with a fresh backend, prints its report as soon as it lands, and parks
//! the report in a lock-free queue. The drained batch comes back in request
//! order. Build and solver failures are outcomes, not panics: one bad request
//! never takes down the batch.

use crate::families::{self, FamilyModel, PartThreshold};
use crate::model::{BuildError, Limits};
use crate::solver::{solve, BranchBound, BranchBoundConfig, SolveOutcome, SolverError};
use crate::space::{GroundSet, Subset};
use crossbeam::queue::ArrayQueue;
use rayon::prelude::*;
use std::fmt::Write as _;
use std::time::{Duration, Instant};

/// Selected members beyond this many are summarized as a count.
const RENDER_MEMBER_CAP: usize = 32;

// ============================================================================
// Requests
// ============================================================================

/// One family instance to build and solve.
#[derive(Clone, Debug)]
pub enum RunRequest {
    /// Largest antichain in `2^[n]`.
    Antichain {
        /// Ground set size.
        n: usize,
    },
    /// Largest antichain of bounded diameter in `2^[n]`.
    AntichainWithDiameter {
        /// Ground set size.
        n: usize,
        /// Largest admissible symmetric difference.
        d: usize,
    },
    /// Largest chain-free family of bounded diameter in `2^[n]`.
    ChainFree {
        /// Ground set size.
        n: usize,
        /// Largest admissible symmetric difference.
        d: usize,
        /// Chains of `l + 1` members are forbidden.
        l: usize,
    },
    /// Maximum diversity of an intersecting `k`-uniform family.
    UniformDiversity {
        /// Ground set size.
        n: usize,
        /// Uniform subset size.
        k: usize,
    },
    /// Maximum diversity of an intersecting family in `2^[2k]`.
    PowersetDiversity {
        /// Half the ground set size.
        k: usize,
    },
    /// Largest covering intersecting family of two-part sets.
    TwoPart {
        /// First part size.
        n1: usize,
        /// Second part size.
        n2: usize,
        /// Elements taken from the first part.
        k: usize,
        /// Elements taken from the second part.
        l: usize,
    },
    /// Largest intersecting family meeting declared partition thresholds.
    Partition {
        /// Ground set size.
        n: usize,
        /// Uniform subset size.
        k: usize,
        /// The declared parts with their overlap thresholds.
        parts: Vec<PartThreshold>,
    },
    /// Largest subset-regular intersecting family.
    SubsetRegular {
        /// Ground set size.
        n: usize,
        /// Uniform subset size.
        k: usize,
        /// Regularity order.
        s: usize,
    },
    /// Largest family without `m` pairwise disjoint members.
    NoDisjointGroup {
        /// Ground set size.
        n: usize,
        /// Forbidden group size.
        m: usize,
    },
    /// Maximum triangles in a graph with a fixed edge count.
    MaxTriangles {
        /// Vertices.
        n: usize,
        /// Exact edge count.
        m: usize,
    },
    /// Maximum edges in a multipartite graph without `k` disjoint triangles.
    MultipartiteKk3Free {
        /// Vertex part sizes.
        part_sizes: Vec<usize>,
        /// Forbidden packing size.
        k: usize,
    },
}

impl RunRequest {
    /// Builds the family model for this request.
    pub fn build(&self, limits: &Limits) -> Result<FamilyModel, BuildError> {
        match self {
            RunRequest::Antichain { n } => families::antichain(*n, limits),
            RunRequest::AntichainWithDiameter { n, d } => {
                families::antichain_with_diameter(*n, *d, limits)
            }
            RunRequest::ChainFree { n, d, l } => families::chain_free_family(*n, *d, *l, limits),
            RunRequest::UniformDiversity { n, k } => {
                families::uniform_intersecting_diversity(*n, *k, limits)
            }
            RunRequest::PowersetDiversity { k } => {
                families::powerset_intersecting_diversity(*k, limits)
            }
            RunRequest::TwoPart { n1, n2, k, l } => {
                families::two_part_intersecting(*n1, *n2, *k, *l, limits)
            }
            RunRequest::Partition { n, k, parts } => {
                families::partition_intersecting(*n, *k, parts, limits)
            }
            RunRequest::SubsetRegular { n, k, s } => {
                families::subset_regular_intersecting(*n, *k, *s, limits)
            }
            RunRequest::NoDisjointGroup { n, m } => {
                families::family_without_disjoint_group(*n, *m, limits)
            }
            RunRequest::MaxTriangles { n, m } => families::max_triangles(*n, *m, limits),
            RunRequest::MultipartiteKk3Free { part_sizes, k } => {
                families::multipartite_kk3_free(part_sizes, *k, limits)
            }
        }
    }

    /// Short parameter label, available even when the build fails.
    pub fn label(&self) -> String {
        match self {
            RunRequest::Antichain { n } => format!("antichain n={n}"),
            RunRequest::AntichainWithDiameter { n, d } => format!("antichain n={n} d={d}"),
            RunRequest::ChainFree { n, d, l } => format!("chain-free n={n} d={d} l={l}"),
            RunRequest::UniformDiversity { n, k } => format!("uniform diversity n={n} k={k}"),
            RunRequest::PowersetDiversity { k } => format!("powerset diversity k={k}"),
            RunRequest::TwoPart { n1, n2, k, l } => {
                format!("two-part n1={n1} n2={n2} k={k} l={l}")
            }
            RunRequest::Partition { n, k, parts } => {
                format!("partition n={n} k={k} parts={}", parts.len())
            }
            RunRequest::SubsetRegular { n, k, s } => {
                format!("subset-regular n={n} k={k} s={s}")
            }
            RunRequest::NoDisjointGroup { n, m } => format!("no-disjoint n={n} m={m}"),
            RunRequest::MaxTriangles { n, m } => format!("triangles n={n} m={m}"),
            RunRequest::MultipartiteKk3Free { part_sizes, k } => {
                format!("kK3-free parts={part_sizes:?} k={k}")
            }
        }
    }
}

// ============================================================================
// Reports
// ============================================================================

/// Budgets and solver knobs shared by a batch.
#[derive(Clone, Debug, Default)]
pub struct RunConfig {
    /// Build budgets.
    pub limits: Limits,
    /// Bundled solver knobs. Every request gets a fresh backend.
    pub solver: BranchBoundConfig,
}

/// A proven optimum with everything needed to print it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solved {
    /// Objective value.
    pub objective: i64,
    /// Conjectured optimum, when one is wired in.
    pub bound: Option<u128>,
    /// Ground set of the reported spaces.
    pub ground: GroundSet,
    /// What the primary members are called.
    pub primary_name: &'static str,
    /// Selected primary members, in report order.
    pub selected: Vec<Subset>,
    /// What the secondary members are called, if the family has any.
    pub secondary_name: Option<&'static str>,
    /// Selected secondary members, in report order.
    pub secondary: Vec<Subset>,
    /// Diversity of the selected family, for diversity objectives.
    pub diversity: Option<i64>,
}

/// Verdict of one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Solved to proven optimality.
    Solved(Solved),
    /// The constraints admit no selection.
    Infeasible,
    /// The model could not be built.
    BuildFailed(BuildError),
    /// The backend gave up or misbehaved.
    SolverFailed(SolverError),
}

/// One request's result within a batch.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Position of the request in the batch.
    pub index: usize,
    /// Instance description.
    pub label: String,
    /// The verdict.
    pub outcome: RunOutcome,
    /// Wall-clock time spent building and solving.
    pub elapsed: Duration,
}

impl RunReport {
    /// Renders the report as printed by the batch driver.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "[{}] {}", self.index, self.label);
        match &self.outcome {
            RunOutcome::Solved(s) => {
                match s.bound {
                    Some(b) if s.objective >= 0 && s.objective as u128 == b => {
                        let _ = write!(out, "\n    optimum {} matches the conjectured {b}", s.objective);
                    }
                    Some(b) => {
                        let _ = write!(out, "\n    optimum {}, conjectured {b}", s.objective);
                    }
                    None => {
                        let _ = write!(out, "\n    optimum {}", s.objective);
                    }
                }
                let _ = write!(out, " ({:.1?})", self.elapsed);
                if let Some(d) = s.diversity {
                    let _ = write!(out, "\n    diversity {d}");
                }
                render_members(&mut out, s.ground, s.primary_name, &s.selected);
                if let Some(name) = s.secondary_name {
                    render_members(&mut out, s.ground, name, &s.secondary);
                }
            }
            RunOutcome::Infeasible => {
                let _ = write!(out, "\n    infeasible ({:.1?})", self.elapsed);
            }
            RunOutcome::BuildFailed(e) => {
                let _ = write!(out, "\n    build failed: {e}");
            }
            RunOutcome::SolverFailed(e) => {
                let _ = write!(out, "\n    solver failed: {e}");
            }
        }
        out
    }
}

fn render_members(out: &mut String, ground: GroundSet, name: &str, members: &[Subset]) {
    if members.len() > RENDER_MEMBER_CAP {
        let _ = write!(out, "\n    {name}: {} members", members.len());
        return;
    }
    let _ = write!(out, "\n    {name}:");
    for &s in members {
        let _ = write!(out, " {}", ground.label_set(s));
    }
}

// ============================================================================
// Driver
// ============================================================================

fn run_one(index: usize, request: &RunRequest, cfg: &RunConfig) -> RunReport {
    let started = Instant::now();
    let fm = match request.build(&cfg.limits) {
        Ok(fm) => fm,
        Err(e) => {
            return RunReport {
                index,
                label: request.label(),
                outcome: RunOutcome::BuildFailed(e),
                elapsed: started.elapsed(),
            }
        }
    };
    tracing::debug!(
        label = %fm.label,
        variables = fm.model.binary_count(),
        rows = fm.model.constraints().len(),
        "model built"
    );

    let mut backend = BranchBound::new(cfg.solver.clone());
    let outcome = match solve(&fm.model, &mut backend) {
        Ok(SolveOutcome::Optimal(sol)) => {
            let mut selected = fm.selected(&sol.values);
            let mut secondary = fm.secondary_selected(&sol.values);
            if fm.report_reversed {
                selected.reverse();
                secondary.reverse();
            }
            let diversity = fm
                .diversity_objective
                .then(|| families::family_diversity(&selected));
            RunOutcome::Solved(Solved {
                objective: sol.objective,
                bound: fm.bound,
                ground: fm.primary.space.ground(),
                primary_name: fm.primary.name,
                selected,
                secondary_name: fm.secondary.as_ref().map(|b| b.name),
                secondary,
                diversity,
            })
        }
        Ok(SolveOutcome::Infeasible) => RunOutcome::Infeasible,
        Ok(SolveOutcome::Unbounded) => RunOutcome::SolverFailed(SolverError::Backend(
            "backend reported an unbounded objective".into(),
        )),
        Err(e) => RunOutcome::SolverFailed(e),
    };
    RunReport {
        index,
        label: fm.label,
        outcome,
        elapsed: started.elapsed(),
    }
}

/// Builds and solves every request in parallel, printing each report as it
/// lands. The returned reports are in request order.
pub fn run_batch(requests: &[RunRequest], cfg: &RunConfig) -> Vec<RunReport> {
    let queue = ArrayQueue::new(requests.len().max(1));
    requests.par_iter().enumerate().for_each(|(index, request)| {
        let report = run_one(index, request, cfg);
        println!("{}", report.render());
        // capacity matches the batch, the push cannot fail
        let _ = queue.push(report);
    });

    let mut reports = Vec::with_capacity(queue.len());
    while let Some(report) = queue.pop() {
        reports.push(report);
    }
    reports.sort_by_key(|r| r.index);
    tracing::info!(count = reports.len(), "batch finished");
    reports
}

/// A small instance of every family, sized to finish quickly.
pub fn demo_suite() -> Vec<RunRequest> {
    vec![
        RunRequest::Antichain { n: 3 },
        RunRequest::Antichain { n: 4 },
        RunRequest::AntichainWithDiameter { n: 4, d: 2 },
        RunRequest::ChainFree { n: 4, d: 4, l: 2 },
        RunRequest::UniformDiversity { n: 5, k: 2 },
        RunRequest::PowersetDiversity { k: 2 },
        RunRequest::TwoPart {
            n1: 3,
            n2: 3,
            k: 2,
            l: 2,
        },
        RunRequest::Partition {
            n: 4,
            k: 2,
            parts: vec![
                PartThreshold {
                    members: vec![0, 1],
                    min_overlap: 1,
                },
                PartThreshold {
                    members: vec![2, 3],
                    min_overlap: 1,
                },
            ],
        },
        RunRequest::SubsetRegular { n: 3, k: 2, s: 1 },
        RunRequest::NoDisjointGroup { n: 3, m: 4 },
        RunRequest::MaxTriangles { n: 4, m: 6 },
        RunRequest::MultipartiteKk3Free {
            part_sizes: vec![2, 2, 2],
            k: 2,
        },
    ]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn objective(report: &RunReport) -> i64 {
        match &report.outcome {
            RunOutcome::Solved(s) => s.objective,
            other => panic!("{} did not solve: {other:?}", report.label),
        }
    }

    #[test]
    fn demo_suite_solves_every_family() {
        let reports = run_batch(&demo_suite(), &RunConfig::default());
        assert_eq!(reports.len(), 12);
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.index, i, "reports must come back in request order");
            assert!(
                matches!(report.outcome, RunOutcome::Solved(_)),
                "{} failed: {:?}",
                report.label,
                report.outcome
            );
        }
        let expected = [3, 6, 4, 10, 1, 2, 9, 2, 3, 7, 4, 10];
        for (report, want) in reports.iter().zip(expected) {
            assert_eq!(objective(report), want, "{}", report.label);
        }
    }

    #[test]
    fn build_failures_are_outcomes_not_panics() {
        let requests = [
            RunRequest::Antichain { n: 0 },
            RunRequest::Antichain { n: 3 },
        ];
        let reports = run_batch(&requests, &RunConfig::default());
        assert_eq!(
            reports[0].outcome,
            RunOutcome::BuildFailed(BuildError::EmptyGroundSet)
        );
        assert_eq!(reports[0].label, "antichain n=0");
        assert_eq!(objective(&reports[1]), 3);
    }

    #[test]
    fn infeasible_is_a_verdict() {
        let requests = [RunRequest::TwoPart {
            n1: 2,
            n2: 2,
            k: 1,
            l: 1,
        }];
        let reports = run_batch(&requests, &RunConfig::default());
        assert_eq!(reports[0].outcome, RunOutcome::Infeasible);
        assert!(reports[0].render().contains("infeasible"));
    }

    #[test]
    fn exhausted_node_budget_is_reported() {
        let cfg = RunConfig {
            solver: BranchBoundConfig {
                node_limit: 1,
                ..BranchBoundConfig::default()
            },
            ..RunConfig::default()
        };
        let reports = run_batch(&[RunRequest::Antichain { n: 4 }], &cfg);
        assert!(
            matches!(
                reports[0].outcome,
                RunOutcome::SolverFailed(SolverError::NodeLimit { .. })
            ),
            "{:?}",
            reports[0].outcome
        );
        assert!(reports[0].render().contains("solver failed"));
    }

    #[test]
    fn solved_reports_mention_matching_bounds() {
        let reports = run_batch(&[RunRequest::MaxTriangles { n: 4, m: 6 }], &RunConfig::default());
        let text = reports[0].render();
        assert!(text.contains("optimum 4 matches the conjectured 4"), "{text}");
        assert!(text.contains("triangles:"), "{text}");
        assert!(text.contains("edges:"), "{text}");
    }

    #[test]
    fn reversed_families_report_largest_sets_first() {
        let reports = run_batch(&[RunRequest::Antichain { n: 3 }], &RunConfig::default());
        match &reports[0].outcome {
            RunOutcome::Solved(s) => {
                for pair in s.selected.windows(2) {
                    assert!(pair[0].bits() >= pair[1].bits());
                }
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn forward_families_report_smallest_sets_first() {
        let reports = run_batch(
            &[RunRequest::NoDisjointGroup { n: 3, m: 2 }],
            &RunConfig::default(),
        );
        match &reports[0].outcome {
            RunOutcome::Solved(s) => {
                assert_eq!(s.objective, 4);
                for pair in s.selected.windows(2) {
                    assert!(pair[0].bits() <= pair[1].bits());
                }
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn member_lists_are_rendered_with_ground_labels() {
        let reports = run_batch(
            &[RunRequest::SubsetRegular { n: 3, k: 2, s: 1 }],
            &RunConfig::default(),
        );
        let text = reports[0].render();
        assert!(text.contains("{1, 2}"), "{text}");
    }

    #[test]
    fn request_labels_cover_every_variant() {
        assert_eq!(RunRequest::Antichain { n: 9 }.label(), "antichain n=9");
        assert_eq!(
            RunRequest::MultipartiteKk3Free {
                part_sizes: vec![4, 4, 4, 4],
                k: 2
            }
            .label(),
            "kK3-free parts=[4, 4, 4, 4] k=2"
        );
    }
}

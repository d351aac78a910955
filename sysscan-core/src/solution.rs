//! Solution resolver: selects, per replicon, the maximum-score set of
//! pairwise compatible candidate systems.
//!
//! The conflict graph connects candidates that share a hit they are not
//! allowed to share; a branch-and-bound enumeration finds every
//! independent set tied at the maximum score, under an optional monotonic
//! deadline polled at each node.

use std::time::Instant;

use log::{debug, warn};

use crate::candidate::CandidateSystem;

/// How the search over one replicon ended.
///
/// All three are regular outcomes; `Timeout` reports the best solutions
/// found before the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Optimal,
    Timeout,
    Empty,
}

/// A ranked set of compatible candidate systems.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Indices into the replicon's candidate list, ascending
    pub systems: Vec<usize>,
    pub score: f64,
    pub hits_number: usize,
    pub mean_wholeness: f64,
    /// Ascending positions of every hit, the final ranking tiebreak
    pub positions: Vec<usize>,
}

impl Solution {
    fn build(systems: Vec<usize>, candidates: &[CandidateSystem]) -> Self {
        // canonical summation order keeps tied scores bit-identical
        let score = systems.iter().map(|&i| candidates[i].score).sum();
        let hits_number = systems.iter().map(|&i| candidates[i].hit_count()).sum();
        let mean_wholeness = if systems.is_empty() {
            0.0
        } else {
            systems.iter().map(|&i| candidates[i].wholeness).sum::<f64>() / systems.len() as f64
        };
        let mut positions: Vec<usize> = systems
            .iter()
            .flat_map(|&i| candidates[i].positions())
            .collect();
        positions.sort_unstable();
        Self {
            systems,
            score,
            hits_number,
            mean_wholeness,
            positions,
        }
    }
}

/// Outcome of the search over one replicon.
#[derive(Debug)]
pub struct Resolution {
    /// Every solution tied at the maximum score, ranked; rank 1 first
    pub solutions: Vec<Solution>,
    pub score: f64,
    pub status: SearchStatus,
}

impl Resolution {
    /// The reported best solution, when any candidate survived
    #[must_use]
    pub fn best(&self) -> Option<&Solution> {
        self.solutions.first()
    }
}

/// May `a` and `b` coexist in one solution?
///
/// Sharing a hit is permitted when the gene is `multi_system` (same
/// model), when the candidates belong to different models and the gene is
/// `multi_model`, or when both sides use the hit as an out-of-cluster
/// loner.
fn compatible(a: &CandidateSystem, b: &CandidateSystem) -> bool {
    for (hit_a, _) in a.hits() {
        for (hit_b, _) in b.hits() {
            if !hit_a.same_protein(hit_b) {
                continue;
            }
            let shared_loner = hit_a.loner && hit_b.loner;
            let allowed = if a.model_fqn == b.model_fqn {
                (hit_a.multi_system && hit_b.multi_system) || shared_loner
            } else {
                (hit_a.multi_model && hit_b.multi_model) || shared_loner
            };
            if !allowed {
                return false;
            }
        }
    }
    true
}

struct Search<'a> {
    candidates: &'a [CandidateSystem],
    /// Vertices in exploration order (score desc, hits desc, position asc)
    order: Vec<usize>,
    conflicts: Vec<Vec<bool>>,
    deadline: Option<Instant>,
    timed_out: bool,
    best_score: f64,
    best_sets: Vec<Vec<usize>>,
}

impl Search<'_> {
    fn conflict(&self, a: usize, b: usize) -> bool {
        self.conflicts[a][b]
    }

    /// Scores of the still-selectable suffix vertices, the additive upper bound
    fn remaining_bound(&self, from: usize, chosen: &[usize]) -> f64 {
        self.order[from..]
            .iter()
            .filter(|&&vertex| !chosen.iter().any(|&taken| self.conflict(taken, vertex)))
            .map(|&vertex| self.candidates[vertex].score)
            .sum()
    }

    fn record(&mut self, chosen: &[usize]) {
        let mut set: Vec<usize> = chosen.to_vec();
        set.sort_unstable();
        // canonical order makes the sum deterministic for tie comparison
        let score: f64 = set.iter().map(|&i| self.candidates[i].score).sum();
        if score > self.best_score {
            self.best_score = score;
            self.best_sets.clear();
            self.best_sets.push(set);
        } else if score == self.best_score && !self.best_sets.contains(&set) {
            self.best_sets.push(set);
        }
    }

    fn explore(&mut self, depth: usize, chosen: &mut Vec<usize>, score: f64) {
        if self.timed_out {
            return;
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                self.timed_out = true;
                return;
            }
        }
        if depth == self.order.len() {
            self.record(chosen);
            return;
        }
        // prune only strictly losing branches; ties must all be enumerated
        if score + self.remaining_bound(depth, chosen) < self.best_score {
            return;
        }
        let vertex = self.order[depth];
        let selectable = !chosen.iter().any(|&taken| self.conflict(taken, vertex));
        if selectable {
            chosen.push(vertex);
            self.explore(depth + 1, chosen, score + self.candidates[vertex].score);
            chosen.pop();
        }
        self.explore(depth + 1, chosen, score);
    }
}

/// Find all maximum-score sets of compatible candidates.
///
/// Deterministic for a given candidate list; reordering the input changes
/// neither the maximum score nor the ranked solutions. When the deadline
/// expires the best solutions found so far are returned with
/// [`SearchStatus::Timeout`].
#[must_use]
pub fn resolve(candidates: &[CandidateSystem], deadline: Option<Instant>) -> Resolution {
    if candidates.is_empty() {
        return Resolution {
            solutions: Vec::new(),
            score: 0.0,
            status: SearchStatus::Empty,
        };
    }

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        let ca = &candidates[a];
        let cb = &candidates[b];
        cb.score
            .total_cmp(&ca.score)
            .then(cb.hit_count().cmp(&ca.hit_count()))
            .then(ca.min_position().cmp(&cb.min_position()))
            .then(ca.id.cmp(&cb.id))
    });

    let conflicts: Vec<Vec<bool>> = (0..candidates.len())
        .map(|a| {
            (0..candidates.len())
                .map(|b| a != b && !compatible(&candidates[a], &candidates[b]))
                .collect()
        })
        .collect();
    let edges: usize = conflicts.iter().flatten().filter(|&&c| c).count() / 2;
    debug!(
        "resolving {} candidate(s), {} conflict edge(s)",
        candidates.len(),
        edges
    );

    let mut search = Search {
        candidates,
        order,
        conflicts,
        deadline,
        timed_out: false,
        best_score: f64::NEG_INFINITY,
        best_sets: Vec::new(),
    };
    search.explore(0, &mut Vec::new(), 0.0);

    let status = if search.timed_out {
        warn!("solution search timed out; reporting the best solutions found so far");
        SearchStatus::Timeout
    } else {
        SearchStatus::Optimal
    };

    let mut solutions: Vec<Solution> = search
        .best_sets
        .into_iter()
        .map(|set| Solution::build(set, candidates))
        .collect();
    // rank ties: hits desc, system count desc, wholeness desc, positions asc
    solutions.sort_by(|a, b| {
        b.hits_number
            .cmp(&a.hits_number)
            .then(b.systems.len().cmp(&a.systems.len()))
            .then(b.mean_wholeness.total_cmp(&a.mean_wholeness))
            .then_with(|| a.positions.cmp(&b.positions))
            .then_with(|| a.systems.cmp(&b.systems))
    });
    let score = solutions.first().map_or(0.0, |best| best.score);

    Resolution {
        solutions,
        score,
        status,
    }
}

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet, VecDeque};

use bit_set::BitSet;
use instant::{Duration, Instant};
use log::{debug, trace};

use crate::grid::{Grid, Slot};
use crate::words::Wordlist;
use crate::{SlotId, WordId};

/// A complete, consistent assignment of one word to every slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    words_by_slot: HashMap<Slot, String>,
}

impl Solution {
    pub fn word(&self, slot: &Slot) -> Option<&str> {
        self.words_by_slot.get(slot).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words_by_slot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words_by_slot.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Slot, &str)> {
        self.words_by_slot.iter().map(|(slot, word)| (slot, word.as_str()))
    }
}

/// Counters tracking a single solve run.
#[derive(Debug, Clone, Default)]
pub struct SolveStats {
    /// Number of partial assignments visited by the backtracking search.
    pub states: u64,
    /// Number of candidate values undone after a failed branch.
    pub backtracks: u64,
    pub duration: Duration,
}

/// A CSP solver for one grid and word list. The live state is the domain
/// store: one candidate-word bitset per slot, shrunk by node and arc
/// consistency and snapshot-restored around each inference attempt.
pub struct Solver<'a> {
    grid: &'a Grid,
    words: &'a Wordlist,
    domains: Vec<BitSet>,
    stats: SolveStats,
}

impl<'a> Solver<'a> {
    pub fn new(grid: &'a Grid, words: &'a Wordlist) -> Solver<'a> {
        let full: BitSet = (0..words.len()).collect();
        Solver {
            grid,
            words,
            domains: vec![full; grid.slot_count()],
            stats: SolveStats::default(),
        }
    }

    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }

    /// Enforce node and arc consistency, then search. Returns `None` when no
    /// satisfying assignment exists; this is an ordinary outcome, not an
    /// error.
    pub fn solve(&mut self) -> Option<Solution> {
        let start = Instant::now();
        debug!(
            "solving {} slots against {} words",
            self.grid.slot_count(),
            self.words.len()
        );

        self.enforce_node_consistency();
        if self.domains.iter().any(BitSet::is_empty) {
            debug!("a slot has no words of its length; unsolvable");
            self.stats.duration = start.elapsed();
            return None;
        }

        if !self.ac3(None) {
            debug!("initial arc consistency emptied a domain; unsolvable");
            self.stats.duration = start.elapsed();
            return None;
        }

        let mut assignment: Vec<Option<WordId>> = vec![None; self.grid.slot_count()];
        let solved = self.backtrack(&mut assignment);
        self.stats.duration = start.elapsed();
        debug!("search finished: solved={} {:?}", solved, self.stats);

        if !solved {
            return None;
        }

        let mut words_by_slot = HashMap::with_capacity(assignment.len());
        for (slot_id, assigned) in assignment.iter().enumerate() {
            if let Some(word_id) = assigned {
                words_by_slot.insert(self.grid.slot(slot_id), self.words.word(*word_id).text.clone());
            }
        }
        Some(Solution { words_by_slot })
    }

    /// Remove from every slot's domain the words whose length differs from
    /// the slot's length. Idempotent; runs once before search.
    fn enforce_node_consistency(&mut self) {
        for (slot_id, domain) in self.domains.iter_mut().enumerate() {
            let length = self.grid.slot(slot_id).length;
            let keep: BitSet = domain
                .iter()
                .filter(|&word_id| self.words.word(word_id).len() == length)
                .collect();
            *domain = keep;
        }
    }

    /// Make slot `x` arc consistent with slot `y` by removing every word in
    /// x's domain with no supporting word in y's domain at the crossing.
    /// Returns whether anything was removed. A disjoint pair never changes.
    fn revise(&mut self, x: SlotId, y: SlotId) -> bool {
        let Some((x_idx, y_idx)) = self.grid.overlap(x, y) else {
            return false;
        };

        // The letters y can still place in the shared cell.
        let support: HashSet<char> = self.domains[y]
            .iter()
            .map(|word_id| self.words.word(word_id).chars[y_idx])
            .collect();

        let unsupported: Vec<WordId> = self.domains[x]
            .iter()
            .filter(|&word_id| !support.contains(&self.words.word(word_id).chars[x_idx]))
            .collect();

        for &word_id in &unsupported {
            self.domains[x].remove(word_id);
        }
        !unsupported.is_empty()
    }

    /// AC-3 over a worklist of ordered arcs `(x, y)` meaning "x must stay
    /// consistent with y". With no initial arcs, seeds every ordered pair of
    /// crossing slots. Returns `false` as soon as any domain empties.
    fn ac3(&mut self, initial_arcs: Option<Vec<(SlotId, SlotId)>>) -> bool {
        let mut queue: VecDeque<(SlotId, SlotId)> = match initial_arcs {
            Some(arcs) => arcs.into(),
            None => {
                let n = self.grid.slot_count();
                let mut queue = VecDeque::new();
                for x in 0..n {
                    for y in 0..n {
                        if self.grid.overlap(x, y).is_some() {
                            queue.push_back((x, y));
                        }
                    }
                }
                queue
            }
        };

        while let Some((x, y)) = queue.pop_front() {
            if self.revise(x, y) {
                if self.domains[x].is_empty() {
                    trace!("domain of slot {} emptied against slot {}", x, y);
                    return false;
                }
                // A shrink in x may break support that its other neighbors
                // relied on.
                for z in self.grid.neighbors(x) {
                    if z != y {
                        queue.push_back((z, x));
                    }
                }
            }
        }
        true
    }

    /// Whether the partial assignment satisfies every constraint: length
    /// match, global word-uniqueness, and agreement at every crossing
    /// between assigned slots.
    fn consistent(&self, assignment: &[Option<WordId>]) -> bool {
        let mut used = BitSet::with_capacity(self.words.len());

        for (slot_id, assigned) in assignment.iter().enumerate() {
            let Some(word_id) = *assigned else { continue };
            let word = self.words.word(word_id);

            if word.len() != self.grid.slot(slot_id).length {
                return false;
            }
            if !used.insert(word_id) {
                return false;
            }
            for neighbor in self.grid.neighbors(slot_id) {
                let Some(other_id) = assignment[neighbor] else { continue };
                let Some((own_idx, other_idx)) = self.grid.overlap(slot_id, neighbor) else {
                    continue;
                };
                if word.chars[own_idx] != self.words.word(other_id).chars[other_idx] {
                    return false;
                }
            }
        }
        true
    }

    /// Minimum-remaining-values selection, with ties broken by highest
    /// degree and then by lowest slot id.
    fn select_unassigned_slot(&self, assignment: &[Option<WordId>]) -> Option<SlotId> {
        (0..self.grid.slot_count())
            .filter(|&slot_id| assignment[slot_id].is_none())
            .min_by_key(|&slot_id| {
                (
                    self.domains[slot_id].len(),
                    Reverse(self.grid.degree(slot_id)),
                    slot_id,
                )
            })
    }

    /// Least-constraining-value ordering: candidates sorted ascending by how
    /// many words they would eliminate from unassigned neighbors' domains.
    /// The sort is stable, so equal counts keep word-list order.
    fn order_domain_values(&self, slot: SlotId, assignment: &[Option<WordId>]) -> Vec<WordId> {
        let mut scored: Vec<(usize, WordId)> = Vec::with_capacity(self.domains[slot].len());

        for word_id in self.domains[slot].iter() {
            let word = self.words.word(word_id);
            let mut eliminated = 0;

            for neighbor in self.grid.neighbors(slot) {
                if assignment[neighbor].is_some() {
                    continue;
                }
                let Some((own_idx, neighbor_idx)) = self.grid.overlap(slot, neighbor) else {
                    continue;
                };
                let placed = word.chars[own_idx];
                // Counted with an explicit loop: the bit-set iterator's
                // size_hint can under-report, which trips the specialized
                // `Filter::count`.
                for other in self.domains[neighbor].iter() {
                    if self.words.word(other).chars[neighbor_idx] != placed {
                        eliminated += 1;
                    }
                }
            }
            scored.push((eliminated, word_id));
        }

        scored.sort_by_key(|&(eliminated, _)| eliminated);
        scored.into_iter().map(|(_, word_id)| word_id).collect()
    }

    /// Maintain arc consistency around a fresh assignment to `slot`: pin
    /// every assigned slot's domain to its single word, propagate over the
    /// arcs pointing at the assigned slot, and fold any neighbor that
    /// collapses to one remaining word into the assignment, repeating until
    /// no new singleton appears.
    ///
    /// All domain shrinkage here is scoped to the attempt: the store is
    /// restored before returning, win or lose, and only the discovered
    /// `{slot: word}` assignments survive. On failure any assignments made
    /// here are removed again and `None` is returned.
    fn infer(
        &mut self,
        slot: SlotId,
        assignment: &mut [Option<WordId>],
    ) -> Option<Vec<SlotId>> {
        let snapshot = self.domains.clone();

        for (slot_id, assigned) in assignment.iter().enumerate() {
            if let Some(word_id) = assigned {
                let mut pinned = BitSet::with_capacity(self.words.len());
                pinned.insert(*word_id);
                self.domains[slot_id] = pinned;
            }
        }

        let mut inferred: Vec<SlotId> = Vec::new();
        let mut pending: VecDeque<SlotId> = VecDeque::new();
        pending.push_back(slot);

        let mut failed = false;
        'propagate: while let Some(source) = pending.pop_front() {
            let arcs: Vec<(SlotId, SlotId)> =
                self.grid.neighbors(source).map(|neighbor| (neighbor, source)).collect();
            if !self.ac3(Some(arcs)) {
                failed = true;
                break 'propagate;
            }

            for neighbor in self.grid.neighbors(source) {
                if assignment[neighbor].is_some() {
                    continue;
                }
                let mut remaining = self.domains[neighbor].iter();
                let (Some(word_id), None) = (remaining.next(), remaining.next()) else {
                    continue;
                };
                // A forced word that is already used elsewhere can never be
                // part of a valid extension of this assignment.
                if assignment.iter().flatten().any(|&used| used == word_id) {
                    failed = true;
                    break 'propagate;
                }
                trace!("inferred slot {} = {}", neighbor, self.words.word(word_id).text);
                assignment[neighbor] = Some(word_id);
                inferred.push(neighbor);
                pending.push_back(neighbor);
            }
        }

        self.domains = snapshot;

        if failed {
            for slot_id in inferred {
                assignment[slot_id] = None;
            }
            return None;
        }
        Some(inferred)
    }

    /// Depth-first backtracking search. Returns whether `assignment` was
    /// extended to a complete, consistent assignment; on failure the
    /// assignment and domain store are exactly as they were on entry.
    fn backtrack(&mut self, assignment: &mut Vec<Option<WordId>>) -> bool {
        self.stats.states += 1;

        let Some(slot) = self.select_unassigned_slot(assignment) else {
            // Every slot has a value.
            return true;
        };
        trace!(
            "selected slot {} with {} candidates",
            slot,
            self.domains[slot].len()
        );

        for word_id in self.order_domain_values(slot, assignment) {
            assignment[slot] = Some(word_id);

            if self.consistent(assignment) {
                if let Some(inferred) = self.infer(slot, assignment) {
                    if self.backtrack(assignment) {
                        return true;
                    }
                    for inferred_slot in inferred {
                        assignment[inferred_slot] = None;
                    }
                }
            }

            assignment[slot] = None;
            self.stats.backtracks += 1;
        }

        false
    }
}

//! The memoized backtracking simulator: a bounded depth-first walk over the
//! compiled program, driven by an explicit LIFO thread stack instead of the
//! call stack, gated at each step by the program's memo table.
//!
//! Captures are threaded as `Rc`-backed persistent arrays. A `Split`
//! pushes its second branch with a cheap `Rc::clone` of the current
//! captures and falls through to its first branch in place; a `Save`
//! clones-on-write via `Rc::make_mut` only when the array is actually
//! shared. This replaces a manual save/restore undo log with structural
//! sharing, at the cost of an extra allocation whenever a capture slot
//! changes under a live alternate branch.

use std::rc::Rc;

use log::trace;

use crate::compile::Program;
use crate::error::{Error, Result};
use crate::inst::{Inst, InstIdx, InstRecursiveZwa};
use crate::memo::MemoTable;

/// Default bound on the number of suspended threads the backtracker will
/// hold at once, matching the reference design's restriction to small
/// programs on small inputs -- but enforced as a recoverable error here
/// rather than a fatal abort.
pub const DEFAULT_MAX_STACK: usize = 1000;

pub type Captures = Rc<Vec<Option<usize>>>;

/// Counters describing one search, surfaced to callers for the `--stats`
/// driver output. `n_total_visits`, `visits_to_most_visited_search_state`,
/// and `visits_to_most_visited_vertex` are derived from a per-`(state_num,
/// offset)` visit table kept alongside the memo table -- distinct from
/// `memo_hits`/`memo_inserts`, which only count memoized vertices, the
/// visit table counts every instruction actually executed.
#[derive(Debug, Default, Clone)]
pub struct SearchStats {
    pub threads_pushed: u64,
    pub steps: u64,
    pub memo_hits: u64,
    pub memo_inserts: u64,
    pub max_stack_depth: usize,
    pub n_total_visits: u64,
    pub visits_to_most_visited_search_state: u64,
    pub visits_to_most_visited_vertex: u64,
    /// Indexed by `memo_state_num`: the most times any single offset was
    /// actually visited for that memoized vertex. Under `FULL`/`INDEG_GT1`
    /// every entry is `<= 1` (see `backtrack`'s gate-before-execute order).
    pub max_observed_cost_per_memoized_vertex: Vec<u64>,
}

impl SearchStats {
    fn merge(&mut self, other: &SearchStats) {
        self.threads_pushed += other.threads_pushed;
        self.steps += other.steps;
        self.memo_hits += other.memo_hits;
        self.memo_inserts += other.memo_inserts;
        self.max_stack_depth = self.max_stack_depth.max(other.max_stack_depth);
        self.n_total_visits += other.n_total_visits;
        self.visits_to_most_visited_search_state =
            self.visits_to_most_visited_search_state.max(other.visits_to_most_visited_search_state);
        self.visits_to_most_visited_vertex =
            self.visits_to_most_visited_vertex.max(other.visits_to_most_visited_vertex);
        if self.max_observed_cost_per_memoized_vertex.is_empty() {
            self.max_observed_cost_per_memoized_vertex = other.max_observed_cost_per_memoized_vertex.clone();
        } else {
            for (a, b) in self
                .max_observed_cost_per_memoized_vertex
                .iter_mut()
                .zip(&other.max_observed_cost_per_memoized_vertex)
            {
                *a = (*a).max(*b);
            }
        }
    }
}

#[derive(Debug)]
pub struct SearchResult {
    /// `(start, end)` pairs keyed by `2 * cg_num`/`2 * cg_num + 1`; index
    /// `(0, 1)` is always the overall match span. `None` if no start offset
    /// produced a match -- `stats` is still populated in that case, summed
    /// across every retry offset that was attempted.
    pub captures: Option<Vec<Option<usize>>>,
    pub stats: SearchStats,
}

struct Thread {
    pc: InstIdx,
    sp: usize,
    caps: Captures,
}

struct BacktrackVm<'p, 'i> {
    prog: &'p Program,
    input: &'i [u8],
    memo: MemoTable,
    stack: Vec<Thread>,
    max_stack: usize,
    stats: SearchStats,
    /// Dense `visits[pc][sp]`: how many times this invocation actually
    /// arrived at and executed instruction `pc` with the cursor at `sp`,
    /// counted independently of the memo gate. Rows are `prog.len()` wide,
    /// columns `input.len() + 1`.
    visits: Vec<Vec<u64>>,
}

impl<'p, 'i> BacktrackVm<'p, 'i> {
    fn new(prog: &'p Program, input: &'i [u8], memo: MemoTable, max_stack: usize) -> BacktrackVm<'p, 'i> {
        BacktrackVm {
            prog,
            input,
            memo,
            stack: Vec::new(),
            max_stack,
            stats: SearchStats::default(),
            visits: vec![vec![0u64; input.len() + 1]; prog.len()],
        }
    }

    fn push(&mut self, pc: InstIdx, sp: usize, caps: Captures) -> Result<()> {
        if self.stack.len() >= self.max_stack {
            return Err(Error::StackOverflow { max: self.max_stack });
        }
        self.stack.push(Thread { pc, sp, caps });
        self.stats.threads_pushed += 1;
        self.stats.max_stack_depth = self.stats.max_stack_depth.max(self.stack.len());
        Ok(())
    }

    /// Returns `true` if `(pc, sp)` has already been visited under the
    /// active vertex-selection policy -- the caller should kill this
    /// thread without taking another step. Non-memoized instructions are
    /// never gated at all. Also records the visit-table entry for `(pc,
    /// sp)`, gated or not, so statistics reflect every arrival.
    fn memo_gate(&mut self, pc: InstIdx, sp: usize) -> bool {
        let info = self.prog.memo_info[pc];
        if !info.should_memo {
            self.visits[pc][sp] += 1;
            return false;
        }
        let state = info
            .memo_state_num
            .expect("should_memo implies a memo_state_num was assigned");
        if self.memo.is_marked(state, sp) {
            self.stats.memo_hits += 1;
            true
        } else {
            self.memo.mark(state, sp);
            self.stats.memo_inserts += 1;
            self.visits[pc][sp] += 1;
            false
        }
    }

    fn backtrack(&mut self, start_pc: InstIdx, start_sp: usize, caps: Captures) -> Result<Option<Captures>> {
        self.stack.clear();
        self.push(start_pc, start_sp, caps)?;
        let mut matched = None;
        while let Some(t) = self.stack.pop() {
            if let Some(caps) = self.step(t.pc, t.sp, t.caps)? {
                matched = Some(caps);
                break;
            }
        }
        self.finalize_visit_stats();
        Ok(matched)
    }

    /// Scans the completed visit table into this invocation's `SearchStats`.
    /// Called once per `backtrack` call, after the thread stack has fully
    /// drained -- `search`/`run_lookahead` then merge the per-invocation
    /// stats from each retry offset / sub-search into the caller's totals.
    fn finalize_visit_stats(&mut self) {
        let mut per_vertex = vec![0u64; self.prog.n_memoized_states];
        for (pc, row) in self.visits.iter().enumerate() {
            let row_sum: u64 = row.iter().sum();
            let row_max = row.iter().copied().max().unwrap_or(0);
            self.stats.n_total_visits += row_sum;
            self.stats.visits_to_most_visited_search_state =
                self.stats.visits_to_most_visited_search_state.max(row_max);
            self.stats.visits_to_most_visited_vertex = self.stats.visits_to_most_visited_vertex.max(row_sum);
            if let Some(state) = self.prog.memo_info[pc].memo_state_num {
                per_vertex[state] = per_vertex[state].max(row_max);
            }
        }
        self.stats.max_observed_cost_per_memoized_vertex = per_vertex;
    }

    /// Runs from `pc` until the thread either matches, dies, or needs to
    /// fork -- forking pushes the alternate branch onto the stack and
    /// keeps running the preferred one in place, mirroring the reference
    /// design's "mutate `pc` instead of pushing when possible" loop. The
    /// memo gate and visit-table increment happen once per arrival at
    /// `(pc, sp)`, at the top of the loop, so a thread resumed off the
    /// stack is gated exactly like one that fell through from the arm
    /// above it.
    fn step(&mut self, mut pc: InstIdx, mut sp: usize, mut caps: Captures) -> Result<Option<Captures>> {
        loop {
            if self.memo_gate(pc, sp) {
                return Ok(None);
            }
            self.stats.steps += 1;
            match &self.prog.insts[pc] {
                Inst::Match | Inst::RecursiveMatch => return Ok(Some(caps)),
                Inst::Save(s) => {
                    if s.slot < caps.len() {
                        Rc::make_mut(&mut caps)[s.slot] = Some(sp);
                    }
                    pc = s.goto;
                }
                Inst::Jmp(g) => pc = g.goto,
                Inst::Split(s) => {
                    self.push(s.goto2, sp, Rc::clone(&caps))?;
                    pc = s.goto1;
                }
                Inst::SplitMany(s) => {
                    for &edge in s.edges[1..].iter().rev() {
                        self.push(edge, sp, Rc::clone(&caps))?;
                    }
                    pc = s.edges[0];
                }
                Inst::Char(c) => match self.input.get(sp) {
                    Some(&b) if b == c.c => {
                        pc = c.goto;
                        sp += 1;
                    }
                    _ => return Ok(None),
                },
                Inst::CharClass(c) => match self.input.get(sp) {
                    Some(&b) if c.matches(b) => {
                        pc = c.goto;
                        sp += 1;
                    }
                    _ => return Ok(None),
                },
                Inst::Any(g) => {
                    if sp < self.input.len() {
                        pc = g.goto;
                        sp += 1;
                    } else {
                        return Ok(None);
                    }
                }
                Inst::InlineZeroWidthAssertion(e) => {
                    let before = if sp == 0 { None } else { self.input.get(sp - 1).copied() };
                    let after = self.input.get(sp).copied();
                    if e.matches(before, after) {
                        pc = e.goto;
                    } else {
                        return Ok(None);
                    }
                }
                Inst::StringCompare(s) => {
                    let slot = 2 * (s.cg_num as usize);
                    let start = caps.get(slot).copied().flatten();
                    let end = caps.get(slot + 1).copied().flatten();
                    match (start, end) {
                        (Some(start), Some(end)) if end >= start => {
                            let len = end - start;
                            if sp + len <= self.input.len()
                                && self.input[start..end] == self.input[sp..sp + len]
                            {
                                pc = s.goto;
                                sp += len;
                            } else {
                                return Ok(None);
                            }
                        }
                        // A group that never participated in the match
                        // conservatively matches the empty string rather
                        // than failing the thread outright.
                        _ => pc = s.goto,
                    }
                }
                Inst::RecursiveZeroWidthAssertion(r) => match self.run_lookahead(r, sp)? {
                    Some(sub_caps) => {
                        let capsmut = Rc::make_mut(&mut caps);
                        for (slot, v) in sub_caps.iter().enumerate() {
                            if v.is_some() {
                                capsmut[slot] = *v;
                            }
                        }
                        pc = r.goto;
                    }
                    None => return Ok(None),
                },
            }
        }
    }

    /// Drives an independent sub-search over the lookahead's embedded
    /// sub-program, starting exactly at `sp` with its own memo table and
    /// thread stack. Returns the sub-search's own captures on success, so
    /// capture groups nested inside the lookahead body are visible to the
    /// rest of the pattern.
    fn run_lookahead(&mut self, r: &InstRecursiveZwa, sp: usize) -> Result<Option<Vec<Option<usize>>>> {
        let memo = MemoTable::new(
            self.prog.memo_encoding,
            self.prog.n_memoized_states,
            self.input.len() + 1,
            self.prog.rle_k,
        );
        let mut sub = BacktrackVm::new(self.prog, self.input, memo, self.max_stack);
        let caps = Rc::new(vec![None; self.prog.num_capture_slots()]);
        let result = sub.backtrack(r.sub_start, sp, caps)?;
        debug_assert!(r.sub_start + r.sub_len <= self.prog.len());
        self.stats.merge(&sub.stats);
        Ok(result.map(|c| (*c).clone()))
    }
}

/// Searches `input` for a match of `prog`, trying successive start offsets
/// from `start` when the pattern isn't anchored at the beginning. Each
/// retry is its own match invocation with a fresh memo table and thread
/// stack, per the single-invocation resource-ownership rule -- the memo
/// table is part of what's being measured, so it must start empty every
/// time `backtrack` is called, including on each retry offset.
///
/// Statistics are summed across every retry offset attempted and returned
/// whether or not any of them matched, so a caller can always inspect, for
/// example, the total visit count spent proving a pattern does not match.
pub fn search(prog: &Program, input: &[u8], start: usize, max_stack: usize) -> Result<SearchResult> {
    let mut stats = SearchStats::default();
    let mut at = start;
    loop {
        trace!("attempting match at offset {at}");
        let memo = MemoTable::new(prog.memo_encoding, prog.n_memoized_states, input.len() + 1, prog.rle_k);
        let mut vm = BacktrackVm::new(prog, input, memo, max_stack);
        let caps = Rc::new(vec![None; prog.num_capture_slots()]);
        let matched = vm.backtrack(0, at, caps)?;
        stats.merge(&vm.stats);
        if let Some(result_caps) = matched {
            return Ok(SearchResult { captures: Some((*result_caps).clone()), stats });
        }
        if prog.anchored_begin || at >= input.len() {
            return Ok(SearchResult { captures: None, stats });
        }
        at += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::memo::{MemoEncoding, MemoMode};
    use crate::parse::parse;
    use crate::transform::transform;

    fn run(pattern: &str, input: &str, mode: MemoMode, enc: MemoEncoding) -> SearchResult {
        let ast = transform(parse(pattern).unwrap());
        let prog = crate::compile::compile(&ast, mode, enc, NonZeroUsize::new(1).unwrap()).unwrap();
        search(&prog, input.as_bytes(), 0, DEFAULT_MAX_STACK).unwrap()
    }

    #[test]
    fn literal_match() {
        let r = run("abc", "xxabcyy", MemoMode::None, MemoEncoding::None).captures.unwrap();
        assert_eq!(r[0], Some(2));
        assert_eq!(r[1], Some(5));
    }

    #[test]
    fn capture_group() {
        let r = run("a(b|c)d", "acd", MemoMode::None, MemoEncoding::None).captures.unwrap();
        assert_eq!((r[0], r[1]), (Some(0), Some(3)));
        assert_eq!((r[2], r[3]), (Some(1), Some(2)));
    }

    #[test]
    fn no_match() {
        assert!(run("xyz", "abc", MemoMode::None, MemoEncoding::None).captures.is_none());
    }

    #[test]
    fn backreference() {
        assert!(run(r"(a+)\1", "aaaa", MemoMode::None, MemoEncoding::None).captures.is_some());
        // Backtracking finds the smaller split (group "a", backref "a")
        // even though the greedy first attempt (group "aaa") fails.
        assert!(run(r"(a+)\1", "aaa", MemoMode::Full, MemoEncoding::Negative).captures.is_some());
    }

    #[test]
    fn backreference_to_unset_group_matches_empty() {
        // The group is skipped on every successful path (greedy `?` only
        // backs off to skipping it once taking it fails), so `\1` must
        // match the empty string rather than dead-end the thread.
        let r = run(r"(a)?\1b", "b", MemoMode::None, MemoEncoding::None).captures.unwrap();
        assert_eq!((r[0], r[1]), (Some(0), Some(1)));
        assert_eq!((r[2], r[3]), (None, None));
    }

    #[test]
    fn lookahead() {
        assert!(run("a(?=b)b", "ab", MemoMode::None, MemoEncoding::None).captures.is_some());
        assert!(run("a(?=b)c", "ac", MemoMode::None, MemoEncoding::None).captures.is_none());
    }

    #[test]
    fn memoized_catastrophic_backtracking_terminates() {
        let input = "a".repeat(40);
        let r = run("(a+)+b", &input, MemoMode::InDegGt1, MemoEncoding::Rle);
        assert!(r.captures.is_none());
    }

    #[test]
    fn full_memoization_never_revisits_a_search_state_twice() {
        // Property: under FULL (every vertex memoized), no (state, offset)
        // pair is ever executed more than once -- the gate gets there first
        // on the second arrival.
        let input = "a".repeat(20);
        let r = run("(a|a)*b", &input, MemoMode::Full, MemoEncoding::Negative);
        assert!(r.captures.is_none());
        assert!(r.stats.visits_to_most_visited_search_state <= 1);
        assert!(r.stats.max_observed_cost_per_memoized_vertex.iter().all(|&c| c <= 1));
    }

    #[test]
    fn stack_overflow_is_recoverable_error() {
        let ast = transform(parse("(a|a|a|a|a|a|a|a)+").unwrap());
        let prog =
            crate::compile::compile(&ast, MemoMode::None, MemoEncoding::None, NonZeroUsize::new(1).unwrap())
                .unwrap();
        let input = "a".repeat(200);
        let err = search(&prog, input.as_bytes(), 0, 8).unwrap_err();
        assert!(matches!(err, Error::StackOverflow { max: 8 }));
    }
}

//! An experimental regular-expression engine built around a memoized
//! backtracking simulator: parse into an AST, normalize it, compile it into
//! a flat instruction program annotated with a vertex-selection policy, and
//! run it on a bounded, memo-gated backtracking VM.

pub mod ast;
pub mod backtrack;
pub mod compile;
pub mod error;
pub mod inst;
pub mod memo;
pub mod parse;
pub mod rle;
pub mod stats;
pub mod transform;

use std::num::NonZeroUsize;

pub use crate::backtrack::{SearchResult, SearchStats, DEFAULT_MAX_STACK};
pub use crate::compile::Program;
pub use crate::error::{Error, Result};
pub use crate::memo::{MemoEncoding, MemoMode};

/// End-to-end configuration for a match attempt: which vertices get
/// memoized, how the memo table is physically encoded, and the thread
/// stack's depth bound.
#[derive(Debug, Clone)]
pub struct Config {
    pub memo_mode: MemoMode,
    pub memo_encoding: MemoEncoding,
    pub rle_k: NonZeroUsize,
    pub max_stack: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            memo_mode: MemoMode::InDegGt1,
            memo_encoding: MemoEncoding::Rle,
            rle_k: NonZeroUsize::new(1).unwrap(),
            max_stack: DEFAULT_MAX_STACK,
        }
    }
}

/// Parses, normalizes, and compiles `pattern` under `config`.
pub fn build(pattern: &str, config: &Config) -> Result<Program> {
    let ast = transform::transform(parse::parse(pattern)?);
    compile::compile_with_source(
        &ast,
        config.memo_mode,
        config.memo_encoding,
        config.rle_k,
        pattern.to_string(),
    )
}

/// Searches `input` with an already-compiled `prog`, starting at byte
/// offset `start`. Always returns run statistics, whether or not a match
/// was found.
pub fn search(prog: &Program, input: &[u8], start: usize, config: &Config) -> Result<SearchResult> {
    backtrack::search(prog, input, start, config.max_stack)
}

/// Groups a flat capture-slot array into `(start, end)` pairs, one per
/// capture group; index `0` is always the overall match span.
pub fn capture_pairs(captures: &[Option<usize>]) -> Vec<Option<(usize, usize)>> {
    captures
        .chunks(2)
        .map(|pair| match pair {
            [Some(s), Some(e)] => Some((*s, *e)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_capture_scenario() {
        let config = Config::default();
        let prog = build("a(b|c)d", &config).unwrap();
        let result = search(&prog, b"acd", 0, &config).unwrap();
        let pairs = capture_pairs(&result.captures.unwrap());
        assert_eq!(pairs[0], Some((0, 3)));
        assert_eq!(pairs[1], Some((1, 2)));
    }

    #[test]
    fn unanchored_search_finds_later_match() {
        let config = Config::default();
        let prog = build("b+", &config).unwrap();
        let result = search(&prog, b"aaabbbccc", 0, &config).unwrap();
        assert_eq!(capture_pairs(&result.captures.unwrap())[0], Some((3, 6)));
    }

    #[test]
    fn catastrophic_backtracking_bounded_by_memo() {
        let config = Config { memo_mode: MemoMode::InDegGt1, memo_encoding: MemoEncoding::Rle, ..Config::default() };
        let input = "a".repeat(64);
        let prog = build("(a+)+b", &config).unwrap();
        let result = search(&prog, input.as_bytes(), 0, &config).unwrap();
        assert!(result.captures.is_none());
    }

    #[test]
    fn rejects_infinite_loop_pattern() {
        let config = Config::default();
        let err = build("(a*)*", &config).unwrap_err();
        assert!(matches!(err, Error::InfiniteLoop { .. }));
    }
}

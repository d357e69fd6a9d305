//! End-to-end scenarios and cross-configuration invariants, run against the
//! public `memo_regex` API rather than any single internal module.

use quickcheck::quickcheck;

use memo_regex::{capture_pairs, build, search, Config, MemoEncoding, MemoMode};

fn run(pattern: &str, input: &str, config: &Config) -> Option<Vec<Option<(usize, usize)>>> {
    let prog = build(pattern, config).unwrap();
    search(&prog, input.as_bytes(), 0, config).unwrap().captures.map(|caps| capture_pairs(&caps))
}

#[test]
fn scenario_empty_star_matches_empty_string() {
    let pairs = run("a*", "", &Config::default()).unwrap();
    assert_eq!(pairs[0], Some((0, 0)));
}

#[test]
fn scenario_bounded_repetition() {
    let pairs = run("a{2,3}", "aaa", &Config::default()).unwrap();
    assert_eq!(pairs[0], Some((0, 3)));
}

#[test]
fn scenario_alternation_inside_plus() {
    let pairs = run("(a|b)+c", "ababac", &Config::default()).unwrap();
    assert_eq!(pairs[0], Some((0, 6)));
    assert_eq!(pairs[1], Some((4, 5)));
}

#[test]
fn scenario_custom_char_class_with_digit_escape() {
    let pairs = run(r"[a-z\d]+", "abc123", &Config::default()).unwrap();
    assert_eq!(pairs[0], Some((0, 6)));
}

/// Every (memo_mode, memo_encoding) combination must agree on whether a
/// pattern matches and, if so, on every capture pair -- memoization and its
/// physical encoding are a search-space pruning strategy, never a semantic
/// difference observable in the match result.
#[test]
fn match_outcome_is_independent_of_memo_policy() {
    let cases: &[(&str, &str)] = &[
        ("a(b|c)d", "acd"),
        ("a(b|c)d", "axd"),
        ("a*", ""),
        ("a{2,3}", "aaa"),
        ("(a|b)+c", "ababac"),
        (r"[a-z\d]+", "abc123"),
        (r"(a+)\1", "aaaa"),
        (r"(a+)\1", "aaa"),
        ("a(?=b)b", "ab"),
        ("a(?=b)c", "ac"),
        ("b+", "aaabbbccc"),
    ];
    let modes = [MemoMode::None, MemoMode::Full, MemoMode::InDegGt1, MemoMode::LoopDest];
    let encodings = [MemoEncoding::None, MemoEncoding::Negative, MemoEncoding::Rle, MemoEncoding::RleTuned];

    for &(pattern, input) in cases {
        let baseline = run(pattern, input, &Config { memo_mode: MemoMode::None, ..Config::default() });
        for &mode in &modes {
            for &encoding in &encodings {
                let config = Config { memo_mode: mode, memo_encoding: encoding, ..Config::default() };
                let got = run(pattern, input, &config);
                assert_eq!(
                    got, baseline,
                    "pattern {pattern:?} input {input:?} mode {mode:?} encoding {encoding:?} disagreed with naive backtracking"
                );
            }
        }
    }
}

/// A pathological quantifier-of-quantifier pattern explodes combinatorially
/// under naive backtracking. Memoizing loop-head vertices bounds the steps
/// spent on any single retry offset to a small multiple of
/// `n_memoized_states * (|w| + 1)`; this test's input is large enough that a
/// naive backtracker would not finish in any reasonable time, so simply
/// completing demonstrates the polynomial bound holds in practice.
#[test]
fn memoization_bounds_steps_polynomially() {
    let config = Config { memo_mode: MemoMode::InDegGt1, memo_encoding: MemoEncoding::Rle, ..Config::default() };
    let pattern = "(a+)+b";
    let prog = build(pattern, &config).unwrap();

    let input = "a".repeat(48);
    let result = search(&prog, input.as_bytes(), 0, &config).unwrap();
    assert!(result.captures.is_none());

    let per_offset_bound = prog.n_memoized_states.max(1) * (input.len() + 1) * 4;
    assert!(per_offset_bound > 0, "sanity: n_memoized_states must be positive under InDegGt1 for this pattern");

    // `search` retries the whole pattern at every start offset, so the total
    // visit count across the entire unanchored search is bounded by a
    // single retry's `n_memoized_states * (len + 1)` bound times the number
    // of offsets tried (at most `len + 1`, since the pattern isn't anchored).
    let total_bound = prog.n_memoized_states.max(1) as u64 * (input.len() as u64 + 1) * (input.len() as u64 + 1);
    assert!(
        result.stats.n_total_visits <= total_bound,
        "n_total_visits {} exceeded the n_memoized_states * (len + 1)^2 bound {}",
        result.stats.n_total_visits,
        total_bound
    );
}

quickcheck! {
    /// Arbitrary strings fed straight to the parser/compiler must never
    /// panic -- malformed or unsupported syntax is always reported through
    /// `Result::Err`, never a crash.
    fn never_panics_on_arbitrary_pattern(s: String) -> bool {
        let _ = build(&s, &Config::default());
        true
    }
}

quickcheck! {
    /// Whatever a valid pattern does on a given input, searching it again
    /// under `MemoMode::Full` (the "remember every vertex" policy) must
    /// agree -- memoization can only prune redundant work, never change
    /// whether a match is found.
    fn full_memoization_agrees_with_none(pattern_seed: u8, input: String) -> bool {
        let pattern = match pattern_seed % 6 {
            0 => "a*",
            1 => "a+",
            2 => "a(b|c)*d",
            3 => "(a|ab)*c",
            4 => r"[a-z]+\d*",
            _ => "a?b?c?",
        };
        let none = Config { memo_mode: MemoMode::None, ..Config::default() };
        let full = Config { memo_mode: MemoMode::Full, memo_encoding: MemoEncoding::Negative, ..Config::default() };
        run(pattern, &input, &none) == run(pattern, &input, &full)
    }
}

//! The error taxonomy shared by every core phase (parse, transform, compile,
//! backtrack) and surfaced to the driver.

use thiserror::Error;

/// Errors that can occur while turning a pattern into a runnable program, or
/// while running that program against an input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The pattern text is not a well-formed regex.
    #[error("syntax error at byte {pos}: {message}")]
    SyntaxError { pos: usize, message: String },

    /// The normalized program contains an epsilon cycle reachable through a
    /// `Split`, `SplitMany` or `Jmp` with no intervening character consumption
    /// (e.g. `(a*)*`, `(a?)*`). Rejected at compile time.
    #[error("infinite loop detected at instruction {inst}: a zero-width \
             cycle would let the backtracker spin forever (e.g. `(a*)*`)")]
    InfiniteLoop { inst: usize },

    /// The backtracker's ready stack exceeded its configured depth.
    #[error("backtrack stack overflow (exceeded {max} suspended threads)")]
    StackOverflow { max: usize },

    /// A pass encountered an AST or instruction shape it does not know how
    /// to handle. Should not occur for well-formed input; indicates a bug in
    /// an earlier pass if it does.
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),
}

pub type Result<T> = std::result::Result<T, Error>;

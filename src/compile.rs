//! Compiles a normalized [`Ast`] into a flat [`Program`]: two passes (count,
//! then emit) against an explicit [`Emitter`] rather than a shared global
//! cursor, followed by the no-infinite-loop check and vertex selection.

use std::num::NonZeroUsize;

use crate::ast::{Ast, ZeroWidth};
use crate::error::{Error, Result};
use crate::inst::{
    CharRange, Inst, InstChar, InstCharClass, InstEmptyLook, InstGoto, InstRecursiveZwa,
    InstSave, InstSplit, InstSplitMany, InstStringCompare, MemoInfo, ZeroWidthKind,
};
use crate::memo::{MemoEncoding, MemoMode};

/// A compiled regular expression: the flat instruction array plus the
/// vertex-selection annotations needed to drive a memoized backtrack.
#[derive(Debug)]
pub struct Program {
    pub original: String,
    pub insts: Vec<Inst>,
    /// Parallel to `insts`; `memo_info[pc]` is instruction `pc`'s annotation.
    pub memo_info: Vec<MemoInfo>,
    pub n_memoized_states: usize,
    pub memo_mode: MemoMode,
    pub memo_encoding: MemoEncoding,
    pub rle_k: NonZeroUsize,
    /// Number of user-visible capturing groups (not counting the implicit
    /// whole-match group 0).
    pub n_captures: u32,
    pub anchored_begin: bool,
    pub eol_anchor: bool,
}

impl Program {
    pub fn len(&self) -> usize {
        self.insts.len()
    }

    /// Number of `(start, end)` slot pairs needed, including the implicit
    /// whole-match group.
    pub fn num_capture_slots(&self) -> usize {
        2 * (self.n_captures as usize + 1)
    }
}

/// Compiles a normalized AST. `ast` must already have gone through
/// [`crate::transform::transform`].
pub fn compile(
    ast: &Ast,
    memo_mode: MemoMode,
    memo_encoding: MemoEncoding,
    rle_k: NonZeroUsize,
) -> Result<Program> {
    compile_with_source(ast, memo_mode, memo_encoding, rle_k, String::new())
}

pub fn compile_with_source(
    ast: &Ast,
    memo_mode: MemoMode,
    memo_encoding: MemoEncoding,
    rle_k: NonZeroUsize,
    original: String,
) -> Result<Program> {
    // Every program is implicitly wrapped in capture group 0, holding the
    // overall match span, the same way slots 0/1 conventionally hold the
    // whole match in Save-slot-addressed backtrackers.
    let wrapped = Ast::Paren { cg_num: 0, child: Box::new(ast.clone()) };

    let mut em = Emitter::new();
    emit_node(&wrapped, &mut em)?;
    em.push(Inst::Match);
    let insts = em.finish();

    assert_no_infinite_loops(&insts)?;

    let n_captures = max_cg_num(ast);
    let anchored_begin = starts_with_bol(ast);
    let eol_anchor = ends_with_eol(ast);

    let effective_encoding =
        if memo_mode == MemoMode::None { MemoEncoding::None } else { memo_encoding };

    let memo_info = determine_memo_nodes(&insts, memo_mode, effective_encoding, rle_k);
    let n_memoized_states = memo_info.iter().filter(|m| m.should_memo).count();

    Ok(Program {
        original,
        insts,
        memo_info,
        n_memoized_states,
        memo_mode,
        memo_encoding: effective_encoding,
        rle_k,
        n_captures,
        anchored_begin,
        eol_anchor,
    })
}

// ---------------------------------------------------------------------
// Pass 1: instruction counting.
// ---------------------------------------------------------------------

/// Number of instructions `emit_node` will produce for `ast`, used to
/// pre-size the instruction vector and independently checkable against
/// `Program::len()` (minus the trailing `Match`).
pub fn count_instrs(ast: &Ast) -> usize {
    match ast {
        Ast::Empty => 0,
        Ast::Lit(_)
        | Ast::Dot
        | Ast::CharEscape(_)
        | Ast::CustomCharClass { .. }
        | Ast::Backref(_)
        | Ast::InlineZwa(_) => 1,
        Ast::Paren { child, .. } => 2 + count_instrs(child),
        Ast::Quest { child, .. } => 1 + count_instrs(child),
        Ast::Star { child, .. } => 2 + count_instrs(child),
        Ast::Plus { child, .. } => 1 + count_instrs(child),
        Ast::Lookahead(child) => 2 + count_instrs(child),
        Ast::Cat(l, r) => count_instrs(l) + count_instrs(r),
        Ast::Alt(l, r) => 2 + count_instrs(l) + count_instrs(r),
        Ast::AltList(cs) => 1 + cs.iter().map(|c| count_instrs(c) + 1).sum::<usize>(),
        Ast::CharRange(..) => {
            unreachable!("CharRange only appears inside CustomCharClass::children")
        }
        Ast::Curly { .. } => {
            unreachable!("Curly must not survive normalization before compile")
        }
    }
}

// ---------------------------------------------------------------------
// Pass 2: emission.
// ---------------------------------------------------------------------

/// An explicit appender threaded through emission, replacing any shared
/// mutable cursor.
struct Emitter {
    insts: Vec<Inst>,
}

impl Emitter {
    fn new() -> Emitter {
        Emitter { insts: Vec::new() }
    }

    fn pc(&self) -> usize {
        self.insts.len()
    }

    fn push(&mut self, inst: Inst) -> usize {
        let pc = self.pc();
        self.insts.push(inst);
        pc
    }

    fn patch_split(&mut self, pc: usize, goto1: usize, goto2: usize) {
        self.insts[pc] = Inst::Split(InstSplit { goto1, goto2 });
    }

    fn patch_split_many(&mut self, pc: usize, edges: Vec<usize>) {
        self.insts[pc] = Inst::SplitMany(InstSplitMany { edges });
    }

    fn patch_jmp(&mut self, pc: usize, goto: usize) {
        self.insts[pc] = Inst::Jmp(InstGoto { goto });
    }

    fn patch_recursive_zwa(&mut self, pc: usize, goto: usize, sub_start: usize, sub_len: usize) {
        self.insts[pc] =
            Inst::RecursiveZeroWidthAssertion(InstRecursiveZwa { goto, sub_start, sub_len });
    }

    fn finish(self) -> Vec<Inst> {
        self.insts
    }
}

fn emit_node(ast: &Ast, em: &mut Emitter) -> Result<()> {
    match ast {
        Ast::Empty => {}
        Ast::Lit(c) => {
            let goto = em.pc() + 1;
            em.push(Inst::Char(InstChar { goto, c: ascii_byte(*c) }));
        }
        Ast::Dot => {
            let goto = em.pc() + 1;
            em.push(Inst::Any(InstGoto { goto }));
        }
        Ast::CharEscape(c) => {
            let goto = em.pc() + 1;
            em.push(compile_escape(*c, goto));
        }
        Ast::CustomCharClass { children, invert, plus_dash, .. } => {
            let goto = em.pc() + 1;
            let mut ranges = Vec::new();
            for child in children {
                push_class_member_ranges(child, &mut ranges);
            }
            if *plus_dash {
                ranges.push(CharRange { lo: b'-', hi: b'-' });
            }
            em.push(Inst::CharClass(InstCharClass { goto, ranges, invert: *invert }));
        }
        Ast::Backref(n) => {
            let goto = em.pc() + 1;
            em.push(Inst::StringCompare(InstStringCompare { goto, cg_num: *n }));
        }
        Ast::InlineZwa(zw) => {
            let goto = em.pc() + 1;
            let look = match zw {
                ZeroWidth::StartText => ZeroWidthKind::StartText,
                ZeroWidth::EndText => ZeroWidthKind::EndText,
                ZeroWidth::WordBoundary => ZeroWidthKind::WordBoundary,
                ZeroWidth::NotWordBoundary => ZeroWidthKind::NotWordBoundary,
            };
            em.push(Inst::InlineZeroWidthAssertion(InstEmptyLook { goto, look }));
        }
        Ast::Paren { cg_num, child } => {
            let start_goto = em.pc() + 1;
            em.push(Inst::Save(InstSave { goto: start_goto, slot: 2 * (*cg_num as usize) }));
            emit_node(child, em)?;
            let end_goto = em.pc() + 1;
            em.push(Inst::Save(InstSave { goto: end_goto, slot: 2 * (*cg_num as usize) + 1 }));
        }
        Ast::Quest { child, non_greedy } => {
            let split_pc = em.push(Inst::Split(InstSplit { goto1: 0, goto2: 0 }));
            let child_start = em.pc();
            emit_node(child, em)?;
            let post = em.pc();
            let (g1, g2) = if *non_greedy { (post, child_start) } else { (child_start, post) };
            em.patch_split(split_pc, g1, g2);
        }
        Ast::Star { child, non_greedy } => {
            let split_pc = em.push(Inst::Split(InstSplit { goto1: 0, goto2: 0 }));
            let child_start = em.pc();
            emit_node(child, em)?;
            em.push(Inst::Jmp(InstGoto { goto: split_pc }));
            let post = em.pc();
            let (g1, g2) = if *non_greedy { (post, child_start) } else { (child_start, post) };
            em.patch_split(split_pc, g1, g2);
        }
        Ast::Plus { child, non_greedy } => {
            let child_start = em.pc();
            emit_node(child, em)?;
            let split_pc = em.push(Inst::Split(InstSplit { goto1: 0, goto2: 0 }));
            let post = em.pc();
            let (g1, g2) = if *non_greedy { (post, child_start) } else { (child_start, post) };
            em.patch_split(split_pc, g1, g2);
        }
        Ast::Cat(l, r) => {
            emit_node(l, em)?;
            emit_node(r, em)?;
        }
        Ast::AltList(children) => {
            let split_pc = em.push(Inst::SplitMany(InstSplitMany { edges: Vec::new() }));
            let mut edges = Vec::with_capacity(children.len());
            let mut jmps = Vec::with_capacity(children.len());
            for child in children {
                edges.push(em.pc());
                emit_node(child, em)?;
                jmps.push(em.push(Inst::Jmp(InstGoto { goto: 0 })));
            }
            let post = em.pc();
            em.patch_split_many(split_pc, edges);
            for jmp_pc in jmps {
                em.patch_jmp(jmp_pc, post);
            }
        }
        Ast::Lookahead(child) => {
            let rzwa_pc = em.push(Inst::RecursiveZeroWidthAssertion(InstRecursiveZwa {
                goto: 0,
                sub_start: 0,
                sub_len: 0,
            }));
            let sub_start = em.pc();
            emit_node(child, em)?;
            em.push(Inst::RecursiveMatch);
            let sub_len = em.pc() - sub_start;
            let post = em.pc();
            em.patch_recursive_zwa(rzwa_pc, post, sub_start, sub_len);
        }
        Ast::Alt(_, _) | Ast::CharRange(..) | Ast::Curly { .. } => {
            return Err(Error::UnsupportedFeature(format!(
                "{ast:?} must not survive normalization before compile"
            )));
        }
    }
    Ok(())
}

fn ascii_byte(c: char) -> u8 {
    if c.is_ascii() {
        c as u8
    } else {
        // ASCII-only engine (see Non-goals); fold anything else to a byte
        // that can never occur in ASCII input text, so it simply never
        // matches rather than panicking.
        0xFF
    }
}

fn push_class_member_ranges(ast: &Ast, out: &mut Vec<CharRange>) {
    match ast {
        Ast::Lit(c) => out.push(CharRange { lo: ascii_byte(*c), hi: ascii_byte(*c) }),
        Ast::CharRange(lo, hi) => out.push(CharRange { lo: ascii_byte(*lo), hi: ascii_byte(*hi) }),
        Ast::CharEscape(c) => push_escape_member_ranges(*c, out),
        other => unreachable!("unexpected character class member: {other:?}"),
    }
}

/// Expands one escape appearing inside a `[...]` class into concrete byte
/// ranges. A `CharClass` instruction has a single `invert` bit shared by the
/// whole class (the class's own `ccInvert`), so a member escape that carries
/// its own invert (`\D`, `\S`, `\W`) must be turned into its real complement
/// ranges here rather than have that invert bit discarded -- otherwise
/// `[\D]` would compile down to "digit ranges, not inverted", the opposite
/// of what `\D` means.
fn push_escape_member_ranges(c: char, out: &mut Vec<CharRange>) {
    match c {
        's' | 'S' | 'w' | 'W' | 'd' | 'D' => {
            let (ranges, invert) = escape_ranges(c);
            if invert {
                out.extend(complement_ranges(&ranges));
            } else {
                out.extend(ranges);
            }
        }
        'n' => out.push(CharRange { lo: b'\n', hi: b'\n' }),
        't' => out.push(CharRange { lo: b'\t', hi: b'\t' }),
        'r' => out.push(CharRange { lo: b'\r', hi: b'\r' }),
        'f' => out.push(CharRange { lo: 0x0C, hi: 0x0C }),
        'v' => out.push(CharRange { lo: 0x0B, hi: 0x0B }),
        other => out.push(CharRange { lo: ascii_byte(other), hi: ascii_byte(other) }),
    }
}

/// The complement of `ranges` over the full byte space `0..=255`.
fn complement_ranges(ranges: &[CharRange]) -> Vec<CharRange> {
    let mut sorted = ranges.to_vec();
    sorted.sort_by_key(|r| r.lo);
    let mut out = Vec::new();
    let mut next_lo: u16 = 0;
    for r in sorted {
        if (r.lo as u16) > next_lo {
            out.push(CharRange { lo: next_lo as u8, hi: r.lo - 1 });
        }
        next_lo = next_lo.max(r.hi as u16 + 1);
    }
    if next_lo <= 255 {
        out.push(CharRange { lo: next_lo as u8, hi: 255 });
    }
    out
}

/// Fixed ASCII ranges for the built-in escapes, and whether the escape is
/// itself an inverted class (the uppercase forms).
fn escape_ranges(c: char) -> (Vec<CharRange>, bool) {
    match c {
        's' => (vec![CharRange { lo: 9, hi: 13 }, CharRange { lo: 28, hi: 32 }], false),
        'S' => (vec![CharRange { lo: 9, hi: 13 }, CharRange { lo: 28, hi: 32 }], true),
        'w' => (
            vec![
                CharRange { lo: b'a', hi: b'z' },
                CharRange { lo: b'A', hi: b'Z' },
                CharRange { lo: b'0', hi: b'9' },
                CharRange { lo: b'_', hi: b'_' },
            ],
            false,
        ),
        'W' => (
            vec![
                CharRange { lo: b'a', hi: b'z' },
                CharRange { lo: b'A', hi: b'Z' },
                CharRange { lo: b'0', hi: b'9' },
                CharRange { lo: b'_', hi: b'_' },
            ],
            true,
        ),
        'd' => (vec![CharRange { lo: b'0', hi: b'9' }], false),
        'D' => (vec![CharRange { lo: b'0', hi: b'9' }], true),
        _ => (vec![], false),
    }
}

fn compile_escape(c: char, goto: usize) -> Inst {
    match c {
        's' | 'S' | 'w' | 'W' | 'd' | 'D' => {
            let (ranges, invert) = escape_ranges(c);
            Inst::CharClass(InstCharClass { goto, ranges, invert })
        }
        'n' => Inst::Char(InstChar { goto, c: b'\n' }),
        't' => Inst::Char(InstChar { goto, c: b'\t' }),
        'r' => Inst::Char(InstChar { goto, c: b'\r' }),
        'f' => Inst::Char(InstChar { goto, c: 0x0C }),
        'v' => Inst::Char(InstChar { goto, c: 0x0B }),
        other => Inst::Char(InstChar { goto, c: ascii_byte(other) }),
    }
}

fn max_cg_num(ast: &Ast) -> u32 {
    match ast {
        Ast::Paren { cg_num, child } => (*cg_num).max(max_cg_num(child)),
        Ast::Lookahead(c) | Ast::Quest { child: c, .. } | Ast::Star { child: c, .. }
        | Ast::Plus { child: c, .. } => max_cg_num(c),
        Ast::Cat(l, r) | Ast::Alt(l, r) => max_cg_num(l).max(max_cg_num(r)),
        Ast::AltList(cs) => cs.iter().map(max_cg_num).max().unwrap_or(0),
        Ast::CustomCharClass { children, .. } => {
            children.iter().map(max_cg_num).max().unwrap_or(0)
        }
        _ => 0,
    }
}

fn starts_with_bol(ast: &Ast) -> bool {
    match ast {
        Ast::InlineZwa(ZeroWidth::StartText) => true,
        Ast::Cat(l, _) => starts_with_bol(l),
        Ast::Paren { child, .. } => starts_with_bol(child),
        _ => false,
    }
}

fn ends_with_eol(ast: &Ast) -> bool {
    match ast {
        Ast::InlineZwa(ZeroWidth::EndText) => true,
        Ast::Cat(_, r) => ends_with_eol(r),
        Ast::Paren { child, .. } => ends_with_eol(child),
        _ => false,
    }
}

// ---------------------------------------------------------------------
// No-infinite-loop verification.
// ---------------------------------------------------------------------

/// Zero-width outgoing edges for the DFS in [`assert_no_infinite_loops`].
/// `StringCompare` is conservatively treated as character-consuming (no
/// zero-width successors). A lookahead's embedded sub-program is reached
/// only through its own nested sub-search, never through ordinary
/// control-flow walking, so `RecursiveZeroWidthAssertion`'s only zero-width
/// successor is its `goto` (the post-lookahead continuation).
fn zero_width_successors(inst: &Inst) -> Vec<usize> {
    match inst {
        Inst::Jmp(g) => vec![g.goto],
        Inst::Split(s) => vec![s.goto1, s.goto2],
        Inst::SplitMany(s) => s.edges.clone(),
        Inst::Save(s) => vec![s.goto],
        Inst::InlineZeroWidthAssertion(e) => vec![e.goto],
        Inst::RecursiveZeroWidthAssertion(r) => vec![r.goto],
        Inst::Char(_) | Inst::CharClass(_) | Inst::Any(_) | Inst::StringCompare(_)
        | Inst::Match | Inst::RecursiveMatch => vec![],
    }
}

/// Rejects programs with an epsilon cycle reachable through
/// `Jmp`/`Split`/`SplitMany` (e.g. `(a*)*`). Implemented iteratively with an
/// explicit work list so it cannot stack-overflow on large programs.
fn assert_no_infinite_loops(insts: &[Inst]) -> Result<()> {
    for (start, inst) in insts.iter().enumerate() {
        let is_loop_starter = matches!(inst, Inst::Jmp(_) | Inst::Split(_) | Inst::SplitMany(_));
        if !is_loop_starter {
            continue;
        }
        let mut visit_mark = vec![false; insts.len()];
        let mut work: Vec<usize> = zero_width_successors(inst);
        while let Some(n) = work.pop() {
            if n == start {
                return Err(Error::InfiniteLoop { inst: start });
            }
            if visit_mark[n] {
                continue;
            }
            visit_mark[n] = true;
            work.extend(zero_width_successors(&insts[n]));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------
// Vertex selection.
// ---------------------------------------------------------------------

/// Every outgoing control-flow edge of `inst`. Every opcode in this engine
/// carries its own explicit successor field(s) (no implicit fallthrough),
/// so in-degree is exactly the count of incoming edges reported here -- see
/// DESIGN.md for why that's a deliberate departure from treating
/// non-branching instructions as implicitly falling through to `pc + 1`.
fn out_edges(inst: &Inst) -> Vec<usize> {
    match inst {
        Inst::Match | Inst::RecursiveMatch => vec![],
        Inst::Save(s) => vec![s.goto],
        Inst::Split(s) => vec![s.goto1, s.goto2],
        Inst::SplitMany(s) => s.edges.clone(),
        Inst::Char(c) => vec![c.goto],
        Inst::CharClass(c) => vec![c.goto],
        Inst::Any(g) => vec![g.goto],
        Inst::Jmp(g) => vec![g.goto],
        Inst::InlineZeroWidthAssertion(e) => vec![e.goto],
        Inst::StringCompare(s) => vec![s.goto],
        Inst::RecursiveZeroWidthAssertion(r) => vec![r.goto],
    }
}

fn in_degrees(insts: &[Inst]) -> Vec<usize> {
    let mut deg = vec![0usize; insts.len()];
    for inst in insts {
        for t in out_edges(inst) {
            deg[t] += 1;
        }
    }
    deg
}

/// `{source, target}` pairs where `target <= source`, per the glossary's
/// definition of a back-edge. Generalizes the reference design's
/// per-quantifier enumeration ("the y of a Star/Plus Split, the x of a
/// back-pointing Jmp") to any opcode with a backward-pointing successor.
fn back_edge_targets(insts: &[Inst]) -> Vec<bool> {
    let mut is_target = vec![false; insts.len()];
    for (source, inst) in insts.iter().enumerate() {
        for target in out_edges(inst) {
            if target <= source {
                is_target[target] = true;
            }
        }
    }
    is_target
}

/// Assigns `MemoInfo` to every instruction based on `memo_mode`.
pub fn determine_memo_nodes(
    insts: &[Inst],
    memo_mode: MemoMode,
    memo_encoding: MemoEncoding,
    rle_k: NonZeroUsize,
) -> Vec<MemoInfo> {
    let should_memo: Vec<bool> = match memo_mode {
        MemoMode::None => vec![false; insts.len()],
        MemoMode::Full => vec![true; insts.len()],
        MemoMode::InDegGt1 => in_degrees(insts).into_iter().map(|d| d > 1).collect(),
        MemoMode::LoopDest => back_edge_targets(insts),
    };

    let visit_interval =
        if memo_encoding == MemoEncoding::RleTuned { rle_k } else { NonZeroUsize::new(1).unwrap() };

    let mut next_memo_state = 0usize;
    should_memo
        .into_iter()
        .map(|memo| {
            let memo_state_num = if memo {
                let n = next_memo_state;
                next_memo_state += 1;
                Some(n)
            } else {
                None
            };
            MemoInfo { should_memo: memo, memo_state_num, visit_interval }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use crate::transform::transform;

    fn k(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn compile_simple(pat: &str) -> Program {
        let ast = transform(parse(pat).unwrap());
        compile(&ast, MemoMode::None, MemoEncoding::None, k(1)).unwrap()
    }

    #[test]
    fn program_len_matches_count_plus_one() {
        for pat in ["a(b|c)d", "a*", "a{2,3}", "(a|b)+c", "[a-z\\d]+", ""] {
            let ast = transform(parse(pat).unwrap());
            let wrapped = Ast::Paren { cg_num: 0, child: Box::new(ast) };
            let prog = compile_simple(pat);
            assert_eq!(prog.len(), count_instrs(&wrapped) + 1, "pattern {pat:?}");
            assert!(matches!(prog.insts.last().unwrap(), Inst::Match));
        }
    }

    #[test]
    fn accepts_star() {
        let ast = transform(parse("a*").unwrap());
        compile(&ast, MemoMode::None, MemoEncoding::None, k(1)).unwrap();
    }

    #[test]
    fn rejects_star_of_star() {
        let ast = transform(parse("(a*)*").unwrap());
        let err = compile(&ast, MemoMode::None, MemoEncoding::None, k(1)).unwrap_err();
        assert!(matches!(err, Error::InfiniteLoop { .. }));
    }

    #[test]
    fn rejects_star_of_optional() {
        let ast = transform(parse("(a?)*").unwrap());
        let err = compile(&ast, MemoMode::None, MemoEncoding::None, k(1)).unwrap_err();
        assert!(matches!(err, Error::InfiniteLoop { .. }));
    }

    #[test]
    fn full_memo_mode_memoizes_everything() {
        let ast = transform(parse("(a+)+b").unwrap());
        let prog = compile(&ast, MemoMode::Full, MemoEncoding::Negative, k(1)).unwrap();
        assert_eq!(prog.n_memoized_states, prog.len());
        assert!(prog.memo_info.iter().all(|m| m.should_memo));
    }

    #[test]
    fn none_memo_mode_forces_none_encoding() {
        let ast = transform(parse("a+").unwrap());
        let prog = compile(&ast, MemoMode::None, MemoEncoding::Rle, k(4)).unwrap();
        assert_eq!(prog.memo_encoding, MemoEncoding::None);
        assert_eq!(prog.n_memoized_states, 0);
    }

    fn matches(pat: &str, input: &str) -> bool {
        let prog = compile_simple(pat);
        crate::backtrack::search(&prog, input.as_bytes(), 0, crate::backtrack::DEFAULT_MAX_STACK)
            .unwrap()
            .captures
            .is_some()
    }

    #[test]
    fn negated_escape_inside_class_keeps_its_own_invert() {
        // `\D` means "not a digit"; inside `[...]` that must still hold,
        // not get flattened into "digit, not inverted" by the class's own
        // (unset) invert bit.
        assert!(!matches(r"[\D]", "5"));
        assert!(matches(r"[\D]", "x"));

        assert!(!matches(r"[\S]", " "));
        assert!(matches(r"[\S]", "x"));

        assert!(!matches(r"[\W]", "x"));
        assert!(matches(r"[\W]", "!"));
    }

    #[test]
    fn literal_escape_inside_class_is_not_dropped() {
        assert!(matches(r"[\n]", "\n"));
        assert!(!matches(r"[\n]", "x"));
        assert!(matches(r"[\.]", "."));
    }
}

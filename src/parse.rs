//! Turns a regex pattern string into an [`Ast`].
//!
//! The parser is a single left-to-right scan driving an explicit stack of
//! [`Group`] frames, one per open paren (plus a root frame for top level),
//! rather than recursive-descent functions per grammar rule. Each frame
//! accumulates a concatenation of sibling atoms; `|` closes the current
//! concatenation into an alternative and `)` closes the frame itself. This
//! keeps call-stack depth proportional to nesting depth, not pattern length.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::ast::{Ast, ZeroWidth};
use crate::error::{Error, Result};

/// Parse `pattern` into a regex AST.
pub fn parse(pattern: &str) -> Result<Ast> {
    Parser::new(pattern).parse()
}

/// One level of grouping: the root, a capturing group, a non-capturing
/// group, or a lookahead body.
struct Group {
    kind: GroupKind,
    /// Completed alternatives seen so far at this level (before the one
    /// currently being built in `atoms`).
    alts: Vec<Ast>,
    /// Sibling atoms of the concatenation currently being built. The last
    /// element is the target of the next postfix quantifier.
    atoms: Vec<Ast>,
}

enum GroupKind {
    Root,
    Capture(u32),
    NonCapture,
    Lookahead,
}

impl Group {
    fn new(kind: GroupKind) -> Group {
        Group { kind, alts: Vec::new(), atoms: Vec::new() }
    }

    fn push_atom(&mut self, atom: Ast) {
        self.atoms.push(atom);
    }

    /// Mutable access to the atom a postfix quantifier applies to.
    fn pop_quantifier_target(&mut self, pos: usize) -> Result<Ast> {
        self.atoms
            .pop()
            .ok_or_else(|| Error::SyntaxError {
                pos,
                message: "quantifier with no preceding expression".into(),
            })
    }

    /// Fold the current run of sibling atoms into one `Cat` chain (or
    /// `Empty` if there were none).
    fn take_concat(&mut self) -> Ast {
        let atoms = std::mem::take(&mut self.atoms);
        let mut iter = atoms.into_iter();
        match iter.next() {
            None => Ast::Empty,
            Some(first) => iter.fold(first, Ast::cat),
        }
    }

    /// Finish a `|`: push the just-completed concatenation as a finished
    /// alternative.
    fn push_bar(&mut self) {
        let concat = self.take_concat();
        self.alts.push(concat);
    }

    /// Finalize this frame's body into a single AST node, left-leaning over
    /// `|` if there were any (flattened later by the alt-flattening pass).
    fn finish_body(mut self) -> Ast {
        let last = self.take_concat();
        if self.alts.is_empty() {
            return last;
        }
        self.alts.push(last);
        let mut iter = self.alts.into_iter();
        let first = iter.next().unwrap();
        iter.fold(first, |acc, next| Ast::Alt(Box::new(acc), Box::new(next)))
    }
}

struct Parser<'p> {
    pattern: &'p str,
    chars: Peekable<CharIndices<'p>>,
    next_cg: u32,
}

impl<'p> Parser<'p> {
    fn new(pattern: &'p str) -> Parser<'p> {
        Parser { pattern, chars: pattern.char_indices().peekable(), next_cg: 1 }
    }

    fn err(&self, pos: usize, message: impl Into<String>) -> Error {
        Error::SyntaxError { pos, message: message.into() }
    }

    fn pos(&mut self) -> usize {
        self.chars.peek().map(|&(i, _)| i).unwrap_or(self.pattern.len())
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn eat(&mut self, want: char) -> bool {
        if self.peek_char() == Some(want) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Parses a `(`...`)` header already past the opening paren: `?:`,
    /// `?=`, or a plain capturing group.
    fn parse_group_open(&mut self, open_pos: usize) -> Result<GroupKind> {
        if self.eat('?') {
            if self.eat(':') {
                Ok(GroupKind::NonCapture)
            } else if self.eat('=') {
                Ok(GroupKind::Lookahead)
            } else {
                Err(self.err(open_pos, "unsupported group syntax after '(?'"))
            }
        } else {
            let n = self.next_cg;
            self.next_cg += 1;
            Ok(GroupKind::Capture(n))
        }
    }

    /// Reads a non-greedy `?` suffix, if present, consuming it.
    fn eat_non_greedy(&mut self) -> bool {
        self.eat('?')
    }

    /// Parses the body of a `{...}` quantifier, already past `{`.
    /// Returns `(min, max)`.
    fn parse_curly_bounds(&mut self, open_pos: usize) -> Result<(Option<u32>, Option<u32>)> {
        let min = self.parse_optional_number();
        let has_comma = self.eat(',');
        let max = if has_comma { self.parse_optional_number() } else { min };
        if !self.eat('}') {
            let pos = self.pos();
            return Err(self.err(pos, "expected '}' to close counted repetition"));
        }
        if min.is_none() && max.is_none() {
            return Err(self.err(open_pos, "repetition {,} must specify a bound"));
        }
        if let (Some(m), Some(n)) = (min, max) {
            if n < m {
                return Err(self.err(open_pos, "repetition max is less than min"));
            }
        }
        Ok((min, max))
    }

    fn parse_optional_number(&mut self) -> Option<u32> {
        let mut n: Option<u32> = None;
        while let Some(c) = self.peek_char() {
            if !c.is_ascii_digit() {
                break;
            }
            self.bump();
            n = Some(n.unwrap_or(0) * 10 + c.to_digit(10).unwrap());
        }
        n
    }

    /// Parses a `[...]` character class, already past the opening `[`.
    fn parse_char_class(&mut self, open_pos: usize) -> Result<Ast> {
        let invert = self.eat('^');
        let mut children = Vec::new();
        let mut plus_dash = false;
        let mut first = true;
        loop {
            match self.peek_char() {
                None => return Err(self.err(open_pos, "unterminated character class")),
                Some(']') if !first => {
                    self.bump();
                    break;
                }
                _ => {}
            }
            first = false;
            let lo = self.parse_class_member()?;
            match lo {
                ClassMember::Dash => {
                    plus_dash = true;
                }
                ClassMember::Char(lo_ch) => {
                    if self.peek_char() == Some('-') {
                        let save = self.chars.clone();
                        self.bump();
                        match self.peek_char() {
                            Some(']') => {
                                // Trailing literal dash, e.g. `[a-]`.
                                self.chars = save;
                                children.push(Ast::Lit(lo_ch));
                            }
                            _ => match self.parse_class_member()? {
                                ClassMember::Char(hi_ch) => {
                                    if hi_ch < lo_ch {
                                        return Err(self.err(
                                            open_pos,
                                            "character class range is out of order",
                                        ));
                                    }
                                    children.push(Ast::CharRange(lo_ch, hi_ch));
                                }
                                ClassMember::Dash => {
                                    plus_dash = true;
                                    children.push(Ast::Lit(lo_ch));
                                    children.push(Ast::Lit('-'));
                                }
                                ClassMember::Escape(e) => {
                                    children.push(Ast::Lit(lo_ch));
                                    children.push(Ast::Lit('-'));
                                    children.push(Ast::CharEscape(e));
                                }
                            },
                        }
                    } else {
                        children.push(Ast::Lit(lo_ch));
                    }
                }
                ClassMember::Escape(e) => {
                    children.push(Ast::CharEscape(e));
                }
            }
        }
        Ok(Ast::CustomCharClass { children, invert, plus_dash, merged_ranges: true })
    }

    fn parse_class_member(&mut self) -> Result<ClassMember> {
        let (pos, c) = self.bump().ok_or_else(|| self.err(self.pattern.len(), "unterminated character class"))?;
        if c == '\\' {
            let (_, e) = self
                .bump()
                .ok_or_else(|| self.err(pos, "trailing backslash in character class"))?;
            Ok(ClassMember::Escape(e))
        } else if c == '-' {
            Ok(ClassMember::Dash)
        } else {
            Ok(ClassMember::Char(c))
        }
    }

    fn parse(mut self) -> Result<Ast> {
        let mut stack: Vec<Group> = vec![Group::new(GroupKind::Root)];

        while let Some(&(pos, c)) = self.chars.peek() {
            match c {
                '|' => {
                    self.bump();
                    stack.last_mut().unwrap().push_bar();
                }
                '(' => {
                    self.bump();
                    let kind = self.parse_group_open(pos)?;
                    stack.push(Group::new(kind));
                }
                ')' => {
                    self.bump();
                    if stack.len() == 1 {
                        return Err(self.err(pos, "unmatched closing parenthesis"));
                    }
                    let frame = stack.pop().unwrap();
                    let kind = frame.kind.clone_tag();
                    let child = frame.finish_body();
                    let node = match kind {
                        FrameTag::NonCapture => child,
                        FrameTag::Capture(n) => {
                            Ast::Paren { cg_num: n, child: Box::new(child) }
                        }
                        FrameTag::Lookahead => Ast::Lookahead(Box::new(child)),
                        FrameTag::Root => unreachable!("root frame never closes on ')'"),
                    };
                    stack.last_mut().unwrap().push_atom(node);
                }
                '^' => {
                    self.bump();
                    stack.last_mut().unwrap().push_atom(Ast::InlineZwa(ZeroWidth::StartText));
                }
                '$' => {
                    self.bump();
                    stack.last_mut().unwrap().push_atom(Ast::InlineZwa(ZeroWidth::EndText));
                }
                '.' => {
                    self.bump();
                    stack.last_mut().unwrap().push_atom(Ast::Dot);
                }
                '[' => {
                    self.bump();
                    let cls = self.parse_char_class(pos)?;
                    stack.last_mut().unwrap().push_atom(cls);
                }
                '\\' => {
                    self.bump();
                    let (epos, e) = self
                        .bump()
                        .ok_or_else(|| self.err(pos, "trailing backslash"))?;
                    let atom = match e {
                        'b' => Ast::InlineZwa(ZeroWidth::WordBoundary),
                        'B' => Ast::InlineZwa(ZeroWidth::NotWordBoundary),
                        other => Ast::CharEscape(other),
                    };
                    let _ = epos;
                    stack.last_mut().unwrap().push_atom(atom);
                }
                '?' => {
                    self.bump();
                    let frame = stack.last_mut().unwrap();
                    let child = frame.pop_quantifier_target(pos)?;
                    let non_greedy = self.eat_non_greedy();
                    frame.push_atom(Ast::Quest { child: Box::new(child), non_greedy });
                }
                '*' => {
                    self.bump();
                    let frame = stack.last_mut().unwrap();
                    let child = frame.pop_quantifier_target(pos)?;
                    let non_greedy = self.eat_non_greedy();
                    frame.push_atom(Ast::Star { child: Box::new(child), non_greedy });
                }
                '+' => {
                    self.bump();
                    let frame = stack.last_mut().unwrap();
                    let child = frame.pop_quantifier_target(pos)?;
                    let non_greedy = self.eat_non_greedy();
                    frame.push_atom(Ast::Plus { child: Box::new(child), non_greedy });
                }
                '{' => {
                    self.bump();
                    let (min, max) = self.parse_curly_bounds(pos)?;
                    let frame = stack.last_mut().unwrap();
                    let child = frame.pop_quantifier_target(pos)?;
                    let non_greedy = self.eat_non_greedy();
                    frame.push_atom(Ast::Curly { child: Box::new(child), min, max, non_greedy });
                }
                other => {
                    self.bump();
                    stack.last_mut().unwrap().push_atom(Ast::Lit(other));
                }
            }
        }

        if stack.len() != 1 {
            return Err(self.err(self.pattern.len(), "unclosed group"));
        }
        Ok(stack.pop().unwrap().finish_body())
    }
}

enum ClassMember {
    Char(char),
    Dash,
    Escape(char),
}

/// A copyable summary of `GroupKind`, used once the frame is being consumed
/// so we can still report what it was after `finish_body` takes it by value.
enum FrameTag {
    Root,
    Capture(u32),
    NonCapture,
    Lookahead,
}

impl GroupKind {
    fn clone_tag(&self) -> FrameTag {
        match *self {
            GroupKind::Root => FrameTag::Root,
            GroupKind::Capture(n) => FrameTag::Capture(n),
            GroupKind::NonCapture => FrameTag::NonCapture,
            GroupKind::Lookahead => FrameTag::Lookahead,
        }
    }
}

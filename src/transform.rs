//! AST normalization: four fixed-order passes that rewrite the parser's
//! output into the shape the compiler expects.

use crate::ast::Ast;

/// Run all four normalization passes in order and return the rewritten tree.
pub fn transform(ast: Ast) -> Ast {
    let ast = eliminate_curly(ast);
    let ast = flatten_alt(ast);
    let ast = rewrite_backrefs(ast);
    flatten_char_classes(ast)
}

/// Pass 1: rewrite every `Curly{child, min, max}` into concatenations of
/// the child and nested `Quest`s, per the counted-repetition expansion.
fn eliminate_curly(ast: Ast) -> Ast {
    match ast {
        Ast::Curly { child, min, max, non_greedy } => {
            let child = eliminate_curly(*child);
            let m = min.unwrap_or(0);

            let prefix = if m > 0 {
                let mut copies = (0..m).map(|_| child.clone());
                let first = copies.next().unwrap();
                Some(copies.fold(first, Ast::cat))
            } else {
                None
            };

            let suffix = match max {
                None => Some(Ast::Star { child: Box::new(child), non_greedy }),
                Some(n) => {
                    let r = n.saturating_sub(m);
                    if r == 0 {
                        None
                    } else {
                        // Right-nested `(A(A(...(A)?...)?)?)`, depth r.
                        let mut inner: Option<Ast> = None;
                        for _ in 0..r {
                            let body = match inner.take() {
                                None => child.clone(),
                                Some(prev) => child.clone().cat(prev),
                            };
                            inner = Some(Ast::Quest { child: Box::new(body), non_greedy });
                        }
                        inner
                    }
                }
            };

            match (prefix, suffix) {
                (Some(p), Some(s)) => p.cat(s),
                (Some(p), None) => p,
                (None, Some(s)) => s,
                (None, None) => Ast::Empty,
            }
        }
        Ast::Lookahead(c) => Ast::Lookahead(Box::new(eliminate_curly(*c))),
        Ast::Paren { cg_num, child } => {
            Ast::Paren { cg_num, child: Box::new(eliminate_curly(*child)) }
        }
        Ast::Quest { child, non_greedy } => {
            Ast::Quest { child: Box::new(eliminate_curly(*child)), non_greedy }
        }
        Ast::Star { child, non_greedy } => {
            Ast::Star { child: Box::new(eliminate_curly(*child)), non_greedy }
        }
        Ast::Plus { child, non_greedy } => {
            Ast::Plus { child: Box::new(eliminate_curly(*child)), non_greedy }
        }
        Ast::Cat(l, r) => Ast::Cat(Box::new(eliminate_curly(*l)), Box::new(eliminate_curly(*r))),
        Ast::Alt(l, r) => Ast::Alt(Box::new(eliminate_curly(*l)), Box::new(eliminate_curly(*r))),
        Ast::AltList(cs) => Ast::AltList(cs.into_iter().map(eliminate_curly).collect()),
        Ast::CustomCharClass { children, invert, plus_dash, merged_ranges } => {
            Ast::CustomCharClass {
                children: children.into_iter().map(eliminate_curly).collect(),
                invert,
                plus_dash,
                merged_ranges,
            }
        }
        leaf => leaf,
    }
}

/// Pass 2: flatten left-leaning `Alt` chains into a single `AltList`.
fn flatten_alt(ast: Ast) -> Ast {
    match ast {
        Ast::Alt(l, r) => {
            let mut children = flatten_alt_chain(*l);
            children.push(flatten_alt(*r));
            Ast::AltList(children)
        }
        Ast::Lookahead(c) => Ast::Lookahead(Box::new(flatten_alt(*c))),
        Ast::Paren { cg_num, child } => {
            Ast::Paren { cg_num, child: Box::new(flatten_alt(*child)) }
        }
        Ast::Quest { child, non_greedy } => {
            Ast::Quest { child: Box::new(flatten_alt(*child)), non_greedy }
        }
        Ast::Star { child, non_greedy } => {
            Ast::Star { child: Box::new(flatten_alt(*child)), non_greedy }
        }
        Ast::Plus { child, non_greedy } => {
            Ast::Plus { child: Box::new(flatten_alt(*child)), non_greedy }
        }
        Ast::Cat(l, r) => Ast::Cat(Box::new(flatten_alt(*l)), Box::new(flatten_alt(*r))),
        Ast::AltList(cs) => Ast::AltList(cs.into_iter().map(flatten_alt).collect()),
        Ast::CustomCharClass { children, invert, plus_dash, merged_ranges } => {
            Ast::CustomCharClass {
                children: children.into_iter().map(flatten_alt).collect(),
                invert,
                plus_dash,
                merged_ranges,
            }
        }
        leaf => leaf,
    }
}

/// Recursively descend the left spine of an `Alt` chain, collecting
/// branches in left-to-right order. Non-`Alt` left children terminate the
/// spine.
fn flatten_alt_chain(ast: Ast) -> Vec<Ast> {
    match ast {
        Ast::Alt(l, r) => {
            let mut v = flatten_alt_chain(*l);
            v.push(flatten_alt(*r));
            v
        }
        other => vec![flatten_alt(other)],
    }
}

/// Pass 3: rewrite `CharEscape('1'..='9')` into `Backref`.
fn rewrite_backrefs(ast: Ast) -> Ast {
    match ast {
        Ast::CharEscape(c) if c.is_ascii_digit() && c != '0' => {
            Ast::Backref(c.to_digit(10).unwrap() as u8)
        }
        Ast::Lookahead(c) => Ast::Lookahead(Box::new(rewrite_backrefs(*c))),
        Ast::Paren { cg_num, child } => {
            Ast::Paren { cg_num, child: Box::new(rewrite_backrefs(*child)) }
        }
        Ast::Quest { child, non_greedy } => {
            Ast::Quest { child: Box::new(rewrite_backrefs(*child)), non_greedy }
        }
        Ast::Star { child, non_greedy } => {
            Ast::Star { child: Box::new(rewrite_backrefs(*child)), non_greedy }
        }
        Ast::Plus { child, non_greedy } => {
            Ast::Plus { child: Box::new(rewrite_backrefs(*child)), non_greedy }
        }
        Ast::Cat(l, r) => Ast::Cat(Box::new(rewrite_backrefs(*l)), Box::new(rewrite_backrefs(*r))),
        Ast::AltList(cs) => Ast::AltList(cs.into_iter().map(rewrite_backrefs).collect()),
        Ast::CustomCharClass { children, invert, plus_dash, merged_ranges } => {
            Ast::CustomCharClass {
                children: children.into_iter().map(rewrite_backrefs).collect(),
                invert,
                plus_dash,
                merged_ranges,
            }
        }
        leaf => leaf,
    }
}

/// Pass 4: ensure every `CustomCharClass` has a flat, merged child list.
/// The parser already builds classes with a flat `Vec`, so this pass is the
/// idiomatic-Rust counterpart of flattening a pointer-linked range chain:
/// it's a no-op on well-formed input but keeps the four-pass pipeline (and
/// the `merged_ranges` invariant it's responsible for) explicit and checked.
fn flatten_char_classes(ast: Ast) -> Ast {
    match ast {
        Ast::CustomCharClass { children, invert, plus_dash, .. } => Ast::CustomCharClass {
            children: children.into_iter().map(flatten_char_classes).collect(),
            invert,
            plus_dash,
            merged_ranges: true,
        },
        Ast::Lookahead(c) => Ast::Lookahead(Box::new(flatten_char_classes(*c))),
        Ast::Paren { cg_num, child } => {
            Ast::Paren { cg_num, child: Box::new(flatten_char_classes(*child)) }
        }
        Ast::Quest { child, non_greedy } => {
            Ast::Quest { child: Box::new(flatten_char_classes(*child)), non_greedy }
        }
        Ast::Star { child, non_greedy } => {
            Ast::Star { child: Box::new(flatten_char_classes(*child)), non_greedy }
        }
        Ast::Plus { child, non_greedy } => {
            Ast::Plus { child: Box::new(flatten_char_classes(*child)), non_greedy }
        }
        Ast::Cat(l, r) => {
            Ast::Cat(Box::new(flatten_char_classes(*l)), Box::new(flatten_char_classes(*r)))
        }
        Ast::AltList(cs) => Ast::AltList(cs.into_iter().map(flatten_char_classes).collect()),
        leaf => leaf,
    }
}

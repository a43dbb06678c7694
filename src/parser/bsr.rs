//! The Binary Subtree Representation (BSR) store.
//!
//! A packed encoding of the shared parse forest: every entry is a head (a complete production
//! or a proper body prefix) with a span `(left, right)` and a set of pivot positions. One pivot
//! per head is an unambiguous binary subtree; several pivots are packed alternatives.

use crate::parser::Slot;
use crate::{Grammar, ParseResult, SymbolIdx};
use ptree::TreeItem;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as FmtWrite;
use std::io;

/// Forest rendering stops expanding below this depth so cyclic grammars stay printable.
const MAX_RENDER_DEPTH: usize = 32;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
/// The discriminated head of a BSR entry.
pub enum BsrHead {
    /// A complete subtree for one alternative of a nonterminal.
    Complete { head: SymbolIdx, production: usize },
    /// An intermediate subtree covering the first `dot` symbols of a body, `dot > 1`.
    Prefix { symbols: Vec<SymbolIdx> },
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct BsrKey {
    pub head: BsrHead,
    pub left: usize,
    pub right: usize,
}

#[derive(Default)]
/// The set `Y` of a CNP parse: packed binary subtree entries with deduplicated pivot sets.
pub struct BsrStore {
    entries: HashMap<BsrKey, BTreeSet<usize>>,
    order: Vec<BsrKey>,
}

impl BsrStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `bsrAdd`: a slot with the dot at the end of the body stores a complete subtree, a dot
    /// past position one stores an intermediate prefix subtree, and a dot at position one is
    /// represented implicitly.
    pub(crate) fn add(
        &mut self,
        grammar: &Grammar,
        slot: Slot,
        left: usize,
        pivot: usize,
        right: usize,
    ) {
        let body = grammar.productions().body(slot.head, slot.production);
        if slot.dot == body.len() {
            self.insert(
                BsrKey {
                    head: BsrHead::Complete {
                        head: slot.head,
                        production: slot.production,
                    },
                    left,
                    right,
                },
                pivot,
            );
        } else if slot.dot > 1 {
            self.insert(
                BsrKey {
                    head: BsrHead::Prefix {
                        symbols: body[..slot.dot].to_vec(),
                    },
                    left,
                    right,
                },
                pivot,
            );
        }
    }

    fn insert(&mut self, key: BsrKey, pivot: usize) {
        match self.entries.get_mut(&key) {
            Some(pivots) => {
                pivots.insert(pivot);
            }
            None => {
                let mut pivots = BTreeSet::new();
                pivots.insert(pivot);
                self.order.push(key.clone());
                self.entries.insert(key, pivots);
            }
        }
    }

    /// The pivot set stored under `(head, left, right)`, if any.
    pub fn pivots(&self, head: &BsrHead, left: usize, right: usize) -> Option<&BTreeSet<usize>> {
        self.entries.get(&BsrKey {
            head: head.clone(),
            left,
            right,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&BsrKey, &BTreeSet<usize>)> {
        self.order.iter().map(move |key| (key, &self.entries[key]))
    }

    /// Write the whole store, one entry per line.
    pub fn write(&self, grammar: &Grammar, w: &mut dyn FmtWrite) -> std::fmt::Result {
        for (key, pivots) in self.iter() {
            match &key.head {
                BsrHead::Complete { head, production } => {
                    write!(w, "({} -> ", grammar.symbols().get(*head))?;
                    grammar.write_body(w, grammar.productions().body(*head, *production))?;
                }
                BsrHead::Prefix { symbols } => {
                    write!(w, "([")?;
                    grammar.write_body(w, symbols)?;
                    write!(w, "]")?;
                }
            }
            write!(w, ", {}, {}) : {{", key.left, key.right)?;
            for (i, pivot) in pivots.iter().enumerate() {
                if i != 0 {
                    write!(w, ", ")?;
                }
                write!(w, "{}", pivot)?;
            }
            writeln!(w, "}}")?;
        }
        Ok(())
    }
}

#[derive(Clone)]
/// A renderable view into the forest, rooted at a symbol over a span.
///
/// Implements [ptree::TreeItem]; ambiguous spans expand into one packed child per pivot.
pub struct ForestView<'a> {
    grammar: &'a Grammar,
    forest: &'a BsrStore,
    input: &'a [u32],
    node: ViewNode,
    depth: usize,
}

#[derive(Clone)]
enum ViewNode {
    Symbol {
        symbol: SymbolIdx,
        left: usize,
        right: usize,
    },
    Packed {
        head: SymbolIdx,
        production: usize,
        pivot: usize,
        left: usize,
        right: usize,
    },
    Prefix {
        symbols: Vec<SymbolIdx>,
        left: usize,
        right: usize,
    },
    PackedPrefix {
        symbols: Vec<SymbolIdx>,
        pivot: usize,
        left: usize,
        right: usize,
    },
    Leaf {
        left: usize,
        right: usize,
    },
    Elided,
}

impl ParseResult {
    /// A printable view of the forest, rooted at the user start symbol over the whole input.
    pub fn forest_view<'a>(&'a self, grammar: &'a Grammar) -> ForestView<'a> {
        ForestView {
            grammar,
            forest: &self.forest,
            input: &self.input,
            node: ViewNode::Symbol {
                symbol: grammar.user_start(),
                left: 0,
                right: self.input.len().saturating_sub(1),
            },
            depth: 0,
        }
    }

    /// Pretty-print the forest to standard output.
    pub fn print_forest(&self, grammar: &Grammar) -> io::Result<()> {
        ptree::print_tree(&self.forest_view(grammar))
    }
}

impl<'a> ForestView<'a> {
    fn derived(&self, node: ViewNode) -> ForestView<'a> {
        ForestView {
            grammar: self.grammar,
            forest: self.forest,
            input: self.input,
            node,
            depth: self.depth + 1,
        }
    }

    /// A symbol over a span becomes a terminal leaf or a nonterminal subtree.
    fn symbol_child(&self, symbol: SymbolIdx, left: usize, right: usize) -> ForestView<'a> {
        if self.grammar.symbols().is_terminal(symbol) {
            self.derived(ViewNode::Leaf { left, right })
        } else {
            self.derived(ViewNode::Symbol {
                symbol,
                left,
                right,
            })
        }
    }

    /// The left-part/last-symbol split of a packed node with body `symbols` and pivot `pivot`.
    fn split_children(
        &self,
        symbols: &[SymbolIdx],
        left: usize,
        pivot: usize,
        right: usize,
    ) -> Vec<ForestView<'a>> {
        let mut children = Vec::new();
        match symbols.len() {
            0 => {}
            1 => children.push(self.symbol_child(symbols[0], left, right)),
            2 => {
                children.push(self.symbol_child(symbols[0], left, pivot));
                children.push(self.symbol_child(symbols[1], pivot, right));
            }
            n => {
                children.push(self.derived(ViewNode::Prefix {
                    symbols: symbols[..n - 1].to_vec(),
                    left,
                    right: pivot,
                }));
                children.push(self.symbol_child(symbols[n - 1], pivot, right));
            }
        }
        children
    }
}

impl<'a> ForestView<'a> {
    fn render(&self, text: &mut String) -> std::fmt::Result {
        match &self.node {
            ViewNode::Symbol {
                symbol,
                left,
                right,
            } => write!(
                text,
                "{} # {}-{}",
                self.grammar.symbols().get(*symbol),
                left,
                right
            ),
            ViewNode::Packed {
                head,
                production,
                pivot,
                ..
            } => {
                let body = self.grammar.productions().body(*head, *production);
                write!(text, "{} -> ", self.grammar.symbols().get(*head))?;
                self.grammar.write_body(text, body)?;
                write!(text, " @ {}", pivot)
            }
            ViewNode::Prefix {
                symbols,
                left,
                right,
            } => {
                write!(text, "[")?;
                self.grammar.write_body(text, symbols)?;
                write!(text, "] # {}-{}", left, right)
            }
            ViewNode::PackedPrefix { symbols, pivot, .. } => {
                write!(text, "[")?;
                self.grammar.write_body(text, symbols)?;
                write!(text, "] @ {}", pivot)
            }
            ViewNode::Leaf { left, right } => {
                let lexeme: String = self.input[*left..*right]
                    .iter()
                    .map(|&c| char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect();
                write!(text, "'{}' # {}-{}", lexeme, left, right)
            }
            ViewNode::Elided => write!(text, "…"),
        }
    }
}

impl<'a> TreeItem for ForestView<'a> {
    type Child = Self;

    fn write_self<W: io::Write>(&self, f: &mut W, _: &ptree::Style) -> io::Result<()> {
        let mut text = String::new();
        self.render(&mut text)
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "format"))?;
        f.write_all(text.as_bytes())
    }

    fn children(&self) -> Cow<[Self::Child]> {
        if matches!(self.node, ViewNode::Leaf { .. } | ViewNode::Elided) {
            return Cow::from(Vec::new());
        }
        if self.depth >= MAX_RENDER_DEPTH {
            return Cow::from(vec![self.derived(ViewNode::Elided)]);
        }
        let children = match &self.node {
            ViewNode::Symbol {
                symbol,
                left,
                right,
            } => {
                let mut packed = Vec::new();
                for (production, _) in self
                    .grammar
                    .productions()
                    .bodies(*symbol)
                    .iter()
                    .enumerate()
                {
                    let head = BsrHead::Complete {
                        head: *symbol,
                        production,
                    };
                    if let Some(pivots) = self.forest.pivots(&head, *left, *right) {
                        for &pivot in pivots {
                            packed.push(self.derived(ViewNode::Packed {
                                head: *symbol,
                                production,
                                pivot,
                                left: *left,
                                right: *right,
                            }));
                        }
                    }
                }
                packed
            }
            ViewNode::Packed {
                head,
                production,
                pivot,
                left,
                right,
            } => {
                let body = self.grammar.productions().body(*head, *production);
                self.split_children(body, *left, *pivot, *right)
            }
            ViewNode::Prefix {
                symbols,
                left,
                right,
            } => {
                let head = BsrHead::Prefix {
                    symbols: symbols.clone(),
                };
                match self.forest.pivots(&head, *left, *right) {
                    Some(pivots) => pivots
                        .iter()
                        .map(|&pivot| {
                            self.derived(ViewNode::PackedPrefix {
                                symbols: symbols.clone(),
                                pivot,
                                left: *left,
                                right: *right,
                            })
                        })
                        .collect(),
                    None => Vec::new(),
                }
            }
            ViewNode::PackedPrefix {
                symbols,
                pivot,
                left,
                right,
            } => self.split_children(symbols, *left, *pivot, *right),
            ViewNode::Leaf { .. } | ViewNode::Elided => Vec::new(),
        };
        Cow::from(children)
    }
}

//! Symbol interning, the production store and the built [Grammar].
//!
//! Two terminals with equal charsets share one index, two nonterminals with equal names share
//! one index, and the mapping is stable for the lifetime of the session. The augmented start
//! nonterminal and the endmarker terminal are interned before anything else so their indices
//! are known constants.

mod builder;
mod first_follow;


use crate::charset::Charset;
use crate::fset::FSet;
use crate::parser::Slot;
use crate::{Grammar, Log, SymbolIdx};
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Write};

pub(crate) use first_follow::{compute_symbol_firsts, compute_symbol_follows, first_of_string};

/// The name reserved for the synthetic start nonterminal of the augmented grammar. The `$` makes
/// a clash with user rule names impossible (meta identifiers cannot contain it).
pub const AUGMENTED_START_NAME: &str = "$start";

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
/// A grammar symbol: a terminal wrapping a [Charset] or a nonterminal wrapping a unique name.
pub enum Symbol {
    Terminal(Charset),
    Nonterminal(String),
}

/// A table interning [Symbol]s to monotonically increasing [SymbolIdx] values.
#[derive(Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    index: HashMap<Symbol, SymbolIdx>,
}

#[derive(Default, Debug)]
/// The association from each head index to its ordered, deduplicated set of alternative bodies.
pub struct ProductionStore {
    heads: Vec<SymbolIdx>,
    bodies: HashMap<SymbolIdx, Vec<Vec<SymbolIdx>>>,
}

impl SymbolTable {
    /// The augmented start nonterminal, always interned first.
    pub const START: SymbolIdx = SymbolIdx(0);
    /// The endmarker terminal (`{$}` charset), always interned second.
    pub const ENDMARKER_SYMBOL: SymbolIdx = SymbolIdx(1);

    pub(crate) fn new() -> Self {
        let mut table = Self {
            symbols: Vec::new(),
            index: HashMap::new(),
        };
        table.intern(Symbol::Nonterminal(AUGMENTED_START_NAME.to_string()));
        table.intern(Symbol::Terminal(Charset::endmarker_set().clone()));
        table
    }

    /// Intern by equality: an already known symbol returns its existing index.
    pub(crate) fn intern(&mut self, symbol: Symbol) -> SymbolIdx {
        if let Some(&idx) = self.index.get(&symbol) {
            return idx;
        }
        let idx = SymbolIdx(self.symbols.len());
        self.symbols.push(symbol.clone());
        self.index.insert(symbol, idx);
        idx
    }

    pub fn get(&self, idx: SymbolIdx) -> &Symbol {
        &self.symbols[idx.0]
    }

    pub fn is_terminal(&self, idx: SymbolIdx) -> bool {
        matches!(self.symbols[idx.0], Symbol::Terminal(_))
    }

    pub fn terminal_charset(&self, idx: SymbolIdx) -> Option<&Charset> {
        match &self.symbols[idx.0] {
            Symbol::Terminal(cs) => Some(cs),
            Symbol::Nonterminal(_) => None,
        }
    }

    pub fn lookup(&self, symbol: &Symbol) -> Option<SymbolIdx> {
        self.index.get(symbol).copied()
    }

    pub fn nonterminal_index(&self, name: &str) -> Option<SymbolIdx> {
        self.index
            .get(&Symbol::Nonterminal(name.to_string()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolIdx, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolIdx(i), s))
    }
}

impl ProductionStore {
    /// Append a body for `head`, deduplicating identical bodies. Returns the body's index.
    pub(crate) fn add_body(&mut self, head: SymbolIdx, body: Vec<SymbolIdx>) -> usize {
        self.add_head(head);
        let bodies = self.bodies.entry(head).or_default();
        match bodies.iter().position(|b| *b == body) {
            Some(i) => i,
            None => {
                bodies.push(body);
                bodies.len() - 1
            }
        }
    }

    /// Register a head with no bodies yet, preserving insertion order.
    pub(crate) fn add_head(&mut self, head: SymbolIdx) {
        if !self.bodies.contains_key(&head) {
            self.heads.push(head);
            self.bodies.insert(head, Vec::new());
        }
    }

    /// Heads in insertion order.
    pub fn heads(&self) -> &[SymbolIdx] {
        &self.heads
    }

    /// All alternative bodies of `head`, in insertion order; empty if `head` has none.
    pub fn bodies(&self, head: SymbolIdx) -> &[Vec<SymbolIdx>] {
        self.bodies.get(&head).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The ordered symbol sequence of one body.
    pub fn body(&self, head: SymbolIdx, production: usize) -> &[SymbolIdx] {
        &self.bodies(head)[production]
    }

    /// Iterate every `(head, production index, body)` triple in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolIdx, usize, &[SymbolIdx])> {
        self.heads.iter().flat_map(move |&head| {
            self.bodies(head)
                .iter()
                .enumerate()
                .map(move |(i, b)| (head, i, b.as_slice()))
        })
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Terminal(cs) => write!(f, "{}", cs),
            Symbol::Nonterminal(name) => write!(f, "{}", name),
        }
    }
}

impl Grammar {
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn productions(&self) -> &ProductionStore {
        &self.productions
    }

    /// The synthetic start symbol of the augmented grammar.
    pub fn start(&self) -> SymbolIdx {
        self.start
    }

    /// The user-designated start symbol.
    pub fn user_start(&self) -> SymbolIdx {
        self.user_start
    }

    /// The FIRST set of a symbol.
    pub fn first_of(&self, idx: SymbolIdx) -> &FSet {
        &self.firsts[idx.0]
    }

    /// The FOLLOW set of a symbol.
    pub fn follow_of(&self, idx: SymbolIdx) -> &FSet {
        &self.follows[idx.0]
    }

    /// The grammar slots used as labels by the CNP driver.
    pub fn labels(&self) -> &[Slot] {
        &self.labels
    }

    /// The slot at a position of the label vector.
    pub fn slot(&self, idx: crate::SlotIdx) -> Slot {
        self.labels[idx.0]
    }

    /// The label-vector position of a slot, if the slot is a label.
    pub fn slot_index(&self, slot: Slot) -> Option<crate::SlotIdx> {
        self.labels
            .iter()
            .position(|&s| s == slot)
            .map(crate::SlotIdx)
    }

    /// The FIRST set of a string of symbols, with an optional lookahead terminal appended.
    pub fn first_of_string(&self, string: &[SymbolIdx], lookahead: Option<SymbolIdx>) -> FSet {
        first_of_string(&self.firsts, string, lookahead)
    }

    /// The selectable-start test of the CNP: `c ∈ FIRST(σ)`, or σ is nullable and
    /// `c ∈ FOLLOW(head)`.
    pub fn test_select(&self, c: u32, head: SymbolIdx, sigma: &[SymbolIdx]) -> bool {
        match self.suffix_firsts.get(sigma) {
            Some(first) => {
                first.contains(c)
                    || (first.special() && self.follows[head.0].follow_contains(c))
            }
            None => {
                // every suffix of a production body is precomputed; this path only serves
                // ad-hoc symbol strings supplied by a caller
                let first = first_of_string(&self.firsts, sigma, None);
                first.contains(c)
                    || (first.special() && self.follows[head.0].follow_contains(c))
            }
        }
    }

    /// Assign a debug log label consulted by the parse driver in debug builds.
    pub fn set_log(&self, log_label: Log<&'static str>) -> Result<(), String> {
        self.debugger
            .set(log_label)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    pub(crate) fn log_label(&self) -> Log<&'static str> {
        self.debugger.get().copied().unwrap_or(Log::None)
    }

    /// Write one production body, `ϵ` when empty.
    pub fn write_body(&self, w: &mut dyn Write, body: &[SymbolIdx]) -> std::fmt::Result {
        if body.is_empty() {
            return write!(w, "ϵ");
        }
        for (i, &sym) in body.iter().enumerate() {
            if i != 0 {
                write!(w, " ")?;
            }
            write!(w, "{}", self.symbols.get(sym))?;
        }
        Ok(())
    }

    /// Write every production of the grammar, one `head -> body` line each.
    pub fn write_productions(&self, w: &mut dyn Write) -> std::fmt::Result {
        for (head, _, body) in self.productions.iter() {
            write!(w, "{} -> ", self.symbols.get(head))?;
            self.write_body(w, body)?;
            writeln!(w)?;
        }
        Ok(())
    }

    /// Write the FIRST set of every symbol.
    pub fn write_firsts(&self, w: &mut dyn Write) -> std::fmt::Result {
        for (idx, symbol) in self.symbols.iter() {
            writeln!(w, "{} -> {}", symbol, self.firsts[idx.0].first_display())?;
        }
        Ok(())
    }

    /// Write the FOLLOW set of every symbol.
    pub fn write_follows(&self, w: &mut dyn Write) -> std::fmt::Result {
        for (idx, symbol) in self.symbols.iter() {
            writeln!(w, "{} -> {}", symbol, self.follows[idx.0].follow_display())?;
        }
        Ok(())
    }

    /// Write a dotted production (grammar slot).
    pub fn write_slot(&self, w: &mut dyn Write, slot: Slot) -> std::fmt::Result {
        let body = self.productions.body(slot.head, slot.production);
        write!(w, "{} -> ", self.symbols.get(slot.head))?;
        if body.is_empty() {
            write!(w, "•ϵ")?;
            return Ok(());
        }
        for (i, &sym) in body.iter().enumerate() {
            if i == slot.dot {
                write!(w, "•")?;
            } else if i != 0 {
                write!(w, " ")?;
            }
            write!(w, "{}", self.symbols.get(sym))?;
        }
        if slot.dot == body.len() {
            write!(w, "•")?;
        }
        Ok(())
    }

    /// Write the CNP label vector.
    pub fn write_labels(&self, w: &mut dyn Write) -> std::fmt::Result {
        for &slot in &self.labels {
            self.write_slot(w, slot)?;
            writeln!(w)?;
        }
        Ok(())
    }
}

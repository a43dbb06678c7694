//! Language compiler-compiler (lang_cc) is a library to build generalized parsers for arbitrary
//! context free grammars (CFG) over Unicode input.
//!
//! # Overview
//! Deterministic parser generators reject most grammars as ambiguous before a parser is ever
//! produced. This library instead accepts every context free grammar, including left-recursive,
//! right-recursive, cyclic and ambiguous ones, and makes the ambiguity a first class parse
//! artifact. From one interned grammar it derives two parsing back-ends which share the symbol
//! table, the production store and the first/follow machinery:
//!
//! - A **SRNGLR table generator**: a canonical LR(1) itemset construction whose table cells hold
//!   *sets* of actions ([Push](Action::Push), [Reduce](Action::Reduce), [Accept](Action::Accept)),
//!   so shift/reduce and reduce/reduce conflicts are preserved for a generalized LR driver rather
//!   than rejected.
//! - A **Clustered Nonterminal Parser (CNP)**: a GLL-family parser driven by grammar slots which
//!   records every derivation of the input in a Binary Subtree Representation
//!   ([BsrStore]) and tracks the call structure in a Call Return Forest ([Crf]).
//!
//! # Design
//!
//! Every terminal of the grammar is a [Charset]: a canonical sequence of inclusive Unicode code
//! point ranges with full set algebra. Symbols are interned to integer indices by a
//! [SymbolTable], production bodies are sequences of those indices, and the grammar is augmented
//! with a synthetic start rule before first/follow sets are computed by fixed-point iteration.
//! All of that state is immutable once [GrammarBuilder::build] returns; a parse owns its own
//! scratch state (descriptor queue, CRF, BSR store) and therefore cannot disturb the grammar or
//! another parse.
//!
//! An unparseable input is **not** an error: [ParseResult::accepted] reports rejection and the
//! BSR store stays empty. Errors only exist at grammar build time, as [GrammarError].
//!
//! # Example
//!
//! ```
//! use lang_cc::{Charset, GrammarBuilder, SymbolRef};
//!
//! // S = 'a' S 'b' | ϵ
//! let grammar = GrammarBuilder::new()
//!     .rule(
//!         "S",
//!         vec![
//!             vec![
//!                 SymbolRef::terminal(Charset::of_char('a' as u32)),
//!                 SymbolRef::nonterminal("S"),
//!                 SymbolRef::terminal(Charset::of_char('b' as u32)),
//!             ],
//!             vec![], // ϵ
//!         ],
//!     )
//!     .start("S")
//!     .build()
//!     .unwrap();
//!
//! let table = grammar.build_srnglr_table();
//! assert!(table.states().len() > 0);
//!
//! let result = grammar.parse_cnp_str("aabb");
//! assert!(result.accepted());
//! assert_eq!(result.ambiguity(), 1);
//!
//! // Rejection is an ordinary outcome, not an error.
//! assert!(!grammar.parse_cnp_str("abab").accepted());
//! ```
//!
//! The same grammar can be written in the rule meta-syntax and read with the [meta] module:
//!
//! ```
//! let grammar = lang_cc::meta::grammar_from_source("S = 'a' S 'b' | ;").unwrap();
//! assert!(grammar.parse_cnp_str("ab").accepted());
//! ```
//!
//! # License
//! [lang_cc](crate) is provided under the MIT license.

pub mod charset;
mod error;
pub mod examples;
mod fset;
mod grammar;
pub mod meta;
mod parser;
mod srnglr;
mod util;

use once_cell::unsync::OnceCell;
use std::collections::HashMap;

pub use charset::{Charset, URange, ENDMARKER, UNICODE_MAX};
pub use fset::{FSet, FSetDisplay};
pub use grammar::{ProductionStore, Symbol, SymbolTable};
pub use parser::{
    BsrHead, BsrKey, BsrStore, ClusterIdx, ClusterNode, Crf, Descriptor, ForestView, LabelIdx,
    LabelNode, Slot,
};
pub use srnglr::{Action, Item, SrnglrTable};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// A wrapper to indicate the index of an interned [Symbol] in the [SymbolTable].
pub struct SymbolIdx(usize);

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// A wrapper to indicate the index of an interned itemset (a parse table state).
pub struct StateIdx(usize);

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// A wrapper to indicate the index of a grammar slot in the label vector.
pub struct SlotIdx(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
/// A reference to a grammar symbol as written in a production body, before interning.
///
/// This is the shape the [meta] rule reader produces: a nonterminal is referenced by name and a
/// terminal is a self-contained [Charset].
pub enum SymbolRef {
    Nonterminal(String),
    Terminal(Charset),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An error raised while building a [Grammar]. Build errors are fatal to the session; the parse
/// phase itself cannot fail, it can only reject the input.
pub enum GrammarError {
    /// A code point range with `start > stop`.
    InvalidRange { start: u32, stop: u32 },
    /// The builder was given no rules at all.
    EmptyGrammar,
    /// The designated start symbol has no production.
    MissingStart { name: String },
    /// A nonterminal is referenced in a body but never defined by a rule.
    UndefinedSymbol { name: String },
    /// The meta-grammar source text is ill-formed.
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
}

#[derive(Default)]
/// A builder collecting named rules before interning them into a [Grammar].
///
/// Rules are kept in insertion order. The start symbol defaults to the head of the first rule and
/// can be overridden with [start](GrammarBuilder::start).
pub struct GrammarBuilder {
    rules: Vec<(String, Vec<Vec<SymbolRef>>)>,
    start: Option<String>,
}

/// A fully built grammar: interned symbols, production store, first/follow sets, the memoized
/// FIRST sets of every production body suffix, and the CNP slot labels.
///
/// All fields are read-only after [GrammarBuilder::build]; parsing borrows the grammar shared and
/// keeps its own mutable state in a parser context.
#[derive(Debug)]
pub struct Grammar {
    symbols: SymbolTable,
    productions: ProductionStore,
    start: SymbolIdx,
    user_start: SymbolIdx,
    firsts: Vec<FSet>,
    follows: Vec<FSet>,
    suffix_firsts: HashMap<Vec<SymbolIdx>, FSet>,
    labels: Vec<Slot>,
    debugger: OnceCell<Log<&'static str>>,
}

/// The outcome of a CNP parse: acceptance, the ambiguity degree at the root, and the parse
/// artifacts (BSR store and CRF) for inspection and printing.
///
/// A rejected input yields `accepted() == false`; nothing about rejection is an error.
pub struct ParseResult {
    accepted: bool,
    ambiguity: usize,
    forest: BsrStore,
    crf: Crf,
    input: Vec<u32>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// A enum structure to assign multiple level debugging to the grammar and the parse driver.
pub enum Log<T> {
    None,
    Default(T),
    Success(T),
    Result(T),
    Verbose(T),
}

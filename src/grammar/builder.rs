//! Interning of named rules into a read-only [Grammar].
//!
//! The builder performs the whole grammar-build phase: symbol interning, augmentation with the
//! synthetic start rule, validation of symbol references, the first/follow fixed points, the
//! precomputation of every body-suffix FIRST set and the CNP label vector. Any failure here is
//! fatal to the session; once `build` succeeds nothing can fail at parse time.

use super::{compute_symbol_firsts, compute_symbol_follows, first_of_string};
use crate::charset::Charset;
use crate::fset::FSet;
use crate::grammar::{ProductionStore, Symbol, SymbolTable};
use crate::parser::Slot;
use crate::{Grammar, GrammarBuilder, GrammarError, SymbolIdx, SymbolRef};
use once_cell::unsync::OnceCell;
use std::collections::HashMap;

impl SymbolRef {
    /// A terminal reference carrying its charset.
    pub fn terminal(cs: Charset) -> Self {
        SymbolRef::Terminal(cs)
    }

    /// A terminal reference matching a single code point.
    pub fn char(c: u32) -> Self {
        SymbolRef::Terminal(Charset::of_char(c))
    }

    /// A nonterminal reference by rule name.
    pub fn nonterminal(name: &str) -> Self {
        SymbolRef::Nonterminal(name.to_string())
    }
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule; alternative bodies for an already known head are appended to it.
    pub fn rule(mut self, head: &str, bodies: Vec<Vec<SymbolRef>>) -> Self {
        match self.rules.iter_mut().find(|(h, _)| h == head) {
            Some(entry) => entry.1.extend(bodies),
            None => self.rules.push((head.to_string(), bodies)),
        }
        self
    }

    /// Designate the start symbol; defaults to the head of the first rule.
    pub fn start(mut self, name: &str) -> Self {
        self.start = Some(name.to_string());
        self
    }

    /// Intern the collected rules into a [Grammar].
    pub fn build(self) -> Result<Grammar, GrammarError> {
        if self.rules.is_empty() {
            return Err(GrammarError::EmptyGrammar);
        }
        let start_name = match &self.start {
            Some(name) => name.clone(),
            None => self.rules[0].0.clone(),
        };

        let mut symbols = SymbolTable::new();
        let mut productions = ProductionStore::default();

        // intern every rule head first so nonterminal references resolve in any order
        let mut user_start = None;
        let mut head_indices = Vec::with_capacity(self.rules.len());
        for (head, _) in &self.rules {
            let idx = symbols.intern(Symbol::Nonterminal(head.clone()));
            if *head == start_name {
                user_start = Some(idx);
            }
            head_indices.push(idx);
        }
        let user_start = match user_start {
            Some(idx) => idx,
            None => return Err(GrammarError::MissingStart { name: start_name }),
        };

        // the augmented start rule comes first in the production store
        productions.add_body(SymbolTable::START, vec![user_start]);

        for ((_, bodies), &head_idx) in self.rules.iter().zip(&head_indices) {
            productions.add_head(head_idx);
            for body in bodies {
                let mut interned = Vec::with_capacity(body.len());
                for symbol_ref in body {
                    match symbol_ref {
                        SymbolRef::Terminal(cs) => {
                            interned.push(symbols.intern(Symbol::Terminal(cs.clone())));
                        }
                        SymbolRef::Nonterminal(name) => match symbols.nonterminal_index(name) {
                            Some(idx) => interned.push(idx),
                            None => {
                                return Err(GrammarError::UndefinedSymbol { name: name.clone() })
                            }
                        },
                    }
                }
                productions.add_body(head_idx, interned);
            }
        }

        // a head without a single body cannot derive anything
        for &head_idx in &head_indices {
            if productions.bodies(head_idx).is_empty() {
                if let Symbol::Nonterminal(name) = symbols.get(head_idx) {
                    return Err(GrammarError::UndefinedSymbol { name: name.clone() });
                }
            }
        }

        let firsts = compute_symbol_firsts(&symbols, &productions);
        let follows =
            compute_symbol_follows(&symbols, &productions, &firsts, SymbolTable::START);
        let suffix_firsts = precompute_suffix_firsts(&productions, &firsts);
        let labels = generate_labels(&symbols, &productions);

        Ok(Grammar {
            symbols,
            productions,
            start: SymbolTable::START,
            user_start,
            firsts,
            follows,
            suffix_firsts,
            labels,
            debugger: OnceCell::new(),
        })
    }
}

/// The CNP only ever asks for the FIRST set of a suffix of a production body, so all of them
/// are computed up front; the grammar stays read-only for the whole parse phase.
fn precompute_suffix_firsts(
    productions: &ProductionStore,
    firsts: &[FSet],
) -> HashMap<Vec<SymbolIdx>, FSet> {
    let mut memo = HashMap::new();
    for (_, _, body) in productions.iter() {
        for dot in 0..=body.len() {
            let suffix = &body[dot..];
            if !memo.contains_key(suffix) {
                memo.insert(suffix.to_vec(), first_of_string(firsts, suffix, None));
            }
        }
    }
    memo
}

/// Generate the slot labels of the grammar: for every production the dot-0 slot, every slot
/// whose preceding symbol is a nonterminal, and the end-of-body slot.
fn generate_labels(symbols: &SymbolTable, productions: &ProductionStore) -> Vec<Slot> {
    let mut labels = Vec::new();
    for (head, production, body) in productions.iter() {
        labels.push(Slot {
            head,
            production,
            dot: 0,
        });
        for dot in 1..=body.len() {
            if !symbols.is_terminal(body[dot - 1]) {
                labels.push(Slot {
                    head,
                    production,
                    dot,
                });
            }
        }
        // the accept point, unless the loop above already produced it
        if let Some(&last) = body.last() {
            if symbols.is_terminal(last) {
                labels.push(Slot {
                    head,
                    production,
                    dot: body.len(),
                });
            }
        }
    }
    labels
}

//! Fixed-point computation of FIRST and FOLLOW sets over the production store.
//!
//! Both computations iterate until the total size measure (code point count plus special flag,
//! summed over every set) stops growing; union only ever grows a set, so the measure is monotone
//! and the iteration terminates.

use crate::fset::FSet;
use crate::grammar::{ProductionStore, Symbol, SymbolTable};
use crate::SymbolIdx;

/// Total number of elements across all first/follow sets.
fn fsets_size(fsets: &[FSet]) -> u64 {
    fsets.iter().map(FSet::size).sum()
}

/// The FIRST set of a string of symbols, with an optional lookahead terminal treated as
/// appended at the end of the string.
///
/// Walks the string left to right, merging each symbol's FIRST set without its nullability,
/// and stops at the first non-nullable symbol. A fully nullable string yields the lookahead's
/// FIRST set when one is given, and the ϵ flag otherwise.
pub(crate) fn first_of_string(
    firsts: &[FSet],
    string: &[SymbolIdx],
    lookahead: Option<SymbolIdx>,
) -> FSet {
    let mut result = FSet::new();
    let mut all_nullable = true;
    for &sym in string {
        let first_i = &firsts[sym.0];
        result.union_into(first_i, false);
        if !first_i.special() {
            all_nullable = false;
            break;
        }
    }
    if all_nullable {
        match lookahead {
            Some(la) => {
                let first_la = &firsts[la.0];
                result.union_into(first_la, false);
                if first_la.special() {
                    result.set_special(true);
                }
            }
            None => result.set_special(true),
        }
    }
    result
}

/// Compute the FIRST set of every symbol in the grammar.
pub(crate) fn compute_symbol_firsts(
    symbols: &SymbolTable,
    productions: &ProductionStore,
) -> Vec<FSet> {
    let mut firsts = vec![FSet::new(); symbols.len()];

    // the first set of a terminal is the terminal itself
    for (idx, symbol) in symbols.iter() {
        if let Symbol::Terminal(cs) = symbol {
            firsts[idx.0].add_set(cs);
        }
    }

    // update each nonterminal's set until no new changes occur
    loop {
        let count = fsets_size(&firsts);

        for (idx, symbol) in symbols.iter() {
            if matches!(symbol, Symbol::Terminal(_)) {
                continue;
            }
            for body in productions.bodies(idx) {
                // merge each body symbol's first set into this one, stop at non-nullable
                let mut all_nullable = true;
                for &body_sym in body {
                    let body_first = firsts[body_sym.0].clone();
                    firsts[idx.0].union_into(&body_first, false);
                    if !body_first.special() {
                        all_nullable = false;
                        break;
                    }
                }
                // an all-nullable body (ϵ included) makes the head nullable
                if all_nullable {
                    firsts[idx.0].set_special(true);
                }
            }
        }

        if fsets_size(&firsts) == count {
            break;
        }
    }

    firsts
}

/// Compute the FOLLOW set of every symbol in the grammar.
///
/// `$` is seeded on the augmented start symbol; the user start receives it through the
/// synthetic `$start -> S` production on the first pass.
pub(crate) fn compute_symbol_follows(
    symbols: &SymbolTable,
    productions: &ProductionStore,
    firsts: &[FSet],
    start: SymbolIdx,
) -> Vec<FSet> {
    let mut follows = vec![FSet::new(); symbols.len()];
    follows[start.0].set_special(true);

    loop {
        let count = fsets_size(&follows);

        for (head, _, body) in productions.iter() {
            for i in 0..body.len() {
                let sym = body[i];
                // everything in FIRST(β) except ϵ goes into FOLLOW(sym)
                let beta_first = first_of_string(firsts, &body[i + 1..], None);
                let nullable = beta_first.special();
                follows[sym.0].union_into(&beta_first, false);

                // a nullable β exposes the head's follow set
                if nullable {
                    let head_follow = follows[head.0].clone();
                    follows[sym.0].union_into(&head_follow, true);
                }
            }
        }

        if fsets_size(&follows) == count {
            break;
        }
    }

    follows
}

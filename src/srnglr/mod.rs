//! SRNGLR table generation: canonical LR(1) itemsets with multi-action table cells.
//!
//! The construction is the Dragon-book closure/goto fixed point, except that nothing is ever
//! rejected: a cell holds a *set* of actions, so shift/reduce and reduce/reduce conflicts of a
//! general CFG survive into the table for a generalized LR driver to explore.


use crate::fset::FSet;
use crate::grammar::{Symbol, SymbolTable};
use crate::{Grammar, StateIdx, SymbolIdx};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// An LR(1) item `[A -> α•β, a]`: a dotted production with a single terminal lookahead.
///
/// The lookahead is a terminal symbol index; the endmarker terminal stands for `$`. The item is
/// accepting when the position has reached the end of the body.
pub struct Item {
    pub head: SymbolIdx,
    pub production: usize,
    pub position: usize,
    pub lookahead: SymbolIdx,
}

/// A closed set of LR(1) items; corresponds to one state of the automaton. The ordered
/// representation is the canonical form that interning and hashing rely on.
pub type Itemset = BTreeSet<Item>;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// One action of a table cell. A single cell may hold any combination of these.
pub enum Action {
    /// Shift/goto the indicated state.
    Push(StateIdx),
    /// Reduce a production of the named head, consuming `length` symbols.
    Reduce(SymbolIdx, usize),
    Accept,
}

/// The generated parse table: interned itemsets (states) and the goto/action cells.
pub struct SrnglrTable {
    states: Vec<Itemset>,
    cells: HashMap<(StateIdx, SymbolIdx), BTreeSet<Action>>,
}

/// Build-time state: the growing state list plus the memoized FIRST-of-string results keyed by
/// the dereferenced symbol sequence and the appended lookahead.
struct TableBuilder<'g> {
    grammar: &'g Grammar,
    states: Vec<Itemset>,
    index: HashMap<Itemset, StateIdx>,
    cells: HashMap<(StateIdx, SymbolIdx), BTreeSet<Action>>,
    memo: HashMap<SliceKey, FSet>,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct SliceKey {
    symbols: Vec<SymbolIdx>,
    lookahead: SymbolIdx,
}

impl Item {
    pub fn is_accepting(&self, grammar: &Grammar) -> bool {
        self.position == grammar.productions().body(self.head, self.production).len()
    }
}

impl<'g> TableBuilder<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            states: Vec::new(),
            index: HashMap::new(),
            cells: HashMap::new(),
            memo: HashMap::new(),
        }
    }

    /// The terminal lookahead symbols of `FIRST(β a)`.
    ///
    /// A terminal qualifies when its charset overlaps the computed first set; with disjoint
    /// terminal charsets this is exact, with overlapping ones it over-approximates, which only
    /// adds conflict actions the generalized driver discards downstream.
    fn lookaheads_for(&mut self, beta: &[SymbolIdx], lookahead: SymbolIdx) -> Vec<SymbolIdx> {
        let key = SliceKey {
            symbols: beta.to_vec(),
            lookahead,
        };
        if !self.memo.contains_key(&key) {
            let first = self.grammar.first_of_string(beta, Some(lookahead));
            self.memo.insert(key.clone(), first);
        }
        let first = &self.memo[&key];
        self.grammar
            .symbols()
            .iter()
            .filter_map(|(idx, symbol)| match symbol {
                Symbol::Terminal(cs) if first.terminals().intersects(cs) => Some(idx),
                _ => None,
            })
            .collect()
    }

    /// CLOSURE: repeatedly expand every item whose next symbol is a nonterminal, re-scanning
    /// the growing item list until a full pass adds nothing.
    fn closure(&mut self, kernel: Vec<Item>) -> Itemset {
        let grammar = self.grammar;
        let mut seen: HashSet<Item> = HashSet::new();
        let mut items: Vec<Item> = Vec::with_capacity(kernel.len());
        for item in kernel {
            if seen.insert(item) {
                items.push(item);
            }
        }

        loop {
            let before = items.len();
            let mut i = 0;
            while i < items.len() {
                let item = items[i];
                i += 1;

                let body = grammar.productions().body(item.head, item.production);
                if item.position >= body.len() {
                    continue;
                }
                let next = body[item.position];
                if grammar.symbols().is_terminal(next) {
                    continue;
                }

                let lookaheads = self.lookaheads_for(&body[item.position + 1..], item.lookahead);
                for production in 0..grammar.productions().bodies(next).len() {
                    for &b in &lookaheads {
                        let new_item = Item {
                            head: next,
                            production,
                            position: 0,
                            lookahead: b,
                        };
                        if seen.insert(new_item) {
                            items.push(new_item);
                        }
                    }
                }
            }
            if items.len() == before {
                break;
            }
        }

        items.into_iter().collect()
    }

    /// GOTO: advance the dot over `x` in every item that allows it, then close the result.
    /// An empty goto stays empty and never becomes a state.
    fn goto(&mut self, state: StateIdx, x: SymbolIdx) -> Itemset {
        let grammar = self.grammar;
        let kernel: Vec<Item> = self.states[state.0]
            .iter()
            .filter_map(|item| {
                let body = grammar.productions().body(item.head, item.production);
                if item.position >= body.len() || body[item.position] != x {
                    return None;
                }
                Some(Item {
                    position: item.position + 1,
                    ..*item
                })
            })
            .collect();
        if kernel.is_empty() {
            return Itemset::new();
        }
        self.closure(kernel)
    }

    fn intern(&mut self, itemset: Itemset) -> StateIdx {
        if let Some(&idx) = self.index.get(&itemset) {
            return idx;
        }
        let idx = StateIdx(self.states.len());
        self.states.push(itemset.clone());
        self.index.insert(itemset, idx);
        idx
    }

    fn insert_action(&mut self, state: StateIdx, symbol: SymbolIdx, action: Action) {
        self.cells.entry((state, symbol)).or_default().insert(action);
    }

    /// Generate all states and actions for the grammar.
    fn generate(&mut self) {
        let start_item = Item {
            head: SymbolTable::START,
            production: 0,
            position: 0,
            lookahead: SymbolTable::ENDMARKER_SYMBOL,
        };
        let start_state = self.closure(vec![start_item]);
        self.intern(start_state);

        // grow the state set until a full pass adds nothing
        loop {
            let before = self.states.len();
            let mut state = 0;
            while state < self.states.len() {
                for symbol in 0..self.grammar.symbols().len() {
                    let symbol = SymbolIdx(symbol);
                    let gotoset = self.goto(StateIdx(state), symbol);
                    if gotoset.is_empty() {
                        continue;
                    }
                    let goto_idx = self.intern(gotoset);
                    self.insert_action(StateIdx(state), symbol, Action::Push(goto_idx));
                }
                state += 1;
            }
            if self.states.len() == before {
                break;
            }
        }

        // reduction and accept actions for every accepting item
        for state in 0..self.states.len() {
            let items: Vec<Item> = self.states[state].iter().copied().collect();
            for item in items {
                if !item.is_accepting(self.grammar) {
                    continue;
                }
                if item.head == SymbolTable::START {
                    self.insert_action(StateIdx(state), item.lookahead, Action::Accept);
                } else {
                    self.insert_action(
                        StateIdx(state),
                        item.lookahead,
                        Action::Reduce(item.head, item.position),
                    );
                }
            }
        }
    }
}

impl Grammar {
    /// Run the full LR(1) itemset construction and return the generated table.
    pub fn build_srnglr_table(&self) -> SrnglrTable {
        let mut builder = TableBuilder::new(self);
        builder.generate();
        SrnglrTable {
            states: builder.states,
            cells: builder.cells,
        }
    }
}

impl SrnglrTable {
    pub fn states(&self) -> &[Itemset] {
        &self.states
    }

    pub fn state(&self, idx: StateIdx) -> &Itemset {
        &self.states[idx.0]
    }

    /// The action set at a goto key, if the cell is populated.
    pub fn actions(&self, state: StateIdx, symbol: SymbolIdx) -> Option<&BTreeSet<Action>> {
        self.cells.get(&(state, symbol))
    }

    /// Iterate every populated cell.
    pub fn cells(&self) -> impl Iterator<Item = (StateIdx, SymbolIdx, &BTreeSet<Action>)> {
        self.cells.iter().map(|(&(s, x), a)| (s, x, a))
    }

    /// Write one action in its compact table form.
    pub fn write_action(
        &self,
        grammar: &Grammar,
        w: &mut dyn Write,
        action: Action,
    ) -> std::fmt::Result {
        match action {
            Action::Push(state) => write!(w, "P{}", state.0),
            Action::Reduce(head, length) => {
                write!(w, "R({}, {})", grammar.symbols().get(head), length)
            }
            Action::Accept => write!(w, "ACCEPT"),
        }
    }

    /// Write every itemset, one state per block.
    pub fn write_itemsets(&self, grammar: &Grammar, w: &mut dyn Write) -> std::fmt::Result {
        for (i, itemset) in self.states.iter().enumerate() {
            writeln!(w, "I{}:", i)?;
            for item in itemset {
                write!(w, "  [")?;
                grammar.write_slot(
                    w,
                    crate::parser::Slot {
                        head: item.head,
                        production: item.production,
                        dot: item.position,
                    },
                )?;
                writeln!(w, ", {}]", grammar.symbols().get(item.lookahead))?;
            }
            writeln!(w)?;
        }
        Ok(())
    }

    /// Write the populated cells of the table, grouped by state and ordered by symbol.
    pub fn write_table(&self, grammar: &Grammar, w: &mut dyn Write) -> std::fmt::Result {
        for state in 0..self.states.len() {
            let mut row: Vec<(SymbolIdx, &BTreeSet<Action>)> = self
                .cells
                .iter()
                .filter(|((s, _), _)| s.0 == state)
                .map(|(&(_, x), actions)| (x, actions))
                .collect();
            if row.is_empty() {
                continue;
            }
            row.sort_by_key(|(x, _)| *x);

            writeln!(w, "state {}:", state)?;
            for (symbol, actions) in row {
                write!(w, "  {} : ", grammar.symbols().get(symbol))?;
                for (i, &action) in actions.iter().enumerate() {
                    if i != 0 {
                        write!(w, ", ")?;
                    }
                    self.write_action(grammar, w, action)?;
                }
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

//! The Clustered Nonterminal Parser (CNP).
//!
//! A label-driven loop over grammar slots. Pending work lives in the descriptor queue `R`
//! (insertion ordered, deduplicated by `U`), calls and returns are recorded in the [Crf], the
//! completed-returns memo `P` replays returns to late callers, and every recognized subtree is
//! packed into the [BsrStore]. All of this state is owned by a per-input parser context; the
//! grammar itself is only read.

mod bsr;
mod crf;

#[cfg(test)]
mod __tests__;

use crate::charset::ENDMARKER;
use crate::{Grammar, Log, ParseResult, SymbolIdx};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::Write;

pub use bsr::{BsrHead, BsrKey, BsrStore, ForestView};
pub use crf::{ClusterIdx, ClusterNode, Crf, LabelIdx, LabelNode};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// A grammar slot `(head, production, dot)`: a dotted production, used as a CNP label.
pub struct Slot {
    pub head: SymbolIdx,
    pub production: usize,
    pub dot: usize,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
/// A unit of pending work: process label `slot` for the nonterminal instance entered at input
/// position `k`, with the cursor at input position `j`.
pub struct Descriptor {
    pub slot: Slot,
    pub k: usize,
    pub j: usize,
}

/// Per-parse state; created for one input array and torn down with it.
struct ParserContext<'g> {
    grammar: &'g Grammar,
    input: Vec<u32>,
    m: usize,
    c_i: usize,
    c_u: ClusterNode,
    crf: Crf,
    p: HashMap<ClusterNode, BTreeSet<usize>>,
    y: BsrStore,
    r: VecDeque<Descriptor>,
    u: HashSet<Descriptor>,
}

impl Grammar {
    /// Parse an endmarker-terminated code point array with the CNP. A missing endmarker is
    /// appended. Rejection is an ordinary result, never an error.
    pub fn parse_cnp(&self, source: &[u32]) -> ParseResult {
        let mut context = ParserContext::new(self, source);
        context.run();
        context.into_result()
    }

    /// Parse a string, decoding it to code points and appending the endmarker.
    pub fn parse_cnp_str(&self, text: &str) -> ParseResult {
        let source: Vec<u32> = text.chars().map(|c| c as u32).collect();
        self.parse_cnp(&source)
    }
}

impl<'g> ParserContext<'g> {
    fn new(grammar: &'g Grammar, source: &[u32]) -> Self {
        let mut input = source.to_vec();
        if input.last() != Some(&ENDMARKER) {
            input.push(ENDMARKER);
        }
        let m = input.len() - 1;
        Self {
            grammar,
            input,
            m,
            c_i: 0,
            c_u: ClusterNode {
                head: grammar.start(),
                j: 0,
            },
            crf: Crf::new(),
            p: HashMap::new(),
            y: BsrStore::new(),
            r: VecDeque::new(),
            u: HashSet::new(),
        }
    }

    /// The code point under the cursor; past the end it stays the endmarker.
    fn cursor(&self) -> u32 {
        self.input.get(self.c_i).copied().unwrap_or(ENDMARKER)
    }

    /// Seed with the augmented start and drain the descriptor queue.
    fn run(&mut self) {
        #[cfg(debug_assertions)]
        let debug = self.grammar.log_label();

        let start = self.grammar.start();
        self.crf.add_cluster_node(ClusterNode { head: start, j: 0 });
        self.c_u = ClusterNode { head: start, j: 0 };
        self.nt_add(start, 0);

        while let Some(descriptor) = self.r.pop_front() {
            self.c_u = ClusterNode {
                head: descriptor.slot.head,
                j: descriptor.k,
            };
            self.crf.add_cluster_node(self.c_u);
            self.c_i = descriptor.j;

            #[cfg(debug_assertions)]
            if debug.order() >= Log::Verbose(()).order() {
                let mut slot_text = String::new();
                let _ = self.grammar.write_slot(&mut slot_text, descriptor.slot);
                println!(
                    "[{}; Descriptor]: ({}, {}, {})",
                    debug, slot_text, descriptor.k, descriptor.j
                );
            }

            self.handle_label(descriptor.slot);
        }

        #[cfg(debug_assertions)]
        if debug.order() >= Log::Default(()).order() {
            println!(
                "[{}; Parse]: {} descriptors processed, {} BSR entries",
                debug,
                self.u.len(),
                self.y.len()
            );
        }
    }

    /// Execute the actions of one label.
    fn handle_label(&mut self, slot: Slot) {
        let grammar = self.grammar;
        let body = grammar.productions().body(slot.head, slot.production);
        let mut dot = slot.dot;

        if slot.dot == 0 && body.is_empty() {
            // the ϵ subtree for this head over the empty span at the cursor
            self.y.add(grammar, slot, self.c_i, self.c_i, self.c_i);
        } else {
            // walk as many terminals as the input selects
            while dot < body.len() && grammar.symbols().is_terminal(body[dot]) {
                if dot != 0 && !grammar.test_select(self.cursor(), slot.head, &body[dot..]) {
                    return;
                }
                dot += 1;
                let advanced = Slot { dot, ..slot };
                self.y.add(grammar, advanced, self.c_u.j, self.c_i, self.c_i + 1);
                self.c_i += 1;
            }

            // a nonterminal under the dot suspends this label at its return slot
            if dot < body.len() {
                if dot != 0 && !grammar.test_select(self.cursor(), slot.head, &body[dot..]) {
                    return;
                }
                dot += 1;
                let ret = Slot { dot, ..slot };
                self.call(ret, self.c_u.j, self.c_i);
            }
        }

        let at_end = slot.dot == body.len()
            || (dot == body.len()
                && !body.is_empty()
                && grammar.symbols().is_terminal(body[dot - 1]));
        if at_end && grammar.follow_of(slot.head).follow_contains(self.cursor()) {
            self.rtn(slot.head, self.c_u.j, self.c_i);
        }
    }

    /// `ntAdd`: queue a descriptor for every alternative of `x` the input position selects.
    fn nt_add(&mut self, x: SymbolIdx, j: usize) {
        let grammar = self.grammar;
        let c = self.input.get(j).copied().unwrap_or(ENDMARKER);
        let body_count = grammar.productions().bodies(x).len();
        for production in 0..body_count {
            let body = grammar.productions().body(x, production);
            if grammar.test_select(c, x, body) {
                self.dsc_add(
                    Slot {
                        head: x,
                        production,
                        dot: 0,
                    },
                    j,
                    j,
                );
            }
        }
    }

    /// `dscAdd`: queue a descriptor unless it was ever queued before.
    fn dsc_add(&mut self, slot: Slot, k: usize, j: usize) {
        let descriptor = Descriptor { slot, k, j };
        if self.u.insert(descriptor) {
            self.r.push_back(descriptor);
        }
    }

    /// `call`: suspend at the return slot `ret` (whose dot just passed nonterminal `x`),
    /// wiring the CRF so the completion of `(x, j)` resumes every caller exactly once.
    fn call(&mut self, ret: Slot, i: usize, j: usize) {
        let grammar = self.grammar;
        let x = grammar.productions().body(ret.head, ret.production)[ret.dot - 1];
        let (u_idx, _) = self.crf.add_label_node(LabelNode { slot: ret, j: i });
        let cluster = ClusterNode { head: x, j };
        let (v_idx, v_new) = self.crf.add_cluster_node(cluster);
        if v_new {
            self.crf.add_edge(v_idx, u_idx);
            self.nt_add(x, j);
        } else if self.crf.add_edge(v_idx, u_idx) {
            // the nonterminal instance already ran: replay its recorded returns
            if let Some(returns) = self.p.get(&cluster) {
                let returns: Vec<usize> = returns.iter().copied().collect();
                for h in returns {
                    self.dsc_add(ret, i, h);
                    self.y.add(grammar, ret, i, j, h);
                }
            }
        }
    }

    /// `rtn`: record the completed return `(x, k) -> j` and resume every caller of the cluster.
    fn rtn(&mut self, x: SymbolIdx, k: usize, j: usize) {
        let cluster = ClusterNode { head: x, j: k };
        if self.p.entry(cluster).or_default().insert(j) {
            if let Some(v_idx) = self.crf.cluster_idx(&cluster) {
                let children: Vec<LabelIdx> = self.crf.children(v_idx).to_vec();
                for child in children {
                    let label = self.crf.label_node(child);
                    self.dsc_add(label.slot, label.j, j);
                    self.y.add(self.grammar, label.slot, label.j, k, j);
                }
            }
        }
    }

    /// Close the parse: acceptance and ambiguity are read off the root BSR entries.
    fn into_result(self) -> ParseResult {
        let grammar = self.grammar;
        let start = grammar.user_start();
        let mut ambiguity = 0;
        for production in 0..grammar.productions().bodies(start).len() {
            let head = BsrHead::Complete {
                head: start,
                production,
            };
            if let Some(pivots) = self.y.pivots(&head, 0, self.m) {
                ambiguity += pivots.len();
            }
        }
        ParseResult {
            accepted: ambiguity > 0,
            ambiguity,
            forest: self.y,
            crf: self.crf,
            input: self.input,
        }
    }
}

impl ParseResult {
    /// Whether some derivation of the start symbol covers the whole input.
    pub fn accepted(&self) -> bool {
        self.accepted
    }

    /// The number of packed alternatives at the forest root; 1 for an unambiguous accepted
    /// parse, 0 for a rejection.
    pub fn ambiguity(&self) -> usize {
        self.ambiguity
    }

    pub fn forest(&self) -> &BsrStore {
        &self.forest
    }

    pub fn crf(&self) -> &Crf {
        &self.crf
    }

    /// The endmarker-terminated input the parse consumed.
    pub fn input(&self) -> &[u32] {
        &self.input
    }

    /// Write the BSR store.
    pub fn write_bsr(&self, grammar: &Grammar, w: &mut dyn Write) -> std::fmt::Result {
        self.forest.write(grammar, w)
    }

    /// Write the call return forest.
    pub fn write_crf(&self, grammar: &Grammar, w: &mut dyn Write) -> std::fmt::Result {
        self.crf.write(grammar, w)
    }
}

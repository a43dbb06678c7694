use crate::charset::{Charset, ENDMARKER, URange};
use crate::parser::BsrHead;
use crate::{Grammar, GrammarBuilder, SymbolRef};

fn ch(c: char) -> SymbolRef {
    SymbolRef::char(c as u32)
}

fn nt(name: &str) -> SymbolRef {
    SymbolRef::nonterminal(name)
}

fn start_idx(grammar: &Grammar, name: &str) -> crate::SymbolIdx {
    grammar.symbols().nonterminal_index(name).unwrap()
}

fn root_pivots(grammar: &Grammar, result: &crate::ParseResult, production: usize) -> Vec<usize> {
    let head = BsrHead::Complete {
        head: grammar.user_start(),
        production,
    };
    let m = result.input().len() - 1;
    result
        .forest()
        .pivots(&head, 0, m)
        .map(|p| p.iter().copied().collect())
        .unwrap_or_default()
}

/// S = 'a'
fn s1_grammar() -> Grammar {
    GrammarBuilder::new()
        .rule("S", vec![vec![ch('a')]])
        .start("S")
        .build()
        .unwrap()
}

#[test]
fn s1_single_terminal_accepts() {
    let grammar = s1_grammar();
    let result = grammar.parse_cnp_str("a");
    assert!(result.accepted());
    assert_eq!(result.ambiguity(), 1);
    assert_eq!(root_pivots(&grammar, &result, 0), vec![0]);
}

#[test]
fn s1_explicit_endmarker_matches_str_parse() {
    let grammar = s1_grammar();
    let from_array = grammar.parse_cnp(&['a' as u32, ENDMARKER]);
    let from_str = grammar.parse_cnp_str("a");
    assert_eq!(from_array.accepted(), from_str.accepted());
    assert_eq!(from_array.ambiguity(), from_str.ambiguity());
}

#[test]
fn s1_trailing_garbage_rejects() {
    let grammar = s1_grammar();
    let result = grammar.parse_cnp_str("ab");
    assert!(!result.accepted());
    assert_eq!(result.ambiguity(), 0);
}

#[test]
fn s2_left_recursion() {
    // S = S 'a' | 'a'
    let grammar = GrammarBuilder::new()
        .rule("S", vec![vec![nt("S"), ch('a')], vec![ch('a')]])
        .start("S")
        .build()
        .unwrap();
    let result = grammar.parse_cnp_str("aaa");
    assert!(result.accepted());
    assert_eq!(result.ambiguity(), 1);
    // the packed root of S = S 'a' over the whole input splits before the last 'a'
    assert_eq!(root_pivots(&grammar, &result, 0), vec![2]);
}

#[test]
fn s3_ambiguous_plus() {
    // S = S '+' S | 'a'
    let grammar = GrammarBuilder::new()
        .rule("S", vec![vec![nt("S"), ch('+'), nt("S")], vec![ch('a')]])
        .start("S")
        .build()
        .unwrap();
    let result = grammar.parse_cnp_str("a+a+a");
    assert!(result.accepted());
    assert_eq!(result.ambiguity(), 2);
    // both associativities survive: the right operand starts at 2 or at 4
    assert_eq!(root_pivots(&grammar, &result, 0), vec![2, 4]);
}

#[test]
fn s4_nullable_nesting() {
    // S = 'a' S 'b' | ϵ
    let grammar = GrammarBuilder::new()
        .rule("S", vec![vec![ch('a'), nt("S"), ch('b')], vec![]])
        .start("S")
        .build()
        .unwrap();
    let result = grammar.parse_cnp_str("aabb");
    assert!(result.accepted());
    assert_eq!(result.ambiguity(), 1);

    let s = start_idx(&grammar, "S");
    let nested = BsrHead::Complete {
        head: s,
        production: 0,
    };
    let epsilon = BsrHead::Complete {
        head: s,
        production: 1,
    };

    // the ϵ subtree sits exactly where the nesting bottoms out
    let eps_pivots: Vec<usize> = result
        .forest()
        .pivots(&epsilon, 2, 2)
        .unwrap()
        .iter()
        .copied()
        .collect();
    assert_eq!(eps_pivots, vec![2]);
    // TEST_SELECT keeps the ϵ alternative out of position 0, where 'a' does not select it
    assert!(result.forest().pivots(&epsilon, 0, 0).is_none());

    // the two nested completions split before their closing 'b'
    assert_eq!(root_pivots(&grammar, &result, 0), vec![3]);
    let inner: Vec<usize> = result
        .forest()
        .pivots(&nested, 1, 3)
        .unwrap()
        .iter()
        .copied()
        .collect();
    assert_eq!(inner, vec![2]);

    // intermediate prefix entries for the first two symbols of 'a' S 'b'
    let a = grammar
        .symbols()
        .lookup(&crate::Symbol::Terminal(Charset::of_char('a' as u32)))
        .unwrap();
    let prefix = BsrHead::Prefix { symbols: vec![a, s] };
    let outer_prefix: Vec<usize> = result
        .forest()
        .pivots(&prefix, 0, 3)
        .unwrap()
        .iter()
        .copied()
        .collect();
    assert_eq!(outer_prefix, vec![1]);
    let inner_prefix: Vec<usize> = result
        .forest()
        .pivots(&prefix, 1, 2)
        .unwrap()
        .iter()
        .copied()
        .collect();
    assert_eq!(inner_prefix, vec![2]);
}

#[test]
fn s5_rejection_leaves_the_forest_empty() {
    let grammar = s1_grammar();
    let result = grammar.parse_cnp_str("b");
    assert!(!result.accepted());
    assert_eq!(result.ambiguity(), 0);
    assert!(result.forest().is_empty());
}

#[test]
fn s6_expression_ambiguity_with_charset_terminal() {
    // E = E '+' E | E '*' E | d where d = [0-9]
    let digit = Charset::of_range(URange::new('0' as u32, '9' as u32).unwrap());
    let grammar = GrammarBuilder::new()
        .rule(
            "E",
            vec![
                vec![nt("E"), ch('+'), nt("E")],
                vec![nt("E"), ch('*'), nt("E")],
                vec![SymbolRef::terminal(digit)],
            ],
        )
        .start("E")
        .build()
        .unwrap();
    let result = grammar.parse_cnp_str("1+2*3");
    assert!(result.accepted());
    assert_eq!(result.ambiguity(), 2);
    // 1+(2*3) packs under E '+' E with the right operand at 2,
    // (1+2)*3 packs under E '*' E with the right operand at 4
    assert_eq!(root_pivots(&grammar, &result, 0), vec![2]);
    assert_eq!(root_pivots(&grammar, &result, 1), vec![4]);
}

#[test]
fn cyclic_grammar_terminates() {
    // S = S | 'a' has infinitely many derivations but finitely many packed alternatives
    let grammar = GrammarBuilder::new()
        .rule("S", vec![vec![nt("S")], vec![ch('a')]])
        .start("S")
        .build()
        .unwrap();
    let result = grammar.parse_cnp_str("a");
    assert!(result.accepted());
    assert_eq!(result.ambiguity(), 2);
}

#[test]
fn hidden_left_recursion_terminates() {
    // S = A S 'b' | 'c' ; A = ϵ | 'a'
    let grammar = GrammarBuilder::new()
        .rule("S", vec![vec![nt("A"), nt("S"), ch('b')], vec![ch('c')]])
        .rule("A", vec![vec![], vec![ch('a')]])
        .start("S")
        .build()
        .unwrap();
    for (input, expected) in [("cb", true), ("acb", true), ("c", true), ("ab", false)] {
        let result = grammar.parse_cnp_str(input);
        assert_eq!(result.accepted(), expected, "input {:?}", input);
    }
}

#[test]
fn pivots_stay_inside_their_span() {
    let grammar = GrammarBuilder::new()
        .rule("S", vec![vec![nt("S"), ch('+'), nt("S")], vec![ch('a')]])
        .start("S")
        .build()
        .unwrap();
    let result = grammar.parse_cnp_str("a+a+a+a");
    assert!(result.accepted());
    for (key, pivots) in result.forest().iter() {
        for &pivot in pivots {
            assert!(
                key.left <= pivot && pivot <= key.right,
                "pivot {} outside ({}, {})",
                pivot,
                key.left,
                key.right
            );
        }
    }
}

#[test]
fn unicode_terminals_parse_astral_input() {
    // S = [α-ω] '🦀'
    let greek = Charset::of_range(URange::new('α' as u32, 'ω' as u32).unwrap());
    let grammar = GrammarBuilder::new()
        .rule(
            "S",
            vec![vec![SymbolRef::terminal(greek), ch('🦀')]],
        )
        .start("S")
        .build()
        .unwrap();
    assert!(grammar.parse_cnp_str("λ🦀").accepted());
    assert!(!grammar.parse_cnp_str("λx").accepted());
}

#[test]
fn crf_records_callers_of_each_cluster() {
    let grammar = GrammarBuilder::new()
        .rule("S", vec![vec![ch('a'), nt("S"), ch('b')], vec![]])
        .start("S")
        .build()
        .unwrap();
    let result = grammar.parse_cnp_str("ab");
    assert!(result.accepted());

    // (S, 1) was entered through the caller slot S -> 'a' • S 'b' at position 0
    let s = start_idx(&grammar, "S");
    let cluster = result
        .crf()
        .cluster_nodes()
        .iter()
        .position(|n| n.head == s && n.j == 1);
    assert!(cluster.is_some());

    let mut rendered = String::new();
    result.write_crf(&grammar, &mut rendered).unwrap();
    assert!(rendered.contains("(S, 1)"));
}

#[test]
fn bsr_writer_lists_entries() {
    let grammar = s1_grammar();
    let result = grammar.parse_cnp_str("a");
    let mut rendered = String::new();
    result.write_bsr(&grammar, &mut rendered).unwrap();
    assert!(rendered.contains("(S -> 'a', 0, 1) : {0}"));
}

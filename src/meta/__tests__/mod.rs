use crate::charset::{Charset, URange, UNICODE_MAX};
use crate::meta::{grammar_from_source, parse_rules, scan, MetaTokenKind};
use crate::{GrammarError, SymbolRef};

#[test]
fn scanner_splits_tokens_and_skips_comments() {
    let source = "// a comment\nS = A 'ab' [0-9] . | ;";
    let tokens = scan(source).unwrap();
    let kinds: Vec<MetaTokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            MetaTokenKind::Identifier,
            MetaTokenKind::Equals,
            MetaTokenKind::Identifier,
            MetaTokenKind::Literal,
            MetaTokenKind::Class,
            MetaTokenKind::Any,
            MetaTokenKind::Pipe,
            MetaTokenKind::Semicolon,
        ]
    );
    assert_eq!(tokens[0].text, "S");
    assert_eq!(tokens[3].text, "'ab'");
}

#[test]
fn rules_round_trip_into_productions() {
    let grammar = grammar_from_source("S = 'a' S 'b' | ;").unwrap();
    let s = grammar.symbols().nonterminal_index("S").unwrap();
    let bodies = grammar.productions().bodies(s);
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0].len(), 3);
    assert!(bodies[1].is_empty());
    assert_eq!(grammar.user_start(), s);
}

#[test]
fn literal_expands_to_one_terminal_per_character() {
    let rules = parse_rules("S = 'abc' ;").unwrap();
    assert_eq!(rules[0].bodies[0].len(), 3);
    assert_eq!(
        rules[0].bodies[0][1],
        SymbolRef::Terminal(Charset::of_char('b' as u32))
    );
}

#[test]
fn class_builds_a_canonical_charset() {
    let rules = parse_rules("D = [0-9a-fA-F_] ;").unwrap();
    let expected = Charset::from_ranges([
        URange::new('0' as u32, '9' as u32).unwrap(),
        URange::new('a' as u32, 'f' as u32).unwrap(),
        URange::new('A' as u32, 'F' as u32).unwrap(),
        URange::new('_' as u32, '_' as u32).unwrap(),
    ]);
    assert_eq!(rules[0].bodies[0][0], SymbolRef::Terminal(expected));
}

#[test]
fn negated_class_complements_over_the_universe() {
    let rules = parse_rules("S = [^a] ;").unwrap();
    let charset = match &rules[0].bodies[0][0] {
        SymbolRef::Terminal(cs) => cs.clone(),
        other => panic!("expected a terminal, got {:?}", other),
    };
    assert!(!charset.contains_char('a' as u32));
    assert!(charset.contains_char('b' as u32));
    assert!(charset.contains_char(UNICODE_MAX));
    assert_eq!(charset.count(), UNICODE_MAX as u64); // everything but 'a'
}

#[test]
fn dot_is_the_anyset() {
    let rules = parse_rules("S = . ;").unwrap();
    assert_eq!(
        rules[0].bodies[0][0],
        SymbolRef::Terminal(Charset::anyset().clone())
    );
}

#[test]
fn escapes_in_literals_and_classes() {
    let rules = parse_rules(r"S = '\n\t\'' [\-\]x] '\u{1F980}' ;").unwrap();
    let body = &rules[0].bodies[0];
    assert_eq!(body[0], SymbolRef::Terminal(Charset::of_char('\n' as u32)));
    assert_eq!(body[1], SymbolRef::Terminal(Charset::of_char('\t' as u32)));
    assert_eq!(body[2], SymbolRef::Terminal(Charset::of_char('\'' as u32)));
    let class = Charset::from_ranges([
        URange::new('-' as u32, '-' as u32).unwrap(),
        URange::new(']' as u32, ']' as u32).unwrap(),
        URange::new('x' as u32, 'x' as u32).unwrap(),
    ]);
    assert_eq!(body[3], SymbolRef::Terminal(class));
    assert_eq!(body[4], SymbolRef::Terminal(Charset::of_char(0x1F980)));
}

#[test]
fn split_rules_for_one_head_are_merged() {
    let rules = parse_rules("S = 'a' ; S = 'b' ;").unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].bodies.len(), 2);
}

#[test]
fn syntax_errors_carry_positions() {
    let err = parse_rules("S = 'a' ;\nT ? 'b' ;").unwrap_err();
    match err {
        GrammarError::Syntax { line, column, .. } => {
            assert_eq!(line, 2);
            assert_eq!(column, 3);
        }
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn unterminated_rule_is_reported() {
    let err = parse_rules("S = 'a'").unwrap_err();
    assert!(matches!(err, GrammarError::Syntax { .. }));
}

#[test]
fn undefined_reference_surfaces_from_the_builder() {
    let err = grammar_from_source("S = Missing ;").unwrap_err();
    assert_eq!(
        err,
        GrammarError::UndefinedSymbol {
            name: "Missing".to_string()
        }
    );
}

#[test]
fn meta_grammar_end_to_end() {
    let grammar = grammar_from_source(
        "Sum = Sum '+' Num | Num ;
         Num = Num [0-9] | [0-9] ;",
    )
    .unwrap();
    assert!(grammar.parse_cnp_str("1+23+456").accepted());
    assert!(!grammar.parse_cnp_str("1++2").accepted());
    assert!(!grammar.parse_cnp_str("").accepted());
}

#[test]
fn rule_display_round_trips_the_shape() {
    let rules = parse_rules("S = 'a' S | ;").unwrap();
    assert_eq!(format!("{}", rules[0]), "S = 'a' S | ϵ ;");
}

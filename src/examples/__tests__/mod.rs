use crate::examples::{ambiguous_expression, arithmetic, balanced, json_like};
use serde_json::Value as SerdeValue;

#[test]
fn balanced_accepts_matched_nesting() {
    let grammar = balanced();
    for input in ["", "ab", "aabb", "aaabbb"] {
        assert!(grammar.parse_cnp_str(input).accepted(), "input {:?}", input);
    }
    for input in ["a", "b", "ba", "aab"] {
        assert!(!grammar.parse_cnp_str(input).accepted(), "input {:?}", input);
    }
}

#[test]
fn arithmetic_is_unambiguous() {
    let grammar = arithmetic();
    for input in ["1", "1+2*3", "(1+2)*3", "12*(3+45)+6"] {
        let result = grammar.parse_cnp_str(input);
        assert!(result.accepted(), "input {:?}", input);
        assert_eq!(result.ambiguity(), 1, "input {:?}", input);
    }
    assert!(!grammar.parse_cnp_str("1+*2").accepted());
    assert!(!grammar.parse_cnp_str("(1").accepted());
}

#[test]
fn ambiguous_expression_packs_every_reading() {
    let grammar = ambiguous_expression();
    assert_eq!(grammar.parse_cnp_str("1+2").ambiguity(), 1);
    // precedence is unresolved: (1+2)*3 and 1+(2*3) both survive
    assert_eq!(grammar.parse_cnp_str("1+2*3").ambiguity(), 2);
}

#[test]
fn json_like_parses_a_serde_validated_fixture() {
    let fixture = r#"{"name": "forest", "tags": ["glr", "gll"], "size": 2.5}"#;
    // cross-check the fixture with a real JSON parser before trusting the grammar
    serde_json::from_str::<SerdeValue>(fixture).unwrap();

    let grammar = json_like();
    let result = grammar.parse_cnp_str(fixture);
    assert!(result.accepted());

    let broken = r#"{"name": }"#;
    assert!(serde_json::from_str::<SerdeValue>(broken).is_err());
    assert!(!grammar.parse_cnp_str(broken).accepted());
}

#[test]
fn json_like_handles_escapes_and_arrays() {
    let grammar = json_like();
    for input in [
        "[]",
        "[ ]",
        "[1, 2.5, -3]",
        r#""line\nbreak""#,
        r#"{ "a" : [ true , false , null ] }"#,
    ] {
        assert!(grammar.parse_cnp_str(input).accepted(), "input {:?}", input);
    }
    for input in ["[", "[1,]", r#""unterminated"#] {
        assert!(!grammar.parse_cnp_str(input).accepted(), "input {:?}", input);
    }
}

#[test]
fn forest_printing_smoke() {
    let grammar = balanced();
    let result = grammar.parse_cnp_str("aabb");
    assert!(result.accepted());
    result.print_forest(&grammar).unwrap();

    // ambiguous forests render packed alternatives without recursing forever
    let expressions = ambiguous_expression();
    let ambiguous = expressions.parse_cnp_str("1+2*3");
    ambiguous.print_forest(&expressions).unwrap();
}

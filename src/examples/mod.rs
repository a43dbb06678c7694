//! Ready-made example grammars used by the documentation and the test suite.
//!
//! Each function builds a small grammar through the [meta](crate::meta) front end; the source
//! text doubles as documentation of the rule syntax.

use crate::Grammar;
use crate::meta::grammar_from_source;

#[cfg(test)]
mod __tests__;

/// Balanced nesting with an ϵ base case: `S = 'a' S 'b' | ;`.
pub fn balanced() -> Grammar {
    grammar_from_source("S = 'a' S 'b' | ;").unwrap()
}

/// An unambiguous left-recursive expression grammar over digit strings.
pub fn arithmetic() -> Grammar {
    grammar_from_source(
        "Expr   = Expr '+' Term | Term ;
         Term   = Term '*' Factor | Factor ;
         Factor = '(' Expr ')' | Digits ;
         Digits = Digits [0-9] | [0-9] ;",
    )
    .unwrap()
}

/// The classic ambiguous expression grammar; every operator fight is preserved in the forest.
pub fn ambiguous_expression() -> Grammar {
    grammar_from_source("E = E '+' E | E '*' E | [0-9] ;").unwrap()
}

/// A small JSON-shaped language: objects, arrays, strings, integers and fractions.
pub fn json_like() -> Grammar {
    grammar_from_source(
        r#"
        // values carry their surrounding whitespace
        Json     = Element ;
        Element  = Ws Value Ws ;
        Value    = Object | Array | String | Number | 'true' | 'false' | 'null' ;
        Object   = '{' Ws '}' | '{' Members '}' ;
        Members  = Member | Member ',' Members ;
        Member   = Ws String Ws ':' Element ;
        Array    = '[' Ws ']' | '[' Elements ']' ;
        Elements = Element | Element ',' Elements ;
        String   = '"' Chars '"' ;
        Chars    = | Chars Char ;
        Char     = [^"\\] | '\\' . ;
        Number   = Int | Int Frac ;
        Int      = Digits | '-' Digits ;
        Frac     = '.' Digits ;
        Digits   = [0-9] | [0-9] Digits ;
        Ws       = | [ \t\n\r] Ws ;
        "#,
    )
    .unwrap()
}

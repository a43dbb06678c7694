//! The grammar meta-syntax front end.
//!
//! Reads rule text of the form `Head = alternative | alternative | ... ;` and produces the
//! [SymbolRef] bodies the [GrammarBuilder] interns. Elements of an alternative are rule names,
//! `'quoted'` literals (one charset terminal per character), `[a-z0-9]` classes (a leading `^`
//! complements over the Unicode universe) and `.` for the anyset. `//` starts a line comment and
//! an empty alternative is the ϵ production.
//!
//! ```
//! let grammar = lang_cc::meta::grammar_from_source(
//!     "// sums of digit strings
//!      Sum  = Sum '+' Num | Num ;
//!      Num  = Num [0-9] | [0-9] ;",
//! )
//! .unwrap();
//! assert!(grammar.parse_cnp_str("12+345").accepted());
//! ```

use crate::charset::{Charset, URange, UNICODE_MAX};
use crate::{Grammar, GrammarBuilder, GrammarError, SymbolRef};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

#[cfg(test)]
mod __tests__;

static SKIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\s+|//[^\n]*)+").unwrap());
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").unwrap());
static LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^'(?:\\.|[^'\\])*'").unwrap());
static CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[(?:\\.|[^\]\\])*\]").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaTokenKind {
    Identifier,
    Literal,
    Class,
    Any,
    Pipe,
    Equals,
    Semicolon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One token of the meta-grammar source, with its byte offset for error reporting.
pub struct MetaToken {
    pub kind: MetaTokenKind,
    pub text: String,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
/// A parsed rule: a head name and its alternative bodies.
pub struct MetaRule {
    pub head: String,
    pub bodies: Vec<Vec<SymbolRef>>,
}

/// The line/column of a byte offset, for error messages.
fn position(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}

fn syntax_error(source: &str, offset: usize, message: String) -> GrammarError {
    let (line, column) = position(source, offset);
    GrammarError::Syntax {
        line,
        column,
        message,
    }
}

/// Split the source into meta tokens.
pub fn scan(source: &str) -> Result<Vec<MetaToken>, GrammarError> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    while offset < source.len() {
        let rest = &source[offset..];
        if let Some(m) = SKIP.find(rest) {
            offset += m.end();
            continue;
        }
        let (kind, len) = if let Some(m) = IDENTIFIER.find(rest) {
            (MetaTokenKind::Identifier, m.end())
        } else if let Some(m) = LITERAL.find(rest) {
            (MetaTokenKind::Literal, m.end())
        } else if let Some(m) = CLASS.find(rest) {
            (MetaTokenKind::Class, m.end())
        } else {
            match rest.chars().next() {
                Some('.') => (MetaTokenKind::Any, 1),
                Some('|') => (MetaTokenKind::Pipe, 1),
                Some('=') => (MetaTokenKind::Equals, 1),
                Some(';') => (MetaTokenKind::Semicolon, 1),
                Some(c) => {
                    return Err(syntax_error(
                        source,
                        offset,
                        format!("Unexpected character '{}'.", c),
                    ))
                }
                None => break,
            }
        };
        tokens.push(MetaToken {
            kind,
            text: rest[..len].to_string(),
            offset,
        });
        offset += len;
    }
    Ok(tokens)
}

/// Decode the escapes of a literal or class body into code points; the flag marks characters
/// that were written escaped (and therefore never act as range punctuation).
fn decode_units(source: &str, text: &str, offset: usize) -> Result<Vec<(u32, bool)>, GrammarError> {
    let mut units = Vec::new();
    let mut chars = text.char_indices();
    while let Some((at, c)) = chars.next() {
        if c != '\\' {
            units.push((c as u32, false));
            continue;
        }
        match chars.next() {
            Some((_, 'n')) => units.push(('\n' as u32, true)),
            Some((_, 't')) => units.push(('\t' as u32, true)),
            Some((_, 'r')) => units.push(('\r' as u32, true)),
            Some((_, 'u')) => {
                let rest = &text[at..];
                let open = rest.char_indices().nth(2);
                if open.map(|(_, c)| c) != Some('{') {
                    return Err(syntax_error(
                        source,
                        offset + at,
                        "Expected '{' after \\u.".to_string(),
                    ));
                }
                let brace = match rest.find('}') {
                    Some(i) => i,
                    None => {
                        return Err(syntax_error(
                            source,
                            offset + at,
                            "Unterminated \\u{...} escape.".to_string(),
                        ))
                    }
                };
                let digits = &rest[3..brace];
                let value = u32::from_str_radix(digits, 16).ok().filter(|&v| v <= UNICODE_MAX);
                let value = value.ok_or_else(|| {
                    syntax_error(
                        source,
                        offset + at,
                        format!("Invalid code point '\\u{{{}}}'.", digits),
                    )
                })?;
                units.push((value, true));
                // consume up to the closing brace
                while let Some((i, _)) = chars.next() {
                    if i == at + brace {
                        break;
                    }
                }
            }
            Some((_, c)) if matches!(c, '\\' | '\'' | '[' | ']' | '-' | '^') => {
                units.push((c as u32, true))
            }
            Some((_, c)) => {
                return Err(syntax_error(
                    source,
                    offset + at,
                    format!("Unknown escape '\\{}'.", c),
                ))
            }
            None => {
                return Err(syntax_error(
                    source,
                    offset + at,
                    "Dangling escape at end of token.".to_string(),
                ))
            }
        }
    }
    Ok(units)
}

/// Turn a `[...]` class token into a charset; a leading unescaped `^` complements.
fn parse_class(source: &str, token: &MetaToken) -> Result<Charset, GrammarError> {
    let inner = &token.text[1..token.text.len() - 1];
    let mut units = decode_units(source, inner, token.offset + 1)?;
    let negated = units.first() == Some(&('^' as u32, false));
    if negated {
        units.remove(0);
    }

    let mut charset = Charset::new();
    let mut i = 0;
    while i < units.len() {
        let (start, _) = units[i];
        if i + 2 < units.len() && units[i + 1] == ('-' as u32, false) {
            let (stop, _) = units[i + 2];
            let range = URange::new(start, stop).map_err(|_| {
                syntax_error(
                    source,
                    token.offset,
                    format!("Inverted range in class {}.", token.text),
                )
            })?;
            charset.add_range(range);
            i += 3;
        } else {
            charset.add_char(start);
            i += 1;
        }
    }
    Ok(if negated { charset.complement() } else { charset })
}

/// Parse the token stream into rules.
pub fn parse_rules(source: &str) -> Result<Vec<MetaRule>, GrammarError> {
    let tokens = scan(source)?;
    let mut rules: Vec<MetaRule> = Vec::new();
    let mut cursor = tokens.iter().peekable();

    while let Some(head) = cursor.next() {
        if head.kind != MetaTokenKind::Identifier {
            return Err(syntax_error(
                source,
                head.offset,
                format!("Expected a rule name, found '{}'.", head.text),
            ));
        }
        match cursor.next() {
            Some(t) if t.kind == MetaTokenKind::Equals => {}
            Some(t) => {
                return Err(syntax_error(
                    source,
                    t.offset,
                    format!("Expected '=' after rule name, found '{}'.", t.text),
                ))
            }
            None => {
                return Err(syntax_error(
                    source,
                    source.len(),
                    "Expected '=' after rule name, found end of input.".to_string(),
                ))
            }
        }

        let mut bodies = Vec::new();
        let mut body: Vec<SymbolRef> = Vec::new();
        loop {
            match cursor.next() {
                Some(t) if t.kind == MetaTokenKind::Identifier => {
                    body.push(SymbolRef::nonterminal(&t.text));
                }
                Some(t) if t.kind == MetaTokenKind::Literal => {
                    let inner = &t.text[1..t.text.len() - 1];
                    for (c, _) in decode_units(source, inner, t.offset + 1)? {
                        body.push(SymbolRef::Terminal(Charset::of_char(c)));
                    }
                }
                Some(t) if t.kind == MetaTokenKind::Class => {
                    body.push(SymbolRef::Terminal(parse_class(source, t)?));
                }
                Some(t) if t.kind == MetaTokenKind::Any => {
                    body.push(SymbolRef::Terminal(Charset::anyset().clone()));
                }
                Some(t) if t.kind == MetaTokenKind::Pipe => {
                    bodies.push(std::mem::take(&mut body));
                }
                Some(t) if t.kind == MetaTokenKind::Semicolon => {
                    bodies.push(body);
                    break;
                }
                Some(t) => {
                    return Err(syntax_error(
                        source,
                        t.offset,
                        format!("Unexpected '{}' in rule body.", t.text),
                    ))
                }
                None => {
                    return Err(syntax_error(
                        source,
                        source.len(),
                        format!("Rule '{}' is not terminated with ';'.", head.text),
                    ))
                }
            }
        }

        match rules.iter_mut().find(|r| r.head == head.text) {
            Some(rule) => rule.bodies.extend(bodies),
            None => rules.push(MetaRule {
                head: head.text.clone(),
                bodies,
            }),
        }
    }

    Ok(rules)
}

/// Read grammar source text into a built [Grammar]; the first rule's head is the start symbol.
pub fn grammar_from_source(source: &str) -> Result<Grammar, GrammarError> {
    let rules = parse_rules(source)?;
    if rules.is_empty() {
        return Err(GrammarError::EmptyGrammar);
    }
    let mut builder = GrammarBuilder::new().start(&rules[0].head);
    for rule in rules {
        builder = builder.rule(&rule.head, rule.bodies);
    }
    builder.build()
}

impl Display for MetaRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} =", self.head)?;
        for (i, body) in self.bodies.iter().enumerate() {
            if i != 0 {
                write!(f, " |")?;
            }
            if body.is_empty() {
                write!(f, " ϵ")?;
            }
            for symbol in body {
                match symbol {
                    SymbolRef::Nonterminal(name) => write!(f, " {}", name)?,
                    SymbolRef::Terminal(cs) => write!(f, " {}", cs)?,
                }
            }
        }
        write!(f, " ;")
    }
}

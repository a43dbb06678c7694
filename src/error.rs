use crate::GrammarError;
use std::fmt::{Display, Formatter};

impl Display for GrammarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarError::InvalidRange { start, stop } => {
                write!(
                    f,
                    "GrammarError: inverted code point range {:#X}-{:#X}.",
                    start, stop
                )
            }
            GrammarError::EmptyGrammar => {
                write!(f, "GrammarError: the grammar has no rules.")
            }
            GrammarError::MissingStart { name } => {
                write!(f, "GrammarError: start symbol '{}' has no rule.", name)
            }
            GrammarError::UndefinedSymbol { name } => {
                write!(
                    f,
                    "GrammarError: symbol '{}' is referenced but never defined.",
                    name
                )
            }
            GrammarError::Syntax {
                line,
                column,
                message,
            } => {
                write!(f, "SyntaxError: {} (line {}, column {})", message, line, column)
            }
        }
    }
}

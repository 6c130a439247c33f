use std::fmt;

use serde::Serialize;

use super::{END_MARK, EPSILON};

/// A grammar symbol.
///
/// Terminals and nonterminals are both spelled as free-form strings in the
/// grammar text; the loader decides which is which, so that the rest of the
/// pipeline never has to guess from the spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Symbol {
    Terminal(String),
    NonTerminal(String),
    Epsilon,
    EndMarker,
}

/// One alternative of a nonterminal. An empty alternative is spelled
/// `[Symbol::Epsilon]`.
pub type Production = Vec<Symbol>;

impl Symbol {
    pub fn terminal(name: impl Into<String>) -> Self {
        Symbol::Terminal(name.into())
    }

    pub fn non_terminal(name: impl Into<String>) -> Self {
        Symbol::NonTerminal(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(name) | Symbol::NonTerminal(name) => name.as_str(),
            Symbol::Epsilon => EPSILON,
            Symbol::EndMarker => END_MARK,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_) | Symbol::EndMarker)
    }

    /// The nonterminal name, if this is a nonterminal.
    pub fn as_non_terminal(&self) -> Option<&str> {
        match self {
            Symbol::NonTerminal(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn production_to_string(production: &[Symbol]) -> String {
    production
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns true if the production is the empty alternative.
pub fn is_epsilon_production(production: &[Symbol]) -> bool {
    production.iter().all(|s| *s == Symbol::Epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_spellings() {
        assert_eq!(Symbol::Epsilon.name(), "ε");
        assert_eq!(Symbol::EndMarker.to_string(), "$");
        assert!(Symbol::EndMarker.is_terminal());
        assert!(!Symbol::Epsilon.is_terminal());
        assert!(!Symbol::non_terminal("S").is_terminal());
    }

    #[test]
    fn epsilon_production() {
        assert!(is_epsilon_production(&[Symbol::Epsilon]));
        assert!(!is_epsilon_production(&[Symbol::terminal("a")]));
        assert_eq!(
            production_to_string(&[Symbol::terminal("a"), Symbol::non_terminal("S'")]),
            "a S'"
        );
    }
}

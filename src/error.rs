use thiserror::Error;

use crate::grammar::Symbol;

/// Failure to load a grammar from text. No partial grammar is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("grammar contains no parseable production")]
    Malformed,
    #[error("declaration {declaration}: \"$\" is reserved for the end marker")]
    ReservedSymbol { declaration: usize },
}

/// Failure of a single parse attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no production for {non_terminal} with lookahead {lookahead}")]
    NoRule {
        non_terminal: String,
        lookahead: Symbol,
    },
    #[error("expected {expected}, found {found}")]
    Mismatch { expected: Symbol, found: Symbol },
    /// The table expands a nonterminal into itself without consuming input,
    /// which only happens for left-recursive grammars.
    #[error("expanding {non_terminal} with lookahead {lookahead} never consumes input")]
    LeftRecursion {
        non_terminal: String,
        lookahead: Symbol,
    },
    #[error("input not fully consumed")]
    IncompleteConsumption { remaining: Vec<Symbol> },
    /// Panic-mode recovery resynchronised after every listed error.
    #[error("input parsed with {} syntax error(s)", .0.len())]
    Recovered(Vec<ParseError>),
}

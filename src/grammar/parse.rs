use crate::error::GrammarError;

use super::{
    grammar::{Grammar, NonTerminal},
    symbol::{Production, Symbol},
    END_MARK, EPSILON,
};

const EPSILON_ALIAS: &str = "epsilon";
const PRIME: &str = "'";

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '\''
}

/// Splits a whitespace-free word at every boundary between an identifier run
/// and a punctuation run, e.g. `L,` into `L` and `,`.
fn split_word(word: &str) -> impl Iterator<Item = &str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut previous: Option<bool> = None;
    for (i, c) in word.char_indices() {
        let class = is_identifier_char(c);
        if previous.map_or(false, |p| p != class) {
            pieces.push(&word[start..i]);
            start = i;
        }
        previous = Some(class);
    }
    if start < word.len() {
        pieces.push(&word[start..]);
    }
    pieces.into_iter()
}

fn tokenize(alternative: &str) -> Vec<&str> {
    alternative
        .split_whitespace()
        .flat_map(|word| split_word(word))
        .filter(|s| *s != PRIME)
        .collect()
}

impl Grammar {
    /// Loads a grammar written as `A -> x y | z; B -> ...`.
    ///
    /// Declarations without `->` or without a single-word left side are
    /// skipped. The first declared nonterminal is the start symbol.
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        let mut declarations: Vec<(usize, &str, &str)> = Vec::new();
        for (i, declaration) in grammar.split(';').enumerate() {
            let declaration = declaration.trim();
            let parts: Vec<&str> = declaration.split("->").collect();
            if parts.len() != 2 {
                if !declaration.is_empty() {
                    debug!("Skipping declaration {}: {:?}", i + 1, declaration);
                }
                continue;
            }
            let left = parts[0].trim();
            if left.is_empty() || left.split_whitespace().count() != 1 {
                debug!("Skipping declaration {}: bad left side {:?}", i + 1, left);
                continue;
            }
            declarations.push((i + 1, left, parts[1]));
        }

        let mut non_terminals: Vec<NonTerminal> = Vec::new();
        for &(_, left, _) in &declarations {
            if !non_terminals.iter().any(|nt| nt.name == left) {
                non_terminals.push(NonTerminal::new(left.to_string()));
            }
        }
        let is_declared = |name: &str| non_terminals.iter().any(|nt| nt.name == name);

        let mut raw_productions: Vec<(usize, Production)> = Vec::new();
        for &(index, left, rights) in &declarations {
            let left = non_terminals
                .iter()
                .position(|nt| nt.name == left)
                .ok_or(GrammarError::Malformed)?;
            for right in rights.split('|') {
                let mut production: Production = Vec::new();
                for name in tokenize(right) {
                    production.push(match name {
                        END_MARK => {
                            return Err(GrammarError::ReservedSymbol {
                                declaration: index,
                            })
                        }
                        EPSILON | EPSILON_ALIAS => Symbol::Epsilon,
                        _ if is_declared(name) => Symbol::non_terminal(name),
                        _ => Symbol::terminal(name),
                    });
                }
                if production.is_empty() {
                    continue;
                }
                if production.len() > 1 {
                    production.retain(|s| *s != Symbol::Epsilon);
                }
                raw_productions.push((left, production));
            }
        }

        if raw_productions.is_empty() {
            return Err(GrammarError::Malformed);
        }

        for (left, production) in raw_productions {
            non_terminals[left].productions.push(production);
        }

        let start_symbol = non_terminals[0].name.clone();
        let g = Grammar::from_non_terminals(non_terminals, start_symbol);
        info!(
            "Loaded grammar: {} non-terminals, {} terminals, start symbol {}",
            g.non_terminal_iter().count(),
            g.terminals().len(),
            g.start_symbol()
        );
        Ok(g)
    }
}

use std::collections::{HashMap, HashSet, VecDeque};

use super::symbol::{Production, Symbol};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonTerminal {
    pub name: String,
    pub productions: Vec<Production>,
}

impl NonTerminal {
    pub fn new(name: String) -> Self {
        Self {
            name,
            productions: Vec::new(),
        }
    }
}

/// Something a collaborator may want to surface before running the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarWarning {
    /// The nonterminal has no alternatives at all.
    NoProductions(String),
    /// The nonterminal cannot be reached from the start symbol.
    Unreachable(String),
}

impl std::fmt::Display for GrammarWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarWarning::NoProductions(name) => {
                write!(f, "Non-terminal {} has no productions", name)
            }
            GrammarWarning::Unreachable(name) => {
                write!(f, "Non-terminal {} is unreachable from the start symbol", name)
            }
        }
    }
}

/// An immutable grammar snapshot.
///
/// Transformations return a new `Grammar`; sets and tables borrow the
/// snapshot they were computed from.
#[derive(Debug, Clone)]
pub struct Grammar {
    non_terminals: Vec<NonTerminal>,
    symbol_table: HashMap<String, usize>,
    terminals: Vec<Symbol>,
    start_symbol: String,
    fresh_counter: usize,
}

impl Grammar {
    pub(super) fn from_non_terminals(non_terminals: Vec<NonTerminal>, start_symbol: String) -> Self {
        let mut g = Self {
            non_terminals,
            symbol_table: HashMap::new(),
            terminals: Vec::new(),
            start_symbol,
            fresh_counter: 0,
        };
        g.reindex();
        g
    }

    /// Rebuilds the name lookup and the terminal set from the productions.
    pub(super) fn reindex(&mut self) {
        self.symbol_table = self
            .non_terminals
            .iter()
            .enumerate()
            .map(|(i, nt)| (nt.name.clone(), i))
            .collect();

        let mut seen: HashSet<&str> = HashSet::new();
        let mut terminals = Vec::new();
        for nt in &self.non_terminals {
            for production in &nt.productions {
                for symbol in production {
                    if let Symbol::Terminal(name) = symbol {
                        if !self.symbol_table.contains_key(name) && seen.insert(name.as_str()) {
                            terminals.push(symbol.clone());
                        }
                    }
                }
            }
        }
        terminals.push(Symbol::EndMarker);
        self.terminals = terminals;
    }

    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = &NonTerminal> {
        self.non_terminals.iter()
    }

    pub fn non_terminal_names(&self) -> impl Iterator<Item = &str> {
        self.non_terminals.iter().map(|nt| nt.name.as_str())
    }

    pub fn non_terminal(&self, name: &str) -> Option<&NonTerminal> {
        self.symbol_table.get(name).map(|&i| &self.non_terminals[i])
    }

    pub fn is_non_terminal(&self, name: &str) -> bool {
        self.symbol_table.contains_key(name)
    }

    /// The alternatives of `name`, empty if it has none or is unknown.
    pub fn productions(&self, name: &str) -> &[Production] {
        self.non_terminal(name)
            .map(|nt| nt.productions.as_slice())
            .unwrap_or(&[])
    }

    /// Terminals in order of first appearance, the end marker last.
    pub fn terminals(&self) -> &[Symbol] {
        &self.terminals
    }

    /// Replaces the alternatives of an existing nonterminal.
    pub(super) fn set_productions(&mut self, name: &str, productions: Vec<Production>) {
        if let Some(&i) = self.symbol_table.get(name) {
            self.non_terminals[i].productions = productions;
            self.reindex();
        }
    }

    /// Inserts a new nonterminal right after `after` (or at the end).
    pub(super) fn insert_non_terminal_after(&mut self, after: &str, nt: NonTerminal) {
        let position = self
            .symbol_table
            .get(after)
            .map(|&i| i + 1)
            .unwrap_or(self.non_terminals.len());
        self.non_terminals.insert(position, nt);
        self.reindex();
    }

    fn is_name_taken(&self, name: &str) -> bool {
        self.symbol_table.contains_key(name)
            || self.terminals.iter().any(|t| t.name() == name)
    }

    /// Mints a nonterminal name derived from `base` that no symbol uses yet.
    ///
    /// The first choice is `base'`; after that a counter shared by every
    /// snapshot derived from this grammar is appended.
    pub(super) fn fresh_non_terminal_name(&mut self, base: &str) -> String {
        let primed = format!("{}'", base);
        if !self.is_name_taken(&primed) {
            return primed;
        }
        loop {
            self.fresh_counter += 1;
            let name = format!("{}'{}", base, self.fresh_counter);
            if !self.is_name_taken(&name) {
                return name;
            }
        }
    }

    /// Checks for nonterminals without alternatives and for nonterminals that
    /// the start symbol never reaches.
    pub fn validate(&self) -> Vec<GrammarWarning> {
        let mut warnings: Vec<GrammarWarning> = self
            .non_terminals
            .iter()
            .filter(|nt| nt.productions.is_empty())
            .map(|nt| GrammarWarning::NoProductions(nt.name.clone()))
            .collect();

        let mut reached: HashSet<&str> = HashSet::new();
        let mut q: VecDeque<&str> = VecDeque::new();
        reached.insert(self.start_symbol.as_str());
        q.push_back(self.start_symbol.as_str());
        while let Some(name) = q.pop_front() {
            for production in self.productions(name) {
                for next in production.iter().filter_map(|s| s.as_non_terminal()) {
                    if reached.insert(next) {
                        q.push_back(next);
                    }
                }
            }
        }
        warnings.extend(
            self.non_terminal_names()
                .filter(|name| !reached.contains(name))
                .map(|name| GrammarWarning::Unreachable(name.to_string())),
        );

        warnings
    }
}

impl PartialEq for Grammar {
    fn eq(&self, other: &Self) -> bool {
        self.non_terminals == other.non_terminals && self.start_symbol == other.start_symbol
    }
}

impl Eq for Grammar {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn terminals_exclude_non_terminals() {
        let g = Grammar::parse("S -> a A b; A -> c | ε").unwrap();
        let names: Vec<&str> = g.terminals().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["a", "b", "c", "$"]);
        for nt in g.non_terminal_names() {
            assert!(!g.terminals().iter().any(|t| t.name() == nt));
        }
    }

    #[test]
    fn fresh_names_do_not_collide() {
        let mut g = Grammar::parse("S -> a S' | b; S' -> c").unwrap();
        let first = g.fresh_non_terminal_name("S");
        assert_eq!(first, "S'1");
        g.insert_non_terminal_after("S", NonTerminal::new(first));
        assert_eq!(g.fresh_non_terminal_name("S"), "S'2");
        assert_eq!(g.fresh_non_terminal_name("A"), "A'");
    }

    #[test]
    fn validate_reports_empty_and_unreachable() {
        let g = Grammar::parse("S -> a; A -> ; B -> b").unwrap();
        assert_eq!(
            g.validate(),
            vec![
                GrammarWarning::NoProductions("A".to_string()),
                GrammarWarning::Unreachable("A".to_string()),
                GrammarWarning::Unreachable("B".to_string()),
            ]
        );
    }
}

use std::collections::HashMap;

use serde::Serialize;

use super::{
    first_follow::{FirstSets, FollowSets},
    grammar::Grammar,
    symbol::{production_to_string, Production, Symbol},
};

/// A cell that was assigned more than once. The later alternative wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub non_terminal: String,
    pub terminal: Symbol,
    pub replaced: Production,
    pub winner: Production,
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "M[{}, {}]: {} -> {} replaced by {} -> {}",
            self.non_terminal,
            self.terminal,
            self.non_terminal,
            production_to_string(&self.replaced),
            self.non_terminal,
            production_to_string(&self.winner)
        )
    }
}

/// The predictive parsing table of one grammar snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ll1Table<'g> {
    grammar: &'g Grammar,
    follow: FollowSets<'g>,
    cells: HashMap<String, HashMap<Symbol, Production>>,
    conflicts: Vec<Conflict>,
}

impl<'g> Ll1Table<'g> {
    pub fn build(first: &FirstSets<'g>, follow: &FollowSets<'g>) -> Self {
        let g = first.grammar();
        info!("Constructing LL(1) table");

        let mut cells: HashMap<String, HashMap<Symbol, Production>> = HashMap::new();
        let mut conflicts = Vec::new();
        for nt in g.non_terminal_iter() {
            let row = cells.entry(nt.name.clone()).or_default();
            for production in &nt.productions {
                let first_of_alpha = first.of_sequence(production);
                let mut lookaheads: Vec<&Symbol> = g
                    .terminals()
                    .iter()
                    .filter(|t| first_of_alpha.contains(*t))
                    .collect();
                if first_of_alpha.contains(&Symbol::Epsilon) {
                    if let Some(follow) = follow.get(&nt.name) {
                        lookaheads.extend(
                            g.terminals()
                                .iter()
                                .filter(|t| follow.contains(*t) && !first_of_alpha.contains(*t)),
                        );
                    }
                }

                for terminal in lookaheads {
                    trace!(
                        "M[{}, {}] = {}",
                        nt.name,
                        terminal,
                        production_to_string(production)
                    );
                    if let Some(replaced) = row.insert(terminal.clone(), production.clone()) {
                        if replaced != *production {
                            let conflict = Conflict {
                                non_terminal: nt.name.clone(),
                                terminal: terminal.clone(),
                                replaced,
                                winner: production.clone(),
                            };
                            warn!("LL(1) conflict: {}", conflict);
                            conflicts.push(conflict);
                        }
                    }
                }
            }
        }

        Ll1Table {
            grammar: g,
            follow: follow.clone(),
            cells,
            conflicts,
        }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn follow(&self) -> &FollowSets<'g> {
        &self.follow
    }

    /// The alternative to expand, or `None` for "no rule".
    pub fn entry(&self, non_terminal: &str, terminal: &Symbol) -> Option<&Production> {
        self.cells.get(non_terminal)?.get(terminal)
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn is_ll1(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// One row per nonterminal, one cell per terminal, in grammar order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, Vec<Option<&Production>>)> {
        let terminals = self.grammar.terminals();
        self.grammar.non_terminal_names().map(move |name| {
            let row = terminals.iter().map(|t| self.entry(name, t)).collect();
            (name, row)
        })
    }
}

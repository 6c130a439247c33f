use std::collections::{HashMap, HashSet};

use super::{grammar::Grammar, symbol::Symbol};

type SymbolSets = HashMap<String, HashSet<Symbol>>;

/// FIRST of a symbol sequence, walking left to right until a symbol that
/// cannot derive the empty string. Contains `Epsilon` iff the whole
/// sequence is nullable.
fn first_of_sequence(first: &SymbolSets, sequence: &[Symbol]) -> HashSet<Symbol> {
    let mut result = HashSet::new();
    for symbol in sequence {
        match symbol {
            Symbol::Epsilon => continue,
            Symbol::Terminal(_) | Symbol::EndMarker => {
                result.insert(symbol.clone());
                return result;
            }
            Symbol::NonTerminal(name) => {
                let set = match first.get(name) {
                    Some(set) => set,
                    None => return result,
                };
                result.extend(set.iter().filter(|s| **s != Symbol::Epsilon).cloned());
                if !set.contains(&Symbol::Epsilon) {
                    return result;
                }
            }
        }
    }
    result.insert(Symbol::Epsilon);
    result
}

fn extend_counting(into: &mut HashSet<Symbol>, from: impl IntoIterator<Item = Symbol>) -> bool {
    let before = into.len();
    into.extend(from);
    into.len() != before
}

fn sorted_names(set: &HashSet<Symbol>) -> Vec<&str> {
    let mut names: Vec<&str> = set.iter().map(|s| s.name()).collect();
    names.sort_unstable();
    names
}

/// FIRST sets of every nonterminal of one grammar snapshot.
#[derive(Debug, Clone)]
pub struct FirstSets<'g> {
    grammar: &'g Grammar,
    sets: SymbolSets,
}

impl Grammar {
    pub fn first_sets(&self) -> FirstSets<'_> {
        info!("Computing FIRST sets");
        let mut sets: SymbolSets = self
            .non_terminal_names()
            .map(|name| (name.to_string(), HashSet::new()))
            .collect();

        let mut changed = true;
        let mut round = 0;
        while changed {
            changed = false;
            round += 1;
            for nt in self.non_terminal_iter() {
                for production in &nt.productions {
                    let first = first_of_sequence(&sets, production);
                    if let Some(set) = sets.get_mut(&nt.name) {
                        changed |= extend_counting(set, first);
                    }
                }
            }
            trace!("FIRST round {}: changed = {}", round, changed);
        }

        for nt in self.non_terminal_iter() {
            debug!("FIRST({}) = {{{}}}", nt.name, sorted_names(&sets[&nt.name]).join(", "));
        }

        FirstSets {
            grammar: self,
            sets,
        }
    }
}

impl<'g> FirstSets<'g> {
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn get(&self, non_terminal: &str) -> Option<&HashSet<Symbol>> {
        self.sets.get(non_terminal)
    }

    pub fn is_nullable(&self, non_terminal: &str) -> bool {
        self.get(non_terminal)
            .map_or(false, |set| set.contains(&Symbol::Epsilon))
    }

    /// FIRST of an arbitrary sequence, such as one alternative.
    pub fn of_sequence(&self, sequence: &[Symbol]) -> HashSet<Symbol> {
        first_of_sequence(&self.sets, sequence)
    }

    /// Nonterminal names with their FIRST sets, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HashSet<Symbol>)> {
        self.grammar
            .non_terminal_names()
            .filter_map(move |name| self.sets.get(name).map(|set| (name, set)))
    }

    pub fn follow_sets(&self) -> FollowSets<'g> {
        info!("Computing FOLLOW sets");
        let g = self.grammar;
        let mut sets: SymbolSets = g
            .non_terminal_names()
            .map(|name| (name.to_string(), HashSet::new()))
            .collect();
        if let Some(set) = sets.get_mut(g.start_symbol()) {
            set.insert(Symbol::EndMarker);
        }

        let mut changed = true;
        let mut round = 0;
        while changed {
            changed = false;
            round += 1;
            for nt in g.non_terminal_iter() {
                for production in &nt.productions {
                    for (i, symbol) in production.iter().enumerate() {
                        let b = match symbol.as_non_terminal() {
                            Some(b) => b,
                            None => continue,
                        };

                        let rest = self.of_sequence(&production[i + 1..]);
                        let mut follow: HashSet<Symbol> = rest
                            .iter()
                            .filter(|s| **s != Symbol::Epsilon)
                            .cloned()
                            .collect();
                        if rest.contains(&Symbol::Epsilon) {
                            follow.extend(sets[&nt.name].iter().cloned());
                        }
                        if let Some(set) = sets.get_mut(b) {
                            changed |= extend_counting(set, follow);
                        }
                    }
                }
            }
            trace!("FOLLOW round {}: changed = {}", round, changed);
        }

        for name in g.non_terminal_names() {
            debug!("FOLLOW({}) = {{{}}}", name, sorted_names(&sets[name]).join(", "));
        }

        FollowSets { grammar: g, sets }
    }
}

/// FOLLOW sets of every nonterminal of one grammar snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSets<'g> {
    grammar: &'g Grammar,
    sets: SymbolSets,
}

impl<'g> FollowSets<'g> {
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn get(&self, non_terminal: &str) -> Option<&HashSet<Symbol>> {
        self.sets.get(non_terminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(set: Option<&HashSet<Symbol>>) -> Vec<&str> {
        set.map(sorted_names).unwrap_or_default()
    }

    const EXPR: &str = "E -> T E'; E' -> + T E' | ε; T -> F T'; T' -> * F T' | ε; F -> ( E ) | id";

    #[test]
    fn expression_first() {
        let g = Grammar::parse(EXPR).unwrap();
        let first = g.first_sets();
        assert_eq!(names(first.get("E")), vec!["(", "id"]);
        assert_eq!(names(first.get("E'")), vec!["+", "ε"]);
        assert_eq!(names(first.get("T'")), vec!["*", "ε"]);
        assert_eq!(names(first.get("F")), vec!["(", "id"]);
        assert!(first.is_nullable("T'"));
        assert!(!first.is_nullable("T"));
    }

    #[test]
    fn expression_follow() {
        let g = Grammar::parse(EXPR).unwrap();
        let follow = g.first_sets().follow_sets();
        assert_eq!(names(follow.get("E")), vec!["$", ")"]);
        assert_eq!(names(follow.get("E'")), vec!["$", ")"]);
        assert_eq!(names(follow.get("T")), vec!["$", ")", "+"]);
        assert_eq!(names(follow.get("T'")), vec!["$", ")", "+"]);
        assert_eq!(names(follow.get("F")), vec!["$", ")", "*", "+"]);
    }

    #[test]
    fn first_is_idempotent() {
        let g = Grammar::parse(EXPR).unwrap();
        let a = g.first_sets();
        let b = g.first_sets();
        for name in g.non_terminal_names() {
            assert_eq!(a.get(name), b.get(name));
        }
    }

    #[test]
    fn nullable_iff_some_alternative_is_nullable() {
        let g = Grammar::parse("S -> A B; A -> a | ε; B -> b | ε; C -> A c").unwrap();
        let first = g.first_sets();
        assert!(first.is_nullable("S"));
        assert!(!first.is_nullable("C"));
        assert_eq!(names(first.get("S")), vec!["a", "b", "ε"]);
        assert_eq!(names(first.get("C")), vec!["a", "c"]);
    }

    #[test]
    fn follow_looks_past_nullable_symbols() {
        let g = Grammar::parse("S -> A B c; A -> a; B -> b | ε").unwrap();
        let follow = g.first_sets().follow_sets();
        assert_eq!(names(follow.get("A")), vec!["b", "c"]);
        assert_eq!(names(follow.get("B")), vec!["c"]);
        assert_eq!(names(follow.get("S")), vec!["$"]);
    }

    #[test]
    fn empty_non_terminal_contributes_nothing() {
        let g = Grammar::parse("S -> A a | b; A -> A x")
            .unwrap()
            .eliminate_left_recursion();
        let first = g.first_sets();
        assert_eq!(names(first.get("A")), Vec::<&str>::new());
        assert_eq!(names(first.get("S")), vec!["b"]);
        let follow = first.follow_sets();
        assert_eq!(names(follow.get("A")), vec!["a"]);
    }

    #[test]
    fn sequence_first() {
        let g = Grammar::parse(EXPR).unwrap();
        let first = g.first_sets();
        let seq = vec![Symbol::non_terminal("E'"), Symbol::non_terminal("T'")];
        let mut set = first.of_sequence(&seq).into_iter().collect::<Vec<_>>();
        set.sort();
        assert_eq!(
            set,
            vec![
                Symbol::terminal("*"),
                Symbol::terminal("+"),
                Symbol::Epsilon
            ]
        );
    }
}

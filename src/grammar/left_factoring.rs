use std::collections::VecDeque;

use super::{
    grammar::{Grammar, NonTerminal},
    symbol::{production_to_string, Production, Symbol},
};

/// Groups alternatives by their leading symbol, in order of first
/// appearance. Epsilon alternatives always stand alone.
fn group_by_first_symbol(productions: &[Production]) -> Vec<Vec<usize>> {
    let mut groups: Vec<(Option<&Symbol>, Vec<usize>)> = Vec::new();
    for (i, production) in productions.iter().enumerate() {
        let head = production.first().filter(|s| **s != Symbol::Epsilon);
        match groups
            .iter_mut()
            .find(|(key, _)| head.is_some() && *key == head)
        {
            Some((_, members)) => members.push(i),
            None => groups.push((head, vec![i])),
        }
    }
    groups.into_iter().map(|(_, members)| members).collect()
}

fn common_prefix_len(members: &[&Production]) -> usize {
    let shortest = members.iter().map(|p| p.len()).min().unwrap_or(0);
    (0..shortest)
        .take_while(|&i| members.iter().all(|p| p[i] == members[0][i]))
        .count()
}

impl Grammar {
    /// Left-factors every nonterminal.
    ///
    /// Alternatives sharing a leading symbol are replaced by their longest
    /// common prefix followed by a fresh nonterminal deriving the remainders.
    /// Fresh nonterminals are factored in turn until no two alternatives of
    /// any nonterminal start with the same symbol.
    pub fn left_factor(&self) -> Grammar {
        info!("Left-factoring grammar");
        let mut g = self.clone();

        let mut todo: VecDeque<String> = self.non_terminal_names().map(String::from).collect();
        while let Some(name) = todo.pop_front() {
            let productions = g.productions(&name).to_vec();
            let groups = group_by_first_symbol(&productions);
            if groups.iter().all(|members| members.len() < 2) {
                continue;
            }

            let mut rewritten: Vec<Production> = Vec::new();
            let mut last_inserted = name.clone();
            for members in groups {
                if members.len() < 2 {
                    rewritten.push(productions[members[0]].clone());
                    continue;
                }

                let members: Vec<&Production> = members.iter().map(|&i| &productions[i]).collect();
                let prefix_len = common_prefix_len(&members);
                let fresh = g.fresh_non_terminal_name(&name);

                let remainders: Vec<Production> = members
                    .iter()
                    .map(|p| {
                        if p.len() == prefix_len {
                            vec![Symbol::Epsilon]
                        } else {
                            p[prefix_len..].to_vec()
                        }
                    })
                    .collect();

                let mut factored: Production = members[0][..prefix_len].to_vec();
                debug!(
                    "Factoring {} alternatives of {} with prefix {} into {}",
                    members.len(),
                    name,
                    production_to_string(&factored),
                    fresh
                );
                factored.push(Symbol::NonTerminal(fresh.clone()));
                rewritten.push(factored);

                g.insert_non_terminal_after(
                    &last_inserted,
                    NonTerminal {
                        name: fresh.clone(),
                        productions: remainders,
                    },
                );
                todo.push_back(fresh.clone());
                last_inserted = fresh;
            }

            g.set_productions(&name, rewritten);
        }

        g
    }
}

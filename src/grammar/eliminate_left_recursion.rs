use super::{
    grammar::{Grammar, NonTerminal},
    symbol::{is_epsilon_production, Production, Symbol},
};

impl Grammar {
    /// Removes immediate left recursion `A -> A α | β`.
    ///
    /// Every left-recursive nonterminal `A` becomes `A -> β A'` and
    /// `A' -> α A' | ε`, where all recursive tails are concatenated into the
    /// single alternative of `A'`. Indirect recursion through other
    /// nonterminals is left untouched.
    pub fn eliminate_left_recursion(&self) -> Grammar {
        info!("Removing immediate left recursion");
        let mut g = self.clone();

        let names: Vec<String> = self.non_terminal_names().map(String::from).collect();
        for name in names {
            let self_symbol = Symbol::NonTerminal(name.clone());
            let (recursive, others): (Vec<&Production>, Vec<&Production>) = self
                .productions(&name)
                .iter()
                .partition(|production| production.first() == Some(&self_symbol));

            if recursive.is_empty() {
                continue;
            }

            let prime = g.fresh_non_terminal_name(&name);
            let prime_symbol = Symbol::NonTerminal(prime.clone());

            let rewritten: Vec<Production> = others
                .into_iter()
                .map(|beta| {
                    let mut production: Production = if is_epsilon_production(beta) {
                        Vec::new()
                    } else {
                        beta.clone()
                    };
                    production.push(prime_symbol.clone());
                    production
                })
                .collect();

            let mut tail: Production = recursive
                .iter()
                .flat_map(|alpha| alpha.iter().skip(1).cloned())
                .filter(|s| *s != Symbol::Epsilon)
                .collect();
            tail.push(prime_symbol);

            debug!(
                "{} is left-recursive: {} alternative(s) moved to {}",
                name,
                recursive.len(),
                prime
            );

            g.set_productions(&name, rewritten);
            g.insert_non_terminal_after(
                &name,
                NonTerminal {
                    name: prime,
                    productions: vec![tail, vec![Symbol::Epsilon]],
                },
            );
        }

        g
    }
}

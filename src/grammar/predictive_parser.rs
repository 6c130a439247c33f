use serde::{Deserialize, Serialize};

use crate::error::ParseError;

use super::{
    ll1_table::Ll1Table,
    symbol::{production_to_string, Production, Symbol},
};

/// What the parser does when the table has no rule or a terminal mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recovery {
    /// Stop at the first syntax error.
    #[default]
    Abort,
    /// Skip input until a symbol in FOLLOW of the failing nonterminal, drop
    /// unmatched terminals, and keep going.
    PanicMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    #[serde(default)]
    pub recovery: Recovery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Action {
    Expand {
        non_terminal: String,
        production: Production,
    },
    Match(Symbol),
    PopEpsilon,
    Accept,
    /// Panic mode discarded an input symbol.
    Skip(Symbol),
    Error(String),
}

/// The parser state before an action, as the stack and the remaining input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub stack: Vec<Symbol>,
    pub input: Vec<Symbol>,
    pub action: Action,
}

/// One expansion in the parse tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEdge {
    pub parent: String,
    pub children: Vec<String>,
}

/// A table-driven LL(1) parser for a single parse attempt.
///
/// The stack top is the last element. After `parse` returns, `stack` and
/// `input` describe the state at which the parser stopped; on a syntax
/// error the offending stack symbol is left on top.
pub struct PredictiveParser<'t, 'g> {
    table: &'t Ll1Table<'g>,
    config: ParserConfig,
    stack: Vec<Symbol>,
    input: Vec<Symbol>,
    position: usize,
    tree: Vec<TreeEdge>,
    steps: Vec<Step>,
    errors: Vec<ParseError>,
    /// Nonterminals popped since the last consumed token, with the stack
    /// depth below them.
    pending: Vec<(String, usize)>,
}

impl<'t, 'g> PredictiveParser<'t, 'g> {
    pub fn new(table: &'t Ll1Table<'g>) -> Self {
        Self::with_config(table, ParserConfig::default())
    }

    pub fn with_config(table: &'t Ll1Table<'g>, config: ParserConfig) -> Self {
        Self {
            table,
            config,
            stack: Vec::new(),
            input: Vec::new(),
            position: 0,
            tree: Vec::new(),
            steps: Vec::new(),
            errors: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn stack(&self) -> &[Symbol] {
        &self.stack
    }

    /// The input not consumed yet, ending with the end marker.
    pub fn input(&self) -> &[Symbol] {
        &self.input[self.position.min(self.input.len())..]
    }

    pub fn tree(&self) -> &[TreeEdge] {
        &self.tree
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    fn lookahead(&self) -> Symbol {
        self.input
            .get(self.position)
            .cloned()
            .unwrap_or(Symbol::EndMarker)
    }

    fn record(&mut self, action: Action) {
        trace!(
            "stack: {}  input: {}  {:?}",
            production_to_string(&self.stack),
            production_to_string(self.input()),
            action
        );
        self.steps.push(Step {
            stack: self.stack.clone(),
            input: self.input().to_vec(),
            action,
        });
    }

    fn reset(&mut self, tokens: Vec<Symbol>) {
        let start = self.table.grammar().start_symbol().to_string();
        self.stack = vec![Symbol::NonTerminal(start)];
        self.input = tokens;
        self.input.push(Symbol::EndMarker);
        self.position = 0;
        self.tree.clear();
        self.steps.clear();
        self.errors.clear();
        self.pending.clear();
    }

    /// True once every caller token has been matched and only the end
    /// marker is left.
    fn at_end(&self) -> bool {
        self.position + 1 == self.input.len()
    }

    /// Parses `tokens`. A caller token spelled `$` is an ordinary terminal
    /// that no grammar can use, so it always fails to match.
    pub fn parse<I>(&mut self, tokens: I) -> Result<(), ParseError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| Symbol::terminal(t.as_ref()))
            .collect();
        self.reset(tokens);
        debug!("Parsing {}", production_to_string(self.input()));

        while let Some(top) = self.stack.pop() {
            let lookahead = self.lookahead();
            match top {
                Symbol::EndMarker if self.at_end() => {
                    self.record(Action::Accept);
                    return self.finish(Ok(()));
                }
                Symbol::Epsilon => self.record(Action::PopEpsilon),
                Symbol::NonTerminal(name) => {
                    if let Err(e) = self.expand(name, lookahead) {
                        return self.finish(Err(e));
                    }
                }
                terminal => {
                    if terminal == lookahead {
                        self.position += 1;
                        self.pending.clear();
                        self.record(Action::Match(terminal));
                    } else {
                        let error = ParseError::Mismatch {
                            expected: terminal.clone(),
                            found: lookahead,
                        };
                        if let Err(e) = self.fail(terminal, error) {
                            return self.finish(Err(e));
                        }
                    }
                }
            }
        }

        if self.at_end() {
            self.record(Action::Accept);
            self.finish(Ok(()))
        } else {
            let remaining: Vec<Symbol> = self
                .input()
                .iter()
                .filter(|s| **s != Symbol::EndMarker)
                .cloned()
                .collect();
            let error = ParseError::IncompleteConsumption { remaining };
            self.record(Action::Error(error.to_string()));
            self.finish(Err(error))
        }
    }

    fn expand(&mut self, name: String, lookahead: Symbol) -> Result<(), ParseError> {
        let depth = self.stack.len();
        self.pending.retain(|(_, d)| *d <= depth);
        if self.pending.iter().any(|(n, _)| *n == name) {
            let error = ParseError::LeftRecursion {
                non_terminal: name.clone(),
                lookahead,
            };
            self.stack.push(Symbol::NonTerminal(name));
            self.record(Action::Error(error.to_string()));
            return Err(error);
        }

        let table = self.table;
        match table.entry(&name, &lookahead) {
            None => {
                let error = ParseError::NoRule {
                    non_terminal: name.clone(),
                    lookahead,
                };
                match self.config.recovery {
                    Recovery::Abort => self.fail(Symbol::NonTerminal(name), error),
                    Recovery::PanicMode => {
                        self.record(Action::Error(error.to_string()));
                        self.errors.push(error);
                        self.synchronize(&name);
                        Ok(())
                    }
                }
            }
            Some(production) => {
                self.record(Action::Expand {
                    non_terminal: name.clone(),
                    production: production.clone(),
                });
                self.tree.push(TreeEdge {
                    parent: name.clone(),
                    children: production.iter().map(|s| s.name().to_string()).collect(),
                });
                self.pending.push((name, depth));
                self.stack.extend(production.iter().rev().cloned());
                Ok(())
            }
        }
    }

    /// Handles an error for the popped symbol `top`. Aborting puts `top`
    /// back; panic mode drops it and continues.
    fn fail(&mut self, top: Symbol, error: ParseError) -> Result<(), ParseError> {
        self.record(Action::Error(error.to_string()));
        match self.config.recovery {
            Recovery::Abort => {
                self.stack.push(top);
                Err(error)
            }
            Recovery::PanicMode => {
                self.errors.push(error);
                Ok(())
            }
        }
    }

    /// Discards input until a symbol in FOLLOW(`non_terminal`) or the end
    /// marker.
    fn synchronize(&mut self, non_terminal: &str) {
        let table = self.table;
        let follow = table.follow().get(non_terminal);
        loop {
            let lookahead = self.lookahead();
            if lookahead == Symbol::EndMarker
                || follow.map_or(false, |set| set.contains(&lookahead))
            {
                break;
            }
            self.record(Action::Skip(lookahead));
            self.position += 1;
            self.pending.clear();
        }
    }

    fn finish(&mut self, result: Result<(), ParseError>) -> Result<(), ParseError> {
        if self.errors.is_empty() {
            match &result {
                Ok(()) => debug!("Input parsed successfully"),
                Err(e) => debug!("Parse failed: {}", e),
            }
            return result;
        }
        let mut errors = std::mem::take(&mut self.errors);
        if let Err(e) = result {
            errors.push(e);
        }
        debug!("Parse finished after {} recovered error(s)", errors.len());
        Err(ParseError::Recovered(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use pretty_assertions::assert_eq;

    fn t(name: &str) -> Symbol {
        Symbol::terminal(name)
    }

    fn n(name: &str) -> Symbol {
        Symbol::non_terminal(name)
    }

    const EXPR: &str = "E -> T E'; E' -> + T E' | ε; T -> F T'; T' -> * F T' | ε; F -> ( E ) | id";

    fn run(grammar: &Grammar, tokens: &[&str], config: ParserConfig) -> (Result<(), ParseError>, Vec<Symbol>, Vec<Symbol>) {
        let first = grammar.first_sets();
        let follow = first.follow_sets();
        let table = Ll1Table::build(&first, &follow);
        let mut parser = PredictiveParser::with_config(&table, config);
        let result = parser.parse(tokens);
        (result, parser.stack().to_vec(), parser.input().to_vec())
    }

    #[test]
    fn accepts_expression() {
        let g = Grammar::parse(EXPR).unwrap();
        let (result, stack, input) = run(&g, &["id", "+", "id", "*", "id"], Default::default());
        assert_eq!(result, Ok(()));
        assert!(stack.is_empty());
        assert_eq!(input, vec![Symbol::EndMarker]);
    }

    #[test]
    fn accepts_empty_input_for_nullable_start() {
        let g = Grammar::parse("S -> a S | ε").unwrap();
        let (result, _, _) = run(&g, &[], Default::default());
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn no_rule_at_first_token() {
        let g = Grammar::parse(EXPR).unwrap();
        let (result, stack, input) = run(&g, &["+", "id"], Default::default());
        assert_eq!(
            result,
            Err(ParseError::NoRule {
                non_terminal: "E".to_string(),
                lookahead: t("+"),
            })
        );
        assert_eq!(stack, vec![n("E")]);
        assert_eq!(input, vec![t("+"), t("id"), Symbol::EndMarker]);
    }

    #[test]
    fn terminal_mismatch() {
        let g = Grammar::parse(EXPR).unwrap();
        let (result, stack, input) = run(&g, &["(", "id"], Default::default());
        assert_eq!(
            result,
            Err(ParseError::Mismatch {
                expected: t(")"),
                found: Symbol::EndMarker,
            })
        );
        assert_eq!(stack.last(), Some(&t(")")));
        assert_eq!(input, vec![Symbol::EndMarker]);
    }

    #[test]
    fn input_not_fully_consumed() {
        let g = Grammar::parse("S -> a").unwrap();
        let (result, stack, _) = run(&g, &["a", "a"], Default::default());
        assert_eq!(
            result,
            Err(ParseError::IncompleteConsumption {
                remaining: vec![t("a")],
            })
        );
        assert!(stack.is_empty());
    }

    #[test]
    fn dollar_token_does_not_end_input() {
        let g = Grammar::parse("S -> a").unwrap();
        let (result, _, input) = run(&g, &["a", "$", "b"], Default::default());
        assert_eq!(
            result,
            Err(ParseError::IncompleteConsumption {
                remaining: vec![t("$"), t("b")],
            })
        );
        assert_eq!(input, vec![t("$"), t("b"), Symbol::EndMarker]);

        let (result, _, _) = run(&g, &["a", "$"], Default::default());
        assert!(result.is_err());
    }

    #[test]
    fn panic_mode_resynchronizes() {
        let g = Grammar::parse(EXPR).unwrap();
        let config = ParserConfig {
            recovery: Recovery::PanicMode,
        };
        let (result, _, input) = run(&g, &["id", "+", ")", "id"], config);
        match result {
            Err(ParseError::Recovered(errors)) => {
                assert_eq!(
                    errors[0],
                    ParseError::NoRule {
                        non_terminal: "T".to_string(),
                        lookahead: t(")"),
                    }
                );
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(input.last(), Some(&Symbol::EndMarker));
    }

    #[test]
    fn panic_mode_without_errors_is_success() {
        let g = Grammar::parse(EXPR).unwrap();
        let config = ParserConfig {
            recovery: Recovery::PanicMode,
        };
        let (result, _, _) = run(&g, &["(", "id", ")"], config);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn left_recursive_table_does_not_loop() {
        let g = Grammar::parse("S -> b | S a").unwrap();
        let (result, _, _) = run(&g, &["b", "a"], Default::default());
        assert_eq!(
            result,
            Err(ParseError::LeftRecursion {
                non_terminal: "S".to_string(),
                lookahead: t("b"),
            })
        );
    }

    #[test]
    fn nullable_repeats_are_not_left_recursion() {
        let g = Grammar::parse("S -> Y Y a; Y -> ε | b").unwrap();
        let (result, _, _) = run(&g, &["a"], Default::default());
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn records_tree_and_steps() {
        let g = Grammar::parse("S -> a B; B -> b").unwrap();
        let first = g.first_sets();
        let follow = first.follow_sets();
        let table = Ll1Table::build(&first, &follow);
        let mut parser = PredictiveParser::new(&table);
        parser.parse(vec!["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(
            parser.tree(),
            &[
                TreeEdge {
                    parent: "S".to_string(),
                    children: vec!["a".to_string(), "B".to_string()],
                },
                TreeEdge {
                    parent: "B".to_string(),
                    children: vec!["b".to_string()],
                },
            ]
        );
        let actions: Vec<&Action> = parser.steps().iter().map(|s| &s.action).collect();
        assert_eq!(
            actions,
            vec![
                &Action::Expand {
                    non_terminal: "S".to_string(),
                    production: vec![t("a"), n("B")],
                },
                &Action::Match(t("a")),
                &Action::Expand {
                    non_terminal: "B".to_string(),
                    production: vec![t("b")],
                },
                &Action::Match(t("b")),
                &Action::Accept,
            ]
        );
    }
}

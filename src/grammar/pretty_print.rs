use std::collections::HashSet;

use crowbook_text_processing::escape;
use serde::Serialize;

use super::{
    first_follow::{FirstSets, FollowSets},
    ll1_table::Ll1Table,
    symbol::Symbol,
    Grammar, EPSILON,
};

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub left: &'a str,
    pub rights: Vec<Vec<&'a str>>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        self.rights
            .iter()
            .map(|right| right.join(" "))
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{:>width$} -> {}", self.left, right, width = left_width)
                } else if multiline {
                    format!("{:>width$}  | {}", "", right, width = left_width)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool, terminals: &HashSet<&str>) -> String {
        if self.rights.is_empty() {
            return String::new();
        }

        let left = if and_sign {
            format!("{} & \\rightarrow &", escape::tex(self.left))
        } else {
            format!("{} \\rightarrow ", escape::tex(self.left))
        };
        let right = self
            .rights
            .iter()
            .map(|right| {
                right
                    .iter()
                    .map(|s| {
                        if *s == EPSILON {
                            "\\epsilon".to_string()
                        } else if terminals.contains(s) {
                            format!("\\text{{{}}}", escape::tex(*s))
                        } else {
                            escape::tex(*s).to_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" \\ ")
            })
            .collect::<Vec<_>>()
            .join(" \\mid ");

        left + &right
    }
}

#[derive(Debug, Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
    #[serde(skip)]
    terminals: HashSet<&'a str>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.chars().count())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| {
                if s.rights.is_empty() {
                    format!("{:>width$} ->", s.left, width = left_max_len)
                } else {
                    s.to_plaintext(left_max_len, true)
                }
            })
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(
                self.productions
                    .iter()
                    .map(|s| s.to_latex(true, &self.terminals)),
            )
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

fn terminal_names(g: &Grammar) -> HashSet<&str> {
    g.terminals().iter().map(|t| t.name()).collect()
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let productions = self
            .non_terminal_iter()
            .map(|nt| ProductionOutput {
                left: nt.name.as_str(),
                rights: nt
                    .productions
                    .iter()
                    .map(|p| p.iter().map(|s| s.name()).collect())
                    .collect(),
            })
            .collect();
        ProductionOutputVec {
            productions,
            terminals: terminal_names(self),
        }
    }
}

fn sorted(set: &HashSet<Symbol>) -> Vec<&str> {
    let mut names: Vec<&str> = set
        .iter()
        .filter(|s| **s != Symbol::Epsilon)
        .map(|s| s.name())
        .collect();
    names.sort_unstable();
    if set.contains(&Symbol::Epsilon) {
        names.push(EPSILON);
    }
    names
}

#[derive(Debug, Serialize)]
struct NonTerminalOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<&'a str>,
    follow: Vec<&'a str>,
}

impl NonTerminalOutput<'_> {
    fn to_plaintext(&self) -> String {
        format!(
            "FIRST({}) = {{{}}}\nFOLLOW({}) = {{{}}}",
            self.name,
            self.first.join(", "),
            self.name,
            self.follow.join(", ")
        )
    }

    fn to_latex(&self) -> String {
        fn f(a: &[&str]) -> String {
            a.iter()
                .map(|s| escape::tex(*s))
                .collect::<Vec<_>>()
                .join(r"\ ")
                .replace(EPSILON, r"$\epsilon$")
        }

        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name),
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Debug, Serialize)]
pub struct FirstFollowOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
}

impl FirstFollowOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| s.to_plaintext())
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl<'g> FollowSets<'g> {
    /// Pairs these FOLLOW sets with the FIRST sets they were computed from.
    pub fn to_output_vec<'a>(&'a self, first: &'a FirstSets<'g>) -> FirstFollowOutputVec<'a> {
        let data = first
            .iter()
            .map(|(name, first_set)| NonTerminalOutput {
                name,
                nullable: first_set.contains(&Symbol::Epsilon),
                first: sorted(first_set),
                follow: self.get(name).map(sorted).unwrap_or_default(),
            })
            .collect();
        FirstFollowOutputVec { data }
    }
}

#[derive(Debug, Serialize)]
pub struct Ll1TableOutput<'a> {
    terminals: Vec<&'a str>,
    rows: Vec<(&'a str, Vec<Option<ProductionOutput<'a>>>)>,
}

impl Ll1TableOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|&t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend(row.iter().map(|cell| match cell {
                Some(production) => production.to_plaintext(left.chars().count(), false),
                None => String::new(),
            }));
            output.push(line);
        }

        let width: Vec<usize> = (0..output[0].len())
            .map(|j| {
                output
                    .iter()
                    .map(|line| line[j].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        output
            .iter()
            .map(|line| {
                line.iter()
                    .enumerate()
                    .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|&t| format!("\\text{{{}}}", escape::tex(t))),
        );
        let header = header.join(" & ");

        let terminal_set: HashSet<&str> = self.terminals.iter().cloned().collect();
        let output = self
            .rows
            .iter()
            .map(|(left, row)| {
                std::iter::once(escape::tex(*left).to_string())
                    .chain(row.iter().map(|cell| match cell {
                        Some(production) => production.to_latex(false, &terminal_set),
                        None => String::new(),
                    }))
                    .collect::<Vec<_>>()
                    .join(" & ")
            })
            .collect::<Vec<_>>()
            .join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }
}

impl<'g> Ll1Table<'g> {
    pub fn to_output(&self) -> Ll1TableOutput<'_> {
        let terminals = self.grammar().terminals().iter().map(|t| t.name()).collect();
        let rows = self
            .rows()
            .map(|(left, row)| {
                let row = row
                    .into_iter()
                    .map(|cell| {
                        cell.map(|production| ProductionOutput {
                            left,
                            rights: vec![production.iter().map(|s| s.name()).collect()],
                        })
                    })
                    .collect();
                (left, row)
            })
            .collect();
        Ll1TableOutput { terminals, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn productions_plaintext() {
        let g = Grammar::parse("S -> S a | b").unwrap().eliminate_left_recursion();
        assert_eq!(
            g.to_production_output_vec().to_plaintext(),
            " S -> b S'\nS' -> a S'\n    | ε"
        );
    }

    #[test]
    fn productions_latex_marks_terminals() {
        let g = Grammar::parse("S -> a S | ε").unwrap();
        let latex = g.to_production_output_vec().to_latex();
        assert!(latex.contains("S & \\rightarrow &\\text{a} \\ S \\mid \\epsilon"));
    }

    #[test]
    fn first_follow_plaintext() {
        let g = Grammar::parse("S -> a S | ε").unwrap();
        let first = g.first_sets();
        let follow = first.follow_sets();
        assert_eq!(
            follow.to_output_vec(&first).to_plaintext(),
            "FIRST(S) = {a, ε}\nFOLLOW(S) = {$}"
        );
    }

    #[test]
    fn first_follow_json() {
        let g = Grammar::parse("S -> a").unwrap();
        let first = g.first_sets();
        let follow = first.follow_sets();
        assert_eq!(
            follow.to_output_vec(&first).to_json().unwrap(),
            r#"{"data":[{"name":"S","nullable":false,"first":["a"],"follow":["$"]}]}"#
        );
    }

    #[test]
    fn table_plaintext() {
        let g = Grammar::parse("S -> a S | ε").unwrap();
        let first = g.first_sets();
        let follow = first.follow_sets();
        let table = Ll1Table::build(&first, &follow);
        assert_eq!(
            table.to_output().to_plaintext(),
            "  |        a |      $\nS | S -> a S | S -> ε"
        );
    }
}

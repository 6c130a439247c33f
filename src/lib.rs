#[macro_use]
extern crate log;
extern crate wasm_bindgen;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

pub mod error;
pub mod grammar;

pub use error::{GrammarError, ParseError};
pub use grammar::{
    Grammar, Ll1Table, ParserConfig, PredictiveParser, Recovery, Symbol, TreeEdge,
};

/// Which optional stages to run and how the parser reacts to errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub eliminate_left_recursion: bool,
    pub left_factor: bool,
    pub recovery: Recovery,
}

impl PipelineOptions {
    /// Reads options from JSON; a blank string means the defaults.
    pub fn from_json(options: &str) -> serde_json::Result<Self> {
        if options.trim().is_empty() {
            Ok(Self::default())
        } else {
            serde_json::from_str(options)
        }
    }
}

/// Loads a grammar and applies the transformations selected in `options`,
/// left recursion first.
pub fn prepare(grammar: &str, options: &PipelineOptions) -> Result<Grammar, GrammarError> {
    let mut g = Grammar::parse(grammar)?;
    if options.eliminate_left_recursion {
        g = g.eliminate_left_recursion();
    }
    if options.left_factor {
        g = g.left_factor();
    }
    Ok(g)
}

#[derive(Serialize)]
struct ParseReport<'a> {
    accepted: bool,
    message: String,
    stack: Vec<&'a str>,
    input: Vec<&'a str>,
    tree: &'a [TreeEdge],
}

#[derive(Serialize)]
struct Report<'a> {
    productions: grammar::pretty_print::ProductionOutputVec<'a>,
    terminals: Vec<&'a str>,
    non_terminals: Vec<&'a str>,
    first_follow: grammar::pretty_print::FirstFollowOutputVec<'a>,
    table: grammar::pretty_print::Ll1TableOutput<'a>,
    conflicts: Vec<String>,
    warnings: Vec<String>,
    parse: ParseReport<'a>,
}

fn error_json(message: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": message.to_string() }).to_string()
}

/// Runs the whole pipeline over `grammar` and parses the whitespace
/// separated `tokens`, returning every intermediate result as JSON.
///
/// `options` is a JSON encoded [`PipelineOptions`], or empty.
#[wasm_bindgen]
pub fn analyze_to_json(grammar: &str, tokens: &str, options: &str) -> String {
    let options = match PipelineOptions::from_json(options) {
        Ok(options) => options,
        Err(e) => return error_json(format_args!("invalid options: {}", e)),
    };
    let g = match prepare(grammar, &options) {
        Ok(g) => g,
        Err(e) => return error_json(e),
    };

    let first = g.first_sets();
    let follow = first.follow_sets();
    let table = Ll1Table::build(&first, &follow);
    let mut parser = PredictiveParser::with_config(
        &table,
        ParserConfig {
            recovery: options.recovery,
        },
    );
    let result = parser.parse(tokens.split_whitespace());

    let report = Report {
        productions: g.to_production_output_vec(),
        terminals: g.terminals().iter().map(|t| t.name()).collect(),
        non_terminals: g.non_terminal_names().collect(),
        first_follow: follow.to_output_vec(&first),
        table: table.to_output(),
        conflicts: table.conflicts().iter().map(|c| c.to_string()).collect(),
        warnings: g.validate().iter().map(|w| w.to_string()).collect(),
        parse: ParseReport {
            accepted: result.is_ok(),
            message: match &result {
                Ok(()) => "Input parsed successfully.".to_string(),
                Err(e) => e.to_string(),
            },
            stack: parser.stack().iter().map(|s| s.name()).collect(),
            input: parser.input().iter().map(|s| s.name()).collect(),
            tree: parser.tree(),
        },
    };

    serde_json::to_string(&report).unwrap_or_else(error_json)
}

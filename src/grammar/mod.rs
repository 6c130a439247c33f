pub mod eliminate_left_recursion;
pub mod first_follow;
pub mod grammar;
pub mod left_factoring;
pub mod ll1_table;
pub mod parse;
pub mod predictive_parser;
pub mod pretty_print;
pub mod symbol;

pub use first_follow::{FirstSets, FollowSets};
pub use grammar::{Grammar, GrammarWarning, NonTerminal};
pub use ll1_table::{Conflict, Ll1Table};
pub use predictive_parser::{Action, ParserConfig, PredictiveParser, Recovery, Step, TreeEdge};
pub use symbol::{Production, Symbol};

pub const EPSILON: &str = "ε";
pub const END_MARK: &str = "$";

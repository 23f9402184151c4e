pub mod config;
pub mod domain;
pub mod modules;
pub mod numerics;
pub mod parser;

pub use domain::{DataRow, HistoryError, HistoryErrorCategory, HistoryResult, HistoryTable};
pub use parser::{
    HistoryTableParser, ParseStats, ParsedHistory, ParserConfig, WidthPolicy, parse_history,
    parse_history_table,
};

pub mod facts;
pub mod text;
pub mod types;

pub use facts::{parse_financials, ParsedFinancials};
pub use types::{FactLabel, FinancialFact, SourceConfidence};

//! ledgerlink-ingest: run the external statement parser and normalize its output.

pub mod external;
pub mod types;

pub use external::{ParserCommand, parse_output};
pub use types::{FileResult, ParseOutput, ParseSummary, ParsedTransaction};

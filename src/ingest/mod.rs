pub mod convert;
pub mod parser;
pub mod pipeline;

pub use parser::{parse_delimited, ParsedRow, ParsedTable};
pub use pipeline::{BulkIngestPipeline, ImportOptions, ImportReport, RejectedRow};

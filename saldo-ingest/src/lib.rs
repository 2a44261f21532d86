//! Statement ingestion: format detection, bank-specific parsers for CSV
//! and PDF-extracted text, normalization into canonical transactions, and
//! the insert-time duplicate and transfer checks.

pub mod dedupe;
pub mod detect;
pub mod normalize;
pub mod parsers;
pub mod pipeline;
pub mod transfers;
pub mod types;

pub use dedupe::{filter_duplicates, DedupeOutcome};
pub use detect::{detect_format, SourceHint, StatementFormat};
pub use normalize::{normalize_statement, NC_CATEGORY};
pub use pipeline::{ingest, IngestResult};
pub use transfers::{apply_confirmed, detect_transfers, TransferPair, TransferReport};
pub use types::{CreditCardMeta, ParseStats, ParsedStatement, RawLineItem, StatementKind};

//! Document handling: request-scoped upload storage and PDF text extraction.

pub mod extract;
pub mod schema;
pub mod storage;

pub use extract::{extract, extract_text};
pub use schema::{ExtractedText, StoredDocument};
pub use storage::DocumentStore;

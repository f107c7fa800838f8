mod receipts;
mod summary;

pub use receipts::{
    build_receipt, sanitize_payload, write_receipt, GenerationRequest, RECEIPT_SCHEMA_VERSION,
};
pub use summary::{write_summary, SessionSummary};

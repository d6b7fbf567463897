//! Small cross-cutting helpers shared by the ingestion crates.

mod assert;

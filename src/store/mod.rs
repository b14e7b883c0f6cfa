//! Record stores backing the API. The technology catalog and the baseline
//! matrix are loaded once at startup and never mutated; the case store has a
//! single flat-file-backed extension fed by the import endpoint.

pub mod baseline;
pub mod cases;
pub mod technology;

//! Utility modules: retry, timeout, text bounding.

pub mod retry;
pub mod text;
pub mod timeout;

//! Symbol graph construction and focus relevance tracing.
//!
//! The graph is textual: callees are recorded as the names written at the
//! call site, without type resolution.

mod builder;
mod tracer;

pub use builder::{summarize, SymbolGraph};
pub use tracer::FocusTracer;

//! HTTP middleware for the web front-end.
//!
//! Layer order: Request → Trace → Csp → Handler

pub mod csp;

pub use csp::{is_excluded_path, CspLayer, CspService, CSP_POLICY};

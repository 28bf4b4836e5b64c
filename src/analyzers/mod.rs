//! Air-quality classification and time-bucket aggregation.
//!
//! Everything in here works on readings the caller already holds; there is
//! no I/O and no shared state.

pub mod aggregate;
pub mod assess;
pub mod classify;
pub mod types;
pub mod utility;

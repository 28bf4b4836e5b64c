//! Umweltbundesamt air-data API v3.

mod client;

pub use client::UbaClient;

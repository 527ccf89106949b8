//! QRZ Module
//!
//! Fetcher implementation for the QRZ.com XML data service.

mod client;
pub mod parser;

pub use client::{QrzClient, AGENT};

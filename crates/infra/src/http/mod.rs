//! HTTP transport
//!
//! Single-shot request execution with timeout and cancellation, plus the
//! multipart encoder for manuscript uploads.

pub mod client;
pub mod multipart;

pub use client::{HttpClient, HttpClientBuilder};
pub use multipart::ManuscriptForm;

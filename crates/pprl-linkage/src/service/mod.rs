//! Service Layer
//!
//! Orchestrates the domain: parameter derivation, encoding, the two
//! hardening passes and the similarity scan.

pub mod linkage_service;

pub use linkage_service::LinkageService;

#![deny(missing_docs)]

//! Core library for the docrouter document extraction and routing service.

/// HTTP routing and REST handlers.
pub mod api;
/// Filesystem utilities for the routing archive.
pub mod archive;
/// Language classification adapter.
pub mod classify;
/// Environment-driven configuration management.
pub mod config;
/// Human-in-the-loop routing decisions.
pub mod decisions;
/// Document extraction pipeline with OCR fallback.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Extraction and decision counters.
pub mod metrics;
/// Final pipeline report rendering.
pub mod report;

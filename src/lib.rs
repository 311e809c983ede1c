//! Core library for the ab-report command line application.
//!
//! The library exposes the classification, aggregation, and rendering
//! pipeline that turns a periodic pricing extract into per-representative
//! and per-manager report artifacts. The modules are structured to keep
//! responsibilities narrow and composable: the extract readers and the
//! workbook writer live under [`io`], data representations inside
//! [`model`], column binding in [`schema`], cleaning in [`ingest`], the
//! rollup logic in [`aggregate`], and the per-entity batch loop under
//! [`orchestrate`].

pub mod aggregate;
pub mod compose;
pub mod config;
pub mod error;
pub mod ingest;
pub mod io;
pub mod model;
pub mod notify;
pub mod orchestrate;
pub mod partition;
pub mod render;
pub mod resolve;
pub mod schema;

pub use error::{ReportError, Result, Severity};

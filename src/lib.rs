// src/lib.rs

//! Terminal font cell metrics.
//!
//! Asks the kernel for a terminal's window size (`TIOCGWINSZ`) and derives the
//! pixel size of one character cell from it.

pub mod config;
pub mod metrics;
pub mod os;
pub mod report;

pub use metrics::{cell_height, cell_width, font_height, CellMetrics, CellMetricsError};
pub use os::winsize::{probe, query, query_stdin, Probe, ProbeOrigin, WindowSize};

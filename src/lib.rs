//! Reads a process's memory map and groups its regions by kind.
//!
//! The pipeline is `parse_maps` -> `classify` -> `render`. Reading the map
//! from `/proc` (see [`scanner`]) is separate from the pipeline.

pub mod category;
pub mod classifier;
pub mod error;
pub mod processes;
pub mod region;
pub mod render;
pub mod scanner;

pub use category::{Category, CategorySet, Selection};
pub use classifier::{CategorizedRegions, classify, classify_region};
pub use error::{Error, Result};
pub use region::{MemoryRegion, ParseErrorKind, ParseFailure, ParsedMaps, parse_line, parse_lines, parse_maps};
pub use render::{render, render_summary};
pub use scanner::{MapsSource, Scan, Scanner};

//! Renderers that present a [`CycleReport`](crate::models::CycleReport).
//!
//! # Submodules
//!
//! - [`console`]: Prints a count table and top headlines to stdout
//! - [`csv_export`]: Writes the screened headlines as CSV rows
//! - [`json`]: Writes the report as a JSON snapshot, plus `latest.json`
//! - [`markdown`]: Writes a Markdown report per cycle
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! ├── latest.json
//! └── 2025-05-06/
//!     ├── 080000.json
//!     └── 081000.json
//!
//! markdown_output_dir/
//! ├── 2025-05-06_080000.md
//! └── 2025-05-06_081000.md
//!
//! csv_output_dir/
//! └── 2025-05-06_080000.csv
//! ```

pub mod console;
pub mod csv_export;
pub mod json;
pub mod markdown;

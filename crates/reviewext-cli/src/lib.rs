//! reviewext CLI - Command-line interface library
//!
//! - Render: listings of a Re:VIEW source as LaTeX or HTML
//! - Preprocess: batch-convert legacy listing syntax to `//list` options
//! - Check: lint for deprecated listing directives
//!
//! # Binary Usage
//!
//! ```bash
//! # Render a chapter for print
//! reviewext render ch01.re --format latex -o ch01.tex
//!
//! # Convert legacy syntax into .out/
//! reviewext preprocess "chapters/*.re" --stats
//!
//! # Lint and fix in place
//! reviewext check ch01.re --fix
//! ```

pub mod app;

pub use app::{check_command, preprocess_command, render_command};
pub use app::{run_cli, OutputFormat, PreprocessOptions, PreprocessStats, RenderFormat};

//! # condpp core
//!
//! Conditional-compilation preprocessor for `//#`-style directive comments:
//! - Directive scanning (`//#if`, `//#elif`, `//#else`, `//#endif`)
//! - Predicate parsing and evaluation against an explicit environment
//! - Nesting validation and removal of disabled branches
//! - Position mapping from output offsets back to the original source,
//!   exportable as a Source Map v3 document
//! - A batch driver for preprocessing files and directory trees
//!
//! ```ignore
//! use condpp_core::{Environment, Preprocessor};
//!
//! let env = Environment::from_pairs([("BUILD", "release")]);
//! let out = Preprocessor::new(env).preprocess(source)?;
//! println!("{}", out.text);
//! ```

#![warn(clippy::all)]

pub mod batch;
pub mod condition;
pub mod directive;
pub mod environment;
pub mod error;
pub mod position_map;
pub mod predicate;
pub mod preprocessor;
pub mod scanner;
pub mod source_map;
pub mod splice;

// Re-export commonly used types
pub use batch::{BatchSummary, FilePreprocessor};
pub use condition::{ConditionFrame, ConditionStack, EvaluationState};
pub use directive::{Directive, DirectiveTag};
pub use environment::{parse_define, Environment};
pub use error::{PreprocessError, SourceLocation};
pub use position_map::{Breakpoint, PositionMap};
pub use predicate::{PredicateError, PredicateEvaluator};
pub use preprocessor::{preprocess, Preprocessed, Preprocessor};
pub use scanner::{DirectiveScanner, ScanError};
pub use source_map::SourceMap;
pub use splice::TextSplicer;

/// condpp version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for condpp components. `RUST_LOG` takes precedence
/// over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "condpp_core={default_level},condpp_cli={default_level}"
        ))
    });
    // a subscriber may already be installed by an embedding application
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Batch preprocessing configuration
#[derive(Debug, Clone)]
pub struct CondppConfig {
    /// Write a `.map` file next to every output and link it from the output
    pub emit_source_maps: bool,
    /// Embed the original text in emitted source maps
    pub include_sources_content: bool,
    /// File extensions picked up when walking directories
    pub source_extensions: Vec<String>,
    /// Mirror the input directory layout under the output directory
    pub preserve_structure: bool,
    /// Enable debug logging
    pub debug: bool,
}

impl Default for CondppConfig {
    fn default() -> Self {
        Self {
            emit_source_maps: false,
            include_sources_content: false,
            source_extensions: ["js", "ts", "mjs", "cjs", "jsx", "tsx"]
                .into_iter()
                .map(String::from)
                .collect(),
            preserve_structure: true,
            debug: false,
        }
    }
}

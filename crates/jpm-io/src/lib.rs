//! JPM Project Boundary
//!
//! The trusted boundary between the file system and the recipe engine.
//!
//! # Core Operations
//!
//! - **Ingress**: Parse project files into [`SourceFile`](jpm_tree::SourceFile)s
//! - **Egress**: Write edited and generated files back
//!
//! # Architecture
//!
//! ```text
//! Project dir → ParserRegistry → Document → Composer → Document' → write → Project dir
//!                     ↑___________↓
//!                  ParseCache (content-addressed)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use jpm_io::ProjectLoader;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = ProjectLoader::new();
//! let project = loader.load("path/to/plugin").await?;
//! let report = composer.run(&project.sources);
//! loader.write(&project.root, report.to_write()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod cache;
pub mod error;
pub mod loader;
pub mod parsers;

// Re-exports for convenience
pub use cache::{CacheKey, CacheStats, ParseCache};
pub use error::{LoadError, LoadResult, ParseError};
pub use loader::{LoaderConfig, Project, ProjectLoader, Skipped};
pub use parsers::{
    default_parsers, parse_java, parse_xml, DocumentParser, JavaParser, ParserRegistry, TextParser, XmlParser,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for loading and writing projects
    pub use crate::error::{LoadError, ParseError};
    pub use crate::loader::{LoaderConfig, Project, ProjectLoader};
    pub use crate::parsers::{DocumentParser, ParserRegistry};
    pub use jpm_tree::{Document, SourceFile};
}

//! Project loader - the file system boundary
//!
//! Provides the only path between disk and recipes:
//! - Project directory → [`SourceFile`]s (load)
//! - Edited or generated [`SourceFile`]s → project directory (write)
//!
//! Recipes never touch files; every path they see is relative to the
//! project root.

use crate::cache::{CacheKey, ParseCache};
use crate::error::{LoadError, LoadResult, ParseError};
use crate::parsers::{default_parsers, ParserRegistry};
use jpm_tree::SourceFile;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_EXCLUDED_DIRS: &[&str] = &[".git", "target", "node_modules", "work"];

/// Loader settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Maximum file size to parse (bytes)
    pub max_file_size: u64,
    /// Directory names never descended into
    pub excluded_dirs: Vec<String>,
    /// Parse cache capacity (documents)
    pub cache_capacity: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(ToString::to_string).collect(),
            cache_capacity: 10_000,
        }
    }
}

impl LoaderConfig {
    /// Set the size limit
    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Skip another directory name
    #[must_use]
    pub fn with_excluded_dir(mut self, name: impl Into<String>) -> Self {
        self.excluded_dirs.push(name.into());
        self
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|d| d == name)
    }
}

/// A file left out of a load, with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// Project-relative path
    pub path: PathBuf,
    /// Why it was not loaded
    pub reason: String,
}

/// Everything loaded from one project directory
#[derive(Debug, Clone)]
pub struct Project {
    /// Absolute or caller-supplied project root
    pub root: PathBuf,
    /// Parsed files, sorted by path
    pub sources: Vec<SourceFile>,
    /// Files with a parser that could not be loaded
    pub skipped: Vec<Skipped>,
}

impl Project {
    /// Source by project-relative path
    #[must_use]
    pub fn source(&self, path: &Path) -> Option<&SourceFile> {
        self.sources.iter().find(|s| s.path() == path)
    }
}

/// Loads projects into documents and writes them back
#[derive(Debug, Clone)]
pub struct ProjectLoader {
    /// Registered parsers by file extension
    parsers: Arc<ParserRegistry>,
    /// Content-addressed cache
    cache: ParseCache,
    config: LoaderConfig,
}

impl ProjectLoader {
    /// Create loader with default parsers and settings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoaderConfig::default())
    }

    /// Create loader with specific settings
    #[must_use]
    pub fn with_config(config: LoaderConfig) -> Self {
        Self {
            parsers: Arc::new(default_parsers()),
            cache: ParseCache::new(config.cache_capacity),
            config,
        }
    }

    /// Replace the parser registry
    #[must_use]
    pub fn with_parsers(mut self, parsers: ParserRegistry) -> Self {
        self.parsers = Arc::new(parsers);
        self
    }

    /// Parse in-memory content as the file at `path`
    ///
    /// # Errors
    /// [`ParseError::NoParserForExtension`] or the parser's own error.
    pub fn parse_source(&self, path: impl Into<PathBuf>, content: &str) -> Result<SourceFile, ParseError> {
        parse_cached(&self.parsers, &self.cache, path.into(), content)
    }

    /// Load one file, `relative` to the project `root`
    ///
    /// # Errors
    /// - [`LoadError::OutsideRoot`] if `relative` escapes the root
    /// - [`LoadError::FileTooLarge`] over the size limit
    /// - [`LoadError::Io`] if the file cannot be read as UTF-8
    /// - [`LoadError::Parse`] if the content does not parse
    pub async fn load_file(&self, root: impl AsRef<Path>, relative: impl AsRef<Path>) -> LoadResult<SourceFile> {
        let relative = checked_relative(relative.as_ref())?;
        let full = root.as_ref().join(&relative);
        let metadata = tokio::fs::metadata(&full).await.map_err(|e| LoadError::io(&full, e))?;
        if metadata.len() > self.config.max_file_size {
            return Err(LoadError::FileTooLarge {
                path: relative,
                size: metadata.len(),
                max: self.config.max_file_size,
            });
        }
        let content = tokio::fs::read_to_string(&full)
            .await
            .map_err(|e| LoadError::io(&full, e))?;

        let parsers = Arc::clone(&self.parsers);
        let cache = self.cache.clone();
        let source = tokio::task::spawn_blocking(move || parse_cached(&parsers, &cache, relative, &content)).await??;
        Ok(source)
    }

    /// Load every parseable file under `root`
    ///
    /// Files no parser claims are ignored. Files a parser claims but that
    /// cannot be loaded are listed in [`Project::skipped`].
    ///
    /// # Errors
    /// [`LoadError::Io`] when a directory cannot be listed.
    pub async fn load(&self, root: impl AsRef<Path>) -> LoadResult<Project> {
        let root = root.as_ref().to_path_buf();
        let mut sources = Vec::new();
        let mut skipped = Vec::new();
        let mut pending = vec![PathBuf::new()];

        while let Some(dir) = pending.pop() {
            let full_dir = root.join(&dir);
            let mut entries = tokio::fs::read_dir(&full_dir)
                .await
                .map_err(|e| LoadError::io(&full_dir, e))?;
            while let Some(entry) = entries.next_entry().await.map_err(|e| LoadError::io(&full_dir, e))? {
                let file_type = entry.file_type().await.map_err(|e| LoadError::io(entry.path(), e))?;
                let name = entry.file_name();
                let relative = dir.join(&name);
                if file_type.is_dir() {
                    if !self.config.is_excluded(&name.to_string_lossy()) {
                        pending.push(relative);
                    }
                    continue;
                }
                if !file_type.is_file() || self.parsers.find_for_path(&relative).is_none() {
                    continue;
                }
                match self.load_file(&root, &relative).await {
                    Ok(source) => sources.push(source),
                    Err(err) => {
                        tracing::warn!(path = %relative.display(), error = %err, "skipping file");
                        skipped.push(Skipped {
                            path: relative,
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }

        sources.sort_by(|a, b| a.path().cmp(b.path()));
        skipped.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::info!(
            root = %root.display(),
            files = sources.len(),
            skipped = skipped.len(),
            "loaded project"
        );
        Ok(Project { root, sources, skipped })
    }

    /// Write sources under `root`, creating directories as needed
    ///
    /// Returns the number of files written.
    ///
    /// # Errors
    /// [`LoadError::OutsideRoot`] for a path escaping the root, otherwise
    /// [`LoadError::Io`].
    pub async fn write<'a>(
        &self,
        root: impl AsRef<Path>,
        sources: impl IntoIterator<Item = &'a SourceFile>,
    ) -> LoadResult<usize> {
        let root = root.as_ref();
        let mut written = 0;
        for source in sources {
            let relative = checked_relative(source.path())?;
            let full = root.join(&relative);
            if let Some(parent) = full.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| LoadError::io(parent, e))?;
            }
            tokio::fs::write(&full, source.document().print())
                .await
                .map_err(|e| LoadError::io(&full, e))?;
            tracing::debug!(path = %relative.display(), "wrote file");
            written += 1;
        }
        Ok(written)
    }

    /// Get cache reference
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &ParseCache {
        &self.cache
    }

    /// Get settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }
}

impl Default for ProjectLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_cached(
    parsers: &ParserRegistry,
    cache: &ParseCache,
    path: PathBuf,
    content: &str,
) -> Result<SourceFile, ParseError> {
    let parser = parsers.find_for_path(&path).ok_or_else(|| {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        ParseError::NoParserForExtension(extension.to_string())
    })?;
    let key = CacheKey::new(parser.kind(), content);
    let document = cache.try_get_or_insert_with(key, || parser.parse(&path, content))?;
    Ok(SourceFile::new(path, document))
}

/// `path` as a plain relative path, rejecting `..`, roots and prefixes
fn checked_relative(path: &Path) -> LoadResult<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(LoadError::OutsideRoot(path.to_path_buf()));
            }
        }
    }
    Ok(out)
}

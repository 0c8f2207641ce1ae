/*!
# Batch file preprocessing

Reads source files, strips disabled branches, and writes the results, with an
optional Source Map v3 file per output. A failing file is recorded in the
summary and nothing is written for it; the remaining files are still
processed.
*/

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use crate::environment::Environment;
use crate::error::SourceLocation;
use crate::preprocessor::{Preprocessed, Preprocessor};
use crate::source_map::mapping_url_comment;
use crate::CondppConfig;

/// Counters for one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub files_processed: usize,
    pub files_changed: usize,
    pub bytes_removed: usize,
    pub errors: Vec<String>,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: BatchSummary) {
        self.files_processed += other.files_processed;
        self.files_changed += other.files_changed;
        self.bytes_removed += other.bytes_removed;
        self.errors.extend(other.errors);
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// File-level driver around a shared [`Preprocessor`]
#[derive(Debug, Clone)]
pub struct FilePreprocessor {
    preprocessor: Preprocessor,
    config: CondppConfig,
}

impl FilePreprocessor {
    pub fn new(env: Environment) -> Self {
        Self::with_config(env, CondppConfig::default())
    }

    pub fn with_config(env: Environment, config: CondppConfig) -> Self {
        Self {
            preprocessor: Preprocessor::new(env),
            config,
        }
    }

    /// Set the file extensions to process
    pub fn source_extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.source_extensions = extensions;
        self
    }

    /// Whether to preserve directory structure in output
    pub fn preserve_structure(mut self, preserve: bool) -> Self {
        self.config.preserve_structure = preserve;
        self
    }

    /// Whether to write a source map next to each output
    pub fn emit_source_maps(mut self, emit: bool) -> Self {
        self.config.emit_source_maps = emit;
        self
    }

    pub fn config(&self) -> &CondppConfig {
        &self.config
    }

    /// Read and preprocess one file without writing anything.
    ///
    /// Errors name the file and the line and column of the failing directive.
    pub fn preprocess_path(&self, source_file: &Path) -> Result<(String, Preprocessed)> {
        let source = fs::read_to_string(source_file)
            .with_context(|| format!("failed to read {}", source_file.display()))?;

        match self.preprocessor.preprocess(&source) {
            Ok(out) => Ok((source, out)),
            Err(e) => {
                let location = SourceLocation::locate(&source, e.offset());
                Err(anyhow::Error::new(e)
                    .context(format!("failed to preprocess {}:{}", source_file.display(), location)))
            }
        }
    }

    /// Preprocess a single file into `output_file`
    pub fn preprocess_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source_file: P,
        output_file: Q,
    ) -> Result<BatchSummary> {
        let source_path = source_file.as_ref();
        let output_path = output_file.as_ref();

        let (source, out) = self.preprocess_path(source_path)?;

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        if self.config.emit_source_maps {
            let output_name = file_name(output_path)?;
            let map_name = format!("{output_name}.map");
            let source_map = out.source_map(
                &source,
                Some(&output_name),
                &source_path.display().to_string(),
                self.config.include_sources_content,
            );
            fs::write(output_path.with_file_name(&map_name), source_map.to_json()?)?;

            let mut text = out.text.clone();
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&mapping_url_comment(&map_name));
            text.push('\n');
            fs::write(output_path, text)?;
        } else {
            fs::write(output_path, &out.text)?;
        }

        info!(
            source = %source_path.display(),
            output = %output_path.display(),
            removed_bytes = out.removed_bytes(),
            "preprocessed file"
        );

        Ok(BatchSummary {
            files_processed: 1,
            files_changed: usize::from(!out.is_unchanged()),
            bytes_removed: out.removed_bytes(),
            errors: Vec::new(),
        })
    }

    /// Preprocess every matching file under `source_dir` into `output_dir`
    pub fn preprocess_directory<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source_dir: P,
        output_dir: Q,
    ) -> Result<BatchSummary> {
        let source_path = source_dir.as_ref();
        let output_path = output_dir.as_ref();

        if !source_path.is_dir() {
            return Err(anyhow!(
                "Source directory does not exist: {}",
                source_path.display()
            ));
        }

        fs::create_dir_all(output_path)?;
        let output_canonical = fs::canonicalize(output_path)
            .with_context(|| format!("failed to resolve {}", output_path.display()))?;

        let mut summary = BatchSummary::new();
        let walk = DirectoryWalk {
            output_dir: output_path,
            output_canonical: &output_canonical,
            source_root: source_path,
        };
        self.preprocess_directory_recursive(source_path, &walk, &mut summary)?;

        Ok(summary)
    }

    fn preprocess_directory_recursive(
        &self,
        current_dir: &Path,
        walk: &DirectoryWalk<'_>,
        summary: &mut BatchSummary,
    ) -> Result<()> {
        let mut entries = fs::read_dir(current_dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for path in entries {
            if path.is_dir() {
                // an output directory nested in the input tree is never re-read
                if fs::canonicalize(&path)?.as_path() == walk.output_canonical {
                    continue;
                }
                self.preprocess_directory_recursive(&path, walk, summary)?;
            } else if self.should_process_file(&path) {
                let output_file = if self.config.preserve_structure {
                    walk.output_dir.join(path.strip_prefix(walk.source_root)?)
                } else {
                    walk.output_dir.join(file_name(&path)?)
                };

                match self.preprocess_file(&path, &output_file) {
                    Ok(file_summary) => summary.merge(file_summary),
                    Err(e) => {
                        warn!(file = %path.display(), "{e:#}");
                        summary.errors.push(format!("{e:#}"));
                    }
                }
            }
        }

        Ok(())
    }

    /// Check if a file should be processed based on its extension
    fn should_process_file(&self, path: &Path) -> bool {
        path.extension().is_some_and(|extension| {
            let ext = extension.to_string_lossy();
            self.config
                .source_extensions
                .iter()
                .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(&ext))
        })
    }
}

/// Fixed locations for one directory run
struct DirectoryWalk<'a> {
    output_dir: &'a Path,
    output_canonical: &'a Path,
    source_root: &'a Path,
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("Not a file path: {}", path.display()))
}

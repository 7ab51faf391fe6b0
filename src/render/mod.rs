//! Rendering: option mapping, diff model, and document generation.

mod html;
mod model;
mod template;

pub use html::*;
pub use model::*;
pub use template::*;

use std::path::PathBuf;

use thiserror::Error;

use crate::core::RawDiff;

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    /// The template override path does not point at a file.
    #[error("template `{0}` not found")]
    TemplateNotFound(PathBuf),

    /// The template file existed but could not be read.
    #[error("failed to read template `{path}`: {source}")]
    TemplateRead {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The requested output format is neither `html` nor `json`.
    #[error("unsupported output format `{0}`")]
    UnsupportedFormat(String),

    /// The diff model could not be serialized.
    #[error("failed to serialize diff model: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Flat user-facing option values for one invocation.
///
/// Values arrive as free text from the CLI and stay immutable for the
/// whole run; this stage owns the mapping onto the typed [`RenderConfig`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Matching granularity: `word`, `char`, or `line`.
    pub diff: String,
    /// Output format: `html` or `json`.
    pub format: String,
    /// HTML layout: `line` or `side`.
    pub style: String,
    /// File summary visibility: `closed`, `open`, or `hidden`.
    pub summary: String,
    /// Synchronised scrolling: `enabled` or `disabled`.
    pub sync_scroll: String,
    /// Custom wrapper template path, if any.
    pub template: Option<PathBuf>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            diff: "word".to_string(),
            format: "html".to_string(),
            style: "line".to_string(),
            summary: "closed".to_string(),
            sync_scroll: "disabled".to_string(),
            template: None,
        }
    }
}

/// HTML layout style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutStyle {
    /// Single column with deletions above insertions.
    LineByLine,
    /// Old and new side by side.
    SideBySide,
}

/// Typed configuration consumed by the rendering engine.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Highlight intra-line changes at word granularity.
    pub word_by_word: bool,
    /// Highlight intra-line changes at grapheme granularity.
    pub char_by_char: bool,
    /// Unified or side-by-side layout.
    pub output_format: LayoutStyle,
    /// Whether the file summary list is rendered at all.
    pub show_files: bool,
    /// Whether the file summary list starts expanded.
    pub show_files_open: bool,
    /// Whether the two sides of a split view scroll together.
    pub synchronised_scroll: bool,
}

impl RenderConfig {
    /// Derive the engine configuration from flat option values.
    ///
    /// Unrecognized values fall back to the cheaper behavior instead of
    /// failing: unknown styles render line by line, unknown summary
    /// values show the list closed, and unknown granularities highlight
    /// nothing inside lines.
    #[must_use]
    pub fn from_options(options: &RenderOptions) -> Self {
        Self {
            word_by_word: options.diff == "word",
            char_by_char: options.diff == "char",
            output_format: if options.style == "side" {
                LayoutStyle::SideBySide
            } else {
                LayoutStyle::LineByLine
            },
            show_files: options.summary != "hidden",
            show_files_open: options.summary == "open",
            synchronised_scroll: options.sync_scroll == "enabled",
        }
    }
}

/// Render the raw diff into the requested document.
///
/// A template override that does not exist fails here, before any model
/// work, so a long render cannot end in a missing-template surprise.
/// `json` output serializes the model directly and never reads the
/// template; `html` parses, renders the fragment, and assembles the final
/// page around it.
#[must_use = "this returns a Result that should be checked"]
pub fn render(options: &RenderOptions, input: &RawDiff) -> Result<String, RenderError> {
    let template = resolve_template(options)?;

    match options.format.as_str() {
        "json" => {
            let model = json_model(input);
            Ok(serde_json::to_string(&model)?)
        }
        "html" => {
            let config = RenderConfig::from_options(options);
            let model = json_model(input);
            let body = pretty_html(&model, &config);
            let text = match &template {
                TemplateSource::Bundled => default_template().to_string(),
                TemplateSource::File(path) => std::fs::read_to_string(path).map_err(|source| {
                    RenderError::TemplateRead {
                        path: path.clone(),
                        source,
                    }
                })?,
            };
            Ok(assemble(
                &text,
                &body,
                config.show_files_open,
                config.synchronised_scroll,
            ))
        }
        other => Err(RenderError::UnsupportedFormat(other.to_string())),
    }
}

fn resolve_template(options: &RenderOptions) -> Result<TemplateSource, RenderError> {
    match &options.template {
        Some(path) if path.is_file() => Ok(TemplateSource::File(path.clone())),
        Some(path) => Err(RenderError::TemplateNotFound(path.clone())),
        None => Ok(TemplateSource::Bundled),
    }
}

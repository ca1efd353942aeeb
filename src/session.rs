//! Session: the interactive debugging state behind the shell.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use crate::compile::RuleIndex;
use crate::graph::{build, IndexMismatchError, Provenance};
use crate::render::{
    to_dot, Backend, Layout, OutputFormat, RenderError, Scene, UnsupportedFormatError,
    UnsupportedLayoutError,
};
use crate::style::{Category, StyleSheet, SubgraphStyle, UnknownCategoryError};
use crate::trace::{trace, NotFoundError, Trace, TraceMode, DEFAULT_TRACE_COLOR};

/// Failure to load provenance inputs.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Mismatch(#[from] IndexMismatchError),
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a rule index written by `compile`.
pub fn load_index(path: &Path) -> Result<RuleIndex, LoadError> {
    RuleIndex::from_json(&read(path)?).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load provenance from evaluator output, or from a previously saved
/// provenance file when `output` ends in `.json`.
pub fn load_provenance(index: &Path, output: &Path) -> Result<Provenance, LoadError> {
    let text = read(output)?;
    if output.extension().is_some_and(|ext| ext == "json") {
        info!("loading saved provenance from {}", output.display());
        return Provenance::from_json(&text).map_err(|source| LoadError::Json {
            path: output.to_path_buf(),
            source,
        });
    }
    let index = load_index(index)?;
    Ok(build(&index, &text)?)
}

/// Load a style sheet, skipping malformed lines.
pub fn load_styles(path: &Path) -> Result<StyleSheet, LoadError> {
    let (sheet, errors) = StyleSheet::parse(&read(path)?);
    if !errors.is_empty() {
        warn!(
            "{}: skipped {} malformed style lines",
            path.display(),
            errors.len()
        );
    }
    Ok(sheet)
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormatError),
    #[error(transparent)]
    UnsupportedLayout(#[from] UnsupportedLayoutError),
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategoryError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("no subgraph named '{0}'")]
    UnknownSubgraph(String),
}

/// Rendering options of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub layout: Layout,
    pub format: OutputFormat,
    /// Output files are `<stem>.dot` and `<stem>.<format>`
    pub output_stem: PathBuf,
    pub backend: Backend,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            layout: Layout::Dot,
            format: OutputFormat::Pdf,
            output_stem: PathBuf::from("gddb"),
            backend: Backend::default(),
        }
    }
}

/// What is currently drawn, plus the styles `hide` has set aside.
#[derive(Debug, Clone, PartialEq, Eq)]
struct View {
    scene: Scene,
    hidden: BTreeMap<String, SubgraphStyle>,
}

/// The trace currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTrace {
    pub trace: Trace,
    pub mode: TraceMode,
    pub color: String,
}

/// A debugging session over one provenance graph.
pub struct Session {
    provenance: Provenance,
    view: View,
    /// View from before the current trace
    saved: Option<View>,
    active: Option<ActiveTrace>,
    removed: BTreeSet<String>,
    auto: bool,
    config: SessionConfig,
}

impl Session {
    pub fn new(provenance: Provenance, styles: StyleSheet) -> Self {
        Self::with_config(provenance, styles, SessionConfig::default())
    }

    pub fn with_config(provenance: Provenance, styles: StyleSheet, config: SessionConfig) -> Self {
        let scene = Scene::new(provenance.graph.clone(), styles);
        Session {
            provenance,
            view: View {
                scene,
                hidden: BTreeMap::new(),
            },
            saved: None,
            active: None,
            removed: BTreeSet::new(),
            auto: false,
            config,
        }
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn scene(&self) -> &Scene {
        &self.view.scene
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.view.scene.styles
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn auto(&self) -> bool {
        self.auto
    }

    pub fn active_trace(&self) -> Option<&ActiveTrace> {
        self.active.as_ref()
    }

    pub fn removed(&self) -> &BTreeSet<String> {
        &self.removed
    }

    pub fn is_hidden(&self, subgraph: &str) -> bool {
        self.view.hidden.contains_key(subgraph)
    }

    /// Names of all subgraphs in the full provenance graph.
    pub fn subgraphs(&self) -> Vec<&str> {
        self.provenance.graph.bucket_names().collect()
    }

    fn check_subgraph(&self, name: &str) -> Result<(), SessionError> {
        if self.provenance.graph.contains_bucket(name) {
            Ok(())
        } else {
            Err(SessionError::UnknownSubgraph(name.to_string()))
        }
    }

    /// Set one style attribute, e.g. `anc.nodes:color=blue`.
    pub fn set_style(
        &mut self,
        subgraph: &str,
        category: &str,
        key: &str,
        value: &str,
    ) -> Result<(), SessionError> {
        let category: Category = category.parse()?;
        self.view.scene.styles.set(subgraph, category, key, value);
        Ok(())
    }

    /// Flip automatic redrawing; returns the new setting.
    pub fn toggle_auto(&mut self) -> bool {
        self.auto = !self.auto;
        self.auto
    }

    /// Make a subgraph invisible, remembering its styles for `show`.
    pub fn hide(&mut self, subgraph: &str) -> Result<(), SessionError> {
        self.check_subgraph(subgraph)?;
        if self.is_hidden(subgraph) {
            return Ok(());
        }
        let styles = &mut self.view.scene.styles;
        let saved = styles.take(subgraph).unwrap_or_default();
        styles.set(subgraph, Category::Nodes, "style", "invis");
        styles.set(subgraph, Category::Edges, "style", "invis");
        self.view.hidden.insert(subgraph.to_string(), saved);
        Ok(())
    }

    /// Undo `hide`.
    pub fn show(&mut self, subgraph: &str) -> Result<(), SessionError> {
        self.check_subgraph(subgraph)?;
        if let Some(saved) = self.view.hidden.remove(subgraph) {
            self.view.scene.styles.put(subgraph, saved);
        }
        Ok(())
    }

    /// Leave a subgraph out of the drawing entirely.
    pub fn remove(&mut self, subgraph: &str) -> Result<(), SessionError> {
        self.check_subgraph(subgraph)?;
        self.removed.insert(subgraph.to_string());
        Ok(())
    }

    /// Undo `remove`.
    pub fn add(&mut self, subgraph: &str) -> Result<(), SessionError> {
        self.check_subgraph(subgraph)?;
        self.removed.remove(subgraph);
        Ok(())
    }

    /// Drop every style, including ones set aside by `hide`.
    pub fn clear_styles(&mut self) {
        self.view.scene.styles.clear();
        self.view.hidden.clear();
    }

    pub fn set_layout(&mut self, layout: &str) -> Result<Layout, SessionError> {
        self.config.layout = layout.parse()?;
        Ok(self.config.layout)
    }

    pub fn set_format(&mut self, format: &str) -> Result<OutputFormat, SessionError> {
        self.config.format = format.parse()?;
        Ok(self.config.format)
    }

    /// DOT text of the current view.
    pub fn dot(&self) -> String {
        to_dot(&self.view.scene, &self.removed)
    }

    /// Render the current view; returns the rendered file.
    pub fn draw(&self) -> Result<PathBuf, SessionError> {
        let path = self.config.backend.draw(
            &self.dot(),
            &self.config.output_stem,
            self.config.layout,
            self.config.format,
        )?;
        Ok(path)
    }

    /// Render once in another format without changing the session format.
    pub fn draw_as(&self, format: &str) -> Result<PathBuf, SessionError> {
        let format: OutputFormat = format.parse()?;
        let path = self.config.backend.draw(
            &self.dot(),
            &self.config.output_stem,
            self.config.layout,
            format,
        )?;
        Ok(path)
    }

    /// Show the derivation of `atom`.
    ///
    /// A new trace replaces the previous one; both are taken against the
    /// view from before any trace. An unknown atom changes nothing.
    pub fn trace(
        &mut self,
        atom: &str,
        mode: TraceMode,
        color: Option<&str>,
    ) -> Result<&ActiveTrace, SessionError> {
        let result = trace(&self.provenance.adjacency, atom)?;
        let color = color.unwrap_or(DEFAULT_TRACE_COLOR).to_string();

        let base = self.saved.get_or_insert_with(|| self.view.clone()).clone();
        let scene = match mode {
            TraceMode::Partial => result.partial_scene(&base.scene),
            TraceMode::Full => result.full_scene(&base.scene, &color),
        };
        self.view = View {
            scene,
            hidden: base.hidden,
        };
        info!("tracing {} ({})", result.root, mode);
        Ok(self.active.insert(ActiveTrace {
            trace: result,
            mode,
            color,
        }))
    }

    /// Restore the view from before the first trace. Returns false if no
    /// trace was active.
    pub fn untrace(&mut self) -> bool {
        self.active = None;
        match self.saved.take() {
            Some(view) => {
                self.view = view;
                true
            }
            None => false,
        }
    }
}

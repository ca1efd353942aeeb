//! Hands DOT text to the Graphviz layout program.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info};
use thiserror::Error;

use super::format::{Layout, OutputFormat};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not run '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("'{program}' failed ({status}): {stderr}")]
    Backend {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Invokes an external Graphviz-compatible program.
///
/// By default the program is the one named by the layout engine
/// (`dot`, `neato`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Backend {
    program: Option<String>,
}

impl Backend {
    /// Always run `program`, passing the engine with `-K`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Backend {
            program: Some(program.into()),
        }
    }

    pub fn program(&self, layout: Layout) -> &str {
        self.program.as_deref().unwrap_or(layout.as_str())
    }

    /// Write `dot` to `<stem>.dot` and render it to `<stem>.<format>`.
    ///
    /// Returns the path of the rendered file.
    pub fn draw(
        &self,
        dot: &str,
        stem: &Path,
        layout: Layout,
        format: OutputFormat,
    ) -> Result<PathBuf, RenderError> {
        let dot_path = stem.with_extension("dot");
        std::fs::write(&dot_path, dot).map_err(|source| RenderError::Write {
            path: dot_path.clone(),
            source,
        })?;
        let output = stem.with_extension(format.extension());
        self.render(dot, layout, format, &output)?;
        info!("rendered {} with {} layout", output.display(), layout);
        Ok(output)
    }

    /// Pipe `dot` through the layout program into `output`.
    pub fn render(
        &self,
        dot: &str,
        layout: Layout,
        format: OutputFormat,
        output: &Path,
    ) -> Result<(), RenderError> {
        let program = self.program(layout);
        let spawn_err = |source| RenderError::Spawn {
            program: program.to_string(),
            source,
        };
        debug!(
            "running {} -K{} -T{} -o {}",
            program,
            layout,
            format,
            output.display()
        );
        let mut child = Command::new(program)
            .arg(format!("-K{}", layout))
            .arg(format!("-T{}", format))
            .arg("-o")
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(dot.as_bytes()).map_err(spawn_err)?;
        }
        let result = child.wait_with_output().map_err(spawn_err)?;
        if !result.status.success() {
            return Err(RenderError::Backend {
                program: program.to_string(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_a_spawn_error() {
        let backend = Backend::with_program("gddb-no-such-layout-program");
        let dir = std::env::temp_dir();
        let err = backend
            .render("digraph {}", Layout::Dot, OutputFormat::Png, &dir.join("gddb-missing.png"))
            .unwrap_err();
        assert!(matches!(err, RenderError::Spawn { .. }));
    }

    #[test]
    fn test_program_follows_layout() {
        assert_eq!(Backend::default().program(Layout::Neato), "neato");
        assert_eq!(Backend::with_program("gv").program(Layout::Neato), "gv");
    }

    #[test]
    fn test_draw_writes_dot_file_first() {
        let stem = std::env::temp_dir().join("gddb-backend-test");
        let backend = Backend::with_program("gddb-no-such-layout-program");
        let _ = backend.draw("digraph {}\n", &stem, Layout::Dot, OutputFormat::Pdf);
        let written = std::fs::read_to_string(stem.with_extension("dot")).unwrap();
        assert_eq!(written, "digraph {}\n");
    }
}

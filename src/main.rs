//! gddb CLI - compile, replay, trace and interactively draw Datalog provenance.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use gddb::compile::Compiler;
use gddb::render::{Backend, Layout, OutputFormat};
use gddb::repl::Repl;
use gddb::session::{load_provenance, load_styles, Session, SessionConfig};
use gddb::style::StyleSheet;
use gddb::trace::trace;

#[derive(Parser)]
#[command(name = "gddb", version, about = "Graphical Datalog debugger")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite rule files through auxiliary firing predicates
    Compile {
        /// Rule files, compiled as one program
        #[arg(required = true)]
        sources: Vec<PathBuf>,
        /// Where to write the rewritten program (default: stdout)
        #[arg(long, value_name = "FILE")]
        program: Option<PathBuf>,
        /// Where to write the rule index
        #[arg(long, value_name = "FILE", default_value = "parse_map.json")]
        index: PathBuf,
    },
    /// Replay evaluator output into provenance JSON
    Build {
        index: PathBuf,
        eval_out: PathBuf,
        /// Where to write the provenance (default: stdout)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print everything that contributed to one ground atom
    Trace {
        index: PathBuf,
        /// Evaluator output, or provenance JSON from `build`
        eval_out: PathBuf,
        atom: String,
    },
    /// Start the interactive debugger
    Debug {
        index: PathBuf,
        /// Evaluator output, or provenance JSON from `build`
        eval_out: PathBuf,
        /// Style sheet layered over the defaults
        #[arg(long, value_name = "FILE")]
        styles: Option<PathBuf>,
        #[arg(long, default_value = "dot")]
        layout: Layout,
        #[arg(long, default_value = "pdf")]
        format: OutputFormat,
        /// Output file stem
        #[arg(long, value_name = "STEM", default_value = "gddb")]
        out: PathBuf,
        /// Layout program to run instead of the one named by --layout
        #[arg(long, value_name = "PROGRAM")]
        backend: Option<String>,
    },
}

fn compile(sources: &[PathBuf], program: Option<&Path>, index: &Path) -> Result<()> {
    let mut compiler = Compiler::new();
    let mut failures = Vec::new();
    for path in sources {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        if let Err(errors) = compiler.add_source(&text) {
            failures.push(errors.in_file(&path.display().to_string()));
        }
    }
    if !failures.is_empty() {
        bail!("{}", failures.join("\n"));
    }

    let compiled = compiler.finish();
    match program {
        Some(path) => std::fs::write(path, &compiled.text)
            .with_context(|| format!("could not write {}", path.display()))?,
        None => print!("{}", compiled.text),
    }
    let json = compiled.index.to_json()?;
    std::fs::write(index, json).with_context(|| format!("could not write {}", index.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            sources,
            program,
            index,
        } => compile(&sources, program.as_deref(), &index)?,
        Commands::Build {
            index,
            eval_out,
            output,
        } => {
            let provenance = load_provenance(&index, &eval_out)?;
            let json = provenance.to_json()?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("could not write {}", path.display()))?,
                None => println!("{}", json),
            }
        }
        Commands::Trace {
            index,
            eval_out,
            atom,
        } => {
            let provenance = load_provenance(&index, &eval_out)?;
            let result = trace(&provenance.adjacency, &atom)?;
            print!("{}", result.summary());
        }
        Commands::Debug {
            index,
            eval_out,
            styles,
            layout,
            format,
            out,
            backend,
        } => {
            let provenance = load_provenance(&index, &eval_out)?;
            let mut sheet = StyleSheet::default_sheet();
            if let Some(path) = styles {
                sheet.merge(&load_styles(&path)?);
            }
            let config = SessionConfig {
                layout,
                format,
                output_stem: out,
                backend: backend.map(Backend::with_program).unwrap_or_default(),
            };

            println!("gddb - Graphical Datalog Debugger");
            println!("Type help for help, quit to exit.\n");
            let mut repl = Repl::new(Session::with_config(provenance, sheet, config));
            repl.run()?;
        }
    }
    Ok(())
}

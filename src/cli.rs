use crate::config::load_config;
use crate::ir::Design;
use crate::layout::compute_diagram;
use crate::layout_dump::write_layout_dump;
use crate::overrides::Overrides;
use crate::persist::{FileStore, load_overrides};
use crate::theme::Theme;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "archdiag",
    version,
    about = "Lay out and route hardware architecture diagrams"
)]
pub struct Args {
    /// Design file (JSON or JSON5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the layout JSON. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file (layout, routing and interaction settings)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Directory holding saved layouts
    #[arg(long = "store", requires = "design_id")]
    pub store: Option<PathBuf>,

    /// Design id whose saved layout is applied
    #[arg(long = "design-id", requires = "store")]
    pub design_id: Option<String>,

    /// Colour palette for connection strokes
    #[arg(long = "theme", value_enum, default_value = "classic")]
    pub theme: ThemeChoice,

    /// Pretty-print the output JSON
    #[arg(long = "pretty")]
    pub pretty: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ThemeChoice {
    Classic,
    Modern,
}

pub fn run() -> Result<()> {
    crate::logging::init(log::LevelFilter::Warn);
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let design = Design::from_json(&input).context("Failed to parse design")?;

    let overrides = match (&args.store, &args.design_id) {
        (Some(dir), Some(design_id)) => load_overrides(&FileStore::new(dir), design_id),
        _ => Overrides::new(),
    };

    let diagram = compute_diagram(&design, &overrides, &config);
    log::info!(
        "laid out {} blocks, {} connections, {} warnings",
        diagram.blocks.len(),
        diagram.paths.len(),
        diagram.warnings.len()
    );

    let theme = match args.theme {
        ThemeChoice::Classic => Theme::classic(),
        ThemeChoice::Modern => Theme::modern(),
    };
    match args.output.as_deref() {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_layout_dump(&mut writer, &diagram, &theme, args.pretty)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_layout_dump(&mut writer, &diagram, &theme, args.pretty)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn store_requires_design_id() {
        let parsed = Args::try_parse_from(["archdiag", "-i", "d.json", "--store", "layouts"]);
        assert!(parsed.is_err());
        let parsed = Args::try_parse_from([
            "archdiag",
            "-i",
            "d.json",
            "--store",
            "layouts",
            "--design-id",
            "rev-1",
        ])
        .unwrap();
        assert_eq!(parsed.design_id.as_deref(), Some("rev-1"));
    }

    #[test]
    fn reads_design_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("design.json");
        std::fs::write(&path, r#"{ "blocks": [], "connections": [] }"#).unwrap();
        let input = read_input(Some(&path)).unwrap();
        assert!(Design::from_json(&input).unwrap().blocks.is_empty());
    }
}

//! diffpage - render unified diffs as shareable HTML pages.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use diffpage::core::{resolve, DiffInput};
use diffpage::output::{preview, publish, Delivery, SystemClipboard, SystemOpener};
use diffpage::render::{render, RenderOptions};

/// Render unified diffs as self-contained HTML pages or JSON models.
#[derive(Parser, Debug)]
#[command(name = "diffpage", version, about)]
struct Cli {
    /// Diff input source (file, command, stdin)
    #[arg(short = 'i', long = "input", default_value = "command")]
    input: String,

    /// Output format (html, json)
    #[arg(short = 'f', long = "format", default_value = "html")]
    format: String,

    /// HTML layout style (line, side)
    #[arg(short = 's', long = "style", default_value = "line")]
    style: String,

    /// Intra-line matching granularity (word, char, line)
    #[arg(short = 'd', long = "diff", default_value = "word")]
    diff: String,

    /// File summary list visibility (closed, open, hidden)
    #[arg(long = "summary", default_value = "closed")]
    summary: String,

    /// Synchronised scrolling in side-by-side view (enabled, disabled)
    #[arg(long = "sync-scroll", default_value = "disabled")]
    sync_scroll: String,

    /// Custom HTML wrapper template
    #[arg(short = 't', long = "template", value_name = "PATH")]
    template: Option<PathBuf>,

    /// Exclude a path from the git diff (repeatable)
    #[arg(long = "ignore", value_name = "PATH")]
    ignore: Vec<String>,

    /// Where the document goes (preview, stdout)
    #[arg(short = 'o', long = "output", default_value = "preview")]
    output: String,

    /// Write the document to this file instead
    #[arg(short = 'F', long = "output-file", value_name = "PATH")]
    output_file: Option<PathBuf>,

    /// Publish the raw diff to diffy.org and deliver the link (browser, clipboard)
    #[arg(short = 'p', long = "publish", value_name = "MODE")]
    publish: Option<String>,

    /// Arguments passed through to `git diff`, or the input file path
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Run the pipeline: acquire the diff, then publish it or render and
/// dispatch the document.
fn run(cli: Cli) -> Result<()> {
    let source = build_input(&cli)?;
    let raw = resolve(&source)?;

    // Publishing sends the raw diff as-is; rendering is skipped entirely.
    if let Some(mode) = &cli.publish {
        let delivery = Delivery::from_name(mode).with_context(|| {
            format!("Unknown publish mode `{}` (expected browser or clipboard)", mode)
        })?;
        publish(&raw, delivery, &SystemOpener, &SystemClipboard)?;
        return Ok(());
    }

    let options = RenderOptions {
        diff: cli.diff,
        format: cli.format,
        style: cli.style,
        summary: cli.summary,
        sync_scroll: cli.sync_scroll,
        template: cli.template,
    };
    let document = render(&options, &raw)?;

    if let Some(path) = &cli.output_file {
        std::fs::write(path, &document)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    } else if cli.output == "stdout" {
        println!("{}", document);
    } else {
        preview(&document, &options.format, &SystemOpener)?;
    }

    Ok(())
}

/// Map CLI values onto a diff input source.
fn build_input(cli: &Cli) -> Result<DiffInput> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let input = DiffInput::from_cli(&cli.input, cli.args.clone(), cli.ignore.clone(), cwd)?;
    Ok(input)
}

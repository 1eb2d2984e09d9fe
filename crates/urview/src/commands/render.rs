//! Render command - load a program and write it in the chosen format.

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;
use urview_syntax::registry::{reader_for_extension, reader_for_format, writer_for_format};
use urview_syntax::{NormalizeOptions, Reader, Writer};

/// Render command arguments
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Input .urp or .xml file, use - for stdin
    pub input: PathBuf,

    /// Output format (defaults to the configured format, then text)
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Input format (required when using stdin, detected from extension otherwise)
    #[arg(long)]
    pub from: Option<SourceFormat>,

    /// Maximum nesting depth before subtrees are cut off
    #[arg(long)]
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Line-numbered listing
    Text,
    /// draw.io diagram
    Drawio,
    /// Normalized tree as JSON
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Drawio => "drawio",
            OutputFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// gzip-compressed program file
    Urp,
    /// Uncompressed program XML
    Xml,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Urp => "urp",
            SourceFormat::Xml => "xml",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick a reader from `--from`, else from the input's extension.
fn select_reader(input: &Path, from: Option<SourceFormat>) -> Result<&'static dyn Reader> {
    if let Some(format) = from {
        return reader_for_format(format.as_str())
            .with_context(|| format!("no reader available for format: {format}"));
    }
    if input.as_os_str() == "-" {
        bail!("--from is required when reading from stdin");
    }
    let extension = input.extension().and_then(|e| e.to_str()).unwrap_or("");
    reader_for_extension(extension).with_context(|| {
        format!(
            "cannot detect input format of {}. Use --from to specify it",
            input.display()
        )
    })
}

fn read_input(input: &Path) -> Result<Vec<u8>> {
    if input.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read(input).with_context(|| format!("failed to read {}", input.display()))
    }
}

/// Run the render command.
pub fn run(args: RenderArgs, format: OutputFormat, options: &NormalizeOptions) -> Result<()> {
    let reader = select_reader(&args.input, args.from)?;
    let writer = writer_for_format(format.as_str())
        .with_context(|| format!("no writer available for format: {format}"))?;

    let source = read_input(&args.input)?;
    let program = reader.read(&source, options).with_context(|| {
        format!(
            "failed to load {} as {}",
            args.input.display(),
            reader.format()
        )
    })?;
    let rendered = writer.write(&program);

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(output = %path.display(), %format, "rendered");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

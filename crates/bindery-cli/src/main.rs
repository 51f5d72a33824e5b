// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bindery: assemble ordered images and PDFs into a single PDF.
//
// Entry point. Initialises logging, turns the arguments into one build
// request, runs it and prints the report as JSON on stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use bindery_core::error::{BuildError, Result};
use bindery_core::{
    AssemblyConfig, BuildReport, BuildRequest, Item, PageFormat, default_document_name,
};
use bindery_document::Assembler;
use chrono::{DateTime, Local};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "bindery")]
#[command(version)]
#[command(about = "Assemble images and PDFs, in order, into one PDF", long_about = None)]
struct Cli {
    /// Images and PDFs, in page order
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Page layout for images: standard, native or stretch
    #[arg(short, long, default_value = "standard", env = "BINDERY_FORMAT")]
    format: PageFormat,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE", env = "BINDERY_CONFIG")]
    config: Option<PathBuf>,

    /// Output PDF (defaults to a timestamped name in the working directory)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl Cli {
    fn request(&self, now: DateTime<Local>) -> Result<BuildRequest> {
        let items = self
            .inputs
            .iter()
            .map(|path| Item::from_path(path.clone()))
            .collect::<Result<Vec<_>>>()?;

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.pdf", default_document_name(now))));

        Ok(BuildRequest::new(items, self.format, output))
    }

    fn config(&self) -> Result<AssemblyConfig> {
        match &self.config {
            Some(path) => AssemblyConfig::from_json_file(path),
            None => Ok(AssemblyConfig::default()),
        }
    }
}

fn run(cli: &Cli) -> Result<BuildReport> {
    let config = cli.config()?;
    let request = cli.request(Local::now())?;
    tracing::info!(
        items = request.items.len(),
        format = %request.format,
        output = %request.output_path.display(),
        "Bindery starting"
    );
    Assembler::new(config)?.build(&request)
}

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let outcome = run(&cli)
        .and_then(|report| serde_json::to_string_pretty(&report).map_err(BuildError::from));
    match outcome {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_core::MissingSourcePolicy;
    use chrono::TimeZone;
    use image::{Rgb, RgbImage};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("bindery").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn inputs_keep_their_order_and_kinds() {
        let cli = parse(&["scan.pdf", "photo.JPG", "notes.pdf", "-o", "out.pdf"]);
        let request = cli.request(Local::now()).unwrap();

        assert_eq!(
            request.items,
            vec![
                Item::Document("scan.pdf".into()),
                Item::Image("photo.JPG".into()),
                Item::Document("notes.pdf".into()),
            ]
        );
        assert_eq!(request.output_path, PathBuf::from("out.pdf"));
        assert_eq!(request.format, PageFormat::Standard);
    }

    #[test]
    fn format_accepts_names_and_aliases() {
        assert_eq!(parse(&["--format", "native", "a.png"]).format, PageFormat::Native);
        assert_eq!(parse(&["-f", "fill", "a.png"]).format, PageFormat::Stretch);
        assert!(Cli::try_parse_from(["bindery", "--format", "sideways", "a.png"]).is_err());
    }

    #[test]
    fn at_least_one_input_is_required() {
        assert!(Cli::try_parse_from(["bindery", "-o", "out.pdf"]).is_err());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let cli = parse(&["photo.png", "letter.docx"]);
        assert!(matches!(
            cli.request(Local::now()),
            Err(BuildError::UnsupportedSource(_))
        ));
    }

    #[test]
    fn default_output_is_timestamped() {
        let now = Local.with_ymd_and_hms(2026, 5, 1, 8, 30, 0).unwrap();
        let request = parse(&["a.png"]).request(now).unwrap();
        assert_eq!(
            request.output_path,
            PathBuf::from("Document 2026-05-01 08:30.pdf")
        );
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindery.json");
        std::fs::write(&path, r#"{ "missing_sources": "skip", "document_title": "Receipts" }"#)
            .unwrap();

        let cli = parse(&["--config", path.to_str().unwrap(), "a.png"]);
        let config = cli.config().unwrap();
        assert_eq!(config.missing_sources, MissingSourcePolicy::Skip);
        assert_eq!(config.document_title.as_deref(), Some("Receipts"));
    }

    #[test]
    fn run_builds_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("page.png");
        let out = dir.path().join("out.pdf");
        RgbImage::from_pixel(12, 16, Rgb([250, 250, 240]))
            .save(&image)
            .unwrap();

        let cli = parse(&[image.to_str().unwrap(), "-o", out.to_str().unwrap()]);
        let report = run(&cli).unwrap();

        assert_eq!(report.page_count, Some(1));
        assert!(out.exists());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["format"], "standard");
    }
}

//! Magpie CLI
//!
//! Extracts schema.org annotations (microdata and JSON-LD) from an HTML
//! document and prints them as a JSON array of items.

use std::fs;
use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;

use magpie_extract::DefaultListener;

/// Extract schema.org annotations from an HTML document.
#[derive(Debug, Parser)]
#[command(name = "magpie", version)]
struct Args {
    /// HTML file to scan, or `-` for standard input.
    input: String,

    /// Pretty-print the extracted items.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let html = if args.input == "-" {
        let mut buffer = String::new();
        let _ = std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read standard input")?;
        buffer
    } else {
        fs::read_to_string(&args.input)
            .with_context(|| format!("failed to read {}", args.input))?
    };

    let mut listener = DefaultListener::new();
    let mut parser = magpie_extract::Parser::new();
    parser.register_listener(&mut listener);
    parser.parse(&html)?;

    let items = serde_json::Value::Array(listener.items().to_vec());
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&items)?
    } else {
        serde_json::to_string(&items)?
    };
    println!("{rendered}");
    eprintln!(
        "{} {} top-level items, {} itemtypes",
        "extracted".green(),
        listener.items().len(),
        listener.total_itemtypes()
    );
    Ok(())
}

//! Explore ZIP archives as a package tree.
//!
//! This example demonstrates the synchronous pipeline:
//! - Reading archive buffers from disk
//! - Decoding them with per-package failure isolation
//! - Walking the projected tree through the explorer
//! - Reading a selected file's content
//!
//! # Usage
//!
//! ```bash
//! cargo run --example explore_zip -- alpha.zip beta.zip
//! ```

use std::env;
use std::path::Path;

use paktree::{ContentView, DecodeLimits, DisplayFormat, Explorer, PackageBuffer, Result};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <archive.zip> [archive2.zip...]", args[0]);
        eprintln!();
        eprintln!("Decodes the archives and prints their combined package tree.");
        eprintln!("Each archive becomes one package, named after its file stem.");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} package.zip", args[0]);
        eprintln!("  {} alpha.zip beta.zip", args[0]);
        std::process::exit(1);
    }

    // Read each archive into a named buffer
    let mut buffers = Vec::new();
    for arg in &args[1..] {
        let name = Path::new(arg)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| arg.clone());
        let bytes = std::fs::read(arg)?;
        println!("Read {} ({} bytes) as package '{}'", arg, bytes.len(), name);
        buffers.push(PackageBuffer::new(name, bytes));
    }
    println!();

    let mut explorer = Explorer::new();
    explorer.load(&buffers, &DecodeLimits::default());

    for failure in explorer.decode_failures() {
        eprintln!("warning: {}", failure);
    }

    // Expand every directory so the full tree prints
    loop {
        let collapsed: Vec<String> = explorer
            .visible_rows()
            .iter()
            .filter(|row| row.is_directory && !row.expanded)
            .map(|row| row.path.clone())
            .collect();
        if collapsed.is_empty() {
            break;
        }
        for path in collapsed {
            explorer.click(&path);
        }
    }

    let rows = explorer.visible_rows();
    let mut first_markdown = None;
    for row in &rows {
        let marker = if row.is_directory { "/" } else { "" };
        println!("{}{}{}", "  ".repeat(row.depth), row.name, marker);
        if first_markdown.is_none()
            && !row.is_directory
            && DisplayFormat::from_path(&row.path) == DisplayFormat::Markup
        {
            first_markdown = Some(row.path.clone());
        }
    }
    println!();
    println!("{} rows across {} packages", rows.len(), explorer.forest().len());

    // Show the first markdown file, the way a browser pane would
    if let Some(path) = first_markdown {
        explorer.click(&path);
        if let ContentView::File { path, text, .. } = explorer.current_content() {
            println!();
            println!("--- {} ---", path);
            println!("{}", text);
        }
    }

    Ok(())
}

use anyhow::{Context, Result};
use std::path::PathBuf;

use zmes::parameters::Parameter;
use zmes::reader::ExportReader;

#[cfg(feature = "colorized_output")]
fn heading(text: &str) -> String {
    console::style(text).bold().cyan().to_string()
}

#[cfg(not(feature = "colorized_output"))]
fn heading(text: &str) -> String {
    text.to_string()
}

#[cfg(feature = "colorized_output")]
fn name(text: &str) -> String {
    console::style(text).green().to_string()
}

#[cfg(not(feature = "colorized_output"))]
fn name(text: &str) -> String {
    text.to_string()
}

/// Display information about an export file
pub fn run(file: PathBuf, tree: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let export = ExportReader::new()
        .read_path(&file)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    println!("{}", heading("Export File Information"));
    println!("{}", heading("======================="));
    println!("File: {}", file.display());
    println!("Schema version: {}", export.schema_version);
    println!();

    if !export.metadata.is_empty() {
        println!("{}", heading("Metadata:"));
        for (key, value) in &export.metadata {
            println!("  {}: {}", key, value);
        }
        println!();
    }

    println!("{} {}", heading("Records:"), export.len());
    for record in &export.records {
        let group = record.group.name.as_deref().unwrap_or(&record.group.guid);
        println!(
            "  {:4}. {} [{}] {} parameters, created {}",
            record.id,
            record.guid,
            group,
            record.parameters.len(),
            record.created_at
        );
        if tree {
            print_tree(&record.parameters, 3);
        }
    }

    Ok(())
}

fn print_tree(parameter: &Parameter, depth: usize) {
    let indent = "  ".repeat(depth);
    match &parameter.value {
        Some(value) => println!("{}{}: {}", indent, name(&parameter.name), value),
        None => println!("{}{}", indent, name(&parameter.name)),
    }
    for child in &parameter.children {
        print_tree(child, depth + 1);
    }
}

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use zmes::projection::Projector;
use zmes::reader::{ExportReader, ReaderConfig};

use super::Config;

/// Convert an export file to JSON
pub fn run(
    input: PathBuf,
    output: Option<PathBuf>,
    measurements: bool,
    pretty: bool,
    skip_blobs: bool,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = Config::load(config.as_deref())?;
    let measurements = measurements || config.output.measurements.unwrap_or(false);
    let pretty = pretty || config.output.pretty.unwrap_or(false);
    let skip_blobs = skip_blobs || config.output.skip_blobs.unwrap_or(false);

    if !input.exists() {
        anyhow::bail!("File does not exist: {}", input.display());
    }

    let mut reader_config = ReaderConfig::default();
    if skip_blobs {
        if measurements {
            warn!("Array blobs are skipped; no record can be projected");
        }
        reader_config = reader_config.without_blobs();
    }

    let file = ExportReader::with_config(reader_config)
        .read_path(&input)
        .with_context(|| format!("Failed to parse {}", input.display()))?;

    let writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);

    if measurements {
        let projector =
            Projector::new(config.projection_table()).context("Invalid projection table")?;
        #[cfg(feature = "parallel")]
        let projected = projector.project_par(&file);
        #[cfg(not(feature = "parallel"))]
        let projected = projector.project(&file);

        info!(
            "Writing {} measurements from {} records",
            projected.len(),
            file.len()
        );
        write_json(&mut writer, &projected, pretty)?;
    } else {
        info!("Writing {} records", file.len());
        write_json(&mut writer, &file, pretty)?;
    }

    writeln!(writer)?;
    writer.flush().context("Failed to flush output")?;

    if let Some(path) = output {
        info!("Wrote {}", path.display());
    }
    Ok(())
}

fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(writer, value)
    } else {
        serde_json::to_writer(writer, value)
    }
    .context("Failed to write JSON")
}

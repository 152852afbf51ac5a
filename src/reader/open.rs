use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use crate::parameters::{SchemaError, TreeCache, TypeRegistry};
use crate::schema::{columns, queries, tables};
use crate::store::{QuerySource, SourceGuard, SqliteSource};

use super::{ExportFile, ExportReader, ReaderError, Record, RecordGroup, RecordRow};

impl ExportReader {
    /// Read and parse an export file from disk
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<ExportFile, ReaderError> {
        let path = path.as_ref();
        log::info!("Reading {}", path.display());
        let bytes = std::fs::read(path)?;
        self.parse_bytes(&bytes)
    }

    /// Parse an export file held in memory
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<ExportFile, ReaderError> {
        let source = SqliteSource::from_bytes(bytes)?;
        self.parse_source(source)
    }

    /// Parse from any query source
    ///
    /// The source is closed exactly once before this returns, whether the
    /// parse succeeded or not.
    pub fn parse_source<S: QuerySource>(&self, source: S) -> Result<ExportFile, ReaderError> {
        SourceGuard::run(source, |source| self.load(source))
    }

    fn load<S: QuerySource + ?Sized>(&self, source: &mut S) -> Result<ExportFile, ReaderError> {
        let schema_version = source
            .select_scalar(queries::SCHEMA_VERSION)
            .map_err(SchemaError::table(tables::SCHEMA_INFO))?
            .and_then(|v| v.to_text())
            .unwrap_or_else(|| {
                log::warn!("Export file has no schema version");
                String::new()
            });

        let metadata = load_metadata(source)?;
        let registry = TypeRegistry::load(source)?;
        let record_rows = load_record_rows(source)?;

        let extractor = self.config.extractor();
        let mut trees = TreeCache::new();
        let mut groups: HashMap<i64, Arc<RecordGroup>> = HashMap::new();
        let mut records = Vec::with_capacity(record_rows.len());

        for row in record_rows {
            let tree = trees.get_or_build(source, &registry, row.root_type_id)?;
            let parameters = extractor.attach_values(source, row.id, &tree)?;
            let group = Arc::clone(
                groups
                    .entry(row.group.id)
                    .or_insert_with(|| Arc::new(row.group.clone())),
            );
            log::debug!("Assembled record {} ({} parameters)", row.id, parameters.len());
            records.push(Record::assemble(row, group, parameters));
        }

        log::info!(
            "Parsed {} records ({} tree shapes, {} parameter types, schema version {})",
            records.len(),
            trees.len(),
            registry.len(),
            schema_version
        );

        Ok(ExportFile {
            schema_version,
            metadata,
            records,
        })
    }
}

fn load_metadata<S: QuerySource + ?Sized>(
    source: &mut S,
) -> Result<BTreeMap<String, String>, SchemaError> {
    let rows = source
        .select_all(queries::FILE_METADATA, &[])
        .map_err(SchemaError::table(tables::FILE_METADATA))?;

    let mut metadata = BTreeMap::new();
    for row in &rows {
        let key = row
            .get_string(columns::KEY)
            .map_err(SchemaError::table(tables::FILE_METADATA))?;
        let value = row
            .get_string(columns::VALUE)
            .map_err(SchemaError::table(tables::FILE_METADATA))?;
        if let Some(key) = key {
            metadata.insert(key, value.unwrap_or_default());
        }
    }
    Ok(metadata)
}

fn load_record_rows<S: QuerySource + ?Sized>(source: &mut S) -> Result<Vec<RecordRow>, SchemaError> {
    let rows = source
        .select_all(queries::RECORDS, &[])
        .map_err(SchemaError::table(tables::RECORD))?;
    rows.iter()
        .map(RecordRow::from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(SchemaError::table(tables::RECORD))
}

//! # Measurement Projection
//!
//! Maps parsed records onto the instrument-independent [`Measurement`] schema.
//! Which parameters feed which variables, metadata entries and settings is
//! decided entirely by a [`ProjectionTable`]. The default table covers DLS
//! particle size distributions.
//!
//! Projection is best-effort per record. A record missing any required array
//! (by default the size classes and the intensity distribution) is left out
//! with a warning; everything else that is absent or has the wrong type is
//! simply omitted from the measurement.
//!
//! ```rust,no_run
//! use zmes::prelude::*;
//!
//! let file = ExportFile::open("measurement.zmes")?;
//! for measurement in project(&file) {
//!     let sizes = measurement.variable("d").map(|v| v.len()).unwrap_or(0);
//!     println!("{}: {} size classes", measurement.title, sizes);
//! }
//! # Ok::<(), zmes::reader::ReaderError>(())
//! ```

mod descriptors;
mod error;
mod measurement;


pub use descriptors::{
    dls, MetaField, ProjectionTable, SearchScope, SettingField, SettingKind, VariableDescriptor,
};
pub use error::ProjectionError;
pub use measurement::{Measurement, Setting, SettingValue, Variable};

use std::collections::BTreeMap;

use crate::parameters::{Parameter, ParameterValue};
use crate::reader::{ExportFile, Record};

/// Project every eligible record with the default table
pub fn project(file: &ExportFile) -> Vec<Measurement> {
    Projector::default().project(file)
}

/// Applies a projection table to records
#[derive(Debug, Clone, Default)]
pub struct Projector {
    table: ProjectionTable,
}

impl Projector {
    /// Projector for a validated table
    pub fn new(table: ProjectionTable) -> Result<Self, ProjectionError> {
        table.validate()?;
        Ok(Self { table })
    }

    /// Active table
    pub fn table(&self) -> &ProjectionTable {
        &self.table
    }

    /// Project every eligible record, in record order
    pub fn project(&self, file: &ExportFile) -> Vec<Measurement> {
        let measurements: Vec<_> = file
            .records
            .iter()
            .filter_map(|record| self.project_record(record))
            .collect();
        log::info!(
            "Projected {} of {} records",
            measurements.len(),
            file.records.len()
        );
        measurements
    }

    /// Project every eligible record using the rayon thread pool
    ///
    /// Produces the same measurements, in the same order, as [`Projector::project`].
    #[cfg(feature = "parallel")]
    pub fn project_par(&self, file: &ExportFile) -> Vec<Measurement> {
        use rayon::prelude::*;

        let measurements: Vec<_> = file
            .records
            .par_iter()
            .filter_map(|record| self.project_record(record))
            .collect();
        log::info!(
            "Projected {} of {} records",
            measurements.len(),
            file.records.len()
        );
        measurements
    }

    /// Project one record, or `None` if a required array is missing
    pub fn project_record(&self, record: &Record) -> Option<Measurement> {
        let root = &record.parameters;

        let mut variables = BTreeMap::new();
        for descriptor in &self.table.variables {
            match find_array(root, &descriptor.name) {
                Some(data) => {
                    variables.insert(
                        descriptor.symbol.clone(),
                        Variable {
                            label: descriptor.label.clone(),
                            units: descriptor.units.clone(),
                            data: data.to_vec(),
                            is_dependent: descriptor.dependent,
                        },
                    );
                }
                None if descriptor.required => {
                    log::warn!(
                        "Skipping record {}: no '{}' array",
                        record.id,
                        descriptor.name
                    );
                    return None;
                }
                None => {}
            }
        }
        self.check_lengths(record, &variables);

        let meta = self.collect_meta(root);
        let settings = self.collect_settings(root);

        let title = self
            .table
            .title_key
            .as_ref()
            .and_then(|key| meta.get(key))
            .cloned()
            .unwrap_or_else(|| format!("Record {}", record.id));

        Some(Measurement {
            id: record.guid.clone(),
            title,
            data_type: self.table.data_type.clone(),
            meta,
            settings,
            variables,
        })
    }

    fn check_lengths(&self, record: &Record, variables: &BTreeMap<String, Variable>) {
        let Some(independent) = self.table.independent() else {
            return;
        };
        let Some(expected) = variables.get(&independent.symbol).map(Variable::len) else {
            return;
        };
        for (symbol, variable) in variables {
            if variable.is_dependent && variable.len() != expected {
                log::warn!(
                    "Record {}: '{}' has {} points, '{}' has {}",
                    record.id,
                    symbol,
                    variable.len(),
                    independent.symbol,
                    expected
                );
            }
        }
    }

    fn collect_meta(&self, root: &Parameter) -> BTreeMap<String, String> {
        let mut meta = BTreeMap::new();
        for field in &self.table.meta {
            let found = match field.scope {
                SearchScope::Shallow => root.find_child(&field.name),
                SearchScope::Deep => root.find(&field.name),
            };
            let text = match found.and_then(|p| p.value.as_ref()) {
                Some(ParameterValue::Text(s)) => s.clone(),
                Some(ParameterValue::Array(_)) | None => continue,
                Some(scalar) => scalar.to_string(),
            };
            meta.insert(field.key.clone(), text);
        }
        meta
    }

    fn collect_settings(&self, root: &Parameter) -> BTreeMap<String, Setting> {
        let mut settings = BTreeMap::new();
        for field in &self.table.settings {
            let Some(value) = root.find(&field.name).and_then(|p| p.value.as_ref()) else {
                continue;
            };
            let value = match (field.kind, value) {
                (SettingKind::Numeric, ParameterValue::Integer(v)) => SettingValue::Number(*v as f64),
                (SettingKind::Numeric, ParameterValue::Real(v)) => SettingValue::Number(*v),
                (SettingKind::Text, ParameterValue::Text(s)) => SettingValue::Text(s.clone()),
                (kind, other) => {
                    log::debug!(
                        "Ignoring setting '{}': expected {:?}, found {}",
                        field.name,
                        kind,
                        other.kind()
                    );
                    continue;
                }
            };
            settings.insert(
                field.key.clone(),
                Setting {
                    value,
                    units: field.units.clone(),
                },
            );
        }
        settings
    }
}

fn find_array<'a>(root: &'a Parameter, name: &str) -> Option<&'a [f64]> {
    root.find(name)
        .and_then(|p| p.value.as_ref())
        .and_then(ParameterValue::as_array)
}

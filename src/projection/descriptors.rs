//! Descriptor tables binding parameter names to the measurement schema
//!
//! The tables are plain data. Supporting another instrument field means adding
//! a row here, or in a TOML table passed to [`ProjectionTable::from_toml_str`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ProjectionError;

/// Parameter names written by the DLS size-distribution software
pub mod dls {
    #![allow(missing_docs)]

    // Variables
    pub const SIZES: &str = "Sizes";
    pub const INTENSITY_DISTRIBUTION: &str = "Intensity Distribution";
    pub const VOLUME_DISTRIBUTION: &str = "Volume Distribution";
    pub const NUMBER_DISTRIBUTION: &str = "Number Distribution";

    // Metadata
    pub const SAMPLE_NAME: &str = "Sample Name";
    pub const MEASUREMENT_TYPE: &str = "Measurement Type";
    pub const MEASUREMENT_START: &str = "Measurement Start Date And Time";
    pub const OPERATOR_NAME: &str = "Operator Name";
    pub const INSTRUMENT_SERIAL: &str = "Instrument Serial Number";
    pub const SOFTWARE_VERSION: &str = "Software Version";
    pub const CELL_DESCRIPTION: &str = "Cell Description";
    pub const MATERIAL_NAME: &str = "Material Name";
    pub const DISPERSANT_NAME: &str = "Dispersant Name";

    // Settings
    pub const TEMPERATURE: &str = "Temperature";
    pub const EQUILIBRATION_TIME: &str = "Equilibration Time";
    pub const NUMBER_OF_RUNS: &str = "Number Of Runs";
    pub const RUN_DURATION: &str = "Run Duration";
    pub const DETECTOR_ANGLE: &str = "Detector Angle";
    pub const LASER_WAVELENGTH: &str = "Laser Wavelength";
    pub const ATTENUATOR: &str = "Attenuator";
    pub const MEASUREMENT_POSITION: &str = "Measurement Position";
    pub const DISPERSANT_VISCOSITY: &str = "Dispersant Viscosity";
    pub const DISPERSANT_REFRACTIVE_INDEX: &str = "Dispersant Refractive Index";
    pub const MATERIAL_REFRACTIVE_INDEX: &str = "Material Refractive Index";
    pub const MATERIAL_ABSORPTION: &str = "Material Absorption";
    pub const Z_AVERAGE: &str = "Z-Average";
    pub const POLYDISPERSITY_INDEX: &str = "Polydispersity Index";
    pub const ANALYSIS_MODEL: &str = "Analysis Model";
}

/// Binds an array parameter to a measurement variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    /// Parameter name searched for (deep search)
    pub name: String,
    /// Key of the variable in the measurement
    pub symbol: String,
    /// Axis label
    pub label: String,
    /// Units of the data
    pub units: String,
    /// Plotted against the independent variable
    pub dependent: bool,
    /// Records lacking this array are not projected
    #[serde(default)]
    pub required: bool,
}

impl VariableDescriptor {
    fn new(name: &str, symbol: &str, label: &str, units: &str, dependent: bool, required: bool) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            label: label.to_string(),
            units: units.to_string(),
            dependent,
            required,
        }
    }
}

/// Where a field is searched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    /// Immediate children of the record root only
    Shallow,
    /// Whole tree, pre-order, first match
    #[default]
    Deep,
}

/// Binds a parameter to a metadata entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaField {
    /// Parameter name searched for
    pub name: String,
    /// Key in the measurement metadata
    pub key: String,
    /// Search scope
    #[serde(default)]
    pub scope: SearchScope,
}

/// Accepted value type of a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingKind {
    /// Integer or real values only
    #[default]
    Numeric,
    /// Text values only
    Text,
}

/// Binds a parameter to an instrument setting (always searched deep)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingField {
    /// Parameter name searched for
    pub name: String,
    /// Key in the measurement settings
    pub key: String,
    /// Units of the value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    /// Accepted value type
    #[serde(default)]
    pub kind: SettingKind,
}

impl SettingField {
    fn numeric(name: &str, key: &str, units: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            key: key.to_string(),
            units: units.map(str::to_string),
            kind: SettingKind::Numeric,
        }
    }

    fn text(name: &str, key: &str) -> Self {
        Self {
            name: name.to_string(),
            key: key.to_string(),
            units: None,
            kind: SettingKind::Text,
        }
    }
}

/// The complete set of descriptor tables for one measurement kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionTable {
    /// Data type recorded on every measurement
    pub data_type: String,
    /// Metadata key whose value becomes the measurement title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_key: Option<String>,
    /// Variable descriptors
    pub variables: Vec<VariableDescriptor>,
    /// Metadata fields
    #[serde(default)]
    pub meta: Vec<MetaField>,
    /// Settings fields
    #[serde(default)]
    pub settings: Vec<SettingField>,
}

impl Default for ProjectionTable {
    /// DLS particle size distribution
    fn default() -> Self {
        use dls::*;

        let meta = |name: &str, key: &str, scope: SearchScope| MetaField {
            name: name.to_string(),
            key: key.to_string(),
            scope,
        };

        Self {
            data_type: "particle size distribution".to_string(),
            title_key: Some("sample_name".to_string()),
            variables: vec![
                VariableDescriptor::new(SIZES, "d", "Hydrodynamic Diameter", "nm", false, true),
                VariableDescriptor::new(INTENSITY_DISTRIBUTION, "intensity", "Intensity", "%", true, true),
                VariableDescriptor::new(VOLUME_DISTRIBUTION, "volume", "Volume", "%", true, false),
                VariableDescriptor::new(NUMBER_DISTRIBUTION, "number", "Number", "%", true, false),
            ],
            meta: vec![
                meta(SAMPLE_NAME, "sample_name", SearchScope::Shallow),
                meta(MEASUREMENT_TYPE, "measurement_type", SearchScope::Shallow),
                meta(MEASUREMENT_START, "measured_at", SearchScope::Deep),
                meta(OPERATOR_NAME, "operator", SearchScope::Deep),
                meta(INSTRUMENT_SERIAL, "instrument_serial", SearchScope::Deep),
                meta(SOFTWARE_VERSION, "software_version", SearchScope::Deep),
                meta(CELL_DESCRIPTION, "cell", SearchScope::Deep),
                meta(MATERIAL_NAME, "material", SearchScope::Deep),
                meta(DISPERSANT_NAME, "dispersant", SearchScope::Deep),
            ],
            settings: vec![
                SettingField::numeric(TEMPERATURE, "temperature", Some("°C")),
                SettingField::numeric(EQUILIBRATION_TIME, "equilibration_time", Some("s")),
                SettingField::numeric(NUMBER_OF_RUNS, "number_of_runs", None),
                SettingField::numeric(RUN_DURATION, "run_duration", Some("s")),
                SettingField::numeric(DETECTOR_ANGLE, "detector_angle", Some("°")),
                SettingField::numeric(LASER_WAVELENGTH, "laser_wavelength", Some("nm")),
                SettingField::numeric(ATTENUATOR, "attenuator", None),
                SettingField::numeric(MEASUREMENT_POSITION, "measurement_position", Some("mm")),
                SettingField::numeric(DISPERSANT_VISCOSITY, "dispersant_viscosity", Some("mPa·s")),
                SettingField::numeric(DISPERSANT_REFRACTIVE_INDEX, "dispersant_refractive_index", None),
                SettingField::numeric(MATERIAL_REFRACTIVE_INDEX, "material_refractive_index", None),
                SettingField::numeric(MATERIAL_ABSORPTION, "material_absorption", None),
                SettingField::numeric(Z_AVERAGE, "z_average", Some("nm")),
                SettingField::numeric(POLYDISPERSITY_INDEX, "polydispersity_index", None),
                SettingField::text(ANALYSIS_MODEL, "analysis_model"),
            ],
        }
    }
}

impl ProjectionTable {
    /// Parse and validate a table from TOML
    pub fn from_toml_str(content: &str) -> Result<Self, ProjectionError> {
        let table: Self = toml::from_str(content)?;
        table.validate()?;
        Ok(table)
    }

    /// Load and validate a table from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ProjectionError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Render the table as TOML
    pub fn to_toml(&self) -> Result<String, ProjectionError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The independent variable descriptor
    pub fn independent(&self) -> Option<&VariableDescriptor> {
        self.variables.iter().find(|v| !v.dependent)
    }

    /// Check that the table has one required independent variable, at least
    /// one required dependent variable, and unique variable symbols
    pub fn validate(&self) -> Result<(), ProjectionError> {
        let independents: Vec<_> = self.variables.iter().filter(|v| !v.dependent).collect();
        match independents.as_slice() {
            [single] if single.required => {}
            [single] => {
                return Err(ProjectionError::InvalidTable(format!(
                    "independent variable '{}' must be required",
                    single.name
                )))
            }
            other => {
                return Err(ProjectionError::InvalidTable(format!(
                    "expected exactly one independent variable, found {}",
                    other.len()
                )))
            }
        }

        if !self.variables.iter().any(|v| v.dependent && v.required) {
            return Err(ProjectionError::InvalidTable(
                "no required dependent variable".to_string(),
            ));
        }

        let mut symbols: Vec<_> = self.variables.iter().map(|v| v.symbol.as_str()).collect();
        symbols.sort_unstable();
        if let Some(pair) = symbols.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ProjectionError::InvalidTable(format!(
                "duplicate variable symbol '{}'",
                pair[0]
            )));
        }
        Ok(())
    }
}

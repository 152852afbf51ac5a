use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One array-valued variable of a measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Axis label
    pub label: String,
    /// Units of the data
    pub units: String,
    /// Data points
    pub data: Vec<f64>,
    /// Plotted against the independent variable
    pub is_dependent: bool,
}

impl Variable {
    /// Number of data points
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the variable has no data points
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Value of an instrument setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Numeric setting
    Number(f64),
    /// Text setting
    Text(String),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Number(v) => write!(f, "{v}"),
            SettingValue::Text(s) => f.write_str(s),
        }
    }
}

/// An instrument setting with optional units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    /// Value
    pub value: SettingValue,
    /// Units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl Setting {
    /// Numeric value, if this is a numeric setting
    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            SettingValue::Number(v) => Some(v),
            SettingValue::Text(_) => None,
        }
    }

    /// Text value, if this is a text setting
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            SettingValue::Text(s) => Some(s),
            SettingValue::Number(_) => None,
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.units {
            Some(units) => write!(f, "{} {}", self.value, units),
            None => write!(f, "{}", self.value),
        }
    }
}

/// Instrument-independent view of one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Record guid
    pub id: String,
    /// Display title
    pub title: String,
    /// Kind of measurement
    pub data_type: String,
    /// Descriptive metadata
    pub meta: BTreeMap<String, String>,
    /// Instrument settings
    pub settings: BTreeMap<String, Setting>,
    /// Variables keyed by symbol
    pub variables: BTreeMap<String, Variable>,
}

impl Measurement {
    /// Look up a variable by symbol
    pub fn variable(&self, symbol: &str) -> Option<&Variable> {
        self.variables.get(symbol)
    }

    /// The independent variable
    pub fn independent(&self) -> Option<(&str, &Variable)> {
        self.variables
            .iter()
            .find(|(_, v)| !v.is_dependent)
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Dependent variables in symbol order
    pub fn dependents(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.variables
            .iter()
            .filter(|(_, v)| v.is_dependent)
            .map(|(k, v)| (k.as_str(), v))
    }
}

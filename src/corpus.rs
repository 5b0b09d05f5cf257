//! Country corpus loading: SPARQL JSON results, CSV and spreadsheet tables

#[cfg(feature = "python")]
use pyo3::prelude::*;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::{Error, Result};
use crate::extract::Gazetteer;

/// A country and its abstract text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub abstract_text: String,
}

/// Column-oriented string table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| r.get(idx).map(String::as_str).unwrap_or("")).collect())
    }

    /// Interpret the table as countries, detecting the name and abstract columns
    pub fn into_countries(self) -> Result<Vec<Country>> {
        let mapping = detect_columns(&self.columns)?;
        Ok(self
            .rows
            .iter()
            .filter_map(|row| country_from_row(&mapping, |i| row.get(i).map(String::as_str)))
            .collect())
    }
}

/// Convert a SPARQL JSON result document (`head.vars`, `results.bindings`) to a table.
///
/// A variable unbound in a row becomes an empty string.
pub fn sparql_to_table(results: &Value) -> Result<Table> {
    let columns: Vec<String> = results
        .pointer("/head/vars")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Sparql("missing head.vars".to_string()))?
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| Error::Sparql(format!("variable name is not a string: {}", v)))
        })
        .collect::<Result<_>>()?;

    let bindings = results
        .pointer("/results/bindings")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Sparql("missing results.bindings".to_string()))?;

    let rows: Vec<Vec<String>> = bindings
        .iter()
        .map(|binding| {
            columns
                .iter()
                .map(|var| {
                    binding
                        .get(var)
                        .and_then(|cell| cell.get("value"))
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                })
                .collect::<Vec<String>>()
        })
        .collect();

    Ok(Table { columns, rows })
}

pub fn sparql_json_to_table(json: &str) -> Result<Table> {
    let value: Value = serde_json::from_str(json)?;
    sparql_to_table(&value)
}

/// Column index mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub name: usize,
    pub abstract_text: usize,
}

/// Detect column indices from header names
fn detect_columns(headers: &[String]) -> Result<ColumnMapping> {
    let mut name = None;
    let mut abstract_text = None;

    for (i, header) in headers.iter().enumerate() {
        match header.to_lowercase().trim() {
            "country_name" | "country" | "name" => name = name.or(Some(i)),
            "country_abstract" | "abstract" | "text" | "description" => {
                abstract_text = abstract_text.or(Some(i))
            }
            _ => {} // Unknown columns ignored
        }
    }

    Ok(ColumnMapping {
        name: name.ok_or_else(|| Error::MissingColumn("country_name".to_string()))?,
        abstract_text: abstract_text.ok_or_else(|| Error::MissingColumn("country_abstract".to_string()))?,
    })
}

fn country_from_row<'r>(
    mapping: &ColumnMapping,
    cell: impl Fn(usize) -> Option<&'r str>,
) -> Option<Country> {
    let name = cell(mapping.name).unwrap_or("").trim();
    let abstract_text = cell(mapping.abstract_text).unwrap_or("").trim();
    if name.is_empty() || abstract_text.is_empty() {
        return None;
    }
    Some(Country {
        name: name.to_string(),
        abstract_text: abstract_text.to_string(),
    })
}

/// Parse a country file (CSV or spreadsheet)
pub fn parse_file<P: AsRef<Path>>(file_path: P) -> Result<Vec<Country>> {
    let path = file_path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let countries = match extension.as_str() {
        "xlsx" | "xls" | "xlsm" | "ods" => parse_spreadsheet(path)?,
        "csv" => parse_csv(path)?,
        _ => return Err(Error::UnsupportedFormat(extension)),
    };

    tracing::info!(path = %path.display(), countries = countries.len(), "country corpus loaded");
    Ok(countries)
}

/// Parse the first sheet of a spreadsheet
pub fn parse_spreadsheet<P: AsRef<Path>>(file_path: P) -> Result<Vec<Country>> {
    let mut workbook = open_workbook_auto(file_path)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| Error::MissingColumn("no sheets found in spreadsheet".to_string()))?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| Error::MissingColumn("empty sheet, no header row".to_string()))?;
    let headers: Vec<String> = header_row.iter().map(get_cell_string).collect();
    let mapping = detect_columns(&headers)?;

    let mut countries = Vec::new();
    for row in rows {
        let cells: Vec<String> = row.iter().map(get_cell_string).collect();
        if let Some(country) = country_from_row(&mapping, |i| cells.get(i).map(String::as_str)) {
            countries.push(country);
        }
    }
    Ok(countries)
}

/// Parse a CSV file with a header row
pub fn parse_csv<P: AsRef<Path>>(file_path: P) -> Result<Vec<Country>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(file_path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
    let mapping = detect_columns(&headers)?;

    let mut countries = Vec::new();
    for result in reader.records() {
        let record = result?;
        if let Some(country) = country_from_row(&mapping, |i| record.get(i)) {
            countries.push(country);
        }
    }
    Ok(countries)
}

/// Helper to extract string from a spreadsheet cell
fn get_cell_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
        Data::Empty => String::new(),
    }
}

/// A uniformly random country, `None` for an empty corpus
pub fn random_country<'c, R: Rng + ?Sized>(countries: &'c [Country], rng: &mut R) -> Option<&'c Country> {
    countries.choose(rng)
}

/// Register every country name as a `GPE` entity
pub fn extend_gazetteer(gazetteer: &mut Gazetteer, countries: &[Country]) {
    for country in countries {
        gazetteer.insert(country.name.as_str(), "GPE");
    }
}

// ============= Python Bindings =============

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "load_countries")]
pub fn py_load_countries(file_path: &str) -> PyResult<Vec<(String, String)>> {
    let countries = parse_file(file_path)?;
    Ok(countries.into_iter().map(|c| (c.name, c.abstract_text)).collect())
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "random_country")]
pub fn py_random_country(file_path: &str) -> PyResult<Option<(String, String)>> {
    let countries = parse_file(file_path)?;
    let mut rng = rand::thread_rng();
    Ok(random_country(&countries, &mut rng).map(|c| (c.name.clone(), c.abstract_text.clone())))
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "sparql_to_table")]
pub fn py_sparql_to_table(json: &str) -> PyResult<(Vec<String>, Vec<Vec<String>>)> {
    let table = sparql_json_to_table(json)?;
    Ok((table.columns, table.rows))
}

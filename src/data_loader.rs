// src/data_loader.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::LoadError;
use crate::model::{Customer, CustomerId, VipSet};


pub trait DataLoader {
    fn load(&self, path: &Path) -> Result<Vec<Customer>, LoadError>;
}


pub struct JsonLoader;

impl DataLoader for JsonLoader {
    fn load(&self, path: &Path) -> Result<Vec<Customer>, LoadError> {
        let reader = BufReader::new(File::open(path)?);
        let customers: Vec<Customer> = serde_json::from_reader(reader)?;
        Ok(customers)
    }
}


/// Reads Python pickles made of builtin types (lists, dicts, str, int, float,
/// bool, None). Pickled class instances such as `datetime` are rejected.
pub struct PickleLoader;

impl DataLoader for PickleLoader {
    fn load(&self, path: &Path) -> Result<Vec<Customer>, LoadError> {
        let reader = BufReader::new(File::open(path)?);
        let customers: Vec<Customer> =
            serde_pickle::from_reader(reader, serde_pickle::DeOptions::new())?;
        Ok(customers)
    }
}


pub fn get_loader(extension: &str) -> Result<Box<dyn DataLoader>, LoadError> {
    match extension.to_lowercase().as_str() {
        "json" => Ok(Box::new(JsonLoader)),
        "pkl" | "pickle" => Ok(Box::new(PickleLoader)),

        _ => Err(LoadError::UnsupportedFormat(extension.to_string())),
    }
}

/// Picks the loader from an explicit format name, falling back to the file
/// extension.
pub fn loader_for(path: &Path, format: Option<&str>) -> Result<Box<dyn DataLoader>, LoadError> {
    let extension = match format {
        Some(fmt) => fmt.to_string(),
        None => path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_string(),
    };
    get_loader(&extension)
}


/// Reads one customer id per line. Blank lines are skipped.
pub fn load_vip_ids(path: &Path) -> Result<VipSet, LoadError> {
    let reader = BufReader::new(File::open(path)?);
    let mut ids = Vec::new();
    for line in reader.lines() {
        let line = line?;
        match CustomerId::parse(&line) {
            Some(id) => ids.push(id),
            None => debug!(path = %path.display(), "Skipping blank VIP line"),
        }
    }
    Ok(ids.into_iter().collect())
}

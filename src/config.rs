// src/config.rs

//! Job configuration. Every field has a default, so an absent config file
//! means "run on the standard file names in the working directory".

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::flatten::VipPolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Serialized customer/order collection
    #[serde(default = "default_orders_path")]
    pub orders_path: PathBuf,

    /// Plain-text VIP list, one customer id per line
    #[serde(default = "default_vip_path")]
    pub vip_path: PathBuf,

    /// Loader format (`json`, `pkl`). Taken from the extension when unset.
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            orders_path: default_orders_path(),
            vip_path: default_vip_path(),
            format: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    #[serde(default)]
    pub vip_policy: VipPolicy,

    /// Log a data-quality report after flattening
    #[serde(default = "default_true")]
    pub validate: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            vip_policy: VipPolicy::default(),
            validate: true,
        }
    }
}

impl Config {
    /// Load configuration from a YAML or JSON file, chosen by extension.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let config: Config = match ext {
            "json" => serde_json::from_str(&contents)?,
            _ => serde_yaml::from_str(&contents)?,
        };
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, path) in [
            ("input.orders_path", &self.input.orders_path),
            ("input.vip_path", &self.input.vip_path),
            ("output.path", &self.output.path),
        ] {
            if path.as_os_str().is_empty() {
                anyhow::bail!("{} must not be empty", name);
            }
        }
        if self.output.path == self.input.orders_path || self.output.path == self.input.vip_path {
            anyhow::bail!(
                "output.path {} would overwrite an input file",
                self.output.path.display()
            );
        }
        Ok(())
    }
}

fn default_orders_path() -> PathBuf { PathBuf::from("customer_orders.pkl") }
fn default_vip_path() -> PathBuf { PathBuf::from("vip_customers.txt") }
fn default_output_path() -> PathBuf { PathBuf::from("final_customer_orders.csv") }
fn default_true() -> bool { true }

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// GeoJSON FeatureCollection or shapefile of region polygons.
    pub regions: PathBuf,
    #[serde(default = "default_name_property")]
    pub region_name_property: String,
    /// CSV with `region,population_millions,area_km2`; the built-in UK
    /// table is used when absent.
    pub facts_csv: Option<PathBuf>,
    /// Brand display name -> point GeoJSON file.
    #[serde(default)]
    pub brands: BTreeMap<String, PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: None,
        }
    }
}

fn default_name_property() -> String {
    "ITL125NM".to_string()
}

fn default_port() -> u16 {
    3000
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let mut config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        // Dataset paths are relative to the config file.
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.input.regions);
        if let Some(csv) = self.input.facts_csv.as_mut() {
            resolve(csv);
        }
        for file in self.input.brands.values_mut() {
            resolve(file);
        }
        if let Some(dir) = self.server.static_dir.as_mut() {
            resolve(dir);
        }
    }
}

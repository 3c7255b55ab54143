use std::env;
use std::path::PathBuf;

use crate::colors::ColorIndex;
use crate::dicts::LookupRegistry;
use crate::error::CatalogResult;

pub const ENV_CONFIG_DIR: &str = "CATALOGO_CONFIG_DIR";
pub const ENV_LOGS_DIR: &str = "CATALOGO_LOGS_DIR";
pub const ENV_DATA_DIR: &str = "CATALOGO_DATA_DIR";

/// Opciones de corrida comunes a ambas etapas.
///
/// Precedencia: flag de línea de comandos > variable de entorno > default.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub config_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub data_dir: PathBuf,
    pub color_files: Vec<PathBuf>,
    pub chunk: Option<usize>,
    pub timestamp_logs: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            config_dir: env_or(ENV_CONFIG_DIR, "config"),
            logs_dir: env_or(ENV_LOGS_DIR, "logs"),
            data_dir: env_or(ENV_DATA_DIR, "data"),
            color_files: Vec::new(),
            chunk: None,
            timestamp_logs: false,
        }
    }
}

fn env_or(var: &str, default: &str) -> PathBuf {
    env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

impl RunConfig {
    /// Separa los argumentos posicionales de las opciones `--x`.
    pub fn from_args(args: &[String]) -> Result<(Self, Vec<String>), String> {
        let mut config = Self::default();
        let mut positional = Vec::new();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config-dir" => config.config_dir = PathBuf::from(value_for(arg, iter.next())?),
                "--logs-dir" => config.logs_dir = PathBuf::from(value_for(arg, iter.next())?),
                "--data-dir" => config.data_dir = PathBuf::from(value_for(arg, iter.next())?),
                "--colores" => config.color_files.push(PathBuf::from(value_for(arg, iter.next())?)),
                "--chunk" => {
                    let raw = value_for(arg, iter.next())?;
                    let n: usize = raw
                        .parse()
                        .map_err(|_| format!("--chunk expects a positive integer, got '{}'", raw))?;
                    config.chunk = (n > 0).then_some(n);
                }
                "--timestamp-logs" => config.timestamp_logs = true,
                other if other.starts_with("--") => return Err(format!("Unknown option: {}", other)),
                _ => positional.push(arg.clone()),
            }
        }

        Ok((config, positional))
    }

    pub fn load_registry(&self) -> CatalogResult<LookupRegistry> {
        LookupRegistry::load(&self.config_dir)
    }

    /// Colores de los archivos indicados, o `data/var_colores.{csv,xlsx}` si hay.
    pub fn load_colors(&self) -> CatalogResult<ColorIndex> {
        if self.color_files.is_empty() {
            ColorIndex::load_default(&self.data_dir)
        } else {
            ColorIndex::load(&self.color_files)
        }
    }
}

fn value_for<'a>(flag: &str, value: Option<&'a String>) -> Result<&'a str, String> {
    value
        .map(String::as_str)
        .ok_or_else(|| format!("Missing value for {}", flag))
}

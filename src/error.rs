use thiserror::Error;

/// Errores fatales del pipeline (entrada ilegible, configuración rota, E/S).
///
/// Las ausencias esperadas (SKU sin maestro, curva vacía, código desconocido)
/// NO son errores: se devuelven como diagnósticos y terminan en los logs de rechazo.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported format: '{0}' (expected .csv, .xlsx or .xls)")]
    UnsupportedFormat(String),

    #[error("CSV parse error in {path}: {message}")]
    CsvParse { path: String, message: String },

    #[error("Excel parse error in {path}: {message}")]
    ExcelParse { path: String, message: String },

    #[error("Table has no header row: {0}")]
    EmptyTable(String),

    #[error("Config error ({file}): {message}")]
    Config { file: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

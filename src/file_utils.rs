use std::error::Error;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::CatalogResult;
use crate::row_builder::OutputRow;

/// Calcula el tamaño de un archivo en bytes
pub fn get_file_size(path: &Path) -> Result<u64, Box<dyn Error>> {
    let metadata = fs::metadata(path)?;
    Ok(metadata.len())
}

/// Formatea bytes en formato legible (KB, MB, GB)
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Valida que un archivo exista
pub fn validate_file_exists(path: &Path) -> Result<(), Box<dyn Error>> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }
    Ok(())
}

/// Crea el directorio padre de un archivo de salida si no existe
pub fn ensure_parent_dir(path: &Path) -> CatalogResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Escribe el CSV de salida: todo entre comillas, header siempre presente.
pub fn write_csv(path: &Path, headers: &[String], rows: &[OutputRow]) -> CatalogResult<()> {
    ensure_parent_dir(path)?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(BufWriter::new(File::create(path)?));

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row.values())?;
    }
    writer.flush()?;
    Ok(())
}

/// Igual que `write_csv`, pero partiendo en archivos de a `chunk` filas:
/// `salida.csv` -> `salida_parte01.csv`, `salida_parte02.csv`, ...
/// Sin chunk (o si entra todo en uno) escribe un único archivo.
pub fn write_csv_chunked(
    path: &Path,
    headers: &[String],
    rows: &[OutputRow],
    chunk: Option<usize>,
) -> CatalogResult<Vec<PathBuf>> {
    let size = match chunk {
        Some(n) if n > 0 && rows.len() > n => n,
        _ => {
            write_csv(path, headers, rows)?;
            return Ok(vec![path.to_path_buf()]);
        }
    };

    let mut written = Vec::new();
    for (i, part) in rows.chunks(size).enumerate() {
        let part_path = chunk_path(path, i + 1);
        write_csv(&part_path, headers, part)?;
        written.push(part_path);
    }
    Ok(written)
}

fn chunk_path(path: &Path, part: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "salida".to_string());
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "csv".to_string());
    path.with_file_name(format!("{}_parte{:02}.{}", stem, part, ext))
}

/// Texto plano, una línea por elemento, sin salto final.
pub fn write_lines<I, S>(path: &Path, lines: I) -> CatalogResult<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ensure_parent_dir(path)?;
    let joined = lines
        .into_iter()
        .map(|l| l.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(joined.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Nombre de log de rechazos, opcionalmente con timestamp:
/// `no_encontrados.txt` o `no_encontrados_20250101_120000.txt`.
pub fn log_file_name(base: &str, timestamped: bool) -> String {
    if timestamped {
        format!("{}_{}.txt", base, Local::now().format("%Y%m%d_%H%M%S"))
    } else {
        format!("{}.txt", base)
    }
}

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use lazy_static::lazy_static;
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};
use crate::models::CatalogRecord;
use crate::text::normalize_header;

lazy_static! {
    /// Sinónimos de encabezado (ya normalizados) -> clave canónica.
    /// Lo que no aparece acá queda con su forma normalizada.
    static ref CANON_MAP: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        // maestro
        m.insert("codigo", "codigo");
        m.insert("sku", "codigo");
        m.insert("descripcion", "descripcion");
        m.insert("proveedor", "proveedor");
        m.insert("familia", "familia");
        m.insert("curva de talles", "curva");
        m.insert("curva", "curva");
        m.insert("categoria", "categoria");
        m.insert("clasificacion", "clasificacion");
        m.insert("tipo", "tipo");
        m.insert("id", "id");
        // entrada
        m.insert("sku_base", "sku_base");
        m.insert("sku base", "sku_base");
        m.insert("nombre", "nombre");
        m.insert("talles", "talles");
        m.insert("etiquetas_extra", "etiquetas_extra");
        m.insert("tags_over", "tags_over");
        m.insert("categoria_over", "categoria_over");
        m.insert("marca_over", "marca_over");
        m.insert("genero_over", "genero_over");
        m.insert("tipo_over", "tipo_over");
        m.insert("peso_over", "peso_over");
        m.insert("largo_over", "largo_over");
        m.insert("ancho_over", "ancho_over");
        m.insert("alto_over", "alto_over");
        m.insert("desc_corta_over", "desc_corta_over");
        m.insert("desc_over", "desc_over");
        // colores
        m.insert("color_code", "color_code");
        m.insert("codigo color", "color_code");
        m.insert("cod color", "color_code");
        m.insert("color_name", "color_name");
        m.insert("nombre color", "color_name");
        m.insert("color", "color_name");
        m
    };
}

/// Clave canónica para un encabezado crudo ("Curva de Talles" -> "curva").
pub fn canonical_key(raw_header: &str) -> String {
    let norm = normalize_header(raw_header);
    match CANON_MAP.get(norm.as_str()) {
        Some(canon) => canon.to_string(),
        None => norm,
    }
}

/// Lee una planilla (.xlsx/.xls, primera hoja) o un delimitado (.csv/.txt).
/// Las filas completamente vacías se descartan.
pub fn read_table(path: &Path) -> CatalogResult<Vec<CatalogRecord>> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let records = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" => read_workbook(path)?,
        "csv" | "txt" => read_delimited(path)?,
        other => return Err(CatalogError::UnsupportedFormat(other.to_string())),
    };

    debug!(path = %path.display(), rows = records.len(), "table loaded");
    Ok(records)
}

fn read_delimited(path: &Path) -> CatalogResult<Vec<CatalogRecord>> {
    let bytes = fs::read(path)?;
    let content = decode_text(&bytes);
    parse_delimited(&content).map_err(|e| match e {
        CatalogError::Csv(err) => CatalogError::CsvParse {
            path: path.display().to_string(),
            message: err.to_string(),
        },
        CatalogError::EmptyTable(_) => CatalogError::EmptyTable(path.display().to_string()),
        other => other,
    })
}

/// Parsea texto delimitado ya decodificado.
pub fn parse_delimited(content: &str) -> CatalogResult<Vec<CatalogRecord>> {
    let content = content.trim_start_matches('\u{feff}');
    let delimiter = sniff_delimiter(content);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(canonical_key).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CatalogError::EmptyTable(String::new()));
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let record = to_record(&headers, row.iter());
        if !record.is_blank() {
            records.push(record);
        }
    }
    Ok(records)
}

fn read_workbook(path: &Path) -> CatalogResult<Vec<CatalogRecord>> {
    let excel_err = |message: String| CatalogError::ExcelParse {
        path: path.display().to_string(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| excel_err(e.to_string()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| excel_err("workbook has no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| excel_err(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| CatalogError::EmptyTable(path.display().to_string()))?
        .iter()
        .map(|cell| canonical_key(&cell.to_string()))
        .collect();

    let mut records = Vec::new();
    for row in rows {
        let cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
        let record = to_record(&headers, cells.iter().map(String::as_str));
        if !record.is_blank() {
            records.push(record);
        }
    }
    Ok(records)
}

fn to_record<'a, I>(headers: &[String], values: I) -> CatalogRecord
where
    I: Iterator<Item = &'a str>,
{
    let mut fields = HashMap::new();
    for (header, value) in headers.iter().zip(values) {
        if header.is_empty() {
            continue;
        }
        // Con encabezados repetidos gana la primera columna no vacía
        let value = value.trim();
        let slot = fields.entry(header.clone()).or_insert_with(String::new);
        if slot.is_empty() {
            *slot = value.to_string();
        }
    }
    CatalogRecord::new(fields)
}

/// UTF-8 si es válido; si no, Latin-1 (exportes viejos de Excel).
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Elige entre ',', ';' y TAB según la línea de encabezado.
pub fn sniff_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");
    let candidates = [b',', b';', b'\t'];
    candidates
        .iter()
        .copied()
        .max_by_key(|&d| first_line.matches(d as char).count())
        .filter(|&d| first_line.contains(d as char))
        .unwrap_or(b',')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_canonical_key_synonyms() {
        assert_eq!(canonical_key("Código"), "codigo");
        assert_eq!(canonical_key("SKU"), "codigo");
        assert_eq!(canonical_key("Curva de  Talles"), "curva");
        assert_eq!(canonical_key("Categoría"), "categoria");
        assert_eq!(canonical_key("Nombre del atributo 1"), "nombre del atributo 1");
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(sniff_delimiter("a,b,c"), b',');
        assert_eq!(sniff_delimiter("a\tb"), b'\t');
        assert_eq!(sniff_delimiter("solo"), b',');
    }

    #[test]
    fn test_parse_delimited_canonicalizes_and_skips_blank_rows() {
        let csv = "SKU_BASE;Nombre;Peso_Over\nA100; Remera ;0.4\n;;\nB200;Jean;\n";
        let rows = parse_delimited(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("sku_base"), "A100");
        assert_eq!(rows[0].get("nombre"), "Remera");
        assert_eq!(rows[0].get("peso_over"), "0.4");
        assert_eq!(rows[1].get("peso_over"), "");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        let bytes = b"Categor\xeda";
        assert_eq!(decode_text(bytes), "Categoría");
    }

    #[test]
    fn test_read_table_rejects_unknown_extension() {
        let mut file = tempfile::Builder::new().suffix(".ods").tempfile().unwrap();
        writeln!(file, "x").unwrap();
        let err = read_table(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_read_table_csv_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "Código,Proveedor,Curva de talles\nA100,1,3\n").unwrap();
        let rows = read_table(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("codigo"), "A100");
        assert_eq!(rows[0].get("curva"), "3");
    }

    #[test]
    fn test_read_table_missing_file() {
        let err = read_table(Path::new("/no/existe/entrada.csv")).unwrap_err();
        assert!(matches!(err, CatalogError::FileNotFound(_)));
    }
}

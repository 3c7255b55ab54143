use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::CatalogResult;
use crate::models::{CatalogRecord, ColorEntry};
use crate::table_reader::read_table;

/// sku_base -> colores, en orden de primera aparición y sin códigos repetidos.
#[derive(Debug, Clone, Default)]
pub struct ColorIndex {
    by_sku: HashMap<String, Vec<ColorEntry>>,
}

impl ColorIndex {
    /// Arma el índice desde filas `{sku_base, color_code, color_name}`.
    /// Filas sin sku o sin código se ignoran; ante códigos repetidos gana el primer nombre.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a CatalogRecord>,
    {
        let mut index = Self::default();
        for record in records {
            let base = record.first_of(&["sku_base", "codigo"]);
            let code = record.get("color_code");
            if base.is_empty() || code.is_empty() {
                continue;
            }
            index.insert(base, ColorEntry::new(code, record.get("color_name")));
        }
        index
    }

    /// Carga y fusiona varios archivos de colores, en el orden recibido.
    pub fn load(paths: &[PathBuf]) -> CatalogResult<Self> {
        let mut records = Vec::new();
        for path in paths {
            let rows = read_table(path)?;
            info!(path = %path.display(), rows = rows.len(), "color table loaded");
            records.extend(rows);
        }
        Ok(Self::from_records(&records))
    }

    /// Igual que `load`, pero sin archivos devuelve un índice vacío.
    pub fn load_default(data_dir: &Path) -> CatalogResult<Self> {
        let candidates = [data_dir.join("var_colores.csv"), data_dir.join("var_colores.xlsx")];
        match candidates.iter().find(|p| p.exists()) {
            Some(path) => Self::load(std::slice::from_ref(path)),
            None => {
                debug!(dir = %data_dir.display(), "no color table found, products have no color dimension");
                Ok(Self::default())
            }
        }
    }

    pub fn insert(&mut self, sku_base: &str, entry: ColorEntry) {
        let list = self.by_sku.entry(sku_base.trim().to_string()).or_default();
        if !list.iter().any(|c| c.code == entry.code) {
            list.push(entry);
        }
    }

    pub fn get(&self, sku_base: &str) -> Option<&[ColorEntry]> {
        self.by_sku
            .get(sku_base.trim())
            .map(Vec::as_slice)
            .filter(|list| !list.is_empty())
    }

    pub fn len(&self) -> usize {
        self.by_sku.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sku.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn rec(base: &str, code: &str, name: &str) -> CatalogRecord {
        [("sku_base", base), ("color_code", code), ("color_name", name)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_dedup_by_code_first_name_wins() {
        let rows = vec![
            rec("A100", "001", "Negro"),
            rec("A100", "002", ""),
            rec("A100", "001", "Black"),
            rec("", "003", "Rojo"),
            rec("A100", "", "Azul"),
        ];
        let index = ColorIndex::from_records(&rows);
        let colors = index.get("A100").unwrap();
        assert_eq!(colors.len(), 2);
        assert_eq!(colors[0], ColorEntry::new("001", "Negro"));
        assert_eq!(colors[1].name, "002");
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_missing_sku_has_no_colors() {
        let index = ColorIndex::default();
        assert!(index.get("A100").is_none());
    }

    #[test]
    fn test_load_merges_files_in_order() {
        let mut first = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(first, "sku_base,color_code,color_name\nA100,001,Negro\n").unwrap();
        let mut second = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(second, "SKU_BASE;Código Color;Nombre Color\nA100;002;Blanco\nA100;001;Otro\n").unwrap();

        let index = ColorIndex::load(&[first.path().to_path_buf(), second.path().to_path_buf()]).unwrap();
        let codes: Vec<&str> = index.get("A100").unwrap().iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["001", "002"]);
        assert_eq!(index.get("A100").unwrap()[0].name, "Negro");
    }

    #[test]
    fn test_load_default_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let index = ColorIndex::load_default(dir.path()).unwrap();
        assert!(index.is_empty());
    }
}

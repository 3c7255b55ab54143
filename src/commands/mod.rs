pub mod generar_padres;
pub mod generar_variantes;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::CatalogResult;
use crate::file_utils::{log_file_name, write_lines};
use crate::models::{SkippedCombination, UnknownCode};

pub const LOG_NO_ENCONTRADOS: &str = "no_encontrados";
pub const LOG_PADRES_SIN_ID: &str = "padres_sin_id";
pub const LOG_CURVAS_VACIAS: &str = "curvas_vacias";
pub const LOG_CODIGOS_DESCONOCIDOS: &str = "codigos_desconocidos";
pub const LOG_COMBINACIONES_OMITIDAS: &str = "combinaciones_omitidas";

/// Rechazos y avisos de una corrida, una lista por archivo de log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RejectLogs {
    pub no_encontrados: Vec<String>,
    pub padres_sin_id: Vec<String>,
    pub curvas_vacias: Vec<String>,
    pub codigos_desconocidos: Vec<String>,
    pub combinaciones_omitidas: Vec<String>,
}

impl RejectLogs {
    pub fn not_found(&mut self, sku: &str, reason: &str) {
        warn!(sku, reason, "sku rejected");
        let sku = if sku.is_empty() { "(sin sku)" } else { sku };
        self.no_encontrados.push(format!("{}\t{}", sku, reason));
    }

    pub fn missing_parent_id(&mut self, sku: &str) {
        warn!(sku, "parent id not found in export");
        self.padres_sin_id.push(sku.to_string());
    }

    pub fn empty_curve(&mut self, line: String) {
        warn!(entry = %line, "size curve resolved to no sizes");
        self.curvas_vacias.push(line);
    }

    pub fn unknown_codes(&mut self, codes: &[UnknownCode]) {
        for code in codes {
            debug!(sku = %code.sku, field = %code.field, value = %code.value, "unknown code");
            self.codigos_desconocidos.push(code.to_string());
        }
    }

    pub fn skipped(&mut self, combos: &[SkippedCombination]) {
        self.combinaciones_omitidas
            .extend(combos.iter().map(|c| c.to_string()));
    }

    pub fn total(&self) -> usize {
        self.no_encontrados.len()
            + self.padres_sin_id.len()
            + self.curvas_vacias.len()
            + self.codigos_desconocidos.len()
            + self.combinaciones_omitidas.len()
    }

    /// Escribe solo las listas no vacías. Devuelve las rutas creadas.
    pub fn write(&self, logs_dir: &Path, timestamped: bool) -> CatalogResult<Vec<PathBuf>> {
        let lists: [(&str, &Vec<String>); 5] = [
            (LOG_NO_ENCONTRADOS, &self.no_encontrados),
            (LOG_PADRES_SIN_ID, &self.padres_sin_id),
            (LOG_CURVAS_VACIAS, &self.curvas_vacias),
            (LOG_CODIGOS_DESCONOCIDOS, &self.codigos_desconocidos),
            (LOG_COMBINACIONES_OMITIDAS, &self.combinaciones_omitidas),
        ];

        let mut written = Vec::new();
        for (name, lines) in lists {
            if lines.is_empty() {
                continue;
            }
            let path = logs_dir.join(log_file_name(name, timestamped));
            write_lines(&path, lines)?;
            written.push(path);
        }
        Ok(written)
    }

    pub fn print_summary(&self) {
        println!("📝 Rechazos / avisos: {}", self.total());
        println!("   No encontrados:          {}", self.no_encontrados.len());
        println!("   Padres sin ID:           {}", self.padres_sin_id.len());
        println!("   Curvas vacías:           {}", self.curvas_vacias.len());
        println!("   Códigos desconocidos:    {}", self.codigos_desconocidos.len());
        println!("   Combinaciones omitidas:  {}", self.combinaciones_omitidas.len());
    }
}

/// Recuerda los SKU ya procesados; la primera aparición en entrada gana.
#[derive(Debug, Default)]
pub(crate) struct SeenSkus(HashSet<String>);

impl SeenSkus {
    pub(crate) fn first_time(&mut self, sku: &str) -> bool {
        let fresh = self.0.insert(sku.to_string());
        if !fresh {
            debug!(sku, "duplicate sku in entrada, ignored");
        }
        fresh
    }
}

pub(crate) fn print_banner(title: &str) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║  {:<60}║", title);
    println!("╚══════════════════════════════════════════════════════════════╝");
}

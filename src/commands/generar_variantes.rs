use std::collections::HashMap;
use std::error::Error;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::colors::ColorIndex;
use crate::commands::{print_banner, RejectLogs, SeenSkus};
use crate::config::RunConfig;
use crate::dicts::LookupRegistry;
use crate::expansion::expand;
use crate::file_utils::{
    format_bytes, get_file_size, validate_file_exists, write_csv_chunked, write_lines,
};
use crate::models::{CatalogRecord, EntradaRow};
use crate::progress::ProgressTracker;
use crate::resolver::{resolve, MasterIndex, ResolutionSource};
use crate::row_builder::{build_variation_row, OutputRow};
use crate::table_reader::read_table;

/// Padre ya publicado en la tienda (del export de productos).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    pub id: String,
    pub nombre: String,
}

/// SKU -> ID de los productos `variable` del export. Filas sin SKU o sin ID se ignoran.
pub fn parent_links(export: &[CatalogRecord]) -> HashMap<String, ParentLink> {
    let mut links = HashMap::new();
    for record in export {
        let tipo = record.get("tipo");
        if !tipo.is_empty() && !tipo.eq_ignore_ascii_case("variable") {
            continue;
        }
        let sku = record.get("codigo");
        let id = record.get("id");
        if sku.is_empty() || id.is_empty() {
            continue;
        }
        links.insert(
            sku.to_string(),
            ParentLink {
                id: id.to_string(),
                nombre: record.get("nombre").to_string(),
            },
        );
    }
    links
}

#[derive(Debug, Default)]
pub struct VariationsOutcome {
    pub rows: Vec<OutputRow>,
    /// SKUs compuestos para el sistema de inventario, en orden de salida.
    pub activation: Vec<String>,
    pub rejects: RejectLogs,
    /// SKUs tipificados por voto entre sus códigos con color.
    pub by_majority: usize,
}

/// Filas `variation` de cada SKU de entrada, enlazadas a su padre por ID.
pub fn build_variations(
    entrada: &[CatalogRecord],
    master: &MasterIndex,
    colors: &ColorIndex,
    parents: &HashMap<String, ParentLink>,
    registry: &LookupRegistry,
) -> VariationsOutcome {
    let mut outcome = VariationsOutcome::default();
    let mut seen = SeenSkus::default();
    let mut progress = ProgressTracker::new(entrada.len() as u64, 500);

    for record in entrada {
        progress.tick();
        let row = EntradaRow::from_record(record);
        if row.sku.is_empty() {
            outcome.rejects.not_found("", "Falta nombre o sku");
            continue;
        }
        if !seen.first_time(&row.sku) {
            continue;
        }

        let Some(parent) = parents.get(&row.sku) else {
            outcome.rejects.missing_parent_id(&row.sku);
            continue;
        };

        let Some(resolution) = resolve(&row.sku, master, colors, registry) else {
            outcome.rejects.not_found(&row.sku, "No está en maestro");
            continue;
        };
        outcome.rejects.unknown_codes(&resolution.unknown_codes);
        if let ResolutionSource::MajorityVote { candidates } = resolution.source {
            debug!(sku = %row.sku, candidates, "sku resolved by majority vote");
            outcome.by_majority += 1;
        }

        let mut nombre = row.display_name(&resolution.attributes.descripcion);
        if nombre.is_empty() {
            nombre = parent.nombre.clone();
        }

        let sku_colors = resolution.colors(&row.sku, colors);
        let expansion = match expand(
            &row.sku,
            &nombre,
            &resolution.attributes,
            &sku_colors,
            &row.overrides.talles,
            registry,
        ) {
            Ok(expansion) => expansion,
            Err(empty) => {
                outcome.rejects.empty_curve(empty.to_string());
                continue;
            }
        };
        outcome.rejects.skipped(&expansion.skipped);
        debug!(
            sku = %row.sku,
            talles = expansion.sizes.len(),
            colores = sku_colors.len(),
            variaciones = expansion.variations.len(),
            "sku expanded"
        );

        for spec in &expansion.variations {
            outcome.rows.push(build_variation_row(
                &registry.headers,
                spec,
                &parent.id,
                &row.overrides.dims,
            ));
            outcome.activation.push(spec.sku.clone());
        }
    }

    progress.finish();
    outcome
}

/// `variantes <entrada> <maestro> <export_padres.csv> <out.csv> <out.txt> [opciones]`
pub fn generar_variantes(args: &[String]) -> Result<(), Box<dyn Error>> {
    let (config, positional) = RunConfig::from_args(&args[2..])?;
    if positional.len() != 5 {
        eprintln!(
            "Usage: catalogo_woo variantes <entrada> <maestro> <export_padres.csv> <out.csv> <out.txt> [opciones]"
        );
        return Err("variantes requires 5 positional arguments".into());
    }

    let entrada_path = Path::new(&positional[0]);
    let maestro_path = Path::new(&positional[1]);
    let export_path = Path::new(&positional[2]);
    let out_csv = Path::new(&positional[3]);
    let out_txt = Path::new(&positional[4]);

    print_banner("Generar variaciones (talle × color)");
    println!("📄 Entrada:        {}", entrada_path.display());
    println!("📄 Maestro:        {}", maestro_path.display());
    println!("📄 Export padres:  {}", export_path.display());
    println!("📝 Salida CSV:     {}", out_csv.display());
    println!("📝 Activación:     {}", out_txt.display());
    println!();

    validate_file_exists(entrada_path)?;
    validate_file_exists(maestro_path)?;
    validate_file_exists(export_path)?;

    // Fase 1: leer todo
    let registry = config.load_registry()?;
    let entrada = read_table(entrada_path)?;
    let master = MasterIndex::from_records(&read_table(maestro_path)?);
    let parents = parent_links(&read_table(export_path)?);
    let colors = config.load_colors()?;

    if master.is_empty() {
        warn!("maestro has no rows with codigo, every sku will be rejected");
    }
    if colors.is_empty() {
        info!("no color table loaded, colors come from maestro codes");
    }
    info!(
        entrada = entrada.len(),
        maestro = master.len(),
        padres = parents.len(),
        colores = colors.len(),
        "inputs loaded"
    );

    // Fase 2: producir
    let outcome = build_variations(&entrada, &master, &colors, &parents, &registry);

    let written = write_csv_chunked(out_csv, &registry.headers, &outcome.rows, config.chunk)?;
    write_lines(out_txt, &outcome.activation)?;
    let logs = outcome.rejects.write(&config.logs_dir, config.timestamp_logs)?;

    println!();
    print_banner("Resumen");
    println!("📊 Filas de entrada:      {}", entrada.len());
    println!("✅ Variaciones generadas: {}", outcome.rows.len());
    println!("🗳️  Por mayoría:          {}", outcome.by_majority);
    outcome.rejects.print_summary();
    println!();
    for path in &written {
        let size = get_file_size(path).map(format_bytes).unwrap_or_default();
        println!("✅ Generado: {} ({})", path.display(), size);
    }
    println!("✅ Generado: {} ({} SKUs)", out_txt.display(), outcome.activation.len());
    for path in &logs {
        println!("📝 Log: {}", path.display());
    }

    Ok(())
}

use std::error::Error;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::colors::ColorIndex;
use crate::commands::{print_banner, RejectLogs, SeenSkus};
use crate::config::RunConfig;
use crate::dicts::LookupRegistry;
use crate::expansion::{resolve_sizes, EmptySizeCurve};
use crate::file_utils::{format_bytes, get_file_size, validate_file_exists, write_csv_chunked};
use crate::models::{CatalogRecord, EntradaRow};
use crate::progress::ProgressTracker;
use crate::resolver::{resolve, MasterIndex, ResolutionSource};
use crate::row_builder::{build_parent_row, OutputRow, ParentInput};
use crate::table_reader::read_table;

/// Resultado de la etapa de padres, antes de tocar disco.
#[derive(Debug, Default)]
pub struct ParentsOutcome {
    pub rows: Vec<OutputRow>,
    pub rejects: RejectLogs,
    /// SKUs tipificados por voto entre sus códigos con color.
    pub by_majority: usize,
}

/// Una fila `variable` por SKU base de entrada.
///
/// SKU sin tipificación, sin nombre o con curva vacía van a los rechazos;
/// nunca se emite una fila parcial.
pub fn build_parents(
    entrada: &[CatalogRecord],
    master: &MasterIndex,
    colors: &ColorIndex,
    registry: &LookupRegistry,
) -> ParentsOutcome {
    let mut outcome = ParentsOutcome::default();
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

        let Some(resolution) = resolve(&row.sku, master, colors, registry) else {
            outcome.rejects.not_found(&row.sku, "No está en maestro");
            continue;
        };
        outcome.rejects.unknown_codes(&resolution.unknown_codes);
        if let ResolutionSource::MajorityVote { candidates } = resolution.source {
            debug!(sku = %row.sku, candidates, "sku resolved by majority vote");
            outcome.by_majority += 1;
        }

        let nombre = row.display_name(&resolution.attributes.descripcion);
        if nombre.is_empty() {
            outcome.rejects.not_found(&row.sku, "Falta nombre o sku");
            continue;
        }

        let sizes = resolve_sizes(&resolution.attributes, &row.overrides.talles, registry);
        if sizes.is_empty() {
            outcome.rejects.empty_curve(
                EmptySizeCurve {
                    sku: row.sku.clone(),
                    curva: resolution.attributes.curva.clone(),
                }
                .to_string(),
            );
            continue;
        }

        let sku_colors = resolution.colors(&row.sku, colors);
        outcome.rows.push(build_parent_row(
            registry,
            &ParentInput {
                sku: &row.sku,
                nombre: &nombre,
                attributes: &resolution.attributes,
                overrides: &row.overrides,
                sizes: &sizes,
                colors: &sku_colors,
            },
        ));
    }

    progress.finish();
    outcome
}

/// `padres <entrada> <maestro> <out.csv> [opciones]`
pub fn generar_padres(args: &[String]) -> Result<(), Box<dyn Error>> {
    let (config, positional) = RunConfig::from_args(&args[2..])?;
    if positional.len() != 3 {
        eprintln!("Usage: catalogo_woo padres <entrada.xlsx|csv> <maestro.xlsx|csv> <out.csv> [opciones]");
        return Err("padres requires 3 positional arguments".into());
    }

    let entrada_path = Path::new(&positional[0]);
    let maestro_path = Path::new(&positional[1]);
    let out_path = Path::new(&positional[2]);

    print_banner("Generar padres (productos variables)");
    println!("📄 Entrada:  {}", entrada_path.display());
    println!("📄 Maestro:  {}", maestro_path.display());
    println!("📝 Salida:   {}", out_path.display());
    println!("⚙️  Config:   {}", config.config_dir.display());
    println!();

    validate_file_exists(entrada_path)?;
    validate_file_exists(maestro_path)?;

    // Fase 1: leer todo
    let registry = config.load_registry()?;
    let entrada = read_table(entrada_path)?;
    let maestro = read_table(maestro_path)?;
    let master = MasterIndex::from_records(&maestro);
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
        colores = colors.len(),
        "inputs loaded"
    );

    // Fase 2: producir
    let outcome = build_parents(&entrada, &master, &colors, &registry);

    let written = write_csv_chunked(out_path, &registry.headers, &outcome.rows, config.chunk)?;
    let logs = outcome.rejects.write(&config.logs_dir, config.timestamp_logs)?;

    println!();
    print_banner("Resumen");
    println!("📊 Filas de entrada:   {}", entrada.len());
    println!("✅ Padres generados:   {}", outcome.rows.len());
    println!("🗳️  Por mayoría:          {}", outcome.by_majority);
    outcome.rejects.print_summary();
    println!();
    for path in &written {
        let size = get_file_size(path).map(format_bytes).unwrap_or_default();
        println!("✅ Generado: {} ({})", path.display(), size);
    }
    for path in &logs {
        println!("📝 Log: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dicts::tests::sample_registry;
    use crate::models::ColorEntry;

    fn rec(pairs: &[(&str, &str)]) -> CatalogRecord {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    fn maestro_row(codigo: &str, proveedor: &str, curva: &str, desc: &str) -> CatalogRecord {
        rec(&[
            ("codigo", codigo),
            ("proveedor", proveedor),
            ("familia", "1"),
            ("curva", curva),
            ("categoria", "10"),
            ("clasificacion", "1"),
            ("tipo", "1"),
            ("descripcion", desc),
        ])
    }

    #[test]
    fn test_single_parent_with_override_sizes() {
        let reg = sample_registry();
        let master = MasterIndex::from_records(&[maestro_row("A100", "1", "1", "Remera")]);
        let entrada = vec![rec(&[("sku_base", "A100"), ("talles", "S, M")])];

        let outcome = build_parents(&entrada, &master, &ColorIndex::default(), &reg);
        assert_eq!(outcome.rows.len(), 1);
        let row = &outcome.rows[0];
        assert_eq!(row.get("SKU"), Some("A100"));
        assert_eq!(row.get("Nombre"), Some("Remera"));
        assert_eq!(row.get("Nombre del atributo 1"), Some("Talle"));
        assert_eq!(row.get("Valor(es) del atributo 1"), Some("S, M"));
        assert_eq!(outcome.rejects.total(), 0);
    }

    #[test]
    fn test_fallback_parent_gets_synthetic_colors() {
        let reg = sample_registry();
        let master = MasterIndex::from_records(&[
            maestro_row("A100001", "1", "1", "Remera"),
            maestro_row("A100002", "2", "1", "Remera"),
        ]);
        let entrada = vec![rec(&[("sku_base", "A100")])];

        let outcome = build_parents(&entrada, &master, &ColorIndex::default(), &reg);
        let row = &outcome.rows[0];
        assert_eq!(row.get("Nombre del atributo 2"), Some("Color"));
        assert_eq!(row.get("Valor(es) del atributo 2"), Some("001, 002"));
        assert_eq!(outcome.by_majority, 1);
        // empate 01 vs 02: gana el primero
        assert_eq!(row.get("Valor(es) del atributo 3"), Some("Nike"));
    }

    #[test]
    fn test_rejects_are_routed() {
        let reg = sample_registry();
        let master = MasterIndex::from_records(&[
            maestro_row("A100", "1", "1", "Remera"),
            maestro_row("C300", "1", "999", "Gorra"),
            maestro_row("D400", "1", "1", ""),
            maestro_row("E500", "55", "1", "Short"),
        ]);
        let entrada = vec![
            rec(&[("sku_base", "A100")]),
            rec(&[("sku_base", "Z999")]),
            rec(&[("sku_base", "C300")]),
            rec(&[("sku_base", "D400")]),
            rec(&[("nombre", "Sin sku")]),
            rec(&[("sku_base", "A100"), ("nombre", "Duplicado")]),
            rec(&[("sku_base", "E500")]),
        ];

        let outcome = build_parents(&entrada, &master, &ColorIndex::default(), &reg);
        let skus: Vec<&str> = outcome.rows.iter().filter_map(|r| r.get("SKU")).collect();
        assert_eq!(skus, vec!["A100", "E500"]);
        assert_eq!(outcome.rows[0].get("Nombre"), Some("Remera"));
        assert_eq!(
            outcome.rejects.no_encontrados,
            vec![
                "Z999\tNo está en maestro",
                "D400\tFalta nombre o sku",
                "(sin sku)\tFalta nombre o sku",
            ]
        );
        assert_eq!(outcome.rejects.curvas_vacias, vec!["C300\t999"]);
        assert!(outcome.rejects.codigos_desconocidos.contains(&"E500\tproveedor\t55".to_string()));
    }

    #[test]
    fn test_color_table_drives_color_attribute() {
        let reg = sample_registry();
        let master = MasterIndex::from_records(&[maestro_row("A100", "1", "1", "Remera")]);
        let mut colors = ColorIndex::default();
        colors.insert("A100", ColorEntry::new("001", "Negro"));
        colors.insert("A100", ColorEntry::new("002", "Blanco"));

        let outcome = build_parents(&[rec(&[("sku_base", "A100")])], &master, &colors, &reg);
        let row = &outcome.rows[0];
        assert_eq!(row.get("Valor(es) del atributo 1"), Some("S/38, M/40, L/42, XL/44"));
        assert_eq!(row.get("Valor(es) del atributo 2"), Some("Negro, Blanco"));
        assert_eq!(row.get("Nombre del atributo 3"), Some("Marca"));
    }

    #[test]
    fn test_parent_rows_round_trip_through_entrada() {
        let reg = sample_registry();
        let master = MasterIndex::from_records(&[
            maestro_row("A100", "1", "1", "Remera"),
            maestro_row("B200", "2", "3", "Jean"),
        ]);
        let entrada = vec![rec(&[("sku_base", "A100")]), rec(&[("sku_base", "B200")])];
        let first = build_parents(&entrada, &master, &ColorIndex::default(), &reg);

        let again: Vec<CatalogRecord> = first
            .rows
            .iter()
            .map(|r| {
                rec(&[
                    ("codigo", r.get("SKU").unwrap()),
                    ("nombre", r.get("Nombre").unwrap()),
                ])
            })
            .collect();
        let second = build_parents(&again, &master, &ColorIndex::default(), &reg);
        assert_eq!(first.rows, second.rows);
    }
}

use std::env;
use std::process;

// Importar módulos locales
mod colors;
mod commands;
mod config;
mod dicts;
mod error;
mod expansion;
mod file_utils;
mod logging;
mod models;
mod progress;
mod resolver;
mod row_builder;
mod table_reader;
mod text;

use commands::generar_padres::generar_padres;
use commands::generar_variantes::generar_variantes;

fn main() {
    logging::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        help();
        return;
    }

    let command = &args[1];

    let result = match command.as_str() {
        "padres" => generar_padres(&args),
        "variantes" => generar_variantes(&args),
        "version" | "--version" | "-V" => {
            version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            help();
            Ok(())
        }
        other => {
            eprintln!("❌ Unknown command: '{}'", other);
            eprintln!();
            help();
            process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn version() {
    println!(
        "catalogo_woo {} (build {}, {}, {})",
        env!("CATALOGO_VERSION"),
        env!("BUILD_NUMBER"),
        env!("BUILD_DATE"),
        env!("TARGET")
    );
}

fn help() {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║  Catálogo → WooCommerce (padres y variaciones)               ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("COMMANDS:");
    println!("  padres <entrada> <maestro> <out.csv> [opciones]");
    println!("    Genera una fila 'variable' por SKU base de entrada");
    println!("    - Tipificación desde el maestro (o voto por mayoría entre colores)");
    println!("    - Categorías, etiquetas y medidas desde correspondencias.json");
    println!();
    println!("  variantes <entrada> <maestro> <export_padres.csv> <out.csv> <out.txt> [opciones]");
    println!("    Genera una fila 'variation' por color × talle, enlazada al padre por ID");
    println!("    - out.txt: SKUs compuestos (base+color##talle) para activar en inventario");
    println!();
    println!("  version");
    println!("    Muestra versión y datos del build");
    println!();
    println!("OPTIONS:");
    println!("  --config-dir <dir>   headers_woo.json, tipificaciones_codigos.json, correspondencias.json");
    println!("                       (default: config, o $CATALOGO_CONFIG_DIR)");
    println!("  --logs-dir <dir>     Logs de rechazos (default: logs, o $CATALOGO_LOGS_DIR)");
    println!("  --data-dir <dir>     Busca var_colores.csv|xlsx (default: data, o $CATALOGO_DATA_DIR)");
    println!("  --colores <archivo>  Tabla de colores por SKU (repetible)");
    println!("  --chunk <n>          Parte la salida en archivos de n filas (0 = sin partir)");
    println!("  --timestamp-logs     Agrega fecha y hora al nombre de cada log");
    println!();
    println!("INPUT FORMATS:");
    println!("  .xlsx .xlsm .xls (primera hoja), .csv .txt (delimitador , ; o tab)");
    println!();
    println!("LOGS:");
    println!("  no_encontrados.txt          SKU sin tipificación, sin nombre o vacío");
    println!("  padres_sin_id.txt           SKU sin padre en el export (solo variantes)");
    println!("  curvas_vacias.txt           SKU cuya curva no dio ningún talle");
    println!("  codigos_desconocidos.txt    Códigos que no están en tipificaciones");
    println!("  combinaciones_omitidas.txt  Color sin código o talle sin token");
    println!();
    println!("EXAMPLES:");
    println!();
    println!("  # Etapa 1: padres");
    println!("  catalogo_woo padres data/entrada.xlsx data/maestro.xlsx out/padres.csv");
    println!();
    println!("  # Etapa 2: variaciones, con el export de la tienda tras importar padres");
    println!("  catalogo_woo variantes data/entrada.xlsx data/maestro.xlsx data/export.csv \\");
    println!("      out/variaciones.csv out/activar.txt --chunk 2000");
    println!();
    println!("  # Más detalle en stderr");
    println!("  RUST_LOG=debug catalogo_woo padres entrada.csv maestro.csv padres.csv");
}

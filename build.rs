use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // ✅ Incrementar número de build
    let build_number = increment_build_number();

    // ✅ Timestamp de compilación usando chrono
    let build_time = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let version = env!("CARGO_PKG_VERSION");
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rustc-env=CATALOGO_VERSION={}", version);
    println!("cargo:rustc-env=BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=BUILD_DATE={}", build_time);
    println!("cargo:rustc-env=TARGET={}", target);
}

fn increment_build_number() -> u32 {
    let out_dir = env::var("OUT_DIR").unwrap_or_else(|_| ".".to_string());
    let build_file = Path::new(&out_dir).join("build_number.txt");

    let current = fs::read_to_string(&build_file)
        .ok()
        .and_then(|s| s.trim().parse::<u32>().ok())
        .unwrap_or(0);

    let next = current + 1;
    // Si no se puede escribir, el número de build simplemente no avanza
    let _ = fs::write(&build_file, next.to_string());
    next
}

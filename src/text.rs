use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LIST_SEPARATORS: Regex = Regex::new(r"[|,;]+").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Une partes con `sep`, deduplicando sin distinguir mayúsculas.
/// Se conserva el orden y la grafía de la primera aparición; vacíos se ignoran.
pub fn uniq_join<I, S>(parts: I, sep: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out: Vec<String> = Vec::new();

    for part in parts {
        let value = part.as_ref().trim();
        if value.is_empty() {
            continue;
        }
        if seen.insert(value.to_lowercase()) {
            out.push(value.to_string());
        }
    }

    out.join(sep)
}

/// Dedup exacto preservando orden de inserción.
pub fn dedup_in_order<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(|v| v.as_ref().to_string())
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// Divide una lista libre ("S | M; L, XL") en elementos recortados y no vacíos.
pub fn split_list(raw: &str) -> Vec<String> {
    LIST_SEPARATORS
        .split(raw)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// "HOMBRE" -> "Hombre"
pub fn title_case(raw: &str) -> String {
    let mut chars = raw.trim().chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let rest = chars.as_str().to_lowercase();
    let mut out: String = first.to_uppercase().collect();
    out.push_str(&rest);
    out
}

/// Rellena con ceros a ancho 2 los códigos numéricos ("1" -> "01").
/// Vacíos y valores no numéricos ("NIÑO (02 al 20)") quedan tal cual.
pub fn pad_code(raw: &str) -> String {
    let value = raw.trim();
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        format!("{:0>2}", value)
    } else {
        value.to_string()
    }
}

/// Quita acentos/diéresis/eñes de las letras latinas habituales.
pub fn strip_accents(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
            'Á' | 'À' | 'Ä' | 'Â' | 'Ã' => 'A',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'É' | 'È' | 'Ë' | 'Ê' => 'E',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'Ó' | 'Ò' | 'Ö' | 'Ô' | 'Õ' => 'O',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
            'ñ' => 'n',
            'Ñ' => 'N',
            'ç' => 'c',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}

/// Normaliza un nombre de columna: sin acentos, minúsculas, espacios colapsados.
pub fn normalize_header(raw: &str) -> String {
    let no_accents = strip_accents(raw.trim_start_matches('\u{feff}'));
    WHITESPACE
        .replace_all(no_accents.trim(), " ")
        .to_lowercase()
}

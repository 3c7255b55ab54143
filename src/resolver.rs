use std::collections::HashMap;

use tracing::debug;

use crate::colors::ColorIndex;
use crate::dicts::LookupRegistry;
use crate::models::{AttributeField, CatalogRecord, ColorEntry, MasterAttributes, UnknownCode};

/// Largo del sufijo de color en los códigos del maestro ("A100" + "001").
const COLOR_SUFFIX_LEN: usize = 3;

/// Maestro indexado por código, conservando el orden del archivo.
#[derive(Debug, Clone, Default)]
pub struct MasterIndex {
    entries: Vec<(String, MasterAttributes)>,
    positions: HashMap<String, usize>,
}

impl MasterIndex {
    /// Filas sin `codigo` se ignoran. Un código repetido reemplaza los
    /// atributos pero mantiene su posición original.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a CatalogRecord>,
    {
        let mut index = Self::default();
        for record in records {
            let sku = record.get("codigo");
            if sku.is_empty() {
                continue;
            }
            index.insert(sku, MasterAttributes::from_record(record));
        }
        index
    }

    pub fn insert(&mut self, sku: &str, attrs: MasterAttributes) {
        let sku = sku.trim().to_string();
        match self.positions.get(&sku) {
            Some(&pos) => self.entries[pos].1 = attrs,
            None => {
                self.positions.insert(sku.clone(), self.entries.len());
                self.entries.push((sku, attrs));
            }
        }
    }

    pub fn get(&self, sku: &str) -> Option<&MasterAttributes> {
        self.positions.get(sku.trim()).map(|&pos| &self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Claves `base + NNN` (tres dígitos ASCII exactos), en orden de archivo.
    fn numeric_siblings<'a>(
        &'a self,
        base: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a MasterAttributes)> + 'a {
        self.entries.iter().filter_map(move |(sku, attrs)| {
            let suffix = sku.strip_prefix(base)?;
            let is_color_suffix = suffix.len() == COLOR_SUFFIX_LEN
                && suffix.bytes().all(|b| b.is_ascii_digit());
            is_color_suffix.then_some((suffix, attrs))
        })
    }
}

/// Cómo se obtuvo la tipificación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionSource {
    Direct,
    MajorityVote { candidates: usize },
}

/// Resultado de resolver un SKU base.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub attributes: MasterAttributes,
    pub source: ResolutionSource,
    /// Colores sintetizados desde los sufijos cuando la tabla de colores no
    /// tenía el SKU. `None` si no hizo falta sintetizar.
    pub synthetic_colors: Option<Vec<ColorEntry>>,
    pub unknown_codes: Vec<UnknownCode>,
}

impl Resolution {
    /// Colores efectivos: los de la tabla, o los sintetizados.
    pub fn colors(&self, sku: &str, colors: &ColorIndex) -> Vec<ColorEntry> {
        match colors.get(sku) {
            Some(list) => list.to_vec(),
            None => self.synthetic_colors.clone().unwrap_or_default(),
        }
    }
}

/// Resuelve la tipificación de un SKU base.
///
/// Primero busca el SKU exacto en el maestro. Si no está, junta candidatos
/// `base + color` (colores de la tabla) o, en su defecto, `base + NNN`, y vota
/// por mayoría campo a campo. `None` si no hay ningún candidato.
pub fn resolve(
    base_sku: &str,
    master: &MasterIndex,
    colors: &ColorIndex,
    registry: &LookupRegistry,
) -> Option<Resolution> {
    let base = base_sku.trim();
    if base.is_empty() {
        return None;
    }

    if let Some(attrs) = master.get(base) {
        return Some(Resolution {
            unknown_codes: check_codes(base, attrs, registry),
            attributes: attrs.clone(),
            source: ResolutionSource::Direct,
            synthetic_colors: None,
        });
    }

    let known_colors = colors.get(base);
    let mut candidates: Vec<&MasterAttributes> = known_colors
        .unwrap_or(&[])
        .iter()
        .filter_map(|c| master.get(&format!("{}{}", base, c.code)))
        .collect();

    let mut suffixes: Vec<&str> = Vec::new();
    if candidates.is_empty() {
        for (suffix, attrs) in master.numeric_siblings(base) {
            suffixes.push(suffix);
            candidates.push(attrs);
        }
    }

    if candidates.is_empty() {
        return None;
    }

    let attributes = majority_attributes(&candidates);
    debug!(sku = base, candidates = candidates.len(), "resolved by majority vote");

    let synthetic_colors = if known_colors.is_none() {
        let mut synth: Vec<ColorEntry> = Vec::new();
        for suffix in suffixes {
            if !synth.iter().any(|c| c.code == suffix) {
                synth.push(ColorEntry::new(suffix, suffix));
            }
        }
        Some(synth)
    } else {
        None
    };

    Some(Resolution {
        unknown_codes: check_codes(base, &attributes, registry),
        source: ResolutionSource::MajorityVote {
            candidates: candidates.len(),
        },
        attributes,
        synthetic_colors,
    })
}

/// Voto por mayoría de cada campo entre candidatos.
fn majority_attributes(candidates: &[&MasterAttributes]) -> MasterAttributes {
    let mut out = MasterAttributes::default();
    for field in AttributeField::ALL {
        let values: Vec<&str> = candidates.iter().map(|c| c.get(field)).collect();
        out.set(field, majority_value(&values));
    }
    let descs: Vec<&str> = candidates.iter().map(|c| c.descripcion.as_str()).collect();
    out.descripcion = majority_value(&descs);
    out
}

/// Valor no vacío más frecuente; empate -> el que apareció primero.
/// Si todos están vacíos, el valor crudo del primer candidato.
pub fn majority_value(values: &[&str]) -> String {
    // (valor, cuenta) en orden de primera aparición
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, n) in counts {
        if best.map_or(true, |(_, top)| n > top) {
            best = Some((value, n));
        }
    }

    match best {
        Some((value, _)) => value.to_string(),
        None => values.first().map(|v| v.to_string()).unwrap_or_default(),
    }
}

/// Códigos presentes que no figuran en su diccionario (solo aviso).
pub fn check_codes(
    sku: &str,
    attrs: &MasterAttributes,
    registry: &LookupRegistry,
) -> Vec<UnknownCode> {
    AttributeField::ALL
        .iter()
        .filter_map(|&field| {
            let value = attrs.get(field);
            if value.is_empty() || registry.tipificaciones.dictionary(field).contains_key(value) {
                return None;
            }
            Some(UnknownCode {
                sku: sku.to_string(),
                field,
                value: value.to_string(),
            })
        })
        .collect()
}

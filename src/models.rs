use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::text::pad_code;

/// Una fila de cualquier tabla de entrada, con claves ya canónicas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRecord {
    fields: HashMap<String, String>,
}

impl CatalogRecord {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    /// Valor recortado del campo, o "" si no existe.
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(|v| v.trim()).unwrap_or("")
    }

    /// Primer valor no vacío entre varias claves canónicas.
    pub fn first_of(&self, keys: &[&str]) -> &str {
        keys.iter()
            .map(|k| self.get(k))
            .find(|v| !v.is_empty())
            .unwrap_or("")
    }

    pub fn is_blank(&self) -> bool {
        self.fields.values().all(|v| v.trim().is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CatalogRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Los seis campos de tipificación que viajan con cada SKU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeField {
    Proveedor,
    Familia,
    Categoria,
    Clasificacion,
    Tipo,
    Curva,
}

impl AttributeField {
    pub const ALL: [AttributeField; 6] = [
        AttributeField::Proveedor,
        AttributeField::Familia,
        AttributeField::Categoria,
        AttributeField::Clasificacion,
        AttributeField::Tipo,
        AttributeField::Curva,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeField::Proveedor => "proveedor",
            AttributeField::Familia => "familia",
            AttributeField::Categoria => "categoria",
            AttributeField::Clasificacion => "clasificacion",
            AttributeField::Tipo => "tipo",
            AttributeField::Curva => "curva",
        }
    }
}

impl fmt::Display for AttributeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tipificación resuelta de un SKU base.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterAttributes {
    pub proveedor: String,
    pub familia: String,
    pub categoria: String,
    pub clasificacion: String,
    pub tipo: String,
    pub curva: String,
    pub descripcion: String,
}

impl MasterAttributes {
    /// Construye desde una fila del maestro, rellenando códigos a ancho 2.
    pub fn from_record(record: &CatalogRecord) -> Self {
        Self {
            proveedor: pad_code(record.get("proveedor")),
            familia: pad_code(record.get("familia")),
            categoria: pad_code(record.get("categoria")),
            clasificacion: pad_code(record.get("clasificacion")),
            tipo: pad_code(record.get("tipo")),
            curva: pad_code(record.get("curva")),
            descripcion: record.get("descripcion").to_string(),
        }
    }

    pub fn get(&self, field: AttributeField) -> &str {
        match field {
            AttributeField::Proveedor => &self.proveedor,
            AttributeField::Familia => &self.familia,
            AttributeField::Categoria => &self.categoria,
            AttributeField::Clasificacion => &self.clasificacion,
            AttributeField::Tipo => &self.tipo,
            AttributeField::Curva => &self.curva,
        }
    }

    pub fn set(&mut self, field: AttributeField, value: String) {
        match field {
            AttributeField::Proveedor => self.proveedor = value,
            AttributeField::Familia => self.familia = value,
            AttributeField::Categoria => self.categoria = value,
            AttributeField::Clasificacion => self.clasificacion = value,
            AttributeField::Tipo => self.tipo = value,
            AttributeField::Curva => self.curva = value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorEntry {
    pub code: String,
    pub name: String,
}

impl ColorEntry {
    /// El nombre cae al código cuando viene vacío.
    pub fn new(code: &str, name: &str) -> Self {
        let code = code.trim().to_string();
        let name = match name.trim() {
            "" => code.clone(),
            n => n.to_string(),
        };
        Self { code, name }
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.code
        } else {
            &self.name
        }
    }
}

/// Peso y medidas del producto; en JSON pueden venir como número o texto.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Dimensions {
    #[serde(default, deserialize_with = "string_or_number")]
    pub peso: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub largo: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub ancho: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub alto: String,
}

impl Dimensions {
    /// Cada medida del override pisa a la de categoría por separado.
    pub fn overlay(&self, over: &Dimensions) -> Dimensions {
        fn pick(over: &str, base: &str) -> String {
            if over.trim().is_empty() { base.to_string() } else { over.trim().to_string() }
        }
        Dimensions {
            peso: pick(&over.peso, &self.peso),
            largo: pick(&over.largo, &self.largo),
            ancho: pick(&over.ancho, &self.ancho),
            alto: pick(&over.alto, &self.alto),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Overrides opcionales de la hoja entrada. Ausente = vacío.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub talles: String,
    pub tags: String,
    pub categoria: String,
    pub marca: String,
    pub genero: String,
    pub tipo: String,
    pub dims: Dimensions,
    pub desc_corta: String,
    pub desc: String,
}

impl Overrides {
    pub fn from_record(record: &CatalogRecord) -> Self {
        Self {
            talles: record.get("talles").to_string(),
            tags: record.first_of(&["tags_over", "etiquetas_extra"]).to_string(),
            categoria: record.get("categoria_over").to_string(),
            marca: record.get("marca_over").to_string(),
            genero: record.get("genero_over").to_string(),
            tipo: record.get("tipo_over").to_string(),
            dims: Dimensions {
                peso: record.get("peso_over").to_string(),
                largo: record.get("largo_over").to_string(),
                ancho: record.get("ancho_over").to_string(),
                alto: record.get("alto_over").to_string(),
            },
            desc_corta: record.get("desc_corta_over").to_string(),
            desc: record.get("desc_over").to_string(),
        }
    }
}

/// Una fila de la hoja entrada ya interpretada.
#[derive(Debug, Clone, PartialEq)]
pub struct EntradaRow {
    pub sku: String,
    pub nombre: String,
    pub descripcion: String,
    pub overrides: Overrides,
}

impl EntradaRow {
    pub fn from_record(record: &CatalogRecord) -> Self {
        Self {
            sku: record.first_of(&["sku_base", "codigo"]).to_string(),
            nombre: record.get("nombre").to_string(),
            descripcion: record.get("descripcion").to_string(),
            overrides: Overrides::from_record(record),
        }
    }

    /// Nombre del padre: el de entrada, si no la descripción del maestro,
    /// si no la descripción que traiga la propia entrada.
    pub fn display_name(&self, maestro_desc: &str) -> String {
        [self.nombre.as_str(), maestro_desc, self.descripcion.as_str()]
            .iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("")
            .to_string()
    }
}

/// Una combinación comprable (color opcional × talle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariationSpec {
    pub sku: String,
    pub name: String,
    pub size_label: String,
    pub color: Option<ColorEntry>,
}

/// Código de tipificación presente pero ausente de su diccionario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCode {
    pub sku: String,
    pub field: AttributeField,
    pub value: String,
}

impl fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.sku, self.field, self.value)
    }
}

/// Combinación (color, talle) descartada sin abortar el resto del SKU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCombination {
    pub sku: String,
    pub color_code: String,
    pub size_label: String,
    pub reason: &'static str,
}

impl fmt::Display for SkippedCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.sku, self.color_code, self.size_label, self.reason
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> CatalogRecord {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_master_attributes_are_padded() {
        let rec = record(&[
            ("codigo", "A100"),
            ("proveedor", "1"),
            ("familia", "2"),
            ("curva", "3"),
            ("categoria", ""),
            ("clasificacion", "10"),
            ("tipo", "7"),
            ("descripcion", "Remera lisa"),
        ]);
        let attrs = MasterAttributes::from_record(&rec);
        assert_eq!(attrs.proveedor, "01");
        assert_eq!(attrs.familia, "02");
        assert_eq!(attrs.curva, "03");
        assert_eq!(attrs.categoria, "");
        assert_eq!(attrs.clasificacion, "10");
        assert_eq!(attrs.get(AttributeField::Tipo), "07");
        assert_eq!(attrs.descripcion, "Remera lisa");
    }

    #[test]
    fn test_color_name_defaults_to_code() {
        let c = ColorEntry::new(" 001 ", "  ");
        assert_eq!(c.code, "001");
        assert_eq!(c.name, "001");
    }

    #[test]
    fn test_overrides_missing_fields_are_empty() {
        let rec = record(&[("sku_base", "A100"), ("etiquetas_extra", "Verano")]);
        let entrada = EntradaRow::from_record(&rec);
        assert_eq!(entrada.sku, "A100");
        assert_eq!(entrada.nombre, "");
        assert_eq!(entrada.overrides.tags, "Verano");
        assert_eq!(entrada.overrides.dims, Dimensions::default());
    }

    #[test]
    fn test_dimensions_overlay_field_by_field() {
        let base = Dimensions {
            peso: "0.3".into(),
            largo: "30".into(),
            ancho: "20".into(),
            alto: "2".into(),
        };
        let over = Dimensions {
            peso: "0.5".into(),
            ..Default::default()
        };
        let merged = base.overlay(&over);
        assert_eq!(merged.peso, "0.5");
        assert_eq!(merged.largo, "30");
    }

    #[test]
    fn test_dimensions_accept_numbers() {
        let dims: Dimensions =
            serde_json::from_str(r#"{"peso": 0.25, "largo": "30", "alto": null}"#).unwrap();
        assert_eq!(dims.peso, "0.25");
        assert_eq!(dims.largo, "30");
        assert_eq!(dims.ancho, "");
        assert_eq!(dims.alto, "");
    }
}

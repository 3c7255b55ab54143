use tracing::debug;

use crate::dicts::LookupRegistry;
use crate::models::{AttributeField, ColorEntry, Dimensions, MasterAttributes, Overrides, VariationSpec};
use crate::text::{dedup_in_order, split_list, uniq_join};

/// Fila de salida con exactamente las columnas configuradas, en orden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    cells: Vec<(String, String)>,
}

impl OutputRow {
    /// Todas las columnas arrancan en "".
    pub fn new(headers: &[String]) -> Self {
        Self {
            cells: headers.iter().map(|h| (h.clone(), String::new())).collect(),
        }
    }

    /// Setea una columna existente. Columnas fuera del header se ignoran.
    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        match self.cells.iter_mut().find(|(h, _)| h == column) {
            Some((_, slot)) => *slot = value.into(),
            None => debug!(column, "column not in header list, ignored"),
        }
    }

    #[cfg(test)]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == column)
            .map(|(_, v)| v.as_str())
    }

    #[cfg(test)]
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(h, _)| h.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(_, v)| v.as_str())
    }

    fn set_dims(&mut self, dims: &Dimensions) {
        self.set("Peso (kg)", dims.peso.as_str());
        self.set("Longitud (cm)", dims.largo.as_str());
        self.set("Anchura (cm)", dims.ancho.as_str());
        self.set("Altura (cm)", dims.alto.as_str());
    }

    fn set_attribute(&mut self, n: u8, name: &str, value: &str, visible: bool) {
        self.set(&format!("Nombre del atributo {}", n), name);
        self.set(&format!("Valor(es) del atributo {}", n), value);
        if visible {
            self.set(&format!("Atributo visible {}", n), "1");
        }
        self.set(&format!("Atributo global {}", n), "1");
        self.set(&format!("Atributo por defecto {}", n), "");
    }
}

/// Todo lo que necesita el builder del padre, ya resuelto.
#[derive(Debug, Clone)]
pub struct ParentInput<'a> {
    pub sku: &'a str,
    pub nombre: &'a str,
    pub attributes: &'a MasterAttributes,
    pub overrides: &'a Overrides,
    pub sizes: &'a [String],
    pub colors: &'a [ColorEntry],
}

/// Nombre de un código, o el override si viene. Un override que sea un
/// código conocido se traduce a su nombre.
fn name_with_override(
    registry: &LookupRegistry,
    field: AttributeField,
    code: &str,
    over: &str,
) -> String {
    let over = over.trim();
    if !over.is_empty() {
        let mapped = registry.tipificaciones.name(field, over);
        return if mapped.is_empty() { over.to_string() } else { mapped.to_string() };
    }
    registry.tipificaciones.name(field, code).to_string()
}

/// Fila `variable` de un SKU base.
pub fn build_parent_row(registry: &LookupRegistry, input: &ParentInput<'_>) -> OutputRow {
    let attrs = input.attributes;
    let ovr = input.overrides;
    let tips = &registry.tipificaciones;

    let marca = if ovr.marca.trim().is_empty() {
        tips.name(AttributeField::Proveedor, &attrs.proveedor).to_string()
    } else {
        ovr.marca.trim().to_string()
    };
    let genero = if ovr.genero.trim().is_empty() {
        tips.name(AttributeField::Familia, &attrs.familia).to_uppercase()
    } else {
        ovr.genero.trim().to_uppercase()
    };
    let categoria = name_with_override(registry, AttributeField::Categoria, &attrs.categoria, &ovr.categoria);
    let tipo = name_with_override(registry, AttributeField::Tipo, &attrs.tipo, &ovr.tipo);
    let clasificacion = tips.name(AttributeField::Clasificacion, &attrs.clasificacion);

    let dims = registry.dimensiones(&categoria).overlay(&ovr.dims);
    let ruta = registry.categoria_ruta(&categoria, &genero);
    let tags = registry.tag_sources(&categoria, clasificacion, &tipo, &genero, &marca);
    let etiquetas = uniq_join(
        split_list(&ovr.tags)
            .into_iter()
            .chain(tags.base)
            .chain(tags.clasificacion)
            .chain(tags.tipo)
            .chain([tags.genero, tags.marca]),
        ", ",
    );

    let talles = dedup_in_order(input.sizes).join(", ");

    let mut row = OutputRow::new(&registry.headers);
    row.set("Tipo", "variable");
    row.set("SKU", input.sku);
    row.set("Nombre", input.nombre);
    row.set("Publicado", "1");
    row.set("¿Está destacado?", "0");
    row.set("Visibilidad en el catálogo", "visible");
    row.set("Descripción corta", ovr.desc_corta.as_str());
    row.set("Descripción", ovr.desc.as_str());
    row.set("Estado del impuesto", "taxable");
    row.set("¿Existencias?", "1");
    row.set("¿Permitir pedidos pendientes?", "0");
    row.set("¿Vendido individualmente?", "0");
    row.set_dims(&dims);
    row.set("Categorías", ruta);
    row.set("Etiquetas", etiquetas);

    row.set_attribute(1, "Talle", &talles, true);
    if input.colors.is_empty() {
        row.set_attribute(2, "Marca", &marca, true);
    } else {
        let colores = dedup_in_order(input.colors.iter().map(ColorEntry::display_name)).join(", ");
        row.set_attribute(2, "Color", &colores, true);
        row.set_attribute(3, "Marca", &marca, true);
    }

    row
}

/// Fila `variation` enlazada al padre por ID.
///
/// Las medidas se copian de los overrides del padre; no se re-derivan.
pub fn build_variation_row(
    headers: &[String],
    spec: &VariationSpec,
    parent_id: &str,
    parent_dims: &Dimensions,
) -> OutputRow {
    let mut row = OutputRow::new(headers);
    row.set("Tipo", "variation");
    row.set("SKU", spec.sku.as_str());
    row.set("Nombre", spec.name.as_str());
    row.set("Publicado", "1");
    row.set("¿Está destacado?", "0");
    row.set("Visibilidad en el catálogo", "visible");
    row.set("Estado del impuesto", "taxable");
    if !parent_id.trim().is_empty() {
        row.set("Superior", format!("id:{}", parent_id.trim()));
    }
    row.set_dims(parent_dims);

    row.set_attribute(1, "Talle", &spec.size_label, false);
    if let Some(color) = &spec.color {
        row.set_attribute(2, "Color", color.display_name(), false);
    }

    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dicts::tests::sample_registry;

    fn master() -> MasterAttributes {
        MasterAttributes {
            proveedor: "01".into(),
            familia: "01".into(),
            categoria: "10".into(),
            clasificacion: "01".into(),
            tipo: "01".into(),
            curva: "01".into(),
            descripcion: "Remera DryFit".into(),
        }
    }

    fn keys(row: &OutputRow) -> Vec<String> {
        row.headers().map(str::to_string).collect()
    }

    #[test]
    fn test_parent_row_without_colors() {
        let reg = sample_registry();
        let attrs = master();
        let overrides = Overrides::default();
        let sizes = vec!["S".to_string(), "M".to_string(), "S".to_string()];
        let row = build_parent_row(
            &reg,
            &ParentInput {
                sku: "A100",
                nombre: "Remera DryFit",
                attributes: &attrs,
                overrides: &overrides,
                sizes: &sizes,
                colors: &[],
            },
        );

        assert_eq!(keys(&row), reg.headers);
        assert_eq!(row.get("Tipo"), Some("variable"));
        assert_eq!(row.get("Valor(es) del atributo 1"), Some("S, M"));
        assert_eq!(row.get("Nombre del atributo 2"), Some("Marca"));
        assert_eq!(row.get("Valor(es) del atributo 2"), Some("Nike"));
        assert_eq!(row.get("Nombre del atributo 3"), Some(""));
        assert_eq!(row.get("Categorías"), Some("Hombre, Hombre > Remeras"));
        assert_eq!(
            row.get("Etiquetas"),
            Some("Remeras, Verano, Deportivo, Manga corta, Hombre, Nike")
        );
        assert_eq!(row.get("Peso (kg)"), Some("0.3"));
        assert_eq!(row.get("ID"), Some(""));
    }

    #[test]
    fn test_parent_row_with_colors_and_overrides() {
        let reg = sample_registry();
        let attrs = master();
        let overrides = Overrides {
            marca: "Marca Propia".into(),
            genero: "mujer".into(),
            categoria: "11".into(),
            tags: "Oferta | remeras".into(),
            dims: Dimensions {
                peso: "0.9".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let sizes = vec!["S/38".to_string()];
        let colors = vec![
            ColorEntry::new("001", "Negro"),
            ColorEntry::new("002", "Negro"),
            ColorEntry::new("003", ""),
        ];
        let row = build_parent_row(
            &reg,
            &ParentInput {
                sku: "A100",
                nombre: "Remera",
                attributes: &attrs,
                overrides: &overrides,
                sizes: &sizes,
                colors: &colors,
            },
        );

        assert_eq!(row.get("Nombre del atributo 2"), Some("Color"));
        assert_eq!(row.get("Valor(es) del atributo 2"), Some("Negro, 003"));
        assert_eq!(row.get("Nombre del atributo 3"), Some("Marca"));
        assert_eq!(row.get("Valor(es) del atributo 3"), Some("Marca Propia"));
        assert_eq!(row.get("Categorías"), Some("MUJER, MUJER > Pantalones"));
        assert_eq!(
            row.get("Etiquetas"),
            Some("Oferta, remeras, Deportivo, Manga corta, Mujer, Marca Propia")
        );
        // peso del override; el resto de la categoría PANTALONES (sin medidas)
        assert_eq!(row.get("Peso (kg)"), Some("0.9"));
        assert_eq!(row.get("Longitud (cm)"), Some(""));
    }

    #[test]
    fn test_variation_row_shape_and_link() {
        let reg = sample_registry();
        let spec = VariationSpec {
            sku: "A100001##S".into(),
            name: "Remera - Negro - S/38".into(),
            size_label: "S/38".into(),
            color: Some(ColorEntry::new("001", "Negro")),
        };
        let row = build_variation_row(&reg.headers, &spec, "4521", &Dimensions::default());

        assert_eq!(keys(&row), reg.headers);
        assert_eq!(row.get("Tipo"), Some("variation"));
        assert_eq!(row.get("Superior"), Some("id:4521"));
        assert_eq!(row.get("Valor(es) del atributo 1"), Some("S/38"));
        assert_eq!(row.get("Valor(es) del atributo 2"), Some("Negro"));
        assert_eq!(row.get("Atributo visible 1"), Some(""));
        assert_eq!(row.get("Peso (kg)"), Some(""));
    }

    #[test]
    fn test_unknown_columns_are_ignored() {
        let headers = vec!["SKU".to_string()];
        let mut row = OutputRow::new(&headers);
        row.set("Inventado", "x");
        row.set("SKU", "A1");
        assert_eq!(keys(&row), headers);
        assert_eq!(row.values().collect::<Vec<_>>(), vec!["A1"]);
    }
}

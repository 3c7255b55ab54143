use tracing::warn;

use crate::dicts::LookupRegistry;
use crate::models::{ColorEntry, MasterAttributes, SkippedCombination, VariationSpec};
use crate::text::split_list;

/// Separador entre la parte base/color y el token de talle.
pub const SIZE_SEPARATOR: &str = "##";

/// Token de SKU de un talle: lo que está antes de la primera "/", o el talle entero.
/// `None` si queda vacío ("", "  ", "/38").
pub fn size_token(label: &str) -> Option<String> {
    let raw = label.trim();
    let token = match raw.find('/') {
        Some(i) => raw[..i].trim(),
        None => raw,
    };
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Lista de talles del SKU: override explícito si hay, si no la curva.
pub fn resolve_sizes(
    attrs: &MasterAttributes,
    override_sizes: &str,
    registry: &LookupRegistry,
) -> Vec<String> {
    let from_override = split_list(override_sizes);
    if !from_override.is_empty() {
        return from_override;
    }
    registry.sizes_for_curve(&attrs.curva)
}

/// La curva no produjo ningún talle: el SKU no se expande.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptySizeCurve {
    pub sku: String,
    pub curva: String,
}

impl std::fmt::Display for EmptySizeCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.sku, self.curva)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    pub sizes: Vec<String>,
    pub variations: Vec<VariationSpec>,
    pub skipped: Vec<SkippedCombination>,
}

/// Expande un SKU base a sus variaciones (color × talle, o solo talle).
///
/// El orden es el de entrada: colores por fuera, talles por dentro.
/// Un talle sin token o un color sin código se descartan de a uno.
pub fn expand(
    base_sku: &str,
    parent_name: &str,
    attrs: &MasterAttributes,
    colors: &[ColorEntry],
    override_sizes: &str,
    registry: &LookupRegistry,
) -> Result<Expansion, EmptySizeCurve> {
    let base = base_sku.trim();
    let sizes = resolve_sizes(attrs, override_sizes, registry);
    if sizes.is_empty() {
        return Err(EmptySizeCurve {
            sku: base.to_string(),
            curva: attrs.curva.clone(),
        });
    }

    let mut expansion = Expansion {
        sizes: sizes.clone(),
        ..Default::default()
    };

    if colors.is_empty() {
        for label in &sizes {
            push_variation(&mut expansion, base, parent_name, None, label);
        }
        return Ok(expansion);
    }

    for color in colors {
        if color.code.trim().is_empty() {
            for label in &sizes {
                skip(&mut expansion, base, "", label, "color sin código");
            }
            continue;
        }
        for label in &sizes {
            push_variation(&mut expansion, base, parent_name, Some(color), label);
        }
    }

    Ok(expansion)
}

fn push_variation(
    expansion: &mut Expansion,
    base: &str,
    parent_name: &str,
    color: Option<&ColorEntry>,
    label: &str,
) {
    let color_code = color.map(|c| c.code.trim()).unwrap_or("");
    let Some(token) = size_token(label) else {
        skip(expansion, base, color_code, label, "talle sin token");
        return;
    };

    let sku = format!("{}{}{}{}", base, color_code, SIZE_SEPARATOR, token);
    let name = match color {
        Some(c) => format!("{} - {} - {}", parent_name, c.display_name(), label.trim()),
        None => format!("{} - {}", parent_name, label.trim()),
    };

    expansion.variations.push(VariationSpec {
        sku,
        name,
        size_label: label.trim().to_string(),
        color: color.cloned(),
    });
}

fn skip(expansion: &mut Expansion, base: &str, color_code: &str, label: &str, reason: &'static str) {
    warn!(sku = base, color = color_code, talle = label, reason, "combination skipped");
    expansion.skipped.push(SkippedCombination {
        sku: base.to_string(),
        color_code: color_code.to_string(),
        size_label: label.to_string(),
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dicts::tests::sample_registry;

    fn attrs_with_curve(curva: &str) -> MasterAttributes {
        MasterAttributes {
            curva: curva.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_size_token() {
        assert_eq!(size_token("S/38").as_deref(), Some("S"));
        assert_eq!(size_token(" 28 / 38 /x").as_deref(), Some("28"));
        assert_eq!(size_token("XL").as_deref(), Some("XL"));
        assert_eq!(size_token(" 02 ").as_deref(), Some("02"));
        assert_eq!(size_token("/38"), None);
        assert_eq!(size_token("   "), None);
    }

    #[test]
    fn test_override_wins_over_curve() {
        let reg = sample_registry();
        let sizes = resolve_sizes(&attrs_with_curve("01"), "U | 1;2", &reg);
        assert_eq!(sizes, vec!["U", "1", "2"]);
        let sizes = resolve_sizes(&attrs_with_curve("01"), "  ", &reg);
        assert_eq!(sizes, vec!["S/38", "M/40", "L/42", "XL/44"]);
    }

    #[test]
    fn test_expand_without_colors() {
        let reg = sample_registry();
        let exp = expand("A100", "Jean Recto", &attrs_with_curve("03"), &[], "", &reg).unwrap();
        let skus: Vec<&str> = exp.variations.iter().map(|v| v.sku.as_str()).collect();
        assert_eq!(skus, vec!["A100##28", "A100##30"]);
        assert_eq!(exp.variations[0].name, "Jean Recto - 28/38");
        assert!(exp.variations[0].color.is_none());
        assert!(exp.skipped.is_empty());
    }

    #[test]
    fn test_expand_colors_outer_sizes_inner() {
        let reg = sample_registry();
        let colors = vec![ColorEntry::new("001", "Negro"), ColorEntry::new("002", "")];
        let exp = expand("A100", "Remera", &attrs_with_curve("x"), &colors, "S/38,M/40", &reg).unwrap();
        let skus: Vec<&str> = exp.variations.iter().map(|v| v.sku.as_str()).collect();
        assert_eq!(
            skus,
            vec!["A100001##S", "A100001##M", "A100002##S", "A100002##M"]
        );
        assert_eq!(exp.variations[0].name, "Remera - Negro - S/38");
        assert_eq!(exp.variations[3].name, "Remera - 002 - M/40");
    }

    #[test]
    fn test_expand_skips_bad_sizes_and_colors_individually() {
        let reg = sample_registry();
        let colors = vec![
            ColorEntry {
                code: String::new(),
                name: "Sin código".into(),
            },
            ColorEntry::new("005", "Azul"),
        ];
        let exp = expand("B200", "Buzo", &MasterAttributes::default(), &colors, "M|/40", &reg).unwrap();
        let skus: Vec<&str> = exp.variations.iter().map(|v| v.sku.as_str()).collect();
        assert_eq!(skus, vec!["B200005##M"]);
        assert_eq!(exp.skipped.len(), 3);
        assert_eq!(exp.skipped[2].reason, "talle sin token");
        assert_eq!(exp.skipped[2].color_code, "005");
    }

    #[test]
    fn test_expand_empty_curve_is_error() {
        let reg = sample_registry();
        let err = expand("C300", "Gorra", &attrs_with_curve("999"), &[], "", &reg).unwrap_err();
        assert_eq!(err.sku, "C300");
        assert_eq!(err.to_string(), "C300\t999");
    }

    #[test]
    fn test_composite_sku_splits_back() {
        let reg = sample_registry();
        let colors = vec![ColorEntry::new("010", "Rojo")];
        let exp = expand("D400", "Campera", &attrs_with_curve("01"), &colors, "", &reg).unwrap();
        let tokens: Vec<String> = exp.sizes.iter().filter_map(|s| size_token(s)).collect();
        for v in &exp.variations {
            let (prefix, token) = v.sku.split_once(SIZE_SEPARATOR).unwrap();
            assert_eq!(prefix, "D400010");
            assert!(tokens.iter().any(|t| t == token));
        }
        assert_eq!(exp.variations.len(), 4);
    }
}

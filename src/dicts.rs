use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{AttributeField, Dimensions};
use crate::text::title_case;

pub const HEADERS_FILE: &str = "headers_woo.json";
pub const TIPIFICACIONES_FILE: &str = "tipificaciones_codigos.json";
pub const CORRESPONDENCIAS_FILE: &str = "correspondencias.json";

/// Diccionarios código -> nombre (tipificaciones_codigos.json).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tipificaciones {
    #[serde(default)]
    pub proveedores: HashMap<String, String>,
    #[serde(default)]
    pub familias: HashMap<String, String>,
    #[serde(default)]
    pub categorias: HashMap<String, String>,
    #[serde(default)]
    pub clasificaciones: HashMap<String, String>,
    #[serde(default)]
    pub tipos: HashMap<String, String>,
    #[serde(default)]
    pub curvas: HashMap<String, String>,
}

impl Tipificaciones {
    pub fn dictionary(&self, field: AttributeField) -> &HashMap<String, String> {
        match field {
            AttributeField::Proveedor => &self.proveedores,
            AttributeField::Familia => &self.familias,
            AttributeField::Categoria => &self.categorias,
            AttributeField::Clasificacion => &self.clasificaciones,
            AttributeField::Tipo => &self.tipos,
            AttributeField::Curva => &self.curvas,
        }
    }

    /// Nombre para un código, o "" si no está.
    pub fn name(&self, field: AttributeField, code: &str) -> &str {
        self.dictionary(field)
            .get(code.trim())
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Tablas de correspondencia (correspondencias.json).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Correspondencias {
    /// categoría -> género -> ruta de categorías Woo
    #[serde(default)]
    pub categoria_map: HashMap<String, HashMap<String, String>>,
    #[serde(default)]
    pub etiquetas_base_por_categoria: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub clasificacion_tags_map: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub tipo_tags_map: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub dimensiones_por_categoria: HashMap<String, Dimensions>,
    /// nombre de curva -> talles. BTreeMap: el barrido por inclusión parcial
    /// recorre los nombres en orden estable.
    #[serde(default)]
    pub curva_talles_map: BTreeMap<String, Vec<String>>,
}

/// Etiquetas crudas por origen, antes de unirlas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagSources {
    pub base: Vec<String>,
    pub clasificacion: Vec<String>,
    pub tipo: Vec<String>,
    pub genero: String,
    pub marca: String,
}

/// Registro de búsquedas estáticas, cargado una vez por corrida.
#[derive(Debug, Clone, Default)]
pub struct LookupRegistry {
    pub headers: Vec<String>,
    pub tipificaciones: Tipificaciones,
    pub correspondencias: Correspondencias,
    curvas_by_name: Vec<(String, Vec<String>)>,
}

impl LookupRegistry {
    pub fn new(
        headers: Vec<String>,
        tipificaciones: Tipificaciones,
        correspondencias: Correspondencias,
    ) -> Self {
        // Claves en minúsculas para el matching tolerante de curvas
        let curvas_by_name = correspondencias
            .curva_talles_map
            .iter()
            .map(|(name, list)| {
                let sizes = list
                    .iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                (name.trim().to_lowercase(), sizes)
            })
            .collect();

        Self {
            headers,
            tipificaciones,
            correspondencias,
            curvas_by_name,
        }
    }

    /// Carga headers_woo.json, tipificaciones_codigos.json y correspondencias.json.
    pub fn load(config_dir: &Path) -> CatalogResult<Self> {
        let headers: Vec<String> = read_json(&config_dir.join(HEADERS_FILE))?;
        if headers.is_empty() {
            return Err(CatalogError::Config {
                file: HEADERS_FILE.to_string(),
                message: "header list is empty".to_string(),
            });
        }
        let tipificaciones = read_json(&config_dir.join(TIPIFICACIONES_FILE))?;
        let correspondencias = read_json(&config_dir.join(CORRESPONDENCIAS_FILE))?;

        Ok(Self::new(headers, tipificaciones, correspondencias))
    }

    /// Ruta de categorías: tabla categoría+género, si no "GEN, GEN > Categoria".
    pub fn categoria_ruta(&self, categoria: &str, genero: &str) -> String {
        if let Some(ruta) = self
            .correspondencias
            .categoria_map
            .get(categoria)
            .and_then(|by_gender| by_gender.get(genero))
        {
            return ruta.clone();
        }

        if genero.is_empty() || categoria.is_empty() {
            return String::new();
        }
        let gen = genero.to_uppercase();
        format!("{}, {} > {}", gen, gen, title_case(categoria))
    }

    pub fn tag_sources(
        &self,
        categoria: &str,
        clasificacion: &str,
        tipo: &str,
        genero: &str,
        marca: &str,
    ) -> TagSources {
        let corr = &self.correspondencias;
        TagSources {
            base: corr.etiquetas_base_por_categoria.get(categoria).cloned().unwrap_or_default(),
            clasificacion: corr.clasificacion_tags_map.get(clasificacion).cloned().unwrap_or_default(),
            tipo: corr.tipo_tags_map.get(tipo).cloned().unwrap_or_default(),
            genero: title_case(genero),
            marca: marca.trim().to_string(),
        }
    }

    pub fn dimensiones(&self, categoria: &str) -> Dimensions {
        self.correspondencias
            .dimensiones_por_categoria
            .get(categoria)
            .cloned()
            .unwrap_or_default()
    }

    /// Talles de una curva dada como código ("03") o nombre ("NIÑO (02 al 20)").
    ///
    /// Orden de intento: código -> nombre -> talles; el valor crudo como nombre;
    /// inclusión parcial sin distinguir mayúsculas. Vacío si nada coincide.
    pub fn sizes_for_curve(&self, curva: &str) -> Vec<String> {
        let raw = curva.trim();
        if raw.is_empty() {
            return Vec::new();
        }

        let mut needles: Vec<String> = Vec::new();
        let name = self.tipificaciones.name(AttributeField::Curva, raw);
        if !name.is_empty() {
            needles.push(name.trim().to_lowercase());
        }
        needles.push(raw.to_lowercase());

        for needle in &needles {
            if let Some(sizes) = self.exact_curve(needle) {
                return sizes.clone();
            }
        }

        for needle in &needles {
            let hit = self
                .curvas_by_name
                .iter()
                .find(|(name_lc, sizes)| !sizes.is_empty() && name_lc.contains(needle.as_str()));
            if let Some((_, sizes)) = hit {
                return sizes.clone();
            }
        }

        Vec::new()
    }

    fn exact_curve(&self, name_lc: &str) -> Option<&Vec<String>> {
        self.curvas_by_name
            .iter()
            .find(|(name, sizes)| name == name_lc && !sizes.is_empty())
            .map(|(_, sizes)| sizes)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CatalogResult<T> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound(path.display().to_string()));
    }
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| CatalogError::Config {
        file: path.display().to_string(),
        message: e.to_string(),
    })
}

use crate::schema::{BoxesFile, Catalog, CatalogFiles, NamePools, Rarity};
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

const RARITIES_FILE: &str = "rarities.json";
const BOXES_FILE: &str = "boxes.json";
const NAMES_FILE: &str = "names.json";

const BUILTIN_RARITIES: &str = include_str!("../../../assets/rarities.json");
const BUILTIN_BOXES: &str = include_str!("../../../assets/boxes.json");
const BUILTIN_NAMES: &str = include_str!("../../../assets/names.json");

pub fn load_catalog_files(dir: &Path) -> anyhow::Result<CatalogFiles> {
    let rarities: Vec<Rarity> = load_json(dir.join(RARITIES_FILE))?;
    let boxes: BoxesFile = load_json(dir.join(BOXES_FILE))?;
    let names: NamePools = load_json(dir.join(NAMES_FILE))?;
    Ok(CatalogFiles {
        rarities,
        boxes,
        names,
    })
}

/// Loads and validates the catalog stored in `dir`.
pub fn load_catalog(dir: &Path) -> anyhow::Result<Catalog> {
    let files = load_catalog_files(dir)?;
    let catalog = files
        .into_catalog()
        .with_context(|| format!("validate catalog in {}", dir.display()))?;
    log::debug!(
        "loaded catalog from {}: {} rarities, {} boxes",
        dir.display(),
        catalog.rarities().len(),
        catalog.boxes().len()
    );
    Ok(catalog)
}

/// The catalog shipped in `assets/`, compiled into the binary.
pub fn builtin_catalog() -> anyhow::Result<Catalog> {
    let rarities: Vec<Rarity> =
        serde_json::from_str(BUILTIN_RARITIES).context("parse builtin rarities")?;
    let boxes: BoxesFile = serde_json::from_str(BUILTIN_BOXES).context("parse builtin boxes")?;
    let names: NamePools = serde_json::from_str(BUILTIN_NAMES).context("parse builtin names")?;
    let catalog = CatalogFiles {
        rarities,
        boxes,
        names,
    }
    .into_catalog()
    .context("validate builtin catalog")?;
    Ok(catalog)
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

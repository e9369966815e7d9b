use serde::{Deserialize, Serialize};

pub use cerealbox_core::{BoxDef, Catalog, CatalogError, NamePools, NameTier, Rarity, Slot};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxesFile {
    pub default_box: String,
    pub boxes: Vec<BoxDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFiles {
    pub rarities: Vec<Rarity>,
    pub boxes: BoxesFile,
    pub names: NamePools,
}

impl CatalogFiles {
    pub fn into_catalog(self) -> Result<Catalog, CatalogError> {
        Catalog::new(
            self.rarities,
            self.boxes.boxes,
            self.names,
            &self.boxes.default_box,
        )
    }
}

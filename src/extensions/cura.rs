//! Cura slicer data

use crate::extension::{Asset, Extension};

/// Package directory and extension name used by Cura
pub const CURA_DIRECTORY: &str = "Cura";

/// Assets Cura stores under `Cura/` (machine and quality definitions)
///
/// # Example
///
/// ```
/// use threemf::{Asset, CuraExtension, Extension};
///
/// let mut cura = CuraExtension::default();
/// cura.add_asset(Asset::structured(
///     "printer.def.json",
///     serde_json::json!({ "test": 100 }),
/// ));
/// assert_eq!(cura.name(), "Cura");
/// assert_eq!(cura.assets().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CuraExtension {
    assets: Vec<Asset>,
}

impl Extension for CuraExtension {
    fn name(&self) -> &str {
        CURA_DIRECTORY
    }

    fn directory(&self) -> &str {
        CURA_DIRECTORY
    }

    fn assets(&self) -> &[Asset] {
        &self.assets
    }

    fn assets_mut(&mut self) -> &mut Vec<Asset> {
        &mut self.assets
    }
}

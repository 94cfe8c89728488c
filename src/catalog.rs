use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::nutrient_parser::parse_nutrients;

// Expected column headers in the recipe catalog CSV.
const NAME_COL: &str = "name";
const URL_COL: &str = "url";
const IMAGE_COL: &str = "image";
const NUTRIENTS_COL: &str = "nutrients";

// Placeholder link for catalog rows without a url column.
const MISSING_URL: &str = "#";

/// The four macro values describing a nutritional quantity.
/// All values are non-negative; construction from raw data goes through
/// [`parse_nutrients`](crate::nutrient_parser::parse_nutrients), which
/// rejects records that would violate that.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct MacroProfile {
    pub calories: f32,
    pub protein: f32,
    pub carbs: f32,
    pub fats: f32,
}

impl MacroProfile {
    pub fn as_array(&self) -> [f32; 4] {
        [self.calories, self.protein, self.carbs, self.fats]
    }
}

/// One catalog entry. `macros` is `None` when the raw nutrient record did
/// not parse; such entries stay in the catalog (they keep their position)
/// but are excluded from matching.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecipeRecord {
    pub name: String,
    pub url: String,
    pub image: String,
    pub macros: Option<MacroProfile>,
}

/// Loads the recipe catalog from a CSV file.
///
/// Requires `name` and `nutrients` columns; `url` and `image` are optional
/// and default to `"#"` / `""`. Rows with an empty name are skipped.
/// Nutrient records are parsed eagerly, exactly once per row.
pub fn load_recipe_catalog(csv_path: &Path) -> Result<Vec<RecipeRecord>> {
    if !csv_path.exists() {
        return Err(anyhow::anyhow!(
            "Recipe catalog CSV not found at: {:?}",
            csv_path
        ));
    }

    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open recipe catalog CSV at {:?}", csv_path))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = rdr.headers()?.clone();

    let name_idx = headers
        .iter()
        .position(|h| h == NAME_COL)
        .ok_or_else(|| anyhow::anyhow!("Column '{}' not found", NAME_COL))?;
    let nutrients_idx = headers
        .iter()
        .position(|h| h == NUTRIENTS_COL)
        .ok_or_else(|| anyhow::anyhow!("Column '{}' not found", NUTRIENTS_COL))?;
    // url/image are rendering extras, absent from some dataset exports.
    let url_idx = headers.iter().position(|h| h == URL_COL);
    let image_idx = headers.iter().position(|h| h == IMAGE_COL);

    let mut records = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record =
            result.with_context(|| format!("Failed to read record at row index {}", row_index))?;

        let name = record
            .get(name_idx)
            .ok_or_else(|| anyhow::anyhow!("Missing name at row {}", row_index))?
            .trim()
            .to_string();
        if name.is_empty() {
            continue;
        }

        let url = url_idx
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(MISSING_URL)
            .to_string();
        let image = image_idx
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .unwrap_or("")
            .to_string();
        let macros = record.get(nutrients_idx).and_then(parse_nutrients);

        records.push(RecipeRecord {
            name,
            url,
            image,
            macros,
        });
    }

    Ok(records)
}

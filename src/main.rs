use anyhow::{Context, Result};
use macromatch::catalog::{load_recipe_catalog, MacroProfile};
use macromatch::cli::parse_args;
use macromatch::matcher::MatcherIndex;
use macromatch::targets::TargetProfile;
use std::path::Path;

// Environment variable naming the catalog CSV, loadable from a .env file.
const RECIPES_CSV_ENV_VAR: &str = "RECIPES_CSV";
const DEFAULT_RECIPES_CSV: &str = "recipes.csv";

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = parse_args();
    let csv_path = cli
        .recipes_file
        .clone()
        .or_else(|| std::env::var(RECIPES_CSV_ENV_VAR).ok())
        .unwrap_or_else(|| DEFAULT_RECIPES_CSV.to_string());

    println!("Loading recipe catalog from '{}'...", csv_path);
    let records = load_recipe_catalog(Path::new(&csv_path))
        .with_context(|| format!("Failed to load recipe catalog from '{}'", csv_path))?;
    println!("Catalog loaded: {} records.", records.len());

    let index = MatcherIndex::new(records, cli.weights())
        .context("Failed to build recipe matcher index")?;

    let daily = MacroProfile {
        calories: cli.calories,
        protein: cli.protein,
        carbs: cli.carbs,
        fats: cli.fats,
    };
    let target = TargetProfile::per_meal(&daily, cli.meals)
        .context("Invalid target macros")?;
    println!(
        "\nPer-meal target ({} meals): {:.0} kcal, {:.0}g protein, {:.0}g carbs, {:.0}g fats",
        cli.meals,
        target.macros.calories,
        target.macros.protein,
        target.macros.carbs,
        target.macros.fats
    );

    let matches = index
        .rank(&target, cli.top_n, cli.strategy.into())
        .context("Matching failed")?;

    if matches.is_empty() {
        println!("\nNo recipes with usable nutrient data matched the query.");
        return Ok(());
    }

    println!("\nTop {} matches:", matches.len());
    for (rank, matched) in matches.iter().enumerate() {
        println!(
            "{:>3}. {} (score {:.2})",
            rank + 1,
            matched.name,
            matched.score
        );
        println!(
            "     {:.0} kcal | {:.0}g protein | {:.0}g carbs | {:.0}g fats",
            matched.macros.calories,
            matched.macros.protein,
            matched.macros.carbs,
            matched.macros.fats
        );
        println!("     {}", matched.url);
    }

    Ok(())
}

use clap::{Parser, ValueEnum};

use crate::matcher::MatchStrategy;
use crate::targets::MacroWeights;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Daily calorie target (kcal)
    #[arg(long)]
    pub calories: f32,

    /// Daily protein target (g)
    #[arg(long)]
    pub protein: f32,

    /// Daily carbohydrate target (g)
    #[arg(long)]
    pub carbs: f32,

    /// Daily fat target (g)
    #[arg(long)]
    pub fats: f32,

    /// Number of meals the daily targets are split across
    #[arg(long, default_value_t = 3)]
    pub meals: u32,

    /// Maximum number of matches to return
    #[arg(long, default_value_t = 10)]
    pub top_n: usize,

    /// Ranking strategy
    #[arg(long, value_enum, default_value = "weighted-deviation")]
    pub strategy: StrategyArg,

    /// Path to the recipe catalog CSV. Falls back to the RECIPES_CSV
    /// environment variable, then to "recipes.csv".
    #[arg(long)]
    pub recipes_file: Option<String>,

    /// Override the calorie deviation weight
    #[arg(long)]
    pub weight_calories: Option<f32>,

    /// Override the protein deviation weight
    #[arg(long)]
    pub weight_protein: Option<f32>,

    /// Override the carbohydrate deviation weight
    #[arg(long)]
    pub weight_carbs: Option<f32>,

    /// Override the fat deviation weight
    #[arg(long)]
    pub weight_fats: Option<f32>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    WeightedDeviation,
    NearestNeighbor,
}

impl From<StrategyArg> for MatchStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::WeightedDeviation => MatchStrategy::WeightedDeviation,
            StrategyArg::NearestNeighbor => MatchStrategy::NearestNeighbor,
        }
    }
}

impl Cli {
    /// Deviation weights: the defaults, with any per-macro overrides from
    /// the command line applied. Validation happens at index build.
    pub fn weights(&self) -> MacroWeights {
        let defaults = MacroWeights::default();
        MacroWeights {
            calories: self.weight_calories.unwrap_or(defaults.calories),
            protein: self.weight_protein.unwrap_or(defaults.protein),
            carbs: self.weight_carbs.unwrap_or(defaults.carbs),
            fats: self.weight_fats.unwrap_or(defaults.fats),
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from([
            "macromatch",
            "--calories",
            "2842",
            "--protein",
            "173",
            "--carbs",
            "379",
            "--fats",
            "81",
        ]);
        assert_eq!(cli.meals, 3);
        assert_eq!(cli.top_n, 10);
        assert_eq!(cli.strategy, StrategyArg::WeightedDeviation);
        assert_eq!(cli.weights(), MacroWeights::default());
    }

    #[test]
    fn test_weight_overrides() {
        let cli = Cli::parse_from([
            "macromatch",
            "--calories",
            "2000",
            "--protein",
            "150",
            "--carbs",
            "200",
            "--fats",
            "70",
            "--weight-protein",
            "2.0",
            "--weight-fats",
            "0.5",
        ]);
        let weights = cli.weights();
        assert_eq!(weights.calories, 1.0);
        assert_eq!(weights.protein, 2.0);
        assert_eq!(weights.carbs, 1.0);
        assert_eq!(weights.fats, 0.5);
    }

    #[test]
    fn test_strategy_flag() {
        let cli = Cli::parse_from([
            "macromatch",
            "--calories",
            "2000",
            "--protein",
            "150",
            "--carbs",
            "200",
            "--fats",
            "70",
            "--strategy",
            "nearest-neighbor",
        ]);
        assert_eq!(MatchStrategy::from(cli.strategy), MatchStrategy::NearestNeighbor);
    }
}

pub mod catalog;
pub mod cli;
pub mod matcher;
pub mod nutrient_parser;
pub mod search;
pub mod targets;

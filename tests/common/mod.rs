#![allow(dead_code)]

use cody::Result;
use cody::config::{Configuration, PruningMode};
use cody::source::Row;

pub fn rows(data: &[&[&str]]) -> Vec<Result<Row>> {
    data.iter()
        .map(|row| Ok(row.iter().map(|cell| cell.to_string()).collect()))
        .collect()
}

/// One row per mask, an empty cell where the mask is true.
pub fn mask_rows(masks: &[Vec<bool>]) -> Vec<Result<Row>> {
    masks
        .iter()
        .map(|mask| {
            Ok(mask
                .iter()
                .map(|&null| if null { String::new() } else { "x".to_string() })
                .collect())
        })
        .collect()
}

/// Headerless configuration with empty cells as nulls.
pub fn configuration(min_support: f64, pruning: PruningMode) -> Configuration {
    Configuration {
        has_header: false,
        min_support,
        pruning,
        ..Configuration::default()
    }
}

pub const MODES: [PruningMode; 2] = [PruningMode::Clique, PruningMode::Component];

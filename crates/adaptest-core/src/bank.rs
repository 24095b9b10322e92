//! TOML item-bank loader.
//!
//! Loads item banks from TOML files and directories, and validates them.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{CandidateItem, CefrLevel, Difficulty, ItemBank, THETA_MAX, THETA_MIN};
use crate::scoring::difficulty_to_cefr;

/// Intermediate TOML structure for parsing item-bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    items: Vec<TomlItem>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlItem {
    id: String,
    #[serde(default)]
    difficulty: Option<Difficulty>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Parse a single TOML file into an `ItemBank`.
pub fn parse_item_bank(path: &Path) -> Result<ItemBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read item bank file: {}", path.display()))?;

    parse_item_bank_str(&content, path)
}

/// Parse a TOML string into an `ItemBank` (useful for testing).
pub fn parse_item_bank_str(content: &str, source_path: &Path) -> Result<ItemBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let items = parsed
        .items
        .into_iter()
        .map(|i| CandidateItem {
            id: i.id,
            difficulty: i.difficulty.unwrap_or_default(),
            category: i.category,
            tags: i.tags,
        })
        .collect();

    Ok(ItemBank {
        id: parsed.bank.id,
        name: parsed.bank.name,
        description: parsed.bank.description,
        items,
    })
}

/// Recursively load all `.toml` item banks from a directory.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<ItemBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_item_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// Load a bank file, or every bank in a directory.
pub fn load_banks(path: &Path) -> Result<Vec<ItemBank>> {
    if path.is_dir() {
        load_bank_directory(path)
    } else {
        Ok(vec![parse_item_bank(path)?])
    }
}

/// Merge several banks into one pool, keeping the first bank's identity.
pub fn merge_banks(banks: Vec<ItemBank>) -> Option<ItemBank> {
    let mut iter = banks.into_iter();
    let mut merged = iter.next()?;
    for bank in iter {
        merged.items.extend(bank.items);
    }
    Some(merged)
}

/// A warning from item-bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The item ID (if applicable).
    pub item_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate an item bank for common issues.
pub fn validate_item_bank(bank: &ItemBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if bank.items.is_empty() {
        warnings.push(ValidationWarning {
            item_id: None,
            message: "bank contains no items".into(),
        });
        return warnings;
    }

    let mut seen_ids = HashSet::new();
    for item in &bank.items {
        if item.id.trim().is_empty() {
            warnings.push(ValidationWarning {
                item_id: None,
                message: "item with empty id".into(),
            });
        } else if !seen_ids.insert(&item.id) {
            warnings.push(ValidationWarning {
                item_id: Some(item.id.clone()),
                message: format!("duplicate item ID: {}", item.id),
            });
        }
    }

    for item in &bank.items {
        match &item.difficulty {
            Difficulty::Label(label) if label.parse::<CefrLevel>().is_err() => {
                warnings.push(ValidationWarning {
                    item_id: Some(item.id.clone()),
                    message: format!("unknown difficulty level '{label}' (treated as B1)"),
                });
            }
            Difficulty::Numeric(b) if !b.is_finite() => {
                warnings.push(ValidationWarning {
                    item_id: Some(item.id.clone()),
                    message: format!("non-finite difficulty {b}"),
                });
            }
            Difficulty::Numeric(b) if !(THETA_MIN..=THETA_MAX).contains(b) => {
                warnings.push(ValidationWarning {
                    item_id: Some(item.id.clone()),
                    message: format!("difficulty {b} is outside the ability scale [-4, 4]"),
                });
            }
            _ => {}
        }
    }

    let coverage = level_coverage(bank);
    for level in CefrLevel::ALL {
        if coverage.get(&level).copied().unwrap_or(0) == 0 {
            warnings.push(ValidationWarning {
                item_id: None,
                message: format!("no items at level {level}"),
            });
        }
    }

    warnings
}

/// Number of items per CEFR level. Numeric difficulties are bucketed by the
/// level thresholds; unrecognised labels are not counted.
pub fn level_coverage(bank: &ItemBank) -> BTreeMap<CefrLevel, usize> {
    let mut coverage = BTreeMap::new();
    for item in &bank.items {
        let level = match &item.difficulty {
            Difficulty::Label(label) => label.parse::<CefrLevel>().ok(),
            Difficulty::Numeric(b) if b.is_finite() => Some(difficulty_to_cefr(*b)),
            Difficulty::Numeric(_) => None,
        };
        if let Some(level) = level {
            *coverage.entry(level).or_insert(0) += 1;
        }
    }
    coverage
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[bank]
id = "grammar-core"
name = "Grammar Core"
description = "Multiple-choice grammar items"

[[items]]
id = "g-a1-1"
difficulty = "A1"
category = "grammar"

[[items]]
id = "g-a2-1"
difficulty = "A2"

[[items]]
id = "g-b1-1"
difficulty = "B1"
tags = ["tenses"]

[[items]]
id = "g-b2-1"
difficulty = 1.2

[[items]]
id = "g-c1-1"
difficulty = "C1"

[[items]]
id = "g-c2-1"
difficulty = "C2"
"#;

    #[test]
    fn parse_valid_toml() {
        let bank = parse_item_bank_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(bank.id, "grammar-core");
        assert_eq!(bank.name, "Grammar Core");
        assert_eq!(bank.items.len(), 6);
        assert_eq!(bank.items[0].category.as_deref(), Some("grammar"));
        assert_eq!(bank.items[2].tags, vec!["tenses"]);
        assert_eq!(bank.items[3].difficulty, Difficulty::Numeric(1.2));
        assert!(validate_item_bank(&bank).is_empty());
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[bank]
id = "minimal"
name = "Minimal"

[[items]]
id = "q1"
"#;
        let bank = parse_item_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(bank.description, "");
        assert_eq!(bank.items[0].difficulty.level(), Some(CefrLevel::B1));
        assert!(bank.items[0].tags.is_empty());
    }

    #[test]
    fn validate_duplicates_and_unknown_levels() {
        let toml = r#"
[bank]
id = "dupes"
name = "Dupes"

[[items]]
id = "same"
difficulty = "B1"

[[items]]
id = "same"
difficulty = "Expert"

[[items]]
id = "wild"
difficulty = 6.5
"#;
        let bank = parse_item_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_item_bank(&bank);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
        assert!(warnings.iter().any(|w| w.message.contains("unknown difficulty")));
        assert!(warnings.iter().any(|w| w.message.contains("outside the ability scale")));
        assert!(warnings.iter().any(|w| w.message == "no items at level A1"));
    }

    #[test]
    fn validate_empty_bank() {
        let bank = ItemBank {
            id: "empty".into(),
            name: "Empty".into(),
            description: String::new(),
            items: vec![],
        };
        let warnings = validate_item_bank(&bank);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("no items"));
    }

    #[test]
    fn coverage_buckets_numeric_difficulties() {
        let bank = parse_item_bank_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        let coverage = level_coverage(&bank);
        assert_eq!(coverage.get(&CefrLevel::B2), Some(&1));
        assert_eq!(coverage.values().sum::<usize>(), 6);
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_item_bank_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_directory_and_merge() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), VALID_TOML).unwrap();
        std::fs::write(
            dir.path().join("b.toml"),
            "[bank]\nid = \"extra\"\nname = \"Extra\"\n\n[[items]]\nid = \"x1\"\ndifficulty = \"B2\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not toml [").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let banks = load_bank_directory(dir.path()).unwrap();
        assert_eq!(banks.len(), 2);
        assert_eq!(banks[0].id, "grammar-core");

        let merged = merge_banks(banks).unwrap();
        assert_eq!(merged.id, "grammar-core");
        assert_eq!(merged.items.len(), 7);
        assert!(merge_banks(vec![]).is_none());
    }

    #[test]
    fn load_banks_rejects_missing_file() {
        assert!(load_banks(&PathBuf::from("definitely-missing.toml")).is_err());
    }
}

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use clap::ValueEnum;
use once_cell::sync::OnceCell;
use serde::Deserialize;

/// Rarity tiers, ordered from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, ValueEnum)]
pub enum Quality {
    Common,
    Uncommon,
    Rare,
    Legendary,
    Mythical,
    Divine,
    Prismatic,
    #[serde(alias = "Transcendant")]
    Transcendent,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Common => "Common",
            Self::Uncommon => "Uncommon",
            Self::Rare => "Rare",
            Self::Legendary => "Legendary",
            Self::Mythical => "Mythical",
            Self::Divine => "Divine",
            Self::Prismatic => "Prismatic",
            Self::Transcendent => "Transcendent",
        };
        write!(f, "{label}")
    }
}

impl FromStr for Quality {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "common" => Ok(Self::Common),
            "uncommon" => Ok(Self::Uncommon),
            "rare" => Ok(Self::Rare),
            "legendary" => Ok(Self::Legendary),
            "mythical" => Ok(Self::Mythical),
            "divine" => Ok(Self::Divine),
            "prismatic" => Ok(Self::Prismatic),
            "transcendent" | "transcendant" => Ok(Self::Transcendent),
            other => Err(anyhow!("unknown quality: {other}")),
        }
    }
}

/// Item name to quality lookup, loaded from `item_qualities.yml`.
#[derive(Debug, Clone, Default)]
pub struct QualityTable {
    by_name: HashMap<String, Quality>,
}

#[derive(Debug, Deserialize)]
struct QualityConfig {
    qualities: BTreeMap<Quality, Vec<String>>,
}

static BUILTIN: OnceCell<QualityTable> = OnceCell::new();

impl QualityTable {
    pub const FILE_NAME: &'static str = "item_qualities.yml";

    const BUILTIN_YAML: &'static str = include_str!("../../item_qualities.yml");

    #[cfg(test)]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Quality)>,
        S: Into<String>,
    {
        Self {
            by_name: entries
                .into_iter()
                .map(|(name, quality)| (name.into(), quality))
                .collect(),
        }
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: QualityConfig =
            serde_yaml::from_str(raw).context("failed to parse item qualities")?;

        let mut by_name = HashMap::new();
        for (quality, names) in config.qualities {
            for name in names {
                if let Some(previous) = by_name.insert(name.clone(), quality) {
                    bail!("item \"{name}\" is listed as both {previous} and {quality}");
                }
            }
        }

        if by_name.is_empty() {
            bail!("item qualities must not be empty");
        }

        Ok(Self { by_name })
    }

    /// Reads the table at `path`, falling back to the bundled copy when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_yaml(&raw)
                .with_context(|| format!("invalid item qualities in {}", path.display())),
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "item qualities file not found, using bundled table");
                Self::builtin().cloned()
            }
            Err(error) => Err(anyhow::Error::new(error)
                .context(format!("failed to read item qualities {}", path.display()))),
        }
    }

    pub fn builtin() -> Result<&'static QualityTable> {
        BUILTIN.get_or_try_init(|| Self::from_yaml(Self::BUILTIN_YAML))
    }

    pub fn quality_of(&self, name: &str) -> Option<Quality> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_parses_and_classifies() {
        let table = QualityTable::builtin().unwrap();

        assert_eq!(table.quality_of("Carrot"), Some(Quality::Common));
        assert_eq!(table.quality_of("Ember Lily"), Some(Quality::Prismatic));
        assert_eq!(table.quality_of("Bone Blossom"), Some(Quality::Transcendent));
        assert_eq!(table.quality_of("Not A Plant"), None);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let raw = "qualities:\n  Common: [Carrot]\n  Rare: [Carrot]\n";

        let error = QualityTable::from_yaml(raw).unwrap_err();
        assert!(error.to_string().contains("Carrot"));
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let table = QualityTable::load("/definitely/not/here/item_qualities.yml").unwrap();
        assert_eq!(table.len(), QualityTable::builtin().unwrap().len());
    }

    #[test]
    fn tiers_are_ordered_by_rarity() {
        assert!(Quality::Prismatic > Quality::Divine);
        assert!(Quality::Transcendent > Quality::Prismatic);
        assert_eq!("Transcendant".parse::<Quality>().unwrap(), Quality::Transcendent);
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use pagestate_core::state::{contains_ci, Entity};

use super::ascension::{AscensionCost, AscensionGoal};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Lowercase slug, e.g. "hu-tao".
    pub id: String,
    pub name: String,
    pub element: String,
    pub weapon: String,
    pub rarity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterFilter {
    Search,
    Element,
    Weapon,
    Rarity,
}

impl fmt::Display for CharacterFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CharacterFilter::Search => "search",
            CharacterFilter::Element => "element",
            CharacterFilter::Weapon => "weapon",
            CharacterFilter::Rarity => "rarity",
        })
    }
}

impl FromStr for CharacterFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(CharacterFilter::Search),
            "element" => Ok(CharacterFilter::Element),
            "weapon" => Ok(CharacterFilter::Weapon),
            "rarity" => Ok(CharacterFilter::Rarity),
            other => Err(format!("unknown character filter: {other}")),
        }
    }
}

impl Entity for Character {
    type Id = String;
    type FilterKey = CharacterFilter;

    const SEARCH: CharacterFilter = CharacterFilter::Search;

    fn id(&self) -> &String {
        &self.id
    }

    fn matches(&self, key: CharacterFilter, value: &str) -> bool {
        let value = value.trim();
        match key {
            CharacterFilter::Search => contains_ci(&self.name, value),
            CharacterFilter::Element => self.element.eq_ignore_ascii_case(value),
            CharacterFilter::Weapon => self.weapon.eq_ignore_ascii_case(value),
            CharacterFilter::Rarity => value
                .trim_end_matches('*')
                .parse::<u8>()
                .map(|r| r == self.rarity)
                .unwrap_or(true),
        }
    }
}

/// "Hu Tao" -> "hu-tao"
pub fn slug(name: &str) -> String {
    name.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerExtra {
    #[serde(default)]
    pub goals: BTreeMap<String, AscensionGoal>,
}

impl PlannerExtra {
    /// Combined cost of every goal whose character is in `roster`.
    pub fn total_cost<'a>(&self, roster: impl IntoIterator<Item = &'a String>) -> AscensionCost {
        let mut total = AscensionCost::default();
        for id in roster {
            if let Some(goal) = self.goals.get(id) {
                total += goal.cost();
            }
        }
        total
    }
}

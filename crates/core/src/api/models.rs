//! # Catalog Models
//!
//! Typed views over catalog API responses. Entries keep the full response
//! body in `raw` so callers can reach fields the typed view does not model.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{CatalogError, Result};

/// One catalog entry (a Pokémon)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stable positive identifier
    pub id: u32,
    #[serde(default)]
    pub name: String,
    /// Type names in slot order
    #[serde(default)]
    pub types: Vec<String>,
    /// Official artwork, falling back to the default sprite
    #[serde(default)]
    pub artwork: Option<String>,
    /// Normalized API body
    #[serde(default)]
    pub raw: Value,
}

impl CatalogEntry {
    /// Build an entry from a `/pokemon/{id}` response body.
    ///
    /// Synthesizes `sprites.other["official-artwork"].front_default` from
    /// `sprites.front_default` when the official artwork is absent.
    pub fn from_api(mut raw: Value) -> Result<Self> {
        normalize_artwork(&mut raw);

        let id = raw
            .get("id")
            .and_then(Value::as_u64)
            .and_then(|id| u32::try_from(id).ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| CatalogError::decode("Pokémon", "missing or invalid `id`"))?;

        let name = raw
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| CatalogError::decode(format!("Pokémon {}", id), "missing `name`"))?
            .to_string();

        let types = raw
            .get("types")
            .and_then(Value::as_array)
            .map(|slots| {
                slots
                    .iter()
                    .filter_map(|slot| slot.pointer("/type/name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let artwork = artwork_url(&raw);

        Ok(Self {
            id,
            name,
            types,
            artwork,
            raw,
        })
    }

    /// First type name, used for type sorting
    pub fn primary_type(&self) -> &str {
        self.types.first().map(String::as_str).unwrap_or("")
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.iter().any(|t| t == type_name)
    }
}

const OFFICIAL_ARTWORK: &str = "/sprites/other/official-artwork/front_default";

fn normalize_artwork(raw: &mut Value) {
    let has_official = raw
        .pointer(OFFICIAL_ARTWORK)
        .map(|v| matches!(v, Value::String(s) if !s.is_empty()))
        .unwrap_or(false);
    if has_official {
        return;
    }

    let Some(sprites) = raw.get_mut("sprites").and_then(Value::as_object_mut) else {
        return;
    };
    let fallback = sprites.get("front_default").cloned().unwrap_or(Value::Null);

    let other = sprites
        .entry("other")
        .or_insert_with(|| Value::Object(Default::default()));
    if !other.is_object() {
        *other = Value::Object(Default::default());
    }
    if let Some(other) = other.as_object_mut() {
        other.insert(
            "official-artwork".to_string(),
            serde_json::json!({ "front_default": fallback }),
        );
    }
}

fn artwork_url(raw: &Value) -> Option<String> {
    raw.pointer(OFFICIAL_ARTWORK)
        .and_then(Value::as_str)
        .or_else(|| raw.pointer("/sprites/front_default").and_then(Value::as_str))
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

/// Identifies an entry by numeric id or by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryRef {
    Id(u32),
    Name(String),
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryRef::Id(id) => write!(f, "{}", id),
            EntryRef::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<u32> for EntryRef {
    fn from(id: u32) -> Self {
        EntryRef::Id(id)
    }
}

impl From<&str> for EntryRef {
    fn from(s: &str) -> Self {
        match s.parse::<u32>() {
            Ok(id) => EntryRef::Id(id),
            Err(_) => EntryRef::Name(s.to_string()),
        }
    }
}

impl From<String> for EntryRef {
    fn from(s: String) -> Self {
        EntryRef::from(s.as_str())
    }
}

impl FromStr for EntryRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(EntryRef::from(s))
    }
}

/// A `{ name, url }` reference as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

impl NamedResource {
    /// Identifier embedded in the reference URL
    pub fn id(&self) -> Result<u32> {
        id_from_url(&self.url)
    }
}

/// Extract the identifier from a reference URL such as
/// `https://pokeapi.co/api/v2/pokemon/25/` (second-to-last path segment).
pub fn id_from_url(url: &str) -> Result<u32> {
    let segments: Vec<&str> = url.split('/').collect();
    let segment = segments
        .len()
        .checked_sub(2)
        .and_then(|i| segments.get(i))
        .copied()
        .unwrap_or("");

    segment
        .parse::<u32>()
        .map_err(|_| CatalogError::decode("resource URL", format!("no id in {}", url)))
}

/// Raw list endpoint body
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResourceList {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<NamedResource>,
}

/// One hydrated page of entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPage {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<CatalogEntry>,
}

/// Species metadata; only the evolution chain reference is typed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesMeta {
    pub evolution_chain_url: Option<String>,
    pub raw: Value,
}

impl SpeciesMeta {
    pub fn from_api(raw: Value) -> Self {
        let evolution_chain_url = raw
            .pointer("/evolution_chain/url")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            evolution_chain_url,
            raw,
        }
    }
}

/// Evolution chain as returned by `/evolution-chain/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionChain {
    #[serde(default)]
    pub id: Option<u32>,
    pub chain: ChainLink,
}

/// One link in an evolution chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainLink {
    pub species: NamedResource,
    #[serde(default)]
    pub evolution_details: Vec<EvolutionDetail>,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionDetail {
    #[serde(default)]
    pub min_level: Option<u32>,
    #[serde(default)]
    pub trigger: Option<NamedResource>,
}

/// One step of a flattened evolution line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionNode {
    pub id: u32,
    pub name: String,
    pub image: Option<String>,
    pub min_level: Option<u32>,
    pub trigger: Option<String>,
}

/// Ability name and English effect text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityInfo {
    pub name: String,
    pub description: String,
}

impl AbilityInfo {
    /// Returned when the ability could not be fetched
    pub fn unavailable() -> Self {
        Self {
            name: "unknown".to_string(),
            description: "Description not available.".to_string(),
        }
    }

    pub(crate) fn from_api(raw: &Value) -> Self {
        let name = raw
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        let description = raw
            .get("effect_entries")
            .and_then(Value::as_array)
            .and_then(|entries| {
                entries.iter().find(|entry| {
                    entry.pointer("/language/name").and_then(Value::as_str) == Some("en")
                })
            })
            .and_then(|entry| entry.get("effect").and_then(Value::as_str))
            .unwrap_or("No description available.")
            .to_string();

        Self { name, description }
    }
}

//! Provider catalog types
//!
//! A provider is described once at load time by a [`ProviderDescriptor`].
//! Its wire dialect is a closed [`ProviderKind`] and what it can serve is an
//! explicit [`CapabilitySet`]; routing switches on these values instead of
//! probing adapters at runtime.

use super::money::Usd;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Stable provider identifier (lowercase config name, e.g. `alpha`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    /// Create an identifier, normalized to lowercase
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().to_lowercase())
    }

    /// Borrow the identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// What a provider can be asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Chat completion
    Chat,
    /// Text embeddings
    Embedding,
}

impl Capability {
    /// Lowercase name used in config and telemetry
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Chat => "chat",
            Capability::Embedding => "embedding",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chat" => Ok(Capability::Chat),
            "embedding" | "embeddings" => Ok(Capability::Embedding),
            other => Err(format!("Unknown capability: {other}. Use chat or embedding")),
        }
    }
}

/// Accepted config shapes for a capability set
#[doc(hidden)]
#[derive(Deserialize)]
#[serde(untagged)]
pub enum CapabilityInput {
    List(Vec<Capability>),
    Csv(String),
}

/// Subset of {chat, embedding}
///
/// Deserializes from either a list (`["chat", "embedding"]`) or a comma
/// separated string (`"chat,embedding"`), the latter being what flat
/// environment variables produce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CapabilityInput", into = "Vec<Capability>")]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    /// Build a set from any iterator of capabilities
    pub fn new(capabilities: impl IntoIterator<Item = Capability>) -> Self {
        Self(capabilities.into_iter().collect())
    }

    /// Set containing only chat
    pub fn chat() -> Self {
        Self::new([Capability::Chat])
    }

    /// Set containing only embedding
    pub fn embedding() -> Self {
        Self::new([Capability::Embedding])
    }

    /// Set containing chat and embedding
    pub fn all() -> Self {
        Self::new([Capability::Chat, Capability::Embedding])
    }

    /// Whether the set contains a capability
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// Whether every capability of `self` is also in `other`
    pub fn is_subset(&self, other: &CapabilitySet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate capabilities in stable order
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl TryFrom<CapabilityInput> for CapabilitySet {
    type Error = String;

    fn try_from(input: CapabilityInput) -> std::result::Result<Self, Self::Error> {
        match input {
            CapabilityInput::List(list) => Ok(Self::new(list)),
            CapabilityInput::Csv(csv) => csv
                .split(',')
                .filter(|part| !part.trim().is_empty())
                .map(Capability::from_str)
                .collect::<std::result::Result<BTreeSet<_>, _>>()
                .map(Self),
        }
    }
}

impl From<CapabilitySet> for Vec<Capability> {
    fn from(set: CapabilitySet) -> Self {
        set.0.into_iter().collect()
    }
}

/// Closed set of provider wire dialects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI and OpenAI-compatible APIs (bearer auth, `/chat/completions`, `/embeddings`)
    #[default]
    OpenAi,
    /// Anthropic messages API (chat only)
    Anthropic,
    /// Ollama local server (`/api/chat`, `/api/embed`)
    Ollama,
    /// Voyage AI embeddings (embedding only)
    VoyageAi,
}

impl ProviderKind {
    /// Capabilities the dialect can serve at all
    pub fn supported_capabilities(self) -> CapabilitySet {
        match self {
            ProviderKind::OpenAi | ProviderKind::Ollama => CapabilitySet::all(),
            ProviderKind::Anthropic => CapabilitySet::chat(),
            ProviderKind::VoyageAi => CapabilitySet::embedding(),
        }
    }

    /// Lowercase name used in config
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Ollama => "ollama",
            ProviderKind::VoyageAi => "voyageai",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "ollama" => Ok(ProviderKind::Ollama),
            "voyageai" => Ok(ProviderKind::VoyageAi),
            other => Err(format!("Unknown provider kind: {other}")),
        }
    }
}

/// Health of a provider as seen by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderHealth {
    /// Provider is functioning normally
    #[default]
    Healthy,
    /// Provider is failing but still tried
    Degraded,
    /// Provider is skipped until rollover or manual reset
    Unavailable,
}

/// Immutable description of a configured provider
///
/// Health is not stored here; it is owned by the router's health monitor
/// and keyed by [`ProviderDescriptor::id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Provider identifier
    pub id: ProviderId,
    /// Wire dialect
    pub kind: ProviderKind,
    /// Capabilities offered by this provider
    pub capabilities: CapabilitySet,
    /// Cost charged to the ledger per successful call
    pub unit_cost: Usd,
    /// Daily spending cap
    pub daily_budget: Usd,
    /// Base endpoint (scheme, host and path prefix)
    pub base_url: String,
}

impl ProviderDescriptor {
    /// Whether this provider can serve a capability
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }
}

//! Block data model: categories, tones, variants, and load-time errors.
//!
//! A block is a named, categorized reusable text fragment with one or more
//! variants. Blocks are loaded once at startup and read-only afterwards.

pub mod repository;
pub mod selector;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading block definitions.
#[derive(Debug, Error)]
pub enum BlockError {
    /// I/O error reading a block file or directory.
    #[error("failed to read block storage: {0}")]
    Io(#[from] std::io::Error),
    /// A block document was not valid JSON.
    #[error("failed to parse block JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The seven structural roles a block can fill, in body assembly order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockCategory {
    /// Salutation line.
    Greeting,
    /// Hook paragraph following the greeting.
    Opener,
    /// Why we are writing.
    Intention,
    /// Event facts (date, venue, programme).
    EventInfo,
    /// Audience-specific selling point. The only multi-valued category.
    ValueProposition,
    /// Call to action.
    Cta,
    /// Sign-off.
    Closing,
}

impl BlockCategory {
    /// All categories in the fixed order the composer assembles them.
    pub const ORDERED: [BlockCategory; 7] = [
        BlockCategory::Greeting,
        BlockCategory::Opener,
        BlockCategory::Intention,
        BlockCategory::EventInfo,
        BlockCategory::ValueProposition,
        BlockCategory::Cta,
        BlockCategory::Closing,
    ];

    /// Stable string form matching the storage format.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockCategory::Greeting => "greeting",
            BlockCategory::Opener => "opener",
            BlockCategory::Intention => "intention",
            BlockCategory::EventInfo => "event-info",
            BlockCategory::ValueProposition => "value-proposition",
            BlockCategory::Cta => "cta",
            BlockCategory::Closing => "closing",
        }
    }
}

impl std::fmt::Display for BlockCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writing tone attached to a block or audience.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Business register, full sentences, no contractions.
    #[default]
    Formal,
    /// Conversational register.
    Casual,
    /// Warm, first-name register.
    Personal,
}

impl Tone {
    /// Stable lowercase string form, used for tone-based block selection.
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Formal => "formal",
            Tone::Casual => "casual",
            Tone::Personal => "personal",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "formal" => Ok(Tone::Formal),
            "casual" => Ok(Tone::Casual),
            "personal" => Ok(Tone::Personal),
            other => Err(format!("unknown tone: {other}")),
        }
    }
}

/// One concrete wording of a block.
///
/// Immutable once loaded. The `placeholders` list is documentation from the
/// block author and is never enforced against the tokens actually present
/// in `text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockVariant {
    /// Identifier, unique within the owning block.
    pub id: String,
    /// Raw text containing zero or more `{{placeholder}}` tokens.
    pub text: String,
    /// Declared placeholder names (documentation only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholders: Option<Vec<String>>,
    /// Free-form note on when to prefer this wording.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
}

/// A reusable text fragment belonging to exactly one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Identifier, unique within the category.
    pub id: String,
    /// The structural role this block fills.
    pub category: BlockCategory,
    /// Free-form tags for tag-based selection.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Tone tag for tone-based selection.
    #[serde(default)]
    pub tone: Option<Tone>,
    /// Ordered wordings. A block with zero variants is unusable and is
    /// skipped by selection, never treated as an error.
    #[serde(default)]
    pub variants: Vec<BlockVariant>,
}

impl Block {
    /// Repository key: `category/id`.
    pub fn key(&self) -> String {
        format!("{}/{}", self.category, self.id)
    }

    /// First variant, the deterministic default for production composition.
    pub fn first_variant(&self) -> Option<&BlockVariant> {
        self.variants.first()
    }

    /// Variant by identifier.
    pub fn variant(&self, id: &str) -> Option<&BlockVariant> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// Uniformly random variant, for exploratory or A/B sends only.
    ///
    /// The default composition path always uses [`Block::first_variant`]
    /// so repeated compositions stay deterministic.
    pub fn random_variant(&self) -> Option<&BlockVariant> {
        use rand::seq::SliceRandom;
        self.variants.choose(&mut rand::thread_rng())
    }
}

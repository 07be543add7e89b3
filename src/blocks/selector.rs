//! Layered block resolution: identifier, then tag, then tone.
//!
//! Resolution strategies form an explicit ordered chain so further
//! strategies can be appended without reshaping the existing ones. A miss
//! is `None`, never an error; the caller decides whether an unresolved
//! category matters.

use tracing::trace;

use super::repository::BlockRepository;
use super::{Block, BlockCategory, BlockVariant};

/// A resolved block plus the variant chosen from it.
#[derive(Debug, Clone, Copy)]
pub struct SelectedBlock<'a> {
    /// The matched block.
    pub block: &'a Block,
    /// The variant to render.
    pub variant: &'a BlockVariant,
}

/// One resolution strategy. Only usable blocks (at least one variant) are
/// ever returned.
type ResolveFn = for<'a> fn(&'a BlockRepository, BlockCategory, &str) -> Option<&'a Block>;

/// Strategies in priority order: first match wins.
const RESOLVERS: &[ResolveFn] = &[resolve_by_id, resolve_by_tag, resolve_by_tone];

fn resolve_by_id<'a>(
    repository: &'a BlockRepository,
    category: BlockCategory,
    selector: &str,
) -> Option<&'a Block> {
    repository
        .load(&format!("{category}/{selector}"))
        .filter(|b| !b.variants.is_empty())
}

fn resolve_by_tag<'a>(
    repository: &'a BlockRepository,
    category: BlockCategory,
    selector: &str,
) -> Option<&'a Block> {
    repository
        .by_category(category)
        .into_iter()
        .filter(|b| !b.variants.is_empty())
        .find(|b| b.tags.iter().any(|t| t == selector))
}

fn resolve_by_tone<'a>(
    repository: &'a BlockRepository,
    category: BlockCategory,
    selector: &str,
) -> Option<&'a Block> {
    repository
        .by_category(category)
        .into_iter()
        .filter(|b| !b.variants.is_empty())
        .find(|b| b.tone.is_some_and(|t| t.as_str() == selector))
}

/// Resolves (category, selector) pairs against a block repository.
#[derive(Debug, Clone, Copy)]
pub struct BlockSelector<'r> {
    repository: &'r BlockRepository,
}

impl<'r> BlockSelector<'r> {
    /// Selector over a loaded repository.
    pub fn new(repository: &'r BlockRepository) -> Self {
        Self { repository }
    }

    /// Resolve a selector to a block and variant.
    ///
    /// Tries an exact `category/selector` identifier match, then the first
    /// block in the category carrying `selector` as a tag, then the first
    /// block whose tone equals `selector`. If `variant_id` is supplied and
    /// present on the matched block it is used; otherwise the block's first
    /// variant is used (the deterministic default). Blocks with zero
    /// variants never match.
    pub fn select(
        &self,
        category: BlockCategory,
        selector: &str,
        variant_id: Option<&str>,
    ) -> Option<SelectedBlock<'r>> {
        let block = RESOLVERS
            .iter()
            .find_map(|resolve| resolve(self.repository, category, selector))?;
        let variant = variant_id
            .and_then(|id| block.variant(id))
            .or_else(|| block.first_variant())?;
        trace!(
            category = %category,
            selector = selector,
            block = %block.id,
            variant = %variant.id,
            "block resolved"
        );
        Some(SelectedBlock { block, variant })
    }
}

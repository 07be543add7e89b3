//! Email assembly: tone resolution, variable merge, block selection,
//! subject derivation, and the batch driver.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::blocks::repository::BlockRepository;
use crate::blocks::selector::BlockSelector;
use crate::blocks::{BlockCategory, Tone};
use crate::config::{format_event_date, AudienceConfig, CampaignConfig};

use super::contact::Contact;
use super::variables::{self, SubstitutionOptions, VariableMap};
use super::ComposeError;

/// Caller-supplied knobs for a single composition.
#[derive(Debug, Clone, Default)]
pub struct ComposeOptions {
    /// Tone override; defaults to the audience's configured tone.
    pub tone: Option<Tone>,
    /// Ad-hoc variables, merged after event defaults.
    pub custom_variables: VariableMap,
    /// Per-category selector overrides for the single-valued categories.
    pub block_overrides: HashMap<BlockCategory, String>,
    /// Value-proposition selector list override, replacing the audience's.
    pub value_props: Option<Vec<String>>,
    /// Preferred variant per block id.
    pub variant_overrides: HashMap<String, String>,
    /// Fail on unresolved placeholders instead of emptying them.
    pub strict: bool,
    /// Keep unresolved `{{name}}` tokens verbatim.
    pub keep_placeholders: bool,
}

/// Identifiers of the blocks used for each category of a composed body.
///
/// `None` (or an empty list for value propositions) means the category
/// did not resolve and was omitted from the body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BlocksUsed {
    /// Greeting block id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    /// Opener block id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opener: Option<String>,
    /// Intention block id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intention: Option<String>,
    /// Event-info block id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_info: Option<String>,
    /// Value-proposition block ids, in render order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub value_propositions: Vec<String>,
    /// Call-to-action block id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta: Option<String>,
    /// Closing block id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing: Option<String>,
}

impl BlocksUsed {
    fn record(&mut self, category: BlockCategory, id: String) {
        match category {
            BlockCategory::Greeting => self.greeting = Some(id),
            BlockCategory::Opener => self.opener = Some(id),
            BlockCategory::Intention => self.intention = Some(id),
            BlockCategory::EventInfo => self.event_info = Some(id),
            BlockCategory::ValueProposition => self.value_propositions.push(id),
            BlockCategory::Cta => self.cta = Some(id),
            BlockCategory::Closing => self.closing = Some(id),
        }
    }
}

/// Metadata describing how an email was assembled.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmailMetadata {
    /// Audience type the composition ran under.
    pub audience_type: String,
    /// Resolved tone (override or audience default).
    pub tone: Tone,
    /// Which block was used per category.
    pub blocks_used: BlocksUsed,
    /// Distinct placeholder names still present in the final body.
    /// Normally empty; non-empty flags a variable gap worth surfacing
    /// even though the call succeeded.
    pub unresolved_placeholders: Vec<String>,
}

/// A fully assembled subject/body pair plus assembly metadata.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComposedEmail {
    /// Derived subject line.
    pub subject: String,
    /// Body: rendered blocks joined with a blank line.
    pub body: String,
    /// Assembly metadata.
    pub metadata: EmailMetadata,
}

impl ComposedEmail {
    /// Empty shape carried by failed batch entries.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// One entry of a batch composition result. Order and length of the batch
/// output always match the input contact list.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// The input contact, echoed for correlation.
    pub contact: Contact,
    /// The composed email, or the empty shape when `error` is set.
    pub email: ComposedEmail,
    /// Rendered error message when this contact's composition failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Static subject templates per audience type, used when the audience
/// configuration supplies none.
fn default_subject_template(audience_type: &str) -> Option<&'static str> {
    match audience_type {
        "vcs" => Some("Investment opportunities at {{event_name}}"),
        "startups" => Some("Showcase your startup at {{event_name}}"),
        "corporates" => Some("Partner with {{event_name}}"),
        "media" => Some("Press invitation: {{event_name}}"),
        "nonprofits" => Some("Join the mission at {{event_name}}"),
        _ => None,
    }
}

/// Last-resort subject when the audience type has no static default.
const GENERIC_SUBJECT_TEMPLATE: &str = "You're invited to {{event_name}}";

/// Assembles emails from blocks, audience defaults, and contact data.
///
/// Two-phase lifecycle: construct, then [`Composer::initialize`] to load
/// the block repository eagerly. All state is read-only afterwards, so one
/// instance serves concurrent compose calls without locking.
pub struct Composer {
    config: CampaignConfig,
    blocks_dir: PathBuf,
    repository: Option<BlockRepository>,
}

impl Composer {
    /// Uninitialized composer that will read blocks from `blocks_dir`.
    pub fn new(config: CampaignConfig, blocks_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            blocks_dir: blocks_dir.into(),
            repository: None,
        }
    }

    /// Pre-initialized composer over an in-memory repository (fixtures,
    /// per-tenant embedding).
    pub fn with_repository(config: CampaignConfig, repository: BlockRepository) -> Self {
        Self {
            config,
            blocks_dir: PathBuf::new(),
            repository: Some(repository),
        }
    }

    /// Load the block repository. Idempotent; a second call is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Blocks`] when the blocks directory cannot be
    /// read. Individual malformed files or records are warned and skipped
    /// inside the repository, not surfaced here.
    pub fn initialize(&mut self) -> Result<(), ComposeError> {
        if self.repository.is_none() {
            self.repository = Some(BlockRepository::load_dir(&self.blocks_dir)?);
        }
        Ok(())
    }

    /// Whether [`Composer::initialize`] has completed.
    pub fn is_initialized(&self) -> bool {
        self.repository.is_some()
    }

    /// Configured audience types, sorted.
    pub fn audience_types(&self) -> Vec<String> {
        self.config.audience_types()
    }

    /// Configuration for one audience type.
    pub fn audience_config(&self, audience_type: &str) -> Option<&AudienceConfig> {
        self.config.audience(audience_type)
    }

    /// Compose a single email for a contact.
    ///
    /// Categories that fail to resolve are omitted from the body rather
    /// than failing the call: a missing block must not block a campaign.
    ///
    /// # Errors
    ///
    /// [`ComposeError::NotInitialized`] before initialization,
    /// [`ComposeError::UnknownAudience`] when the contact's audience type
    /// has no configuration, and [`ComposeError::Substitution`] when
    /// strict mode hits an unresolved placeholder.
    pub fn compose_email(
        &self,
        contact: &Contact,
        options: &ComposeOptions,
    ) -> Result<ComposedEmail, ComposeError> {
        let repository = self.repository.as_ref().ok_or(ComposeError::NotInitialized)?;
        let audience = self
            .config
            .audience(&contact.audience_type)
            .ok_or_else(|| ComposeError::UnknownAudience(contact.audience_type.clone()))?;

        let tone = options.tone.unwrap_or(audience.tone);
        let vars = self.build_variables(contact, options);
        let selector = BlockSelector::new(repository);
        let substitution = SubstitutionOptions {
            strict: options.strict,
            keep_placeholders: options.keep_placeholders,
            suppress_warnings: false,
        };

        let mut sections: Vec<String> = Vec::new();
        let mut blocks_used = BlocksUsed::default();

        for category in BlockCategory::ORDERED {
            if category == BlockCategory::ValueProposition {
                let selectors = options
                    .value_props
                    .as_ref()
                    .unwrap_or(&audience.value_props);
                for sel in selectors {
                    if let Some((text, id)) =
                        render_block(&selector, category, sel, options, &vars, substitution)?
                    {
                        sections.push(text);
                        blocks_used.record(category, id);
                    }
                }
                continue;
            }

            let sel = match options.block_overrides.get(&category) {
                Some(explicit) => explicit.clone(),
                None => default_selector(category, audience, tone),
            };
            if let Some((text, id)) =
                render_block(&selector, category, &sel, options, &vars, substitution)?
            {
                sections.push(text);
                blocks_used.record(category, id);
            }
        }

        let body = sections.join("\n\n");
        let subject = self.derive_subject(audience, &contact.audience_type, &vars, substitution)?;
        let unresolved = variables::extract_placeholders(&body);

        debug!(
            audience = %contact.audience_type,
            tone = %tone,
            sections = sections.len(),
            unresolved = unresolved.len(),
            "email composed"
        );

        Ok(ComposedEmail {
            subject,
            body,
            metadata: EmailMetadata {
                audience_type: contact.audience_type.clone(),
                tone,
                blocks_used,
                unresolved_placeholders: unresolved,
            },
        })
    }

    /// Compose emails for many contacts with per-contact failure isolation.
    ///
    /// Per-contact options are keyed by email and fall back to
    /// `global_options`. One contact's failure is captured into its result
    /// entry and never aborts or skips the rest; output order and length
    /// match the input.
    ///
    /// # Errors
    ///
    /// Only [`ComposeError::NotInitialized`] fails the batch call itself.
    pub fn compose_batch(
        &self,
        contacts: &[Contact],
        global_options: &ComposeOptions,
        per_contact_options: Option<&HashMap<String, ComposeOptions>>,
    ) -> Result<Vec<BatchResult>, ComposeError> {
        if self.repository.is_none() {
            return Err(ComposeError::NotInitialized);
        }
        let mut results = Vec::with_capacity(contacts.len());
        for contact in contacts {
            let effective = per_contact_options
                .and_then(|m| m.get(&contact.email))
                .unwrap_or(global_options);
            match self.compose_email(contact, effective) {
                Ok(email) => results.push(BatchResult {
                    contact: contact.clone(),
                    email,
                    error: None,
                }),
                Err(e) => {
                    warn!(email = %contact.email, error = %e, "composition failed, continuing batch");
                    results.push(BatchResult {
                        contact: contact.clone(),
                        email: ComposedEmail::empty(),
                        error: Some(e.to_string()),
                    });
                }
            }
        }
        Ok(results)
    }

    /// Ordered variable merge; later entries overwrite earlier ones with
    /// the same key. Precedence contract: named identity/org/sender
    /// fields, then event defaults (contact `event_date` wins), then
    /// caller custom variables, then the contact's extra bag.
    fn build_variables(&self, contact: &Contact, options: &ComposeOptions) -> VariableMap {
        let mut vars = contact.named_variables();
        vars.extend(self.config.event_variables());
        if let Some(date) = &contact.event_date {
            vars.insert(
                "event_date".to_string(),
                Value::String(format_event_date(date)),
            );
        }
        vars.extend(options.custom_variables.clone());
        for (key, value) in &contact.extra {
            vars.insert(key.clone(), value.clone());
        }
        vars
    }

    fn derive_subject(
        &self,
        audience: &AudienceConfig,
        audience_type: &str,
        vars: &VariableMap,
        substitution: SubstitutionOptions,
    ) -> Result<String, ComposeError> {
        let template = match &audience.subject_template {
            Some(template) => template.as_str(),
            None => default_subject_template(audience_type).unwrap_or(GENERIC_SUBJECT_TEMPLATE),
        };
        Ok(variables::substitute(template, vars, substitution)?)
    }
}

/// Default selector for a category: tone for the framing categories,
/// the audience's configured selector for the content categories.
fn default_selector(category: BlockCategory, audience: &AudienceConfig, tone: Tone) -> String {
    match category {
        BlockCategory::Greeting | BlockCategory::Opener | BlockCategory::Closing => {
            tone.as_str().to_string()
        }
        BlockCategory::Intention => audience.intention.clone(),
        BlockCategory::EventInfo => audience.event_info.clone(),
        BlockCategory::Cta => audience.cta.clone(),
        // Handled by the multi-valued path in compose_email.
        BlockCategory::ValueProposition => String::new(),
    }
}

/// Resolve one selector and substitute its variant. `Ok(None)` means the
/// category is omitted; only strict-mode substitution failures propagate.
fn render_block(
    selector: &BlockSelector<'_>,
    category: BlockCategory,
    sel: &str,
    options: &ComposeOptions,
    vars: &VariableMap,
    substitution: SubstitutionOptions,
) -> Result<Option<(String, String)>, ComposeError> {
    let Some(mut selected) = selector.select(category, sel, None) else {
        debug!(category = %category, selector = sel, "no block resolved, category omitted");
        return Ok(None);
    };
    if let Some(variant_id) = options.variant_overrides.get(&selected.block.id) {
        if let Some(variant) = selected.block.variant(variant_id) {
            selected.variant = variant;
        }
    }
    let text = variables::substitute(&selected.variant.text, vars, substitution)?;
    Ok(Some((text, selected.block.id.clone())))
}

//! Shared fixture data for composition tests.

use std::collections::BTreeMap;

use serde_json::json;

use straylight::blocks::repository::BlockRepository;
use straylight::blocks::Tone;
use straylight::compose::Composer;
use straylight::config::{AudienceConfig, CampaignConfig, EventDetails};

/// Block records covering every category, both tones, and the selectors
/// the fixture audiences reference.
pub fn block_records() -> Vec<serde_json::Value> {
    vec![
        json!({
            "id": "formal-intro",
            "category": "greeting",
            "tone": "formal",
            "tags": ["investor"],
            "variants": [
                {"id": "v1", "text": "Dear {{first_name}} {{last_name}},"},
                {"id": "v2", "text": "Dear Dr. {{last_name}},"}
            ]
        }),
        json!({
            "id": "casual-intro",
            "category": "greeting",
            "tone": "casual",
            "variants": [{"id": "v1", "text": "Hi {{first_name}}!"}]
        }),
        json!({
            "id": "formal-opener",
            "category": "opener",
            "tone": "formal",
            "variants": [
                {"id": "v1", "text": "I hope this message finds you well at {{organization_name}}."}
            ]
        }),
        json!({
            "id": "casual-opener",
            "category": "opener",
            "tone": "casual",
            "variants": [{"id": "v1", "text": "Hope things are going great at {{organization_name}}."}]
        }),
        json!({
            "id": "invite-intention",
            "category": "intention",
            "tags": ["invite"],
            "variants": [
                {"id": "v1", "text": "We would like to invite you to {{event_name}} on {{event_date}}."}
            ]
        }),
        json!({
            "id": "event-overview",
            "category": "event-info",
            "tags": ["overview"],
            "variants": [
                {"id": "v1", "text": "{{event_name}} takes place in {{event_location}}, covering {{event_sectors}}."}
            ]
        }),
        json!({
            "id": "dealflow-vp",
            "category": "value-proposition",
            "tags": ["dealflow"],
            "variants": [{"id": "v1", "text": "Meet vetted companies raising their next round."}]
        }),
        json!({
            "id": "network-vp",
            "category": "value-proposition",
            "tags": ["network"],
            "variants": [{"id": "v1", "text": "Connect with founders and fellow investors."}]
        }),
        json!({
            "id": "custom-perk-vp",
            "category": "value-proposition",
            "tags": ["custom-perk"],
            "variants": [{"id": "v1", "text": "Enjoy {{custom_perk}}."}]
        }),
        json!({
            "id": "buy-ticket-cta",
            "category": "cta",
            "tone": "formal",
            "tags": ["buy-ticket"],
            "variants": [{"id": "v1", "text": "Secure your ticket at {{event_website}}."}]
        }),
        json!({
            "id": "formal-closing",
            "category": "closing",
            "tone": "formal",
            "variants": [{"id": "v1", "text": "Best regards,\n{{sender_name}}"}]
        }),
        json!({
            "id": "casual-closing",
            "category": "closing",
            "tone": "casual",
            "variants": [{"id": "v1", "text": "Cheers,\n{{sender_name}}"}]
        }),
    ]
}

fn audience(
    name: &str,
    tone: Tone,
    value_props: &[&str],
    subject_template: Option<&str>,
) -> AudienceConfig {
    AudienceConfig {
        name: name.to_string(),
        tone,
        intention: "invite".to_string(),
        value_props: value_props.iter().map(|s| (*s).to_string()).collect(),
        cta: "buy-ticket".to_string(),
        event_info: "overview".to_string(),
        tags: vec![],
        subject_template: subject_template.map(str::to_string),
    }
}

/// Three audiences: `vcs` (static subject table), `startups` (templated
/// subject), `partners` (generic subject fallback).
pub fn campaign_config() -> CampaignConfig {
    let mut audiences = BTreeMap::new();
    audiences.insert(
        "vcs".to_string(),
        audience("Venture Capital", Tone::Formal, &["dealflow", "network"], None),
    );
    audiences.insert(
        "startups".to_string(),
        audience(
            "Startups",
            Tone::Casual,
            &["network"],
            Some("{{first_name}}, join {{event_name}}"),
        ),
    );
    audiences.insert(
        "partners".to_string(),
        audience("Partners", Tone::Formal, &["network"], None),
    );

    let event: EventDetails = serde_json::from_value(json!({
        "event": {
            "name": "Helix Summit",
            "tagline": "Where life sciences meet capital",
            "date": "2026-09-14",
            "time": "09:00",
            "location": "Basel",
            "sectors": ["biotech", "medtech"],
            "organizer": "Helix Foundation",
            "website": "https://helix.example"
        }
    }))
    .expect("fixture event parses");

    CampaignConfig::new(audiences, event)
}

/// A composer over the in-memory fixture repository, ready to compose.
pub fn composer() -> Composer {
    Composer::with_repository(
        campaign_config(),
        BlockRepository::from_records(block_records()),
    )
}

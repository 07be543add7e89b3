//! Campaign data loading tests for `src/config/`.

use straylight::blocks::Tone;
use straylight::config::{CampaignConfig, ConfigError};

const AUDIENCES_JSON: &str = r#"{
  "vcs": {
    "name": "Venture Capital",
    "tone": "formal",
    "intention": "invite",
    "value_props": ["dealflow"],
    "cta": "buy-ticket",
    "event_info": "overview",
    "tags": ["investor"],
    "subject_template": "Deal flow at {{event_name}}"
  },
  "startups": {
    "name": "Startups",
    "tone": "casual",
    "intention": "invite",
    "cta": "apply",
    "event_info": "overview"
  }
}"#;

const EVENT_JSON: &str = r#"{
  "event": {
    "name": "Helix Summit",
    "date": "2026-09-14",
    "location": "Basel",
    "sectors": ["biotech"]
  },
  "nonprofit_context": {"mission": "access to science"}
}"#;

fn write_campaign(dir: &tempfile::TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let audiences = dir.path().join("audiences.json");
    let event = dir.path().join("event.json");
    std::fs::write(&audiences, AUDIENCES_JSON).expect("write audiences");
    std::fs::write(&event, EVENT_JSON).expect("write event");
    (audiences, event)
}

#[test]
fn loads_audiences_and_event_from_json_files() {
    let dir = tempfile::TempDir::new().expect("create temp dir");
    let (audiences, event) = write_campaign(&dir);

    let config = CampaignConfig::load(&audiences, &event).expect("load");
    assert_eq!(config.audience_types(), vec!["startups", "vcs"]);

    let vcs = config.audience("vcs").expect("vcs");
    assert_eq!(vcs.tone, Tone::Formal);
    assert_eq!(vcs.subject_template.as_deref(), Some("Deal flow at {{event_name}}"));

    let startups = config.audience("startups").expect("startups");
    assert!(startups.value_props.is_empty());
    assert!(startups.subject_template.is_none());

    assert_eq!(config.event().event.name, "Helix Summit");
    assert!(config.event().nonprofit_context.is_some());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::TempDir::new().expect("create temp dir");
    let (audiences, _) = write_campaign(&dir);

    let err = CampaignConfig::load(&audiences, &dir.path().join("absent.json"))
        .expect_err("missing event file");
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let dir = tempfile::TempDir::new().expect("create temp dir");
    let (_, event) = write_campaign(&dir);
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{ nope").expect("write");

    let err = CampaignConfig::load(&bad, &event).expect_err("bad audiences file");
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn event_variables_reflect_loaded_data() {
    let dir = tempfile::TempDir::new().expect("create temp dir");
    let (audiences, event) = write_campaign(&dir);

    let config = CampaignConfig::load(&audiences, &event).expect("load");
    let vars = config.event_variables();
    assert_eq!(vars.get("event_name"), Some(&"Helix Summit".into()));
    assert_eq!(vars.get("event_date"), Some(&"September 14, 2026".into()));
    assert_eq!(vars.get("event_location"), Some(&"Basel".into()));
}

//! Filesystem loading tests for `src/blocks/repository.rs`.

use straylight::blocks::repository::BlockRepository;
use straylight::blocks::BlockCategory;

const GREETING_BLOCKS: &str = r#"[
  {
    "id": "formal-intro",
    "category": "greeting",
    "tone": "formal",
    "variants": [{"id": "v1", "text": "Dear {{first_name}},"}]
  },
  {
    "id": "casual-intro",
    "category": "greeting",
    "tone": "casual",
    "variants": [{"id": "v1", "text": "Hi {{first_name}}!"}]
  }
]"#;

const CTA_BLOCKS: &str = r#"[
  {
    "id": "buy-ticket-cta",
    "category": "cta",
    "tags": ["buy-ticket"],
    "variants": [{"id": "v1", "text": "Get your ticket."}]
  },
  {"id": "broken", "category": "cta", "variants": "not an array"}
]"#;

#[test]
fn load_dir_reads_every_json_file() {
    let dir = tempfile::TempDir::new().expect("create temp dir");
    std::fs::write(dir.path().join("greeting.json"), GREETING_BLOCKS).expect("write");
    std::fs::write(dir.path().join("cta.json"), CTA_BLOCKS).expect("write");
    std::fs::write(dir.path().join("notes.txt"), "ignored").expect("write");

    let repo = BlockRepository::load_dir(dir.path()).expect("load");
    // Three valid records; the malformed cta record is skipped.
    assert_eq!(repo.len(), 3);
    assert!(repo.load("greeting/formal-intro").is_some());
    assert!(repo.load("cta/buy-ticket-cta").is_some());
    assert!(repo.load("cta/broken").is_none());
}

#[test]
fn an_unparseable_file_does_not_poison_the_rest() {
    let dir = tempfile::TempDir::new().expect("create temp dir");
    std::fs::write(dir.path().join("greeting.json"), GREETING_BLOCKS).expect("write");
    std::fs::write(dir.path().join("bad.json"), "{ this is not json").expect("write");

    let repo = BlockRepository::load_dir(dir.path()).expect("load");
    assert_eq!(repo.len(), 2);
    assert_eq!(repo.by_category(BlockCategory::Greeting).len(), 2);
}

#[test]
fn an_empty_directory_yields_an_empty_repository() {
    let dir = tempfile::TempDir::new().expect("create temp dir");
    let repo = BlockRepository::load_dir(dir.path()).expect("load");
    assert!(repo.is_empty());
    assert!(repo.by_category(BlockCategory::Greeting).is_empty());
}

#[test]
fn a_missing_directory_is_the_one_fatal_case() {
    assert!(BlockRepository::load_dir("/nonexistent/blocks-dir").is_err());
}

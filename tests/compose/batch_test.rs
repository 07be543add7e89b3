//! Integration tests for the batch driver.

use std::collections::HashMap;

use straylight::blocks::Tone;
use straylight::compose::{ComposeError, ComposeOptions, Composer, Contact};

use super::fixtures;

fn contact(audience: &str, email: &str, first_name: &str) -> Contact {
    let mut c = Contact::new(audience, email);
    c.first_name = Some(first_name.to_string());
    c.sender_name = Some("Lena Graf".to_string());
    c
}

#[test]
fn one_bad_contact_never_aborts_the_batch() {
    let composer = fixtures::composer();
    let contacts = vec![
        contact("vcs", "a@x.com", "Andreas"),
        contact("no-such-audience", "b@x.com", "Bea"),
        contact("startups", "c@x.com", "Carla"),
    ];

    let results = composer
        .compose_batch(&contacts, &ComposeOptions::default(), None)
        .expect("batch");

    assert_eq!(results.len(), 3);
    // Input order is preserved one-to-one.
    assert_eq!(results[0].contact.email, "a@x.com");
    assert_eq!(results[1].contact.email, "b@x.com");
    assert_eq!(results[2].contact.email, "c@x.com");

    assert!(results[0].error.is_none());
    assert!(!results[0].email.body.is_empty());

    let error = results[1].error.as_deref().expect("captured error");
    assert!(error.contains("no-such-audience"));
    assert!(results[1].email.body.is_empty());
    assert!(results[1].email.subject.is_empty());

    assert!(results[2].error.is_none());
    assert_eq!(results[2].email.metadata.audience_type, "startups");
}

#[test]
fn per_contact_options_override_the_global_options() {
    let composer = fixtures::composer();
    let contacts = vec![
        contact("vcs", "a@x.com", "Andreas"),
        contact("vcs", "b@x.com", "Bea"),
    ];

    let mut per_contact = HashMap::new();
    per_contact.insert(
        "b@x.com".to_string(),
        ComposeOptions {
            tone: Some(Tone::Casual),
            ..ComposeOptions::default()
        },
    );

    let results = composer
        .compose_batch(&contacts, &ComposeOptions::default(), Some(&per_contact))
        .expect("batch");

    assert_eq!(results[0].email.metadata.tone, Tone::Formal);
    assert_eq!(results[1].email.metadata.tone, Tone::Casual);
    assert!(results[1].email.body.starts_with("Hi Bea!"));
}

#[test]
fn empty_contact_list_yields_an_empty_result() {
    let composer = fixtures::composer();
    let results = composer
        .compose_batch(&[], &ComposeOptions::default(), None)
        .expect("batch");
    assert!(results.is_empty());
}

#[test]
fn batch_on_an_uninitialized_composer_fails_as_a_whole() {
    let composer = Composer::new(fixtures::campaign_config(), "/nonexistent/blocks");
    let err = composer
        .compose_batch(
            &[contact("vcs", "a@x.com", "Andreas")],
            &ComposeOptions::default(),
            None,
        )
        .expect_err("not initialized");
    assert!(matches!(err, ComposeError::NotInitialized));
}

#[test]
fn batch_results_serialize_with_captured_errors() {
    let composer = fixtures::composer();
    let contacts = vec![contact("no-such-audience", "x@x.com", "Xe")];
    let results = composer
        .compose_batch(&contacts, &ComposeOptions::default(), None)
        .expect("batch");

    let rendered = serde_json::to_string(&results).expect("serialize");
    assert!(rendered.contains("\"error\""));
    assert!(rendered.contains("no-such-audience"));
}

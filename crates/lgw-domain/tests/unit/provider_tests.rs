//! Tests for provider catalog types

use lgw_domain::{Capability, CapabilitySet, ProviderHealth, ProviderId, ProviderKind};
use std::str::FromStr;

#[test]
fn test_provider_id_is_lowercased() {
    assert_eq!(ProviderId::new("Alpha").as_str(), "alpha");
    assert_eq!(ProviderId::from("BETA"), ProviderId::new("beta"));
}

#[test]
fn test_capability_from_str() {
    assert_eq!(Capability::from_str("chat").unwrap(), Capability::Chat);
    assert_eq!(
        Capability::from_str(" Embeddings ").unwrap(),
        Capability::Embedding
    );
    assert!(Capability::from_str("vision").is_err());
}

#[test]
fn test_capability_set_from_list() {
    let set: CapabilitySet = serde_json::from_str(r#"["chat", "embedding"]"#).unwrap();
    assert_eq!(set, CapabilitySet::all());
}

/// Flat environment variables produce comma separated strings
#[test]
fn test_capability_set_from_csv() {
    let set: CapabilitySet = serde_json::from_str(r#""embedding, chat""#).unwrap();
    assert!(set.contains(Capability::Chat));
    assert!(set.contains(Capability::Embedding));

    let bad: Result<CapabilitySet, _> = serde_json::from_str(r#""chat,vision""#);
    assert!(bad.is_err());
}

#[test]
fn test_capability_set_serializes_as_list() {
    let json = serde_json::to_string(&CapabilitySet::embedding()).unwrap();
    assert_eq!(json, r#"["embedding"]"#);
}

#[test]
fn test_provider_kind_capabilities() {
    assert_eq!(
        ProviderKind::OpenAi.supported_capabilities(),
        CapabilitySet::all()
    );
    assert!(!ProviderKind::Anthropic
        .supported_capabilities()
        .contains(Capability::Embedding));
    assert!(!ProviderKind::VoyageAi
        .supported_capabilities()
        .contains(Capability::Chat));
    assert!(CapabilitySet::chat().is_subset(&ProviderKind::Ollama.supported_capabilities()));
}

#[test]
fn test_provider_kind_serde_names() {
    let kind: ProviderKind = serde_json::from_str(r#""voyageai""#).unwrap();
    assert_eq!(kind, ProviderKind::VoyageAi);
    assert_eq!(
        serde_json::to_string(&ProviderKind::OpenAi).unwrap(),
        r#""openai""#
    );
    assert_eq!(ProviderKind::from_str("Anthropic").unwrap(), ProviderKind::Anthropic);
}

#[test]
fn test_provider_health_default_and_names() {
    assert_eq!(ProviderHealth::default(), ProviderHealth::Healthy);
    assert_eq!(
        serde_json::to_string(&ProviderHealth::Unavailable).unwrap(),
        r#""UNAVAILABLE""#
    );
}

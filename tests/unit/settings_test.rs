// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metasearch::config::settings::Settings;
use metasearch::domain::models::provider::ProviderKind;
use metasearch::domain::models::search_response::RankingStrategy;
use metasearch::domain::search::credentials::StaticCredentialStore;
use metasearch::infrastructure::search::factory::ProviderRegistry;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TOML: &str = include_str!("../../config/default.toml");

#[test]
fn test_shipped_config_parses() {
    let settings = Settings::from_toml(DEFAULT_TOML).unwrap();

    assert_eq!(settings.server.port, 3000);
    assert_eq!(settings.search.default_strategy, RankingStrategy::Weighted);
    assert_eq!(
        settings.search.effective_timeout(None),
        Duration::from_millis(3000)
    );

    let names: Vec<&str> = settings.providers.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["google", "bing"]);
    assert_eq!(settings.providers[0].kind, ProviderKind::Google);
    assert_eq!(settings.providers[0].params.get("cx").map(String::as_str), Some("GOOGLE_CX"));
    assert_eq!(settings.providers[1].weight, 0.8);
    assert_eq!(settings.providers[1].max_results, Some(50));
}

#[test]
fn test_shipped_config_builds_registry() {
    let settings = Settings::from_toml(DEFAULT_TOML).unwrap();
    let registry =
        ProviderRegistry::from_configs(&settings.providers, Arc::new(StaticCredentialStore::new()))
            .unwrap();

    assert_eq!(registry.enabled_names(), vec!["google", "bing"]);
}

#[test]
fn test_override_disables_provider() {
    let content = format!(
        "{}\n{}",
        DEFAULT_TOML,
        r#"
[[providers]]
name = "bing-eu"
kind = "bing"
enabled = false
"#
    );
    let settings = Settings::from_toml(&content).unwrap();
    let registry =
        ProviderRegistry::from_configs(&settings.providers, Arc::new(StaticCredentialStore::new()))
            .unwrap();

    assert_eq!(settings.providers.len(), 3);
    assert_eq!(registry.enabled_names(), vec!["google", "bing"]);
}

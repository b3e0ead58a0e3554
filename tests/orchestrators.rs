//! Orchestrators built from a TOML config, end to end over HTTP.

mod support;

use provider_hub::{
    AiOrchestrator, ChatApiOrchestrator, ChatOptions, Config, OutgoingMessage, Provider,
    ProviderContext,
};
use serde_json::json;
use std::sync::Arc;

fn config_for(server_url: &str) -> Config {
    Config::from_toml_str(&format!(
        r#"
[ai]
default = "openai"

[ai.providers.openai]
api_key = "sk-test"
base_url = "{url}"

[chat_api]
default = "evolution"

[chat_api.providers.evolution]
apikey = "evo-key"
instance = "main"
base_url = "{url}"

[chat_api.providers.test]
api_key = "unused"
instance = "sandbox"
latency_ms = 0
"#,
        url = server_url
    ))
    .unwrap()
}

#[tokio::test]
async fn ai_orchestrator_reuses_cached_provider() {
    let mut server = support::start().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"model": "gpt-4o-mini", "choices": [{"message": {"content": "ok"}}]}).to_string(),
        )
        .expect(2)
        .create_async()
        .await;

    let config = config_for(&server.url());
    let ai = AiOrchestrator::from_config(&config, ProviderContext::default()).unwrap();

    let first = ai.chat(None, "one", &ChatOptions::new()).await;
    let second = ai.chat(Some("openai"), "two", &ChatOptions::new()).await;
    mock.assert_async().await;

    assert!(first.success && second.success);
    assert!(Arc::ptr_eq(
        &ai.provider(None).unwrap(),
        &ai.provider(Some("openai")).unwrap()
    ));

    let missing = ai.chat(Some("deepseek"), "three", &ChatOptions::new()).await;
    assert_eq!(missing.error_code.as_deref(), Some("CONFIGURATION_ERROR"));
    assert!(!ai.is_cached("deepseek"));
}

#[tokio::test]
async fn chat_api_default_switch_only_affects_later_calls() {
    let mut server = support::start().await;
    let mock = server
        .mock("POST", "/message/sendText/main")
        .with_status(201)
        .with_body(r#"{"key": {"id": "3EB0"}}"#)
        .expect(1)
        .create_async()
        .await;

    let config = config_for(&server.url());
    let chat = ChatApiOrchestrator::from_config(&config, ProviderContext::default()).unwrap();

    let evolution = chat.provider(None).unwrap();
    let env = chat
        .send_message(None, "5511999999999", &OutgoingMessage::text("hi"))
        .await;
    assert_eq!(env.to_value()["api"], "evolution");

    chat.set_default("test").unwrap();
    let env = chat
        .send_message(None, "5511999999999", &OutgoingMessage::text("hi"))
        .await;
    assert!(env.success);
    assert_eq!(env.to_value()["api"], "test");
    assert_eq!(evolution.name(), "evolution");

    mock.assert_async().await;
}

#[test]
fn env_overrides_reach_providers() {
    let mut config = Config::default();
    config.apply_env_overrides([
        ("PROVIDER_HUB_DEFAULT_AI".to_string(), "deepseek".to_string()),
        (
            "PROVIDER_HUB__AI__DEEPSEEK__API_KEY".to_string(),
            "ds-env".to_string(),
        ),
    ]);

    let ai = AiOrchestrator::from_config(&config, ProviderContext::default()).unwrap();
    assert_eq!(ai.default_name(), "deepseek");
    assert_eq!(ai.provider(None).unwrap().name(), "deepseek");
}

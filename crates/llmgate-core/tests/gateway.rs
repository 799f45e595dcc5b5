//! Factory, profiles, concurrency and cancellation end to end

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use llmgate_core::providers::cancellable;
use llmgate_core::{
    Adapter, AdapterFactory, AdapterProfile, CancellationToken, ChainSecretStore, CompletionOptions, ConfigError,
    ConfigProvider, EnvSecretStore, ErrorKind, FileConfigProvider, FunctionCalling, MemorySecretStore, Message,
    NoOpLogger, SecretStore,
};
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn factory() -> AdapterFactory {
    AdapterFactory::new(Arc::new(NoOpLogger::new()))
}

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

#[tokio::test]
async fn profile_from_yaml_drives_adapter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_reply("pong"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = FileConfigProvider::new(dir.path().join("config.yaml"));
    config
        .add_profile(
            AdapterProfile::new("local", "openai-compatible", "llama3")
                .with_api_base(format!("{}/v1", server.uri()))
                .with_timeout_secs(5)
                .with_credential("local-llm"),
        )
        .await
        .unwrap();

    // Fresh provider reads what the first one wrote
    let reloaded = FileConfigProvider::new(config.path());
    let profile = reloaded.get_profile("LOCAL").await.unwrap();

    let memory: Arc<dyn SecretStore> = Arc::new(MemorySecretStore::new().with_secret("local-llm", "sk-local"));
    let env: Arc<dyn SecretStore> = Arc::new(EnvSecretStore::new());
    let secrets = ChainSecretStore::new(vec![memory, env]);

    let adapter = factory().create_from_profile(&profile, &secrets).unwrap();
    assert_eq!(adapter.provider_name(), "openai-compatible");
    assert_eq!(adapter.function_calling(), FunctionCalling::Native);

    let reply = adapter
        .complete(&[Message::user("ping")], &CompletionOptions::new())
        .await
        .unwrap();
    assert_eq!(reply, "pong");
}

#[test]
fn unknown_provider_fails_before_any_network_call() {
    let profile = AdapterProfile::new("x", "cohere", "command-r");
    let secrets = MemorySecretStore::new().with_secret("cohere", "k");

    let err = factory().create_from_profile(&profile, &secrets).err().unwrap();
    assert!(matches!(err, ConfigError::UnknownProvider(_)));
}

#[tokio::test]
async fn one_adapter_serves_concurrent_callers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{ "type": "text", "text": "ok" }]
        })))
        .expect(16)
        .mount(&server)
        .await;

    let profile = AdapterProfile::new("claude", "anthropic", "claude-3-5-haiku-latest").with_api_base(server.uri());
    let secrets = MemorySecretStore::new().with_secret("anthropic", "sk-ant");
    let adapter: Arc<dyn Adapter> = Arc::from(factory().create_from_profile(&profile, &secrets).unwrap());

    let calls = (0..16).map(|i| {
        let adapter = Arc::clone(&adapter);
        async move {
            adapter
                .complete(&[Message::user(format!("request {}", i))], &CompletionOptions::new())
                .await
        }
    });

    let results = join_all(calls).await;
    assert!(results.iter().all(|r| matches!(r, Ok(text) if text == "ok")));
}

#[tokio::test]
async fn cancelling_an_in_flight_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_reply("too late").set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let profile = AdapterProfile::new("slow", "openai", "gpt-4o-mini").with_api_base(format!("{}/v1", server.uri()));
    let secrets = MemorySecretStore::new().with_secret("openai", "sk-test");
    let adapter = factory().create_from_profile(&profile, &secrets).unwrap();

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let messages = [Message::user("Hi")];
    let started = std::time::Instant::now();
    let err = cancellable(
        &token,
        adapter.provider_name(),
        adapter.complete(&messages, &CompletionOptions::new()),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Cancelled);
    assert_eq!(err.provider, "openai");
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn mock_provider_through_factory() {
    let profile = AdapterProfile::new("test", "mock", "mock-echo");
    let adapter = factory()
        .create_from_profile(&profile, &MemorySecretStore::new())
        .unwrap();

    let reply = adapter
        .complete(&[Message::user("hello")], &CompletionOptions::new())
        .await
        .unwrap();
    assert_eq!(reply, "Echo: hello");
    assert!(adapter.health_check().await);
}

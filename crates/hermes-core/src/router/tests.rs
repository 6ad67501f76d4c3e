use super::*;
use crate::card::{AgentCard, AgentSkill};
use crate::registry::{AgentDirectory, LiveAgent};
use hermes_llm::{CompletionResponse, Error as LlmError};
use std::collections::HashMap;

/// Scripted provider: always replies, always fails, or never returns.
enum Scripted {
    Reply(&'static str),
    Fail,
    Hang,
}

struct FakeProvider {
    script: Scripted,
}

#[async_trait::async_trait]
impl LlmProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn default_model(&self) -> &str {
        "fake-model"
    }

    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> hermes_llm::Result<CompletionResponse> {
        match self.script {
            Scripted::Reply(text) => Ok(CompletionResponse {
                content: text.to_string(),
                usage: None,
                finish_reason: Some("stop".to_string()),
                model: "fake-model".to_string(),
            }),
            Scripted::Fail => Err(LlmError::Api("induced failure".to_string())),
            Scripted::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(LlmError::Timeout(3_600_000))
            }
        }
    }
}

fn agent(name: &str, description: &str, tags: &[&str]) -> LiveAgent {
    LiveAgent {
        name: name.to_string(),
        endpoint: format!("http://{name}.local"),
        card: AgentCard {
            name: name.to_string(),
            description: description.to_string(),
            url: format!("http://{name}.local"),
            skills: vec![AgentSkill {
                id: format!("{name}_main"),
                name: name.to_string(),
                description: description.to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                examples: Vec::new(),
            }],
            capabilities: HashMap::new(),
            tags: Vec::new(),
        },
    }
}

fn two_agent_directory() -> AgentDirectory {
    AgentDirectory::for_tests(vec![
        agent("greeting_agent", "Friendly greetings", &["greeting"]),
        agent("time_agent", "Tells the current time", &["time"]),
    ])
}

fn router_with(script: Scripted) -> Router {
    Router::new(RouterConfig::default()).with_provider(Arc::new(FakeProvider { script }))
}

#[tokio::test]
async fn test_model_selects_valid_agent() {
    let directory = two_agent_directory();
    let router = router_with(Scripted::Reply("time_agent"));

    let decision = router.route(&directory, "What time is it?").await.unwrap();
    assert_eq!(decision.agent, "time_agent");
    assert_eq!(decision.method, RouteMethod::Model);
    assert!(decision.confident);
}

#[tokio::test]
async fn test_model_reply_matches_partially() {
    let directory = two_agent_directory();
    let router = router_with(Scripted::Reply("The best agent is time_agent."));

    let decision = router.route(&directory, "time?").await.unwrap();
    assert_eq!(decision.agent, "time_agent");
    assert_eq!(decision.method, RouteMethod::Model);
}

#[tokio::test]
async fn test_invalid_model_name_falls_back() {
    let directory = two_agent_directory();
    let router = router_with(Scripted::Reply("weather_agent"));

    let decision = router.route(&directory, "What time is it?").await.unwrap();
    assert_eq!(decision.agent, "time_agent");
    assert_eq!(decision.method, RouteMethod::Fallback);
    assert!(decision.confident);
}

#[tokio::test]
async fn test_model_failure_falls_back_deterministically() {
    let directory = two_agent_directory();
    let router = router_with(Scripted::Fail);

    // The result must equal what the pure fallback produces
    let expected = Router::fallback(&directory, "What time is it?").unwrap();
    let decision = router.route(&directory, "What time is it?").await.unwrap();

    assert_eq!(decision.agent, expected.agent);
    assert_eq!(decision.method, RouteMethod::Fallback);
    assert_eq!(decision.confident, expected.confident);
}

#[tokio::test]
async fn test_model_timeout_falls_back() {
    let directory = two_agent_directory();
    let config = RouterConfig {
        model_timeout: Duration::from_millis(10),
        ..RouterConfig::default()
    };
    let router = Router::new(config).with_provider(Arc::new(FakeProvider {
        script: Scripted::Hang,
    }));

    let decision = router.route(&directory, "What time is it?").await.unwrap();
    assert_eq!(decision.agent, "time_agent");
    assert_eq!(decision.method, RouteMethod::Fallback);
}

#[tokio::test]
async fn test_disabled_model_never_calls_provider() {
    let directory = two_agent_directory();
    let config = RouterConfig {
        model_enabled: false,
        ..RouterConfig::default()
    };
    // A hanging provider proves the model path is skipped entirely
    let router = Router::new(config).with_provider(Arc::new(FakeProvider {
        script: Scripted::Hang,
    }));

    let decision = router.route(&directory, "hello there").await.unwrap();
    assert_eq!(decision.agent, "greeting_agent");
    assert_eq!(decision.method, RouteMethod::Fallback);
}

#[tokio::test]
async fn test_no_provider_uses_fallback() {
    let directory = two_agent_directory();
    let router = Router::new(RouterConfig::default());

    let decision = router.route(&directory, "What time is it?").await.unwrap();
    assert_eq!(decision.agent, "time_agent");
    assert_eq!(decision.method, RouteMethod::Fallback);
}

#[tokio::test]
async fn test_unmatched_query_defaults_to_first_agent() {
    let directory = two_agent_directory();
    let router = Router::new(RouterConfig::default());

    let decision = router.route(&directory, "asdkjasd").await.unwrap();
    assert_eq!(decision.agent, "greeting_agent");
    assert_eq!(decision.method, RouteMethod::Fallback);
    assert!(!decision.confident);
}

#[tokio::test]
async fn test_empty_directory_fails_before_any_strategy() {
    let directory = AgentDirectory::for_tests(Vec::new());
    let router = router_with(Scripted::Reply("time_agent"));

    let err = router.route(&directory, "anything").await.unwrap_err();
    assert!(matches!(err, Error::NoAgentsAvailable));
}

#[tokio::test]
async fn test_route_always_returns_directory_member() {
    let directory = two_agent_directory();
    let router = router_with(Scripted::Reply("some nonsense the model said"));

    for query in ["What time is it?", "hello", "asdkjasd", "", "42"] {
        let decision = router.route(&directory, query).await.unwrap();
        assert!(
            directory.get(&decision.agent).is_some(),
            "route returned non-member {:?} for query {:?}",
            decision.agent,
            query
        );
    }
}

#[test]
fn test_normalize_agent_name() {
    assert_eq!(normalize_agent_name("time_agent"), "time_agent");
    assert_eq!(normalize_agent_name("  \"Time_Agent\"  "), "time_agent");
    assert_eq!(normalize_agent_name("time_agent.\nbecause it tells time"), "time_agent");
    assert_eq!(normalize_agent_name("`greeting_agent`,"), "greeting_agent");
    assert_eq!(normalize_agent_name("   "), "");
}

#[test]
fn test_fallback_on_empty_directory_errors() {
    let directory = AgentDirectory::for_tests(Vec::new());
    let err = Router::fallback(&directory, "anything").unwrap_err();
    assert!(matches!(err, Error::NoAgentsAvailable));
}

#[test]
fn test_routing_prompt_embeds_catalog_and_query() {
    let prompt = routing_prompt("Available agents:\n- **time_agent**", "What time is it?");
    assert!(prompt.contains("**time_agent**"));
    assert!(prompt.contains("User Query: \"What time is it?\""));
    assert!(prompt.contains("Agent to use:"));
}

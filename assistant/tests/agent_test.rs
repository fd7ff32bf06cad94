//! Agent loop and session against a mock Messages API

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use ticket_assist::bootstrap::build_registry;
use ticket_assist::config::{AgentLimits, ToolsConfig};
use ticket_assist::session::run_session;
use ticket_assist::{Agent, AgentConfig, AgentError, LlmCategorizer};
use ticket_assist_anthropic::AnthropicClient;
use ticket_assist_core::{Category, TicketRepository};
use ticket_assist_testing::{test_clock, FixedCategorizer, InMemoryTicketStore};
use ticket_assist_tools::ToolRegistry;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn text_response(text: &str) -> Value {
    json!({
        "id": "msg_text",
        "model": "claude-test",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 10, "output_tokens": 5}
    })
}

fn tool_response(id: &str, name: &str, input: Value) -> Value {
    json!({
        "id": "msg_tool",
        "model": "claude-test",
        "role": "assistant",
        "content": [
            {"type": "text", "text": "Let me check."},
            {"type": "tool_use", "id": id, "name": name, "input": input}
        ],
        "stop_reason": "tool_use",
        "usage": {"input_tokens": 10, "output_tokens": 5}
    })
}

fn client_for(server: &MockServer) -> AnthropicClient {
    AnthropicClient::new("test-key").with_base_url(format!("{}/v1", server.uri()))
}

fn tools_config() -> ToolsConfig {
    ToolsConfig {
        knowledge_base_url: None,
        tavily_api_key: None,
        timeout: Duration::from_secs(5),
    }
}

fn seeded() -> InMemoryTicketStore {
    InMemoryTicketStore::with_default_header()
        .with_row(&["TIC1", "Seat broken", "maintenance", "2024-12-01 10:00:00", "a@b.com", "pending"])
}

fn agent_over(server: &MockServer, store: &InMemoryTicketStore, limits: AgentLimits) -> Agent {
    let repository = Arc::new(TicketRepository::new(
        store.clone(),
        FixedCategorizer::new(Category::Refund),
        Arc::new(test_clock()),
    ));
    let registry = build_registry(&repository, &tools_config());
    Agent::new(client_for(server), registry, AgentConfig::new("claude-test", 512, limits))
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn plain_answer_is_kept_in_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Hello! How can I help?")))
        .expect(2)
        .mount(&server)
        .await;

    let mut agent = agent_over(&server, &seeded(), AgentLimits::default());

    assert_eq!(agent.ask("hi").await.unwrap(), "Hello! How can I help?");
    assert_eq!(agent.history().len(), 2);

    agent.ask("thanks").await.unwrap();
    let bodies = request_bodies(&server).await;
    assert_eq!(bodies[1]["messages"].as_array().unwrap().len(), 3);
    assert_eq!(bodies[1]["system"], json!(ticket_assist::agent::SYSTEM_PROMPT));
}

#[tokio::test]
async fn tool_call_result_is_fed_back_to_the_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tool_response(
            "toolu_1",
            "ticket_lookup",
            json!({"query": "TIC1"}),
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(
            "Ticket TIC1 is still pending.",
        )))
        .mount(&server)
        .await;

    let mut agent = agent_over(&server, &seeded(), AgentLimits::default());

    let answer = agent.ask("What is the status of TIC1?").await.unwrap();
    assert_eq!(answer, "Ticket TIC1 is still pending.");

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies.len(), 2);
    let tool_names: Vec<&str> = bodies[0]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        tool_names,
        vec!["save_ticket", "ticket_lookup", "ticket_metrics", "update_ticket_status"]
    );

    let messages = bodies[1]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1]["content"][1]["type"], "tool_use");
    let result = &messages[2]["content"][0];
    assert_eq!(result["type"], "tool_result");
    assert_eq!(result["tool_use_id"], "toolu_1");
    assert_eq!(result["is_error"], false);
    assert!(result["content"].as_str().unwrap().starts_with("Ticket TIC1 (maintenance)"));

    // Only the question and answer are remembered
    assert_eq!(agent.history().len(), 2);
}

#[tokio::test]
async fn unknown_tool_is_reported_as_error_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tool_response(
            "toolu_9",
            "web_search",
            json!({"query": "strike"}),
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("I cannot search.")))
        .mount(&server)
        .await;

    let mut agent = agent_over(&server, &seeded(), AgentLimits::default());
    agent.ask("Is there a strike?").await.unwrap();

    let bodies = request_bodies(&server).await;
    let result = &bodies[1]["messages"][2]["content"][0];
    assert_eq!(result["is_error"], true);
    assert_eq!(result["content"], "Tool not found: web_search");
}

#[tokio::test]
async fn endless_tool_use_hits_iteration_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tool_response(
            "toolu_loop",
            "ticket_metrics",
            json!({}),
        )))
        .expect(2)
        .mount(&server)
        .await;

    let limits = AgentLimits {
        max_iterations: 2,
        ..AgentLimits::default()
    };
    let mut agent = agent_over(&server, &seeded(), limits);

    let err = agent.ask("summarise").await.unwrap_err();

    assert!(matches!(err, AgentError::IterationLimit(2)));
    assert!(agent.history().is_empty());
}

#[tokio::test]
async fn slow_model_hits_time_budget() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_response("late"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let limits = AgentLimits {
        max_iterations: 5,
        max_execution_time: Duration::from_millis(50),
    };
    let mut agent = agent_over(&server, &seeded(), limits);

    let err = agent.ask("hello?").await.unwrap_err();

    assert!(matches!(err, AgentError::Timeout(_)));
    assert!(agent.history().is_empty());
}

fn resave_then_answer(server_answer: &str) -> (Value, Value) {
    (
        tool_response(
            "toolu_resave",
            "save_ticket",
            json!({"ticket_id": "TIC1", "content": "Seat still broken", "user_email": "a@b.com"}),
        ),
        text_response(server_answer),
    )
}

async fn mount_in_order(server: &MockServer, first: Value, then: Value) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(first))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(then))
        .mount(server)
        .await;
}

#[tokio::test]
async fn slow_store_write_runs_past_tool_timeout() {
    let server = MockServer::start().await;
    let (first, then) = resave_then_answer("Updated.");
    mount_in_order(&server, first, then).await;

    let store = seeded();
    let repository = Arc::new(TicketRepository::new(
        store.clone(),
        FixedCategorizer::new(Category::Refund),
        Arc::new(test_clock()),
    ));
    assert!(repository.lookup("TIC1").await.unwrap().to_string().ends_with("Content: Seat broken"));
    store.slow_writes(Duration::from_millis(200));
    let tools = ToolsConfig {
        timeout: Duration::from_millis(50),
        ..tools_config()
    };
    let mut agent = Agent::new(
        client_for(&server),
        build_registry(&repository, &tools),
        AgentConfig::new("claude-test", 512, AgentLimits::default()),
    );

    assert_eq!(agent.ask("Update TIC1 please").await.unwrap(), "Updated.");

    let bodies = request_bodies(&server).await;
    let result = &bodies[1]["messages"][2]["content"][0];
    assert_eq!(result["is_error"], false);
    assert_eq!(
        result["content"],
        "Ticket 'TIC1' updated successfully (category: refund)."
    );
    let lookup = repository.lookup("TIC1").await.unwrap().to_string();
    assert!(lookup.ends_with("Content: Seat still broken"));
}

#[tokio::test]
async fn time_budget_lets_running_tool_finish() {
    let server = MockServer::start().await;
    let (first, then) = resave_then_answer("never sent");
    mount_in_order(&server, first, then).await;

    let store = seeded();
    let repository = Arc::new(TicketRepository::new(
        store.clone(),
        FixedCategorizer::new(Category::Refund),
        Arc::new(test_clock()),
    ));
    repository.lookup("TIC1").await.unwrap();
    store.slow_writes(Duration::from_millis(400));
    let limits = AgentLimits {
        max_iterations: 5,
        max_execution_time: Duration::from_millis(150),
    };
    let mut agent = Agent::new(
        client_for(&server),
        build_registry(&repository, &tools_config()),
        AgentConfig::new("claude-test", 512, limits),
    );

    let err = agent.ask("Update TIC1 please").await.unwrap_err();

    assert!(matches!(err, AgentError::Timeout(_)));
    assert_eq!(request_bodies(&server).await.len(), 1);
    assert_eq!(store.cell(2, "ticket_content").as_deref(), Some("Seat still broken"));
    let lookup = repository.lookup("TIC1").await.unwrap().to_string();
    assert!(lookup.ends_with("Content: Seat still broken"));
}

#[tokio::test]
async fn save_through_agent_uses_llm_categorizer() {
    let server = MockServer::start().await;
    // Categorizer calls are the only ones with a 16 token budget
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"max_tokens": 16, "temperature": 0.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("baggage_luggage")))
        .expect(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tool_response(
            "toolu_save",
            "save_ticket",
            json!({"ticket_id": "tic42", "content": "My suitcase never arrived", "user_email": "r@x.com"}),
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Ticket TIC42 raised.")))
        .mount(&server)
        .await;

    let store = InMemoryTicketStore::with_default_header();
    let client = client_for(&server);
    let repository = Arc::new(TicketRepository::new(
        store.clone(),
        LlmCategorizer::new(client.clone(), "claude-test"),
        Arc::new(test_clock()),
    ));
    let registry = build_registry(&repository, &tools_config());
    let mut agent = Agent::new(
        client,
        registry,
        AgentConfig::new("claude-test", 512, AgentLimits::default()),
    );

    assert_eq!(agent.ask("Raise TIC42 for my lost suitcase").await.unwrap(), "Ticket TIC42 raised.");
    assert_eq!(store.row_count(), 1);
    assert_eq!(store.cell(2, "ticket_id").as_deref(), Some("TIC42"));
    assert_eq!(store.cell(2, "ticket_category").as_deref(), Some("baggage_luggage"));
    assert_eq!(store.cell(2, "ticket_status").as_deref(), Some("pending"));
}

#[tokio::test]
async fn session_answers_until_exit_and_survives_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Refunds take 7 days.")))
        .mount(&server)
        .await;

    let mut agent = Agent::new(
        client_for(&server),
        ToolRegistry::new(),
        AgentConfig::new("claude-test", 512, AgentLimits::default()),
    );
    let input: &[u8] = b"first try\n\nhow long do refunds take?\nQuit\nnever asked\n";
    let mut out = Vec::new();

    run_session(&mut agent, input, &mut out).await.unwrap();

    let transcript = String::from_utf8(out).unwrap();
    assert!(transcript.starts_with("Welcome to the AI Ticket Assistant!"));
    assert!(transcript.contains("Warning: Error: "));
    assert!(transcript.contains("\nFinal Answer:\nRefunds take 7 days.\n"));
    assert!(transcript.trim_end().ends_with("Goodbye!"));
    assert_eq!(request_bodies(&server).await.len(), 2);
}

#[tokio::test]
async fn session_ends_at_end_of_input() {
    let server = MockServer::start().await;
    let mut agent = Agent::new(
        client_for(&server),
        ToolRegistry::new(),
        AgentConfig::new("claude-test", 512, AgentLimits::default()),
    );
    let input: &[u8] = b"";
    let mut out = Vec::new();

    run_session(&mut agent, input, &mut out).await.unwrap();

    assert!(String::from_utf8(out).unwrap().contains("Enter your question: "));
    assert!(request_bodies(&server).await.is_empty());
}

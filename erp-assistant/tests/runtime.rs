use erp_assistant::config::{AppConfig, DatasetSource};
use erp_assistant::runtime::{Runtime, RuntimeError, SessionSummary};
use erp_assistant::store::LookupStore;
use erp_assistant::tools::catalog::{MissPolicy, STOCK_BALANCE_TOOL};
use erp_assistant::tools::{CallOutcome, FailureKind, ToolCallRequest, ToolCallResponse};
use serde_json::json;

fn runtime(policy: MissPolicy) -> Runtime {
    Runtime::with_store(LookupStore::builtin().unwrap(), policy).unwrap()
}

#[tokio::test]
async fn serve_answers_each_line_in_order() {
    let runtime = runtime(MissPolicy::Surface);
    let input = concat!(
        r#"{"id":"5f0c6a4e-3b1d-4c52-9a61-0d3c1e2b7f10","name":"get_stock_balance","arguments":{"product_name":"Монитор 24 дюйма"}}"#,
        "\n",
        "\n",
        "this is not json\n",
        r#"{"name":"get_counterparty_debt","arguments":{"counterparty_name":"ип васильев"}}"#,
        "\n",
        r#"{"name":"unknown_tool"}"#,
        "\n",
    );
    let mut output = Vec::new();

    let summary = runtime
        .serve(input.as_bytes(), &mut output)
        .await
        .expect("session");
    assert_eq!(
        summary,
        SessionSummary {
            requests: 4,
            failures: 2
        }
    );

    let responses: Vec<ToolCallResponse> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).expect("response line"))
        .collect();
    assert_eq!(responses.len(), 4);

    assert_eq!(
        responses[0].id.to_string(),
        "5f0c6a4e-3b1d-4c52-9a61-0d3c1e2b7f10"
    );
    assert_eq!(responses[0].output(), Some(&json!({ "stock_balance": 88 })));
    assert_eq!(
        responses[1].failure_kind(),
        Some(FailureKind::InvalidArguments)
    );
    assert_eq!(responses[2].output(), Some(&json!({ "debt": 30000.0 })));
    assert_eq!(responses[3].failure_kind(), Some(FailureKind::UnknownTool));

    let stats = runtime.stats();
    assert_eq!(stats.calls, 3);
    assert_eq!(stats.successes, 2);
}

#[test]
fn miss_policy_controls_not_found_surface() {
    let request = || ToolCallRequest::new(STOCK_BALANCE_TOOL, json!({ "product_name": "шкаф" }));

    let surfaced = runtime(MissPolicy::Surface).handle(request());
    match surfaced.outcome {
        CallOutcome::Error { kind, message } => {
            assert_eq!(kind, FailureKind::NotFound);
            assert!(message.contains("шкаф"), "{message}");
        }
        CallOutcome::Ok { .. } => panic!("miss should surface"),
    }

    let defaulted = runtime(MissPolicy::ZeroDefault).handle(request());
    assert_eq!(defaulted.output(), Some(&json!({ "stock_balance": 0 })));
}

#[test]
fn manifest_describes_both_tools() {
    let manifest = runtime(MissPolicy::Surface).manifest();
    let names: Vec<_> = manifest
        .tools
        .iter()
        .map(|tool| tool["name"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(names, ["get_stock_balance", "get_counterparty_debt"]);
    assert!(manifest.instruction.contains("1С"));
}

#[test]
fn missing_dataset_aborts_start_up() {
    let config = AppConfig {
        dataset: DatasetSource::File {
            path: "/nonexistent/erp/dataset.json".into(),
        },
        ..AppConfig::default()
    };
    let err = Runtime::from_config(&config).expect_err("missing dataset");
    assert!(matches!(err, RuntimeError::Config(_)));
}

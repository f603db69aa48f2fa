//! End-to-end client tests against a mock solver backend.
//!
//! The mock records every request it sees, so the tests assert the exact
//! wire shapes: multipart fields for /parse, the bare parsed-problem body
//! for /solve, and the feedback pairing.

use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use quantix_core::types::{ClientConfig, ParsedProblem, ParserMetadata, ProblemInput, Rating};
use quantix_lib::client::SolverClient;
use quantix_lib::session::SolveSession;

#[derive(Debug, Clone)]
struct ParseSeen {
    input_type: String,
    text: String,
    file_name: String,
    file_bytes: usize,
}

#[derive(Clone, Default)]
struct Recorded {
    parses: Arc<Mutex<Vec<ParseSeen>>>,
    feedback: Arc<Mutex<Vec<Value>>>,
}

async fn parse_handler(State(recorded): State<Recorded>, mut multipart: Multipart) -> Json<Value> {
    let mut seen = ParseSeen {
        input_type: String::new(),
        text: String::new(),
        file_name: String::new(),
        file_bytes: 0,
    };
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "input_type" => seen.input_type = field.text().await.unwrap(),
            "text" => seen.text = field.text().await.unwrap(),
            "file" => {
                seen.file_name = field.file_name().unwrap_or("").to_string();
                seen.file_bytes = field.bytes().await.unwrap().len();
            }
            _ => {}
        }
    }
    let problem_text = if seen.text.is_empty() {
        "x + 1 = 2".to_string()
    } else {
        seen.text.clone()
    };
    recorded.parses.lock().unwrap().push(seen);

    Json(json!({
        "raw_text": problem_text,
        "parsed_problem": {
            "problem_text": problem_text,
            "topic": "calculus",
            "operation": "derivative",
            "variables": ["x"],
            "constraints": [],
            "needs_clarification": false,
            "parser_metadata": {"confidence": "high", "auto_detected": true}
        },
        "confidence": "high",
        "needs_hitl": false
    }))
}

async fn solve_handler(Json(problem): Json<Value>) -> Response {
    if problem["topic"] == "explode" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "solver crashed"})),
        )
            .into_response();
    }
    if problem["topic"] == "empty" {
        return Json(json!({})).into_response();
    }
    Json(json!({
        "results": [{
            "question": problem["problem_text"],
            "final_answer": {"text": "2*x", "latex": "2x"},
            "steps": ["apply the power rule"],
            "explanation": "the exponent drops down",
            "source": {"answer": "solver", "explanation": "explainer"}
        }],
        "total_problems": 1
    }))
    .into_response()
}

async fn feedback_handler(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    recorded.feedback.lock().unwrap().push(body);
    Json(json!({"status": "stored"}))
}

async fn spawn_backend() -> (SolverClient, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/parse", post(parse_handler))
        .route("/solve", post(solve_handler))
        .route("/feedback", post(feedback_handler))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = SolverClient::new(ClientConfig {
        base_url: format!("http://{addr}"),
        ..ClientConfig::default()
    })
    .unwrap();
    (client, recorded)
}

fn parsed_problem(topic: &str) -> ParsedProblem {
    ParsedProblem {
        problem_text: "x + 1 = 2".to_string(),
        topic: topic.to_string(),
        operation: None,
        variables: vec![],
        constraints: vec![],
        needs_clarification: false,
        parser_metadata: ParserMetadata {
            confidence: "high".to_string(),
            auto_detected: true,
        },
    }
}

#[tokio::test]
async fn text_problem_full_roundtrip() {
    let (client, recorded) = spawn_backend().await;
    let mut session = SolveSession::new(client);

    let input = ProblemInput::text("derivative of\n\nx squared   please");
    let parse = session.parse(&input).await.unwrap();
    assert_eq!(parse.parsed_problem.topic, "calculus");
    assert!(!parse.needs_hitl);

    let solution = session.solve().await.unwrap();
    assert_eq!(solution.total_problems, 1);
    assert_eq!(solution.results[0].final_answer.text, "2*x");
    assert_eq!(
        solution.results[0].final_answer.latex.as_deref(),
        Some("2x")
    );

    session
        .feedback(Rating::Down, Some("the sign is wrong".to_string()))
        .await
        .unwrap();

    let parses = recorded.parses.lock().unwrap();
    assert_eq!(parses.len(), 1);
    assert_eq!(parses[0].input_type, "text");
    // Typed text is whitespace-compacted before it hits the wire.
    assert_eq!(parses[0].text, "derivative of x squared please");

    let feedback = recorded.feedback.lock().unwrap();
    assert_eq!(feedback.len(), 1);
    assert_eq!(feedback[0]["feedback"], "incorrect");
    assert_eq!(feedback[0]["correction"], "the sign is wrong");
    assert_eq!(feedback[0]["problem"]["topic"], "calculus");
    assert_eq!(feedback[0]["solution"]["total_problems"], 1);
}

#[tokio::test]
async fn thumbs_up_without_correction_omits_the_field() {
    let (client, recorded) = spawn_backend().await;
    let mut session = SolveSession::new(client);

    session
        .solve_input(&ProblemInput::text("2 + 2"))
        .await
        .unwrap();
    session.feedback(Rating::Up, None).await.unwrap();

    let feedback = recorded.feedback.lock().unwrap();
    assert_eq!(feedback[0]["feedback"], "correct");
    assert!(feedback[0].get("correction").is_none());
}

#[tokio::test]
async fn transcript_travels_as_audio_text_field() {
    let (client, recorded) = spawn_backend().await;

    let input = ProblemInput::transcript("diff(x**2+2)");
    client.parse(&input).await.unwrap();

    let parses = recorded.parses.lock().unwrap();
    assert_eq!(parses[0].input_type, "audio");
    assert_eq!(parses[0].text, "diff(x**2+2)");
    assert_eq!(parses[0].file_name, "");
}

#[tokio::test]
async fn image_travels_as_file_part() {
    let (client, recorded) = spawn_backend().await;

    let input = ProblemInput::image("problem.png", vec![0x89, 0x50, 0x4e, 0x47]);
    let parse = client.parse(&input).await.unwrap();
    assert_eq!(parse.parsed_problem.problem_text, "x + 1 = 2");

    let parses = recorded.parses.lock().unwrap();
    assert_eq!(parses[0].input_type, "image");
    assert_eq!(parses[0].file_name, "problem.png");
    assert_eq!(parses[0].file_bytes, 4);
    assert_eq!(parses[0].text, "");
}

#[tokio::test]
async fn backend_error_carries_status_and_body() {
    let (client, _recorded) = spawn_backend().await;

    let err = client.solve(&parsed_problem("explode")).await.unwrap_err();
    assert!(err.contains("500"), "unexpected error: {err}");
    assert!(err.contains("solver crashed"), "unexpected error: {err}");
}

#[tokio::test]
async fn missing_results_deserialize_as_empty() {
    let (client, _recorded) = spawn_backend().await;

    let solution = client.solve(&parsed_problem("empty")).await.unwrap();
    assert!(solution.results.is_empty());
    assert_eq!(solution.total_problems, 0);
}

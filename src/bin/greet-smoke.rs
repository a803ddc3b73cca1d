//! Smoke tests for the greeting server
//!
//! Spawns the `greet-server` binary that sits next to this executable, waits
//! until it accepts TCP connections, runs the selected checks against it and
//! kills it afterwards.
//!
//! Usage: `greet-smoke [TEST_NAME...]`. Without arguments every test runs.
//! Each test answers to its snake_case name and to its camelCase alias
//! (`get_root` or `testGetRoot`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::{ExitCode, Stdio};
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, StatusCode};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};

const SERVER_BIN: &str = "greet-server";
const SERVER_ADDR: &str = "127.0.0.1:2005";
const READY_TIMEOUT: Duration = Duration::from_secs(5);
const READY_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
enum SmokeError {
    #[error("server binary not found at {0}")]
    ServerBinaryMissing(PathBuf),
    #[error("failed to spawn server: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("server exited before accepting connections ({0})")]
    ServerExited(std::process::ExitStatus),
    #[error("server not accepting connections on {0} after {1:?}")]
    NotReady(SocketAddr, Duration),
    #[error("request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),
    #[error("invalid request: {0}")]
    Http(#[from] hyper::http::Error),
    #[error("failed to read response body: {0}")]
    Body(#[from] hyper::Error),
    #[error("response is not JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Assertion(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

type HttpClient = Client<HttpConnector, Full<Bytes>>;

/// A named check against the running server
struct SmokeTest {
    name: &'static str,
    alias: &'static str,
    label: &'static str,
    method: Method,
    path: &'static str,
    body: Option<Value>,
    expected_status: StatusCode,
    expected_field: (&'static str, &'static str),
}

fn all_tests() -> Vec<SmokeTest> {
    vec![
        SmokeTest {
            name: "get_root",
            alias: "testGetRoot",
            label: r#"GET "/""#,
            method: Method::GET,
            path: "/",
            body: None,
            expected_status: StatusCode::OK,
            expected_field: ("msg", "Hello World!!!"),
        },
        SmokeTest {
            name: "path_param_greeting",
            alias: "testPathParamGreeting",
            label: r#"GET "/greet/:name""#,
            method: Method::GET,
            path: "/greet/John",
            body: None,
            expected_status: StatusCode::OK,
            expected_field: ("msg", "Hello John!"),
        },
        SmokeTest {
            name: "query_param_greeting",
            alias: "testQueryParamGreeting",
            label: r#"GET "/greeting?name=Alice&age=25""#,
            method: Method::GET,
            path: "/greeting?name=Alice&age=25",
            body: None,
            expected_status: StatusCode::OK,
            expected_field: ("msg", "Hello my name is Alice and im 25 years old."),
        },
        SmokeTest {
            name: "post_greet",
            alias: "testPostGreet",
            label: r#"POST "/greet""#,
            method: Method::POST,
            path: "/greet",
            body: Some(json!({"name": "Bob", "age": 30})),
            expected_status: StatusCode::OK,
            expected_field: ("msg", "Hello my name is Bob and im 30 years old."),
        },
        SmokeTest {
            name: "not_found",
            alias: "test404",
            label: "404 for unknown route",
            method: Method::GET,
            path: "/unknown",
            body: None,
            expected_status: StatusCode::NOT_FOUND,
            expected_field: ("error", "Route not found"),
        },
    ]
}

impl SmokeTest {
    fn answers_to(&self, arg: &str) -> bool {
        self.name == arg || self.alias == arg
    }
}

/// Pick the tests named in `args`, or all of them when `args` is empty
///
/// Returns the selection in canonical order plus any names that matched
/// nothing.
fn select_tests(tests: Vec<SmokeTest>, args: &[String]) -> (Vec<SmokeTest>, Vec<String>) {
    if args.is_empty() {
        return (tests, Vec::new());
    }
    let unknown = args
        .iter()
        .filter(|a| !tests.iter().any(|t| t.answers_to(a)))
        .cloned()
        .collect();
    let selected = tests
        .into_iter()
        .filter(|t| args.iter().any(|a| t.answers_to(a)))
        .collect();
    (selected, unknown)
}

fn server_binary() -> Result<PathBuf, SmokeError> {
    let path = std::env::current_exe()?
        .with_file_name(format!("{SERVER_BIN}{}", std::env::consts::EXE_SUFFIX));
    if path.is_file() {
        Ok(path)
    } else {
        Err(SmokeError::ServerBinaryMissing(path))
    }
}

async fn start_server() -> Result<Child, SmokeError> {
    println!("Starting the server..");
    Command::new(server_binary()?)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(SmokeError::Spawn)
}

/// Poll the server port until a TCP connect succeeds
async fn wait_until_ready(child: &mut Child, addr: SocketAddr) -> Result<(), SmokeError> {
    let deadline = tokio::time::Instant::now() + READY_TIMEOUT;
    loop {
        if TcpStream::connect(addr).await.is_ok() {
            return Ok(());
        }
        if let Some(status) = child.try_wait()? {
            return Err(SmokeError::ServerExited(status));
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(SmokeError::NotReady(addr, READY_TIMEOUT));
        }
        tokio::time::sleep(READY_POLL_INTERVAL).await;
    }
}

async fn stop_server(child: &mut Child) {
    println!("Stopping the server ..");
    if let Err(e) = child.kill().await {
        eprintln!("Failed to stop server: {e}");
    }
}

async fn run_test(client: &HttpClient, test: &SmokeTest) -> Result<(), SmokeError> {
    let body = match &test.body {
        Some(value) => Bytes::from(serde_json::to_vec(value)?),
        None => Bytes::new(),
    };
    let req = Request::builder()
        .method(test.method.clone())
        .uri(format!("http://{SERVER_ADDR}{}", test.path))
        .header("content-type", "application/json")
        .body(Full::new(body))?;

    let resp = client.request(req).await?;
    let status = resp.status();
    let bytes = resp.into_body().collect().await?.to_bytes();
    let payload: Value = serde_json::from_slice(&bytes)?;

    check_response(test, status, &payload)
}

fn check_response(test: &SmokeTest, status: StatusCode, payload: &Value) -> Result<(), SmokeError> {
    if status != test.expected_status {
        return Err(SmokeError::Assertion(format!(
            "expected status {}, got {status}",
            test.expected_status
        )));
    }
    let (field, expected) = test.expected_field;
    if payload[field] != expected {
        return Err(SmokeError::Assertion(format!(
            "expected {field} {expected:?}, got {}",
            payload[field]
        )));
    }
    Ok(())
}

async fn run_tests(tests: &[SmokeTest]) -> Result<usize, SmokeError> {
    let addr: SocketAddr = SERVER_ADDR
        .parse()
        .map_err(|e| SmokeError::Assertion(format!("bad server address: {e}")))?;

    let mut child = start_server().await?;
    let outcome = match wait_until_ready(&mut child, addr).await {
        Ok(()) => {
            let client: HttpClient = Client::builder(TokioExecutor::new()).build_http();
            let mut failed = 0;
            for test in tests {
                match run_test(&client, test).await {
                    Ok(()) => println!("✓ Test {} passed.", test.label),
                    Err(e) => {
                        failed += 1;
                        eprintln!("✗ Test {} failed: {e}", test.label);
                    }
                }
            }
            Ok(failed)
        }
        Err(e) => Err(e),
    };
    stop_server(&mut child).await;
    outcome
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    println!("Running tests..\n");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (tests, unknown) = select_tests(all_tests(), &args);
    for name in &unknown {
        eprintln!("Unknown test name ignored: {name}");
    }
    if tests.is_empty() {
        eprintln!("✗ No known test selected; nothing to run");
        return ExitCode::FAILURE;
    }

    match run_tests(&tests).await {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("✗ Test run failed: {e}");
            ExitCode::FAILURE
        }
    }
}

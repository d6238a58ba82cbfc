//! Integration tests for the HTTP gateway executor against a stub gateway.
//!
//! The stub is a real actix-web server bound to an ephemeral port. It records
//! each request (path, authorisation header, JSON body) and answers from a
//! scripted queue, so every outcome class of the executor is exercised over
//! a genuine HTTP round trip.

use std::collections::VecDeque;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::http::{StatusCode, header};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use hydraulic_store::domain::ports::{RemoteErrorKind, SqlExecutor, SqlExecutorExt, StoreError};
use hydraulic_store::domain::{
    FetchMode, HydraulicRepository, NewFluid, QueryOutput, SqlValue, Statement,
};
use hydraulic_store::outbound::gateway::{GatewayConfig, GatewayHttpExecutor, ProtocolVersion};
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::{Value, json};

const TOKEN: &str = "secret-token";

#[derive(Debug, Clone)]
struct RecordedRequest {
    path: String,
    authorization: Option<String>,
    body: Value,
}

#[derive(Debug, Clone)]
struct ScriptedReply {
    status: u16,
    body: String,
    delay: Duration,
}

impl ScriptedReply {
    fn ok(body: Value) -> Self {
        Self::raw(200, body.to_string())
    }

    fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone, Default)]
struct StubState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
}

impl StubState {
    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("request log lock").clone()
    }
}

struct StubGateway {
    base_url: String,
    state: StubState,
    handle: ServerHandle,
}

impl StubGateway {
    fn executor(&self, protocol: ProtocolVersion) -> GatewayHttpExecutor {
        self.executor_with_timeout(protocol, Duration::from_secs(5))
    }

    fn executor_with_timeout(
        &self,
        protocol: ProtocolVersion,
        timeout: Duration,
    ) -> GatewayHttpExecutor {
        let config = GatewayConfig::new(&self.base_url, TOKEN)
            .expect("stub config")
            .with_protocol(protocol)
            .with_timeout(timeout);
        GatewayHttpExecutor::new(config).expect("executor builds")
    }

    fn only_request(&self) -> RecordedRequest {
        let mut requests = self.state.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.remove(0)
    }

    async fn stop(self) {
        self.handle.stop(false).await;
    }
}

async fn record_and_reply(
    request: HttpRequest,
    body: web::Bytes,
    state: web::Data<StubState>,
) -> HttpResponse {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    state
        .requests
        .lock()
        .expect("request log lock")
        .push(RecordedRequest {
            path: request.path().to_owned(),
            authorization,
            body: serde_json::from_slice(&body).unwrap_or(Value::Null),
        });

    let reply = state
        .replies
        .lock()
        .expect("reply script lock")
        .pop_front()
        .unwrap_or_else(|| ScriptedReply::raw(500, "stub script exhausted"));
    if !reply.delay.is_zero() {
        actix_web::rt::time::sleep(reply.delay).await;
    }
    HttpResponse::build(StatusCode::from_u16(reply.status).expect("scripted status"))
        .content_type("application/json")
        .body(reply.body)
}

fn spawn_stub(replies: Vec<ScriptedReply>) -> StubGateway {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
    let addr = listener.local_addr().expect("stub address");
    let state = StubState {
        requests: Arc::default(),
        replies: Arc::new(Mutex::new(replies.into())),
    };
    let data = web::Data::new(state.clone());

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .default_service(web::to(record_and_reply))
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .expect("listen on stub socket")
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    StubGateway {
        base_url: format!("http://{addr}"),
        state,
        handle,
    }
}

fn pipeline_rows(cols: &[&str], rows: Value) -> Value {
    let cols: Vec<Value> = cols.iter().map(|name| json!({ "name": name })).collect();
    json!({
        "baton": null,
        "results": [{
            "type": "ok",
            "response": {
                "type": "execute",
                "result": { "cols": cols, "rows": rows, "affected_row_count": 0 }
            }
        }]
    })
}

fn pipeline_error(message: &str, code: &str) -> Value {
    json!({
        "results": [{ "type": "error", "error": { "message": message, "code": code } }]
    })
}

#[actix_rt::test]
async fn pipeline_request_is_authorised_and_typed() {
    let stub = spawn_stub(vec![ScriptedReply::ok(pipeline_rows(
        &["material_name", "roughness"],
        json!([[
            { "type": "text", "value": "steel" },
            { "type": "float", "value": 4.5e-5 }
        ]]),
    ))]);
    let executor = stub.executor(ProtocolVersion::Pipeline);

    let statement = Statement::new(
        "SELECT material_name, roughness FROM user_materials WHERE username = ? AND id > ?",
    )
    .bind("ada")
    .bind(7_i64);
    let rows = executor.fetch_all(&statement).await.expect("query succeeds");

    assert_eq!(rows.len(), 1);
    let row = rows.first().expect("one row");
    assert_eq!(row.text("material_name").expect("text"), "steel");
    assert_eq!(row.real("roughness").expect("real"), 4.5e-5);

    let request = stub.only_request();
    assert_eq!(request.path, "/v2/pipeline");
    assert_eq!(request.authorization.as_deref(), Some("Bearer secret-token"));
    assert_eq!(
        request.body["requests"][0]["stmt"]["args"],
        json!([
            { "type": "text", "value": "ada" },
            { "type": "integer", "value": "7" }
        ])
    );
    stub.stop().await;
}

#[rstest]
#[case::query_params(
    ProtocolVersion::QueryParams,
    "/",
    json!([{ "results": { "columns": ["project_name"], "rows": [["Alpha"], ["Beta"]] } }])
)]
#[case::stmt_params(
    ProtocolVersion::StmtParams,
    "/v1/execute",
    json!({ "results": [{ "columns": ["project_name"], "rows": [["Alpha"], ["Beta"]] }] })
)]
#[case::pipeline(
    ProtocolVersion::Pipeline,
    "/v2/pipeline",
    pipeline_rows(&["project_name"], json!([["Alpha"], ["Beta"]]))
)]
#[actix_rt::test]
async fn every_generation_decodes_the_same_rows(
    #[case] protocol: ProtocolVersion,
    #[case] expected_path: &str,
    #[case] reply: Value,
) {
    let stub = spawn_stub(vec![ScriptedReply::ok(reply)]);
    let executor = stub.executor(protocol);

    let rows = executor
        .fetch_all(&Statement::new("SELECT project_name FROM projects WHERE username = ?").bind("ada"))
        .await
        .expect("query succeeds");
    let names: Vec<&str> = rows
        .iter()
        .map(|row| row.text("project_name").expect("text"))
        .collect();
    assert_eq!(names, ["Alpha", "Beta"]);
    assert_eq!(stub.only_request().path, expected_path);
    stub.stop().await;
}

#[actix_rt::test]
async fn non_success_status_keeps_code_and_body() {
    let stub = spawn_stub(vec![ScriptedReply::raw(
        503,
        "{\"error\": \"database   is\n waking up\"}",
    )]);
    let executor = stub.executor(ProtocolVersion::Pipeline);

    let error = executor
        .execute(&Statement::new("SELECT 1"), FetchMode::One)
        .await
        .expect_err("503 surfaces");
    assert_eq!(
        error,
        StoreError::gateway_http(503_u16, "{\"error\": \"database is waking up\"}")
    );
    stub.stop().await;
}

#[actix_rt::test]
async fn malformed_body_is_a_decode_error() {
    let stub = spawn_stub(vec![ScriptedReply::raw(200, "<html>proxy error</html>")]);
    let executor = stub.executor(ProtocolVersion::StmtParams);

    let error = executor
        .execute(&Statement::new("SELECT 1"), FetchMode::All)
        .await
        .expect_err("not JSON");
    assert!(matches!(error, StoreError::ProtocolDecode { .. }), "{error:?}");
    stub.stop().await;
}

#[actix_rt::test]
async fn rows_without_columns_are_never_silently_empty() {
    let body = json!({
        "results": [{
            "type": "ok",
            "response": { "type": "execute", "result": { "rows": [[{ "type": "integer", "value": "1" }]] } }
        }]
    });
    let stub = spawn_stub(vec![ScriptedReply::ok(body)]);
    let executor = stub.executor(ProtocolVersion::Pipeline);

    let error = executor
        .execute(&Statement::new("SELECT 1"), FetchMode::One)
        .await
        .expect_err("missing cols");
    assert!(matches!(error, StoreError::ProtocolDecode { .. }), "{error:?}");
    stub.stop().await;
}

#[actix_rt::test]
async fn empty_result_list_honours_fetch_mode() {
    let stub = spawn_stub(vec![ScriptedReply::ok(json!({ "results": [] }))]);
    let executor = stub.executor(ProtocolVersion::Pipeline);

    let output = executor
        .execute(&Statement::new("SELECT 1"), FetchMode::One)
        .await
        .expect("empty reply is not an error");
    assert_eq!(output, QueryOutput::Row(None));
    stub.stop().await;
}

#[actix_rt::test]
async fn uniqueness_errors_become_false_through_the_repository() {
    let stub = spawn_stub(vec![ScriptedReply::ok(pipeline_error(
        "SQLite error: UNIQUE constraint failed: user_fluids.username, user_fluids.fluid_name",
        "SQLITE_CONSTRAINT_UNIQUE",
    ))]);
    let repository = HydraulicRepository::new(
        Arc::new(stub.executor(ProtocolVersion::Pipeline)),
        Arc::new(DefaultClock),
    );

    let inserted = repository
        .add_fluid("ada", "water", &NewFluid::new(998.0, 1.0e-6, 2.34))
        .await
        .expect("duplicate is not an error");
    assert!(!inserted);

    let request = stub.only_request();
    assert_eq!(
        request.body["requests"][0]["stmt"]["args"][2],
        json!({ "type": "float", "value": 998.0 })
    );
    stub.stop().await;
}

#[rstest]
#[case::stmt_params(ProtocolVersion::StmtParams)]
#[case::pipeline(ProtocolVersion::Pipeline)]
#[actix_rt::test]
async fn success_bodies_without_results_do_not_count_as_inserts(#[case] protocol: ProtocolVersion) {
    let stub = spawn_stub(vec![ScriptedReply::ok(json!({ "message": "rate limited" }))]);
    let repository =
        HydraulicRepository::new(Arc::new(stub.executor(protocol)), Arc::new(DefaultClock));

    let error = repository
        .add_fluid("ada", "water", &NewFluid::new(998.0, 1.0e-6, 2.34))
        .await
        .expect_err("body without results");
    assert!(matches!(error, StoreError::ProtocolDecode { .. }), "{error:?}");
    stub.stop().await;
}

#[actix_rt::test]
async fn other_remote_errors_propagate_with_their_kind() {
    let stub = spawn_stub(vec![ScriptedReply::ok(json!([
        { "error": { "message": "no such table: user_materials" } }
    ]))]);
    let executor = stub.executor(ProtocolVersion::QueryParams);

    let error = executor
        .execute(&Statement::new("SELECT 1"), FetchMode::None)
        .await
        .expect_err("remote failure");
    assert_eq!(
        error,
        StoreError::remote_execution(RemoteErrorKind::Other, "no such table: user_materials")
    );
    stub.stop().await;
}

#[actix_rt::test]
async fn unencodable_arguments_never_reach_the_gateway() {
    let stub = spawn_stub(Vec::new());
    let executor = stub.executor(ProtocolVersion::Pipeline);

    let error = executor
        .execute(
            &Statement::new("INSERT INTO user_materials VALUES (?)").bind(SqlValue::Float(f64::NAN)),
            FetchMode::None,
        )
        .await
        .expect_err("NaN rejected");
    assert!(matches!(error, StoreError::InvalidArgument { .. }), "{error:?}");
    assert!(stub.state.requests().is_empty());
    stub.stop().await;
}

#[actix_rt::test]
async fn slow_gateway_times_out_as_transport_error() {
    let stub = spawn_stub(vec![
        ScriptedReply::ok(json!({ "results": [] })).delayed(Duration::from_secs(3)),
    ]);
    let executor =
        stub.executor_with_timeout(ProtocolVersion::Pipeline, Duration::from_millis(200));

    let error = executor
        .execute(&Statement::new("SELECT 1"), FetchMode::None)
        .await
        .expect_err("timeout");
    match error {
        StoreError::Transport { message } => assert!(message.contains("timed out"), "{message}"),
        other => panic!("expected Transport, got {other:?}"),
    }
    stub.stop().await;
}

#[actix_rt::test]
async fn refused_connection_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe listener");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);

    let config = GatewayConfig::new(&format!("http://{addr}"), TOKEN).expect("config");
    let executor = GatewayHttpExecutor::new(config).expect("executor builds");
    let error = executor
        .execute(&Statement::new("SELECT 1"), FetchMode::None)
        .await
        .expect_err("nothing listening");
    assert!(matches!(error, StoreError::Transport { .. }), "{error:?}");
}

//! Command protocol integration tests
//!
//! Full client flows against a scripted transport: token acquisition and
//! injection, status discipline, envelope interpretation, transport error
//! wrapping, and the raw-content export paths. Each test scripts the
//! server's replies up front and asserts both on the typed outcome and on
//! what actually went over the wire.

use refine_client::http::{Method, RequestBody, StatusCode};
use refine_client::{
    Command, CommandResponse, CreateProjectCommand, DeleteProjectCommand, ExportFormat,
    RawResponse, RdfFormat, RefineError,
};

#[path = "helpers/mock_transport.rs"]
mod mock_transport;
use mock_transport::{client, MockTransport};

// =============================================================================
// Token acquisition and injection
// =============================================================================

#[tokio::test]
async fn test_delete_project_fetches_token_then_posts_form() {
    let transport = MockTransport::new();
    transport.push_token("tok-abc");
    transport.push_ok(r#"{"code": "ok"}"#);

    let response = client(&transport).delete_project("1234567890").await.unwrap();
    assert!(response.is_ok());
    assert_eq!(response.message(), None);

    let (token_url, token_request) = transport.request(0);
    assert_eq!(token_url.path(), "/command/core/get-csrf-token");
    assert_eq!(token_request.method(), &Method::GET);
    assert_eq!(token_request.accept_header(), Some("application/json"));

    let (delete_url, delete_request) = transport.request(1);
    assert_eq!(delete_url.path(), "/command/core/delete-project");
    assert_eq!(delete_request.method(), &Method::POST);
    assert_eq!(delete_request.form_value("csrf_token"), Some("tok-abc"));
    assert_eq!(delete_request.form_value("project"), Some("1234567890"));
}

#[tokio::test]
async fn test_each_mutating_call_gets_its_own_token() {
    let transport = MockTransport::new();
    transport.push_token("tok-1");
    transport.push_ok(r#"{"code": "ok"}"#);
    transport.push_token("tok-2");
    transport.push_ok(r#"{"code": "ok"}"#);

    let refine = client(&transport);
    refine.delete_project("1").await.unwrap();
    refine.set_preference("userMetadata", "[]").await.unwrap();

    let (_, first) = transport.request(1);
    let (_, second) = transport.request(3);
    assert_eq!(first.form_value("csrf_token"), Some("tok-1"));
    assert_eq!(second.form_value("csrf_token"), Some("tok-2"));
}

#[tokio::test]
async fn test_token_reply_without_token_field_is_a_shape_failure() {
    let transport = MockTransport::new();
    transport.push_ok(r#"{"code": "ok"}"#);

    let err = client(&transport).fetch_csrf_token().await.unwrap_err();
    match err {
        RefineError::MissingField { path, document } => {
            assert_eq!(path, "token");
            assert!(document.contains("code"));
        }
        other => panic!("expected MissingField, got {other:?}"),
    }
}

// =============================================================================
// Read-only commands
// =============================================================================

#[tokio::test]
async fn test_get_version_parses_exact_identity() {
    let transport = MockTransport::new();
    transport.push_ok(
        r#"{"full_name":"OpenRefine 3.0-beta [TRUNK]","full_version":"3.0-beta [TRUNK]","version":"3.0-beta","revision":"TRUNK"}"#,
    );

    let version = client(&transport).get_version().await.unwrap();
    assert_eq!(version.full_name, "OpenRefine 3.0-beta [TRUNK]");
    assert_eq!(version.full_version, "3.0-beta [TRUNK]");
    assert_eq!(version.version, "3.0-beta");
    assert_eq!(version.revision, "TRUNK");

    // One exchange, no token involved.
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_read_only_commands_send_queries_without_tokens() {
    let transport = MockTransport::new();
    transport.push_ok(
        r#"{"columnModel":{},"httpHeaders":{},"overlayModels":{},"recordModel":{},"scripting":{}}"#,
    );
    transport.push_ok(r#"{"value": "5"}"#);

    let refine = client(&transport);
    refine.get_models("1234567890").await.unwrap();
    let value = refine.get_preference("ui.rows").await.unwrap();
    assert_eq!(value, serde_json::json!("5"));

    let (models_url, models_request) = transport.request(0);
    assert_eq!(models_url.path(), "/command/core/get-models");
    assert_eq!(
        models_request.query_pairs(),
        &[("project".to_string(), "1234567890".to_string())]
    );
    let (_, preference_request) = transport.request(1);
    assert_eq!(
        preference_request.query_pairs(),
        &[("name".to_string(), "ui.rows".to_string())]
    );
}

#[tokio::test]
async fn test_preview_expression_round_trip() {
    let transport = MockTransport::new();
    transport.push_ok(r#"{"code": "ok", "results": ["ACME", "GLOBEX"]}"#);

    let preview = client(&transport)
        .preview_expression("1234567890", "grel:value.toUppercase()", 0, &[0, 1])
        .await
        .unwrap();
    assert_eq!(
        preview.results().unwrap(),
        &[serde_json::json!("ACME"), serde_json::json!("GLOBEX")]
    );

    let (_, request) = transport.request(0);
    assert_eq!(request.form_value("rowIndices"), Some("[0,1]"));
    assert_eq!(request.form_value("cellIndex"), Some("0"));
    assert_eq!(request.form_value("csrf_token"), None);
}

// =============================================================================
// Envelope interpretation
// =============================================================================

#[tokio::test]
async fn test_server_refusal_is_a_successful_parse() {
    let transport = MockTransport::new();
    transport.push_token("tok");
    transport.push_ok(r#"{"code": "error", "message": "Failed to find project: 1234567890"}"#);

    let response = client(&transport).delete_project("1234567890").await.unwrap();
    match response {
        CommandResponse::Error { message } => {
            assert_eq!(message, "Failed to find project: 1234567890");
        }
        CommandResponse::Ok => panic!("expected the server's refusal to be preserved"),
    }
}

#[tokio::test]
async fn test_unknown_envelope_code_is_rejected() {
    let transport = MockTransport::new();
    transport.push_token("tok");
    transport.push_ok(r#"{"code": "pending"}"#);

    let err = client(&transport).delete_project("1").await.unwrap_err();
    match err {
        RefineError::UnexpectedCode { code } => assert_eq!(code, "pending"),
        other => panic!("expected UnexpectedCode, got {other:?}"),
    }
}

// =============================================================================
// Status discipline and transport failures
// =============================================================================

#[tokio::test]
async fn test_unexpected_status_skips_body_parsing() {
    let transport = MockTransport::new();
    // Deliberately not JSON: parsing it would fail differently.
    transport.push(RawResponse::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "<html>Internal Error</html>",
    ));

    let err = client(&transport).get_version().await.unwrap_err();
    match err {
        RefineError::StatusMismatch {
            endpoint,
            status,
            expected,
        } => {
            assert_eq!(endpoint, "/command/core/get-version");
            assert_eq!(status, 500);
            assert_eq!(expected, 200);
        }
        other => panic!("expected StatusMismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transport_failure_names_operation_and_cause() {
    let transport = MockTransport::new();
    transport.push_token("tok");
    transport.push_failure("connection refused");

    let err = client(&transport).delete_project("1234567890").await.unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("delete project 1234567890"), "{rendered}");
    assert!(rendered.contains("connection refused"), "{rendered}");
}

#[tokio::test]
async fn test_builder_validation_stops_before_the_mutating_request() {
    // At the command layer nothing is sent at all.
    let err = DeleteProjectCommand::builder()
        .token(refine_client::CsrfToken::new("tok"))
        .project("   ")
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        RefineError::Validation {
            parameter: "project",
            ..
        }
    ));

    // Through the convenience surface the token is fetched, but the invalid
    // delete request never goes out.
    let transport = MockTransport::new();
    transport.push_token("tok");
    let err = client(&transport).delete_project("").await.unwrap_err();
    assert!(matches!(err, RefineError::Validation { .. }));
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0.path(), "/command/core/get-csrf-token");
}

// =============================================================================
// Project creation (multipart + redirect)
// =============================================================================

#[tokio::test]
async fn test_create_project_reads_id_from_redirect() {
    let transport = MockTransport::new();
    transport.push_token("tok-create");
    transport.push(
        RawResponse::new(StatusCode::FOUND, Vec::new())
            .with_header("Location", "http://localhost:3333/project?project=1702021156382"),
    );

    let project = client(&transport)
        .create_project("clients", "clients.csv", b"name\nAcme\n".to_vec())
        .await
        .unwrap();
    assert_eq!(project, "1702021156382");

    let (url, request) = transport.request(1);
    assert_eq!(url.path(), "/command/core/create-project-from-upload");
    assert_eq!(
        request.query_pairs(),
        &[("csrf_token".to_string(), "tok-create".to_string())]
    );
    assert!(matches!(request.body(), RequestBody::Multipart(_)));
}

#[tokio::test]
async fn test_create_project_without_redirect_is_a_status_mismatch() {
    let transport = MockTransport::new();
    transport.push_token("tok");
    transport.push_ok(r#"{"code": "ok"}"#);

    let err = client(&transport)
        .create_project("clients", "clients.csv", b"x".to_vec())
        .await
        .unwrap_err();
    match err {
        RefineError::StatusMismatch {
            status, expected, ..
        } => {
            assert_eq!(status, 200);
            assert_eq!(expected, 302);
        }
        other => panic!("expected StatusMismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_project_builder_accepts_format_hint() {
    let command = CreateProjectCommand::builder()
        .token(refine_client::CsrfToken::new("tok"))
        .project_name("clients")
        .file("clients.tsv", b"a\tb\n".to_vec())
        .format("text/line-based/*sv")
        .build()
        .unwrap();
    let request = command.build();
    match request.body() {
        RequestBody::Multipart(fields) => {
            assert!(fields.iter().any(|field| field.name == "format"));
        }
        other => panic!("expected multipart body, got {other:?}"),
    }
}

// =============================================================================
// Exports
// =============================================================================

#[tokio::test]
async fn test_export_rdf_turtle_sets_accept_and_returns_body_verbatim() {
    let transport = MockTransport::new();
    transport.push_ok("dummy RDF data");

    let rdf = client(&transport)
        .export_rdf("1234567890", None, RdfFormat::Turtle)
        .await
        .unwrap();
    assert_eq!(rdf, "dummy RDF data");

    let (url, request) = transport.request(0);
    assert_eq!(url.path(), "/command/rdf-extension/export-rdf");
    assert_eq!(request.accept_header(), Some("text/turtle;charset=UTF-8"));
    assert_eq!(request.form_value("format"), Some("Turtle"));
    assert_eq!(request.form_value("mapping"), None);
    assert_eq!(request.form_value("csrf_token"), None);
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_export_rdf_normalizes_wrapped_mapping_before_sending() {
    let transport = MockTransport::new();
    transport.push_ok("<s> <p> <o> .");

    let wrapped = r#"{"overlayModels": {"rdfSchema": {"baseUri": "http://example.com/"}}}"#;
    client(&transport)
        .export_rdf("1", Some(wrapped), RdfFormat::Turtle)
        .await
        .unwrap();

    let (_, request) = transport.request(0);
    assert_eq!(
        request.form_value("mapping"),
        Some(r#"{"baseUri":"http://example.com/"}"#)
    );
}

#[tokio::test]
async fn test_export_rows_materializes_into_temp_file() {
    let body = "name,lei\nAcme,529900T8BM49AURSDO55\n";
    let transport = MockTransport::new();
    transport.push_token("tok-export");
    transport.push_ok(body);

    let file = client(&transport)
        .export_rows("1234567890", ExportFormat::Csv)
        .await
        .unwrap();
    let contents = std::fs::read_to_string(file.path()).unwrap();
    assert_eq!(contents, body);

    let (_, request) = transport.request(1);
    assert_eq!(request.form_value("csrf_token"), Some("tok-export"));
    assert_eq!(request.form_value("format"), Some("csv"));
    assert_eq!(request.accept_header(), None);
}

// =============================================================================
// Mapping-aware mutations
// =============================================================================

#[tokio::test]
async fn test_save_mapping_normalizes_any_shape_into_operations() {
    let transport = MockTransport::new();
    transport.push_token("tok");
    transport.push_ok(r#"{"code": "ok"}"#);

    let wrapped = r#"{"overlayModels": {"rdfSchema": {"baseUri": "http://example.com/"}}}"#;
    let response = client(&transport).save_mapping("1", wrapped).await.unwrap();
    assert!(response.is_ok());

    let (_, request) = transport.request(1);
    let operations = request.form_value("operations").unwrap();
    let document: serde_json::Value = serde_json::from_str(operations).unwrap();
    assert_eq!(document[0]["op"], "rdf-extension/save-rdf-schema");
    assert_eq!(document[0]["schema"]["baseUri"], "http://example.com/");
}

#[tokio::test]
async fn test_save_mapping_rejects_malformed_shape_before_any_request() {
    let transport = MockTransport::new();

    let err = client(&transport)
        .save_mapping("1", r#"{"overlayModels": 3}"#)
        .await
        .unwrap_err();
    assert!(matches!(err, RefineError::Mapping(_)));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_save_mapping_blank_document_is_stopped_by_the_builder() {
    // A blank document passes the normalizer unchanged, so rejection happens
    // at the builder: a token is fetched, the mutating request is not sent.
    let transport = MockTransport::new();
    transport.push_token("tok");

    let err = client(&transport).save_mapping("1", "   ").await.unwrap_err();
    assert!(matches!(
        err,
        RefineError::Validation {
            parameter: "operations",
            ..
        }
    ));
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0.path(), "/command/core/get-csrf-token");
}

#[tokio::test]
async fn test_apply_operations_sends_history_verbatim() {
    let history = r#"[{"op":"core/text-transform","columnName":"name","expression":"value.trim()"}]"#;
    let transport = MockTransport::new();
    transport.push_token("tok");
    transport.push_ok(r#"{"code": "ok"}"#);

    client(&transport).apply_operations("1", history).await.unwrap();

    let (_, request) = transport.request(1);
    assert_eq!(request.form_value("operations"), Some(history));
}

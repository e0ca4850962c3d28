use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use agency_console::{
    build_router,
    common::clock::ManualClock,
    config::{AppConfig, AppState},
    services::console_service::ConsoleService,
    store::{
        seed::{ADMIN_ID, MARKETING_ID, OPERATIONS_ID, SALES_DIEGO_ID, SALES_LAURA_ID, SUPPORT_ID},
        ConsoleStore,
    },
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Router sem banco e sem snapshot, com o relógio parado em 10/05/2024.
fn app_with(pairs: &[(&str, &str)]) -> Router {
    let vars: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let config = AppConfig::from_lookup(|key| {
        vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    })
    .unwrap();

    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap());
    let store = ConsoleStore::new(Arc::new(clock), config.store_options());
    let state = AppState {
        config: Arc::new(config),
        console: ConsoleService::new(store, None, None),
    };
    build_router(state)
}

fn app() -> Router {
    app_with(&[])
}

/// Envia a requisição via `oneshot` e devolve (status, JSON do corpo).
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(id) = user {
        req = req.header("x-user-id", id.to_string());
    }
    let req = match body {
        Some(body) => req
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn prospect_body(salesperson: Uuid) -> Value {
    json!({
        "name": "Ana López",
        "company": "Panadería Ana",
        "email": "ana@panaderia.mx",
        "phone": "+52 55 1234 5678",
        "estimatedValue": 25000,
        "probability": 40,
        "salespersonId": salesperson,
        "serviceOfInterest": "pagina_web"
    })
}

async fn create_prospect(app: &Router, user: Uuid) -> Value {
    let (status, prospect) = send(app, "POST", "/api/prospects", Some(user), Some(prospect_body(user))).await;
    assert_eq!(status, StatusCode::CREATED);
    prospect
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Sessão e permissões
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let req = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn missing_or_unknown_user_is_unauthorized() {
    let app = app();

    let (status, body) = send(&app, "GET", "/api/prospects", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, "GET", "/api/prospects", Some(Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn roles_without_permission_are_forbidden() {
    let app = app();

    let (status, _) = send(&app, "GET", "/api/prospects", Some(SUPPORT_ID), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/api/finance/transactions", Some(SALES_LAURA_ID), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // suporte cuida de tickets
    let (status, _) = send(&app, "GET", "/api/tickets", Some(SUPPORT_ID), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn me_returns_the_session_user() {
    let app = app();
    let (status, me) = send(&app, "GET", "/api/users/me", Some(SALES_LAURA_ID), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], json!(SALES_LAURA_ID));
    assert_eq!(me["role"], "vendedor");
}

// ---------------------------------------------------------------------------
// Funil
// ---------------------------------------------------------------------------

#[tokio::test]
async fn salesperson_only_sees_own_prospects() {
    let app = app();

    // Laura tenta criar em nome do Diego: fica com ela mesma
    let (status, created) = send(
        &app,
        "POST",
        "/api/prospects",
        Some(SALES_LAURA_ID),
        Some(prospect_body(SALES_DIEGO_ID)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["salespersonId"], json!(SALES_LAURA_ID));
    assert_eq!(created["stage"], "contacto");

    let (_, diego_list) = send(&app, "GET", "/api/prospects", Some(SALES_DIEGO_ID), None).await;
    assert_eq!(diego_list.as_array().unwrap().len(), 0);

    let (_, admin_list) = send(&app, "GET", "/api/prospects", Some(ADMIN_ID), None).await;
    assert_eq!(admin_list.as_array().unwrap().len(), 1);

    let uri = format!("/api/prospects/{}", id_of(&created));
    let (status, _) = send(&app, "GET", &uri, Some(SALES_DIEGO_ID), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invalid_prospect_reports_each_field() {
    let app = app();
    let mut body = prospect_body(SALES_LAURA_ID);
    body["name"] = json!("");
    body["email"] = json!("not-an-email");

    let (status, error) = send(&app, "POST", "/api/prospects", Some(SALES_LAURA_ID), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["details"]["name"].is_array());
    assert!(error["details"]["email"].is_array());
}

#[tokio::test]
async fn dragging_to_the_same_column_changes_nothing() {
    let app = app();
    let prospect = create_prospect(&app, SALES_LAURA_ID).await;
    let uri = format!("/api/prospects/{}/stage", id_of(&prospect));

    let (status, moved) = send(&app, "POST", &uri, Some(SALES_LAURA_ID), Some(json!({ "stage": "proceso" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["change"]["outcome"], "moved");
    assert_eq!(moved["change"]["from"], "contacto");
    assert_eq!(moved["prospect"]["stage"], "proceso");

    let (_, again) = send(&app, "POST", &uri, Some(SALES_LAURA_ID), Some(json!({ "stage": "proceso" }))).await;
    assert_eq!(again["change"]["outcome"], "unchanged");
    assert_eq!(again["prospect"]["lastUpdatedAt"], moved["prospect"]["lastUpdatedAt"]);
}

#[tokio::test]
async fn dropping_outside_the_board_changes_nothing() {
    let app = app();
    let prospect = create_prospect(&app, SALES_LAURA_ID).await;
    let uri = format!("/api/prospects/{}/stage", id_of(&prospect));

    let (status, body) = send(&app, "POST", &uri, Some(SALES_LAURA_ID), Some(json!({ "stage": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["change"]["outcome"], "unchanged");
    assert_eq!(body["prospect"]["stage"], "contacto");
    assert_eq!(body["prospect"]["lastUpdatedAt"], prospect["lastUpdatedAt"]);
}

#[tokio::test]
async fn board_has_four_columns_in_order() {
    let app = app();
    create_prospect(&app, SALES_LAURA_ID).await;

    let (status, board) = send(&app, "GET", "/api/prospects/board", Some(SALES_LAURA_ID), None).await;
    assert_eq!(status, StatusCode::OK);
    let stages: Vec<&str> = board
        .as_array()
        .unwrap()
        .iter()
        .map(|column| column["stage"].as_str().unwrap())
        .collect();
    assert_eq!(stages, vec!["contacto", "cotizacion", "proceso", "entregado"]);
}

#[tokio::test]
async fn follow_ups_are_appended() {
    let app = app();
    let prospect = create_prospect(&app, SALES_LAURA_ID).await;
    let uri = format!("/api/prospects/{}/follow-ups", id_of(&prospect));

    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(SALES_LAURA_ID),
        Some(json!({ "type": "llamada", "description": "Primeira ligação" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["followUp"]["userId"], json!(SALES_LAURA_ID));
    assert_eq!(body["prospect"]["followUps"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn converting_twice_returns_the_same_client() {
    let app = app();
    let prospect = create_prospect(&app, SALES_LAURA_ID).await;
    let uri = format!("/api/prospects/{}/convert", id_of(&prospect));

    let (status, first) = send(&app, "POST", &uri, Some(SALES_LAURA_ID), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["created"], true);
    assert_eq!(first["client"]["name"], "Ana López");
    assert_eq!(first["client"]["country"], "México");
    assert_eq!(first["prospect"]["clientId"], first["client"]["id"]);

    let (status, second) = send(&app, "POST", &uri, Some(SALES_LAURA_ID), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["created"], false);
    assert_eq!(second["client"]["id"], first["client"]["id"]);

    let (_, clients) = send(&app, "GET", "/api/clients", Some(SALES_LAURA_ID), None).await;
    assert_eq!(clients.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn reject_policy_refuses_a_second_conversion() {
    let app = app_with(&[("CONVERSION_POLICY", "reject")]);
    let prospect = create_prospect(&app, SALES_LAURA_ID).await;
    let uri = format!("/api/prospects/{}/convert", id_of(&prospect));

    let (status, _) = send(&app, "POST", &uri, Some(SALES_LAURA_ID), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, "POST", &uri, Some(SALES_LAURA_ID), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn repeat_policy_creates_a_client_per_call() {
    let app = app_with(&[("CONVERSION_POLICY", "repeat")]);
    let prospect = create_prospect(&app, SALES_LAURA_ID).await;
    let uri = format!("/api/prospects/{}/convert", id_of(&prospect));

    send(&app, "POST", &uri, Some(SALES_LAURA_ID), None).await;
    send(&app, "POST", &uri, Some(SALES_LAURA_ID), None).await;

    let (_, clients) = send(&app, "GET", "/api/clients", Some(ADMIN_ID), None).await;
    assert_eq!(clients.as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Cotizações e comissões
// ---------------------------------------------------------------------------

#[tokio::test]
async fn quotes_get_sequential_numbers_and_totals() {
    let app = app();
    let prospect = create_prospect(&app, SALES_LAURA_ID).await;
    let body = json!({
        "prospectId": prospect["id"],
        "items": [
            { "service": "pagina_web", "quantity": 1, "unitPrice": 10000 },
            { "service": "hosting", "quantity": 12, "unitPrice": 500 }
        ],
        "discountPercent": 10,
        "taxPercent": 16
    });

    let (status, first) = send(&app, "POST", "/api/quotes", Some(SALES_LAURA_ID), Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["number"], "COT-2024-001");
    assert_eq!(first["createdBy"], json!(SALES_LAURA_ID));
    // 16000 - 10% = 14400; + 16% = 16704
    assert_eq!(first["subtotal"].as_f64(), Some(16000.0));
    assert_eq!(first["total"].as_f64(), Some(16704.0));

    let (_, second) = send(&app, "POST", "/api/quotes", Some(SALES_LAURA_ID), Some(body)).await;
    assert_eq!(second["number"], "COT-2024-002");
}

#[tokio::test]
async fn quote_for_unknown_prospect_is_not_found() {
    let app = app();
    let body = json!({
        "prospectId": Uuid::new_v4(),
        "items": [{ "service": "seo", "quantity": 1, "unitPrice": 100 }]
    });
    let (status, _) = send(&app, "POST", "/api/quotes", Some(ADMIN_ID), Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn salesperson_only_quotes_own_prospects() {
    let app = app();
    let prospect = create_prospect(&app, SALES_LAURA_ID).await;
    let body = json!({
        "prospectId": prospect["id"],
        "items": [{ "service": "seo", "quantity": 1, "unitPrice": 3000 }]
    });

    let (status, _) = send(&app, "POST", "/api/quotes", Some(SALES_DIEGO_ID), Some(body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, quote) = send(&app, "POST", "/api/quotes", Some(SALES_LAURA_ID), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, diego_list) = send(&app, "GET", "/api/quotes", Some(SALES_DIEGO_ID), None).await;
    assert_eq!(diego_list.as_array().unwrap().len(), 0);
    let (_, laura_list) = send(&app, "GET", "/api/quotes", Some(SALES_LAURA_ID), None).await;
    assert_eq!(laura_list.as_array().unwrap().len(), 1);
    let (_, admin_list) = send(&app, "GET", "/api/quotes", Some(ADMIN_ID), None).await;
    assert_eq!(admin_list.as_array().unwrap().len(), 1);

    let uri = format!("/api/quotes/{}/state", id_of(&quote));
    let (status, _) = send(&app, "PATCH", &uri, Some(SALES_DIEGO_ID), Some(json!({ "state": "enviada" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "DELETE", &format!("/api/quotes/{}", id_of(&quote)), Some(SALES_DIEGO_ID), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn out_of_range_validity_is_rejected_and_listing_keeps_working() {
    let app = app();
    let prospect = create_prospect(&app, SALES_LAURA_ID).await;
    let body = json!({
        "prospectId": prospect["id"],
        "items": [{ "service": "seo", "quantity": 1, "unitPrice": 100 }],
        "validityDays": 4294967295u64
    });

    let (status, error) = send(&app, "POST", "/api/quotes", Some(SALES_LAURA_ID), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["details"].is_object());

    let (status, quotes) = send(&app, "GET", "/api/quotes", Some(SALES_LAURA_ID), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quotes.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn quote_amounts_that_overflow_are_a_bad_request() {
    let app = app();
    let prospect = create_prospect(&app, SALES_LAURA_ID).await;
    let body = json!({
        "prospectId": prospect["id"],
        "items": [{ "service": "seo", "quantity": 1000000000000000u64, "unitPrice": 1000000000000000u64 }]
    });

    let (status, error) = send(&app, "POST", "/api/quotes", Some(SALES_LAURA_ID), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"].is_string());

    // ainda atende depois da recusa
    let (status, _) = send(&app, "GET", "/api/quotes", Some(SALES_LAURA_ID), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn commissions_only_move_forward() {
    let app = app();
    let body = json!({
        "salespersonId": SALES_LAURA_ID,
        "projectId": Uuid::new_v4(),
        "clientId": Uuid::new_v4(),
        "saleAmount": 50000,
        "percentage": 12
    });
    let (status, commission) = send(&app, "POST", "/api/commissions", Some(ADMIN_ID), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(commission["amount"].as_f64(), Some(6000.0));
    assert_eq!(commission["state"], "pendiente");

    let uri = format!("/api/commissions/{}/state", id_of(&commission));
    let (status, paid) = send(&app, "PATCH", &uri, Some(ADMIN_ID), Some(json!({ "state": "pagada" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(paid["paidAt"].is_string());

    let (status, _) = send(&app, "PATCH", &uri, Some(ADMIN_ID), Some(json!({ "state": "aprobada" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, totals) = send(&app, "GET", "/api/commissions/totals", Some(ADMIN_ID), None).await;
    assert_eq!(totals["paid"].as_f64(), Some(6000.0));
    assert_eq!(totals["pending"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn project_responses_carry_checklist_completion() {
    let app = app();
    let prospect = create_prospect(&app, SALES_LAURA_ID).await;
    let convert = format!("/api/prospects/{}/convert", id_of(&prospect));
    let (_, conversion) = send(&app, "POST", &convert, Some(SALES_LAURA_ID), None).await;

    let body = json!({
        "name": "Sitio Panadería Ana",
        "clientId": conversion["client"]["id"],
        "service": "pagina_web",
        "developerIds": [OPERATIONS_ID],
        "budget": 25000,
        "startDate": "2024-05-10",
        "checklist": ["Diseño", "Desarrollo", "Publicación", "Capacitación"]
    });
    let (status, project) = send(&app, "POST", "/api/projects", Some(OPERATIONS_ID), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(project["checklistCompletion"], 0);

    let task = project["checklist"][0]["id"].as_str().unwrap();
    let uri = format!("/api/projects/{}/tasks/{}/toggle", id_of(&project), task);
    let (status, toggled) = send(&app, "POST", &uri, Some(OPERATIONS_ID), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["checklistCompletion"], 25);

    let (_, list) = send(&app, "GET", "/api/projects", Some(OPERATIONS_ID), None).await;
    assert_eq!(list[0]["checklistCompletion"], 25);
}

// ---------------------------------------------------------------------------
// Financeiro
// ---------------------------------------------------------------------------

#[tokio::test]
async fn huge_renewal_windows_are_clamped() {
    let app = app();
    for days in ["9223372036854775807", "1000000000", "-5"] {
        let uri = format!("/api/finance/renewals?days={days}");
        let (status, due) = send(&app, "GET", &uri, Some(ADMIN_ID), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(due.is_array());
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dashboard_reflects_the_pipeline() {
    let app = app();
    let prospect = create_prospect(&app, SALES_LAURA_ID).await;
    let uri = format!("/api/prospects/{}/stage", id_of(&prospect));
    send(&app, "POST", &uri, Some(SALES_LAURA_ID), Some(json!({ "stage": "entregado" }))).await;

    let (status, summary) = send(&app, "GET", "/api/dashboard/summary", Some(ADMIN_ID), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["conversionRate"].as_f64(), Some(100.0));
    assert_eq!(summary["openProspects"], 0);

    let (_, ranking) = send(&app, "GET", "/api/dashboard/leaderboard", Some(ADMIN_ID), None).await;
    let top = &ranking.as_array().unwrap()[0];
    assert_eq!(top["userId"], json!(SALES_LAURA_ID));
    assert_eq!(top["totalSales"].as_f64(), Some(25000.0));
    assert_eq!(top["closedDeals"], 1);
}

#[tokio::test]
async fn monthly_series_follows_accept_language() {
    let app = app();
    let req = Request::builder()
        .uri("/api/dashboard/monthly?months=3")
        .header("x-user-id", ADMIN_ID.to_string())
        .header("accept-language", "en-US,en;q=0.9")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let series: Value = serde_json::from_slice(&bytes).unwrap();
    let months: Vec<&str> = series
        .as_array()
        .unwrap()
        .iter()
        .map(|point| point["month"].as_str().unwrap())
        .collect();
    assert_eq!(months, vec!["Mar", "Apr", "May"]);

    // sem cabeçalho: espanhol
    let (_, series) = send(&app, "GET", "/api/dashboard/monthly?months=1", Some(ADMIN_ID), None).await;
    assert_eq!(series[0]["month"], "May");
    let (_, series) = send(&app, "GET", "/api/dashboard/monthly?months=4", Some(ADMIN_ID), None).await;
    assert_eq!(series[0]["month"], "Feb");
    assert_eq!(series[1]["month"], "Mar");
    assert_eq!(series[2]["month"], "Abr");
}

#[tokio::test]
async fn marketing_sees_campaign_totals_but_not_the_dashboard() {
    let app = app();
    let body = json!({
        "name": "Hot Sale",
        "platform": "facebook",
        "type": "conversiones",
        "state": "activa",
        "budget": 8000,
        "spent": 2500,
        "leads": 40,
        "conversions": 4,
        "startDate": "2024-05-01"
    });
    let (status, _) = send(&app, "POST", "/api/marketing/campaigns", Some(MARKETING_ID), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, totals) = send(&app, "GET", "/api/dashboard/campaigns?state=activa", Some(MARKETING_ID), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(totals["leads"], 40);
    assert_eq!(totals["spent"].as_f64(), Some(2500.0));

    let (_, paused) = send(&app, "GET", "/api/dashboard/campaigns?state=pausada", Some(MARKETING_ID), None).await;
    assert_eq!(paused["leads"], 0);

    let (status, _) = send(&app, "GET", "/api/dashboard/summary", Some(MARKETING_ID), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app();
    let (status, doc) = send(&app, "GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/prospects/{id}/convert"].is_object());
    assert!(doc["components"]["securitySchemes"]["x_user_id"].is_object());
}

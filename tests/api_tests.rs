mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{contract_body, expense_body, TestApp, ADMIN_EMAIL};

#[tokio::test]
async fn health_check_is_public() {
    let app = TestApp::new();
    let (status, _) = app.send(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn register_login_and_me() {
    let app = TestApp::new();
    app.register("Corretor@Imobras.com.br", "Maria Souza").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "corretor@imobras.com.br", "password": "senha123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = app.get("/api/users/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "corretor@imobras.com.br");
    assert_eq!(me["displayName"], "Maria Souza");
    assert_eq!(me["isAdmin"], false);
    assert!(me.get("passwordHash").is_none());
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = TestApp::new();
    app.register("corretor@imobras.com.br", "Maria Souza").await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "corretor@imobras.com.br", "password": "outra-senha" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = TestApp::new();
    app.register("corretor@imobras.com.br", "Maria Souza").await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "email": "corretor@imobras.com.br", "password": "senha123", "fullName": "Outra" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn guarded_routes_require_a_session() {
    let app = TestApp::new();

    let (status, _) = app.send(Method::GET, "/api/contracts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/contracts", "token-invalido").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_forbid_plain_users() {
    let app = TestApp::new();
    let token = app.register("corretor@imobras.com.br", "Maria Souza").await;

    let (status, _) = app.get("/api/admin/users", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn listed_admin_email_bootstraps_an_admin() {
    let app = TestApp::new();
    let admin = app.register(ADMIN_EMAIL, "Chefe").await;
    app.register("corretor@imobras.com.br", "Maria Souza").await;

    let (status, me) = app.get("/api/users/me", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["isAdmin"], true);

    let (status, users) = app.get("/api/admin/users", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = TestApp::new();
    let token = app.register("corretor@imobras.com.br", "Maria Souza").await;

    let (status, _) = app.send(Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get("/api/users/me", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn contract_lifecycle() {
    let app = TestApp::new();
    let token = app.register("corretor@imobras.com.br", "Maria Souza").await;

    let contract = app.create_contract(&token, "Apto 101 - Ed. Solar").await;
    let id = contract["id"].as_str().unwrap().to_string();
    assert_eq!(contract["property"]["dueDay"], 10);

    let (status, list) = app.get("/api/contracts", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let mut changed = contract_body("Apto 102 - Ed. Solar");
    changed["rentValue"] = json!(2800.0);
    let (status, updated) = app
        .send(Method::PUT, &format!("/api/contracts/{id}"), Some(&token), Some(changed))
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["name"], "Apto 102 - Ed. Solar");

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/contracts/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/contracts/{id}"), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_contract_reports_field_details() {
    let app = TestApp::new();
    let token = app.register("corretor@imobras.com.br", "Maria Souza").await;

    let mut body = contract_body("Apto 101");
    body["period"] = json!({ "startDate": "2026-01-01", "endDate": "2025-01-01" });
    let (status, error) = app.post("/api/contracts", &token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["details"].is_object());
}

#[tokio::test]
async fn revenue_keeps_a_label_after_its_contract_is_removed() {
    let app = TestApp::new();
    let token = app.register("corretor@imobras.com.br", "Maria Souza").await;
    let contract = app.create_contract(&token, "Apto 101 - Ed. Solar").await;
    let contract_id = contract["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            "/api/revenues",
            &token,
            json!({ "contractId": contract_id, "type": "location", "value": 2500.0, "month": 3, "year": 2025 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = app.get("/api/revenues", &token).await;
    assert_eq!(list[0]["contractLabel"], "Apto 101 - Ed. Solar");

    app.send(Method::DELETE, &format!("/api/contracts/{contract_id}"), Some(&token), None)
        .await;

    let (status, list) = app.get("/api/revenues?month=3&year=2025", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["contractLabel"], "Contrato removido");
    assert!(list[0]["contractName"].is_null());
}

#[tokio::test]
async fn revenue_for_unknown_contract_is_rejected() {
    let app = TestApp::new();
    let token = app.register("corretor@imobras.com.br", "Maria Souza").await;

    let (status, _) = app
        .post(
            "/api/revenues",
            &token,
            json!({
                "contractId": "550e8400-e29b-41d4-a716-446655440000",
                "type": "admin",
                "value": 100.0,
                "month": 3,
                "year": 2025
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn expense_toggle_flips_status() {
    let app = TestApp::new();
    let token = app.register("corretor@imobras.com.br", "Maria Souza").await;

    let (status, expense) = app
        .post("/api/expenses", &token, expense_body("Conta de luz", 400.0, "2025-03-15"))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{expense}");
    assert_eq!(expense["status"], "pending");
    assert_eq!(expense["month"], 3);
    let id = expense["id"].as_str().unwrap().to_string();

    let (status, toggled) = app
        .send(Method::POST, &format!("/api/expenses/{id}/toggle-status"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["status"], "paid");
}

#[tokio::test]
async fn monthly_summary_nets_revenue_against_expenses() {
    let app = TestApp::new();
    let token = app.register("corretor@imobras.com.br", "Maria Souza").await;
    let contract = app.create_contract(&token, "Apto 101 - Ed. Solar").await;

    app.post(
        "/api/revenues",
        &token,
        json!({ "contractId": contract["id"], "type": "location", "value": 1250.50, "month": 3, "year": 2025 }),
    )
    .await;
    app.post("/api/expenses", &token, expense_body("Condomínio", 400.0, "2025-03-15"))
        .await;
    // Fora do período
    app.post("/api/expenses", &token, expense_body("IPTU", 90.0, "2025-04-10"))
        .await;

    let (status, summary) = app.get("/api/dashboard/summary?month=3&year=2025", &token).await;
    assert_eq!(status, StatusCode::OK, "{summary}");
    assert_eq!(summary["contractCount"], 1);
    assert_eq!(summary["totalRevenue"].as_f64(), Some(1250.5));
    assert_eq!(summary["totalExpense"].as_f64(), Some(400.0));
    assert_eq!(summary["pendingExpense"].as_f64(), Some(400.0));
    assert_eq!(summary["netProfit"].as_f64(), Some(850.5));

    let (status, yearly) = app.get("/api/dashboard/yearly?year=2025", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(yearly["months"].as_array().unwrap().len(), 12);
    assert_eq!(yearly["totalExpense"].as_f64(), Some(490.0));
}

#[tokio::test]
async fn summary_rejects_an_invalid_month() {
    let app = TestApp::new();
    let token = app.register("corretor@imobras.com.br", "Maria Souza").await;

    let (status, _) = app.get("/api/dashboard/summary?month=13&year=2025", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_sees_every_contract_users_see_their_own() {
    let app = TestApp::new();
    let admin = app.register(ADMIN_EMAIL, "Chefe").await;
    let user = app.register("corretor@imobras.com.br", "Maria Souza").await;

    app.create_contract(&admin, "Sala comercial").await;
    let owned = app.create_contract(&user, "Apto 101").await;

    let (_, admin_list) = app.get("/api/contracts", &admin).await;
    assert_eq!(admin_list.as_array().unwrap().len(), 2);

    let (_, user_list) = app.get("/api/contracts", &user).await;
    let user_list = user_list.as_array().unwrap();
    assert_eq!(user_list.len(), 1);
    assert_eq!(user_list[0]["id"], owned["id"]);
}

#[tokio::test]
async fn admin_toggles_roles_but_cannot_delete_itself() {
    let app = TestApp::new();
    let admin = app.register(ADMIN_EMAIL, "Chefe").await;
    let user = app.register("corretor@imobras.com.br", "Maria Souza").await;

    let (_, me) = app.get("/api/users/me", &user).await;
    let user_id = me["id"].as_str().unwrap().to_string();
    let (_, admin_me) = app.get("/api/users/me", &admin).await;
    let admin_id = admin_me["id"].as_str().unwrap().to_string();

    let (status, change) = app
        .send(Method::POST, &format!("/api/admin/users/{user_id}/toggle-admin"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(change["isAdmin"], true);

    // Promovido: agora acessa o painel
    let (status, _) = app.get("/api/admin/users", &user).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/admin/users/{admin_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/admin/users/{user_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Sessões da conta removida não valem mais
    let (status, _) = app.get("/api/users/me", &user).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invited_user_can_sign_in() {
    let app = TestApp::new();
    let admin = app.register(ADMIN_EMAIL, "Chefe").await;

    let (status, invited) = app
        .post(
            "/api/admin/users",
            &admin,
            json!({ "email": "novo@imobras.com.br", "password": "senha123", "fullName": "João Lima" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{invited}");
    assert_eq!(invited["isAdmin"], false);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "novo@imobras.com.br", "password": "senha123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn money_outside_the_stored_range_is_rejected() {
    let app = TestApp::new();
    let token = app.register("corretor@imobras.com.br", "Maria Souza").await;

    let (status, error) = app
        .post("/api/expenses", &token, expense_body("Conta gigante", 5e28, "2025-03-15"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["details"]["value"].is_array(), "{error}");

    let (status, _) = app
        .post("/api/expenses", &token, expense_body("Centavo quebrado", 10.005, "2025-03-15"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut contract = contract_body("Apto 101");
    contract["rentValue"] = json!(1e13);
    let (status, _) = app.post("/api/contracts", &token, contract).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nada foi gravado, o painel continua respondendo
    let (status, summary) = app.get("/api/dashboard/summary?month=3&year=2025", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totalExpense"].as_f64(), Some(0.0));
}

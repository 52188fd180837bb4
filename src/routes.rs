// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::auth::{auth_guard, seller_guard},
};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Dados da empresa logada
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/settings", put(handlers::auth::update_settings))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let quote_routes = Router::new()
        .route(
            "/",
            post(handlers::quotes::create_quote).get(handlers::quotes::list_quotes),
        )
        .route(
            "/{id}",
            get(handlers::quotes::get_quote)
                .put(handlers::quotes::update_quote)
                .delete(handlers::quotes::delete_quote),
        )
        .route("/{id}/status", patch(handlers::quotes::change_status))
        .route("/{id}/pdf", get(handlers::quotes::quote_pdf))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let finance_routes = Router::new()
        .route(
            "/categories",
            post(handlers::finance::create_category).get(handlers::finance::list_categories),
        )
        .route(
            "/categories/{id}",
            put(handlers::finance::update_category).delete(handlers::finance::delete_category),
        )
        .route(
            "/payables",
            post(handlers::finance::create_payable).get(handlers::finance::list_payables),
        )
        .route("/payables/{id}/pay", post(handlers::finance::pay_payable))
        .route(
            "/transactions",
            post(handlers::finance::create_transaction).get(handlers::finance::list_transactions),
        )
        .route("/summary/{competence}", get(handlers::finance::monthly_summary))
        .route("/migrations/categories", post(handlers::finance::migrate_categories))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let employee_routes = Router::new()
        .route(
            "/",
            post(handlers::sellers::create_employee).get(handlers::sellers::list_employees),
        )
        .route("/{id}/commission-rate", patch(handlers::sellers::update_commission_rate))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Portal do vendedor: login público, o resto com token de vendedor
    let seller_routes = Router::new()
        .route(
            "/quotes",
            get(handlers::sellers::my_quotes).post(handlers::sellers::create_my_quote),
        )
        .route("/commissions", get(handlers::sellers::my_commissions))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), seller_guard))
        .route("/login", post(handlers::auth::seller_login));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/quotes", quote_routes)
        .nest("/api/finance", finance_routes)
        .nest("/api/employees", employee_routes)
        .nest("/api/seller", seller_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Settings, db::Repositories};
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_settings() -> Settings {
        Settings {
            database_url: String::new(),
            jwt_secret: "segredo-de-teste".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            db_max_connections: 1,
            fonts_dir: "./fonts".to_string(),
            bcrypt_cost: 4,
        }
    }

    fn app() -> Router {
        build_router(AppState::new(&test_settings(), Repositories::in_memory()))
    }

    async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn register(app: &Router) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": "Reformas Silva", "email": "silva@exemplo.com", "password": "123456" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_routes_need_a_token() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/api/quotes", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_approval_flow_over_http() {
        let app = app();
        let token = register(&app).await;

        let (status, seller) = send(
            &app,
            Method::POST,
            "/api/employees",
            Some(&token),
            Some(json!({
                "name": "João",
                "category": "Vendedor",
                "commissionRate": 5,
                "login": "joao",
                "password": "senha123"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(seller.get("passwordHash").is_none());

        let (status, quote) = send(
            &app,
            Method::POST,
            "/api/quotes",
            Some(&token),
            Some(json!({
                "clientName": "Maria Souza",
                "sellerId": seller["id"],
                "practicedPrice": 14000,
                "servicesTotal": 10000,
                "materialsTotal": 4000
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(quote["status"], "PENDING");

        let status_uri = format!("/api/quotes/{}/status", quote["id"].as_str().unwrap());
        let (status, change) = send(
            &app,
            Method::PATCH,
            &status_uri,
            Some(&token),
            Some(json!({ "status": "APPROVED" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(change["commission"]["amount"].as_f64(), Some(500.0));
        assert_eq!(change["commission"]["category"], "Comissão");

        // Reaprovar é idempotente
        let (status, again) = send(
            &app,
            Method::PATCH,
            &status_uri,
            Some(&token),
            Some(json!({ "status": "APPROVED" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(again["commission"].is_null());

        // Recusar depois de aprovado é conflito
        let (status, _) = send(
            &app,
            Method::PATCH,
            &status_uri,
            Some(&token),
            Some(json!({ "status": "REJECTED" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, payables) = send(&app, Method::GET, "/api/finance/payables?category=Comiss%C3%A3o", Some(&token), None).await;
        assert_eq!(payables.as_array().unwrap().len(), 1);

        // O vendedor enxerga a própria comissão
        let (status, login) = send(
            &app,
            Method::POST,
            "/api/seller/login",
            None,
            Some(json!({ "login": "joao", "password": "senha123" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let seller_token = login["token"].as_str().unwrap();

        let (status, commissions) = send(&app, Method::GET, "/api/seller/commissions", Some(seller_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(commissions.as_array().unwrap().len(), 1);

        // Token de vendedor não abre o painel da empresa
        let (status, _) = send(&app, Method::GET, "/api/quotes", Some(seller_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_breakdown_mismatch_is_a_bad_request() {
        let app = app();
        let token = register(&app).await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/quotes",
            Some(&token),
            Some(json!({
                "clientName": "Maria Souza",
                "practicedPrice": 14000,
                "servicesTotal": 10000,
                "materialsTotal": 3000
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Composição inválida"));
    }

    #[tokio::test]
    async fn test_errors_follow_accept_language() {
        let app = app();
        let request = Request::builder()
            .uri("/api/quotes")
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Missing or invalid authentication token.");
    }

    #[tokio::test]
    async fn test_transactions_and_migration_endpoint() {
        let app = app();
        let token = register(&app).await;

        let (status, transaction) = send(
            &app,
            Method::POST,
            "/api/finance/transactions",
            Some(&token),
            Some(json!({
                "description": "Subempreitada de pintura",
                "amount": 3200,
                "kind": "EXPENSE",
                "date": "2024-03-15",
                "categoryName": "Subempreitada"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(transaction["competence"], "2024-03");
        assert_eq!(transaction["accountGroup"], "DIRETA_OBRA");

        let (status, report) = send(&app, Method::POST, "/api/finance/migrations/categories", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report, json!({ "migrated": 0, "skipped": 0, "errors": 0 }));

        let (status, summary) = send(&app, Method::GET, "/api/finance/summary/2024-03", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["directCosts"].as_f64(), Some(3200.0));
    }
}

// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedCompany, i18n::Locale},
    models::auth::{AuthResponse, Company, LoginCompanyPayload, RegisterCompanyPayload, UpdateCompanySettings},
};

// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterCompanyPayload,
    responses(
        (status = 201, description = "Empresa cadastrada", body = AuthResponse),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RegisterCompanyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let token = app_state
        .auth_service
        .register_company(payload.name.trim(), &payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token })))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginCompanyPayload,
    responses(
        (status = 200, description = "Login realizado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginCompanyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let token = app_state
        .auth_service
        .login_company(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(AuthResponse { token }))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerLoginPayload {
    #[validate(length(min = 1, message = "O login é obrigatório."))]
    #[schema(example = "joao.vendas")]
    pub login: String,

    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub password: String,
}

// POST /api/seller/login
#[utoipa::path(
    post,
    path = "/api/seller/login",
    tag = "Seller Portal",
    request_body = SellerLoginPayload,
    responses(
        (status = 200, description = "Login do vendedor realizado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn seller_login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<SellerLoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let token = app_state
        .auth_service
        .login_seller(payload.login.trim(), &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(AuthResponse { token }))
}

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Dados da empresa logada", body = Company)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedCompany(company): AuthenticatedCompany) -> Json<Company> {
    Json(company)
}

// PUT /api/users/me/settings
#[utoipa::path(
    put,
    path = "/api/users/me/settings",
    tag = "Users",
    request_body = UpdateCompanySettings,
    responses(
        (status = 200, description = "Dados da empresa atualizados", body = Company)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Json(payload): Json<UpdateCompanySettings>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = app_state
        .auth_service
        .update_company_settings(company.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(updated)))
}

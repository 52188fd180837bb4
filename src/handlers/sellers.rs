// src/handlers/sellers.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        validation::validate_percentage,
    },
    config::AppState,
    handlers::quotes::QuotePayload,
    middleware::{
        auth::{AuthenticatedCompany, AuthenticatedSeller},
        i18n::Locale,
    },
    models::{
        finance::Payable,
        quotes::{Quote, QuoteStatus},
        sellers::Employee,
    },
};

// =============================================================================
//  1. FUNCIONÁRIOS (painel da empresa)
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "João Pereira")]
    pub name: String,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    #[schema(example = "Vendedor")]
    pub category: String,

    #[serde(default)]
    #[validate(custom(function = "validate_percentage"))]
    #[schema(example = "5.00")]
    pub commission_rate: Decimal,

    #[schema(example = "joao.vendas")]
    pub login: Option<String>,

    pub password: Option<String>,
}

impl CreateEmployeePayload {
    // Login sem senha (ou o contrário) não serve para entrar no portal
    fn validate_credentials(&self) -> Result<(), AppError> {
        let login = self.login.as_deref().map(str::trim).filter(|l| !l.is_empty());
        let password = self.password.as_deref().filter(|p| !p.is_empty());

        let message = match (login, password) {
            (Some(_), None) => "Informe a senha do portal.",
            (None, Some(_)) => "Informe o login do portal.",
            (_, Some(p)) if p.len() < 6 => "A senha deve ter no mínimo 6 caracteres.",
            _ => return Ok(()),
        };

        let mut errors = validator::ValidationErrors::new();
        let mut err = validator::ValidationError::new("credentials");
        err.message = Some(message.into());
        errors.add("password", err);
        Err(AppError::ValidationError(errors))
    }
}

// POST /api/employees
#[utoipa::path(
    post,
    path = "/api/employees",
    tag = "Employees",
    request_body = CreateEmployeePayload,
    responses(
        (status = 201, description = "Funcionário cadastrado", body = Employee),
        (status = 409, description = "Login já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_employee(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Json(payload): Json<CreateEmployeePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;
    payload
        .validate_credentials()
        .map_err(|e| e.to_api_error(&locale))?;

    let employee = app_state
        .seller_service
        .create_employee(
            company.id,
            &payload.name,
            &payload.category,
            payload.commission_rate,
            payload.login.as_deref().filter(|l| !l.trim().is_empty()),
            payload.password.as_deref().filter(|p| !p.is_empty()),
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(employee)))
}

// GET /api/employees
#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "Employees",
    responses(
        (status = 200, description = "Funcionários da empresa", body = Vec<Employee>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_employees(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
) -> Result<impl IntoResponse, ApiError> {
    let employees = app_state
        .seller_service
        .list_employees(company.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(employees))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommissionRatePayload {
    #[validate(custom(function = "validate_percentage"))]
    #[schema(example = "7.50")]
    pub commission_rate: Decimal,
}

// PATCH /api/employees/{id}/commission-rate
#[utoipa::path(
    patch,
    path = "/api/employees/{id}/commission-rate",
    tag = "Employees",
    request_body = UpdateCommissionRatePayload,
    params(("id" = Uuid, Path, description = "ID do Funcionário")),
    responses(
        (status = 200, description = "Percentual atualizado", body = Employee)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_commission_rate(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCommissionRatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let employee = app_state
        .seller_service
        .update_commission_rate(company.id, id, payload.commission_rate)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(employee))
}

// =============================================================================
//  2. PORTAL DO VENDEDOR
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SellerQuotesQuery {
    pub status: Option<QuoteStatus>,
}

// GET /api/seller/quotes
#[utoipa::path(
    get,
    path = "/api/seller/quotes",
    tag = "Seller Portal",
    params(SellerQuotesQuery),
    responses(
        (status = 200, description = "Orçamentos do vendedor logado", body = Vec<Quote>)
    ),
    security(("api_jwt" = []))
)]
pub async fn my_quotes(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedSeller(seller): AuthenticatedSeller,
    Query(query): Query<SellerQuotesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let quotes = app_state
        .seller_service
        .seller_quotes(&seller, query.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(quotes))
}

// POST /api/seller/quotes
#[utoipa::path(
    post,
    path = "/api/seller/quotes",
    tag = "Seller Portal",
    request_body = QuotePayload,
    responses(
        (status = 201, description = "Orçamento criado em nome do vendedor", body = Quote)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_my_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedSeller(seller): AuthenticatedSeller,
    Json(mut payload): Json<QuotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    // O vendedor só cria orçamentos em seu próprio nome
    payload.seller_id = Some(seller.id);

    let input = payload
        .into_new_quote(seller.company_id)
        .map_err(|e| e.to_api_error(&locale))?;

    let quote = app_state
        .quote_service
        .create_quote(input)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(quote)))
}

// GET /api/seller/commissions
#[utoipa::path(
    get,
    path = "/api/seller/commissions",
    tag = "Seller Portal",
    responses(
        (status = 200, description = "Comissões do vendedor logado", body = Vec<Payable>)
    ),
    security(("api_jwt" = []))
)]
pub async fn my_commissions(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedSeller(seller): AuthenticatedSeller,
) -> Result<impl IntoResponse, ApiError> {
    let commissions = app_state
        .seller_service
        .seller_commissions(&seller)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(commissions))
}

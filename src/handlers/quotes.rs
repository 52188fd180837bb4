// src/handlers/quotes.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        validation::validate_not_negative,
    },
    config::AppState,
    middleware::{auth::AuthenticatedCompany, i18n::Locale},
    models::quotes::{
        NewQuote, Quote, QuoteBreakdown, QuoteChanges, QuoteFilter, QuoteItem, QuoteStatus, StatusChange,
    },
};

const DEFAULT_VALIDITY_DAYS: i32 = 15;

fn default_validity_days() -> i32 {
    DEFAULT_VALIDITY_DAYS
}

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotePayload {
    #[validate(length(min = 1, message = "O nome do cliente é obrigatório."))]
    #[schema(example = "Maria Souza")]
    pub client_name: String,

    #[schema(example = "(11) 98888-7777")]
    pub client_contact: Option<String>,

    pub seller_id: Option<Uuid>,

    #[schema(example = "Reforma do banheiro social")]
    pub description: Option<String>,

    #[serde(default)]
    pub items: Vec<QuoteItem>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "14000.00")]
    pub practiced_price: Decimal,

    // Composição opcional: os dois subtotais juntos ou nenhum
    #[schema(example = "10000.00")]
    pub services_total: Option<Decimal>,
    #[schema(example = "4000.00")]
    pub materials_total: Option<Decimal>,

    #[serde(default = "default_validity_days")]
    #[validate(range(min = 1, max = 365, message = "A validade deve estar entre 1 e 365 dias."))]
    #[schema(example = 15)]
    pub validity_days: i32,
}

impl QuotePayload {
    fn breakdown(&self) -> Result<Option<QuoteBreakdown>, AppError> {
        match (self.services_total, self.materials_total) {
            (Some(services_total), Some(materials_total)) => Ok(Some(QuoteBreakdown {
                services_total,
                materials_total,
            })),
            (None, None) => Ok(None),
            _ => Err(AppError::InvalidBreakdown(
                "informe servicesTotal e materialsTotal juntos".to_string(),
            )),
        }
    }

    pub fn into_new_quote(self, company_id: Uuid) -> Result<NewQuote, AppError> {
        self.validate()?;
        let breakdown = self.breakdown()?;
        Ok(NewQuote {
            company_id,
            seller_id: self.seller_id,
            client_name: self.client_name.trim().to_string(),
            client_contact: self.client_contact,
            description: self.description,
            items: self.items,
            practiced_price: self.practiced_price,
            breakdown,
            validity_days: self.validity_days,
        })
    }

    fn into_changes(self) -> Result<QuoteChanges, AppError> {
        self.validate()?;
        let breakdown = self.breakdown()?;
        Ok(QuoteChanges {
            seller_id: self.seller_id,
            client_name: self.client_name.trim().to_string(),
            client_contact: self.client_contact,
            description: self.description,
            items: self.items,
            practiced_price: self.practiced_price,
            breakdown,
            validity_days: self.validity_days,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusPayload {
    #[schema(example = "APPROVED")]
    pub status: QuoteStatus,
}

// =============================================================================
//  HANDLERS
// =============================================================================

// POST /api/quotes
#[utoipa::path(
    post,
    path = "/api/quotes",
    tag = "Quotes",
    request_body = QuotePayload,
    responses(
        (status = 201, description = "Orçamento criado", body = Quote),
        (status = 400, description = "Dados ou composição inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Json(payload): Json<QuotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let input = payload
        .into_new_quote(company.id)
        .map_err(|e| e.to_api_error(&locale))?;

    let quote = app_state
        .quote_service
        .create_quote(input)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(quote)))
}

// GET /api/quotes
#[utoipa::path(
    get,
    path = "/api/quotes",
    tag = "Quotes",
    params(QuoteFilter),
    responses(
        (status = 200, description = "Orçamentos da empresa", body = Vec<Quote>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_quotes(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Query(filter): Query<QuoteFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let quotes = app_state
        .quote_service
        .list_quotes(company.id, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(quotes))
}

// GET /api/quotes/{id}
#[utoipa::path(
    get,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "ID do Orçamento")),
    responses(
        (status = 200, description = "Orçamento", body = Quote),
        (status = 404, description = "Orçamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let quote = app_state
        .quote_service
        .get_quote(company.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(quote))
}

// PUT /api/quotes/{id}
#[utoipa::path(
    put,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    request_body = QuotePayload,
    params(("id" = Uuid, Path, description = "ID do Orçamento")),
    responses(
        (status = 200, description = "Orçamento atualizado", body = Quote),
        (status = 409, description = "Orçamento já aprovado ou recusado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let changes = payload.into_changes().map_err(|e| e.to_api_error(&locale))?;

    let quote = app_state
        .quote_service
        .update_quote(company.id, id, changes)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(quote))
}

// DELETE /api/quotes/{id}
#[utoipa::path(
    delete,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "ID do Orçamento")),
    responses(
        (status = 204, description = "Orçamento removido"),
        (status = 409, description = "Orçamento já aprovado ou recusado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .quote_service
        .delete_quote(company.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// PATCH /api/quotes/{id}/status
#[utoipa::path(
    patch,
    path = "/api/quotes/{id}/status",
    tag = "Quotes",
    request_body = ChangeStatusPayload,
    params(("id" = Uuid, Path, description = "ID do Orçamento")),
    responses(
        (status = 200, description = "Status aplicado (com a comissão gerada, se houver)", body = StatusChange),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let change = app_state
        .quote_service
        .change_status(company.id, id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(change))
}

// GET /api/quotes/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/quotes/{id}/pdf",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "ID do Orçamento")),
    responses(
        (status = 200, description = "PDF do orçamento", content_type = "application/pdf")
    ),
    security(("api_jwt" = []))
)]
pub async fn quote_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let pdf_bytes = app_state
        .document_service
        .generate_quote_pdf(company.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"orcamento_{}.pdf\"", id)),
    ];

    Ok((headers, pdf_bytes).into_response())
}

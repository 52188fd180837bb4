// src/handlers/finance.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        validation::validate_not_negative,
    },
    config::AppState,
    middleware::{auth::AuthenticatedCompany, i18n::Locale},
    models::finance::{
        AccountGroup, ExpenseCategory, MigrationReport, MonthlySummary, Payable, PayableFilter, Transaction,
        TransactionKind,
    },
    services::finance_service::CategoryRef,
};

// =============================================================================
//  1. PLANO DE CONTAS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, message = "O nome da categoria é obrigatório."))]
    #[schema(example = "Material de construção")]
    pub name: String,

    // Sem grupo, a categoria é classificada pelo nome
    pub account_group: Option<AccountGroup>,

    pub excluded_from_markup: Option<bool>,
}

// POST /api/finance/categories
#[utoipa::path(
    post,
    path = "/api/finance/categories",
    tag = "Finance",
    request_body = CreateCategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = ExpenseCategory),
        (status = 409, description = "Categoria já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let category = app_state
        .finance_service
        .create_category(company.id, &payload.name, payload.account_group, payload.excluded_from_markup)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(category)))
}

// GET /api/finance/categories
#[utoipa::path(
    get,
    path = "/api/finance/categories",
    tag = "Finance",
    responses(
        (status = 200, description = "Plano de Contas da empresa", body = Vec<ExpenseCategory>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
) -> Result<impl IntoResponse, ApiError> {
    let categories = app_state
        .finance_service
        .list_categories(company.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(categories))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryPayload {
    pub account_group: AccountGroup,
    pub excluded_from_markup: Option<bool>,
}

// PUT /api/finance/categories/{id}
#[utoipa::path(
    put,
    path = "/api/finance/categories/{id}",
    tag = "Finance",
    request_body = UpdateCategoryPayload,
    params(("id" = Uuid, Path, description = "ID da Categoria")),
    responses(
        (status = 200, description = "Categoria atualizada", body = ExpenseCategory)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let category = app_state
        .finance_service
        .update_category(company.id, id, payload.account_group, payload.excluded_from_markup)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(category))
}

// DELETE /api/finance/categories/{id}
#[utoipa::path(
    delete,
    path = "/api/finance/categories/{id}",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID da Categoria")),
    responses(
        (status = 204, description = "Categoria removida")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .finance_service
        .delete_category(company.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  2. CONTAS A PAGAR
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayablePayload {
    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    #[schema(example = "Aluguel")]
    pub category: String,

    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    #[schema(example = "Aluguel do galpão - março")]
    pub description: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "2000.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2024-03-10")]
    pub due_date: NaiveDate,
}

// GET /api/finance/payables
#[utoipa::path(
    get,
    path = "/api/finance/payables",
    tag = "Finance",
    params(PayableFilter),
    responses(
        (status = 200, description = "Contas a pagar", body = Vec<Payable>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_payables(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Query(filter): Query<PayableFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let payables = app_state
        .finance_service
        .list_payables(company.id, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(payables))
}

// POST /api/finance/payables
#[utoipa::path(
    post,
    path = "/api/finance/payables",
    tag = "Finance",
    request_body = CreatePayablePayload,
    responses(
        (status = 201, description = "Conta a pagar criada", body = Payable)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_payable(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Json(payload): Json<CreatePayablePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let payable = app_state
        .finance_service
        .create_payable(company.id, &payload.category, &payload.description, payload.amount, payload.due_date)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(payable)))
}

// POST /api/finance/payables/{id}/pay
#[utoipa::path(
    post,
    path = "/api/finance/payables/{id}/pay",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID da Conta a Pagar")),
    responses(
        (status = 200, description = "Conta quitada", body = Payable)
    ),
    security(("api_jwt" = []))
)]
pub async fn pay_payable(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let payable = app_state
        .finance_service
        .mark_payable_paid(company.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(payable))
}

// =============================================================================
//  3. LANÇAMENTOS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionPayload {
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    #[schema(example = "Compra de cimento")]
    pub description: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "850.00")]
    pub amount: Decimal,

    pub kind: TransactionKind,

    #[validate(length(min = 7, message = "A data deve estar no formato AAAA-MM-DD."))]
    #[schema(example = "2024-03-15")]
    pub date: String,

    // Informe a categoria pelo ID ou pelo nome
    pub category_id: Option<Uuid>,
    #[schema(example = "Material")]
    pub category_name: Option<String>,
}

impl CreateTransactionPayload {
    fn category_ref(&self) -> Result<CategoryRef, AppError> {
        match (self.category_id, self.category_name.as_deref().map(str::trim)) {
            (Some(id), _) => Ok(CategoryRef::Id(id)),
            (None, Some(name)) if !name.is_empty() => Ok(CategoryRef::Name(name.to_string())),
            _ => {
                let mut errors = validator::ValidationErrors::new();
                let mut err = validator::ValidationError::new("required");
                err.message = Some("Informe categoryId ou categoryName.".into());
                errors.add("categoryId", err);
                Err(AppError::ValidationError(errors))
            }
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CompetenceQuery {
    /// Mês de competência (AAAA-MM)
    pub competence: Option<String>,
}

// POST /api/finance/transactions
#[utoipa::path(
    post,
    path = "/api/finance/transactions",
    tag = "Finance",
    request_body = CreateTransactionPayload,
    responses(
        (status = 201, description = "Lançamento criado e vinculado ao Plano de Contas", body = Transaction)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_transaction(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Json(payload): Json<CreateTransactionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;
    let category = payload.category_ref().map_err(|e| e.to_api_error(&locale))?;

    let transaction = app_state
        .finance_service
        .create_transaction(
            company.id,
            &payload.description,
            payload.amount,
            payload.kind,
            &payload.date,
            category,
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

// GET /api/finance/transactions
#[utoipa::path(
    get,
    path = "/api/finance/transactions",
    tag = "Finance",
    params(CompetenceQuery),
    responses(
        (status = 200, description = "Lançamentos da empresa", body = Vec<Transaction>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_transactions(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Query(query): Query<CompetenceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let transactions = app_state
        .finance_service
        .list_transactions(company.id, query.competence.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(transactions))
}

// GET /api/finance/summary/{competence}
#[utoipa::path(
    get,
    path = "/api/finance/summary/{competence}",
    tag = "Finance",
    params(("competence" = String, Path, description = "Mês de competência (AAAA-MM)")),
    responses(
        (status = 200, description = "Resumo do mês (lucro líquido)", body = MonthlySummary),
        (status = 400, description = "Competência inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn monthly_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
    Path(competence): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .finance_service
        .monthly_summary(company.id, &competence)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(summary))
}

// =============================================================================
//  4. MIGRAÇÃO DE CATEGORIAS
// =============================================================================

// POST /api/finance/migrations/categories
#[utoipa::path(
    post,
    path = "/api/finance/migrations/categories",
    tag = "Finance",
    responses(
        (status = 200, description = "Lançamentos antigos vinculados ao Plano de Contas", body = MigrationReport)
    ),
    security(("api_jwt" = []))
)]
pub async fn migrate_categories(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCompany(company): AuthenticatedCompany,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .migration_service
        .migrate_categories(Some(company.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(report))
}

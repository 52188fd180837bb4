// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{auth::Company, sellers::Employee},
};

fn bearer_token(request: &Request) -> Result<String, AppError> {
    request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .ok_or(AppError::InvalidToken)
}

// Guardião das rotas da empresa: valida o token e guarda a empresa nas extensions
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request).map_err(|e| e.to_api_error(&locale))?;

    let company = app_state
        .auth_service
        .validate_company_token(&token)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    request.extensions_mut().insert(company);
    Ok(next.run(request).await)
}

// Guardião do portal do vendedor
pub async fn seller_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request).map_err(|e| e.to_api_error(&locale))?;

    let seller = app_state
        .auth_service
        .validate_seller_token(&token)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    request.extensions_mut().insert(seller);
    Ok(next.run(request).await)
}

// Extrator para obter a empresa autenticada diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedCompany(pub Company);

impl<S> FromRequestParts<S> for AuthenticatedCompany
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Company>()
            .cloned()
            .map(AuthenticatedCompany)
            .ok_or(AppError::InvalidToken)
    }
}

#[derive(Debug, Clone)]
pub struct AuthenticatedSeller(pub Employee);

impl<S> FromRequestParts<S> for AuthenticatedSeller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Employee>()
            .cloned()
            .map(AuthenticatedSeller)
            .ok_or(AppError::InvalidToken)
    }
}

// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CompanyRepository, EmployeeRepository},
    models::{
        auth::{Claims, Company, TokenRole, UpdateCompanySettings},
        sellers::Employee,
    },
};

const TOKEN_TTL_DAYS: i64 = 7;

/// Gera o hash fora da thread do runtime (bcrypt é caro de propósito).
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();
    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

#[derive(Clone)]
pub struct AuthService {
    companies: Arc<dyn CompanyRepository>,
    employees: Arc<dyn EmployeeRepository>,
    jwt_secret: String,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        companies: Arc<dyn CompanyRepository>,
        employees: Arc<dyn EmployeeRepository>,
        jwt_secret: String,
    ) -> Self {
        Self {
            companies,
            employees,
            jwt_secret,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub async fn register_company(&self, name: &str, email: &str, password: &str) -> Result<String, AppError> {
        let hashed_password = hash_password(password, self.bcrypt_cost).await?;
        let company = self.companies.create(name, email, &hashed_password).await?;

        tracing::info!(company_id = %company.id, "🏢 Nova empresa cadastrada");
        self.create_token(company.id, company.id, TokenRole::Company)
    }

    pub async fn login_company(&self, email: &str, password: &str) -> Result<String, AppError> {
        let company = self
            .companies
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &company.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(company.id, company.id, TokenRole::Company)
    }

    /// Login do portal do vendedor. Só funcionários ativos da categoria "Vendedor".
    pub async fn login_seller(&self, login: &str, password: &str) -> Result<String, AppError> {
        let seller = self
            .employees
            .find_by_login(login)
            .await?
            .filter(|e| e.is_active && e.is_seller())
            .ok_or(AppError::InvalidCredentials)?;

        let password_hash = seller
            .password_hash
            .as_deref()
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(seller.id, seller.company_id, TokenRole::Seller)
    }

    pub async fn validate_company_token(&self, token: &str) -> Result<Company, AppError> {
        let claims = self.decode_token(token)?;
        if claims.role != TokenRole::Company {
            return Err(AppError::Forbidden);
        }

        self.companies
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::CompanyNotFound)
    }

    pub async fn validate_seller_token(&self, token: &str) -> Result<Employee, AppError> {
        let claims = self.decode_token(token)?;
        if claims.role != TokenRole::Seller {
            return Err(AppError::Forbidden);
        }

        self.employees
            .find_by_id(claims.sub)
            .await?
            .filter(|e| e.is_active && e.company_id == claims.company_id)
            .ok_or(AppError::InvalidToken)
    }

    /// Dados que aparecem no cabeçalho do PDF (CNPJ, endereço, chave PIX).
    pub async fn update_company_settings(
        &self,
        company_id: Uuid,
        input: &UpdateCompanySettings,
    ) -> Result<Company, AppError> {
        self.companies
            .update_settings(company_id, input)
            .await?
            .ok_or(AppError::CompanyNotFound)
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }

    fn create_token(&self, subject: Uuid, company_id: Uuid, role: TokenRole) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

        let claims = Claims {
            sub: subject,
            company_id,
            role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

// src/config.rs

use std::env;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::{
    db::Repositories,
    services::{
        auth::AuthService, classifier::CategoryClassifier, document_service::DocumentService,
        finance_service::FinanceService, migration_service::MigrationService,
        quote_service::QuoteService, seller_service::SellerService,
    },
};

/// Configuração lida do ambiente (`.env` em desenvolvimento).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub fonts_dir: String,
    pub bcrypt_cost: u32,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(value) => value.parse().context("DB_MAX_CONNECTIONS deve ser um número")?,
            Err(_) => 5,
        };
        let fonts_dir = env::var("FONTS_DIR").unwrap_or_else(|_| "./fonts".to_string());
        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(value) => value.parse().context("BCRYPT_COST deve ser um número")?,
            Err(_) => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            db_max_connections,
            fonts_dir,
            bcrypt_cost,
        })
    }
}

/// Logger com filtro por `RUST_LOG` (padrão `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub quote_service: QuoteService,
    pub finance_service: FinanceService,
    pub seller_service: SellerService,
    pub migration_service: MigrationService,
    pub document_service: DocumentService,
}

impl AppState {
    // --- Monta o gráfico de dependências ---
    pub fn new(settings: &Settings, repos: Repositories) -> Self {
        let auth_service = AuthService::new(
            repos.companies.clone(),
            repos.employees.clone(),
            settings.jwt_secret.clone(),
        )
        .with_bcrypt_cost(settings.bcrypt_cost);

        let classifier = CategoryClassifier::new(repos.finance.clone());

        Self {
            quote_service: QuoteService::new(repos.quotes.clone(), repos.employees.clone()),
            finance_service: FinanceService::new(repos.finance.clone(), classifier.clone()),
            seller_service: SellerService::new(
                repos.employees.clone(),
                repos.quotes.clone(),
                repos.finance.clone(),
                settings.bcrypt_cost,
            ),
            migration_service: MigrationService::new(repos.finance.clone(), classifier),
            document_service: DocumentService::new(
                repos.quotes.clone(),
                repos.companies.clone(),
                settings.fonts_dir.clone(),
            ),
            auth_service,
        }
    }
}

pub mod company_repo;
pub use company_repo::PgCompanyRepository;
pub mod employee_repo;
pub use employee_repo::PgEmployeeRepository;
pub mod quote_repo;
pub use quote_repo::PgQuoteRepository;
pub mod finance_repo;
pub use finance_repo::PgFinanceRepository;

#[cfg(test)]
pub mod memory;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::Settings,
    models::{
        auth::{Company, UpdateCompanySettings},
        finance::{
            AccountGroup, CategoryLink, ExpenseCategory, NewPayable, NewTransaction, Payable,
            PayableFilter, Transaction,
        },
        quotes::{NewQuote, Quote, QuoteChanges, QuoteFilter, QuoteStatus, StatusChange},
        sellers::{Employee, NewEmployee},
    },
};

// =========================================================================
//  CONTRATOS DE ACESSO A DADOS
// =========================================================================
// Os serviços dependem só destes traits. Em produção: Postgres (`Pg*`).

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Company>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, AppError>;
    async fn create(&self, name: &str, email: &str, password_hash: &str) -> Result<Company, AppError>;
    async fn update_settings(
        &self,
        id: Uuid,
        input: &UpdateCompanySettings,
    ) -> Result<Option<Company>, AppError>;
}

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn create(&self, input: NewEmployee) -> Result<Employee, AppError>;
    async fn list(&self, company_id: Uuid) -> Result<Vec<Employee>, AppError>;
    async fn find(&self, company_id: Uuid, id: Uuid) -> Result<Option<Employee>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>, AppError>;
    async fn find_by_login(&self, login: &str) -> Result<Option<Employee>, AppError>;
    async fn update_commission_rate(
        &self,
        company_id: Uuid,
        id: Uuid,
        rate: Decimal,
    ) -> Result<Option<Employee>, AppError>;
}

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn create(&self, input: NewQuote) -> Result<Quote, AppError>;
    async fn find(&self, company_id: Uuid, id: Uuid) -> Result<Option<Quote>, AppError>;
    async fn list(&self, company_id: Uuid, filter: &QuoteFilter) -> Result<Vec<Quote>, AppError>;

    /// Só altera orçamentos ainda pendentes. `None` se não existe ou já saiu de PENDING.
    async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        changes: &QuoteChanges,
    ) -> Result<Option<Quote>, AppError>;

    /// Só remove orçamentos pendentes.
    async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<bool, AppError>;

    /// Muda o status de `expected` para `new_status` e grava a comissão na mesma
    /// unidade atômica. `None` se o status atual não for mais `expected`.
    /// Nunca grava uma segunda comissão para o mesmo orçamento.
    async fn apply_status(
        &self,
        company_id: Uuid,
        id: Uuid,
        expected: QuoteStatus,
        new_status: QuoteStatus,
        commission: Option<NewPayable>,
    ) -> Result<Option<StatusChange>, AppError>;
}

#[async_trait]
pub trait FinanceRepository: Send + Sync {
    // --- Plano de Contas ---
    async fn create_category(
        &self,
        company_id: Uuid,
        name: &str,
        group: AccountGroup,
        excluded_from_markup: bool,
    ) -> Result<ExpenseCategory, AppError>;
    async fn list_categories(&self, company_id: Uuid) -> Result<Vec<ExpenseCategory>, AppError>;
    async fn find_category(&self, company_id: Uuid, id: Uuid) -> Result<Option<ExpenseCategory>, AppError>;
    /// Busca pelo nome exato, sem diferenciar maiúsculas.
    async fn find_category_by_name(
        &self,
        company_id: Uuid,
        name: &str,
    ) -> Result<Option<ExpenseCategory>, AppError>;
    async fn update_category(
        &self,
        company_id: Uuid,
        id: Uuid,
        group: AccountGroup,
        excluded_from_markup: bool,
    ) -> Result<Option<ExpenseCategory>, AppError>;
    async fn delete_category(&self, company_id: Uuid, id: Uuid) -> Result<bool, AppError>;

    // --- Contas a Pagar ---
    async fn create_payable(&self, input: NewPayable) -> Result<Payable, AppError>;
    async fn list_payables(&self, company_id: Uuid, filter: &PayableFilter) -> Result<Vec<Payable>, AppError>;
    async fn mark_payable_paid(&self, company_id: Uuid, id: Uuid) -> Result<Option<Payable>, AppError>;

    // --- Lançamentos ---
    async fn create_transaction(&self, input: NewTransaction) -> Result<Transaction, AppError>;
    async fn list_transactions(
        &self,
        company_id: Uuid,
        competence: Option<&str>,
    ) -> Result<Vec<Transaction>, AppError>;
    /// Lançamentos sem vínculo com o Plano de Contas (`None` = todas as empresas).
    async fn list_unlinked_transactions(&self, company_id: Option<Uuid>) -> Result<Vec<Transaction>, AppError>;
    async fn link_transaction(&self, id: Uuid, link: &CategoryLink) -> Result<(), AppError>;
}

/// O conjunto de repositórios montado uma vez por processo.
#[derive(Clone)]
pub struct Repositories {
    pub companies: Arc<dyn CompanyRepository>,
    pub employees: Arc<dyn EmployeeRepository>,
    pub quotes: Arc<dyn QuoteRepository>,
    pub finance: Arc<dyn FinanceRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            companies: Arc::new(PgCompanyRepository::new(pool.clone())),
            employees: Arc::new(PgEmployeeRepository::new(pool.clone())),
            quotes: Arc::new(PgQuoteRepository::new(pool.clone())),
            finance: Arc::new(PgFinanceRepository::new(pool)),
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            companies: store.clone(),
            employees: store.clone(),
            quotes: store.clone(),
            finance: store,
        }
    }
}

pub async fn connect(settings: &Settings) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.db_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&settings.database_url)
        .await?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
    Ok(())
}

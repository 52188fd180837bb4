// src/db/finance_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::FinanceRepository,
    models::finance::{
        AccountGroup, CategoryLink, ExpenseCategory, NewPayable, NewTransaction, Payable,
        PayableFilter, Transaction,
    },
};

#[derive(Clone)]
pub struct PgFinanceRepository {
    pool: PgPool,
}

impl PgFinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FinanceRepository for PgFinanceRepository {
    // =========================================================================
    //  PLANO DE CONTAS (Categorias de despesa)
    // =========================================================================

    async fn create_category(
        &self,
        company_id: Uuid,
        name: &str,
        group: AccountGroup,
        excluded_from_markup: bool,
    ) -> Result<ExpenseCategory, AppError> {
        sqlx::query_as::<_, ExpenseCategory>(
            r#"
            INSERT INTO expense_categories (company_id, name, account_group, excluded_from_markup)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(name)
        .bind(group)
        .bind(excluded_from_markup)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Índice único em (company_id, LOWER(name))
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::CategoryAlreadyExists(name.to_string());
                }
            }
            e.into()
        })
    }

    async fn list_categories(&self, company_id: Uuid) -> Result<Vec<ExpenseCategory>, AppError> {
        let categories = sqlx::query_as::<_, ExpenseCategory>(
            "SELECT * FROM expense_categories WHERE company_id = $1 ORDER BY name ASC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn find_category(&self, company_id: Uuid, id: Uuid) -> Result<Option<ExpenseCategory>, AppError> {
        let category = sqlx::query_as::<_, ExpenseCategory>(
            "SELECT * FROM expense_categories WHERE company_id = $1 AND id = $2",
        )
        .bind(company_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn find_category_by_name(
        &self,
        company_id: Uuid,
        name: &str,
    ) -> Result<Option<ExpenseCategory>, AppError> {
        let category = sqlx::query_as::<_, ExpenseCategory>(
            r#"
            SELECT * FROM expense_categories
            WHERE company_id = $1 AND LOWER(name) = LOWER($2)
            LIMIT 1
            "#,
        )
        .bind(company_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn update_category(
        &self,
        company_id: Uuid,
        id: Uuid,
        group: AccountGroup,
        excluded_from_markup: bool,
    ) -> Result<Option<ExpenseCategory>, AppError> {
        let category = sqlx::query_as::<_, ExpenseCategory>(
            r#"
            UPDATE expense_categories
            SET account_group = $3, excluded_from_markup = $4
            WHERE company_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(id)
        .bind(group)
        .bind(excluded_from_markup)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn delete_category(&self, company_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM expense_categories WHERE company_id = $1 AND id = $2")
            .bind(company_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  CONTAS A PAGAR
    // =========================================================================

    async fn create_payable(&self, input: NewPayable) -> Result<Payable, AppError> {
        let payable = sqlx::query_as::<_, Payable>(
            r#"
            INSERT INTO payables (
                company_id, category, description, amount, due_date,
                seller_id, quote_id, services_base, materials_excluded
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(input.company_id)
        .bind(&input.category)
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.due_date)
        .bind(input.seller_id)
        .bind(input.quote_id)
        .bind(input.services_base)
        .bind(input.materials_excluded)
        .fetch_one(&self.pool)
        .await?;
        Ok(payable)
    }

    async fn list_payables(&self, company_id: Uuid, filter: &PayableFilter) -> Result<Vec<Payable>, AppError> {
        let payables = sqlx::query_as::<_, Payable>(
            r#"
            SELECT * FROM payables
            WHERE company_id = $1
              AND ($2::text IS NULL OR category = $2)
              AND ($3::uuid IS NULL OR seller_id = $3)
            ORDER BY due_date ASC, created_at ASC
            "#,
        )
        .bind(company_id)
        .bind(filter.category.as_deref())
        .bind(filter.seller_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payables)
    }

    async fn mark_payable_paid(&self, company_id: Uuid, id: Uuid) -> Result<Option<Payable>, AppError> {
        let payable = sqlx::query_as::<_, Payable>(
            r#"
            UPDATE payables
            SET status = 'PAID', paid_at = COALESCE(paid_at, NOW())
            WHERE company_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(payable)
    }

    // =========================================================================
    //  LANÇAMENTOS
    // =========================================================================

    async fn create_transaction(&self, input: NewTransaction) -> Result<Transaction, AppError> {
        let link = &input.link;
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (
                company_id, description, amount, kind, category, date,
                category_id, category_name, account_group, excluded_from_markup, competence
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $5, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(input.company_id)
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.kind)
        .bind(&link.category_name)
        .bind(&input.date)
        .bind(link.category_id)
        .bind(link.account_group)
        .bind(link.excluded_from_markup)
        .bind(&link.competence)
        .fetch_one(&self.pool)
        .await?;
        Ok(transaction)
    }

    async fn list_transactions(
        &self,
        company_id: Uuid,
        competence: Option<&str>,
    ) -> Result<Vec<Transaction>, AppError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT * FROM transactions
            WHERE company_id = $1
              AND ($2::text IS NULL OR competence = $2)
            ORDER BY date ASC, created_at ASC
            "#,
        )
        .bind(company_id)
        .bind(competence)
        .fetch_all(&self.pool)
        .await?;
        Ok(transactions)
    }

    async fn list_unlinked_transactions(&self, company_id: Option<Uuid>) -> Result<Vec<Transaction>, AppError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT * FROM transactions
            WHERE category_id IS NULL
              AND ($1::uuid IS NULL OR company_id = $1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(transactions)
    }

    async fn link_transaction(&self, id: Uuid, link: &CategoryLink) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE transactions
            SET category_id = $2, category_name = $3, account_group = $4,
                excluded_from_markup = $5, competence = $6
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(link.category_id)
        .bind(&link.category_name)
        .bind(link.account_group)
        .bind(link.excluded_from_markup)
        .bind(&link.competence)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

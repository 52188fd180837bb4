// src/db/quote_repo.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{types::Json, PgPool, Postgres, Executor};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::QuoteRepository,
    models::{
        finance::{NewPayable, Payable},
        quotes::{NewQuote, Quote, QuoteChanges, QuoteFilter, QuoteStatus, StatusChange},
    },
};

#[derive(Clone)]
pub struct PgQuoteRepository {
    pool: PgPool,
}

impl PgQuoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Grava a comissão. O índice parcial (quote_id, categoria 'Comissão')
    // faz o ON CONFLICT descartar uma segunda comissão do mesmo orçamento.
    async fn insert_commission<'e, E>(
        &self,
        executor: E,
        payable: &NewPayable,
    ) -> Result<Option<Payable>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, Payable>(
            r#"
            INSERT INTO payables (
                company_id, category, description, amount, due_date,
                seller_id, quote_id, services_base, materials_excluded
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT DO NOTHING
            RETURNING *
            "#,
        )
        .bind(payable.company_id)
        .bind(&payable.category)
        .bind(&payable.description)
        .bind(payable.amount)
        .bind(payable.due_date)
        .bind(payable.seller_id)
        .bind(payable.quote_id)
        .bind(payable.services_base)
        .bind(payable.materials_excluded)
        .fetch_optional(executor)
        .await?;

        Ok(created)
    }
}

#[async_trait]
impl QuoteRepository for PgQuoteRepository {
    async fn create(&self, input: NewQuote) -> Result<Quote, AppError> {
        // O número sequencial é calculado na própria inserção
        let quote = sqlx::query_as::<_, Quote>(
            r#"
            INSERT INTO quotes (
                company_id, number, seller_id, client_name, client_contact, description,
                items, practiced_price, services_total, materials_total, validity_days
            )
            VALUES (
                $1,
                (SELECT COALESCE(MAX(number), 0) + 1 FROM quotes WHERE company_id = $1),
                $2, $3, $4, $5, $6, $7, $8, $9, $10
            )
            RETURNING *
            "#,
        )
        .bind(input.company_id)
        .bind(input.seller_id)
        .bind(&input.client_name)
        .bind(input.client_contact.as_deref())
        .bind(input.description.as_deref())
        .bind(Json(&input.items))
        .bind(input.practiced_price)
        .bind(input.breakdown.map(|b| b.services_total))
        .bind(input.breakdown.map(|b| b.materials_total))
        .bind(input.validity_days)
        .fetch_one(&self.pool)
        .await?;

        Ok(quote)
    }

    async fn find(&self, company_id: Uuid, id: Uuid) -> Result<Option<Quote>, AppError> {
        let quote = sqlx::query_as::<_, Quote>(
            "SELECT * FROM quotes WHERE company_id = $1 AND id = $2",
        )
        .bind(company_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(quote)
    }

    async fn list(&self, company_id: Uuid, filter: &QuoteFilter) -> Result<Vec<Quote>, AppError> {
        let quotes = sqlx::query_as::<_, Quote>(
            r#"
            SELECT * FROM quotes
            WHERE company_id = $1
              AND ($2::quote_status IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR seller_id = $3)
            ORDER BY number DESC
            "#,
        )
        .bind(company_id)
        .bind(filter.status)
        .bind(filter.seller_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(quotes)
    }

    async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        changes: &QuoteChanges,
    ) -> Result<Option<Quote>, AppError> {
        let quote = sqlx::query_as::<_, Quote>(
            r#"
            UPDATE quotes
            SET seller_id = $3, client_name = $4, client_contact = $5, description = $6,
                items = $7, practiced_price = $8, services_total = $9, materials_total = $10,
                validity_days = $11, updated_at = NOW()
            WHERE company_id = $1 AND id = $2 AND status = 'PENDING'
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(id)
        .bind(changes.seller_id)
        .bind(&changes.client_name)
        .bind(changes.client_contact.as_deref())
        .bind(changes.description.as_deref())
        .bind(Json(&changes.items))
        .bind(changes.practiced_price)
        .bind(changes.breakdown.map(|b| b.services_total))
        .bind(changes.breakdown.map(|b| b.materials_total))
        .bind(changes.validity_days)
        .fetch_optional(&self.pool)
        .await?;
        Ok(quote)
    }

    async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM quotes WHERE company_id = $1 AND id = $2 AND status = 'PENDING'",
        )
        .bind(company_id)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn apply_status(
        &self,
        company_id: Uuid,
        id: Uuid,
        expected: QuoteStatus,
        new_status: QuoteStatus,
        commission: Option<NewPayable>,
    ) -> Result<Option<StatusChange>, AppError> {
        // Status + comissão: tudo ou nada
        let mut tx = self.pool.begin().await?;

        let approved_at = (new_status == QuoteStatus::Approved).then(Utc::now);

        // O filtro por `status = expected` impede que duas aprovações simultâneas passem
        let quote = sqlx::query_as::<_, Quote>(
            r#"
            UPDATE quotes
            SET status = $4, approved_at = COALESCE($5, approved_at), updated_at = NOW()
            WHERE company_id = $1 AND id = $2 AND status = $3
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(id)
        .bind(expected)
        .bind(new_status)
        .bind(approved_at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(quote) = quote else {
            return Ok(None);
        };

        let commission = match commission {
            Some(draft) => self.insert_commission(&mut *tx, &draft).await?,
            None => None,
        };

        tx.commit().await?;

        Ok(Some(StatusChange { quote, commission }))
    }
}

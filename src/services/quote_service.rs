// src/services/quote_service.rs

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EmployeeRepository, QuoteRepository},
    models::quotes::{
        NewQuote, Quote, QuoteBreakdown, QuoteChanges, QuoteFilter, QuoteStatus, StatusChange,
    },
    services::commission,
};

#[derive(Clone)]
pub struct QuoteService {
    repo: Arc<dyn QuoteRepository>,
    employees: Arc<dyn EmployeeRepository>,
}

impl QuoteService {
    pub fn new(repo: Arc<dyn QuoteRepository>, employees: Arc<dyn EmployeeRepository>) -> Self {
        Self { repo, employees }
    }

    // --- CRUD ---

    pub async fn create_quote(&self, input: NewQuote) -> Result<Quote, AppError> {
        self.check_pricing(input.practiced_price, input.breakdown.as_ref())?;
        self.check_seller(input.company_id, input.seller_id).await?;

        let quote = self.repo.create(input).await?;
        tracing::info!(quote_id = %quote.id, number = quote.number, "📝 Orçamento criado");
        Ok(quote)
    }

    pub async fn list_quotes(&self, company_id: Uuid, filter: &QuoteFilter) -> Result<Vec<Quote>, AppError> {
        self.repo.list(company_id, filter).await
    }

    pub async fn get_quote(&self, company_id: Uuid, quote_id: Uuid) -> Result<Quote, AppError> {
        self.repo
            .find(company_id, quote_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Orçamento".to_string()))
    }

    pub async fn update_quote(
        &self,
        company_id: Uuid,
        quote_id: Uuid,
        changes: QuoteChanges,
    ) -> Result<Quote, AppError> {
        self.check_pricing(changes.practiced_price, changes.breakdown.as_ref())?;
        self.check_seller(company_id, changes.seller_id).await?;

        match self.repo.update(company_id, quote_id, &changes).await? {
            Some(quote) => Ok(quote),
            // Distingue "não existe" de "já fechado"
            None => {
                self.get_quote(company_id, quote_id).await?;
                Err(AppError::QuoteLocked)
            }
        }
    }

    pub async fn delete_quote(&self, company_id: Uuid, quote_id: Uuid) -> Result<(), AppError> {
        if self.repo.delete(company_id, quote_id).await? {
            return Ok(());
        }
        self.get_quote(company_id, quote_id).await?;
        Err(AppError::QuoteLocked)
    }

    // --- TRANSIÇÃO DE STATUS ---

    /// Aplica o novo status. Na aprovação, a comissão do vendedor é gravada junto
    /// com a mudança de status, uma única vez por orçamento.
    pub async fn change_status(
        &self,
        company_id: Uuid,
        quote_id: Uuid,
        new_status: QuoteStatus,
    ) -> Result<StatusChange, AppError> {
        let quote = self.get_quote(company_id, quote_id).await?;

        if quote.status == new_status {
            return Ok(StatusChange { quote, commission: None });
        }
        if quote.status.is_terminal() {
            return Err(AppError::InvalidStatusTransition {
                from: quote.status,
                to: new_status,
            });
        }

        let commission = match new_status {
            QuoteStatus::Approved => {
                let seller = match quote.seller_id {
                    Some(seller_id) => self.employees.find(company_id, seller_id).await?,
                    None => None,
                };
                commission::allocate(&quote, seller.as_ref(), Utc::now().date_naive())?
            }
            _ => None,
        };

        let expected = quote.status;
        match self
            .repo
            .apply_status(company_id, quote_id, expected, new_status, commission)
            .await?
        {
            Some(change) => {
                match &change.commission {
                    Some(payable) => tracing::info!(
                        quote_id = %quote_id,
                        payable_id = %payable.id,
                        amount = %payable.amount,
                        "💰 Orçamento aprovado, comissão lançada"
                    ),
                    None => tracing::info!(
                        quote_id = %quote_id,
                        status = new_status.as_str(),
                        "Status do orçamento alterado"
                    ),
                }
                Ok(change)
            }
            // Outra requisição mudou o status entre a leitura e a escrita
            None => {
                let current = self.get_quote(company_id, quote_id).await?;
                if current.status == new_status {
                    Ok(StatusChange { quote: current, commission: None })
                } else {
                    Err(AppError::InvalidStatusTransition {
                        from: current.status,
                        to: new_status,
                    })
                }
            }
        }
    }

    // --- Validações de fronteira ---

    fn check_pricing(
        &self,
        practiced_price: Decimal,
        breakdown: Option<&QuoteBreakdown>,
    ) -> Result<(), AppError> {
        if practiced_price.is_sign_negative() && !practiced_price.is_zero() {
            return Err(AppError::InvalidBreakdown(
                "o preço praticado não pode ser negativo".to_string(),
            ));
        }
        if let Some(breakdown) = breakdown {
            breakdown.validate_against(practiced_price)?;
        }
        Ok(())
    }

    async fn check_seller(&self, company_id: Uuid, seller_id: Option<Uuid>) -> Result<(), AppError> {
        let Some(seller_id) = seller_id else {
            return Ok(());
        };
        match self.employees.find(company_id, seller_id).await? {
            Some(employee) if employee.is_active && employee.is_seller() => Ok(()),
            _ => Err(AppError::ResourceNotFound("Vendedor".to_string())),
        }
    }
}

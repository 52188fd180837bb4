// src/services/finance_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{error::AppError, money::round_currency},
    db::FinanceRepository,
    models::finance::{
        AccountGroup, CategoryLink, ExpenseCategory, MonthlySummary, NewPayable, NewTransaction,
        Payable, PayableFilter, Transaction, TransactionKind,
    },
    services::classifier::{classify, derive_competence, CategoryClassifier},
};

/// Como o lançamento indica a sua categoria.
#[derive(Debug, Clone)]
pub enum CategoryRef {
    Id(Uuid),
    Name(String),
}

#[derive(Clone)]
pub struct FinanceService {
    repo: Arc<dyn FinanceRepository>,
    classifier: CategoryClassifier,
}

impl FinanceService {
    pub fn new(repo: Arc<dyn FinanceRepository>, classifier: CategoryClassifier) -> Self {
        Self { repo, classifier }
    }

    // --- PLANO DE CONTAS ---

    /// Sem grupo informado, a categoria é classificada pelo nome.
    pub async fn create_category(
        &self,
        company_id: Uuid,
        name: &str,
        group: Option<AccountGroup>,
        excluded_from_markup: Option<bool>,
    ) -> Result<ExpenseCategory, AppError> {
        let name = name.trim();
        if self.repo.find_category_by_name(company_id, name).await?.is_some() {
            return Err(AppError::CategoryAlreadyExists(name.to_string()));
        }

        let (group, excluded) = match group {
            Some(group) => (group, group.excluded_from_markup()),
            None => classify(name),
        };

        self.repo
            .create_category(company_id, name, group, excluded_from_markup.unwrap_or(excluded))
            .await
    }

    pub async fn list_categories(&self, company_id: Uuid) -> Result<Vec<ExpenseCategory>, AppError> {
        self.repo.list_categories(company_id).await
    }

    pub async fn update_category(
        &self,
        company_id: Uuid,
        category_id: Uuid,
        group: AccountGroup,
        excluded_from_markup: Option<bool>,
    ) -> Result<ExpenseCategory, AppError> {
        self.repo
            .update_category(
                company_id,
                category_id,
                group,
                excluded_from_markup.unwrap_or_else(|| group.excluded_from_markup()),
            )
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Categoria".to_string()))
    }

    pub async fn delete_category(&self, company_id: Uuid, category_id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_category(company_id, category_id).await? {
            return Err(AppError::ResourceNotFound("Categoria".to_string()));
        }
        Ok(())
    }

    // --- CONTAS A PAGAR ---

    pub async fn list_payables(&self, company_id: Uuid, filter: &PayableFilter) -> Result<Vec<Payable>, AppError> {
        self.repo.list_payables(company_id, filter).await
    }

    pub async fn create_payable(
        &self,
        company_id: Uuid,
        category: &str,
        description: &str,
        amount: Decimal,
        due_date: NaiveDate,
    ) -> Result<Payable, AppError> {
        self.repo
            .create_payable(NewPayable {
                company_id,
                category: category.trim().to_string(),
                description: description.to_string(),
                amount: round_currency(amount),
                due_date,
                seller_id: None,
                quote_id: None,
                services_base: None,
                materials_excluded: None,
            })
            .await
    }

    pub async fn mark_payable_paid(&self, company_id: Uuid, payable_id: Uuid) -> Result<Payable, AppError> {
        self.repo
            .mark_payable_paid(company_id, payable_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Conta a pagar".to_string()))
    }

    // --- LANÇAMENTOS ---

    pub async fn create_transaction(
        &self,
        company_id: Uuid,
        description: &str,
        amount: Decimal,
        kind: TransactionKind,
        date: &str,
        category: CategoryRef,
    ) -> Result<Transaction, AppError> {
        let competence = derive_competence(date)?;

        let category = match category {
            CategoryRef::Id(id) => self
                .repo
                .find_category(company_id, id)
                .await?
                .ok_or_else(|| AppError::ResourceNotFound("Categoria".to_string()))?,
            CategoryRef::Name(name) => self.classifier.resolve_category(company_id, &name).await?,
        };

        self.repo
            .create_transaction(NewTransaction {
                company_id,
                description: description.to_string(),
                amount: round_currency(amount),
                kind,
                date: date.trim().to_string(),
                link: CategoryLink::new(&category, competence),
            })
            .await
    }

    pub async fn list_transactions(
        &self,
        company_id: Uuid,
        competence: Option<&str>,
    ) -> Result<Vec<Transaction>, AppError> {
        self.repo.list_transactions(company_id, competence).await
    }

    /// DRE simplificado da competência: receitas menos despesas por grupo.
    pub async fn monthly_summary(&self, company_id: Uuid, competence: &str) -> Result<MonthlySummary, AppError> {
        let competence = derive_competence(competence)?;
        let transactions = self.repo.list_transactions(company_id, Some(&competence)).await?;
        Ok(summarize(competence, &transactions))
    }
}

fn summarize(competence: String, transactions: &[Transaction]) -> MonthlySummary {
    let mut income = Decimal::ZERO;
    let mut direct_costs = Decimal::ZERO;
    let mut fixed_expenses = Decimal::ZERO;
    let mut variable_expenses = Decimal::ZERO;

    for t in transactions {
        match (t.kind, t.account_group) {
            (TransactionKind::Income, _) => income += t.amount,
            (TransactionKind::Expense, Some(AccountGroup::DiretaObra)) => direct_costs += t.amount,
            (TransactionKind::Expense, Some(AccountGroup::VariavelIndireta)) => variable_expenses += t.amount,
            // Sem grupo conta como fixa
            (TransactionKind::Expense, _) => fixed_expenses += t.amount,
        }
    }

    let net_profit = income - direct_costs - fixed_expenses - variable_expenses;

    MonthlySummary {
        competence,
        income: round_currency(income),
        direct_costs: round_currency(direct_costs),
        fixed_expenses: round_currency(fixed_expenses),
        variable_expenses: round_currency(variable_expenses),
        net_profit: round_currency(net_profit),
    }
}

// src/db/memory.rs

// Implementação em memória dos repositórios, usada nos testes.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CompanyRepository, EmployeeRepository, FinanceRepository, QuoteRepository},
    models::{
        auth::{Company, UpdateCompanySettings},
        finance::{
            AccountGroup, CategoryLink, ExpenseCategory, NewPayable, NewTransaction, Payable,
            PayableFilter, PayableStatus, Transaction, COMMISSION_CATEGORY,
        },
        quotes::{NewQuote, Quote, QuoteChanges, QuoteFilter, QuoteStatus, StatusChange},
        sellers::{Employee, NewEmployee},
    },
};

#[derive(Default)]
struct Tables {
    companies: Vec<Company>,
    employees: Vec<Employee>,
    quotes: Vec<Quote>,
    categories: Vec<ExpenseCategory>,
    payables: Vec<Payable>,
    transactions: Vec<Transaction>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store poisoned")
    }

    /// Insere um lançamento antigo, sem vínculo com o Plano de Contas.
    pub fn insert_legacy_transaction(
        &self,
        company_id: Uuid,
        category: &str,
        date: &str,
        amount: Decimal,
    ) -> Transaction {
        let transaction = Transaction {
            id: Uuid::new_v4(),
            company_id,
            description: format!("Lançamento {}", category),
            amount,
            kind: crate::models::finance::TransactionKind::Expense,
            category: category.to_string(),
            date: date.to_string(),
            category_id: None,
            category_name: None,
            account_group: None,
            excluded_from_markup: None,
            competence: None,
            created_at: Utc::now(),
        };
        self.tables().transactions.push(transaction.clone());
        transaction
    }

    pub fn transaction(&self, id: Uuid) -> Option<Transaction> {
        self.tables().transactions.iter().find(|t| t.id == id).cloned()
    }
}

fn new_payable(input: NewPayable) -> Payable {
    Payable {
        id: Uuid::new_v4(),
        company_id: input.company_id,
        category: input.category,
        description: input.description,
        amount: input.amount,
        due_date: input.due_date,
        status: PayableStatus::Pending,
        seller_id: input.seller_id,
        quote_id: input.quote_id,
        services_base: input.services_base,
        materials_excluded: input.materials_excluded,
        paid_at: None,
        created_at: Utc::now(),
    }
}

#[async_trait]
impl CompanyRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Company>, AppError> {
        Ok(self.tables().companies.iter().find(|c| c.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        Ok(self.tables().companies.iter().find(|c| c.id == id).cloned())
    }

    async fn create(&self, name: &str, email: &str, password_hash: &str) -> Result<Company, AppError> {
        let mut tables = self.tables();
        if tables.companies.iter().any(|c| c.email == email) {
            return Err(AppError::EmailAlreadyExists);
        }
        let now = Utc::now();
        let company = Company {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            document_number: None,
            address: None,
            phone: None,
            pix_key: None,
            created_at: now,
            updated_at: now,
        };
        tables.companies.push(company.clone());
        Ok(company)
    }

    async fn update_settings(
        &self,
        id: Uuid,
        input: &UpdateCompanySettings,
    ) -> Result<Option<Company>, AppError> {
        let mut tables = self.tables();
        let Some(company) = tables.companies.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            company.name = name.clone();
        }
        if let Some(document_number) = &input.document_number {
            company.document_number = Some(document_number.clone());
        }
        if let Some(address) = &input.address {
            company.address = Some(address.clone());
        }
        if let Some(phone) = &input.phone {
            company.phone = Some(phone.clone());
        }
        if let Some(pix_key) = &input.pix_key {
            company.pix_key = Some(pix_key.clone());
        }
        company.updated_at = Utc::now();
        Ok(Some(company.clone()))
    }
}

#[async_trait]
impl EmployeeRepository for MemoryStore {
    async fn create(&self, input: NewEmployee) -> Result<Employee, AppError> {
        let mut tables = self.tables();
        if let Some(login) = &input.login {
            if tables.employees.iter().any(|e| e.login.as_ref() == Some(login)) {
                return Err(AppError::LoginAlreadyExists);
            }
        }
        let employee = Employee {
            id: Uuid::new_v4(),
            company_id: input.company_id,
            name: input.name,
            category: input.category,
            commission_rate: input.commission_rate,
            login: input.login,
            password_hash: input.password_hash,
            is_active: true,
            created_at: Utc::now(),
        };
        tables.employees.push(employee.clone());
        Ok(employee)
    }

    async fn list(&self, company_id: Uuid) -> Result<Vec<Employee>, AppError> {
        let mut employees: Vec<Employee> = self
            .tables()
            .employees
            .iter()
            .filter(|e| e.company_id == company_id)
            .cloned()
            .collect();
        employees.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(employees)
    }

    async fn find(&self, company_id: Uuid, id: Uuid) -> Result<Option<Employee>, AppError> {
        Ok(self
            .tables()
            .employees
            .iter()
            .find(|e| e.company_id == company_id && e.id == id)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>, AppError> {
        Ok(self.tables().employees.iter().find(|e| e.id == id).cloned())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<Employee>, AppError> {
        Ok(self
            .tables()
            .employees
            .iter()
            .find(|e| e.login.as_deref() == Some(login))
            .cloned())
    }

    async fn update_commission_rate(
        &self,
        company_id: Uuid,
        id: Uuid,
        rate: Decimal,
    ) -> Result<Option<Employee>, AppError> {
        let mut tables = self.tables();
        let employee = tables
            .employees
            .iter_mut()
            .find(|e| e.company_id == company_id && e.id == id);
        Ok(employee.map(|e| {
            e.commission_rate = rate;
            e.clone()
        }))
    }
}

#[async_trait]
impl QuoteRepository for MemoryStore {
    async fn create(&self, input: NewQuote) -> Result<Quote, AppError> {
        let mut tables = self.tables();
        let number = tables
            .quotes
            .iter()
            .filter(|q| q.company_id == input.company_id)
            .map(|q| q.number)
            .max()
            .unwrap_or(0)
            + 1;
        let now = Utc::now();
        let quote = Quote {
            id: Uuid::new_v4(),
            company_id: input.company_id,
            number,
            seller_id: input.seller_id,
            client_name: input.client_name,
            client_contact: input.client_contact,
            description: input.description,
            items: Json(input.items),
            practiced_price: input.practiced_price,
            services_total: input.breakdown.map(|b| b.services_total),
            materials_total: input.breakdown.map(|b| b.materials_total),
            status: QuoteStatus::Pending,
            validity_days: input.validity_days,
            approved_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.quotes.push(quote.clone());
        Ok(quote)
    }

    async fn find(&self, company_id: Uuid, id: Uuid) -> Result<Option<Quote>, AppError> {
        Ok(self
            .tables()
            .quotes
            .iter()
            .find(|q| q.company_id == company_id && q.id == id)
            .cloned())
    }

    async fn list(&self, company_id: Uuid, filter: &QuoteFilter) -> Result<Vec<Quote>, AppError> {
        let mut quotes: Vec<Quote> = self
            .tables()
            .quotes
            .iter()
            .filter(|q| q.company_id == company_id)
            .filter(|q| filter.status.is_none_or(|s| q.status == s))
            .filter(|q| filter.seller_id.is_none_or(|s| q.seller_id == Some(s)))
            .cloned()
            .collect();
        quotes.sort_by(|a, b| b.number.cmp(&a.number));
        Ok(quotes)
    }

    async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        changes: &QuoteChanges,
    ) -> Result<Option<Quote>, AppError> {
        let mut tables = self.tables();
        let Some(quote) = tables.quotes.iter_mut().find(|q| {
            q.company_id == company_id && q.id == id && q.status == QuoteStatus::Pending
        }) else {
            return Ok(None);
        };
        quote.seller_id = changes.seller_id;
        quote.client_name = changes.client_name.clone();
        quote.client_contact = changes.client_contact.clone();
        quote.description = changes.description.clone();
        quote.items = Json(changes.items.clone());
        quote.practiced_price = changes.practiced_price;
        quote.services_total = changes.breakdown.map(|b| b.services_total);
        quote.materials_total = changes.breakdown.map(|b| b.materials_total);
        quote.validity_days = changes.validity_days;
        quote.updated_at = Utc::now();
        Ok(Some(quote.clone()))
    }

    async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables();
        let before = tables.quotes.len();
        tables.quotes.retain(|q| {
            !(q.company_id == company_id && q.id == id && q.status == QuoteStatus::Pending)
        });
        Ok(tables.quotes.len() < before)
    }

    async fn apply_status(
        &self,
        company_id: Uuid,
        id: Uuid,
        expected: QuoteStatus,
        new_status: QuoteStatus,
        commission: Option<NewPayable>,
    ) -> Result<Option<StatusChange>, AppError> {
        let mut tables = self.tables();
        let Some(quote) = tables.quotes.iter_mut().find(|q| {
            q.company_id == company_id && q.id == id && q.status == expected
        }) else {
            return Ok(None);
        };

        quote.status = new_status;
        if new_status == QuoteStatus::Approved {
            quote.approved_at = Some(Utc::now());
        }
        quote.updated_at = Utc::now();
        let quote = quote.clone();

        let commission = match commission {
            Some(draft) => {
                let duplicate = tables.payables.iter().any(|p| {
                    p.category == COMMISSION_CATEGORY && p.quote_id.is_some() && p.quote_id == draft.quote_id
                });
                if duplicate {
                    None
                } else {
                    let payable = new_payable(draft);
                    tables.payables.push(payable.clone());
                    Some(payable)
                }
            }
            None => None,
        };

        Ok(Some(StatusChange { quote, commission }))
    }
}

#[async_trait]
impl FinanceRepository for MemoryStore {
    async fn create_category(
        &self,
        company_id: Uuid,
        name: &str,
        group: AccountGroup,
        excluded_from_markup: bool,
    ) -> Result<ExpenseCategory, AppError> {
        let mut tables = self.tables();
        let lowered = name.to_lowercase();
        if tables
            .categories
            .iter()
            .any(|c| c.company_id == company_id && c.name.to_lowercase() == lowered)
        {
            return Err(AppError::CategoryAlreadyExists(name.to_string()));
        }
        let category = ExpenseCategory {
            id: Uuid::new_v4(),
            company_id,
            name: name.to_string(),
            account_group: group,
            excluded_from_markup,
            created_at: Utc::now(),
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn list_categories(&self, company_id: Uuid) -> Result<Vec<ExpenseCategory>, AppError> {
        let mut categories: Vec<ExpenseCategory> = self
            .tables()
            .categories
            .iter()
            .filter(|c| c.company_id == company_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category(&self, company_id: Uuid, id: Uuid) -> Result<Option<ExpenseCategory>, AppError> {
        Ok(self
            .tables()
            .categories
            .iter()
            .find(|c| c.company_id == company_id && c.id == id)
            .cloned())
    }

    async fn find_category_by_name(
        &self,
        company_id: Uuid,
        name: &str,
    ) -> Result<Option<ExpenseCategory>, AppError> {
        let lowered = name.to_lowercase();
        Ok(self
            .tables()
            .categories
            .iter()
            .find(|c| c.company_id == company_id && c.name.to_lowercase() == lowered)
            .cloned())
    }

    async fn update_category(
        &self,
        company_id: Uuid,
        id: Uuid,
        group: AccountGroup,
        excluded_from_markup: bool,
    ) -> Result<Option<ExpenseCategory>, AppError> {
        let mut tables = self.tables();
        let category = tables
            .categories
            .iter_mut()
            .find(|c| c.company_id == company_id && c.id == id);
        Ok(category.map(|c| {
            c.account_group = group;
            c.excluded_from_markup = excluded_from_markup;
            c.clone()
        }))
    }

    async fn delete_category(&self, company_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables();
        let before = tables.categories.len();
        tables.categories.retain(|c| !(c.company_id == company_id && c.id == id));
        Ok(tables.categories.len() < before)
    }

    async fn create_payable(&self, input: NewPayable) -> Result<Payable, AppError> {
        let payable = new_payable(input);
        self.tables().payables.push(payable.clone());
        Ok(payable)
    }

    async fn list_payables(&self, company_id: Uuid, filter: &PayableFilter) -> Result<Vec<Payable>, AppError> {
        Ok(self
            .tables()
            .payables
            .iter()
            .filter(|p| p.company_id == company_id)
            .filter(|p| filter.category.as_ref().is_none_or(|c| &p.category == c))
            .filter(|p| filter.seller_id.is_none_or(|s| p.seller_id == Some(s)))
            .cloned()
            .collect())
    }

    async fn mark_payable_paid(&self, company_id: Uuid, id: Uuid) -> Result<Option<Payable>, AppError> {
        let mut tables = self.tables();
        let payable = tables
            .payables
            .iter_mut()
            .find(|p| p.company_id == company_id && p.id == id);
        Ok(payable.map(|p| {
            p.status = PayableStatus::Paid;
            p.paid_at.get_or_insert_with(Utc::now);
            p.clone()
        }))
    }

    async fn create_transaction(&self, input: NewTransaction) -> Result<Transaction, AppError> {
        let link = input.link;
        let transaction = Transaction {
            id: Uuid::new_v4(),
            company_id: input.company_id,
            description: input.description,
            amount: input.amount,
            kind: input.kind,
            category: link.category_name.clone(),
            date: input.date,
            category_id: Some(link.category_id),
            category_name: Some(link.category_name),
            account_group: Some(link.account_group),
            excluded_from_markup: Some(link.excluded_from_markup),
            competence: Some(link.competence),
            created_at: Utc::now(),
        };
        self.tables().transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn list_transactions(
        &self,
        company_id: Uuid,
        competence: Option<&str>,
    ) -> Result<Vec<Transaction>, AppError> {
        Ok(self
            .tables()
            .transactions
            .iter()
            .filter(|t| t.company_id == company_id)
            .filter(|t| competence.is_none_or(|c| t.competence.as_deref() == Some(c)))
            .cloned()
            .collect())
    }

    async fn list_unlinked_transactions(&self, company_id: Option<Uuid>) -> Result<Vec<Transaction>, AppError> {
        Ok(self
            .tables()
            .transactions
            .iter()
            .filter(|t| t.category_id.is_none())
            .filter(|t| company_id.is_none_or(|c| t.company_id == c))
            .cloned()
            .collect())
    }

    async fn link_transaction(&self, id: Uuid, link: &CategoryLink) -> Result<(), AppError> {
        let mut tables = self.tables();
        let transaction = tables
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::ResourceNotFound(format!("Lançamento {}", id)))?;
        transaction.category_id = Some(link.category_id);
        transaction.category_name = Some(link.category_name.clone());
        transaction.account_group = Some(link.account_group);
        transaction.excluded_from_markup = Some(link.excluded_from_markup);
        transaction.competence = Some(link.competence.clone());
        Ok(())
    }
}

// src/services/seller_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EmployeeRepository, FinanceRepository, QuoteRepository},
    models::{
        finance::{Payable, PayableFilter, COMMISSION_CATEGORY},
        quotes::{Quote, QuoteFilter, QuoteStatus},
        sellers::{Employee, NewEmployee},
    },
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct SellerService {
    employees: Arc<dyn EmployeeRepository>,
    quotes: Arc<dyn QuoteRepository>,
    finance: Arc<dyn FinanceRepository>,
    bcrypt_cost: u32,
}

impl SellerService {
    pub fn new(
        employees: Arc<dyn EmployeeRepository>,
        quotes: Arc<dyn QuoteRepository>,
        finance: Arc<dyn FinanceRepository>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            employees,
            quotes,
            finance,
            bcrypt_cost,
        }
    }

    // --- FUNCIONÁRIOS (lado da empresa) ---

    pub async fn create_employee(
        &self,
        company_id: Uuid,
        name: &str,
        category: &str,
        commission_rate: Decimal,
        login: Option<&str>,
        password: Option<&str>,
    ) -> Result<Employee, AppError> {
        check_rate(commission_rate)?;

        let password_hash = match password {
            Some(password) => Some(hash_password(password, self.bcrypt_cost).await?),
            None => None,
        };

        let employee = self
            .employees
            .create(NewEmployee {
                company_id,
                name: name.trim().to_string(),
                category: category.trim().to_string(),
                commission_rate,
                login: login.map(|l| l.trim().to_string()),
                password_hash,
            })
            .await?;

        tracing::info!(employee_id = %employee.id, seller = employee.is_seller(), "👷 Funcionário cadastrado");
        Ok(employee)
    }

    pub async fn list_employees(&self, company_id: Uuid) -> Result<Vec<Employee>, AppError> {
        self.employees.list(company_id).await
    }

    /// Vale para as próximas aprovações. Comissões já lançadas não mudam.
    pub async fn update_commission_rate(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
        rate: Decimal,
    ) -> Result<Employee, AppError> {
        check_rate(rate)?;
        self.employees
            .update_commission_rate(company_id, employee_id, rate)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Funcionário".to_string()))
    }

    // --- PORTAL DO VENDEDOR ---

    pub async fn seller_quotes(&self, seller: &Employee, status: Option<QuoteStatus>) -> Result<Vec<Quote>, AppError> {
        let filter = QuoteFilter {
            status,
            seller_id: Some(seller.id),
        };
        self.quotes.list(seller.company_id, &filter).await
    }

    pub async fn seller_commissions(&self, seller: &Employee) -> Result<Vec<Payable>, AppError> {
        let filter = PayableFilter {
            category: Some(COMMISSION_CATEGORY.to_string()),
            seller_id: Some(seller.id),
        };
        self.finance.list_payables(seller.company_id, &filter).await
    }
}

fn check_rate(rate: Decimal) -> Result<(), AppError> {
    if rate.is_sign_negative() || rate > Decimal::ONE_HUNDRED {
        return Err(AppError::CommissionComputation(format!(
            "percentual de comissão fora do intervalo 0-100: {}",
            rate
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Repositories;
    use crate::models::quotes::NewQuote;
    use crate::services::quote_service::QuoteService;

    fn service(repos: &Repositories) -> SellerService {
        SellerService::new(
            repos.employees.clone(),
            repos.quotes.clone(),
            repos.finance.clone(),
            4,
        )
    }

    fn quote_for(company_id: Uuid, seller_id: Option<Uuid>) -> NewQuote {
        NewQuote {
            company_id,
            seller_id,
            client_name: "Cliente".into(),
            client_contact: None,
            description: None,
            items: vec![],
            practiced_price: Decimal::new(2000, 0),
            breakdown: None,
            validity_days: 10,
        }
    }

    #[tokio::test]
    async fn test_password_is_hashed() {
        let repos = Repositories::in_memory();
        let sellers = service(&repos);
        let employee = sellers
            .create_employee(Uuid::new_v4(), "João", "Vendedor", Decimal::new(5, 0), Some("joao"), Some("senha123"))
            .await
            .unwrap();

        let stored = employee.password_hash.unwrap();
        assert_ne!(stored, "senha123");
        assert!(bcrypt::verify("senha123", &stored).unwrap());
    }

    #[tokio::test]
    async fn test_rate_out_of_range_is_rejected() {
        let repos = Repositories::in_memory();
        let sellers = service(&repos);
        let result = sellers
            .create_employee(Uuid::new_v4(), "João", "Vendedor", Decimal::new(101, 0), None, None)
            .await;
        assert!(matches!(result, Err(AppError::CommissionComputation(_))));
    }

    #[tokio::test]
    async fn test_seller_sees_only_own_quotes_and_commissions() {
        let repos = Repositories::in_memory();
        let sellers = service(&repos);
        let quotes = QuoteService::new(repos.quotes.clone(), repos.employees.clone());
        let company_id = Uuid::new_v4();

        let joao = sellers
            .create_employee(company_id, "João", "Vendedor", Decimal::new(10, 0), None, None)
            .await
            .unwrap();
        let ana = sellers
            .create_employee(company_id, "Ana", "Vendedor", Decimal::new(5, 0), None, None)
            .await
            .unwrap();

        let mine = quotes.create_quote(quote_for(company_id, Some(joao.id))).await.unwrap();
        let theirs = quotes.create_quote(quote_for(company_id, Some(ana.id))).await.unwrap();
        quotes.create_quote(quote_for(company_id, None)).await.unwrap();

        quotes.change_status(company_id, mine.id, QuoteStatus::Approved).await.unwrap();
        quotes.change_status(company_id, theirs.id, QuoteStatus::Approved).await.unwrap();

        let own_quotes = sellers.seller_quotes(&joao, None).await.unwrap();
        assert_eq!(own_quotes.len(), 1);
        assert_eq!(own_quotes[0].id, mine.id);

        let own_commissions = sellers.seller_commissions(&joao).await.unwrap();
        assert_eq!(own_commissions.len(), 1);
        assert_eq!(own_commissions[0].amount, Decimal::new(200, 0));
        assert_eq!(own_commissions[0].quote_id, Some(mine.id));
    }
}

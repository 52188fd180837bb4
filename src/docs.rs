// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::seller_login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::update_settings,

        // --- Quotes ---
        handlers::quotes::create_quote,
        handlers::quotes::list_quotes,
        handlers::quotes::get_quote,
        handlers::quotes::update_quote,
        handlers::quotes::delete_quote,
        handlers::quotes::change_status,
        handlers::quotes::quote_pdf,

        // --- Finance ---
        handlers::finance::create_category,
        handlers::finance::list_categories,
        handlers::finance::update_category,
        handlers::finance::delete_category,
        handlers::finance::list_payables,
        handlers::finance::create_payable,
        handlers::finance::pay_payable,
        handlers::finance::create_transaction,
        handlers::finance::list_transactions,
        handlers::finance::monthly_summary,
        handlers::finance::migrate_categories,

        // --- Employees ---
        handlers::sellers::create_employee,
        handlers::sellers::list_employees,
        handlers::sellers::update_commission_rate,

        // --- Seller Portal ---
        handlers::sellers::my_quotes,
        handlers::sellers::create_my_quote,
        handlers::sellers::my_commissions,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Company,
            models::auth::RegisterCompanyPayload,
            models::auth::LoginCompanyPayload,
            models::auth::UpdateCompanySettings,
            models::auth::AuthResponse,
            handlers::auth::SellerLoginPayload,

            // --- Quotes ---
            models::quotes::QuoteStatus,
            models::quotes::QuoteItemKind,
            models::quotes::QuoteItem,
            models::quotes::QuoteBreakdown,
            models::quotes::Quote,
            models::quotes::StatusChange,
            handlers::quotes::QuotePayload,
            handlers::quotes::ChangeStatusPayload,

            // --- Finance ---
            models::finance::AccountGroup,
            models::finance::PayableStatus,
            models::finance::TransactionKind,
            models::finance::ExpenseCategory,
            models::finance::Payable,
            models::finance::Transaction,
            models::finance::MonthlySummary,
            models::finance::MigrationReport,
            handlers::finance::CreateCategoryPayload,
            handlers::finance::UpdateCategoryPayload,
            handlers::finance::CreatePayablePayload,
            handlers::finance::CreateTransactionPayload,

            // --- Employees ---
            models::sellers::Employee,
            handlers::sellers::CreateEmployeePayload,
            handlers::sellers::UpdateCommissionRatePayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados da Empresa"),
        (name = "Quotes", description = "Orçamentos, Aprovação e PDF"),
        (name = "Finance", description = "Plano de Contas, Contas a Pagar e Lançamentos"),
        (name = "Employees", description = "Funcionários e Percentual de Comissão"),
        (name = "Seller Portal", description = "Portal do Vendedor")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

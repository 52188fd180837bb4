// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Etiqueta das contas a pagar geradas pela aprovação de orçamentos.
pub const COMMISSION_CATEGORY: &str = "Comissão";

// --- Enums (Mapeando o Postgres) ---

// Grupo do Plano de Contas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "account_group", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountGroup {
    DiretaObra,       // Custo direto da obra (fora da base do markup)
    Fixa,             // Despesa fixa
    VariavelIndireta, // Despesa variável indireta
}

impl AccountGroup {
    /// Regra padrão de exclusão da base do markup para o grupo.
    pub fn excluded_from_markup(&self) -> bool {
        matches!(self, AccountGroup::DiretaObra)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payable_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayableStatus {
    Pending, // Aberto
    Paid,    // Quitado
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Income,  // Receita
    Expense, // Despesa
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseCategory {
    pub id: Uuid,

    #[schema(ignore)]
    pub company_id: Uuid,

    #[schema(example = "Material de construção")]
    pub name: String,

    pub account_group: AccountGroup,

    #[schema(example = true)]
    pub excluded_from_markup: bool,

    pub created_at: DateTime<Utc>,
}

// Conta a pagar
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payable {
    pub id: Uuid,

    #[schema(ignore)]
    pub company_id: Uuid,

    #[schema(example = "Comissão")]
    pub category: String,

    #[schema(example = "Comissão orçamento #42")]
    pub description: String,

    #[schema(example = "500.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2024-04-14")]
    pub due_date: NaiveDate,

    pub status: PayableStatus,

    pub seller_id: Option<Uuid>,
    pub quote_id: Option<Uuid>,

    // Base de cálculo da comissão (só nas comissões)
    #[schema(example = "10000.00")]
    pub services_base: Option<Decimal>,
    #[schema(example = "4000.00")]
    pub materials_excluded: Option<Decimal>,

    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPayable {
    pub company_id: Uuid,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub seller_id: Option<Uuid>,
    pub quote_id: Option<Uuid>,
    pub services_base: Option<Decimal>,
    pub materials_excluded: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PayableFilter {
    /// Etiqueta da conta (ex: "Comissão")
    pub category: Option<String>,
    pub seller_id: Option<Uuid>,
}

// Lançamento financeiro. Os antigos só têm `category` em texto livre.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,

    #[schema(ignore)]
    pub company_id: Uuid,

    #[schema(example = "Compra de cimento")]
    pub description: String,

    #[schema(example = "850.00")]
    pub amount: Decimal,

    pub kind: TransactionKind,

    #[schema(example = "Material")]
    pub category: String,

    #[schema(example = "2024-03-15")]
    pub date: String,

    // Vínculo com o Plano de Contas (cópias desnormalizadas)
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub account_group: Option<AccountGroup>,
    pub excluded_from_markup: Option<bool>,

    #[schema(example = "2024-03")]
    pub competence: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub company_id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub date: String,
    pub link: CategoryLink,
}

/// Tudo o que um lançamento precisa para ficar vinculado ao Plano de Contas.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryLink {
    pub category_id: Uuid,
    pub category_name: String,
    pub account_group: AccountGroup,
    pub excluded_from_markup: bool,
    pub competence: String,
}

impl CategoryLink {
    pub fn new(category: &ExpenseCategory, competence: String) -> Self {
        Self {
            category_id: category.id,
            category_name: category.name.clone(),
            account_group: category.account_group,
            excluded_from_markup: category.excluded_from_markup,
            competence,
        }
    }
}

// Resumo mensal (DRE simplificado)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    #[schema(example = "2024-03")]
    pub competence: String,
    pub income: Decimal,
    pub direct_costs: Decimal,
    pub fixed_expenses: Decimal,
    pub variable_expenses: Decimal,
    // Receita menos todas as despesas
    pub net_profit: Decimal,
}

/// Contagem final da migração de categorias.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub migrated: usize,
    pub skipped: usize,
    pub errors: usize,
}

// src/models/sellers.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Categoria de funcionário que recebe comissão e acessa o portal do vendedor.
pub const SELLER_CATEGORY: &str = "Vendedor";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,

    #[schema(ignore)]
    pub company_id: Uuid,

    #[schema(example = "João Pereira")]
    pub name: String,

    #[schema(example = "Vendedor")]
    pub category: String,

    // Percentual (ex: 5 = 5%)
    #[schema(example = "5.00")]
    pub commission_rate: Decimal,

    #[schema(example = "joao.vendas")]
    pub login: Option<String>,

    #[serde(skip)]
    #[schema(ignore)]
    pub password_hash: Option<String>,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

impl Employee {
    pub fn is_seller(&self) -> bool {
        self.category.trim().eq_ignore_ascii_case(SELLER_CATEGORY)
    }
}

// Dados já validados para o repositório
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub company_id: Uuid,
    pub name: String,
    pub category: String,
    pub commission_rate: Decimal,
    pub login: Option<String>,
    pub password_hash: Option<String>,
}

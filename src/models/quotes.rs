// src/models/quotes.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::common::{error::AppError, money::approx_eq};
use crate::models::finance::Payable;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "quote_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
    Pending,  // Aguardando o cliente
    Approved, // Aprovado (gera comissão)
    Rejected, // Recusado
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "PENDING",
            QuoteStatus::Approved => "APPROVED",
            QuoteStatus::Rejected => "REJECTED",
        }
    }

    /// Aprovado e recusado não mudam mais.
    pub fn is_terminal(&self) -> bool {
        matches!(self, QuoteStatus::Approved | QuoteStatus::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteItemKind {
    Service,
    Material,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    #[schema(example = "Assentamento de piso")]
    pub description: String,
    #[schema(example = "40")]
    pub quantity: Decimal,
    #[schema(example = "35.00")]
    pub unit_price: Decimal,
    pub kind: QuoteItemKind,
}

impl QuoteItem {
    pub fn total(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// Separação do preço entre serviços e materiais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBreakdown {
    #[schema(example = "10000.00")]
    pub services_total: Decimal,
    #[schema(example = "4000.00")]
    pub materials_total: Decimal,
}

impl QuoteBreakdown {
    /// Os subtotais não podem ser negativos e precisam fechar com o preço praticado.
    pub fn validate_against(&self, practiced_price: Decimal) -> Result<(), AppError> {
        if self.services_total.is_sign_negative() || self.materials_total.is_sign_negative() {
            return Err(AppError::InvalidBreakdown(
                "subtotais não podem ser negativos".to_string(),
            ));
        }
        let sum = self.services_total + self.materials_total;
        if !approx_eq(sum, practiced_price) {
            return Err(AppError::InvalidBreakdown(format!(
                "serviços + materiais ({}) diferente do preço praticado ({})",
                sum, practiced_price
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: Uuid,

    #[schema(ignore)]
    pub company_id: Uuid,

    #[schema(example = 42)]
    pub number: i32,

    pub seller_id: Option<Uuid>,

    #[schema(example = "Maria Souza")]
    pub client_name: String,

    #[schema(example = "(11) 98888-7777")]
    pub client_contact: Option<String>,

    #[schema(example = "Reforma do banheiro social")]
    pub description: Option<String>,

    #[schema(value_type = Vec<QuoteItem>)]
    pub items: Json<Vec<QuoteItem>>,

    #[schema(example = "14000.00")]
    pub practiced_price: Decimal,

    #[schema(example = "10000.00")]
    pub services_total: Option<Decimal>,

    #[schema(example = "4000.00")]
    pub materials_total: Option<Decimal>,

    pub status: QuoteStatus,

    #[schema(example = 15)]
    pub validity_days: i32,

    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// A composição só existe quando os dois subtotais foram gravados.
    pub fn breakdown(&self) -> Option<QuoteBreakdown> {
        match (self.services_total, self.materials_total) {
            (Some(services_total), Some(materials_total)) => Some(QuoteBreakdown {
                services_total,
                materials_total,
            }),
            _ => None,
        }
    }
}

// Dados já validados para criação
#[derive(Debug, Clone)]
pub struct NewQuote {
    pub company_id: Uuid,
    pub seller_id: Option<Uuid>,
    pub client_name: String,
    pub client_contact: Option<String>,
    pub description: Option<String>,
    pub items: Vec<QuoteItem>,
    pub practiced_price: Decimal,
    pub breakdown: Option<QuoteBreakdown>,
    pub validity_days: i32,
}

// Alteração completa de um orçamento pendente
#[derive(Debug, Clone)]
pub struct QuoteChanges {
    pub seller_id: Option<Uuid>,
    pub client_name: String,
    pub client_contact: Option<String>,
    pub description: Option<String>,
    pub items: Vec<QuoteItem>,
    pub practiced_price: Decimal,
    pub breakdown: Option<QuoteBreakdown>,
    pub validity_days: i32,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct QuoteFilter {
    pub status: Option<QuoteStatus>,
    pub seller_id: Option<Uuid>,
}

/// Resultado de uma mudança de status (com a comissão gerada, se houver).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub quote: Quote,
    pub commission: Option<Payable>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_breakdown_must_match_price() {
        let breakdown = QuoteBreakdown {
            services_total: d("10000"),
            materials_total: d("4000"),
        };
        assert!(breakdown.validate_against(d("14000.00")).is_ok());
        assert!(breakdown.validate_against(d("14000.01")).is_ok());
        assert!(matches!(
            breakdown.validate_against(d("15000")),
            Err(AppError::InvalidBreakdown(_))
        ));
    }

    #[test]
    fn test_breakdown_rejects_negative_totals() {
        let breakdown = QuoteBreakdown {
            services_total: d("-10"),
            materials_total: d("110"),
        };
        assert!(breakdown.validate_against(d("100")).is_err());
    }

    #[test]
    fn test_terminal_status() {
        assert!(!QuoteStatus::Pending.is_terminal());
        assert!(QuoteStatus::Approved.is_terminal());
        assert!(QuoteStatus::Rejected.is_terminal());
    }
}

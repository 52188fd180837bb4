// src/services/commission.rs

//! Cálculo da comissão do vendedor na aprovação de um orçamento.
//!
//! A comissão incide só sobre a parte de serviços. Quando o orçamento não
//! tem composição, o preço praticado inteiro é tratado como serviço.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use crate::{
    common::{error::AppError, money::round_currency},
    models::{
        finance::{NewPayable, COMMISSION_CATEGORY},
        quotes::{Quote, QuoteBreakdown},
        sellers::Employee,
    },
};

/// Prazo de pagamento da comissão, contado da aprovação.
pub const COMMISSION_DUE_DAYS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionBases {
    pub services_base: Decimal,
    pub materials_excluded: Decimal,
}

pub fn split_bases(practiced_price: Decimal, breakdown: Option<QuoteBreakdown>) -> CommissionBases {
    match breakdown {
        Some(b) => CommissionBases {
            services_base: b.services_total,
            materials_excluded: b.materials_total,
        },
        None => CommissionBases {
            services_base: practiced_price,
            materials_excluded: Decimal::ZERO,
        },
    }
}

/// `services_base * rate / 100`, arredondado em centavos.
pub fn calculate_commission(services_base: Decimal, rate: Decimal) -> Result<Decimal, AppError> {
    if rate.is_sign_negative() || rate > Decimal::ONE_HUNDRED {
        return Err(AppError::CommissionComputation(format!(
            "percentual de comissão fora do intervalo 0-100: {}",
            rate
        )));
    }
    if services_base.is_sign_negative() && !services_base.is_zero() {
        return Err(AppError::CommissionComputation(format!(
            "base de serviços negativa: {}",
            services_base
        )));
    }

    let raw = services_base
        .checked_mul(rate)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| AppError::CommissionComputation("estouro no cálculo".to_string()))?;

    Ok(round_currency(raw))
}

/// Monta a conta a pagar da comissão. `None` quando o orçamento não tem vendedor.
pub fn allocate(
    quote: &Quote,
    seller: Option<&Employee>,
    approved_on: NaiveDate,
) -> Result<Option<NewPayable>, AppError> {
    let Some(seller) = seller else {
        return Ok(None);
    };

    let bases = split_bases(quote.practiced_price, quote.breakdown());
    let amount = calculate_commission(bases.services_base, seller.commission_rate)?;

    let due_date = approved_on
        .checked_add_days(Days::new(COMMISSION_DUE_DAYS))
        .unwrap_or(approved_on);

    Ok(Some(NewPayable {
        company_id: quote.company_id,
        category: COMMISSION_CATEGORY.to_string(),
        description: format!("Comissão orçamento #{} - {}", quote.number, seller.name),
        amount,
        due_date,
        seller_id: Some(seller.id),
        quote_id: Some(quote.id),
        services_base: Some(bases.services_base),
        materials_excluded: Some(bases.materials_excluded),
    }))
}

// src/common/money.rs

use rust_decimal::{Decimal, RoundingStrategy};

/// Casas decimais da moeda (centavos).
pub const CURRENCY_SCALE: u32 = 2;

/// Arredondamento comercial para centavos (0,005 sobe).
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Tolerância de um centavo entre dois valores monetários.
pub fn approx_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= Decimal::new(1, CURRENCY_SCALE)
}

/// Formata no padrão brasileiro: `R$ 1.234,56`.
pub fn format_brl(value: Decimal) -> String {
    let rounded = round_currency(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-R$ {},{}", grouped, frac_part)
    } else {
        format!("R$ {},{}", grouped, frac_part)
    }
}

// src/common/validation.rs

use rust_decimal::Decimal;
use validator::ValidationError;

// Validações customizadas usadas pelos payloads (`#[validate(custom(...))]`)

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_percentage(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() || *val > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.add_param("max".into(), &100.0);
        err.message = Some("O percentual deve estar entre 0 e 100.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_bounds() {
        assert!(validate_percentage(&Decimal::ZERO).is_ok());
        assert!(validate_percentage(&Decimal::ONE_HUNDRED).is_ok());
        assert!(validate_percentage(&Decimal::new(1001, 1)).is_err());
        assert!(validate_percentage(&Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn test_not_negative() {
        assert!(validate_not_negative(&Decimal::new(5, 0)).is_ok());
        assert!(validate_not_negative(&Decimal::new(-5, 2)).is_err());
    }
}

// src/models/validation.rs

use rust_decimal::Decimal;
use validator::ValidationError;

/// Teto de qualquer valor monetário ou quantidade aceito na entrada (10^15).
pub fn max_amount() -> Decimal {
    Decimal::from(1_000_000_000_000_000_i64)
}

/// Valores monetários nunca podem ser negativos nem passar de `max_amount()`.
pub fn amount_in_range(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("negative_amount");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    if *value > max_amount() {
        let mut err = ValidationError::new("amount_too_large");
        err.message = Some("O valor excede o limite permitido.".into());
        return Err(err);
    }
    Ok(())
}

/// Percentuais de desconto, imposto e comissão ficam entre 0 e 100.
pub fn percentage(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("out_of_range");
        err.message = Some("O percentual deve estar entre 0 e 100.".into());
        return Err(err);
    }
    Ok(())
}

/// Probabilidade e progresso são "clampados", nunca rejeitados.
pub fn clamp_percent(value: i32) -> u8 {
    value.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_values_inside_bounds() {
        assert_eq!(clamp_percent(-5), 0);
        assert_eq!(clamp_percent(55), 55);
        assert_eq!(clamp_percent(140), 100);
    }

    #[test]
    fn money_and_percent_rules() {
        assert!(amount_in_range(&Decimal::ZERO).is_ok());
        assert!(amount_in_range(&Decimal::new(-1, 2)).is_err());
        assert!(amount_in_range(&max_amount()).is_ok());
        assert!(amount_in_range(&(max_amount() + Decimal::ONE)).is_err());
        assert!(percentage(&Decimal::from(16)).is_ok());
        assert!(percentage(&Decimal::from(101)).is_err());
    }
}

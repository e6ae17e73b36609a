// src/common/validation.rs

use rust_decimal::Decimal;
use validator::ValidationError;

// Maior valor que cabe em NUMERIC(14, 2)
pub const MAX_MONEY: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);
pub const MONEY_SCALE: u32 = 2;

fn too_many_decimals(val: &Decimal) -> Option<ValidationError> {
    if val.normalize().scale() > MONEY_SCALE {
        let mut err = ValidationError::new("scale");
        err.add_param("max".into(), &MONEY_SCALE);
        err.message = Some("Use no máximo 2 casas decimais.".into());
        return Some(err);
    }
    None
}

/// Valor monetário: 0 ..= 999.999.999.999,99 com até 2 casas.
pub fn validate_money(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    if *val > MAX_MONEY {
        let mut err = ValidationError::new("range");
        err.add_param("max".into(), &"999999999999.99");
        err.message = Some("O valor máximo é 999.999.999.999,99.".into());
        return Err(err);
    }
    match too_many_decimals(val) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

pub fn validate_percentage(val: &Decimal) -> Result<(), ValidationError> {
    if let Some(err) = too_many_decimals(val) {
        return Err(err);
    }
    if val.is_sign_negative() && !val.is_zero() || *val > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.add_param("max".into(), &100.0);
        err.message = Some("A taxa de administração deve estar entre 0 e 100%.".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Campo obrigatório.".into());
        return Err(err);
    }
    Ok(())
}

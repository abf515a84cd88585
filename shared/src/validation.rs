//! Validation utilities for lot and sale entry

use rust_decimal::Decimal;
use validator::Validate;

use crate::models::{Lot, LotInput, SaleInput};

// ============================================================================
// Money
// ============================================================================

/// Largest value a `NUMERIC(12, 2)` money column holds
pub const MAX_MONEY: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Validate an acquisition cost
pub fn validate_cost(cost: Decimal) -> Result<(), &'static str> {
    if cost < Decimal::ZERO {
        return Err("Cost cannot be negative");
    }
    if cost > MAX_MONEY {
        return Err("Cost is too large");
    }
    Ok(())
}

/// Validate a sale amount
pub fn validate_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Sale amount cannot be negative");
    }
    if amount > MAX_MONEY {
        return Err("Sale amount is too large");
    }
    Ok(())
}

// ============================================================================
// Lots
// ============================================================================

/// Validate a lot code (trimmed, 1-50 chars, no control characters)
pub fn validate_lot_code(code: &str) -> Result<(), &'static str> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err("Lot code is required");
    }
    if trimmed.chars().count() > 50 {
        return Err("Lot code must be at most 50 characters");
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err("Lot code contains invalid characters");
    }
    Ok(())
}

/// Check that no other lot already uses `code`.
///
/// `editing` is the id of the lot being updated, which may keep its own code.
pub fn validate_lot_code_unique(
    code: &str,
    lots: &[Lot],
    editing: Option<&str>,
) -> Result<(), &'static str> {
    let code = code.trim();
    let taken = lots
        .iter()
        .filter(|lot| Some(lot.id.as_str()) != editing)
        .any(|lot| lot.lot_code.trim().eq_ignore_ascii_case(code));
    if taken {
        return Err("Lot code already in use");
    }
    Ok(())
}

/// Full validation of a lot form. Returns the first failing field and message.
pub fn validate_lot_input(input: &LotInput) -> Result<(), (&'static str, String)> {
    if let Err(errors) = input.validate() {
        let (field, message) = first_error(&errors);
        return Err((field, message));
    }
    validate_cost(input.cost).map_err(|m| ("cost", m.to_string()))?;
    validate_lot_code(&input.lot_code).map_err(|m| ("lotCode", m.to_string()))?;
    if input.brand.trim().is_empty() {
        return Err(("brand", "Brand is required".to_string()));
    }
    if input.model.trim().is_empty() {
        return Err(("model", "Model is required".to_string()));
    }
    Ok(())
}

// ============================================================================
// Sales
// ============================================================================

/// A sale must reference a lot chosen in the form
pub fn validate_lot_selected(lot_id: &str) -> Result<(), &'static str> {
    if lot_id.trim().is_empty() {
        return Err("Select a lot for this sale");
    }
    Ok(())
}

/// Full validation of a sale form. Returns the first failing field and message.
pub fn validate_sale_input(input: &SaleInput) -> Result<(), (&'static str, String)> {
    validate_lot_selected(&input.lot_id).map_err(|m| ("lotId", m.to_string()))?;
    if let Err(errors) = input.validate() {
        let (field, message) = first_error(&errors);
        return Err((field, message));
    }
    if input.part_name.trim().is_empty() {
        return Err(("partName", "Part name is required".to_string()));
    }
    validate_amount(input.amount).map_err(|m| ("amount", m.to_string()))?;
    Ok(())
}

fn first_error(errors: &validator::ValidationErrors) -> (&'static str, String) {
    errors
        .field_errors()
        .into_iter()
        .min_by_key(|(field, _)| (form_position(field), *field))
        .map(|(field, errs)| {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| format!("Invalid {}", field));
            (wire_name(field), message)
        })
        .unwrap_or(("input", "Invalid input".to_string()))
}

/// Order in which the forms list their fields
fn form_position(field: &str) -> usize {
    const ORDER: [&str; 7] = [
        "lot_id", "brand", "model", "year", "lot_code", "part_name", "amount",
    ];
    ORDER.iter().position(|f| *f == field).unwrap_or(ORDER.len())
}

/// Field names as they appear in request bodies
fn wire_name(field: &'static str) -> &'static str {
    match field {
        "lot_code" => "lotCode",
        "part_name" => "partName",
        "lot_id" => "lotId",
        other => other,
    }
}

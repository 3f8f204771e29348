//! Currency formatting

use rust_decimal::Decimal;
use walletweb_config::{CurrencyConfig, SymbolPosition};
use walletweb_utils::group_digits;

/// Format an amount the way the configured locale shows money,
/// e.g. `$ 1.234,50` for es-AR
pub fn format_currency(amount: Decimal, currency: &CurrencyConfig) -> String {
    let places = currency.decimal_places;
    let rounded = amount.round_dp(places).abs();
    let text = format!("{:.*}", places as usize, rounded);
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let mut number = group_digits(int_part, &currency.thousands_separator);
    if let Some(frac) = frac_part {
        number.push_str(&currency.decimal_separator);
        number.push_str(frac);
    }

    let sign = if amount.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    match currency.symbol_position {
        SymbolPosition::Before => format!("{}{} {}", sign, currency.symbol, number),
        SymbolPosition::After => format!("{}{} {}", sign, number, currency.symbol),
    }
}

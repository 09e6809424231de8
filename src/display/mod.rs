//! Display helpers for rendering feed state

mod dashboard;

pub use dashboard::render_dashboard;

use rust_decimal::{Decimal, RoundingStrategy};

/// Format a USD amount: `$50,000.50`, `-$3.46`
pub fn format_price(price: Decimal) -> String {
    let rounded = price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{:.2}", rounded.abs());
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}${}", sign, group_thousands(&digits))
}

/// Format a 24h change with explicit sign: `+2.34%`, `-1.50%`
pub fn format_change(change: Decimal) -> String {
    let rounded = change
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if change >= Decimal::ZERO { '+' } else { '-' };
    format!("{}{:.2}%", sign, rounded)
}

/// Glyph for a known asset id, `₿` otherwise
pub fn crypto_icon(id: &str) -> &'static str {
    match id {
        "bitcoin" => "₿",
        "ethereum" => "Ξ",
        "solana" => "◎",
        _ => "₿",
    }
}

/// Direction arrow for a 24h change
pub fn trend_arrow(change: Decimal) -> &'static str {
    if change >= Decimal::ZERO {
        "↗"
    } else {
        "↘"
    }
}

fn group_thousands(digits: &str) -> String {
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if frac_part.is_empty() {
        grouped
    } else {
        format!("{}.{}", grouped, frac_part)
    }
}

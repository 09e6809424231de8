//! Plain-text dashboard rendering

use super::{crypto_icon, format_change, format_price, trend_arrow};
use crate::feed::DashboardState;
use chrono::Local;
use std::fmt::Write;

/// Render the full dashboard for one state
pub fn render_dashboard(state: &DashboardState, update_interval_secs: u64) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Crypto Price Tracker  [{}]", state.status);

    if let Some(error) = &state.error {
        let _ = writeln!(out, "⚠ {}", error);
    }

    if state.is_loading() {
        let _ = writeln!(out, "Waiting for price data...");
    } else {
        for (id, record) in state.prices.iter() {
            let _ = writeln!(
                out,
                "{} {:<10} {:<6} {:>16} {} {:>8}",
                crypto_icon(id),
                record.name,
                record.symbol,
                format_price(record.price),
                trend_arrow(record.change_24h),
                format_change(record.change_24h),
            );
        }
    }

    if let Some(ts) = state.last_update {
        let _ = writeln!(
            out,
            "Last updated: {}",
            ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        );
        let _ = writeln!(out, "Next update in ~{} seconds", update_interval_secs);
    }

    out
}

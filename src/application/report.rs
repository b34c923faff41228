//! Plain-text rendering of the list and detail views

use std::fmt::Write;

use super::pool_detail::{ChartSeries, DetailState, MetricBar, PoolDetail};
use super::pool_list::{ListPage, ListState};
use crate::domain::pool::SortDirection;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const BAR_WIDTH: usize = 30;

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

pub fn render_list(state: &ListState) -> String {
    match state {
        ListState::Loading => "Loading...\n".to_string(),
        ListState::Failed { error } => format!("Failed to load data\n  {}\n", error),
        ListState::Ready(page) => render_list_page(page),
    }
}

fn render_list_page(page: &ListPage) -> String {
    let mut out = String::new();

    if let Some(error) = &page.stale_error {
        let _ = writeln!(out, "⚠️  Failed to load data, showing last snapshot ({})", error);
    }

    let _ = writeln!(
        out,
        "{:>3}  {:<16} {:<18} {:<10} {:>10} {:>11} {:>11} {:>7}",
        "#", "TOKEN", "PROJECT", "CHAIN", "APY", "AVG RETURN", "VOLATILITY", "SHARPE"
    );
    let _ = writeln!(out, "{}", "─".repeat(94));

    for (i, row) in page.rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:<16} {:<18} {:<10} {:>10} {:>11} {:>11} {:>7}{}",
            i + 1,
            truncate(&row.symbol, 16),
            truncate(&row.project, 18),
            truncate(&row.chain, 10),
            row.apy,
            row.mu,
            row.sigma,
            row.sharpe_ratio,
            if row.low_sharpe { " ⚠" } else { "" }
        );
    }

    if page.rows.is_empty() {
        let _ = writeln!(out, "  No pools match the current filters");
    }

    let sort = match page.query.sort {
        Some(spec) => format!(
            "{} {}",
            spec.key,
            match spec.direction {
                SortDirection::Ascending => "asc",
                SortDirection::Descending => "desc",
            }
        ),
        None => "none".to_string(),
    };
    let filters = &page.query.filters;
    let _ = writeln!(
        out,
        "\nPage {} of {} · {} pools · sort: {} · project: '{}' chain: '{}' token: '{}'",
        page.query.page,
        page.page_count,
        page.total_matches,
        sort,
        filters.project,
        filters.chain,
        filters.token
    );
    out
}

pub fn render_detail(state: &DetailState) -> String {
    match state {
        DetailState::NoSelection => "Loading...\n".to_string(),
        DetailState::NotFound { pool_id } => format!("Pool data not found ({})\n", pool_id),
        DetailState::Ready(detail) => render_pool_detail(detail),
    }
}

fn render_pool_detail(detail: &PoolDetail) -> String {
    let mut out = String::new();
    let pool = &detail.pool;

    let _ = writeln!(out, "{} · {} · {}", pool.symbol, pool.project, pool.chain);
    if let Some(error) = &detail.store_error {
        let _ = writeln!(out, "⚠️  {}", error);
    }

    let _ = writeln!(out, "\nBasic Information");
    let _ = writeln!(out, "  Chain:          {}", pool.chain);
    let _ = writeln!(out, "  APY:            {}", detail.apy);
    let _ = writeln!(out, "  Average Return: {}", detail.mu);
    let _ = writeln!(out, "  Volatility:     {}", detail.sigma);
    let _ = writeln!(
        out,
        "  Sharpe Ratio:   {}{}",
        detail.sharpe_ratio,
        if detail.low_sharpe { "  ⚠ low risk-adjusted return" } else { "" }
    );

    let protocol = &detail.protocol;
    let _ = writeln!(out, "\nProtocol Details");
    let _ = writeln!(out, "  TVL:        {}", protocol.tvl);
    let _ = writeln!(out, "  Listed At:  {}", protocol.listed_at);
    let _ = writeln!(out, "  Audits:     {}", protocol.audits);
    let _ = writeln!(out, "  Hallmarks:  {}", protocol.hallmark_count);
    let _ = writeln!(out, "  Raises:     {}", protocol.raise_count);
    let _ = writeln!(out, "  Market Cap: {}", protocol.mcap);

    let _ = writeln!(out, "\nHallmarks");
    if protocol.hallmarks.is_empty() {
        let _ = writeln!(out, "  No hallmarks available");
    }
    for hallmark in &protocol.hallmarks {
        let _ = writeln!(out, "  • {}", hallmark);
    }

    if !protocol.raises.is_empty() {
        let _ = writeln!(out, "\nRaises");
        for raise in &protocol.raises {
            let _ = writeln!(
                out,
                "  • {} {} {}",
                raise.round.as_deref().unwrap_or("Round"),
                raise.amount.map(|m| format!("${}M", m)).unwrap_or_else(|| "undisclosed".to_string()),
                if raise.investors.is_empty() { String::new() } else { format!("({})", raise.investors.join(", ")) }
            );
        }
    }

    let _ = writeln!(out, "\nMetrics");
    out.push_str(&render_bars(&detail.comparison));

    let _ = writeln!(out, "\nHistory");
    if detail.history.loading {
        let _ = writeln!(out, "  Loading history...");
    } else if detail.history.is_empty() {
        let _ = writeln!(out, "  No history available");
    } else {
        out.push_str(&render_series(&detail.history.tvl, compact_usd));
        out.push_str(&render_series(&detail.history.apy, |v| format!("{:.2}%", v)));
    }

    out
}

fn render_bars(bars: &[MetricBar]) -> String {
    let max = bars.iter().map(|b| b.value.abs()).fold(0.0_f64, f64::max);
    let mut out = String::new();
    for bar in bars {
        let len = if max > 0.0 { ((bar.value.abs() / max) * BAR_WIDTH as f64).round() as usize } else { 0 };
        let _ = writeln!(out, "  {:<11} {:<width$} {}", bar.label, "█".repeat(len), bar.formatted, width = BAR_WIDTH);
    }
    out
}

fn compact_usd(value: f64) -> String {
    match value.abs() {
        v if v >= 1e9 => format!("${:.2}B", value / 1e9),
        v if v >= 1e6 => format!("${:.2}M", value / 1e6),
        v if v >= 1e3 => format!("${:.2}K", value / 1e3),
        _ => format!("${:.2}", value),
    }
}

pub fn sparkline(values: &[f64]) -> String {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    values
        .iter()
        .map(|v| {
            let level = if span > 0.0 { ((v - min) / span * 7.0).round() as usize } else { 0 };
            SPARK_LEVELS[level.min(7)]
        })
        .collect()
}

fn render_series(series: &ChartSeries, fmt_value: impl Fn(f64) -> String) -> String {
    let mut out = String::new();
    let (Some(first), Some(last)) = (series.points.first(), series.points.last()) else {
        let _ = writeln!(out, "  {}: no data", series.title);
        return out;
    };
    let values: Vec<f64> = series.points.iter().map(|p| p.value).collect();
    let _ = writeln!(out, "  {} over time ({} → {})", series.title, first.label, last.label);
    let _ = writeln!(out, "    {}", sparkline(&values));
    let _ = writeln!(out, "    {} → {}", fmt_value(first.value), fmt_value(last.value));
    out
}

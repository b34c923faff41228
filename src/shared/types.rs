//! Common types used across the application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Yield pool as shown by the dashboard.
///
/// `apy`, `mu` and `sigma` are percentage-scale numbers (12.5 means 12.5%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: String,
    pub symbol: String,
    pub project: String,
    pub chain: String,
    pub apy: f64,
    pub mu: f64,
    pub sigma: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sharpe_ratio: Option<f64>,
}

impl From<RawPool> for Pool {
    fn from(raw: RawPool) -> Self {
        Self {
            id: raw.pool,
            symbol: raw.symbol,
            project: raw.project,
            chain: raw.chain,
            apy: raw.apy.unwrap_or(0.0),
            mu: raw.mu.unwrap_or(0.0),
            sigma: raw.sigma.unwrap_or(0.0),
            volatility: None,
            sharpe_ratio: None,
        }
    }
}

/// Pool record as returned by the pools endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPool {
    pub pool: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub chain: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub apy: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub mu: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sigma: Option<f64>,
}

/// `{ "data": [...] }` response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: Vec<T>,
}

/// Fundraising round of a protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRaise")]
pub struct Raise {
    pub date: Option<i64>,
    pub amount: Option<f64>,
    pub round: Option<String>,
    pub investors: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRaise {
    #[serde(default, deserialize_with = "lenient_f64")]
    date: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    amount: Option<f64>,
    #[serde(default)]
    round: Option<String>,
    #[serde(default)]
    investors: Option<Vec<String>>,
    #[serde(default)]
    lead_investors: Option<Vec<String>>,
    #[serde(default)]
    other_investors: Option<Vec<String>>,
}

impl From<RawRaise> for Raise {
    fn from(raw: RawRaise) -> Self {
        let investors = match raw.investors {
            Some(investors) => investors,
            None => raw
                .lead_investors
                .unwrap_or_default()
                .into_iter()
                .chain(raw.other_investors.unwrap_or_default())
                .collect(),
        };
        Self {
            date: raw.date.map(|d| d as i64),
            amount: raw.amount,
            round: raw.round,
            investors,
        }
    }
}

/// Protocol metadata, keyed by project name in the data store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolData {
    #[serde(default, deserialize_with = "tvl_amount")]
    pub tvl: Option<f64>,
    /// Unix seconds
    #[serde(default, deserialize_with = "lenient_i64")]
    pub listed_at: Option<i64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub audits: Option<u32>,
    #[serde(default, deserialize_with = "hallmark_list")]
    pub hallmarks: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub raises: Vec<Raise>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub mcap: Option<f64>,
}

/// One sample of a pool's history series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolHistoryPoint {
    /// Unix seconds
    #[serde(default, deserialize_with = "history_timestamp")]
    pub timestamp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub apy: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub tvl_usd: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Number(f64),
    Text(String),
}

impl NumberLike {
    fn as_f64(&self) -> Option<f64> {
        match self {
            NumberLike::Number(n) => Some(*n),
            NumberLike::Text(s) => s.trim().parse().ok(),
        }
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberLike>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).filter(|v| v.is_finite()))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?.map(|v| v as i64))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?.filter(|v| *v >= 0.0).map(|v| v as u32))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
struct TvlSample {
    #[serde(rename = "totalLiquidityUSD")]
    total_liquidity_usd: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TvlField {
    Amount(f64),
    Series(Vec<TvlSample>),
}

/// Accepts either a plain amount or a `{date, totalLiquidityUSD}` series (latest sample wins).
fn tvl_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<TvlField>::deserialize(deserializer)?;
    Ok(match value {
        Some(TvlField::Amount(amount)) => Some(amount),
        Some(TvlField::Series(samples)) => samples.last().map(|s| s.total_liquidity_usd),
        None => None,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Hallmark {
    Text(String),
    Dated(f64, String),
}

fn hallmark_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let hallmarks = Option::<Vec<Hallmark>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(hallmarks
        .into_iter()
        .map(|h| match h {
            Hallmark::Text(text) => text,
            Hallmark::Dated(ts, text) => match DateTime::<Utc>::from_timestamp(ts as i64, 0) {
                Some(date) => format!("{}: {}", date.format("%Y-%m-%d"), text),
                None => text,
            },
        })
        .collect())
}

/// Unix seconds, or an RFC 3339 string as served by the yields API.
fn history_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberLike>::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberLike::Number(n)) => Some(n as i64),
        Some(NumberLike::Text(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.timestamp())
            .ok()
            .or_else(|| s.trim().parse::<i64>().ok()),
        None => None,
    })
}

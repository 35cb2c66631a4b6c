use crate::error::MarketDataError;
use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

pub const DEFAULT_CURRENCY: &str = "MYR";

static SYMBOL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9^][A-Za-z0-9.\-=^]{0,19}$").expect("symbol pattern is valid")
});

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Exchange listing for a user-facing ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerEntry {
    /// Exchange-qualified symbol understood by the market-data provider, e.g. `4197.KL`.
    pub symbol: String,
    /// Company name used in news queries.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Ticker → listing table (from JSON or YAML).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickerTable(pub BTreeMap<String, TickerEntry>);

/// A ticker after lookup, with every field a request needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTicker {
    pub ticker: String,
    pub symbol: String,
    pub display_name: String,
    pub currency: String,
}

impl Default for TickerTable {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            "SIME".to_string(),
            TickerEntry {
                symbol: "4197.KL".to_string(),
                name: Some("Sime Darby".to_string()),
                currency: default_currency(),
            },
        );
        Self(entries)
    }
}

impl TickerTable {
    /// Load a table from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "Loading ticker table");

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read ticker table {}", path.display()))?;

        let table: TickerTable = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML ticker table {}", path.display()))?,
            _ => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON ticker table {}", path.display()))?,
        };

        if table.0.is_empty() {
            anyhow::bail!("Ticker table {} has no entries", path.display());
        }
        for (ticker, entry) in &table.0 {
            if !SYMBOL_PATTERN.is_match(&entry.symbol) {
                anyhow::bail!("Ticker {} maps to invalid symbol '{}'", ticker, entry.symbol);
            }
        }

        tracing::info!(entries = table.0.len(), "Loaded ticker table");
        Ok(table)
    }

    pub fn get(&self, ticker: &str) -> Option<&TickerEntry> {
        self.0.get(ticker)
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Company name for news queries, or the raw ticker when unmapped.
    pub fn display_name(&self, ticker: &str) -> String {
        self.get(ticker)
            .and_then(|entry| entry.name.clone())
            .unwrap_or_else(|| ticker.to_string())
    }

    /// Look a ticker up; unknown tickers are used as the exchange symbol verbatim.
    pub fn resolve(&self, ticker: &str) -> Result<ResolvedTicker, MarketDataError> {
        let ticker = ticker.trim();
        let (symbol, currency) = match self.get(ticker) {
            Some(entry) => (entry.symbol.clone(), entry.currency.clone()),
            None => (ticker.to_string(), default_currency()),
        };

        if !SYMBOL_PATTERN.is_match(&symbol) {
            return Err(MarketDataError::InvalidSymbol(symbol));
        }

        Ok(ResolvedTicker {
            ticker: ticker.to_string(),
            display_name: self.display_name(ticker),
            symbol,
            currency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_table_maps_sime() {
        let table = TickerTable::default();
        let resolved = table.resolve("SIME").unwrap();
        assert_eq!(resolved.symbol, "4197.KL");
        assert_eq!(resolved.display_name, "Sime Darby");
        assert_eq!(resolved.currency, "MYR");
    }

    #[test]
    fn test_unknown_ticker_falls_back_to_raw_symbol() {
        let table = TickerTable::default();
        let resolved = table.resolve("1155.KL").unwrap();
        assert_eq!(resolved.symbol, "1155.KL");
        assert_eq!(resolved.display_name, "1155.KL");
        assert_eq!(table.display_name("MAYBANK"), "MAYBANK");
    }

    #[test]
    fn test_rejects_symbols_that_are_not_path_safe() {
        let table = TickerTable::default();
        assert!(matches!(
            table.resolve("../v7/quote"),
            Err(MarketDataError::InvalidSymbol(_))
        ));
        assert!(table.resolve("").is_err());
    }

    #[test]
    fn test_load_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("tickers.yaml");
        let mut file = fs::File::create(&yaml_path).unwrap();
        writeln!(file, "MAYBANK:\n  symbol: \"1155.KL\"\n  name: Malayan Banking").unwrap();
        let table = TickerTable::load(&yaml_path).unwrap();
        let entry = table.get("MAYBANK").unwrap();
        assert_eq!(entry.symbol, "1155.KL");
        assert_eq!(entry.currency, "MYR");

        let json_path = dir.path().join("tickers.json");
        fs::write(
            &json_path,
            r#"{"AAPL": {"symbol": "AAPL", "name": "Apple", "currency": "USD"}}"#,
        )
        .unwrap();
        let table = TickerTable::load(&json_path).unwrap();
        assert_eq!(table.resolve("AAPL").unwrap().currency, "USD");
    }

    #[test]
    fn test_load_rejects_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tickers.json");
        fs::write(&path, "{}").unwrap();
        assert!(TickerTable::load(&path).is_err());
    }
}

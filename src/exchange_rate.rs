use std::collections::{BTreeMap, HashMap};

use chrono::DateTime;

use crate::currency::{Currency, REPORTING};
use crate::live_quotes::LiveQuotes;

/// Rates of every known currency expressed against `base`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub base: Currency,
    pub rates: BTreeMap<Currency, f64>,
    pub timestamp: i64,
    pub date: String,
}

impl RateTable {
    pub fn from_quotes(quotes: &LiveQuotes, base: Currency) -> RateTable {
        let raw = get_quote_map(quotes);
        let timestamp = quotes.timestamp.unwrap_or(0);

        RateTable {
            base,
            rates: normalize(&raw, base),
            timestamp,
            date: display_date(timestamp, quotes.date.as_deref()),
        }
    }

    pub fn rate(&self, currency: Currency) -> f64 {
        self.rates.get(&currency).copied().unwrap_or(0.0)
    }
}

/// Maps provider keys (`USDEUR` or `EUR`) to the target currency.
/// Unknown keys are skipped.
pub fn get_quote_map(quotes: &LiveQuotes) -> HashMap<Currency, f64> {
    let mut map = HashMap::new();

    for (key, value) in quotes.quotes.iter().flatten() {
        let target = key.strip_prefix(REPORTING.code()).unwrap_or(key);
        if let Ok(currency) = target.parse::<Currency>() {
            map.insert(currency, *value);
        }
    }

    map
}

/// Re-anchors reporting-currency quotes on `base`.
///
/// A zero, negative or missing reporting->base quote turns every rate that
/// would divide by it into 0.0, and so does any division that overflows.
pub fn normalize(raw: &HashMap<Currency, f64>, base: Currency) -> BTreeMap<Currency, f64> {
    let quote = |c: Currency| {
        if c == REPORTING {
            1.0
        } else {
            raw.get(&c).copied().unwrap_or(0.0)
        }
    };

    if base == REPORTING {
        return Currency::ALL
            .into_iter()
            .map(|c| (c, finite_or_zero(quote(c))))
            .collect();
    }

    let anchor = quote(base);
    Currency::ALL
        .into_iter()
        .map(|c| {
            let rate = if c == base {
                1.0
            } else if anchor > 0.0 {
                finite_or_zero(quote(c) / anchor)
            } else {
                0.0
            };
            (c, rate)
        })
        .collect()
}

fn finite_or_zero(rate: f64) -> f64 {
    if rate.is_finite() { rate } else { 0.0 }
}

fn display_date(timestamp: i64, date: Option<&str>) -> String {
    if timestamp != 0 {
        if let Some(dt) = DateTime::from_timestamp(timestamp, 0) {
            return dt.format("%Y-%m-%d %H:%M:%S").to_string();
        }
    }
    date.map(str::to_string).unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(eur: f64, pen: f64) -> HashMap<Currency, f64> {
        HashMap::from([(Currency::Eur, eur), (Currency::Pen, pen)])
    }

    #[test]
    fn rate_to_self_is_exactly_one() {
        for base in Currency::ALL {
            let rates = normalize(&raw(0.9, 3.7), base);
            assert_eq!(rates[&base], 1.0, "base {base}");
            assert_eq!(rates.len(), Currency::ALL.len());
        }
    }

    #[test]
    fn usd_base_passes_quotes_through() {
        let rates = normalize(&raw(0.9, 3.7), Currency::Usd);
        assert_eq!(rates[&Currency::Eur], 0.9);
        assert_eq!(rates[&Currency::Pen], 3.7);
    }

    #[test]
    fn eur_base_inverts_and_crosses() {
        let rates = normalize(&raw(0.9, 3.7), Currency::Eur);
        assert_eq!(rates[&Currency::Usd], 1.0 / 0.9);
        assert_eq!(rates[&Currency::Pen], 3.7 / 0.9);
    }

    #[test]
    fn pen_base_inverts_and_crosses() {
        let rates = normalize(&raw(0.9, 3.7), Currency::Pen);
        assert_eq!(rates[&Currency::Usd], 1.0 / 3.7);
        assert_eq!(rates[&Currency::Eur], 0.9 / 3.7);
    }

    #[test]
    fn zero_anchor_yields_zero_rates() {
        let rates = normalize(&raw(0.0, 3.7), Currency::Eur);
        assert_eq!(rates[&Currency::Usd], 0.0);
        assert_eq!(rates[&Currency::Pen], 0.0);
        assert_eq!(rates[&Currency::Eur], 1.0);
    }

    #[test]
    fn missing_anchor_yields_zero_rates() {
        let only_eur = HashMap::from([(Currency::Eur, 0.9)]);
        let rates = normalize(&only_eur, Currency::Pen);
        assert_eq!(rates[&Currency::Usd], 0.0);
        assert_eq!(rates[&Currency::Eur], 0.0);

        let passthrough = normalize(&only_eur, Currency::Usd);
        assert_eq!(passthrough[&Currency::Pen], 0.0);
    }

    #[test]
    fn overflowing_division_yields_zero() {
        let rates = normalize(&raw(1e-320, 3.7), Currency::Eur);
        assert_eq!(rates[&Currency::Usd], 0.0);
        assert_eq!(rates[&Currency::Pen], 0.0);
        assert_eq!(rates[&Currency::Eur], 1.0);
        assert!(rates.values().all(|r| r.is_finite()));
    }

    #[test]
    fn quote_map_accepts_both_key_styles() {
        let quotes = LiveQuotes {
            success: true,
            quotes: Some(HashMap::from([
                ("USDEUR".to_string(), 0.9),
                ("PEN".to_string(), 3.7),
                ("USDGBP".to_string(), 0.8),
            ])),
            ..Default::default()
        };
        let map = get_quote_map(&quotes);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&Currency::Eur], 0.9);
        assert_eq!(map[&Currency::Pen], 3.7);
    }

    #[test]
    fn table_carries_display_date() {
        let quotes = LiveQuotes {
            success: true,
            timestamp: Some(1_700_000_000),
            quotes: Some(HashMap::from([("USDEUR".to_string(), 0.9)])),
            ..Default::default()
        };
        let table = RateTable::from_quotes(&quotes, Currency::Eur);
        assert_eq!(table.date, "2023-11-14 22:13:20");
        assert_eq!(table.rate(Currency::Eur), 1.0);

        let dated = LiveQuotes {
            date: Some("2024-05-02".to_string()),
            ..Default::default()
        };
        assert_eq!(RateTable::from_quotes(&dated, Currency::Usd).date, "2024-05-02");
        assert_eq!(RateTable::from_quotes(&LiveQuotes::default(), Currency::Usd).date, "N/A");
    }
}

use common::TickerInfo;
use std::fmt;
use std::str::FromStr;

use crate::error::MarketError;

/// The four equities the dashboard tracks.
///
/// Every per-ticker attribute (label, provider symbol, chart title) comes from
/// the single catalog in [`Ticker::entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Ticker {
    #[default]
    Tcs,
    Ril,
    IciciBank,
    BajajFinserv,
}

struct CatalogEntry {
    label: &'static str,
    symbol: &'static str,
    title: &'static str,
    slug: &'static str,
}

impl Ticker {
    /// Catalog order, which is also the selector order.
    pub const ALL: [Ticker; 4] = [
        Ticker::Tcs,
        Ticker::Ril,
        Ticker::IciciBank,
        Ticker::BajajFinserv,
    ];

    // "Bajaj finserv" has always been fetched from the Bajaj Finance listing.
    const fn entry(self) -> CatalogEntry {
        match self {
            Ticker::Tcs => CatalogEntry {
                label: "TCS",
                symbol: "TCS.NS",
                title: "TCS",
                slug: "tcs",
            },
            Ticker::Ril => CatalogEntry {
                label: "RIL",
                symbol: "RELIANCE.NS",
                title: "RIL",
                slug: "ril",
            },
            Ticker::IciciBank => CatalogEntry {
                label: "ICICI Bank",
                symbol: "ICICIBANK.NS",
                title: "ICICI Bank",
                slug: "icici-bank",
            },
            Ticker::BajajFinserv => CatalogEntry {
                label: "Bajaj finserv",
                symbol: "BAJFINANCE.NS",
                title: "Bajaj Finserv",
                slug: "bajaj-finserv",
            },
        }
    }

    pub const fn label(self) -> &'static str {
        self.entry().label
    }

    pub const fn symbol(self) -> &'static str {
        self.entry().symbol
    }

    pub const fn title(self) -> &'static str {
        self.entry().title
    }

    /// URL friendly form of the label.
    pub const fn slug(self) -> &'static str {
        self.entry().slug
    }

    pub fn info(self) -> TickerInfo {
        TickerInfo {
            label: self.label().to_string(),
            symbol: self.symbol().to_string(),
            title: self.title().to_string(),
        }
    }

    pub fn catalog() -> Vec<TickerInfo> {
        Self::ALL.iter().map(|t| t.info()).collect()
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts the label, the provider symbol or the slug, ignoring ASCII case.
impl FromStr for Ticker {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| {
                needle.eq_ignore_ascii_case(t.label())
                    || needle.eq_ignore_ascii_case(t.symbol())
                    || needle.eq_ignore_ascii_case(t.slug())
            })
            .ok_or_else(|| MarketError::UnknownTicker(s.to_string()))
    }
}

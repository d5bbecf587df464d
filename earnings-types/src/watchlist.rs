//! Watchlist membership, keyed by normalized ticker.
//!
//! Toggling is two-phase: the UI asks for a plan, performs the request, and
//! commits only once the backend call succeeded.

use std::collections::BTreeSet;

use crate::{normalize_ticker, WatchItem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchlistAction {
    Add(String),
    Remove(String),
}

impl WatchlistAction {
    pub fn ticker(&self) -> &str {
        match self {
            Self::Add(ticker) | Self::Remove(ticker) => ticker,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Watchlist {
    tickers: BTreeSet<String>,
}

impl Watchlist {
    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = WatchItem>,
    {
        Self {
            tickers: items
                .into_iter()
                .map(|item| normalize_ticker(&item.ticker))
                .filter(|ticker| !ticker.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.tickers.contains(&normalize_ticker(ticker))
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.tickers.iter().map(String::as_str)
    }

    /// What a click on `ticker` should do. `None` for a blank ticker.
    pub fn plan_toggle(&self, ticker: &str) -> Option<WatchlistAction> {
        let ticker = normalize_ticker(ticker);
        if ticker.is_empty() {
            return None;
        }
        if self.tickers.contains(&ticker) {
            Some(WatchlistAction::Remove(ticker))
        } else {
            Some(WatchlistAction::Add(ticker))
        }
    }

    pub fn commit(&mut self, action: &WatchlistAction) {
        match action {
            WatchlistAction::Add(ticker) => {
                self.tickers.insert(ticker.clone());
            }
            WatchlistAction::Remove(ticker) => {
                self.tickers.remove(ticker);
            }
        }
    }

    /// Apply the outcome of the backend call for `action`. Returns whether the
    /// set changed; a failed call leaves it as it was.
    pub fn settle<E>(&mut self, action: &WatchlistAction, result: &Result<(), E>) -> bool {
        if result.is_err() {
            return false;
        }
        self.commit(action);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(ticker: &str) -> WatchItem {
        WatchItem {
            id: format!("w-{ticker}"),
            ticker: ticker.to_string(),
        }
    }

    #[test]
    fn membership_ignores_case() {
        let list = Watchlist::from_items(vec![item("aapl"), item(" MSFT "), item("AAPL"), item("")]);
        assert_eq!(list.len(), 2);
        assert!(list.contains("AAPL"));
        assert!(list.contains("msft"));
        assert!(!list.contains("NVDA"));
    }

    #[test]
    fn toggle_plans_then_commits() {
        let mut list = Watchlist::from_items(vec![item("AAPL")]);

        let remove = list.plan_toggle("aapl").unwrap();
        assert_eq!(remove, WatchlistAction::Remove("AAPL".to_string()));
        // nothing changes until the request succeeds
        assert!(list.contains("AAPL"));
        list.commit(&remove);
        assert!(!list.contains("AAPL"));

        let add = list.plan_toggle("nvda").unwrap();
        assert_eq!(add.ticker(), "NVDA");
        list.commit(&add);
        assert!(list.contains("NVDA"));

        assert!(list.plan_toggle("   ").is_none());
    }

    #[test]
    fn settle_commits_only_after_success() {
        let mut list = Watchlist::from_items(vec![item("AAPL")]);
        let add = list.plan_toggle("msft").unwrap();

        let failed: Result<(), String> = Err("HTTP 503".to_string());
        assert!(!list.settle(&add, &failed));
        assert!(!list.contains("MSFT"));

        assert!(list.settle(&add, &Ok::<(), String>(())));
        assert!(list.contains("MSFT"));

        let remove = list.plan_toggle("aapl").unwrap();
        assert!(list.settle(&remove, &Ok::<(), String>(())));
        assert!(!list.contains("AAPL"));
    }
}

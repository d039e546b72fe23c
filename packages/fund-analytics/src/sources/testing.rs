//! Collaborator doubles for unit tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{InMemoryPrices, PriceLookup, PriceMap, SourceError};

/// Wraps an in-memory lookup: fails for chosen symbols, delays calls, and records
/// call counts and completion order.
pub(crate) struct ScriptedPrices {
    inner: InMemoryPrices,
    failing: HashSet<String>,
    delay: Duration,
    symbol_delays: HashMap<String, Duration>,
    calls: AtomicUsize,
    completed: AtomicUsize,
    finished: Mutex<Vec<String>>,
}

impl ScriptedPrices {
    pub(crate) fn new(inner: InMemoryPrices) -> Self {
        Self {
            inner,
            failing: HashSet::new(),
            delay: Duration::ZERO,
            symbol_delays: HashMap::new(),
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            finished: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    /// Delay every call.
    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Delay calls that request `symbol`, overriding the uniform delay.
    pub(crate) fn delayed_for(mut self, symbol: &str, delay: Duration) -> Self {
        self.symbol_delays.insert(symbol.to_string(), delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Requested symbols, in the order their calls finished.
    pub(crate) fn finish_order(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }

    fn delay_for(&self, symbols: &[String]) -> Duration {
        symbols
            .iter()
            .filter_map(|s| self.symbol_delays.get(s).copied())
            .max()
            .unwrap_or(self.delay)
    }
}

#[async_trait]
impl PriceLookup for ScriptedPrices {
    async fn get_prices(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceMap, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay_for(symbols);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let result = if let Some(bad) = symbols.iter().find(|s| self.failing.contains(*s)) {
            Err(SourceError::ConnectionFailed(format!("no route to {}", bad)))
        } else {
            self.inner.get_prices(symbols, start, end).await
        };

        self.finished.lock().unwrap().extend(symbols.iter().cloned());
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

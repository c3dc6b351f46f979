//! Concurrent snapshot aggregation.
//!
//! One tokio task per applicable fact probes its sources, resolves the fact
//! and reports back over a channel. The collector counts reports down and
//! assembles the snapshot once every planned fact has arrived or every task
//! has gone away.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures_util::future::join_all;
use sysfacts_protocol::{FactKind, FactValue, PlatformFamily, Snapshot};
use tokio::sync::mpsc;

use crate::catalog::SourceCatalog;
use crate::config::CollectorConfig;
use crate::error::CountdownError;
use crate::facts::{self, FactContext};
use crate::platform::is_applicable;
use crate::probe::{Probe, SystemProbe};

/// Snapshot aggregator.
pub struct Collector<P: Probe = SystemProbe> {
    probe: Arc<P>,
    catalog: Arc<SourceCatalog>,
    platform: PlatformFamily,
}

impl Collector<SystemProbe> {
    /// Creates a collector that runs real processes and reads real files.
    pub fn new(config: &CollectorConfig) -> Self {
        Self::with_probe(SystemProbe, config.catalog(), config.platform())
    }
}

impl<P: Probe> Collector<P> {
    /// Creates a collector around a custom probe.
    pub fn with_probe(probe: P, catalog: SourceCatalog, platform: PlatformFamily) -> Self {
        Self {
            probe: Arc::new(probe),
            catalog: Arc::new(catalog),
            platform,
        }
    }

    pub fn platform(&self) -> PlatformFamily {
        self.platform
    }

    /// Applicable kinds from `kinds`, first occurrence order, no duplicates.
    pub fn plan(&self, kinds: &[FactKind]) -> Vec<FactKind> {
        let mut seen = BTreeSet::new();
        kinds
            .iter()
            .copied()
            .filter(|kind| is_applicable(self.platform, *kind))
            .filter(|kind| seen.insert(*kind))
            .collect()
    }

    /// Collects every fact.
    pub async fn collect_all(&self) -> Snapshot {
        self.collect(&FactKind::ALL).await
    }

    /// Collects `kinds` into one snapshot.
    ///
    /// Never fails: a fact whose task died without reporting is filled with
    /// its default record. Inapplicable or unrequested slots stay empty.
    pub async fn collect(&self, kinds: &[FactKind]) -> Snapshot {
        let started = Instant::now();
        let now = Utc::now();
        let plan = self.plan(kinds);
        let mut countdown = Countdown::new(&plan);
        let mut snapshot = Snapshot::empty(now, self.platform);

        let (tx, mut rx) = mpsc::channel::<FactValue>(plan.len().max(1));
        for &kind in &plan {
            let tx = tx.clone();
            let probe = Arc::clone(&self.probe);
            let sources = self.catalog.sources(self.platform, kind);
            let ctx = FactContext::new(self.platform, now);

            tokio::spawn(async move {
                let raws = join_all(sources.iter().map(|source| probe.probe(source))).await;
                let value = facts::resolve(kind, &ctx, &raws);
                // The receiver only goes away once the snapshot is complete.
                let _ = tx.send(value).await;
            });
        }
        drop(tx);

        while !countdown.is_done() {
            let Some(value) = rx.recv().await else {
                break;
            };
            let kind = value.kind();
            match countdown.settle(kind) {
                Ok(_) => snapshot.set(value),
                Err(e) => tracing::warn!(error = %e, "discarding fact report"),
            }
        }

        for kind in countdown.pending() {
            tracing::warn!(fact = %kind, "fact pipeline ended without reporting, using defaults");
            snapshot.set(FactValue::default_for(kind));
        }

        tracing::info!(
            platform = %self.platform,
            facts = plan.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "snapshot assembled"
        );
        snapshot
    }
}

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

/// Completion count over a fixed plan.
///
/// Each planned kind settles exactly once; anything else is an error and
/// leaves the count untouched.
#[derive(Debug, Clone)]
pub struct Countdown {
    planned: BTreeSet<FactKind>,
    pending: BTreeSet<FactKind>,
}

impl Countdown {
    pub fn new(plan: &[FactKind]) -> Self {
        let planned: BTreeSet<_> = plan.iter().copied().collect();
        Self {
            pending: planned.clone(),
            planned,
        }
    }

    /// Marks `kind` as reported and returns how many are still outstanding.
    pub fn settle(&mut self, kind: FactKind) -> Result<usize, CountdownError> {
        if !self.planned.contains(&kind) {
            return Err(CountdownError::Unplanned(kind));
        }
        if !self.pending.remove(&kind) {
            return Err(CountdownError::Duplicate(kind));
        }
        Ok(self.pending.len())
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }

    /// Kinds not reported yet.
    pub fn pending(&self) -> Vec<FactKind> {
        self.pending.iter().copied().collect()
    }
}

//! Fan-out / fan-in partition fetching.
//!
//! One task is spawned per partition. Fetched records flow over a bounded
//! channel into a single accumulator task, which is the only owner of the
//! aggregate [`RecordSet`]. Escalated failures flow over a second channel
//! sized to the fan-out width, so no worker ever waits on it.
//!
//! A failed partition never discards the records of the partitions that
//! succeeded: the returned [`FetchOutcome`] carries both.

use std::collections::BTreeSet;
use std::sync::Arc;

use rostra_core::{
    FetchError, PartitionErrorPolicy, Record, RecordKey, RecordSet, RecordSetError,
    SearchOptions, SharedFetcher,
};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Aggregated result of one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Every record from every partition that fetched and parsed.
    pub records: RecordSet,
    /// Failures returned to the caller: transport failures always, parse
    /// failures under [`PartitionErrorPolicy::Strict`].
    pub errors: Vec<FetchError>,
    /// Parse failures logged and dropped under [`PartitionErrorPolicy::Lenient`].
    pub dropped: Vec<FetchError>,
    pub partitions_requested: usize,
}

impl FetchOutcome {
    pub fn empty() -> Self {
        Self::default()
    }

    /// One of the escalated failures, if any occurred.
    pub fn error(&self) -> Option<&FetchError> {
        self.errors.first()
    }

    /// True when every requested partition contributed.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty() && self.dropped.is_empty()
    }

    /// Split into the aggregate records and one escalated failure.
    pub fn into_parts(self) -> (RecordSet, Option<FetchError>) {
        let error = self.errors.into_iter().next();
        (self.records, error)
    }

    /// Discard the partial records if any failure was escalated.
    pub fn into_result(self) -> Result<RecordSet, FetchError> {
        match self.into_parts() {
            (records, None) => Ok(records),
            (_, Some(error)) => Err(error),
        }
    }
}

/// Issues partition fetches concurrently and aggregates their records.
#[derive(Clone)]
pub struct FetchCoordinator {
    fetcher: SharedFetcher,
    policy: PartitionErrorPolicy,
}

impl FetchCoordinator {
    pub fn new(fetcher: SharedFetcher) -> Self {
        Self {
            fetcher,
            policy: PartitionErrorPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PartitionErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> PartitionErrorPolicy {
        self.policy
    }

    pub fn fetcher(&self) -> &SharedFetcher {
        &self.fetcher
    }

    /// Fetch the option vocabulary through the same fetcher.
    pub async fn fetch_options(&self) -> Result<SearchOptions, FetchError> {
        self.fetcher.fetch_options().await
    }

    /// Fetch every partition listed in `options`.
    pub async fn fetch_all(&self, options: &SearchOptions) -> FetchOutcome {
        self.fetch_partitions(options.partition_keys()).await
    }

    /// Fetch only the partitions holding `keys`.
    ///
    /// Every key must be present in `existing`; an unknown key fails
    /// before any fetch is issued.
    pub async fn fetch_for_keys(
        &self,
        existing: &RecordSet,
        keys: &[RecordKey],
    ) -> Result<FetchOutcome, RecordSetError> {
        let partitions = existing.group_partition_keys(keys)?;
        Ok(self.fetch_partitions(partitions).await)
    }

    /// Fetch the given partitions concurrently, one task per distinct key.
    pub async fn fetch_partitions<I, S>(&self, partitions: I) -> FetchOutcome
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let partitions: BTreeSet<String> = partitions.into_iter().map(Into::into).collect();
        if partitions.is_empty() {
            debug!("no partitions requested");
            return FetchOutcome::empty();
        }

        let width = partitions.len();
        info!(partitions = width, policy = ?self.policy, "fetching partitions");

        let (record_tx, mut record_rx) = mpsc::channel::<Record>(width);
        let (error_tx, mut error_rx) = mpsc::channel::<FetchError>(width);

        let accumulator = tokio::spawn(async move {
            let mut records = RecordSet::new();
            while let Some(record) = record_rx.recv().await {
                let key = record.key;
                if records.upsert(record) {
                    debug!(%key, "record returned by more than one partition");
                }
            }
            records
        });

        let mut workers = JoinSet::new();
        for partition in partitions {
            workers.spawn(fetch_partition_task(
                Arc::clone(&self.fetcher),
                partition,
                record_tx.clone(),
                error_tx.clone(),
                self.policy,
            ));
        }
        // Workers hold the only remaining senders; both channels close as they finish.
        drop(record_tx);
        drop(error_tx);

        let mut outcome = FetchOutcome {
            partitions_requested: width,
            ..FetchOutcome::empty()
        };

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Some(dropped)) => outcome.dropped.push(dropped),
                Ok(None) => {}
                Err(err) => {
                    warn!(error = %err, "partition fetch task did not complete");
                    outcome.errors.push(FetchError::Aborted {
                        reason: err.to_string(),
                    });
                }
            }
        }

        match accumulator.await {
            Ok(records) => outcome.records = records,
            Err(err) => {
                warn!(error = %err, "record accumulator did not complete");
                outcome.errors.push(FetchError::Aborted {
                    reason: format!("record accumulator: {}", err),
                });
            }
        }

        while let Ok(error) = error_rx.try_recv() {
            outcome.errors.push(error);
        }

        info!(
            records = outcome.records.len(),
            failed = outcome.errors.len(),
            dropped = outcome.dropped.len(),
            "partition fetch finished"
        );
        outcome
    }
}

impl std::fmt::Debug for FetchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchCoordinator")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Fetch one partition and forward its records in parser order.
///
/// Returns the parse failure when it was dropped rather than escalated.
async fn fetch_partition_task(
    fetcher: SharedFetcher,
    partition: String,
    records: mpsc::Sender<Record>,
    errors: mpsc::Sender<FetchError>,
    policy: PartitionErrorPolicy,
) -> Option<FetchError> {
    match fetcher.fetch_partition(&partition).await {
        Ok(fetched) => {
            debug!(%partition, records = fetched.len(), "partition fetched");
            for record in fetched {
                if records.send(record).await.is_err() {
                    warn!(%partition, "record accumulator closed early");
                    break;
                }
            }
            None
        }
        Err(error) if error.is_parse() && !policy.is_strict() => {
            warn!(%partition, %error, "dropping partition with unparseable response");
            Some(error)
        }
        Err(error) => {
            warn!(%partition, %error, "partition fetch failed");
            // Capacity equals the fan-out width and each worker sends at most once.
            let _ = errors.send(error).await;
            None
        }
    }
}

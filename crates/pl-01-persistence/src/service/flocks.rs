//! # Farm Store Service - Flocks

use super::helpers::{index_scan, read_doc};
use super::*;
use crate::domain::summaries::FlockPerformance;
use crate::domain::validation::decode_records;
use shared_schema::{from_document, Flock, FlockStatus, KeyRange, RecordKey, Transaction};

impl<O, TS> FarmStore<O, TS>
where
    O: StoreOpener,
    TS: TimeSource,
{
    pub async fn get_flocks_by_status(&self, status: FlockStatus) -> Result<Vec<Flock>, StoreError> {
        let docs = self
            .get_all(
                StoreName::Flocks,
                Some("status"),
                Some(KeyRange::only(status.as_str())),
            )
            .await?;
        decode_records(StoreName::Flocks, docs)
    }

    pub async fn get_active_flocks(&self) -> Result<Vec<Flock>, StoreError> {
        self.get_flocks_by_status(FlockStatus::Active).await
    }

    pub async fn get_flock_performance(
        &self,
        flock_id: &RecordKey,
    ) -> Result<Option<FlockPerformance>, StoreError> {
        let backend = self.backend().await?;
        let kv = backend.read();

        let Some(doc) = read_doc(&*kv, StoreName::Flocks, flock_id)? else {
            return Ok(None);
        };
        let flock: Flock = from_document(&doc)?;

        let feed_docs = index_scan(
            &*kv,
            StoreName::Transactions,
            "type",
            Some(&KeyRange::only("feed_consumption")),
        )?;
        drop(kv);

        let feed: Vec<Transaction> = decode_records(StoreName::Transactions, feed_docs)?;
        let feed: Vec<Transaction> = feed
            .into_iter()
            .filter(|t| t.flock_id.as_ref() == Some(flock_id))
            .collect();

        Ok(Some(FlockPerformance::compute(
            flock,
            &feed,
            self.time_source.now(),
            self.config.estimated_feed_price,
        )))
    }
}

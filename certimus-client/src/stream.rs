//! Streaming variant of batch retrieval.
//!
//! Yields each [`FetchOutcome`] as its download finishes instead of
//! waiting for the whole batch, so callers can report progress on long
//! backfills.

use async_stream::try_stream;
use certimus_rs_core::ChunkPlan;
use futures_core::Stream;

use crate::error::Result;
use crate::fetch::{FetchClient, FetchOutcome};
use crate::registry::StationRegistry;

/// Stream outcomes in completion order.
///
/// Skipped-existing outcomes are yielded first, then each download as
/// it completes. The stream ends after one item per input plan, or
/// early on a fatal error (unknown station, task panic).
pub fn outcome_stream(
    client: FetchClient,
    registry: StationRegistry,
    plans: Vec<ChunkPlan>,
) -> impl Stream<Item = Result<FetchOutcome>> {
    try_stream! {
        let batch = client.prepare(&registry, &plans)?;
        let (skipped, mut set) = client.spawn_jobs(batch);
        for outcome in skipped {
            yield outcome;
        }
        while let Some(joined) = set.join_next().await {
            yield joined?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchConfig, OutcomeKind};
    use crate::mock::MockSensor;
    use certimus_rs_core::{ChannelId, PlanConfig, TimeWindow, plan_requests};
    use chrono::{TimeZone, Utc};
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn streams_one_outcome_per_plan() {
        let sensor = MockSensor::start().await;
        let dir = tempfile::tempdir().unwrap();
        let mut registry = StationRegistry::default();
        registry.insert("NYM1", sensor.addr());

        let window = TimeWindow::new(
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 1, 4, 0, 0).unwrap(),
        )
        .unwrap();
        let id = ChannelId::new("OX", "NYM1", "00", "HHZ").unwrap();
        let plans =
            plan_requests(&PlanConfig::new(dir.path()), &[(id, window)]).unwrap();

        let config = FetchConfig {
            validate_records: false,
            ..FetchConfig::default()
        };
        let client = FetchClient::new(config).unwrap();
        let stream = outcome_stream(client, registry, plans.clone());
        tokio::pin!(stream);

        let mut outcomes = Vec::new();
        while let Some(outcome) = stream.next().await {
            outcomes.push(outcome.unwrap());
        }
        assert_eq!(outcomes.len(), plans.len());
        assert!(
            outcomes
                .iter()
                .all(|o| matches!(o.kind, OutcomeKind::Written { .. }))
        );
    }

    #[tokio::test]
    async fn unknown_station_ends_stream_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let registry = StationRegistry::default();
        let window = TimeWindow::new(
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 1, 1, 0, 0).unwrap(),
        )
        .unwrap();
        let id = ChannelId::new("OX", "NYM1", "00", "HHZ").unwrap();
        let plans =
            plan_requests(&PlanConfig::new(dir.path()), &[(id, window)]).unwrap();

        let client = FetchClient::new(FetchConfig::default()).unwrap();
        let stream = outcome_stream(client, registry, plans);
        tokio::pin!(stream);

        let first = stream.next().await.unwrap();
        assert!(first.is_err());
        assert!(stream.next().await.is_none());
    }
}

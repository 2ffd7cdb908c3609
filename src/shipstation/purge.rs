//! Cancelled-order purge
//!
//! Deletes every order in the `cancelled` status. Deletes are spaced out to
//! stay under the upstream rate limit; orders whose delete failed are tried
//! again in a later pass.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::client::OrderApi;
use super::error::SyncError;
use crate::core_types::OrderId;

pub const DEFAULT_SPACING: Duration = Duration::from_millis(500);
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(600);
pub const DEFAULT_MAX_PASSES: u32 = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub found: usize,
    pub deleted: usize,
    /// Orders still present after the last pass
    pub failed: Vec<OrderId>,
    pub passes: u32,
}

pub struct CancelledOrderPurge {
    api: Arc<dyn OrderApi>,
    spacing: Duration,
    retry_delay: Duration,
    max_passes: u32,
}

impl CancelledOrderPurge {
    pub fn new(api: Arc<dyn OrderApi>) -> Self {
        Self {
            api,
            spacing: DEFAULT_SPACING,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    pub fn with_spacing(mut self, spacing: Duration) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_max_passes(mut self, max_passes: u32) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    /// Ids of every cancelled order, across all pages
    pub async fn cancelled_order_ids(&self) -> Result<Vec<OrderId>, SyncError> {
        let mut ids = Vec::new();
        let mut page = 1;
        loop {
            let result = self.api.list_cancelled_orders(page).await?;
            ids.extend(result.orders.iter().filter_map(|o| o.order_id));
            if page >= result.pages {
                break;
            }
            page += 1;
        }
        Ok(ids)
    }

    pub async fn run(&self) -> Result<PurgeReport, SyncError> {
        let mut pending = self.cancelled_order_ids().await?;
        info!("{} cancelled orders found", pending.len());

        let mut report = PurgeReport {
            found: pending.len(),
            ..Default::default()
        };

        while !pending.is_empty() && report.passes < self.max_passes {
            if report.passes > 0 {
                tokio::time::sleep(self.retry_delay).await;
                info!("Retrying {} failed deletes", pending.len());
            }
            report.passes += 1;

            let mut failed = Vec::new();
            for (i, order_id) in pending.iter().copied().enumerate() {
                if i > 0 {
                    tokio::time::sleep(self.spacing).await;
                }
                match self.api.delete_order(order_id).await {
                    Ok(()) => {
                        report.deleted += 1;
                        info!("Deleted order {}", order_id);
                    }
                    Err(e) => {
                        warn!("Failed to delete order {}: {}", order_id, e);
                        failed.push(order_id);
                    }
                }
            }
            pending = failed;
        }

        report.failed = pending;
        info!(
            deleted = report.deleted,
            failed = report.failed.len(),
            passes = report.passes,
            "Cancelled order purge finished"
        );
        Ok(report)
    }
}

#[cfg(all(test, feature = "mock-api"))]
mod tests {
    use super::*;
    use crate::shipstation::mock::MockOrderApi;
    use crate::shipstation::split::tests::order;
    use tokio::time::Instant;

    fn cancelled(id: OrderId) -> crate::shipstation::models::Order {
        let mut o = order(&id.to_string(), "", vec![]);
        o.order_id = Some(id);
        o.order_status = "cancelled".to_string();
        o
    }

    #[tokio::test(start_paused = true)]
    async fn test_deletes_every_page_with_spacing() {
        let api = MockOrderApi::new().with_cancelled_pages(vec![
            vec![cancelled(1), cancelled(2)],
            vec![cancelled(3)],
        ]);
        let purge = CancelledOrderPurge::new(Arc::new(api.clone()));

        let start = Instant::now();
        let report = purge.run().await.unwrap();

        assert_eq!(
            report,
            PurgeReport {
                found: 3,
                deleted: 3,
                failed: vec![],
                passes: 1,
            }
        );
        assert_eq!(api.deleted(), vec![1, 2, 3]);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(elapsed < Duration::from_millis(1100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_deletes_are_retried_in_a_later_pass() {
        let api = MockOrderApi::new()
            .with_cancelled_pages(vec![vec![cancelled(1), cancelled(2)]])
            .with_delete_failures(2, 1);
        let purge = CancelledOrderPurge::new(Arc::new(api.clone()));

        let start = Instant::now();
        let report = purge.run().await.unwrap();

        assert_eq!(report.deleted, 2);
        assert_eq!(report.passes, 2);
        assert!(report.failed.is_empty());
        assert_eq!(api.delete_attempts(), vec![1, 2, 2]);
        // 500ms spacing in the first pass, then the retry delay.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1100));
        assert!(elapsed < Duration::from_millis(1200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_passes() {
        let api = MockOrderApi::new()
            .with_cancelled_pages(vec![vec![cancelled(1)]])
            .with_delete_failures(1, 10);
        let purge = CancelledOrderPurge::new(Arc::new(api.clone())).with_max_passes(2);

        let report = purge.run().await.unwrap();

        assert_eq!(report.passes, 2);
        assert_eq!(report.deleted, 0);
        assert_eq!(report.failed, vec![1]);
        assert_eq!(api.delete_attempts().len(), 2);
    }

    #[tokio::test]
    async fn test_nothing_to_purge() {
        let api = MockOrderApi::new();
        let report = CancelledOrderPurge::new(Arc::new(api.clone()))
            .run()
            .await
            .unwrap();

        assert_eq!(report.found, 0);
        assert_eq!(report.passes, 0);
        assert!(api.delete_attempts().is_empty());
    }
}

//! Asynchronous soft-delete pipeline.
//!
//! Producers submit [`BatchDeleteRequest`]s through a [`DeleteQueue`] and get
//! control back immediately. A single dispatcher task takes requests off the
//! queue one at a time and moves each through four stages:
//!
//! 1. **Received** - the request is taken off the queue
//! 2. **Fanned out** - its codes are split round-robin over the worker lanes
//! 3. **Applied** - every lane flips its share with one
//!    [`LinkRepository::soft_delete`] call
//! 4. **Done** - the dispatcher has joined all lanes for this request
//!
//! Failures are logged and dropped; the producer never hears about them.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::entities::{BatchDeleteRequest, Owner, ShortCode};
use crate::domain::repositories::LinkRepository;
use crate::error::StoreError;

/// Work buffered per lane.
const LANE_CAPACITY: usize = 64;

/// One lane's share of a request.
struct LaneJob {
    owner: Owner,
    codes: Vec<ShortCode>,
    done: oneshot::Sender<()>,
}

/// Producer handle of the delete pipeline.
#[derive(Clone)]
pub struct DeleteQueue {
    tx: mpsc::UnboundedSender<BatchDeleteRequest>,
}

impl DeleteQueue {
    /// Submits a request without waiting for it to be applied.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidInput`] for a request without codes and
    /// [`StoreError::Closed`] once the pipeline has shut down.
    pub fn enqueue(&self, request: BatchDeleteRequest) -> Result<(), StoreError> {
        if request.codes.is_empty() {
            return Err(StoreError::invalid_input("no short codes to delete"));
        }

        self.tx.send(request).map_err(|_| StoreError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Running pipeline tasks.
pub struct DeletePipeline {
    shutdown: watch::Sender<bool>,
    dispatcher: JoinHandle<()>,
    lanes: Vec<JoinHandle<()>>,
}

impl DeletePipeline {
    /// Starts the dispatcher and `lanes` worker lanes over `repository`.
    ///
    /// A lane count of zero is raised to one.
    pub fn spawn<R>(repository: Arc<R>, lanes: usize) -> (DeleteQueue, Self)
    where
        R: LinkRepository + ?Sized + 'static,
    {
        let lane_count = lanes.max(1);
        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut lane_senders = Vec::with_capacity(lane_count);
        let mut lane_handles = Vec::with_capacity(lane_count);

        for lane in 0..lane_count {
            let (lane_tx, lane_rx) = mpsc::channel(LANE_CAPACITY);
            lane_senders.push(lane_tx);
            lane_handles.push(tokio::spawn(run_lane(lane, lane_rx, repository.clone())));
        }

        let dispatcher = tokio::spawn(run_dispatcher(rx, lane_senders, shutdown_rx));

        info!(lanes = lane_count, "Delete pipeline started");

        (
            DeleteQueue { tx },
            Self {
                shutdown: shutdown_tx,
                dispatcher,
                lanes: lane_handles,
            },
        )
    }

    /// Stops accepting requests, applies everything already queued and waits
    /// for every task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);

        if let Err(e) = self.dispatcher.await {
            error!(error = %e, "Delete dispatcher panicked");
        }

        for lane in self.lanes {
            if let Err(e) = lane.await {
                error!(error = %e, "Delete lane panicked");
            }
        }

        info!("Delete pipeline stopped");
    }
}

async fn run_dispatcher(
    mut rx: mpsc::UnboundedReceiver<BatchDeleteRequest>,
    lanes: Vec<mpsc::Sender<LaneJob>>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;

            request = rx.recv() => match request {
                Some(request) => dispatch(request, &lanes).await,
                None => break,
            },
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    // Refuse new work, then drain what producers already handed over.
    rx.close();
    while let Some(request) = rx.recv().await {
        dispatch(request, &lanes).await;
    }

    debug!("Delete dispatcher drained");
}

/// Runs one request through the fan-out and join stages.
async fn dispatch(request: BatchDeleteRequest, lanes: &[mpsc::Sender<LaneJob>]) {
    let BatchDeleteRequest { owner, codes } = request;
    debug!(owner = %owner, codes = codes.len(), "Delete request received");

    let mut pending = Vec::with_capacity(lanes.len());
    for (lane, share) in fan_out(codes, lanes.len()).into_iter().enumerate() {
        if share.is_empty() {
            continue;
        }

        let (done_tx, done_rx) = oneshot::channel();
        let job = LaneJob {
            owner: owner.clone(),
            codes: share,
            done: done_tx,
        };

        if lanes[lane].send(job).await.is_err() {
            warn!(lane, "Delete lane stopped; share dropped");
            continue;
        }
        pending.push(done_rx);
    }
    debug!(owner = %owner, lanes = pending.len(), "Delete request fanned out");

    for done in pending {
        let _ = done.await;
    }
    debug!(owner = %owner, "Delete request done");
}

async fn run_lane<R>(lane: usize, mut rx: mpsc::Receiver<LaneJob>, repository: Arc<R>)
where
    R: LinkRepository + ?Sized,
{
    while let Some(job) = rx.recv().await {
        match repository.soft_delete(&job.owner, &job.codes).await {
            Ok(changed) => {
                debug!(lane, owner = %job.owner, changed, "Delete share applied");
            }
            Err(StoreError::Closed) => {
                info!(lane, owner = %job.owner, "Store closed; delete share dropped");
            }
            Err(e) => {
                warn!(lane, owner = %job.owner, error = %e, "Delete share failed");
            }
        }

        let _ = job.done.send(());
    }
}

/// Splits `codes` round-robin into `lanes` buckets.
fn fan_out(codes: Vec<ShortCode>, lanes: usize) -> Vec<Vec<ShortCode>> {
    let mut buckets = vec![Vec::new(); lanes];
    for (i, code) in codes.into_iter().enumerate() {
        buckets[i % lanes].push(code);
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;

    fn codes(n: usize) -> Vec<ShortCode> {
        (0..n)
            .map(|i| ShortCode::new_unchecked(format!("{i:016x}")))
            .collect()
    }

    #[test]
    fn test_fan_out_round_robin() {
        let all = codes(5);
        let buckets = fan_out(all.clone(), 2);

        assert_eq!(buckets[0], vec![all[0].clone(), all[2].clone(), all[4].clone()]);
        assert_eq!(buckets[1], vec![all[1].clone(), all[3].clone()]);
    }

    #[test]
    fn test_fan_out_more_lanes_than_codes() {
        let buckets = fan_out(codes(2), 4);

        assert_eq!(buckets.iter().filter(|b| !b.is_empty()).count(), 2);
    }

    #[tokio::test]
    async fn test_empty_request_rejected_before_dispatch() {
        let mut mock = MockLinkRepository::new();
        mock.expect_soft_delete().never();

        let (queue, pipeline) = DeletePipeline::spawn(Arc::new(mock), 2);

        let result = queue.enqueue(BatchDeleteRequest::new(Owner::from("u1"), vec![]));
        assert!(matches!(result, Err(StoreError::InvalidInput(_))));

        pipeline.shutdown().await;
    }

    #[tokio::test]
    async fn test_single_lane_applies_whole_request() {
        let mut mock = MockLinkRepository::new();
        mock.expect_soft_delete()
            .withf(|owner, batch| owner.as_str() == "u1" && batch == codes(3).as_slice())
            .times(1)
            .returning(|_, codes| Ok(codes.len() as u64));

        let (queue, pipeline) = DeletePipeline::spawn(Arc::new(mock), 1);
        queue
            .enqueue(BatchDeleteRequest::new(Owner::from("u1"), codes(3)))
            .unwrap();

        pipeline.shutdown().await;
    }

    #[tokio::test]
    async fn test_lane_failure_is_swallowed() {
        let mut mock = MockLinkRepository::new();
        mock.expect_soft_delete()
            .times(2)
            .returning(|_, _| Err(StoreError::unavailable("down")));

        let (queue, pipeline) = DeletePipeline::spawn(Arc::new(mock), 2);
        queue
            .enqueue(BatchDeleteRequest::new(Owner::from("u1"), codes(4)))
            .unwrap();

        pipeline.shutdown().await;
    }

    #[tokio::test]
    async fn test_enqueue_after_shutdown_is_closed() {
        let mock = MockLinkRepository::new();
        let (queue, pipeline) = DeletePipeline::spawn(Arc::new(mock), 1);

        pipeline.shutdown().await;

        assert!(queue.is_closed());
        let result = queue.enqueue(BatchDeleteRequest::new(Owner::from("u1"), codes(1)));
        assert_eq!(result, Err(StoreError::Closed));
    }
}

use std::sync::Arc;
use std::time::Duration;

use evlog::meta;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

use crate::api::ApiClient;
use crate::runtime::get_logger;
use crate::views::results::ResultsView;

/// Keeps a [`ResultsView`] fresh by reading the votes endpoint on a fixed interval.
///
/// The first read happens right away. Dropping the poller stops the task; a read still in flight is
/// discarded.
pub struct ResultsPoller {
    receiver: watch::Receiver<ResultsView>,
    refresh: Arc<Notify>,
    task: JoinHandle<()>,
}

impl ResultsPoller {
    pub fn spawn(client: ApiClient, interval: Duration) -> Self {
        let (sender, receiver) = watch::channel(ResultsView::default());
        let refresh = Arc::new(Notify::new());

        let task = tokio::spawn(poll_results(client, interval, sender, refresh.clone()));

        Self {
            receiver,
            refresh,
            task,
        }
    }

    pub fn current(&self) -> ResultsView {
        self.receiver.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResultsView> {
        self.receiver.clone()
    }

    /// Asks for a read now instead of waiting for the next tick.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }
}

impl Drop for ResultsPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn poll_results(
    client: ApiClient,
    interval: Duration,
    sender: watch::Sender<ResultsView>,
    refresh: Arc<Notify>,
) {
    let mut interval = time::interval(interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks = IntervalStream::new(interval);

    let mut view = ResultsView::default();

    loop {
        tokio::select! {
            tick = ticks.next() => {
                if tick.is_none() {
                    break;
                }
            }
            _ = refresh.notified() => {}
        }

        view.apply(client.list_votes().await);

        if let Some(e) = view.error() {
            get_logger().debug("Results refresh failed; keeping last results.", meta![
                "Error" => e.to_owned(),
                "HasResults" => view.page().is_some(),
            ]);
        }

        if sender.send(view.clone()).is_err() {
            break;
        }
    }
}

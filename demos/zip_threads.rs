//! # Zip across threads
//!
//! Three feeds produce values on their own OS threads, at different speeds.
//! The consumer pulls one row at a time; the slowest feed sets the pace and the
//! shortest one ends the sequence. Lifecycle events are printed by the built-in
//! `LogWriter`.
//!
//! ## Run
//! ```bash
//! cargo run --example zip_threads --features logging
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use zipbarrier::{
    Bus, InvalidDemand, LogWriter, Observe, ObserverSet, Publisher, StreamError, Subscriber,
    Subscription, ZipConfig, ZipPublisher,
};

/// Emits `0..count` scaled by `scale`, pausing `pace` between values, and only
/// as fast as demand allows.
struct Feed {
    count: u64,
    scale: u64,
    pace: Duration,
}

struct FeedSubscription {
    requested: AtomicU64,
    cancelled: AtomicBool,
}

impl Subscription for FeedSubscription {
    fn request(&self, n: u64) -> Result<(), InvalidDemand> {
        if n == 0 {
            return Err(InvalidDemand { requested: n });
        }
        let _ = self
            .requested
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |r| {
                Some(r.saturating_add(n))
            });
        Ok(())
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

impl Publisher<u64> for Feed {
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<u64>>) {
        let sub = Arc::new(FeedSubscription {
            requested: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
        });
        subscriber.on_subscribe(sub.clone());

        let (count, scale, pace) = (self.count, self.scale, self.pace);
        thread::spawn(move || {
            let mut sent = 0;
            while sent < count {
                if sub.cancelled.load(Ordering::Acquire) {
                    return;
                }
                if sub.requested.load(Ordering::Acquire) <= sent {
                    thread::sleep(Duration::from_millis(1));
                    continue;
                }
                thread::sleep(pace);
                subscriber.on_next(sent * scale);
                sent += 1;
            }
            subscriber.on_complete();
        });
    }
}

enum Row {
    Item(String),
    Done(Option<StreamError>),
}

/// Pulls one row at a time and forwards it to the main task.
struct Printer {
    tx: mpsc::UnboundedSender<Row>,
    subscription: OnceLock<Arc<dyn Subscription>>,
}

impl Subscriber<String> for Printer {
    fn on_subscribe(&self, s: Arc<dyn Subscription>) {
        let _ = s.request(1);
        let _ = self.subscription.set(s);
    }

    fn on_next(&self, row: String) {
        let _ = self.tx.send(Row::Item(row));
        if let Some(s) = self.subscription.get() {
            let _ = s.request(1);
        }
    }

    fn on_error(&self, error: StreamError) {
        let _ = self.tx.send(Row::Done(Some(error)));
    }

    fn on_complete(&self) {
        let _ = self.tx.send(Row::Done(None));
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let bus = Bus::new(ZipConfig::default().bus_capacity_clamped());
    let observers = Arc::new(ObserverSet::new(
        vec![Arc::new(LogWriter::new()) as Arc<dyn Observe>],
        bus.clone(),
    ));
    let token = CancellationToken::new();
    let listener = observers.listen(&bus, token.clone());

    let zip = ZipPublisher::builder(vec![
        Arc::new(Feed { count: 8, scale: 1, pace: Duration::from_millis(20) })
            as Arc<dyn Publisher<u64>>,
        Arc::new(Feed { count: 5, scale: 100, pace: Duration::from_millis(50) }),
        Arc::new(Feed { count: 6, scale: 10, pace: Duration::from_millis(5) }),
    ])
    .name("feeds")
    .config(ZipConfig { prefetch: 2, ..ZipConfig::default() })
    .bus(bus.clone())
    .combine(|row: &[u64]| Ok(format!("fast={} slow={} mid={}", row[0], row[1], row[2])))
    .build();

    let (tx, mut rx) = mpsc::unbounded_channel();
    zip.subscribe(Arc::new(Printer {
        tx,
        subscription: OnceLock::new(),
    }));

    while let Some(row) = rx.recv().await {
        match row {
            Row::Item(row) => println!("{row}"),
            Row::Done(None) => break,
            Row::Done(Some(err)) => return Err(err.into()),
        }
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();
    listener.await?;
    Ok(())
}

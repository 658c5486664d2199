//! # LogWriter: simple event printer
//!
//! Prints incoming [`Event`]s to stdout. Use it for demos and debugging.
//!
//! ## Example output
//! ```text
//! [subscribed] operator="prices" sources=3
//! [source-subscribed] operator="prices" source=0
//! [completed] operator="prices" emitted=42
//! ```

use async_trait::async_trait;

use super::Observe;
use crate::events::{Event, EventKind};

/// Event writer observer.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Observe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let op = e.operator.as_deref().unwrap_or("zip");
        match e.kind {
            EventKind::ZipSubscribed => {
                println!("[subscribed] operator={op:?} {}", e.reason.as_deref().unwrap_or(""));
            }
            EventKind::SourceSubscribed => {
                println!("[source-subscribed] operator={op:?} source={:?}", e.source);
            }
            EventKind::DuplicateSubscription => {
                println!("[duplicate-subscription] operator={op:?} source={:?}", e.source);
            }
            EventKind::SourceOverflow => {
                println!(
                    "[source-overflow] operator={op:?} source={:?} reason={:?}",
                    e.source, e.reason
                );
            }
            EventKind::ZipCompleted => {
                println!("[completed] operator={op:?} emitted={:?}", e.emitted);
            }
            EventKind::ZipFailed => {
                println!(
                    "[failed] operator={op:?} emitted={:?} err={:?}",
                    e.emitted, e.reason
                );
            }
            EventKind::ZipCancelled => {
                println!("[cancelled] operator={op:?} emitted={:?}", e.emitted);
            }
            EventKind::ObserverOverflow => {
                println!("[observer-overflow] {}", e.reason.as_deref().unwrap_or("unknown"));
            }
            EventKind::ObserverPanicked => {
                println!(
                    "[observer-panicked] observer={op} info={}",
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

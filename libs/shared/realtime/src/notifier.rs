use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, Stream};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::{ChangeEvent, ChangeFilter, ChangeTable};

/// Publish/subscribe fan-out of row changes, one broadcast channel per table.
#[derive(Clone)]
pub struct ChangeNotifier {
    channels: Arc<HashMap<ChangeTable, broadcast::Sender<ChangeEvent>>>,
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let channels = ChangeTable::ALL
            .iter()
            .map(|table| {
                let (sender, _) = broadcast::channel(capacity.max(1));
                (*table, sender)
            })
            .collect();

        Self {
            channels: Arc::new(channels),
        }
    }

    /// Returns how many subscribers of the table were handed the event.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let Some(sender) = self.channels.get(&event.table) else {
            return 0;
        };

        match sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                debug!(
                    "No subscribers for {} {} event",
                    event.table,
                    event.kind.as_str()
                );
                0
            }
        }
    }

    pub fn subscribe(&self, table: ChangeTable, filter: Option<ChangeFilter>) -> ChangeSubscription {
        let receiver = match self.channels.get(&table) {
            Some(sender) => sender.subscribe(),
            None => {
                // Every table gets a channel in `new`.
                let (sender, receiver) = broadcast::channel(1);
                drop(sender);
                receiver
            }
        };

        debug!("New subscription on {} (filter: {:?})", table, filter);
        ChangeSubscription {
            table,
            filter,
            receiver,
        }
    }

    pub fn subscriber_count(&self, table: ChangeTable) -> usize {
        self.channels
            .get(&table)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(256)
    }
}

pub struct ChangeSubscription {
    table: ChangeTable,
    filter: Option<ChangeFilter>,
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl ChangeSubscription {
    /// Next event matching the filter, or `None` once the notifier is gone.
    ///
    /// A lagged receiver yields a single `Resync` event in place of the
    /// events it missed.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(event);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Subscriber on {} lagged by {} events, requesting resync", self.table, skipped);
                    return Some(ChangeEvent::resync(self.table));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = ChangeEvent> {
        stream::unfold(self, |mut subscription| async move {
            let event = subscription.recv().await?;
            Some((event, subscription))
        })
    }

    fn accepts(&self, event: &ChangeEvent) -> bool {
        event.table == self.table
            && self.filter.as_ref().map_or(true, |filter| filter.matches(event))
    }
}

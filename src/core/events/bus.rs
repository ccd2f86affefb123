

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use super::base::{Event, EventKind};


pub type EventHandler = Arc<dyn Fn(Event) + Send + Sync>;


pub struct EventBus {
    handlers: Arc<RwLock<HashMap<EventKind, Vec<EventHandler>>>>,
}

impl EventBus {

    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }


    pub async fn register(&self, kind: EventKind, handler: EventHandler) {
        let mut handlers = self.handlers.write().await;
        handlers.entry(kind).or_default().push(handler);
        debug!("Registered handler for event kind: {}", <&'static str>::from(kind));
    }


    pub async fn has_handlers(&self, kind: EventKind) -> bool {
        let handlers = self.handlers.read().await;
        handlers.get(&kind).is_some_and(|h| !h.is_empty())
    }

    /// Each handler runs on its own task; emitting never waits for them.
    pub async fn emit(&self, event: Event) {
        let handlers = self.handlers.read().await;

        let Some(kind_handlers) = handlers.get(&event.kind) else {
            return;
        };

        for handler in kind_handlers {
            let handler = Arc::clone(handler);
            let event = event.clone();

            tokio::spawn(async move {
                handler(event);
            });
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

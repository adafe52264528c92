//! Lifecycle handler registry.
//!
//! Hosting layers route requests through named handlers registered per
//! lifecycle event. The engine installs one handler per event it covers;
//! other plugins can register alongside it. Dispatch walks handlers in
//! registration order and stops at the first one that handles the request.

use crate::engine::{DeleteOutcome, SoftDeleteEngine};
use crate::error::Error;
use crate::store::Store;
use shroud_proto::{ReadQuery, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Lifecycle events a handler can intercept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// Delete of a committed record.
    Delete,
    /// Discard of a staged (draft-overlay) record.
    DraftCancel,
    /// An incoming read query.
    Read,
}

/// A request flowing through the pipeline.
#[derive(Debug)]
pub enum Request<'a> {
    Delete {
        entity: &'a str,
        keys: &'a [(String, Value)],
        actor: Option<&'a str>,
    },
    DraftCancel {
        entity: &'a str,
        keys: &'a [(String, Value)],
        actor: Option<&'a str>,
    },
    Read { query: &'a ReadQuery },
}

impl Request<'_> {
    /// The event this request belongs to.
    pub fn event(&self) -> LifecycleEvent {
        match self {
            Request::Delete { .. } => LifecycleEvent::Delete,
            Request::DraftCancel { .. } => LifecycleEvent::DraftCancel,
            Request::Read { .. } => LifecycleEvent::Read,
        }
    }
}

/// What a handler did with a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The handler declined; dispatch continues to the next one.
    Unhandled,
    /// The request was completed in place of the original operation.
    Completed {
        /// Rows affected by the replacement operation.
        rows_affected: u64,
    },
    /// A read query was rewritten; the host runs the returned query.
    Rewritten(ReadQuery),
}

/// A registered handler.
pub type Handler = Box<dyn Fn(&Request<'_>) -> Result<Outcome, Error> + Send + Sync>;

/// Named handlers grouped by lifecycle event, dispatched in registration
/// order.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<LifecycleEvent, Vec<(String, Handler)>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an event under a diagnostic name.
    pub fn register(&mut self, event: LifecycleEvent, name: impl Into<String>, handler: Handler) {
        self.handlers.entry(event).or_default().push((name.into(), handler));
    }

    /// Number of handlers registered for an event.
    pub fn handler_count(&self, event: LifecycleEvent) -> usize {
        self.handlers.get(&event).map_or(0, Vec::len)
    }

    /// Dispatch a request; the first non-[`Outcome::Unhandled`] result wins.
    pub fn dispatch(&self, request: &Request<'_>) -> Result<Outcome, Error> {
        if let Some(handlers) = self.handlers.get(&request.event()) {
            for (name, handler) in handlers {
                let outcome = handler(request)?;
                if outcome != Outcome::Unhandled {
                    tracing::debug!(handler = %name, "request handled");
                    return Ok(outcome);
                }
            }
        }
        Ok(Outcome::Unhandled)
    }
}

impl<S> SoftDeleteEngine<S>
where
    S: Store + Send + Sync + 'static,
{
    /// Register the engine's three entry points with a handler registry.
    pub fn install(self: Arc<Self>, registry: &mut HandlerRegistry) {
        let engine = Arc::clone(&self);
        registry.register(
            LifecycleEvent::Delete,
            "soft-delete",
            Box::new(move |request| match request {
                Request::Delete { entity, keys, actor } => {
                    match engine.delete(entity, keys, *actor)? {
                        DeleteOutcome::PassThrough => Ok(Outcome::Unhandled),
                        DeleteOutcome::Intercepted { rows_affected } => {
                            Ok(Outcome::Completed { rows_affected })
                        }
                    }
                }
                _ => Ok(Outcome::Unhandled),
            }),
        );

        let engine = Arc::clone(&self);
        registry.register(
            LifecycleEvent::DraftCancel,
            "soft-delete-draft",
            Box::new(move |request| match request {
                Request::DraftCancel { entity, keys, actor } => {
                    match engine.draft_cancel(entity, keys, *actor)? {
                        DeleteOutcome::PassThrough => Ok(Outcome::Unhandled),
                        DeleteOutcome::Intercepted { rows_affected } => {
                            Ok(Outcome::Completed { rows_affected })
                        }
                    }
                }
                _ => Ok(Outcome::Unhandled),
            }),
        );

        let engine = Arc::clone(&self);
        registry.register(
            LifecycleEvent::Read,
            "soft-delete-read",
            Box::new(move |request| match request {
                Request::Read { query } => Ok(Outcome::Rewritten(engine.read(query))),
                _ => Ok(Outcome::Unhandled),
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_stops_at_first_handler() {
        let mut registry = HandlerRegistry::new();
        registry.register(
            LifecycleEvent::Delete,
            "first",
            Box::new(|_| Ok(Outcome::Completed { rows_affected: 1 })),
        );
        registry.register(
            LifecycleEvent::Delete,
            "second",
            Box::new(|_| Ok(Outcome::Completed { rows_affected: 99 })),
        );

        let keys = vec![("id".to_string(), Value::Int64(1))];
        let outcome = registry
            .dispatch(&Request::Delete { entity: "Order", keys: &keys, actor: None })
            .unwrap();
        assert_eq!(outcome, Outcome::Completed { rows_affected: 1 });
    }

    #[test]
    fn test_dispatch_skips_unhandled() {
        let mut registry = HandlerRegistry::new();
        registry.register(LifecycleEvent::Read, "declines", Box::new(|_| Ok(Outcome::Unhandled)));

        let query = ReadQuery::new("Order");
        let outcome = registry.dispatch(&Request::Read { query: &query }).unwrap();
        assert_eq!(outcome, Outcome::Unhandled);
    }
}

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex;

use async_trait::async_trait;
use crate::event::error::EventSystemError;
use crate::event::{AsyncEventHandler, Event, EventId, EventResult};
use crate::kernel::error::Result;

// This type represents an owned future that returns EventResult
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = EventResult> + Send + 'a>>;

/// Handler closure registered by event name
pub type NamedHandlerFn = Box<dyn Fn(&dyn Event) -> BoxFuture<'_> + Send + Sync>;

//--------------------------------------------------
// EventDispatcher (Internal, wrapped by SharedEventDispatcher)
//--------------------------------------------------

/// Routes events to the handlers registered for their name and their type.
///
/// Name handlers run first, in registration order, then type handlers. A
/// handler returning [`EventResult::Stop`] ends propagation.
pub struct EventDispatcher {
    handlers: HashMap<&'static str, Vec<(EventId, Box<dyn AsyncEventHandler>)>>,
    type_handlers: HashMap<TypeId, Vec<(EventId, Box<dyn AsyncEventHandler>)>>,
    next_handler_id: EventId,
    dispatched: u64,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("name_handlers_count", &self.handlers.values().map(Vec::len).sum::<usize>())
            .field("type_handlers_count", &self.type_handlers.values().map(Vec::len).sum::<usize>())
            .field("next_handler_id", &self.next_handler_id)
            .field("dispatched", &self.dispatched)
            .finish()
    }
}

struct SimpleHandler {
    handler: NamedHandlerFn,
}

#[async_trait]
impl AsyncEventHandler for SimpleHandler {
    async fn handle(&self, event: &dyn Event) -> EventResult {
        (self.handler)(event).await
    }
}

/// Only reacts to events that downcast to `E`
struct TypedEventHandler<E: Event + 'static> {
    handler: Box<dyn Fn(&E) -> BoxFuture<'_> + Send + Sync>,
}

#[async_trait]
impl<E: Event + 'static> AsyncEventHandler for TypedEventHandler<E> {
    async fn handle(&self, event: &dyn Event) -> EventResult {
        match event.as_any().downcast_ref::<E>() {
            Some(e) => (self.handler)(e).await,
            None => EventResult::Continue,
        }
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            type_handlers: HashMap::new(),
            next_handler_id: 1,
            dispatched: 0,
        }
    }

    fn next_id(&mut self) -> EventId {
        let id = self.next_handler_id;
        self.next_handler_id += 1;
        id
    }

    pub fn register_handler(&mut self, event_name: &'static str, handler: NamedHandlerFn) -> EventId {
        let id = self.next_id();
        self.handlers
            .entry(event_name)
            .or_default()
            .push((id, Box::new(SimpleHandler { handler })));
        id
    }

    pub fn register_type_handler<E: Event + 'static>(
        &mut self,
        handler: Box<dyn Fn(&E) -> BoxFuture<'_> + Send + Sync>,
    ) -> EventId {
        let id = self.next_id();
        self.type_handlers
            .entry(TypeId::of::<E>())
            .or_default()
            .push((id, Box::new(TypedEventHandler { handler })));
        id
    }

    pub fn unregister_handler(&mut self, id: EventId) -> bool {
        let mut found = false;
        for handlers in self.handlers.values_mut().chain(self.type_handlers.values_mut()) {
            let len_before = handlers.len();
            handlers.retain(|(h_id, _)| *h_id != id);
            found |= handlers.len() < len_before;
        }
        found
    }

    pub async fn dispatch_internal(&mut self, event: &dyn Event) -> EventResult {
        self.dispatched += 1;
        log::trace!("Dispatching event '{}'", event.name());

        if let Some(handlers) = self.handlers.get(event.name()) {
            for (_, handler) in handlers {
                if handler.handle(event).await == EventResult::Stop {
                    return EventResult::Stop;
                }
            }
        }
        if let Some(handlers) = self.type_handlers.get(&event.as_any().type_id()) {
            for (_, handler) in handlers {
                if handler.handle(event).await == EventResult::Stop {
                    return EventResult::Stop;
                }
            }
        }
        EventResult::Continue
    }

    /// Number of events dispatched so far
    pub fn dispatched_count(&self) -> u64 {
        self.dispatched
    }

    /// Number of handlers currently registered
    pub fn handler_count(&self) -> usize {
        self.handlers.values().chain(self.type_handlers.values()).map(Vec::len).sum()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

//--------------------------------------------------
// SharedEventDispatcher (Public API)
//--------------------------------------------------

/// Thread-safe shared event dispatcher using Tokio Mutex
#[derive(Clone)]
pub struct SharedEventDispatcher {
    dispatcher: Arc<Mutex<EventDispatcher>>,
}

impl fmt::Debug for SharedEventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedEventDispatcher").finish_non_exhaustive()
    }
}

impl SharedEventDispatcher {
    pub fn new() -> Self {
        Self { dispatcher: Arc::new(Mutex::new(EventDispatcher::new())) }
    }

    pub async fn dispatch(&self, event: &dyn Event) -> Result<EventResult> {
        let mut dispatcher = self.dispatcher.lock().await;
        Ok(dispatcher.dispatch_internal(event).await)
    }

    pub async fn register_handler(&self, event_name: &'static str, handler: NamedHandlerFn) -> Result<EventId> {
        let mut dispatcher = self.dispatcher.lock().await;
        Ok(dispatcher.register_handler(event_name, handler))
    }

    pub async fn register_type_handler<E: Event + 'static>(
        &self,
        handler: Box<dyn Fn(&E) -> BoxFuture<'_> + Send + Sync>,
    ) -> Result<EventId> {
        let mut dispatcher = self.dispatcher.lock().await;
        Ok(dispatcher.register_type_handler::<E>(handler))
    }

    pub async fn unregister_handler(&self, id: EventId) -> Result<()> {
        let mut dispatcher = self.dispatcher.lock().await;
        if dispatcher.unregister_handler(id) {
            Ok(())
        } else {
            Err(EventSystemError::UnknownHandler { id }.into())
        }
    }

    pub async fn dispatched_count(&self) -> u64 {
        self.dispatcher.lock().await.dispatched_count()
    }

    pub async fn handler_count(&self) -> usize {
        self.dispatcher.lock().await.handler_count()
    }
}

impl Default for SharedEventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

//--------------------------------------------------
// Helper Functions
//--------------------------------------------------

/// Wrap a synchronous closure as a name handler
pub fn sync_event_handler<F>(f: F) -> NamedHandlerFn
where
    F: Fn(&dyn Event) -> EventResult + Send + Sync + 'static,
{
    Box::new(move |event| {
        let result = f(event);
        Box::pin(async move { result })
    })
}

/// Wrap a synchronous closure as a typed handler
pub fn sync_typed_handler<E, F>(f: F) -> Box<dyn Fn(&E) -> BoxFuture<'_> + Send + Sync>
where
    E: Event + 'static,
    F: Fn(&E) -> EventResult + Send + Sync + 'static,
{
    Box::new(move |event| {
        let result = f(event);
        Box::pin(async move { result })
    })
}

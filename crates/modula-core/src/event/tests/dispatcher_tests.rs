use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::event::dispatcher::{EventDispatcher, sync_event_handler, sync_typed_handler};
use crate::event::types::TestEvent;
use crate::event::{Event, EventResult, ModuleEvent, SharedEventDispatcher};
use crate::kernel::error::Error;
use crate::event::error::EventSystemError;

#[tokio::test]
async fn test_handler_registration_and_dispatch() {
    let mut dispatcher = EventDispatcher::new();
    let counter = Arc::new(AtomicU32::new(0));

    let counter_clone = Arc::clone(&counter);
    let handler_id = dispatcher.register_handler(
        "test.event",
        sync_event_handler(move |event: &dyn Event| {
            assert_eq!(event.name(), "test.event");
            counter_clone.fetch_add(1, Ordering::SeqCst);
            EventResult::Continue
        }),
    );
    assert!(handler_id > 0, "Handler ID should be positive");

    let result = dispatcher.dispatch_internal(&TestEvent::new("test.event")).await;
    assert_eq!(result, EventResult::Continue);
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    // Different name, handler untouched
    dispatcher.dispatch_internal(&TestEvent::new("other.event")).await;
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(dispatcher.dispatched_count(), 2);
}

#[tokio::test]
async fn test_stop_halts_propagation() {
    let mut dispatcher = EventDispatcher::new();
    let counter = Arc::new(AtomicU32::new(0));

    dispatcher.register_handler("halt", sync_event_handler(|_| EventResult::Stop));
    let counter_clone = Arc::clone(&counter);
    dispatcher.register_handler(
        "halt",
        sync_event_handler(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            EventResult::Continue
        }),
    );

    let result = dispatcher.dispatch_internal(&TestEvent::new("halt")).await;

    assert_eq!(result, EventResult::Stop);
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_typed_handler_receives_module_events_only() {
    let dispatcher = SharedEventDispatcher::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let seen_clone = Arc::clone(&seen);
    dispatcher
        .register_type_handler::<ModuleEvent>(sync_typed_handler(move |event: &ModuleEvent| {
            seen_clone.lock().unwrap().push(event.clone());
            EventResult::Continue
        }))
        .await
        .unwrap();

    dispatcher.dispatch(&ModuleEvent::Enabled { name: "Blog".into() }).await.unwrap();
    dispatcher.dispatch(&TestEvent::new("module.enabled")).await.unwrap();
    dispatcher.dispatch(&ModuleEvent::CacheCleared).await.unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![ModuleEvent::Enabled { name: "Blog".into() }, ModuleEvent::CacheCleared]
    );
    assert_eq!(dispatcher.dispatched_count().await, 3);
}

#[tokio::test]
async fn test_unregister_handler() {
    let dispatcher = SharedEventDispatcher::new();
    let counter = Arc::new(AtomicU32::new(0));

    let counter_clone = Arc::clone(&counter);
    let id = dispatcher
        .register_handler(
            ModuleEvent::DISABLED,
            sync_event_handler(move |_| {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                EventResult::Continue
            }),
        )
        .await
        .unwrap();
    assert_eq!(dispatcher.handler_count().await, 1);

    dispatcher.unregister_handler(id).await.unwrap();
    dispatcher.dispatch(&ModuleEvent::Disabled { name: "Blog".into() }).await.unwrap();

    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert_eq!(dispatcher.handler_count().await, 0);

    let again = dispatcher.unregister_handler(id).await;
    assert!(matches!(
        again,
        Err(Error::EventSystem(EventSystemError::UnknownHandler { id: missing })) if missing == id
    ));
}

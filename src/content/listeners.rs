/// DOM subscriptions that detach themselves when dropped
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, MutationObserver, MutationObserverInit, MutationRecord, Node};

/// One `addEventListener` registration
pub struct EventSubscription {
    target: EventTarget,
    event: &'static str,
    capture: bool,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventSubscription {
    pub fn new(
        target: &EventTarget,
        event: &'static str,
        capture: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<EventSubscription, JsValue> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback_and_bool(
            event,
            callback.as_ref().unchecked_ref(),
            capture,
        )?;

        Ok(EventSubscription {
            target: target.clone(),
            event,
            capture,
            callback,
        })
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            self.event,
            self.callback.as_ref().unchecked_ref(),
            self.capture,
        );
    }
}

/// A MutationObserver on a subtree, disconnected on drop
pub struct MutationWatch {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
}

impl MutationWatch {
    /// Watch child list changes and `class`/`style`/`hidden` attribute changes
    pub fn new(
        root: &Node,
        mut handler: impl FnMut(Vec<MutationRecord>) + 'static,
    ) -> Result<MutationWatch, JsValue> {
        let callback = Closure::wrap(Box::new(move |records: js_sys::Array, _: MutationObserver| {
            let records = records
                .iter()
                .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
                .collect();
            handler(records);
        }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;

        let filter = js_sys::Array::of3(&"class".into(), &"style".into(), &"hidden".into());
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        options.set_attributes(true);
        options.set_attribute_filter(&filter);
        observer.observe_with_options(root, &options)?;

        Ok(MutationWatch {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for MutationWatch {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Everything attached for one activation, released together
#[derive(Default)]
pub struct Subscriptions {
    events: Vec<EventSubscription>,
    mutations: Option<MutationWatch>,
}

impl Subscriptions {
    /// Build a complete set or nothing: on error the partial set is dropped
    pub fn acquire(
        build: impl FnOnce(&mut Subscriptions) -> Result<(), JsValue>,
    ) -> Result<Subscriptions, JsValue> {
        let mut subscriptions = Subscriptions::default();
        build(&mut subscriptions)?;
        Ok(subscriptions)
    }

    pub fn listen(
        &mut self,
        target: &EventTarget,
        event: &'static str,
        capture: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        self.events
            .push(EventSubscription::new(target, event, capture, handler)?);
        Ok(())
    }

    pub fn watch(
        &mut self,
        root: &Node,
        handler: impl FnMut(Vec<MutationRecord>) + 'static,
    ) -> Result<(), JsValue> {
        self.mutations = Some(MutationWatch::new(root, handler)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.events.len() + usize::from(self.mutations.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Document event listeners and htmx event decoding.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CustomEvent, Document, Element, Event, EventTarget};

use hxbusy_core::{EventDetail, Outcome, SignalKind};
use hxbusy_types::ExclusionRules;

use crate::DomCoordinator;
use crate::dom::DomRegion;
use crate::error::InstallError;

/// Property stamped on each request's xhr: the request key while it is
/// tracked, then a marker once it was excluded or released.
const STAMP_PROPERTY: &str = "__hxbusyKey";
const EXCLUDED_MARKER: &str = "excluded";
const RELEASED_MARKER: &str = "released";

/// An event listener that unregisters itself on drop.
pub(crate) struct Listener {
    target: EventTarget,
    name: String,
    capture: bool,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub(crate) fn add(
        target: &EventTarget,
        name: &str,
        capture: bool,
        closure: Closure<dyn FnMut(Event)>,
    ) -> Result<Self, InstallError> {
        target
            .add_event_listener_with_callback_and_bool(
                name,
                closure.as_ref().unchecked_ref(),
                capture,
            )
            .map_err(InstallError::dom)?;
        Ok(Self {
            target: target.clone(),
            name: name.to_string(),
            capture,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            &self.name,
            self.closure.as_ref().unchecked_ref(),
            self.capture,
        );
    }
}

enum Stamp {
    Key(u64),
    Excluded,
    /// Settled once; the host's later terminal events for it are dropped.
    Released,
}

/// Turns htmx DOM events into coordinator dispatches.
pub(crate) struct Ingress {
    document: Document,
    rules: ExclusionRules,
    next_key: Cell<u64>,
}

impl Ingress {
    pub(crate) fn new(document: Document, rules: ExclusionRules) -> Self {
        Self {
            document,
            rules,
            next_key: Cell::new(1),
        }
    }

    pub(crate) fn on_event(&self, coordinator: &RefCell<DomCoordinator>, name: &str, event: &Event) {
        let Ok(mut coordinator) = coordinator.try_borrow_mut() else {
            tracing::warn!(event = name, "Coordinator busy, event dropped");
            return;
        };
        let Some(kind) = coordinator.events().classify(name) else {
            return;
        };

        let payload = event
            .dyn_ref::<CustomEvent>()
            .map(CustomEvent::detail)
            .unwrap_or(JsValue::UNDEFINED);
        let xhr = property(&payload, "xhr");
        let target = property(&payload, "target").and_then(into_element);
        let element = property(&payload, "elt")
            .and_then(into_element)
            .or_else(|| event.target().and_then(|t| t.dyn_into::<Element>().ok()));

        let mut detail = EventDetail::new();
        let mut stamped = None;
        if kind == SignalKind::Start {
            detail.target_is_page_root = target
                .as_ref()
                .zip(self.document.body())
                .is_some_and(|(target, body)| target.is_same_node(Some(body.as_ref())));
            detail.boosted = property(&payload, "boosted").and_then(|v| v.as_bool()) == Some(true)
                || element
                    .as_ref()
                    .is_some_and(|elt| elt.has_attribute(&self.rules.boost_attribute));
            detail.opted_out = self.rules.is_opted_out(
                element
                    .as_ref()
                    .and_then(|elt| elt.get_attribute(&self.rules.opt_out_attribute))
                    .as_deref(),
            );
            detail.preloaded = self.rules.is_preloaded(self.preload_header(&payload).as_deref());
            if let Some(xhr) = &xhr {
                let key = self.next_key.get();
                self.next_key.set(key + 1);
                stamp(xhr, Stamp::Key(key));
                detail.request = Some(key);
                stamped = Some(xhr);
            }
        } else {
            match xhr.as_ref().and_then(read_stamp) {
                Some(Stamp::Excluded | Stamp::Released) => return,
                Some(Stamp::Key(key)) => detail.request = Some(key),
                None => {}
            }
        }
        detail.target = target.map(DomRegion);
        detail.element = element.map(DomRegion);

        let outcome = coordinator.dispatch(name, detail);
        match (&outcome, stamped, xhr.as_ref()) {
            // Keeps this request's terminal events away from element matching.
            (Outcome::Ignored, Some(xhr), _) => stamp(xhr, Stamp::Excluded),
            (Outcome::Released { .. }, _, Some(xhr)) => stamp(xhr, Stamp::Released),
            _ => {}
        }
        tracing::trace!(event = name, ?outcome, "htmx event handled");
    }

    fn preload_header(&self, payload: &JsValue) -> Option<String> {
        property(payload, "requestConfig")
            .and_then(|config| property(&config, "headers"))
            .and_then(|headers| property(&headers, &self.rules.preload_header))
            .and_then(|value| value.as_string())
    }
}

/// Register one document listener per event name in the coordinator's table.
pub(crate) fn listen(
    document: &Document,
    coordinator: &Rc<RefCell<DomCoordinator>>,
    ingress: &Rc<Ingress>,
) -> Result<Vec<Listener>, InstallError> {
    let names: Vec<String> = coordinator
        .borrow()
        .events()
        .names()
        .map(str::to_string)
        .collect();

    names
        .into_iter()
        .map(|name| {
            let coordinator = Rc::clone(coordinator);
            let ingress = Rc::clone(ingress);
            let event_name = name.clone();
            let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                ingress.on_event(&coordinator, &event_name, &event);
            });
            Listener::add(document, &name, false, closure)
        })
        .collect()
}

fn property(object: &JsValue, key: &str) -> Option<JsValue> {
    if !object.is_object() {
        return None;
    }
    Reflect::get(object, &JsValue::from_str(key))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

fn into_element(value: JsValue) -> Option<Element> {
    value.dyn_into::<Element>().ok()
}

fn stamp(xhr: &JsValue, value: Stamp) {
    let value = match value {
        Stamp::Key(key) => JsValue::from_f64(key as f64),
        Stamp::Excluded => JsValue::from_str(EXCLUDED_MARKER),
        Stamp::Released => JsValue::from_str(RELEASED_MARKER),
    };
    if Reflect::set(xhr, &JsValue::from_str(STAMP_PROPERTY), &value).is_err() {
        tracing::debug!("Request object rejected stamp");
    }
}

fn read_stamp(xhr: &JsValue) -> Option<Stamp> {
    let value = property(xhr, STAMP_PROPERTY)?;
    if let Some(key) = value.as_f64() {
        return Some(Stamp::Key(key as u64));
    }
    match value.as_string().as_deref() {
        Some(EXCLUDED_MARKER) => Some(Stamp::Excluded),
        Some(RELEASED_MARKER) => Some(Stamp::Released),
        _ => None,
    }
}

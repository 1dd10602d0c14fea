//! Event classification and ingress
//!
//! Host bindings extract an [`EventDetail`] from each host event and call
//! [`classify`] with the event name. The configured
//! [`EventTable`](hxbusy_types::EventTable) decides which [`SignalKind`] the
//! name maps to; the detail supplies the payload and the exclusion flags.
//!
//! ```text
//!   "htmx:beforeRequest" ──┐
//!   "htmx:afterRequest"  ──┤   EventTable    ┌─ Start(target, handle)
//!   "htmx:abort"         ──┼───────────────▶─┼─ Terminal(kind, handle, element)
//!   "htmx:historyRestore"──┤                 ├─ NavigationInvalidate
//!   "htmx:beforeCleanup…"──┘                 └─ PreCleanup(element)
//! ```

mod signal;

pub use signal::{Classified, Exclusion, Signal, StartRequest, Target};

use hxbusy_types::{EventTable, SignalKind};

/// Fields a host binding reads from one event.
#[derive(Debug, Clone)]
pub struct EventDetail<R, H> {
    /// Region the response will be swapped into.
    pub target: Option<R>,
    /// Element that issued the request, or the element an event is about.
    pub element: Option<R>,
    pub request: Option<H>,
    pub boosted: bool,
    /// `target` is the document body.
    pub target_is_page_root: bool,
    pub preloaded: bool,
    pub opted_out: bool,
}

impl<R, H> EventDetail<R, H> {
    pub fn new() -> Self {
        Self {
            target: None,
            element: None,
            request: None,
            boosted: false,
            target_is_page_root: false,
            preloaded: false,
            opted_out: false,
        }
    }

    pub fn with_target(mut self, target: R) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_element(mut self, element: R) -> Self {
        self.element = Some(element);
        self
    }

    pub fn with_request(mut self, request: H) -> Self {
        self.request = Some(request);
        self
    }

    pub fn boosted(mut self) -> Self {
        self.boosted = true;
        self
    }

    pub fn page_root(mut self) -> Self {
        self.target_is_page_root = true;
        self
    }
}

impl<R, H> Default for EventDetail<R, H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify one host event.
pub fn classify<R, H>(table: &EventTable, name: &str, detail: EventDetail<R, H>) -> Classified<R, H> {
    let Some(kind) = table.classify(name) else {
        return Classified::Unknown;
    };
    classify_kind(kind, detail)
}

/// Build the signal for an already-classified event.
pub fn classify_kind<R, H>(kind: SignalKind, detail: EventDetail<R, H>) -> Classified<R, H> {
    let EventDetail {
        target,
        element,
        request,
        boosted,
        target_is_page_root,
        preloaded,
        opted_out,
    } = detail;

    let signal = match kind {
        SignalKind::Start => {
            if preloaded {
                return Classified::Excluded(Exclusion::Preloaded);
            }
            if opted_out {
                return Classified::Excluded(Exclusion::OptedOut);
            }
            let target = if target_is_page_root || boosted {
                Target::Page
            } else {
                match target {
                    Some(region) => Target::Region(region),
                    None => return Classified::Excluded(Exclusion::MissingTarget),
                }
            };
            Signal::Start(StartRequest { target, request })
        }
        SignalKind::Terminal(kind) => Signal::Terminal {
            kind,
            request,
            element: target.or(element),
        },
        SignalKind::NavigationInvalidate => Signal::NavigationInvalidate,
        SignalKind::PreCleanup => Signal::PreCleanup {
            element: target.or(element),
        },
    };
    Classified::Signal(signal)
}

//! Host event vocabulary.
//!
//! The host library emits many overlapping event names over one request
//! lifecycle, several of which mean "this request is over". [`EventTable`]
//! folds those names onto the closed [`SignalKind`] set that the coordinator
//! understands, so the set of names is configuration rather than code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How a request concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalKind {
    Success,
    Error,
    Abort,
    Timeout,
    SendError,
    SwapError,
    LoadError,
}

impl TerminalKind {
    pub const ALL: [TerminalKind; 7] = [
        TerminalKind::Success,
        TerminalKind::Error,
        TerminalKind::Abort,
        TerminalKind::Timeout,
        TerminalKind::SendError,
        TerminalKind::SwapError,
        TerminalKind::LoadError,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Abort => "abort",
            Self::Timeout => "timeout",
            Self::SendError => "send_error",
            Self::SwapError => "swap_error",
            Self::LoadError => "load_error",
        }
    }
}

impl std::fmt::Display for TerminalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of lifecycle signals the coordinator reacts to.
///
/// Serialized externally tagged, so in TOML a unit variant is a bare string
/// (`"start"`) and a terminal is a table (`{ terminal = "abort" }`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// A request is about to be sent.
    Start,
    /// A request concluded. Hosts may emit several of these per request.
    Terminal(TerminalKind),
    /// History restore/replace swapped out the document; element identity
    /// can no longer be trusted.
    NavigationInvalidate,
    /// An element is about to be removed from the document.
    PreCleanup,
}

impl SignalKind {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal(_))
    }
}

/// Mapping from host event names to [`SignalKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTable {
    events: BTreeMap<String, SignalKind>,
}

/// Event names emitted by htmx 1.x/2.x, grouped by the signal they map to.
const HTMX_EVENTS: &[(&str, SignalKind)] = &[
    ("htmx:beforeRequest", SignalKind::Start),
    ("htmx:afterRequest", SignalKind::Terminal(TerminalKind::Success)),
    ("htmx:beforeSwap", SignalKind::Terminal(TerminalKind::Success)),
    ("htmx:afterSwap", SignalKind::Terminal(TerminalKind::Success)),
    ("htmx:afterSettle", SignalKind::Terminal(TerminalKind::Success)),
    ("htmx:beforeOnLoad", SignalKind::Terminal(TerminalKind::Success)),
    ("htmx:afterOnLoad", SignalKind::Terminal(TerminalKind::Success)),
    ("htmx:xhr:loadend", SignalKind::Terminal(TerminalKind::Success)),
    ("htmx:responseError", SignalKind::Terminal(TerminalKind::Error)),
    ("htmx:abort", SignalKind::Terminal(TerminalKind::Abort)),
    ("htmx:sendAbort", SignalKind::Terminal(TerminalKind::Abort)),
    ("htmx:timeout", SignalKind::Terminal(TerminalKind::Timeout)),
    ("htmx:sendError", SignalKind::Terminal(TerminalKind::SendError)),
    ("htmx:swapError", SignalKind::Terminal(TerminalKind::SwapError)),
    ("htmx:onLoadError", SignalKind::Terminal(TerminalKind::LoadError)),
    ("htmx:historyRestore", SignalKind::NavigationInvalidate),
    ("htmx:replacedInHistory", SignalKind::NavigationInvalidate),
    ("htmx:beforeCleanupElement", SignalKind::PreCleanup),
];

impl EventTable {
    /// A table that classifies nothing.
    pub fn empty() -> Self {
        Self {
            events: BTreeMap::new(),
        }
    }

    /// The stock htmx mapping.
    pub fn htmx() -> Self {
        Self {
            events: HTMX_EVENTS
                .iter()
                .map(|(name, kind)| ((*name).to_string(), *kind))
                .collect(),
        }
    }

    /// Classify a host event name. Unknown names yield `None`.
    pub fn classify(&self, name: &str) -> Option<SignalKind> {
        self.events.get(name).copied()
    }

    /// Add or replace a mapping, returning the previous kind.
    pub fn insert(&mut self, name: impl Into<String>, kind: SignalKind) -> Option<SignalKind> {
        self.events.insert(name.into(), kind)
    }

    pub fn remove(&mut self, name: &str) -> Option<SignalKind> {
        self.events.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SignalKind)> {
        self.events.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    /// Event names the host binding must subscribe to.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether any name maps to [`SignalKind::Start`]. Without one, nothing
    /// would ever be registered.
    pub fn has_start(&self) -> bool {
        self.events.values().any(|kind| *kind == SignalKind::Start)
    }
}

impl Default for EventTable {
    fn default() -> Self {
        Self::htmx()
    }
}

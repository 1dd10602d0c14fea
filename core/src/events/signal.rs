use hxbusy_types::TerminalKind;

/// Where a starting request should show its indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<R> {
    /// Whole page: the target is the document body, or the request is boosted.
    Page,
    Region(R),
}

/// A request that passed the exclusion filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest<R, H> {
    pub target: Target<R>,
    pub request: Option<H>,
}

/// Lifecycle signals the coordinator reacts to, with their payloads.
///
/// Mirrors [`SignalKind`](hxbusy_types::SignalKind) one to one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal<R, H> {
    Start(StartRequest<R, H>),
    /// A request concluded. Resolved by request handle first, then by element.
    Terminal {
        kind: TerminalKind,
        request: Option<H>,
        element: Option<R>,
    },
    /// Element identity is no longer trustworthy; clear everything.
    NavigationInvalidate,
    /// `element` is about to leave the document.
    PreCleanup { element: Option<R> },
}

/// Why a start event was not tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Issued by the preload extension ahead of any user action.
    Preloaded,
    /// The initiating element lists this extension in its opt-out attribute.
    OptedOut,
    /// Neither a target region nor a page-scoped request.
    MissingTarget,
}

impl Exclusion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Preloaded => "preloaded",
            Self::OptedOut => "opted_out",
            Self::MissingTarget => "missing_target",
        }
    }
}

/// Result of classifying one host event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified<R, H> {
    Signal(Signal<R, H>),
    /// A start event that must not be tracked.
    Excluded(Exclusion),
    /// Not an event this coordinator listens to.
    Unknown,
}

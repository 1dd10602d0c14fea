//! Presentation port
//!
//! The coordinator never touches the document. It issues create/show/hide/
//! remove transitions through [`PresentationPort`], which the browser binding
//! implements on top of the DOM and tests implement with a headless double.

use std::fmt::Debug;

/// A node of the host document that an operation targets.
pub trait Region: Clone + Debug {
    /// Node identity.
    fn same_node(&self, other: &Self) -> bool;

    /// Inclusive descendant test: `true` if `other` is this node or lies inside it.
    fn contains(&self, other: &Self) -> bool;

    /// Identity, or containment in either direction.
    fn overlaps(&self, other: &Self) -> bool {
        self.same_node(other) || self.contains(other) || other.contains(self)
    }
}

/// Marker classes toggled on a local target while its indicator is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoadingMarker {
    /// Overlay tier.
    Loading,
    /// Spinner tier.
    Spinner,
}

/// Visual side of the indicator lifecycle.
///
/// Local visuals are owned by the coordinator's entries and handed back for
/// removal; the global overlay/spinner pair is owned by the port itself and
/// only shown or hidden, never destroyed until [`dispose`](Self::dispose).
pub trait PresentationPort {
    type Region: Region;
    type Overlay;
    type Spinner;

    /// Create an overlay covering `region`. `None` if the host refused.
    fn create_overlay(&mut self, region: &Self::Region) -> Option<Self::Overlay>;

    /// Make sure a previously created overlay is still in the document,
    /// re-appending it if a swap detached it, and position it over `region`.
    fn attach_overlay(&mut self, overlay: &Self::Overlay, region: &Self::Region);

    /// Re-read `region` bounds and move the overlay accordingly.
    fn position_overlay(&mut self, overlay: &Self::Overlay, region: &Self::Region);

    /// Detach and drop an overlay. Must tolerate an overlay that is already detached.
    fn remove_overlay(&mut self, overlay: Self::Overlay);

    /// Create a spinner nested in `overlay`.
    fn create_spinner(&mut self, overlay: &Self::Overlay) -> Option<Self::Spinner>;

    fn remove_spinner(&mut self, spinner: Self::Spinner);

    fn set_marker(&mut self, region: &Self::Region, marker: LoadingMarker, on: bool);

    /// Show the page-wide overlay, creating or re-attaching it as needed.
    fn show_global_overlay(&mut self);

    /// Nest the page-wide spinner in the page-wide overlay.
    fn show_global_spinner(&mut self);

    /// Hide the page-wide overlay and detach its spinner.
    fn hide_global(&mut self);

    /// Release every visual the port still owns.
    fn dispose(&mut self) {}
}

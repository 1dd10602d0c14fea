//! DOM implementation of the presentation port.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

use hxbusy_core::{LoadingMarker, PresentationPort, Region};
use hxbusy_types::ClassNames;

/// A document element targeted by a request.
#[derive(Debug, Clone)]
pub struct DomRegion(pub Element);

impl Region for DomRegion {
    fn same_node(&self, other: &Self) -> bool {
        self.0.is_same_node(Some(other.0.as_ref()))
    }

    fn contains(&self, other: &Self) -> bool {
        // Node.contains is inclusive.
        self.0.contains(Some(other.0.as_ref()))
    }
}

/// Presents indicators as `div`s appended to the document body.
///
/// Local overlays are `position: fixed` and sized from the target's
/// bounding rectangle, so they never disturb the target's own layout.
pub struct DomPresenter {
    document: Document,
    classes: ClassNames,
    global_overlay: Option<HtmlElement>,
    global_spinner: Option<Element>,
}

impl DomPresenter {
    pub fn new(document: Document, classes: ClassNames) -> Self {
        Self {
            document,
            classes,
            global_overlay: None,
            global_spinner: None,
        }
    }

    fn create_div(&self, class: &str) -> Option<HtmlElement> {
        let element = self
            .document
            .create_element("div")
            .map_err(|err| log_dom_error("create_element", &err))
            .ok()?;
        element.set_class_name(class);
        element.dyn_into::<HtmlElement>().ok()
    }

    /// Append `element` to the body unless it is already inside it.
    fn append_to_body(&self, element: &Element) -> bool {
        let Some(body) = self.document.body() else {
            tracing::warn!("Document has no body");
            return false;
        };
        if body.contains(Some(element.as_ref())) {
            return true;
        }
        body.append_child(element)
            .map_err(|err| log_dom_error("append_child", &err))
            .is_ok()
    }

    fn marker_class(&self, marker: LoadingMarker) -> &str {
        match marker {
            LoadingMarker::Loading => &self.classes.loading,
            LoadingMarker::Spinner => &self.classes.show_spinner,
        }
    }

    fn detach_global_spinner(&self) {
        if let Some(spinner) = &self.global_spinner
            && spinner.parent_node().is_some()
        {
            spinner.remove();
        }
    }
}

impl PresentationPort for DomPresenter {
    type Region = DomRegion;
    type Overlay = HtmlElement;
    type Spinner = Element;

    fn create_overlay(&mut self, region: &DomRegion) -> Option<HtmlElement> {
        let overlay = self.create_div(&self.classes.local_overlay)?;
        if !self.append_to_body(&overlay) {
            return None;
        }
        self.position_overlay(&overlay, region);
        Some(overlay)
    }

    fn attach_overlay(&mut self, overlay: &HtmlElement, region: &DomRegion) {
        if self.append_to_body(overlay) {
            self.position_overlay(overlay, region);
        }
    }

    fn position_overlay(&mut self, overlay: &HtmlElement, region: &DomRegion) {
        let rect = region.0.get_bounding_client_rect();
        let style = overlay.style();
        for (property, value) in [
            ("top", rect.top()),
            ("left", rect.left()),
            ("width", rect.width()),
            ("height", rect.height()),
        ] {
            if let Err(err) = style.set_property(property, &format!("{value}px")) {
                log_dom_error("set_property", &err);
            }
        }
    }

    fn remove_overlay(&mut self, overlay: HtmlElement) {
        if overlay.parent_node().is_some() {
            overlay.remove();
        }
    }

    fn create_spinner(&mut self, overlay: &HtmlElement) -> Option<Element> {
        let spinner: Element = self.create_div(&self.classes.local_spinner)?.into();
        overlay
            .append_child(&spinner)
            .map_err(|err| log_dom_error("append_child", &err))
            .ok()?;
        Some(spinner)
    }

    fn remove_spinner(&mut self, spinner: Element) {
        if spinner.parent_node().is_some() {
            spinner.remove();
        }
    }

    fn set_marker(&mut self, region: &DomRegion, marker: LoadingMarker, on: bool) {
        let class = self.marker_class(marker);
        let list = region.0.class_list();
        let result = if on { list.add_1(class) } else { list.remove_1(class) };
        if let Err(err) = result {
            log_dom_error("class_list", &err);
        }
    }

    fn show_global_overlay(&mut self) {
        if self.global_overlay.is_none() {
            self.global_overlay = self.create_div(&self.classes.global_overlay);
        }
        let Some(overlay) = &self.global_overlay else {
            return;
        };
        // A body swap may have dropped it.
        if !self.append_to_body(overlay) {
            return;
        }
        if let Err(err) = overlay.style().set_property("display", "flex") {
            log_dom_error("set_property", &err);
        }
        self.detach_global_spinner();
    }

    fn show_global_spinner(&mut self) {
        if self.global_spinner.is_none() {
            self.global_spinner = self
                .create_div(&self.classes.global_spinner)
                .map(Element::from);
        }
        let (Some(overlay), Some(spinner)) = (&self.global_overlay, &self.global_spinner) else {
            return;
        };
        // Also dropped by a body swap between the two timers.
        if !self.append_to_body(overlay) {
            return;
        }
        if spinner.parent_node().is_none()
            && let Err(err) = overlay.append_child(spinner)
        {
            log_dom_error("append_child", &err);
        }
    }

    fn hide_global(&mut self) {
        if let Some(overlay) = &self.global_overlay
            && let Err(err) = overlay.style().set_property("display", "none")
        {
            log_dom_error("set_property", &err);
        }
        self.detach_global_spinner();
        self.global_spinner = None;
    }

    fn dispose(&mut self) {
        self.detach_global_spinner();
        self.global_spinner = None;
        if let Some(overlay) = self.global_overlay.take() {
            overlay.remove();
        }
    }
}

fn log_dom_error(call: &str, err: &JsValue) {
    tracing::warn!(call, error = ?err, "DOM call failed");
}

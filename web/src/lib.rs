//! Browser binding for the busy-indicator coordinator.
//!
//! ```js
//! import init, { install, uninstall } from "./pkg/hxbusy_web.js";
//! await init();
//! install({ overlay_delay_ms: 150, tracking: "follow_layout" });
//! ```
//!
//! [`install`] wires one coordinator to the current document: a listener per
//! configured htmx event on `document`, `setTimeout` timers, and the injected
//! stylesheet. [`uninstall`] tears all of it down again.

pub mod dom;
pub mod error;
mod ingress;
pub mod logging;
pub mod style;
pub mod timers;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event};

use hxbusy_core::{Coordinator, IndicatorConfig, OverlayTracking};

pub use dom::{DomPresenter, DomRegion};
pub use error::InstallError;
pub use timers::GlooScheduler;

use ingress::{Ingress, Listener};

pub type DomCoordinator = Coordinator<DomPresenter, GlooScheduler, u64>;

/// Everything one `install` call created.
struct Installation {
    coordinator: Rc<RefCell<DomCoordinator>>,
    // Dropping these unregisters the document/window listeners.
    _listeners: Vec<Listener>,
    style: Option<Element>,
}

impl Drop for Installation {
    fn drop(&mut self) {
        if let Ok(mut coordinator) = self.coordinator.try_borrow_mut() {
            coordinator.dispose();
        }
        if let Some(style) = self.style.take() {
            style.remove();
        }
    }
}

thread_local! {
    static INSTALLED: RefCell<Option<Installation>> = const { RefCell::new(None) };
}

/// Install busy indicators on the current document.
///
/// `config` is a plain object with the same shape as the TOML config; missing
/// fields take their defaults and `undefined` means all defaults.
#[wasm_bindgen]
pub fn install(config: JsValue) -> Result<(), JsValue> {
    let config: IndicatorConfig = if config.is_undefined() || config.is_null() {
        IndicatorConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(InstallError::from)?
    };
    install_with(config).map_err(JsValue::from)
}

/// Remove every listener, indicator and style this binding added.
#[wasm_bindgen]
pub fn uninstall() {
    let installation = INSTALLED.with(|slot| slot.borrow_mut().take());
    if installation.is_none() {
        tracing::debug!("Nothing to uninstall");
    }
}

#[wasm_bindgen(js_name = isInstalled)]
pub fn is_installed() -> bool {
    INSTALLED.with(|slot| slot.borrow().is_some())
}

/// Number of live indicator entries; handy from the devtools console.
#[wasm_bindgen(js_name = activeIndicators)]
pub fn active_indicators() -> usize {
    INSTALLED.with(|slot| {
        slot.borrow()
            .as_ref()
            .and_then(|installation| installation.coordinator.try_borrow().ok())
            .map(|coordinator| coordinator.registry().len())
            .unwrap_or(0)
    })
}

/// Rust entry point behind [`install`].
pub fn install_with(config: IndicatorConfig) -> Result<(), InstallError> {
    logging::init(&config.log_level);
    hxbusy_core::config::validate(&config)?;

    if is_installed() {
        return Err(InstallError::AlreadyInstalled);
    }
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or(InstallError::NoDocument)?;

    let presenter = DomPresenter::new(document.clone(), config.classes.clone());
    let coordinator: Rc<RefCell<DomCoordinator>> = Rc::new_cyclic(|weak| {
        RefCell::new(Coordinator::new(
            &config,
            presenter,
            GlooScheduler::new(weak.clone()),
        ))
    });

    let ingress = Rc::new(Ingress::new(document.clone(), config.exclusion.clone()));
    let mut listeners = ingress::listen(&document, &coordinator, &ingress)?;
    if config.tracking == OverlayTracking::FollowLayout {
        listeners.extend(layout_listeners(&document, &coordinator)?);
    }

    let style = if config.style.inject {
        Some(inject_style(&document, &config)?)
    } else {
        None
    };

    coordinator.borrow_mut().install();
    INSTALLED.with(|slot| {
        *slot.borrow_mut() = Some(Installation {
            coordinator,
            _listeners: listeners,
            style,
        });
    });
    Ok(())
}

/// Scroll (captured, so nested scroll containers count) and resize re-position
/// visible overlays.
fn layout_listeners(
    document: &Document,
    coordinator: &Rc<RefCell<DomCoordinator>>,
) -> Result<Vec<Listener>, InstallError> {
    let window = web_sys::window().ok_or(InstallError::NoDocument)?;
    let refresh = |coordinator: &Rc<RefCell<DomCoordinator>>| {
        let coordinator = Rc::clone(coordinator);
        Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            if let Ok(mut coordinator) = coordinator.try_borrow_mut() {
                coordinator.refresh_layout();
            }
        })
    };
    Ok(vec![
        Listener::add(document, "scroll", true, refresh(coordinator))?,
        Listener::add(&window, "resize", false, refresh(coordinator))?,
    ])
}

fn inject_style(document: &Document, config: &IndicatorConfig) -> Result<Element, InstallError> {
    if let Some(existing) = document.get_element_by_id(style::STYLE_ELEMENT_ID) {
        existing.remove();
    }
    let element = document.create_element("style").map_err(InstallError::dom)?;
    element.set_id(style::STYLE_ELEMENT_ID);
    let css = style::stylesheet(&config.style, &config.classes);
    element.set_text_content(Some(css.as_str()));
    let head = document.head().ok_or(InstallError::NoDocument)?;
    head.append_child(&element).map_err(InstallError::dom)?;
    Ok(element)
}

//! A [`Host`] backed by the browser DOM.
//!
//! The picker lives in an `Rc<RefCell<..>>` owned by the JS-facing wrapper.
//! Event closures hold only a `Weak` handle and borrow with
//! `try_borrow_mut`, so an event fired while the picker is already
//! borrowed is dropped. Listeners unsubscribe when dropped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use datepicker_core::host::{FieldSlot, Host, SystemClock};
use datepicker_core::options::PickerOptions;
use datepicker_core::view::PanelView;
use datepicker_core::widget::{AnchorKey, Binding, DatePicker};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, Event, EventInit, EventTarget, HtmlElement, HtmlInputElement,
    HtmlTextAreaElement, KeyboardEvent, Node, Window,
};

use crate::render::{panel_html, parse_action, Theme};

pub(crate) type Picker = DatePicker<DomHost, SystemClock>;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("`window` is not available"))
}

fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("`document` is not available"))
}

fn create(document: &Document, tag: &str, class: &str) -> Result<HtmlElement, JsValue> {
    let el: HtmlElement = document.create_element(tag)?.dyn_into()?;
    el.set_class_name(class.trim());
    Ok(el)
}

/// Run `f` on the picker unless it is gone or already borrowed.
fn with_picker(handle: &Weak<RefCell<Picker>>, f: impl FnOnce(&mut Picker)) {
    let Some(picker) = handle.upgrade() else {
        return;
    };
    match picker.try_borrow_mut() {
        Ok(mut picker) => f(&mut picker),
        Err(_) => log::debug!("picker busy; event dropped"),
    };
}

// ── Fields ──────────────────────────────────────────────────────────────────

/// A form control that receives a picker value.
#[derive(Clone)]
enum FieldElement {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
}

impl FieldElement {
    /// `root` itself as a field, if it is an `<input>` or `<textarea>`.
    fn from_element(root: &HtmlElement) -> Option<Self> {
        if let Some(input) = root.dyn_ref::<HtmlInputElement>() {
            Some(FieldElement::Input(input.clone()))
        } else {
            root.dyn_ref::<HtmlTextAreaElement>()
                .map(|area| FieldElement::TextArea(area.clone()))
        }
    }

    fn set_value(&self, value: &str) {
        match self {
            FieldElement::Input(input) => input.set_value(value),
            FieldElement::TextArea(area) => area.set_value(value),
        }
    }

    fn target(&self) -> &EventTarget {
        match self {
            FieldElement::Input(input) => input,
            FieldElement::TextArea(area) => area,
        }
    }
}

// ── Listener ────────────────────────────────────────────────────────────────

/// An event subscription that is removed when dropped.
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        Ok(Listener {
            target: target.clone(),
            kind,
            callback,
        })
    }

    fn detach(&self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.detach();
    }
}

// ── Host ────────────────────────────────────────────────────────────────────

pub(crate) struct DomHost {
    /// Wrapper holding the rendered panel.
    container: HtmlElement,
    /// Element whose click or key opens the dropdown.
    anchor: Option<HtmlElement>,
    display: Option<(HtmlElement, HtmlElement)>,
    fields: Vec<(FieldSlot, FieldElement)>,
    theme: Theme,
    handle: Weak<RefCell<Picker>>,
    listeners: Vec<Listener>,
    outside: Option<Listener>,
    /// Detached outside listener kept alive until the next open; its closure
    /// may be the one currently running.
    retired: Option<Listener>,
}

/// Elements discovered or created for one picker before it exists.
struct Attachment {
    binding: Binding,
    container: HtmlElement,
    anchor: Option<HtmlElement>,
    display: Option<(HtmlElement, HtmlElement)>,
    fields: Vec<(FieldSlot, FieldElement)>,
}

impl Attachment {
    /// Inspect `root` and inject the panel wrapper (and display element).
    ///
    /// An `<input>` or `<textarea>` root is the field itself; any other
    /// element is a container searched for up to two inputs.
    fn prepare(root: &HtmlElement, options: &PickerOptions, theme: &Theme) -> Result<Self, JsValue> {
        let document = document()?;

        let (binding, fields, anchor, display) =
            if let Some(field) = FieldElement::from_element(root) {
                (
                    Binding::DirectField,
                    vec![(FieldSlot::Direct, field)],
                    Some(root.clone()),
                    None,
                )
            } else {
                let mut found = root.query_selector_all(r#"input[type="hidden"]"#)?;
                if found.length() == 0 {
                    found = root.query_selector_all("input")?;
                }
                let inputs: Vec<FieldElement> = (0..found.length().min(2))
                    .filter_map(|i| found.item(i))
                    .filter_map(|node| node.dyn_into::<HtmlInputElement>().ok())
                    .map(FieldElement::Input)
                    .collect();
                let fields: Vec<_> = [FieldSlot::Start, FieldSlot::End]
                    .into_iter()
                    .zip(inputs)
                    .collect();

                let display = if options.inline {
                    None
                } else {
                    let classes = &theme.classes;
                    let display = create(&document, "div", &format!("dp-display {}", classes.display))?;
                    display.set_attribute("role", "button")?;
                    display.set_tab_index(0);
                    let text = create(&document, "span", &format!("dp-display-text {}", classes.display_text))?;
                    let icon = create(&document, "i", &format!("dp-display-icon {}", classes.display_icon))?;
                    display.append_child(&text)?;
                    display.append_child(&icon)?;
                    root.append_child(&display)?;
                    Some((display, text))
                };
                (
                    Binding::Container {
                        fields: fields.len(),
                    },
                    fields,
                    display.as_ref().map(|(el, _)| el.clone()),
                    display,
                )
            };

        let container = if options.inline {
            let container = create(&document, "div", "bs-datepicker inline")?;
            root.append_child(&container)?;
            container
        } else {
            let container = create(&document, "div", "bs-datepicker dropdown-menu p-0")?;
            container.set_attribute("style", "display:none; --bs-dropdown-min-width:auto;")?;
            document
                .body()
                .ok_or_else(|| JsValue::from_str("document has no body"))?
                .append_child(&container)?;
            container
        };

        Ok(Attachment {
            binding,
            container,
            anchor,
            display,
            fields,
        })
    }
}

/// Build a picker on `root` and wire its DOM events.
pub(crate) fn mount(
    root: &HtmlElement,
    options: PickerOptions,
    theme: Theme,
) -> Result<Rc<RefCell<Picker>>, JsValue> {
    let attachment = Attachment::prepare(root, &options, &theme)?;
    let binding = attachment.binding;
    let picker = Rc::new_cyclic(|handle: &Weak<RefCell<Picker>>| {
        let host = DomHost {
            container: attachment.container,
            anchor: attachment.anchor,
            display: attachment.display,
            fields: attachment.fields,
            theme,
            handle: handle.clone(),
            listeners: Vec::new(),
            outside: None,
            retired: None,
        };
        RefCell::new(DatePicker::new(options, binding, host))
    });

    let listeners = {
        let picker = picker.borrow();
        picker.host().wire(picker.options().inline)?
    };
    picker.borrow_mut().host_mut().listeners = listeners;
    Ok(picker)
}

impl DomHost {
    fn wire(&self, inline: bool) -> Result<Vec<Listener>, JsValue> {
        let mut listeners = Vec::new();

        let handle = self.handle.clone();
        listeners.push(Listener::attach(&self.container, "click", move |event: Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let Ok(Some(button)) = target.closest("[data-action]") else {
                return;
            };
            let Some(name) = button.get_attribute("data-action") else {
                return;
            };
            let date = button.get_attribute("data-date");
            event.prevent_default();
            event.stop_propagation();
            match parse_action(&name, date.as_deref()) {
                Some(action) => with_picker(&handle, |p| p.handle_action(action)),
                None => log::warn!("ignoring panel action {name:?}"),
            }
        })?);

        if let (Some(anchor), false) = (&self.anchor, inline) {
            let handle = self.handle.clone();
            listeners.push(Listener::attach(anchor, "click", move |_| {
                with_picker(&handle, |p| p.anchor_clicked());
            })?);

            let handle = self.handle.clone();
            listeners.push(Listener::attach(anchor, "keydown", move |event: Event| {
                let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                    return;
                };
                let mut consumed = false;
                with_picker(&handle, |p| consumed = p.anchor_key(AnchorKey::from_dom_key(&key)));
                if consumed {
                    event.prevent_default();
                }
            })?);
        }
        Ok(listeners)
    }

    fn field(&self, slot: FieldSlot) -> Option<&FieldElement> {
        self.fields
            .iter()
            .find_map(|(s, input)| (*s == slot).then_some(input))
    }

    fn position_below_anchor(&self) -> Result<(), JsValue> {
        let style = self.container.style();
        style.set_property("position", "absolute")?;
        style.set_property("z-index", &self.theme.z_index.to_string())?;
        style.set_property("width", "auto")?;
        if let Some(anchor) = &self.anchor {
            let window = window()?;
            let rect = anchor.get_bounding_client_rect();
            let top = rect.bottom() + window.scroll_y()? + 4.0;
            let left = rect.left() + window.scroll_x()?;
            style.set_property("top", &format!("{top}px"))?;
            style.set_property("left", &format!("{left}px"))?;
        }
        Ok(())
    }
}

impl Host for DomHost {
    fn render_panel(&mut self, view: &PanelView) {
        self.container
            .set_inner_html(&panel_html(view, &self.theme.icons));
    }

    fn set_display_text(&mut self, text: &str, is_placeholder: bool) {
        if let Some((display, span)) = &self.display {
            span.set_text_content(Some(text));
            let _ = display
                .class_list()
                .toggle_with_force("text-muted", is_placeholder);
        }
    }

    fn set_field_value(&mut self, slot: FieldSlot, value: &str) {
        if let Some(input) = self.field(slot) {
            input.set_value(value);
        }
    }

    fn notify_change(&mut self, slot: FieldSlot) {
        let Some(input) = self.field(slot).cloned() else {
            return;
        };
        // Dispatched from a microtask so page handlers can call back into
        // the picker once the current call has returned.
        let fire = Closure::once_into_js(move || {
            let init = EventInit::new();
            init.set_bubbles(true);
            match Event::new_with_event_init_dict("change", &init) {
                Ok(event) => {
                    let _ = input.target().dispatch_event(&event);
                }
                Err(err) => log::warn!("could not create change event: {err:?}"),
            }
        });
        match window() {
            Ok(window) => window.queue_microtask(fire.unchecked_ref()),
            Err(err) => log::warn!("change notification dropped: {err:?}"),
        }
    }

    fn show_panel(&mut self) {
        if let Err(err) = self.position_below_anchor() {
            log::warn!("could not position panel: {err:?}");
        }
        let _ = self.container.style().set_property("display", "block");
        let _ = self.container.class_list().add_1("show");
    }

    fn hide_panel(&mut self) {
        let _ = self.container.class_list().remove_1("show");
        let _ = self.container.style().set_property("display", "none");
    }

    fn listen_outside_click(&mut self) {
        self.retired = None;
        let document = match document() {
            Ok(document) => document,
            Err(err) => {
                log::warn!("outside-click listener not installed: {err:?}");
                return;
            }
        };
        let handle = self.handle.clone();
        let container: Node = self.container.clone().into();
        let anchor: Option<Node> = self.anchor.clone().map(Into::into);
        let listener = Listener::attach(&document, "mousedown", move |event: Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Node>().ok()) else {
                return;
            };
            let inside = container.contains(Some(&target))
                || anchor.as_ref().is_some_and(|a| a.contains(Some(&target)));
            if !inside {
                with_picker(&handle, |p| p.outside_pointer());
            }
        });
        match listener {
            Ok(listener) => self.outside = Some(listener),
            Err(err) => log::warn!("outside-click listener not installed: {err:?}"),
        }
    }

    fn unlisten_outside_click(&mut self) {
        if let Some(listener) = self.outside.take() {
            listener.detach();
            self.retired = Some(listener);
        }
    }

    fn release_anchor(&mut self) {
        if let Some(anchor) = &self.anchor {
            let _ = anchor.blur();
        }
    }

    fn teardown(&mut self) {
        self.listeners.clear();
        self.outside = None;
        self.container.remove();
        if let Some((display, _)) = self.display.take() {
            display.remove();
        }
        self.anchor = None;
    }
}

//! The tag-chip autocomplete widget.
//!
//! Each accepted suggestion becomes a chip inserted immediately before the
//! input:
//!
//! ```html
//! <li class="acfb-data">
//!   <span class="label" id="{format_result}">{format_item}</span>
//!   <span class="close"></span>
//! </li>
//! ```
//!
//! Clicking a chip's close control removes the chip. The widget keeps no chip
//! list of its own: the document is the source of truth. `get_data` and the
//! binding of pre-existing chips look at the whole document; clearing and the
//! chip views select within the input's container.

use tracing::debug;

use crate::dom::{Document, Element, NodeId};
use crate::error::{ChipfieldError, Result};
use crate::lookup::{Autocomplete, LookupResult};
use crate::options::WidgetConfig;
use crate::selector::Selector;

/// Build the markup the widget expects: a `ul` container under the document
/// root holding one input tagged with `input_class`. Returns `(container, input)`.
pub fn scaffold(doc: &mut Document, input_class: &Selector) -> Result<(NodeId, NodeId)> {
    let container = doc.create(Element::new("ul").class("acfb-holder"));
    let input = input_class
        .subject()
        .classes
        .iter()
        .fold(Element::new("input"), |el, class| el.class(class.as_str()));
    let input = doc.create(input);

    doc.append_child(doc.root(), container)?;
    doc.append_child(container, input)?;
    Ok((container, input))
}

/// Passed to the removal callback after a chip is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedChip {
    /// The close control that was clicked.
    pub close: NodeId,
    pub chip: NodeId,
    /// The label's `id` attribute (the `format_result` value).
    pub id: Option<String>,
    pub label: String,
}

/// Handle returned when the widget is attached to an input.
pub struct TagAutocomplete<T, A> {
    input: NodeId,
    settings: WidgetConfig<T>,
    autocomplete: A,
    /// `{found_class} span.label`
    chip_labels: Selector,
    /// `{found_class} span.close`
    chip_closes: Selector,
    label: Selector,
    close: Selector,
}

impl<T, A: Autocomplete<T>> TagAutocomplete<T, A> {
    /// Attach to `input`: bind removal on chips already in the container,
    /// attach the lookup capability, and focus the input.
    pub fn new(
        doc: &mut Document,
        input: NodeId,
        settings: WidgetConfig<T>,
        mut autocomplete: A,
    ) -> Result<Self> {
        doc.get(input)?;
        let container = doc.parent(input).ok_or(ChipfieldError::InputDetached(input))?;
        if !doc.matches(input, &settings.input_class) {
            debug!(%input, input_class = %settings.input_class, "input does not match input class");
        }

        let label = Selector::parse("span.label")?;
        let close = Selector::parse("span.close")?;
        let chip_labels = settings.found_class.descendant(&label);
        let chip_closes = settings.found_class.descendant(&close);

        debug!(%input, %container, "attaching");
        for existing in doc.select(doc.root(), &chip_closes) {
            doc.bind_click(existing)?;
        }

        autocomplete.attach(&settings.url_lookup, &settings.ac_options)?;
        doc.focus(input)?;

        Ok(Self {
            input,
            settings,
            autocomplete,
            chip_labels,
            chip_closes,
            label,
            close,
        })
    }

    /// Ranked suggestions for `term` from the attached lookup.
    pub fn lookup(&mut self, term: &str) -> Result<Vec<LookupResult<T>>> {
        self.autocomplete.lookup(term, &self.settings.ac_options)
    }
}

impl<T, A> TagAutocomplete<T, A> {
    pub fn input(&self) -> NodeId {
        self.input
    }

    pub fn settings(&self) -> &WidgetConfig<T> {
        &self.settings
    }

    pub fn autocomplete(&self) -> &A {
        &self.autocomplete
    }

    /// The element chips are inserted into: the input's parent.
    pub fn container(&self, doc: &Document) -> Result<NodeId> {
        doc.get(self.input)?;
        doc.parent(self.input)
            .ok_or(ChipfieldError::InputDetached(self.input))
    }

    /// Render a chip for `data` immediately before the input.
    pub fn create_item(&self, doc: &mut Document, data: &T) -> Result<NodeId> {
        let id = (self.settings.ac_options.format_result)(data);
        let text = (self.settings.ac_options.format_item)(data);

        let chip = self
            .settings
            .chip_classes()
            .into_iter()
            .fold(Element::new("li"), |el, class| el.class(class));
        let chip = doc.create(chip);
        doc.insert_before(self.input, chip)?;

        let label = doc.create(Element::new("span").class("label").id(id.as_str()).text(text));
        let close = doc.create(Element::new("span").class("close"));
        doc.append_child(chip, label)?;
        doc.append_child(chip, close)?;
        doc.bind_click(close)?;

        debug!(%chip, id = %id, "chip created");
        Ok(chip)
    }

    /// Accept handler for a lookup result: render the chip, then clear and
    /// refocus the input.
    pub fn accept(&self, doc: &mut Document, data: &T) -> Result<NodeId> {
        let chip = self.create_item(doc, data)?;
        doc.set_value(self.input, "")?;
        doc.focus(self.input)?;
        Ok(chip)
    }

    /// Comma-joined label ids of every chip in the document, in document
    /// order. A label without an `id` contributes an empty segment.
    pub fn get_data(&self, doc: &Document) -> Result<String> {
        doc.get(self.input)?;
        let ids: Vec<&str> = doc
            .select(doc.root(), &self.chip_labels)
            .into_iter()
            .map(|label| {
                doc.get(label)
                    .ok()
                    .and_then(|el| el.id.as_deref())
                    .unwrap_or_default()
            })
            .collect();
        Ok(ids.join(","))
    }

    /// Remove every chip in the container and refocus the input.
    pub fn clear_data(&self, doc: &mut Document) -> Result<NodeId> {
        let container = self.container(doc)?;
        for chip in doc.select(container, &self.settings.found_class) {
            // a nested match may already be gone with its ancestor
            if doc.contains(chip) {
                doc.remove(chip)?;
            }
        }
        debug!("chips cleared");
        doc.focus(self.input)?;
        Ok(self.input)
    }

    /// Remove the chip owning `close`, refocus the input and notify the
    /// removal callback.
    pub fn remove_find(&mut self, doc: &mut Document, close: NodeId) -> Result<NodeId> {
        doc.get(close)?;
        let chip = doc
            .parent(close)
            .filter(|chip| doc.matches(*chip, &self.settings.found_class))
            .ok_or(ChipfieldError::NotACloseControl(close))?;

        let (id, label) = self.chip_label(doc, chip)?;

        doc.unbind_click(close)?;
        doc.remove(chip)?;
        doc.focus(self.input)?;
        debug!(%chip, ?id, "chip removed");

        let removed = RemovedChip {
            close,
            chip,
            id,
            label,
        };
        (self.settings.remove_find_callback)(&removed);
        Ok(self.input)
    }

    /// Dispatch a click. Returns `true` when `node` had a bound removal
    /// handler (a chip close control) and its chip was removed.
    pub fn click(&mut self, doc: &mut Document, node: NodeId) -> Result<bool> {
        if !doc.get(node)?.is_click_bound() {
            return Ok(false);
        }
        self.remove_find(doc, node)?;
        Ok(true)
    }

    /// Chip elements in document order.
    pub fn chips(&self, doc: &Document) -> Result<Vec<NodeId>> {
        let container = self.container(doc)?;
        Ok(doc.select(container, &self.settings.found_class))
    }

    /// A chip's label `id` attribute and text.
    pub fn chip_label(&self, doc: &Document, chip: NodeId) -> Result<(Option<String>, String)> {
        doc.get(chip)?;
        Ok(doc
            .select_first(chip, &self.label)
            .and_then(|label| doc.get(label).ok())
            .map(|el| (el.id.clone(), el.text.clone()))
            .unwrap_or_default())
    }

    /// The close control inside `chip`.
    pub fn close_control(&self, doc: &Document, chip: NodeId) -> Result<NodeId> {
        doc.get(chip)?;
        doc.select_first(chip, &self.close)
            .ok_or(ChipfieldError::NotACloseControl(chip))
    }

    /// Close controls of every chip in the container.
    pub fn close_controls(&self, doc: &Document) -> Result<Vec<NodeId>> {
        let container = self.container(doc)?;
        Ok(doc.select(container, &self.chip_closes))
    }
}

//! In-memory element tree the widget renders into.
//!
//! Elements live in an arena and are addressed by [`NodeId`]. Slots are never
//! reused, so the id of a removed element stays invalid forever and every
//! accessor rejects it with [`ChipfieldError::NodeNotFound`].

use std::fmt;

use crate::error::{ChipfieldError, Result};
use crate::selector::{Compound, Selector};

/// Handle to an element in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A single element: tag, classes, `id` attribute, text and (for inputs) a value.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub id: Option<String>,
    pub text: String,
    pub value: String,
    click_bound: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Add a class unless it is already present.
    pub fn class(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.classes.contains(&name) {
            self.classes.push(name);
        }
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c == name)
    }

    pub fn is_click_bound(&self) -> bool {
        self.click_bound
    }

    fn matches(&self, compound: &Compound) -> bool {
        if let Some(tag) = &compound.tag {
            if !self.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &compound.id {
            if self.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        compound.classes.iter().all(|c| self.has_class(c))
    }
}

/// The element tree plus focus tracking.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Option<Element>>,
    root: NodeId,
    focused: Option<NodeId>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Element::new("body"))],
            root: NodeId(0),
            focused: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Add a detached element; attach it with [`append_child`](Self::append_child)
    /// or [`insert_before`](Self::insert_before).
    pub fn create(&mut self, element: Element) -> NodeId {
        let mut element = element;
        element.parent = None;
        element.children.clear();
        self.nodes.push(Some(element));
        NodeId(self.nodes.len() - 1)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.0), Some(Some(_)))
    }

    pub fn get(&self, id: NodeId) -> Result<&Element> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(ChipfieldError::NodeNotFound(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Element> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(ChipfieldError::NodeNotFound(id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).ok().and_then(|el| el.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|el| el.children.as_slice()).unwrap_or(&[])
    }

    // ─── Tree mutation ─────────────────────────────────────

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get(parent)?;
        self.check_not_ancestor(child, parent)?;
        self.detach(child)?;
        self.get_mut(parent)?.children.push(child);
        self.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Insert `new` as the sibling immediately before `reference`.
    pub fn insert_before(&mut self, reference: NodeId, new: NodeId) -> Result<()> {
        let parent = self
            .parent(reference)
            .ok_or(ChipfieldError::NodeNotFound(reference))?;
        self.check_not_ancestor(new, parent)?;
        self.detach(new)?;

        let siblings = &mut self.get_mut(parent)?.children;
        let pos = siblings
            .iter()
            .position(|c| *c == reference)
            .ok_or(ChipfieldError::NodeNotFound(reference))?;
        siblings.insert(pos, new);
        self.get_mut(new)?.parent = Some(parent);
        Ok(())
    }

    /// Remove an element and its whole subtree. The root itself is never
    /// removed; its children are cleared instead.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        self.get(id)?;
        if id == self.root {
            for child in self.children(id).to_vec() {
                self.remove(child)?;
            }
            return Ok(());
        }

        self.detach(id)?;
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if let Some(el) = self.nodes.get_mut(node.0).and_then(Option::take) {
                stack.extend(el.children);
            }
            if self.focused == Some(node) {
                self.focused = None;
            }
        }
        Ok(())
    }

    fn detach(&mut self, id: NodeId) -> Result<()> {
        if let Some(parent) = self.get(id)?.parent {
            self.get_mut(parent)?.children.retain(|c| *c != id);
            self.get_mut(id)?.parent = None;
        }
        Ok(())
    }

    fn check_not_ancestor(&self, node: NodeId, of: NodeId) -> Result<()> {
        let mut cursor = Some(of);
        while let Some(current) = cursor {
            if current == node {
                return Err(ChipfieldError::HierarchyCycle(node));
            }
            cursor = self.parent(current);
        }
        Ok(())
    }

    // ─── Focus, value, click binding ───────────────────────

    pub fn focus(&mut self, id: NodeId) -> Result<()> {
        self.get(id)?;
        self.focused = Some(id);
        Ok(())
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn value(&self, id: NodeId) -> Result<&str> {
        Ok(self.get(id)?.value.as_str())
    }

    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) -> Result<()> {
        self.get_mut(id)?.value = value.into();
        Ok(())
    }

    pub fn bind_click(&mut self, id: NodeId) -> Result<()> {
        self.get_mut(id)?.click_bound = true;
        Ok(())
    }

    pub fn unbind_click(&mut self, id: NodeId) -> Result<()> {
        self.get_mut(id)?.click_bound = false;
        Ok(())
    }

    // ─── Queries ───────────────────────────────────────────

    /// Descendants of `scope` in document (pre-)order, excluding `scope`.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Whether `id` matches `selector`. Ancestors outside any query scope
    /// still take part in descendant matching.
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        let Some((subject, ancestors)) = selector.compounds().split_last() else {
            return false;
        };
        match self.get(id) {
            Ok(el) if el.matches(subject) => {}
            _ => return false,
        }

        let mut cursor = self.parent(id);
        for compound in ancestors.iter().rev() {
            loop {
                let Some(current) = cursor else {
                    return false;
                };
                cursor = self.parent(current);
                if self.get(current).is_ok_and(|el| el.matches(compound)) {
                    break;
                }
            }
        }
        true
    }

    /// Descendants of `scope` matching `selector`, in document order.
    pub fn select(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.matches(*id, selector))
            .collect()
    }

    pub fn select_first(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|id| self.matches(*id, selector))
    }

    // ─── Serialisation ─────────────────────────────────────

    /// Serialise an element and its subtree as HTML.
    pub fn to_html(&self, id: NodeId) -> Result<String> {
        let mut out = String::new();
        self.write_html(id, &mut out)?;
        Ok(out)
    }

    fn write_html(&self, id: NodeId, out: &mut String) -> Result<()> {
        let el = self.get(id)?;
        out.push('<');
        out.push_str(&el.tag);
        if !el.classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&escape_html(&el.classes.join(" ")));
            out.push('"');
        }
        if let Some(attr) = &el.id {
            out.push_str(" id=\"");
            out.push_str(&escape_html(attr));
            out.push('"');
        }
        if is_void(&el.tag) {
            if !el.value.is_empty() {
                out.push_str(" value=\"");
                out.push_str(&escape_html(&el.value));
                out.push('"');
            }
            out.push('>');
            return Ok(());
        }
        out.push('>');
        out.push_str(&escape_html(&el.text));
        for child in &el.children {
            self.write_html(*child, out)?;
        }
        out.push_str("</");
        out.push_str(&el.tag);
        out.push('>');
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "input" | "br" | "hr" | "img")
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

//! Compiled HTML templates with direction tracking.
//!
//! A [`View`] is built from an HTML fragment. Elements with a `dir`
//! attribute get a [`DirController`]; text that can change (`{{}}` text,
//! `ng-bind`, `ng-bind-html`, `ng-bind-template`, `ng-model` and
//! interpolated `value` on form fields) is wired to the nearest auto
//! controller, and interpolated attributes are escaped against the
//! nearest controller's direction on every [`View::digest`].
//!
//! Inside a `dir="auto"` element no directive may add or remove content
//! on its own (`ng-if`, `ng-repeat`, ...), since the controller would not
//! see that text. Such templates are rejected at compile time.

use std::ops::Deref;

use dirauto_text::bidi::{Direction, strip_markup};
use ego_tree::NodeRef;
use scraper::{Html, Node};
use tracing::{debug, trace};

use crate::{
    controller::{DirContext, DirController, TextChanger},
    error::{DirError, Result},
    mode::DirMode,
    template::{Interpolation, Scope},
};

/// Directives that create content independently of the surrounding
/// template.
pub const STRUCTURAL_DIRECTIVES: &[&str] =
    &["ng-if", "ng-repeat", "ng-switch", "ng-include", "ng-view"];

/// Handle to a node of a [`View`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct ViewNode {
    parent: Option<usize>,
    children: Vec<usize>,
    kind: NodeKind,
}

#[derive(Debug)]
enum NodeKind {
    Element(ElementData),
    Text(TextData),
}

#[derive(Debug)]
struct ElementData {
    tag: String,
    attrs: Vec<Attr>,
    binding: Option<Binding>,
    /// Form value of `input`/`textarea`.
    value: Option<String>,
    controller: Option<usize>,
}

#[derive(Debug)]
struct Attr {
    name: String,
    value: String,
    template: Option<Interpolation>,
}

#[derive(Debug)]
struct TextData {
    text: String,
    template: Option<Interpolation>,
    changer: Option<Changer>,
}

/// Content binding that replaces an element's text.
#[derive(Debug)]
struct Binding {
    source: BindingSource,
    /// Current bound content (markup for `ng-bind-html`).
    content: String,
    changer: Option<Changer>,
}

#[derive(Debug)]
enum BindingSource {
    Text(String),
    Html(String),
    Template(Interpolation),
}

impl BindingSource {
    fn is_markup(&self) -> bool {
        matches!(self, BindingSource::Html(_))
    }

    fn evaluate(&self, scope: &Scope) -> String {
        match self {
            BindingSource::Text(expr) | BindingSource::Html(expr) => scope.get(expr).to_string(),
            BindingSource::Template(template) => template.render(scope),
        }
    }
}

#[derive(Debug)]
struct Changer {
    controller: usize,
    changer: TextChanger,
}

#[derive(Debug)]
struct ControllerSlot {
    element: usize,
    controller: DirController,
}

/// A compiled template.
#[derive(Debug)]
pub struct View {
    nodes: Vec<ViewNode>,
    roots: Vec<usize>,
    controllers: Vec<ControllerSlot>,
    /// Interpolated form values and `ng-model` bindings, per element.
    form_changers: Vec<(usize, Changer)>,
}

/// Directive name with any `data-` or `x-` prefix removed.
fn directive_name(attr: &str) -> &str {
    attr.strip_prefix("data-")
        .or_else(|| attr.strip_prefix("x-"))
        .unwrap_or(attr)
}

fn is_form_field(tag: &str) -> bool {
    tag == "input" || tag == "textarea"
}

impl View {
    /// Compile `html` with default settings.
    pub fn compile(html: &str) -> Result<Self> {
        Self::compile_with(html, &DirContext::default())
    }

    /// Compile `html`, creating controllers according to `context`.
    pub fn compile_with(html: &str, context: &DirContext) -> Result<Self> {
        let document = Html::parse_fragment(html);
        let mut view = View {
            nodes: Vec::new(),
            roots: Vec::new(),
            controllers: Vec::new(),
            form_changers: Vec::new(),
        };

        for child in document.tree.root().children() {
            // Fragments are wrapped in a synthetic <html> element.
            match child.value() {
                Node::Element(el) if el.name() == "html" => {
                    for node in child.children() {
                        if let Some(id) = view.convert(&node, None) {
                            view.roots.push(id);
                        }
                    }
                }
                _ => {
                    if let Some(id) = view.convert(&child, None) {
                        view.roots.push(id);
                    }
                }
            }
        }
        if !view.roots.iter().any(|&id| view.element(id).is_some()) {
            return Err(DirError::EmptyTemplate);
        }

        if context.is_enabled() {
            view.create_controllers(context)?;
            view.register_changers();
        }
        debug!(
            nodes = view.nodes.len(),
            controllers = view.controllers.len(),
            "compiled view"
        );
        Ok(view)
    }

    fn convert(&mut self, node: &NodeRef<Node>, parent: Option<usize>) -> Option<usize> {
        let kind = match node.value() {
            Node::Text(text) => {
                let text = text.deref().to_string();
                NodeKind::Text(TextData {
                    template: Interpolation::parse(&text),
                    text,
                    changer: None,
                })
            }
            Node::Element(el) => {
                let tag = el.name().to_ascii_lowercase();
                let attrs: Vec<Attr> = el
                    .attrs()
                    .map(|(name, value)| Attr {
                        name: name.to_ascii_lowercase(),
                        value: value.to_string(),
                        template: Interpolation::parse(value),
                    })
                    .collect();
                let value = is_form_field(&tag).then(|| {
                    attrs
                        .iter()
                        .find(|attr| attr.name == "value" && attr.template.is_none())
                        .map(|attr| attr.value.clone())
                        .unwrap_or_default()
                });
                NodeKind::Element(ElementData {
                    tag,
                    attrs,
                    binding: None,
                    value,
                    controller: None,
                })
            }
            _ => return None,
        };

        let id = self.nodes.len();
        self.nodes.push(ViewNode {
            parent,
            children: Vec::new(),
            kind,
        });
        for child in node.children() {
            if let Some(child_id) = self.convert(&child, Some(id)) {
                self.nodes[id].children.push(child_id);
            }
        }

        // A textarea without a `value` attribute takes its content as value.
        let is_bare_textarea = self
            .element(id)
            .is_some_and(|el| el.tag == "textarea" && el.attr("value").is_none());
        if is_bare_textarea {
            let content = self.text_of(id);
            if let NodeKind::Element(el) = &mut self.nodes[id].kind {
                el.value = Some(content);
            }
        }

        let binding = self.element(id).and_then(|el| el.binding_source());
        if let Some(source) = binding {
            let content = self.text_of(id);
            if let NodeKind::Element(el) = &mut self.nodes[id].kind {
                el.binding = Some(Binding {
                    source,
                    content,
                    changer: None,
                });
            }
        }
        Some(id)
    }

    fn create_controllers(&mut self, context: &DirContext) -> Result<()> {
        for id in 0..self.nodes.len() {
            let Some(mode) = self
                .element(id)
                .and_then(|el| el.attr("dir"))
                .map(DirMode::parse)
            else {
                continue;
            };
            let static_text = if mode.is_auto() {
                self.reject_structural_descendants(id)?;
                self.static_text(id)
            } else {
                String::new()
            };

            let controller = DirController::new(mode, &static_text, context);
            let sets_property = matches!(controller.mode(), DirMode::Auto | DirMode::Locale);
            let dir = controller.dir();
            let slot = self.controllers.len();
            self.controllers.push(ControllerSlot {
                element: id,
                controller,
            });
            if let NodeKind::Element(el) = &mut self.nodes[id].kind {
                el.controller = Some(slot);
                if sets_property {
                    el.set_attr("dir", dir.as_html_dir());
                }
            }
        }
        Ok(())
    }

    fn reject_structural_descendants(&self, id: usize) -> Result<()> {
        let mut stack: Vec<usize> = self.nodes[id].children.clone();
        while let Some(next) = stack.pop() {
            if let Some(el) = self.element(next) {
                if let Some(directive) = el
                    .attrs
                    .iter()
                    .map(|attr| directive_name(&attr.name))
                    .find(|name| STRUCTURAL_DIRECTIVES.contains(name))
                {
                    return Err(DirError::UnsupportedStructure {
                        directive: directive.to_string(),
                        tag: el.tag.clone(),
                    });
                }
            }
            stack.extend(self.nodes[next].children.iter().copied());
        }
        Ok(())
    }

    /// Text present in the element before any digest. Subtrees with their
    /// own `dir` attribute are left to their own controller.
    fn static_text(&self, id: usize) -> String {
        let mut out = String::new();
        self.collect_static_text(id, true, &mut out);
        out
    }

    fn collect_static_text(&self, id: usize, is_root: bool, out: &mut String) {
        match &self.nodes[id].kind {
            NodeKind::Text(text) => {
                if text.template.is_none() {
                    out.push_str(&text.text);
                }
            }
            NodeKind::Element(el) => {
                if !is_root && el.attr("dir").is_some() {
                    return;
                }
                if let Some(value) = &el.value {
                    out.push_str(value);
                }
                if el.tag == "textarea" {
                    return;
                }
                match &el.binding {
                    Some(binding) => push_content(out, &binding.content, binding.source.is_markup()),
                    None => {
                        for &child in &self.nodes[id].children {
                            self.collect_static_text(child, false, out);
                        }
                    }
                }
            }
        }
    }

    /// Nearest controller on `id` or its ancestors.
    fn controller_for(&self, id: usize) -> Option<usize> {
        controller_slot(&self.nodes, id)
    }

    fn changer_for(&self, id: usize, initial: &str, is_markup: bool) -> Option<Changer> {
        let controller = self.controller_for(id)?;
        let changer = self.controllers[controller]
            .controller
            .create_text_changer(initial, is_markup)?;
        Some(Changer {
            controller,
            changer,
        })
    }

    fn register_changers(&mut self) {
        for id in 0..self.nodes.len() {
            match &self.nodes[id].kind {
                NodeKind::Text(text) => {
                    if text.template.is_none() || self.is_bound_content(id) {
                        continue;
                    }
                    let changer = self.changer_for(id, "", false);
                    if let NodeKind::Text(text) = &mut self.nodes[id].kind {
                        text.changer = changer;
                    }
                }
                NodeKind::Element(el) => {
                    let binding = el
                        .binding
                        .as_ref()
                        .map(|binding| (binding.content.clone(), binding.source.is_markup()));
                    let form_value = el
                        .tracks_form_value()
                        .then(|| el.value.clone().unwrap_or_default());

                    if let Some((content, is_markup)) = binding {
                        let changer = self.changer_for(id, &content, is_markup);
                        if let NodeKind::Element(el) = &mut self.nodes[id].kind {
                            if let Some(binding) = el.binding.as_mut() {
                                binding.changer = changer;
                            }
                        }
                    }
                    if let Some(initial) = form_value {
                        if let Some(changer) = self.changer_for(id, &initial, false) {
                            self.form_changers.push((id, changer));
                        }
                    }
                }
            }
        }
        trace!(form_fields = self.form_changers.len(), "registered text changers");
    }

    /// `true` for text that a binding or a textarea's value on an enclosing
    /// element stands in for.
    fn is_bound_content(&self, id: usize) -> bool {
        let mut current = self.nodes[id].parent;
        while let Some(node) = current {
            if self
                .element(node)
                .is_some_and(|el| el.binding.is_some() || el.tag == "textarea")
            {
                return true;
            }
            current = self.nodes[node].parent;
        }
        false
    }

    /// Re-evaluate every binding against `scope`.
    ///
    /// Text and `dir` observations are applied first so that attribute
    /// escaping sees the final direction of this digest.
    pub fn digest(&mut self, scope: &Scope) {
        let View {
            nodes,
            controllers,
            form_changers,
            ..
        } = self;

        for id in 0..nodes.len() {
            let mut update = None;
            match &mut nodes[id].kind {
                NodeKind::Text(text) => {
                    if let Some(template) = &text.template {
                        let rendered = template.render(scope);
                        if let Some(changer) = text.changer.as_mut() {
                            update = changer.apply(controllers, &rendered);
                        }
                        text.text = rendered;
                    }
                }
                NodeKind::Element(el) => {
                    if let Some(binding) = el.binding.as_mut() {
                        let content = binding.source.evaluate(scope);
                        if let Some(changer) = binding.changer.as_mut() {
                            update = changer.apply(controllers, &content);
                        }
                        binding.content = content;
                    }
                    if is_form_field(&el.tag) {
                        let value = match el.attr("ng-model") {
                            Some(model) => Some(scope.get(model).to_string()),
                            None => el.attr_template("value").map(|t| t.render(scope)),
                        };
                        if value.is_some() {
                            el.value = value;
                        }
                    }
                }
            }
            apply_update(nodes, update);
        }

        for (id, changer) in form_changers.iter_mut() {
            let value = match &nodes[*id].kind {
                NodeKind::Element(el) => el.value.clone().unwrap_or_default(),
                NodeKind::Text(_) => continue,
            };
            let update = changer.apply(controllers, &value);
            apply_update(nodes, update);
        }

        for slot in controllers.iter_mut() {
            if let NodeKind::Element(el) = &nodes[slot.element].kind {
                if let Some(template) = el.attr_template("dir") {
                    slot.controller.observe_dir(&template.render(scope));
                }
            }
        }

        escape_attributes(nodes, controllers, scope);
    }

    /// Simulate the user typing `value` into an `ng-model` field.
    ///
    /// Updates the scope and the element's direction without a digest.
    /// Returns `false` if `id` is not a model-bound field.
    pub fn input(&mut self, id: NodeId, value: &str, scope: &mut Scope) -> bool {
        let Some(model) = self
            .element(id.0)
            .and_then(|el| el.attr("ng-model"))
            .map(str::to_string)
        else {
            return false;
        };
        scope.set(model, value);
        if let NodeKind::Element(el) = &mut self.nodes[id.0].kind {
            el.value = Some(value.to_string());
        }

        let View {
            nodes,
            controllers,
            form_changers,
            ..
        } = self;
        let mut changed = false;
        for (field, changer) in form_changers.iter_mut() {
            if *field == id.0 {
                let update = changer.apply(controllers, value);
                changed |= update.is_some();
                apply_update(nodes, update);
            }
        }
        if changed {
            escape_attributes(nodes, controllers, scope);
        }
        true
    }

    fn element(&self, id: usize) -> Option<&ElementData> {
        match &self.nodes[id].kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    fn text_of(&self, id: usize) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: usize, out: &mut String) {
        match &self.nodes[id].kind {
            NodeKind::Text(text) => out.push_str(&text.text),
            NodeKind::Element(el) => match &el.binding {
                Some(binding) => push_content(out, &binding.content, binding.source.is_markup()),
                None => {
                    for &child in &self.nodes[id].children {
                        self.collect_text(child, out);
                    }
                }
            },
        }
    }

    /// First root element.
    pub fn root(&self) -> NodeId {
        self.roots
            .iter()
            .copied()
            .find(|&id| self.element(id).is_some())
            .map(NodeId)
            .unwrap_or(NodeId(0))
    }

    /// First element named `tag` in document order, roots included.
    pub fn find(&self, tag: &str) -> Option<NodeId> {
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self
                .element(id)
                .is_some_and(|el| el.tag.eq_ignore_ascii_case(tag))
            {
                return Some(NodeId(id));
            }
            stack.extend(self.nodes[id].children.iter().rev().copied());
        }
        None
    }

    /// Elements carrying a `dir` controller, in document order.
    pub fn controlled_elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.controllers.iter().map(|slot| NodeId(slot.element))
    }

    /// Child elements of `id`.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(|&child| self.element(child).is_some())
            .map(NodeId)
            .collect()
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id.0).map(|el| el.tag.as_str())
    }

    /// Current value of attribute `name`.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id.0).and_then(|el| el.attr(name))
    }

    /// The reflected `dir` property: `ltr`, `rtl`, `auto` or empty.
    pub fn dir_property(&self, id: NodeId) -> &'static str {
        let dir = self.attr(id, "dir").unwrap_or("").trim();
        if dir.eq_ignore_ascii_case("auto") {
            "auto"
        } else {
            Direction::from_html_dir(dir).as_html_dir()
        }
    }

    /// Direction the nearest controller resolved for `id`, if any.
    pub fn direction(&self, id: NodeId) -> Option<Direction> {
        self.controller_for(id.0)
            .map(|slot| self.controllers[slot].controller.dir())
    }

    /// Form value of an `input` or `textarea`.
    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.element(id.0).and_then(|el| el.value.as_deref())
    }

    /// Text content as rendered; markup from `ng-bind-html` is stripped.
    pub fn text_content(&self, id: NodeId) -> String {
        self.text_of(id.0)
    }
}

impl ElementData {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    fn attr_template(&self, name: &str) -> Option<&Interpolation> {
        self.attrs
            .iter()
            .find(|attr| attr.name == name)
            .and_then(|attr| attr.template.as_ref())
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value.to_string(),
            None => self.attrs.push(Attr {
                name: name.to_string(),
                value: value.to_string(),
                template: None,
            }),
        }
    }

    /// Form fields whose value can change: `ng-model` or `value="{{}}"`.
    fn tracks_form_value(&self) -> bool {
        is_form_field(&self.tag)
            && (self.attr("ng-model").is_some() || self.attr_template("value").is_some())
    }

    fn binding_source(&self) -> Option<BindingSource> {
        if let Some(expr) = self.attr("ng-bind") {
            return Some(BindingSource::Text(expr.to_string()));
        }
        if let Some(expr) = self.attr("ng-bind-html") {
            return Some(BindingSource::Html(expr.to_string()));
        }
        self.attr_template("ng-bind-template")
            .cloned()
            .map(BindingSource::Template)
    }
}

impl Changer {
    fn apply(&mut self, controllers: &mut [ControllerSlot], text: &str) -> Option<(usize, Direction)> {
        let slot = &mut controllers[self.controller];
        self.changer
            .apply(&mut slot.controller, text)
            .map(|dir| (slot.element, dir))
    }
}

fn push_content(out: &mut String, content: &str, is_markup: bool) {
    if is_markup {
        out.push_str(&strip_markup(content));
    } else {
        out.push_str(content);
    }
}

fn controller_slot(nodes: &[ViewNode], id: usize) -> Option<usize> {
    let mut current = Some(id);
    while let Some(node) = current {
        if let NodeKind::Element(ElementData {
            controller: Some(slot),
            ..
        }) = &nodes[node].kind
        {
            return Some(*slot);
        }
        current = nodes[node].parent;
    }
    None
}

/// Render every interpolated attribute from its source template and
/// escape it against the nearest controller.
fn escape_attributes(nodes: &mut [ViewNode], controllers: &[ControllerSlot], scope: &Scope) {
    for id in 0..nodes.len() {
        let controller = controller_slot(nodes, id);
        let NodeKind::Element(el) = &mut nodes[id].kind else {
            continue;
        };
        for attr in el.attrs.iter_mut() {
            let Some(template) = &attr.template else {
                continue;
            };
            let rendered = template.render(scope);
            attr.value = match controller {
                Some(slot) => controllers[slot]
                    .controller
                    .escape_attribute_value(&el.tag, &attr.name, &rendered)
                    .into_owned(),
                None => rendered,
            };
        }
    }
}

fn apply_update(nodes: &mut [ViewNode], update: Option<(usize, Direction)>) {
    let Some((element, dir)) = update else {
        return;
    };
    if let NodeKind::Element(el) = &mut nodes[element].kind {
        el.set_attr("dir", dir.as_html_dir());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_document_structure() {
        let view = View::compile(r#"<div dir="rtl"><p>one</p><!-- c --><span>two</span></div>"#)
            .unwrap();
        let root = view.root();
        assert_eq!(view.tag(root), Some("div"));
        let children: Vec<_> = view
            .children(root)
            .into_iter()
            .filter_map(|id| view.tag(id))
            .collect();
        assert_eq!(children, vec!["p", "span"]);
        assert_eq!(view.text_content(root), "onetwo");
        assert_eq!(view.controlled_elements().collect::<Vec<_>>(), vec![root]);
    }

    #[test]
    fn bound_markup_is_stripped_from_text_content() {
        let mut view = View::compile(r#"<div ng-bind-html="html"></div>"#).unwrap();
        let scope: Scope = [("html", "<b>bold</b>")].into_iter().collect();
        view.digest(&scope);
        assert_eq!(view.text_content(view.root()).trim(), "bold");
    }

    #[test]
    fn auto_elements_reflect_their_direction_into_the_attribute() {
        let view = View::compile(r#"<div dir="auto">abc</div>"#).unwrap();
        assert_eq!(view.attr(view.root(), "dir"), Some("ltr"));
        assert_eq!(view.direction(view.root()), Some(Direction::Ltr));
    }

    #[test]
    fn fixed_text_inside_bindings_is_counted_once() {
        let mut view =
            View::compile(r#"<div dir="auto"><span ng-bind="t"><b>{{x}}</b>abc</span></div>"#)
                .unwrap();
        assert_eq!(view.dir_property(view.root()), "ltr");
        view.digest(&Scope::new());
        assert_eq!(view.dir_property(view.root()), "");
    }

    #[test]
    fn unknown_dir_values_leave_direction_unset() {
        let mut view = View::compile(r#"<div dir="sideways" title="{{t}}"></div>"#).unwrap();
        let scope: Scope = [("t", "\u{05d0}")].into_iter().collect();
        view.digest(&scope);
        assert_eq!(view.dir_property(view.root()), "");
        assert_eq!(view.attr(view.root(), "title"), Some("\u{05d0}"));
    }
}

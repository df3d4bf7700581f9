//! Read-only document model for the scanners.
//!
//! html5ever parses into an index-addressed arena. Scanners never follow live
//! sibling pointers: they ask for a flattened `Vec<NodeId>` (siblings, or the
//! whole document in order) and walk it with a [`Cursor`].

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use html5ever::driver::ParseOpts;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, QualName, parse_document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
pub enum NodeData {
    Document,
    Element {
        name: Rc<QualName>,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
    Doctype,
}

#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    pub fn parse(html: &str) -> Document {
        parse_document(DocumentSink::new(), ParseOpts::default())
            .from_utf8()
            .one(html.as_bytes())
    }

    fn empty() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { name, .. } => Some(name.local.as_ref()),
            _ => None,
        }
    }

    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id) == Some(tag)
    }

    pub fn attrs(&self, id: NodeId) -> &[(String, String)] {
        match &self.node(id).data {
            NodeData::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Concatenated text of every text descendant, in document order.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.node(id).data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element { .. } | NodeData::Document => {
                for child in self.children(id) {
                    self.collect_text(*child, out);
                }
            }
            NodeData::Comment(_) | NodeData::Doctype => {}
        }
    }

    /// Every node below `id` in document (pre-)order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn find_descendant(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|node| self.is_tag(*node, tag))
    }

    /// `id` followed by its later siblings.
    pub fn siblings_from(&self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.node(id).parent else {
            return vec![id];
        };
        let siblings = self.children(parent);
        match siblings.iter().position(|sibling| *sibling == id) {
            Some(index) => siblings[index..].to_vec(),
            None => vec![id],
        }
    }

    /// Cursor over the whole document in order, from the beginning.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.descendants(self.root()))
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != id);
        }
    }

    fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn append_text(&mut self, parent: NodeId, text: &str) {
        if let Some(last) = self.nodes[parent.0].children.last().copied()
            && let NodeData::Text(existing) = &mut self.nodes[last.0].data
        {
            existing.push_str(text);
            return;
        }
        let node = self.alloc(NodeData::Text(text.to_string()));
        self.append(parent, node);
    }

    fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        let Some(parent) = self.nodes[sibling.0].parent else {
            return;
        };
        self.detach(new_node);
        let index = self.nodes[parent.0]
            .children
            .iter()
            .position(|child| *child == sibling)
            .unwrap_or(0);
        self.nodes[parent.0].children.insert(index, new_node);
        self.nodes[new_node.0].parent = Some(parent);
    }
}

pub fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Index cursor over a flattened node sequence.
#[derive(Debug, Clone)]
pub struct Cursor {
    nodes: Vec<NodeId>,
    pos: usize,
}

impl Cursor {
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self { nodes, pos: 0 }
    }

    /// Advances to the first remaining node matching `predicate` and
    /// leaves the cursor just past it.
    pub fn seek<F>(&mut self, predicate: F) -> Option<NodeId>
    where
        F: Fn(NodeId) -> bool,
    {
        while let Some(node) = self.next() {
            if predicate(node) {
                return Some(node);
            }
        }
        None
    }
}

impl Iterator for Cursor {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.pos).copied()?;
        self.pos += 1;
        Some(node)
    }
}

#[derive(Debug, Clone)]
struct Handle {
    id: NodeId,
    name: Option<Rc<QualName>>,
}

/// html5ever tree builder target. The element name travels inside the
/// handle so `elem_name` can borrow it without reaching into the arena.
struct DocumentSink {
    dom: RefCell<Document>,
}

impl DocumentSink {
    fn new() -> Self {
        Self {
            dom: RefCell::new(Document::empty()),
        }
    }

    fn insert(&self, parent: NodeId, child: NodeOrText<Handle>) {
        let mut dom = self.dom.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => dom.append(parent, node.id),
            NodeOrText::AppendText(text) => dom.append_text(parent, &text),
        }
    }
}

static EMPTY_NAME: QualName = QualName {
    prefix: None,
    ns: html5ever::ns!(),
    local: html5ever::local_name!(""),
};

impl TreeSink for DocumentSink {
    type Handle = Handle;
    type Output = Document;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self.dom.into_inner()
    }

    fn parse_error(&self, _msg: Cow<'static, str>) {}

    fn get_document(&self) -> Self::Handle {
        Handle {
            id: self.dom.borrow().root(),
            name: None,
        }
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        target.name.as_deref().unwrap_or(&EMPTY_NAME)
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Html5Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let name = Rc::new(name);
        let attrs = attrs
            .into_iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();
        let id = self.dom.borrow_mut().alloc(NodeData::Element {
            name: Rc::clone(&name),
            attrs,
        });
        Handle {
            id,
            name: Some(name),
        }
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        let id = self
            .dom
            .borrow_mut()
            .alloc(NodeData::Comment(text.to_string()));
        Handle { id, name: None }
    }

    fn create_pi(&self, _target: StrTendril, data: StrTendril) -> Self::Handle {
        self.create_comment(data)
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        self.insert(parent.id, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let parent = self.dom.borrow().node(element.id).parent;
        match parent {
            Some(parent) => self.insert(parent, child),
            None => self.insert(prev_element.id, child),
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        let mut dom = self.dom.borrow_mut();
        let root = dom.root();
        let doctype = dom.alloc(NodeData::Doctype);
        dom.append(root, doctype);
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x.id == y.id
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let mut dom = self.dom.borrow_mut();
        let node = match new_node {
            NodeOrText::AppendNode(node) => node.id,
            NodeOrText::AppendText(text) => dom.alloc(NodeData::Text(text.to_string())),
        };
        dom.insert_before(sibling.id, node);
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Html5Attribute>) {
        let mut dom = self.dom.borrow_mut();
        if let NodeData::Element {
            attrs: existing, ..
        } = &mut dom.nodes[target.id.0].data
        {
            for attr in attrs {
                let key = attr.name.local.to_string();
                if !existing.iter().any(|(name, _)| *name == key) {
                    existing.push((key, attr.value.to_string()));
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        self.dom.borrow_mut().detach(target.id);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let mut dom = self.dom.borrow_mut();
        let children = std::mem::take(&mut dom.nodes[node.id.0].children);
        for child in children {
            dom.nodes[child.0].parent = None;
            dom.append(new_parent.id, child);
        }
    }
}

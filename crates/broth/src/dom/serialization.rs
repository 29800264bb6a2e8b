//! Компактная сериализация арены через сериализатор html5ever.
//!
//! Атрибуты выводятся в исходном порядке: арена хранит их списком, а не
//! отсортированной картой.

use std::io;

use ego_tree::{NodeId, NodeRef};
use html5ever::serialize::{self, Serialize, SerializeOpts, Serializer, TraversalScope};
use html5ever::{LocalName, Namespace, QualName};

use super::document::Document;
use super::node::{ElementData, NodeData};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Сериализует узел вместе с ним самим (outer HTML).
pub fn serialize_node(dom: &Document, node_id: NodeId) -> String {
    dom.node(node_id)
        .map(|node| render(node, TraversalScope::IncludeNode))
        .unwrap_or_default()
}

/// Сериализует только детей узла (inner HTML).
pub fn serialize_children(dom: &Document, node_id: NodeId) -> String {
    dom.node(node_id)
        .map(|node| render(node, TraversalScope::ChildrenOnly(None)))
        .unwrap_or_default()
}

/// Сериализует последовательность соседних узлов, например верхний уровень
/// фрагмента.
pub fn serialize_nodes(dom: &Document, node_ids: &[NodeId]) -> String {
    node_ids
        .iter()
        .map(|&node_id| serialize_node(dom, node_id))
        .collect()
}

/// Открывающий тег с атрибутами в исходном порядке.
pub fn tag_string(element: &ElementData) -> String {
    let mut tag = format!("<{}", element.name);
    for (key, value) in &element.attributes {
        tag.push_str(&format!(r#" {}="{}""#, key, escape_attribute_value(value)));
    }
    tag.push('>');
    tag
}

/// Закрывающий тег; у void-элементов его нет.
pub fn closing_tag_string(element: &ElementData) -> String {
    if element.is_void() {
        String::new()
    } else {
        format!("</{}>", element.name)
    }
}

impl Document {
    /// Текст детей как есть, а для остальных детей — их компактный HTML.
    pub fn text_with_markup(&self, node_id: NodeId) -> String {
        let Some(node) = self.node(node_id) else {
            return String::new();
        };

        node.children()
            .map(|child| match child.value() {
                NodeData::Text(text) => text.clone(),
                _ => render(child, TraversalScope::IncludeNode),
            })
            .collect()
    }
}

pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn escape_attribute_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn render(node: NodeRef<'_, NodeData>, traversal_scope: TraversalScope) -> String {
    let mut buffer = Vec::new();
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };

    // Запись в Vec<u8> не может завершиться ошибкой ввода-вывода.
    if let Err(err) = serialize::serialize(&mut buffer, &SerializableNode { node }, opts) {
        tracing::error!(%err, "failed to serialize node");
    }

    String::from_utf8_lossy(&buffer).into_owned()
}

fn element_name(name: &str) -> QualName {
    QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(name))
}

fn attribute_name(name: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(name))
}

struct SerializableNode<'a> {
    node: NodeRef<'a, NodeData>,
}

enum SerializeOp<'a> {
    Open(NodeRef<'a, NodeData>),
    Close(QualName),
}

impl Serialize for SerializableNode<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let mut ops: Vec<SerializeOp<'_>> = match traversal_scope {
            TraversalScope::IncludeNode => vec![SerializeOp::Open(self.node)],
            TraversalScope::ChildrenOnly(_) => {
                self.node.children().rev().map(SerializeOp::Open).collect()
            }
        };

        while let Some(op) = ops.pop() {
            match op {
                SerializeOp::Open(node) => match node.value() {
                    NodeData::Element(element) => {
                        let name = element_name(&element.name);
                        let attributes: Vec<(QualName, &str)> = element
                            .attributes
                            .iter()
                            .map(|(key, value)| (attribute_name(key), value.as_str()))
                            .collect();

                        serializer.start_elem(
                            name.clone(),
                            attributes.iter().map(|(key, value)| (key, *value)),
                        )?;

                        ops.push(SerializeOp::Close(name));
                        ops.extend(node.children().rev().map(SerializeOp::Open));
                    }
                    NodeData::Text(text) => serializer.write_text(text)?,
                    NodeData::Comment(comment) => serializer.write_comment(comment)?,
                    NodeData::Doctype(doctype) => serializer.write_doctype(&doctype.name)?,
                    NodeData::Document => {
                        ops.extend(node.children().rev().map(SerializeOp::Open));
                    }
                },
                SerializeOp::Close(name) => serializer.end_elem(name)?,
            }
        }

        Ok(())
    }
}

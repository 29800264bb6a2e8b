//! Типизированные дескрипторы элементов и текста поверх арены.
//!
//! `ElementRef`/`TextRef` только читают, `ElementMut`/`ContentMut` изменяют
//! дерево. Все дескрипторы адресуют узел арены по `NodeId`, поэтому изменения
//! через один видны через любой другой, полученный позже.

use std::fmt;

use crate::dom::serialization::{self, serialize_node};
use crate::dom::{
    Document, DomError, ElementData, NodeData, NodeId, Position, Select, SelectorCompileError,
};
use crate::prettify::{PrettifyError, PrettifyOptions, prettify_element};

/// Значение атрибута до нормализации.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Str(String),
    /// `true` выводится как `key="key"`, `false` убирает атрибут.
    Bool(bool),
    /// Склеивается через пробел.
    List(Vec<String>),
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(value: Vec<String>) -> Self {
        AttrValue::List(value)
    }
}

impl From<Vec<&str>> for AttrValue {
    fn from(value: Vec<&str>) -> Self {
        AttrValue::List(value.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for AttrValue {
    fn from(value: [&str; N]) -> Self {
        AttrValue::List(value.iter().map(|item| item.to_string()).collect())
    }
}

/// Приводит ключ и значение к виду, который хранит арена. `None` означает,
/// что атрибут нужно убрать.
pub fn normalize_attribute(key: &str, value: AttrValue) -> (String, Option<String>) {
    let key = match key {
        "klass" | "css" => "class".to_string(),
        other => other.to_string(),
    };

    let value = match value {
        AttrValue::Str(value) => Some(value),
        AttrValue::Bool(true) => Some(key.clone()),
        AttrValue::Bool(false) => None,
        AttrValue::List(items) => Some(items.join(" ")),
    };

    (key, value)
}

fn apply_attribute(element: &mut ElementData, key: &str, value: AttrValue) {
    match normalize_attribute(key, value) {
        (key, Some(value)) => element.set_attribute(&key, value),
        (key, None) => element.remove_attribute(&key),
    }
}

/// Описание ещё не созданного элемента.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewElement {
    name: String,
    text: Option<String>,
    attributes: Vec<(String, AttrValue)>,
}

impl NewElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            text: None,
            attributes: Vec::new(),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn attr(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.push((key.to_string(), value.into()));
        self
    }

    pub(crate) fn build(self, dom: &mut Document) -> NodeId {
        let mut element = ElementData::new(self.name);
        for (key, value) in self.attributes {
            apply_attribute(&mut element, &key, value);
        }
        dom.create_element(element, self.text.as_deref())
    }
}

/// Новое содержимое для `append`/`prepend`: текст или элемент.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewContent {
    Text(String),
    Element(NewElement),
}

impl From<&str> for NewContent {
    fn from(text: &str) -> Self {
        NewContent::Text(text.to_string())
    }
}

impl From<String> for NewContent {
    fn from(text: String) -> Self {
        NewContent::Text(text)
    }
}

impl From<NewElement> for NewContent {
    fn from(element: NewElement) -> Self {
        NewContent::Element(element)
    }
}

/// Дескриптор элемента только для чтения.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    dom: &'a Document,
    node_id: NodeId,
    data: &'a ElementData,
}

impl<'a> ElementRef<'a> {
    /// `None`, если узла нет или это не элемент.
    pub fn wrap(dom: &'a Document, node_id: NodeId) -> Option<Self> {
        let data = dom.data(node_id)?.as_element()?;
        Some(Self { dom, node_id, data })
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn name(&self) -> &'a str {
        &self.data.name
    }

    pub fn id(&self) -> Option<&'a str> {
        self.data.attribute("id")
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.data.attribute(name)
    }

    /// Атрибуты в исходном порядке.
    pub fn attributes(&self) -> &'a [(String, String)] {
        &self.data.attributes
    }

    pub fn classes(&self) -> Vec<&'a str> {
        self.attr("class")
            .map(|classes| classes.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Дочерние элементы; текст и комментарии пропускаются.
    pub fn children(&self) -> impl Iterator<Item = ElementRef<'a>> + use<'a> {
        let dom = self.dom;
        dom.node(self.node_id)
            .into_iter()
            .flat_map(|node| node.children())
            .filter_map(move |child| ElementRef::wrap(dom, child.id()))
    }

    /// Родитель, если он элемент.
    pub fn parent(&self) -> Option<ElementRef<'a>> {
        let parent = self.dom.node(self.node_id)?.parent()?;
        ElementRef::wrap(self.dom, parent.id())
    }

    /// Текст детей как есть вместе с разметкой вложенных элементов.
    pub fn text(&self) -> String {
        self.dom.text_with_markup(self.node_id)
    }

    pub fn tag_string(&self) -> String {
        serialization::tag_string(self.data)
    }

    pub fn closing_tag_string(&self) -> String {
        serialization::closing_tag_string(self.data)
    }

    pub fn is_void(&self) -> bool {
        self.data.is_void()
    }

    pub fn prettify(&self, options: &PrettifyOptions) -> Result<String, PrettifyError> {
        prettify_element(self.dom, self.node_id, options)
    }

    /// Потомки элемента, подходящие под селектор.
    pub fn query(&self, selector: &str) -> Result<Matches<'a>, SelectorCompileError> {
        Ok(Matches::new(self.dom, self.dom.select(self.node_id, selector)?))
    }
}

impl fmt::Display for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize_node(self.dom, self.node_id))
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("node_id", &self.node_id)
            .field("name", &self.data.name)
            .finish()
    }
}

/// Дескриптор текстового узла.
#[derive(Debug, Clone, Copy)]
pub struct TextRef<'a> {
    node_id: NodeId,
    text: &'a str,
}

impl<'a> TextRef<'a> {
    pub fn wrap(dom: &'a Document, node_id: NodeId) -> Option<Self> {
        let text = dom.data(node_id)?.as_text()?;
        Some(Self { node_id, text })
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }
}

impl fmt::Display for TextRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

/// Ленивая выборка элементов по селектору.
#[derive(Debug)]
pub struct Matches<'a> {
    dom: &'a Document,
    select: Select<'a>,
}

impl<'a> Matches<'a> {
    pub(crate) fn new(dom: &'a Document, select: Select<'a>) -> Self {
        Self { dom, select }
    }
}

impl<'a> Iterator for Matches<'a> {
    type Item = ElementRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let dom = self.dom;
        self.select
            .by_ref()
            .find_map(|node_id| ElementRef::wrap(dom, node_id))
    }
}

/// Вставляет новое содержимое соседом `anchor`.
fn insert_content(
    dom: &mut Document,
    anchor: NodeId,
    content: NewContent,
    position: Position,
) -> Result<NodeId, DomError> {
    let node_id = match content {
        NewContent::Text(text) => dom.create_text(&text),
        NewContent::Element(element) => element.build(dom),
    };
    dom.insert_sibling(anchor, node_id, position)
}

/// Изменяемый дескриптор любого узла содержимого.
#[derive(Debug)]
pub struct ContentMut<'a> {
    dom: &'a mut Document,
    node_id: NodeId,
}

impl<'a> ContentMut<'a> {
    pub fn wrap(dom: &'a mut Document, node_id: NodeId) -> Option<Self> {
        dom.node(node_id)?;
        Some(Self { dom, node_id })
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn is_element(&self) -> bool {
        self.dom.is_element(self.node_id)
    }

    pub fn is_text(&self) -> bool {
        matches!(self.dom.data(self.node_id), Some(NodeData::Text(_)))
    }

    pub fn as_text(&self) -> Option<TextRef<'_>> {
        TextRef::wrap(self.dom, self.node_id)
    }

    pub fn as_element(&self) -> Option<ElementRef<'_>> {
        ElementRef::wrap(self.dom, self.node_id)
    }

    pub fn into_element(self) -> Option<ElementMut<'a>> {
        ElementMut::wrap(self.dom, self.node_id)
    }

    /// Вставляет содержимое сразу после узла.
    pub fn append(&mut self, content: impl Into<NewContent>) -> Result<ContentMut<'_>, DomError> {
        let inserted = insert_content(self.dom, self.node_id, content.into(), Position::After)?;
        Ok(ContentMut {
            dom: &mut *self.dom,
            node_id: inserted,
        })
    }

    /// Вставляет содержимое сразу перед узлом.
    pub fn prepend(&mut self, content: impl Into<NewContent>) -> Result<ContentMut<'_>, DomError> {
        let inserted = insert_content(self.dom, self.node_id, content.into(), Position::Before)?;
        Ok(ContentMut {
            dom: &mut *self.dom,
            node_id: inserted,
        })
    }
}

/// Изменяемый дескриптор элемента.
#[derive(Debug)]
pub struct ElementMut<'a> {
    dom: &'a mut Document,
    node_id: NodeId,
}

impl<'a> ElementMut<'a> {
    pub fn wrap(dom: &'a mut Document, node_id: NodeId) -> Option<Self> {
        if !dom.is_element(node_id) {
            return None;
        }
        Some(Self { dom, node_id })
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn as_element(&self) -> Option<ElementRef<'_>> {
        ElementRef::wrap(self.dom, self.node_id)
    }

    pub fn into_content(self) -> ContentMut<'a> {
        ContentMut {
            dom: self.dom,
            node_id: self.node_id,
        }
    }

    /// Заменяет все атрибуты новым набором.
    pub fn set_attributes<K, V>(
        &mut self,
        attributes: impl IntoIterator<Item = (K, V)>,
    ) -> Result<(), DomError>
    where
        K: AsRef<str>,
        V: Into<AttrValue>,
    {
        self.dom.with_element_mut(self.node_id, |element| {
            element.attributes.clear();
            for (key, value) in attributes {
                apply_attribute(element, key.as_ref(), value.into());
            }
        })
    }

    /// Меняет значение на месте; новый ключ добавляется в конец.
    pub fn set_attribute(&mut self, key: &str, value: impl Into<AttrValue>) -> Result<(), DomError> {
        let value = value.into();
        self.dom
            .with_element_mut(self.node_id, |element| apply_attribute(element, key, value))
    }

    pub fn remove_attribute(&mut self, key: &str) -> Result<(), DomError> {
        self.dom
            .with_element_mut(self.node_id, |element| element.remove_attribute(key))
    }

    pub fn set_id(&mut self, id: &str) -> Result<(), DomError> {
        self.set_attribute("id", id)
    }

    pub fn set_classes<S: AsRef<str>>(&mut self, classes: &[S]) -> Result<(), DomError> {
        let classes: Vec<String> = classes.iter().map(|class| class.as_ref().to_string()).collect();
        self.set_attribute("class", classes)
    }

    /// Заменяет всё содержимое текстом.
    pub fn set_text(&mut self, text: &str) -> Result<(), DomError> {
        self.dom.set_text_content(self.node_id, text)
    }

    pub fn remove_children(&mut self) -> Result<(), DomError> {
        self.dom.remove_children(self.node_id)
    }

    /// Вставляет существующий узел ребёнком на позицию `index`.
    pub fn insert_child(&mut self, child: NodeId, index: usize) -> Result<(), DomError> {
        self.dom.insert_child(self.node_id, child, index)?;
        tracing::trace!(parent = ?self.node_id, ?child, index, "inserted child");
        Ok(())
    }

    /// Создаёт элемент и вставляет его ребёнком на позицию `index`.
    pub fn insert_new_child(
        &mut self,
        element: NewElement,
        index: usize,
    ) -> Result<NodeId, DomError> {
        let child = element.build(self.dom);
        self.insert_child(child, index)?;
        Ok(child)
    }

    /// Вставляет содержимое сразу после элемента.
    pub fn append(&mut self, content: impl Into<NewContent>) -> Result<ContentMut<'_>, DomError> {
        let inserted = insert_content(self.dom, self.node_id, content.into(), Position::After)?;
        Ok(ContentMut {
            dom: &mut *self.dom,
            node_id: inserted,
        })
    }

    /// Вставляет содержимое сразу перед элементом.
    pub fn prepend(&mut self, content: impl Into<NewContent>) -> Result<ContentMut<'_>, DomError> {
        let inserted = insert_content(self.dom, self.node_id, content.into(), Position::Before)?;
        Ok(ContentMut {
            dom: &mut *self.dom,
            node_id: inserted,
        })
    }
}

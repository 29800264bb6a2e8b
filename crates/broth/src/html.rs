//! Корневой тип `Html`: разбор ввода, выборка, компактная и красивая
//! сериализация.

use std::fmt;
use std::str::FromStr;

use encoding_rs::{Encoding, UTF_8};
use thiserror::Error;

use crate::dom::serialization::{serialize_children, serialize_nodes};
use crate::dom::{Document, DomError, NodeId, SelectorCompileError};
use crate::element::{ContentMut, ElementMut, ElementRef, Matches, NewElement};
use crate::fragment::is_fragment;
use crate::prettify::{PrettifyError, PrettifyOptions, prettify_document};

/// Ошибки верхнего уровня.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HtmlError {
    #[error("unknown encoding label: {0}")]
    UnknownEncoding(String),
    #[error("input is not valid {encoding}")]
    Decode { encoding: &'static str },
    #[error(transparent)]
    Selector(#[from] SelectorCompileError),
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error(transparent)]
    Prettify(#[from] PrettifyError),
}

/// Разобранный документ или фрагмент.
#[derive(Debug, Clone)]
pub struct Html {
    document: Document,
    encoding: &'static Encoding,
    is_fragment: bool,
}

impl Html {
    pub fn parse(markup: &str) -> Self {
        Self::parse_with_encoding(markup, UTF_8)
    }

    /// Декодирует байты в явно заданной кодировке (по умолчанию UTF-8).
    /// BOM не учитывается, невалидные последовательности не заменяются.
    pub fn from_bytes(bytes: &[u8], encoding: Option<&str>) -> Result<Self, HtmlError> {
        let encoding = match encoding {
            Some(label) => Encoding::for_label(label.trim().as_bytes())
                .ok_or_else(|| HtmlError::UnknownEncoding(label.to_string()))?,
            None => UTF_8,
        };

        let markup = encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .ok_or(HtmlError::Decode {
                encoding: encoding.name(),
            })?;

        Ok(Self::parse_with_encoding(&markup, encoding))
    }

    fn parse_with_encoding(markup: &str, encoding: &'static Encoding) -> Self {
        let is_fragment = is_fragment(markup);
        let document = Document::parse_html(markup);
        tracing::debug!(is_fragment, encoding = encoding.name(), "parsed html input");

        Self {
            document,
            encoding,
            is_fragment,
        }
    }

    /// Каноническое имя кодировки ввода.
    pub fn encoding(&self) -> &'static str {
        self.encoding.name()
    }

    pub fn is_fragment(&self) -> bool {
        self.is_fragment
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Ленивая выборка по селектору; каждый вызов начинает обход заново.
    pub fn query(&self, selector: &str) -> Result<Matches<'_>, HtmlError> {
        let select = self.document.select(self.document.root_id(), selector)?;
        Ok(Matches::new(&self.document, select))
    }

    pub fn query_to_list(&self, selector: &str) -> Result<Vec<ElementRef<'_>>, HtmlError> {
        Ok(self.query(selector)?.collect())
    }

    fn top_level(&self) -> Vec<NodeId> {
        self.document.top_level(self.is_fragment)
    }

    /// Для документа это `<html>`, для фрагмента первый элемент верхнего
    /// уровня.
    pub fn root_element(&self) -> Option<ElementRef<'_>> {
        self.top_level()
            .into_iter()
            .find_map(|node_id| ElementRef::wrap(&self.document, node_id))
    }

    /// Все элементы в порядке документа, без синтезированных обёрток
    /// фрагмента.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        let document = &self.document;
        self.top_level()
            .into_iter()
            .filter_map(move |node_id| document.node(node_id))
            .flat_map(|node| node.descendants())
            .filter_map(move |node| ElementRef::wrap(document, node.id()))
    }

    pub fn element(&self, node_id: NodeId) -> Option<ElementRef<'_>> {
        ElementRef::wrap(&self.document, node_id)
    }

    pub fn element_mut(&mut self, node_id: NodeId) -> Option<ElementMut<'_>> {
        ElementMut::wrap(&mut self.document, node_id)
    }

    pub fn content_mut(&mut self, node_id: NodeId) -> Option<ContentMut<'_>> {
        ContentMut::wrap(&mut self.document, node_id)
    }

    /// Создаёт отсоединённый элемент; его можно вставить позже через
    /// `ElementMut::insert_child`.
    pub fn create_element(&mut self, element: NewElement) -> NodeId {
        element.build(&mut self.document)
    }

    pub fn prettify(&self, options: &PrettifyOptions) -> Result<String, PrettifyError> {
        prettify_document(&self.document, self.is_fragment, options)
    }
}

impl fmt::Display for Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let markup = if self.is_fragment {
            serialize_nodes(&self.document, &self.top_level())
        } else {
            serialize_children(&self.document, self.document.root_id())
        };
        f.write_str(&markup)
    }
}

impl FromStr for Html {
    type Err = HtmlError;

    fn from_str(markup: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(markup))
    }
}

impl From<&str> for Html {
    fn from(markup: &str) -> Self {
        Self::parse(markup)
    }
}

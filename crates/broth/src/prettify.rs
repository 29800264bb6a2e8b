//! Человекочитаемая сериализация с отступами.
//!
//! Алгоритм рекурсивно обходит элементы (только вниз по дереву, без ссылок на
//! родителя) и чередует дочерние элементы с текстом и комментариями строго в
//! порядке документа. Короткое содержимое листового элемента остаётся на одной
//! строке с тегами, длинное переносится на отдельную строку с отступом.
//! Содержимое `pre`, `textarea` и `listing` выводится как есть.
//! Дерево не изменяется, поэтому один документ можно форматировать из
//! нескольких мест одновременно.

use thiserror::Error;

use crate::dom::serialization::{closing_tag_string, escape_text, tag_string};
use crate::dom::{
    Document, DomError, NodeData, NodeId, is_preformatted_element, is_raw_text_element,
};

/// Глубже этого уровня вложенности форматирование прерывается ошибкой.
pub const MAX_NESTING_DEPTH: usize = 512;

/// Ошибки форматирования.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrettifyError {
    #[error("indent must be non-negative, got {0}")]
    NegativeIndent(isize),
    #[error("max line length must be non-negative, got {0}")]
    NegativeLineLength(isize),
    #[error("element nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Настройки форматирования.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrettifyOptions {
    /// Пробелов на уровень вложенности; `0` оставляет только переводы строк.
    pub indent: usize,
    /// Порог переноса текста листового элемента; `None` отключает перенос.
    pub max_line_length: Option<usize>,
}

impl Default for PrettifyOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            max_line_length: Some(88),
        }
    }
}

impl PrettifyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Конструктор для вызывающих со знаковыми значениями.
    pub fn try_new(
        indent: isize,
        max_line_length: Option<isize>,
    ) -> Result<Self, PrettifyError> {
        let indent =
            usize::try_from(indent).map_err(|_| PrettifyError::NegativeIndent(indent))?;
        let max_line_length = max_line_length
            .map(|length| {
                usize::try_from(length).map_err(|_| PrettifyError::NegativeLineLength(length))
            })
            .transpose()?;

        Ok(Self {
            indent,
            max_line_length,
        })
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_max_line_length(mut self, max_line_length: Option<usize>) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    pub fn without_line_wrapping(self) -> Self {
        self.with_max_line_length(None)
    }
}

/// Форматирует один элемент и его поддерево, начиная с нулевого отступа.
pub fn prettify_element(
    dom: &Document,
    node_id: NodeId,
    options: &PrettifyOptions,
) -> Result<String, PrettifyError> {
    let mut out = String::new();
    Prettifier::new(dom, options).element(node_id, 0, &mut out)?;
    Ok(out)
}

/// Форматирует узлы верхнего уровня документа или фрагмента.
///
/// Doctype всегда выводится в минимальной форме `<!DOCTYPE html>`.
pub fn prettify_document(
    dom: &Document,
    is_fragment: bool,
    options: &PrettifyOptions,
) -> Result<String, PrettifyError> {
    let prettifier = Prettifier::new(dom, options);
    let mut out = String::new();

    for node_id in dom.top_level(is_fragment) {
        let Some(node) = dom.node(node_id) else {
            continue;
        };

        match node.value() {
            NodeData::Doctype(_) => out.push_str("<!DOCTYPE html>\n"),
            NodeData::Element(_) => prettifier.element(node_id, 0, &mut out)?,
            NodeData::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    out.push_str(&reindent(&escape_text(text), ""));
                    out.push('\n');
                }
            }
            NodeData::Comment(comment) => {
                out.push_str(&comment_string(comment));
                out.push('\n');
            }
            NodeData::Document => {}
        }
    }

    tracing::debug!(is_fragment, bytes = out.len(), "prettified document");
    Ok(out)
}

struct Prettifier<'a> {
    dom: &'a Document,
    options: &'a PrettifyOptions,
}

impl<'a> Prettifier<'a> {
    fn new(dom: &'a Document, options: &'a PrettifyOptions) -> Self {
        Self { dom, options }
    }

    fn padding(&self, depth: usize) -> String {
        " ".repeat(depth * self.options.indent)
    }

    fn element(
        &self,
        node_id: NodeId,
        depth: usize,
        out: &mut String,
    ) -> Result<(), PrettifyError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(PrettifyError::TooDeep {
                limit: MAX_NESTING_DEPTH,
            });
        }

        let element = self
            .dom
            .data(node_id)
            .ok_or(DomError::NodeNotFound(node_id))?
            .as_element()
            .ok_or(DomError::NotAnElement(node_id))?;

        tracing::trace!(tag = %element.name, depth, "prettify element");

        let padding = self.padding(depth);
        out.push_str(&padding);
        out.push_str(&tag_string(element));

        let raw_text = is_raw_text_element(&element.name);
        let content = self.dom.content_children(node_id);
        let has_child_elements = content.iter().any(|child| child.value().is_element());

        if has_child_elements {
            // Отступ растёт один раз на элемент, а не на каждого соседа.
            let child_depth = if element.is_void() { depth } else { depth + 1 };
            let child_padding = self.padding(child_depth);

            for child in content {
                match child.value() {
                    NodeData::Element(_) => {
                        ensure_line_break(out);
                        self.element(child.id(), child_depth, out)?;
                    }
                    NodeData::Text(text) => {
                        let text = text.trim();
                        if text.is_empty() {
                            continue;
                        }
                        ensure_line_break(out);
                        out.push_str(&child_padding);
                        out.push_str(&reindent(&render_text(text, raw_text), &child_padding));
                    }
                    NodeData::Comment(comment) => {
                        ensure_line_break(out);
                        out.push_str(&child_padding);
                        out.push_str(&comment_string(comment));
                    }
                    NodeData::Doctype(_) | NodeData::Document => {}
                }
            }

            let closing = closing_tag_string(element);
            if !closing.is_empty() {
                ensure_line_break(out);
                out.push_str(&padding);
                out.push_str(&closing);
            }
        } else {
            let leaf: String = content
                .iter()
                .map(|child| match child.value() {
                    NodeData::Text(text) => render_text(text, raw_text),
                    NodeData::Comment(comment) => comment_string(comment),
                    _ => String::new(),
                })
                .collect();

            if is_preformatted_element(&element.name) {
                // Первый перевод строки после тега парсер отбросит.
                if leaf.starts_with('\n') {
                    out.push('\n');
                }
                out.push_str(&leaf);
            } else {
                let leaf = leaf.trim();
                let is_long_line = self
                    .options
                    .max_line_length
                    .is_some_and(|max_line_length| line_length(leaf) > max_line_length);

                if is_long_line {
                    let child_padding = self.padding(depth + 1);
                    out.push('\n');
                    out.push_str(&child_padding);
                    out.push_str(&reindent(leaf, &child_padding));
                    out.push('\n');
                    out.push_str(&padding);
                } else {
                    out.push_str(leaf);
                }
            }

            out.push_str(&closing_tag_string(element));
        }

        ensure_line_break(out);
        Ok(())
    }
}

fn render_text(text: &str, raw_text: bool) -> String {
    if raw_text {
        text.to_string()
    } else {
        escape_text(text)
    }
}

fn comment_string(comment: &str) -> String {
    format!("<!-- {} -->", comment.trim())
}

/// Переносит внутренние строки текста на заданный отступ. Собственный
/// отступ строк отбрасывается, поэтому повторное форматирование его не
/// накапливает.
fn reindent(text: &str, padding: &str) -> String {
    let mut lines = text.split('\n');
    let mut result = lines.next().unwrap_or_default().to_string();
    for line in lines {
        result.push('\n');
        let line = line.trim_start();
        if !line.is_empty() {
            result.push_str(padding);
            result.push_str(line);
        }
    }
    result
}

/// Длина содержимого листа без собственных отступов строк.
fn line_length(leaf: &str) -> usize {
    reindent(leaf, "").chars().count()
}

/// Добавляет перевод строки, только если буфер им ещё не заканчивается.
fn ensure_line_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

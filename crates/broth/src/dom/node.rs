use bitflags::bitflags;

/// Элементы, у которых не бывает детей и закрывающего тега.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// Элементы, текст которых сериализуется без экранирования.
pub const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

/// Элементы, после открывающего тега которых парсер отбрасывает первый
/// перевод строки.
pub const PREFORMATTED_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

pub fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

pub fn is_preformatted_element(name: &str) -> bool {
    PREFORMATTED_ELEMENTS
        .iter()
        .any(|tag| tag.eq_ignore_ascii_case(name))
}

bitflags! {
    /// Виды узлов, которые нужно вернуть при обходе детей.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeKinds: u8 {
        const ELEMENT = 1 << 0;
        const TEXT = 1 << 1;
        const COMMENT = 1 << 2;
        const DOCTYPE = 1 << 3;

        /// Дети, значимые для рендеринга.
        const CONTENT = Self::ELEMENT.bits() | Self::TEXT.bits() | Self::COMMENT.bits();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctype {
    pub name: String,
    pub public_id: String,
    pub system_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub name: String,
    /// Атрибуты в исходном порядке документа.
    pub attributes: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Заменяет значение на месте, новый ключ добавляется в конец.
    pub fn set_attribute(&mut self, name: &str, value: String) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.retain(|(key, _)| key != name);
    }

    pub fn is_void(&self) -> bool {
        is_void_element(&self.name)
    }
}

/// Содержимое узла арены.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Doctype(Doctype),
    Comment(String),
    Text(String),
    Element(ElementData),
}

impl NodeData {
    pub fn kind(&self) -> NodeKinds {
        match self {
            NodeData::Document => NodeKinds::empty(),
            NodeData::Doctype(_) => NodeKinds::DOCTYPE,
            NodeData::Comment(_) => NodeKinds::COMMENT,
            NodeData::Text(_) => NodeKinds::TEXT,
            NodeData::Element(_) => NodeKinds::ELEMENT,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, NodeData::Element(_))
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match self {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match self {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.as_element().map(|element| element.name.as_str())
    }

    /// Текстовый узел, состоящий ровно из одного перевода строки, — артефакт
    /// форматирования исходника.
    pub fn is_structural_whitespace(&self) -> bool {
        matches!(self, NodeData::Text(text) if text == "\n")
    }
}

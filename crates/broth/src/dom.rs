//! Арена DOM поверх `ego_tree`, заполняемая парсером scraper/html5ever.

pub mod document;
pub mod manipulation;
pub mod node;
pub mod parser;
pub mod selectors;
pub mod serialization;

pub use document::Document;
pub use ego_tree::NodeId;
pub use manipulation::{DomError, Position};
pub use node::{
    Doctype, ElementData, NodeData, NodeKinds, VOID_ELEMENTS, is_preformatted_element,
    is_raw_text_element, is_void_element,
};
pub use self::selectors::{Select, SelectorCompileError};

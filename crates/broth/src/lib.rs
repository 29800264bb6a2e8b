pub mod dom;
pub mod element;
pub mod fragment;
pub mod html;
pub mod prettify;

pub use dom::{Document, DomError, NodeId, SelectorCompileError};
pub use element::{
    AttrValue, ContentMut, ElementMut, ElementRef, Matches, NewContent, NewElement, TextRef,
};
pub use fragment::is_fragment;
pub use html::{Html, HtmlError};
pub use prettify::{MAX_NESTING_DEPTH, PrettifyError, PrettifyOptions};

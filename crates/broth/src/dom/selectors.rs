//! Поиск по CSS-селекторам: узлы арены подключены к crate `selectors`.

use std::borrow::Borrow;
use std::fmt;

use cssparser::{Parser as CssParser, ParserInput, ToCss, serialize_identifier, serialize_string};
use ego_tree::iter::Descendants;
use ego_tree::{NodeId, NodeRef};
use precomputed_hash::PrecomputedHash;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::matching::{
    self, ElementSelectorFlags, MatchingContext, MatchingForInvalidation, MatchingMode,
    NeedsSelectorFlags, QuirksMode, SelectorCaches,
};
use selectors::parser::{ParseRelative, SelectorImpl, SelectorList, SelectorParseErrorKind};
use selectors::{Element, OpaqueElement};
use thiserror::Error;

use super::document::Document;
use super::node::NodeData;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Скомпилированный список селекторов через запятую.
pub type CompiledSelector = SelectorList<BrothSelectors>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid selector `{selector}`: {reason}")]
pub struct SelectorCompileError {
    selector: String,
    reason: String,
}

pub fn compile_selector(selector_text: &str) -> Result<CompiledSelector, SelectorCompileError> {
    let mut input = ParserInput::new(selector_text);
    let mut parser = CssParser::new(&mut input);

    SelectorList::parse(&SelectorSyntax, &mut parser, ParseRelative::No).map_err(|err| {
        SelectorCompileError {
            selector: selector_text.to_string(),
            reason: format!("{:?}", err.kind),
        }
    })
}

impl Document {
    /// Ленивая выборка элементов-потомков `scope` в порядке документа.
    pub fn select(
        &self,
        scope: NodeId,
        selector_text: &str,
    ) -> Result<Select<'_>, SelectorCompileError> {
        let selector = compile_selector(selector_text)?;
        tracing::debug!(selector = %selector.to_css_string(), ?scope, "compiled selector");

        let mut descendants = self
            .node(scope)
            .unwrap_or_else(|| self.root())
            .descendants();
        // Сам корень выборки в результат не попадает.
        descendants.next();

        Ok(Select {
            descendants,
            selector,
            caches: SelectorCaches::default(),
        })
    }
}

/// Итератор совпадений; каждый вызов `Document::select` создаёт новый.
pub struct Select<'a> {
    descendants: Descendants<'a, NodeData>,
    selector: CompiledSelector,
    caches: SelectorCaches,
}

impl Select<'_> {
    fn matches(&mut self, candidate: &SelectorNode<'_>) -> bool {
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            &mut self.caches,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            MatchingForInvalidation::No,
        );

        self.selector
            .slice()
            .iter()
            .any(|selector| matching::matches_selector(selector, 0, None, candidate, &mut context))
    }
}

impl Iterator for Select<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let node = self.descendants.next()?;
            if let Some(candidate) = SelectorNode::new(node) {
                if self.matches(&candidate) {
                    return Some(node.id());
                }
            }
        }
    }
}

impl fmt::Debug for Select<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Select")
            .field(&self.selector.to_css_string())
            .finish()
    }
}

/// Элемент арены глазами движка селекторов.
#[derive(Clone, Copy)]
pub struct SelectorNode<'a> {
    node: NodeRef<'a, NodeData>,
}

impl<'a> SelectorNode<'a> {
    pub fn new(node: NodeRef<'a, NodeData>) -> Option<Self> {
        node.value().is_element().then_some(Self { node })
    }

    fn name(&self) -> &'a str {
        self.node.value().tag_name().unwrap_or_default()
    }

    fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.value().as_element()?.attribute(name)
    }

    fn first_element(nodes: impl Iterator<Item = NodeRef<'a, NodeData>>) -> Option<Self> {
        nodes.filter_map(SelectorNode::new).next()
    }

    fn class_list_contains(&self, class: &str, case_sensitivity: CaseSensitivity) -> bool {
        self.attr("class").is_some_and(|classes| {
            classes
                .split_whitespace()
                .any(|candidate| case_sensitivity.eq(candidate.as_bytes(), class.as_bytes()))
        })
    }
}

impl fmt::Debug for SelectorNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> {:?}", self.name(), self.node.id())
    }
}

impl Element for SelectorNode<'_> {
    type Impl = BrothSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.node.value())
    }

    fn parent_element(&self) -> Option<Self> {
        self.node.parent().and_then(SelectorNode::new)
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        Self::first_element(self.node.prev_siblings())
    }

    fn next_sibling_element(&self) -> Option<Self> {
        Self::first_element(self.node.next_siblings())
    }

    fn first_element_child(&self) -> Option<Self> {
        Self::first_element(self.node.children())
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, local_name: &str) -> bool {
        self.name().eq_ignore_ascii_case(local_name)
    }

    fn has_namespace(&self, ns: &str) -> bool {
        is_html_namespace(ns)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.name() == other.name()
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&Atom>,
        local_name: &Atom,
        operation: &AttrSelectorOperation<&AttrText>,
    ) -> bool {
        let namespace_ok = match ns {
            NamespaceConstraint::Any => true,
            NamespaceConstraint::Specific(url) => is_html_namespace(&url.0),
        };

        namespace_ok && self.attr(&local_name.0).is_some_and(|value| operation.eval_str(value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pseudo_class: &NoPseudoClass,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match *pseudo_class {}
    }

    fn match_pseudo_element(
        &self,
        pseudo_element: &NoPseudoElement,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match *pseudo_element {}
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        matches!(self.name(), "a" | "area" | "link") && self.attr("href").is_some()
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &Atom, case_sensitivity: CaseSensitivity) -> bool {
        self.attr("id")
            .is_some_and(|value| case_sensitivity.eq(value.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &Atom, case_sensitivity: CaseSensitivity) -> bool {
        self.class_list_contains(&name.0, case_sensitivity)
    }

    fn has_custom_state(&self, _name: &Atom) -> bool {
        false
    }

    fn imported_part(&self, _name: &Atom) -> Option<Atom> {
        None
    }

    fn is_part(&self, _name: &Atom) -> bool {
        false
    }

    /// Пустой элемент: без детей-элементов и без непустого текста.
    fn is_empty(&self) -> bool {
        !self.node.children().any(|child| match child.value() {
            NodeData::Element(_) => true,
            NodeData::Text(text) => !text.is_empty(),
            _ => false,
        })
    }

    fn is_root(&self) -> bool {
        self.node
            .parent()
            .is_some_and(|parent| matches!(parent.value(), NodeData::Document))
    }

    fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
        false
    }
}

fn is_html_namespace(ns: &str) -> bool {
    ns.is_empty() || ns.eq_ignore_ascii_case(HTML_NAMESPACE)
}

/// Набор типов селекторов для HTML-арены. Собственных псевдоклассов и
/// псевдоэлементов нет.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrothSelectors;

impl SelectorImpl for BrothSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = AttrText;
    type Identifier = Atom;
    type LocalName = Atom;
    type NamespaceUrl = Atom;
    type NamespacePrefix = Atom;
    type BorrowedLocalName = str;
    type BorrowedNamespaceUrl = str;
    type NonTSPseudoClass = NoPseudoClass;
    type PseudoElement = NoPseudoElement;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoPseudoClass {}

impl selectors::parser::NonTSPseudoClass for NoPseudoClass {
    type Impl = BrothSelectors;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl ToCss for NoPseudoClass {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoPseudoElement {}

impl selectors::parser::PseudoElement for NoPseudoElement {
    type Impl = BrothSelectors;
}

impl ToCss for NoPseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

struct SelectorSyntax;

impl<'i> selectors::parser::Parser<'i> for SelectorSyntax {
    type Impl = BrothSelectors;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_is_and_where(&self) -> bool {
        true
    }

    fn parse_has(&self) -> bool {
        true
    }
}

/// Имя из селектора: тег, класс, id или пространство имён.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Atom(String);

/// Значение в селекторе атрибута, например `[href$="lacie"]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttrText(String);

impl From<&str> for Atom {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for AttrText {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Borrow<str> for Atom {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Atom {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AttrText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToCss for Atom {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        serialize_identifier(&self.0, dest)
    }
}

impl ToCss for AttrText {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        serialize_string(&self.0, dest)
    }
}

impl PrecomputedHash for Atom {
    fn precomputed_hash(&self) -> u32 {
        fnv1a(&self.0)
    }
}

impl PrecomputedHash for AttrText {
    fn precomputed_hash(&self) -> u32 {
        fnv1a(&self.0)
    }
}

fn fnv1a(text: &str) -> u32 {
    text.bytes()
        .fold(0x811c_9dc5, |hash, byte| (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193))
}

use ego_tree::{NodeId, NodeRef, Tree};

use super::node::{NodeData, NodeKinds};

/// Арена узлов документа.
///
/// Все узлы живут в `ego_tree::Tree` до конца жизни документа; наружу
/// отдаются только `NodeId`, а ссылки на родителя используются лишь для
/// навигации.
#[derive(Debug, Clone)]
pub struct Document {
    pub(super) tree: Tree<NodeData>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            tree: Tree::new(NodeData::Document),
        }
    }

    pub fn root(&self) -> NodeRef<'_, NodeData> {
        self.tree.root()
    }

    pub fn root_id(&self) -> NodeId {
        self.tree.root().id()
    }

    pub fn node(&self, node_id: NodeId) -> Option<NodeRef<'_, NodeData>> {
        self.tree.get(node_id)
    }

    pub fn data(&self, node_id: NodeId) -> Option<&NodeData> {
        self.tree.get(node_id).map(|node| node.value())
    }

    pub fn is_element(&self, node_id: NodeId) -> bool {
        self.data(node_id).is_some_and(NodeData::is_element)
    }

    pub fn node_count(&self) -> usize {
        self.tree.root().descendants().count()
    }

    /// Прямые дети узла указанных видов в порядке документа.
    pub fn children_of_kind(
        &self,
        node_id: NodeId,
        kinds: NodeKinds,
    ) -> impl Iterator<Item = NodeRef<'_, NodeData>> + '_ {
        self.tree
            .get(node_id)
            .into_iter()
            .flat_map(|node| node.children())
            .filter(move |child| kinds.intersects(child.value().kind()))
    }

    /// Дети, значимые для рендеринга: элементы, комментарии и текст, кроме
    /// одиночных переводов строки.
    pub fn content_children(&self, node_id: NodeId) -> Vec<NodeRef<'_, NodeData>> {
        self.children_of_kind(node_id, NodeKinds::CONTENT)
            .filter(|child| !child.value().is_structural_whitespace())
            .collect()
    }

    /// Элемент `<html>` среди детей корня документа.
    pub fn html_element(&self) -> Option<NodeId> {
        self.children_of_kind(self.root_id(), NodeKinds::ELEMENT)
            .find(|node| node.value().tag_name() == Some("html"))
            .map(|node| node.id())
    }

    /// Узлы верхнего уровня с учётом режима фрагмента.
    ///
    /// Для документа это дети корня. Для фрагмента синтезированные парсером
    /// `html`, `head` и `body` пропускаются, а их дети поднимаются наверх.
    pub fn top_level(&self, is_fragment: bool) -> Vec<NodeId> {
        let root = self.root();
        if !is_fragment {
            return root.children().map(|node| node.id()).collect();
        }

        let mut items = Vec::new();
        for child in root.children() {
            if child.value().tag_name() != Some("html") {
                items.push(child.id());
                continue;
            }

            for html_child in child.children() {
                match html_child.value().tag_name() {
                    Some("head") | Some("body") => {
                        items.extend(html_child.children().map(|node| node.id()));
                    }
                    _ => items.push(html_child.id()),
                }
            }
        }
        items
    }

    pub fn get_text_content(&self, node_id: NodeId) -> String {
        let mut text = String::new();
        if let Some(node) = self.tree.get(node_id) {
            for descendant in node.descendants() {
                if let NodeData::Text(content) = descendant.value() {
                    text.push_str(content);
                }
            }
        }
        text
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

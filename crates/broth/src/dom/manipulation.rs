use ego_tree::NodeId;
use thiserror::Error;

use super::document::Document;
use super::node::{ElementData, NodeData};

/// Ошибки изменения дерева.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("node {0:?} not found")]
    NodeNotFound(NodeId),
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
    #[error("node {0:?} has no parent to insert a sibling into")]
    Detached(NodeId),
    #[error("node {node:?} cannot be moved inside its own subtree at {target:?}")]
    WouldCycle { node: NodeId, target: NodeId },
    /// Нарушение внутреннего инварианта: вставленный узел не оказался на месте.
    #[error("inserted node {inserted:?} not found next to {anchor:?}")]
    InsertionLost { anchor: NodeId, inserted: NodeId },
}

/// С какой стороны от опорного узла вставлять соседа.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Before,
    After,
}

impl Document {
    /// Создаёт отсоединённый элемент в арене документа.
    pub fn create_element(&mut self, element: ElementData, text: Option<&str>) -> NodeId {
        let mut node = self.tree.orphan(NodeData::Element(element));
        if let Some(text) = text.filter(|text| !text.is_empty()) {
            node.append(NodeData::Text(text.to_string()));
        }
        let node_id = node.id();
        tracing::trace!(?node_id, "created detached element");
        node_id
    }

    /// Создаёт отсоединённый текстовый узел.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.tree.orphan(NodeData::Text(text.to_string())).id()
    }

    /// Вставляет `node_id` соседом `anchor` и проверяет, что он действительно
    /// оказался рядом.
    pub fn insert_sibling(
        &mut self,
        anchor: NodeId,
        node_id: NodeId,
        position: Position,
    ) -> Result<NodeId, DomError> {
        let anchor_node = self.node(anchor).ok_or(DomError::NodeNotFound(anchor))?;
        if anchor_node.parent().is_none() {
            return Err(DomError::Detached(anchor));
        }
        self.ensure_movable(node_id, anchor)?;

        let mut target = self
            .tree
            .get_mut(anchor)
            .ok_or(DomError::NodeNotFound(anchor))?;
        match position {
            Position::Before => {
                target.insert_id_before(node_id);
            }
            Position::After => {
                target.insert_id_after(node_id);
            }
        }

        let anchor_node = self.node(anchor).ok_or(DomError::NodeNotFound(anchor))?;
        let neighbour = match position {
            Position::Before => anchor_node.prev_sibling(),
            Position::After => anchor_node.next_sibling(),
        };

        match neighbour {
            Some(node) if node.id() == node_id => {
                tracing::trace!(?anchor, ?node_id, ?position, "inserted sibling");
                Ok(node_id)
            }
            _ => Err(DomError::InsertionLost {
                anchor,
                inserted: node_id,
            }),
        }
    }

    /// Добавляет `child_id` последним ребёнком `parent_id`.
    pub fn append_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<(), DomError> {
        self.ensure_container(parent_id)?;
        self.ensure_movable(child_id, parent_id)?;

        let mut parent = self
            .tree
            .get_mut(parent_id)
            .ok_or(DomError::NodeNotFound(parent_id))?;
        parent.append_id(child_id);
        Ok(())
    }

    /// Вставляет ребёнка перед узлом с индексом `index`; индекс за концом
    /// списка детей означает добавление в конец.
    pub fn insert_child(
        &mut self,
        parent_id: NodeId,
        child_id: NodeId,
        index: usize,
    ) -> Result<(), DomError> {
        self.ensure_container(parent_id)?;

        let anchor = self
            .node(parent_id)
            .and_then(|parent| parent.children().nth(index))
            .map(|node| node.id());

        match anchor {
            Some(anchor) if anchor == child_id => Ok(()),
            Some(anchor) => self
                .insert_sibling(anchor, child_id, Position::Before)
                .map(|_| ()),
            None => self.append_child(parent_id, child_id),
        }
    }

    /// Отсоединяет всех детей узла. Сами узлы остаются в арене.
    pub fn remove_children(&mut self, node_id: NodeId) -> Result<(), DomError> {
        let mut node = self
            .tree
            .get_mut(node_id)
            .ok_or(DomError::NodeNotFound(node_id))?;
        while let Some(mut child) = node.first_child() {
            child.detach();
        }
        Ok(())
    }

    /// Заменяет всё содержимое элемента одним текстовым узлом.
    pub fn set_text_content(&mut self, node_id: NodeId, text: &str) -> Result<(), DomError> {
        self.ensure_element(node_id)?;
        self.remove_children(node_id)?;

        if !text.is_empty() {
            let mut node = self
                .tree
                .get_mut(node_id)
                .ok_or(DomError::NodeNotFound(node_id))?;
            node.append(NodeData::Text(text.to_string()));
        }
        Ok(())
    }

    /// Даёт изменяемый доступ к данным элемента.
    pub fn with_element_mut<R>(
        &mut self,
        node_id: NodeId,
        update: impl FnOnce(&mut ElementData) -> R,
    ) -> Result<R, DomError> {
        let mut node = self
            .tree
            .get_mut(node_id)
            .ok_or(DomError::NodeNotFound(node_id))?;
        match node.value() {
            NodeData::Element(element) => Ok(update(element)),
            _ => Err(DomError::NotAnElement(node_id)),
        }
    }

    /// Устанавливает атрибут элемента
    pub fn set_attribute(
        &mut self,
        node_id: NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        self.with_element_mut(node_id, |element| {
            element.set_attribute(name, value.to_string())
        })
    }

    /// Получает значение атрибута
    pub fn get_attribute(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.data(node_id)?
            .as_element()?
            .attribute(name)
            .map(str::to_string)
    }

    fn ensure_element(&self, node_id: NodeId) -> Result<(), DomError> {
        match self.data(node_id) {
            Some(NodeData::Element(_)) => Ok(()),
            Some(_) => Err(DomError::NotAnElement(node_id)),
            None => Err(DomError::NodeNotFound(node_id)),
        }
    }

    fn ensure_container(&self, node_id: NodeId) -> Result<(), DomError> {
        match self.data(node_id) {
            Some(NodeData::Element(_) | NodeData::Document) => Ok(()),
            Some(_) => Err(DomError::NotAnElement(node_id)),
            None => Err(DomError::NodeNotFound(node_id)),
        }
    }

    /// Узел нельзя переносить внутрь самого себя или своего потомка.
    fn ensure_movable(&self, node_id: NodeId, target: NodeId) -> Result<(), DomError> {
        if self.node(node_id).is_none() {
            return Err(DomError::NodeNotFound(node_id));
        }
        let target_node = self.node(target).ok_or(DomError::NodeNotFound(target))?;
        if target == node_id || target_node.ancestors().any(|ancestor| ancestor.id() == node_id) {
            return Err(DomError::WouldCycle {
                node: node_id,
                target,
            });
        }
        Ok(())
    }
}

use super::document::Document;
use super::node::{Doctype, ElementData, NodeData};
use ego_tree::NodeId;
use scraper::{Html, Node as ScraperNode};

impl Document {
    /// Разбирает разметку как полный документ. Парсер сам достраивает
    /// `html`/`head`/`body`, поэтому рамку фрагмента решает вызывающая сторона.
    pub fn parse_html(html_str: &str) -> Self {
        let html = Html::parse_document(html_str);
        let document = Self::from_scraper(&html);

        tracing::debug!(
            nodes = document.node_count(),
            parse_errors = html.errors.len(),
            "parsed HTML into arena"
        );

        document
    }

    /// Переносит дерево scraper в собственную арену без рекурсии, чтобы
    /// глубоко вложенный ввод не исчерпал стек.
    fn from_scraper(html: &Html) -> Self {
        let mut document = Document::new();
        let root_id = document.root_id();

        let mut pending: Vec<(ego_tree::NodeRef<'_, ScraperNode>, NodeId)> = html
            .tree
            .root()
            .children()
            .rev()
            .map(|child| (child, root_id))
            .collect();

        while let Some((source, parent_id)) = pending.pop() {
            let Some(data) = convert_node(source.value()) else {
                continue;
            };

            let Some(mut parent) = document.tree.get_mut(parent_id) else {
                continue;
            };
            let node_id = parent.append(data).id();

            pending.extend(source.children().rev().map(|child| (child, node_id)));
        }

        document
    }
}

fn convert_node(node: &ScraperNode) -> Option<NodeData> {
    match node {
        ScraperNode::Doctype(doctype) => Some(NodeData::Doctype(Doctype {
            name: doctype.name().to_string(),
            public_id: doctype.public_id().to_string(),
            system_id: doctype.system_id().to_string(),
        })),
        ScraperNode::Comment(comment) => Some(NodeData::Comment(String::from(&**comment))),
        ScraperNode::Text(text) => Some(NodeData::Text(String::from(&**text))),
        ScraperNode::Element(element) => {
            let mut data = ElementData::new(element.name());
            for (name, value) in element.attrs() {
                data.attributes.push((name.to_string(), value.to_string()));
            }
            Some(NodeData::Element(data))
        }
        // Document/Fragment уже представлены корнем арены.
        _ => None,
    }
}

// Arena-backed application tree. Nodes refer to each other by index.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Loadable application bound to a catalog identifier
    Application { identifier: String },
    /// Named group of applications and subcategories
    Category { children: Vec<NodeId> },
}

#[derive(Debug, Clone)]
pub struct ApplicationNode {
    pub name: String,  // Directory name, used in paths
    pub label: String, // Menu text
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

impl ApplicationNode {
    pub fn is_category(&self) -> bool {
        matches!(self.kind, NodeKind::Category { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ApplicationTree {
    nodes: Vec<ApplicationNode>,
}

impl ApplicationTree {
    pub const ROOT: NodeId = NodeId(0);

    /// Tree with only an empty root category
    pub fn new() -> Self {
        Self {
            nodes: vec![ApplicationNode {
                name: String::new(),
                label: String::new(),
                parent: None,
                kind: NodeKind::Category {
                    children: Vec::new(),
                },
            }],
        }
    }

    pub fn add_category(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        let name = name.into();
        self.push(
            parent,
            ApplicationNode {
                label: name.clone(),
                name,
                parent: Some(parent),
                kind: NodeKind::Category {
                    children: Vec::new(),
                },
            },
        )
    }

    pub fn add_application(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        label: impl Into<String>,
        identifier: impl Into<String>,
    ) -> NodeId {
        self.push(
            parent,
            ApplicationNode {
                name: name.into(),
                label: label.into(),
                parent: Some(parent),
                kind: NodeKind::Application {
                    identifier: identifier.into(),
                },
            },
        )
    }

    /// Append a node under `parent`. An application parent leaves the node unreachable.
    fn push(&mut self, parent: NodeId, node: ApplicationNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        match &mut self.nodes[parent.0].kind {
            NodeKind::Category { children } => children.push(id),
            NodeKind::Application { .. } => {
                debug_assert!(false, "application nodes cannot have children")
            }
        }
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &ApplicationNode {
        &self.nodes[id.0]
    }

    /// Children of a category, empty for applications
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).kind {
            NodeKind::Category { children } => children,
            NodeKind::Application { .. } => &[],
        }
    }

    /// Find a node by its name path from the root
    pub fn lookup(&self, path: &[&str]) -> Option<NodeId> {
        path.iter().try_fold(Self::ROOT, |node, name| {
            self.children(node)
                .iter()
                .copied()
                .find(|child| self.node(*child).name == *name)
        })
    }

    /// Name path from the root to `id`
    pub fn path_of(&self, id: NodeId) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if node.parent.is_some() {
                path.push(node.name.as_str());
            }
            current = node.parent;
        }
        path.reverse();
        path
    }

    /// Sort every category's children by label for a stable menu
    pub fn sort(&mut self) {
        let labels: Vec<String> = self.nodes.iter().map(|n| n.label.to_lowercase()).collect();
        for node in &mut self.nodes {
            if let NodeKind::Category { children } = &mut node.kind {
                children.sort_by(|a, b| labels[a.0].cmp(&labels[b.0]));
            }
        }
    }

    pub fn application_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_category()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.children(Self::ROOT).is_empty()
    }
}

impl Default for ApplicationTree {
    fn default() -> Self {
        Self::new()
    }
}

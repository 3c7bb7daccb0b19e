//! Adds CFG edges to an AST-only shard graph.
//!
//! Each statement is visited with the node control reaches after it
//! (`next`). Loops and switches push a frame so `break` and `continue`
//! find their innermost target. Constructs without a rule are chained as
//! plain statements, and their sub-statements get no edges.

use skims_core::types::collections::FxHashSet;
use tracing::debug;

use crate::graph::kinds::NodeKind;
use crate::graph::model::{CfgEdgeKind, Graph, NodeId};
use crate::scanner::language_detect::Language;

/// Add every CFG edge for `graph`'s language. Returns the number of edges
/// added. Document languages (YAML/JSON) get none.
pub fn add_control_flow_edges(graph: &mut Graph) -> usize {
    let language = graph.language();
    if matches!(language, Language::Yaml | Language::Json) {
        return 0;
    }
    let before = graph.cfg_edge_count();
    let mut augmenter = Augmenter {
        graph,
        language,
        frames: Vec::new(),
        visited_methods: FxHashSet::default(),
    };
    let root = augmenter.graph.root();
    augmenter.visit_root(root);

    // Lambdas, nested functions and anonymous-class methods are not
    // statements of any block; give each its own entry.
    let methods: Vec<NodeId> = augmenter.graph.nodes_of_kind(NodeKind::Method).collect();
    for method in methods {
        if !augmenter.visited_methods.contains(&method) {
            augmenter.visit_method(method, None);
        }
    }

    let added = augmenter.graph.cfg_edge_count() - before;
    debug!(language = %language, cfg_edge_count = added, "control flow added");
    added
}

struct Frame {
    /// Loop header for `continue`; `None` for a switch.
    header: Option<NodeId>,
    /// Where `break` goes.
    exit: Option<NodeId>,
}

struct Augmenter<'g> {
    graph: &'g mut Graph,
    language: Language,
    frames: Vec<Frame>,
    visited_methods: FxHashSet<NodeId>,
}

impl Augmenter<'_> {
    fn edge(&mut self, from: NodeId, to: Option<NodeId>, kind: CfgEdgeKind) {
        if let Some(to) = to {
            if from != to {
                self.graph.add_cfg_edge(from, to, kind);
            }
        }
    }

    fn kind(&self, n_id: NodeId) -> NodeKind {
        self.graph.kind(n_id)
    }

    fn named_children(&self, n_id: NodeId) -> Vec<NodeId> {
        self.graph.named_children(n_id).collect()
    }

    /// First child under one of `fields`, else the first child of `kind`.
    fn body_of(&self, n_id: NodeId, fields: &[&str], kind: NodeKind) -> Option<NodeId> {
        fields
            .iter()
            .find_map(|f| self.graph.child_by_field(n_id, f))
            .or_else(|| self.graph.child_by_kind(n_id, kind))
    }

    fn visit_root(&mut self, root: NodeId) {
        if self.language.is_class_based() {
            self.visit_container(root);
        } else {
            self.visit_block(root, None);
        }
    }

    /// Star-shaped flow into declarations: class bodies and class-based roots.
    fn visit_container(&mut self, n_id: NodeId) {
        for member in self.named_children(n_id) {
            match self.kind(member) {
                NodeKind::Class | NodeKind::Method | NodeKind::Package => {
                    self.edge(n_id, Some(member), CfgEdgeKind::Always);
                    self.visit(member, None);
                }
                _ => {}
            }
        }
    }

    fn visit(&mut self, n_id: NodeId, next: Option<NodeId>) {
        match self.kind(n_id) {
            NodeKind::Root | NodeKind::Block => self.visit_block(n_id, next),
            NodeKind::ClassBody => self.visit_container(n_id),
            NodeKind::Class => {
                let body = self.body_of(n_id, &["body"], NodeKind::ClassBody);
                self.edge(n_id, body, CfgEdgeKind::Always);
                if let Some(body) = body {
                    if self.kind(body) == NodeKind::Block {
                        self.visit_block(body, None);
                    } else {
                        self.visit_container(body);
                    }
                }
                self.edge(n_id, next, CfgEdgeKind::Always);
            }
            NodeKind::Package => {
                // Namespaces with a body (C#) contain declarations.
                match self.graph.child_by_field(n_id, "body") {
                    Some(body) => {
                        self.edge(n_id, Some(body), CfgEdgeKind::Always);
                        self.visit_container(body);
                    }
                    None => self.edge(n_id, next, CfgEdgeKind::Always),
                }
            }
            NodeKind::Method => self.visit_method(n_id, next),
            NodeKind::If => self.visit_if(n_id, next, next),
            NodeKind::ElseClause => {
                let body = self.else_body(n_id);
                self.edge(n_id, body.or(next), CfgEdgeKind::Always);
                if let Some(body) = body {
                    self.visit(body, next);
                }
            }
            NodeKind::While | NodeKind::DoWhile | NodeKind::For | NodeKind::ForEach => {
                self.visit_loop(n_id, next)
            }
            NodeKind::Switch => self.visit_switch(n_id, next),
            NodeKind::Try => self.visit_try(n_id, next),
            NodeKind::Break => {
                let exit = self.frames.last().and_then(|f| f.exit);
                self.edge(n_id, exit, CfgEdgeKind::Break);
            }
            NodeKind::Continue => {
                let header = self.frames.iter().rev().find_map(|f| f.header);
                self.edge(n_id, header, CfgEdgeKind::Continue);
            }
            NodeKind::Return | NodeKind::Throw => {}
            NodeKind::Labeled | NodeKind::Compound => {
                let inner = ["body", "declaration", "definition"]
                    .iter()
                    .find_map(|f| self.graph.child_by_field(n_id, f))
                    .or_else(|| {
                        self.named_children(n_id)
                            .into_iter()
                            .rev()
                            .find(|c| self.kind(*c).is_statement())
                    });
                match inner {
                    Some(inner) => {
                        self.edge(n_id, Some(inner), CfgEdgeKind::Always);
                        self.visit(inner, next);
                    }
                    None => self.edge(n_id, next, CfgEdgeKind::Always),
                }
            }
            _ => self.edge(n_id, next, CfgEdgeKind::Always),
        }
    }

    fn visit_block(&mut self, n_id: NodeId, next: Option<NodeId>) {
        let statements = self.named_children(n_id);
        let Some(first) = statements.first().copied() else {
            self.edge(n_id, next, CfgEdgeKind::Always);
            return;
        };
        self.edge(n_id, Some(first), CfgEdgeKind::Always);
        for (i, statement) in statements.iter().enumerate() {
            let after = statements.get(i + 1).copied().or(next);
            self.visit(*statement, after);
        }
    }

    fn visit_method(&mut self, n_id: NodeId, next: Option<NodeId>) {
        if !self.visited_methods.insert(n_id) {
            return;
        }
        let body = self.body_of(n_id, &["body"], NodeKind::Block);
        self.edge(n_id, body, CfgEdgeKind::Always);
        if let Some(body) = body {
            let outer = std::mem::take(&mut self.frames);
            self.visit(body, None);
            self.frames = outer;
        }
        self.edge(n_id, next, CfgEdgeKind::Always);
    }

    fn consequence(&self, n_id: NodeId) -> Option<NodeId> {
        self.graph
            .child_by_field(n_id, "consequence")
            .or_else(|| self.graph.child_by_field(n_id, "body"))
            .or_else(|| {
                self.named_children(n_id)
                    .into_iter()
                    .find(|c| self.kind(*c) == NodeKind::Block)
            })
    }

    fn alternatives(&self, n_id: NodeId) -> Vec<NodeId> {
        let by_field: Vec<NodeId> = self.graph.children_by_field(n_id, "alternative").collect();
        if !by_field.is_empty() {
            return by_field;
        }
        let else_clauses: Vec<NodeId> = self
            .named_children(n_id)
            .into_iter()
            .filter(|c| self.kind(*c) == NodeKind::ElseClause)
            .collect();
        if !else_clauses.is_empty() || self.graph.child_by_field(n_id, "consequence").is_some() {
            return else_clauses;
        }
        // Grammars without fields: a second block is the else branch.
        self.named_children(n_id)
            .into_iter()
            .filter(|c| self.kind(*c) == NodeKind::Block)
            .skip(1)
            .take(1)
            .collect()
    }

    fn else_body(&self, n_id: NodeId) -> Option<NodeId> {
        self.graph.child_by_field(n_id, "body").or_else(|| {
            self.named_children(n_id)
                .into_iter()
                .find(|c| self.kind(*c).is_statement())
        })
    }

    /// `false_default` is where FALSE goes when this branch node has no
    /// alternative of its own (an `elif` falls to the following clause).
    fn visit_if(&mut self, n_id: NodeId, next: Option<NodeId>, false_default: Option<NodeId>) {
        if let Some(consequence) = self.consequence(n_id) {
            self.edge(n_id, Some(consequence), CfgEdgeKind::True);
            self.visit(consequence, next);
        }

        let alternatives = self.alternatives(n_id);
        let mut follow = false_default;
        for alternative in alternatives.iter().rev() {
            match self.kind(*alternative) {
                NodeKind::If => {
                    self.visit_if(*alternative, next, follow);
                    follow = Some(*alternative);
                }
                NodeKind::ElseClause => {
                    let body = self.else_body(*alternative);
                    if let Some(body) = body {
                        self.visit(body, next);
                    }
                    follow = body.or(next);
                }
                _ => {
                    self.visit(*alternative, next);
                    follow = Some(*alternative);
                }
            }
        }
        self.edge(n_id, follow, CfgEdgeKind::False);
    }

    fn visit_loop(&mut self, n_id: NodeId, next: Option<NodeId>) {
        let body = self.graph.child_by_field(n_id, "body").or_else(|| {
            self.named_children(n_id)
                .into_iter()
                .rev()
                .find(|c| self.kind(*c) == NodeKind::Block)
        });
        self.frames.push(Frame {
            header: Some(n_id),
            exit: next,
        });
        if let Some(body) = body {
            self.edge(n_id, Some(body), CfgEdgeKind::True);
            self.visit(body, Some(n_id));
        }
        self.frames.pop();
        self.edge(n_id, next, CfgEdgeKind::False);
    }

    fn switch_cases(&self, n_id: NodeId) -> Vec<NodeId> {
        let body = self
            .graph
            .child_by_field(n_id, "body")
            .filter(|b| self.kind(*b) == NodeKind::SwitchBody)
            .or_else(|| self.graph.child_by_kind(n_id, NodeKind::SwitchBody))
            .unwrap_or(n_id);
        self.named_children(body)
            .into_iter()
            .filter(|c| self.kind(*c) == NodeKind::SwitchCase)
            .collect()
    }

    fn case_statements(&self, case: NodeId) -> Vec<NodeId> {
        self.named_children(case)
            .into_iter()
            .filter(|c| self.graph.field(*c) != Some("value") && self.kind(*c).is_statement())
            .collect()
    }

    fn visit_switch(&mut self, n_id: NodeId, next: Option<NodeId>) {
        let cases = self.switch_cases(n_id);
        let falls_through = self.language.switch_falls_through();
        self.frames.push(Frame { header: None, exit: next });

        for (i, case) in cases.iter().enumerate() {
            self.edge(n_id, Some(*case), CfgEdgeKind::Maybe);
            let arrow_rule = self.graph.label_type(*case) == "switch_rule";
            let after = if falls_through && !arrow_rule {
                cases.get(i + 1).copied().or(next)
            } else {
                next
            };
            let statements = self.case_statements(*case);
            match statements.first() {
                None => self.edge(*case, after, CfgEdgeKind::Always),
                Some(first) => {
                    self.edge(*case, Some(*first), CfgEdgeKind::Always);
                    for (j, statement) in statements.iter().enumerate() {
                        let following = statements.get(j + 1).copied().or(after);
                        self.visit(*statement, following);
                    }
                }
            }
        }
        self.frames.pop();

        if !cases.iter().any(|c| is_default_case(self.graph, *c)) {
            self.edge(n_id, next, CfgEdgeKind::Maybe);
        }
    }

    fn visit_try(&mut self, n_id: NodeId, next: Option<NodeId>) {
        let body = self.body_of(n_id, &["body"], NodeKind::Block);
        let children = self.named_children(n_id);
        let catches: Vec<NodeId> = children
            .iter()
            .copied()
            .filter(|c| self.kind(*c) == NodeKind::Catch)
            .collect();
        let finally = children
            .iter()
            .copied()
            .find(|c| self.kind(*c) == NodeKind::Finally);
        let after = finally.or(next);

        self.edge(n_id, body, CfgEdgeKind::Always);
        if let Some(body) = body {
            self.visit(body, after);
        }
        for catch in catches {
            self.edge(n_id, Some(catch), CfgEdgeKind::Maybe);
            let catch_body = self.graph.child_by_field(catch, "body").or_else(|| {
                self.named_children(catch)
                    .into_iter()
                    .rev()
                    .find(|c| self.kind(*c) == NodeKind::Block)
            });
            self.edge(catch, catch_body.or(after), CfgEdgeKind::Always);
            if let Some(catch_body) = catch_body {
                self.visit(catch_body, after);
            }
        }
        if let Some(finally) = finally {
            let finally_body = self.body_of(finally, &["body"], NodeKind::Block);
            self.edge(finally, finally_body.or(next), CfgEdgeKind::Always);
            if let Some(finally_body) = finally_body {
                self.visit(finally_body, next);
            }
        }
    }
}

/// Label types that mark the default branch of a switch in some grammar.
pub const DEFAULT_LABELS: [&str; 4] = ["default", "switch_default", "default_case", "default_switch_label"];

/// Whether a switch case is the default branch. Kotlin spells it `else`.
pub fn is_default_case(graph: &Graph, case: NodeId) -> bool {
    let is_default_label = |n: NodeId| {
        let label = graph.label_type(n);
        DEFAULT_LABELS.contains(&label) || (graph.language() == Language::Kotlin && label == "else")
    };
    is_default_label(case) || graph.adj_ast(case, 2).into_iter().any(is_default_label)
}

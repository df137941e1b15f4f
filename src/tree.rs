//! The thought tree: an append-only record of everything the search explored
//!
//! Nodes live in a flat table indexed by their id; parent and child links
//! are ids rather than references. Each node represents a state *after* a
//! move, with the move (and its justification) stored on the node it
//! produced. Nodes are never removed or reordered, so ids and child order
//! mirror the search exactly.

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};

use crate::board::{Board, Mark, Outcome, Position};
use crate::scoring::{LOSS_SCORE, WIN_SCORE};
use crate::{Result, SearchError};

/// Identifier of a node within one [`ThoughtTree`]
pub type NodeId = usize;

/// Who produced a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeMover {
    /// The seed node of a search
    Root,
    Player(Mark),
}

impl fmt::Display for NodeMover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeMover::Root => write!(f, "ROOT"),
            NodeMover::Player(mark) => write!(f, "{}", mark),
        }
    }
}

/// One explored state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThoughtNode {
    pub id: NodeId,
    pub mover: NodeMover,
    /// Move that led here; `None` for the root
    pub position: Option<Position>,
    pub justification: Option<String>,
    /// Heuristic score of this state from the search perspective
    pub score: i32,
    pub depth: usize,
    pub terminal: bool,
    pub outcome: Option<Outcome>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    #[serde(skip)]
    pub board: Board,
}

impl ThoughtNode {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Short move label such as `O→(1,1)` or `root`
    pub fn move_label(&self) -> String {
        match (self.mover, self.position) {
            (NodeMover::Player(mark), Some(pos)) => format!("{}→{}", mark, pos),
            _ => "root".to_string(),
        }
    }
}

/// Move data for a new child node
#[derive(Debug, Clone)]
pub struct ChildSpec {
    pub mover: Mark,
    pub position: Position,
    pub justification: String,
    pub score: i32,
    pub board: Board,
}

/// Append-only search tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThoughtTree {
    nodes: Vec<ThoughtNode>,
}

impl ThoughtTree {
    pub fn new() -> Self {
        ThoughtTree::default()
    }

    /// Seeds the tree with its root.
    ///
    /// Terminal status and outcome are derived from `board`. Fails if the
    /// tree already has a root.
    pub fn add_root(&mut self, board: Board, score: i32) -> Result<NodeId> {
        if !self.nodes.is_empty() {
            return Err(SearchError::InvalidTree("tree already has a root".to_string()));
        }
        let outcome = board.outcome();
        self.nodes.push(ThoughtNode {
            id: 0,
            mover: NodeMover::Root,
            position: None,
            justification: None,
            score,
            depth: 0,
            terminal: outcome.is_some(),
            outcome,
            parent: None,
            children: Vec::new(),
            board,
        });
        Ok(0)
    }

    /// Appends a child under `parent` and returns its id.
    ///
    /// Terminal status and outcome are derived from the child's board.
    pub fn add_child(&mut self, parent: NodeId, spec: ChildSpec) -> Result<NodeId> {
        let id = self.nodes.len();
        let parent_depth = self
            .nodes
            .get(parent)
            .map(|n| n.depth)
            .ok_or_else(|| SearchError::InvalidTree(format!("no node #{}", parent)))?;
        let outcome = spec.board.outcome();
        self.nodes.push(ThoughtNode {
            id,
            mover: NodeMover::Player(spec.mover),
            position: Some(spec.position),
            justification: Some(spec.justification),
            score: spec.score,
            depth: parent_depth + 1,
            terminal: outcome.is_some(),
            outcome,
            parent: Some(parent),
            children: Vec::new(),
            board: spec.board,
        });
        self.nodes[parent].children.push(id);
        Ok(id)
    }

    /// Records that `id` is a finished position
    pub fn mark_terminal(&mut self, id: NodeId, outcome: Outcome) -> Result<()> {
        let node = self.node_mut(id)?;
        node.terminal = true;
        node.outcome = Some(outcome);
        Ok(())
    }

    pub fn get(&self, id: NodeId) -> Option<&ThoughtNode> {
        self.nodes.get(id)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut ThoughtNode> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| SearchError::InvalidTree(format!("no node #{}", id)))
    }

    pub fn root(&self) -> Option<&ThoughtNode> {
        self.nodes.first()
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.root().map(|n| n.id)
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &ThoughtNode> + '_ {
        self.nodes
            .get(id)
            .into_iter()
            .flat_map(move |n| n.children.iter().filter_map(move |&c| self.nodes.get(c)))
    }

    /// All nodes in id order
    pub fn nodes(&self) -> &[ThoughtNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Indented box-drawing rendering of the whole tree
    pub fn render_text(&self) -> String {
        let Some(root) = self.root() else {
            return "<empty tree>".to_string();
        };
        let mut out = String::new();
        let _ = writeln!(out, "{}", Self::text_line(root));
        self.render_children(root, "", &mut out);
        out.truncate(out.trim_end().len());
        out
    }

    fn render_children(&self, node: &ThoughtNode, prefix: &str, out: &mut String) {
        let count = node.children.len();
        for (i, child) in self.children(node.id).enumerate() {
            let last = i + 1 == count;
            let branch = if last { "└─ " } else { "├─ " };
            let _ = writeln!(out, "{}{}{}", prefix, branch, Self::text_line(child));
            let next_prefix = format!("{}{}", prefix, if last { "   " } else { "│  " });
            self.render_children(child, &next_prefix, out);
        }
    }

    fn text_line(node: &ThoughtNode) -> String {
        let mut line = format!("• (#{}) {} | score={}", node.id, node.move_label(), node.score);
        if node.terminal {
            if let Some(outcome) = node.outcome {
                let _ = write!(line, "  [terminal:{}]", outcome);
            }
        }
        if let Some(reason) = node.justification.as_deref().filter(|r| !r.is_empty()) {
            let _ = write!(line, " — {}", reason);
        }
        line
    }

    /// Graphviz DOT rendering: one box per node, one edge per child link
    pub fn to_dot(&self) -> String {
        if self.nodes.is_empty() {
            return "digraph G {}".to_string();
        }
        let mut out = String::from("digraph G {\n  node [shape=box, fontname=\"Helvetica\"];\n");
        for n in &self.nodes {
            let mut label = format!("#{} {}\\nscore={}", n.id, n.move_label(), n.score);
            if n.terminal {
                if let Some(outcome) = n.outcome {
                    let _ = write!(label, "\\nterminal={}", outcome);
                }
            }
            if let Some(reason) = n.justification.as_deref().filter(|r| !r.is_empty()) {
                let _ = write!(label, "\\nreason={}", escape_dot(reason));
            }
            let _ = writeln!(out, "  n{} [label=\"{}\"];", n.id, label);
        }
        for n in &self.nodes {
            for c in &n.children {
                let _ = writeln!(out, "  n{} -> n{};", n.id, c);
            }
        }
        out.push('}');
        out
    }

    /// Nested view used by the web front end
    pub fn to_view(&self) -> Option<TreeView> {
        self.root().map(|root| self.view_of(root))
    }

    fn view_of(&self, node: &ThoughtNode) -> TreeView {
        let mut thought = node.move_label();
        if node.terminal {
            if let Some(outcome) = node.outcome {
                let _ = write!(thought, " [terminal: {}]", outcome);
            }
        }
        let children: Vec<TreeView> = self.children(node.id).map(|c| self.view_of(c)).collect();
        TreeView {
            id: node.id.to_string(),
            thought,
            reason: node.justification.clone().unwrap_or_default(),
            score: normalize_score(node.score),
            children: if children.is_empty() { None } else { Some(children) },
        }
    }

    /// Flat node table as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Maps a score onto `[0, 1]`, with -100 → 0 and +100 → 1
pub fn normalize_score(score: i32) -> f64 {
    let span = f64::from(WIN_SCORE - LOSS_SCORE);
    (f64::from(score - LOSS_SCORE) / span).clamp(0.0, 1.0)
}

/// Nested tree node as consumed by the web UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeView {
    pub id: String,
    pub thought: String,
    pub reason: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeView>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(mover: Mark, row: usize, col: usize, board: Board, score: i32) -> ChildSpec {
        ChildSpec {
            mover,
            position: Position::new(row, col),
            justification: format!("try {},{}", row, col),
            score,
            board,
        }
    }

    fn small_tree() -> ThoughtTree {
        let mut tree = ThoughtTree::new();
        let b = Board::new();
        let root = tree.add_root(b, 0).unwrap();
        let a = tree
            .add_child(root, spec(Mark::O, 1, 1, b.apply(1, 1, Mark::O).unwrap(), 3))
            .unwrap();
        tree.add_child(root, spec(Mark::O, 0, 0, b.apply(0, 0, Mark::O).unwrap(), 2))
            .unwrap();
        let after = b.apply(1, 1, Mark::O).unwrap();
        tree.add_child(a, spec(Mark::X, 0, 0, after.apply(0, 0, Mark::X).unwrap(), 1))
            .unwrap();
        tree
    }

    #[test]
    fn ids_are_sequential_and_links_consistent() {
        let tree = small_tree();
        assert_eq!(tree.len(), 4);
        for (i, n) in tree.nodes().iter().enumerate() {
            assert_eq!(n.id, i);
            if let Some(p) = n.parent {
                assert_eq!(n.depth, tree.get(p).unwrap().depth + 1);
                assert!(tree.get(p).unwrap().children.contains(&n.id));
            } else {
                assert_eq!(n.id, 0);
                assert_eq!(n.mover, NodeMover::Root);
            }
        }
        assert_eq!(tree.get(0).unwrap().children, vec![1, 2]);
        assert_eq!(tree.get(1).unwrap().children, vec![3]);
    }

    #[test]
    fn second_root_is_rejected() {
        let mut tree = small_tree();
        assert!(matches!(
            tree.add_root(Board::new(), 0),
            Err(SearchError::InvalidTree(_))
        ));
    }

    #[test]
    fn finished_root_is_terminal_from_the_start() {
        let mut tree = ThoughtTree::new();
        let drawn: Board = "XOX XOO OXX".parse().unwrap();
        let root = tree.add_root(drawn, 0).unwrap();
        let node = tree.get(root).unwrap();
        assert!(node.terminal);
        assert_eq!(node.outcome, Some(Outcome::Draw));

        let mut tree = ThoughtTree::new();
        let root = tree.add_root(Board::new(), 0).unwrap();
        assert!(!tree.get(root).unwrap().terminal);
        assert_eq!(tree.get(root).unwrap().outcome, None);
    }

    #[test]
    fn child_under_missing_parent_is_rejected() {
        let mut tree = ThoughtTree::new();
        let r = tree.add_child(7, spec(Mark::O, 0, 0, Board::new(), 0));
        assert!(r.is_err());
        assert!(tree.is_empty());
    }

    #[test]
    fn winning_child_is_terminal() {
        let mut tree = ThoughtTree::new();
        let b: Board = "OO. XX. ...".parse().unwrap();
        let root = tree.add_root(b, 0).unwrap();
        let won = b.apply(0, 2, Mark::O).unwrap();
        let id = tree.add_child(root, spec(Mark::O, 0, 2, won, 100)).unwrap();
        let node = tree.get(id).unwrap();
        assert!(node.terminal);
        assert_eq!(node.outcome, Some(Outcome::Win(Mark::O)));
    }

    #[test]
    fn text_rendering_shows_every_node() {
        let text = small_tree().render_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "• (#0) root | score=0");
        assert_eq!(lines[1], "├─ • (#1) O→(1,1) | score=3 — try 1,1");
        assert_eq!(lines[2], "│  └─ • (#3) X→(0,0) | score=1 — try 0,0");
        assert_eq!(lines[3], "└─ • (#2) O→(0,0) | score=2 — try 0,0");
    }

    #[test]
    fn dot_rendering_has_nodes_and_edges() {
        let dot = small_tree().to_dot();
        assert!(dot.starts_with("digraph G {"));
        assert!(dot.ends_with('}'));
        for id in 0..4 {
            assert!(dot.contains(&format!("  n{} [label=\"#{}", id, id)));
        }
        assert!(dot.contains("n0 -> n1;"));
        assert!(dot.contains("n0 -> n2;"));
        assert!(dot.contains("n1 -> n3;"));
        assert_eq!(ThoughtTree::new().to_dot(), "digraph G {}");
    }

    #[test]
    fn dot_escapes_quotes() {
        let mut tree = ThoughtTree::new();
        let root = tree.add_root(Board::new(), 0).unwrap();
        let mut s = spec(Mark::O, 1, 1, Board::new().apply(1, 1, Mark::O).unwrap(), 3);
        s.justification = "take the \"center\"".to_string();
        tree.add_child(root, s).unwrap();
        assert!(tree.to_dot().contains("take the \\\"center\\\""));
    }

    #[test]
    fn view_normalizes_scores_and_nests_children() {
        let view = small_tree().to_view().unwrap();
        assert_eq!(view.thought, "root");
        assert_eq!(view.score, 0.5);
        let children = view.children.unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].id, "1");
        assert!(children[1].children.is_none());
        assert_eq!(normalize_score(100), 1.0);
        assert_eq!(normalize_score(-250), 0.0);
    }

    #[test]
    fn json_contains_flat_table() {
        let json = small_tree().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["nodes"].as_array().unwrap().len(), 4);
        assert_eq!(value["nodes"][1]["mover"]["Player"], "O");
    }
}

//! The tree shared by the RPAL abstract syntax tree and the standardized
//! tree: a tagged record with a label, an optional leaf value, and an
//! ordered sequence of children.

use std::fmt;

/// A node in an AST or ST.
///
/// Leaf nodes carry `value = Some(...)` and no children (`identifier`,
/// `integer`, `string`, and the nullary leaves `true`, `false`, `nil`,
/// `dummy`, `()`). Internal nodes carry `value = None` and one or more
/// children. The `InternalNode`/`LeafNode` class split some compilers use is
/// cosmetic — a single tagged struct suffices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    pub label: String,
    pub value: Option<String>,
    pub children: Vec<Tree>,
}

impl Tree {
    /// Build a leaf node (`identifier`, `integer`, `string`, or a bare
    /// keyword leaf like `true`/`nil`/`dummy`).
    pub fn leaf(label: impl Into<String>, value: impl Into<String>) -> Self {
        Tree {
            label: label.into(),
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    /// Build a leaf node carrying no value at all, e.g. `()`.
    pub fn bare_leaf(label: impl Into<String>) -> Self {
        Tree {
            label: label.into(),
            value: None,
            children: Vec::new(),
        }
    }

    /// Build an internal node from an ordered list of children.
    ///
    /// Child order must match left-to-right source order; both the parser
    /// and the standardizer rely on literal child sequences.
    pub fn internal(label: impl Into<String>, children: Vec<Tree>) -> Self {
        Tree {
            label: label.into(),
            value: None,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Value of a leaf node, or `None` for internal nodes / valueless leaves.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    // ─── DOT output (supplementary — CLI `-visualize` flag only) ─────────

    pub fn to_dot(&self) -> String {
        let mut buf = String::new();
        buf.push_str("digraph {\n");
        let mut next_id = 0u32;
        self.dot_nodes(&mut buf, &mut next_id);
        let mut next_id = 0u32;
        self.dot_edges(&mut buf, &mut next_id);
        buf.push_str("}\n");
        buf
    }

    fn dot_escape(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    }

    fn dot_nodes(&self, buf: &mut String, next_id: &mut u32) -> u32 {
        let id = *next_id;
        *next_id += 1;
        match &self.value {
            Some(v) => buf.push_str(&format!(
                "N{id} [shape=box label=\"{}: {}\"];\n",
                self.label,
                Self::dot_escape(v)
            )),
            None => buf.push_str(&format!("N{id} [shape=box label=\"{}\"];\n", self.label)),
        }
        for child in &self.children {
            child.dot_nodes(buf, next_id);
        }
        id
    }

    fn dot_edges(&self, buf: &mut String, next_id: &mut u32) -> u32 {
        let id = *next_id;
        *next_id += 1;
        let mut child_ids = Vec::with_capacity(self.children.len());
        for child in &self.children {
            child_ids.push(child.dot_edges(buf, next_id));
        }
        for child_id in child_ids {
            buf.push_str(&format!("N{id} -> N{child_id};\n"));
        }
        id
    }

    pub fn to_text(&self, indent: usize) -> String {
        let mut buf = String::new();
        let pad = "  ".repeat(indent);
        match &self.value {
            Some(v) => buf.push_str(&format!("{pad}<{}> {}\n", self.label, v)),
            None => buf.push_str(&format!("{pad}{} ({} kids)\n", self.label, self.children.len())),
        }
        for child in &self.children {
            buf.push_str(&child.to_text(indent + 1));
        }
        buf
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_has_no_children() {
        let leaf = Tree::leaf("integer", "42");
        assert!(leaf.is_leaf());
        assert_eq!(leaf.value(), Some("42"));
        assert!(leaf.children.is_empty());
    }

    #[test]
    fn internal_node_preserves_child_order() {
        let a = Tree::leaf("identifier", "x");
        let b = Tree::leaf("identifier", "y");
        let c = Tree::leaf("identifier", "z");
        let node = Tree::internal("tau", vec![a, b, c]);
        assert!(!node.is_leaf());
        let names: Vec<_> = node
            .children
            .iter()
            .map(|c| c.value().unwrap())
            .collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[test]
    fn bare_leaf_has_no_value() {
        let unit = Tree::bare_leaf("()");
        assert!(unit.value().is_none());
        assert!(unit.is_leaf());
    }

    #[test]
    fn to_dot_contains_edges() {
        let name = Tree::leaf("identifier", "x");
        let body = Tree::leaf("integer", "1");
        let lam = Tree::internal("lambda", vec![name, body]);
        let dot = lam.to_dot();
        assert!(dot.contains("digraph {"));
        assert!(dot.contains("lambda"));
        assert!(dot.contains("N0 -> N1"));
        assert!(dot.contains("N0 -> N2"));
    }

    #[test]
    fn to_text_indents_children() {
        let x = Tree::leaf("identifier", "x");
        let one = Tree::leaf("integer", "1");
        let plus = Tree::internal("+", vec![x, one]);
        let text = plus.to_text(0);
        assert!(text.contains("+ (2 kids)"));
        assert!(text.contains("  <identifier> x"));
        assert!(text.contains("  <integer> 1"));
    }
}

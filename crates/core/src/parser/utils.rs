use tree_sitter::Node;

/// Source text covered by `node`. Tree-sitter ranges always fall on UTF-8
/// boundaries of the parsed text, so slicing cannot fail for our own input.
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

/// 1-based `line X, column Y` label for diagnostics
pub fn position_label(node: &Node) -> String {
    let point = node.start_position();
    format!("line {}, column {}", point.row + 1, point.column + 1)
}

/// Collect every node whose kind is in `kinds`, in source order.
///
/// Matched nodes are not descended into.
pub fn collect_nodes<'tree>(root: Node<'tree>, kinds: &[&str]) -> Vec<Node<'tree>> {
    let mut found = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if kinds.contains(&node.kind()) {
            found.push(node);
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        // Reverse so that popping yields source order
        stack.extend(children.into_iter().rev());
    }

    found
}

/// First error or missing node in pre-order
pub fn find_first_error(root: Node) -> Option<Node> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

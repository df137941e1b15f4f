use thought_tree::{run_search, Board, Mark, NoProposals, SearchConfig};

#[test]
fn test_tree_visualization() {
    let config = SearchConfig::default().with_beam_width(1).with_max_depth(2);
    let outcome = run_search(&Board::new(), Mark::O, NoProposals, &config).unwrap();
    let text = &outcome.rendered_tree;

    assert!(text.starts_with("• (#0) root | score=0"));
    // Root's nine children plus the beam child's eight, pruned ones included
    assert_eq!(text.lines().count(), 1 + 9 + 8);
    assert!(text.contains("├─ • (#1) O→(0,0)"));
    assert!(text.contains("└─ • (#9) O→(2,2)"));
    assert!(text.contains("— fallback: legal move"));
    // Second level is indented under the first
    assert!(text.contains("│  ├─ • (#10) X→"));
}

#[test]
fn test_terminal_nodes_are_labelled() {
    let board: Board = "OO. XX. ...".parse().unwrap();
    let config = SearchConfig::default().with_beam_width(1).with_max_depth(1);
    let outcome = run_search(&board, Mark::O, NoProposals, &config).unwrap();
    assert!(outcome
        .rendered_tree
        .contains("O→(0,2) | score=100  [terminal:O]"));
    assert!(outcome.dot().contains("\\nterminal=O"));
}

#[test]
fn test_dot_lists_every_node_and_edge() {
    let config = SearchConfig::default().with_beam_width(2).with_max_depth(2);
    let outcome = run_search(&Board::new(), Mark::X, NoProposals, &config).unwrap();
    let dot = outcome.dot();
    let node_lines = dot.lines().filter(|l| l.contains("[label=")).count();
    let edge_lines = dot.lines().filter(|l| l.contains(" -> ")).count();
    assert_eq!(node_lines, outcome.tree.len());
    assert_eq!(edge_lines, outcome.tree.len() - 1);
}

#[test]
fn test_view_serializes_for_the_front_end() {
    let config = SearchConfig::default().with_beam_width(1).with_max_depth(1);
    let outcome = run_search(&Board::new(), Mark::O, NoProposals, &config).unwrap();
    let view = outcome.tree.to_view().unwrap();
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["thought"], "root");
    assert_eq!(json["children"].as_array().unwrap().len(), 9);
    assert_eq!(json["children"][4]["thought"], "O→(1,1)");
    // Leaves carry no children key
    assert!(json["children"][0].get("children").is_none());
}

use cladeshift::model::{BranchLength, PhyloTree};
use cladeshift::newick::{NewickParser, NoOverrides, parse_str, write_tree};
use cladeshift::parser::ParsingErrorType;
use cladeshift::parser::byte_parser::ByteParser;
use cladeshift::write_newick;
use proptest::prelude::*;

fn find(tree: &PhyloTree, name: &str) -> usize {
    tree.pre_order_iter()
        .find(|v| v.name() == Some(name))
        .unwrap_or_else(|| panic!("no vertex named {name}"))
        .index()
}

// --- TESTS NEWICK STRING PARSING ---
#[test]
fn test_basic_tree() {
    let newick = "((A:1.0,B:2.0):3.0,C:4.0):0.5;";
    let mut parser = ByteParser::for_str(newick);
    let tree = NewickParser::new_defaults()
        .with_num_vertices(5)
        .parse_str(&mut parser)
        .unwrap();

    // Test counts
    assert_eq!(tree.num_leaves(), 3);
    assert_eq!(tree.num_internal(), 2);
    assert_eq!(tree.num_vertices(), 5);

    // Test relationships
    // - Root has children (internal, C)
    let root = tree.root();
    let root_index = root.index();
    let (root_left, root_right) = (root.children()[0], root.children()[1]);
    assert_eq!(root.branch_length(), Some(BranchLength::new(0.5)));

    // - Internal vertex has children (A, B)
    let internal = tree.vertex(root_left);
    assert!(internal.is_internal());
    assert_eq!(internal.name(), None);

    // - Parent relationships
    let leaf_a = tree.vertex(find(&tree, "A"));
    assert!(leaf_a.is_leaf());
    assert_eq!(leaf_a.parent(), Some(root_left));
    assert_eq!(internal.parent(), Some(root_index));
    assert_eq!(tree.vertex(root_right).name(), Some("C"));
}

#[test]
fn test_multifurcation_and_internal_names() {
    let tree = parse_str("(A:1,(B:2,C:3,E:1)D:4,F:2)root;").unwrap();

    assert_eq!(tree.num_leaves(), 5);
    assert_eq!(tree.root().children().len(), 3);
    assert_eq!(tree.root().name(), Some("root"));

    let d = find(&tree, "D");
    assert_eq!(tree[d].children().len(), 3);
    assert_eq!(tree[d].branch_length(), Some(BranchLength::new(4.0)));
    assert_eq!(tree.sibling_index(d), Some(1));
}

#[test]
fn test_single_child_and_empty_names() {
    let tree = parse_str("((A)X,(,));").unwrap();
    assert_eq!(tree[find(&tree, "X")].children().len(), 1);
    assert_eq!(tree.num_leaves(), 3);
    assert_eq!(tree.pre_order_iter().filter(|v| v.name().is_none()).count(), 4);
}

#[test]
fn test_tree_with_quoted_labels() {
    let newick = "(('Taxon one':1.5,'Second''s taxon':2.5):3.0,'3rd Taxon':4.0):0.0;";
    let tree = parse_str(newick).unwrap();

    assert_eq!(tree.num_leaves(), 3);
    let labels: Vec<&str> = tree.pre_order_iter().filter_map(|v| v.name()).collect();
    assert_eq!(labels, vec!["Taxon one", "Second's taxon", "3rd Taxon"]);
}

#[test]
fn test_tree_with_scientific_notation() {
    let newick = "((A:1e-5,B:2.5E+3):1.0e2,C:3.14E-10):0.0;";
    let tree = parse_str(newick).unwrap();

    assert_eq!(tree.num_leaves(), 3);
    assert_eq!(tree.num_internal(), 2);
    assert_eq!(*tree[find(&tree, "B")].branch_length().unwrap(), 2500.0);
}

#[test]
fn test_optional_branch_length() {
    let tree = parse_str("((A:1.0,B),C:4.0);").unwrap();
    assert!(tree.vertex(find(&tree, "A")).has_branch_length());
    assert!(!tree.vertex(find(&tree, "B")).has_branch_length());
    assert!(!tree.leaves_have_branch_lengths());
}

#[test]
fn test_newick_with_comment_1() {
    let newick_with_comment = "[A tree of] (([Shags!]A[Great Commentoran]:0.33,B[Pied Commentoran]:0.33):1.87,C:[King Commentoran]2.2):0.0;";
    let tree = parse_str(newick_with_comment);

    if tree.is_err() {
        eprintln!(
            "Error parsing tree with comments: {:?}",
            tree.as_ref().err()
        );
    }

    assert!(tree.is_ok());
}

#[test]
fn test_newick_with_comment_2() {
    let newick_with_comment = "[A tree of] ([Shags!] C:[King Commentoran] 2.2, (A[Great Commentoran]:0.33, B[Pied Commentoran]:0.33):1.87):0.0[The end.];";
    let tree = parse_str(newick_with_comment).unwrap();
    assert_eq!(write_newick(&tree), "(C:2.2,(A:0.33,B:0.33):1.87):0;");
}

#[test]
fn test_whitespace_and_trailing_newline() {
    let tree = parse_str("  ( A : 1 ,\n\tB : 2 ) root ;\n").unwrap();
    assert_eq!(write_newick(&tree), "(A:1,B:2)root;");
}

#[test]
fn test_deeply_nested_tree() {
    let depth = 200_000;
    let newick = format!("{}A:1{};", "(".repeat(depth), "):1".repeat(depth));
    let tree = parse_str(&newick).unwrap();
    assert_eq!(tree.num_vertices(), depth + 1);
    assert_eq!(tree.num_leaves(), 1);
    assert_eq!(write_newick(&tree), newick);
}

// --- TESTS WRITING ---
#[test]
fn test_round_trip_keeps_topology_and_order() {
    let newick = "(A:1,(B:2,C:3)D:4)root;";
    assert_eq!(write_tree(&parse_str(newick).unwrap(), &NoOverrides), newick);
}

#[test]
fn test_quoting_round_trip() {
    let tree = parse_str("('foo,bar':1,B:2);").unwrap();
    assert_eq!(tree[find(&tree, "foo,bar")].name(), Some("foo,bar"));

    let written = write_newick(&tree);
    assert_eq!(written, "('foo,bar':1,B:2);");
    let reparsed = parse_str(&written).unwrap();
    assert!(reparsed.pre_order_iter().any(|v| v.name() == Some("foo,bar")));
}

// --- TESTS DEALING WITH CORRUPT NEWICK STRINGS ---
#[test]
fn test_missing_semicolon() {
    let result = parse_str("((A:1.0,B:2.0):3.0,C:4.0):0.5");
    assert!(matches!(
        result.unwrap_err().kind(),
        ParsingErrorType::InvalidNewickString(_)
    ));
}

#[test]
fn test_missing_comma() {
    assert!(parse_str("((A:1.0 B:2.0):3.0,C:4.0):0.5;").is_err());
}

#[test]
fn test_unmatched_parentheses() {
    assert!(parse_str("((A:1.0,B:2.0:3.0,C:4.0):0.5;").is_err());
    assert!(matches!(
        parse_str("((A,B),C").unwrap_err().kind(),
        ParsingErrorType::UnexpectedEOF
    ));
}

#[test]
fn test_invalid_branch_length() {
    let error = parse_str("((A:1.0,B:abc):3.0,C:4.0):0.5;").unwrap_err();
    assert!(matches!(error.kind(), ParsingErrorType::InvalidBranchLength(_)));
}

#[test]
fn test_negative_branch_length() {
    let error = parse_str("(A:-1,B:2);").unwrap_err();
    assert!(matches!(error.kind(), ParsingErrorType::InvalidBranchLength(_)));
}

#[test]
fn test_unclosed_quote_and_comment() {
    assert!(parse_str("('A,B);").is_err());
    assert!(matches!(
        parse_str("(A,B)[oops;").unwrap_err().kind(),
        ParsingErrorType::UnclosedComment
    ));
}

#[test]
fn test_content_after_semicolon() {
    assert!(parse_str("(A,B);(C,D);").is_err());
    assert!(parse_str("(A,B); [trailing comment]").is_ok());
}

#[test]
fn test_empty_input() {
    assert!(matches!(
        parse_str("   ").unwrap_err().kind(),
        ParsingErrorType::UnexpectedEOF
    ));
}

// --- PROPERTY: WRITE THEN PARSE ---
fn arb_label() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z][A-Za-z0-9_]{0,6}",
        "[a-z]{1,3}[ ,:;()'][a-z]{1,3}",
    ]
}

fn arb_newick() -> impl Strategy<Value = String> {
    let leaf = (arb_label(), 0u32..1000).prop_map(|(name, bl)| {
        format!("{}:{}", cladeshift::parser::utils::quote_label(&name), f64::from(bl) / 8.0)
    });
    leaf.prop_recursive(4, 32, 4, |inner| {
        (prop::collection::vec(inner, 1..4), 0u32..100)
            .prop_map(|(children, bl)| format!("({}):{}", children.join(","), f64::from(bl) / 4.0))
    })
}

proptest! {
    #[test]
    fn prop_write_is_fixed_point_of_parse(body in arb_newick()) {
        let newick = format!("{body};");
        let tree = parse_str(&newick).unwrap();
        let written = write_newick(&tree);
        prop_assert_eq!(&written, &newick);

        let reparsed = parse_str(&written).unwrap();
        prop_assert_eq!(reparsed.num_vertices(), tree.num_vertices());
        prop_assert_eq!(write_newick(&reparsed), written);
    }
}

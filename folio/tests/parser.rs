use std::rc::Rc;

use folio::ast::{Link, Node, ReferenceLink};
use folio::context::Context;
use folio::flavor::Flavor;
use folio::function::ArgumentValue;
use folio::parser::{MAX_NESTING_DEPTH, parse_blocks, parse_inline};
use pretty_assertions::assert_eq;

fn context() -> Rc<Context> {
    Context::new(Flavor::extended().unwrap())
}

fn text(s: &str) -> Node {
    Node::text_node(s)
}

fn paragraph(s: &str) -> Node {
    Node::Paragraph {
        text: s.to_string(),
        children: vec![text(s)],
    }
}

#[test]
fn heading_with_inline_content() {
    let ctx = context();
    let nodes = parse_blocks("# Hello *world*\n", &ctx).unwrap();
    assert_eq!(
        nodes,
        vec![Node::Heading {
            level: 1,
            text: "Hello *world*".into(),
            children: vec![text("Hello "), Node::Emphasis(vec![text("world")])],
        }]
    );
}

#[test]
fn setext_heading() {
    let ctx = context();
    let nodes = parse_blocks("Title\n---\n", &ctx).unwrap();
    assert_eq!(
        nodes,
        vec![Node::Heading {
            level: 2,
            text: "Title".into(),
            children: vec![text("Title")],
        }]
    );
}

#[test]
fn soft_breaks_keep_their_newline() {
    let ctx = context();
    let nodes = parse_blocks("a\nb\n", &ctx).unwrap();
    assert_eq!(nodes, vec![paragraph("a\nb")]);
}

#[test]
fn malformed_heading_degrades_to_paragraph() {
    let ctx = context();
    let nodes = parse_blocks("#hashtag\n", &ctx).unwrap();
    assert_eq!(nodes, vec![paragraph("#hashtag")]);
}

#[test]
fn fenced_code() {
    let ctx = context();
    let nodes = parse_blocks("```rust\nlet x = 1;\n```\n", &ctx).unwrap();
    assert_eq!(
        nodes,
        vec![Node::Code {
            language: Some("rust".into()),
            content: "let x = 1;\n".into(),
        }]
    );
}

#[test]
fn block_quote_is_reparsed() {
    let ctx = context();
    let nodes = parse_blocks("> # Hi\n> text\n", &ctx).unwrap();
    assert_eq!(
        nodes,
        vec![Node::BlockQuote(vec![
            Node::Heading {
                level: 1,
                text: "Hi".into(),
                children: vec![text("Hi")],
            },
            paragraph("text"),
        ])]
    );
}

#[test]
fn tight_list() {
    let ctx = context();
    let nodes = parse_blocks("- a\n- b\n", &ctx).unwrap();
    assert_eq!(
        nodes,
        vec![Node::List {
            ordered: false,
            start: 1,
            loose: false,
            items: vec![
                Node::ListItem(vec![paragraph("a")]),
                Node::ListItem(vec![paragraph("b")]),
            ],
        }]
    );
}

#[test]
fn loose_ordered_list_keeps_its_start() {
    let ctx = context();
    let nodes = parse_blocks("3. a\n\n4. b\n", &ctx).unwrap();
    match &nodes[..] {
        [Node::List { ordered, start, loose, items }] => {
            assert!(*ordered);
            assert_eq!(*start, 3);
            assert!(*loose);
            assert_eq!(items.len(), 2);
        }
        other => panic!("unexpected nodes: {other:?}"),
    }
}

#[test]
fn nested_list() {
    let ctx = context();
    let nodes = parse_blocks("- a\n  - b\n", &ctx).unwrap();
    assert_eq!(
        nodes,
        vec![Node::List {
            ordered: false,
            start: 1,
            loose: false,
            items: vec![Node::ListItem(vec![
                paragraph("a"),
                Node::List {
                    ordered: false,
                    start: 1,
                    loose: false,
                    items: vec![Node::ListItem(vec![paragraph("b")])],
                },
            ])],
        }]
    );
}

#[test]
fn link_definitions_register_and_resolve() {
    let ctx = context();
    let nodes = parse_blocks("[Home]: /index.html \"Start\"\n\nGo [Home].\n", &ctx).unwrap();
    assert_eq!(nodes.len(), 2);
    assert!(matches!(nodes[0], Node::LinkDefinition(_)));
    assert_eq!(
        nodes[1].children().unwrap(),
        &[
            text("Go "),
            Node::ReferenceLink(ReferenceLink {
                label: vec![text("Home")],
                reference: "Home".into(),
                source: "[Home]".into(),
                definition: None,
            }),
            text("."),
        ]
    );

    let definition = ctx.link_definition("home").unwrap();
    assert_eq!(definition.url, "/index.html");
    assert_eq!(definition.title.as_deref(), Some("Start"));
}

#[test]
fn inline_links_and_images() {
    let ctx = context();
    let nodes = parse_inline("[a](<x y> 'T') ![b](i.png)", &ctx).unwrap();
    assert_eq!(
        nodes,
        vec![
            Node::Link(Link {
                label: vec![text("a")],
                url: "x y".into(),
                title: Some("T".into()),
            }),
            text(" "),
            Node::Image(Link {
                label: vec![text("b")],
                url: "i.png".into(),
                title: None,
            }),
        ]
    );
}

#[test]
fn calls_are_placed_and_queued() {
    let ctx = context();
    let nodes = parse_blocks(".sum {2} {3}\n\nText .f {x} here\n", &ctx).unwrap();
    assert_eq!(ctx.pending_calls(), 2);

    let Node::FunctionCall(call) = &nodes[0] else {
        panic!("expected a call, got {:?}", nodes[0]);
    };
    assert_eq!(call.name, "sum");
    assert!(call.is_block);
    assert_eq!(call.arguments.len(), 2);
    assert!(!call.is_expanded());

    let inline = nodes[1].children().unwrap();
    assert!(matches!(&inline[1], Node::FunctionCall(c) if c.name == "f" && !c.is_block));

    // The queue hands out the very nodes that sit in the tree.
    let queued = ctx.pop_function_call().unwrap();
    assert!(Rc::ptr_eq(&queued, call));
}

#[test]
fn call_body_becomes_last_argument() {
    let ctx = context();
    let nodes = parse_blocks(".note {Tip}\n  First line\n    nested\n", &ctx).unwrap();
    let Node::FunctionCall(call) = &nodes[0] else {
        panic!("expected a call");
    };
    let body = call.arguments.last().unwrap();
    assert!(body.is_body);
    assert_eq!(body.value, ArgumentValue::Raw("First line\n  nested".into()));
}

#[test]
fn math_sets_the_flag() {
    let ctx = context();
    assert!(!ctx.has_math());
    let nodes = parse_blocks("$$$\nx^2\n$$$\n", &ctx).unwrap();
    assert_eq!(nodes, vec![Node::Math("x^2".into())]);
    assert!(ctx.has_math());

    let ctx = context();
    parse_inline("where $y$ holds", &ctx).unwrap();
    assert!(ctx.has_math());
}

#[test]
fn critical_content_is_isolated() {
    let ctx = context();
    let nodes = parse_inline("a < b", &ctx).unwrap();
    assert_eq!(
        nodes,
        vec![text("a "), Node::CriticalContent("<".into()), text(" b")]
    );
}

/// Follows the first child down through containers, counting levels.
fn innermost(nodes: &[Node]) -> (usize, &Node) {
    let mut depth = 0;
    let mut node = &nodes[0];
    loop {
        let next = match node {
            Node::BlockQuote(children) | Node::ListItem(children) => children.first(),
            Node::List { items, .. } => items.first(),
            _ => None,
        };
        match next {
            Some(child) => {
                if matches!(node, Node::BlockQuote(_) | Node::ListItem(_)) {
                    depth += 1;
                }
                node = child;
            }
            None => return (depth, node),
        }
    }
}

#[test]
fn deeply_nested_quotes_stop_at_the_limit() {
    let ctx = context();
    let source = format!("{} deep\n", ">".repeat(1000));
    let nodes = parse_blocks(&source, &ctx).unwrap();

    let (depth, leaf) = innermost(&nodes);
    assert_eq!(depth, MAX_NESTING_DEPTH);
    let Node::BlockText { text, children } = leaf else {
        panic!("expected the remainder as text, got {leaf:?}");
    };
    assert!(text.starts_with('>') && text.ends_with("deep"), "{text}");
    assert_eq!(children, &vec![Node::Text(text.clone())]);
}

#[test]
fn deeply_nested_list_items_stop_at_the_limit() {
    let ctx = context();
    let source = format!("{}deep\n", "- ".repeat(1000));
    let nodes = parse_blocks(&source, &ctx).unwrap();

    let (depth, leaf) = innermost(&nodes);
    assert_eq!(depth, MAX_NESTING_DEPTH);
    assert!(matches!(leaf, Node::BlockText { text, .. } if text.ends_with("- deep")), "{leaf:?}");
}

#[test]
fn shallow_nesting_is_parsed_fully() {
    let ctx = context();
    let nodes = parse_blocks("> > > inner\n", &ctx).unwrap();
    let (depth, leaf) = innermost(&nodes);
    assert_eq!(depth, 3);
    assert_eq!(leaf, &paragraph("inner"));
}

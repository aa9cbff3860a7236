//! A small function library shared by the integration tests.
#![allow(dead_code)]

use anyhow::{Context as _, bail};
use engine::{Catalogue, CompileOptions, Compiled, compile};
use folio::ast::{Alignment, BoxStyle};
use folio::function::{EnumKind, Function, Library, OutputValue, Parameter, ValueKind};
use folio::{DocumentType, Node};

pub const ALIGNMENT: EnumKind = EnumKind::new("Alignment", Alignment::NAMES);

pub fn library() -> Library {
    Library::new("test")
        .with(
            Function::new("sum")
                .param(Parameter::new("a", ValueKind::Number))
                .param(Parameter::new("b", ValueKind::Number))
                .body(|args| Ok(OutputValue::Number(args.number("a")? + args.number("b")?))),
        )
        .with(
            Function::new("greet")
                .param(Parameter::new("name", ValueKind::String).with_default("world"))
                .body(|args| Ok(OutputValue::String(format!("Hello, {}!", args.string("name")?)))),
        )
        .with(
            Function::new("note")
                .param(Parameter::new("title", ValueKind::String))
                .param(Parameter::new("body", ValueKind::Markdown).with_default(""))
                .body(|args| {
                    Ok(OutputValue::Node(Node::Box {
                        style: BoxStyle {
                            title: Some(args.string("title")?.to_string()),
                            ..BoxStyle::default()
                        },
                        children: args.markdown("body")?.to_vec(),
                    }))
                }),
        )
        .with(
            Function::new("align")
                .param(Parameter::new("alignment", ValueKind::Enum(ALIGNMENT)))
                .param(Parameter::new("body", ValueKind::Markdown))
                .body(|args| {
                    let name = args.enum_member("alignment")?;
                    let Some(alignment) = Alignment::from_name(name) else {
                        bail!("unknown alignment {name}");
                    };
                    Ok(OutputValue::Node(Node::Aligned {
                        alignment,
                        children: args.markdown("body")?.to_vec(),
                    }))
                }),
        )
        .with(
            Function::new("docname")
                .param(Parameter::context("context"))
                .param(Parameter::new("name", ValueKind::String))
                .body(|args| {
                    let context = args.context("context")?;
                    context.document_info_mut().name = Some(args.string("name")?.trim().to_string());
                    Ok(OutputValue::Void)
                }),
        )
        .with(
            Function::new("doctype")
                .param(Parameter::context("context"))
                .param(Parameter::new("type", ValueKind::Enum(DocumentType::KIND)))
                .body(|args| {
                    let member = args.enum_member("type")?;
                    let Some(doc_type) = DocumentType::from_name(member) else {
                        bail!("unknown document type {member}");
                    };
                    args.context("context")?.document_info_mut().doc_type = doc_type;
                    Ok(OutputValue::Void)
                }),
        )
        .with(
            Function::new("include")
                .param(Parameter::new("path", ValueKind::String))
                .body(|args| {
                    let path = args.string("path")?.trim();
                    let text = std::fs::read_to_string(path).with_context(|| format!("cannot read {path}"))?;
                    Ok(OutputValue::String(text.trim_end().to_string()))
                }),
        )
        .with(
            Function::new("repeat")
                .param(Parameter::new("body", ValueKind::Markdown))
                .param(Parameter::new("times", ValueKind::Number))
                .body(|args| {
                    let body = args.markdown("body")?;
                    let times = args.number("times")? as usize;
                    Ok(OutputValue::Markdown((0..times).flat_map(|_| body.iter().cloned()).collect()))
                }),
        )
        .with(Function::new("fail").body(|_| bail!("deliberate failure")))
}

pub fn catalogue() -> Catalogue {
    Catalogue::new().with(library())
}

pub fn compile_default(source: &str) -> Compiled {
    compile(source, &catalogue(), &CompileOptions::default()).expect("compiles")
}

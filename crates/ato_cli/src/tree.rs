//! `ato tree`: print the materialized instance tree of a build.

use std::fmt::Write;

use ato_ast::LinkDirection;
use ato_front::{Assertion, FrontEnd, Instance, Operand};
use serde::Serialize;

use crate::pipeline::{run_build, Outcome};
use crate::{GlobalArgs, TreeArgs, TreeFormat};

/// Serialized form of one instance.
#[derive(Serialize, Debug)]
pub struct InstanceView {
    /// Rendered address.
    pub address: String,
    /// Rendered super chain, most-derived first.
    pub supers: Vec<String>,
    /// Effective attributes in first-appearance order.
    pub attributes: Vec<AttributeView>,
    /// Child instances in declaration order.
    pub children: Vec<InstanceView>,
    /// Connections made in this instance.
    pub links: Vec<LinkView>,
    /// Recorded comparisons.
    pub assertions: Vec<String>,
}

/// Serialized form of an effective attribute.
#[derive(Serialize, Debug)]
pub struct AttributeView {
    /// Attribute name.
    pub name: String,
    /// Rendered value, if assigned.
    pub value: Option<String>,
    /// Declared type, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
    /// Where the effective assignment was written.
    pub declared_in: String,
}

/// Serialized form of a link.
#[derive(Serialize, Debug)]
pub struct LinkView {
    /// Source endpoint address.
    pub source: String,
    /// Target endpoint address.
    pub target: String,
    /// Whether the link is directed.
    pub directed: bool,
}

/// Runs the `ato tree` command.
pub fn run(args: &TreeArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let format = args.format;
    let outcome = run_build(global, args.build.as_deref(), |front, instance| {
        let tree = view(front, instance);
        match format {
            TreeFormat::Text => Ok(render_text(&tree)),
            TreeFormat::Json => serde_json::to_string_pretty(&tree),
        }
    })?;

    match outcome {
        Outcome::Built(rendered) => {
            println!("{}", rendered?);
            Ok(0)
        }
        Outcome::Failed => Ok(1),
    }
}

/// Builds the serializable view of an instance tree.
pub fn view(front: &FrontEnd<'_>, instance: &Instance) -> InstanceView {
    let interner = front.interner();
    InstanceView {
        address: front.render_addr(&instance.address),
        supers: instance.supers.iter().map(|s| front.render_addr(s)).collect(),
        attributes: instance
            .assignments
            .effective()
            .into_iter()
            .map(|(name, a)| AttributeView {
                name: interner.resolve(name).to_string(),
                value: instance.assignments.value(name).map(ToString::to_string),
                declared_type: instance.assignments.declared_type(name).map(str::to_string),
                declared_in: front.render_addr(&a.declared_in),
            })
            .collect(),
        children: instance.children.values().map(|c| view(front, c)).collect(),
        links: instance
            .links
            .iter()
            .map(|l| LinkView {
                source: front.render_addr(&l.source),
                target: front.render_addr(&l.target),
                directed: l.direction == LinkDirection::Directed,
            })
            .collect(),
        assertions: instance
            .assertions
            .iter()
            .map(|a| render_assertion(front, a))
            .collect(),
    }
}

fn render_operand(front: &FrontEnd<'_>, operand: &Operand) -> String {
    match operand {
        Operand::Ref(r) => front.render_ref(r),
        Operand::Literal(lit) => lit.to_string(),
    }
}

fn render_assertion(front: &FrontEnd<'_>, assertion: &Assertion) -> String {
    format!(
        "{} {} {}",
        render_operand(front, &assertion.lhs),
        assertion.op,
        render_operand(front, &assertion.rhs)
    )
}

/// Renders a view as an indented tree.
pub fn render_text(view: &InstanceView) -> String {
    let mut out = String::new();
    render_node(view, 0, &mut out);
    out.truncate(out.trim_end().len());
    out
}

fn render_node(view: &InstanceView, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let _ = writeln!(out, "{indent}{} : {}", view.address, view.supers.join(" < "));
    for attr in &view.attributes {
        let value = attr.value.as_deref().unwrap_or("<unset>");
        match &attr.declared_type {
            Some(ty) => {
                let _ = writeln!(out, "{indent}  .{}: {ty} = {value}", attr.name);
            }
            None => {
                let _ = writeln!(out, "{indent}  .{} = {value}", attr.name);
            }
        }
    }
    for link in &view.links {
        let arrow = if link.directed { "~>" } else { "~" };
        let _ = writeln!(out, "{indent}  {} {arrow} {}", link.source, link.target);
    }
    for assertion in &view.assertions {
        let _ = writeln!(out, "{indent}  assert {assertion}");
    }
    for child in &view.children {
        render_node(child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ato_ast::build::*;
    use ato_ast::{CompareOp, MemoryAstProvider};
    use ato_common::Interner;
    use std::path::Path;

    fn fixture() -> MemoryAstProvider {
        MemoryAstProvider::new().with_file(
            "main.ato",
            file(vec![
                component("R", None, vec![pin("1"), assign("value", physical("10kohm"))]),
                module(
                    "App",
                    None,
                    vec![
                        new("r1", "R"),
                        signal("gnd"),
                        connect_directed(at("r1.1"), at("gnd")),
                        declare("vcc", Some("V")),
                        assert_cmp(
                            ato_ast::Operand::Ref(dotted("vcc")),
                            CompareOp::Lt,
                            ato_ast::Operand::Literal(physical("5V")),
                        ),
                    ],
                ),
            ]),
        )
    }

    #[test]
    fn text_tree() {
        let provider = fixture();
        let interner = Interner::new();
        let mut front = FrontEnd::new(&interner, &provider, vec![]);
        let app = front.address(Path::new("main.ato"), &["App"]);
        let instance = front.build(&app).unwrap();
        let text = render_text(&view(&front, &instance));
        let expected = "\
main.ato:App : main.ato:App < MODULE
  .vcc: V = <unset>
  main.ato:App.r1.1 ~> main.ato:App.gnd
  assert vcc < 5V
  main.ato:App.r1 : main.ato:R < COMPONENT
    .value = 10kohm
    main.ato:App.r1.1 : PIN
  main.ato:App.gnd : SIGNAL";
        assert_eq!(text, expected);
    }

    #[test]
    fn json_tree() {
        let provider = fixture();
        let interner = Interner::new();
        let mut front = FrontEnd::new(&interner, &provider, vec![]);
        let app = front.address(Path::new("main.ato"), &["App"]);
        let instance = front.build(&app).unwrap();
        let json = serde_json::to_value(view(&front, &instance)).unwrap();
        assert_eq!(json["address"], "main.ato:App");
        assert_eq!(json["children"][0]["attributes"][0]["value"], "10kohm");
        assert_eq!(json["links"][0]["directed"], true);
        assert!(json["attributes"][0].get("value").unwrap().is_null());
        assert_eq!(json["attributes"][0]["declared_type"], "V");
    }
}

//! Properties every pipeline run must hold: caching, scoping, layering,
//! retypes, link resolution and failure propagation.

use ato_ast::build::*;
use ato_conformance::{child_names, entry_address, value_at, Fixture};
use ato_front::{Builtin, FrontEndError};

fn resistor_board() -> Fixture {
    Fixture::new().file(
        "main.ato",
        file(vec![
            component(
                "Resistor",
                None,
                vec![pin("1"), pin("2"), assign("value", physical("10kohm"))],
            ),
            module(
                "App",
                None,
                vec![
                    new("r1", "Resistor"),
                    new("r2", "Resistor"),
                    connect(at("r1.2"), at("r2.1")),
                ],
            ),
        ]),
    )
}

// ---------------------------------------------------------------------------
// Idempotence
// ---------------------------------------------------------------------------

#[test]
fn class_defs_and_layers_are_cached() {
    let fx = resistor_board();
    let mut front = fx.front();
    let app = entry_address(&mut front, "main.ato:App");

    let first = front.get_class_def(&app).unwrap().address.clone();
    let second = front.get_class_def(&app).unwrap().address.clone();
    assert_eq!(first, second);

    let l1 = front.get_layer(&app).unwrap().id;
    let l2 = front.get_layer(&app).unwrap().id;
    assert_eq!(l1, l2);
}

#[test]
fn repeated_builds_are_identical() {
    let fx = resistor_board();
    let mut front = fx.front();
    let app = entry_address(&mut front, "main.ato:App");
    let a = front.build(&app).unwrap();
    let b = front.build(&app).unwrap();
    assert_eq!(a, b);

    // A separate pipeline over the same inputs agrees too.
    assert_eq!(fx.build("main.ato:App").unwrap(), a);
    assert_eq!(
        fx.build_tree("main.ato:App").unwrap(),
        fx.build_tree("main.ato:App").unwrap()
    );
}

#[test]
fn rendered_tree() {
    let tree = resistor_board().build_tree("main.ato:App").unwrap();
    let expected = "\
main.ato:App (App < MODULE)
  r1 (Resistor < COMPONENT) value=10kohm
    1 (PIN)
    2 (PIN)
  r2 (Resistor < COMPONENT) value=10kohm
    1 (PIN)
    2 (PIN)
  link r1.2 ~ r2.1
";
    assert_eq!(tree, expected);
}

// ---------------------------------------------------------------------------
// Scope isolation
// ---------------------------------------------------------------------------

#[test]
fn sibling_scopes_do_not_cross_resolve() {
    let fx = Fixture::new().file(
        "main.ato",
        file(vec![
            component("Small", None, vec![pin("1")]),
            component("Large", None, vec![pin("1"), pin("2"), pin("3")]),
            module(
                "A",
                None,
                vec![component("X", Some("Small"), vec![]), new("x", "X")],
            ),
            module(
                "B",
                None,
                vec![component("X", Some("Large"), vec![]), new("x", "X")],
            ),
            module("Top", None, vec![new("a", "A"), new("b", "B")]),
        ]),
    );
    let mut front = fx.front();
    let top = entry_address(&mut front, "main.ato:Top");
    let a_x = entry_address(&mut front, "main.ato:A.X");
    let b_x = entry_address(&mut front, "main.ato:B.X");
    let inst = front.build(&top).unwrap();

    let ax = inst.descendant(&fx.dotted("a.x")).unwrap();
    let bx = inst.descendant(&fx.dotted("b.x")).unwrap();
    assert_eq!(ax.class(), &a_x);
    assert_eq!(bx.class(), &b_x);
    assert_eq!(ax.children.len(), 1);
    assert_eq!(bx.children.len(), 3);
}

#[test]
fn name_defined_only_in_sibling_is_unknown() {
    let fx = Fixture::new().file(
        "main.ato",
        file(vec![
            module("A", None, vec![component("X", None, vec![])]),
            module("B", None, vec![new("x", "X")]),
        ]),
    );
    match fx.build("main.ato:B") {
        Err(FrontEndError::UnknownReference { reference, .. }) => assert_eq!(reference, "X"),
        other => panic!("expected UnknownReference, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Ambiguity detection
// ---------------------------------------------------------------------------

fn ambiguous_fixture(body: Vec<ato_ast::Stmt>) -> Fixture {
    let mut stmts = vec![
        import("Q", "q.ato"),
        component("Q", None, vec![pin("local")]),
    ];
    stmts.extend(body);
    Fixture::new()
        .file("q.ato", file(vec![component("Q", None, vec![pin("imported")])]))
        .file("main.ato", file(stmts))
}

#[test]
fn import_and_local_def_with_same_name_are_ambiguous() {
    let fx = ambiguous_fixture(vec![module("App", None, vec![new("q", "Q")])]);
    assert!(matches!(
        fx.build("main.ato:App"),
        Err(FrontEndError::AmbiguousReference { name, .. }) if name == "Q"
    ));
}

#[test]
fn ambiguity_applies_to_super_references() {
    let fx = ambiguous_fixture(vec![component("Z", Some("Q"), vec![])]);
    assert!(matches!(
        fx.build("main.ato:Z"),
        Err(FrontEndError::AmbiguousReference { .. })
    ));
}

#[test]
fn inner_definition_shadows_outer_import() {
    let fx = Fixture::new()
        .file("q.ato", file(vec![component("Q", None, vec![pin("imported")])]))
        .file(
            "main.ato",
            file(vec![
                import("Q", "q.ato"),
                module(
                    "App",
                    None,
                    vec![component("Q", None, vec![pin("inner")]), new("q", "Q")],
                ),
            ]),
        );
    let inst = fx.build("main.ato:App").unwrap();
    let q = inst.child(fx.name("q")).unwrap();
    assert_eq!(child_names(fx.interner(), q), vec!["inner"]);
}

// ---------------------------------------------------------------------------
// Override shadowing
// ---------------------------------------------------------------------------

#[test]
fn child_assignment_shadows_parent_without_mutating_it() {
    let fx = Fixture::new().file(
        "main.ato",
        file(vec![
            module("Parent", None, vec![assign("x", int(1)), assign("y", int(7))]),
            module("Child", Some("Parent"), vec![assign("x", int(2))]),
        ]),
    );
    let mut front = fx.front();
    let child = entry_address(&mut front, "main.ato:Child");
    let parent = entry_address(&mut front, "main.ato:Parent");

    let c = front.build(&child).unwrap();
    assert_eq!(value_at(fx.interner(), &c, "x"), Some(int(2)));
    assert_eq!(value_at(fx.interner(), &c, "y"), Some(int(7)));

    let p = front.build(&parent).unwrap();
    assert_eq!(value_at(fx.interner(), &p, "x"), Some(int(1)));

    // Child's layers are most-derived first.
    let origins: Vec<_> = c.assignments.layers().iter().map(|l| &l.origin).collect();
    assert_eq!(origins[0], &child);
    assert_eq!(origins[1], &parent);
}

#[test]
fn declaration_keeps_inherited_value() {
    let fx = Fixture::new().file(
        "main.ato",
        file(vec![
            module("Parent", None, vec![assign("x", int(1))]),
            module("Child", Some("Parent"), vec![declare("x", Some("V"))]),
        ]),
    );
    let mut front = fx.front();
    let child = entry_address(&mut front, "main.ato:Child");
    let c = front.build(&child).unwrap();

    assert_eq!(value_at(fx.interner(), &c, "x"), Some(int(1)));
    assert_eq!(c.assignments.declared_type(fx.name("x")), Some("V"));
    assert_eq!(c.assignments.get(fx.name("x")).unwrap().declared_in, child);
    assert_eq!(fx.build_tree("main.ato:Child").unwrap(), "main.ato:Child (Child < Parent < MODULE) x=1\n");
}

#[test]
fn outer_override_shadows_inner_override() {
    let fx = Fixture::new().file(
        "main.ato",
        file(vec![
            component("Cap", None, vec![assign("value", physical("100nF"))]),
            module("Filter", None, vec![new("c", "Cap"), assign("c.value", physical("1uF"))]),
            module("Board", None, vec![new("f", "Filter"), assign("f.c.value", physical("10uF"))]),
        ]),
    );
    let board = fx.build("main.ato:Board").unwrap();
    assert_eq!(value_at(fx.interner(), &board, "f.c.value"), Some(physical("10uF")));

    let filter = fx.build("main.ato:Filter").unwrap();
    assert_eq!(value_at(fx.interner(), &filter, "c.value"), Some(physical("1uF")));
}

// ---------------------------------------------------------------------------
// Retype precedence
// ---------------------------------------------------------------------------

fn retype_fixture() -> Fixture {
    Fixture::new().file(
        "main.ato",
        file(vec![
            component("Base", None, vec![pin("p")]),
            component("Derived", Some("Base"), vec![pin("q")]),
            component("Other", None, vec![]),
            module("Parent", None, vec![new("child", "Base")]),
            module("UseSite", None, vec![new("parent", "Parent"), retype("parent.child", "Derived")]),
            module("Sub", Some("Parent"), vec![retype("child", "Derived")]),
            module("OuterSite", None, vec![new("s", "Sub"), retype("s.child", "Other")]),
        ]),
    )
}

#[test]
fn retype_at_use_site_replaces_declared_type() {
    let fx = retype_fixture();
    let mut front = fx.front();
    let use_site = entry_address(&mut front, "main.ato:UseSite");
    let parent = entry_address(&mut front, "main.ato:Parent");
    let base = entry_address(&mut front, "main.ato:Base");
    let derived = entry_address(&mut front, "main.ato:Derived");

    let inst = front.build(&use_site).unwrap();
    let child = inst.descendant(&fx.dotted("parent.child")).unwrap();
    assert!(child.is_instance_of(&derived));
    assert!(child.is_instance_of(&base));
    assert_eq!(child_names(fx.interner(), child), vec!["p", "q"]);

    // Without the use-site context the declared type is used.
    let plain = front.build(&parent).unwrap();
    let child = plain.child(fx.name("child")).unwrap();
    assert_eq!(child.class(), &base);
    assert!(!child.is_instance_of(&derived));
}

#[test]
fn retype_declared_in_subclass() {
    let fx = retype_fixture();
    let mut front = fx.front();
    let sub = entry_address(&mut front, "main.ato:Sub");
    let derived = entry_address(&mut front, "main.ato:Derived");
    let inst = front.build(&sub).unwrap();
    assert_eq!(inst.child(fx.name("child")).unwrap().class(), &derived);
}

#[test]
fn outermost_retype_wins() {
    let fx = retype_fixture();
    let mut front = fx.front();
    let site = entry_address(&mut front, "main.ato:OuterSite");
    let other = entry_address(&mut front, "main.ato:Other");
    let inst = front.build(&site).unwrap();
    let child = inst.descendant(&fx.dotted("s.child")).unwrap();
    assert_eq!(child.class(), &other);
    assert!(child.children.is_empty());
}

#[test]
fn ancestor_retype_applies_to_derived_new() {
    let fx = Fixture::new().file(
        "main.ato",
        file(vec![
            component("Base", None, vec![pin("p")]),
            component("Derived", Some("Base"), vec![pin("q")]),
            module("Parent", None, vec![retype("child", "Derived")]),
            module("Sub", Some("Parent"), vec![new("child", "Base")]),
        ]),
    );
    let mut front = fx.front();
    let sub = entry_address(&mut front, "main.ato:Sub");
    let derived = entry_address(&mut front, "main.ato:Derived");
    let inst = front.build(&sub).unwrap();
    let child = inst.child(fx.name("child")).unwrap();
    assert_eq!(child.class(), &derived);
    assert_eq!(child_names(fx.interner(), child), vec!["p", "q"]);
}

// ---------------------------------------------------------------------------
// Link resolution
// ---------------------------------------------------------------------------

#[test]
fn connect_before_pins_still_resolves() {
    let fx = Fixture::new().file(
        "main.ato",
        file(vec![component(
            "R",
            None,
            vec![connect(at("a"), at("b")), pin("a"), pin("b")],
        )]),
    );
    let mut front = fx.front();
    let r = entry_address(&mut front, "main.ato:R");
    let inst = front.build(&r).unwrap();
    assert_eq!(inst.links.len(), 1);
    assert_eq!(front.render_addr(&inst.links[0].source), "main.ato:R.a");
    assert_eq!(front.render_addr(&inst.links[0].target), "main.ato:R.b");
}

#[test]
fn inherited_connect_sees_derived_children() {
    let fx = Fixture::new().file(
        "main.ato",
        file(vec![
            component("Base", None, vec![connect(at("vcc"), at("1"))]),
            component("Derived", Some("Base"), vec![signal("vcc"), pin("1")]),
        ]),
    );
    let inst = fx.build("main.ato:Derived").unwrap();
    assert_eq!(inst.links.len(), 1);
}

// ---------------------------------------------------------------------------
// Fatal propagation
// ---------------------------------------------------------------------------

#[test]
fn deep_failure_aborts_every_ancestor() {
    let fx = Fixture::new().file(
        "main.ato",
        file(vec![
            component("Fine", None, vec![pin("1")]),
            module("L3", None, vec![new("broken", "Missing")]),
            module("L2", None, vec![new("ok", "Fine"), new("l3", "L3")]),
            module("L1", None, vec![new("l2", "L2"), new("after", "Fine")]),
            module("Top", None, vec![new("sib", "Fine"), new("l1", "L1")]),
        ]),
    );
    let mut front = fx.front();
    for entry in ["main.ato:Top", "main.ato:L1", "main.ato:L2", "main.ato:L3"] {
        let addr = entry_address(&mut front, entry);
        match front.build(&addr) {
            Err(FrontEndError::UnknownReference { reference, .. }) => {
                assert_eq!(reference, "Missing")
            }
            other => panic!("{entry}: expected UnknownReference, got {other:?}"),
        }
    }

    // The run is still usable for unaffected classes.
    let fine = entry_address(&mut front, "main.ato:Fine");
    assert!(front.build(&fine).is_ok());
}

// ---------------------------------------------------------------------------
// Inherited pins
// ---------------------------------------------------------------------------

#[test]
fn derived_component_has_base_and_own_pins() {
    let fx = Fixture::new().file(
        "main.ato",
        file(vec![
            component("Base", None, vec![pin("P1")]),
            component("Derived", Some("Base"), vec![pin("P2")]),
        ]),
    );
    let mut front = fx.front();
    let derived = entry_address(&mut front, "main.ato:Derived");
    let inst = front.build(&derived).unwrap();

    assert_eq!(child_names(fx.interner(), &inst), vec!["P1", "P2"]);
    let pin_class = front.builtin_address(Builtin::Pin);
    for pin in inst.children.values() {
        assert_eq!(pin.supers, vec![pin_class.clone()]);
        assert!(pin.children.is_empty());
        assert!(pin.links.is_empty());
    }
    assert_eq!(inst.base(), &front.builtin_address(Builtin::Component));

    let chain: Vec<String> = front
        .supers(&inst)
        .map(|layer| front.render_addr(&layer.address))
        .collect();
    assert_eq!(chain, vec!["main.ato:Derived", "main.ato:Base", "COMPONENT"]);
}

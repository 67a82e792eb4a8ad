use crate::{
    resolve::Components,
    util::testing::{cjs, esm, graph},
};

#[test]
fn test_acyclic_components_come_dependencies_first() {
    let g = graph(vec![
        esm("entry.js").star("a.js"),
        esm("a.js").re_export("x", "b.js", "x"),
        esm("b.js").export("x"),
    ]);
    let c = Components::build(&g);
    assert_eq!(c.len(), 3);

    let (entry, a, b) = (c.component_of(0), c.component_of(1), c.component_of(2));
    assert!(b < a && a < entry);
    assert_eq!(c.deps(entry), &vec![a]);
    assert_eq!(c.deps(a), &vec![b]);
    assert!(c.deps(b).is_empty());
}

#[test]
fn test_cycle_is_one_component() {
    let g = graph(vec![
        esm("main.js").star("a.js"),
        esm("a.js").star("b.js"),
        esm("b.js").star("a.js").star("leaf.js"),
        cjs("leaf.js"),
    ]);
    let c = Components::build(&g);
    assert_eq!(c.len(), 3);
    assert_eq!(c.component_of(1), c.component_of(2));
    assert_eq!(c.members(c.component_of(1)), &vec![1, 2]);
    assert!(c.is_cyclic(&g, 1));
    assert!(!c.is_cyclic(&g, 0));
    assert_eq!(c.deps(c.component_of(1)), &vec![c.component_of(3)]);
}

#[test]
fn test_self_star_is_cyclic() {
    let g = graph(vec![esm("entry.js").star("entry.js"), esm("other.js")]);
    let c = Components::build(&g);
    assert_eq!(c.len(), 2);
    assert!(c.is_cyclic(&g, 0));
    assert!(!c.is_cyclic(&g, 1));
    assert!(c.deps(c.component_of(0)).is_empty());
}

#[test]
fn test_imports_are_not_export_edges() {
    let g = graph(vec![
        esm("a.js").import_named("b.js", &["x"]),
        esm("b.js").import_ns("a.js", "ns", &["y"]),
    ]);
    let c = Components::build(&g);
    assert_eq!(c.len(), 2);
    assert!(!c.is_cyclic(&g, 0));
}

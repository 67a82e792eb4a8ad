use std::path::PathBuf;

use crate::{
    config::{Config, load_config_file},
    driver::{LinkOutput, link},
    error::Res,
    module::{Manifest, ModuleGraph},
    util::testing::{init_logger, must},
};


fn case_dir(case: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("src/driver/tests/cases")
        .join(case)
}

/// Load the graph and config of a case directory.
fn load_case(case: &str) -> (ModuleGraph, Config) {
    init_logger();
    let dir = case_dir(case);
    let manifest = must(Manifest::load(&dir.join("graph.toml").to_string_lossy()));
    let config = must(load_config_file(&dir.join("modlink.toml").to_string_lossy()));
    (must(manifest.into_graph()), config)
}

fn link_case(case: &str) -> (ModuleGraph, Res<LinkOutput>) {
    let (graph, config) = load_case(case);
    let out = link(&graph, &config);
    (graph, out)
}

fn expect_report(case: &str, expect: &str) -> (ModuleGraph, LinkOutput) {
    match link_case(case) {
        (graph, Ok(out)) => {
            assert_eq!(out.report.render(), expect, "report of case {}", case);
            (graph, out)
        }
        (_, Err(err)) => panic!("expected no error, got: {}", err),
    }
}

fn expect_error(case: &str, error: &str) {
    match link_case(case) {
        (_, Ok(out)) => panic!("expected error, got report: {}", out.report.render()),
        (_, Err(err)) => assert_eq!(error, err.to_string()),
    }
}

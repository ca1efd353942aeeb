use super::*;

// =============================================================================
// SESSION / LOADING SEMANTICS
// =============================================================================

use assert_fs::prelude::*;
use assert_fs::TempDir;

use crate::session::{load_provenance, load_styles, LoadError, Session};
use crate::style::{Category, StyleSheet};
use crate::trace::TraceMode;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn load_provenance_replays_raw_output() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let index = temp.child("parse_map.json");
    index.write_str(&compiled(ANCESTOR).index.to_json().unwrap()).unwrap();
    let output = temp.child("out.txt");
    output.write_str("aux_anc_0(1,2) aux_anc_0(2,3) aux_anc_1(1,3,2)").unwrap();

    let prov = load_provenance(index.path(), output.path()).unwrap();
    assert!(prov.adjacency.contains("anc(1,3)"));
    temp.close().unwrap();
}

#[test]
fn load_provenance_accepts_saved_json() {
    let temp = TempDir::new().unwrap();
    let prov = provenance(ANCESTOR, "aux_anc_0(1,2)");
    let saved = temp.child("prov.json");
    saved.write_str(&prov.to_json().unwrap()).unwrap();

    // The index is not consulted for saved provenance.
    let missing = temp.child("missing.json");
    let back = load_provenance(missing.path(), saved.path()).unwrap();
    assert_eq!(back, prov);
    temp.close().unwrap();
}

#[test]
fn load_provenance_reports_mismatch() {
    let temp = TempDir::new().unwrap();
    let index = temp.child("parse_map.json");
    index.write_str(&compiled(ANCESTOR).index.to_json().unwrap()).unwrap();
    let output = temp.child("out.txt");
    output.write_str("aux_other_9(1)").unwrap();

    let err = load_provenance(index.path(), output.path()).unwrap_err();
    assert!(matches!(err, LoadError::Mismatch(_)));
    temp.close().unwrap();
}

#[test]
fn missing_files_are_io_errors() {
    let temp = TempDir::new().unwrap();
    let err = load_provenance(temp.child("a").path(), temp.child("b").path()).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
    temp.close().unwrap();
}

#[test]
fn style_file_skips_bad_lines() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let styles = temp.child("styles.txt");
    styles
        .write_str("anc.nodes:color=blue\nthis is not a style\npar.edges:style=bold\n")
        .unwrap();
    let sheet = load_styles(styles.path()).unwrap();
    assert_eq!(sheet.value("anc", Category::Nodes, "color"), Some("blue"));
    assert_eq!(sheet.value("par", Category::Edges, "style"), Some("bold"));
    temp.close().unwrap();
}

#[test]
fn partial_trace_keeps_hidden_state_across_untrace() {
    let prov = provenance(ANCESTOR, "aux_anc_0(1,2) aux_anc_0(2,3) aux_anc_1(1,3,2)");
    let mut session = Session::new(prov, StyleSheet::default_sheet());
    session.hide("par").unwrap();
    session.trace("anc(1,3)", TraceMode::Partial, None).unwrap();
    assert!(session.is_hidden("par"));
    session.untrace();
    session.show("par").unwrap();
    assert_eq!(session.styles(), &StyleSheet::default_sheet());
}

#[test]
fn full_trace_draws_back_edges_dashed() {
    let prov = provenance(
        "s(X,Y) :- s(Y,X).\ns(X,Y) :- e(X,Y).",
        "aux_s_1(1,2) aux_s_0(2,1) aux_s_0(1,2)",
    );
    let mut session = Session::new(prov, StyleSheet::default_sheet());
    session.trace("s(1,2)", TraceMode::Full, None).unwrap();
    let dot = session.dot();
    assert!(dot.contains("\"s(1,2)\" -> \"aux_s_0(2,1)\" [color=\"red\", style=\"dashed\"];"));
    assert!(dot.contains("\"e(1,2)\" [color=\"red\", fontcolor=\"red\"];"));
}

#[test]
fn removed_bucket_disappears_from_dot() {
    let prov = provenance(ANCESTOR, "aux_anc_0(1,2)");
    let mut session = Session::new(prov, StyleSheet::default_sheet());
    session.remove("aux").unwrap();
    let dot = session.dot();
    assert!(!dot.contains("aux_anc_0"));
    assert!(!dot.contains(" -> "));
}

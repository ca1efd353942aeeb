use super::*;

// =============================================================================
// REWRITE / REPLAY / TRACE PIPELINE
// =============================================================================

use crate::compile::RuleIndex;
use crate::graph::{NEGATION_BUCKET, NEGATION_IN_BUCKET, NEGATION_OUT_BUCKET};
use crate::trace::trace;

/// Firings an evaluator would report for `par = {(1,2),(2,3),(3,4)}`.
const ANCESTOR_OUTPUT: &str = "\
{par(1,2), par(2,3), par(3,4),
 aux_anc_0(1,2), aux_anc_0(2,3), aux_anc_0(3,4),
 aux_anc_1(1,3,2), aux_anc_1(2,4,3), aux_anc_1(1,4,2), aux_anc_1(1,4,3),
 anc(1,2), anc(2,3), anc(3,4), anc(1,3), anc(2,4), anc(1,4)}";

#[test]
fn rewritten_program_routes_every_rule_through_its_aux() {
    let program = compiled(ANCESTOR);
    assert_eq!(
        program.text,
        "anc(X,Y) :- aux_anc_0(X,Y).\n\
         aux_anc_0(X,Y) :- par(X,Y).\n\
         anc(X,Z) :- aux_anc_1(X,Z,Y).\n\
         aux_anc_1(X,Z,Y) :- anc(X,Y), anc(Y,Z).\n"
    );
    assert_eq!(program.index.len(), 2);
}

#[test]
fn rule_index_survives_the_artifact_boundary() {
    let program = compiled(ANCESTOR);
    let json = program.index.to_json().unwrap();
    assert!(json.contains("\"aux_anc_1\""));
    assert!(json.contains("\"predicate\""));
    assert!(json.contains("\"positions\""));
    let back = RuleIndex::from_json(&json).unwrap();
    assert_eq!(back, program.index);
}

#[test]
fn replay_recovers_every_derived_atom() {
    let prov = provenance(ANCESTOR, ANCESTOR_OUTPUT);
    let anc = prov.graph.bucket("anc").unwrap();
    for atom in ["anc(1,2)", "anc(2,3)", "anc(3,4)", "anc(1,3)", "anc(2,4)", "anc(1,4)"] {
        assert!(anc.nodes.contains(atom), "missing {}", atom);
    }
    assert_eq!(prov.graph.bucket("aux").unwrap().nodes.len(), 7);
    assert_eq!(prov.graph.bucket("par").unwrap().nodes.len(), 3);
}

#[test]
fn derived_atom_with_two_derivations_has_two_producers() {
    let prov = provenance(ANCESTOR, ANCESTOR_OUTPUT);
    assert_eq!(
        prov.adjacency.incoming("anc(1,4)"),
        ["aux_anc_1(1,4,2)".to_string(), "aux_anc_1(1,4,3)".to_string()]
    );
}

#[test]
fn trace_of_derived_atom_reaches_base_facts() {
    let prov = provenance(ANCESTOR, ANCESTOR_OUTPUT);
    let t = trace(&prov.adjacency, "anc(1,4)").unwrap();
    for fact in ["par(1,2)", "par(2,3)", "par(3,4)"] {
        assert!(t.nodes.contains(fact), "missing {}", fact);
    }
    assert!(t.back_edges.is_empty());
    assert_eq!(t.nodes, backward_reachable(&prov.adjacency, "anc(1,4)"));
}

#[test]
fn trace_of_base_fact_is_trivial() {
    let prov = provenance(ANCESTOR, ANCESTOR_OUTPUT);
    let t = trace(&prov.adjacency, "par(1,2)").unwrap();
    assert_eq!(t.nodes.len(), 1);
    assert!(t.edges.is_empty());
}

#[test]
fn symmetric_rule_produces_back_edge() {
    let source = "s(X,Y) :- s(Y,X).\ns(X,Y) :- e(X,Y).";
    let output = "aux_s_1(1,2) aux_s_0(2,1) aux_s_0(1,2)";
    let prov = provenance(source, output);
    let t = trace(&prov.adjacency, "s(1,2)").unwrap();

    assert_eq!(
        t.back_edges,
        [edge("s(1,2)", "aux_s_0(2,1)")].into_iter().collect()
    );
    assert!(t.edges.is_disjoint(&t.back_edges));
    assert!(t.nodes.contains("e(1,2)"));
    assert!(t.nodes.contains("s(2,1)"));
}

#[test]
fn negated_literal_is_justified_through_reified_node() {
    let source = "p(X) :- r(X), not q(X).\nq(X) :- s(X).";
    let output = "{r(1), s(2), aux_q_1(2), q(2), aux_p_0(1), p(1)}";
    let prov = provenance(source, output);

    assert!(prov.graph.bucket(NEGATION_BUCKET).unwrap().nodes.contains("not q(1)"));
    assert!(prov.graph.bucket(NEGATION_OUT_BUCKET).unwrap().nodes.contains("{q}"));
    assert!(prov
        .graph
        .bucket(NEGATION_IN_BUCKET)
        .unwrap()
        .edges
        .contains(&edge("q(2)", "{q}")));

    let t = trace(&prov.adjacency, "p(1)").unwrap();
    for atom in ["r(1)", "not q(1)", "{q}", "q(2)", "s(2)"] {
        assert!(t.nodes.contains(atom), "missing {}", atom);
    }
    assert!(t.edges.contains(&edge("not q(1)", "aux_p_0(1)")));
}

#[test]
fn anonymous_variables_get_their_own_positions() {
    let program = compiled("p(X) :- q(X,_), r(_,X).");
    assert!(program.text.contains("aux_p_0(X,ANON0,ANON1)"));
    let prov = build(&program.index, "aux_p_0(1,7,8)").unwrap();
    assert_eq!(
        prov.adjacency.incoming("aux_p_0(1,7,8)"),
        ["q(1,7)".to_string(), "r(8,1)".to_string()]
    );
}

#[test]
fn stale_index_is_rejected() {
    let index = compiled("p(X) :- q(X).").index;
    assert!(build(&index, "aux_p_3(1)").is_err());
}

#[test]
fn provenance_reloads_from_json() {
    let prov = provenance(ANCESTOR, ANCESTOR_OUTPUT);
    let back = Provenance::from_json(&prov.to_json().unwrap()).unwrap();
    assert_eq!(back, prov);
    assert_eq!(
        trace(&back.adjacency, "anc(1,4)").unwrap(),
        trace(&prov.adjacency, "anc(1,4)").unwrap()
    );
}

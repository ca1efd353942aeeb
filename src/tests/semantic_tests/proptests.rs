use super::*;
use proptest::prelude::*;

use std::collections::BTreeMap;

use crate::compile::{compile_rule, CompileContext};
use crate::parser::{parse_program, Statement};
use crate::render::Scene;
use crate::session::Session;
use crate::style::StyleSheet;
use crate::syntax::{Atom, Literal, Term};
use crate::trace::{trace, TraceMode};

// =============================================================================
// PROPERTY-BASED TESTS
// =============================================================================

fn arb_var() -> impl Strategy<Value = Term> {
    "[A-D]".prop_map(Term::var)
}

fn arb_term() -> impl Strategy<Value = Term> {
    prop_oneof![3 => arb_var(), 1 => "[a-c]".prop_map(Term::constant)]
}

fn arb_atom() -> impl Strategy<Value = Atom> {
    ("[p-s]", prop::collection::vec(arb_term(), 0..=3))
        .prop_map(|(pred, terms)| Atom::new(pred, terms))
}

fn arb_literal() -> impl Strategy<Value = Literal> {
    (any::<bool>(), arb_atom()).prop_map(|(positive, atom)| Literal { positive, atom })
}

fn arb_rule() -> impl Strategy<Value = (Atom, Vec<Literal>)> {
    (arb_atom(), prop::collection::vec(arb_literal(), 1..=3))
}

/// Argument lists written with `_` (true) or `X` (false).
fn arb_anon_rules() -> impl Strategy<Value = Vec<Vec<bool>>> {
    prop::collection::vec(prop::collection::vec(any::<bool>(), 1..=4), 1..=5)
}

/// Edge lists over nodes `n0..n5`.
fn arb_edges() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0usize..6, 0usize..6), 1..=20)
}

fn adjacency_of(edges: &[(usize, usize)]) -> Adjacency {
    let mut adj = Adjacency::new();
    let mut seen = BTreeSet::new();
    for &(from, to) in edges {
        if seen.insert((from, to)) {
            adj.link(&format!("n{}", from), &format!("n{}", to));
        }
    }
    adj
}

fn substitute(atom: &Atom, values: &BTreeMap<Term, String>) -> String {
    if atom.terms.is_empty() {
        return atom.predicate.clone();
    }
    let args: Vec<&str> = atom.terms.iter().map(|t| values[t].as_str()).collect();
    format!("{}({})", atom.predicate, args.join(","))
}

// =============================================================================
// ANONYMOUS VARIABLES
// =============================================================================

proptest! {
    #[test]
    fn prop_anonymous_variables_are_unique(rules in arb_anon_rules()) {
        let source: String = rules
            .iter()
            .map(|args| {
                let args: Vec<&str> = args.iter().map(|&a| if a { "_" } else { "X" }).collect();
                format!("h(X) :- b(X,{}).\n", args.join(","))
            })
            .collect();
        let expected: usize = rules.iter().flatten().filter(|&&a| a).count();

        let mut ctx = CompileContext::new();
        let statements = parse_program(&source, &mut ctx).unwrap();
        let mut names = Vec::new();
        for stmt in &statements {
            if let Statement::Rule(rule) = stmt {
                for lit in &rule.body {
                    for term in &lit.atom.terms {
                        if term.is_anonymous() {
                            names.push(term.name().to_string());
                        }
                    }
                }
            }
        }
        let distinct: BTreeSet<&String> = names.iter().collect();
        prop_assert_eq!(names.len(), expected);
        prop_assert_eq!(distinct.len(), expected);
        prop_assert_eq!(ctx.anon_count(), expected);
    }
}

// =============================================================================
// RECIPE RECONSTRUCTION
// =============================================================================

proptest! {
    #[test]
    fn prop_recipe_rebuilds_rule_atoms(
        (head, body) in arb_rule(),
        index in 0usize..10,
        seed in prop::collection::vec("[0-9]{1,2}", 4),
    ) {
        let compiled = compile_rule(&head, &body, index);

        // A grounding: variables take values from `seed`, constants stay.
        let mut values: BTreeMap<Term, String> = BTreeMap::new();
        for (i, term) in compiled.aux_atom.terms.iter().enumerate() {
            let value = if term.is_var() {
                seed[i % seed.len()].clone()
            } else {
                term.name().to_string()
            };
            values.insert(term.clone(), value);
        }
        let firing: Vec<&str> = compiled.aux_atom.terms.iter().map(|t| values[t].as_str()).collect();

        prop_assert_eq!(compiled.recipe.len(), body.len() + 1);
        prop_assert_eq!(compiled.recipe[0].ground(&firing), Some(substitute(&head, &values)));
        for (step, lit) in compiled.recipe[1..].iter().zip(&body) {
            let expected = if lit.positive {
                substitute(&lit.atom, &values)
            } else {
                format!("not {}", substitute(&lit.atom, &values))
            };
            prop_assert_eq!(step.ground(&firing), Some(expected));
        }
    }

    #[test]
    fn prop_aux_atom_has_one_position_per_distinct_term((head, body) in arb_rule()) {
        let compiled = compile_rule(&head, &body, 0);
        let distinct: BTreeSet<&Term> = std::iter::once(&head)
            .chain(body.iter().map(|l| &l.atom))
            .flat_map(|a| a.terms.iter())
            .collect();
        prop_assert_eq!(compiled.aux_atom.arity(), distinct.len());
        for step in &compiled.recipe {
            for &pos in &step.positions {
                prop_assert!(pos < compiled.aux_atom.arity());
            }
        }
    }
}

// =============================================================================
// REPLAY IDEMPOTENCE
// =============================================================================

proptest! {
    #[test]
    fn prop_repeated_firings_change_nothing(
        pairs in prop::collection::vec((1u8..5, 1u8..5), 1..=8),
        repeat in prop::collection::vec(any::<prop::sample::Index>(), 0..=8),
    ) {
        let index = compiled(ANCESTOR).index;
        let firings: Vec<String> = pairs
            .iter()
            .map(|(a, b)| format!("aux_anc_0({},{})", a, b))
            .collect();
        let once = firings.join(" ");
        let mut twice = once.clone();
        for i in &repeat {
            twice.push(' ');
            twice.push_str(i.get::<String>(&firings));
        }
        prop_assert_eq!(build(&index, &once).unwrap(), build(&index, &twice).unwrap());
    }
}

// =============================================================================
// TRACE TERMINATION AND SOUNDNESS
// =============================================================================

proptest! {
    #[test]
    fn prop_trace_is_sound_and_complete(edges in arb_edges()) {
        let adj = adjacency_of(&edges);
        let root = format!("n{}", edges[0].1);
        let t = trace(&adj, &root).unwrap();

        prop_assert_eq!(&t.nodes, &backward_reachable(&adj, &root));
        prop_assert!(t.edges.is_disjoint(&t.back_edges));

        let all = t.all_edges();
        for (from, to) in &all {
            prop_assert!(t.nodes.contains(from) && t.nodes.contains(to));
            prop_assert!(adj.incoming(to).contains(from));
        }
        for node in &t.nodes {
            for producer in adj.incoming(node) {
                prop_assert!(all.contains(&(producer.clone(), node.clone())));
            }
        }
    }

    #[test]
    fn prop_tree_and_cross_edges_are_acyclic(edges in arb_edges()) {
        let adj = adjacency_of(&edges);
        let root = format!("n{}", edges[0].1);
        let t = trace(&adj, &root).unwrap();

        // Kahn's algorithm over the non-back edges must consume every node.
        let mut indegree: BTreeMap<&str, usize> = t.nodes.iter().map(|n| (n.as_str(), 0)).collect();
        for (_, to) in &t.edges {
            if let Some(d) = indegree.get_mut(to.as_str()) {
                *d += 1;
            }
        }
        let mut ready: Vec<&str> = indegree.iter().filter(|(_, &d)| d == 0).map(|(n, _)| *n).collect();
        let mut consumed = 0;
        while let Some(node) = ready.pop() {
            consumed += 1;
            for (from, to) in &t.edges {
                if from == node {
                    if let Some(d) = indegree.get_mut(to.as_str()) {
                        *d -= 1;
                        if *d == 0 {
                            ready.push(to.as_str());
                        }
                    }
                }
            }
        }
        prop_assert_eq!(consumed, t.nodes.len());
    }
}

// =============================================================================
// UNTRACE ROUND TRIP
// =============================================================================

proptest! {
    #[test]
    fn prop_untrace_restores_scene(
        pairs in prop::collection::vec((1u8..5, 1u8..5), 1..=6),
        pick in any::<prop::sample::Index>(),
        full in any::<bool>(),
    ) {
        let index = compiled(ANCESTOR).index;
        let output: Vec<String> = pairs
            .iter()
            .map(|(a, b)| format!("aux_anc_0({},{})", a, b))
            .collect();
        let prov = build(&index, &output.join(" ")).unwrap();
        let atoms: Vec<String> = prov.adjacency.atoms().map(str::to_string).collect();
        let atom = pick.get(&atoms).clone();

        let mut session = Session::new(prov, StyleSheet::default_sheet());
        session.set_style("anc", "nodes", "color", "blue").unwrap();
        let before: Scene = session.scene().clone();

        let mode = if full { TraceMode::Full } else { TraceMode::Partial };
        session.trace(&atom, mode, None).unwrap();
        prop_assert!(session.untrace());
        prop_assert_eq!(session.scene(), &before);
    }
}

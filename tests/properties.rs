use mtbdd_rs::ctl::{CtlChecker, CtlFormula, TransitionRelation};
use mtbdd_rs::mtbdd::Mtbdd;
use mtbdd_rs::reference::Ref;
use mtbdd_rs::snapshot::SnapshotFormat;
use mtbdd_rs::types::{assignment, Assignment};
use mtbdd_rs::value::Value;
use num_bigint::BigUint;
use test_log::test;

fn all_assignments(vars: &[&str]) -> Vec<Assignment> {
    (0..1u64 << vars.len())
        .map(|bits| {
            vars.iter()
                .enumerate()
                .map(|(i, v)| (v.to_string(), bits >> i & 1 == 1))
                .collect()
        })
        .collect()
}

fn same_function(mtbdd: &Mtbdd, f: Ref, g: Ref, vars: &[&str]) -> bool {
    all_assignments(vars)
        .iter()
        .all(|a| mtbdd.evaluate(f, a) == mtbdd.evaluate(g, a))
}

/// Small deterministic generator for pseudo-random formulas.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

fn random_formula(mtbdd: &Mtbdd, rng: &mut XorShift, vars: &[Ref], depth: u32) -> Ref {
    if depth == 0 || rng.below(4) == 0 {
        return vars[rng.below(vars.len() as u64) as usize];
    }
    let a = random_formula(mtbdd, rng, vars, depth - 1);
    let b = random_formula(mtbdd, rng, vars, depth - 1);
    match rng.below(5) {
        0 => mtbdd.and(a, b),
        1 => mtbdd.or(a, b),
        2 => mtbdd.xor(a, b),
        3 => mtbdd.implies(a, b),
        _ => mtbdd.not(a),
    }
}

fn setup(vars: &[&str]) -> (Mtbdd, Vec<Ref>) {
    let mtbdd = Mtbdd::new();
    mtbdd.declare(vars.iter().copied());
    let refs = vars.iter().map(|v| mtbdd.var(v).unwrap()).collect();
    (mtbdd, refs)
}

#[test]
fn hash_consing_terminals_and_nodes() {
    let (mtbdd, v) = setup(&["x", "y"]);
    assert_eq!(mtbdd.constant(42), mtbdd.constant(42));
    assert_eq!(mtbdd.constant("s"), mtbdd.terminal(Value::from("s")));
    assert_ne!(mtbdd.constant(1), mtbdd.constant(1.0));

    let a = mtbdd.mk_node("x", v[1], Ref::TRUE).unwrap();
    let b = mtbdd.mk_node("x", v[1], Ref::TRUE).unwrap();
    assert_eq!(a, b);

    let before = mtbdd.stats().nodes();
    assert_eq!(mtbdd.mk_node("x", v[1], v[1]).unwrap(), v[1]);
    assert_eq!(mtbdd.stats().nodes(), before);
}

#[test]
fn ite_base_laws() {
    let (mtbdd, v) = setup(&["c", "a", "b"]);
    let a = mtbdd.or(v[1], v[2]);
    let b = mtbdd.constant(7);
    assert_eq!(mtbdd.ite(Ref::TRUE, a, b), a);
    assert_eq!(mtbdd.ite(Ref::FALSE, a, b), b);
    assert_eq!(mtbdd.ite(v[0], a, a), a);
}

#[test]
fn boolean_laws_on_random_formulas() {
    let names = ["a", "b", "c", "d"];
    let (mtbdd, v) = setup(&names);
    let mut rng = XorShift(0x9e37_79b9_7f4a_7c15);
    for _ in 0..30 {
        let f = random_formula(&mtbdd, &mut rng, &v, 4);
        let g = random_formula(&mtbdd, &mut rng, &v, 4);

        let lhs = mtbdd.not(mtbdd.and(f, g));
        let rhs = mtbdd.or(mtbdd.not(f), mtbdd.not(g));
        assert_eq!(lhs, rhs);
        assert!(same_function(&mtbdd, lhs, rhs, &names));

        assert_eq!(mtbdd.xor(f, f), Ref::FALSE);
        assert_eq!(mtbdd.not(mtbdd.not(f)), f);
    }
}

#[test]
fn implies_and_equiv_truth_tables() {
    let (mtbdd, v) = setup(&["p", "q"]);
    let imp = mtbdd.implies(v[0], v[1]);
    let eqv = mtbdd.equiv(v[0], v[1]);
    for (p, q, i, e) in [
        (false, false, true, true),
        (false, true, true, false),
        (true, false, false, false),
        (true, true, true, true),
    ] {
        let a = assignment([("p", p), ("q", q)]);
        assert_eq!(mtbdd.evaluate(imp, &a), Value::Bool(i));
        assert_eq!(mtbdd.evaluate(eqv, &a), Value::Bool(e));
    }
}

#[test]
fn arithmetic_type_preservation() {
    let mtbdd = Mtbdd::new();
    let five = mtbdd.add(mtbdd.constant(2), mtbdd.constant(3));
    assert_eq!(mtbdd.terminal_value(five), Some(Value::Int(5)));
    let mixed = mtbdd.add(mtbdd.constant(2), mtbdd.constant(2.5));
    assert_eq!(mtbdd.terminal_value(mixed), Some(Value::Float(4.5)));
}

#[test]
fn quantification() {
    let names = ["x", "y"];
    let (mtbdd, v) = setup(&names);
    let (x, y) = (v[0], v[1]);
    assert_eq!(mtbdd.exists(mtbdd.and(x, y), &["x"]), y);
    assert_eq!(mtbdd.for_all(mtbdd.implies(x, y), &["x"]), y);

    let mut rng = XorShift(7);
    let (mtbdd, v) = setup(&["a", "b", "c"]);
    for _ in 0..20 {
        let f = random_formula(&mtbdd, &mut rng, &v, 4);
        assert_eq!(mtbdd.exists(f, &["a", "b"]), mtbdd.exists(f, &["b", "a"]));
        assert_eq!(mtbdd.for_all(f, &["c", "a"]), mtbdd.for_all(f, &["a", "c"]));
    }
}

#[test]
fn ctl_dualities() {
    let names = ["p", "q", "p_next", "q_next"];
    let (mtbdd, v) = setup(&names);
    let mut rng = XorShift(12345);
    let transition = random_formula(&mtbdd, &mut rng, &v, 5);
    let relation = TransitionRelation::new(&mtbdd, transition, ["p", "q"], ["p_next", "q_next"]).unwrap();
    let state_vars = &v[..2];
    for _ in 0..10 {
        let phi = random_formula(&mtbdd, &mut rng, state_vars, 3);
        let not_phi = mtbdd.not(phi);

        let ax = mtbdd.ax(phi, &relation).unwrap();
        let ex = mtbdd.ex(not_phi, &relation).unwrap();
        assert!(same_function(&mtbdd, ax, mtbdd.not(ex), &names));

        let af = mtbdd.af(phi, &relation).unwrap();
        let eg = mtbdd.eg(not_phi, &relation).unwrap();
        assert!(same_function(&mtbdd, af, mtbdd.not(eg), &names));

        let ag = mtbdd.ag(phi, &relation).unwrap();
        let ef = mtbdd.ef(not_phi, &relation).unwrap();
        assert!(same_function(&mtbdd, ag, mtbdd.not(ef), &names));
    }
}

#[test]
fn gc_safety() {
    let names = ["a", "b", "c", "d"];
    let (mtbdd, v) = setup(&names);
    let mut rng = XorShift(99);
    let root = random_formula(&mtbdd, &mut rng, &v, 6);
    let lin = mtbdd.linear_function([("a", 1), ("d", 4)], 0).unwrap();
    let root = mtbdd.add(lin, mtbdd.ite(root, mtbdd.constant(10), mtbdd.constant(0)));
    for _ in 0..10 {
        random_formula(&mtbdd, &mut rng, &v, 5);
    }
    let before: Vec<Value> = all_assignments(&names).iter().map(|a| mtbdd.evaluate(root, a)).collect();

    mtbdd.garbage_collect(&[root]);

    let after: Vec<Value> = all_assignments(&names).iter().map(|a| mtbdd.evaluate(root, a)).collect();
    assert_eq!(before, after);
    assert_eq!(mtbdd.stats().nodes(), mtbdd.shared_size(&[root, Ref::FALSE, Ref::TRUE]));
}

#[test]
fn serialization_round_trip() {
    let names = ["a", "b", "c"];
    let (mtbdd, v) = setup(&names);
    let mut rng = XorShift(2024);
    let f = random_formula(&mtbdd, &mut rng, &v, 5);
    let g = mtbdd.ite(f, mtbdd.constant("yes"), mtbdd.linear_function([("b", 2), ("c", 3)], 1).unwrap());

    for format in [SnapshotFormat::Binary, SnapshotFormat::Gzip, SnapshotFormat::Json] {
        let bytes = mtbdd.to_bytes(format).unwrap();
        let restored = Mtbdd::from_bytes(&bytes, format).unwrap();
        for a in all_assignments(&names) {
            assert_eq!(mtbdd.evaluate(f, &a), restored.evaluate(f, &a));
            assert_eq!(mtbdd.evaluate(g, &a), restored.evaluate(g, &a));
        }
    }
}

#[test]
fn reorder_preserves_functions() {
    let names = ["a", "b", "c", "d"];
    let (mtbdd, v) = setup(&names);
    let mut rng = XorShift(31337);
    let roots: Vec<Ref> = (0..5).map(|_| random_formula(&mtbdd, &mut rng, &v, 5)).collect();
    let before: Vec<Vec<Value>> = roots
        .iter()
        .map(|&f| all_assignments(&names).iter().map(|a| mtbdd.evaluate(f, a)).collect())
        .collect();

    mtbdd.set_order(&["c", "a", "d", "b"]).unwrap();

    for (&f, expected) in roots.iter().zip(&before) {
        let got: Vec<Value> = all_assignments(&names).iter().map(|a| mtbdd.evaluate(f, a)).collect();
        assert_eq!(&got, expected);
    }
}

#[test]
fn scenario_and_evaluation() {
    let (mtbdd, v) = setup(&["x", "y"]);
    let f = mtbdd.and(v[0], v[1]);
    assert_eq!(mtbdd.evaluate(f, &assignment([("x", true), ("y", true)])), Value::Bool(true));
    assert_eq!(mtbdd.evaluate(f, &assignment([("x", true), ("y", false)])), Value::Bool(false));
}

#[test]
fn scenario_restrict() {
    let (mtbdd, v) = setup(&["x", "y"]);
    let f = mtbdd.and(v[0], v[1]);
    assert_eq!(mtbdd.restrict(f, "x", true), v[1]);
}

#[test]
fn scenario_linear_function() {
    let mtbdd = Mtbdd::new();
    mtbdd.declare(["x", "y"]);
    let f = mtbdd.linear_function([("x", 2), ("y", 3)], 5).unwrap();
    assert_eq!(mtbdd.evaluate(f, &assignment([("x", true), ("y", false)])), Value::Int(7));
}

#[test]
fn scenario_count_sat_xor() {
    let (mtbdd, v) = setup(&["a", "b"]);
    let f = mtbdd.xor(v[0], v[1]);
    assert_eq!(mtbdd.count_sat(f), BigUint::from(2u32));
}

#[test]
fn scenario_ef_on_toggle() {
    let mtbdd = Mtbdd::new();
    mtbdd.declare(["x", "x_next"]);
    let x = mtbdd.var("x").unwrap();
    let x_next = mtbdd.var("x_next").unwrap();
    let transition = mtbdd.xor(x, x_next);
    let relation = TransitionRelation::new(&mtbdd, transition, ["x"], ["x_next"]).unwrap();

    let target = x;
    assert_eq!(mtbdd.ef(target, &relation).unwrap(), Ref::TRUE);

    let mut checker = CtlChecker::new(&mtbdd, relation, mtbdd.not(x));
    checker.add_label("on", x);
    let formula = CtlFormula::atom("on").ef().ag();
    assert!(checker.holds_initially(&formula).unwrap());
}

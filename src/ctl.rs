//! CTL (Computation Tree Logic) model checking.
//!
//! States are diagrams over the current-state variables; a transition
//! relation relates them to the next-state variables. All temporal operators
//! reduce to the preimage and the fixpoint solver:
//!
//! ```text
//! EX φ     = pre(φ)
//! EF φ     = μZ. φ ∨ EX Z
//! EG φ     = νZ. φ ∧ EX Z          (from φ)
//! E[φ U ψ] = μZ. ψ ∨ (φ ∧ EX Z)
//! AX φ     = ¬EX ¬φ
//! AF φ     = ¬EG ¬φ
//! AG φ     = ¬EF ¬φ
//! A[φ U ψ] = AF ψ ∧ ¬E[¬ψ U (¬φ ∧ ¬ψ)]
//! ```

use std::collections::BTreeMap;
use std::fmt;

use log::debug;

use crate::error::VariableError;
use crate::mtbdd::Mtbdd;
use crate::reference::Ref;

/// Transition relation over paired current/next variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRelation {
    transition: Ref,
    current: Vec<String>,
    next: Vec<String>,
}

impl TransitionRelation {
    /// Check that both variable lists are declared and pair up.
    pub fn new(
        mtbdd: &Mtbdd,
        transition: Ref,
        current: impl IntoIterator<Item = impl Into<String>>,
        next: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, VariableError> {
        let current: Vec<String> = current.into_iter().map(Into::into).collect();
        let next: Vec<String> = next.into_iter().map(Into::into).collect();
        if current.len() != next.len() {
            return Err(VariableError::MismatchedVariables {
                current: current.len(),
                next: next.len(),
            });
        }
        for name in current.iter().chain(&next) {
            if !mtbdd.is_declared(name) {
                return Err(VariableError::Undeclared(name.clone()));
            }
        }
        Ok(Self { transition, current, next })
    }

    pub fn transition(&self) -> Ref {
        self.transition
    }

    pub fn current(&self) -> &[String] {
        &self.current
    }

    pub fn next(&self) -> &[String] {
        &self.next
    }
}

// ==================================================================
// Temporal operators
// ==================================================================

impl Mtbdd {
    /// EX φ: states with at least one successor satisfying φ.
    pub fn ex(&self, phi: Ref, relation: &TransitionRelation) -> Result<Ref, VariableError> {
        debug!("EX(phi = {})", phi);
        self.preimage(phi, relation.transition, &relation.current, &relation.next)
    }

    /// EF φ: some path eventually reaches φ.
    pub fn ef(&self, phi: Ref, relation: &TransitionRelation) -> Result<Ref, VariableError> {
        debug!("EF(phi = {})", phi);
        let res = self.try_fixpoint(
            |z| {
                let ex_z = self.ex(z, relation)?;
                Ok(self.or(phi, ex_z))
            },
            Ref::FALSE,
        )?;
        Ok(res.value)
    }

    /// EG φ: some path stays in φ forever.
    pub fn eg(&self, phi: Ref, relation: &TransitionRelation) -> Result<Ref, VariableError> {
        debug!("EG(phi = {})", phi);
        let res = self.try_fixpoint(
            |z| {
                let ex_z = self.ex(z, relation)?;
                Ok(self.and(phi, ex_z))
            },
            phi,
        )?;
        Ok(res.value)
    }

    /// E[φ U ψ]: some path keeps φ until ψ holds.
    pub fn eu(&self, phi: Ref, psi: Ref, relation: &TransitionRelation) -> Result<Ref, VariableError> {
        debug!("EU(phi = {}, psi = {})", phi, psi);
        let res = self.try_fixpoint(
            |z| {
                let ex_z = self.ex(z, relation)?;
                let phi_and_ex_z = self.and(phi, ex_z);
                Ok(self.or(psi, phi_and_ex_z))
            },
            Ref::FALSE,
        )?;
        Ok(res.value)
    }

    /// AX φ: every successor satisfies φ.
    pub fn ax(&self, phi: Ref, relation: &TransitionRelation) -> Result<Ref, VariableError> {
        let not_phi = self.not(phi);
        let ex_not_phi = self.ex(not_phi, relation)?;
        Ok(self.not(ex_not_phi))
    }

    /// AF φ: every path eventually reaches φ.
    pub fn af(&self, phi: Ref, relation: &TransitionRelation) -> Result<Ref, VariableError> {
        let not_phi = self.not(phi);
        let eg_not_phi = self.eg(not_phi, relation)?;
        Ok(self.not(eg_not_phi))
    }

    /// AG φ: φ holds everywhere on every path.
    pub fn ag(&self, phi: Ref, relation: &TransitionRelation) -> Result<Ref, VariableError> {
        let not_phi = self.not(phi);
        let ef_not_phi = self.ef(not_phi, relation)?;
        Ok(self.not(ef_not_phi))
    }

    /// A[φ U ψ]: every path keeps φ until ψ holds.
    pub fn au(&self, phi: Ref, psi: Ref, relation: &TransitionRelation) -> Result<Ref, VariableError> {
        let af_psi = self.af(psi, relation)?;
        let not_phi = self.not(phi);
        let not_psi = self.not(psi);
        let neither = self.and(not_phi, not_psi);
        let bad = self.eu(not_psi, neither, relation)?;
        let not_bad = self.not(bad);
        Ok(self.and(af_psi, not_bad))
    }

    /// Successors of `states`, expressed over the current-state variables.
    pub fn successors(&self, states: Ref, relation: &TransitionRelation) -> Result<Ref, VariableError> {
        let image = self.image(states, relation.transition, &relation.current);
        let mapping: Vec<(&str, &str)> = relation
            .next
            .iter()
            .zip(&relation.current)
            .map(|(n, c)| (n.as_str(), c.as_str()))
            .collect();
        self.rename(image, &mapping)
    }

    /// States reachable from `initial` (including `initial` itself).
    pub fn reachable(&self, initial: Ref, relation: &TransitionRelation) -> Result<Ref, VariableError> {
        debug!("reachable(initial = {})", initial);
        let res = self.try_fixpoint(
            |z| {
                let post = self.successors(z, relation)?;
                Ok(self.or(initial, post))
            },
            initial,
        )?;
        Ok(res.value)
    }
}

// ==================================================================
// Formulas
// ==================================================================

/// CTL formula abstract syntax tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CtlFormula {
    /// Atomic proposition: a label, or else a current-state variable.
    Atom(String),
    True,
    False,
    Not(Box<CtlFormula>),
    And(Box<CtlFormula>, Box<CtlFormula>),
    Or(Box<CtlFormula>, Box<CtlFormula>),
    Implies(Box<CtlFormula>, Box<CtlFormula>),
    Iff(Box<CtlFormula>, Box<CtlFormula>),
    EX(Box<CtlFormula>),
    AX(Box<CtlFormula>),
    EF(Box<CtlFormula>),
    AF(Box<CtlFormula>),
    EG(Box<CtlFormula>),
    AG(Box<CtlFormula>),
    EU(Box<CtlFormula>, Box<CtlFormula>),
    AU(Box<CtlFormula>, Box<CtlFormula>),
}

impl CtlFormula {
    pub fn atom(s: impl Into<String>) -> Self {
        CtlFormula::Atom(s.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        CtlFormula::Not(Box::new(self))
    }

    pub fn and(self, other: Self) -> Self {
        CtlFormula::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Self) -> Self {
        CtlFormula::Or(Box::new(self), Box::new(other))
    }

    pub fn implies(self, other: Self) -> Self {
        CtlFormula::Implies(Box::new(self), Box::new(other))
    }

    pub fn iff(self, other: Self) -> Self {
        CtlFormula::Iff(Box::new(self), Box::new(other))
    }

    pub fn ex(self) -> Self {
        CtlFormula::EX(Box::new(self))
    }

    pub fn ax(self) -> Self {
        CtlFormula::AX(Box::new(self))
    }

    pub fn ef(self) -> Self {
        CtlFormula::EF(Box::new(self))
    }

    pub fn af(self) -> Self {
        CtlFormula::AF(Box::new(self))
    }

    pub fn eg(self) -> Self {
        CtlFormula::EG(Box::new(self))
    }

    pub fn ag(self) -> Self {
        CtlFormula::AG(Box::new(self))
    }

    pub fn eu(self, other: Self) -> Self {
        CtlFormula::EU(Box::new(self), Box::new(other))
    }

    pub fn au(self, other: Self) -> Self {
        CtlFormula::AU(Box::new(self), Box::new(other))
    }
}

impl fmt::Display for CtlFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CtlFormula::Atom(s) => write!(f, "{}", s),
            CtlFormula::True => write!(f, "true"),
            CtlFormula::False => write!(f, "false"),
            CtlFormula::Not(phi) => write!(f, "¬{}", phi),
            CtlFormula::And(phi, psi) => write!(f, "({} ∧ {})", phi, psi),
            CtlFormula::Or(phi, psi) => write!(f, "({} ∨ {})", phi, psi),
            CtlFormula::Implies(phi, psi) => write!(f, "({} → {})", phi, psi),
            CtlFormula::Iff(phi, psi) => write!(f, "({} ↔ {})", phi, psi),
            CtlFormula::EX(phi) => write!(f, "EX {}", phi),
            CtlFormula::AX(phi) => write!(f, "AX {}", phi),
            CtlFormula::EF(phi) => write!(f, "EF {}", phi),
            CtlFormula::AF(phi) => write!(f, "AF {}", phi),
            CtlFormula::EG(phi) => write!(f, "EG {}", phi),
            CtlFormula::AG(phi) => write!(f, "AG {}", phi),
            CtlFormula::EU(phi, psi) => write!(f, "E[{} U {}]", phi, psi),
            CtlFormula::AU(phi, psi) => write!(f, "A[{} U {}]", phi, psi),
        }
    }
}

/// Evaluates [`CtlFormula`]s over one transition system.
pub struct CtlChecker<'a> {
    mtbdd: &'a Mtbdd,
    relation: TransitionRelation,
    initial: Ref,
    labels: BTreeMap<String, Ref>,
}

impl<'a> CtlChecker<'a> {
    pub fn new(mtbdd: &'a Mtbdd, relation: TransitionRelation, initial: Ref) -> Self {
        Self {
            mtbdd,
            relation,
            initial,
            labels: BTreeMap::new(),
        }
    }

    pub fn mtbdd(&self) -> &Mtbdd {
        self.mtbdd
    }

    pub fn relation(&self) -> &TransitionRelation {
        &self.relation
    }

    pub fn initial(&self) -> Ref {
        self.initial
    }

    /// Name a set of states for use as an atomic proposition.
    pub fn add_label(&mut self, name: impl Into<String>, states: Ref) {
        self.labels.insert(name.into(), states);
    }

    pub fn label(&self, name: &str) -> Option<Ref> {
        self.labels.get(name).copied()
    }

    /// States satisfying `formula`.
    pub fn check(&self, formula: &CtlFormula) -> Result<Ref, VariableError> {
        let m = self.mtbdd;
        let rel = &self.relation;
        let res = match formula {
            CtlFormula::Atom(p) => match self.label(p) {
                Some(states) => states,
                None if rel.current.iter().any(|c| c == p) => m.var(p)?,
                None => {
                    debug!("check: unknown atom `{}` is false", p);
                    Ref::FALSE
                }
            },
            CtlFormula::True => Ref::TRUE,
            CtlFormula::False => Ref::FALSE,
            CtlFormula::Not(phi) => m.not(self.check(phi)?),
            CtlFormula::And(phi, psi) => m.and(self.check(phi)?, self.check(psi)?),
            CtlFormula::Or(phi, psi) => m.or(self.check(phi)?, self.check(psi)?),
            CtlFormula::Implies(phi, psi) => m.implies(self.check(phi)?, self.check(psi)?),
            CtlFormula::Iff(phi, psi) => m.equiv(self.check(phi)?, self.check(psi)?),
            CtlFormula::EX(phi) => m.ex(self.check(phi)?, rel)?,
            CtlFormula::AX(phi) => m.ax(self.check(phi)?, rel)?,
            CtlFormula::EF(phi) => m.ef(self.check(phi)?, rel)?,
            CtlFormula::AF(phi) => m.af(self.check(phi)?, rel)?,
            CtlFormula::EG(phi) => m.eg(self.check(phi)?, rel)?,
            CtlFormula::AG(phi) => m.ag(self.check(phi)?, rel)?,
            CtlFormula::EU(phi, psi) => m.eu(self.check(phi)?, self.check(psi)?, rel)?,
            CtlFormula::AU(phi, psi) => m.au(self.check(phi)?, self.check(psi)?, rel)?,
        };
        debug!("check({}) = {}", formula, res);
        Ok(res)
    }

    /// Whether every initial state satisfies `formula`.
    pub fn holds_initially(&self, formula: &CtlFormula) -> Result<bool, VariableError> {
        let sat = self.check(formula)?;
        let not_sat = self.mtbdd.not(sat);
        let violation = self.mtbdd.and(self.initial, not_sat);
        Ok(violation == Ref::FALSE)
    }

    /// States where `formula` does not hold.
    pub fn violations(&self, formula: &CtlFormula) -> Result<Ref, VariableError> {
        let sat = self.check(formula)?;
        Ok(self.mtbdd.not(sat))
    }
}

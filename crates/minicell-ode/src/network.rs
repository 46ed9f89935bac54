//! Continuous reaction network declaration and compilation.

use std::fmt;

use indexmap::IndexMap;
use minicell_core::DefinitionError;

use crate::expr::{self, Expr};
use crate::parameter::{Parameter, ParameterScope, ParameterValue};
use crate::template::RateForm;

/// A species tracked as a concentration (mM).
#[derive(Clone, Debug, PartialEq)]
pub struct Metabolite {
    /// Unique key, shared with the discrete species of the same name.
    pub id: String,
    /// Descriptive name.
    pub name: String,
    /// Concentration at the start of integration.
    pub initial: f64,
}

/// What a substrate or product placeholder is bound to.
#[derive(Clone, Debug, PartialEq)]
pub enum BindingTarget {
    /// A metabolite key, or the name of an explicit parameter holding a
    /// buffered species.
    Metabolite(String),
    /// A constant.
    Literal(f64),
}

impl From<&str> for BindingTarget {
    fn from(key: &str) -> Self {
        Self::Metabolite(key.to_string())
    }
}

impl From<String> for BindingTarget {
    fn from(key: String) -> Self {
        Self::Metabolite(key)
    }
}

impl From<f64> for BindingTarget {
    fn from(v: f64) -> Self {
        Self::Literal(v)
    }
}

impl fmt::Display for BindingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metabolite(key) => write!(f, "{key}"),
            Self::Literal(v) => write!(f, "{v}"),
        }
    }
}

/// A reaction of the continuous network.
#[derive(Clone, Debug, PartialEq)]
pub struct ContinuousReaction {
    /// Unique id.
    pub id: String,
    /// Descriptive name.
    pub name: String,
    /// Id of the bound rate form.
    pub rate_form: String,
    /// Substrate placeholder bindings.
    pub substrates: IndexMap<String, BindingTarget>,
    /// Product placeholder bindings.
    pub products: IndexMap<String, BindingTarget>,
    /// Reaction-specific parameters, keyed by placeholder.
    pub parameters: IndexMap<String, Parameter>,
    /// Explicit stoichiometry overrides, keyed by metabolite.
    pub stoichiometry: IndexMap<String, f64>,
}

impl ContinuousReaction {
    /// Net stoichiometry of `metabolite` in this reaction.
    ///
    /// An explicit override wins; otherwise product occurrences minus
    /// substrate occurrences.
    pub fn stoichiometry_of(&self, metabolite: &str) -> f64 {
        if let Some(&s) = self.stoichiometry.get(metabolite) {
            return s;
        }
        let occurrences = |side: &IndexMap<String, BindingTarget>| {
            side.values()
                .filter(|t| matches!(t, BindingTarget::Metabolite(k) if k == metabolite))
                .count() as f64
        };
        occurrences(&self.products) - occurrences(&self.substrates)
    }

    fn bound_metabolites(&self) -> impl Iterator<Item = &str> {
        self.substrates
            .values()
            .chain(self.products.values())
            .filter_map(|t| match t {
                BindingTarget::Metabolite(k) => Some(k.as_str()),
                BindingTarget::Literal(_) => None,
            })
    }
}

/// A declared continuous reaction network.
///
/// Declarations are validated eagerly where possible; cross references
/// that may be satisfied by later declarations (a binding to an explicit
/// parameter, say) are checked by [`compile`](Self::compile).
#[derive(Clone, Debug, Default)]
pub struct ContinuousNetwork {
    metabolites: IndexMap<String, Metabolite>,
    rate_forms: IndexMap<String, RateForm>,
    reactions: IndexMap<String, ContinuousReaction>,
    explicit: IndexMap<String, Parameter>,
    global: IndexMap<String, Parameter>,
}

impl ContinuousNetwork {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a metabolite, replacing any previous declaration.
    pub fn declare_metabolite(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        initial: f64,
    ) -> Result<(), DefinitionError> {
        let id = id.into();
        if !(initial.is_finite() && initial >= 0.0) {
            return Err(DefinitionError::InvalidInitialValue {
                metabolite: id,
                value: initial,
            });
        }
        let name = name.into();
        self.metabolites.insert(
            id.clone(),
            Metabolite {
                id,
                name,
                initial,
            },
        );
        Ok(())
    }

    /// Declare (or replace) a rate form.
    pub fn declare_rate_form(
        &mut self,
        id: impl Into<String>,
        template: impl Into<String>,
    ) -> Result<(), DefinitionError> {
        let rate_form = RateForm::new(id, template)?;
        self.rate_forms.insert(rate_form.id().to_string(), rate_form);
        Ok(())
    }

    /// Declare a reaction bound to an existing rate form.
    pub fn declare_reaction(
        &mut self,
        id: impl Into<String>,
        rate_form: &str,
        name: impl Into<String>,
    ) -> Result<(), DefinitionError> {
        let id = id.into();
        if self.reactions.contains_key(&id) {
            return Err(DefinitionError::DuplicateReaction { reaction: id });
        }
        if !self.rate_forms.contains_key(rate_form) {
            return Err(DefinitionError::UnknownRateForm {
                reaction: id,
                rate_form: rate_form.to_string(),
            });
        }
        self.reactions.insert(
            id.clone(),
            ContinuousReaction {
                id,
                name: name.into(),
                rate_form: rate_form.to_string(),
                substrates: IndexMap::new(),
                products: IndexMap::new(),
                parameters: IndexMap::new(),
                stoichiometry: IndexMap::new(),
            },
        );
        Ok(())
    }

    fn reaction_mut(&mut self, id: &str) -> Result<&mut ContinuousReaction, DefinitionError> {
        self.reactions
            .get_mut(id)
            .ok_or_else(|| DefinitionError::UnknownReaction {
                reaction: id.to_string(),
            })
    }

    /// Bind a substrate placeholder. A non-zero `stoichiometry` becomes an
    /// explicit override for the bound metabolite.
    pub fn bind_substrate(
        &mut self,
        reaction: &str,
        placeholder: impl Into<String>,
        target: impl Into<BindingTarget>,
        stoichiometry: f64,
    ) -> Result<(), DefinitionError> {
        let rxn = self.reaction_mut(reaction)?;
        let target = target.into();
        set_override(rxn, &target, stoichiometry);
        rxn.substrates.insert(placeholder.into(), target);
        Ok(())
    }

    /// Bind a product placeholder. A non-zero `stoichiometry` becomes an
    /// explicit override for the bound metabolite.
    pub fn bind_product(
        &mut self,
        reaction: &str,
        placeholder: impl Into<String>,
        target: impl Into<BindingTarget>,
        stoichiometry: f64,
    ) -> Result<(), DefinitionError> {
        let rxn = self.reaction_mut(reaction)?;
        let target = target.into();
        set_override(rxn, &target, stoichiometry);
        rxn.products.insert(placeholder.into(), target);
        Ok(())
    }

    /// Store a parameter in the given pool, replacing one with the same key.
    pub fn declare_parameter(
        &mut self,
        scope: ParameterScope,
        parameter: Parameter,
    ) -> Result<(), DefinitionError> {
        match scope {
            ParameterScope::Reaction(id) => {
                let rxn = self.reaction_mut(&id)?;
                rxn.parameters.insert(parameter.key.clone(), parameter);
            }
            ParameterScope::Explicit => {
                self.explicit.insert(parameter.key.clone(), parameter);
            }
            ParameterScope::Global => {
                self.global.insert(parameter.key.clone(), parameter);
            }
        }
        Ok(())
    }

    /// A declared metabolite.
    pub fn metabolite(&self, id: &str) -> Option<&Metabolite> {
        self.metabolites.get(id)
    }

    /// Metabolites in declaration order.
    pub fn metabolites(&self) -> impl Iterator<Item = &Metabolite> {
        self.metabolites.values()
    }

    /// A declared reaction.
    pub fn reaction(&self, id: &str) -> Option<&ContinuousReaction> {
        self.reactions.get(id)
    }

    /// Reactions in declaration order.
    pub fn reactions(&self) -> impl Iterator<Item = &ContinuousReaction> {
        self.reactions.values()
    }

    /// A declared rate form.
    pub fn rate_form(&self, id: &str) -> Option<&RateForm> {
        self.rate_forms.get(id)
    }

    /// An explicit parameter.
    pub fn explicit_parameter(&self, key: &str) -> Option<&Parameter> {
        self.explicit.get(key)
    }

    /// A reserved global parameter.
    pub fn global_parameter(&self, key: &str) -> Option<&Parameter> {
        self.global.get(key)
    }

    /// Resolve a bare name to what it stands for.
    ///
    /// Metabolites stay symbolic. Explicit parameters are followed until a
    /// number or a metabolite is reached; a chain longer than the number
    /// of explicit parameters must contain a cycle.
    fn resolve_name(&self, reaction: &str, name: &str) -> Result<Symbol, DefinitionError> {
        let mut current = name;
        for _ in 0..=self.explicit.len() {
            if self.metabolites.contains_key(current) {
                return Ok(Symbol::Metabolite(current.to_string()));
            }
            match self.explicit.get(current).map(|p| &p.value) {
                Some(ParameterValue::Number(v)) => return Ok(Symbol::Constant(*v)),
                Some(ParameterValue::Reference(next)) => current = next.as_str(),
                None => break,
            }
        }
        Err(DefinitionError::UnresolvedReference {
            reaction: reaction.to_string(),
            reference: current.to_string(),
        })
    }

    fn resolve_value(value: &ParameterValue) -> String {
        match value {
            ParameterValue::Number(v) => literal(*v),
            ParameterValue::Reference(name) => name.clone(),
        }
    }

    fn resolve_target(target: &BindingTarget) -> String {
        match target {
            BindingTarget::Literal(v) => literal(*v),
            BindingTarget::Metabolite(key) => key.clone(),
        }
    }

    /// Resolve one placeholder to the text that replaces it: reaction
    /// parameter, then substrate, then product, then explicit parameter.
    fn resolve_placeholder(
        &self,
        rxn: &ContinuousReaction,
        placeholder: &str,
    ) -> Result<String, DefinitionError> {
        if let Some(p) = rxn.parameters.get(placeholder) {
            return Ok(Self::resolve_value(&p.value));
        }
        if let Some(t) = rxn.substrates.get(placeholder) {
            return Ok(Self::resolve_target(t));
        }
        if let Some(t) = rxn.products.get(placeholder) {
            return Ok(Self::resolve_target(t));
        }
        if let Some(p) = self.explicit.get(placeholder) {
            return Ok(Self::resolve_value(&p.value));
        }
        Err(DefinitionError::UnresolvedPlaceholder {
            reaction: rxn.id.clone(),
            placeholder: placeholder.to_string(),
        })
    }

    /// Resolve every reaction against the declared metabolites and
    /// parameters.
    ///
    /// Fails before producing anything if a binding names an unknown
    /// metabolite or a placeholder cannot be resolved.
    pub fn compile(&self) -> Result<CompiledNetwork, DefinitionError> {
        for rxn in self.reactions.values() {
            for key in rxn.bound_metabolites() {
                if !self.metabolites.contains_key(key) && !self.explicit.contains_key(key) {
                    return Err(DefinitionError::UnknownMetabolite {
                        reaction: rxn.id.clone(),
                        metabolite: key.to_string(),
                    });
                }
            }
        }

        let mut metabolite_reactions: IndexMap<String, Vec<(usize, f64)>> = self
            .metabolites
            .keys()
            .map(|k| (k.clone(), Vec::new()))
            .collect();
        let mut reactions = Vec::with_capacity(self.reactions.len());

        for (idx, rxn) in self.reactions.values().enumerate() {
            let rate_form =
                self.rate_forms
                    .get(&rxn.rate_form)
                    .ok_or_else(|| DefinitionError::UnknownRateForm {
                        reaction: rxn.id.clone(),
                        rate_form: rxn.rate_form.clone(),
                    })?;

            let mut resolved: IndexMap<&str, String> = IndexMap::new();
            for ph in rate_form.placeholders() {
                resolved.insert(ph.as_str(), self.resolve_placeholder(rxn, ph)?);
            }

            let compiled_rate_form = rate_form.substitute(|ph| {
                resolved
                    .get(ph)
                    .cloned()
                    .unwrap_or_else(|| format!("${ph}"))
            });
            let parsed = expr::parse(&compiled_rate_form).map_err(|e| {
                DefinitionError::InvalidTemplate {
                    rate_form: rxn.rate_form.clone(),
                    reason: format!("reaction {}: {e}", rxn.id),
                }
            })?;
            let symbols = expr::identifiers(&compiled_rate_form)
                .into_iter()
                .map(|name| {
                    let symbol = self.resolve_name(&rxn.id, &name)?;
                    Ok((name, symbol))
                })
                .collect::<Result<IndexMap<_, _>, DefinitionError>>()?;

            let mut seen: Vec<&str> = Vec::new();
            for key in rxn.bound_metabolites() {
                if seen.contains(&key) {
                    continue;
                }
                seen.push(key);
                if let Some(list) = metabolite_reactions.get_mut(key) {
                    list.push((idx, rxn.stoichiometry_of(key)));
                }
            }

            reactions.push(CompiledReaction {
                id: rxn.id.clone(),
                compiled_rate_form,
                expr: parsed,
                symbols,
            });
        }

        Ok(CompiledNetwork {
            initial: self
                .metabolites
                .values()
                .map(|m| (m.id.clone(), m.initial))
                .collect(),
            reactions,
            metabolite_reactions,
        })
    }
}

/// Text of a numeric literal; negatives are parenthesized so they can
/// follow any operator.
fn literal(v: f64) -> String {
    if v.is_sign_negative() {
        format!("({v})")
    } else {
        v.to_string()
    }
}

fn set_override(rxn: &mut ContinuousReaction, target: &BindingTarget, stoichiometry: f64) {
    if stoichiometry != 0.0 {
        if let BindingTarget::Metabolite(key) = target {
            rxn.stoichiometry.insert(key.clone(), stoichiometry);
        }
    }
}

impl fmt::Display for ContinuousNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Metabolites")?;
        for m in self.metabolites.values() {
            writeln!(f, "metabolite {}: {}", m.id, m.initial)?;
        }
        writeln!(f, "# Reactions")?;
        for r in self.reactions.values() {
            let join = |side: &IndexMap<String, BindingTarget>| {
                side.values()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" + ")
            };
            writeln!(
                f,
                "{}, {}, {} -> {}",
                r.id,
                r.rate_form,
                join(&r.substrates),
                join(&r.products)
            )?;
        }
        writeln!(f, "# Explicit Parameters")?;
        for p in self.explicit.values() {
            writeln!(f, "parameter {}: {}", p.key, p.value)?;
        }
        writeln!(f, "# Rate Forms")?;
        for rf in self.rate_forms.values() {
            writeln!(f, "{rf}")?;
        }
        Ok(())
    }
}

/// What a bare name in a compiled rate law stands for.
#[derive(Clone, Debug, PartialEq)]
pub enum Symbol {
    /// The live concentration of a metabolite, by key.
    Metabolite(String),
    /// A constant, e.g. a buffered species held in an explicit parameter.
    Constant(f64),
}

/// A reaction with every placeholder resolved.
#[derive(Clone, Debug)]
pub struct CompiledReaction {
    /// Reaction id.
    pub id: String,
    /// Template text with placeholders substituted.
    pub compiled_rate_form: String,
    /// The compiled text, parsed.
    pub expr: Expr,
    /// Every bare name of the compiled text and what it resolved to.
    pub symbols: IndexMap<String, Symbol>,
}

impl CompiledReaction {
    /// Evaluate the rate with `concentration` supplying metabolite values.
    pub fn rate(&self, concentration: impl Fn(&str) -> Option<f64>) -> f64 {
        expr::eval(&self.expr, |name| match self.symbols.get(name)? {
            Symbol::Metabolite(key) => concentration(key),
            Symbol::Constant(v) => Some(*v),
        })
    }

    /// Distinct metabolites the rate law reads.
    pub fn metabolites(&self) -> impl Iterator<Item = &str> {
        let mut seen: Vec<&str> = Vec::new();
        self.symbols.values().filter_map(move |s| match s {
            Symbol::Metabolite(key) if !seen.contains(&key.as_str()) => {
                seen.push(key.as_str());
                Some(key.as_str())
            }
            _ => None,
        })
    }
}

/// Output of [`ContinuousNetwork::compile`].
#[derive(Clone, Debug)]
pub struct CompiledNetwork {
    initial: IndexMap<String, f64>,
    reactions: Vec<CompiledReaction>,
    metabolite_reactions: IndexMap<String, Vec<(usize, f64)>>,
}

impl CompiledNetwork {
    /// Metabolite keys in state-vector order.
    pub fn metabolite_keys(&self) -> impl Iterator<Item = &str> {
        self.initial.keys().map(String::as_str)
    }

    /// Number of metabolites.
    pub fn metabolite_count(&self) -> usize {
        self.initial.len()
    }

    /// Position of a metabolite in the state vector.
    pub fn slot_of(&self, key: &str) -> Option<usize> {
        self.initial.get_index_of(key)
    }

    /// Initial state vector.
    pub fn initial_state(&self) -> Vec<f64> {
        self.initial.values().copied().collect()
    }

    /// Compiled reactions in declaration order.
    pub fn reactions(&self) -> &[CompiledReaction] {
        &self.reactions
    }

    /// `(reaction index, signed stoichiometry)` pairs touching a metabolite.
    /// Each reaction appears at most once.
    pub fn reactions_of(&self, key: &str) -> &[(usize, f64)] {
        self.metabolite_reactions
            .get(key)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Per-metabolite reaction lists in state-vector order.
    pub fn metabolite_reactions(&self) -> &IndexMap<String, Vec<(usize, f64)>> {
        &self.metabolite_reactions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_law;

    fn enzyme_net() -> ContinuousNetwork {
        let mut net = ContinuousNetwork::new();
        net.declare_metabolite("S", "substrate", 1.0).unwrap();
        net.declare_metabolite("P", "product", 0.0).unwrap();
        net.declare_rate_form("enz11", rate_law::enzymatic(1, 1)).unwrap();
        net.declare_reaction("R1", "enz11", "S to P").unwrap();
        net.bind_substrate("R1", "Sub1", "S", 0.0).unwrap();
        net.bind_product("R1", "Prod1", "P", 0.0).unwrap();
        for (key, v) in [
            ("KmSub1", 1.0),
            ("KmProd1", 1.0),
            ("kcatF", 10.0),
            ("kcatR", 0.0),
            ("Enzyme", 1.0),
            ("onoff", 1.0),
        ] {
            net.declare_parameter(ParameterScope::Reaction("R1".into()), Parameter::new(key, v))
                .unwrap();
        }
        net
    }

    #[test]
    fn declaration_errors() {
        let mut net = enzyme_net();
        assert!(matches!(
            net.declare_reaction("R1", "enz11", ""),
            Err(DefinitionError::DuplicateReaction { .. })
        ));
        assert!(matches!(
            net.declare_reaction("R2", "nope", ""),
            Err(DefinitionError::UnknownRateForm { .. })
        ));
        assert!(matches!(
            net.bind_substrate("R9", "Sub1", "S", 0.0),
            Err(DefinitionError::UnknownReaction { .. })
        ));
        assert!(matches!(
            net.declare_parameter(ParameterScope::Reaction("R9".into()), Parameter::new("k", 1.0)),
            Err(DefinitionError::UnknownReaction { .. })
        ));
        assert!(matches!(
            net.declare_metabolite("X", "", f64::NAN),
            Err(DefinitionError::InvalidInitialValue { .. })
        ));
        assert!(matches!(
            net.declare_rate_form("bad", "$a +"),
            Err(DefinitionError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn compile_substitutes_placeholders() {
        let compiled = enzyme_net().compile().unwrap();
        let r = &compiled.reactions()[0];
        assert!(r.compiled_rate_form.starts_with("1 * 1 * ( ( 10 * ( S / 1 )"));
        assert!(!r.compiled_rate_form.contains('$'));

        let v = r.rate(|k| match k {
            "S" => Some(1.0),
            "P" => Some(0.0),
            _ => None,
        });
        assert!((v - 5.0).abs() < 1e-12);
    }

    #[test]
    fn stoichiometry_defaults_and_overrides() {
        let net = enzyme_net();
        let compiled = net.compile().unwrap();
        assert_eq!(compiled.reactions_of("S"), &[(0, -1.0)]);
        assert_eq!(compiled.reactions_of("P"), &[(0, 1.0)]);

        let mut net = net;
        net.bind_product("R1", "Prod1", "P", 2.0).unwrap();
        let compiled = net.compile().unwrap();
        assert_eq!(compiled.reactions_of("P"), &[(0, 2.0)]);
    }

    #[test]
    fn metabolite_bound_twice_is_listed_once() {
        let mut net = ContinuousNetwork::new();
        net.declare_metabolite("A", "", 1.0).unwrap();
        net.declare_metabolite("B", "", 0.0).unwrap();
        net.declare_rate_form("mass2", "$k * $S1 * $S2").unwrap();
        net.declare_reaction("dimer", "mass2", "").unwrap();
        net.bind_substrate("dimer", "S1", "A", 0.0).unwrap();
        net.bind_substrate("dimer", "S2", "A", 0.0).unwrap();
        net.bind_product("dimer", "P1", "B", 0.0).unwrap();
        net.declare_parameter(ParameterScope::Explicit, Parameter::new("k", 0.5))
            .unwrap();
        let compiled = net.compile().unwrap();
        assert_eq!(compiled.reactions_of("A"), &[(0, -2.0)]);
        assert_eq!(compiled.reactions_of("B"), &[(0, 1.0)]);
    }

    #[test]
    fn placeholder_priority() {
        let mut net = enzyme_net();
        // explicit parameter loses to the reaction parameter of the same key
        net.declare_parameter(ParameterScope::Explicit, Parameter::new("kcatF", 99.0))
            .unwrap();
        // global parameters never resolve placeholders
        net.declare_parameter(ParameterScope::Global, Parameter::new("missing", 1.0))
            .unwrap();
        let compiled = net.compile().unwrap();
        assert!(compiled.reactions()[0].compiled_rate_form.contains("10 *"));
        assert!(net.global_parameter("missing").is_some());
    }

    #[test]
    fn unresolved_placeholder_names_reaction() {
        let mut net = ContinuousNetwork::new();
        net.declare_metabolite("A", "", 1.0).unwrap();
        net.declare_rate_form("z", rate_law::zero_order_on_off()).unwrap();
        net.declare_reaction("R", "z", "").unwrap();
        net.declare_parameter(ParameterScope::Reaction("R".into()), Parameter::new("onoff", 1.0))
            .unwrap();
        match net.compile() {
            Err(DefinitionError::UnresolvedPlaceholder {
                reaction,
                placeholder,
            }) => {
                assert_eq!(reaction, "R");
                assert_eq!(placeholder, "K");
            }
            other => panic!("expected unresolved placeholder, got {other:?}"),
        }
    }

    #[test]
    fn unknown_metabolite_binding_fails() {
        let mut net = enzyme_net();
        net.bind_substrate("R1", "Sub1", "ghost", 0.0).unwrap();
        assert!(matches!(
            net.compile(),
            Err(DefinitionError::UnknownMetabolite { metabolite, .. }) if metabolite == "ghost"
        ));
    }

    #[test]
    fn buffered_species_resolve_through_explicit_parameters() {
        let mut net = enzyme_net();
        net.declare_parameter(ParameterScope::Explicit, Parameter::new("M_glc_e", 5.0))
            .unwrap();
        net.bind_substrate("R1", "Sub1", "M_glc_e", 0.0).unwrap();
        let compiled = net.compile().unwrap();
        // symbolic in the text, numeric in the expression
        let r = &compiled.reactions()[0];
        assert!(r.compiled_rate_form.contains("M_glc_e"));
        assert_eq!(r.symbols.get("M_glc_e"), Some(&Symbol::Constant(5.0)));
        assert!(!r.metabolites().any(|k| k == "M_glc_e"));
        // buffered species get no derivative row
        assert!(compiled.reactions_of("M_glc_e").is_empty());
        assert_eq!(compiled.reactions_of("S"), &[] as &[(usize, f64)]);
    }

    #[test]
    fn references_follow_explicit_chain_and_detect_cycles() {
        let mut net = enzyme_net();
        net.declare_parameter(ParameterScope::Explicit, Parameter::new("E_total", "E_alias"))
            .unwrap();
        net.declare_parameter(ParameterScope::Explicit, Parameter::new("E_alias", 2.0))
            .unwrap();
        net.declare_parameter(ParameterScope::Reaction("R1".into()), Parameter::new("Enzyme", "E_total"))
            .unwrap();
        let compiled = net.compile().unwrap();
        let v = compiled.reactions()[0].rate(|k| match k {
            "S" => Some(1.0),
            "P" => Some(0.0),
            _ => None,
        });
        assert!((v - 10.0).abs() < 1e-12);

        net.declare_parameter(ParameterScope::Explicit, Parameter::new("E_alias", "E_total"))
            .unwrap();
        assert!(matches!(
            net.compile(),
            Err(DefinitionError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn metabolite_reference_stays_symbolic() {
        let mut net = enzyme_net();
        net.declare_metabolite("E", "enzyme", 3.0).unwrap();
        net.declare_parameter(ParameterScope::Reaction("R1".into()), Parameter::new("Enzyme", "E"))
            .unwrap();
        let compiled = net.compile().unwrap();
        let r = &compiled.reactions()[0];
        assert_eq!(r.symbols.get("E"), Some(&Symbol::Metabolite("E".into())));
        assert!(r.metabolites().any(|k| k == "E"));
        assert!(compiled.reactions_of("E").is_empty());
    }

    #[test]
    fn negative_literals_stay_well_formed() {
        let mut net = ContinuousNetwork::new();
        net.declare_metabolite("A", "", 2.0).unwrap();
        net.declare_rate_form("power", "$S ^ $n").unwrap();
        net.declare_reaction("R", "power", "").unwrap();
        net.bind_substrate("R", "S", "A", 0.0).unwrap();
        net.declare_parameter(ParameterScope::Reaction("R".into()), Parameter::new("n", -1.0))
            .unwrap();
        let compiled = net.compile().unwrap();
        let r = &compiled.reactions()[0];
        assert_eq!(r.compiled_rate_form, "A ^ (-1)");
        assert_eq!(r.rate(|k| (k == "A").then_some(2.0)), 0.5);
    }

    #[test]
    fn display_lists_sections() {
        let text = enzyme_net().to_string();
        assert!(text.contains("metabolite S: 1"));
        assert!(text.contains("R1, enz11, S -> P"));
        assert!(text.contains("# Rate Forms"));
    }
}

//! Building the continuous network from live species counts.
//!
//! At every communication step a [`NetworkAssembler`] produces a fresh
//! [`ContinuousNetwork`] whose initial concentrations come from the
//! current discrete counts. [`ContinuousModel`] is the plain-data
//! assembler handed over by model construction; custom assemblers can be
//! written against [`BindContext`] directly.

use indexmap::IndexMap;
use minicell_core::{part_to_mm, DefinitionError, NumericError, SimError, SpeciesReader};
use minicell_ode::{BindingTarget, ContinuousNetwork, Parameter, ParameterScope, ParameterValue};

/// Read access to the species store at one communication boundary, with
/// count → concentration conversion at the current volume.
pub struct BindContext<'a> {
    species: &'a dyn SpeciesReader,
    volume_litres: f64,
    time: f64,
}

impl<'a> BindContext<'a> {
    /// Wrap a store at a given volume and simulated time.
    pub fn new(species: &'a dyn SpeciesReader, volume_litres: f64, time: f64) -> Self {
        Self {
            species,
            volume_litres,
            time,
        }
    }

    /// The underlying store.
    pub fn species(&self) -> &'a dyn SpeciesReader {
        self.species
    }

    /// Volume used for conversion, in litres.
    pub fn volume_litres(&self) -> f64 {
        self.volume_litres
    }

    /// Simulated time of the boundary.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Particle count of a declared species.
    pub fn count(&self, key: &str) -> Result<i64, SimError> {
        self.species.count(key).ok_or_else(|| {
            DefinitionError::UndeclaredSpecies {
                species: key.to_string(),
            }
            .into()
        })
    }

    /// Convert an arbitrary particle number to mM.
    pub fn to_concentration(&self, species: &str, particles: f64) -> Result<f64, SimError> {
        part_to_mm(particles, self.volume_litres).map_err(|e| {
            NumericError::NonFiniteConversion {
                species: species.to_string(),
                value: e.value,
                volume_litres: e.volume_litres,
                time: self.time,
            }
            .into()
        })
    }

    /// Current concentration of a species, in mM.
    pub fn concentration(&self, key: &str) -> Result<f64, SimError> {
        let n = self.count(key)?;
        self.to_concentration(key, n as f64)
    }

    /// Effective enzyme concentration for a gene–protein rule, in mM.
    pub fn enzyme_level(&self, rule: &EnzymeRule) -> Result<f64, SimError> {
        let counts = rule
            .proteins()
            .iter()
            .map(|p| self.count(p))
            .collect::<Result<Vec<_>, _>>()?;
        let particles = match rule {
            EnzymeRule::All(_) => counts.iter().copied().min().unwrap_or(0),
            EnzymeRule::Any(_) => counts.iter().sum(),
        };
        self.to_concentration(rule.label(), particles as f64)
    }
}

/// Produces the continuous network for one communication step.
pub trait NetworkAssembler {
    /// Build the network from the live counts in `ctx`.
    fn assemble(&mut self, ctx: &BindContext<'_>) -> Result<ContinuousNetwork, SimError>;
}

/// Assembler backed by a closure. Built with [`assembler_fn`].
pub struct FnAssembler<F>(F);

/// Wrap a closure as a [`NetworkAssembler`].
pub fn assembler_fn<F>(f: F) -> FnAssembler<F>
where
    F: FnMut(&BindContext<'_>) -> Result<ContinuousNetwork, SimError>,
{
    FnAssembler(f)
}

impl<F> NetworkAssembler for FnAssembler<F>
where
    F: FnMut(&BindContext<'_>) -> Result<ContinuousNetwork, SimError>,
{
    fn assemble(&mut self, ctx: &BindContext<'_>) -> Result<ContinuousNetwork, SimError> {
        (self.0)(ctx)
    }
}

// ── Plain-data model ────────────────────────────────────────────

/// Gene–protein rule giving an effective enzyme level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnzymeRule {
    /// Complex: every subunit is required; the level is the smallest count.
    All(Vec<String>),
    /// Isozymes: any protein suffices; the level is the summed count.
    Any(Vec<String>),
}

impl EnzymeRule {
    /// The protein species the rule reads.
    pub fn proteins(&self) -> &[String] {
        match self {
            Self::All(p) | Self::Any(p) => p,
        }
    }

    fn label(&self) -> &str {
        self.proteins().first().map_or("enzyme", String::as_str)
    }
}

/// Initial concentration of a metabolite.
#[derive(Clone, Debug, PartialEq)]
pub enum InitialValue {
    /// The live concentration of the discrete species with the same key.
    Live,
    /// A fixed concentration in mM.
    Fixed(f64),
}

/// A metabolite of the continuous model.
#[derive(Clone, Debug, PartialEq)]
pub struct MetaboliteSpec {
    /// Species key.
    pub id: String,
    /// Descriptive name.
    pub name: String,
    /// Where the initial concentration comes from.
    pub initial: InitialValue,
}

/// Where a parameter value comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum ParameterSource {
    /// A constant.
    Literal(f64),
    /// A reference to a metabolite or another explicit parameter.
    Reference(String),
    /// The live concentration of a species at assembly time.
    LiveConcentration(String),
    /// The effective enzyme level of a gene–protein rule at assembly time.
    EnzymeLevel(EnzymeRule),
}

/// A parameter of the continuous model.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSpec {
    /// Target pool.
    pub scope: ParameterScope,
    /// Placeholder key.
    pub key: String,
    /// Value source.
    pub source: ParameterSource,
    /// Unit label.
    pub unit: String,
    /// Descriptive name.
    pub name: String,
    /// Optional optimization bounds.
    pub bounds: Option<(f64, f64)>,
}

impl ParameterSpec {
    /// A parameter with no unit, name or bounds.
    pub fn new(scope: ParameterScope, key: impl Into<String>, source: ParameterSource) -> Self {
        Self {
            scope,
            key: key.into(),
            source,
            unit: String::new(),
            name: String::new(),
            bounds: None,
        }
    }

    /// Set the unit label.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }
}

/// A substrate or product binding.
#[derive(Clone, Debug, PartialEq)]
pub struct BindingSpec {
    /// Placeholder name, without `$`.
    pub placeholder: String,
    /// Bound metabolite or literal.
    pub target: BindingTarget,
    /// Stoichiometry override; `0.0` keeps the occurrence count.
    pub stoichiometry: f64,
}

impl BindingSpec {
    /// Bind `placeholder` to `target` with no stoichiometry override.
    pub fn new(placeholder: impl Into<String>, target: impl Into<BindingTarget>) -> Self {
        Self {
            placeholder: placeholder.into(),
            target: target.into(),
            stoichiometry: 0.0,
        }
    }

    /// Set a stoichiometry override.
    pub fn with_stoichiometry(mut self, stoichiometry: f64) -> Self {
        self.stoichiometry = stoichiometry;
        self
    }
}

/// A reaction of the continuous model.
#[derive(Clone, Debug, PartialEq)]
pub struct ReactionSpec {
    /// Unique id.
    pub id: String,
    /// Descriptive name.
    pub name: String,
    /// Rate form id.
    pub rate_form: String,
    /// Substrate bindings.
    pub substrates: Vec<BindingSpec>,
    /// Product bindings.
    pub products: Vec<BindingSpec>,
}

impl ReactionSpec {
    /// A reaction with no bindings yet.
    pub fn new(id: impl Into<String>, rate_form: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            rate_form: rate_form.into(),
            substrates: Vec::new(),
            products: Vec::new(),
        }
    }

    /// Add a substrate binding.
    pub fn substrate(mut self, binding: BindingSpec) -> Self {
        self.substrates.push(binding);
        self
    }

    /// Add a product binding.
    pub fn product(mut self, binding: BindingSpec) -> Self {
        self.products.push(binding);
        self
    }
}

/// Declarative description of the continuous network.
///
/// Metabolites that are buffered (listed in `buffered`, or keyed with the
/// extracellular suffix `_e`) are declared as explicit parameters holding
/// their constant concentration instead of integrated metabolites.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContinuousModel {
    /// Metabolites in declaration order.
    pub metabolites: Vec<MetaboliteSpec>,
    /// Rate form id → template.
    pub rate_forms: IndexMap<String, String>,
    /// Reactions in declaration order.
    pub reactions: Vec<ReactionSpec>,
    /// Parameters of every scope.
    pub parameters: Vec<ParameterSpec>,
    /// Buffered species → constant concentration (mM).
    pub buffered: IndexMap<String, f64>,
}

impl ContinuousModel {
    /// An empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a metabolite.
    pub fn metabolite(mut self, id: &str, initial: InitialValue) -> Self {
        self.metabolites.push(MetaboliteSpec {
            id: id.to_string(),
            name: id.to_string(),
            initial,
        });
        self
    }

    /// Add a rate form.
    pub fn rate_form(mut self, id: &str, template: impl Into<String>) -> Self {
        self.rate_forms.insert(id.to_string(), template.into());
        self
    }

    /// Add a reaction.
    pub fn reaction(mut self, reaction: ReactionSpec) -> Self {
        self.reactions.push(reaction);
        self
    }

    /// Add a parameter.
    pub fn parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Mark a species as buffered at a constant concentration.
    pub fn buffered(mut self, id: &str, concentration: f64) -> Self {
        self.buffered.insert(id.to_string(), concentration);
        self
    }

    fn is_buffered(&self, id: &str) -> bool {
        self.buffered.contains_key(id) || id.ends_with("_e")
    }

    fn buffered_parameter(id: &str, concentration: f64) -> Parameter {
        Parameter::new(id, concentration)
            .with_unit("mM")
            .with_name(format!("External concentration ({id})"))
    }
}

impl NetworkAssembler for ContinuousModel {
    fn assemble(&mut self, ctx: &BindContext<'_>) -> Result<ContinuousNetwork, SimError> {
        let mut net = ContinuousNetwork::new();
        for (id, template) in &self.rate_forms {
            net.declare_rate_form(id.as_str(), template.as_str())?;
        }
        for (id, &c) in &self.buffered {
            net.declare_parameter(ParameterScope::Explicit, Self::buffered_parameter(id, c))?;
        }
        for m in &self.metabolites {
            if self.buffered.contains_key(&m.id) {
                continue;
            }
            let initial = match m.initial {
                InitialValue::Live => ctx.concentration(&m.id)?,
                InitialValue::Fixed(c) => c,
            };
            if self.is_buffered(&m.id) {
                net.declare_parameter(
                    ParameterScope::Explicit,
                    Self::buffered_parameter(&m.id, initial),
                )?;
            } else {
                net.declare_metabolite(m.id.as_str(), m.name.as_str(), initial)?;
            }
        }
        for r in &self.reactions {
            net.declare_reaction(r.id.as_str(), &r.rate_form, r.name.as_str())?;
            for b in &r.substrates {
                net.bind_substrate(&r.id, b.placeholder.as_str(), b.target.clone(), b.stoichiometry)?;
            }
            for b in &r.products {
                net.bind_product(&r.id, b.placeholder.as_str(), b.target.clone(), b.stoichiometry)?;
            }
        }
        for p in &self.parameters {
            let value = match &p.source {
                ParameterSource::Literal(v) => ParameterValue::Number(*v),
                ParameterSource::Reference(name) => ParameterValue::Reference(name.clone()),
                ParameterSource::LiveConcentration(key) => {
                    ParameterValue::Number(ctx.concentration(key)?)
                }
                ParameterSource::EnzymeLevel(rule) => {
                    ParameterValue::Number(ctx.enzyme_level(rule)?)
                }
            };
            let mut param = Parameter::new(p.key.as_str(), value)
                .with_unit(p.unit.as_str())
                .with_name(p.name.as_str());
            param.bounds = p.bounds;
            net.declare_parameter(p.scope.clone(), param)?;
        }
        Ok(net)
    }
}

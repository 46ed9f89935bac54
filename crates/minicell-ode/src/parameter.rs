//! Named parameters of the continuous network.

use std::fmt;

/// A parameter value: a number or a reference to another named value.
///
/// A reference to a metabolite stays symbolic, so the rate law reads the
/// live concentration. A reference to an explicit parameter resolves to
/// that parameter's value.
#[derive(Clone, Debug, PartialEq)]
pub enum ParameterValue {
    /// A literal value.
    Number(f64),
    /// The name of a metabolite or explicit parameter.
    Reference(String),
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(name: &str) -> Self {
        Self::Reference(name.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(name: String) -> Self {
        Self::Reference(name)
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Reference(name) => write!(f, "{name}"),
        }
    }
}

/// Which pool a parameter is stored in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParameterScope {
    /// Specific to one reaction; highest resolution priority.
    Reaction(String),
    /// Named global constant, visible to every reaction. Buffered species
    /// are stored here.
    Explicit,
    /// Stored for reference and reporting only; never used to resolve a
    /// placeholder.
    Global,
}

/// A named parameter.
///
/// `key` is the placeholder name (without `$`) the parameter answers to;
/// `name` is a descriptive label.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    /// Placeholder / lookup key.
    pub key: String,
    /// The value.
    pub value: ParameterValue,
    /// Unit label, free text.
    pub unit: String,
    /// Descriptive name.
    pub name: String,
    /// Optional optimization bounds `(lower, upper)`.
    pub bounds: Option<(f64, f64)>,
}

impl Parameter {
    /// A parameter with no unit, name or bounds.
    pub fn new(key: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
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

    /// Set the descriptive name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set optimization bounds.
    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.bounds = Some((lower, upper));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let p = Parameter::new("kcatF", 2.8)
            .with_unit("1/s")
            .with_name("kcatF_GAPDP")
            .with_bounds(0.0, 10.0);
        assert_eq!(p.key, "kcatF");
        assert_eq!(p.value, ParameterValue::Number(2.8));
        assert_eq!(p.unit, "1/s");
        assert_eq!(p.bounds, Some((0.0, 10.0)));

        let r = Parameter::new("Enzyme", "M_PTN_0001_c");
        assert_eq!(r.value.to_string(), "M_PTN_0001_c");
        assert!(r.bounds.is_none());
    }
}

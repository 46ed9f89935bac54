//! Rate-law templates.

use std::fmt;

use indexmap::IndexSet;
use minicell_core::DefinitionError;

use crate::expr;

/// An immutable, shareable rate-law template.
///
/// The template text uses `$Name` placeholders that are resolved per
/// reaction at compile time. The text is checked for syntax once, here.
#[derive(Clone, Debug, PartialEq)]
pub struct RateForm {
    id: String,
    template: String,
    placeholders: IndexSet<String>,
}

impl RateForm {
    /// Check and store a template.
    pub fn new(id: impl Into<String>, template: impl Into<String>) -> Result<Self, DefinitionError> {
        let id = id.into();
        let template = template.into();
        expr::parse_template(&template).map_err(|e| DefinitionError::InvalidTemplate {
            rate_form: id.clone(),
            reason: e.to_string(),
        })?;
        let placeholders = expr::placeholders(&template);
        Ok(Self {
            id,
            template,
            placeholders,
        })
    }

    /// Rate form id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Original template text.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Distinct placeholder names (without `$`), in order of first appearance.
    pub fn placeholders(&self) -> &IndexSet<String> {
        &self.placeholders
    }

    /// Substitute every `$Name` token in the template text.
    pub fn substitute(&self, replacement: impl FnMut(&str) -> String) -> String {
        expr::substitute(&self.template, replacement)
    }
}

impl fmt::Display for RateForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposes_distinct_placeholders() {
        let rf = RateForm::new("mm", "$Vmax * $S / ($Km + $S)").unwrap();
        let names: Vec<&str> = rf.placeholders().iter().map(String::as_str).collect();
        assert_eq!(names, vec!["Vmax", "S", "Km"]);
        assert_eq!(rf.id(), "mm");
    }

    #[test]
    fn substitution_is_token_exact() {
        let rf = RateForm::new("t", "$Km * $KmSub1 + $Km").unwrap();
        let text = rf.substitute(|name| match name {
            "Km" => "1".into(),
            other => other.to_lowercase(),
        });
        assert_eq!(text, "1 * kmsub1 + 1");
    }

    #[test]
    fn unknown_function_is_rejected_up_front() {
        match RateForm::new("odd", "$k * cosh($S)") {
            Err(DefinitionError::InvalidTemplate { rate_form, reason }) => {
                assert_eq!(rate_form, "odd");
                assert!(reason.contains("cosh"));
            }
            other => panic!("expected template error, got {other:?}"),
        }
    }

    #[test]
    fn bad_template_names_the_rate_form() {
        match RateForm::new("broken", "$A * (") {
            Err(DefinitionError::InvalidTemplate { rate_form, .. }) => assert_eq!(rate_form, "broken"),
            other => panic!("expected template error, got {other:?}"),
        }
    }
}

//! Rate-law expressions.
//!
//! Parsing and evaluation are done by [`meval`]. On top of it this module
//! provides the pieces of the rate-law language meval does not know about:
//! `$Name` placeholders in templates, the scan that lists the bare names a
//! compiled rate law reads, and the function set templates may call.
//!
//! `**` is accepted as a synonym for `^`.

use std::error::Error;
use std::fmt;

use indexmap::IndexSet;
use meval::{ContextProvider, FuncEvalError};

pub use meval::Expr;

/// Functions a rate law may call. `min` and `max` take any number of
/// arguments, `pow` two, the rest one. `log` is the natural logarithm.
pub const FUNCTIONS: [&str; 9] = [
    "min", "max", "pow", "exp", "ln", "log", "log10", "sqrt", "abs",
];

/// A rate law that meval rejected, or that calls an unknown function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    /// What went wrong.
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ParseError {}

/// Parse a rate law with no placeholders left in it.
pub fn parse(text: &str) -> Result<Expr, ParseError> {
    let source = text.replace("**", "^");
    for token in scan(&source) {
        if let Token::Call(name) = token {
            if !FUNCTIONS.contains(&name) {
                return Err(ParseError {
                    message: format!("unknown function `{name}`"),
                });
            }
        }
    }
    source.parse::<Expr>().map_err(|e| ParseError {
        message: e.to_string(),
    })
}

/// Check that a template is a well-formed expression once every `$Name`
/// is read as a variable.
pub fn parse_template(template: &str) -> Result<Expr, ParseError> {
    parse(&substitute(template, |name| format!("__{name}")))
}

/// Distinct `$Name` placeholders (without `$`), in order of first
/// appearance.
pub fn placeholders(template: &str) -> IndexSet<String> {
    scan(template)
        .into_iter()
        .filter_map(|t| match t {
            Token::Placeholder(name) => Some(name.to_string()),
            _ => None,
        })
        .collect()
}

/// Distinct bare names read as variables, in order of first appearance.
///
/// Function names and the exponent marker of numeric literals are not
/// names.
pub fn identifiers(text: &str) -> IndexSet<String> {
    scan(text)
        .into_iter()
        .filter_map(|t| match t {
            Token::Variable(name) => Some(name.to_string()),
            _ => None,
        })
        .collect()
}

/// Replace every `$Name` token with `replacement(Name)`.
///
/// Only whole placeholder tokens are replaced, so `$Km` never matches
/// inside `$KmSub1`.
pub fn substitute(template: &str, mut replacement: impl FnMut(&str) -> String) -> String {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let end = name_end(bytes, i + 1);
            if end > i + 1 {
                out.push_str(&replacement(&template[i + 1..end]));
                i = end;
                continue;
            }
        }
        let ch_len = template[i..].chars().next().map_or(1, char::len_utf8);
        out.push_str(&template[i..i + ch_len]);
        i += ch_len;
    }
    out
}

/// Evaluate with `lookup` supplying every variable.
///
/// An unknown variable, a bad argument count or an arithmetic domain error
/// all come out as NaN, which the integrator reports against the
/// metabolite it lands on.
pub fn eval(expr: &Expr, lookup: impl Fn(&str) -> Option<f64>) -> f64 {
    expr.eval_with_context(Scope(lookup)).unwrap_or(f64::NAN)
}

struct Scope<F>(F);

impl<F: Fn(&str) -> Option<f64>> ContextProvider for Scope<F> {
    fn get_var(&self, name: &str) -> Option<f64> {
        (self.0)(name)
    }

    fn eval_func(&self, name: &str, args: &[f64]) -> Result<f64, FuncEvalError> {
        call(name, args)
    }
}

fn call(name: &str, args: &[f64]) -> Result<f64, FuncEvalError> {
    match (name, args) {
        ("min", [first, rest @ ..]) => Ok(rest.iter().fold(*first, |m, &x| m.min(x))),
        ("max", [first, rest @ ..]) => Ok(rest.iter().fold(*first, |m, &x| m.max(x))),
        ("min" | "max", []) => Err(FuncEvalError::TooFewArguments),
        ("pow", [a, b]) => Ok(a.powf(*b)),
        ("pow", _) => Err(FuncEvalError::NumberArgs(2)),
        ("exp", [x]) => Ok(x.exp()),
        ("ln" | "log", [x]) => Ok(x.ln()),
        ("log10", [x]) => Ok(x.log10()),
        ("sqrt", [x]) => Ok(x.sqrt()),
        ("abs", [x]) => Ok(x.abs()),
        ("exp" | "ln" | "log" | "log10" | "sqrt" | "abs", _) => Err(FuncEvalError::NumberArgs(1)),
        _ => Err(FuncEvalError::UnknownFunction),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token<'a> {
    Variable(&'a str),
    Call(&'a str),
    Placeholder(&'a str),
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn name_end(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && is_name_byte(bytes[i]) {
        i += 1;
    }
    i
}

fn scan(text: &str) -> Vec<Token<'_>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_digit() || (b == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)) {
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
            if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                let mut j = i + 1;
                if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                    j += 1;
                }
                if j < bytes.len() && bytes[j].is_ascii_digit() {
                    while j < bytes.len() && bytes[j].is_ascii_digit() {
                        j += 1;
                    }
                    i = j;
                }
            }
        } else if b == b'$' {
            let end = name_end(bytes, i + 1);
            if end > i + 1 {
                tokens.push(Token::Placeholder(&text[i + 1..end]));
            }
            i = end.max(i + 1);
        } else if b.is_ascii_alphabetic() || b == b'_' {
            let end = name_end(bytes, i);
            let name = &text[i..end];
            let next = text[end..].trim_start().as_bytes().first();
            tokens.push(if next == Some(&b'(') {
                Token::Call(name)
            } else {
                Token::Variable(name)
            });
            i = end;
        } else {
            i += 1;
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(text: &str) -> f64 {
        eval(&parse(text).unwrap(), |_| None)
    }

    #[test]
    fn arithmetic_follows_usual_precedence() {
        assert_eq!(value("2 + 3 * 4"), 14.0);
        assert_eq!(value("(2 + 3) * 4"), 20.0);
        assert_eq!(value("2 ^ 10 / 4"), 256.0);
        assert_eq!(value("2 ** 3"), 8.0);
        assert_eq!(value("-2 * 3"), -6.0);
    }

    #[test]
    fn function_set() {
        assert_eq!(value("min(3, 1, 2)"), 1.0);
        assert_eq!(value("max(3, 1)"), 3.0);
        assert_eq!(value("pow(2, 10)"), 1024.0);
        assert!((value("log10(1000)") - 3.0).abs() < 1e-12);
        assert_eq!(value("ln(1)"), 0.0);
        assert_eq!(value("abs(0 - 4)"), 4.0);
        assert!((value("exp(1)") - std::f64::consts::E).abs() < 1e-15);
        assert!(value("sqrt(0 - 1)").is_nan());
        assert!(value("pow(2)").is_nan());
    }

    #[test]
    fn unknown_function_is_a_parse_error() {
        let err = parse("2 * foo(1)").unwrap_err();
        assert!(err.message.contains("foo"));
        assert!(parse("2 * (").is_err());
    }

    #[test]
    fn variables_come_from_the_lookup() {
        let e = parse("k * S / (Km + S)").unwrap();
        let v = eval(&e, |name| match name {
            "k" => Some(10.0),
            "S" => Some(1.0),
            "Km" => Some(1.0),
            _ => None,
        });
        assert_eq!(v, 5.0);
        assert!(eval(&e, |_| None).is_nan());
    }

    #[test]
    fn identifiers_skip_functions_and_exponents() {
        let names = identifiers("kcat * exp(-Ea / 1e-3) + S * 2.5E+2 + max (S, P)");
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["kcat", "Ea", "S", "P"]);
    }

    #[test]
    fn repeated_placeholders_are_listed_once() {
        let names = placeholders("$Vmax * $S / ($Km + $S)");
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["Vmax", "S", "Km"]);
        assert!(identifiers("$Vmax * S").contains("S"));
        assert!(!identifiers("$Vmax * S").contains("Vmax"));
    }

    #[test]
    fn substitution_is_token_exact() {
        let text = substitute("$Km * $KmSub1 + $Km", |name| match name {
            "Km" => "1".into(),
            other => other.to_lowercase(),
        });
        assert_eq!(text, "1 * kmsub1 + 1");
    }

    #[test]
    fn templates_parse_with_placeholders_as_variables() {
        assert!(parse_template("$kcat * $S / ($Km + $S)").is_ok());
        assert!(parse_template("$A * (").is_err());
        assert!(parse_template("$ + 1").is_err());
    }
}

//! Generators for the standard rate-law templates of the metabolic model.

/// Reversible convenience kinetics for `subs` substrates and `prods`
/// products.
///
/// ```text
/// $onoff * $Enzyme * ( ( $kcatF * Π($SubN / $KmSubN) - $kcatR * Π($ProdN / $KmProdN) )
///                      / ( Π(1 + $SubN / $KmSubN) + Π(1 + $ProdN / $KmProdN) - 1 ) )
/// ```
///
/// An empty side contributes the neutral product `1`.
pub fn enzymatic(subs: usize, prods: usize) -> String {
    let ratio = |prefix: &str, n: usize| {
        side(n, |i| format!("( ${prefix}{i} / $Km{prefix}{i} )"))
    };
    let saturation = |prefix: &str, n: usize| {
        side(n, |i| format!("( 1 + ${prefix}{i} / $Km{prefix}{i} )"))
    };
    let numerator = format!(
        "( $kcatF * {} - $kcatR * {} )",
        ratio("Sub", subs),
        ratio("Prod", prods)
    );
    let denominator = format!(
        "( {} + {} - 1 )",
        saturation("Sub", subs),
        saturation("Prod", prods)
    );
    format!("$onoff * $Enzyme * ( {numerator} / {denominator} )")
}

fn side(n: usize, term: impl Fn(usize) -> String) -> String {
    if n == 0 {
        return "1".to_string();
    }
    (1..=n).map(term).collect::<Vec<_>>().join(" * ")
}

/// Zero-order rate with an on/off switch: `$onoff * $K`.
pub fn zero_order_on_off() -> String {
    "$onoff * $K".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::RateForm;

    #[test]
    fn enzymatic_one_to_one() {
        assert_eq!(
            enzymatic(1, 1),
            "$onoff * $Enzyme * ( ( $kcatF * ( $Sub1 / $KmSub1 ) - $kcatR * ( $Prod1 / $KmProd1 ) ) \
             / ( ( 1 + $Sub1 / $KmSub1 ) + ( 1 + $Prod1 / $KmProd1 ) - 1 ) )"
        );
    }

    #[test]
    fn enzymatic_templates_parse() {
        for (s, p) in [(1, 1), (2, 3), (3, 0), (0, 2)] {
            let rf = RateForm::new("e", enzymatic(s, p)).unwrap();
            assert!(rf.placeholders().contains("kcatF"));
            assert_eq!(
                rf.placeholders().iter().filter(|n| n.starts_with("KmSub")).count(),
                s
            );
            assert_eq!(
                rf.placeholders().iter().filter(|n| n.starts_with("KmProd")).count(),
                p
            );
        }
    }

    #[test]
    fn zero_order_placeholders() {
        let rf = RateForm::new("z", zero_order_on_off()).unwrap();
        let names: Vec<&str> = rf.placeholders().iter().map(String::as_str).collect();
        assert_eq!(names, vec!["onoff", "K"]);
    }
}

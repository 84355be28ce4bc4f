//! `Accept-Additions` parsing and validation (RFC 2324 §2.1.1).

use std::collections::BTreeMap;

use thiserror::Error;

/// Requested additions, keyed by addition type.
pub type Additions = BTreeMap<String, String>;

/// Accepted values per addition key, in the order they are advertised.
pub const ADDITION_CATALOG: &[(&str, &[&str])] = &[
    (
        "milk-type",
        &["Cream", "Half-and-half", "Whole-milk", "Part-Skim", "Skim", "Non-Dairy"],
    ),
    ("syrup-type", &["Vanilla", "Almond", "Raspberry", "Chocolate"]),
    ("sweetener-type", &["Sugar", "Honey", "Artificial"]),
    ("spice-type", &["Cinnamon", "Cardamom"]),
    ("alcohol-type", &["Whisky", "Rum", "Kahlua", "Aquavit"]),
];

/// Advertised in place of a decaf entry.
pub const DECAF_NOTICE: &str = "NOT_ACCEPTABLE — What's the point? (RFC 2324 §2.1.1)";

/// Addition key that selects milk and puts the pot into `pouring-milk`.
pub const MILK_KEY: &str = "milk-type";

const DECAF_KEY: &str = "decaf";

/// Rejected addition sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdditionError {
    /// Any `decaf` key, whatever its value.
    #[error("decaffeinated coffee is not acceptable")]
    Decaf,

    /// Catalog keys carrying values outside the catalog, as `key=value`.
    #[error("unsupported additions: {}", .0.join(", "))]
    Unsupported(Vec<String>),
}

/// Parse an `Accept-Additions` header value.
///
/// Format: `milk-type=Whole-milk; syrup-type=Vanilla`. Segments without `=`
/// are dropped, a repeated key keeps its last value.
pub fn parse_additions(header: Option<&str>) -> Additions {
    let mut additions = Additions::new();
    let Some(header) = header else {
        return additions;
    };

    for segment in header.split(';') {
        if let Some((key, value)) = segment.trim().split_once('=') {
            additions.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    additions
}

/// Accepted values for a catalog key, `None` for keys outside the catalog.
pub fn allowed_values(key: &str) -> Option<&'static [&'static str]> {
    ADDITION_CATALOG
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, values)| *values)
}

/// Validate additions against the catalog.
///
/// Decaf wins over everything else. Keys the catalog does not know are
/// passed through untouched.
pub fn check_additions(additions: &Additions) -> Result<(), AdditionError> {
    if additions.contains_key(DECAF_KEY) {
        return Err(AdditionError::Decaf);
    }

    let unsupported: Vec<String> = additions
        .iter()
        .filter(|(key, value)| {
            allowed_values(key).is_some_and(|allowed| !allowed.contains(&value.as_str()))
        })
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();

    if unsupported.is_empty() {
        Ok(())
    } else {
        Err(AdditionError::Unsupported(unsupported))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absent_header() {
        assert!(parse_additions(None).is_empty());
        assert!(parse_additions(Some("")).is_empty());
    }

    #[test]
    fn test_parse_trims_and_drops_bare_segments() {
        let additions =
            parse_additions(Some(" milk-type = Whole-milk ;sugar; alcohol-type=Whisky;"));
        assert_eq!(additions.len(), 2);
        assert_eq!(additions["milk-type"], "Whole-milk");
        assert_eq!(additions["alcohol-type"], "Whisky");
    }

    #[test]
    fn test_parse_splits_on_first_equals() {
        let additions = parse_additions(Some("syrup-type=a=b"));
        assert_eq!(additions["syrup-type"], "a=b");
    }

    #[test]
    fn test_decaf_rejected_regardless_of_value() {
        let additions = parse_additions(Some("milk-type=Cream; decaf=false"));
        assert_eq!(check_additions(&additions), Err(AdditionError::Decaf));
    }

    #[test]
    fn test_unsupported_value_listed() {
        let additions = parse_additions(Some("milk-type=Oat-milk; syrup-type=Vanilla"));
        assert_eq!(
            check_additions(&additions),
            Err(AdditionError::Unsupported(vec!["milk-type=Oat-milk".to_string()]))
        );
    }

    #[test]
    fn test_unknown_keys_pass() {
        let additions = parse_additions(Some("biscuit-type=Digestive; spice-type=Cardamom"));
        assert_eq!(check_additions(&additions), Ok(()));
    }

    #[test]
    fn test_catalog_lookup() {
        assert!(allowed_values("alcohol-type").unwrap().contains(&"Aquavit"));
        assert!(allowed_values("decaf").is_none());
    }
}

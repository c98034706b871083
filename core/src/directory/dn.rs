/**
 * Distinguished name helpers. The hierarchy is derived from name structure only.
 * A comma preceded by an odd number of backslashes is part of the RDN value, not a separator
 */

/// Byte offset of the first unescaped comma
fn first_separator(dn: &str) -> Option<usize> {
    let mut escaped = false;
    for (index, character) in dn.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match character {
            '\\' => escaped = true,
            ',' => return Some(index),
            _ => {}
        }
    }
    None
}

/// True if the byte at `index` is preceded by an odd number of backslashes
fn is_escaped(dn: &str, index: usize) -> bool {
    let backslashes = dn.as_bytes()[..index]
        .iter()
        .rev()
        .take_while(|byte| **byte == b'\\')
        .count();
    backslashes % 2 == 1
}

/// Split into the first RDN and the parent DN
pub(crate) fn split_rdn(dn: &str) -> (&str, Option<&str>) {
    match first_separator(dn) {
        Some(index) => (&dn[..index], Some(dn[index + 1..].trim_start())),
        None => (dn, None),
    }
}

/// Parent DN. `None` at the top of the tree
pub(crate) fn parent_dn(dn: &str) -> Option<&str> {
    split_rdn(dn).1.filter(|parent| !parent.is_empty())
}

/// Value of the first RDN with escapes left in place. "CN=Person,CN=Schema" -> "Person"
pub(crate) fn first_rdn_value(dn: &str) -> &str {
    let (rdn, _) = split_rdn(dn);
    match rdn.find('=') {
        Some(index) => &rdn[index + 1..],
        None => rdn,
    }
}

/// Check if `child` sits anywhere below `parent`. Case insensitive
pub(crate) fn is_below(child: &str, parent: &str) -> bool {
    let child = child.to_lowercase();
    let parent = parent.to_lowercase();
    if parent.is_empty() || child.len() <= parent.len() + 1 || !child.ends_with(&parent) {
        return false;
    }
    let separator = child.len() - parent.len() - 1;
    child.as_bytes()[separator] == b',' && !is_escaped(&child, separator)
}

/// The DC= components at the end of the name. "CN=x,DC=corp,DC=local" -> "DC=corp,DC=local"
pub(crate) fn domain_part(dn: &str) -> Option<&str> {
    let mut current = Some(dn);
    while let Some(name) = current {
        if name.len() >= 3 && name[..3].eq_ignore_ascii_case("dc=") {
            return Some(name);
        }
        current = split_rdn(name).1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{domain_part, first_rdn_value, is_below, parent_dn, split_rdn};

    #[test]
    fn test_split_rdn() {
        let (rdn, parent) = split_rdn("CN=Alice,OU=Staff,DC=corp,DC=local");
        assert_eq!(rdn, "CN=Alice");
        assert_eq!(parent, Some("OU=Staff,DC=corp,DC=local"));

        let (rdn, parent) = split_rdn("DC=local");
        assert_eq!(rdn, "DC=local");
        assert_eq!(parent, None);
    }

    #[test]
    fn test_escaped_comma() {
        let dn = "CN=Smith\\, John,OU=Staff,DC=corp,DC=local";
        assert_eq!(parent_dn(dn), Some("OU=Staff,DC=corp,DC=local"));
        assert_eq!(first_rdn_value(dn), "Smith\\, John");

        // Escaped backslash followed by a real separator
        let dn = "CN=Back\\\\,OU=Staff";
        assert_eq!(parent_dn(dn), Some("OU=Staff"));
    }

    #[test]
    fn test_is_below() {
        assert!(is_below(
            "CN=Alice,OU=Staff,DC=corp,DC=local",
            "dc=corp,dc=local"
        ));
        assert!(is_below("CN=Alice,OU=Staff,DC=corp,DC=local", "OU=Staff,DC=corp,DC=local"));
        assert!(!is_below("DC=corp,DC=local", "DC=corp,DC=local"));
        assert!(!is_below("CN=Alice,OU=XStaff,DC=corp", "Staff,DC=corp"));
        assert!(!is_below("CN=a\\,OU=Staff,DC=corp", "OU=Staff,DC=corp"));
    }

    #[test]
    fn test_first_rdn_value() {
        assert_eq!(
            first_rdn_value("CN=Person,CN=Schema,CN=Configuration,DC=corp,DC=local"),
            "Person"
        );
        assert_eq!(first_rdn_value("person"), "person");
    }

    #[test]
    fn test_domain_part() {
        assert_eq!(
            domain_part("CN=AdminSDHolder,CN=System,DC=corp,DC=local"),
            Some("DC=corp,DC=local")
        );
        assert_eq!(domain_part("CN=Attacker"), None);
    }
}

// Restriction evaluation (spec §4.E: "a list of small rules (pattern +
// include/exclude) carried by state; evaluated by views when deciding
// whether to emit an edge. Keep purely data; no code reference.").
//
// Multiple matching rules combine the way `.gitignore` resolves overlapping
// patterns: rules are evaluated in order and the last matching rule wins,
// with no match defaulting to "allowed".

use hypergraphdb_store::RestrictionRule;

pub fn edge_permitted(restrictions: &[RestrictionRule], label: &str) -> bool {
    let mut allowed = true;
    for rule in restrictions {
        let Ok(glob) = globset::Glob::new(&rule.pattern) else {
            continue;
        };
        if glob.compile_matcher().is_match(label) {
            allowed = !rule.exclude;
        }
    }
    allowed
}

#[cfg(test)]
mod test {
    use super::*;

    fn rule(pattern: &str, exclude: bool) -> RestrictionRule {
        RestrictionRule {
            pattern: pattern.to_string(),
            exclude,
        }
    }

    #[test]
    fn no_restrictions_allows_everything() {
        assert!(edge_permitted(&[], "child"));
    }

    #[test]
    fn an_exclude_rule_blocks_matching_labels() {
        let rules = vec![rule("secret*", true)];
        assert!(!edge_permitted(&rules, "secret_notes"));
        assert!(edge_permitted(&rules, "public_notes"));
    }

    #[test]
    fn a_later_rule_overrides_an_earlier_one() {
        let rules = vec![rule("*", true), rule("child", false)];
        assert!(edge_permitted(&rules, "child"));
        assert!(!edge_permitted(&rules, "other"));
    }
}

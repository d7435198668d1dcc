use crate::model::PolicySnapshot;

/// Print human-readable policy summary to stdout
pub fn print_summary(policy: &PolicySnapshot, source: &str) {
    println!();
    println!("Source: {}", source);
    print!("{}", format_summary(policy));
    println!();
}

/// Format summary as string (for testing)
pub fn format_summary(policy: &PolicySnapshot) -> String {
    let mut output = String::new();

    output.push_str(&format!("Rules: {}\n", policy.len()));

    for (sec, types) in &policy.sections {
        for (ptype, rules) in types {
            output.push_str(&format!("[{}] {}: {} rules\n", sec, ptype, rules.len()));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn rule(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_format_summary_empty() {
        let output = format_summary(&PolicySnapshot::default());
        assert_eq!(output, "Rules: 0\n");
    }

    #[test]
    fn test_format_summary_counts_types() {
        let mut policy = PolicySnapshot::default();
        policy.sections.insert(
            "p".to_string(),
            BTreeMap::from([(
                "p".to_string(),
                vec![rule(&["alice", "data1"]), rule(&["bob", "data2"])],
            )]),
        );
        policy.sections.insert(
            "g".to_string(),
            BTreeMap::from([("g".to_string(), vec![rule(&["alice", "admin"])])]),
        );

        let output = format_summary(&policy);

        assert!(output.contains("Rules: 3"));
        assert!(output.contains("[p] p: 2 rules"));
        assert!(output.contains("[g] g: 1 rules"));
    }
}

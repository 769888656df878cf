use super::state::KeywordGroup;

/// Render one group, or `None` when both keywords are blank.
///
/// Two keywords render as `(a AND b)` / `(a OR b)`, a single keyword bare.
pub fn group_expression(group: &KeywordGroup) -> Option<String> {
    let first = group.keyword1.trim();
    let second = group.keyword2.trim();

    match (first.is_empty(), second.is_empty()) {
        (true, true) => None,
        (false, true) => Some(first.to_string()),
        (true, false) => Some(second.to_string()),
        (false, false) => Some(format!("({first} {} {second})", group.relation.as_str())),
    }
}

/// Join every non-blank group with AND, the way the backend combines groups
pub fn query_expression(groups: &[KeywordGroup]) -> String {
    groups
        .iter()
        .filter_map(group_expression)
        .collect::<Vec<_>>()
        .join(" AND ")
}

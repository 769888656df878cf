use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// Fewest keyword groups the form may hold
pub const MIN_GROUPS: usize = 1;
/// Most keyword groups the form may hold
pub const MAX_GROUPS: usize = 5;

/// Logical relation between the two keywords of a group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Relation {
    #[default]
    And,
    Or,
}

impl Relation {
    pub fn toggle(self) -> Self {
        match self {
            Relation::And => Relation::Or,
            Relation::Or => Relation::And,
        }
    }

    /// Operator as it appears in a search expression
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::And => "AND",
            Relation::Or => "OR",
        }
    }

    /// Label shown in the relation selector
    pub fn label(self) -> &'static str {
        match self {
            Relation::And => "并且",
            Relation::Or => "或者",
        }
    }
}

/// Which keyword of a group an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordField {
    Keyword1,
    Keyword2,
}

/// Two keywords joined by a relation; the unit of manual search criteria
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub id: u32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub keyword1: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub keyword2: String,
    #[serde(default)]
    pub relation: Relation,
}

impl KeywordGroup {
    /// Empty group joined by AND
    pub fn new(id: u32) -> Self {
        Self {
            id,
            keyword1: String::new(),
            keyword2: String::new(),
            relation: Relation::And,
        }
    }

    pub fn keyword(&self, field: KeywordField) -> &str {
        match field {
            KeywordField::Keyword1 => &self.keyword1,
            KeywordField::Keyword2 => &self.keyword2,
        }
    }

    /// True when at least one keyword is non-blank
    pub fn has_keyword(&self) -> bool {
        !self.keyword1.trim().is_empty() || !self.keyword2.trim().is_empty()
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Remove every whitespace character
pub fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Search mode; switching never clears the other mode's input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    /// Free text turned into keyword groups by the server
    #[default]
    Auto,
    /// Keyword groups entered by hand
    Manual,
}

impl SearchMode {
    pub fn toggle(self) -> Self {
        match self {
            SearchMode::Auto => SearchMode::Manual,
            SearchMode::Manual => SearchMode::Auto,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SearchMode::Auto => "自动检索",
            SearchMode::Manual => "手动检索",
        }
    }
}

/// Every state transition of the search form
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetMode(SearchMode),
    SetFreeText(String),
    AddGroup,
    RemoveGroup(u32),
    UpdateKeyword {
        id: u32,
        field: KeywordField,
        value: String,
    },
    SetRelation {
        id: u32,
        relation: Relation,
    },
    /// Hide a mode's instructions banner for good
    DismissInstructions(SearchMode),
    /// Groups generated by the server replace the current list
    ReplaceGroups(Vec<KeywordGroup>),
    /// An auto search settled, successfully or not
    SearchFinished,
}

/// What a submit attempt turned into
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Another submission is in flight
    Busy,
    /// Auto mode with blank text; the busy flag was already set
    BlankText,
    /// Manual mode with no usable keyword
    NoKeywords,
    /// Send this text to the auto search endpoint
    Auto { text: String },
    /// Manual search payload
    Manual { groups: Vec<KeywordGroup> },
}

/// Complete state of one search form.
///
/// Only [`SearchState::reduce`] and [`SearchState::begin_submit`] produce new
/// states, so every change goes through a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    mode: SearchMode,
    free_text: String,
    groups: Vec<KeywordGroup>,
    is_searching: bool,
    show_auto_instructions: bool,
    show_manual_instructions: bool,
    next_group_id: u32,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            mode: SearchMode::Auto,
            free_text: String::new(),
            groups: vec![KeywordGroup::new(1)],
            is_searching: false,
            show_auto_instructions: true,
            show_manual_instructions: true,
            next_group_id: 2,
        }
    }
}

impl SearchState {
    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn free_text(&self) -> &str {
        &self.free_text
    }

    pub fn groups(&self) -> &[KeywordGroup] {
        &self.groups
    }

    pub fn is_searching(&self) -> bool {
        self.is_searching
    }

    /// Id the next added group will get
    pub fn next_group_id(&self) -> u32 {
        self.next_group_id
    }

    pub fn shows_instructions(&self, mode: SearchMode) -> bool {
        match mode {
            SearchMode::Auto => self.show_auto_instructions,
            SearchMode::Manual => self.show_manual_instructions,
        }
    }

    /// Groups that would be searched in manual mode
    pub fn effective_groups(&self) -> Vec<KeywordGroup> {
        self.groups
            .iter()
            .filter(|g| g.has_keyword())
            .cloned()
            .collect()
    }

    /// Whether the submit control is enabled for the current mode
    pub fn can_submit(&self) -> bool {
        if self.is_searching {
            return false;
        }
        match self.mode {
            SearchMode::Auto => !self.free_text.trim().is_empty(),
            SearchMode::Manual => self
                .groups
                .iter()
                .any(|g| !g.keyword1.is_empty() || !g.keyword2.is_empty()),
        }
    }

    /// Apply one action and return the next state
    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::SetMode(mode) => self.mode = mode,
            Action::SetFreeText(text) => self.free_text = text,
            Action::AddGroup => {
                if self.groups.len() < MAX_GROUPS {
                    match self.allocate_id() {
                        Some(id) => self.groups.push(KeywordGroup::new(id)),
                        None => tracing::warn!("group ids exhausted; not adding a group"),
                    }
                }
            }
            Action::RemoveGroup(id) => {
                if self.groups.len() > MIN_GROUPS {
                    if let Some(pos) = self.groups.iter().position(|g| g.id == id) {
                        self.groups.remove(pos);
                    }
                }
            }
            Action::UpdateKeyword { id, field, value } => {
                let value = strip_whitespace(&value);
                if let Some(group) = self.groups.iter_mut().find(|g| g.id == id) {
                    match field {
                        KeywordField::Keyword1 => group.keyword1 = value,
                        KeywordField::Keyword2 => group.keyword2 = value,
                    }
                }
            }
            Action::SetRelation { id, relation } => {
                if let Some(group) = self.groups.iter_mut().find(|g| g.id == id) {
                    group.relation = relation;
                }
            }
            Action::DismissInstructions(SearchMode::Auto) => self.show_auto_instructions = false,
            Action::DismissInstructions(SearchMode::Manual) => {
                self.show_manual_instructions = false
            }
            Action::ReplaceGroups(groups) => self.replace_groups(groups),
            Action::SearchFinished => self.is_searching = false,
        }
        self
    }

    /// Start a submission.
    ///
    /// In auto mode the busy flag is raised before the text is checked, so a
    /// blank submit leaves it raised with nothing to clear it. Callers gate on
    /// [`SearchState::can_submit`] to stay out of that path.
    pub fn begin_submit(mut self) -> (Self, Submission) {
        if self.is_searching {
            return (self, Submission::Busy);
        }

        match self.mode {
            SearchMode::Auto => {
                self.is_searching = true;
                if self.free_text.trim().is_empty() {
                    return (self, Submission::BlankText);
                }
                let text = self.free_text.clone();
                (self, Submission::Auto { text })
            }
            SearchMode::Manual => {
                let groups = self.effective_groups();
                if groups.is_empty() {
                    return (self, Submission::NoKeywords);
                }
                (self, Submission::Manual { groups })
            }
        }
    }

    /// Hand out the next unused id. `u32::MAX` is never issued, so the
    /// counter stays strictly above every id in the list.
    fn allocate_id(&mut self) -> Option<u32> {
        let id = self.next_group_id;
        if id == u32::MAX {
            return None;
        }
        self.next_group_id = id + 1;
        Some(id)
    }

    /// Server ids are kept when unique and below `u32::MAX`; the rest are
    /// renumbered from the local counter.
    fn replace_groups(&mut self, groups: Vec<KeywordGroup>) {
        let mut seen = HashSet::new();
        let incoming: Vec<(bool, KeywordGroup)> = groups
            .into_iter()
            .take(MAX_GROUPS)
            .map(|g| {
                let keep_id = g.id != u32::MAX && seen.insert(g.id);
                let group = KeywordGroup {
                    keyword1: strip_whitespace(&g.keyword1),
                    keyword2: strip_whitespace(&g.keyword2),
                    ..g
                };
                (keep_id, group)
            })
            .collect();

        if let Some(max_id) = incoming.iter().filter(|(keep, _)| *keep).map(|(_, g)| g.id).max() {
            self.next_group_id = self.next_group_id.max(max_id + 1);
        }

        let mut groups = Vec::with_capacity(incoming.len());
        for (keep_id, mut group) in incoming {
            if !keep_id {
                match self.allocate_id() {
                    Some(id) => {
                        tracing::debug!(server_id = group.id, id, "renumbered server group");
                        group.id = id;
                    }
                    None => {
                        tracing::warn!(server_id = group.id, "group ids exhausted; dropping server group");
                        continue;
                    }
                }
            }
            groups.push(group);
        }

        if groups.is_empty() {
            match self.allocate_id() {
                Some(id) => groups.push(KeywordGroup::new(id)),
                None => {
                    tracing::warn!("group ids exhausted; keeping current groups");
                    return;
                }
            }
        }

        self.groups = groups;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_groups(n: usize) -> SearchState {
        let mut state = SearchState::default();
        while state.groups().len() < n {
            state = state.reduce(Action::AddGroup);
        }
        state
    }

    fn keyword(id: u32, field: KeywordField, value: &str) -> Action {
        Action::UpdateKeyword {
            id,
            field,
            value: value.to_string(),
        }
    }

    #[test]
    fn starts_with_one_default_group() {
        let state = SearchState::default();
        assert_eq!(state.groups(), &[KeywordGroup::new(1)]);
        assert_eq!(state.mode(), SearchMode::Auto);
        assert!(!state.is_searching());
        assert!(state.shows_instructions(SearchMode::Auto));
        assert!(state.shows_instructions(SearchMode::Manual));
    }

    #[test]
    fn add_group_grows_until_five_with_fresh_ids() {
        for n in 1..MAX_GROUPS {
            let before = with_groups(n);
            let state = before.clone().reduce(Action::AddGroup);
            assert_eq!(state.groups().len(), n + 1);

            let new_id = state.groups().last().unwrap().id;
            assert!(before.groups().iter().all(|g| g.id != new_id));
            assert_eq!(state.next_group_id(), new_id + 1);
        }

        let full = with_groups(MAX_GROUPS);
        assert_eq!(full.clone().reduce(Action::AddGroup), full);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let state = with_groups(3)
            .reduce(Action::RemoveGroup(3))
            .reduce(Action::AddGroup);
        let ids: Vec<u32> = state.groups().iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[test]
    fn remove_group_stops_at_one() {
        for n in 2..=MAX_GROUPS {
            let state = with_groups(n);
            let id = state.groups()[0].id;
            assert_eq!(state.reduce(Action::RemoveGroup(id)).groups().len(), n - 1);
        }

        let single = SearchState::default();
        assert_eq!(single.clone().reduce(Action::RemoveGroup(1)), single);
    }

    #[test]
    fn update_keyword_strips_all_whitespace() {
        let state = with_groups(2)
            .reduce(keyword(2, KeywordField::Keyword2, "keep"))
            .reduce(keyword(1, KeywordField::Keyword1, " a b "));

        assert_eq!(state.groups()[0].keyword1, "ab");
        assert_eq!(state.groups()[0].keyword2, "");
        assert_eq!(state.groups()[1].keyword1, "");
        assert_eq!(state.groups()[1].keyword2, "keep");

        let state = state.reduce(keyword(1, KeywordField::Keyword2, "合\t同\u{3000}纠纷\n"));
        assert_eq!(state.groups()[0].keyword2, "合同纠纷");
    }

    #[test]
    fn set_relation_touches_only_target() {
        let state = with_groups(2).reduce(Action::SetRelation {
            id: 2,
            relation: Relation::Or,
        });
        assert_eq!(state.groups()[0].relation, Relation::And);
        assert_eq!(state.groups()[1].relation, Relation::Or);
    }

    #[test]
    fn switching_modes_keeps_data() {
        let state = SearchState::default()
            .reduce(Action::SetFreeText("合同纠纷".to_string()))
            .reduce(Action::SetMode(SearchMode::Manual))
            .reduce(keyword(1, KeywordField::Keyword1, "盗窃"))
            .reduce(Action::SetMode(SearchMode::Auto));

        assert_eq!(state.free_text(), "合同纠纷");
        assert_eq!(state.groups()[0].keyword1, "盗窃");
    }

    #[test]
    fn dismissing_instructions_is_idempotent() {
        let once = SearchState::default().reduce(Action::DismissInstructions(SearchMode::Auto));
        let twice = once
            .clone()
            .reduce(Action::DismissInstructions(SearchMode::Auto));

        assert_eq!(once, twice);
        assert!(!twice.shows_instructions(SearchMode::Auto));
        assert!(twice.shows_instructions(SearchMode::Manual));
    }

    #[test]
    fn manual_submit_without_keywords_does_nothing() {
        let state = SearchState::default().reduce(Action::SetMode(SearchMode::Manual));
        let (next, submission) = state.clone().begin_submit();
        assert_eq!(submission, Submission::NoKeywords);
        assert_eq!(next, state);
        assert!(!state.can_submit());
    }

    #[test]
    fn manual_submit_keeps_groups_with_a_keyword() {
        let state = with_groups(2)
            .reduce(Action::SetMode(SearchMode::Manual))
            .reduce(keyword(1, KeywordField::Keyword1, "theft"));

        let (next, submission) = state.begin_submit();
        assert_eq!(
            submission,
            Submission::Manual {
                groups: vec![KeywordGroup {
                    id: 1,
                    keyword1: "theft".to_string(),
                    keyword2: String::new(),
                    relation: Relation::And,
                }]
            }
        );
        assert!(!next.is_searching());
    }

    #[test]
    fn auto_submit_raises_busy_flag() {
        let state = SearchState::default().reduce(Action::SetFreeText("伪造公章".to_string()));
        assert!(state.can_submit());

        let (next, submission) = state.begin_submit();
        assert_eq!(
            submission,
            Submission::Auto {
                text: "伪造公章".to_string()
            }
        );
        assert!(next.is_searching());
        assert!(!next.can_submit());

        let (again, submission) = next.clone().begin_submit();
        assert_eq!(submission, Submission::Busy);
        assert_eq!(again, next);

        assert!(!again.reduce(Action::SearchFinished).is_searching());
    }

    #[test]
    fn blank_auto_submit_leaves_busy_flag_set() {
        let state = SearchState::default().reduce(Action::SetFreeText("   ".to_string()));
        assert!(!state.can_submit());

        let (next, submission) = state.begin_submit();
        assert_eq!(submission, Submission::BlankText);
        assert!(next.is_searching());
    }

    #[test]
    fn replace_groups_takes_server_list() {
        let server = vec![KeywordGroup {
            id: 1,
            keyword1: "a".to_string(),
            keyword2: "b".to_string(),
            relation: Relation::And,
        }];
        let state = with_groups(3).reduce(Action::ReplaceGroups(server.clone()));
        assert_eq!(state.groups(), server.as_slice());
        // Counter never goes backwards.
        assert_eq!(state.next_group_id(), 4);
    }

    #[test]
    fn replace_groups_keeps_invariants() {
        let server: Vec<KeywordGroup> = (0..7)
            .map(|i| KeywordGroup {
                id: i,
                keyword1: format!("k {i}"),
                keyword2: String::new(),
                relation: Relation::Or,
            })
            .collect();
        let state = SearchState::default().reduce(Action::ReplaceGroups(server));

        assert_eq!(state.groups().len(), MAX_GROUPS);
        assert_eq!(state.groups()[0].keyword1, "k0");
        assert_eq!(state.next_group_id(), 5);

        let added = state.reduce(Action::RemoveGroup(0)).reduce(Action::AddGroup);
        assert_eq!(added.groups().last().unwrap().id, 5);

        let empty = SearchState::default().reduce(Action::ReplaceGroups(Vec::new()));
        assert_eq!(empty.groups().len(), 1);
        assert_eq!(empty.groups()[0], KeywordGroup::new(2));
    }

    fn server_group(id: u32, keyword1: &str) -> KeywordGroup {
        KeywordGroup {
            id,
            keyword1: keyword1.to_string(),
            keyword2: String::new(),
            relation: Relation::And,
        }
    }

    #[test]
    fn duplicate_server_ids_are_renumbered() {
        let state = SearchState::default().reduce(Action::ReplaceGroups(vec![
            server_group(0, "a"),
            server_group(0, "b"),
        ]));

        let ids: Vec<u32> = state.groups().iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(state.groups()[1].keyword1, "b");
        assert_eq!(state.next_group_id(), 3);

        let state = state.reduce(Action::RemoveGroup(0));
        assert_eq!(state.groups(), &[server_group(2, "b")]);

        let state = state.reduce(Action::RemoveGroup(2));
        assert_eq!(state.groups().len(), MIN_GROUPS);
    }

    #[test]
    fn remove_group_keeps_last_server_group() {
        let state = SearchState::default().reduce(Action::ReplaceGroups(vec![
            server_group(4, "a"),
            server_group(9, "b"),
        ]));
        let state = state.reduce(Action::RemoveGroup(4)).reduce(Action::RemoveGroup(9));
        assert_eq!(state.groups(), &[server_group(9, "b")]);
    }

    #[test]
    fn max_server_id_gets_a_local_id() {
        let state = SearchState::default()
            .reduce(Action::ReplaceGroups(vec![server_group(u32::MAX, "a")]));
        assert_eq!(state.groups(), &[server_group(2, "a")]);
        assert_eq!(state.next_group_id(), 3);

        let state = state.reduce(Action::AddGroup);
        let ids: Vec<u32> = state.groups().iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn exhausted_ids_refuse_new_groups() {
        let state = SearchState::default()
            .reduce(Action::ReplaceGroups(vec![server_group(u32::MAX - 1, "a")]));
        assert_eq!(state.next_group_id(), u32::MAX);

        let added = state.clone().reduce(Action::AddGroup);
        assert_eq!(added, state);

        let replaced = state.clone().reduce(Action::ReplaceGroups(vec![
            server_group(7, "b"),
            server_group(7, "c"),
        ]));
        assert_eq!(replaced.groups(), &[server_group(7, "b")]);

        let emptied = state.clone().reduce(Action::ReplaceGroups(Vec::new()));
        assert_eq!(emptied.groups(), state.groups());
    }

    #[test]
    fn relation_wire_format_is_uppercase() {
        let group: KeywordGroup = serde_json::from_str(
            r#"{"id": 3, "keyword1": "公章", "keyword2": null, "relation": "OR"}"#,
        )
        .unwrap();
        assert_eq!(group.keyword2, "");
        assert_eq!(group.relation, Relation::Or);
        assert_eq!(
            serde_json::to_value(&group).unwrap()["relation"],
            serde_json::json!("OR")
        );
    }
}

//! Search form state: keyword groups, modes, and submissions.

pub mod controller;
pub mod query;
pub mod state;

pub use controller::{SearchController, SubmitOutcome};
pub use query::query_expression;
pub use state::{
    Action, KeywordField, KeywordGroup, Relation, SearchMode, SearchState, Submission,
    MAX_GROUPS, MIN_GROUPS,
};

//! Application tracker rows and the typed rule objects that act on them
//!
//! A [`StudentUniversityDecision`] is one student-school row on the counselor
//! application tracker. Task templates carry raw string maps describing which
//! rows a task touches and which status fields flip when the task is assigned
//! or completed; those maps compile into [`DecisionPredicate`] and
//! [`TrackerAssignment`] before evaluation so that a typo in configuration
//! surfaces as a [`TrackerConfigError`] instead of silently matching nothing.

use crate::error::TrackerConfigError;
use crate::ids::{DecisionId, SchoolId, StudentId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Raw rule map as stored on a task template (field name -> value)
pub type RawRuleMap = IndexMap<String, String>;

/// Map key recognized as the school filter clause
pub const SCHOOL_ID_KEY: &str = "school_id";

/// Status fields on a tracker row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackerField {
    /// Overall application status
    ApplicationStatus,
    /// Transcript order status
    TranscriptStatus,
    /// Test score report status
    TestScoresStatus,
    /// First letter of recommendation
    RecommendationOneStatus,
    /// Second letter of recommendation
    RecommendationTwoStatus,
}

impl TrackerField {
    /// Wire/configuration name of the field
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerField::ApplicationStatus => "application_status",
            TrackerField::TranscriptStatus => "transcript_status",
            TrackerField::TestScoresStatus => "test_scores_status",
            TrackerField::RecommendationOneStatus => "recommendation_one_status",
            TrackerField::RecommendationTwoStatus => "recommendation_two_status",
        }
    }

    /// All fields, in tracker display order
    #[must_use]
    pub fn all() -> [TrackerField; 5] {
        [
            TrackerField::ApplicationStatus,
            TrackerField::TranscriptStatus,
            TrackerField::TestScoresStatus,
            TrackerField::RecommendationOneStatus,
            TrackerField::RecommendationTwoStatus,
        ]
    }
}

impl FromStr for TrackerField {
    type Err = TrackerConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "application_status" => Ok(TrackerField::ApplicationStatus),
            "transcript_status" => Ok(TrackerField::TranscriptStatus),
            "test_scores_status" => Ok(TrackerField::TestScoresStatus),
            "recommendation_one_status" => Ok(TrackerField::RecommendationOneStatus),
            "recommendation_two_status" => Ok(TrackerField::RecommendationTwoStatus),
            other => Err(TrackerConfigError::UnknownField(other.to_string())),
        }
    }
}

impl std::fmt::Display for TrackerField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed status set shared by every tracker field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackerStatus {
    /// No status yet
    #[default]
    Unset,
    /// Not applicable for this school
    NotApplicable,
    /// Required by the school
    Required,
    /// Optional for the school
    Optional,
    /// Assigned to order/handle
    Assigned,
    /// Requested or ordered
    Requested,
    /// Received by the school
    Received,
}

impl TrackerStatus {
    /// Wire/configuration name of the status
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerStatus::Unset => "",
            TrackerStatus::NotApplicable => "n_a",
            TrackerStatus::Required => "required",
            TrackerStatus::Optional => "optional",
            TrackerStatus::Assigned => "assigned",
            TrackerStatus::Requested => "requested",
            TrackerStatus::Received => "received",
        }
    }

    /// Parse a configured status value, reporting the field (or list) it was
    /// configured under on failure
    pub(crate) fn parse_for(field: &str, value: &str) -> Result<Self, TrackerConfigError> {
        match value {
            "" => Ok(TrackerStatus::Unset),
            "n_a" => Ok(TrackerStatus::NotApplicable),
            "required" => Ok(TrackerStatus::Required),
            "optional" => Ok(TrackerStatus::Optional),
            "assigned" => Ok(TrackerStatus::Assigned),
            "requested" => Ok(TrackerStatus::Requested),
            "received" => Ok(TrackerStatus::Received),
            other => Err(TrackerConfigError::UnknownStatus {
                field: field.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for TrackerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One student-school row on the counselor application tracker
///
/// Rows comprise a student's school list. They are created when a school is
/// added to the list (outside this workspace's scope) and mutated exclusively
/// through task status transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentUniversityDecision {
    /// Row identifier
    pub id: DecisionId,
    /// Student this decision belongs to
    pub student: StudentId,
    /// School the decision is about
    pub school: SchoolId,
    /// Overall application status
    pub application_status: TrackerStatus,
    /// Transcript order status
    pub transcript_status: TrackerStatus,
    /// Test score report status
    pub test_scores_status: TrackerStatus,
    /// First recommendation letter status
    pub recommendation_one_status: TrackerStatus,
    /// Second recommendation letter status
    pub recommendation_two_status: TrackerStatus,
}

impl StudentUniversityDecision {
    /// Create a fresh row with every field unset
    #[inline]
    #[must_use]
    pub fn new(student: StudentId, school: SchoolId) -> Self {
        Self {
            id: DecisionId::new(),
            student,
            school,
            application_status: TrackerStatus::default(),
            transcript_status: TrackerStatus::default(),
            test_scores_status: TrackerStatus::default(),
            recommendation_one_status: TrackerStatus::default(),
            recommendation_two_status: TrackerStatus::default(),
        }
    }

    /// Current value of a field
    #[inline]
    #[must_use]
    pub fn get(&self, field: TrackerField) -> TrackerStatus {
        match field {
            TrackerField::ApplicationStatus => self.application_status,
            TrackerField::TranscriptStatus => self.transcript_status,
            TrackerField::TestScoresStatus => self.test_scores_status,
            TrackerField::RecommendationOneStatus => self.recommendation_one_status,
            TrackerField::RecommendationTwoStatus => self.recommendation_two_status,
        }
    }

    /// Overwrite a field
    #[inline]
    pub fn set(&mut self, field: TrackerField, value: TrackerStatus) {
        match field {
            TrackerField::ApplicationStatus => self.application_status = value,
            TrackerField::TranscriptStatus => self.transcript_status = value,
            TrackerField::TestScoresStatus => self.test_scores_status = value,
            TrackerField::RecommendationOneStatus => self.recommendation_one_status = value,
            TrackerField::RecommendationTwoStatus => self.recommendation_two_status = value,
        }
    }
}

/// One clause of a compiled decision filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateClause {
    /// Row must be for this school
    School(SchoolId),
    /// Field must currently hold this status
    Field(TrackerField, TrackerStatus),
}

impl PredicateClause {
    fn matches(&self, decision: &StudentUniversityDecision) -> bool {
        match self {
            PredicateClause::School(school) => decision.school == *school,
            PredicateClause::Field(field, status) => decision.get(*field) == *status,
        }
    }
}

/// Compiled `include_school_sud_values` filter
///
/// Conjunctive: a row matches only when every clause holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionPredicate {
    clauses: Vec<PredicateClause>,
}

impl DecisionPredicate {
    /// Compile a raw filter map
    ///
    /// # Errors
    /// Returns [`TrackerConfigError`] when a key is not `school_id` or a
    /// tracker field name, or when a value is outside the closed status set.
    pub fn compile(raw: &RawRuleMap) -> Result<Self, TrackerConfigError> {
        let mut clauses = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            if key == SCHOOL_ID_KEY {
                let school = value
                    .parse::<SchoolId>()
                    .map_err(|_| TrackerConfigError::InvalidSchoolId(value.clone()))?;
                clauses.push(PredicateClause::School(school));
            } else {
                let field = key.parse::<TrackerField>()?;
                let status = TrackerStatus::parse_for(key, value)?;
                clauses.push(PredicateClause::Field(field, status));
            }
        }
        Ok(Self { clauses })
    }

    /// Whether the filter has no clauses (matches every row)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluate the filter against one row
    #[must_use]
    pub fn matches(&self, decision: &StudentUniversityDecision) -> bool {
        self.clauses.iter().all(|c| c.matches(decision))
    }
}

/// Compiled `on_assign_sud_update` / `on_complete_sud_update` map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerAssignment {
    updates: Vec<(TrackerField, TrackerStatus)>,
}

impl TrackerAssignment {
    /// Compile a raw update map
    ///
    /// # Errors
    /// Returns [`TrackerConfigError`] on an unknown field or status value.
    pub fn compile(raw: &RawRuleMap) -> Result<Self, TrackerConfigError> {
        let mut updates = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            let field = key.parse::<TrackerField>()?;
            let status = TrackerStatus::parse_for(key, value)?;
            updates.push((field, status));
        }
        Ok(Self { updates })
    }

    /// Whether the assignment writes nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Apply every update to a row, respecting the `only_alter` guard
    ///
    /// When `only_alter` is non-empty, a field is only overwritten if its
    /// current value is in the allowed set. Returns true if any field changed.
    pub fn apply(&self, decision: &mut StudentUniversityDecision, only_alter: &[TrackerStatus]) -> bool {
        let mut changed = false;
        for (field, status) in &self.updates {
            let current = decision.get(*field);
            if !only_alter.is_empty() && !only_alter.contains(&current) {
                continue;
            }
            if current != *status {
                decision.set(*field, *status);
                changed = true;
            }
        }
        changed
    }
}

/// Compiled rule bundle for one task template
#[derive(Debug, Clone, Default)]
pub struct TrackerRules {
    /// Which rows the task touches (None when the template declares no filter)
    pub predicate: Option<DecisionPredicate>,
    /// Field updates applied when the task becomes assigned
    pub on_assign: Option<TrackerAssignment>,
    /// Field updates applied when the task is completed
    pub on_complete: Option<TrackerAssignment>,
    /// Current values that may be overwritten (empty = no restriction)
    pub only_alter: Vec<TrackerStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(pairs: &[(&str, &str)]) -> RawRuleMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn field_round_trip() {
        for field in TrackerField::all() {
            assert_eq!(field.as_str().parse::<TrackerField>().unwrap(), field);
        }
    }

    #[test]
    fn predicate_matches_field_clause() {
        let mut sud = StudentUniversityDecision::new(StudentId::new(), SchoolId::new());
        sud.transcript_status = TrackerStatus::Required;

        let pred = DecisionPredicate::compile(&raw(&[("transcript_status", "required")])).unwrap();
        assert!(pred.matches(&sud));

        sud.transcript_status = TrackerStatus::Received;
        assert!(!pred.matches(&sud));
    }

    #[test]
    fn predicate_matches_school_clause() {
        let school = SchoolId::new();
        let sud = StudentUniversityDecision::new(StudentId::new(), school);

        let pred =
            DecisionPredicate::compile(&raw(&[(SCHOOL_ID_KEY, &school.to_string())])).unwrap();
        assert!(pred.matches(&sud));

        let other = StudentUniversityDecision::new(StudentId::new(), SchoolId::new());
        assert!(!pred.matches(&other));
    }

    #[test]
    fn predicate_is_conjunctive() {
        let school = SchoolId::new();
        let mut sud = StudentUniversityDecision::new(StudentId::new(), school);
        sud.recommendation_one_status = TrackerStatus::Required;

        let pred = DecisionPredicate::compile(&raw(&[
            (SCHOOL_ID_KEY, &school.to_string()),
            ("recommendation_one_status", "required"),
        ]))
        .unwrap();
        assert!(pred.matches(&sud));

        sud.recommendation_one_status = TrackerStatus::Unset;
        assert!(!pred.matches(&sud));
    }

    #[test]
    fn predicate_rejects_unknown_field() {
        let err = DecisionPredicate::compile(&raw(&[("gpa", "4.0")])).unwrap_err();
        assert_eq!(err, TrackerConfigError::UnknownField("gpa".to_string()));
    }

    #[test]
    fn predicate_rejects_unknown_status() {
        let err =
            DecisionPredicate::compile(&raw(&[("transcript_status", "done")])).unwrap_err();
        assert!(matches!(err, TrackerConfigError::UnknownStatus { .. }));
    }

    #[test]
    fn predicate_rejects_bad_school_id() {
        let err = DecisionPredicate::compile(&raw(&[(SCHOOL_ID_KEY, "5")])).unwrap_err();
        assert_eq!(err, TrackerConfigError::InvalidSchoolId("5".to_string()));
    }

    #[test]
    fn assignment_applies_updates() {
        let mut sud = StudentUniversityDecision::new(StudentId::new(), SchoolId::new());
        let assign =
            TrackerAssignment::compile(&raw(&[("recommendation_one_status", "assigned")])).unwrap();

        assert!(assign.apply(&mut sud, &[]));
        assert_eq!(sud.recommendation_one_status, TrackerStatus::Assigned);

        // Applying again changes nothing
        assert!(!assign.apply(&mut sud, &[]));
    }

    #[test]
    fn assignment_respects_only_alter_guard() {
        let mut sud = StudentUniversityDecision::new(StudentId::new(), SchoolId::new());
        sud.transcript_status = TrackerStatus::Received;

        let assign = TrackerAssignment::compile(&raw(&[("transcript_status", "requested")])).unwrap();

        // Received is not in the allowed set, so the write is skipped
        assert!(!assign.apply(&mut sud, &[TrackerStatus::Unset, TrackerStatus::Required]));
        assert_eq!(sud.transcript_status, TrackerStatus::Received);

        sud.transcript_status = TrackerStatus::Required;
        assert!(assign.apply(&mut sud, &[TrackerStatus::Unset, TrackerStatus::Required]));
        assert_eq!(sud.transcript_status, TrackerStatus::Requested);
    }
}

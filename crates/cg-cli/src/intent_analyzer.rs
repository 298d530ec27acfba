//! Keyword-based intent classification for retrieval answers

use std::collections::BTreeSet;

use cg_core::{FocusArea, IntentResult, QueryType};
use cg_rag::normalize;

const LOCATION_WORDS: &[&str] = &[
    "where", "located", "location", "building", "bldg", "room", "floor", "directions",
    "map", "near", "nearest", "find",
];

const PROCEDURE_WORDS: &[&str] = &[
    "how to", "how do", "how can", "steps", "step", "process", "procedure", "apply",
    "application", "requirements", "submit", "request", "claim", "deadline", "file for",
    "register", "enroll",
];

const POLICY_WORDS: &[&str] = &[
    "policy", "policies", "rule", "rules", "regulation", "regulations", "allowed",
    "prohibited", "penalty", "penalties", "sanction", "sanctions", "violation", "grading",
    "attendance", "absences", "dress code", "uniform", "conduct", "retention", "probation",
];

const ACADEMIC_WORDS: &[&str] = &[
    "grade", "grades", "grading", "gpa", "qpi", "exam", "exams", "examination", "course",
    "courses", "subject", "subjects", "class", "classes", "units", "curriculum", "honors",
    "academic", "attendance", "absences", "probation", "retention", "thesis", "shifting",
];

const ADMINISTRATIVE_WORDS: &[&str] = &[
    "enrollment", "enroll", "registrar", "registration", "tuition", "fee", "fees", "payment",
    "scholarship", "scholarships", "transcript", "tor", "certificate", "clearance",
    "admission", "id", "records", "documents",
];

const STUDENT_LIFE_WORDS: &[&str] = &[
    "organization", "organizations", "club", "clubs", "ssc", "student council", "activities",
    "events", "conduct", "discipline", "uniform", "dress code", "counseling", "guidance",
    "osa", "student affairs",
];

const FACILITIES_WORDS: &[&str] = &[
    "library", "lrc", "laboratory", "lab", "clinic", "gym", "gymnasium", "canteen",
    "building", "room", "dormitory", "parking", "wifi", "facility", "facilities",
];

/// Classifies a query by vocabulary membership; no external calls
pub struct IntentAnalyzer {
    type_vocabularies: Vec<(QueryType, &'static [&'static str])>,
    focus_vocabularies: Vec<(FocusArea, &'static [&'static str])>,
}

impl IntentAnalyzer {
    pub fn new() -> Self {
        Self {
            // First match wins
            type_vocabularies: vec![
                (QueryType::Location, LOCATION_WORDS),
                (QueryType::Procedure, PROCEDURE_WORDS),
                (QueryType::Policy, POLICY_WORDS),
            ],
            focus_vocabularies: vec![
                (FocusArea::Academic, ACADEMIC_WORDS),
                (FocusArea::Administrative, ADMINISTRATIVE_WORDS),
                (FocusArea::StudentLife, STUDENT_LIFE_WORDS),
                (FocusArea::Facilities, FACILITIES_WORDS),
            ],
        }
    }

    pub fn analyze(&self, query: &str) -> IntentResult {
        let padded = format!(" {} ", normalize(query));
        let mentions = |words: &[&str]| {
            words.iter().any(|word| padded.contains(&format!(" {} ", word)))
        };

        let query_type = self
            .type_vocabularies
            .iter()
            .find(|(_, words)| mentions(words))
            .map(|(query_type, _)| *query_type)
            .unwrap_or_default();

        let focus_areas: BTreeSet<FocusArea> = self
            .focus_vocabularies
            .iter()
            .filter(|(_, words)| mentions(words))
            .map(|(area, _)| *area)
            .collect();

        IntentResult {
            query_type,
            focus_areas,
        }
    }
}

impl Default for IntentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(query: &str) -> IntentResult {
        IntentAnalyzer::new().analyze(query)
    }

    #[test]
    fn test_query_type_priority() {
        // Location beats procedure and policy
        assert_eq!(analyze("How do I find the room for the attendance appeal?").query_type, QueryType::Location);
        // Procedure beats policy
        assert_eq!(analyze("How do I file for a grading appeal?").query_type, QueryType::Procedure);
        assert_eq!(analyze("What is the grading system?").query_type, QueryType::Policy);
        assert_eq!(analyze("Tell me about USTP").query_type, QueryType::General);
    }

    #[test]
    fn test_focus_areas_union() {
        let intent = analyze("What is the grading system?");
        assert_eq!(intent.focus_areas.into_iter().collect::<Vec<_>>(), vec![FocusArea::Academic]);

        let intent = analyze("Is the uniform required inside the library during exams?");
        assert_eq!(
            intent.focus_areas.into_iter().collect::<Vec<_>>(),
            vec![FocusArea::Academic, FocusArea::StudentLife, FocusArea::Facilities]
        );

        assert!(analyze("hello there").focus_areas.is_empty());
        assert_eq!(analyze(""), IntentResult::default());
    }

    #[test]
    fn test_whole_word_matching() {
        // "identity" must not count as "id", nor "grades" inside "upgrades"
        let intent = analyze("identity upgrades");
        assert!(intent.focus_areas.is_empty());
        assert_eq!(intent.query_type, QueryType::General);
    }
}

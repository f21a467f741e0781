//! Course tag detection.
//!
//! A course tag is a bracketed subject and course number such as
//! `[CS 3345]`. It is found by scanning an event's title and description
//! for a known subject abbreviation followed by exactly four digits.

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::error::TagPatternError;

/// Subject abbreviations recognised when none are configured.
pub const DEFAULT_SUBJECTS: &[&str] = &[
    "CS", "MATH", "PHYS", "FILM", "GOVT", "HIST", "BIOL", "CHEM", "CE", "SE",
];

/// A detected course tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CourseTag {
    /// Upper-cased subject abbreviation.
    pub subject: String,
    /// The four-digit course number.
    pub number: String,
}

impl CourseTag {
    /// Creates a tag, upper-casing the subject.
    pub fn new(subject: impl AsRef<str>, number: impl Into<String>) -> Self {
        Self {
            subject: subject.as_ref().to_uppercase(),
            number: number.into(),
        }
    }
}

impl fmt::Display for CourseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", self.subject, self.number)
    }
}

/// Finds course tags in event text.
#[derive(Debug, Clone)]
pub struct CourseTagExtractor {
    /// `None` when the subject list is empty; nothing ever matches.
    pattern: Option<Regex>,
}

impl CourseTagExtractor {
    /// Builds an extractor for the given subject abbreviations.
    ///
    /// Matching is case-insensitive. Blank entries are ignored and every
    /// subject is matched literally.
    pub fn new<I, S>(subjects: I) -> Result<Self, TagPatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = subjects
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .map(|s| regex::escape(&s))
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = RegexBuilder::new(&format!(
            r"\b({})\s?-?(\d{{4}})\b",
            alternatives.join("|")
        ))
        .case_insensitive(true)
        .build()?;

        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Builds an extractor for [`DEFAULT_SUBJECTS`].
    pub fn with_default_subjects() -> Self {
        Self::new(DEFAULT_SUBJECTS).unwrap_or(Self { pattern: None })
    }

    /// Returns the first course tag found in `summary` followed by `description`.
    pub fn extract(&self, summary: Option<&str>, description: Option<&str>) -> Option<CourseTag> {
        let pattern = self.pattern.as_ref()?;
        let text = format!("{} {}", summary.unwrap_or(""), description.unwrap_or(""));

        pattern
            .captures(&text)
            .map(|caps| CourseTag::new(&caps[1], &caps[2]))
    }
}

impl Default for CourseTagExtractor {
    fn default() -> Self {
        Self::with_default_subjects()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(summary: &str, description: &str) -> Option<String> {
        CourseTagExtractor::default()
            .extract(Some(summary), Some(description))
            .map(|tag| tag.to_string())
    }

    #[test]
    fn finds_tag_in_description() {
        assert_eq!(
            extract("Midterm Review", "Join us for CS 3345 review"),
            Some("[CS 3345]".to_string())
        );
    }

    #[test]
    fn accepts_all_separator_forms() {
        assert_eq!(extract("CS 3345 lab", ""), Some("[CS 3345]".to_string()));
        assert_eq!(extract("CS-3345 lab", ""), Some("[CS 3345]".to_string()));
        assert_eq!(extract("CS3345 lab", ""), Some("[CS 3345]".to_string()));
        assert_eq!(extract("CS -3345 lab", ""), Some("[CS 3345]".to_string()));
    }

    #[test]
    fn output_is_upper_case() {
        assert_eq!(
            extract("quiz for math 2418", ""),
            Some("[MATH 2418]".to_string())
        );
        assert_eq!(extract("Govt-2305 essay", ""), Some("[GOVT 2305]".to_string()));
    }

    #[test]
    fn rejects_three_and_five_digits() {
        assert_eq!(extract("CS 334 review", ""), None);
        assert_eq!(extract("CS 33456 review", ""), None);
    }

    #[test]
    fn rejects_digits_inside_longer_number() {
        assert_eq!(extract("room 123456", "id CS123456"), None);
        assert_eq!(extract("ref 9CS 3345", ""), None);
    }

    #[test]
    fn requires_word_boundary_before_subject() {
        assert_eq!(extract("ABCS 3345", ""), None);
    }

    #[test]
    fn unknown_subject_does_not_match() {
        assert_eq!(extract("ENGL 1301 essay", ""), None);
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(
            extract("PHYS 2325 and CS 3345", "MATH 2418"),
            Some("[PHYS 2325]".to_string())
        );
        assert_eq!(
            extract("Homework", "CHEM 1311 then BIOL 2311"),
            Some("[CHEM 1311]".to_string())
        );
    }

    #[test]
    fn missing_fields_are_empty_text() {
        let extractor = CourseTagExtractor::default();
        assert_eq!(extractor.extract(None, None), None);
        assert_eq!(
            extractor.extract(None, Some("SE 4485 demo")),
            Some(CourseTag::new("SE", "4485"))
        );
    }

    #[test]
    fn summary_and_description_are_not_glued() {
        // A single space separates the fields, so "CS" + "3345" cannot fuse.
        let extractor = CourseTagExtractor::default();
        assert_eq!(
            extractor.extract(Some("Intro CS"), Some("3345 notes")),
            Some(CourseTag::new("CS", "3345"))
        );
        assert_eq!(
            extractor.extract(Some("IntroCS"), Some("3345")),
            None
        );
    }

    #[test]
    fn extraction_is_pure() {
        let extractor = CourseTagExtractor::default();
        let first = extractor.extract(Some("Exam"), Some("FILM 1303"));
        let _ = extractor.extract(Some("CS 1337"), None);
        let second = extractor.extract(Some("Exam"), Some("FILM 1303"));
        assert_eq!(first, second);
    }

    #[test]
    fn custom_subjects_are_escaped() {
        let extractor = CourseTagExtractor::new(["EE", "C++"]).unwrap();
        assert_eq!(
            extractor.extract(Some("ee 2310 lab"), None),
            Some(CourseTag::new("EE", "2310"))
        );
        assert_eq!(extractor.extract(Some("CS 3345"), None), None);
    }

    #[test]
    fn empty_subject_list_never_matches() {
        let extractor = CourseTagExtractor::new(Vec::<String>::new()).unwrap();
        assert_eq!(extractor.extract(Some("CS 3345"), None), None);
    }
}

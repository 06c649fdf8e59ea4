//! School → class → student seeding model.
//!
//! This module holds the rules that make generated fixtures structurally
//! identical across runs: the per-section size, the group thresholds, the
//! class-wide rank counter and the section status map. Randomness only
//! affects names, gender and flags, and is injected so tests can fix it.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Students generated for every section.
pub const STUDENTS_PER_SECTION: u32 = 15;

/// Positions at each end of a section that receive a group label.
pub const GROUP_SIZE: u32 = 3;

/// Probability that a generated student is flagged as a problem student.
pub const PROBLEM_PROBABILITY: f64 = 0.10;

/// Probability that a generated student is placed in the special class.
pub const SPECIAL_CLASS_PROBABILITY: f64 = 0.05;

const SURNAMES: &[&str] = &[
    "김", "이", "박", "최", "정", "강", "조", "윤", "장", "임", "한", "오", "서", "신", "권",
];

const GIVEN_NAMES: &[&str] = &[
    "민준", "서준", "도윤", "예준", "시우", "하준", "지호", "지유", "서윤", "서연", "민서", "지우",
    "하은", "지아", "서현", "지민", "수빈",
];

/// Progress of a single section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    /// Students are still being entered.
    InProgress,
    /// Student entry is finished.
    Completed,
}

impl SectionStatus {
    /// Storage spelling of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            SectionStatus::InProgress => "in_progress",
            SectionStatus::Completed => "completed",
        }
    }
}

/// Typed view of a class's `section_statuses` column.
///
/// Keys are section numbers. The stored form is a JSON object keyed by the
/// section number as a string, e.g. `{"1":"completed","2":"in_progress"}`.
///
/// # Examples
///
/// ```
/// use roster_core::{SectionStatus, SectionStatuses};
///
/// let statuses = SectionStatuses::uniform(3, SectionStatus::Completed);
/// assert_eq!(
///     statuses.to_json().unwrap(),
///     r#"{"1":"completed","2":"completed","3":"completed"}"#
/// );
/// assert!(statuses.covers_exactly(3));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionStatuses(BTreeMap<u32, SectionStatus>);

impl SectionStatuses {
    /// Creates a map assigning `status` to every section `1..=section_count`.
    pub fn uniform(section_count: u32, status: SectionStatus) -> Self {
        Self((1..=section_count).map(|s| (s, status)).collect())
    }

    /// Parses the stored JSON form. Blank input yields an empty map.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw)
    }

    /// Serializes to the stored JSON form.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Status of one section.
    pub fn get(&self, section: u32) -> Option<SectionStatus> {
        self.0.get(&section).copied()
    }

    /// Sets the status of one section.
    pub fn set(&mut self, section: u32, status: SectionStatus) {
        self.0.insert(section, status);
    }

    /// Iterates `(section, status)` pairs in section order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, SectionStatus)> + '_ {
        self.0.iter().map(|(s, st)| (*s, *st))
    }

    /// Number of sections present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no sections are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the keys are exactly `1..=section_count`.
    pub fn covers_exactly(&self, section_count: u32) -> bool {
        self.0.len() == section_count as usize && self.0.keys().copied().eq(1..=section_count)
    }

    /// Returns `true` if every present section has `status`.
    pub fn all(&self, status: SectionStatus) -> bool {
        self.0.values().all(|s| *s == status)
    }
}

/// Student gender as stored (`M` / `F`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    /// Storage code.
    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }
}

/// Separation group label assigned by position within a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupLabel {
    /// No group; stored as the empty string.
    #[serde(rename = "")]
    Ungrouped,
    #[serde(rename = "group1")]
    Group1,
    #[serde(rename = "group2")]
    Group2,
}

impl GroupLabel {
    /// Label for a 1-based position within a section of
    /// [`STUDENTS_PER_SECTION`] students.
    ///
    /// The first [`GROUP_SIZE`] positions are `group1`, the last
    /// [`GROUP_SIZE`] are `group2`, and the rest are ungrouped.
    ///
    /// ```
    /// use roster_core::GroupLabel;
    ///
    /// assert_eq!(GroupLabel::for_position(1), GroupLabel::Group1);
    /// assert_eq!(GroupLabel::for_position(8), GroupLabel::Ungrouped);
    /// assert_eq!(GroupLabel::for_position(15), GroupLabel::Group2);
    /// ```
    pub fn for_position(position: u32) -> Self {
        if position <= GROUP_SIZE {
            GroupLabel::Group1
        } else if position > STUDENTS_PER_SECTION - GROUP_SIZE {
            GroupLabel::Group2
        } else {
            GroupLabel::Ungrouped
        }
    }

    /// Storage spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            GroupLabel::Ungrouped => "",
            GroupLabel::Group1 => "group1",
            GroupLabel::Group2 => "group2",
        }
    }

    /// Returns `true` for `group1` and `group2`.
    pub fn is_grouped(self) -> bool {
        !matches!(self, GroupLabel::Ungrouped)
    }
}

/// What to seed: one class of one school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedTarget {
    /// School name; the lookup key for the school row.
    pub school: String,
    /// Grade; together with the school, the lookup key for the class row.
    pub grade: u32,
    /// Desired number of sections in the class.
    pub section_count: u32,
}

impl SeedTarget {
    /// Creates a target.
    pub fn new(school: impl Into<String>, grade: u32, section_count: u32) -> Self {
        Self {
            school: school.into(),
            grade,
            section_count,
        }
    }

    /// Rejects empty school names and zero grade or section counts.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.school.trim().is_empty() {
            return Err(ValidationError::EmptySchoolName);
        }
        if self.grade == 0 {
            return Err(ValidationError::InvalidGrade);
        }
        if self.section_count == 0 {
            return Err(ValidationError::InvalidSectionCount);
        }
        Ok(())
    }

    /// Number of students a seeded class holds.
    pub fn student_count(&self) -> u32 {
        self.section_count * STUDENTS_PER_SECTION
    }
}

/// A synthesized student, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDraft {
    /// Section number, `1..=section_count`.
    pub section: u32,
    /// 1-based position within the section.
    pub position: u32,
    pub name: String,
    pub gender: Gender,
    pub is_problem: bool,
    pub is_special_class: bool,
    pub is_underachiever: bool,
    pub group: GroupLabel,
    /// Class-wide rank, `1..=section_count * STUDENTS_PER_SECTION`.
    pub rank: u32,
}

/// Synthesizes the full student list for a class.
///
/// Sections are generated in order and the rank counter runs across the
/// whole class, so ranks are contiguous from 1 with no duplicates.
pub fn generate_students<R: Rng + ?Sized>(rng: &mut R, section_count: u32) -> Vec<StudentDraft> {
    let mut students = Vec::with_capacity((section_count * STUDENTS_PER_SECTION) as usize);
    let mut rank = 0;
    for section in 1..=section_count {
        for position in 1..=STUDENTS_PER_SECTION {
            rank += 1;
            students.push(StudentDraft {
                section,
                position,
                name: random_name(rng),
                gender: if rng.gen_bool(0.5) {
                    Gender::Male
                } else {
                    Gender::Female
                },
                is_problem: rng.gen_bool(PROBLEM_PROBABILITY),
                is_special_class: rng.gen_bool(SPECIAL_CLASS_PROBABILITY),
                is_underachiever: false,
                group: GroupLabel::for_position(position),
                rank,
            });
        }
    }
    students
}

fn random_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let surname = SURNAMES[rng.gen_range(0..SURNAMES.len())];
    let given = GIVEN_NAMES[rng.gen_range(0..GIVEN_NAMES.len())];
    format!("{surname}{given}")
}

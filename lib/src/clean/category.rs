//! Categorical taxonomies and the keyword rules mapping raw cell text onto them.
//!
//! Every taxonomy has a `classify` function returning `None` for text no rule recognises, and a
//! `clean` function taking a cell, which logs unrecognised values and substitutes the fallback
//! label. Feeding a canonical label back through `classify` returns the same label.

use super::text::{flatten, CR_MARKER};
use crate::record::CellValue;
use aho_corasick::{AhoCorasick, AhoCorasickBuilder};
use once_cell::sync::Lazy;
use qu::ick_use::*;
use serde::Serialize;
use std::fmt;

/// A fixed, ordered list of canonical labels.
pub trait Taxonomy: Copy + Eq + 'static {
    /// Every category, in display order.
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.label() == label)
    }
}

macro_rules! taxonomy_display {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

taxonomy_display!(
    Outcome,
    Sex,
    YesNo,
    SeriousnessOutcome,
    ActionTaken,
    Qualification,
    ReportType
);

fn lower_flat(raw: &str) -> String {
    flatten(raw).to_lowercase()
}

fn warn_unrecognised(dimension: &str, raw: &str, fallback: &str) {
    event!(
        Level::WARN,
        "unrecognised {} value \"{}\", counting as \"{}\"",
        dimension,
        raw,
        fallback
    );
}

// Outcome

/// The reaction outcome.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Outcome {
    Recovered,
    Recovering,
    RecoveredWithSequelae,
    NotRecovered,
    Died,
    Unknown,
}

impl Taxonomy for Outcome {
    const ALL: &'static [Self] = &[
        Outcome::Recovered,
        Outcome::Recovering,
        Outcome::RecoveredWithSequelae,
        Outcome::NotRecovered,
        Outcome::Died,
        Outcome::Unknown,
    ];

    fn label(self) -> &'static str {
        match self {
            Outcome::Recovered => "Recovered",
            Outcome::Recovering => "Recovering",
            Outcome::RecoveredWithSequelae => "Recovered with sequelae",
            Outcome::NotRecovered => "Not recovered",
            Outcome::Died => "Died",
            Outcome::Unknown => "Unknown",
        }
    }
}

impl Outcome {
    pub fn clean(value: &CellValue) -> Self {
        let raw = value.as_text().unwrap_or_default();
        match Self::classify(&raw) {
            Some(outcome) => outcome,
            None => {
                warn_unrecognised("outcome", &raw, "Unknown");
                Outcome::Unknown
            }
        }
    }

    /// Apply the outcome rules in order, the first match wins.
    pub fn classify(raw: &str) -> Option<Self> {
        let text = lower_flat(raw);
        if text.is_empty() || text == "_" {
            return Some(Outcome::Unknown);
        }

        // "Unknown Unknown Unknown", "Died Died"
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() > 1 && words.iter().all(|w| *w == words[0]) {
            if let Some(outcome) = Self::single_word(words[0]) {
                return Some(outcome);
            }
        }

        let has = |needle: &str| text.contains(needle);
        let recovered = has("recovered") || has("resolved");
        let recovering = has("recovering") || has("resolving");

        // checked early, "not recovered" contains "recovered"
        if has("not recovered") || has("not resolved") {
            return Some(Outcome::NotRecovered);
        }
        if has("/") {
            if recovering {
                return Some(Outcome::Recovering);
            }
            if recovered {
                return Some(if has("sequelae") {
                    Outcome::RecoveredWithSequelae
                } else {
                    Outcome::Recovered
                });
            }
        }
        if has("unknown") || has("unkown") {
            return Some(Outcome::Unknown);
        }
        if has("fatal") || has("died") || has("death") {
            return Some(Outcome::Died);
        }
        if recovered && has("sequelae") {
            return Some(Outcome::RecoveredWithSequelae);
        }
        if recovered {
            return Some(Outcome::Recovered);
        }
        if recovering {
            return Some(Outcome::Recovering);
        }
        match text.as_str() {
            "unkown" | "unknow" | "unknwon" => Some(Outcome::Unknown),
            _ => None,
        }
    }

    fn single_word(word: &str) -> Option<Self> {
        match word {
            "unknown" | "unkown" | "unknow" | "unknwon" => Some(Outcome::Unknown),
            "fatal" | "died" | "death" => Some(Outcome::Died),
            "recovered" | "resolved" => Some(Outcome::Recovered),
            "recovering" | "resolving" => Some(Outcome::Recovering),
            _ => None,
        }
    }

    /// Recovered or recovering.
    pub fn is_positive(self) -> bool {
        matches!(self, Outcome::Recovered | Outcome::Recovering)
    }

    /// Not recovered or died.
    pub fn is_negative(self) -> bool {
        matches!(self, Outcome::NotRecovered | Outcome::Died)
    }
}

// Sex

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Sex {
    Male,
    Female,
    Unknown,
    Other,
}

impl Taxonomy for Sex {
    const ALL: &'static [Self] = &[Sex::Male, Sex::Female, Sex::Unknown, Sex::Other];

    fn label(self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Unknown => "Unknown",
            Sex::Other => "Other",
        }
    }
}

impl Sex {
    pub fn clean(value: &CellValue) -> Self {
        let raw = value.as_text().unwrap_or_default();
        match Self::classify(&raw) {
            Some(sex) => sex,
            None => {
                warn_unrecognised("sex", &raw, "Other");
                Sex::Other
            }
        }
    }

    pub fn classify(raw: &str) -> Option<Self> {
        match lower_flat(raw).as_str() {
            "" | "nan" | "null" | "unknown" | "not known" | "not specified" => Some(Sex::Unknown),
            "male" | "m" => Some(Sex::Male),
            "female" | "f" => Some(Sex::Female),
            "other" => Some(Sex::Other),
            _ => None,
        }
    }
}

// Yes / No / Unknown

/// Pregnancy, lactation and IME seriousness share this taxonomy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum YesNo {
    Yes,
    No,
    Unknown,
}

impl Taxonomy for YesNo {
    const ALL: &'static [Self] = &[YesNo::Yes, YesNo::No, YesNo::Unknown];

    fn label(self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
            YesNo::Unknown => "Unknown",
        }
    }
}

impl YesNo {
    /// Clean a pregnancy or lactation status.
    pub fn clean_status(value: &CellValue, dimension: &str) -> Self {
        let raw = value.as_text().unwrap_or_default();
        match Self::classify_status(&raw) {
            Some(status) => status,
            None => {
                warn_unrecognised(dimension, &raw, "Unknown");
                YesNo::Unknown
            }
        }
    }

    pub fn classify_status(raw: &str) -> Option<Self> {
        let text = lower_flat(raw);
        match text.as_str() {
            "" | "unknown" | "not available" | "n/a" | "na" => return Some(YesNo::Unknown),
            "yes" => return Some(YesNo::Yes),
            "no" => return Some(YesNo::No),
            _ => (),
        }
        match text.chars().next() {
            Some('y') => Some(YesNo::Yes),
            Some('n') => Some(YesNo::No),
            _ => None,
        }
    }

    /// Clean the `Seriousness (IME)` flag.
    pub fn clean_seriousness(value: &CellValue) -> Self {
        let raw = value.as_text().unwrap_or_default();
        match Self::classify_seriousness(&raw) {
            Some(flag) => flag,
            None => {
                warn_unrecognised("seriousness", &raw, "Unknown");
                YesNo::Unknown
            }
        }
    }

    /// Containment rules, so doubled exports such as `YesYes` still match.
    pub fn classify_seriousness(raw: &str) -> Option<Self> {
        let text = lower_flat(raw);
        if text.is_empty() || text == "_" || text.contains("unknown") {
            Some(YesNo::Unknown)
        } else if text.contains("yes") {
            Some(YesNo::Yes)
        } else if text.contains("no") {
            Some(YesNo::No)
        } else {
            None
        }
    }
}

// Seriousness outcomes

/// Regulator-defined harm categories. A report may carry several.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SeriousnessOutcome {
    Death,
    LifeThreatening,
    Hospitalisation,
    Disabling,
    CongenitalAnomaly,
    OtherMedicallyImportant,
    /// Nothing recognised in the cell.
    NotSerious,
}

impl Taxonomy for SeriousnessOutcome {
    const ALL: &'static [Self] = &[
        SeriousnessOutcome::Death,
        SeriousnessOutcome::LifeThreatening,
        SeriousnessOutcome::Hospitalisation,
        SeriousnessOutcome::Disabling,
        SeriousnessOutcome::CongenitalAnomaly,
        SeriousnessOutcome::OtherMedicallyImportant,
        SeriousnessOutcome::NotSerious,
    ];

    fn label(self) -> &'static str {
        match self {
            SeriousnessOutcome::Death => "Results in death",
            SeriousnessOutcome::LifeThreatening => "Life threatening",
            SeriousnessOutcome::Hospitalisation => "Caused / prolonged hospitalisation",
            SeriousnessOutcome::Disabling => "Disabling / incapacitating",
            SeriousnessOutcome::CongenitalAnomaly => "Congenital anomaly / birth defect",
            SeriousnessOutcome::OtherMedicallyImportant => "Other medically important condition",
            SeriousnessOutcome::NotSerious => "Unknown / Not Serious",
        }
    }
}

/// The six specific outcomes, in the same order as their patterns in the matcher.
const SPECIFIC_OUTCOMES: [SeriousnessOutcome; 6] = [
    SeriousnessOutcome::Death,
    SeriousnessOutcome::LifeThreatening,
    SeriousnessOutcome::Hospitalisation,
    SeriousnessOutcome::Disabling,
    SeriousnessOutcome::CongenitalAnomaly,
    SeriousnessOutcome::OtherMedicallyImportant,
];

static OUTCOME_MATCHER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .build(SPECIFIC_OUTCOMES.iter().map(|o| o.label()))
});

impl SeriousnessOutcome {
    /// Every specific outcome mentioned in the cell, in taxonomy order without repeats.
    ///
    /// An empty list means the report counts under [`SeriousnessOutcome::NotSerious`].
    pub fn parse(value: &CellValue) -> Vec<Self> {
        match value.as_text() {
            Some(text) => Self::parse_str(&text),
            None => vec![],
        }
    }

    pub fn parse_str(raw: &str) -> Vec<Self> {
        let text = raw.replace(CR_MARKER, "").replace('\r', "");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut found = [false; 6];
        for mat in OUTCOME_MATCHER.find_overlapping_iter(&text) {
            found[mat.pattern()] = true;
        }
        SPECIFIC_OUTCOMES
            .iter()
            .zip(found)
            .filter_map(|(outcome, hit)| hit.then(|| *outcome))
            .collect()
    }

    pub fn classify(raw: &str) -> Option<Self> {
        Self::parse_str(raw)
            .first()
            .copied()
            .or_else(|| Self::from_label(raw.trim()))
    }
}

// Action taken

/// The action taken with the suspect drug. Cells may list several, one per line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ActionTaken {
    DrugStopped,
    DoseReduced,
    DoseIncreased,
    DrugNotChanged,
    MonitoringIncreased,
    DrugReintroduced,
    Unknown,
    NotApplicable,
    Other,
}

impl Taxonomy for ActionTaken {
    const ALL: &'static [Self] = &[
        ActionTaken::DrugStopped,
        ActionTaken::DoseReduced,
        ActionTaken::DoseIncreased,
        ActionTaken::DrugNotChanged,
        ActionTaken::MonitoringIncreased,
        ActionTaken::DrugReintroduced,
        ActionTaken::Unknown,
        ActionTaken::NotApplicable,
        ActionTaken::Other,
    ];

    fn label(self) -> &'static str {
        match self {
            ActionTaken::DrugStopped => "Drug stopped",
            ActionTaken::DoseReduced => "Dose reduced",
            ActionTaken::DoseIncreased => "Dose increased",
            ActionTaken::DrugNotChanged => "Drug not changed",
            ActionTaken::MonitoringIncreased => "Monitoring increased",
            ActionTaken::DrugReintroduced => "Drug reintroduced",
            ActionTaken::Unknown => "Unknown",
            ActionTaken::NotApplicable => "Not applicable",
            ActionTaken::Other => "Other",
        }
    }
}

impl ActionTaken {
    /// Normalise one segment of an action-taken cell.
    pub fn clean_segment(segment: &str) -> Self {
        match Self::classify(segment) {
            Some(action) => action,
            None => {
                warn_unrecognised("action taken", segment, "Other");
                ActionTaken::Other
            }
        }
    }

    pub fn classify(raw: &str) -> Option<Self> {
        let text = lower_flat(raw);
        let has = |needle: &str| text.contains(needle);
        if has("stopped") || has("withdrawn") {
            Some(ActionTaken::DrugStopped)
        } else if has("dose") && has("reduced") {
            Some(ActionTaken::DoseReduced)
        } else if has("dose") && has("increased") {
            Some(ActionTaken::DoseIncreased)
        } else if has("not changed") || has("no change") {
            Some(ActionTaken::DrugNotChanged)
        } else if has("monitoring") {
            Some(ActionTaken::MonitoringIncreased)
        } else if has("reintroduced") {
            Some(ActionTaken::DrugReintroduced)
        } else if has("unknown") {
            Some(ActionTaken::Unknown)
        } else if has("not applicable") {
            Some(ActionTaken::NotApplicable)
        } else if text == "other" {
            Some(ActionTaken::Other)
        } else {
            None
        }
    }
}

// Reporter qualification

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Qualification {
    Physician,
    Pharmacist,
    OtherHealthProfessional,
    Lawyer,
    PatientConsumer,
    OtherNonHealthProfessional,
    Unknown,
}

impl Taxonomy for Qualification {
    const ALL: &'static [Self] = &[
        Qualification::Physician,
        Qualification::Pharmacist,
        Qualification::OtherHealthProfessional,
        Qualification::Lawyer,
        Qualification::PatientConsumer,
        Qualification::OtherNonHealthProfessional,
        Qualification::Unknown,
    ];

    fn label(self) -> &'static str {
        match self {
            Qualification::Physician => "Physician",
            Qualification::Pharmacist => "Pharmacist",
            Qualification::OtherHealthProfessional => "Other Health Professional",
            Qualification::Lawyer => "Lawyer",
            Qualification::PatientConsumer => "Patient/Consumer",
            Qualification::OtherNonHealthProfessional => "Other non-health professional",
            Qualification::Unknown => "Unknown",
        }
    }
}

impl Qualification {
    pub fn clean_segment(segment: &str) -> Self {
        match Self::classify(segment) {
            Some(q) => q,
            None => {
                warn_unrecognised("reporter qualification", segment, "Unknown");
                Qualification::Unknown
            }
        }
    }

    pub fn classify(raw: &str) -> Option<Self> {
        let text = lower_flat(raw);
        let has = |needle: &str| text.contains(needle);
        if has("non health professional") || has("non-health professional") {
            Some(Qualification::OtherNonHealthProfessional)
        } else if has("physician") || has("doctor") {
            Some(Qualification::Physician)
        } else if has("pharmacist") {
            Some(Qualification::Pharmacist)
        } else if has("other health professional") {
            Some(Qualification::OtherHealthProfessional)
        } else if has("lawyer") {
            Some(Qualification::Lawyer)
        } else if has("patient") || has("consumer") {
            Some(Qualification::PatientConsumer)
        } else if text.is_empty() || has("unknown") {
            Some(Qualification::Unknown)
        } else {
            None
        }
    }

    /// Physicians, pharmacists and other health professionals.
    pub fn is_healthcare(self) -> bool {
        matches!(
            self,
            Qualification::Physician
                | Qualification::Pharmacist
                | Qualification::OtherHealthProfessional
        )
    }
}

// Report type

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ReportType {
    Spontaneous,
    Study,
    Other,
    NotAvailable,
}

impl Taxonomy for ReportType {
    const ALL: &'static [Self] = &[
        ReportType::Spontaneous,
        ReportType::Study,
        ReportType::Other,
        ReportType::NotAvailable,
    ];

    fn label(self) -> &'static str {
        match self {
            ReportType::Spontaneous => "Spontaneous report",
            ReportType::Study => "Report from study",
            ReportType::Other => "Other",
            ReportType::NotAvailable => "Not available to sender or unknown",
        }
    }
}

impl ReportType {
    pub fn clean(value: &CellValue) -> Self {
        let raw = value.as_text().unwrap_or_default();
        match Self::classify(&raw) {
            Some(t) => t,
            None => {
                warn_unrecognised("report type", &raw, "Other");
                ReportType::Other
            }
        }
    }

    pub fn classify(raw: &str) -> Option<Self> {
        let text = lower_flat(raw);
        let has = |needle: &str| text.contains(needle);
        if text.is_empty() || has("not available") || has("unknown") {
            Some(ReportType::NotAvailable)
        } else if has("spontaneous") {
            Some(ReportType::Spontaneous)
        } else if has("study") {
            Some(ReportType::Study)
        } else if text == "other" {
            Some(ReportType::Other)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_idempotent<T: Taxonomy + fmt::Debug>(classify: impl Fn(&str) -> Option<T>) {
        for category in T::ALL {
            assert_eq!(
                classify(category.label()),
                Some(*category),
                "{}",
                category.label()
            );
        }
    }

    #[test]
    fn outcome_rules() {
        assert_eq!(
            Outcome::classify("Unknown Unknown Unknown"),
            Some(Outcome::Unknown)
        );
        assert_eq!(
            Outcome::classify("Recovering / Resolving"),
            Some(Outcome::Recovering)
        );
        assert_eq!(
            Outcome::classify("recovered with sequelae"),
            Some(Outcome::RecoveredWithSequelae)
        );
        assert_eq!(
            Outcome::classify("Recovered/Resolved with sequelae"),
            Some(Outcome::RecoveredWithSequelae)
        );
        assert_eq!(
            Outcome::classify("Recovered / Resolved"),
            Some(Outcome::Recovered)
        );
        assert_eq!(Outcome::classify("Died Died"), Some(Outcome::Died));
        assert_eq!(Outcome::classify("Fatal"), Some(Outcome::Died));
        assert_eq!(
            Outcome::classify("Not recovered / Not resolved"),
            Some(Outcome::NotRecovered)
        );
        assert_eq!(Outcome::classify("unknwon"), Some(Outcome::Unknown));
        assert_eq!(Outcome::classify("_x000D_"), Some(Outcome::Unknown));
        assert_eq!(Outcome::classify("xyz-nonsense"), None);
        assert_eq!(
            Outcome::clean(&CellValue::from("xyz-nonsense")),
            Outcome::Unknown
        );
        assert_eq!(Outcome::clean(&CellValue::Empty), Outcome::Unknown);
    }

    #[test]
    fn canonical_labels_are_fixed_points() {
        assert_idempotent(Outcome::classify);
        assert_idempotent(Sex::classify);
        assert_idempotent(YesNo::classify_status);
        assert_idempotent(YesNo::classify_seriousness);
        assert_idempotent(SeriousnessOutcome::classify);
        assert_idempotent(ActionTaken::classify);
        assert_idempotent(Qualification::classify);
        assert_idempotent(ReportType::classify);
    }

    #[test]
    fn sex_rules() {
        assert_eq!(Sex::classify(" female "), Some(Sex::Female));
        assert_eq!(Sex::classify("M"), Some(Sex::Male));
        assert_eq!(Sex::classify("NaN"), Some(Sex::Unknown));
        assert_eq!(Sex::classify("intersex"), None);
        assert_eq!(Sex::clean(&CellValue::from("intersex")), Sex::Other);
    }

    #[test]
    fn status_rules() {
        assert_eq!(YesNo::classify_status("Not available"), Some(YesNo::Unknown));
        assert_eq!(YesNo::classify_status("Y"), Some(YesNo::Yes));
        assert_eq!(YesNo::classify_status("no_x000D_"), Some(YesNo::No));
        assert_eq!(YesNo::classify_status("?"), None);
    }

    #[test]
    fn seriousness_rules() {
        assert_eq!(YesNo::classify_seriousness("YesYes"), Some(YesNo::Yes));
        assert_eq!(YesNo::classify_seriousness("No_x000D_\n"), Some(YesNo::No));
        assert_eq!(YesNo::classify_seriousness("Unknown"), Some(YesNo::Unknown));
        assert_eq!(YesNo::classify_seriousness("maybe"), None);
    }

    #[test]
    fn seriousness_outcomes() {
        let found = SeriousnessOutcome::parse(&CellValue::from(
            "Life threatening_x000D_\nResults in deathResults in death",
        ));
        assert_eq!(
            found,
            vec![SeriousnessOutcome::Death, SeriousnessOutcome::LifeThreatening]
        );
        assert!(SeriousnessOutcome::parse(&CellValue::from("_")).is_empty());
        assert!(SeriousnessOutcome::parse(&CellValue::Empty).is_empty());
    }

    #[test]
    fn action_rules() {
        assert_eq!(
            ActionTaken::classify("Drug withdrawn"),
            Some(ActionTaken::DrugStopped)
        );
        assert_eq!(
            ActionTaken::classify("Dose not changed"),
            Some(ActionTaken::DrugNotChanged)
        );
        assert_eq!(ActionTaken::classify("something else"), None);
        assert_eq!(
            ActionTaken::clean_segment("something else"),
            ActionTaken::Other
        );
    }

    #[test]
    fn qualification_rules() {
        assert_eq!(
            Qualification::classify("Medical Doctor"),
            Some(Qualification::Physician)
        );
        assert_eq!(
            Qualification::classify("Consumer or other non health professional"),
            Some(Qualification::OtherNonHealthProfessional)
        );
        assert_eq!(
            Qualification::clean_segment("astronaut"),
            Qualification::Unknown
        );
        assert!(Qualification::Pharmacist.is_healthcare());
        assert!(!Qualification::Lawyer.is_healthcare());
    }

    #[test]
    fn report_type_rules() {
        assert_eq!(
            ReportType::classify("Spontaneous"),
            Some(ReportType::Spontaneous)
        );
        assert_eq!(ReportType::classify(""), Some(ReportType::NotAvailable));
        assert_eq!(ReportType::clean(&CellValue::from("Literature")), ReportType::Other);
    }
}

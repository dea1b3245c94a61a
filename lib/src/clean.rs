//! Value cleaners: pure functions from raw cells to normalised values.

mod age;
mod category;
mod date;
mod text;

pub use self::{
    age::{age_in_days, parse_age_text, AgeGroup, DAYS_PER_MONTH, DAYS_PER_YEAR},
    category::{
        ActionTaken, Outcome, Qualification, ReportType, SeriousnessOutcome, Sex, Taxonomy, YesNo,
    },
    date::{
        from_excel_serial, parse_compact, parse_date, parse_date_str, parse_onset_date, OnsetDate,
    },
    text::{
        clean_free_text, clean_location, clean_organisation, flatten, is_null_token,
        split_multi, split_multi_str, split_multi_unique, CR_MARKER,
    },
};

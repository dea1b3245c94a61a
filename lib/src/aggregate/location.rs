use super::Coverage;
use crate::{
    clean::{clean_location, clean_organisation},
    derived::DerivedFields,
    freq::{format_percentage, FrequencyTable},
    record::col,
    ArcStr,
};
use serde::Serialize;

/// Label used for reports without a usable location.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Template text some exports leave in the state column.
const STATE_PLACEHOLDERS: [&str; 2] = ["reporter's state or province", "state or province"];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum LocationField {
    District,
    StateOrProvince,
    Organisation,
}

impl LocationField {
    pub fn column(self) -> &'static str {
        match self {
            LocationField::District => col::REPORTER_DISTRICT,
            LocationField::StateOrProvince => col::REPORTER_STATE,
            LocationField::Organisation => col::REPORTER_ORGANISATION,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LocationField::District => "District",
            LocationField::StateOrProvince => "State/Province",
            LocationField::Organisation => "Organization",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationSummary {
    pub field: LocationField,
    /// Names largest first, with missing values last under [`UNKNOWN_LOCATION`].
    pub table: FrequencyTable,
    pub coverage: Coverage,
    /// State cells holding template text rather than a name. Counted as missing.
    pub placeholders: usize,
}

impl LocationSummary {
    /// Named locations only, largest first.
    pub fn names(&self) -> impl Iterator<Item = (&ArcStr, usize)> + '_ {
        self.table
            .iter()
            .filter(|(label, count)| &***label != UNKNOWN_LOCATION && *count > 0)
    }

    /// The `n` most frequent names.
    pub fn top(&self, n: usize) -> FrequencyTable {
        let mut top = FrequencyTable::new();
        for (label, count) in self.names().take(n) {
            top.add_n(label, count);
        }
        top
    }

    pub fn unique(&self) -> usize {
        self.names().count()
    }

    pub fn percentage_of_total(&self, name: &str) -> String {
        format_percentage(self.table.count(name), self.coverage.total)
    }

    pub fn percentage_of_available(&self, name: &str) -> String {
        format_percentage(self.table.count(name), self.coverage.known())
    }
}

pub fn aggregate_locations(data: &DerivedFields<'_>, field: LocationField) -> LocationSummary {
    let mut names = FrequencyTable::new();
    let mut missing = 0;
    let mut placeholders = 0;
    for (_, report) in data.iter() {
        let cell = report.get(field.column());
        let name = match field {
            LocationField::Organisation => clean_organisation(cell),
            _ => clean_location(cell),
        };
        match name {
            Some(name) if is_placeholder(field, &name) => {
                placeholders += 1;
                missing += 1;
            }
            Some(name) if !name.eq_ignore_ascii_case(UNKNOWN_LOCATION) => names.add(&name),
            _ => missing += 1,
        }
    }
    let mut table = names.sorted_desc();
    if missing > 0 {
        table.add_n(UNKNOWN_LOCATION, missing);
    }
    LocationSummary {
        field,
        table,
        coverage: Coverage::new(data.len(), missing),
        placeholders,
    }
}

fn is_placeholder(field: LocationField, name: &str) -> bool {
    field == LocationField::StateOrProvince
        && STATE_PLACEHOLDERS
            .iter()
            .any(|p| name.eq_ignore_ascii_case(p))
}

/// Broad kind of reporting organisation, from keywords in its name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum OrganisationType {
    HospitalOrClinic,
    Pharmaceutical,
    MonitoringCentre,
    Other,
}

impl OrganisationType {
    pub fn from_name(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("hospital") || name.contains("clinic") {
            OrganisationType::HospitalOrClinic
        } else if name.contains("pharma") {
            OrganisationType::Pharmaceutical
        } else if name.contains("umc") {
            OrganisationType::MonitoringCentre
        } else {
            OrganisationType::Other
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            OrganisationType::HospitalOrClinic => "#2196F3",
            OrganisationType::Pharmaceutical => "#4CAF50",
            OrganisationType::MonitoringCentre => "#FF9800",
            OrganisationType::Other => "#9C27B0",
        }
    }
}

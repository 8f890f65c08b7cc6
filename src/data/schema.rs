use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

/// Whether a field holds numbers or category labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Numeric,
    Categorical,
}

/// Every column the dashboard knows about, across both dataset variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldId {
    #[serde(rename = "Student_ID")]
    StudentId,
    #[serde(rename = "User_ID")]
    UserId,
    #[serde(rename = "Age")]
    Age,
    #[serde(rename = "Gender")]
    Gender,
    #[serde(rename = "University_Year")]
    UniversityYear,
    #[serde(rename = "Age_Group")]
    AgeGroup,
    #[serde(rename = "Sleep_Duration")]
    SleepDuration,
    #[serde(rename = "Study_Hours")]
    StudyHours,
    #[serde(rename = "Screen_Time")]
    ScreenTime,
    #[serde(rename = "Caffeine_Intake")]
    CaffeineIntake,
    #[serde(rename = "Physical_Activity")]
    PhysicalActivity,
    #[serde(rename = "Sleep_Quality")]
    SleepQuality,
    #[serde(rename = "Weekday_Sleep_Start")]
    WeekdaySleepStart,
    #[serde(rename = "Weekend_Sleep_Start")]
    WeekendSleepStart,
    #[serde(rename = "Weekday_Sleep_End")]
    WeekdaySleepEnd,
    #[serde(rename = "Weekend_Sleep_End")]
    WeekendSleepEnd,
    #[serde(rename = "Technology_Usage_Hours")]
    TechnologyUsageHours,
    #[serde(rename = "Social_Media_Usage_Hours")]
    SocialMediaUsageHours,
    #[serde(rename = "Gaming_Hours")]
    GamingHours,
    #[serde(rename = "Screen_Time_Hours")]
    ScreenTimeHours,
    #[serde(rename = "Sleep_Hours")]
    SleepHours,
}

impl FieldId {
    pub const ALL: [FieldId; 21] = [
        FieldId::StudentId,
        FieldId::UserId,
        FieldId::Age,
        FieldId::Gender,
        FieldId::UniversityYear,
        FieldId::AgeGroup,
        FieldId::SleepDuration,
        FieldId::StudyHours,
        FieldId::ScreenTime,
        FieldId::CaffeineIntake,
        FieldId::PhysicalActivity,
        FieldId::SleepQuality,
        FieldId::WeekdaySleepStart,
        FieldId::WeekendSleepStart,
        FieldId::WeekdaySleepEnd,
        FieldId::WeekendSleepEnd,
        FieldId::TechnologyUsageHours,
        FieldId::SocialMediaUsageHours,
        FieldId::GamingHours,
        FieldId::ScreenTimeHours,
        FieldId::SleepHours,
    ];

    /// Column name as it appears in the CSV header.
    pub fn column_name(&self) -> &'static str {
        match self {
            FieldId::StudentId => "Student_ID",
            FieldId::UserId => "User_ID",
            FieldId::Age => "Age",
            FieldId::Gender => "Gender",
            FieldId::UniversityYear => "University_Year",
            FieldId::AgeGroup => "Age_Group",
            FieldId::SleepDuration => "Sleep_Duration",
            FieldId::StudyHours => "Study_Hours",
            FieldId::ScreenTime => "Screen_Time",
            FieldId::CaffeineIntake => "Caffeine_Intake",
            FieldId::PhysicalActivity => "Physical_Activity",
            FieldId::SleepQuality => "Sleep_Quality",
            FieldId::WeekdaySleepStart => "Weekday_Sleep_Start",
            FieldId::WeekendSleepStart => "Weekend_Sleep_Start",
            FieldId::WeekdaySleepEnd => "Weekday_Sleep_End",
            FieldId::WeekendSleepEnd => "Weekend_Sleep_End",
            FieldId::TechnologyUsageHours => "Technology_Usage_Hours",
            FieldId::SocialMediaUsageHours => "Social_Media_Usage_Hours",
            FieldId::GamingHours => "Gaming_Hours",
            FieldId::ScreenTimeHours => "Screen_Time_Hours",
            FieldId::SleepHours => "Sleep_Hours",
        }
    }

    /// Look a field up by its column name. Surrounding whitespace is ignored.
    pub fn from_column_name(name: &str) -> Option<FieldId> {
        let name = name.trim();
        FieldId::ALL.iter().copied().find(|f| f.column_name() == name)
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldId::Gender | FieldId::UniversityYear | FieldId::AgeGroup => FieldKind::Categorical,
            _ => FieldKind::Numeric,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind() == FieldKind::Numeric
    }

    /// Bucket width the dashboard uses when this field is binned.
    pub fn default_bin_width(&self) -> f64 {
        match self {
            FieldId::StudyHours => 2.0,
            FieldId::PhysicalActivity => 5.0,
            _ => 1.0,
        }
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}

const STUDENT_SLEEP_FIELDS: &[FieldId] = &[
    FieldId::StudentId,
    FieldId::Age,
    FieldId::Gender,
    FieldId::UniversityYear,
    FieldId::SleepDuration,
    FieldId::StudyHours,
    FieldId::ScreenTime,
    FieldId::CaffeineIntake,
    FieldId::PhysicalActivity,
    FieldId::SleepQuality,
    FieldId::WeekdaySleepStart,
    FieldId::WeekendSleepStart,
    FieldId::WeekdaySleepEnd,
    FieldId::WeekendSleepEnd,
];

const MENTAL_HEALTH_FIELDS: &[FieldId] = &[
    FieldId::UserId,
    FieldId::Age,
    FieldId::Gender,
    FieldId::AgeGroup,
    FieldId::TechnologyUsageHours,
    FieldId::SocialMediaUsageHours,
    FieldId::GamingHours,
    FieldId::ScreenTimeHours,
    FieldId::SleepHours,
];

/// The dataset variants the dashboard can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Schema {
    StudentSleep,
    MentalHealth,
}

impl Schema {
    pub fn fields(&self) -> &'static [FieldId] {
        match self {
            Schema::StudentSleep => STUDENT_SLEEP_FIELDS,
            Schema::MentalHealth => MENTAL_HEALTH_FIELDS,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Schema::StudentSleep => "student sleep",
            Schema::MentalHealth => "mental health",
        }
    }

    pub fn contains(&self, field: FieldId) -> bool {
        self.fields().contains(&field)
    }

    /// Position of a field within a record of this schema.
    pub fn position(&self, field: FieldId) -> Option<usize> {
        self.fields().iter().position(|f| *f == field)
    }

    /// Resolve a column name to a field of this schema.
    pub fn resolve(&self, name: &str) -> Result<FieldId> {
        FieldId::from_column_name(name)
            .filter(|f| self.contains(*f))
            .ok_or_else(|| Error::UnknownField {
                field: name.to_string(),
                schema: self.name().to_string(),
            })
    }

    /// Resolve a column name that must be numeric.
    pub fn resolve_numeric(&self, name: &str) -> Result<FieldId> {
        let field = self.resolve(name)?;
        if field.is_numeric() {
            Ok(field)
        } else {
            Err(Error::FieldKind { field: name.to_string() })
        }
    }

    /// Pick the schema whose columns are all present in the header.
    ///
    /// Student sleep wins when both would match, since its column set is larger.
    pub fn detect(header: &[String]) -> Option<Schema> {
        let present: Vec<FieldId> = header.iter().filter_map(|h| FieldId::from_column_name(h)).collect();
        [Schema::StudentSleep, Schema::MentalHealth]
            .into_iter()
            .find(|schema| schema.fields().iter().all(|f| present.contains(f)))
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_round_trip() {
        for field in FieldId::ALL {
            assert_eq!(FieldId::from_column_name(field.column_name()), Some(field));
        }
        assert_eq!(FieldId::from_column_name(" Gender "), Some(FieldId::Gender));
        assert_eq!(FieldId::from_column_name("gender"), None);
    }

    #[test]
    fn resolve_rejects_fields_from_other_schema() {
        let err = Schema::StudentSleep.resolve("Age_Group").unwrap_err();
        assert!(matches!(err, Error::UnknownField { ref field, .. } if field == "Age_Group"));
        assert_eq!(Schema::MentalHealth.resolve("Age_Group").unwrap(), FieldId::AgeGroup);
    }

    #[test]
    fn resolve_numeric_rejects_categorical() {
        let err = Schema::StudentSleep.resolve_numeric("Gender").unwrap_err();
        assert!(matches!(err, Error::FieldKind { .. }));
        assert_eq!(
            Schema::StudentSleep.resolve_numeric("Study_Hours").unwrap(),
            FieldId::StudyHours
        );
    }

    #[test]
    fn detect_schema_from_header() {
        let student: Vec<String> = STUDENT_SLEEP_FIELDS.iter().map(|f| f.column_name().to_string()).collect();
        assert_eq!(Schema::detect(&student), Some(Schema::StudentSleep));

        let mut mental: Vec<String> = MENTAL_HEALTH_FIELDS.iter().map(|f| f.column_name().to_string()).collect();
        mental.push("Extra_Column".to_string());
        assert_eq!(Schema::detect(&mental), Some(Schema::MentalHealth));

        assert_eq!(Schema::detect(&["Gender".to_string()]), None);
    }

    #[test]
    fn default_bin_widths() {
        assert_eq!(FieldId::StudyHours.default_bin_width(), 2.0);
        assert_eq!(FieldId::PhysicalActivity.default_bin_width(), 5.0);
        assert_eq!(FieldId::SleepQuality.default_bin_width(), 1.0);
    }
}

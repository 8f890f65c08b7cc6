use crate::data::schema::FieldId;

/// Infer the measurement unit of a survey field from its column name.
pub fn infer_unit(field: FieldId) -> Option<&'static str> {
    if !field.is_numeric() {
        return None;
    }
    let lower = field.column_name().to_lowercase();

    if lower.contains("_id") {
        None
    } else if lower.contains("quality") {
        Some("1-10")
    } else if lower.contains("caffeine") {
        Some("cups")
    } else if lower.contains("activity") {
        Some("minutes")
    } else if lower.contains("hours") || lower.contains("duration") || lower.contains("time")
        || lower.contains("start") || lower.contains("end") {
        Some("hours")
    } else if lower == "age" {
        Some("years")
    } else {
        None
    }
}

/// Human-readable axis label: underscores become spaces, unit appended when known.
pub fn axis_label(field: FieldId) -> String {
    let name = field.column_name().replace('_', " ");
    match infer_unit(field) {
        Some(unit) => format!("{name} ({unit})"),
        None => name,
    }
}

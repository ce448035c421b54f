use crate::catalog::model::SourcePerformer;
use crate::catalog::payload::NewActor;

/// Map the source's upper-case gender enumeration onto the destination's
/// snake-case values. Unknown values are passed through lower-cased.
pub fn remap_gender(raw: &str) -> String {
    match raw.to_uppercase().as_str() {
        "MALE" => "male".to_string(),
        "FEMALE" => "female".to_string(),
        "TRANSGENDER_MALE" => "transgender_male".to_string(),
        "TRANSGENDER_FEMALE" => "transgender_female".to_string(),
        "INTERSEX" => "intersex".to_string(),
        "NON_BINARY" => "non_binary".to_string(),
        _ => raw.to_lowercase(),
    }
}

/// The source records breast type as free text; anything but blank or
/// "natural" counts as enhanced.
pub fn fake_breast_flag(raw: Option<&str>) -> bool {
    match raw.map(str::trim) {
        None | Some("") => false,
        Some(v) => !v.eq_ignore_ascii_case("natural"),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn positive(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v > 0)
}

/// Build the destination actor payload for a source performer.
pub fn new_actor(p: &SourcePerformer) -> NewActor {
    NewActor {
        name: p.name.clone(),
        gender: non_empty(&p.gender).map(|g| remap_gender(&g)),
        birthday: non_empty(&p.birthdate),
        date_of_death: non_empty(&p.death_date),
        ethnicity: non_empty(&p.ethnicity),
        nationality: non_empty(&p.country),
        height_cm: positive(p.height_cm),
        weight_kg: positive(p.weight),
        measurements: non_empty(&p.measurements),
        hair_color: non_empty(&p.hair_color),
        eye_color: non_empty(&p.eye_color),
        tattoos: non_empty(&p.tattoos),
        piercings: non_empty(&p.piercings),
        fake_boobs: fake_breast_flag(p.fake_tits.as_deref()),
    }
}

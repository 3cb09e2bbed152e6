//! Display names for loosely-typed participant records.
//!
//! Older intake forms stored names only inside `form_data`, newer ones use
//! the dedicated columns, and some records carry nothing but an email. The
//! resolver checks sources in a fixed order:
//!
//! 1. `form_data.firstName` / `form_data.lastName`
//! 2. `first_name` / `last_name`
//! 3. `display_name`
//! 4. `form_data.name`, then `form_data.fullName`
//! 5. `email`
//! 6. the participant id
//!
//! Blank values count as missing.

use serde_json::Value;

use crate::models::Participant;

pub fn resolve_display_name(p: &Participant) -> String {
    if let Some(name) = join_names(
        form_str(&p.form_data, "firstName"),
        form_str(&p.form_data, "lastName"),
    ) {
        return name;
    }

    if let Some(name) = join_names(non_blank(p.first_name.as_deref()), non_blank(p.last_name.as_deref())) {
        return name;
    }

    if let Some(name) = non_blank(p.display_name.as_deref()) {
        return name.to_string();
    }

    for key in ["name", "fullName"] {
        if let Some(name) = form_str(&p.form_data, key) {
            return name.to_string();
        }
    }

    if let Some(email) = non_blank(Some(p.email.as_str())) {
        return email.to_string();
    }

    p.id.to_string()
}

fn form_str<'a>(form_data: &'a Value, key: &str) -> Option<&'a str> {
    non_blank(form_data.get(key).and_then(Value::as_str))
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn join_names(first: Option<&str>, last: Option<&str>) -> Option<String> {
    match (first, last) {
        (Some(f), Some(l)) => Some(format!("{} {}", f, l)),
        (Some(f), None) => Some(f.to_string()),
        (None, Some(l)) => Some(l.to_string()),
        (None, None) => None,
    }
}

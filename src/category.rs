//! Free-text label normalization for designer, customer, cover type and
//! revision reason cells.
//!
//! Two matching modes exist. Designer names are looked up exactly (after
//! trimming the lookup key). Everything else is matched by marker
//! substrings in a fixed order where the first hit wins. In both modes an
//! unrecognized label is returned unchanged.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::types::{Labeled, Reason, TaskType};

static DESIGNER_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("سارا", "Sara"),
        ("Sara", "Sara"),
        ("مریم", "Maryam"),
        ("Maryam", "Maryam"),
        ("Mariam", "Maryam"),
        ("نگار", "Negar"),
        ("Negar", "Negar"),
        ("رضا", "Reza"),
        ("Reza", "Reza"),
    ])
});

pub const CUSTOMER_ENTERTAINMENT: &str = "Entertainment";
pub const CUSTOMER_MUSIC: &str = "Music";
pub const CUSTOMER_MOVIES: &str = "Movies";
pub const CUSTOMER_SPORTS: &str = "Sports";

/// How a customer marker is compared against the cell.
#[derive(Debug, Clone, Copy)]
enum Marker {
    Exact(&'static str),
    CaseInsensitive(&'static str),
}

impl Marker {
    fn found_in(self, haystack: &str) -> bool {
        match self {
            Marker::Exact(m) => haystack.contains(m),
            Marker::CaseInsensitive(m) => haystack.to_lowercase().contains(m),
        }
    }
}

// Check order is significant: entertainment, music, movies, sports.
const CUSTOMER_MARKERS: &[(Marker, &str)] = &[
    (Marker::Exact("سرگرمی"), CUSTOMER_ENTERTAINMENT),
    (Marker::Exact("موسیقی"), CUSTOMER_MUSIC),
    (Marker::Exact("موزیک"), CUSTOMER_MUSIC),
    (Marker::Exact("فیلم"), CUSTOMER_MOVIES),
    (Marker::Exact("سینما"), CUSTOMER_MOVIES),
    (Marker::CaseInsensitive("movie"), CUSTOMER_MOVIES),
    (Marker::Exact("ورزش"), CUSTOMER_SPORTS),
];

const TASK_TYPE_MARKERS: &[(&str, TaskType)] = &[
    ("سبز", TaskType::GhormeSabzi),
    ("قرمز", TaskType::Omlet),
    ("زرد", TaskType::Burger),
];

// Escalated variants carry the team-lead prefix in front of the plain
// markers, so they come first.
const REASON_MARKERS: &[(&str, Reason)] = &[
    ("تیم لید: خطای طراح", Reason::EscalatedDesignerError),
    ("تیم لید: خطای مشتری", Reason::EscalatedCustomerError),
    ("تیم لید: سلیقه", Reason::EscalatedTaste),
    ("خطای طراح", Reason::DesignerError),
    ("خطای مشتری", Reason::CustomerError),
    ("سلیقه", Reason::Taste),
];

/// Canonical roster name for a designer alias, if the trimmed label is one.
pub fn designer_alias(raw: &str) -> Option<&'static str> {
    DESIGNER_ALIASES.get(raw.trim()).copied()
}

/// Map a designer label onto the roster.
///
/// Only the lookup key is trimmed: an unmapped label comes back exactly as
/// given, surrounding whitespace included.
pub fn normalize_designer(raw: &str) -> String {
    match designer_alias(raw) {
        Some(name) => name.to_string(),
        None => raw.to_string(),
    }
}

/// Customer category for the first marker found in `raw`.
pub fn customer_category(raw: &str) -> Option<&'static str> {
    CUSTOMER_MARKERS
        .iter()
        .find(|(marker, _)| marker.found_in(raw))
        .map(|(_, category)| *category)
}

pub fn normalize_customer(raw: &str) -> String {
    customer_category(raw).map_or_else(|| raw.to_string(), str::to_string)
}

/// Map a cover-type cell onto [`TaskType`]. Canonical names are accepted
/// as-is so already-normalized data maps onto itself.
pub fn normalize_task_type(raw: &str) -> Labeled<TaskType> {
    if let Some(t) = TaskType::from_canonical(raw) {
        return Labeled::Known(t);
    }
    first_marker(raw, TASK_TYPE_MARKERS)
}

pub fn normalize_reason(raw: &str) -> Labeled<Reason> {
    if let Some(r) = Reason::from_canonical(raw) {
        return Labeled::Known(r);
    }
    first_marker(raw, REASON_MARKERS)
}

fn first_marker<T: Copy>(raw: &str, table: &[(&str, T)]) -> Labeled<T> {
    table
        .iter()
        .find(|(marker, _)| raw.contains(marker))
        .map_or_else(|| Labeled::Unmapped(raw.to_string()), |(_, v)| Labeled::Known(*v))
}

//! Plain-text rendering of meal and school records.

use gupsik_neis::{MealRecord, SchoolRecord};
use lazy_static::lazy_static;
use regex::Regex;

const NO_MEALS: &str = "오늘은 급식 정보가 없습니다.";
const NOT_AVAILABLE: &str = "정보 없음";

lazy_static! {
    static ref ALLERGY_MARKER: Regex = allergy_marker();
}

// Allergy markers look like "(1.5.6.13)"
#[allow(clippy::unwrap_used)]
fn allergy_marker() -> Regex {
    Regex::new(r"\(([0-9.]+)\)").unwrap()
}

/// One dish line, with its allergy codes split out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub name: String,
    pub allergens: Vec<String>,
}

/// `20240101` -> `2024년 01월 01일`. Anything that is not 8 digits is returned as-is.
pub fn format_date(ymd: &str) -> String {
    if ymd.len() == 8 && ymd.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}년 {}월 {}일", &ymd[0..4], &ymd[4..6], &ymd[6..8])
    } else {
        ymd.to_string()
    }
}

/// Split a raw `DDISH_NM` value into dishes.
pub fn parse_menu(dishes: &str) -> Vec<MenuItem> {
    dishes
        .split("<br/>")
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let allergens = ALLERGY_MARKER
                .captures_iter(line)
                .flat_map(|caps| {
                    caps[1]
                        .split('.')
                        .filter(|code| !code.is_empty())
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                })
                .collect();
            let name = ALLERGY_MARKER.replace_all(line, "").trim().to_string();
            MenuItem { name, allergens }
        })
        .collect()
}

pub fn render_meals(meals: &[MealRecord]) -> String {
    if meals.is_empty() {
        return format!("{}\n", NO_MEALS);
    }

    let mut out = String::new();
    for (i, meal) in meals.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!(
            "{} {}\n",
            format_date(&meal.service_date),
            meal.slot_name
        ));
        for item in parse_menu(&meal.dish_names) {
            if item.allergens.is_empty() {
                out.push_str(&format!("  - {}\n", item.name));
            } else {
                out.push_str(&format!(
                    "  - {} ({})\n",
                    item.name,
                    item.allergens.join(".")
                ));
            }
        }
        out.push_str(&format!(
            "  칼로리: {}\n",
            meal.calorie_info.as_deref().unwrap_or(NOT_AVAILABLE)
        ));
        out.push_str(&format!(
            "  원산지: {}\n",
            meal.origin_info
                .as_deref()
                .map(|o| o.replace("<br/>", ", "))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        ));
    }
    out
}

pub fn render_schools(schools: &[SchoolRecord]) -> String {
    let mut out = String::new();
    for school in schools {
        let details: Vec<&str> = [
            school.school_kind.as_deref(),
            school.region.as_deref(),
            school.edu_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();

        out.push_str(&format!(
            "{}  {} {}",
            school.school_name, school.edu_code, school.school_code
        ));
        if !details.is_empty() {
            out.push_str(&format!("  ({})", details.join(", ")));
        }
        out.push('\n');
        if let Some(address) = school.road_address.as_deref() {
            out.push_str(&format!("    {}\n", address));
        }
    }
    out
}

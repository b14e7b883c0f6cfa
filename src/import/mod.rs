//! Best-effort conversion of pasted free text into records. The parser is a
//! convenience, not a contract: it scans for section keywords and bullet
//! lines and extracts whatever it recognizes, never failing.

use serde_json::Value;

use crate::store::cases::{CaseModules, CaseRecord};

#[derive(Clone, Debug, Default)]
pub struct ParsedTechnologyText {
    pub description: Option<String>,
    pub advantages: Vec<String>,
    pub disadvantages: Vec<String>,
    pub use_cases: Vec<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    Advantages,
    Disadvantages,
    UseCases,
}

/// Every run of four or more ASCII digits, read as 4-digit years.
fn years_in(line: &str) -> Vec<i32> {
    let bytes = line.as_bytes();
    let mut years = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let mut j = i;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j - i >= 4 {
                if let Ok(year) = line[i..i + 4].parse() {
                    years.push(year);
                }
            }
            i = j;
        } else {
            i += 1;
        }
    }
    years
}

fn bullet_content(line: &str) -> Option<&str> {
    for marker in ["-", "•", "*"] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest.trim());
        }
    }
    None
}

/// Scans pasted text line by line for Russian section headers and collects
/// bullet lines under the active section. The first long, colon-free,
/// non-bulleted line becomes the description.
pub fn parse_technology_text(text: &str) -> ParsedTechnologyText {
    let mut result = ParsedTechnologyText::default();
    let mut section = Section::None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let lower = line.to_lowercase();

        if lower.contains("преимущества") || lower.contains("плюсы") {
            section = Section::Advantages;
            continue;
        }
        if lower.contains("недостатки") || lower.contains("минусы") {
            section = Section::Disadvantages;
            continue;
        }
        if lower.contains("применение") || lower.contains("использование") {
            section = Section::UseCases;
            continue;
        }
        if lower.contains("период") || lower.contains("годы") {
            let years = years_in(line);
            if let Some(first) = years.first() {
                result.start_year = Some(*first);
                if years.len() > 1 {
                    result.end_year = years.last().copied();
                }
            }
            continue;
        }

        if let Some(content) = bullet_content(line) {
            match section {
                Section::Advantages => result.advantages.push(content.to_string()),
                Section::Disadvantages => result.disadvantages.push(content.to_string()),
                Section::UseCases => result.use_cases.push(content.to_string()),
                Section::None => {}
            }
            continue;
        }

        if result.description.is_none() && !line.contains(':') && line.chars().count() >= 20 {
            result.description = Some(line.to_string());
        }
    }

    result
}

fn slug(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

const DESCRIPTION_LIMIT: usize = 2000;

/// Builds the minimally-valid case the import endpoint persists. Fields the
/// text does not yield are filled with explicit placeholders; a period the
/// parser could not date stays `"unknown"` and is later skipped by matrix
/// assembly rather than silently bucketed.
pub fn case_from_raw_text(raw_text: &str, name: Option<&str>) -> CaseRecord {
    let name = match name {
        Some(n) if !n.trim().is_empty() => n.trim().to_string(),
        _ => "Импортированный кейс".to_string(),
    };
    let parsed = parse_technology_text(raw_text);

    let period = match (parsed.start_year, parsed.end_year) {
        (Some(start), Some(end)) => format!("{start}-{end}"),
        (Some(start), None) => format!("{start}+"),
        _ => "unknown".to_string(),
    };

    let id = match parsed.start_year {
        Some(start) => format!("{}-{start}", slug(&name)),
        None => slug(&name),
    };

    CaseRecord {
        id,
        name,
        period,
        author: None,
        description: raw_text.chars().take(DESCRIPTION_LIMIT).collect(),
        strategy: "не указано".to_string(),
        timeframe: "не указано".to_string(),
        market_type: "не указано".to_string(),
        technologies: vec![],
        modules: CaseModules::default(),
        performance: None,
        code_example: None,
        advantages: parsed.advantages,
        disadvantages: parsed.disadvantages,
    }
}

/// Full-schema check before anything is written: the record must survive a
/// serialize/deserialize round trip and carry its identifying fields.
pub fn validate_case(case: &CaseRecord) -> Result<(), String> {
    if case.id.is_empty() {
        return Err("case id is empty".to_string());
    }
    if case.name.is_empty() {
        return Err("case name is empty".to_string());
    }
    if case.description.is_empty() {
        return Err("case description is empty".to_string());
    }
    let value: Value = serde_json::to_value(case).map_err(|e| e.to_string())?;
    serde_json::from_value::<CaseRecord>(value).map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Библиотека для построения торговых моделей на деревьях решений.

Преимущества:
- Высокая производительность
- Простота использования

Недостатки:
• Сложность настройки

Применение:
* Анализ временных рядов

Период: 2015-2023
";

    #[test]
    fn parses_tagged_sections() {
        let parsed = parse_technology_text(SAMPLE);
        assert_eq!(parsed.advantages.len(), 2);
        assert_eq!(parsed.advantages[0], "Высокая производительность");
        assert_eq!(parsed.disadvantages, vec!["Сложность настройки".to_string()]);
        assert_eq!(parsed.use_cases, vec!["Анализ временных рядов".to_string()]);
        assert_eq!(parsed.start_year, Some(2015));
        assert_eq!(parsed.end_year, Some(2023));
    }

    #[test]
    fn first_long_plain_line_becomes_description() {
        let parsed = parse_technology_text(SAMPLE);
        assert_eq!(
            parsed.description.as_deref(),
            Some("Библиотека для построения торговых моделей на деревьях решений.")
        );
    }

    #[test]
    fn tolerates_untagged_garbage() {
        let parsed = parse_technology_text("???\n--\n12\nшум");
        assert!(parsed.advantages.is_empty());
        assert!(parsed.description.is_none());
        assert!(parsed.start_year.is_none());
    }

    #[test]
    fn bullets_outside_a_section_are_ignored() {
        let parsed = parse_technology_text("- сирота\nПреимущества:\n- настоящий пункт");
        assert_eq!(parsed.advantages, vec!["настоящий пункт".to_string()]);
    }

    #[test]
    fn case_id_and_period_follow_parsed_years() {
        let case = case_from_raw_text(SAMPLE, Some("Tree Scalper"));
        assert_eq!(case.id, "tree-scalper-2015");
        assert_eq!(case.period, "2015-2023");
        assert!(validate_case(&case).is_ok());
    }

    #[test]
    fn yearless_text_keeps_unknown_period() {
        let case = case_from_raw_text("Просто описание некоторой системы без дат.", None);
        assert_eq!(case.period, "unknown");
        assert_eq!(case.name, "Импортированный кейс");
        assert!(validate_case(&case).is_ok());
    }

    #[test]
    fn description_is_capped_at_two_thousand_chars() {
        let raw = "я".repeat(5000);
        let case = case_from_raw_text(&raw, Some("Big"));
        assert_eq!(case.description.chars().count(), 2000);
    }
}

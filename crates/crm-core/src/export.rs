//! CSV export of list selections.

use chrono::{DateTime, Utc};

use crate::models::{Contact, Property};

pub const PROPERTY_HEADER: &str = "Name,Address,Account,Building Type,Roof Type,Stage,Last Assessment";

pub const CONTACT_HEADER: &str = "Name,Email,Phone,Role,Account,Stage,Last Interaction";

/// Render properties as CSV, one row per property in the given order.
pub fn export_properties<'a>(properties: impl IntoIterator<Item = &'a Property>) -> String {
    let mut lines = vec![PROPERTY_HEADER.to_string()];
    for p in properties {
        let account = p.account.as_ref().map(|a| a.name.as_str());
        lines.push(
            [
                quoted(Some(&p.name)),
                quoted(p.address.as_deref()),
                quoted(account),
                quoted(Some(p.building_type.label())),
                quoted(Some(p.roof_type.label())),
                quoted(Some(p.stage.label())),
                short_date(p.last_assessment),
            ]
            .join(","),
        );
    }
    lines.join("\n")
}

/// Render contacts as CSV, one row per contact in the given order.
pub fn export_contacts<'a>(contacts: impl IntoIterator<Item = &'a Contact>) -> String {
    let mut lines = vec![CONTACT_HEADER.to_string()];
    for c in contacts {
        let account = c.account.as_ref().map(|a| a.name.as_str());
        lines.push(
            [
                quoted(Some(&c.name)),
                quoted(Some(&c.email)),
                quoted(c.phone.as_deref()),
                quoted(Some(&c.role)),
                quoted(account),
                quoted(Some(c.stage.label())),
                short_date(c.last_interaction),
            ]
            .join(","),
        );
    }
    lines.join("\n")
}

/// Split CSV text into rows of unquoted fields.
///
/// Handles quoted fields with embedded commas, doubled quotes and line
/// breaks.
pub fn parse_rows(csv: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = csv.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) => in_quotes = true,
            (',', false) => row.push(std::mem::take(&mut field)),
            ('\n', false) => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            ('\r', false) => {}
            (other, _) => field.push(other),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

fn quoted(value: Option<&str>) -> String {
    format!("\"{}\"", value.unwrap_or("").replace('"', "\"\""))
}

/// US short date (`3/14/2024`), or `Never`.
fn short_date(value: Option<DateTime<Utc>>) -> String {
    match value {
        Some(ts) => ts.format("%-m/%-d/%Y").to_string(),
        None => "Never".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountRef, BuildingType, PropertyStage, RoofType};
    use chrono::TimeZone;

    fn property(name: &str, assessed: Option<DateTime<Utc>>) -> Property {
        Property {
            id: name.to_lowercase(),
            name: name.to_string(),
            address: Some("12 Elm St, Dallas, TX".to_string()),
            account: Some(AccountRef {
                id: "a1".to_string(),
                name: "Lone Star \"LSP\" Holdings".to_string(),
            }),
            building_type: BuildingType::MixedUse,
            roof_type: RoofType::ModifiedBitumen,
            stage: PropertyStage::ProposalSent,
            last_assessment: assessed,
        }
    }

    #[test]
    fn test_property_row_format() {
        let assessed = Utc.with_ymd_and_hms(2024, 3, 4, 15, 0, 0).unwrap();
        let csv = export_properties(&[property("Tower A", Some(assessed))]);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], PROPERTY_HEADER);
        assert_eq!(
            lines[1],
            "\"Tower A\",\"12 Elm St, Dallas, TX\",\"Lone Star \"\"LSP\"\" Holdings\",\"Mixed Use\",\"Modified Bitumen\",\"Proposal Sent\",3/4/2024"
        );
    }

    #[test]
    fn test_missing_date_renders_never() {
        let csv = export_properties(&[property("Annex", None)]);
        assert!(csv.ends_with(",Never"));
    }

    #[test]
    fn test_parse_rows_unquotes() {
        let csv = export_properties(&[property("Tower A", None)]);
        let rows = parse_rows(&csv);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], "12 Elm St, Dallas, TX");
        assert_eq!(rows[1][2], "Lone Star \"LSP\" Holdings");
        assert_eq!(rows[1].len(), 7);
    }

    #[test]
    fn test_contact_export_header() {
        let csv = export_contacts(std::iter::empty());
        assert_eq!(csv, CONTACT_HEADER);
    }
}

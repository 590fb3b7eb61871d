use chrono::NaiveDate;

use crate::domain::TableError;

pub const CATEGORIES: [&str; 3] = ["Standard", "Premium", "Enterprise"];
pub const TYPES: [&str; 3] = ["Business", "Personal", "Academic"];
pub const STATUSES: [&str; 3] = ["Active", "Inactive", "Pending"];

/// One row of the dataset. Records are never mutated after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub category: String,
    pub kind: String,
    pub status: String,
    pub join_date: NaiveDate,
}

impl Record {
    pub fn new(
        id: i64,
        name: &str,
        email: &str,
        category: &str,
        kind: &str,
        status: &str,
        join_date: &str,
    ) -> Result<Self, TableError> {
        Ok(Record {
            id,
            name: name.to_string(),
            email: email.to_string(),
            category: category.to_string(),
            kind: kind.to_string(),
            status: status.to_string(),
            join_date: parse_date(id, join_date)?,
        })
    }

    /// Field values in column order, as plain (unescaped) text.
    pub fn cells(&self) -> [String; 6] {
        [
            self.name.clone(),
            self.email.clone(),
            self.category.clone(),
            self.kind.clone(),
            self.status.clone(),
            format_date(&self.join_date),
        ]
    }

    // Quote like a spreadsheet would, so a copied row pastes back cleanly.
    fn wrap_cell_content(c: &str) -> String {
        let needs_escaping = c.contains('"');
        let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
        let mut out = String::from(c);

        if needs_escaping {
            out = out.replace('"', "\"\"");
        }
        if needs_wrapping || needs_escaping {
            out = format!("\"{out}\"");
        }
        out
    }

    pub fn as_csv_row(&self) -> String {
        let mut fields = vec![self.id.to_string()];
        fields.extend(self.cells().iter().map(|c| Record::wrap_cell_content(c)));
        fields.join(",")
    }
}

pub const COLUMN_NAMES: [&str; 6] = ["Name", "Email", "Category", "Type", "Status", "Join Date"];

pub fn parse_date(id: i64, value: &str) -> Result<NaiveDate, TableError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| TableError::InvalidDate {
        id,
        value: value.to_string(),
    })
}

/// US short date, e.g. `Jan 15, 2024`.
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

const BUILTIN: [(i64, &str, &str, &str, &str, &str, &str); 10] = [
    (1, "Alice Johnson", "alice.johnson@example.com", "Standard", "Business", "Active", "2024-01-15"),
    (2, "Bob Smith", "bob.smith@example.com", "Premium", "Personal", "Active", "2023-11-20"),
    (3, "Carol Davis", "carol.davis@example.com", "Enterprise", "Business", "Inactive", "2023-09-10"),
    (4, "David Wilson", "david.wilson@example.com", "Standard", "Academic", "Pending", "2024-02-01"),
    (5, "Emma Martinez", "emma.martinez@example.com", "Premium", "Business", "Active", "2023-08-25"),
    (6, "Frank Brown", "frank.brown@example.com", "Enterprise", "Personal", "Active", "2023-07-12"),
    (7, "Grace Lee", "grace.lee@example.com", "Standard", "Personal", "Inactive", "2024-01-08"),
    (8, "Henry Taylor", "henry.taylor@example.com", "Premium", "Academic", "Active", "2023-12-03"),
    (9, "Iris Anderson", "iris.anderson@example.com", "Enterprise", "Business", "Pending", "2024-02-05"),
    (10, "Jack Thompson", "jack.thompson@example.com", "Standard", "Business", "Active", "2024-01-22"),
];

pub fn builtin_records() -> Result<Vec<Record>, TableError> {
    BUILTIN
        .iter()
        .map(|&(id, name, email, category, kind, status, date)| {
            Record::new(id, name, email, category, kind, status, date)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn builtin_records_load() {
        let records = builtin_records().unwrap();
        assert_eq!(records.len(), 10);
        assert_eq!(records[0].name, "Alice Johnson");
        assert_eq!(records[9].id, 10);
    }

    #[rstest]
    #[case("2024-01-15", "Jan 15, 2024")]
    #[case("2023-07-02", "Jul 2, 2023")]
    #[case("2023-12-31", "Dec 31, 2023")]
    fn formats_dates_like_en_us(#[case] input: &str, #[case] expected: &str) {
        let date = parse_date(1, input).unwrap();
        assert_eq!(format_date(&date), expected);
    }

    #[test]
    fn rejects_bad_dates() {
        match parse_date(7, "15/01/2024") {
            Err(TableError::InvalidDate { id, value }) => {
                assert_eq!(id, 7);
                assert_eq!(value, "15/01/2024");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn csv_row_quotes_fields() {
        let r = Record::new(3, "O\"Neil, Pat", "pat@example.com", "Premium", "Business", "Active", "2024-02-01")
            .unwrap();
        assert_eq!(
            r.as_csv_row(),
            "3,\"O\"\"Neil, Pat\",pat@example.com,Premium,Business,Active,\"Feb 1, 2024\""
        );
    }
}

//! Canonical output column set and the reindexing of records onto it.

use crate::config::SchemaPolicy;
use crate::merge::header::NormalizedHeader;
use crate::merge::record::Field;
use crate::merge::record::Record;
use crate::spreadsheet::writer::Table;
use crate::spreadsheet::writer::TableValue;
use std::collections::HashSet;

/// Ordered output columns of a merge run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalSchema {
    columns: Vec<String>,
}

impl CanonicalSchema {
    /// The canonical record fields.
    pub fn fixed() -> Self {
        Self {
            columns: Field::ALL.iter().map(|field| field.name().to_owned()).collect(),
        }
    }

    /// The file column followed by every normalized name of `headers`, in
    /// first-seen order.
    pub fn union<'h>(headers: impl IntoIterator<Item = &'h NormalizedHeader>) -> Self {
        let mut columns = vec![Field::File.name().to_owned()];
        let mut seen: HashSet<String> = columns.iter().cloned().collect();
        for header in headers {
            for name in &header.names {
                if seen.insert(name.to_owned()) {
                    columns.push(name.to_owned());
                }
            }
        }
        Self { columns }
    }

    /// Schema for `policy` over the headers of every merged file.
    pub fn build<'h>(policy: SchemaPolicy, headers: impl IntoIterator<Item = &'h NormalizedHeader>) -> Self {
        match policy {
            SchemaPolicy::Fixed => Self::fixed(),
            SchemaPolicy::Union => Self::union(headers),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values of `record` in column order. A column named after a canonical
    /// field takes the field's value, any other column the raw source value.
    pub fn reindex(&self, record: &Record, date_format: &str) -> Vec<Option<TableValue>> {
        self.columns
            .iter()
            .map(|column| match Field::from_name(column) {
                Some(field) => record.value(field, date_format),
                None => record.raw(column).map(|value| TableValue::Text(value.to_owned())),
            })
            .collect()
    }

    /// Materializes `records` into a table, in the order given.
    pub fn table<'r>(&self, records: impl IntoIterator<Item = &'r Record>, date_format: &str) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: records
                .into_iter()
                .map(|record| self.reindex(record, date_format))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::header::normalize_header;

    fn header(names: &[&str]) -> NormalizedHeader {
        let labels: Vec<String> = names.iter().map(|name| name.to_string()).collect();
        normalize_header(&labels, "Дата")
    }

    #[test]
    fn fixed_columns_in_order() {
        let schema = CanonicalSchema::fixed();

        assert_eq!(schema.columns().len(), 14);
        assert_eq!(schema.columns()[0], "Файл");
        assert_eq!(schema.columns()[7], "Дата первая");
        assert_eq!(schema.columns()[13], "Количество итераций");
    }

    #[test]
    fn union_keeps_first_seen_order() {
        let first = header(&["№", "Запрос от", "Дата"]);
        let second = header(&["№", "Лист", "Дата", "Дата"]);
        let schema = CanonicalSchema::build(SchemaPolicy::Union, [&first, &second]);

        assert_eq!(schema.columns(), ["Файл", "№", "Запрос от", "Дата-1", "Лист", "Дата-2"]);
    }

    #[test]
    fn reindex_fills_missing_columns() {
        let record = Record {
            file: "A".into(),
            number: "3".into(),
            requester: Some("Иванов".into()),
            raw: vec![("Примечание".into(), "см. лист 2".into())],
            ..Record::default()
        };
        let fixed = CanonicalSchema::fixed().reindex(&record, "%d-%m-%Y");
        let union = CanonicalSchema::build(SchemaPolicy::Union, [&header(&["№", "Примечание", "Лист"])])
            .reindex(&record, "%d-%m-%Y");

        assert_eq!(fixed.len(), 14);
        assert_eq!(fixed[2], Some(TableValue::Text("Иванов".into())));
        assert!(fixed[3..13].iter().all(Option::is_none));
        assert_eq!(union, vec![
            Some(TableValue::Text("A".into())),
            Some(TableValue::Text("3".into())),
            Some(TableValue::Text("см. лист 2".into())),
            None,
        ]);
    }

    #[test]
    fn table_preserves_record_order() {
        let records = ["B", "A"].map(|file| Record {
            file: file.into(),
            number: "1".into(),
            ..Record::default()
        });
        let table = CanonicalSchema::fixed().table(&records, "%d-%m-%Y");

        assert_eq!(table.columns.len(), 14);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], Some(TableValue::Text("B".into())));
    }
}

//! Normalized records and the field reconciler that folds one body row,
//! across all of its iteration sections, into a record.

use crate::config::MergeConfig;
use crate::merge::parse::parse_date;
use crate::merge::parse::parse_number;
use crate::merge::parse::record_number;
use crate::merge::section::SectionedBody;
use crate::spreadsheet::writer::TableValue;
use crate::spreadsheet::CellGrid;
use chrono::NaiveDate;

/// Current status derived from the right-most filled group column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// A customer comment is the latest entry
    NotResolved,
    /// An organization response is the latest entry
    Actioned,
    /// A status entry is the latest entry
    Corrected,
}

impl Status {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Status::NotResolved => "Not resolved",
            Status::Actioned => "Actioned",
            Status::Corrected => "Corrected",
        }
    }
}

/// Column groups taking part in status derivation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Group {
    Comment,
    Response,
    Status,
}

impl From<Group> for Status {
    fn from(group: Group) -> Self {
        match group {
            Group::Comment => Status::NotResolved,
            Group::Response => Status::Actioned,
            Group::Status => Status::Corrected,
        }
    }
}

/// Canonical record fields, in output order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    File,
    Number,
    Requester,
    Commenter,
    Document,
    DocumentSection,
    Sheet,
    FirstDate,
    LastDate,
    Comments,
    Responses,
    Status,
    StatusNote,
    Iterations,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::File,
        Field::Number,
        Field::Requester,
        Field::Commenter,
        Field::Document,
        Field::DocumentSection,
        Field::Sheet,
        Field::FirstDate,
        Field::LastDate,
        Field::Comments,
        Field::Responses,
        Field::Status,
        Field::StatusNote,
        Field::Iterations,
    ];

    /// Output column name.
    pub const fn name(&self) -> &'static str {
        match self {
            Field::File => "Файл",
            Field::Number => "№",
            Field::Requester => "Запрос от",
            Field::Commenter => "Комментатор",
            Field::Document => "Документ",
            Field::DocumentSection => "Раздел документа",
            Field::Sheet => "Лист",
            Field::FirstDate => "Дата первая",
            Field::LastDate => "Дата последняя",
            Field::Comments => "Комментарии Заказчика",
            Field::Responses => "Ответы",
            Field::Status => "Текущий статус",
            Field::StatusNote => "Примечание к статусу",
            Field::Iterations => "Количество итераций",
        }
    }

    /// Field whose output column is called `name`.
    pub fn from_name(name: &str) -> Option<Field> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

/// One merged output row. Every field but the file and record number may be absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    pub file: String,
    pub number: String,
    pub requester: Option<String>,
    pub commenter: Option<String>,
    pub document: Option<String>,
    pub document_section: Option<String>,
    pub sheet: Option<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub comments: Option<String>,
    pub responses: Option<String>,
    pub status: Option<Status>,
    pub status_note: Option<String>,
    pub iterations: Option<usize>,
    /// Source values keyed by normalized header name, for the union schema
    pub raw: Vec<(String, String)>,
}

impl Record {
    /// Output value of a canonical field.
    pub fn value(&self, field: Field, date_format: &str) -> Option<TableValue> {
        let text = |value: &Option<String>| value.clone().map(TableValue::Text);
        let date = |value: &Option<NaiveDate>| {
            value.map(|date| TableValue::Text(date.format(date_format).to_string()))
        };
        match field {
            Field::File => Some(TableValue::Text(self.file.to_owned())),
            Field::Number => Some(TableValue::Text(self.number.to_owned())),
            Field::Requester => text(&self.requester),
            Field::Commenter => text(&self.commenter),
            Field::Document => text(&self.document),
            Field::DocumentSection => text(&self.document_section),
            Field::Sheet => text(&self.sheet),
            Field::FirstDate => date(&self.first_date),
            Field::LastDate => date(&self.last_date),
            Field::Comments => text(&self.comments),
            Field::Responses => text(&self.responses),
            Field::Status => self.status.map(|status| TableValue::Text(status.as_str().to_owned())),
            Field::StatusNote => text(&self.status_note),
            Field::Iterations => self.iterations.map(|count| TableValue::Number(count as f64)),
        }
    }

    /// Raw source value under a normalized header name.
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.raw
            .iter()
            .find(|(label, _)| label == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Folds body rows into records according to the run configuration.
pub struct Reconciler<'c> {
    config: &'c MergeConfig,
}

impl<'c> Reconciler<'c> {
    pub fn new(config: &'c MergeConfig) -> Self {
        Self { config }
    }

    /// Records for every qualifying row of `body`, in row order.
    pub fn records<G: CellGrid + ?Sized>(&self, body: &SectionedBody<'_, G>, file: &str) -> Vec<Record> {
        body.rows()
            .filter_map(|row| self.reconcile(body, row, file))
            .collect()
    }

    /// Builds the record for grid `row`, or `None` when the row's identifier
    /// is absent or not numeric.
    pub fn reconcile<G: CellGrid + ?Sized>(&self, body: &SectionedBody<'_, G>, row: usize, file: &str) -> Option<Record> {
        let identifier = body.identifier(row).filter(|value| parse_number(value).is_some())?;
        let candidates = &self.config.candidates;
        let mut record = Record {
            file: file.to_owned(),
            number: record_number(identifier),
            requester: self.first_present(body, row, &candidates.requester),
            commenter: self.first_present(body, row, &candidates.commenter),
            document: self.first_present(body, row, &candidates.document),
            document_section: self.first_present(body, row, &candidates.document_section),
            sheet: self.first_present(body, row, &candidates.sheet),
            ..Record::default()
        };

        let dates: Vec<NaiveDate> = body.header().markers
            .iter()
            .filter_map(|&col| body.cell(row, col))
            .filter_map(parse_date)
            .collect();
        match dates.as_slice() {
            [] => {}
            [only] => {
                record.first_date = Some(*only);
                record.last_date = None;
            }
            [first, .., last] => {
                record.first_date = Some(*first);
                record.last_date = Some(*last);
            }
        }

        let filled = self.filled_groups(body, row);
        record.comments = self.enumerate(filled.iter().filter(|(group, _)| *group == Group::Comment));
        record.responses = self.enumerate(filled.iter().filter(|(group, _)| *group == Group::Response));
        let count = filled.iter().filter(|(group, _)| *group == Group::Comment).count();
        record.iterations = (count > 0).then_some(count);
        if let Some((group, value)) = filled.last() {
            record.status = Some(Status::from(*group));
            if *group == Group::Status {
                record.status_note = Some(value.to_string());
            }
        }

        record.raw = self.raw_values(body, row);
        Some(record)
    }

    /// First candidate column holding a meaningful value.
    fn first_present<G: CellGrid + ?Sized>(&self, body: &SectionedBody<'_, G>, row: usize, names: &[String]) -> Option<String> {
        names
            .iter()
            .filter_map(|name| body.named(row, name))
            .find(|value| !self.config.is_placeholder(value))
            .map(|value| value.trim().to_owned())
    }

    /// Meaningful group values of the row, left to right, trimmed.
    fn filled_groups<'b, G: CellGrid + ?Sized>(&self, body: &SectionedBody<'b, G>, row: usize) -> Vec<(Group, &'b str)> {
        body.header().names
            .iter()
            .enumerate()
            .filter_map(|(col, name)| {
                let group = self.group_of(name)?;
                let value = body.cell(row, col).filter(|value| !self.config.is_placeholder(value))?;
                Some((group, value.trim()))
            })
            .collect()
    }

    fn group_of(&self, name: &str) -> Option<Group> {
        let groups = &self.config.groups;
        if starts_with_word(name, &groups.status) {
            Some(Group::Status)
        } else if starts_with_word(name, &groups.response) {
            Some(Group::Response)
        } else if starts_with_word(name, &groups.comment) {
            Some(Group::Comment)
        } else {
            None
        }
    }

    /// Joins values as `1) first`, `2) second`, ... ; `None` for no values.
    fn enumerate<'v>(&self, values: impl Iterator<Item = &'v (Group, &'v str)>) -> Option<String> {
        let items: Vec<String> = values
            .enumerate()
            .map(|(index, (_, value))| format!("{}) {}", index + 1, value))
            .collect();
        (!items.is_empty()).then(|| items.join(&self.config.separator))
    }

    /// Meaningful cells of the row by normalized name; date columns are
    /// reformatted and dropped when they do not parse.
    fn raw_values<G: CellGrid + ?Sized>(&self, body: &SectionedBody<'_, G>, row: usize) -> Vec<(String, String)> {
        let header = body.header();
        header.names
            .iter()
            .enumerate()
            .filter_map(|(col, name)| {
                let value = body.cell(row, col).filter(|value| !self.config.is_placeholder(value))?;
                let value = if header.markers.contains(&col) {
                    parse_date(value)?.format(&self.config.date_format).to_string()
                } else {
                    value.trim().to_owned()
                };
                Some((name.to_owned(), value))
            })
            .collect()
    }
}

/// True when `name` starts with `prefix` as a whole word: `Ответ`, `Ответ-2`
/// and `Ответ исполнителя` match `Ответ`, `Ответственный` does not.
fn starts_with_word(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .is_some_and(|rest| !rest.starts_with(char::is_alphanumeric))
}

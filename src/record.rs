use serde::Deserialize;
use thiserror::Error;

use crate::authors::{clean_author, format_author_short};
use crate::normalize::normalize;

/// Value of `published` meaning the preprint has no journal DOI yet.
pub const PUBLISHED_SENTINEL: &str = "NA";

const ID_PREFIX: &str = "8888";
const ID_SUFFIX_LIMIT: u64 = 100_000_000;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("counter value {0} does not fit in the 8-digit id suffix")]
    IdOverflow(u64),
    #[error("record has no authors")]
    NoAuthors,
}

/// One entry of the details API `collection` array.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceRecord {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Semicolon-delimited raw author names.
    pub authors: String,
    pub date: String,
    pub author_corresponding_institution: String,
    pub published: String,
}

/// The fields substituted into the SQL template, ready for output.
#[derive(Debug, Clone)]
pub struct OutputRecord {
    pub generated_id: String,
    pub title: String,
    pub abstract_text: String,
    pub short_citation: String,
    pub author_list: String,
    pub date: String,
    pub institution: String,
    pub doi_label: String,
}

#[derive(Debug)]
pub enum Assembled {
    Record(OutputRecord),
    /// The preprint already carries a journal DOI; nothing is emitted.
    AlreadyPublished { published: String },
}

/// Synthetic publication id: the "8888" prefix plus the counter zero-padded
/// to 8 digits. The suffix width is fixed, so a counter past 8 digits is an
/// error rather than a wider id.
pub fn generated_id(counter: u64) -> Result<String, RecordError> {
    if counter >= ID_SUFFIX_LIMIT {
        return Err(RecordError::IdOverflow(counter));
    }
    Ok(format!("{}{:08}", ID_PREFIX, counter))
}

/// Turn one fetched record into an `OutputRecord`.
///
/// Published records are reported as `AlreadyPublished` and leave the
/// counter untouched; the counter advances by one only when a record is
/// actually assembled. The abstract has newlines and double quotes removed
/// before ASCII folding; the title and institution keep their punctuation.
pub fn assemble(
    record: &SourceRecord,
    external_doi: &str,
    counter: &mut u64,
) -> Result<Assembled, RecordError> {
    if record.published != PUBLISHED_SENTINEL {
        return Ok(Assembled::AlreadyPublished {
            published: record.published.clone(),
        });
    }

    if record.authors.trim().is_empty() {
        return Err(RecordError::NoAuthors);
    }
    let authors: Vec<String> = record.authors.split(';').map(clean_author).collect();
    let short_citation =
        format_author_short(&authors, &record.date).ok_or(RecordError::NoAuthors)?;

    let output = OutputRecord {
        generated_id: generated_id(*counter)?,
        title: normalize(&record.title),
        abstract_text: normalize(&record.abstract_text.replace('\n', "").replace('"', "")),
        short_citation,
        author_list: authors.join(", "),
        date: record.date.clone(),
        institution: normalize(&record.author_corresponding_institution),
        doi_label: format!("DOI:{}", external_doi),
    };
    *counter += 1;

    Ok(Assembled::Record(output))
}

impl OutputRecord {
    /// The fixed 15-column insert for the publications table. Eight columns
    /// come from the record, the rest are constants; `NULL` is the only
    /// unquoted value.
    pub fn insert_statement(&self) -> String {
        format!(
            "INSERT INTO publications VALUES (\"0\",\"{}\",\"{}\",\"{}\",\"{}\",\"{}\",\"0\",\"0\",\"{}\",\"\",\"\",\"{}\",\"{}\",\"active\",NULL)",
            self.generated_id,
            self.title,
            self.abstract_text,
            self.short_citation,
            self.author_list,
            self.date,
            self.institution,
            self.doi_label,
        )
    }

    pub fn index_line(&self, external_doi: &str) -> String {
        format!("{}\t{}", self.generated_id, external_doi)
    }
}

use std::collections::BTreeSet;
use std::io::Write;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::fetch::FetchRecords;
use crate::input::SourceId;
use crate::record::{assemble, Assembled};

/// What happened to the identifiers of one run.
#[derive(Debug, Default)]
pub struct Report {
    pub written: usize,
    pub already_published: usize,
    pub skipped: usize,
}

/// Process every identifier once, writing one SQL insert line and one index
/// line per unpublished record and a notice line per published one.
///
/// The id counter starts at `start` and is advanced by the assembler only
/// when a record is written. Fetch errors and non-success statuses drop the
/// identifier with no output of any kind. `pause` is slept once after the
/// loop as a courtesy to the remote service.
pub fn run<F, S, X, N>(
    ids: &BTreeSet<SourceId>,
    fetcher: &F,
    sql_out: &mut S,
    index_out: &mut X,
    notice_out: &mut N,
    start: u64,
    pause: Duration,
) -> Result<Report>
where
    F: FetchRecords,
    S: Write,
    X: Write,
    N: Write,
{
    let mut counter = start;
    let mut report = Report::default();

    for (external_doi, source_key) in ids {
        let record = match fetcher.fetch(source_key, external_doi) {
            Ok(Some(record)) => record,
            Ok(None) | Err(_) => {
                report.skipped += 1;
                continue;
            }
        };

        let assembled = assemble(&record, external_doi, &mut counter)
            .with_context(|| format!("assembling record for {}", external_doi))?;
        match assembled {
            Assembled::Record(out) => {
                writeln!(sql_out, "{};", out.insert_statement())?;
                writeln!(index_out, "{}", out.index_line(external_doi))?;
                report.written += 1;
            }
            Assembled::AlreadyPublished { published } => {
                writeln!(
                    notice_out,
                    "{} is already published at DOI: http://doi.org/{}",
                    external_doi, published
                )?;
                report.already_published += 1;
            }
        }
    }

    thread::sleep(pause);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use crate::input::load_identifiers;
    use crate::record::{SourceRecord, PUBLISHED_SENTINEL};
    use std::cell::Cell;
    use std::collections::HashMap;

    struct MockFetcher {
        records: HashMap<SourceId, SourceRecord>,
        failing: Vec<String>,
        calls: Cell<usize>,
    }

    impl MockFetcher {
        fn new() -> Self {
            MockFetcher {
                records: HashMap::new(),
                failing: Vec::new(),
                calls: Cell::new(0),
            }
        }

        fn with_record(mut self, doi: &str, key: &str, record: SourceRecord) -> Self {
            self.records
                .insert((doi.to_string(), key.to_string()), record);
            self
        }
    }

    impl FetchRecords for MockFetcher {
        fn fetch(
            &self,
            source_key: &str,
            external_doi: &str,
        ) -> Result<Option<SourceRecord>, FetchError> {
            self.calls.set(self.calls.get() + 1);
            if self.failing.iter().any(|d| d == external_doi) {
                return Err(FetchError::EmptyCollection);
            }
            Ok(self
                .records
                .get(&(external_doi.to_string(), source_key.to_string()))
                .cloned())
        }
    }

    fn record(published: &str) -> SourceRecord {
        SourceRecord {
            title: "A title".to_string(),
            abstract_text: "An abstract".to_string(),
            authors: "Doe, Jane; Roe, Richard".to_string(),
            date: "2022-03-04".to_string(),
            author_corresponding_institution: "Some University".to_string(),
            published: published.to_string(),
        }
    }

    fn run_to_strings(
        ids: &BTreeSet<SourceId>,
        fetcher: &MockFetcher,
        start: u64,
    ) -> (Report, String, String, String) {
        let (mut sql, mut index, mut notices) = (Vec::new(), Vec::new(), Vec::new());
        let report = run(
            ids,
            fetcher,
            &mut sql,
            &mut index,
            &mut notices,
            start,
            Duration::ZERO,
        )
        .unwrap();
        (
            report,
            String::from_utf8(sql).unwrap(),
            String::from_utf8(index).unwrap(),
            String::from_utf8(notices).unwrap(),
        )
    }

    #[test]
    fn duplicate_input_rows_cause_one_fetch() {
        let data = "10.1101/a,biorxiv\n10.1101/a,biorxiv\n";
        let ids = load_identifiers(data.as_bytes()).unwrap();
        assert_eq!(ids.len(), 1);

        let fetcher =
            MockFetcher::new().with_record("10.1101/a", "biorxiv", record(PUBLISHED_SENTINEL));
        let (report, ..) = run_to_strings(&ids, &fetcher, 0);
        assert_eq!(fetcher.calls.get(), 1);
        assert_eq!(report.written, 1);
    }

    #[test]
    fn published_record_writes_notice_and_holds_counter() {
        // "a" sorts before "b", so the published record is seen first.
        let ids: BTreeSet<SourceId> = [
            ("10.1101/a".to_string(), "biorxiv".to_string()),
            ("10.1101/b".to_string(), "biorxiv".to_string()),
        ]
        .into_iter()
        .collect();
        let fetcher = MockFetcher::new()
            .with_record("10.1101/a", "biorxiv", record("10.1038/published-doi"))
            .with_record("10.1101/b", "biorxiv", record(PUBLISHED_SENTINEL));

        let (report, sql, index, notices) = run_to_strings(&ids, &fetcher, 5);
        assert_eq!(report.already_published, 1);
        assert_eq!(report.written, 1);
        assert_eq!(
            notices,
            "10.1101/a is already published at DOI: http://doi.org/10.1038/published-doi\n"
        );
        // The unpublished record still receives the start value.
        assert!(sql.contains("\"888800000005\""));
        assert_eq!(index, "888800000005\t10.1101/b\n");
    }

    #[test]
    fn fetch_failures_are_silent_skips() {
        let ids: BTreeSet<SourceId> = [
            ("10.1101/gone".to_string(), "biorxiv".to_string()),
            ("10.1101/broken".to_string(), "biorxiv".to_string()),
        ]
        .into_iter()
        .collect();
        let mut fetcher = MockFetcher::new();
        fetcher.failing.push("10.1101/broken".to_string());

        let (report, sql, index, notices) = run_to_strings(&ids, &fetcher, 0);
        assert_eq!(report.skipped, 2);
        assert!(sql.is_empty());
        assert!(index.is_empty());
        assert!(notices.is_empty());
    }

    #[test]
    fn sequential_ids_across_a_run() {
        let ids: BTreeSet<SourceId> = ["a", "b", "c"]
            .into_iter()
            .map(|d| (format!("10.1101/{}", d), "biorxiv".to_string()))
            .collect();
        let mut fetcher = MockFetcher::new();
        for d in ["a", "b", "c"] {
            fetcher = fetcher.with_record(
                &format!("10.1101/{}", d),
                "biorxiv",
                record(PUBLISHED_SENTINEL),
            );
        }

        let (report, sql, index, _) = run_to_strings(&ids, &fetcher, 5);
        assert_eq!(report.written, 3);
        for id in ["888800000005", "888800000006", "888800000007"] {
            assert!(sql.contains(id), "missing {} in sql output", id);
        }
        assert_eq!(
            index,
            "888800000005\t10.1101/a\n888800000006\t10.1101/b\n888800000007\t10.1101/c\n"
        );
        let first_line = sql.lines().next().unwrap();
        assert!(first_line.starts_with("INSERT INTO publications VALUES ("));
        assert!(first_line.ends_with(";"));
    }
}

use std::fmt;
use std::path::Path;

use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ChipfieldError, Result};
use crate::options::AcOptions;

/// One lookup hit, as handed to the accept handler.
#[derive(Debug, Clone)]
pub struct LookupResult<T> {
    pub data: T,
    /// `format_item(data)`.
    pub formatted: String,
    pub score: u32,
    /// Indices of matched characters in `formatted` (for highlighting).
    pub match_indices: Vec<u32>,
}

/// The autocomplete capability a [`TagAutocomplete`](crate::TagAutocomplete)
/// delegates lookups to.
pub trait Autocomplete<T> {
    /// Bind to the configured lookup sources.
    fn attach(&mut self, sources: &[String], options: &AcOptions<T>) -> Result<()>;

    /// Ranked suggestions for what the user has typed so far.
    fn lookup(&mut self, term: &str, options: &AcOptions<T>) -> Result<Vec<LookupResult<T>>>;
}

/// In-memory lookup over a list of records, fuzzy-matched with nucleo on
/// `format_item(record)`.
///
/// On [`attach`](Autocomplete::attach), every source naming an existing file is
/// read as a JSON array of records and appended. Other sources (remote URLs,
/// the empty default) are skipped.
pub struct LocalLookup<T> {
    records: Vec<T>,
    matcher: Matcher,
}

impl<T> LocalLookup<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            matcher: Matcher::new(Config::DEFAULT),
        }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }
}

impl<T: DeserializeOwned> LocalLookup<T> {
    fn load_source(path: &Path) -> Result<Vec<T>> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| ChipfieldError::LookupSource(format!("{}: {e}", path.display())))
    }
}

impl<T> Default for LocalLookup<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> fmt::Debug for LocalLookup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalLookup")
            .field("records", &self.records.len())
            .finish_non_exhaustive()
    }
}

impl<T: Clone + DeserializeOwned> Autocomplete<T> for LocalLookup<T> {
    fn attach(&mut self, sources: &[String], _options: &AcOptions<T>) -> Result<()> {
        for source in sources.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let path = Path::new(source);
            if !path.is_file() {
                warn!(source, "lookup source is not a local file, skipping");
                continue;
            }
            let loaded = Self::load_source(path)?;
            debug!(source, count = loaded.len(), "loaded lookup source");
            self.records.extend(loaded);
        }
        Ok(())
    }

    fn lookup(&mut self, term: &str, options: &AcOptions<T>) -> Result<Vec<LookupResult<T>>> {
        if term.chars().count() < options.min_chars {
            return Ok(Vec::new());
        }

        if term.is_empty() {
            return Ok(self
                .records
                .iter()
                .take(options.max_items)
                .map(|data| LookupResult {
                    formatted: (options.format_item)(data),
                    data: data.clone(),
                    score: 0,
                    match_indices: vec![],
                })
                .collect());
        }

        let case = if options.match_case {
            CaseMatching::Respect
        } else {
            CaseMatching::Ignore
        };
        let pattern = Pattern::new(term, case, Normalization::Smart, AtomKind::Fuzzy);
        let mut buf = Vec::new();
        let mut results = Vec::new();

        for data in &self.records {
            let formatted = (options.format_item)(data);
            let haystack = Utf32Str::new(&formatted, &mut buf);
            let mut indices = Vec::new();

            if let Some(score) = pattern.indices(haystack, &mut self.matcher, &mut indices) {
                indices.sort_unstable();
                indices.dedup();
                results.push(LookupResult {
                    data: data.clone(),
                    formatted,
                    score,
                    match_indices: indices,
                });
            }
        }

        // Stable: equal scores keep source order.
        results.sort_by(|a, b| b.score.cmp(&a.score));
        results.truncate(options.max_items);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::WidgetConfig;
    use crate::suggestion::Suggestion;

    fn people() -> Vec<Suggestion> {
        vec![
            Suggestion::new("1", "Alice Liddell"),
            Suggestion::new("2", "Bob Dylan"),
            Suggestion::new("3", "Alan Turing"),
            Suggestion::new("4", "Ada Lovelace"),
        ]
    }

    fn options(min_chars: usize, max_items: usize) -> AcOptions<Suggestion> {
        WidgetConfig::<Suggestion>::builder()
            .suggestion_formats()
            .min_chars(min_chars)
            .max_items(max_items)
            .build()
            .unwrap()
            .ac_options
    }

    #[test]
    fn test_fuzzy_lookup_ranks_matches() {
        let mut lookup = LocalLookup::new(people());
        let results = lookup.lookup("al", &options(1, 10)).unwrap();

        let ids: Vec<&str> = results.iter().map(|r| r.data.id.as_str()).collect();
        assert!(ids.contains(&"1"));
        assert!(ids.contains(&"3"));
        assert!(!ids.contains(&"2"));
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(!results[0].match_indices.is_empty());
    }

    #[test]
    fn test_case_insensitive_by_default() {
        let mut lookup = LocalLookup::new(people());
        let results = lookup.lookup("BOB", &options(1, 10)).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].formatted, "Bob Dylan");
    }

    #[test]
    fn test_match_case() {
        let mut lookup = LocalLookup::new(people());
        let mut opts = options(1, 10);
        opts.match_case = true;
        assert!(lookup.lookup("BOB", &opts).unwrap().is_empty());
        assert_eq!(lookup.lookup("Bob", &opts).unwrap().len(), 1);
    }

    #[test]
    fn test_min_chars_and_max_items() {
        let mut lookup = LocalLookup::new(people());
        assert!(lookup.lookup("a", &options(2, 10)).unwrap().is_empty());
        assert!(lookup.lookup("", &options(1, 10)).unwrap().is_empty());

        let all = lookup.lookup("", &options(0, 3)).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].data.id, "1");

        let capped = lookup.lookup("a", &options(1, 2)).unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[test]
    fn test_attach_loads_local_files_and_skips_others() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("extra.json");
        std::fs::write(&path, r#"[{"id": 9, "name": "Grace Hopper"}]"#).unwrap();

        let mut lookup = LocalLookup::new(people());
        let sources = vec![
            String::new(),
            "/search".to_string(),
            path.to_string_lossy().to_string(),
        ];
        lookup.attach(&sources, &options(1, 10)).unwrap();

        assert_eq!(lookup.records().len(), 5);
        let hits = lookup.lookup("grace", &options(1, 10)).unwrap();
        assert_eq!(hits[0].data.id, "9");
    }

    #[test]
    fn test_attach_rejects_malformed_source() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();

        let mut lookup = LocalLookup::<Suggestion>::default();
        let err = lookup
            .attach(&[path.to_string_lossy().to_string()], &options(1, 10))
            .unwrap_err();
        assert!(matches!(err, ChipfieldError::LookupSource(_)));
    }
}

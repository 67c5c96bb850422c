use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Normalized form used to compare source texts
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Source texts already present in earlier exports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    entries: HashSet<String>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, text: &str) -> bool {
        self.entries.insert(normalize(text))
    }

    /// Whether `text` matches an entry, ignoring case and surrounding whitespace
    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains(&normalize(text))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for text in iter {
            set.insert(text.as_ref());
        }
        set
    }
}

/// Collect the first column of every `*.csv` file directly inside `directory`
///
/// A missing path, or one that is not a directory, only logs a warning and
/// yields an empty set.
pub fn load_exclusions(directory: &Path) -> Result<ExclusionSet> {
    if !directory.exists() {
        tracing::warn!(
            "Exclusion directory {} does not exist, continuing without exclusions",
            directory.display()
        );
        return Ok(ExclusionSet::new());
    }
    if !directory.is_dir() {
        tracing::warn!(
            "Exclusion path {} is not a directory, continuing without exclusions",
            directory.display()
        );
        return Ok(ExclusionSet::new());
    }

    let mut set = ExclusionSet::new();
    let mut files = 0usize;

    for entry in fs_err::read_dir(directory)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv || !path.is_file() {
            continue;
        }

        read_first_column(&path, &mut set)?;
        files += 1;
    }

    tracing::info!(
        "Loaded {} known entries from {} CSV files in {}",
        set.len(),
        files,
        directory.display()
    );
    Ok(set)
}

fn read_first_column(path: &Path, set: &mut ExclusionSet) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    for record in reader.byte_records() {
        let record = record.with_context(|| format!("Failed to read {}", path.display()))?;
        // Short rows carry nothing to exclude
        if let Some(first) = record.get(0) {
            let text = String::from_utf8_lossy(first);
            if !text.trim().is_empty() {
                set.insert(&text);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory_gives_empty_set() {
        let set = load_exclusions(Path::new("/does/not/exist")).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_regular_file_gives_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("previous.csv");
        fs_err::write(&file, "eat,kula\n").unwrap();

        let set = load_exclusions(&file).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_collects_first_column_normalized() {
        let dir = tempfile::tempdir().unwrap();
        fs_err::write(dir.path().join("track_01.csv"), "Eat,kula\n  Sleep ,lala\n").unwrap();
        fs_err::write(dir.path().join("track_02.CSV"), "want;taka\n\nalone\n").unwrap();
        fs_err::write(dir.path().join("notes.txt"), "ignored,entry\n").unwrap();
        fs_err::create_dir(dir.path().join("nested.csv")).unwrap();

        let set = load_exclusions(dir.path()).unwrap();

        assert!(set.contains("eat"));
        assert!(set.contains("SLEEP"));
        // Only comma splits columns, so the whole row is the first column here
        assert!(set.contains("want;taka"));
        assert!(set.contains("alone"));
        assert!(!set.contains("ignored"));
        assert!(!set.contains("kula"));
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_empty_csv_file_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        fs_err::write(dir.path().join("empty.csv"), "").unwrap();

        assert!(load_exclusions(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_set_matching_ignores_case_and_whitespace() {
        let set: ExclusionSet = ["hello"].into_iter().collect();
        assert!(set.contains("Hello"));
        assert!(set.contains("  HELLO\t"));
        assert!(!set.contains("hello there"));
    }
}

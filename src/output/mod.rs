use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::pipeline::FlashcardSet;
use crate::utils::sanitize_title;

pub mod exclusions;

pub use exclusions::{load_exclusions, normalize, ExclusionSet};

/// Save flashcards as a header-less two-column CSV file
///
/// The file is named after the sanitized title and replaces any earlier file
/// with that name. Cards whose source text is in `exclusions` are skipped.
pub fn write_csv(
    output_dir: &Path,
    flashcards: &FlashcardSet,
    filename_stem: &str,
    delimiter: u8,
    exclusions: Option<&ExclusionSet>,
) -> Result<PathBuf> {
    let path = output_dir.join(format!("{}.csv", sanitize_title(filename_stem)));

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_path(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let mut written = 0usize;
    for card in &flashcards.flashcards {
        if exclusions.is_some_and(|set| set.contains(&card.source_text)) {
            tracing::debug!("Skipping known entry: {}", card.source_text);
            continue;
        }
        writer.write_record([&card.source_text, &card.target_text])?;
        written += 1;
    }
    writer.flush()?;

    tracing::info!(
        "Wrote {} flashcards ({} excluded) to {}",
        written,
        flashcards.len() - written,
        path.display()
    );

    absolute(&path)
}

/// Save a rendered prompt verbatim as a text file
pub fn write_text(output_dir: &Path, prompt: &str, filename_stem: &str) -> Result<PathBuf> {
    let path = output_dir.join(format!("{}.txt", sanitize_title(filename_stem)));
    fs_err::write(&path, prompt)?;

    tracing::info!("Wrote prompt ({} characters) to {}", prompt.len(), path.display());

    absolute(&path)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(fs_err::canonicalize(path)?)
}

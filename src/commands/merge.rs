use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::MergeArgs;
use crate::model::QualityControl;
use crate::util::{ensure_directory, write_json_indented};

const DOCUMENT_PREFIX: &str = "quality_control";

pub fn run(args: MergeArgs) -> Result<()> {
    let documents = discover_documents(&args.data_dir)?;
    info!(count = documents.len(), "found quality control documents");

    let mut merged = QualityControl::default();

    for path in &documents {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToOwned::to_owned)
            .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))?;

        let recording = recording_name(&filename);
        info!(recording = %recording, "merging metrics");

        let input_figures = args.data_dir.join(format!("{DOCUMENT_PREFIX}_{recording}"));
        let output_figures = args.results_dir.join(DOCUMENT_PREFIX).join(&recording);
        let copied = copy_figures(&input_figures, &output_figures)
            .with_context(|| format!("failed to relocate figures for recording: {recording}"))?;
        info!(recording = %recording, figures = copied, "copied figures");

        let document = normalize_references(path, &recording)?;
        merged.merge_from(document);
    }

    let output_path = args.results_dir.join(format!("{DOCUMENT_PREFIX}.json"));
    write_json_indented(&output_path, &merged)?;
    info!(
        path = %output_path.display(),
        evaluations = merged.evaluations.len(),
        "wrote merged quality control document"
    );

    Ok(())
}

/// Finds `quality_control*.json` files in the data directory, sorted
/// lexicographically. Processing order drives figure-folder association and
/// metric order in the merged output, so the sort must be deterministic.
fn discover_documents(data_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    let entries = fs::read_dir(data_dir)
        .with_context(|| format!("failed to read {}", data_dir.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", data_dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let has_prefix = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(DOCUMENT_PREFIX));

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "json");

        if has_prefix && is_json {
            documents.push(path);
        }
    }

    documents.sort();
    Ok(documents)
}

/// Recovers the recording name from a `quality_control_{recording}.json`
/// filename by dropping the first two underscore-separated segments and the
/// `.json` suffix. Filenames outside that pattern degrade to an empty or
/// truncated name; no validation happens here.
fn recording_name(filename: &str) -> String {
    let joined = filename.split('_').skip(2).collect::<Vec<_>>().join("_");
    joined
        .strip_suffix(".json")
        .unwrap_or(joined.as_str())
        .to_string()
}

/// Copies every `.png`/`.pdf` file from the recording's figure directory
/// into the output layout, overwriting on conflict. Other extensions and
/// subdirectories are skipped. A missing input directory is an error: the
/// run aborts rather than emit a document whose figure references dangle.
fn copy_figures(input_dir: &Path, output_dir: &Path) -> Result<usize> {
    ensure_directory(output_dir)?;

    let entries = fs::read_dir(input_dir)
        .with_context(|| format!("failed to read figure directory {}", input_dir.display()))?;

    let mut copied = 0;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", input_dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let is_figure = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "png" || ext == "pdf");

        if !is_figure {
            continue;
        }

        let destination = output_dir.join(entry.file_name());
        fs::copy(&path, &destination)
            .with_context(|| format!("failed to copy figure: {}", path.display()))?;
        copied += 1;
    }

    Ok(copied)
}

/// Reads one quality-control document and rewrites every occurrence of
/// `quality_control_{recording}` to `quality_control/{recording}` as a
/// literal substitution over the compact serialized form. The schema does
/// not enumerate which fields hold references, so the rewrite is blind;
/// unrelated string values containing the exact token are rewritten too.
fn normalize_references(path: &Path, recording: &str) -> Result<QualityControl> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let compact = serde_json::to_string(&value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;

    let rewritten = compact.replace(
        &format!("{DOCUMENT_PREFIX}_{recording}"),
        &format!("{DOCUMENT_PREFIX}/{recording}"),
    );

    serde_json::from_str(&rewritten).with_context(|| {
        format!(
            "document does not match the quality control schema: {}",
            path.display()
        )
    })
}

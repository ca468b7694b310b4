use std::fs::File;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::foundation::error::{AutoframeError, AutoframeResult};
use crate::render::orchestrator::OUTPUT_EXTENSION;

/// Download name of a batch archive.
pub fn bundle_filename(date_stamp: &str) -> String {
    format!("AutoFrame__{date_stamp}.zip")
}

/// Rendered outputs directly inside `job_dir`, sorted by file name.
pub fn list_outputs(job_dir: &Path) -> AutoframeResult<Vec<PathBuf>> {
    let mut outputs = Vec::new();
    for entry in std::fs::read_dir(job_dir)? {
        let path = entry?.path();
        let is_output = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(OUTPUT_EXTENSION));
        if is_output {
            outputs.push(path);
        }
    }
    outputs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(outputs)
}

/// Zip every output of `job_dir` into `writer`. Returns the number of archived files.
pub fn write_bundle<W: Write + Seek>(job_dir: &Path, writer: W) -> AutoframeResult<usize> {
    let outputs = list_outputs(job_dir)?;
    if outputs.is_empty() {
        return Err(AutoframeError::validation(format!(
            "no outputs to bundle in {}",
            job_dir.display()
        )));
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = zip::ZipWriter::new(writer);
    for path in &outputs {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        zip.start_file(name.as_str(), options)
            .with_context(|| format!("start zip entry '{name}'"))?;
        let mut input =
            File::open(path).with_context(|| format!("open output '{}'", path.display()))?;
        std::io::copy(&mut input, &mut zip)?;
    }
    zip.finish().context("finish zip archive")?;

    tracing::info!(job_dir = %job_dir.display(), files = outputs.len(), "bundled outputs");
    Ok(outputs.len())
}

/// Write the bundle for `job_dir` to `dest`, creating parent directories.
pub fn write_bundle_file(job_dir: &Path, dest: &Path) -> AutoframeResult<usize> {
    crate::encode::ffmpeg::ensure_parent_dir(dest)?;
    let file = File::create(dest).with_context(|| format!("create '{}'", dest.display()))?;
    match write_bundle(job_dir, file) {
        Ok(count) => Ok(count),
        Err(e) => {
            let _ = std::fs::remove_file(dest);
            Err(e)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/bundle.rs"]
mod tests;

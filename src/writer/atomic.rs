use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::model::AcceptedNode;
use crate::progress::ProgressReporter;

use super::config::WriterConfig;
use super::error::WriterError;
use super::stats::WriterStats;
use super::writer_impl::NodeCsvWriter;
use super::NodeSink;

/// Node table writer that replaces its destination only on success
///
/// Rows go to a temporary file next to the destination. [`finish`] flushes,
/// optionally fsyncs, and renames it into place. Dropping the writer before
/// `finish` removes the temporary file and leaves any previous destination
/// file untouched.
///
/// [`finish`]: NodeFileWriter::finish
pub struct NodeFileWriter {
    inner: NodeCsvWriter<NamedTempFile>,
    path: PathBuf,
    sync_on_finish: bool,
}

impl NodeFileWriter {
    /// Create a writer targeting `path`
    ///
    /// Fails before any row is written when the destination directory is
    /// missing or not writable.
    pub fn create<P: AsRef<Path>>(path: P, config: &WriterConfig) -> Result<Self, WriterError> {
        let path = path.as_ref().to_path_buf();
        if path.file_name().is_none() {
            return Err(WriterError::InvalidPath(path.display().to_string()));
        }

        let temp = tempfile::Builder::new()
            .prefix(".osmnodes-")
            .suffix(".csv.tmp")
            .tempfile_in(parent_dir(&path))?;
        set_output_permissions(&temp)?;
        debug!("Staging output in {}", temp.path().display());

        Ok(Self {
            inner: NodeCsvWriter::new(temp, config)?,
            path,
            sync_on_finish: config.sync_on_finish,
        })
    }

    /// Destination path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush, sync and atomically move the table into place
    pub fn finish(self) -> Result<WriterStats, WriterError> {
        let (temp, mut stats) = self.inner.finish()?;

        if self.sync_on_finish {
            temp.as_file().sync_all()?;
        }
        temp.persist(&self.path)
            .map_err(|e| WriterError::IoError(e.error))?;
        if self.sync_on_finish {
            sync_parent_dir(&self.path)?;
        }

        stats.file_size_bytes = fs::metadata(&self.path)?.len();
        info!("Saved {}: {}", self.path.display(), stats);
        Ok(stats)
    }
}

impl NodeSink for NodeFileWriter {
    fn write_node(
        &mut self,
        node: &AcceptedNode,
        progress: &mut ProgressReporter,
    ) -> Result<(), WriterError> {
        self.inner.write_node(node, progress)
    }

    fn rows_written(&self) -> u64 {
        self.inner.rows_written()
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Make the rename itself durable
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<(), WriterError> {
    let dir = parent_dir(path);
    fs::File::open(dir)?.sync_all()?;
    debug!("Synced directory {}", dir.display());
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<(), WriterError> {
    Ok(())
}

/// Temp files are created owner-only; the finished table should read like any
/// other output file.
#[cfg(unix)]
fn set_output_permissions(temp: &NamedTempFile) -> Result<(), WriterError> {
    use std::os::unix::fs::PermissionsExt;
    temp.as_file()
        .set_permissions(fs::Permissions::from_mode(0o644))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_output_permissions(_temp: &NamedTempFile) -> Result<(), WriterError> {
    Ok(())
}

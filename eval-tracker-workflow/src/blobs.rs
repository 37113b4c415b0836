use eval_tracker_core::{BlobKind, BlobSpec, CoreError, Result, TaskResults};
use std::path::Path;

/// Directories to upload for one invocation.
///
/// The result blob is the directory holding the first task's result file.
/// The output blob is the per-model write-out directory, present only when
/// some task recorded one. Both must exist on disk.
pub fn plan_blobs(tasks: &TaskResults, target_model: &str) -> Result<Vec<BlobSpec>> {
    let Some(first) = tasks.values().next() else {
        return Ok(Vec::new());
    };

    let mut blobs = Vec::with_capacity(2);

    let result_dir = first.result_dir();
    ensure_dir(result_dir)?;
    blobs.push(BlobSpec::new(target_model, BlobKind::Result, result_dir));

    if let Some(task_dir) = tasks.values().find_map(|task| task.write_out_dir.as_deref()) {
        let output_dir = task_dir.parent().unwrap_or(task_dir);
        ensure_dir(output_dir)?;
        blobs.push(BlobSpec::new(target_model, BlobKind::Output, output_dir));
    }

    Ok(blobs)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(CoreError::DirectoryNotFound(dir.to_path_buf()))
    }
}

//! Git CLI wrapper.
//!
//! Shells out to `git` via `tokio::process::Command`. Every call is
//! read-only; nothing here writes to the repository.

use std::path::Path;

use super::DiffError;

/// Run `git <args>` in `dir` and return raw stdout.
async fn run_git(dir: &Path, args: &[&str]) -> Result<Vec<u8>, DiffError> {
    tracing::debug!(dir = %dir.display(), ?args, "running git");
    let output = tokio::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .await
        .map_err(|e| DiffError::GitError(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DiffError::GitError(format!(
            "git {} failed ({}): {}",
            args.first().copied().unwrap_or_default(),
            output.status,
            stderr.trim()
        )));
    }

    Ok(output.stdout)
}

/// Whether `dir` belongs to a bare repository.
///
/// Fails with [`DiffError::NotARepository`] when `dir` is not inside a
/// git repository at all.
pub async fn is_bare_repository(dir: &Path) -> Result<bool, DiffError> {
    let stdout = run_git(dir, &["rev-parse", "--is-bare-repository"])
        .await
        .map_err(|_| DiffError::NotARepository(dir.display().to_string()))?;
    Ok(String::from_utf8_lossy(&stdout).trim() == "true")
}

/// Find the root of the working tree containing `start_dir`.
pub async fn find_repo_root(start_dir: &Path) -> Result<String, DiffError> {
    let stdout = run_git(start_dir, &["rev-parse", "--show-toplevel"])
        .await
        .map_err(|_| DiffError::NotARepository(start_dir.display().to_string()))?;
    Ok(String::from_utf8_lossy(&stdout).trim().to_string())
}

/// Resolve a branch, tag or commit-ish to a full commit id.
pub async fn resolve_commit(repo_root: &Path, rev: &str) -> Result<String, DiffError> {
    if rev.is_empty() || rev.starts_with('-') {
        return Err(DiffError::UnknownRevision(rev.to_string()));
    }
    let spec = format!("{rev}^{{commit}}");
    let stdout = run_git(repo_root, &["rev-parse", "--verify", "--quiet", &spec])
        .await
        .map_err(|_| DiffError::UnknownRevision(rev.to_string()))?;
    let sha = String::from_utf8_lossy(&stdout).trim().to_string();
    if sha.is_empty() {
        return Err(DiffError::UnknownRevision(rev.to_string()));
    }
    Ok(sha)
}

/// Short name of the branch HEAD points at, or `None` when detached.
pub async fn symbolic_head(repo_root: &Path) -> Option<String> {
    let stdout = run_git(repo_root, &["symbolic-ref", "--quiet", "--short", "HEAD"])
        .await
        .ok()?;
    let branch = String::from_utf8_lossy(&stdout).trim().to_string();
    (!branch.is_empty()).then_some(branch)
}

/// Unified diff between two commits, with rename detection.
pub async fn diff_patch(
    repo_root: &Path,
    base: &str,
    current: &str,
    context_lines: u32,
) -> Result<Vec<u8>, DiffError> {
    let unified = format!("--unified={context_lines}");
    run_git(
        repo_root,
        &[
            "-c",
            "core.quotepath=false",
            "diff",
            "--no-color",
            "--no-ext-diff",
            "--no-textconv",
            "--find-renames",
            &unified,
            "--src-prefix=a/",
            "--dst-prefix=b/",
            base,
            current,
        ],
    )
    .await
}

/// NUL-separated `--numstat` output between two commits.
pub async fn diff_numstat(repo_root: &Path, base: &str, current: &str) -> Result<Vec<u8>, DiffError> {
    run_git(
        repo_root,
        &["diff", "--numstat", "-z", "--find-renames", base, current],
    )
    .await
}

/// Raw blob content of `path` at `rev`.
pub async fn show_file(repo_root: &Path, rev: &str, path: &str) -> Result<Vec<u8>, DiffError> {
    if rev.starts_with('-') {
        return Err(DiffError::UnknownRevision(rev.to_string()));
    }
    let object = format!("{rev}:{path}");
    run_git(repo_root, &["cat-file", "blob", &object]).await
}

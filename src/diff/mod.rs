//! Change extraction: git CLI wrapper, unified diff parsing, and the
//! [`GitScanner`] that turns a branch comparison into [`FileChange`]s.

pub mod git;
pub mod parser;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ReviewConfig;
use crate::models::{FileChange, FileChangeType};

/// Errors from the change extractor.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("path not found: {0}")]
    PathNotFound(String),

    #[error("not a valid git repository: {0}")]
    NotARepository(String),

    #[error("repository at {0} is bare and has no working tree")]
    BareRepository(String),

    #[error("unknown revision: {0}")]
    UnknownRevision(String),

    #[error("git command failed: {0}")]
    GitError(String),
}

impl DiffError {
    /// Whether the workspace itself is unusable.
    pub fn is_repository_error(&self) -> bool {
        matches!(
            self,
            Self::PathNotFound(_) | Self::NotARepository(_) | Self::BareRepository(_)
        )
    }

    /// Whether a branch or commit name did not resolve.
    pub fn is_revision_error(&self) -> bool {
        matches!(self, Self::UnknownRevision(_))
    }
}

/// Read-only view of one git working tree.
#[derive(Debug, Clone)]
pub struct GitScanner {
    root: PathBuf,
    settings: ReviewConfig,
}

impl GitScanner {
    /// Open the repository containing `workspace`.
    ///
    /// Fails when the path does not exist, is not inside a git repository,
    /// or belongs to a bare repository.
    pub async fn open(workspace: impl AsRef<Path>, settings: &ReviewConfig) -> Result<Self, DiffError> {
        let workspace = workspace.as_ref();
        if !workspace.is_dir() {
            return Err(DiffError::PathNotFound(workspace.display().to_string()));
        }
        if git::is_bare_repository(workspace).await? {
            return Err(DiffError::BareRepository(workspace.display().to_string()));
        }
        let root = PathBuf::from(git::find_repo_root(workspace).await?);
        tracing::debug!(root = %root.display(), "opened repository");

        Ok(Self {
            root,
            settings: settings.clone(),
        })
    }

    /// Root of the working tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Per-file changes from `base_branch` to `current_ref` (HEAD when
    /// `None`).
    ///
    /// Files whose patch cannot be read are logged and skipped; the rest
    /// of the comparison still succeeds.
    pub async fn get_changes(
        &self,
        base_branch: &str,
        current_ref: Option<&str>,
    ) -> Result<Vec<FileChange>, DiffError> {
        let current_ref = current_ref.unwrap_or("HEAD");
        let base = git::resolve_commit(&self.root, base_branch).await?;
        let current = git::resolve_commit(&self.root, current_ref).await?;

        let patch = git::diff_patch(
            &self.root,
            &base,
            &current,
            self.settings.include_context_lines,
        )
        .await?;
        let stats = match git::diff_numstat(&self.root, &base, &current).await {
            Ok(raw) => parser::parse_numstat(&raw),
            Err(e) => {
                tracing::warn!("numstat unavailable, counting lines from patch text: {e}");
                parser::NumStats::new()
            }
        };

        let mut changes = Vec::new();
        for section in parser::split_file_sections(&patch) {
            match parser::parse_file_section(&section) {
                Ok(file) => changes.push(self.build_change(file, &stats)),
                Err(e) => tracing::warn!("skipping unreadable file diff: {e}"),
            }
        }

        tracing::info!(
            base = base_branch,
            current = current_ref,
            files = changes.len(),
            "extracted changes"
        );
        Ok(changes)
    }

    /// Name of the checked-out branch, or the first 8 characters of the
    /// commit id when HEAD is detached.
    pub async fn get_current_branch(&self) -> Result<String, DiffError> {
        if let Some(branch) = git::symbolic_head(&self.root).await {
            return Ok(branch);
        }
        let sha = git::resolve_commit(&self.root, "HEAD").await?;
        Ok(sha.chars().take(8).collect())
    }

    /// Content of `file_path` at `git_ref` (HEAD when `None`).
    ///
    /// Returns an empty string when the file or ref does not exist.
    pub async fn get_file_content(&self, file_path: &str, git_ref: Option<&str>) -> String {
        let git_ref = git_ref.unwrap_or("HEAD");
        match git::show_file(&self.root, git_ref, file_path).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                tracing::warn!("could not read {file_path} at {git_ref}: {e}");
                String::new()
            }
        }
    }

    fn build_change(&self, file: parser::FilePatch, stats: &parser::NumStats) -> FileChange {
        let (additions, deletions) = stats
            .get(file.display_path())
            .copied()
            .flatten()
            .unwrap_or_else(|| file.count_lines());
        let kind = file.change_type();
        let diff = parser::truncate_patch(file.body, self.settings.max_diff_size);

        match kind {
            FileChangeType::Renamed => {
                FileChange::renamed(file.old_path, file.new_path, additions, deletions, diff)
            }
            FileChangeType::Deleted => FileChange::new(file.old_path, kind, additions, deletions, diff),
            _ => FileChange::new(file.new_path, kind, additions, deletions, diff),
        }
    }
}

/// Throwaway repositories for tests.
#[cfg(test)]
pub(crate) mod test_repo {
    use std::path::Path;

    pub struct TestRepo {
        dir: tempfile::TempDir,
    }

    impl TestRepo {
        /// Run git in `dir`, panicking on failure.
        pub async fn git(dir: &Path, args: &[&str]) -> String {
            let output = tokio::process::Command::new("git")
                .args([
                    "-c",
                    "user.name=Test",
                    "-c",
                    "user.email=test@test.com",
                    "-c",
                    "commit.gpgsign=false",
                ])
                .args(args)
                .current_dir(dir)
                .output()
                .await
                .unwrap();
            assert!(
                output.status.success(),
                "git {args:?} failed: {}",
                String::from_utf8_lossy(&output.stderr)
            );
            String::from_utf8_lossy(&output.stdout).into_owned()
        }

        /// Empty repository on branch `main`.
        pub async fn init() -> Self {
            let dir = tempfile::tempdir().unwrap();
            Self::git(dir.path(), &["init", "-b", "main"]).await;
            Self { dir }
        }

        /// Repository with one committed file on `main`.
        pub async fn with_commit(name: &str, content: &str) -> Self {
            let repo = Self::init().await;
            repo.commit_file(name, content, "initial").await;
            repo
        }

        pub fn path(&self) -> &Path {
            self.dir.path()
        }

        pub async fn run(&self, args: &[&str]) -> String {
            Self::git(self.path(), args).await
        }

        pub fn write(&self, name: &str, content: &str) {
            let path = self.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, content).unwrap();
        }

        pub async fn commit_file(&self, name: &str, content: &str, message: &str) {
            self.write(name, content);
            self.run(&["add", "--all"]).await;
            self.run(&["commit", "-m", message]).await;
        }
    }
}

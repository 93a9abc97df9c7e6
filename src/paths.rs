use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Directories the engine refuses to touch no matter what the configuration
/// says.
const DENIED_PATHS: &[&str] = &[
    "/", "/bin", "/boot", "/dev", "/etc", "/lib", "/lib64", "/proc", "/root", "/sbin", "/sys",
    "/usr", "/var",
];

#[cfg(windows)]
const DENIED_PATHS_WINDOWS: &[&str] = &[
    r"C:\", r"C:\Windows", r"C:\Program Files", r"C:\Program Files (x86)", r"C:\ProgramData",
];

#[derive(Debug, Error)]
pub enum PathError {
    #[error("path is not inside a configured trash root: {0}")]
    OutsideAllowedScope(PathBuf),

    #[error("path is a protected system location: {0}")]
    DeniedPath(PathBuf),

    #[error("cannot resolve {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A path that passed canonicalization and scope validation. The scanner only
/// accepts roots wrapped in this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPath(PathBuf);

impl CanonicalPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for CanonicalPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Validates candidate paths against the configured trash roots and the
/// hardcoded denylist. Pure validation, no side effects.
#[derive(Debug, Clone)]
pub struct PathResolver {
    allowed_roots: Vec<PathBuf>,
}

impl PathResolver {
    /// Build a resolver from configured trash roots. Roots that do not exist
    /// yet are kept as-is; existing ones are canonicalized so symlinked trash
    /// directories compare correctly.
    pub fn new(trash_roots: &[PathBuf]) -> Self {
        let allowed_roots = trash_roots
            .iter()
            .map(|root| root.canonicalize().unwrap_or_else(|_| root.clone()))
            .collect();
        Self { allowed_roots }
    }

    /// Canonicalize a candidate and check it against the denylist and the
    /// allowed trash roots.
    pub fn resolve(&self, candidate: &Path) -> Result<CanonicalPath, PathError> {
        let canonical = candidate.canonicalize().map_err(|source| PathError::Io {
            path: candidate.to_path_buf(),
            source,
        })?;

        if is_denied(&canonical) {
            return Err(PathError::DeniedPath(canonical));
        }

        if !self
            .allowed_roots
            .iter()
            .any(|root| canonical.starts_with(root))
        {
            return Err(PathError::OutsideAllowedScope(canonical));
        }

        Ok(CanonicalPath(canonical))
    }

    /// Depth guard for the scanner: depth 0 is a direct child of `root`.
    /// Entries deeper than `max_depth` are excluded from traversal.
    pub fn is_within_depth(root: &Path, candidate: &Path, max_depth: usize) -> bool {
        match candidate.strip_prefix(root) {
            Ok(rel) => {
                let depth = rel.components().filter(|c| matches!(c, Component::Normal(_))).count();
                depth > 0 && depth - 1 <= max_depth
            }
            Err(_) => false,
        }
    }
}

fn is_denied(path: &Path) -> bool {
    if DENIED_PATHS.iter().any(|denied| path == Path::new(denied)) {
        return true;
    }

    // Anything directly under a denied root (e.g. /etc/passwd) is equally
    // off-limits, except paths under /home and /Users style user areas
    let denied_prefix = DENIED_PATHS
        .iter()
        .filter(|denied| **denied != "/")
        .any(|denied| path.starts_with(denied));
    if denied_prefix {
        return true;
    }

    #[cfg(windows)]
    {
        if DENIED_PATHS_WINDOWS
            .iter()
            .any(|denied| path == Path::new(denied) || path.starts_with(denied))
        {
            return true;
        }
    }

    false
}

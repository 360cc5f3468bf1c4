//! Output file naming.
//!
//! Cleaned files keep their original name behind a fixed prefix:
//! - `IMG_0042.jpg` → `cleaned_IMG_0042.jpg`
//! - `holiday/beach.png` → `cleaned_beach.png` (only the final component is kept)
//!
//! The prefix is configurable (`output.prefix`).
//!
//! Within one run no two files are written to the same path: when two
//! sources share a base name (`2023/IMG_1.jpg`, `2024/IMG_1.jpg` into one
//! `--output` dir) the later one gets a numeric suffix, `cleaned_IMG_1_2.jpg`.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_PREFIX: &str = "cleaned_";

/// Name under which a cleaned file is offered for download.
pub fn cleaned_name(original: &str, prefix: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    format!("{prefix}{base}")
}

/// Where the cleaned copy of `source` goes: `out_dir` when given, otherwise
/// next to the source.
pub fn output_path(source: &Path, download_name: &str, out_dir: Option<&Path>) -> PathBuf {
    let dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    dir.join(download_name)
}

/// Output paths already handed out in this run.
#[derive(Debug, Default)]
pub struct OutputPlan {
    taken: HashSet<PathBuf>,
}

impl OutputPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `target`, or the first free `<stem>_N.<ext>` variant of it.
    pub fn claim(&mut self, target: PathBuf) -> PathBuf {
        if self.taken.insert(target.clone()) {
            return target;
        }
        let stem = target
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = target.extension().map(|e| e.to_string_lossy().into_owned());
        let mut n = 2;
        loop {
            let name = match &ext {
                Some(ext) => format!("{stem}_{n}.{ext}"),
                None => format!("{stem}_{n}"),
            };
            let candidate = target.with_file_name(name);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Write `bytes` to `target`. Without `overwrite` an existing file is left
/// untouched and the call fails with `AlreadyExists`.
pub fn write_output(target: &Path, bytes: &[u8], overwrite: bool) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let mut file = options.open(target).map_err(|e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            io::Error::new(io::ErrorKind::AlreadyExists, "file exists (use --overwrite)")
        } else {
            e
        }
    })?;
    file.write_all(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_plain_name() {
        assert_eq!(cleaned_name("IMG_0042.jpg", DEFAULT_PREFIX), "cleaned_IMG_0042.jpg");
    }

    #[test]
    fn keeps_only_final_component() {
        assert_eq!(cleaned_name("a/b/photo.png", "x-"), "x-photo.png");
        assert_eq!(cleaned_name(r"C:\pics\photo.png", "x-"), "x-photo.png");
    }

    #[test]
    fn empty_name_gets_placeholder() {
        assert_eq!(cleaned_name("", "cleaned_"), "cleaned_image");
        assert_eq!(cleaned_name("dir/", "cleaned_"), "cleaned_image");
    }

    #[test]
    fn output_next_to_source_by_default() {
        let path = output_path(Path::new("/photos/a.jpg"), "cleaned_a.jpg", None);
        assert_eq!(path, PathBuf::from("/photos/cleaned_a.jpg"));
    }

    #[test]
    fn output_into_explicit_dir() {
        let path = output_path(
            Path::new("/photos/a.jpg"),
            "cleaned_a.jpg",
            Some(Path::new("/out")),
        );
        assert_eq!(path, PathBuf::from("/out/cleaned_a.jpg"));
    }

    #[test]
    fn same_base_name_from_different_dirs_gets_distinct_targets() {
        let out = Some(Path::new("/out"));
        let mut plan = OutputPlan::new();
        let first = plan.claim(output_path(Path::new("/in/2023/IMG_1.jpg"), "cleaned_IMG_1.jpg", out));
        let second = plan.claim(output_path(Path::new("/in/2024/IMG_1.jpg"), "cleaned_IMG_1.jpg", out));
        let third = plan.claim(output_path(Path::new("/in/2025/IMG_1.jpg"), "cleaned_IMG_1.jpg", out));

        assert_eq!(first, PathBuf::from("/out/cleaned_IMG_1.jpg"));
        assert_eq!(second, PathBuf::from("/out/cleaned_IMG_1_2.jpg"));
        assert_eq!(third, PathBuf::from("/out/cleaned_IMG_1_3.jpg"));
    }

    #[test]
    fn distinct_targets_are_kept() {
        let mut plan = OutputPlan::new();
        assert_eq!(plan.claim(PathBuf::from("/a/x.png")), PathBuf::from("/a/x.png"));
        assert_eq!(plan.claim(PathBuf::from("/b/x.png")), PathBuf::from("/b/x.png"));
        assert_eq!(plan.claim(PathBuf::from("/a/noext")), PathBuf::from("/a/noext"));
        assert_eq!(plan.claim(PathBuf::from("/a/noext")), PathBuf::from("/a/noext_2"));
    }

    #[test]
    fn write_refuses_existing_file_without_overwrite() {
        let tmp = tempfile::TempDir::new().unwrap();
        let target = tmp.path().join("cleaned_a.jpg");
        std::fs::write(&target, b"old").unwrap();

        let err = write_output(&target, b"new", false).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read(&target).unwrap(), b"old");

        write_output(&target, b"new", true).unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn write_creates_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let target = tmp.path().join("cleaned_b.png");
        write_output(&target, b"png", false).unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"png");
    }

    #[test]
    fn relative_source_without_parent() {
        let path = output_path(Path::new("a.jpg"), "cleaned_a.jpg", None);
        assert_eq!(path, PathBuf::from("cleaned_a.jpg"));
    }
}

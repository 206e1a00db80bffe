//! Filesystem vault.
//!
//! A directory of markdown notes with YAML front matter, exposed through the
//! host metadata traits. Used by the CLI and by the bulk conversion tool.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{FrontmatterWriter, HostError, MetadataSource, NotePath};
use crate::frontmatter::{Frontmatter, FrontmatterValue};

/// Image extensions offered as banner candidates.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "svg", "webp"];

/// A vault rooted at a directory.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

/// A note split into its front-matter block and body.
struct NoteSource<'a> {
    yaml: Option<&'a str>,
    body: &'a str,
}

/// One top-level piece of a front-matter block: a keyed entry with its
/// continuation lines, or a column-0 comment.
struct Segment<'a> {
    key: Option<String>,
    text: &'a str,
}

impl Vault {
    /// Opens a vault directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist or is not a directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, HostError> {
        let root = root.as_ref();
        let root = root.canonicalize().map_err(|source| HostError::Io {
            path: root.display().to_string(),
            source,
        })?;
        if !root.is_dir() {
            return Err(HostError::NoteNotFound(root.display().to_string()));
        }
        Ok(Self { root })
    }

    /// Absolute path of the vault root.
    #[must_use]
    pub fn root(&self) -> &Path { &self.root }

    /// Absolute filesystem path of a vault-relative path.
    ///
    /// `.` and `..` are resolved lexically; `None` if the path leaves the vault.
    #[must_use]
    pub fn absolute(&self, path: &str) -> Option<PathBuf> { confine(path).map(|p| self.root.join(p)) }

    /// Every file in the vault, sorted. Hidden files and folders are skipped.
    #[must_use]
    pub fn files(&self) -> Vec<NotePath> {
        let mut files = Vec::new();
        collect_files(&self.root, &self.root, &mut files);
        files.sort();
        files
    }

    /// Every markdown note in the vault, sorted.
    #[must_use]
    pub fn markdown_notes(&self) -> Vec<NotePath> {
        self.files().into_iter().filter(|f| f.extension().as_deref() == Some("md")).collect()
    }

    /// Image files usable as banners, optionally restricted to a folder.
    #[must_use]
    pub fn banner_images(&self, folder: Option<&str>) -> Vec<NotePath> {
        let prefix = folder.map(|f| format!("{}/", f.trim_matches('/')));
        self.files()
            .into_iter()
            .filter(|f| f.extension().is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str())))
            .filter(|f| prefix.as_ref().is_none_or(|p| f.as_str().starts_with(p.as_str())))
            .collect()
    }

    /// Reads a note and parses its front matter.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its front matter is not valid YAML.
    pub fn read_frontmatter(&self, note: &NotePath) -> Result<Frontmatter, HostError> {
        let content = self.read(note)?;
        parse_frontmatter(note, split_note(&content).yaml)
    }

    fn read(&self, note: &NotePath) -> Result<String, HostError> {
        let Some(path) = self.absolute(note.as_str()).filter(|p| p.is_file()) else {
            return Err(HostError::NoteNotFound(note.to_string()));
        };
        fs::read_to_string(&path).map_err(|source| HostError::Io { path: note.to_string(), source })
    }

    fn write_atomic(&self, note: &NotePath, content: &str) -> Result<(), HostError> {
        let path = self.absolute(note.as_str()).ok_or_else(|| HostError::NoteNotFound(note.to_string()))?;
        let io_err = |source| HostError::Io { path: note.to_string(), source };
        let dir = path.parent().unwrap_or(&self.root);

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(content.as_bytes()).map_err(io_err)?;
        tmp.persist(&path).map_err(|err| io_err(err.error))?;
        Ok(())
    }

    fn is_file(&self, path: &str) -> bool {
        !path.is_empty() && self.absolute(path).is_some_and(|p| p.is_file())
    }
}

impl MetadataSource for Vault {
    fn frontmatter(&self, note: &NotePath) -> Frontmatter {
        self.read_frontmatter(note).unwrap_or_else(|err| {
            tracing::debug!(path = %note, error = %err, "unreadable front matter");
            Frontmatter::new()
        })
    }

    fn resolve_link(&self, link: &str, source: &NotePath) -> Option<NotePath> {
        // `path#heading` and `path|alias` point at the same file
        let link = link.split(['#', '|']).next().unwrap_or_default().trim();
        if link.is_empty() {
            return None;
        }

        let mut candidates = vec![NotePath::new(link)];
        if candidates[0].extension().is_none() {
            candidates.push(NotePath::new(format!("{link}.md")));
        }

        for candidate in &candidates {
            let folder = source.folder();
            let relative = (!folder.is_empty()).then(|| format!("{folder}/{candidate}"));
            let found = [Some(candidate.as_str()), relative.as_deref()]
                .into_iter()
                .flatten()
                .filter_map(confine)
                .find(|path| self.is_file(path));
            if let Some(path) = found {
                return Some(NotePath::new(path));
            }
        }

        let files = self.files();
        candidates.iter().find_map(|candidate| {
            let suffix = format!("/{candidate}");
            files
                .iter()
                .filter(|f| f.as_str().ends_with(&suffix))
                .min_by_key(|f| (f.as_str().len(), f.as_str().to_string()))
                .cloned()
        })
    }

    fn file_exists(&self, path: &str) -> bool { self.is_file(path) }

    fn resource_url(&self, path: &str) -> String {
        let path = self.absolute(path).unwrap_or_else(|| self.root.clone());
        format!("file://{}", path.display())
    }
}

impl FrontmatterWriter for Vault {
    fn process_frontmatter(
        &self,
        note: &NotePath,
        mutate: &mut dyn FnMut(&mut Frontmatter),
    ) -> Result<(), HostError> {
        let content = self.read(note)?;
        let source = split_note(&content);
        let original = parse_frontmatter(note, source.yaml)?;

        let mut frontmatter = original.clone();
        mutate(&mut frontmatter);
        if frontmatter == original {
            return Ok(());
        }

        let rendered = render_note(note, &source, &original, &frontmatter)
            .map_err(|source| HostError::Frontmatter { path: note.to_string(), source })?;
        self.write_atomic(note, &rendered)?;
        tracing::debug!(path = %note, "front matter written");
        Ok(())
    }
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<NotePath>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(path = %dir.display(), error = %err, "failed to read directory");
            return;
        }
    };

    for entry in entries.flatten() {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        match entry.file_type() {
            Ok(kind) if kind.is_dir() => collect_files(root, &path, out),
            Ok(kind) if kind.is_file() => {
                if let Ok(relative) = path.strip_prefix(root) {
                    out.push(NotePath::new(relative.to_string_lossy()));
                }
            }
            _ => {}
        }
    }
}

/// Splits a note into its `---` fenced front-matter block and body.
fn split_note(content: &str) -> NoteSource<'_> {
    let no_frontmatter = NoteSource { yaml: None, body: content };

    let Some(rest) = content.strip_prefix("---").filter(|r| r.starts_with(['\n', '\r'])) else {
        return no_frontmatter;
    };
    let rest = rest.trim_start_matches('\r').strip_prefix('\n').unwrap_or(rest);
    let yaml_start = content.len() - rest.len();

    let mut offset = yaml_start;
    for line in content[yaml_start..].split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed == "---" || trimmed == "..." {
            return NoteSource {
                yaml: Some(&content[yaml_start..offset]),
                body: &content[offset + line.len()..],
            };
        }
        offset += line.len();
    }

    no_frontmatter
}

fn parse_frontmatter(note: &NotePath, yaml: Option<&str>) -> Result<Frontmatter, HostError> {
    let Some(yaml) = yaml.filter(|y| !y.trim().is_empty()) else {
        return Ok(Frontmatter::new());
    };
    let value: serde_yaml::Value = serde_yaml::from_str(yaml)
        .map_err(|source| HostError::Frontmatter { path: note.to_string(), source })?;
    Ok(Frontmatter::from_yaml(value))
}

/// Renders a note after its front matter changed from `original` to `updated`.
///
/// Untouched entries and comments are kept as written. If the block cannot be
/// split into entries safely it is serialized again in full. An empty mapping
/// drops the block.
fn render_note(
    note: &NotePath,
    source: &NoteSource<'_>,
    original: &Frontmatter,
    updated: &Frontmatter,
) -> Result<String, serde_yaml::Error> {
    if updated.is_empty() {
        return Ok(source.body.to_string());
    }
    let patched = source.yaml.and_then(|yaml| patch_block(yaml, original, updated));
    let yaml = match patched {
        Some(yaml) => yaml,
        None => {
            tracing::debug!(path = %note, "front matter serialized in full");
            serde_yaml::to_string(&updated.to_yaml())?
        }
    };
    Ok(format!("---\n{yaml}---\n{}", source.body))
}

fn patch_block(yaml: &str, original: &Frontmatter, updated: &Frontmatter) -> Option<String> {
    let segments = segments(yaml, original)?;

    let mut out = String::with_capacity(yaml.len());
    for segment in &segments {
        let Some(key) = &segment.key else {
            out.push_str(segment.text);
            continue;
        };
        match updated.get(key) {
            Some(value) if original.get(key) == Some(value) => out.push_str(segment.text),
            Some(value) => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(&entry_yaml(key, value)?);
            }
            None => {}
        }
    }

    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for (key, value) in updated.iter().filter(|(key, _)| !original.contains_key(key)) {
        out.push_str(&entry_yaml(key, value)?);
    }

    let reparsed = serde_yaml::from_str::<serde_yaml::Value>(&out).ok()?;
    (Frontmatter::from_yaml(reparsed) == *updated).then_some(out)
}

/// Splits a block into top-level segments, checking each keyed one parses on
/// its own to the same entry as the whole block.
fn segments<'a>(yaml: &'a str, original: &Frontmatter) -> Option<Vec<Segment<'a>>> {
    let mut segments: Vec<Segment<'a>> = Vec::new();
    let mut start = 0;
    let mut keyed = false;
    let mut offset = 0;

    let close = move |segments: &mut Vec<Segment<'a>>, start: usize, end: usize, keyed: bool| {
        if end > start {
            segments.push(Segment { key: keyed.then(String::new), text: &yaml[start..end] });
        }
    };

    for line in yaml.split_inclusive('\n') {
        let first = line.chars().next().unwrap_or(' ');
        let starts_entry = !first.is_whitespace() && first != '#' && first != '-';
        if starts_entry || first == '#' {
            close(&mut segments, start, offset, keyed);
            start = offset;
            keyed = starts_entry;
        }
        offset += line.len();
    }
    close(&mut segments, start, offset, keyed);

    let mut seen = 0;
    for segment in segments.iter_mut().filter(|s| s.key.is_some()) {
        let value = serde_yaml::from_str::<serde_yaml::Value>(segment.text).ok()?;
        let parsed = Frontmatter::from_yaml(value);
        let mut entries = parsed.iter();
        let (key, value) = entries.next()?;
        if entries.next().is_some() || original.get(key) != Some(value) {
            return None;
        }
        segment.key = Some(key.to_string());
        seen += 1;
    }
    (seen == original.len()).then_some(segments)
}

fn entry_yaml(key: &str, value: &FrontmatterValue) -> Option<String> {
    let mut mapping = serde_yaml::Mapping::new();
    mapping.insert(serde_yaml::Value::String(key.to_string()), value.to_yaml());
    serde_yaml::to_string(&mapping).ok()
}

/// Resolves `.` and `..` in a vault-relative path. `None` if it climbs above the root.
fn confine(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            part => parts.push(part),
        }
    }
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault_with(files: &[(&str, &str)]) -> (tempfile::TempDir, Vault) {
        let dir = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        let vault = Vault::open(dir.path()).unwrap();
        (dir, vault)
    }

    #[test]
    fn test_split_note() {
        let source = split_note("---\ntitle: x\n---\nbody\n");
        assert_eq!(source.yaml, Some("title: x\n"));
        assert_eq!(source.body, "body\n");

        let crlf = split_note("---\r\ntitle: x\r\n---\r\nbody");
        assert_eq!(crlf.yaml, Some("title: x\r\n"));
        assert_eq!(crlf.body, "body");

        let none = split_note("# Heading\n---\n");
        assert_eq!(none.yaml, None);

        let unterminated = split_note("---\ntitle: x\n");
        assert_eq!(unterminated.yaml, None);
    }

    #[test]
    fn test_frontmatter_read() {
        let (_dir, vault) = vault_with(&[("a.md", "---\nbanner: \"[[img.png]]\"\n---\n# A\n")]);
        let fm = vault.frontmatter(&NotePath::new("a.md"));
        assert_eq!(fm.get_str("banner"), Some("[[img.png]]"));
    }

    #[test]
    fn test_malformed_frontmatter_reads_empty() {
        let (_dir, vault) = vault_with(&[("a.md", "---\nbanner: [unclosed\n---\n")]);
        assert!(vault.frontmatter(&NotePath::new("a.md")).is_empty());
        assert!(vault.frontmatter(&NotePath::new("missing.md")).is_empty());
    }

    #[test]
    fn test_process_frontmatter_keeps_body() {
        let (dir, vault) = vault_with(&[("n.md", "---\ntitle: T\n---\nSome *body*\n")]);
        let note = NotePath::new("n.md");
        vault
            .process_frontmatter(&note, &mut |fm| {
                fm.insert("banner_y", "30%");
            })
            .unwrap();

        let content = fs::read_to_string(dir.path().join("n.md")).unwrap();
        assert!(content.starts_with("---\ntitle: T\nbanner_y: "));
        assert!(content.ends_with("---\nSome *body*\n"));
        assert_eq!(vault.frontmatter(&note).get_str("banner_y"), Some("30%"));
    }

    #[test]
    fn test_process_frontmatter_adds_block() {
        let (dir, vault) = vault_with(&[("n.md", "plain\n")]);
        vault
            .process_frontmatter(&NotePath::new("n.md"), &mut |fm| {
                fm.insert("banner", "[[a.png]]");
            })
            .unwrap();
        let content = fs::read_to_string(dir.path().join("n.md")).unwrap();
        assert!(content.starts_with("---\nbanner: "));
        assert!(content.ends_with("---\nplain\n"));
        assert_eq!(vault.frontmatter(&NotePath::new("n.md")).get_str("banner"), Some("[[a.png]]"));
    }

    #[test]
    fn test_process_frontmatter_refuses_malformed() {
        let (_dir, vault) = vault_with(&[("n.md", "---\nbanner: [unclosed\n---\n")]);
        let result = vault.process_frontmatter(&NotePath::new("n.md"), &mut |_| {});
        assert!(matches!(result, Err(HostError::Frontmatter { .. })));
    }

    #[test]
    fn test_process_frontmatter_missing_note() {
        let (_dir, vault) = vault_with(&[]);
        let result = vault.process_frontmatter(&NotePath::new("nope.md"), &mut |_| {});
        assert!(matches!(result, Err(HostError::NoteNotFound(_))));
    }

    #[test]
    fn test_resolve_link_order() {
        let (_dir, vault) = vault_with(&[
            ("img/sky.png", ""),
            ("notes/img/sky.png", ""),
            ("notes/day.md", ""),
            ("deep/a/b/cover.jpg", ""),
            ("other/cover.jpg", ""),
        ]);
        let source = NotePath::new("notes/day.md");

        assert_eq!(vault.resolve_link("img/sky.png", &source), Some(NotePath::new("img/sky.png")));
        assert_eq!(vault.resolve_link("sky.png", &source), Some(NotePath::new("img/sky.png")));
        assert_eq!(vault.resolve_link("cover.jpg", &source), Some(NotePath::new("other/cover.jpg")));
        assert_eq!(vault.resolve_link("day", &source), Some(NotePath::new("notes/day.md")));
        assert_eq!(vault.resolve_link("day#Heading", &source), Some(NotePath::new("notes/day.md")));
        assert_eq!(vault.resolve_link("missing.png", &source), None);
        assert_eq!(vault.resolve_link("", &source), None);
    }

    #[test]
    fn test_resolve_link_relative_to_source() {
        let (_dir, vault) = vault_with(&[("notes/local.png", ""), ("notes/n.md", "")]);
        let source = NotePath::new("notes/n.md");
        assert_eq!(vault.resolve_link("local.png", &source), Some(NotePath::new("notes/local.png")));
    }

    #[test]
    fn test_listing_skips_hidden_entries() {
        let (_dir, vault) = vault_with(&[
            ("a.md", ""),
            (".obsidian/app.json", ""),
            ("sub/.hidden.md", ""),
            ("sub/b.md", ""),
            ("sub/c.png", ""),
        ]);
        assert_eq!(vault.markdown_notes(), vec![NotePath::new("a.md"), NotePath::new("sub/b.md")]);
    }

    #[test]
    fn test_banner_images_respect_folder() {
        let (_dir, vault) = vault_with(&[
            ("banners/a.PNG", ""),
            ("banners/b.webp", ""),
            ("banners/readme.md", ""),
            ("elsewhere/c.jpg", ""),
        ]);
        assert_eq!(vault.banner_images(None).len(), 3);
        assert_eq!(
            vault.banner_images(Some("banners")),
            vec![NotePath::new("banners/a.PNG"), NotePath::new("banners/b.webp")]
        );
    }

    #[test]
    fn test_resource_url_and_exists() {
        let (_dir, vault) = vault_with(&[("img/a.png", "")]);
        assert!(vault.file_exists("img/a.png"));
        assert!(!vault.file_exists("img"));
        assert!(!vault.file_exists(""));
        let url = vault.resource_url("img/a.png");
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("img/a.png"));
    }

    #[test]
    fn test_nested_list_value_survives_rewrite() {
        let (_dir, vault) = vault_with(&[("n.md", "---\nbanner: [[a.png]]\nother: 1\n---\n")]);
        let note = NotePath::new("n.md");
        vault
            .process_frontmatter(&note, &mut |fm| {
                fm.insert("other", 2_i64);
            })
            .unwrap();
        let fm = vault.frontmatter(&note);
        assert!(matches!(fm.get("banner"), Some(FrontmatterValue::List(_))));
        assert_eq!(fm.get("other"), Some(&FrontmatterValue::from(2_i64)));
    }

    #[test]
    fn test_write_keeps_comments_and_exact_numbers() {
        let original = "---\n# keep me\nid: 12345678901234567890\nzip: 9007199254740993\ntags:\n  - a # first\n  - b\nbanner_y: 10%\n---\nbody\n";
        let (dir, vault) = vault_with(&[("n.md", original)]);
        let note = NotePath::new("n.md");
        vault
            .process_frontmatter(&note, &mut |fm| {
                fm.insert("banner_y", "42%");
            })
            .unwrap();

        let content = fs::read_to_string(dir.path().join("n.md")).unwrap();
        assert!(content.starts_with(
            "---\n# keep me\nid: 12345678901234567890\nzip: 9007199254740993\ntags:\n  - a # first\n  - b\nbanner_y: "
        ));
        assert!(content.ends_with("\n---\nbody\n"));
        assert_eq!(vault.frontmatter(&note).get_str("banner_y"), Some("42%"));
    }

    #[test]
    fn test_write_appends_and_removes_entries_in_place() {
        let (dir, vault) = vault_with(&[("n.md", "---\ntitle: T # title\nbanner: old.png\n---\n")]);
        let note = NotePath::new("n.md");
        vault
            .process_frontmatter(&note, &mut |fm| {
                fm.remove("banner");
                fm.insert("banner_x", 0.5);
            })
            .unwrap();

        let content = fs::read_to_string(dir.path().join("n.md")).unwrap();
        assert_eq!(content, "---\ntitle: T # title\nbanner_x: 0.5\n---\n");
    }

    #[test]
    fn test_write_falls_back_for_shared_anchors() {
        let (_dir, vault) = vault_with(&[("n.md", "---\na: &x 1\nb: *x\n---\n")]);
        let note = NotePath::new("n.md");
        vault
            .process_frontmatter(&note, &mut |fm| {
                fm.insert("c", true);
            })
            .unwrap();

        let fm = vault.frontmatter(&note);
        assert_eq!(fm.get("b"), Some(&FrontmatterValue::from(1_i64)));
        assert_eq!(fm.get("c"), Some(&FrontmatterValue::Bool(true)));
    }

    #[test]
    fn test_paths_cannot_leave_the_vault() {
        let outer = tempfile::tempdir().unwrap();
        fs::write(outer.path().join("secret.png"), "").unwrap();
        fs::create_dir_all(outer.path().join("vault/notes")).unwrap();
        fs::write(outer.path().join("vault/notes/n.md"), "").unwrap();
        fs::write(outer.path().join("vault/top.png"), "").unwrap();
        let vault = Vault::open(outer.path().join("vault")).unwrap();
        let source = NotePath::new("notes/n.md");

        assert!(!vault.file_exists("../secret.png"));
        assert!(vault.absolute("notes/../../secret.png").is_none());
        assert_eq!(vault.resolve_link("../secret.png", &source), None);
        assert_eq!(vault.resolve_link("../../secret.png", &source), None);
        assert_eq!(vault.resolve_link("../top.png", &source), Some(NotePath::new("top.png")));
        assert!(vault.file_exists("notes/../top.png"));

        let result = vault.process_frontmatter(&NotePath::new("../secret.png"), &mut |_| {});
        assert!(matches!(result, Err(HostError::NoteNotFound(_))));
    }
}

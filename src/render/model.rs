//! Structured diff model parsed from raw unified diff text.

use serde::Serialize;

use crate::core::RawDiff;

/// Kind of change a file underwent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileChange {
    /// File did not exist before.
    Added,
    /// File no longer exists.
    Deleted,
    /// File content changed in place.
    Modified,
    /// File moved, possibly with content changes.
    Renamed,
    /// File duplicated from another path.
    Copied,
}

/// Kind of a single line inside a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Unchanged line present on both sides.
    Context,
    /// Line added on the new side.
    Insert,
    /// Line removed from the old side.
    Delete,
}

/// One line of a hunk, with its position on each side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffLine {
    /// Whether the line is context, an insertion, or a deletion.
    pub kind: LineKind,
    /// Line number on the old side, absent for insertions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_number: Option<usize>,
    /// Line number on the new side, absent for deletions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_number: Option<usize>,
    /// Line content without the leading marker character.
    pub content: String,
}

/// A contiguous run of changes with surrounding context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    /// The full `@@ ... @@` header line.
    pub header: String,
    /// First line number on the old side.
    pub old_start: usize,
    /// Number of old-side lines the hunk covers.
    pub old_count: usize,
    /// First line number on the new side.
    pub new_start: usize,
    /// Number of new-side lines the hunk covers.
    pub new_count: usize,
    /// The hunk body, in input order.
    pub lines: Vec<DiffLine>,
}

/// A changed file with its parsed hunks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiff {
    /// Path on the old side, without the `a/` prefix.
    pub old_path: String,
    /// Path on the new side, without the `b/` prefix.
    pub new_path: String,
    /// Kind of change.
    pub change: FileChange,
    /// Whether git reported the file as binary.
    pub is_binary: bool,
    /// Number of inserted lines.
    pub additions: usize,
    /// Number of deleted lines.
    pub deletions: usize,
    /// Parsed hunks, empty for binary files.
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    /// Name shown to the user: `old → new` for renames and copies,
    /// otherwise the new path.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.change {
            FileChange::Renamed | FileChange::Copied if self.old_path != self.new_path => {
                format!("{} → {}", self.old_path, self.new_path)
            }
            _ => self.new_path.clone(),
        }
    }
}

/// The structured model of a whole diff: one entry per file, in input
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiffModel {
    /// The parsed files.
    pub files: Vec<FileDiff>,
}

impl DiffModel {
    /// Total additions across all files.
    #[must_use]
    pub fn additions(&self) -> usize {
        self.files.iter().map(|f| f.additions).sum()
    }

    /// Total deletions across all files.
    #[must_use]
    pub fn deletions(&self) -> usize {
        self.files.iter().map(|f| f.deletions).sum()
    }
}

/// Parse raw unified diff text into the structured model.
///
/// Splits on line-anchored `diff --git` boundaries so file content that
/// merely mentions the marker cannot cause false splits. Unparseable
/// chunks are skipped rather than failing the whole diff.
#[must_use]
pub fn json_model(input: &RawDiff) -> DiffModel {
    let mut files = Vec::new();
    let mut chunk: Vec<&str> = Vec::new();

    for line in input.as_str().lines() {
        if line.starts_with("diff --git ") {
            if let Some(file) = parse_file_chunk(&chunk) {
                files.push(file);
            }
            chunk.clear();
            chunk.push(line);
        } else if !chunk.is_empty() {
            // Lines before the first header are prologue noise.
            chunk.push(line);
        }
    }
    if let Some(file) = parse_file_chunk(&chunk) {
        files.push(file);
    }

    DiffModel { files }
}

fn parse_file_chunk(lines: &[&str]) -> Option<FileDiff> {
    let (mut old_path, mut new_path) = parse_diff_header(lines.first()?)?;

    let mut change = FileChange::Modified;
    let mut is_binary = false;

    // Extended header lines sit between the diff header and the first hunk.
    for line in lines.iter().take_while(|l| !l.starts_with("@@")) {
        if line.starts_with("new file mode") {
            change = FileChange::Added;
        } else if line.starts_with("deleted file mode") {
            change = FileChange::Deleted;
        } else if let Some(from) = line.strip_prefix("rename from ") {
            change = FileChange::Renamed;
            old_path = from.to_string();
        } else if let Some(to) = line.strip_prefix("rename to ") {
            new_path = to.to_string();
        } else if let Some(from) = line.strip_prefix("copy from ") {
            change = FileChange::Copied;
            old_path = from.to_string();
        } else if let Some(to) = line.strip_prefix("copy to ") {
            new_path = to.to_string();
        } else if line.starts_with("Binary files ") || line.starts_with("GIT binary patch") {
            is_binary = true;
        }
    }

    let hunks = parse_hunks(lines);
    let additions = hunks
        .iter()
        .flat_map(|h| &h.lines)
        .filter(|l| l.kind == LineKind::Insert)
        .count();
    let deletions = hunks
        .iter()
        .flat_map(|h| &h.lines)
        .filter(|l| l.kind == LineKind::Delete)
        .count();

    Some(FileDiff {
        old_path,
        new_path,
        change,
        is_binary,
        additions,
        deletions,
        hunks,
    })
}

fn parse_hunks(lines: &[&str]) -> Vec<Hunk> {
    let mut hunks: Vec<Hunk> = Vec::new();
    let mut old_number = 0;
    let mut new_number = 0;

    for line in lines {
        if let Some(hunk) = parse_hunk_header(line) {
            old_number = hunk.old_start;
            new_number = hunk.new_start;
            hunks.push(hunk);
            continue;
        }
        let Some(hunk) = hunks.last_mut() else {
            continue;
        };
        match line.chars().next() {
            Some('+') => {
                hunk.lines.push(DiffLine {
                    kind: LineKind::Insert,
                    old_number: None,
                    new_number: Some(new_number),
                    content: line[1..].to_string(),
                });
                new_number += 1;
            }
            Some('-') => {
                hunk.lines.push(DiffLine {
                    kind: LineKind::Delete,
                    old_number: Some(old_number),
                    new_number: None,
                    content: line[1..].to_string(),
                });
                old_number += 1;
            }
            // "\ No newline at end of file" markers keep their full text
            // and occupy no line number on either side.
            Some('\\') => hunk.lines.push(DiffLine {
                kind: LineKind::Context,
                old_number: None,
                new_number: None,
                content: (*line).to_string(),
            }),
            // Some diff producers emit empty context lines with the
            // leading space trimmed.
            Some(' ') | None => {
                hunk.lines.push(DiffLine {
                    kind: LineKind::Context,
                    old_number: Some(old_number),
                    new_number: Some(new_number),
                    content: line.get(1..).unwrap_or("").to_string(),
                });
                old_number += 1;
                new_number += 1;
            }
            _ => {}
        }
    }

    hunks
}

/// Parse an `@@ -a,b +c,d @@` hunk header. Counts default to 1 when the
/// short `-a +c` form is used.
fn parse_hunk_header(line: &str) -> Option<Hunk> {
    let rest = line.strip_prefix("@@ -")?;
    let (old_part, rest) = rest.split_once(" +")?;
    let (new_part, _) = rest.split_once(" @@")?;
    let (old_start, old_count) = parse_range(old_part)?;
    let (new_start, new_count) = parse_range(new_part)?;
    Some(Hunk {
        header: line.to_string(),
        old_start,
        old_count,
        new_start,
        new_count,
        lines: Vec::new(),
    })
}

fn parse_range(part: &str) -> Option<(usize, usize)> {
    match part.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
        None => Some((part.parse().ok()?, 1)),
    }
}

/// Parse a `diff --git a/old b/new` header into its two paths.
///
/// Handles git's C-style quoting for paths with special characters, and
/// splits unquoted paths on the last ` b/` so paths containing spaces
/// survive.
fn parse_diff_header(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("diff --git ")?;

    if let Some(paths) = parse_quoted_header(rest) {
        return Some(paths);
    }

    let b_idx = rest.rfind(" b/")?;
    let old = rest[..b_idx].strip_prefix("a/").unwrap_or(&rest[..b_idx]);
    let new = rest[b_idx + 1..]
        .strip_prefix("b/")
        .unwrap_or(&rest[b_idx + 1..]);
    Some((old.to_string(), new.to_string()))
}

fn parse_quoted_header(rest: &str) -> Option<(String, String)> {
    if !rest.starts_with('"') {
        return None;
    }
    let (first, remainder) = split_quoted(rest)?;
    let remainder = remainder.strip_prefix(' ')?;
    if !remainder.starts_with('"') {
        return None;
    }
    let (second, _) = split_quoted(remainder)?;

    let old = unquote_c_style(first);
    let new = unquote_c_style(second);
    let old = old.strip_prefix("a/").unwrap_or(&old).to_string();
    let new = new.strip_prefix("b/").unwrap_or(&new).to_string();
    Some((old, new))
}

/// Split a leading double-quoted token off `s`, honoring backslash
/// escapes. Returns the token including its quotes and the rest.
fn split_quoted(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some((&s[..=i], &s[i + 1..])),
            _ => i += 1,
        }
    }
    None
}

/// Undo git's C-style path quoting.
fn unquote_c_style(quoted: &str) -> String {
    let Some(inner) = quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
    else {
        return quoted.to_string();
    };

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(diff: &str) -> DiffModel {
        json_model(&RawDiff::new(diff))
    }

    #[test]
    fn parses_a_simple_modification() {
        let diff = r#"diff --git a/src/main.rs b/src/main.rs
index abc123..def456 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,3 +1,4 @@
 fn main() {
+    println!("Hello");
     println!("World");
 }
"#;
        let model = model(diff);
        assert_eq!(model.files.len(), 1);
        let file = &model.files[0];
        assert_eq!(file.new_path, "src/main.rs");
        assert_eq!(file.change, FileChange::Modified);
        assert_eq!(file.additions, 1);
        assert_eq!(file.deletions, 0);
        assert_eq!(file.hunks.len(), 1);
        assert_eq!(file.hunks[0].old_start, 1);
        assert_eq!(file.hunks[0].new_count, 4);
    }

    #[test]
    fn numbers_lines_on_the_right_sides() {
        let diff = "diff --git a/x b/x\n--- a/x\n+++ b/x\n@@ -10,3 +20,3 @@\n ctx\n-gone\n+here\n";
        let file = &model(diff).files[0];
        let lines = &file.hunks[0].lines;
        assert_eq!(lines[0].old_number, Some(10));
        assert_eq!(lines[0].new_number, Some(20));
        assert_eq!(lines[1].kind, LineKind::Delete);
        assert_eq!(lines[1].old_number, Some(11));
        assert_eq!(lines[1].new_number, None);
        assert_eq!(lines[2].kind, LineKind::Insert);
        assert_eq!(lines[2].old_number, None);
        assert_eq!(lines[2].new_number, Some(21));
    }

    #[test]
    fn parses_added_and_deleted_files() {
        let diff = r#"diff --git a/new.txt b/new.txt
new file mode 100644
--- /dev/null
+++ b/new.txt
@@ -0,0 +1,2 @@
+line 1
+line 2
diff --git a/old.txt b/old.txt
deleted file mode 100644
--- a/old.txt
+++ /dev/null
@@ -1,1 +0,0 @@
-line 1
"#;
        let model = model(diff);
        assert_eq!(model.files.len(), 2);
        assert_eq!(model.files[0].change, FileChange::Added);
        assert_eq!(model.files[0].additions, 2);
        assert_eq!(model.files[1].change, FileChange::Deleted);
        assert_eq!(model.files[1].deletions, 1);
        assert_eq!(model.additions(), 2);
        assert_eq!(model.deletions(), 1);
    }

    #[test]
    fn parses_renames_with_explicit_paths() {
        let diff = r#"diff --git a/old_name.rs b/new_name.rs
similarity index 95%
rename from old_name.rs
rename to new_name.rs
--- a/old_name.rs
+++ b/new_name.rs
@@ -1 +1 @@
-old();
+new();
"#;
        let file = &model(diff).files[0];
        assert_eq!(file.change, FileChange::Renamed);
        assert_eq!(file.old_path, "old_name.rs");
        assert_eq!(file.new_path, "new_name.rs");
        assert_eq!(file.display_name(), "old_name.rs → new_name.rs");
    }

    #[test]
    fn parses_copies() {
        let diff = "diff --git a/a.txt b/b.txt\nsimilarity index 100%\ncopy from a.txt\ncopy to b.txt\n";
        let file = &model(diff).files[0];
        assert_eq!(file.change, FileChange::Copied);
        assert_eq!(file.old_path, "a.txt");
        assert_eq!(file.new_path, "b.txt");
        assert!(file.hunks.is_empty());
    }

    #[test]
    fn detects_binary_files() {
        let diff = "diff --git a/logo.png b/logo.png\nindex abc..def 100644\nBinary files a/logo.png and b/logo.png differ\n";
        let file = &model(diff).files[0];
        assert!(file.is_binary);
        assert!(file.hunks.is_empty());
    }

    #[test]
    fn content_mentioning_the_boundary_does_not_split() {
        let diff = r#"diff --git a/test.md b/test.md
--- a/test.md
+++ b/test.md
@@ -1,3 +1,5 @@
 # Example
+This line shows: diff --git a/fake b/fake
+Another line with diff --git in content
 End of file
"#;
        let model = model(diff);
        assert_eq!(model.files.len(), 1);
        assert_eq!(model.files[0].additions, 2);
    }

    #[test]
    fn quoted_paths_are_unescaped() {
        let diff = "diff --git \"a/path with spaces.txt\" \"b/path with spaces.txt\"\nnew file mode 100644\n--- /dev/null\n+++ \"b/path with spaces.txt\"\n@@ -0,0 +1 @@\n+content\n";
        let file = &model(diff).files[0];
        assert_eq!(file.new_path, "path with spaces.txt");
        assert_eq!(file.change, FileChange::Added);
    }

    #[test]
    fn unquoting_handles_escapes() {
        assert_eq!(unquote_c_style(r#""simple""#), "simple");
        assert_eq!(unquote_c_style(r#""with\\backslash""#), "with\\backslash");
        assert_eq!(unquote_c_style(r#""with\ttab""#), "with\ttab");
        assert_eq!(unquote_c_style(r#""with\"quote""#), "with\"quote");
        assert_eq!(unquote_c_style("unquoted"), "unquoted");
    }

    #[test]
    fn keeps_the_no_newline_marker_without_numbers() {
        let diff =
            "diff --git a/x b/x\n--- a/x\n+++ b/x\n@@ -1 +1 @@\n-old\n+new\n\\ No newline at end of file\n";
        let lines = &model(diff).files[0].hunks[0].lines;
        let marker = &lines[2];
        assert_eq!(marker.content, "\\ No newline at end of file");
        assert_eq!(marker.old_number, None);
        assert_eq!(marker.new_number, None);
    }

    #[test]
    fn prologue_noise_is_ignored() {
        let diff = "some shell banner\nwarning: whatever\ndiff --git a/x b/x\n--- a/x\n+++ b/x\n@@ -1 +1 @@\n-a\n+b\n";
        let model = model(diff);
        assert_eq!(model.files.len(), 1);
    }

    #[test]
    fn empty_input_yields_an_empty_model() {
        let model = model("");
        assert!(model.files.is_empty());
        assert_eq!(serde_json::to_string(&model).unwrap(), "[]");
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let diff = "diff --git a/x b/x\n--- a/x\n+++ b/x\n@@ -1 +1 @@\n-a\n+b\n";
        let json = serde_json::to_value(model(diff)).unwrap();
        let file = &json[0];
        assert_eq!(file["newPath"], "x");
        assert_eq!(file["change"], "modified");
        assert_eq!(file["isBinary"], false);
        let line = &file["hunks"][0]["lines"][0];
        assert_eq!(line["kind"], "delete");
        assert_eq!(line["oldNumber"], 1);
        assert!(line.get("newNumber").is_none());
    }
}

//! Unified diff format parser.
//!
//! Splits `git diff` output into per-file patches, reads the extended
//! headers of each one, and parses `--numstat -z` line counts.

use std::collections::HashMap;

use crate::models::FileChangeType;

/// One file's section of a unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePatch {
    pub old_path: String,
    pub new_path: String,
    pub is_new: bool,
    pub is_deleted: bool,
    pub is_rename: bool,
    pub is_binary: bool,
    /// Hunk text from the first `@@` line on. For binary files this holds
    /// git's `Binary files ... differ` notice instead.
    pub body: String,
}

impl FilePatch {
    pub fn change_type(&self) -> FileChangeType {
        if self.is_new {
            FileChangeType::Added
        } else if self.is_deleted {
            FileChangeType::Deleted
        } else if self.is_rename {
            FileChangeType::Renamed
        } else {
            FileChangeType::Modified
        }
    }

    /// The path a reviewer should see: the new path, or the old path for
    /// deletions.
    pub fn display_path(&self) -> &str {
        if self.is_deleted {
            &self.old_path
        } else {
            &self.new_path
        }
    }

    /// Count `+`/`-` lines in the hunk text.
    pub fn count_lines(&self) -> (u64, u64) {
        let mut additions = 0;
        let mut deletions = 0;
        let mut in_hunk = false;
        for line in self.body.lines() {
            if line.starts_with("@@") {
                in_hunk = true;
            } else if in_hunk && line.starts_with('+') {
                additions += 1;
            } else if in_hunk && line.starts_with('-') {
                deletions += 1;
            }
        }
        (additions, deletions)
    }
}

/// Split raw diff output into one chunk per file.
///
/// Splitting happens on bytes so that each file is decoded on its own: a
/// file with invalid UTF-8 only degrades its own text.
pub fn split_file_sections(raw: &[u8]) -> Vec<String> {
    let mut sections: Vec<Vec<u8>> = Vec::new();
    for line in raw.split_inclusive(|&b| b == b'\n') {
        if line.starts_with(b"diff --git ") || sections.is_empty() {
            sections.push(Vec::new());
        }
        if let Some(current) = sections.last_mut() {
            current.extend_from_slice(line);
        }
    }
    sections
        .into_iter()
        .filter(|s| s.starts_with(b"diff --git "))
        .map(|s| String::from_utf8_lossy(&s).into_owned())
        .collect()
}

/// Parse one file section produced by [`split_file_sections`].
pub fn parse_file_section(section: &str) -> Result<FilePatch, String> {
    let mut lines = section.lines();
    let header = lines
        .next()
        .filter(|l| l.starts_with("diff --git "))
        .ok_or_else(|| "missing diff header".to_string())?;
    let (mut old_path, mut new_path) = parse_diff_header(header);

    let mut is_new = false;
    let mut is_deleted = false;
    let mut is_rename = false;
    let mut is_binary = false;
    let mut binary_notice = None;

    for line in lines {
        if line.starts_with("@@") {
            break;
        }
        if line.starts_with("new file mode") {
            is_new = true;
        } else if line.starts_with("deleted file mode") {
            is_deleted = true;
        } else if let Some(path) = line.strip_prefix("rename from ") {
            is_rename = true;
            old_path = unquote(path);
        } else if let Some(path) = line.strip_prefix("rename to ") {
            is_rename = true;
            new_path = unquote(path);
        } else if let Some(path) = line.strip_prefix("--- ") {
            let path = strip_header_tab(path);
            if path != "/dev/null" {
                old_path = strip_diff_prefix(&unquote(path)).to_string();
            }
        } else if let Some(path) = line.strip_prefix("+++ ") {
            let path = strip_header_tab(path);
            if path != "/dev/null" {
                new_path = strip_diff_prefix(&unquote(path)).to_string();
            }
        } else if line.starts_with("Binary files") || line.starts_with("GIT binary patch") {
            is_binary = true;
            binary_notice = Some(line.to_string());
        }
    }

    if is_new && new_path.is_empty() {
        new_path = old_path.clone();
    }
    if is_deleted && old_path.is_empty() {
        old_path = new_path.clone();
    }
    if old_path.is_empty() && new_path.is_empty() {
        return Err(format!("could not determine file paths from `{header}`"));
    }

    let body = match section.find("\n@@") {
        Some(idx) => section[idx + 1..].to_string(),
        None => binary_notice.unwrap_or_default(),
    };

    Ok(FilePatch {
        old_path,
        new_path,
        is_new,
        is_deleted,
        is_rename,
        is_binary,
        body,
    })
}

/// Line counts keyed by new path. `None` marks a binary entry.
pub type NumStats = HashMap<String, Option<(u64, u64)>>;

/// Parse `git diff --numstat -z` output.
///
/// Regular entries are `added\tdeleted\tpath\0`; renames are
/// `added\tdeleted\t\0old\0new\0`.
pub fn parse_numstat(raw: &[u8]) -> NumStats {
    let text = String::from_utf8_lossy(raw);
    let mut tokens = text.split('\0');
    let mut stats = NumStats::new();

    while let Some(token) = tokens.next() {
        let token = token.trim_start_matches('\n');
        if token.is_empty() {
            continue;
        }
        let mut fields = token.splitn(3, '\t');
        let (Some(added), Some(deleted), Some(path)) = (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        let path = if path.is_empty() {
            // Rename: old path, then new path.
            let _old = tokens.next();
            match tokens.next() {
                Some(new) => new.to_string(),
                None => continue,
            }
        } else {
            path.to_string()
        };
        let counts = added.parse::<u64>().ok().zip(deleted.parse::<u64>().ok());
        stats.insert(path, counts);
    }

    stats
}

/// Truncate patch text to `max_chars` characters, appending a marker with
/// the original length.
pub fn truncate_patch(text: String, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text;
    }
    let kept: String = text.chars().take(max_chars).collect();
    format!("{kept}\n... (truncated, total size: {total} chars)")
}

/// Parse the "diff --git a/path b/path" header line.
fn parse_diff_header(line: &str) -> (String, String) {
    let rest = line.strip_prefix("diff --git ").unwrap_or(line);

    if let Some((a_part, b_part)) = split_quoted_pair(rest) {
        return (
            strip_diff_prefix(&a_part).to_string(),
            strip_diff_prefix(&b_part).to_string(),
        );
    }

    // Paths may contain spaces, so look for the second ` b/` separator
    // rather than splitting on the first space.
    if let Some(b_idx) = find_second_prefix(rest) {
        let old_path = strip_diff_prefix(&rest[..b_idx]).to_string();
        let new_path = strip_diff_prefix(&rest[b_idx + 1..]).to_string();
        (old_path, new_path)
    } else {
        let mut parts = rest.splitn(2, ' ');
        let old_path = strip_diff_prefix(parts.next().unwrap_or_default()).to_string();
        let new_path = strip_diff_prefix(parts.next().unwrap_or_default()).to_string();
        (old_path, new_path)
    }
}

/// Handle headers where either path is quoted, e.g. `"a/x\ty" "b/x\ty"`
/// or `a/plain "b/q\"uote"`.
fn split_quoted_pair(rest: &str) -> Option<(String, String)> {
    if rest.starts_with('"') {
        let end = closing_quote(rest)?;
        let first = unquote(&rest[..=end]);
        let second = unquote(rest[end + 1..].trim_start());
        return Some((first, second));
    }
    // An unquoted path never contains `"`, so the first ` "` separates them.
    let idx = rest.find(" \"")?;
    Some((rest[..idx].to_string(), unquote(&rest[idx + 1..])))
}

/// Byte index of the quote closing the string that opens at index 0.
fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i),
            _ => {}
        }
    }
    None
}

/// Git appends a tab to `---`/`+++` paths that contain a space.
fn strip_header_tab(path: &str) -> &str {
    path.strip_suffix('\t').unwrap_or(path)
}

/// Decode a path git may have written as a C-style quoted string.
///
/// Unquoted input is returned as-is. Octal escapes are raw bytes and are
/// reassembled before UTF-8 decoding.
fn unquote(path: &str) -> String {
    let Some(inner) = path.strip_prefix('"').and_then(|p| p.strip_suffix('"')) else {
        return path.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => bytes.push(b'\n'),
            Some('t') => bytes.push(b'\t'),
            Some('r') => bytes.push(b'\r'),
            Some('a') => bytes.push(0x07),
            Some('b') => bytes.push(0x08),
            Some('f') => bytes.push(0x0c),
            Some('v') => bytes.push(0x0b),
            Some(d @ '0'..='7') => {
                let mut value = d.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                bytes.push(value as u8);
            }
            Some(other) => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn strip_diff_prefix(path: &str) -> &str {
    path.strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path)
}

fn find_second_prefix(s: &str) -> Option<usize> {
    s.match_indices(" b/").map(|(i, _)| i).next()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODIFIED: &str = "diff --git a/src/main.rs b/src/main.rs
index 1234567..abcdefg 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,3 +1,4 @@
 fn main() {
-    println!(\"old\");
+    println!(\"new\");
+    println!(\"extra\");
 }
";

    #[test]
    fn parse_modified_file() {
        let sections = split_file_sections(MODIFIED.as_bytes());
        assert_eq!(sections.len(), 1);
        let patch = parse_file_section(&sections[0]).unwrap();
        assert_eq!(patch.new_path, "src/main.rs");
        assert_eq!(patch.change_type(), FileChangeType::Modified);
        assert!(patch.body.starts_with("@@ -1,3 +1,4 @@"));
        assert_eq!(patch.count_lines(), (2, 1));
    }

    #[test]
    fn parse_new_and_deleted_files() {
        let input = "diff --git a/new.rs b/new.rs
new file mode 100644
index 0000000..1234567
--- /dev/null
+++ b/new.rs
@@ -0,0 +1,2 @@
+fn hello() {}
+fn world() {}
diff --git a/old.rs b/old.rs
deleted file mode 100644
index 1234567..0000000
--- a/old.rs
+++ /dev/null
@@ -1 +0,0 @@
-fn gone() {}
";
        let sections = split_file_sections(input.as_bytes());
        assert_eq!(sections.len(), 2);

        let added = parse_file_section(&sections[0]).unwrap();
        assert_eq!(added.change_type(), FileChangeType::Added);
        assert_eq!(added.display_path(), "new.rs");
        assert_eq!(added.count_lines(), (2, 0));

        let deleted = parse_file_section(&sections[1]).unwrap();
        assert_eq!(deleted.change_type(), FileChangeType::Deleted);
        assert_eq!(deleted.display_path(), "old.rs");
        assert_eq!(deleted.count_lines(), (0, 1));
    }

    #[test]
    fn parse_rename_headers() {
        let input = "diff --git a/old name.rs b/new name.rs
similarity index 90%
rename from old name.rs
rename to new name.rs
";
        let patch = parse_file_section(&split_file_sections(input.as_bytes())[0]).unwrap();
        assert_eq!(patch.change_type(), FileChangeType::Renamed);
        assert_eq!(patch.old_path, "old name.rs");
        assert_eq!(patch.new_path, "new name.rs");
        assert!(patch.body.is_empty());
    }

    #[test]
    fn parse_binary_file() {
        let input = "diff --git a/img.png b/img.png
new file mode 100644
index 0000000..1234567
Binary files /dev/null and b/img.png differ
";
        let patch = parse_file_section(&split_file_sections(input.as_bytes())[0]).unwrap();
        assert!(patch.is_binary);
        assert_eq!(patch.display_path(), "img.png");
        assert_eq!(patch.body, "Binary files /dev/null and b/img.png differ");
        assert_eq!(patch.count_lines(), (0, 0));
    }

    #[test]
    fn parse_quoted_header() {
        let (old, new) = parse_diff_header("diff --git \"a/tab\\there.txt\" \"b/tab\\there.txt\"");
        assert_eq!(old, "tab\there.txt");
        assert_eq!(new, "tab\there.txt");
    }

    #[test]
    fn quoted_header_with_escaped_quote() {
        let (old, new) = parse_diff_header(r#"diff --git "a/tab\"q.txt" "b/tab\"q.txt""#);
        assert_eq!(old, "tab\"q.txt");
        assert_eq!(new, "tab\"q.txt");

        let (old, new) = parse_diff_header(r#"diff --git a/plain.txt "b/back\\slash.txt""#);
        assert_eq!(old, "plain.txt");
        assert_eq!(new, "back\\slash.txt");
    }

    #[test]
    fn unquote_decodes_c_escapes() {
        assert_eq!(unquote("plain name.txt"), "plain name.txt");
        assert_eq!(unquote(r#""a\"b\\c\td\ne""#), "a\"b\\c\td\ne");
        // UTF-8 bytes of "é" written as octal escapes.
        assert_eq!(unquote(r#""caf\303\251.txt""#), "café.txt");
    }

    #[test]
    fn quoted_paths_in_file_headers() {
        let input = r#"diff --git "a/tab\"q.txt" "b/tab\"q.txt"
new file mode 100644
index 0000000..1234567
--- /dev/null
+++ "b/tab\"q.txt"
@@ -0,0 +1 @@
+hi
"#;
        let patch = parse_file_section(&split_file_sections(input.as_bytes())[0]).unwrap();
        assert_eq!(patch.display_path(), "tab\"q.txt");
        assert_eq!(patch.change_type(), FileChangeType::Added);
    }

    #[test]
    fn trailing_tab_after_spaced_path_is_dropped() {
        let input = "diff --git a/my file.txt b/my file.txt
index 1234567..abcdefg 100644
--- a/my file.txt\t
+++ b/my file.txt\t
@@ -1 +1 @@
-old
+new
";
        let patch = parse_file_section(&split_file_sections(input.as_bytes())[0]).unwrap();
        assert_eq!(patch.old_path, "my file.txt");
        assert_eq!(patch.new_path, "my file.txt");

        let added = "diff --git a/my file.txt b/my file.txt
new file mode 100644
--- /dev/null
+++ b/my file.txt\t
@@ -0,0 +1 @@
+new
";
        let patch = parse_file_section(&split_file_sections(added.as_bytes())[0]).unwrap();
        assert_eq!(patch.display_path(), "my file.txt");
    }

    #[test]
    fn invalid_utf8_only_affects_its_own_file() {
        let mut raw = b"diff --git a/bad.txt b/bad.txt\n--- a/bad.txt\n+++ b/bad.txt\n@@ -1 +1 @@\n-\xff\xfe\n+ok\n".to_vec();
        raw.extend_from_slice(MODIFIED.as_bytes());
        let sections = split_file_sections(&raw);
        assert_eq!(sections.len(), 2);
        assert!(sections[0].contains('\u{FFFD}'));
        assert_eq!(sections[1], MODIFIED);
    }

    #[test]
    fn section_without_paths_is_an_error() {
        assert!(parse_file_section("diff --git \n").is_err());
        assert!(parse_file_section("not a diff\n").is_err());
    }

    #[test]
    fn preamble_before_first_header_is_ignored() {
        let input = format!("warning: something\n{MODIFIED}");
        assert_eq!(split_file_sections(input.as_bytes()).len(), 1);
    }

    #[test]
    fn numstat_regular_rename_and_binary() {
        let raw = b"3\t1\tsrc/lib.rs\x002\t0\t\x00old.rs\x00new.rs\x00-\t-\timg.png\x00";
        let stats = parse_numstat(raw);
        assert_eq!(stats.get("src/lib.rs"), Some(&Some((3, 1))));
        assert_eq!(stats.get("new.rs"), Some(&Some((2, 0))));
        assert_eq!(stats.get("img.png"), Some(&None));
        assert!(!stats.contains_key("old.rs"));
    }

    #[test]
    fn truncate_short_text_unchanged() {
        assert_eq!(truncate_patch("short".into(), 10), "short");
        assert_eq!(truncate_patch("exact".into(), 5), "exact");
    }

    #[test]
    fn truncate_long_text_appends_marker() {
        let text = "x".repeat(150);
        let out = truncate_patch(text, 100);
        assert_eq!(out, format!("{}\n... (truncated, total size: 150 chars)", "x".repeat(100)));
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let text = "é".repeat(20);
        let out = truncate_patch(text, 10);
        assert!(out.starts_with(&"é".repeat(10)));
        assert!(out.ends_with("total size: 20 chars)"));
    }
}

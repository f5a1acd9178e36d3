use crate::markdown;
use anyhow::{bail, Context, Result};
use docsearch_core::CorpusEntry;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Json,
    JsonLines,
    Markdown,
}

fn kind_of(path: &Path) -> Option<SourceKind> {
    match path.extension().and_then(|s| s.to_str())? {
        "json" => Some(SourceKind::Json),
        "jsonl" => Some(SourceKind::JsonLines),
        "md" | "markdown" => Some(SourceKind::Markdown),
        _ => None,
    }
}

/// Read every corpus entry under `input`, a single file or a content directory.
///
/// Directories are walked in file-name order so document ids are reproducible.
pub fn load_corpus(input: &Path) -> Result<Vec<CorpusEntry>> {
    let mut files: Vec<PathBuf> = Vec::new();
    let root = if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name() {
            let entry = entry.with_context(|| format!("walking {}", input.display()))?;
            let p = entry.path();
            if p.is_file() && kind_of(p).is_some() {
                files.push(p.to_path_buf());
            }
        }
        input
    } else if input.is_file() {
        files.push(input.to_path_buf());
        input.parent().unwrap_or(input)
    } else {
        bail!("input {} does not exist", input.display());
    };

    let mut entries = Vec::new();
    for file in &files {
        match kind_of(file) {
            Some(SourceKind::JsonLines) => read_jsonl(file, &mut entries)?,
            Some(SourceKind::Markdown) => entries.extend(markdown::load_page(root, file)?),
            Some(SourceKind::Json) | None => read_json(file, &mut entries)?,
        }
    }
    tracing::info!(files = files.len(), entries = entries.len(), "loaded corpus");
    Ok(entries)
}

fn read_jsonl(file: &Path, out: &mut Vec<CorpusEntry>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    for (n, line) in BufReader::new(f).lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", file.display()))?;
        if line.trim().is_empty() { continue; }
        let entry: CorpusEntry = serde_json::from_str(&line)
            .with_context(|| format!("parsing {} line {}", file.display(), n + 1))?;
        out.push(entry);
    }
    Ok(())
}

fn read_json(file: &Path, out: &mut Vec<CorpusEntry>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let json: serde_json::Value =
        serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parsing {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for (i, v) in arr.into_iter().enumerate() {
                let entry: CorpusEntry =
                    serde_json::from_value(v).with_context(|| format!("parsing {} entry {i}", file.display()))?;
                out.push(entry);
            }
        }
        serde_json::Value::Object(_) => {
            let entry: CorpusEntry = serde_json::from_value(json).with_context(|| format!("parsing {}", file.display()))?;
            out.push(entry);
        }
        _ => bail!("{}: expected a JSON object or array of objects", file.display()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_mixed_directory_in_name_order() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"[{"url":"/routing/","title":"Routing Guide","body":"radix tree routing","section":"guide"}]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("b.jsonl"),
            "{\"url\":\"/request/\",\"title\":\"Request Guide\",\"body\":\"headers and cookies\"}\n\n",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("guide")).unwrap();
        fs::write(dir.path().join("guide/context.md"), "---\ntitle: Context\n---\nThe request context.\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let entries = load_corpus(dir.path()).unwrap();
        let urls: Vec<&str> = entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["/routing/", "/request/", "/guide/context/"]);
        assert_eq!(entries[1].section, "");
        assert_eq!(entries[2].section, "guide");
    }

    #[test]
    fn parse_errors_name_the_file_and_line() {
        let dir = tempdir().unwrap();
        let bad = dir.path().join("pages.jsonl");
        fs::write(&bad, "{\"url\":\"/a/\",\"title\":\"A\"}\n{not json}\n").unwrap();
        let err = load_corpus(dir.path()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("pages.jsonl line 2"), "{msg}");
    }

    #[test]
    fn missing_input_fails() {
        assert!(load_corpus(Path::new("/definitely/not/here")).is_err());
    }
}

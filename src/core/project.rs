// src/core/project.rs — The project under test, as the model sees it

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

/// One source file read at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

/// Fixed project inputs shared by the generator and the evaluator.
#[derive(Debug, Clone)]
pub struct ProjectFiles {
    root: PathBuf,
    language: String,
    files: Vec<SourceFile>,
}

impl ProjectFiles {
    /// Read every source file once. Later edits on disk are not picked up.
    pub fn load(root: &Path, sources: &[PathBuf], language: &str) -> anyhow::Result<Self> {
        let mut files = Vec::with_capacity(sources.len());
        for path in sources {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading project file {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            files.push(SourceFile { name, content });
        }
        Ok(Self {
            root: root.to_path_buf(),
            language: language.to_string(),
            files,
        })
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Render the sources as a bulleted list of fenced blocks.
    pub fn render_sources(&self) -> String {
        let mut out = String::new();
        for file in &self.files {
            out.push_str(&fenced_file(&file.name, &self.language, &file.content));
        }
        out
    }

    /// Directory tree of the project root, for the system prompts.
    pub fn tree(&self) -> String {
        render_tree(&self.root)
    }
}

/// ` - name` followed by a fenced block, the shape every prompt uses.
pub fn fenced_file(name: &str, language: &str, content: &str) -> String {
    let mut out = format!(" - {}\n```{}\n{}", name, language, content);
    if !content.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("```\n");
    out
}

/// Draw a directory as an indented tree. Hidden entries and `__pycache__`
/// are skipped; entries are sorted by name.
pub fn render_tree(root: &Path) -> String {
    let label = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    let mut out = format!("{}/\n", label);
    walk(root, "", &mut out);
    out
}

fn walk(dir: &Path, prefix: &str, out: &mut String) {
    let Ok(read) = fs::read_dir(dir) else { return };

    let mut entries: Vec<_> = read
        .filter_map(Result::ok)
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            !name.starts_with('.') && name != "__pycache__"
        })
        .collect();
    entries.sort_by_key(|e| e.file_name());

    let count = entries.len();
    for (i, entry) in entries.into_iter().enumerate() {
        let last = i + 1 == count;
        let branch = if last { "└─" } else { "├─" };
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        if is_dir {
            out.push_str(&format!("{}{}{}/\n", prefix, branch, name));
            let child_prefix = format!("{}{}", prefix, if last { "  " } else { "│ " });
            walk(&entry.path(), &child_prefix, out);
        } else {
            out.push_str(&format!("{}{}{}\n", prefix, branch, name));
        }
    }
}

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use super::{join_prompt, tools, Mode, FULL_TOOLS};

/// Files longer than this many characters are cut.
const MAX_FILE_CHARS: usize = 10_000;
const TRUNCATION_MARKER: &str = "\n... [FILE TRUNCATED] ...";
const HEADER: &str = "RELEVANT FILES FOR THIS QUESTION:";

/// The relevant files are read up front and pasted into the prompt.
pub struct ExplicitContextMode {
    repo_root: PathBuf,
    files: BTreeMap<String, Vec<String>>,
}

impl ExplicitContextMode {
    pub fn new(repo_root: PathBuf, files: BTreeMap<String, Vec<String>>) -> Self {
        Self { repo_root, files }
    }

    fn render_file(&self, rel: &str) -> String {
        let path = self.repo_root.join(rel);
        let body = match std::fs::read_to_string(&path) {
            Ok(content) => truncate(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => "ERROR: File not found".into(),
            Err(e) => format!("ERROR: Could not read file: {e}"),
        };
        format!("\n=== {rel} ===\n{body}")
    }
}

fn truncate(content: String) -> String {
    if content.chars().count() <= MAX_FILE_CHARS {
        return content;
    }
    let mut cut: String = content.chars().take(MAX_FILE_CHARS).collect();
    cut.push_str(TRUNCATION_MARKER);
    cut
}

impl Mode for ExplicitContextMode {
    fn name(&self) -> &str {
        "explicit"
    }

    fn description(&self) -> &str {
        "Relevant files are read up front and pasted into the system prompt"
    }

    fn system_prompt(&self, base: Option<&str>) -> String {
        let own = format!(
            "You are an AI assistant answering questions about the codebase in {}.

You have access to these tools: Read, Bash, Glob, Edit, Write.

The relevant files for this question have already been identified and are included below.
Focus on those files, though you may explore related files if needed.

Provide accurate, detailed answers based on what you find in the code.",
            self.repo_root.display()
        );
        join_prompt(base, own)
    }

    fn allowed_tools(&self) -> Vec<String> {
        tools(&FULL_TOOLS)
    }

    fn working_dir(&self) -> PathBuf {
        self.repo_root.clone()
    }

    fn supplementary_context(&self, scenario_id: &str) -> Option<String> {
        let files = self.files.get(scenario_id).filter(|f| !f.is_empty())?;
        debug!("explicit context for {scenario_id}: {} files", files.len());
        let mut out = String::from(HEADER);
        for rel in files {
            out.push_str(&self.render_file(rel));
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode_with(dir: &std::path::Path, files: &[&str]) -> ExplicitContextMode {
        let mut map = BTreeMap::new();
        map.insert(
            "ar_1_encryption".to_string(),
            files.iter().map(|f| f.to_string()).collect(),
        );
        ExplicitContextMode::new(dir.to_path_buf(), map)
    }

    #[test]
    fn test_unmapped_scenario_has_no_context() {
        let dir = tempfile::tempdir().unwrap();
        let mode = mode_with(dir.path(), &["a.rs"]);
        assert!(mode.supplementary_context("ttl_1_deploy").is_none());
    }

    #[test]
    fn test_missing_file_is_inline_marker() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("present.rs"), "fn aes() {}").unwrap();
        let mode = mode_with(dir.path(), &["missing.rs", "present.rs"]);

        let ctx = mode.supplementary_context("ar_1_encryption").unwrap();
        assert!(ctx.starts_with(HEADER));
        assert!(ctx.contains("=== missing.rs ===\nERROR: File not found"));
        assert!(ctx.contains("=== present.rs ===\nfn aes() {}"));
    }

    #[test]
    fn test_long_file_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("big.rs"), "x".repeat(MAX_FILE_CHARS + 500)).unwrap();
        let mode = mode_with(dir.path(), &["big.rs"]);

        let ctx = mode.supplementary_context("ar_1_encryption").unwrap();
        assert!(ctx.ends_with(TRUNCATION_MARKER));
        assert_eq!(ctx.matches('x').count(), MAX_FILE_CHARS);
    }

    #[test]
    fn test_exact_limit_is_kept_whole() {
        let s = "y".repeat(MAX_FILE_CHARS);
        assert_eq!(truncate(s.clone()), s);
    }
}

use std::path::PathBuf;

use super::{join_prompt, tools, Mode, FULL_TOOLS};

/// The agent starts cold and finds everything with file tools.
pub struct NoContextMode {
    repo_root: PathBuf,
}

impl NoContextMode {
    pub fn new(repo_root: PathBuf) -> Self {
        Self { repo_root }
    }
}

impl Mode for NoContextMode {
    fn name(&self) -> &str {
        "no-context"
    }

    fn description(&self) -> &str {
        "No memory and no pre-loaded context; the agent discovers everything with file tools"
    }

    fn system_prompt(&self, base: Option<&str>) -> String {
        let own = format!(
            "You are an AI assistant answering questions about the codebase in {}.

You have no memory of previous sessions and no pre-loaded context about this project.
Discover information with your tools: Read, Bash, Glob, Edit, Write.
Explore the repository structure and read the relevant files before answering.

Answer only from what you actually find. If you cannot find something, say so; do not guess or invent details.",
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
}

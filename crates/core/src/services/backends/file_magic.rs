use std::path::PathBuf;
use std::time::Duration;

use crate::config::ResolvedTools;
use crate::services::tools::{run_tool, ToolError, TypeSniffer};

/// Sniffer that shells out to `file -b -`, feeding the buffer on stdin.
#[derive(Debug, Clone)]
pub struct FileCommandSniffer {
    pub file: PathBuf,
    pub timeout: Duration,
}

impl FileCommandSniffer {
    pub fn from_tools(tools: &ResolvedTools) -> Self {
        Self { file: tools.file.clone(), timeout: tools.timeout }
    }
}

impl TypeSniffer for FileCommandSniffer {
    fn sniff(&self, bytes: &[u8]) -> Result<String, ToolError> {
        let out = run_tool(&self.file, &["-b", "-"], Some(bytes), self.timeout)?;
        let text = String::from_utf8_lossy(&out);
        Ok(text.lines().next().unwrap_or_default().trim().to_string())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn returns_first_line_of_tool_output() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-file");
        std::fs::write(&script, "#!/bin/sh\ncat >/dev/null\nprintf 'JPEG image data, JFIF\\nextra\\n'\n")
            .unwrap();
        make_executable(&script);

        let sniffer = FileCommandSniffer { file: script, timeout: Duration::from_secs(10) };
        assert_eq!(sniffer.sniff(b"\xFF\xD8\xFF").unwrap(), "JPEG image data, JFIF");
    }

    #[test]
    fn tolerates_tool_that_exits_without_reading_input() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-file");
        std::fs::write(&script, "#!/bin/sh\nprintf 'PDF document, version 1.4\\n'\n").unwrap();
        make_executable(&script);

        let sniffer = FileCommandSniffer { file: script, timeout: Duration::from_secs(10) };
        let mut bytes = b"%PDF-1.4\n".to_vec();
        bytes.resize(4 * 1024 * 1024, b' ');
        assert_eq!(sniffer.sniff(&bytes).unwrap(), "PDF document, version 1.4");
    }

    fn make_executable(path: &std::path::Path) {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms).unwrap();
    }
}

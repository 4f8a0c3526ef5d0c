use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::config::ResolvedTools;
use crate::model::Entry;
use crate::services::tools::{run_tool, ContentFetcher, EntryLister, FilesystemProbe, ToolError};

/// The Sleuth Kit adapter: `fls` for listings, `icat` for content, `fsstat` for probes.
#[derive(Debug, Clone)]
pub struct SleuthKit {
    pub fls: PathBuf,
    pub icat: PathBuf,
    pub fsstat: PathBuf,
    pub timeout: Duration,
}

impl SleuthKit {
    pub fn from_tools(tools: &ResolvedTools) -> Self {
        Self {
            fls: tools.fls.clone(),
            icat: tools.icat.clone(),
            fsstat: tools.fsstat.clone(),
            timeout: tools.timeout,
        }
    }

    fn run_text(&self, program: &Path, args: &[&str]) -> Result<String, ToolError> {
        let out = run_tool(program, args, None, self.timeout)?;
        Ok(String::from_utf8_lossy(&out).to_string())
    }
}

impl EntryLister for SleuthKit {
    fn list_entries(&self, image: &Path, deleted: bool) -> Result<Vec<Entry>, ToolError> {
        let image = image.to_string_lossy();
        let selector = if deleted { "-d" } else { "-u" };
        let listing = self.run_text(&self.fls, &["-F", "-p", "-r", selector, &image])?;
        Ok(parse_fls_listing(&listing))
    }
}

impl ContentFetcher for SleuthKit {
    fn fetch(&self, image: &Path, location: &str) -> Result<Vec<u8>, ToolError> {
        let image = image.to_string_lossy();
        run_tool(&self.icat, &[&image, location], None, self.timeout)
    }
}

impl FilesystemProbe for SleuthKit {
    fn probe_type(&self, image: &Path) -> Result<String, ToolError> {
        let image = image.to_string_lossy();
        Ok(self.run_text(&self.fsstat, &["-t", &image])?.trim().to_string())
    }

    fn probe_details(&self, image: &Path) -> Result<String, ToolError> {
        let image = image.to_string_lossy();
        self.run_text(&self.fsstat, &[&image])
    }
}

/// Parse `fls -p` output into entries.
///
/// Lines look like `r/r * 12-128-3(realloc):\tdir/name.jpg`. The location is the
/// last token before the tab, without its colon or parenthesized suffix.
pub fn parse_fls_listing(listing: &str) -> Vec<Entry> {
    listing.lines().filter_map(parse_fls_line).collect()
}

fn parse_fls_line(line: &str) -> Option<Entry> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        return None;
    }
    let Some((head, path)) = line.split_once('\t') else {
        debug!(line, "skipping fls line without a tab separator");
        return None;
    };
    let token = head.split_whitespace().last()?;
    let token = token.strip_suffix(':').unwrap_or(token);
    let location = match token.find('(') {
        Some(idx) => &token[..idx],
        None => token,
    };
    if location.is_empty() {
        debug!(line, "skipping fls line without a location");
        return None;
    }
    Some(Entry::new(location, path))
}

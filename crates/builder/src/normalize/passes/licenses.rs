//! License capture
//!
//! Every package ships its upstream license under `licenses/`. When the
//! upstream tarball carries no standalone file, the text is extracted from
//! the leading comment block of a named header.

use crate::fileops::copy_file;
use crate::normalize::reports::Report;
use crate::normalize::traits::Pass;
use crate::normalize::{LicenseCapture, NormalizeOptions};
use crate::source::save;
use ferrite_errors::{Error, PackagingError};
use ferrite_events::{AppEvent, EventEmitter, PackageEvent};
use ferrite_recipe::RecipeContext;

pub struct LicenseCapturePass;

impl Pass for LicenseCapturePass {
    const NAME: &'static str = "license capture";

    async fn run(ctx: &RecipeContext, opts: &NormalizeOptions) -> Result<Report, Error> {
        let Some(capture) = &opts.license else {
            return Ok(Report::ok());
        };
        let mut report = Report::ok();
        let licenses_dir = ctx.package_folder().join("licenses");
        match capture {
            LicenseCapture::File { path } => {
                let src = ctx.source_folder().join(path);
                let dest = copy_file(&src, &licenses_dir).await?;
                ctx.emit(AppEvent::Package(PackageEvent::LicenseCaptured {
                    file: path.clone(),
                }));
                report.changed_files.push(dest);
            }
            LicenseCapture::HeaderBlock { path } => {
                let src = ctx.source_folder().join(path);
                let contents = tokio::fs::read_to_string(&src)
                    .await
                    .map_err(|e| Error::io_with_path(&e, &src))?;
                let Some(text) = extract_license_header(&contents) else {
                    return Err(PackagingError::LicenseHeaderNotFound {
                        file: path.clone(),
                    }
                    .into());
                };
                let dest = licenses_dir.join("LICENSE");
                save(&dest, &text, false).await?;
                ctx.emit(AppEvent::Package(PackageEvent::LicenseCaptured {
                    file: path.clone(),
                }));
                report.changed_files.push(dest);
            }
        }
        Ok(report)
    }
}

/// Extract the leading comment block of a source file as license text
///
/// Handles a `/* ... */` block and runs of `//` or `#` line comments;
/// comment decorations and horizontal rules are stripped. Returns `None`
/// when the file does not open with a comment.
#[must_use]
pub fn extract_license_header(contents: &str) -> Option<String> {
    let trimmed = contents.trim_start();
    let mut lines = Vec::new();

    if let Some(rest) = trimmed.strip_prefix("/*") {
        let block = rest.split("*/").next()?;
        for line in block.lines() {
            lines.push(strip_decoration(line));
        }
    } else if trimmed.starts_with("//") || trimmed.starts_with('#') {
        let marker = if trimmed.starts_with("//") { "//" } else { "#" };
        for line in trimmed.lines() {
            let Some(rest) = line.trim_start().strip_prefix(marker) else {
                break;
            };
            lines.push(strip_decoration(rest));
        }
    } else {
        return None;
    }

    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return None;
    }
    Some(lines.join("\n") + "\n")
}

fn strip_decoration(line: &str) -> String {
    let stripped = line.trim_end();
    let stripped = stripped.strip_prefix(" *").unwrap_or(stripped);
    let stripped = stripped.strip_prefix('*').unwrap_or(stripped);
    let stripped = stripped.strip_prefix(' ').unwrap_or(stripped);
    if stripped.chars().all(|c| matches!(c, '*' | '-' | '=' | ' ')) && stripped.len() > 3 {
        return String::new();
    }
    stripped.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_c_comment_block() {
        let header = "/*\n * Copyright (c) 2009-2017 Dave Gamble\n *\n * Permission is hereby granted...\n */\n#include <stdio.h>\n";
        let text = extract_license_header(header).unwrap();
        assert!(text.starts_with("Copyright (c) 2009-2017 Dave Gamble"));
        assert!(text.contains("Permission is hereby granted"));
        assert!(!text.contains("#include"));
    }

    #[test]
    fn extracts_line_comment_run() {
        let header = "// Copyright 2024\n// MIT license\nint main() {}\n";
        let text = extract_license_header(header).unwrap();
        assert_eq!(text, "Copyright 2024\nMIT license\n");
    }

    #[test]
    fn plain_code_has_no_header() {
        assert!(extract_license_header("int main() {}\n").is_none());
    }
}

use std::path::{Path, PathBuf};

use tracker_core::format_percentage;

use super::ParsedArgs;
use crate::api::{OcrOptions, UploadOptions};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::session::ToastVariant;
use crate::upload::SelectedFile;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "upload",
            "Upload invoice files (PDF or image)",
            "upload <file>... [--category name] [--tag t]...",
            cmd_upload,
        ),
        CommandEntry::new(
            "ocr",
            "Extract text from a PDF",
            "ocr <file.pdf> [--language eng] [--dpi 300] [--preprocess] [--pages start-end] [--full]",
            cmd_ocr,
        ),
    ]
}

/// Relative paths that do not exist here are looked up in the upload folder.
fn resolve(context: &ShellContext, raw: &str) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() || path.exists() {
        return path;
    }
    let candidate = context.config.resolve_upload_dir().join(&path);
    if candidate.exists() {
        candidate
    } else {
        path
    }
}

fn cmd_upload(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[])?;
    if parsed.positional.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: upload <file>... [--category name] [--tag t]...".into(),
        ));
    }
    context.require_login()?;

    let paths: Vec<PathBuf> = parsed
        .positional
        .iter()
        .map(|raw| resolve(context, raw))
        .collect();
    let mut selection: Vec<SelectedFile> = Vec::new();
    let rejected = context
        .uploads
        .select_files(&paths, |files| selection = files);
    for problem in &rejected {
        output::warning(problem);
    }

    let check = context.uploads.split_oversized(selection);
    if let Some(message) = context.uploads.oversized_message(&check) {
        context.notify(ToastVariant::Warning, message);
    }
    if check.accepted.is_empty() {
        output::info(context.uploads.limit_hint());
        return Ok(());
    }

    let options = UploadOptions {
        category: parsed.value("category").map(str::to_string),
        tags: parsed.values("tag").into_iter().map(str::to_string).collect(),
    };
    let mut uploaded = 0;
    for file in &check.accepted {
        output::info(format!("Uploading {} ({})...", file.name, file.size_label()));
        match context.call(|client| client.upload_invoice(&file.path, &options)) {
            Ok(result) => {
                uploaded += 1;
                match result.invoice_id {
                    Some(id) => output::success(format!("{} stored as invoice {}.", file.name, id)),
                    None => output::success(format!("{} uploaded.", file.name)),
                }
            }
            Err(err) => {
                let message = format!("{}: {}", file.name, err);
                context.notify(ToastVariant::Error, message);
                if matches!(err, CommandError::Api(ref api) if api.is_unauthorized()) {
                    return Err(err);
                }
            }
        }
    }
    if uploaded > 0 {
        context.notify(
            ToastVariant::Success,
            format!("{} of {} file(s) uploaded.", uploaded, check.accepted.len()),
        );
    }
    Ok(())
}

fn parse_pages(raw: &str) -> Result<(u32, u32), CommandError> {
    let invalid = || CommandError::InvalidArguments(format!("Invalid page range `{}`.", raw));
    let (start, end) = raw.split_once('-').unwrap_or((raw, raw));
    let start: u32 = start.trim().parse().map_err(|_| invalid())?;
    let end: u32 = end.trim().parse().map_err(|_| invalid())?;
    if start == 0 || end < start {
        return Err(invalid());
    }
    Ok((start, end))
}

const PREVIEW_CHARS: usize = 500;

fn cmd_ocr(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["preprocess", "full"])?;
    let raw = parsed
        .positional
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: ocr <file.pdf>".into()))?;
    let path = resolve(context, raw);
    let is_pdf = Path::new(&path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(CommandError::InvalidArguments(
            "Only PDF files are supported.".into(),
        ));
    }
    context.require_login()?;

    let mut options = OcrOptions {
        preprocess: parsed.flag("preprocess"),
        ..OcrOptions::default()
    };
    if let Some(language) = parsed.value("language") {
        options.language = language.to_string();
    }
    if let Some(dpi) = parsed.number::<u32>("dpi")? {
        options.dpi = dpi;
    }
    if let Some(pages) = parsed.value("pages") {
        let (start, end) = parse_pages(pages)?;
        options.page_start = Some(start);
        options.page_end = Some(end);
    }

    let result = context.call(|client| client.extract_text(&path, &options))?;
    output::section("Extracted text");
    output::raw(format!(
        "  pages: {} | confidence: {} | language: {} | {:.2}s",
        result.pages,
        format_percentage(result.confidence),
        result.language,
        result.processing_time
    ));
    let text = if parsed.flag("full") || result.text.chars().count() <= PREVIEW_CHARS {
        result.text.clone()
    } else {
        let mut preview: String = result.text.chars().take(PREVIEW_CHARS).collect();
        preview.push_str("\n...");
        preview
    };
    output::raw(text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_ranges() {
        assert_eq!(parse_pages("2-4").unwrap(), (2, 4));
        assert_eq!(parse_pages("3").unwrap(), (3, 3));
        assert!(parse_pages("4-2").is_err());
        assert!(parse_pages("0-1").is_err());
        assert!(parse_pages("a-b").is_err());
    }
}

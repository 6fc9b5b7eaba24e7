//! `classify`: look up a MIME type or extension in the file type registry.

use anyhow::Result;
use linkfile_core::ExternalFileTypes;

use crate::cli::ClassifyArgs;

pub fn run_classify_command(args: &ClassifyArgs) -> Result<()> {
    let registry = ExternalFileTypes::standard();
    let value = args.value.trim();

    let (file_type, source) = if value.contains('/') {
        registry
            .by_mime_type(value)
            .map_or((registry.fallback(), "fallback"), |t| (t, "mime"))
    } else {
        registry
            .by_extension(value)
            .map_or((registry.fallback(), "fallback"), |t| (t, "extension"))
    };

    println!(
        "{}\t{}\t{}\t({source})",
        file_type.name(),
        file_type.extension(),
        file_type.mime_type()
    );
    Ok(())
}

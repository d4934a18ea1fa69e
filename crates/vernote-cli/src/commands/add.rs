use std::path::Path;

use vernote_core::config::ClientConfig;
use vernote_core::{Location, NoteDraft};

use crate::commands::common::{open_store, read_image, resolve_note_content, short_id};
use crate::error::CliError;

pub async fn run_add(
    content_parts: &[String],
    location: Option<Location>,
    image_path: Option<&Path>,
    config: &ClientConfig,
) -> Result<(), CliError> {
    let content = resolve_note_content(content_parts)?;
    let image = image_path.map(read_image).transpose()?;
    let store = open_store(config).await?;

    let draft = NoteDraft {
        content,
        location,
        image,
    };
    let note_id = store.add_note(draft).await?;
    println!("Created note {}", short_id(&note_id.to_string()));

    Ok(())
}

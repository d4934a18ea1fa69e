use std::path::Path;

use vernote_core::config::ClientConfig;

use crate::commands::common::{open_store, read_image, resolve_note, short_id};
use crate::error::CliError;

pub async fn run_attach_image(
    id: &str,
    image_path: &Path,
    config: &ClientConfig,
) -> Result<(), CliError> {
    let image = read_image(image_path)?;
    let store = open_store(config).await?;
    let note_id = resolve_note(&store.snapshot(), id)?.id;

    let size = image.len();
    store.attach_image(&note_id, image).await?;
    println!(
        "Attached {size} bytes to note {}",
        short_id(&note_id.to_string())
    );

    Ok(())
}

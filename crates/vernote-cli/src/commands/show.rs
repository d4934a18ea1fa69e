use vernote_core::config::ClientConfig;

use crate::commands::common::{format_note_details, note_item, open_store, resolve_note};
use crate::error::CliError;

pub async fn run_show(
    id: &str,
    utc: bool,
    as_json: bool,
    config: &ClientConfig,
) -> Result<(), CliError> {
    let store = open_store(config).await?;
    let snapshot = store.snapshot();
    let note = resolve_note(&snapshot, id)?;

    if as_json {
        let item = note_item(note, snapshot.verifiers(), utc);
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        for line in format_note_details(note, snapshot.verifiers(), utc) {
            println!("{line}");
        }
    }

    Ok(())
}

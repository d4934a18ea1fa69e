use vernote_core::config::ClientConfig;

use crate::commands::common::{
    open_store, passcode_input, resolve_note, resolve_verifier, short_id,
};
use crate::error::CliError;

pub async fn run_verify(
    note_query: &str,
    verifier_query: &str,
    passcode: Option<String>,
    config: &ClientConfig,
) -> Result<(), CliError> {
    let store = open_store(config).await?;
    let snapshot = store.snapshot();
    let note_id = resolve_note(&snapshot, note_query)?.id;
    let verifier = resolve_verifier(&snapshot, verifier_query)?;

    let candidate = passcode_input(passcode)?;
    store.verify(&note_id, &verifier.id, &candidate).await?;
    println!(
        "Note {} verified by {}",
        short_id(&note_id.to_string()),
        verifier.name
    );

    Ok(())
}

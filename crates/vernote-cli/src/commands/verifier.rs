use vernote_core::config::ClientConfig;

use crate::commands::common::{open_store, passcode_input, short_id, verifier_to_item, VerifierItem};
use crate::error::CliError;

pub async fn run_verifier_add(
    name: &str,
    passcode: Option<String>,
    config: &ClientConfig,
) -> Result<(), CliError> {
    let store = open_store(config).await?;
    let passcode = passcode_input(passcode)?;
    let verifier_id = store.add_verifier(name, &passcode).await?;
    println!(
        "Registered verifier {} ({})",
        name.trim(),
        short_id(&verifier_id.to_string())
    );

    Ok(())
}

pub async fn run_verifier_list(as_json: bool, config: &ClientConfig) -> Result<(), CliError> {
    let store = open_store(config).await?;
    let snapshot = store.snapshot();

    if as_json {
        let items = snapshot
            .verifiers()
            .iter()
            .map(verifier_to_item)
            .collect::<Vec<VerifierItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if snapshot.verifiers().is_empty() {
        println!("No verifiers registered.");
    } else {
        for verifier in snapshot.verifiers() {
            println!("  {:<13}  {}", short_id(&verifier.id.to_string()), verifier.name);
        }
    }

    Ok(())
}

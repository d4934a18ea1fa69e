use vernote_core::config::ClientConfig;
use vernote_core::filter_groups;

use crate::commands::common::{
    format_group_lines, group_notes, groups_to_items, normalize_search_query, open_store,
};
use crate::error::CliError;

pub async fn run_list(
    query: Option<&str>,
    utc: bool,
    as_json: bool,
    config: &ClientConfig,
) -> Result<(), CliError> {
    let store = open_store(config).await?;
    let snapshot = store.snapshot();

    let mut groups = group_notes(&snapshot, utc);
    if let Some(query) = query {
        groups = filter_groups(&groups, query);
    }

    if as_json {
        let items = groups_to_items(&groups, snapshot.verifiers(), utc);
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if groups.is_empty() {
        println!("No notes found.");
    } else {
        for line in format_group_lines(&groups, snapshot.verifiers(), utc) {
            println!("{line}");
        }
    }

    Ok(())
}

pub async fn run_search(
    query: &str,
    utc: bool,
    as_json: bool,
    config: &ClientConfig,
) -> Result<(), CliError> {
    let query = normalize_search_query(query)?;
    run_list(Some(&query), utc, as_json, config).await
}

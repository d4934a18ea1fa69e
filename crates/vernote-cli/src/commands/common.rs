use std::env;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use vernote_core::config::{ClientConfig, ConfiguredAdapter};
use vernote_core::{DateKey, DayGroups, Location, Note, NoteStore, Snapshot, Verifier};

use crate::error::CliError;

const SHORT_ID_LEN: usize = 13;

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub preview: String,
    pub content: String,
    pub is_done: bool,
    pub created_at: Option<String>,
    pub date: String,
    pub location: Option<Location>,
    pub image_bytes: Option<usize>,
    pub verified_by: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DayGroupItem {
    pub date: String,
    pub notes: Vec<NoteListItem>,
}

#[derive(Debug, Serialize)]
pub struct VerifierItem {
    pub id: String,
    pub name: String,
}

/// Open the configured store and load the current notes and verifiers.
pub async fn open_store(config: &ClientConfig) -> Result<NoteStore<ConfiguredAdapter>, CliError> {
    let store = NoteStore::new(config.build_adapter()?);
    let snapshot = store.refresh().await?;
    tracing::debug!(
        "Loaded {} notes and {} verifiers",
        snapshot.notes().len(),
        snapshot.verifiers().len()
    );
    Ok(store)
}

pub fn group_notes(snapshot: &Snapshot, utc: bool) -> DayGroups {
    if utc {
        snapshot.day_groups(&Utc)
    } else {
        snapshot.day_groups(&Local)
    }
}

pub fn format_group_lines(groups: &DayGroups, verifiers: &[Verifier], utc: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for (date_key, notes) in groups {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("== {date_key} =="));
        for note in notes {
            lines.push(format_note_line(note, verifiers, utc));
        }
    }
    lines
}

pub fn format_note_line(note: &Note, verifiers: &[Verifier], utc: bool) -> String {
    let short_id = short_id(&note.id.to_string());
    let clock = format_clock(note.created_at, utc);
    let preview = note_preview(note, 40);
    let done = if note.is_done { "[x]" } else { "[ ]" };

    let mut markers = Vec::new();
    if note.location.is_some() {
        markers.push("@".to_string());
    }
    if note.image.is_some() {
        markers.push("img".to_string());
    }
    let names = verifier_names(note, verifiers);
    if !names.is_empty() {
        markers.push(format!("verified: {}", names.join(", ")));
    }

    let line = format!("  {short_id:<13}  {clock}  {done} {preview:<40}");
    if markers.is_empty() {
        line.trim_end().to_string()
    } else {
        format!("{line}  {}", markers.join("  "))
    }
}

pub fn format_note_details(note: &Note, verifiers: &[Verifier], utc: bool) -> Vec<String> {
    let mut lines = vec![
        format!("id:        {}", note.id),
        format!(
            "created:   {}",
            note.created_at
                .map_or_else(|| "pending".to_string(), |at| format_timestamp(at, utc))
        ),
        format!("done:      {}", if note.is_done { "yes" } else { "no" }),
    ];
    if let Some(location) = note.location {
        lines.push(format!("location:  {location}"));
    }
    if let Some(image) = &note.image {
        lines.push(format!("image:     {} bytes", image.len()));
    }
    let names = verifier_names(note, verifiers);
    lines.push(format!(
        "verified:  {}",
        if names.is_empty() {
            "-".to_string()
        } else {
            names.join(", ")
        }
    ));
    lines.push(String::new());
    lines.push(note.content.clone());
    lines
}

pub fn groups_to_items(groups: &DayGroups, verifiers: &[Verifier], utc: bool) -> Vec<DayGroupItem> {
    groups
        .iter()
        .map(|(date_key, notes)| DayGroupItem {
            date: date_key.to_string(),
            notes: notes
                .iter()
                .map(|note| note_to_list_item(note, *date_key, verifiers, utc))
                .collect(),
        })
        .collect()
}

/// Day a single note falls on, matching the bucket `group_notes` puts it in.
pub fn note_date_key(note: &Note, utc: bool) -> DateKey {
    if utc {
        DateKey::for_note(note, &Utc)
    } else {
        DateKey::for_note(note, &Local)
    }
}

pub fn note_item(note: &Note, verifiers: &[Verifier], utc: bool) -> NoteListItem {
    note_to_list_item(note, note_date_key(note, utc), verifiers, utc)
}

pub fn note_to_list_item(
    note: &Note,
    date_key: DateKey,
    verifiers: &[Verifier],
    utc: bool,
) -> NoteListItem {
    NoteListItem {
        id: note.id.to_string(),
        preview: note_preview(note, 80),
        content: note.content.clone(),
        is_done: note.is_done,
        created_at: note.created_at.map(|at| format_timestamp(at, utc)),
        date: date_key.to_string(),
        location: note.location,
        image_bytes: note.image.as_ref().map(Vec::len),
        verified_by: verifier_names(note, verifiers),
    }
}

pub fn verifier_to_item(verifier: &Verifier) -> VerifierItem {
    VerifierItem {
        id: verifier.id.to_string(),
        name: verifier.name.clone(),
    }
}

/// Names of the note's verifiers; ids no longer known show as short ids.
pub fn verifier_names(note: &Note, verifiers: &[Verifier]) -> Vec<String> {
    note.verified_by
        .iter()
        .map(|id| {
            verifiers
                .iter()
                .find(|verifier| verifier.id == *id)
                .map_or_else(|| short_id(&id.to_string()), |verifier| verifier.name.clone())
        })
        .collect()
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note.content.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_clock(created_at: Option<DateTime<Utc>>, utc: bool) -> String {
    match created_at {
        Some(at) if utc => at.format("%H:%M").to_string(),
        Some(at) => at.with_timezone(&Local).format("%H:%M").to_string(),
        None => "--:--".to_string(),
    }
}

pub fn format_timestamp(at: DateTime<Utc>, utc: bool) -> String {
    if utc {
        at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    } else {
        at.with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S %:z")
            .to_string()
    }
}

pub fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

pub fn resolve_note<'a>(snapshot: &'a Snapshot, query: &str) -> Result<&'a Note, CliError> {
    let query = normalize_identifier(query).ok_or(CliError::EmptyNoteId)?;
    resolve_by_prefix(snapshot.notes(), &query, |note| note.id.to_string())?
        .ok_or(CliError::NoteNotFound(query))
}

pub fn resolve_verifier<'a>(snapshot: &'a Snapshot, query: &str) -> Result<&'a Verifier, CliError> {
    let query = normalize_identifier(query).ok_or(CliError::EmptyVerifierId)?;
    resolve_by_prefix(snapshot.verifiers(), &query, |verifier| {
        verifier.id.to_string()
    })?
    .ok_or(CliError::VerifierNotFound(query))
}

/// Find the single item whose id equals or starts with `query`.
pub fn resolve_by_prefix<'a, T>(
    items: &'a [T],
    query: &str,
    id_of: impl Fn(&T) -> String,
) -> Result<Option<&'a T>, CliError> {
    let query = query.to_ascii_lowercase();
    if let Some(exact) = items.iter().find(|item| id_of(item) == query) {
        return Ok(Some(exact));
    }

    let matching = items
        .iter()
        .filter(|item| id_of(item).starts_with(&query))
        .collect::<Vec<_>>();

    match matching.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some(*single)),
        several => {
            let options = several
                .iter()
                .take(3)
                .map(|item| short_id(&id_of(item)))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn resolve_note_content(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    if let Some(content) = capture_editor_input()? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptySearchQuery)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_identifier(id: &str) -> Option<String> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Use `provided` or read one line from stdin, prompting on a terminal.
///
/// Only the line terminator is stripped so passcode length checks see exactly
/// what was typed.
pub fn passcode_input(provided: Option<String>) -> Result<String, CliError> {
    if let Some(passcode) = provided {
        return Ok(passcode);
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprint!("Passcode: ");
        io::stderr().flush()?;
    }

    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    Ok(strip_line_ending(&line).to_string())
}

pub fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

pub fn read_image(path: &Path) -> Result<Vec<u8>, CliError> {
    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Err(CliError::EmptyImage(path.display().to_string()));
    }
    Ok(bytes)
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input() -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let draft_path = create_temp_note_file_path();
    std::fs::write(&draft_path, "")?;

    let edited = launch_editor(&editor, &draft_path)
        .and_then(|()| std::fs::read_to_string(&draft_path).map_err(CliError::Io));
    let _ = std::fs::remove_file(&draft_path);

    Ok(normalize_content(&edited?))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    let status = match Command::new(editor).arg(file_path).status() {
        Ok(status) => status,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            editor_command(editor, file_path)?.status()?
        }
        Err(err) => return Err(CliError::Io(err)),
    };
    ensure_editor_succeeded(editor, status)
}

/// Split an editor setting such as `code --wait` into program and arguments.
pub fn editor_command(editor: &str, file_path: &Path) -> Result<Command, CliError> {
    let mut parts = editor.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| CliError::EditorFailed("empty EDITOR command".into()))?;

    let mut command = Command::new(program);
    command.args(parts).arg(file_path);
    Ok(command)
}

pub fn ensure_editor_succeeded(editor: &str, status: ExitStatus) -> Result<(), CliError> {
    if status.success() {
        Ok(())
    } else {
        Err(CliError::EditorFailed(format!(
            "`{editor}` exited with status {status}"
        )))
    }
}

pub fn preferred_editor() -> String {
    editor_from(env::var("VISUAL").ok(), env::var("EDITOR").ok())
}

/// First non-blank of `$VISUAL` and `$EDITOR`, else the platform default.
pub fn editor_from(visual: Option<String>, editor: Option<String>) -> String {
    visual
        .and_then(|value| normalize_identifier(&value))
        .or_else(|| editor.and_then(|value| normalize_identifier(&value)))
        .unwrap_or_else(|| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("vernote-note-{}-{now}.md", std::process::id()))
}

//! Subcommand implementations

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tde_core::{TemplateDocument, TemplateEdit};
use tde_workflow::{ActionOutcome, PendingAction, TemplateEditor, TemplateGateway};

/// Print pending notifications to stderr
fn report<G: TemplateGateway>(editor: &TemplateEditor<G>) {
    for notification in editor.take_notifications() {
        eprintln!("{}", notification);
    }
}

/// Turn an action outcome into a process result
fn settle<G: TemplateGateway>(
    editor: &TemplateEditor<G>,
    action: &str,
    outcome: ActionOutcome,
) -> Result<()> {
    report(editor);
    match outcome {
        ActionOutcome::Completed => Ok(()),
        ActionOutcome::Declined => {
            tracing::info!("{} cancelled", action);
            Ok(())
        }
        ActionOutcome::Rejected(message) => bail!("{} rejected: {}", action, message),
        ActionOutcome::Failed(e) => Err(anyhow::Error::new(e).context(format!("{} failed", action))),
        ActionOutcome::Blocked(e) => Err(anyhow::Error::new(e).context(format!("{} not run", action))),
        ActionOutcome::Stale => bail!("{} was superseded", action),
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_document(path: &Path) -> Result<TemplateDocument> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read template file: {}", path.display()))?;
    TemplateDocument::from_json(&content)
        .with_context(|| format!("Failed to parse template file: {}", path.display()))
}

fn read_edits(path: &Path) -> Result<Vec<TemplateEdit>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read edits file: {}", path.display()))?;
    parse_edits(&content).with_context(|| format!("Failed to parse edits file: {}", path.display()))
}

fn parse_edits(content: &str) -> Result<Vec<TemplateEdit>> {
    Ok(serde_json::from_str(content)?)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Ask on stderr, answer on stdin
fn ask(prompt: &str) -> Result<bool> {
    eprint!("{} [y/N] ", prompt);
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

async fn open_database<G: TemplateGateway>(editor: &TemplateEditor<G>, db: &str) -> Result<()> {
    let outcome = editor.select_database(db).await;
    settle(editor, "Listing templates", outcome)
}

/// Load the working document from a file or from the selected database
async fn open_source<G: TemplateGateway>(
    editor: &TemplateEditor<G>,
    file: Option<&Path>,
    uri: Option<&str>,
) -> Result<()> {
    match (file, uri) {
        (Some(path), _) => {
            editor.load_document(read_document(path)?)?;
            Ok(())
        }
        (None, Some(uri)) => {
            let outcome = editor.select_template(uri).await;
            settle(editor, "Loading template", outcome)
        }
        (None, None) => bail!("Either --file or --uri is required"),
    }
}

pub async fn databases<G: TemplateGateway>(editor: &TemplateEditor<G>) -> Result<()> {
    let outcome = editor.load_databases().await;
    settle(editor, "Listing databases", outcome)?;
    print_json(&editor.snapshot().content_dbs)
}

pub async fn templates<G: TemplateGateway>(editor: &TemplateEditor<G>, db: &str) -> Result<()> {
    open_database(editor, db).await?;
    print_json(&editor.snapshot().known_templates)
}

pub async fn show<G: TemplateGateway>(editor: &TemplateEditor<G>, db: &str, uri: &str) -> Result<()> {
    open_database(editor, db).await?;
    open_source(editor, None, Some(uri)).await?;
    print_json(&editor.document())
}

pub async fn validate<G: TemplateGateway>(
    editor: &TemplateEditor<G>,
    db: Option<&str>,
    file: Option<&Path>,
    uri: Option<&str>,
) -> Result<()> {
    if let Some(db) = db {
        open_database(editor, db).await?;
    }
    open_source(editor, file, uri).await?;
    let outcome = editor.run_validate().await;
    settle(editor, "Validation", outcome)
}

pub async fn extract<G: TemplateGateway>(
    editor: &TemplateEditor<G>,
    db: &str,
    file: Option<&Path>,
    uri: Option<&str>,
    samples: &[String],
) -> Result<()> {
    open_database(editor, db).await?;
    open_source(editor, file, uri).await?;
    for sample in samples {
        if !editor.add_sample(sample) {
            tracing::warn!("Skipping sample {:?}: empty or repeated", sample);
        }
    }

    let outcome = editor.run_extract().await;
    settle(editor, "Extraction", outcome)?;
    print_json(&editor.snapshot().extracted_data)
}

pub async fn insert<G: TemplateGateway>(
    editor: &TemplateEditor<G>,
    db: &str,
    uri: &str,
    file: Option<&Path>,
    from: Option<&str>,
    yes: bool,
) -> Result<()> {
    open_database(editor, db).await?;
    open_source(editor, file, from).await?;
    editor.rename_template(uri);

    let action = PendingAction::Insert;
    let proceed = yes || ask(action.prompt())?;
    let token = editor.request(action)?;
    let outcome = if proceed {
        editor.confirm(token).await?
    } else {
        editor.decline(token)?
    };
    settle(editor, "Insert", outcome)
}

pub async fn export<G: TemplateGateway>(
    editor: &TemplateEditor<G>,
    db: &str,
    uri: &str,
    out_dir: &Path,
) -> Result<()> {
    open_database(editor, db).await?;
    open_source(editor, None, Some(uri)).await?;

    let exported = editor.export_document()?;
    let path = out_dir.join(&exported.filename);
    fs::write(&path, &exported.contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Exported {} to {}", uri, path.display());
    println!("{}", path.display());
    Ok(())
}

/// Replay an edit script against a local file. Nothing is sent to the service.
pub async fn apply<G: TemplateGateway>(
    editor: &TemplateEditor<G>,
    file: &Path,
    edits: &Path,
    yes: bool,
    out: Option<&Path>,
) -> Result<()> {
    editor.load_document(read_document(file)?)?;
    let edits = read_edits(edits)?;

    let mut applied = 0;
    for edit in edits {
        if !edit.requires_confirmation() {
            editor.edit(edit)?;
            applied += 1;
            continue;
        }

        let action = PendingAction::Edit(edit);
        let prompt = format!("{} ({:?})", action.prompt(), action);
        let token = editor.request(action)?;
        let outcome = if yes || ask(&prompt)? {
            editor.confirm(token).await?
        } else {
            editor.decline(token)?
        };
        if outcome.is_completed() {
            applied += 1;
        }
    }
    tracing::info!("Applied {} edits to {}", applied, file.display());

    let body = editor.document().to_json_pretty()?;
    match out {
        Some(path) => fs::write(path, body)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", body),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tde_core::Direction;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes("  YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
    }

    #[test]
    fn test_parse_edit_script() {
        let edits = parse_edits(
            r#"[
                {"type": "AddVariable"},
                {"type": "MoveVariable", "index": 1, "direction": "up"},
                {"type": "RemoveViewRow", "index": 0}
            ]"#,
        )
        .unwrap();
        assert_eq!(
            edits,
            vec![
                TemplateEdit::AddVariable,
                TemplateEdit::MoveVariable {
                    index: 1,
                    direction: Direction::Up,
                },
                TemplateEdit::RemoveViewRow { index: 0 },
            ]
        );
    }

    #[test]
    fn test_unknown_edit_type_is_rejected() {
        assert!(parse_edits(r#"[{"type": "RemoveTriple", "index": 0}]"#).is_err());
    }
}

//! TDE template editor CLI
//!
//! Lists, edits, validates, extracts, inserts and exports extraction
//! templates through the template service. Data goes to stdout as JSON;
//! logs and notifications go to stderr.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tde_workflow::{EditorConfig, HttpTemplateGateway, TemplateEditor};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "tde")]
#[command(version, about = "Edit TDE extraction templates")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "TDE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Template service base URL (overrides config and TDE_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Basic-auth user (overrides config and TDE_USERNAME)
    #[arg(long, global = true)]
    username: Option<String>,

    /// Basic-auth password (overrides config and TDE_PASSWORD)
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Where to read the template being worked on
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct Source {
    /// Local template JSON file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Stored template URI
    #[arg(long)]
    uri: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List content databases
    Databases,

    /// List templates stored in a content database
    Templates {
        #[arg(long)]
        db: String,
    },

    /// Print a stored template
    Show {
        #[arg(long)]
        db: String,
        #[arg(long)]
        uri: String,
    },

    /// Ask the service whether a template is valid
    Validate {
        #[arg(long, required_unless_present = "file")]
        db: Option<String>,
        #[command(flatten)]
        source: Source,
    },

    /// Run a template against sample documents and print the extracted data
    Extract {
        #[arg(long)]
        db: String,
        #[command(flatten)]
        source: Source,
        /// Sample document URI (repeatable)
        #[arg(long = "sample", required = true)]
        samples: Vec<String>,
    },

    /// Store a template under a URI
    Insert {
        #[arg(long)]
        db: String,
        /// URI to insert under
        #[arg(long)]
        uri: String,
        /// Local template JSON file
        #[arg(long, conflicts_with = "from", required_unless_present = "from")]
        file: Option<PathBuf>,
        /// Stored template to copy
        #[arg(long)]
        from: Option<String>,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Save a stored template to a local file
    Export {
        #[arg(long)]
        db: String,
        #[arg(long)]
        uri: String,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Apply a JSON list of edits to a local template file
    Apply {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        edits: PathBuf,
        /// Apply removals without asking
        #[arg(long)]
        yes: bool,
        /// Write the result here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn load_config(cli: &Cli) -> Result<EditorConfig> {
    let mut config = match &cli.config {
        Some(path) => EditorConfig::from_file(path)?,
        None => EditorConfig::default(),
    };
    config.apply_env();

    if let Some(url) = &cli.base_url {
        config.gateway.base_url = url.clone();
    }
    if let Some(username) = &cli.username {
        config.gateway.username = username.clone();
    }
    if let Some(password) = &cli.password {
        config.gateway.password = password.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("tde_cli=info".parse()?)
                .add_directive("tde_workflow=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    tracing::debug!("Using template service at {}", config.gateway.base_url);

    let gateway = HttpTemplateGateway::new(&config.gateway)?;
    let editor = TemplateEditor::new(gateway).with_policy(config.editor.unsaved_edits);

    match cli.command {
        Command::Databases => commands::databases(&editor).await,
        Command::Templates { db } => commands::templates(&editor, &db).await,
        Command::Show { db, uri } => commands::show(&editor, &db, &uri).await,
        Command::Validate { db, source } => {
            commands::validate(&editor, db.as_deref(), source.file.as_deref(), source.uri.as_deref())
                .await
        }
        Command::Extract {
            db,
            source,
            samples,
        } => {
            commands::extract(
                &editor,
                &db,
                source.file.as_deref(),
                source.uri.as_deref(),
                &samples,
            )
            .await
        }
        Command::Insert {
            db,
            uri,
            file,
            from,
            yes,
        } => commands::insert(&editor, &db, &uri, file.as_deref(), from.as_deref(), yes).await,
        Command::Export { db, uri, out_dir } => {
            commands::export(&editor, &db, &uri, &out_dir).await
        }
        Command::Apply {
            file,
            edits,
            yes,
            out,
        } => commands::apply(&editor, &file, &edits, yes, out.as_deref()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_extract_with_samples() {
        let cli = Cli::try_parse_from([
            "tde", "extract", "--db", "Documents", "--uri", "/templates/a.json", "--sample",
            "/s/1.xml", "--sample", "/s/2.xml",
        ])
        .unwrap();
        match cli.command {
            Command::Extract { db, source, samples } => {
                assert_eq!(db, "Documents");
                assert_eq!(source.uri.as_deref(), Some("/templates/a.json"));
                assert_eq!(samples, vec!["/s/1.xml", "/s/2.xml"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_source_is_exclusive() {
        let result = Cli::try_parse_from([
            "tde", "validate", "--file", "a.json", "--uri", "/templates/a.json", "--db", "Documents",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_by_uri_needs_database() {
        assert!(Cli::try_parse_from(["tde", "validate", "--uri", "/templates/a.json"]).is_err());
        assert!(Cli::try_parse_from(["tde", "validate", "--file", "a.json"]).is_ok());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "tde", "--base-url", "http://tde.internal:4001", "--username", "editor", "databases",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.gateway.base_url, "http://tde.internal:4001");
        assert_eq!(config.gateway.username, "editor");
    }
}

// kodegen-stash: offline page library command line

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use url::Url;

use cli::{Cli, Command, ListArgs};
use kodegen_tools_stash::{
    FileCredentialStore, HttpApiClient, Library, RemoteStatus, SnapshotRecord, StashConfig,
    SyncError, SyncOutcome, default_data_dir,
};

type StashLibrary = Library<HttpApiClient, FileCredentialStore>;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    let config = StashConfig::builder()
        .data_dir(data_dir)
        .api_base_url(cli.api_url)
        .request_timeout_secs(cli.timeout)
        .build()?;

    let library = Library::open(&config)
        .await
        .context("Failed to open library")?;

    match cli.command {
        Command::Login(args) => {
            library.login(&args.email, &args.password).await?;
            println!("Signed in as {}", args.email);
        }
        Command::Logout => {
            library.logout()?;
            println!("Signed out");
        }
        Command::Save(args) => {
            let url = Url::parse(&args.url).with_context(|| format!("Invalid URL: {}", args.url))?;
            let outcome = library.save_page(&url, args.favorite).await?;
            println!(
                "Saved \"{}\" ({} assets) as {}",
                outcome.record.title, outcome.asset_count, outcome.record.local_id
            );
            report_remote(&outcome.remote);
        }
        Command::Sync => match library.sync().await {
            Ok(SyncOutcome::Completed(report)) => println!(
                "{} remote, {} added, {} updated, {} captured, {} failed",
                report.remote_items, report.added, report.updated, report.captured, report.failed
            ),
            Ok(SyncOutcome::AlreadyRunning) => println!("A sync is already running"),
            Err(SyncError::SessionExpired) => {
                anyhow::bail!("Session expired, run `kodegen-stash login` again")
            }
            Err(e) => return Err(e.into()),
        },
        Command::List(args) => list(&library, &args)?,
        Command::Archive(args) => {
            let id = library.resolve(&args.id)?;
            report_remote(&library.set_archived(id, true).await?);
        }
        Command::Unarchive(args) => {
            let id = library.resolve(&args.id)?;
            report_remote(&library.set_archived(id, false).await?);
        }
        Command::Favorite(args) => {
            let id = library.resolve(&args.id)?;
            library.set_favorited(id, true).await?;
        }
        Command::Unfavorite(args) => {
            let id = library.resolve(&args.id)?;
            library.set_favorited(id, false).await?;
        }
        Command::Delete(args) => {
            let id = library.resolve(&args.id)?;
            report_remote(&library.delete(id).await?);
        }
        Command::Open(args) => {
            let id = library.resolve(&args.id)?;
            match library.locate(id)? {
                Some(location) => println!("{}", location.index_html.display()),
                None => anyhow::bail!("Page {id} has no local snapshot yet, run sync"),
            }
        }
    }

    Ok(())
}

fn list(library: &StashLibrary, args: &ListArgs) -> Result<()> {
    let catalog = library.catalog();
    let records: Vec<&SnapshotRecord> = if args.archived {
        catalog.archived().collect()
    } else {
        catalog.active().collect()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    for record in records {
        let cached = if library.store().has_cache(record) { ' ' } else { '!' };
        let star = if record.favorited { '*' } else { ' ' };
        let short_id = record.local_id.to_string();
        println!(
            "{}{cached}{star} {}  {}  {}",
            &short_id[..8],
            record.added_at.format("%Y-%m-%d"),
            record.title,
            record.source_url
        );
    }
    Ok(())
}

fn report_remote(status: &RemoteStatus) {
    match status {
        RemoteStatus::Applied => println!("Synced with server"),
        RemoteStatus::Skipped => {}
        RemoteStatus::SessionExpired => println!("Saved locally; log in again to sync"),
        RemoteStatus::Failed(message) => println!("Saved locally; server update failed: {message}"),
    }
}

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_files(config: &Config) -> anyhow::Result<()> {
    let store = Store::with_options(&config.database).await?;
    let files = store.list_tracked_files().await?;

    if files.is_empty() {
        println!("No files have been written through the API.");
        return Ok(());
    }

    println!("Tracked files under {}:", config.files_root().display());
    println!("{:-<70}", "");

    for file in files {
        println!("• {}", file.filename);
        println!("  {} | {}", file.last_modified, file.modified_by);
    }

    Ok(())
}

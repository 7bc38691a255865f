use crate::config::Config;
use crate::db::Store;

pub async fn cmd_logs(config: &Config, limit: u64) -> anyhow::Result<()> {
    let store = Store::with_options(&config.database).await?;
    let logs = store.recent_request_logs(limit).await?;

    if logs.is_empty() {
        println!("No API requests recorded.");
        return Ok(());
    }

    let total = store.count_request_logs().await?;
    println!("Recent API requests ({} of {total}):", logs.len());
    println!("{:-<70}", "");

    for log in logs {
        println!(
            "• {} {} -> {}",
            log.method, log.endpoint, log.status_code
        );
        println!(
            "  {} | {} | {}",
            log.timestamp,
            log.ip_address.as_deref().unwrap_or("unknown ip"),
            log.user_agent.as_deref().unwrap_or("unknown agent")
        );
    }

    Ok(())
}

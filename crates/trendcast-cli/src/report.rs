//! `trendcast-cli report`: recent run summaries.

use crate::bootstrap;

pub async fn execute(limit: i64) -> anyhow::Result<()> {
    let pool = bootstrap::connect().await?;

    let rows = trendcast_db::list_runs(&pool, limit).await?;
    if rows.is_empty() {
        println!("no runs recorded yet");
        return Ok(());
    }

    for row in rows {
        println!(
            "{} [{}] {} at {} — trends {}, content {}, scheduled {}",
            row.run_id,
            row.kind,
            row.status,
            row.started_at,
            row.trends_found,
            row.content_generated,
            row.posts_scheduled
        );
        if let Some(errors) = row.errors.as_array() {
            for error in errors {
                if let Some(message) = error.as_str() {
                    println!("    - {message}");
                }
            }
        }
    }

    Ok(())
}

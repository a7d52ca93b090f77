//! `trendcast-cli trends`: trend refresh without content generation.

use trendcast_core::RunConfig;

use crate::bootstrap;

pub async fn execute(max_trends: Option<usize>) -> anyhow::Result<()> {
    let context = bootstrap::build().await?;

    let mut config = RunConfig::default();
    if let Some(max_trends) = max_trends {
        config.max_trends = max_trends;
    }

    let summary = context.engine.refresh_trends(config).await?;

    println!(
        "trend refresh {} found {} trends",
        summary.run_id, summary.trends_found
    );
    if !summary.errors.is_empty() {
        for error in &summary.errors {
            println!("  - {error}");
        }
    }

    let rows = trendcast_db::list_active_trends(&context.pool, 20).await?;
    for row in rows {
        println!(
            "  [{:.2}] {} ({} mentions, {})",
            row.relevance_score, row.topic, row.mention_count, row.source
        );
    }

    Ok(())
}

//! `trendcast-cli run`: one full pipeline run from the terminal.

use trendcast_core::{RunConfig, RunKind, Tone};

use crate::bootstrap;

pub async fn execute(
    sources: Option<Vec<String>>,
    max_trends: Option<usize>,
    max_posts: Option<usize>,
    tones: Option<Vec<Tone>>,
    no_dedup: bool,
) -> anyhow::Result<()> {
    let context = bootstrap::build().await?;

    let mut config = RunConfig::default();
    if let Some(sources) = sources {
        config.sources = sources;
    }
    if let Some(max_trends) = max_trends {
        config.max_trends = max_trends;
    }
    if let Some(max_posts) = max_posts {
        config.max_posts_per_day = max_posts;
    }
    if let Some(tones) = tones {
        config.tones = tones;
    }
    if no_dedup {
        config.filter_duplicates = false;
    }

    let summary = context.engine.run_pipeline(RunKind::Manual, config).await?;

    println!("run {} complete", summary.run_id);
    println!("  trends found:      {}", summary.trends_found);
    println!("  content generated: {}", summary.content_generated);
    println!("  posts scheduled:   {}", summary.posts_scheduled);
    for post in &summary.scheduled {
        println!("    post {} at {} — {}", post.post_id, post.publish_at, post.preview);
    }
    if !summary.errors.is_empty() {
        println!("  errors:");
        for error in &summary.errors {
            println!("    - {error}");
        }
    }

    Ok(())
}

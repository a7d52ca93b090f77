//! The stage pipeline: an explicit state machine with one decision point
//! and a bounded regeneration loop.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use trendcast_core::{
    ConfigError, ContentCandidate, NewPost, PostStatus, RunConfig, RunKind, RunSummary,
    ScheduledPost, Tone, Trend,
};

use crate::ranker::{self, TopicMention};
use crate::traits::{ArticleSource, Store, TextService};
use crate::{compliance, dedup, review, scoring, slots};

/// Once this many candidates have been generated across regeneration rounds
/// with zero approvals, the run skips scheduling instead of looping again.
pub const REGENERATE_CANDIDATE_CEILING: usize = 5;

/// Backstop on the stage loop; the review decision is the real bound.
const MAX_STAGE_ITERATIONS: usize = 24;

/// Topics extracted per article during trend analysis.
const TOPICS_PER_ARTICLE: usize = 3;

/// Hashtags requested per extracted topic.
const HASHTAGS_PER_TOPIC: usize = 3;

/// Hashtags attached to a finished candidate.
const MAX_HASHTAGS: usize = 5;

/// Target body length passed to the generation prompt, in characters.
const GENERATION_TARGET_LENGTH: usize = 1500;

/// Readability assumed when the scoring call fails.
const DEFAULT_READABILITY: f64 = 50.0;

/// Pipeline stages. `Start` is initial, `End` terminal; there is no failure
/// terminal; stage errors are collected and the run continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    AnalyzeTrends,
    FilterTrends,
    GenerateContent,
    ReviewContent,
    SchedulePosts,
    Monitor,
    End,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::AnalyzeTrends => "analyze_trends",
            Stage::FilterTrends => "filter_trends",
            Stage::GenerateContent => "generate_content",
            Stage::ReviewContent => "review_content",
            Stage::SchedulePosts => "schedule_posts",
            Stage::Monitor => "monitor",
            Stage::End => "end",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the review-stage decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Publish,
    Regenerate,
    Skip,
}

/// Run-scoped state threaded through the stages. Owned exclusively by one
/// engine invocation for its lifetime.
#[derive(Debug)]
pub struct RunState {
    pub run_id: String,
    pub kind: RunKind,
    pub started_at: DateTime<Utc>,
    pub current_stage: Stage,
    pub trends: Vec<Trend>,
    pub candidates: Vec<ContentCandidate>,
    pub scheduled: Vec<ScheduledPost>,
    pub errors: Vec<String>,
    /// Candidates generated across all regeneration rounds; the working
    /// `candidates` list is replaced each round, this count is not.
    pub total_generated: usize,
    pub config: RunConfig,
}

impl RunState {
    fn new(kind: RunKind, config: RunConfig, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: kind.run_id(started_at),
            kind,
            started_at,
            current_stage: Stage::Start,
            trends: Vec::new(),
            candidates: Vec::new(),
            scheduled: Vec::new(),
            errors: Vec::new(),
            total_generated: 0,
            config,
        }
    }
}

/// Timeout and pacing applied to every external collaborator call.
#[derive(Debug, Clone)]
pub struct CallPolicy {
    pub timeout: Duration,
    /// Courtesy delay between consecutive external calls within a stage.
    pub delay: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            delay: Duration::from_millis(1000),
        }
    }
}

impl CallPolicy {
    /// Await `operation` under the per-call timeout.
    ///
    /// # Errors
    ///
    /// Returns the operation's own error, or a timeout error naming `what`.
    pub async fn call<T, F>(&self, what: &str, operation: F) -> anyhow::Result<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match tokio::time::timeout(self.timeout, operation).await {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!(
                "{what} timed out after {}s",
                self.timeout.as_secs()
            )),
        }
    }

    /// Sleep for the configured inter-call delay, if any.
    pub async fn pace(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Decide where to go after `review_content`.
///
/// At least one approved candidate publishes; otherwise regenerate while the
/// cumulative candidate count is under the ceiling; otherwise skip. An empty
/// candidate list skips immediately: with nothing generated there is
/// nothing a retry could rescore.
#[must_use]
pub fn decide_after_review(state: &RunState) -> ReviewDecision {
    if state.candidates.is_empty() {
        return ReviewDecision::Skip;
    }

    let approved = state.candidates.iter().filter(|c| c.approved).count();

    if approved >= 1 {
        ReviewDecision::Publish
    } else if state.total_generated < REGENERATE_CANDIDATE_CEILING {
        ReviewDecision::Regenerate
    } else {
        ReviewDecision::Skip
    }
}

/// The workflow engine. Construct one per process and share it by reference;
/// collaborators are injected, never looked up globally.
pub struct WorkflowEngine {
    text: Arc<dyn TextService>,
    articles: Arc<dyn ArticleSource>,
    store: Arc<dyn Store>,
    policy: CallPolicy,
}

impl WorkflowEngine {
    #[must_use]
    pub fn new(
        text: Arc<dyn TextService>,
        articles: Arc<dyn ArticleSource>,
        store: Arc<dyn Store>,
    ) -> Self {
        Self::with_policy(text, articles, store, CallPolicy::default())
    }

    #[must_use]
    pub fn with_policy(
        text: Arc<dyn TextService>,
        articles: Arc<dyn ArticleSource>,
        store: Arc<dyn Store>,
        policy: CallPolicy,
    ) -> Self {
        Self {
            text,
            articles,
            store,
            policy,
        }
    }

    /// Run the full pipeline without external cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] only when `config` fails validation; every
    /// stage-level failure is collected into the summary instead.
    pub async fn run_pipeline(
        &self,
        kind: RunKind,
        config: RunConfig,
    ) -> Result<RunSummary, ConfigError> {
        self.run_pipeline_cancellable(kind, config, CancellationToken::new())
            .await
    }

    /// Run the full pipeline, honoring `cancel` at stage boundaries and
    /// external-call suspension points. A cancelled run still produces a
    /// summary of whatever partial state exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] only when `config` fails validation.
    pub async fn run_pipeline_cancellable(
        &self,
        kind: RunKind,
        config: RunConfig,
        cancel: CancellationToken,
    ) -> Result<RunSummary, ConfigError> {
        config.validate()?;

        let started_at = Utc::now();
        let mut state = RunState::new(kind, config, started_at);
        tracing::info!(run_id = %state.run_id, kind = %state.kind, "starting pipeline run");

        let mut stage = Stage::Start;
        let mut iterations = 0usize;

        while stage != Stage::End {
            iterations += 1;
            if iterations > MAX_STAGE_ITERATIONS {
                state
                    .errors
                    .push("stage loop exceeded iteration cap".to_string());
                break;
            }
            if cancel.is_cancelled() {
                state.errors.push("run cancelled".to_string());
                break;
            }

            state.current_stage = stage;
            tracing::debug!(run_id = %state.run_id, stage = %stage, "entering stage");
            stage = self.step(stage, &mut state, &cancel).await;
        }

        state.current_stage = Stage::End;
        let summary = self.finish(state).await;
        Ok(summary)
    }

    /// Run trend analysis only, as the periodic trend-refresh trigger does.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] only when `config` fails validation.
    pub async fn refresh_trends(&self, config: RunConfig) -> Result<RunSummary, ConfigError> {
        config.validate()?;

        let started_at = Utc::now();
        let mut state = RunState::new(RunKind::Trends, config, started_at);
        tracing::info!(run_id = %state.run_id, "starting trend refresh");

        state.current_stage = Stage::AnalyzeTrends;
        self.analyze_trends(&mut state, &CancellationToken::new())
            .await;

        state.current_stage = Stage::End;
        let summary = self.finish(state).await;
        Ok(summary)
    }

    async fn step(
        &self,
        stage: Stage,
        state: &mut RunState,
        cancel: &CancellationToken,
    ) -> Stage {
        match stage {
            Stage::Start => Stage::AnalyzeTrends,
            Stage::AnalyzeTrends => {
                self.analyze_trends(state, cancel).await;
                Stage::FilterTrends
            }
            Stage::FilterTrends => {
                self.filter_trends(state).await;
                Stage::GenerateContent
            }
            Stage::GenerateContent => {
                self.generate_content(state, cancel).await;
                Stage::ReviewContent
            }
            Stage::ReviewContent => {
                review::review_candidates(&mut state.candidates);
                let approved = state.candidates.iter().filter(|c| c.approved).count();
                tracing::info!(
                    run_id = %state.run_id,
                    approved,
                    reviewed = state.candidates.len(),
                    "content review complete"
                );
                match decide_after_review(state) {
                    ReviewDecision::Publish => Stage::SchedulePosts,
                    ReviewDecision::Regenerate => {
                        tracing::info!(
                            run_id = %state.run_id,
                            total_generated = state.total_generated,
                            "no candidate approved — regenerating"
                        );
                        Stage::GenerateContent
                    }
                    ReviewDecision::Skip => {
                        tracing::info!(run_id = %state.run_id, "no candidate approved — skipping");
                        Stage::End
                    }
                }
            }
            Stage::SchedulePosts => {
                self.schedule_posts(state).await;
                Stage::Monitor
            }
            Stage::Monitor => {
                // Placeholder: marks completion until engagement ingestion exists.
                tracing::info!(run_id = %state.run_id, "monitoring stage placeholder");
                Stage::End
            }
            Stage::End => Stage::End,
        }
    }

    async fn analyze_trends(&self, state: &mut RunState, cancel: &CancellationToken) {
        tracing::info!(
            run_id = %state.run_id,
            sources = ?state.config.sources,
            "analyzing trends"
        );

        let mut articles = Vec::new();
        for source in &state.config.sources {
            if cancel.is_cancelled() {
                state
                    .errors
                    .push("run cancelled during article fetch".to_string());
                return;
            }
            match self
                .policy
                .call(
                    "article fetch",
                    self.articles.fetch_recent(source, state.config.hours_back),
                )
                .await
            {
                Ok(mut fetched) => {
                    tracing::debug!(source = %source, count = fetched.len(), "fetched articles");
                    articles.append(&mut fetched);
                }
                Err(e) => {
                    tracing::warn!(source = %source, error = %e, "article fetch failed");
                    state
                        .errors
                        .push(format!("article fetch failed for source '{source}': {e}"));
                }
            }
        }

        if articles.is_empty() {
            tracing::warn!(run_id = %state.run_id, "no recent articles found");
            return;
        }

        let mut mentions: Vec<TopicMention> = Vec::new();
        for article in &articles {
            if cancel.is_cancelled() {
                state
                    .errors
                    .push("run cancelled during topic extraction".to_string());
                return;
            }

            let content = format!("{} {}", article.title, article.summary);
            let topics = match self
                .policy
                .call(
                    "topic extraction",
                    self.text.extract_topics(&content, TOPICS_PER_ARTICLE),
                )
                .await
            {
                Ok(topics) => topics,
                Err(e) => {
                    state.errors.push(format!(
                        "topic extraction failed for article '{}': {e}",
                        article.title
                    ));
                    continue;
                }
            };

            for topic in topics {
                let hashtags = match self
                    .policy
                    .call(
                        "hashtag generation",
                        self.text.generate_hashtags(&topic, HASHTAGS_PER_TOPIC),
                    )
                    .await
                {
                    Ok(tags) => tags,
                    Err(e) => {
                        tracing::warn!(topic = %topic, error = %e, "hashtag generation failed");
                        Vec::new()
                    }
                };

                mentions.push(TopicMention {
                    topic,
                    hashtags,
                    source: article.source.clone(),
                    article_title: article.title.clone(),
                    article_url: article.url.clone(),
                });
            }

            self.policy.pace().await;
        }

        let outcome = ranker::rank_topics(
            self.text.as_ref(),
            &mentions,
            state.config.max_trends,
            &self.policy,
            cancel,
        )
        .await;
        state.errors.extend(outcome.errors);

        for mut trend in outcome.trends {
            match self
                .policy
                .call("trend upsert", self.store.upsert_trend(&trend))
                .await
            {
                Ok(id) => {
                    trend.id = Some(id);
                    state.trends.push(trend);
                }
                Err(e) => {
                    state
                        .errors
                        .push(format!("failed to persist trend '{}': {e}", trend.topic));
                }
            }
        }

        tracing::info!(
            run_id = %state.run_id,
            trends = state.trends.len(),
            articles = articles.len(),
            "trend analysis complete"
        );
    }

    async fn filter_trends(&self, state: &mut RunState) {
        if state.trends.is_empty() {
            tracing::warn!(run_id = %state.run_id, "no trends to filter");
            return;
        }

        state
            .trends
            .sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        state.trends.truncate(state.config.max_posts_per_day);

        if state.config.filter_duplicates {
            let cutoff =
                Utc::now() - chrono::Duration::days(state.config.duplicate_lookback_days);
            match self
                .policy
                .call(
                    "post history query",
                    self.store.trend_ids_posted_since(cutoff),
                )
                .await
            {
                Ok(ids) => {
                    let recent: HashSet<i64> = ids.into_iter().collect();
                    let before = state.trends.len();
                    state.trends =
                        dedup::filter_recent_duplicates(std::mem::take(&mut state.trends), &recent);
                    let removed = before - state.trends.len();
                    if removed > 0 {
                        tracing::info!(run_id = %state.run_id, removed, "dropped recently covered topics");
                    }
                }
                Err(e) => {
                    // Degrade to pass-through: better to risk a repeat topic
                    // than to drop the whole run.
                    state
                        .errors
                        .push(format!("duplicate filter history query failed: {e}"));
                }
            }
        }

        tracing::info!(
            run_id = %state.run_id,
            trends = state.trends.len(),
            "filtered to priority trends"
        );
    }

    async fn generate_content(&self, state: &mut RunState, cancel: &CancellationToken) {
        // Regeneration replaces the working set; total_generated keeps counting.
        state.candidates.clear();

        if state.trends.is_empty() {
            tracing::warn!(run_id = %state.run_id, "no trends available; skipping generation");
            return;
        }

        let trends = state.trends.clone();
        let tones = state.config.tones.clone();

        for trend in &trends {
            for &tone in &tones {
                if cancel.is_cancelled() {
                    state
                        .errors
                        .push("run cancelled during content generation".to_string());
                    return;
                }

                match self.generate_candidate(trend, tone).await {
                    Ok(candidate) => {
                        state.total_generated += 1;
                        state.candidates.push(candidate);
                    }
                    Err(e) => {
                        tracing::warn!(
                            topic = %trend.topic,
                            tone = %tone,
                            error = %e,
                            "candidate generation failed"
                        );
                        state.errors.push(format!(
                            "failed to generate content for trend '{}' ({tone}): {e}",
                            trend.topic
                        ));
                    }
                }

                self.policy.pace().await;
            }
        }

        tracing::info!(
            run_id = %state.run_id,
            generated = state.candidates.len(),
            total_generated = state.total_generated,
            "content generation complete"
        );
    }

    async fn generate_candidate(
        &self,
        trend: &Trend,
        tone: Tone,
    ) -> anyhow::Result<ContentCandidate> {
        let system_prompt = build_system_prompt(tone);
        let prompt = build_generation_prompt(trend);

        let raw = self
            .policy
            .call(
                "content generation",
                self.text.generate_text(&prompt, Some(&system_prompt), Some(0.7)),
            )
            .await?;
        let body = compliance::enforce_compliance(&raw);

        let generated_tags = match self
            .policy
            .call(
                "hashtag generation",
                self.text.generate_hashtags(&body, MAX_HASHTAGS),
            )
            .await
        {
            Ok(tags) => tags,
            Err(e) => {
                tracing::warn!(topic = %trend.topic, error = %e, "hashtag generation failed");
                Vec::new()
            }
        };
        let hashtags = merge_hashtags(&trend.hashtags, generated_tags, MAX_HASHTAGS);

        let readability = match self
            .policy
            .call("readability scoring", self.text.score_readability(&body))
            .await
        {
            Ok(score) => score.clamp(0.0, 100.0),
            Err(e) => {
                tracing::warn!(topic = %trend.topic, error = %e, "readability scoring failed");
                DEFAULT_READABILITY
            }
        };

        let engagement = scoring::engagement_heuristic(&body);

        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let character_count = body.chars().count() as i32;
        let post_id = self
            .policy
            .call(
                "draft post persistence",
                self.store.create_draft_post(&NewPost {
                    content: body.clone(),
                    hashtags: hashtags.clone(),
                    readability_score: readability,
                    engagement_score: engagement,
                    character_count,
                    trend_topic_id: trend.id,
                }),
            )
            .await?;

        Ok(ContentCandidate {
            post_id: Some(post_id),
            trend: Some(trend.clone()),
            tone,
            body,
            hashtags,
            readability_score: readability,
            engagement_score: engagement,
            composite_score: 0.0,
            approved: false,
        })
    }

    async fn schedule_posts(&self, state: &mut RunState) {
        let approved: Vec<ContentCandidate> = state
            .candidates
            .iter()
            .filter(|c| c.approved)
            .take(state.config.max_posts_per_day)
            .cloned()
            .collect();

        if approved.is_empty() {
            return;
        }

        let now = Utc::now();
        let publish_times = slots::compute_slots(now, approved.len(), &state.config.publish_hours);

        for (candidate, publish_at) in approved.iter().zip(publish_times) {
            let Some(post_id) = candidate.post_id else {
                state.errors.push(format!(
                    "approved candidate for '{}' has no stored post; skipping",
                    candidate
                        .trend
                        .as_ref()
                        .map_or("custom topic", |t| t.topic.as_str())
                ));
                continue;
            };

            match self
                .policy
                .call(
                    "post scheduling",
                    self.store.mark_post_scheduled(post_id, publish_at),
                )
                .await
            {
                Ok(()) => {
                    state.scheduled.push(ScheduledPost {
                        post_id,
                        publish_at,
                        status: PostStatus::Scheduled,
                        preview: preview(&candidate.body),
                    });
                }
                Err(e) => {
                    state
                        .errors
                        .push(format!("failed to schedule post {post_id}: {e}"));
                }
            }
        }

        tracing::info!(
            run_id = %state.run_id,
            scheduled = state.scheduled.len(),
            "posts scheduled"
        );
    }

    async fn finish(&self, state: RunState) -> RunSummary {
        let summary = RunSummary {
            run_id: state.run_id,
            kind: state.kind,
            success: true,
            trends_found: state.trends.len(),
            content_generated: state.total_generated,
            posts_scheduled: state.scheduled.len(),
            scheduled: state.scheduled,
            errors: state.errors,
            started_at: state.started_at,
            completed_at: Utc::now(),
        };

        if let Err(e) = self
            .policy
            .call("run summary persistence", self.store.record_run(&summary))
            .await
        {
            tracing::warn!(run_id = %summary.run_id, error = %e, "failed to record run summary");
        }

        tracing::info!(
            run_id = %summary.run_id,
            trends = summary.trends_found,
            content = summary.content_generated,
            scheduled = summary.posts_scheduled,
            errors = summary.errors.len(),
            "pipeline run complete"
        );

        summary
    }
}

fn build_system_prompt(tone: Tone) -> String {
    let tone_instructions = match tone {
        Tone::Professional => {
            "Write in a professional, authoritative tone suitable for business \
             leaders and industry experts. Focus on insights, best practices, \
             and strategic implications."
        }
        Tone::Casual => {
            "Write in a conversational, approachable tone that's still \
             professional but more relatable. Use a friendly voice that \
             encourages discussion."
        }
        Tone::Technical => {
            "Write in a technical tone with detailed explanations suitable for \
             developers and technical professionals. Include specific details \
             and technical insights."
        }
    };

    format!(
        "You are an expert content writer specializing in technology and \
         business topics for a professional audience.\n\n\
         Instructions:\n\
         - {tone_instructions}\n\
         - Target length: approximately {GENERATION_TARGET_LENGTH} characters\n\
         - Include insights, actionable takeaways, or thought-provoking questions\n\
         - Use line breaks for readability\n\
         - Do NOT include hashtags in the content (they are added separately)\n\
         - Make it likely to generate meaningful professional discussion"
    )
}

fn build_generation_prompt(trend: &Trend) -> String {
    format!(
        "Create a post about: {}\n\n\
         Context: this is currently a trending topic with relevance score {:.2}.\n\n\
         Generate engaging content that resonates with a professional tech \
         audience and encourages discussion.",
        trend.topic, trend.relevance_score
    )
}

fn merge_hashtags(seed: &[String], generated: Vec<String>, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for tag in seed.iter().cloned().chain(generated) {
        if seen.insert(tag.to_lowercase()) {
            merged.push(tag);
            if merged.len() == cap {
                break;
            }
        }
    }
    merged
}

fn preview(body: &str) -> String {
    let mut short: String = body.chars().take(100).collect();
    short.push_str("...");
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(candidates: Vec<ContentCandidate>, total_generated: usize) -> RunState {
        let mut state = RunState::new(RunKind::Manual, RunConfig::default(), Utc::now());
        state.candidates = candidates;
        state.total_generated = total_generated;
        state
    }

    fn candidate(approved: bool) -> ContentCandidate {
        ContentCandidate {
            post_id: Some(1),
            trend: None,
            tone: Tone::Professional,
            body: "body".to_string(),
            hashtags: vec![],
            readability_score: 50.0,
            engagement_score: 0.5,
            composite_score: if approved { 60.0 } else { 20.0 },
            approved,
        }
    }

    #[test]
    fn review_publishes_with_at_least_one_approval() {
        let state = state_with(vec![candidate(false), candidate(true)], 2);
        assert_eq!(decide_after_review(&state), ReviewDecision::Publish);
    }

    #[test]
    fn review_regenerates_below_ceiling() {
        let state = state_with(vec![candidate(false), candidate(false)], 2);
        assert_eq!(decide_after_review(&state), ReviewDecision::Regenerate);
    }

    #[test]
    fn review_skips_at_ceiling() {
        let state = state_with(
            vec![candidate(false)],
            REGENERATE_CANDIDATE_CEILING,
        );
        assert_eq!(decide_after_review(&state), ReviewDecision::Skip);
    }

    #[test]
    fn review_skips_with_no_candidates() {
        let state = state_with(vec![], 0);
        assert_eq!(decide_after_review(&state), ReviewDecision::Skip);
    }

    #[test]
    fn merge_hashtags_dedupes_case_insensitively_and_caps() {
        let seed = vec!["AI".to_string(), "tech".to_string()];
        let generated = vec![
            "ai".to_string(),
            "startups".to_string(),
            "cloud".to_string(),
            "data".to_string(),
            "extra".to_string(),
        ];
        let merged = merge_hashtags(&seed, generated, 5);
        assert_eq!(merged, vec!["AI", "tech", "startups", "cloud", "data"]);
    }

    #[test]
    fn preview_truncates_to_a_hundred_chars() {
        let long = "x".repeat(250);
        let p = preview(&long);
        assert_eq!(p.chars().count(), 103);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn stage_names_are_stable() {
        assert_eq!(Stage::AnalyzeTrends.as_str(), "analyze_trends");
        assert_eq!(Stage::End.as_str(), "end");
    }
}

//! The main Unswachh node struct: wires storage, collaborators and engines together.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use unswachh_geo::links::{deep_link, maps_search_url};
use unswachh_geo::{
    group_by_region, GeoError, GeoVerifier, NominatimGeocoder, PositionError, PositionProvider,
    RawPosition, ReverseGeocoder, VerifiedCoordinate,
};
use unswachh_media::{CloudinaryUploader, ImagePipeline, JpegNormalizer, MediaPipeline};
use unswachh_moderation::{
    AdminGate, AdminSession, ApproveOutcome, ModerationEngine, ModerationError, ReviewQueue,
    StaticPasswordGate, StoredPasswordGate,
};
use unswachh_nullables::{
    NullGeocoder, NullImagePipeline, NullMetaStore, NullPositionProvider, NullReportStore,
};
use unswachh_store::{
    MetaStore, ReportFilter, ReportStore, StoreError, ADMIN_PASSWORD_KEY, VIEWS_COUNTER,
};
use unswachh_store_lmdb::environment::DEFAULT_MAX_DBS;
use unswachh_store_lmdb::{check_integrity, LmdbEnvironment, Migrator};
use unswachh_submission::{ReportDraft, ReportSubmissionPipeline, SubmissionError};
use unswachh_types::{Report, ReportId, ReportStatus, VoteChoice, VoterId};
use unswachh_votes::{
    InMemoryVoteRecords, JsonFileVoteRecords, VoteEffect, VoteError, VoteKind, VoteLedger,
    VoteRecordStore,
};

use crate::{EventedStore, FeedSubscription, NodeConfig, NodeError, NodeMetrics, ReportFeed};

/// Position provider for hosts without positioning hardware (servers, the CLI).
pub struct NoPositioning;

#[async_trait]
impl PositionProvider for NoPositioning {
    async fn current_position(&self) -> Result<RawPosition, PositionError> {
        Err(PositionError::Unsupported)
    }
}

/// The outside-world collaborators of a node.
pub struct Collaborators {
    pub position: Arc<dyn PositionProvider>,
    pub images: Arc<dyn ImagePipeline>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
}

impl Collaborators {
    /// Real HTTP-backed image pipeline and geocoder, configured from `config`.
    pub fn from_config(config: &NodeConfig, position: Arc<dyn PositionProvider>) -> Self {
        if config.cloud_name.is_empty() || config.upload_preset.is_empty() {
            tracing::warn!("image hosting is not configured; photo uploads will fail");
        }
        let uploader = CloudinaryUploader::new(
            &config.upload_url,
            &config.cloud_name,
            &config.upload_preset,
            config.http_timeout(),
        );
        let geocoder = NominatimGeocoder::new(
            &config.nominatim_url,
            &config.user_agent,
            config.http_timeout(),
        );
        Self {
            position,
            images: Arc::new(MediaPipeline::new(
                JpegNormalizer::new(config.image.clone()),
                uploader,
            )),
            geocoder: Arc::new(geocoder),
        }
    }

    /// Deterministic stand-ins that never touch the network.
    pub fn null() -> Self {
        Self {
            position: Arc::new(NullPositionProvider::unsupported()),
            images: Arc::new(NullImagePipeline::new()),
            geocoder: Arc::new(NullGeocoder::default()),
        }
    }
}

/// Report counts and site views for the dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeStats {
    pub total: usize,
    pub in_review: usize,
    pub approved: usize,
    pub views: u64,
}

/// Shareable locations of a report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportLinks {
    pub maps: String,
    pub deep: String,
}

pub struct UnswachhNode {
    pub config: NodeConfig,
    /// Present when backed by LMDB.
    lmdb: Option<LmdbEnvironment>,
    store: Arc<dyn ReportStore>,
    meta: Arc<dyn MetaStore>,
    verifier: GeoVerifier,
    submission: ReportSubmissionPipeline,
    moderation: ModerationEngine,
    votes: VoteLedger,
    feed: ReportFeed,
    pub metrics: Arc<NodeMetrics>,
}

fn admin_gate(config: &NodeConfig, meta: &Arc<dyn MetaStore>) -> Arc<dyn AdminGate> {
    match &config.admin_password {
        Some(password) => Arc::new(StaticPasswordGate::new(password.clone())),
        None => Arc::new(StoredPasswordGate::new(Arc::clone(meta))),
    }
}

impl UnswachhNode {
    /// Open a node backed by LMDB at `config.data_dir`.
    ///
    /// Runs schema migrations and an integrity check before anything else
    /// touches the database.
    pub fn open(config: NodeConfig, collaborators: Collaborators) -> Result<Self, NodeError> {
        let env = LmdbEnvironment::open(&config.data_dir, DEFAULT_MAX_DBS, config.lmdb_map_size)?;

        let meta = env.meta_store();
        Migrator::run(&meta)?;

        let integrity = check_integrity(&env)?;
        if !integrity.is_healthy() {
            return Err(NodeError::Integrity(integrity.errors.join("; ")));
        }
        tracing::info!(
            path = %env.path().display(),
            reports = integrity.reports_decoded,
            "database opened"
        );

        let reports: Arc<dyn ReportStore> = Arc::new(env.report_store());
        let meta: Arc<dyn MetaStore> = Arc::new(meta);
        let records: Arc<dyn VoteRecordStore> =
            Arc::new(JsonFileVoteRecords::open(&config.vote_file)?);

        let mut node = Self::assemble(config, reports, meta, records, collaborators);
        node.lmdb = Some(env);
        Ok(node)
    }

    /// A node whose storage lives only in memory.
    pub fn in_memory(config: NodeConfig, collaborators: Collaborators) -> Self {
        Self::assemble(
            config,
            Arc::new(NullReportStore::new()),
            Arc::new(NullMetaStore::new()),
            Arc::new(InMemoryVoteRecords::new()),
            collaborators,
        )
    }

    fn assemble(
        config: NodeConfig,
        reports: Arc<dyn ReportStore>,
        meta: Arc<dyn MetaStore>,
        records: Arc<dyn VoteRecordStore>,
        collaborators: Collaborators,
    ) -> Self {
        // Every write goes through the evented wrapper so the feed sees it.
        let evented = Arc::new(EventedStore::new(reports, config.feed_capacity));
        let store: Arc<dyn ReportStore> = evented.clone();
        let feed = ReportFeed::new(Arc::clone(&store), evented.sender());

        let gate = admin_gate(&config, &meta);
        let node = Self {
            lmdb: None,
            verifier: GeoVerifier::new(collaborators.position),
            submission: ReportSubmissionPipeline::new(
                Arc::clone(&store),
                collaborators.images,
                collaborators.geocoder,
            ),
            moderation: ModerationEngine::new(gate, Arc::clone(&store)),
            votes: VoteLedger::new(Arc::clone(&store), records),
            feed,
            store,
            meta,
            metrics: Arc::new(NodeMetrics::new()),
            config,
        };
        node.refresh_metrics();
        node
    }

    // ── Submission ──────────────────────────────────────────────────────

    /// Ask the device for a verified position for the next submission.
    pub async fn verify_location(&self) -> Result<VerifiedCoordinate, GeoError> {
        self.verifier.verify().await
    }

    pub async fn submit(&self, draft: ReportDraft) -> Result<Report, SubmissionError> {
        let started = Instant::now();
        let result = self.submission.submit(draft).await;
        self.metrics
            .submission_time_ms
            .observe(started.elapsed().as_secs_f64() * 1000.0);
        match &result {
            Ok(_) => {
                self.metrics.submissions_accepted.inc();
                self.refresh_metrics();
            }
            Err(e) => self
                .metrics
                .submissions_rejected
                .with_label_values(&[e.reason()])
                .inc(),
        }
        result
    }

    // ── Moderation ──────────────────────────────────────────────────────

    pub async fn login(&self, password: &str) -> Result<AdminSession, ModerationError> {
        let result = self.moderation.login(password).await;
        if result.is_err() {
            self.metrics
                .moderation_actions
                .with_label_values(&["login_failed"])
                .inc();
        }
        result
    }

    pub fn approve(
        &self,
        session: &AdminSession,
        id: &ReportId,
    ) -> Result<ApproveOutcome, ModerationError> {
        let outcome = self.moderation.approve(session, id)?;
        if outcome == ApproveOutcome::Approved {
            self.metrics
                .moderation_actions
                .with_label_values(&["approve"])
                .inc();
            self.refresh_metrics();
        }
        Ok(outcome)
    }

    pub fn remove(&self, session: &AdminSession, id: &ReportId) -> Result<(), ModerationError> {
        self.moderation.remove(session, id)?;
        self.metrics
            .moderation_actions
            .with_label_values(&["remove"])
            .inc();
        self.refresh_metrics();
        Ok(())
    }

    pub fn review_queue(&self, session: &AdminSession) -> Result<ReviewQueue, ModerationError> {
        self.moderation.review_queue(session)
    }

    /// Store a new admin password for the stored-password gate.
    pub fn set_admin_password(&self, password: &str) -> Result<(), NodeError> {
        if password.is_empty() {
            return Err(NodeError::Config("admin password must not be empty".to_string()));
        }
        if self.config.admin_password.is_some() {
            tracing::warn!("a fixed admin password is configured; the stored one is ignored");
        }
        self.meta.put_setting(ADMIN_PASSWORD_KEY, password)?;
        tracing::info!("admin password updated");
        Ok(())
    }

    // ── Voting ──────────────────────────────────────────────────────────

    pub fn cast_vote(
        &self,
        voter: &VoterId,
        id: &ReportId,
        choice: VoteChoice,
    ) -> Result<VoteEffect, VoteError> {
        let effect = self.votes.cast_vote(voter, id, choice)?;
        let kind = match effect.kind {
            VoteKind::Cast => "cast",
            VoteKind::AlreadyVoted => "already_voted",
            VoteKind::Flipped => "flipped",
        };
        self.metrics.votes_cast.with_label_values(&[kind]).inc();
        Ok(effect)
    }

    pub fn current_choice(
        &self,
        voter: &VoterId,
        id: &ReportId,
    ) -> Result<Option<VoteChoice>, VoteError> {
        self.votes.current_choice(voter, id)
    }

    // ── Public reads ────────────────────────────────────────────────────

    pub fn report(&self, id: &ReportId) -> Result<Report, StoreError> {
        self.store.get(id)
    }

    pub fn reports(&self, filter: ReportFilter) -> Result<Vec<Report>, StoreError> {
        self.store.list(filter)
    }

    /// Approved reports grouped by region, regions sorted by name.
    pub fn regions(&self) -> Result<BTreeMap<String, Vec<Report>>, StoreError> {
        let public = self.store.list(ReportFilter::approved())?;
        Ok(group_by_region(&public)
            .into_iter()
            .map(|(region, reports)| (region, reports.into_iter().cloned().collect()))
            .collect())
    }

    pub fn links(&self, report: &Report) -> ReportLinks {
        ReportLinks {
            maps: maps_search_url(&report.location),
            deep: deep_link(&self.config.public_url, &report.location, Some(&report.id)),
        }
    }

    /// Live snapshots of the reports matching `filter`.
    pub fn subscribe(&self, filter: ReportFilter) -> FeedSubscription {
        self.feed.subscribe(filter)
    }

    /// Live snapshots that also pick up writes from other processes on the
    /// same data directory, re-reading every `config.feed_poll_ms`.
    pub fn subscribe_polling(&self, filter: ReportFilter) -> FeedSubscription {
        self.feed.subscribe_polling(filter, self.config.feed_poll_interval())
    }

    // ── Site statistics ─────────────────────────────────────────────────

    /// Count one visit to the public site and return the new total.
    pub fn record_visit(&self) -> Result<u64, StoreError> {
        self.meta.increment_counter(VIEWS_COUNTER, 1)
    }

    pub fn stats(&self) -> Result<NodeStats, StoreError> {
        let all = self.store.list(ReportFilter::All)?;
        let approved = all
            .iter()
            .filter(|r| r.status == ReportStatus::Approved)
            .count();
        Ok(NodeStats {
            total: all.len(),
            in_review: all.len() - approved,
            approved,
            views: self.meta.get_counter(VIEWS_COUNTER)?,
        })
    }

    fn refresh_metrics(&self) {
        match self.stats() {
            Ok(stats) => {
                self.metrics.approved_reports.set(stats.approved as i64);
                self.metrics.in_review_reports.set(stats.in_review as i64);
            }
            Err(e) => tracing::warn!(error = %e, "could not refresh report gauges"),
        }
    }

    /// Flush LMDB pages to disk. A no-op for in-memory nodes.
    pub fn flush(&self) -> Result<(), NodeError> {
        if let Some(env) = &self.lmdb {
            env.sync()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> UnswachhNode {
        let config = NodeConfig {
            admin_password: Some("letmein".to_string()),
            ..NodeConfig::default()
        };
        UnswachhNode::in_memory(config, Collaborators::null())
    }

    #[tokio::test]
    async fn headless_node_cannot_verify_location() {
        let node = node();
        assert!(matches!(
            node.verify_location().await,
            Err(GeoError::Unsupported)
        ));
    }

    #[test]
    fn visits_are_counted() {
        let node = node();
        assert_eq!(node.record_visit().unwrap(), 1);
        assert_eq!(node.record_visit().unwrap(), 2);
        assert_eq!(node.stats().unwrap().views, 2);
    }

    #[tokio::test]
    async fn stored_password_applies_without_fixed_one() {
        let node = UnswachhNode::in_memory(NodeConfig::default(), Collaborators::null());
        assert!(node.login("rotated").await.is_err());
        node.set_admin_password("rotated").unwrap();
        assert!(node.login("rotated").await.is_ok());
        assert!(node.set_admin_password("").is_err());
    }

    #[tokio::test]
    async fn failed_logins_are_counted() {
        let node = node();
        assert!(node.login("nope").await.is_err());
        assert_eq!(
            node.metrics
                .moderation_actions
                .with_label_values(&["login_failed"])
                .get(),
            1
        );
    }
}

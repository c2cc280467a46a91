//! Publish orchestrator
//!
//! Drives one publish request through its lifecycle:
//!
//! ```text
//! CHECKING → {CREATING | OVERWRITING} → SPLICING → COMMITTING → DONE
//!                                                      ↓
//!                                               FAILED(reason)
//! ```
//!
//! Splicing is entirely in-memory: for every target document the old
//! fragment (if any) is excised before the new one is inserted, which is
//! what guarantees at most one fragment per identifier per document at
//! the moment of commit. Nothing external changes until the commit
//! phase, so an abort before it is a guaranteed no-op. Commits are
//! per-document with no cross-document transaction; a failure after the
//! first success leaves a partial-failure window, reported in the
//! outcome rather than masked.

use crate::events::{EventLog, LoggedEvent, PublishEvent};
use crate::layout::SiteLayout;
use crate::render::FragmentRenderer;
use crate::store::{ContentStore, StoreError, VersionToken};
use galleria_splice::{excise, insert_after, insertion_offset, locate, Identifier, Located};
use serde_json::Value;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

/// Terminal state of a publish operation. The intermediate phases
/// (checking, splicing, committing) are control flow inside
/// [`Publisher::publish`]; only the terminal state is exposed, alongside
/// the `created` flag and the event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishState {
    Done,
    Failed(String),
}

/// One publish request: the identifier, the opaque fields handed to the
/// renderer, the record file content, and optionally the entry to upsert
/// into the keyed record list.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub identifier: Identifier,
    pub fields: Value,
    pub record: String,
    pub list_entry: Option<Value>,
}

/// Terminal report of a publish operation. Failure is a state with a
/// reason, not an `Err`: a partially committed operation still carries
/// its event log and the list of documents that did commit.
#[derive(Debug)]
pub struct PublishOutcome {
    pub state: PublishState,
    /// Whether the identifier was previously unpublished.
    pub created: bool,
    /// Store paths committed before the operation ended, in order.
    pub committed: Vec<String>,
    pub events: Vec<LoggedEvent>,
}

impl PublishOutcome {
    pub fn succeeded(&self) -> bool {
        self.state == PublishState::Done
    }
}

/// A document mutated in memory, waiting for the commit phase.
struct PendingCommit {
    path: String,
    content: String,
    expected: Option<VersionToken>,
}

/// Coordinates store, locator/splicer and renderer for one site.
///
/// Single-writer: each publish runs start-to-finish before the next; the
/// only protection against lost updates is the store's version token,
/// passed on every commit.
pub struct Publisher<S, R> {
    store: S,
    renderer: R,
    layout: SiteLayout,
    subscribers: RwLock<Vec<mpsc::Sender<PublishEvent>>>,
}

impl<S: ContentStore, R: FragmentRenderer> Publisher<S, R> {
    pub fn new(store: S, renderer: R, layout: SiteLayout) -> Self {
        Self {
            store,
            renderer,
            layout,
            subscribers: RwLock::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Subscribe to publish events as they happen.
    pub async fn subscribe(&self) -> mpsc::Receiver<PublishEvent> {
        let (tx, rx) = mpsc::channel(100);
        self.subscribers.write().await.push(tx);
        rx
    }

    async fn emit(&self, log: &mut EventLog, event: PublishEvent) {
        log.record(event.clone());
        let subscribers = self.subscribers.read().await;
        for tx in subscribers.iter() {
            let _ = tx.send(event.clone()).await;
        }
    }

    /// Run one publish request to its terminal state.
    pub async fn publish(&self, request: PublishRequest) -> PublishOutcome {
        let mut log = EventLog::new();
        let mut committed = Vec::new();
        let mut created = false;

        match self
            .run(&request, &mut log, &mut committed, &mut created)
            .await
        {
            Ok(()) => {
                info!(identifier = %request.identifier, created, "publish complete");
                PublishOutcome {
                    state: PublishState::Done,
                    created,
                    committed,
                    events: log.into_entries(),
                }
            }
            Err(reason) => {
                warn!(identifier = %request.identifier, %reason, "publish failed");
                self.emit(
                    &mut log,
                    PublishEvent::Failed {
                        reason: reason.clone(),
                    },
                )
                .await;
                PublishOutcome {
                    state: PublishState::Failed(reason),
                    created,
                    committed,
                    events: log.into_entries(),
                }
            }
        }
    }

    async fn run(
        &self,
        request: &PublishRequest,
        log: &mut EventLog,
        committed: &mut Vec<String>,
        created: &mut bool,
    ) -> Result<(), String> {
        let id = &request.identifier;

        // CHECKING: does a record for this identifier exist?
        self.emit(
            log,
            PublishEvent::Checking {
                identifier: id.to_string(),
            },
        )
        .await;

        let record_path = self.layout.record_path(id);
        let record_token = match self.store.fetch(&record_path).await {
            Ok((_, token)) => {
                info!(identifier = %id, "record exists, overwriting");
                Some(token)
            }
            Err(StoreError::NotFound { .. }) => {
                info!(identifier = %id, "record absent, creating");
                None
            }
            Err(e) => return Err(reason_of(e)),
        };
        *created = record_token.is_none();

        // SPLICING: mutate every document in memory. Nothing has been
        // committed yet, so any error here aborts the whole operation as
        // a clean no-op.
        let mut pending = Vec::new();

        for target in &self.layout.targets {
            let (mut doc, token) = self
                .store
                .fetch(&target.path)
                .await
                .map_err(reason_of)?;

            match locate(&doc, &target.kind, id).map_err(|e| e.to_string())? {
                Located::Found(fragment) => {
                    self.emit(
                        log,
                        PublishEvent::FoundExisting {
                            identifier: id.to_string(),
                            document: target.path.clone(),
                        },
                    )
                    .await;

                    debug!(
                        identifier = %id,
                        document = %target.path,
                        start = fragment.span.start,
                        end = fragment.span.end,
                        "excising old fragment"
                    );
                    doc = excise(&doc, fragment.span);

                    self.emit(
                        log,
                        PublishEvent::RemovedOld {
                            kind: target.kind.name.clone(),
                            document: target.path.clone(),
                        },
                    )
                    .await;
                }
                Located::Absent => {
                    debug!(identifier = %id, document = %target.path, "no existing fragment");
                }
                Located::OrphanedAnchor { anchor_pos } => {
                    // Inconsistent markup: the anchor survived without
                    // its fragment. Treated as absent.
                    warn!(
                        identifier = %id,
                        document = %target.path,
                        anchor_pos,
                        "anchor found with no enclosing fragment, treating as absent"
                    );
                }
            }

            let rendered = self
                .renderer
                .render_fragment(&target.kind.name, id, &request.fields);
            let offset = insertion_offset(&doc, &target.kind).map_err(|e| e.to_string())?;
            doc = insert_after(&doc, offset, &rendered);

            self.emit(
                log,
                PublishEvent::InsertedNew {
                    kind: target.kind.name.clone(),
                    document: target.path.clone(),
                },
            )
            .await;

            pending.push(PendingCommit {
                path: target.path.clone(),
                content: doc,
                expected: Some(token),
            });
        }

        if let (Some(list_path), Some(entry)) = (&self.layout.record_list, &request.list_entry) {
            let (list_json, list_token) = match self.store.fetch(list_path).await {
                Ok((content, token)) => (content, Some(token)),
                Err(StoreError::NotFound { .. }) => ("[]".to_string(), None),
                Err(e) => return Err(reason_of(e)),
            };

            let updated = crate::records::upsert_record(&list_json, id, entry.clone())
                .map_err(|e| e.to_string())?;

            pending.push(PendingCommit {
                path: list_path.clone(),
                content: updated,
                expected: list_token,
            });
        }

        // The record file goes last: once it exists, the identifier's
        // fragments are already published, so a half-finished run still
        // looks unpublished to the next CHECKING probe.
        pending.push(PendingCommit {
            path: record_path,
            content: request.record.clone(),
            expected: record_token,
        });

        // COMMITTING: per-document, in order. A failure here after an
        // earlier success is the accepted partial-failure window; nothing
        // is unwound, the outcome reports exactly what committed.
        for commit in &pending {
            self.store
                .commit(&commit.path, &commit.content, commit.expected.as_ref())
                .await
                .map_err(reason_of)?;

            self.emit(
                log,
                PublishEvent::Committed {
                    document: commit.path.clone(),
                },
            )
            .await;
            committed.push(commit.path.clone());
        }

        Ok(())
    }
}

fn reason_of(e: StoreError) -> String {
    match e {
        StoreError::Conflict { .. } => "conflict".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{DocumentTarget, SiteLayout};
    use crate::store::MemoryStore;
    use galleria_splice::{FragmentShape, InsertionPoint, KindConfig};
    use serde_json::json;

    fn test_layout() -> SiteLayout {
        SiteLayout {
            record_dir: "metadata".to_string(),
            record_list: None,
            targets: vec![DocumentTarget {
                path: "gallery.html".to_string(),
                kind: KindConfig {
                    name: "card".to_string(),
                    opening_token: "<card>".to_string(),
                    anchor_pattern: "<id>{id}</id>".to_string(),
                    shape: FragmentShape::FixedDepth {
                        open_token: "<card>".to_string(),
                        close_token: "</card>".to_string(),
                    },
                    insertion: InsertionPoint::ContainerStart {
                        container_token: "<grid>".to_string(),
                    },
                },
            }],
        }
    }

    fn test_renderer() -> impl FragmentRenderer {
        |_kind: &str, id: &Identifier, fields: &Value| {
            format!(
                "<card><id>{id}</id><title>{}</title></card>",
                fields["title"].as_str().unwrap_or("")
            )
        }
    }

    fn request(id: &str, title: &str) -> PublishRequest {
        PublishRequest {
            identifier: Identifier::new(id),
            fields: json!({ "title": title }),
            record: format!("{{\"id\":\"{id}\"}}"),
            list_entry: None,
        }
    }

    #[tokio::test]
    async fn test_create_path_never_excises() {
        let store = MemoryStore::new();
        store.seed("gallery.html", "<grid></grid>").await;

        let publisher = Publisher::new(store, test_renderer(), test_layout());
        let outcome = publisher.publish(request("007", "First")).await;

        assert!(outcome.succeeded());
        assert!(outcome.created);
        assert!(!outcome
            .events
            .iter()
            .any(|e| matches!(e.event, PublishEvent::RemovedOld { .. })));

        let doc = publisher.store().content("gallery.html").await.unwrap();
        assert_eq!(
            doc,
            "<grid><card><id>007</id><title>First</title></card></grid>"
        );
    }

    #[tokio::test]
    async fn test_overwrite_replaces_without_duplicating() {
        let store = MemoryStore::new();
        store.seed("gallery.html", "<grid></grid>").await;

        let publisher = Publisher::new(store, test_renderer(), test_layout());
        publisher.publish(request("007", "First")).await;
        let outcome = publisher.publish(request("007", "Second")).await;

        assert!(outcome.succeeded());
        assert!(!outcome.created);

        let doc = publisher.store().content("gallery.html").await.unwrap();
        assert_eq!(doc.matches("<id>007</id>").count(), 1);
        assert!(doc.contains("<title>Second</title>"));
        assert!(!doc.contains("<title>First</title>"));
    }

    #[tokio::test]
    async fn test_republish_is_idempotent() {
        let store = MemoryStore::new();
        store.seed("gallery.html", "<grid></grid>").await;

        let publisher = Publisher::new(store, test_renderer(), test_layout());
        publisher.publish(request("007", "Same")).await;
        let once = publisher.store().content("gallery.html").await.unwrap();

        publisher.publish(request("007", "Same")).await;
        let twice = publisher.store().content("gallery.html").await.unwrap();

        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_newest_fragment_inserted_first() {
        let store = MemoryStore::new();
        store.seed("gallery.html", "<grid></grid>").await;

        let publisher = Publisher::new(store, test_renderer(), test_layout());
        publisher.publish(request("001", "Older")).await;
        publisher.publish(request("002", "Newer")).await;

        let doc = publisher.store().content("gallery.html").await.unwrap();
        let older = doc.find("<id>001</id>").unwrap();
        let newer = doc.find("<id>002</id>").unwrap();
        assert!(newer < older);
    }

    #[tokio::test]
    async fn test_malformed_document_aborts_before_commit() {
        let store = MemoryStore::new();
        // Anchor present, fragment opens, but no closing token anywhere.
        store.seed("gallery.html", "<grid><card><id>007</id>").await;

        let publisher = Publisher::new(store, test_renderer(), test_layout());
        publisher
            .store()
            .commit("metadata/007.json", "{}", None)
            .await
            .unwrap();

        let before = publisher.store().content("gallery.html").await.unwrap();
        let outcome = publisher.publish(request("007", "X")).await;

        assert!(matches!(outcome.state, PublishState::Failed(_)));
        assert!(outcome.committed.is_empty());
        // Guaranteed no-op: nothing external changed.
        let after = publisher.store().content("gallery.html").await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_with_transport_reason() {
        let store = MemoryStore::new();
        store.seed("gallery.html", "<grid></grid>").await;
        store.set_offline("metadata/007.json").await;

        let publisher = Publisher::new(store, test_renderer(), test_layout());
        let before = publisher.store().content("gallery.html").await.unwrap();

        let outcome = publisher.publish(request("007", "X")).await;

        assert_eq!(
            outcome.state,
            PublishState::Failed("store unavailable: metadata/007.json unreachable".to_string())
        );
        assert!(outcome.committed.is_empty());
        assert_eq!(
            publisher.store().content("gallery.html").await.unwrap(),
            before
        );
    }

    #[tokio::test]
    async fn test_unavailable_document_during_splicing_commits_nothing() {
        let store = MemoryStore::new();
        store.seed("gallery.html", "<grid></grid>").await;
        store.set_offline("gallery.html").await;

        let publisher = Publisher::new(store, test_renderer(), test_layout());
        let outcome = publisher.publish(request("007", "X")).await;

        assert_eq!(
            outcome.state,
            PublishState::Failed("store unavailable: gallery.html unreachable".to_string())
        );
        assert!(outcome.committed.is_empty());
        assert!(publisher
            .store()
            .content("metadata/007.json")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_orphaned_anchor_treated_as_absent() {
        let store = MemoryStore::new();
        // The anchor survived an earlier bad edit but its fragment did
        // not: no opening token precedes it.
        store.seed("gallery.html", "<grid></grid><id>007</id>").await;

        let publisher = Publisher::new(store, test_renderer(), test_layout());
        let outcome = publisher.publish(request("007", "Fresh")).await;

        assert!(outcome.succeeded());
        assert!(!outcome
            .events
            .iter()
            .any(|e| matches!(e.event, PublishEvent::RemovedOld { .. })));

        let doc = publisher.store().content("gallery.html").await.unwrap();
        assert!(doc.contains("<card><id>007</id><title>Fresh</title></card>"));
    }

    #[tokio::test]
    async fn test_missing_target_document_fails() {
        let store = MemoryStore::new();
        let publisher = Publisher::new(store, test_renderer(), test_layout());

        let outcome = publisher.publish(request("007", "X")).await;
        assert!(matches!(outcome.state, PublishState::Failed(_)));
    }

    #[tokio::test]
    async fn test_subscribers_see_events() {
        let store = MemoryStore::new();
        store.seed("gallery.html", "<grid></grid>").await;

        let publisher = Publisher::new(store, test_renderer(), test_layout());
        let mut rx = publisher.subscribe().await;

        publisher.publish(request("007", "First")).await;

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, PublishEvent::Checking { .. }));
    }
}

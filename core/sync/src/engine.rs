//! Sync orchestrator: drives one merge pass from the public space into a
//! private copy's stage.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use tandem_common::{ElementContext, Error, Id, Result, StageAction};
use tandem_store::{
    Element, ElementStageStore, ElementStore, StagedEntity, SynchronizationState,
    VersionPrivateStore, VersionPublicStore, VersionStageStore,
};

use crate::conflict::{self, PublicUpdateOutcome};
use crate::result::{ElementChange, ElementConflict, MergeResult};
use crate::tree::{self, DescriptorProbe, ExistenceProbe, SyncStateProbe};

/// Conflict predicate over the id set of a staged tree.
type TreeConflictPredicate<'a> = dyn Fn(&HashSet<Id>) -> bool + Send + Sync + 'a;
/// Publish time to stamp on a staged element.
type PublishTimeLookup<'a> = dyn Fn(&Id) -> Option<DateTime<Utc>> + Send + Sync + 'a;

/// Drives one synchronization pass of a private copy against the public
/// space.
///
/// The pass reads the public and private spaces and writes only to the stage
/// stores; every store call is awaited in sequence, so a pass is effectively
/// single-threaded. Concurrent passes over the same (item, version) are not
/// safe against each other; callers must serialize them, e.g. with a
/// per-item lock. A pass interrupted by a fatal error can simply be re-run:
/// stage writes are upserts keyed by id and converge on the same output.
pub struct SyncEngine {
    version_public: Arc<dyn VersionPublicStore>,
    version_private: Arc<dyn VersionPrivateStore>,
    version_stage: Arc<dyn VersionStageStore>,
    element_public: Arc<dyn ElementStore>,
    element_private: Arc<dyn ElementStore>,
    element_stage: Arc<dyn ElementStageStore>,
}

impl SyncEngine {
    pub fn new(
        version_public: Arc<dyn VersionPublicStore>,
        version_private: Arc<dyn VersionPrivateStore>,
        version_stage: Arc<dyn VersionStageStore>,
        element_public: Arc<dyn ElementStore>,
        element_private: Arc<dyn ElementStore>,
        element_stage: Arc<dyn ElementStageStore>,
    ) -> Self {
        Self {
            version_public,
            version_private,
            version_stage,
            element_public,
            element_private,
            element_stage,
        }
    }

    /// Bring the private copy of (item, version) up to date with whatever has
    /// been published, staging every change and flagging conflicts.
    ///
    /// Returns an empty result without touching the stage stores when the
    /// private copy already carries the public publish time.
    pub async fn sync(&self, item_id: &Id, version_id: &Id) -> Result<MergeResult> {
        let public_version_state = self
            .version_public
            .get_synchronization_state(item_id, version_id)
            .await?
            .ok_or_else(|| Error::NonExistingVersion {
                item_id: item_id.clone(),
                version_id: version_id.clone(),
            })?;

        let publish_time = public_version_state.publish_time;

        let private_version_state = self
            .version_private
            .get_synchronization_state(item_id, version_id)
            .await?;

        let mut result = MergeResult::default();
        if let Some(private_state) = &private_version_state {
            if private_state.publish_time == publish_time {
                debug!(%item_id, %version_id, "private copy already in sync");
                return Ok(result);
            }
        }

        info!(%item_id, %version_id, "syncing private copy with public space");

        self.sync_version(
            item_id,
            version_id,
            publish_time,
            private_version_state.is_some(),
            &mut result,
        )
        .await?;

        let context = ElementContext::new(
            item_id.clone(),
            version_id.clone(),
            public_version_state.revision_id.clone(),
        );
        self.sync_elements(
            &context,
            private_version_state.and_then(|state| state.publish_time),
            &mut result,
        )
        .await?;

        info!(
            %item_id,
            %version_id,
            changes = result.change.elements.len(),
            conflicts = result.conflict.elements.len(),
            "sync pass staged"
        );
        Ok(result)
    }

    async fn sync_version(
        &self,
        item_id: &Id,
        version_id: &Id,
        publish_time: Option<DateTime<Utc>>,
        exists_on_private: bool,
        result: &mut MergeResult,
    ) -> Result<()> {
        let staged = if exists_on_private {
            StagedEntity::new(version_id.clone(), None, publish_time, StageAction::Update, false)
        } else {
            let version = self
                .version_public
                .get(item_id, version_id)
                .await?
                .ok_or_else(|| Error::NonExistingVersion {
                    item_id: item_id.clone(),
                    version_id: version_id.clone(),
                })?;
            StagedEntity::new(
                version_id.clone(),
                Some(version),
                publish_time,
                StageAction::Create,
                false,
            )
        };
        result.change.version_action = Some(staged.action);
        self.version_stage.create(item_id, staged).await
    }

    async fn sync_elements(
        &self,
        context: &ElementContext,
        previous_publish_time: Option<DateTime<Utc>>,
        result: &mut MergeResult,
    ) -> Result<()> {
        let public_states = self
            .element_public
            .list_synchronization_states(context)
            .await?;
        let private_states = self
            .element_private
            .list_synchronization_states(context)
            .await?;

        let public_by_id = index_by_id(&public_states);
        let private_by_id = index_by_id(&private_states);

        // No watermark means a first sync: everything public counts as new.
        let updated_public_states: Vec<&SynchronizationState> = match previous_publish_time {
            None => public_states.iter().collect(),
            Some(watermark) => public_states
                .iter()
                .filter(|state| state.publish_time.is_some_and(|time| time > watermark))
                .collect(),
        };

        self.sync_public_updated_elements(
            context,
            &updated_public_states,
            &public_by_id,
            &private_by_id,
            result,
        )
        .await?;

        let unpublished_private_states: Vec<&SynchronizationState> = private_states
            .iter()
            .filter(|state| {
                state.publish_time.is_some() && !public_by_id.contains_key(&state.id)
            })
            .collect();

        self.sync_public_deleted_elements(
            context,
            &unpublished_private_states,
            &public_by_id,
            &private_by_id,
            result,
        )
        .await
    }

    async fn sync_public_updated_elements(
        &self,
        context: &ElementContext,
        updated_public_states: &[&SynchronizationState],
        public_by_id: &HashMap<Id, SynchronizationState>,
        private_by_id: &HashMap<Id, SynchronizationState>,
        result: &mut MergeResult,
    ) -> Result<()> {
        let mut staged_ids: HashSet<Id> = HashSet::new();
        for public_state in updated_public_states {
            if staged_ids.contains(&public_state.id) {
                continue;
            }

            let public_element = self
                .element_public
                .get(context, &public_state.id)
                .await?
                .ok_or_else(|| Error::SyncStateWithoutElement {
                    item_id: context.item_id.clone(),
                    version_id: context.version_id.clone(),
                    element_id: public_state.id.clone(),
                })?;

            let private_state = private_by_id.get(&public_state.id);
            let private_element = match private_state {
                Some(state) if state.dirty => {
                    self.element_private.get(context, &public_state.id).await?
                }
                _ => None,
            };

            match conflict::classify_public_update(
                private_state,
                private_element.as_ref(),
                &public_element,
            ) {
                PublicUpdateOutcome::Update { conflicted } => {
                    self.stage_element(
                        context,
                        public_state.id.clone(),
                        Some(public_element),
                        public_state.publish_time,
                        StageAction::Update,
                        conflicted,
                        BTreeSet::new(),
                        result,
                    )
                    .await?;
                    staged_ids.insert(public_state.id.clone());
                }
                PublicUpdateOutcome::CreateTree => {
                    let tree_ids = self
                        .stage_public_element_tree(
                            context,
                            public_element,
                            public_by_id,
                            &|ids| conflict::contains_dirty(ids, private_by_id),
                            result,
                        )
                        .await?;
                    staged_ids.extend(tree_ids);
                }
                PublicUpdateOutcome::RecreateDeleted => {
                    let tree_ids = self
                        .stage_public_element_tree(
                            context,
                            public_element,
                            public_by_id,
                            &|_| true,
                            result,
                        )
                        .await?;
                    staged_ids.extend(tree_ids);
                }
            }
        }
        Ok(())
    }

    async fn sync_public_deleted_elements(
        &self,
        context: &ElementContext,
        unpublished_private_states: &[&SynchronizationState],
        public_by_id: &HashMap<Id, SynchronizationState>,
        private_by_id: &HashMap<Id, SynchronizationState>,
        result: &mut MergeResult,
    ) -> Result<()> {
        let mut staged_ids: HashSet<Id> = HashSet::new();
        for private_state in unpublished_private_states {
            if staged_ids.contains(&private_state.id) {
                continue;
            }

            match self.element_private.get(context, &private_state.id).await? {
                None => {
                    // Gone from both sides; the stage entry only needs the id.
                    self.stage_element(
                        context,
                        private_state.id.clone(),
                        None,
                        None,
                        StageAction::Delete,
                        false,
                        BTreeSet::new(),
                        result,
                    )
                    .await?;
                    staged_ids.insert(private_state.id.clone());
                }
                Some(private_element) => {
                    let opposite = SyncStateProbe {
                        states: public_by_id,
                    };
                    let tree_ids = self
                        .stage_element_tree(
                            context,
                            private_element,
                            self.element_private.as_ref(),
                            &opposite,
                            &|ids| conflict::contains_dirty(ids, private_by_id),
                            &|_| None,
                            StageAction::Delete,
                            result,
                        )
                        .await?;
                    staged_ids.extend(tree_ids);
                }
            }
        }
        Ok(())
    }

    /// Stage a public-side change tree with action CREATE; the opposite side
    /// is the private space, probed through element descriptors.
    async fn stage_public_element_tree(
        &self,
        context: &ElementContext,
        element: Element,
        public_by_id: &HashMap<Id, SynchronizationState>,
        is_tree_conflicted: &TreeConflictPredicate<'_>,
        result: &mut MergeResult,
    ) -> Result<HashSet<Id>> {
        let opposite = DescriptorProbe {
            store: self.element_private.as_ref(),
            context,
        };
        self.stage_element_tree(
            context,
            element,
            self.element_public.as_ref(),
            &opposite,
            is_tree_conflicted,
            &|element_id| {
                public_by_id
                    .get(element_id)
                    .and_then(|state| state.publish_time)
            },
            StageAction::Create,
            result,
        )
        .await
    }

    /// Shared subtree staging: find the anchor, stage every descendant, then
    /// stage the anchor with the aggregated conflict verdict. Returns the
    /// full id set for the caller's already-staged bookkeeping.
    #[allow(clippy::too_many_arguments)]
    async fn stage_element_tree(
        &self,
        context: &ElementContext,
        element: Element,
        store: &dyn ElementStore,
        opposite: &dyn ExistenceProbe,
        is_tree_conflicted: &TreeConflictPredicate<'_>,
        publish_time_of: &PublishTimeLookup<'_>,
        action: StageAction,
        result: &mut MergeResult,
    ) -> Result<HashSet<Id>> {
        let anchor = tree::find_change_root(store, context, opposite, element).await?;
        let descendants = tree::collect_descendants(store, context, &anchor, action).await?;

        let mut tree_ids: HashSet<Id> = HashSet::new();
        tree_ids.insert(anchor.id.clone());
        let mut descendant_ids: BTreeSet<Id> = BTreeSet::new();
        for descendant in &descendants {
            tree_ids.insert(descendant.id.clone());
            descendant_ids.insert(descendant.id.clone());
        }

        for descendant in descendants {
            let publish_time = publish_time_of(&descendant.id);
            self.stage_element(
                context,
                descendant.id.clone(),
                Some(descendant),
                publish_time,
                action,
                false,
                BTreeSet::new(),
                result,
            )
            .await?;
        }

        let conflicted = is_tree_conflicted(&tree_ids);
        let publish_time = publish_time_of(&anchor.id);
        self.stage_element(
            context,
            anchor.id.clone(),
            Some(anchor),
            publish_time,
            action,
            conflicted,
            if conflicted {
                descendant_ids
            } else {
                BTreeSet::new()
            },
            result,
        )
        .await?;

        Ok(tree_ids)
    }

    #[allow(clippy::too_many_arguments)]
    async fn stage_element(
        &self,
        context: &ElementContext,
        element_id: Id,
        element: Option<Element>,
        publish_time: Option<DateTime<Utc>>,
        action: StageAction,
        conflicted: bool,
        conflict_dependents: BTreeSet<Id>,
        result: &mut MergeResult,
    ) -> Result<()> {
        debug!(element = %element_id, %action, conflicted, "staging element");

        result.change.record(ElementChange {
            element_id: element_id.clone(),
            action,
        });
        if conflicted {
            result.conflict.record(ElementConflict {
                element_id: element_id.clone(),
                action,
                dependents: conflict_dependents.clone(),
            });
        } else {
            result.conflict.clear(&element_id);
        }

        let staged = StagedEntity::new(element_id, element, publish_time, action, conflicted)
            .with_conflict_dependents(conflict_dependents);
        self.element_stage.create(context, staged).await
    }
}

fn index_by_id(states: &[SynchronizationState]) -> HashMap<Id, SynchronizationState> {
    states
        .iter()
        .map(|state| (state.id.clone(), state.clone()))
        .collect()
}

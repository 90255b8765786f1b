//! Trees held by this side of the connection and this side's view of the
//! trees the host holds.
//!
//! `local` is the latest version of every tree, `remote` the version the
//! host was last sent or last sent us. A transfer in either direction is a
//! delta against `remote`, and once it completes both maps agree.

use std::collections::{HashMap, VecDeque};

use rewrite_core::rpc::{LocalRefs, ReceiveQueue, RemoteRefs, RpcObjectData, SendQueue};
use rewrite_core::RpcResult;
use rewrite_python_lst::tree::SourceFile;

use crate::error::{ServerError, ServerResult};

#[derive(Debug, Default)]
pub(crate) struct ObjectStore {
    local: HashMap<String, SourceFile>,
    remote: HashMap<String, SourceFile>,
    local_refs: LocalRefs,
    pub(crate) remote_refs: RemoteRefs,
    /// Batches of an outgoing transfer the host has not pulled yet.
    pending: HashMap<String, VecDeque<Vec<RpcObjectData>>>,
}

impl ObjectStore {
    pub(crate) fn get(&self, id: &str) -> Option<&SourceFile> {
        self.local.get(id)
    }

    /// Stores a tree produced on this side, returning its id.
    pub(crate) fn insert(&mut self, source: SourceFile) -> String {
        let id = source.id().to_string();
        self.local.insert(id.clone(), source);
        id
    }

    /// Replaces the tree stored under `id`; `None` deletes it.
    pub(crate) fn update(&mut self, id: &str, source: Option<SourceFile>) {
        match source {
            Some(source) => {
                self.local.insert(id.to_string(), source);
            }
            None => {
                self.local.remove(id);
            }
        }
    }

    /// The host's copy of `id` as last exchanged.
    pub(crate) fn remote(&self, id: &str) -> Option<&SourceFile> {
        self.remote.get(id)
    }

    /// Records a tree received from the host as both the latest version
    /// and the host's version.
    pub(crate) fn received(&mut self, id: &str, source: Option<SourceFile>) {
        match &source {
            Some(source) => {
                self.remote.insert(id.to_string(), source.clone());
            }
            None => {
                self.remote.remove(id);
            }
        }
        self.update(id, source);
    }

    /// The next batch of the transfer of `id` to the host.
    ///
    /// The first call diffs the local tree against the host's copy and
    /// splits the records into batches of `batch_size`; the call that hands
    /// out the last batch, which ends with `END_OF_OBJECT`, marks the host's
    /// copy as current.
    pub(crate) fn next_batch(
        &mut self,
        id: &str,
        batch_size: usize,
        trace: bool,
    ) -> ServerResult<Vec<RpcObjectData>> {
        if !self.pending.contains_key(id) {
            let after = self.local.get(id);
            let before = self.remote.get(id);
            if after.is_none() && before.is_none() {
                return Err(ServerError::UnknownObject(id.to_string()));
            }
            let mut q = SendQueue::new(&mut self.local_refs).with_trace(trace);
            q.send(after, before)?;
            let batches = q
                .finish()
                .chunks(batch_size.max(1))
                .map(<[RpcObjectData]>::to_vec)
                .collect();
            self.pending.insert(id.to_string(), batches);
        }

        let batches = self
            .pending
            .get_mut(id)
            .ok_or_else(|| ServerError::UnknownObject(id.to_string()))?;
        let batch = batches.pop_front().unwrap_or_default();
        if batches.is_empty() {
            self.pending.remove(id);
            match self.local.get(id) {
                Some(source) => {
                    self.remote.insert(id.to_string(), source.clone());
                }
                None => {
                    self.remote.remove(id);
                }
            }
        }
        Ok(batch)
    }

    /// Rebuilds the host's version of `id` from `first` and the batches
    /// `pull` supplies.
    pub(crate) fn receive(
        &mut self,
        id: &str,
        first: Vec<RpcObjectData>,
        pull: &mut dyn FnMut() -> RpcResult<Vec<RpcObjectData>>,
    ) -> ServerResult<Option<SourceFile>> {
        let before = self.remote.get(id).cloned();
        let received = {
            let mut q = ReceiveQueue::with_source(first, &mut self.remote_refs, pull);
            let received = q.receive(before)?;
            q.expect_end_of_object()?;
            received
        };
        self.received(id, received.clone());
        Ok(received)
    }

    pub(crate) fn len(&self) -> usize {
        self.local.len()
    }

    /// Forgets every tree and interned reference.
    pub(crate) fn clear(&mut self) {
        self.local.clear();
        self.remote.clear();
        self.local_refs.clear();
        self.remote_refs.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewrite_core::rpc::State;
    use rewrite_python_lst::{parse_source, print};

    #[test]
    fn transfer_completes_after_the_last_batch() {
        let mut store = ObjectStore::default();
        let id = store.insert(parse_source("a.py", "x = 1\n"));

        let mut batches = Vec::new();
        loop {
            let batch = store.next_batch(&id, 4, false).unwrap();
            let done = batch.last().map(|data| data.state) == Some(State::EndOfObject);
            batches.push(batch);
            if done {
                break;
            }
            assert!(store.remote(&id).is_none());
        }
        assert!(batches.len() > 1);
        assert!(batches.iter().all(|batch| batch.len() <= 4));
        assert!(store.remote(&id).is_some());

        // Nothing changed since, so the next transfer is a single NO_CHANGE.
        let again = store.next_batch(&id, 4, false).unwrap();
        let states: Vec<State> = again.iter().map(|data| data.state).collect();
        assert_eq!(states, vec![State::NoChange, State::EndOfObject]);
    }

    #[test]
    fn received_trees_become_current_on_both_sides() {
        let mut sender = ObjectStore::default();
        let id = sender.insert(parse_source("b.py", "def f():\n    return 1\n"));
        let records = sender.next_batch(&id, 10_000, false).unwrap();

        let mut receiver = ObjectStore::default();
        let mut pull = || -> RpcResult<Vec<RpcObjectData>> { Ok(Vec::new()) };
        let received = receiver.receive(&id, records, &mut pull).unwrap().unwrap();
        assert_eq!(print(&received), "def f():\n    return 1\n");
        assert!(receiver.get(&id).is_some());
        assert!(receiver.remote(&id).is_some());
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut store = ObjectStore::default();
        let err = store.next_batch("nope", 10, false).unwrap_err();
        assert!(matches!(err, ServerError::UnknownObject(id) if id == "nope"));
    }
}

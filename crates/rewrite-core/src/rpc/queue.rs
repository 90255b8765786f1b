//! Send and receive queues for the delta protocol.
//!
//! A sender walks the fields of `after` in declared order, comparing each
//! against the same field of the remembered `before`, and appends one
//! [`RpcObjectData`] per field. A receiver consumes the records in the same
//! order and rebuilds `after` from its own copy of `before`. Codecs on both
//! sides call [`SendQueue::send`] / [`ReceiveQueue::receive`] (or the list
//! variants) in exactly matching order; any asymmetry surfaces as
//! [`RpcError::Desync`] or [`RpcError::CodecMismatch`].

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use serde_json::Value;

use crate::error::{RpcError, RpcResult};
use crate::identity::Identity;
use crate::rpc::object_data::{RpcObjectData, State};

/// A value that can travel through the delta protocol.
///
/// Objects (anything with a [`value_type`](RpcValue::value_type)) are sent as
/// a header record followed by their fields; primitives travel inline in the
/// record's `value`.
pub trait RpcValue: Identity + Clone + 'static {
    /// Wire type name used to construct the value on the receiving side.
    /// `None` marks a primitive that is inlined.
    fn value_type(&self) -> Option<&'static str> {
        None
    }

    /// Whether `before` can be diffed field-by-field against `self`.
    /// A kind change is sent as a fresh `ADD`.
    fn same_kind(&self, _other: &Self) -> bool {
        true
    }

    /// Stable id used to reconcile list elements.
    fn list_id(&self) -> Option<String> {
        None
    }

    /// Key under which the value is interned; interned values are sent once
    /// per connection and referenced afterwards.
    fn ref_key(&self) -> Option<String> {
        None
    }

    /// Sends the fields of an object. `before` is `None` for an `ADD`.
    fn send_fields(&self, _before: Option<&Self>, _q: &mut SendQueue<'_>) -> RpcResult<()> {
        Ok(())
    }

    /// Inline encoding of a primitive.
    fn to_wire(&self) -> Value {
        Value::Null
    }

    /// Builds a value from an `ADD` record (and the fields that follow it).
    fn receive_new(message: &RpcObjectData, q: &mut ReceiveQueue<'_>) -> RpcResult<Self>;

    /// Applies a `CHANGE` record (and the fields that follow it) to `before`.
    fn receive_change(
        before: Self,
        message: &RpcObjectData,
        q: &mut ReceiveQueue<'_>,
    ) -> RpcResult<Self>;
}

/// How a struct field is transmitted: single values, optional values and
/// lists each take a different path through the queue.
pub trait RpcField: Sized {
    fn send_field(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()>;
    fn receive_field(before: Option<&Self>, q: &mut ReceiveQueue<'_>) -> RpcResult<Self>;
}

impl<T: RpcValue> RpcField for Option<T> {
    fn send_field(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()> {
        q.send(self.as_ref(), before.and_then(Option::as_ref))
    }

    fn receive_field(before: Option<&Self>, q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        q.receive(before.cloned().flatten())
    }
}

impl<T: RpcValue> RpcField for Vec<T> {
    fn send_field(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()> {
        q.send_list(Some(self), before.map(Vec::as_slice))
    }

    fn receive_field(before: Option<&Self>, q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        q.receive_list(before.cloned())?
            .ok_or_else(|| RpcError::desync("a required list was deleted"))
    }
}

/// A tree object shared behind an `Rc`.
///
/// Tree nodes implement this instead of [`RpcValue`] directly; the blanket
/// impls below give every `Rc<T>` pointer identity for diffing and the
/// object's id for list reconciliation.
pub trait RpcObject: Sized + 'static {
    /// Wire type name sent in the `ADD` header.
    const VALUE_TYPE: &'static str;

    fn object_id(&self) -> String;

    fn send_object(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()>;

    fn receive_object(before: Option<&Self>, q: &mut ReceiveQueue<'_>) -> RpcResult<Self>;
}

impl<T: RpcObject> RpcValue for Rc<T> {
    fn value_type(&self) -> Option<&'static str> {
        Some(T::VALUE_TYPE)
    }

    fn list_id(&self) -> Option<String> {
        Some(self.object_id())
    }

    fn send_fields(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()> {
        self.send_object(before.map(|b| &**b), q)
    }

    fn receive_new(message: &RpcObjectData, q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        match message.value_type.as_deref() {
            Some(found) if found == T::VALUE_TYPE => T::receive_object(None, q).map(Rc::new),
            found => Err(RpcError::CodecMismatch {
                expected: T::VALUE_TYPE.to_string(),
                found: found.unwrap_or("<none>").to_string(),
            }),
        }
    }

    fn receive_change(
        before: Self,
        _message: &RpcObjectData,
        q: &mut ReceiveQueue<'_>,
    ) -> RpcResult<Self> {
        T::receive_object(Some(&before), q).map(Rc::new)
    }
}

impl<T: RpcObject> RpcField for Rc<T> {
    fn send_field(&self, before: Option<&Self>, q: &mut SendQueue<'_>) -> RpcResult<()> {
        q.send(Some(self), before)
    }

    fn receive_field(before: Option<&Self>, q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        q.receive(before.cloned())?
            .ok_or_else(|| RpcError::desync(format!("a required {} was deleted", T::VALUE_TYPE)))
    }
}

/// Implements [`RpcField`] for types that are sent as one required value.
#[macro_export]
macro_rules! rpc_required_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::rpc::RpcField for $ty {
                fn send_field(
                    &self,
                    before: Option<&Self>,
                    q: &mut $crate::rpc::SendQueue<'_>,
                ) -> $crate::error::RpcResult<()> {
                    q.send(Some(self), before)
                }

                fn receive_field(
                    before: Option<&Self>,
                    q: &mut $crate::rpc::ReceiveQueue<'_>,
                ) -> $crate::error::RpcResult<Self> {
                    q.receive(before.cloned())?.ok_or_else(|| {
                        $crate::error::RpcError::desync(concat!(
                            "a required ",
                            stringify!($ty),
                            " was deleted"
                        ))
                    })
                }
            }
        )*
    };
}

// ============================================================================
// Reference tables
// ============================================================================

/// Sender-side interning table: keys of values already sent to the peer.
#[derive(Debug, Default)]
pub struct LocalRefs {
    ids: HashMap<String, u32>,
    next: u32,
}

impl LocalRefs {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.next = 0;
    }
}

/// Receiver-side interning table: values the peer has assigned ref ids to.
#[derive(Default)]
pub struct RemoteRefs {
    values: HashMap<u32, Box<dyn Any>>,
}

impl RemoteRefs {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl std::fmt::Debug for RemoteRefs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteRefs")
            .field("len", &self.values.len())
            .finish()
    }
}

// ============================================================================
// Send queue
// ============================================================================

/// Accumulates the delta records for one object.
pub struct SendQueue<'a> {
    out: Vec<RpcObjectData>,
    refs: &'a mut LocalRefs,
    trace: bool,
}

impl<'a> SendQueue<'a> {
    pub fn new(refs: &'a mut LocalRefs) -> Self {
        SendQueue {
            out: Vec::new(),
            refs,
            trace: false,
        }
    }

    /// Tags every record with the Rust type that produced it.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    fn put<T>(&mut self, mut data: RpcObjectData) {
        if self.trace {
            data.trace = Some(std::any::type_name::<T>().to_string());
        }
        self.out.push(data);
    }

    /// Sends one value relative to `before`.
    pub fn send<T: RpcValue>(&mut self, after: Option<&T>, before: Option<&T>) -> RpcResult<()> {
        match (after, before) {
            (None, None) => {
                self.put::<T>(RpcObjectData::new(State::NoChange));
                Ok(())
            }
            (None, Some(_)) => {
                self.put::<T>(RpcObjectData::new(State::Delete));
                Ok(())
            }
            (Some(after), Some(before)) if after.is_identical(before) => {
                self.put::<T>(RpcObjectData::new(State::NoChange));
                Ok(())
            }
            (Some(after), Some(before)) if after.same_kind(before) => self.change(after, before),
            (Some(after), _) => self.add(after),
        }
    }

    fn add<T: RpcValue>(&mut self, after: &T) -> RpcResult<()> {
        let mut header = RpcObjectData::new(State::Add);
        if let Some(key) = after.ref_key() {
            if let Some(&id) = self.refs.ids.get(&key) {
                self.put::<T>(header.with_ref(id));
                return Ok(());
            }
            let id = self.refs.next;
            self.refs.next += 1;
            self.refs.ids.insert(key, id);
            header = header.with_ref(id);
        }
        match after.value_type() {
            Some(value_type) => {
                self.put::<T>(header.with_value_type(value_type));
                after.send_fields(None, self)
            }
            None => {
                self.put::<T>(header.with_value(after.to_wire()));
                Ok(())
            }
        }
    }

    fn change<T: RpcValue>(&mut self, after: &T, before: &T) -> RpcResult<()> {
        match after.value_type() {
            Some(_) => {
                self.put::<T>(RpcObjectData::new(State::Change));
                after.send_fields(Some(before), self)
            }
            None => {
                self.put::<T>(RpcObjectData::new(State::Change).with_value(after.to_wire()));
                Ok(())
            }
        }
    }

    /// Sends a list: a header, a positions array mapping every element of
    /// `after` to its index in `before` (or `-1`), then one delta per element.
    pub fn send_list<T: RpcValue>(
        &mut self,
        after: Option<&[T]>,
        before: Option<&[T]>,
    ) -> RpcResult<()> {
        let after = match (after, before) {
            (None, None) => {
                self.put::<Vec<T>>(RpcObjectData::new(State::NoChange));
                return Ok(());
            }
            (None, Some(_)) => {
                self.put::<Vec<T>>(RpcObjectData::new(State::Delete));
                return Ok(());
            }
            (Some(after), Some(before))
                if after.len() == before.len()
                    && after.iter().zip(before).all(|(a, b)| a.is_identical(b)) =>
            {
                self.put::<Vec<T>>(RpcObjectData::new(State::NoChange));
                return Ok(());
            }
            (Some(after), _) => after,
        };

        let state = if before.is_some() {
            State::Change
        } else {
            State::Add
        };
        self.put::<Vec<T>>(RpcObjectData::new(state));

        let positions = list_positions(after, before);
        self.put::<Vec<T>>(
            RpcObjectData::new(State::Change)
                .with_value(Value::Array(positions.iter().map(|p| Value::from(*p)).collect())),
        );
        for (element, position) in after.iter().zip(&positions) {
            let before_element = before.and_then(|b| usize::try_from(*position).ok().map(|i| &b[i]));
            self.send(Some(element), before_element)?;
        }
        Ok(())
    }

    /// Appends `END_OF_OBJECT` and returns the accumulated records.
    pub fn finish(mut self) -> Vec<RpcObjectData> {
        self.out.push(RpcObjectData::new(State::EndOfObject));
        self.out
    }

    /// Records accumulated so far, without the terminator.
    pub fn into_records(self) -> Vec<RpcObjectData> {
        self.out
    }
}

fn list_positions<T: RpcValue>(after: &[T], before: Option<&[T]>) -> Vec<i64> {
    let Some(before) = before else {
        return vec![-1; after.len()];
    };
    let index: HashMap<String, usize> = before
        .iter()
        .enumerate()
        .filter_map(|(i, b)| b.list_id().map(|id| (id, i)))
        .collect();
    after
        .iter()
        .map(|a| {
            a.list_id()
                .and_then(|id| index.get(&id))
                .map(|&i| i as i64)
                .unwrap_or(-1)
        })
        .collect()
}

// ============================================================================
// Receive queue
// ============================================================================

/// Source of further batches when a large object spans several messages.
pub type BatchSource<'a> = dyn FnMut() -> RpcResult<Vec<RpcObjectData>> + 'a;

/// Consumes delta records and rebuilds values.
pub struct ReceiveQueue<'a> {
    buffer: VecDeque<RpcObjectData>,
    pull: Option<&'a mut BatchSource<'a>>,
    refs: &'a mut RemoteRefs,
}

impl<'a> ReceiveQueue<'a> {
    pub fn new(records: Vec<RpcObjectData>, refs: &'a mut RemoteRefs) -> Self {
        ReceiveQueue {
            buffer: records.into(),
            pull: None,
            refs,
        }
    }

    /// A queue that asks `pull` for another batch whenever it runs dry.
    pub fn with_source(
        records: Vec<RpcObjectData>,
        refs: &'a mut RemoteRefs,
        pull: &'a mut BatchSource<'a>,
    ) -> Self {
        ReceiveQueue {
            buffer: records.into(),
            pull: Some(pull),
            refs,
        }
    }

    /// Takes the next record, pulling a new batch if needed.
    pub fn take(&mut self) -> RpcResult<RpcObjectData> {
        loop {
            if let Some(next) = self.buffer.pop_front() {
                return Ok(next);
            }
            match self.pull.as_mut() {
                Some(pull) => {
                    let batch = pull()?;
                    if batch.is_empty() {
                        return Err(RpcError::desync("peer sent an empty batch mid-object"));
                    }
                    self.buffer.extend(batch);
                }
                None => return Err(RpcError::desync("ran out of records mid-object")),
            }
        }
    }

    /// Receives one value relative to `before`.
    pub fn receive<T: RpcValue>(&mut self, before: Option<T>) -> RpcResult<Option<T>> {
        let message = self.take()?;
        match message.state {
            State::NoChange => Ok(before),
            State::Delete => Ok(None),
            State::Add => {
                if message.is_ref_only() {
                    let id = message.reference.unwrap_or_default();
                    return self
                        .refs
                        .values
                        .get(&id)
                        .and_then(|v| v.downcast_ref::<T>())
                        .cloned()
                        .map(Some)
                        .ok_or_else(|| RpcError::desync(format!("unknown ref {id}")));
                }
                let value = T::receive_new(&message, self)?;
                if let Some(id) = message.reference {
                    self.refs.values.insert(id, Box::new(value.clone()));
                }
                Ok(Some(value))
            }
            State::Change => {
                let before = before.ok_or_else(|| {
                    RpcError::desync(format!(
                        "CHANGE for {} without a before value",
                        std::any::type_name::<T>()
                    ))
                })?;
                T::receive_change(before, &message, self).map(Some)
            }
            State::EndOfObject => Err(RpcError::desync("unexpected END_OF_OBJECT inside an object")),
        }
    }

    /// Receives a list sent by [`SendQueue::send_list`].
    pub fn receive_list<T: RpcValue>(&mut self, before: Option<Vec<T>>) -> RpcResult<Option<Vec<T>>> {
        let header = self.take()?;
        let before = match header.state {
            State::NoChange => return Ok(before),
            State::Delete => return Ok(None),
            State::Add => Vec::new(),
            State::Change => before.unwrap_or_default(),
            State::EndOfObject => {
                return Err(RpcError::desync("unexpected END_OF_OBJECT at a list header"))
            }
        };
        let positions = self.take()?;
        let positions = match (positions.state, positions.value) {
            (State::Change, Some(Value::Array(items))) => items,
            (state, _) => {
                return Err(RpcError::desync(format!(
                    "expected a positions array, found {state:?}"
                )))
            }
        };
        let mut after = Vec::with_capacity(positions.len());
        for position in positions {
            let position = position
                .as_i64()
                .ok_or_else(|| RpcError::desync("non-integer list position"))?;
            let before_element = if position >= 0 {
                let element = before.get(position as usize).cloned().ok_or_else(|| {
                    RpcError::desync(format!("list position {position} out of range"))
                })?;
                Some(element)
            } else {
                None
            };
            let element = self
                .receive(before_element)?
                .ok_or_else(|| RpcError::desync("list element was deleted"))?;
            after.push(element);
        }
        Ok(Some(after))
    }

    /// Consumes the `END_OF_OBJECT` that closes a top-level object.
    pub fn expect_end_of_object(&mut self) -> RpcResult<()> {
        let message = self.take()?;
        if message.state == State::EndOfObject {
            Ok(())
        } else {
            Err(RpcError::desync(format!(
                "expected END_OF_OBJECT, found {:?}",
                message.state
            )))
        }
    }
}

// ============================================================================
// Primitive codecs
// ============================================================================

fn primitive_value(message: &RpcObjectData) -> RpcResult<&Value> {
    message
        .value
        .as_ref()
        .ok_or_else(|| RpcError::desync("primitive record without a value"))
}

fn mismatch(expected: &str, found: &Value) -> RpcError {
    RpcError::CodecMismatch {
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

impl RpcValue for String {
    fn to_wire(&self) -> Value {
        Value::String(self.clone())
    }

    fn list_id(&self) -> Option<String> {
        Some(self.clone())
    }

    fn receive_new(message: &RpcObjectData, _q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        let value = primitive_value(message)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch("string", value))
    }

    fn receive_change(
        _before: Self,
        message: &RpcObjectData,
        q: &mut ReceiveQueue<'_>,
    ) -> RpcResult<Self> {
        Self::receive_new(message, q)
    }
}

impl RpcValue for bool {
    fn to_wire(&self) -> Value {
        Value::Bool(*self)
    }

    fn receive_new(message: &RpcObjectData, _q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        let value = primitive_value(message)?;
        value.as_bool().ok_or_else(|| mismatch("boolean", value))
    }

    fn receive_change(
        _before: Self,
        message: &RpcObjectData,
        q: &mut ReceiveQueue<'_>,
    ) -> RpcResult<Self> {
        Self::receive_new(message, q)
    }
}

impl RpcValue for i64 {
    fn to_wire(&self) -> Value {
        Value::from(*self)
    }

    fn receive_new(message: &RpcObjectData, _q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        let value = primitive_value(message)?;
        value.as_i64().ok_or_else(|| mismatch("integer", value))
    }

    fn receive_change(
        _before: Self,
        message: &RpcObjectData,
        q: &mut ReceiveQueue<'_>,
    ) -> RpcResult<Self> {
        Self::receive_new(message, q)
    }
}

impl RpcValue for uuid::Uuid {
    fn to_wire(&self) -> Value {
        Value::String(self.to_string())
    }

    fn receive_new(message: &RpcObjectData, _q: &mut ReceiveQueue<'_>) -> RpcResult<Self> {
        let value = primitive_value(message)?;
        value
            .as_str()
            .and_then(|s| uuid::Uuid::parse_str(s).ok())
            .ok_or_else(|| mismatch("uuid", value))
    }

    fn receive_change(
        _before: Self,
        message: &RpcObjectData,
        q: &mut ReceiveQueue<'_>,
    ) -> RpcResult<Self> {
        Self::receive_new(message, q)
    }
}

crate::rpc_required_field!(String, bool, i64, uuid::Uuid);

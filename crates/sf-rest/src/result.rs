//! Record sets: lazy, cached, transparently paginated query results.
//!
//! A [`RecordSet`] wraps one decoded response page. Records are built from
//! the raw payloads only when iteration reaches them, and the next page is
//! fetched only when iteration runs off the end of this one.
//!
//! ```text
//!  RecordSet (page 1)             RecordSet (page 2)
//!  ┌─────────────────────┐        ┌─────────────────────┐
//!  │ body.records  [..]  │        │ body.records  [..]  │
//!  │ cache  Option<Vec>  │  next  │ cache  Option<Vec>  │  next
//!  │ next   OnceCell ────────────►│ next   OnceCell ────────────► None
//!  └─────────────────────┘ fetch  └─────────────────────┘
//!            ▲            (nextRecordsUrl)
//!            │
//!        Records iterator walks page 1, then page 2, ...
//! ```
//!
//! The cache of a page is stored only once every record of that page has
//! been built; an iteration that stops early, or fails, leaves it empty.

use std::cell::{OnceCell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{Error, ErrorKind, Result, ResultError};
use crate::record::{FieldValue, Record};
use crate::schema::{RecordSchema, TypeMap, ID_FIELD};

/// Fetches the page behind a `nextRecordsUrl`.
pub type PageFetcher = Arc<dyn Fn(&str) -> Result<RecordSet> + Send + Sync>;

/// One page of records plus the state needed to walk the rest.
#[derive(Clone)]
pub struct RecordSet {
    body: Value,
    types: Arc<TypeMap>,
    fetch: Option<PageFetcher>,
    schema: Arc<RecordSchema>,
    cache: RefCell<Option<Vec<Record>>>,
    next: OnceCell<Option<Box<RecordSet>>>,
}

impl RecordSet {
    /// Wrap a decoded response body using generic records only.
    ///
    /// A single record payload (an object with `attributes`) is treated as a
    /// one-record page; `null` as an empty page.
    pub fn new(body: Value) -> Self {
        Self::build(body, Arc::new(TypeMap::default()), None)
    }

    /// An empty, complete page.
    pub fn empty() -> Self {
        Self::new(Value::Null)
    }

    /// Use `types` to pick the record variant for this page.
    pub fn with_type_map(mut self, types: Arc<TypeMap>) -> Self {
        self.schema = resolve_schema(&self.body, &types);
        self.types = types;
        self
    }

    /// Use `fetch` to follow `nextRecordsUrl`.
    pub fn with_fetcher(mut self, fetch: PageFetcher) -> Self {
        self.fetch = Some(fetch);
        self
    }

    pub(crate) fn build(body: Value, types: Arc<TypeMap>, fetch: Option<PageFetcher>) -> Self {
        let body = normalize(body);
        let schema = resolve_schema(&body, &types);
        Self {
            body,
            types,
            fetch,
            schema,
            cache: RefCell::new(None),
            next: OnceCell::new(),
        }
    }

    /// Build a record set from a response status and raw body.
    ///
    /// 200 and 201 bodies are decoded as JSON, 204 yields an empty set, and
    /// any other status fails with `UnexpectedStatus`.
    pub fn from_response(
        status: u16,
        body: &[u8],
        types: Arc<TypeMap>,
        fetch: Option<PageFetcher>,
    ) -> Result<Self> {
        match status {
            200 | 201 => {
                let body: Value = serde_json::from_slice(body).map_err(|err| {
                    Error::with_source(
                        ErrorKind::Result(ResultError::UnparsableResponse { status }),
                        err,
                    )
                })?;
                Ok(Self::build(body, types, fetch))
            }
            204 => Ok(Self::build(Value::Null, types, fetch)),
            _ => Err(ResultError::UnexpectedStatus { status }.into()),
        }
    }

    // =========================================================================
    // Raw page data
    // =========================================================================

    /// The (normalized) decoded body.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// `totalSize` as reported by the API, or the page length if absent.
    pub fn total_size(&self) -> u64 {
        self.body
            .get("totalSize")
            .and_then(Value::as_u64)
            .unwrap_or(self.raw_records().len() as u64)
    }

    /// Whether this is the last page.
    pub fn done(&self) -> bool {
        self.body
            .get("done")
            .and_then(Value::as_bool)
            .unwrap_or_else(|| self.next_records_url().is_none())
    }

    pub fn next_records_url(&self) -> Option<&str> {
        self.body.get("nextRecordsUrl").and_then(Value::as_str)
    }

    /// The `id` at the root of the body, as returned by a create call.
    pub fn last_id(&self) -> Option<&str> {
        self.body
            .get("id")
            .or_else(|| self.body.get(ID_FIELD))
            .and_then(Value::as_str)
    }

    /// Raw record payloads of this page.
    pub fn raw_records(&self) -> &[Value] {
        self.body
            .get("records")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The record variant every record of this page is built with.
    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Whether this page's records are cached.
    pub fn is_cached(&self) -> bool {
        self.cache.borrow().is_some()
    }

    // =========================================================================
    // Records
    // =========================================================================

    /// Iterate records of this page and every following page.
    ///
    /// Iteration stops after the first error.
    pub fn iter(&self) -> Records<'_> {
        Records {
            page: self,
            state: State::Start,
        }
    }

    /// The first record, if any.
    pub fn first(&self) -> Result<Option<Record>> {
        self.iter().next().transpose()
    }

    /// Every record across all pages.
    ///
    /// This follows `nextRecordsUrl` until the last page; keep it to result
    /// sets known to be small.
    pub fn to_list(&self) -> Result<Vec<Record>> {
        self.iter().collect()
    }

    /// Every record across all pages, keyed by id. Records without an id
    /// are left out.
    pub fn records_by_id(&self) -> Result<BTreeMap<String, Record>> {
        let mut records = BTreeMap::new();
        for record in self.iter() {
            let record = record?;
            if let Some(id) = record.id() {
                records.insert(id.to_string(), record);
            }
        }
        Ok(records)
    }

    /// The following page, fetched on first call and remembered after.
    ///
    /// `None` without a `nextRecordsUrl` or a fetcher. A failed fetch is not
    /// remembered.
    pub fn next_page(&self) -> Result<Option<&RecordSet>> {
        if let Some(next) = self.next.get() {
            return Ok(next.as_deref());
        }

        let next = match (&self.fetch, self.next_records_url()) {
            (Some(fetch), Some(url)) => {
                debug!(url, "Fetching next page");
                Some(Box::new(fetch(url)?))
            }
            _ => None,
        };
        Ok(self.next.get_or_init(|| next).as_deref())
    }

    /// Drop cached records so the next iteration rebuilds them. The next
    /// page link is kept.
    pub fn clear_cache(&self) {
        self.cache.borrow_mut().take();
    }

    fn cached(&self, index: usize) -> Option<Record> {
        self.cache
            .borrow()
            .as_ref()
            .and_then(|records| records.get(index).cloned())
    }

    fn store(&self, records: Vec<Record>) {
        self.cache.borrow_mut().get_or_insert(records);
    }

    fn materialize(&self, raw: &Value) -> Result<Record> {
        self.build_record(raw).map_err(|err| {
            warn!(
                sobject = ?self.schema.sobject_type(),
                error = %err,
                "Unparsable record"
            );
            Error::with_source(
                ErrorKind::Result(ResultError::UnparsableRecord {
                    record: raw.clone(),
                    sobject_type: self.schema.sobject_type().map(str::to_string),
                }),
                err,
            )
        })
    }

    fn build_record(&self, raw: &Value) -> Result<Record> {
        let payload = raw
            .as_object()
            .ok_or(ResultError::NoType { record_id: None })?;

        let mut fields = Vec::with_capacity(payload.len());
        for (name, value) in payload {
            if name == "attributes" {
                continue;
            }
            let value = if value.get("records").is_some_and(Value::is_array) {
                FieldValue::RecordSet(self.nested(value.clone()))
            } else if value.get("attributes").is_some_and(Value::is_object) {
                self.nested(value.clone()).first()?.into()
            } else {
                FieldValue::from_json(value.clone())
            };
            fields.push((name.clone(), value));
        }

        Record::from_parts(self.schema.clone(), payload, fields)
    }

    fn nested(&self, body: Value) -> RecordSet {
        Self::build(body, self.types.clone(), self.fetch.clone())
    }
}

/// A lone record payload becomes a one-record page; `null` an empty page.
fn normalize(body: Value) -> Value {
    if body.is_null() {
        json!({"done": true, "totalSize": 0, "records": []})
    } else if body.get("attributes").is_some() {
        json!({"done": true, "totalSize": 1, "records": [body]})
    } else {
        body
    }
}

/// The first record's type decides the schema for the whole page.
fn resolve_schema(body: &Value, types: &TypeMap) -> Arc<RecordSchema> {
    let sobject_type = body
        .get("records")
        .and_then(|records| records.get(0))
        .and_then(|record| record.get("attributes"))
        .and_then(|attributes| attributes.get("type"))
        .and_then(Value::as_str);
    types.resolve(sobject_type)
}

impl Default for RecordSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for RecordSet {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body
    }
}

impl fmt::Debug for RecordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSet")
            .field("total_size", &self.total_size())
            .field("done", &self.done())
            .field("next_records_url", &self.next_records_url())
            .field("sobject_type", &self.schema.sobject_type())
            .field("cached", &self.is_cached())
            .field("fetcher", &self.fetch.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = Result<Record>;
    type IntoIter = Records<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Iteration
// ============================================================================

/// Iterator over the records of a [`RecordSet`] and the pages after it.
///
/// Yields copies; mutating a yielded record never touches the cache.
pub struct Records<'a> {
    page: &'a RecordSet,
    state: State,
}

enum State {
    Start,
    Cached { index: usize },
    Parsing { index: usize, parsed: Vec<Record> },
    NextPage,
    Done,
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let page: &'a RecordSet = self.page;
            match std::mem::replace(&mut self.state, State::Done) {
                State::Start => {
                    self.state = if page.is_cached() {
                        State::Cached { index: 0 }
                    } else {
                        State::Parsing {
                            index: 0,
                            parsed: Vec::with_capacity(page.raw_records().len()),
                        }
                    };
                }
                State::Cached { index } => match page.cached(index) {
                    Some(record) => {
                        self.state = State::Cached { index: index + 1 };
                        return Some(Ok(record));
                    }
                    None => self.state = State::NextPage,
                },
                State::Parsing { index, mut parsed } => {
                    let Some(raw) = page.raw_records().get(index) else {
                        page.store(parsed);
                        self.state = State::NextPage;
                        continue;
                    };
                    // On error the state stays Done.
                    let record = match page.materialize(raw) {
                        Ok(record) => record,
                        Err(err) => return Some(Err(err)),
                    };
                    parsed.push(record.clone());
                    self.state = State::Parsing {
                        index: index + 1,
                        parsed,
                    };
                    return Some(Ok(record));
                }
                State::NextPage => match page.next_page() {
                    Ok(Some(next)) => {
                        self.page = next;
                        self.state = State::Start;
                    }
                    Ok(None) => return None,
                    Err(err) => return Some(Err(err)),
                },
                State::Done => return None,
            }
        }
    }
}

impl fmt::Debug for Records<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Records")
            .field("page", &self.page)
            .finish_non_exhaustive()
    }
}

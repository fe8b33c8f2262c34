//! In-memory host for the demo.
//!
//! Plays the part of an application around the controllers: it owns the
//! records, answers queries asynchronously and reports results back over a
//! channel.

use std::sync::Arc;
use std::time::Duration;

use crudkit_core::{Record, RowId, Value, display_text, is_empty_filter};
use crudkit_ui::{PageChange, SortDirection};
use serde_json::json;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};

/// Something a controller asked the host to do
#[derive(Debug, Clone)]
pub enum HostIntent {
    Search(Record),
    Keyword(String),
    Sort(String, Option<SortDirection>),
    Page(PageChange),
    Refresh,
    Create,
    Export,
    Edit(RowId),
    Delete(RowId),
    BatchDelete(Vec<RowId>),
    Save(Value),
}

/// What a finished effect reports
#[derive(Debug)]
pub enum HostResult {
    Loaded { rows: Vec<Record>, total: u64 },
    Exported(String),
    OpenForm(Option<Record>),
}

/// Current list query
#[derive(Debug, Clone)]
pub struct Query {
    pub filters: Record,
    pub keyword: String,
    pub sort: Option<(String, SortDirection)>,
    pub page: PageChange,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            filters: Record::new(),
            keyword: String::new(),
            sort: None,
            page: PageChange {
                current: 1,
                page_size: 5,
            },
        }
    }
}

impl Query {
    fn matches(&self, user: &Record) -> bool {
        let keyword = self.keyword.to_lowercase();
        let keyword_hit = keyword.is_empty() || contains_text(user, &keyword);

        keyword_hit
            && self.filters.iter().all(|(key, wanted)| {
                if is_empty_filter(Some(wanted)) {
                    return true;
                }
                match key.as_str() {
                    "keyword" => contains_text(user, &display_text(Some(wanted)).to_lowercase()),
                    // Date ranges are not stored on the demo records.
                    "dateRange" => true,
                    _ => user.get(key) == Some(wanted),
                }
            })
    }
}

/// Whether the name or email contains `needle` (already lowercased)
fn contains_text(user: &Record, needle: &str) -> bool {
    ["name", "email"]
        .iter()
        .any(|key| display_text(user.get(*key)).to_lowercase().contains(needle))
}

/// Shared record store
#[derive(Clone)]
pub struct UserStore {
    users: Arc<Mutex<Vec<Record>>>,
    next_id: Arc<Mutex<u64>>,
}

impl UserStore {
    /// A store seeded with a handful of users
    pub fn seeded() -> Self {
        let seed = [
            ("Ada Lovelace", "ada@example.com", "admin", 1),
            ("Grace Hopper", "grace@example.com", "editor", 1),
            ("Linus Torvalds", "linus@example.com", "viewer", 0),
            ("Barbara Liskov", "barbara@example.com", "editor", 1),
            ("Ken Thompson", "ken@example.com", "viewer", 1),
            ("Margaret Hamilton", "margaret@example.com", "admin", 0),
            ("Dennis Ritchie", "dennis@example.com", "viewer", 1),
        ];
        let users = seed
            .iter()
            .enumerate()
            .filter_map(|(index, (name, email, role, status))| {
                let user = json!({
                    "id": index + 1,
                    "name": name,
                    "email": email,
                    "role": role,
                    "status": status,
                    "created_at": format!("2024-0{}-1{} 09:30:00", index % 9 + 1, index),
                });
                match user {
                    Value::Object(record) => Some(record),
                    _ => None,
                }
            })
            .collect::<Vec<_>>();
        let next_id = users.len() as u64 + 1;
        Self {
            users: Arc::new(Mutex::new(users)),
            next_id: Arc::new(Mutex::new(next_id)),
        }
    }

    async fn page(&self, query: &Query) -> (Vec<Record>, u64) {
        let users = self.users.lock().await;
        let mut hits: Vec<Record> = users.iter().filter(|u| query.matches(u)).cloned().collect();

        if let Some((key, direction)) = &query.sort {
            hits.sort_by_key(|u| display_text(u.get(key)));
            if *direction == SortDirection::Descending {
                hits.reverse();
            }
        }

        let total = hits.len() as u64;
        let size = query.page.page_size.max(1) as usize;
        let skip = (query.page.current.max(1) as usize - 1) * size;
        (hits.into_iter().skip(skip).take(size).collect(), total)
    }

    async fn find(&self, id: &RowId) -> Option<Record> {
        let users = self.users.lock().await;
        users
            .iter()
            .find(|u| RowId::from_record(u, "id").as_ref() == Some(id))
            .cloned()
    }

    async fn remove(&self, ids: &[RowId]) -> usize {
        let mut users = self.users.lock().await;
        let before = users.len();
        users.retain(|u| match RowId::from_record(u, "id") {
            Some(id) => !ids.contains(&id),
            None => true,
        });
        before - users.len()
    }

    async fn save(&self, values: Value) {
        let Value::Object(mut record) = values else {
            return;
        };
        let mut users = self.users.lock().await;
        if let Some(id) = RowId::from_record(&record, "id")
            && let Some(existing) = users
                .iter_mut()
                .find(|u| RowId::from_record(u, "id").as_ref() == Some(&id))
        {
            existing.extend(record);
            return;
        }
        let mut next_id = self.next_id.lock().await;
        record.insert("id".to_string(), json!(*next_id));
        record.insert("created_at".to_string(), json!("2024-10-01 12:00:00"));
        *next_id += 1;
        users.push(record);
    }
}

/// Simulated backend latency
const LATENCY: Duration = Duration::from_millis(20);

/// Run the effect of `intent` against `query` and send the result
pub async fn run_effect(
    store: UserStore,
    intent: HostIntent,
    query: Query,
    results: mpsc::UnboundedSender<HostResult>,
) {
    tokio::time::sleep(LATENCY).await;

    let result = match intent {
        HostIntent::Create => HostResult::OpenForm(None),
        HostIntent::Edit(id) => HostResult::OpenForm(store.find(&id).await),
        HostIntent::Export => {
            let (rows, total) = store
                .page(&Query {
                    page: PageChange {
                        current: 1,
                        page_size: u32::MAX,
                    },
                    ..query
                })
                .await;
            info!(total, "exported users");
            HostResult::Exported(serde_json::to_string(&rows).unwrap_or_default())
        }
        HostIntent::Delete(id) => {
            let removed = store.remove(std::slice::from_ref(&id)).await;
            info!(%id, removed, "deleted user");
            load(&store, &query).await
        }
        HostIntent::BatchDelete(ids) => {
            let removed = store.remove(&ids).await;
            info!(removed, "deleted users");
            load(&store, &query).await
        }
        HostIntent::Save(values) => {
            store.save(values).await;
            load(&store, &query).await
        }
        HostIntent::Search(_)
        | HostIntent::Keyword(_)
        | HostIntent::Sort(..)
        | HostIntent::Page(_)
        | HostIntent::Refresh => load(&store, &query).await,
    };

    if results.send(result).is_err() {
        debug!("result receiver dropped");
    }
}

async fn load(store: &UserStore, query: &Query) -> HostResult {
    let (rows, total) = store.page(query).await;
    debug!(rows = rows.len(), total, "loaded page");
    HostResult::Loaded { rows, total }
}

/// Fold an intent into the list query
pub fn apply(query: &mut Query, intent: &HostIntent) {
    match intent {
        HostIntent::Search(filters) => {
            query.filters = filters.clone();
            query.page.current = 1;
        }
        HostIntent::Keyword(text) => {
            query.keyword = text.clone();
            query.page.current = 1;
        }
        HostIntent::Sort(key, direction) => {
            query.sort = direction.map(|d| (key.clone(), d));
        }
        HostIntent::Page(change) => query.page = *change,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keyword_and_filters_narrow_the_page() {
        let store = UserStore::seeded();
        let mut query = Query::default();
        apply(&mut query, &HostIntent::Keyword("ada".to_string()));
        let (rows, total) = store.page(&query).await;
        assert_eq!(total, 1);
        assert_eq!(rows[0].get("name"), Some(&json!("Ada Lovelace")));

        let mut filters = Record::new();
        filters.insert("role".to_string(), json!("viewer"));
        let mut query = Query::default();
        apply(&mut query, &HostIntent::Search(filters));
        let (_, total) = store.page(&query).await;
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn test_delete_effect_reloads() {
        let store = UserStore::seeded();
        let (tx, mut rx) = mpsc::unbounded_channel();
        run_effect(
            store.clone(),
            HostIntent::BatchDelete(vec![RowId::new("1"), RowId::new("2")]),
            Query::default(),
            tx,
        )
        .await;
        match rx.recv().await {
            Some(HostResult::Loaded { total, .. }) => assert_eq!(total, 5),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_save_assigns_an_id() {
        let store = UserStore::seeded();
        store.save(json!({"name": "New User", "role": "viewer"})).await;
        assert!(store.find(&RowId::new("8")).await.is_some());
    }
}

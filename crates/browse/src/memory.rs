//! In-memory [`KeyValueStore`] backend.
//!
//! Mirrors the cursor and pattern semantics of a networked server closely
//! enough to exercise every browsing path: the scan cursor walks the sorted
//! key list in fixed-size windows and applies the pattern *after* windowing,
//! so sparse matches produce the same empty-but-not-done pages a real server
//! does.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLock;

use crate::error::{BrowseError, BrowseResult};
use crate::store::KeyValueStore;
use crate::types::Reply;

#[derive(Debug, Clone)]
enum StoredValue {
    String(String),
    List(Vec<String>),
    Hash(BTreeMap<String, String>),
    Set(BTreeSet<String>),
    SortedSet(BTreeMap<String, f64>),
}

impl StoredValue {
    fn type_name(&self) -> &'static str {
        match self {
            StoredValue::String(_) => "string",
            StoredValue::List(_) => "list",
            StoredValue::Hash(_) => "hash",
            StoredValue::Set(_) => "set",
            StoredValue::SortedSet(_) => "zset",
        }
    }
}

/// Glob match: `*` any run, `?` any single character, everything else
/// literal. No character classes or escapes.
fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0usize, 0usize);
    let (mut star_p, mut star_t) = (None::<usize>, 0usize);
    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star_p = Some(pi);
            star_t = ti;
            pi += 1;
        } else if let Some(sp) = star_p {
            // Backtrack: let the last * absorb one more character.
            pi = sp + 1;
            star_t += 1;
            ti = star_t;
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

fn matches(pattern: Option<&str>, text: &str) -> bool {
    match pattern {
        None => true,
        Some(p) => glob_match(p, text),
    }
}

/// Windowed scan over a sorted snapshot of member strings. Returns the
/// next cursor (0 when the window reached the end) and the matching
/// members within the window.
fn scan_window<T: Clone>(
    entries: &[(String, T)],
    cursor: u64,
    count: u64,
    pattern: Option<&str>,
) -> (u64, Vec<(String, T)>) {
    let start = usize::try_from(cursor).unwrap_or(usize::MAX).min(entries.len());
    let end = start.saturating_add(usize::try_from(count.max(1)).unwrap_or(usize::MAX)).min(entries.len());
    let items = entries[start..end]
        .iter()
        .filter(|(name, _)| matches(pattern, name))
        .cloned()
        .collect();
    let next = if end >= entries.len() { 0 } else { end as u64 };
    (next, items)
}

/// Thread-safe in-memory store over a sorted key map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, StoredValue>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_string(&self, key: impl Into<String>, value: impl Into<String>) {
        self.data.write().insert(key.into(), StoredValue::String(value.into()));
    }

    pub fn set_list<I, S>(&self, key: impl Into<String>, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = items.into_iter().map(Into::into).collect();
        self.data.write().insert(key.into(), StoredValue::List(items));
    }

    pub fn set_hash<I, K, V>(&self, key: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields = fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.data.write().insert(key.into(), StoredValue::Hash(fields));
    }

    pub fn set_set<I, S>(&self, key: impl Into<String>, members: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members = members.into_iter().map(Into::into).collect();
        self.data.write().insert(key.into(), StoredValue::Set(members));
    }

    pub fn set_zset<I, S>(&self, key: impl Into<String>, members: I)
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let members = members.into_iter().map(|(m, s)| (m.into(), s)).collect();
        self.data.write().insert(key.into(), StoredValue::SortedSet(members));
    }

    fn hash_entries(&self, key: &str) -> Vec<(String, String)> {
        match self.data.read().get(key) {
            Some(StoredValue::Hash(fields)) => {
                fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
            }
            _ => Vec::new(),
        }
    }

    fn set_entries(&self, key: &str) -> Vec<(String, ())> {
        match self.data.read().get(key) {
            Some(StoredValue::Set(members)) => members.iter().map(|m| (m.clone(), ())).collect(),
            _ => Vec::new(),
        }
    }

    fn zset_entries(&self, key: &str) -> Vec<(String, f64)> {
        match self.data.read().get(key) {
            Some(StoredValue::SortedSet(members)) => {
                let mut entries: Vec<(String, f64)> =
                    members.iter().map(|(m, s)| (m.clone(), *s)).collect();
                entries.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
                entries
            }
            _ => Vec::new(),
        }
    }

    fn run_command(&self, args: &[String]) -> BrowseResult<Reply> {
        let Some(command) = args.first() else {
            return Err(BrowseError::malformed_command("empty command"));
        };
        let argv = &args[1..];
        match command.to_ascii_uppercase().as_str() {
            "PING" => Ok(Reply::Text("PONG".into())),
            "DBSIZE" => Ok(Reply::Integer(self.data.read().len() as i64)),
            "SET" => {
                let [key, value] = argv else {
                    return Err(BrowseError::malformed_command("SET takes key and value"));
                };
                self.set_string(key.clone(), value.clone());
                Ok(Reply::Text("OK".into()))
            }
            "GET" => {
                let [key] = argv else {
                    return Err(BrowseError::malformed_command("GET takes one key"));
                };
                match self.data.read().get(key) {
                    Some(StoredValue::String(v)) => Ok(Reply::Text(v.clone())),
                    _ => Ok(Reply::Nil),
                }
            }
            "DEL" => {
                let mut data = self.data.write();
                let removed = argv.iter().filter(|key| data.remove(*key).is_some()).count();
                Ok(Reply::Integer(removed as i64))
            }
            "RPUSH" => {
                let [key, rest @ ..] = argv else {
                    return Err(BrowseError::malformed_command("RPUSH takes key and items"));
                };
                let mut data = self.data.write();
                let entry = data
                    .entry(key.clone())
                    .or_insert_with(|| StoredValue::List(Vec::new()));
                let StoredValue::List(items) = entry else {
                    return Err(BrowseError::malformed_command("key holds the wrong kind of value"));
                };
                items.extend(rest.iter().cloned());
                Ok(Reply::Integer(items.len() as i64))
            }
            "LLEN" => {
                let [key] = argv else {
                    return Err(BrowseError::malformed_command("LLEN takes one key"));
                };
                match self.data.read().get(key) {
                    Some(StoredValue::List(items)) => Ok(Reply::Integer(items.len() as i64)),
                    _ => Ok(Reply::Integer(0)),
                }
            }
            "HSET" => {
                let [key, rest @ ..] = argv else {
                    return Err(BrowseError::malformed_command("HSET takes key and pairs"));
                };
                if rest.is_empty() || rest.len() % 2 != 0 {
                    return Err(BrowseError::malformed_command("HSET takes field/value pairs"));
                }
                let mut data = self.data.write();
                let entry = data
                    .entry(key.clone())
                    .or_insert_with(|| StoredValue::Hash(BTreeMap::new()));
                let StoredValue::Hash(fields) = entry else {
                    return Err(BrowseError::malformed_command("key holds the wrong kind of value"));
                };
                let mut added = 0i64;
                for pair in rest.chunks_exact(2) {
                    if fields.insert(pair[0].clone(), pair[1].clone()).is_none() {
                        added += 1;
                    }
                }
                Ok(Reply::Integer(added))
            }
            "SADD" => {
                let [key, rest @ ..] = argv else {
                    return Err(BrowseError::malformed_command("SADD takes key and members"));
                };
                let mut data = self.data.write();
                let entry = data
                    .entry(key.clone())
                    .or_insert_with(|| StoredValue::Set(BTreeSet::new()));
                let StoredValue::Set(members) = entry else {
                    return Err(BrowseError::malformed_command("key holds the wrong kind of value"));
                };
                let added = rest.iter().filter(|m| members.insert((*m).clone())).count();
                Ok(Reply::Integer(added as i64))
            }
            "ZADD" => {
                let [key, rest @ ..] = argv else {
                    return Err(BrowseError::malformed_command("ZADD takes key and pairs"));
                };
                if rest.is_empty() || rest.len() % 2 != 0 {
                    return Err(BrowseError::malformed_command("ZADD takes score/member pairs"));
                }
                let mut data = self.data.write();
                let entry = data
                    .entry(key.clone())
                    .or_insert_with(|| StoredValue::SortedSet(BTreeMap::new()));
                let StoredValue::SortedSet(members) = entry else {
                    return Err(BrowseError::malformed_command("key holds the wrong kind of value"));
                };
                let mut added = 0i64;
                for pair in rest.chunks_exact(2) {
                    let score: f64 = pair[0].parse().map_err(|_| {
                        BrowseError::malformed_command(format!("invalid score {:?}", pair[0]))
                    })?;
                    if members.insert(pair[1].clone(), score).is_none() {
                        added += 1;
                    }
                }
                Ok(Reply::Integer(added))
            }
            other => Err(BrowseError::unsupported(format!("unknown command {other}"))),
        }
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn db_size(&self) -> BrowseResult<u64> {
        Ok(self.data.read().len() as u64)
    }

    async fn scan_keys(
        &self,
        cursor: u64,
        count: u64,
        pattern: Option<&str>,
    ) -> BrowseResult<(u64, Vec<String>)> {
        let entries: Vec<(String, ())> =
            self.data.read().keys().map(|k| (k.clone(), ())).collect();
        let (next, items) = scan_window(&entries, cursor, count, pattern);
        Ok((next, items.into_iter().map(|(k, ())| k).collect()))
    }

    async fn key_type(&self, key: &str) -> BrowseResult<Option<String>> {
        Ok(self.data.read().get(key).map(|v| v.type_name().to_owned()))
    }

    async fn get_string(&self, key: &str) -> BrowseResult<Option<String>> {
        match self.data.read().get(key) {
            Some(StoredValue::String(v)) => Ok(Some(v.clone())),
            _ => Ok(None),
        }
    }

    async fn string_len(&self, key: &str) -> BrowseResult<u64> {
        match self.data.read().get(key) {
            Some(StoredValue::String(v)) => Ok(v.len() as u64),
            _ => Ok(0),
        }
    }

    async fn list_len(&self, key: &str) -> BrowseResult<u64> {
        match self.data.read().get(key) {
            Some(StoredValue::List(items)) => Ok(items.len() as u64),
            _ => Ok(0),
        }
    }

    async fn hash_len(&self, key: &str) -> BrowseResult<u64> {
        match self.data.read().get(key) {
            Some(StoredValue::Hash(fields)) => Ok(fields.len() as u64),
            _ => Ok(0),
        }
    }

    async fn set_card(&self, key: &str) -> BrowseResult<u64> {
        match self.data.read().get(key) {
            Some(StoredValue::Set(members)) => Ok(members.len() as u64),
            _ => Ok(0),
        }
    }

    async fn zset_card(&self, key: &str) -> BrowseResult<u64> {
        match self.data.read().get(key) {
            Some(StoredValue::SortedSet(members)) => Ok(members.len() as u64),
            _ => Ok(0),
        }
    }

    async fn list_range(&self, key: &str, start: i64, stop: i64) -> BrowseResult<Vec<String>> {
        let data = self.data.read();
        let Some(StoredValue::List(items)) = data.get(key) else {
            return Ok(Vec::new());
        };
        let len = items.len() as i64;
        let clamp = |index: i64| -> i64 {
            let resolved = if index < 0 { len + index } else { index };
            resolved.clamp(0, len)
        };
        let start = clamp(start);
        // Stop is inclusive; -1 means the last element.
        let stop = if stop < 0 { len + stop + 1 } else { (stop + 1).min(len) };
        if start >= stop {
            return Ok(Vec::new());
        }
        Ok(items[start as usize..stop as usize].to_vec())
    }

    async fn hash_scan(
        &self,
        key: &str,
        cursor: u64,
        count: u64,
        pattern: Option<&str>,
    ) -> BrowseResult<(u64, Vec<(String, String)>)> {
        Ok(scan_window(&self.hash_entries(key), cursor, count, pattern))
    }

    async fn set_scan(
        &self,
        key: &str,
        cursor: u64,
        count: u64,
        pattern: Option<&str>,
    ) -> BrowseResult<(u64, Vec<String>)> {
        let (next, items) = scan_window(&self.set_entries(key), cursor, count, pattern);
        Ok((next, items.into_iter().map(|(m, ())| m).collect()))
    }

    async fn zset_scan(
        &self,
        key: &str,
        cursor: u64,
        count: u64,
        pattern: Option<&str>,
    ) -> BrowseResult<(u64, Vec<(String, f64)>)> {
        Ok(scan_window(&self.zset_entries(key), cursor, count, pattern))
    }

    async fn memory_usage(&self, key: &str) -> BrowseResult<Option<u64>> {
        let data = self.data.read();
        let Some(value) = data.get(key) else {
            return Ok(None);
        };
        let bytes = match value {
            StoredValue::String(v) => v.len(),
            StoredValue::List(items) => items.iter().map(String::len).sum(),
            StoredValue::Hash(fields) => fields.iter().map(|(k, v)| k.len() + v.len()).sum(),
            StoredValue::Set(members) => members.iter().map(String::len).sum(),
            StoredValue::SortedSet(members) => {
                members.keys().map(|m| m.len() + std::mem::size_of::<f64>()).sum()
            }
        };
        Ok(Some((key.len() + bytes) as u64))
    }

    async fn delete(&self, keys: &[String]) -> BrowseResult<u64> {
        let mut data = self.data.write();
        Ok(keys.iter().filter(|key| data.remove(*key).is_some()).count() as u64)
    }

    async fn execute(&self, args: &[String]) -> BrowseResult<Reply> {
        self.run_command(args)
    }

    async fn pipeline(&self, commands: &[Vec<String>]) -> BrowseResult<Vec<Reply>> {
        commands.iter().map(|args| self.run_command(args)).collect()
    }
}

//! [`KeyValueStore`] implementation over a managed Redis connection.

use async_trait::async_trait;
use keylens_browse::{BrowseError, BrowseResult, KeyValueStore, Reply};
use redis::aio::ConnectionManager;
use redis::{Cmd, Value};

use crate::error::map_redis_error;

/// Redis-backed store.
///
/// Holds a [`ConnectionManager`], which multiplexes one TCP connection
/// and reconnects by itself after transport failures; cloning the
/// manager per call is the intended usage and is cheap.
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    #[must_use]
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }

    fn scan_cmd(name: &str, key: Option<&str>, cursor: u64, count: u64, pattern: Option<&str>) -> Cmd {
        let mut cmd = redis::cmd(name);
        if let Some(key) = key {
            cmd.arg(key);
        }
        cmd.arg(cursor);
        if let Some(pattern) = pattern {
            cmd.arg("MATCH").arg(pattern);
        }
        cmd.arg("COUNT").arg(count);
        cmd
    }
}

/// Pairs up the flat `field, value, field, value, …` array that HSCAN
/// and ZSCAN return.
fn into_pairs(flat: Vec<String>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(flat.len() / 2);
    let mut iter = flat.into_iter();
    while let (Some(a), Some(b)) = (iter.next(), iter.next()) {
        pairs.push((a, b));
    }
    pairs
}

fn value_to_reply(value: Value) -> Reply {
    match value {
        Value::Nil => Reply::Nil,
        Value::Int(n) => Reply::Integer(n),
        Value::Okay => Reply::Text("OK".to_owned()),
        Value::SimpleString(s) => Reply::Text(s),
        Value::BulkString(bytes) => Reply::Text(String::from_utf8_lossy(&bytes).into_owned()),
        Value::Double(d) => Reply::Text(d.to_string()),
        Value::Boolean(b) => Reply::Integer(i64::from(b)),
        Value::Array(items) | Value::Set(items) => {
            Reply::Array(items.into_iter().map(value_to_reply).collect())
        }
        Value::Map(entries) => Reply::Array(
            entries
                .into_iter()
                .flat_map(|(k, v)| [value_to_reply(k), value_to_reply(v)])
                .collect(),
        ),
        other => Reply::Text(format!("{other:?}")),
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn db_size(&self) -> BrowseResult<u64> {
        let mut conn = self.manager.clone();
        let size: u64 =
            redis::cmd("DBSIZE").query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(size)
    }

    async fn scan_keys(
        &self,
        cursor: u64,
        count: u64,
        pattern: Option<&str>,
    ) -> BrowseResult<(u64, Vec<String>)> {
        let mut conn = self.manager.clone();
        let reply: (u64, Vec<String>) = Self::scan_cmd("SCAN", None, cursor, count, pattern)
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        Ok(reply)
    }

    async fn key_type(&self, key: &str) -> BrowseResult<Option<String>> {
        let mut conn = self.manager.clone();
        let name: String =
            redis::cmd("TYPE").arg(key).query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(if name == "none" { None } else { Some(name) })
    }

    async fn get_string(&self, key: &str) -> BrowseResult<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> =
            redis::cmd("GET").arg(key).query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(value)
    }

    async fn string_len(&self, key: &str) -> BrowseResult<u64> {
        let mut conn = self.manager.clone();
        let len: u64 =
            redis::cmd("STRLEN").arg(key).query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(len)
    }

    async fn list_len(&self, key: &str) -> BrowseResult<u64> {
        let mut conn = self.manager.clone();
        let len: u64 =
            redis::cmd("LLEN").arg(key).query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(len)
    }

    async fn hash_len(&self, key: &str) -> BrowseResult<u64> {
        let mut conn = self.manager.clone();
        let len: u64 =
            redis::cmd("HLEN").arg(key).query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(len)
    }

    async fn set_card(&self, key: &str) -> BrowseResult<u64> {
        let mut conn = self.manager.clone();
        let card: u64 =
            redis::cmd("SCARD").arg(key).query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(card)
    }

    async fn zset_card(&self, key: &str) -> BrowseResult<u64> {
        let mut conn = self.manager.clone();
        let card: u64 =
            redis::cmd("ZCARD").arg(key).query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(card)
    }

    async fn list_range(&self, key: &str, start: i64, stop: i64) -> BrowseResult<Vec<String>> {
        let mut conn = self.manager.clone();
        let items: Vec<String> = redis::cmd("LRANGE")
            .arg(key)
            .arg(start)
            .arg(stop)
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        Ok(items)
    }

    async fn hash_scan(
        &self,
        key: &str,
        cursor: u64,
        count: u64,
        pattern: Option<&str>,
    ) -> BrowseResult<(u64, Vec<(String, String)>)> {
        let mut conn = self.manager.clone();
        let (next, flat): (u64, Vec<String>) =
            Self::scan_cmd("HSCAN", Some(key), cursor, count, pattern)
                .query_async(&mut conn)
                .await
                .map_err(map_redis_error)?;
        Ok((next, into_pairs(flat)))
    }

    async fn set_scan(
        &self,
        key: &str,
        cursor: u64,
        count: u64,
        pattern: Option<&str>,
    ) -> BrowseResult<(u64, Vec<String>)> {
        let mut conn = self.manager.clone();
        let reply: (u64, Vec<String>) = Self::scan_cmd("SSCAN", Some(key), cursor, count, pattern)
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        Ok(reply)
    }

    async fn zset_scan(
        &self,
        key: &str,
        cursor: u64,
        count: u64,
        pattern: Option<&str>,
    ) -> BrowseResult<(u64, Vec<(String, f64)>)> {
        let mut conn = self.manager.clone();
        let (next, flat): (u64, Vec<String>) =
            Self::scan_cmd("ZSCAN", Some(key), cursor, count, pattern)
                .query_async(&mut conn)
                .await
                .map_err(map_redis_error)?;
        let mut members = Vec::with_capacity(flat.len() / 2);
        for (member, score) in into_pairs(flat) {
            let score: f64 = score.parse().map_err(|_| {
                BrowseError::internal(format!("non-numeric score {score:?} for {member:?}"))
            })?;
            members.push((member, score));
        }
        Ok((next, members))
    }

    async fn memory_usage(&self, key: &str) -> BrowseResult<Option<u64>> {
        let mut conn = self.manager.clone();
        let usage: Option<u64> = redis::cmd("MEMORY")
            .arg("USAGE")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        Ok(usage)
    }

    async fn delete(&self, keys: &[String]) -> BrowseResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.manager.clone();
        let mut cmd = redis::cmd("DEL");
        for key in keys {
            cmd.arg(key);
        }
        let removed: u64 = cmd.query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(removed)
    }

    async fn execute(&self, args: &[String]) -> BrowseResult<Reply> {
        let Some((name, rest)) = args.split_first() else {
            return Err(BrowseError::malformed_command("empty command"));
        };
        let mut conn = self.manager.clone();
        let mut cmd = redis::cmd(name);
        for arg in rest {
            cmd.arg(arg);
        }
        let value: Value = cmd.query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(value_to_reply(value))
    }

    async fn pipeline(&self, commands: &[Vec<String>]) -> BrowseResult<Vec<Reply>> {
        let mut conn = self.manager.clone();
        let mut pipe = redis::pipe();
        for command in commands {
            let Some((name, rest)) = command.split_first() else {
                return Err(BrowseError::malformed_command("empty command in batch"));
            };
            let mut cmd = redis::cmd(name);
            for arg in rest {
                cmd.arg(arg);
            }
            pipe.add_command(cmd);
        }
        let values: Vec<Value> = pipe.query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(values.into_iter().map(value_to_reply).collect())
    }
}

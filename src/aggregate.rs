//! Small aggregation helpers shared by the answer functions.
//!
//! Grouping keeps keys in first-seen order so that arg-max/arg-min ties are
//! decided by the order of the input table.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};

/// Longest list an answer prints before summarising the rest.
pub const LIST_LIMIT: usize = 50;

pub fn count_by<T>(items: &[T], pred: impl Fn(&T) -> bool) -> usize {
    items.iter().filter(|item| pred(item)).count()
}

pub fn group_by<'a, T, K>(
    items: impl IntoIterator<Item = &'a T>,
    key: impl Fn(&T) -> K,
) -> Vec<(K, Vec<&'a T>)>
where
    T: 'a,
    K: Eq + Hash + Clone,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a T>)> = Vec::new();
    for item in items {
        let k = key(item);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![item]));
            }
        }
    }
    groups
}

/// Count occurrences of each key, first-seen order.
pub fn tally<K>(keys: impl IntoIterator<Item = K>) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();
    for k in keys {
        match index.get(&k) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(k.clone(), counts.len());
                counts.push((k, 1));
            }
        }
    }
    counts
}

/// Entry with the largest count; the earliest one wins ties.
pub fn argmax<K>(counts: &[(K, usize)]) -> Option<&(K, usize)> {
    counts.iter().fold(None, |best, entry| match best {
        Some(b) if b.1 >= entry.1 => Some(b),
        _ => Some(entry),
    })
}

/// Entry with the smallest count; the earliest one wins ties.
pub fn argmin<K>(counts: &[(K, usize)]) -> Option<&(K, usize)> {
    counts.iter().fold(None, |best, entry| match best {
        Some(b) if b.1 <= entry.1 => Some(b),
        _ => Some(entry),
    })
}

pub fn group_sizes<K: Clone, T>(groups: &[(K, Vec<T>)]) -> Vec<(K, usize)> {
    groups.iter().map(|(k, v)| (k.clone(), v.len())).collect()
}

/// Percentage rounded to one decimal; 0.0 when there is nothing to divide by.
pub fn pct(n: usize, d: usize) -> f64 {
    if d == 0 {
        return 0.0;
    }
    (n as f64 / d as f64 * 1000.0).round() / 10.0
}

pub fn days_ago(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}

/// True when the instant exists and is at or after `since`.
pub fn since(instant: Option<DateTime<Utc>>, since: DateTime<Utc>) -> bool {
    instant.map_or(false, |t| t >= since)
}

/// True when the instant exists and is strictly before `cutoff`.
pub fn before(instant: Option<DateTime<Utc>>, cutoff: DateTime<Utc>) -> bool {
    instant.map_or(false, |t| t < cutoff)
}

pub fn period_label(days: i64) -> String {
    if days == 7 {
        "week".to_string()
    } else {
        format!("{days} days")
    }
}

/// Render the first [`LIST_LIMIT`] lines, then an "(and N more...)" marker.
pub fn truncated_list(lines: &[String]) -> String {
    let shown = &lines[..lines.len().min(LIST_LIMIT)];
    let mut out = shown.join("\n");
    if lines.len() > LIST_LIMIT {
        out.push_str(&format!("\n(and {} more...)", lines.len() - LIST_LIMIT));
    }
    out
}

use chrono::{DateTime, Local, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Lowest priority a node can display
pub const PRIORITY_MIN: i64 = 1;
/// Highest priority a node can display
pub const PRIORITY_MAX: i64 = 5;

/// Title given to the root node
pub const ROOT_TITLE: &str = "Me";
/// Title substituted when a save leaves the title blank
pub const UNTITLED: &str = "Untitled";

/// A single goal, category, or the root ("Me").
///
/// One record type for all three; the flags decide the role. Field names
/// serialize in camelCase to match the persisted snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: String,
    /// Stored as-is; read through [`Node::priority_clamped`]
    #[serde(default = "default_priority", deserialize_with = "lenient_priority")]
    pub priority: i64,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub x: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub y: f64,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub locked_title: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub completed: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_me: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_category: bool,
    /// ISO-8601 timestamp, kept as text so malformed values survive a load
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated_at: String,
}

impl Node {
    /// The root node, centred at the world origin
    pub fn root(id: String, now: DateTime<Utc>) -> Self {
        let stamp = timestamp(now);
        Node {
            id,
            title: ROOT_TITLE.to_string(),
            notes: String::new(),
            priority: 3,
            parent_id: None,
            x: 0.0,
            y: 0.0,
            locked_title: true,
            completed: false,
            is_me: true,
            is_category: false,
            created_at: stamp.clone(),
            updated_at: stamp,
        }
    }

    /// A category directly under the root
    pub fn category(id: String, title: &str, parent_id: &str, x: f64, y: f64, now: DateTime<Utc>) -> Self {
        let stamp = timestamp(now);
        Node {
            id,
            title: title.to_string(),
            notes: String::new(),
            priority: 1,
            parent_id: Some(parent_id.to_string()),
            x,
            y,
            locked_title: true,
            completed: false,
            is_me: false,
            is_category: true,
            created_at: stamp.clone(),
            updated_at: stamp,
        }
    }

    /// A plain goal ("star")
    pub fn star(id: String, title: &str, parent_id: &str, x: f64, y: f64, now: DateTime<Utc>) -> Self {
        let stamp = timestamp(now);
        Node {
            id,
            title: title.to_string(),
            notes: String::new(),
            priority: 3,
            parent_id: Some(parent_id.to_string()),
            x,
            y,
            locked_title: false,
            completed: false,
            is_me: false,
            is_category: false,
            created_at: stamp.clone(),
            updated_at: stamp,
        }
    }

    /// Stored priority clamped to `1..=5`
    pub fn priority_clamped(&self) -> i64 {
        clamp_priority(self.priority)
    }

    /// Only plain goals can be marked completed
    pub fn is_completable(&self) -> bool {
        !self.is_me && !self.is_category
    }

    /// "root", "category" or "goal"
    pub fn kind(&self) -> &'static str {
        if self.is_me {
            "root"
        } else if self.is_category {
            "category"
        } else {
            "goal"
        }
    }

    /// Marker drawn before the title: ★ root, ◆ category, ✓ done, ● goal
    pub fn glyph(&self) -> &'static str {
        if self.is_me {
            "\u{2605}"
        } else if self.is_category {
            "\u{25C6}"
        } else if self.completed {
            "\u{2713}"
        } else {
            "\u{25CF}"
        }
    }

    pub fn created_time(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }

    pub fn updated_time(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.updated_at)
    }

    /// Creation date as `YYYY-MM-DD` in local time, or "" when unparsable
    pub fn created_date(&self) -> String {
        self.created_time()
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// Clamp any stored priority into the displayable range
pub fn clamp_priority(p: i64) -> i64 {
    p.clamp(PRIORITY_MIN, PRIORITY_MAX)
}

/// Format a timestamp the way the snapshot stores it (`2025-01-02T03:04:05.678Z`)
pub fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp; `None` for empty or malformed text
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Generate a node ID: `s_` + 8 random base-36 chars + epoch millis in base 36
pub fn make_id<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut id = String::from("s_");
    for _ in 0..8 {
        id.push(ALPHABET[rng.gen_range(0..ALPHABET.len())] as char);
    }
    id.push_str(&to_base36(now.timestamp_millis().max(0) as u64));
    id
}

fn to_base36(mut n: u64) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(ALPHABET[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

// ---------------------------------------------------------------------------
// Lenient field decoding
// ---------------------------------------------------------------------------

fn default_priority() -> i64 {
    PRIORITY_MIN
}

/// Numbers (floats truncated) and numeric strings; anything else reads as 1
fn lenient_priority<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(d)?;
    let n = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    };
    Ok(n.unwrap_or(PRIORITY_MIN))
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(d)?;
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(n.filter(|f| f.is_finite()).unwrap_or(0.0))
}

/// Only a JSON `true` is true
fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(matches!(value, Value::Bool(true)))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

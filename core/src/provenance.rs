//! Checks a revealed game against the commitment made when it started.
//!
//! The server derives `combined_seed` as the SHA-256 of
//! `"{server_seed}:{client_seed}:{session_id}"` and commits to the game by
//! hashing `{"server_seed", "all_paths"}` serialized with sorted keys and
//! `", "` / `": "` separators, ASCII-only. `verify` recomputes both from the
//! revealed data.

use std::fmt::Write;

use serde_json::{Number, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::types::{RevealedProvenance, SessionId};

/// Client seed the server substitutes when none (or an empty one) was given.
pub const DEFAULT_CLIENT_SEED: &str = "default_client_seed";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvenanceError {
    #[error("combined seed does not match the revealed seeds")]
    CombinedSeed,
    #[error("commitment hash does not match the revealed paths")]
    Commitment,
}

impl RevealedProvenance {
    pub fn verify(&self, session_id: &SessionId) -> Result<(), ProvenanceError> {
        let expected = combined_seed(
            &self.server_seed,
            self.client_seed.as_deref(),
            session_id.as_str(),
        );
        if expected != self.combined_seed {
            return Err(ProvenanceError::CombinedSeed);
        }
        if commitment_hash(&self.server_seed, &self.all_paths_revealed) != self.commitment_hash {
            return Err(ProvenanceError::Commitment);
        }
        Ok(())
    }
}

pub fn combined_seed(server_seed: &str, client_seed: Option<&str>, session_id: &str) -> String {
    let client_seed = client_seed
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_CLIENT_SEED);
    sha256_hex(format!("{server_seed}:{client_seed}:{session_id}").as_bytes())
}

pub fn commitment_hash(server_seed: &str, all_paths: &[Value]) -> String {
    let mut out = String::new();
    out.push_str("{\"all_paths\": ");
    write_array(all_paths, &mut out);
    out.push_str(", \"server_seed\": ");
    write_str(server_seed, &mut out);
    out.push('}');
    sha256_hex(out.as_bytes())
}

fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    let mut s = String::with_capacity(digest.len() * 2);
    for b in digest {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Serialize in the committed layout: sorted keys, spaced separators.
fn write_value(v: &Value, out: &mut String) {
    match v {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(n, out),
        Value::String(s) => write_str(s, out),
        Value::Array(items) => write_array(items, out),
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_str(key, out);
                out.push_str(": ");
                write_value(value, out);
            }
            out.push('}');
        }
    }
}

fn write_array(items: &[Value], out: &mut String) {
    out.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_value(item, out);
    }
    out.push(']');
}

/// Floats use the shortest round-trip digits, positional for exponents in
/// `-4..16` (always with a fraction) and `1e-05` / `1e+16` style otherwise.
fn write_number(n: &Number, out: &mut String) {
    let Some(f) = n.as_f64().filter(|_| n.is_f64()) else {
        out.push_str(&n.to_string());
        return;
    };
    let sci = format!("{f:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    if (-4..16).contains(&exp) {
        let fixed = f.to_string();
        out.push_str(&fixed);
        if !fixed.contains('.') {
            out.push_str(".0");
        }
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        let _ = write!(out, "{mantissa}e{sign}{:02}", exp.abs());
    }
}

fn write_str(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{unit:04x}");
                }
            }
        }
    }
    out.push('"');
}

use crate::error::{JwtError, JwtResult};
use serde_json::Value;
use std::fmt;

/// Closed set of claim kinds. The kind fixes the value type and the
/// validation rules of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimKind {
    Issuer,
    Subject,
    Audience,
    Expiration,
    NotBefore,
    IssuedAt,
    JwtId,
    /// Any JSON value, no rules.
    Custom,
}

impl ClaimKind {
    /// Kind of a registered claim name, `None` for anything else.
    #[must_use]
    pub fn for_registered_name(name: &str) -> Option<Self> {
        match name {
            super::ISSUER => Some(ClaimKind::Issuer),
            super::SUBJECT => Some(ClaimKind::Subject),
            super::AUDIENCE => Some(ClaimKind::Audience),
            super::EXPIRATION => Some(ClaimKind::Expiration),
            super::NOT_BEFORE => Some(ClaimKind::NotBefore),
            super::ISSUED_AT => Some(ClaimKind::IssuedAt),
            super::JWT_ID => Some(ClaimKind::JwtId),
            _ => None,
        }
    }

    /// True for the kinds carrying a Unix timestamp.
    #[must_use]
    pub fn is_timestamp(self) -> bool {
        matches!(
            self,
            ClaimKind::Expiration | ClaimKind::NotBefore | ClaimKind::IssuedAt
        )
    }
}

/// Claim value, tagged by kind.
#[derive(Clone, PartialEq)]
pub enum ClaimValue {
    Issuer(String),
    Subject(String),
    /// A non-empty string or a non-empty array of non-empty strings.
    Audience(Value),
    Expiration(i64),
    NotBefore(i64),
    IssuedAt(i64),
    JwtId(String),
    Custom(Value),
}

/// Custom Debug implementation that redacts the subject.
///
/// Subjects are user identifiers and must not end up in logs.
impl fmt::Debug for ClaimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimValue::Issuer(v) => f.debug_tuple("Issuer").field(v).finish(),
            ClaimValue::Subject(_) => f.debug_tuple("Subject").field(&"[REDACTED]").finish(),
            ClaimValue::Audience(v) => f.debug_tuple("Audience").field(v).finish(),
            ClaimValue::Expiration(v) => f.debug_tuple("Expiration").field(v).finish(),
            ClaimValue::NotBefore(v) => f.debug_tuple("NotBefore").field(v).finish(),
            ClaimValue::IssuedAt(v) => f.debug_tuple("IssuedAt").field(v).finish(),
            ClaimValue::JwtId(v) => f.debug_tuple("JwtId").field(v).finish(),
            ClaimValue::Custom(v) => f.debug_tuple("Custom").field(v).finish(),
        }
    }
}

impl ClaimValue {
    #[must_use]
    pub fn kind(&self) -> ClaimKind {
        match self {
            ClaimValue::Issuer(_) => ClaimKind::Issuer,
            ClaimValue::Subject(_) => ClaimKind::Subject,
            ClaimValue::Audience(_) => ClaimKind::Audience,
            ClaimValue::Expiration(_) => ClaimKind::Expiration,
            ClaimValue::NotBefore(_) => ClaimKind::NotBefore,
            ClaimValue::IssuedAt(_) => ClaimKind::IssuedAt,
            ClaimValue::JwtId(_) => ClaimKind::JwtId,
            ClaimValue::Custom(_) => ClaimKind::Custom,
        }
    }

    /// JSON representation handed to the signing provider.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            ClaimValue::Issuer(s) | ClaimValue::Subject(s) | ClaimValue::JwtId(s) => {
                Value::String(s.clone())
            }
            ClaimValue::Expiration(ts) | ClaimValue::NotBefore(ts) | ClaimValue::IssuedAt(ts) => {
                Value::from(*ts)
            }
            ClaimValue::Audience(v) | ClaimValue::Custom(v) => v.clone(),
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            ClaimValue::Expiration(ts) | ClaimValue::NotBefore(ts) | ClaimValue::IssuedAt(ts) => {
                Some(*ts)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ClaimValue::Issuer(s) | ClaimValue::Subject(s) | ClaimValue::JwtId(s) => Some(s),
            ClaimValue::Audience(Value::String(s)) | ClaimValue::Custom(Value::String(s)) => {
                Some(s)
            }
            _ => None,
        }
    }
}

/// Inputs of every temporal rule: the current instant and the leeway that
/// absorbs clock skew between issuer and verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeContext {
    /// Current time (Unix epoch seconds).
    pub now: i64,
    /// Clock skew tolerance in seconds.
    pub leeway: i64,
}

impl TimeContext {
    #[must_use]
    pub fn new(now: i64, leeway: i64) -> Self {
        Self { now, leeway }
    }

    /// `timestamp` lies after now, even once the leeway is subtracted.
    #[must_use]
    pub fn is_future(&self, timestamp: i64) -> bool {
        timestamp.saturating_sub(self.leeway) > self.now
    }

    /// `timestamp` lies before now, even once the leeway is added.
    #[must_use]
    pub fn is_past(&self, timestamp: i64) -> bool {
        timestamp.saturating_add(self.leeway) < self.now
    }
}

/// A single named, typed claim. Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    name: String,
    value: ClaimValue,
}

impl Claim {
    /// Build a claim of `kind` from a raw JSON value, applying create-time
    /// rules.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::InvalidClaim` when:
    /// - a timestamp claim is not an integer timestamp
    /// - `iat` lies in the future (beyond leeway)
    /// - `iss`, `sub` or `jti` is empty or not a scalar (numbers and booleans
    ///   are stored in their string form)
    /// - `aud` is neither a non-empty string nor a non-empty string array
    pub fn create(
        name: impl Into<String>,
        kind: ClaimKind,
        raw: Value,
        time: TimeContext,
    ) -> JwtResult<Self> {
        let name = name.into();
        let value = match kind {
            ClaimKind::Issuer => ClaimValue::Issuer(scalar_string(&name, &raw)?),
            ClaimKind::Subject => ClaimValue::Subject(scalar_string(&name, &raw)?),
            ClaimKind::JwtId => ClaimValue::JwtId(scalar_string(&name, &raw)?),
            ClaimKind::Audience => {
                if !is_valid_audience(&raw) {
                    return Err(JwtError::invalid_claim(&name));
                }
                ClaimValue::Audience(raw)
            }
            ClaimKind::Expiration => ClaimValue::Expiration(timestamp(&name, &raw)?),
            ClaimKind::NotBefore => ClaimValue::NotBefore(timestamp(&name, &raw)?),
            ClaimKind::IssuedAt => {
                let iat = timestamp(&name, &raw)?;
                if time.is_future(iat) {
                    tracing::debug!(
                        target: "jwt_auth.claims",
                        iat = iat,
                        now = time.now,
                        leeway = time.leeway,
                        "Claim rejected: iat in the future"
                    );
                    return Err(JwtError::invalid_claim(&name));
                }
                ClaimValue::IssuedAt(iat)
            }
            ClaimKind::Custom => ClaimValue::Custom(raw),
        };

        Ok(Self { name, value })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> ClaimKind {
        self.value.kind()
    }

    #[must_use]
    pub fn value(&self) -> &ClaimValue {
        &self.value
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        self.value.to_json()
    }

    /// Rules applied while the claim is part of a payload under construction.
    ///
    /// # Errors
    ///
    /// - `TokenInvalid` if `iat` or `nbf` lies in the future
    /// - `TokenExpired` if `exp` lies in the past
    pub fn validate_payload(&self, time: TimeContext) -> JwtResult<()> {
        match self.value {
            ClaimValue::IssuedAt(iat) if time.is_future(iat) => Err(JwtError::TokenInvalid(
                "Issued At (iat) timestamp cannot be in the future".to_string(),
            )),
            ClaimValue::NotBefore(nbf) if time.is_future(nbf) => Err(JwtError::TokenInvalid(
                "Not Before (nbf) timestamp cannot be in the future".to_string(),
            )),
            ClaimValue::Expiration(exp) if time.is_past(exp) => {
                Err(JwtError::TokenExpired("Token has expired".to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Rules applied in the refresh flow. Only `iat` participates: the token
    /// stays refreshable until `iat + refresh_ttl` minutes.
    ///
    /// # Errors
    ///
    /// Returns `TokenExpired` once the refresh window has elapsed.
    pub fn validate_refresh(&self, time: TimeContext, refresh_ttl_minutes: i64) -> JwtResult<()> {
        if let ClaimValue::IssuedAt(iat) = self.value {
            let window_end = iat.saturating_add(refresh_ttl_minutes.saturating_mul(60));
            if time.is_past(window_end) {
                return Err(JwtError::TokenExpired(
                    "Token has expired and can no longer be refreshed".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Compare against a raw value.
    ///
    /// Strict mode requires JSON equality. Loose mode also treats a number and
    /// its decimal string as equal (`"42"` matches `42`).
    #[must_use]
    pub fn matches(&self, other: &Value, strict: bool) -> bool {
        let own = self.to_json();
        if own == *other || strict {
            return own == *other;
        }
        match (scalar_repr(&own), scalar_repr(other)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

fn scalar_string(name: &str, raw: &Value) -> JwtResult<String> {
    match raw {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(JwtError::invalid_claim(name)),
    }
}

fn timestamp(name: &str, raw: &Value) -> JwtResult<i64> {
    parse_timestamp(raw).ok_or_else(|| JwtError::invalid_claim(name))
}

/// Accepts integers, integral floats and numeric strings.
fn parse_timestamp(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                // Integral and finite; values outside i64 saturate.
                .map(|f| {
                    #[allow(clippy::cast_possible_truncation)]
                    let ts = f as i64;
                    ts
                })
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn is_valid_audience(raw: &Value) -> bool {
    match raw {
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => {
            !items.is_empty()
                && items
                    .iter()
                    .all(|item| matches!(item, Value::String(s) if !s.is_empty()))
        }
        _ => false,
    }
}

fn scalar_repr(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

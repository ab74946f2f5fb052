//! Boundary deserializers for fields clients send with loose JSON types.

use serde::{de::Error, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Int(i64),
    Text(String),
}

/// A media id given as a JSON string or integer, normalized to its string form.
pub fn media_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<IdRepr>::deserialize(deserializer)? {
        None => None,
        Some(IdRepr::Int(n)) => Some(n.to_string()),
        Some(IdRepr::Text(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
    })
}

/// A sequential id given as a JSON integer or numeric string.
pub fn record_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IdRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IdRepr::Int(n)) => Ok(Some(n)),
        Some(IdRepr::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(IdRepr::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("`{s}` is not a valid id"))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreRepr {
    Number(f64),
    Text(String),
}

/// A score given as a number, null, the empty string or a numeric string.
pub fn score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<ScoreRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(ScoreRepr::Number(n)) => Ok(Some(n)),
        Some(ScoreRepr::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(ScoreRepr::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("`{s}` is not a valid score"))),
    }
}

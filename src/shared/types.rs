use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// A latitude/longitude pair as the backend stores it
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

impl Coordinates {
    pub const ZERO: Coordinates = Coordinates {
        latitude: 0.0,
        longitude: 0.0,
    };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Prefer `image` over `device`, axis by axis, whenever the image value is non-zero
    pub fn prefer(image: Coordinates, device: Coordinates) -> Coordinates {
        Coordinates {
            latitude: if image.latitude != 0.0 {
                image.latitude
            } else {
                device.latitude
            },
            longitude: if image.longitude != 0.0 {
                image.longitude
            } else {
                device.longitude
            },
        }
    }
}

/// One key with its confidence score, score already rounded for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEntry {
    pub key: String,
    pub score: f64,
}

/// Round a confidence score to one decimal, half away from zero
pub fn round_score(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}

/// Key to score map that keeps the order the backend sent the keys in
///
/// Ties in [`Scores::ranked`] fall back to that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scores(IndexMap<String, f64>);

impl Scores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite, keeping the first-seen position of the key
    pub fn insert(&mut self, key: impl Into<String>, score: f64) {
        self.0.insert(key.into(), score);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Entries sorted by descending score, truncated to `limit` when given
    pub fn ranked(&self, limit: Option<usize>) -> Vec<ScoredEntry> {
        let mut sorted: Vec<(&String, &f64)> = self.0.iter().collect();
        // Stable sort: equal scores keep backend order
        sorted.sort_by(|a, b| b.1.total_cmp(a.1));

        sorted
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|(key, score)| ScoredEntry {
                key: key.clone(),
                score: round_score(*score),
            })
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Scores {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(key, score)| (key.into(), score)).collect())
    }
}

/// `deserialize_with` helper: an explicit `null` becomes `T::default()`
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

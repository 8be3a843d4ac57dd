use std::collections::BTreeMap;

/// Purchased quantity per food, as produced by a solve. Read-only once built.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    quantities: BTreeMap<String, f64>,
}

impl Plan {
    pub fn new(quantities: BTreeMap<String, f64>) -> Self {
        Self { quantities }
    }

    /// Quantity bought of `food`, zero when the plan does not mention it
    pub fn quantity(&self, food: &str) -> f64 {
        self.quantities.get(food).copied().unwrap_or(0.0)
    }

    pub fn get(&self, food: &str) -> Option<f64> {
        self.quantities.get(food).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.quantities.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Plan {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            quantities: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

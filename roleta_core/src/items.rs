use serde::{Deserialize, Serialize};

/// Weight assigned to an item when none is given.
pub const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WheelError {
    #[error("item name is empty")]
    EmptyName,
    #[error("duplicate item name: {0}")]
    DuplicateName(String),
    #[error("no such item: {0}")]
    UnknownItem(String),
    #[error("weight must be positive and finite, got {0}")]
    InvalidWeight(f64),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub name: String,
    pub weight: f64,
}

/// Ordered list of items with unique names and strictly positive weights.
/// Insertion order is meaningful: it fixes sector placement on the wheel.
///
/// Serializes as a plain JSON array of items; deserialization re-validates,
/// so an edited store cannot smuggle invalid state past this boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<Item>")]
pub struct ItemList(Vec<Item>);

impl ItemList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item with the default weight.
    pub fn add(&mut self, name: &str) -> Result<(), WheelError> {
        self.add_weighted(name, DEFAULT_WEIGHT)
    }

    pub fn add_weighted(&mut self, name: &str, weight: f64) -> Result<(), WheelError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WheelError::EmptyName);
        }
        if self.get(name).is_some() {
            return Err(WheelError::DuplicateName(name.to_string()));
        }
        self.0.push(Item {
            name: name.to_string(),
            weight: validate_weight(weight)?,
        });
        Ok(())
    }

    /// Remove an item by name, preserving the order of the rest.
    pub fn remove(&mut self, name: &str) -> Result<Item, WheelError> {
        let idx = self
            .0
            .iter()
            .position(|i| i.name == name)
            .ok_or_else(|| WheelError::UnknownItem(name.to_string()))?;
        Ok(self.0.remove(idx))
    }

    pub fn set_weight(&mut self, name: &str, weight: f64) -> Result<(), WheelError> {
        let weight = validate_weight(weight)?;
        let item = self
            .0
            .iter_mut()
            .find(|i| i.name == name)
            .ok_or_else(|| WheelError::UnknownItem(name.to_string()))?;
        item.weight = weight;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Item> {
        self.0.iter().find(|i| i.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.0.iter()
    }

    pub fn items(&self) -> &[Item] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.0.iter().map(|i| i.weight).sum()
    }
}

impl TryFrom<Vec<Item>> for ItemList {
    type Error = WheelError;

    fn try_from(items: Vec<Item>) -> Result<Self, Self::Error> {
        let mut list = Self::new();
        for item in items {
            list.add_weighted(&item.name, item.weight)?;
        }
        Ok(list)
    }
}

fn validate_weight(weight: f64) -> Result<f64, WheelError> {
    if weight.is_finite() && weight > 0.0 {
        Ok(weight)
    } else {
        Err(WheelError::InvalidWeight(weight))
    }
}

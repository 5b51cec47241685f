use serde::{Deserialize, Serialize};

pub const SLOT_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationSlots(Vec<String>);

impl Default for LocationSlots {
    fn default() -> Self {
        Self::normalize(Vec::new())
    }
}

pub fn placeholder(slot: usize) -> String {
    format!("Location {}", slot + 1)
}

impl LocationSlots {
    /// Pads with placeholders or truncates so there are always exactly five slots.
    pub fn normalize(mut labels: Vec<String>) -> Self {
        labels.truncate(SLOT_COUNT);
        while labels.len() < SLOT_COUNT {
            labels.push(placeholder(labels.len()));
        }
        Self(labels)
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    /// Returns `false` for an out-of-range slot. A blank label restores the placeholder.
    pub fn rename(&mut self, slot: usize, label: &str) -> bool {
        let Some(entry) = self.0.get_mut(slot) else {
            return false;
        };
        let label = label.trim();
        *entry = if label.is_empty() {
            placeholder(slot)
        } else {
            label.to_string()
        };
        true
    }
}

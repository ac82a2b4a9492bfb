//! Permanent progression record and the shop that spends it

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::store::JsonStore;

/// Permanent upgrade levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaUpgrades {
    pub max_health: u32,
    pub damage: u32,
    pub coin_gain: u32,
}

/// Currency and upgrade levels that survive between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaProgress {
    pub coins: u64,
    pub upgrades: MetaUpgrades,
}

/// Items for sale in the shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShopItem {
    MaxHealth,
    Damage,
    CoinGain,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PurchaseError {
    #[error("need {cost} coins, have {available}")]
    InsufficientCoins { cost: u64, available: u64 },

    #[error("the shop is closed")]
    ShopClosed,
}

impl ShopItem {
    pub const ALL: [ShopItem; 3] = [ShopItem::MaxHealth, ShopItem::Damage, ShopItem::CoinGain];

    pub fn name(self) -> &'static str {
        match self {
            ShopItem::MaxHealth => "Max Health",
            ShopItem::Damage => "Base Damage",
            ShopItem::CoinGain => "Coin Greed",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ShopItem::MaxHealth => "+20 HP",
            ShopItem::Damage => "+2 Damage",
            ShopItem::CoinGain => "+20% Coins",
        }
    }

    pub fn cost_base(self) -> u64 {
        match self {
            ShopItem::MaxHealth => 100,
            ShopItem::Damage => 150,
            ShopItem::CoinGain => 200,
        }
    }
}

/// Non-negative whole number from a loosely typed JSON value
fn lenient_count(value: Option<&Value>) -> Option<u64> {
    let value = value?;
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    value.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.floor() as u64)
}

impl MetaProgress {
    /// Parse a save field by field; anything missing or malformed falls back to zero
    pub fn from_json_str(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                log::warn!("Save data corrupted ({e}), resetting");
                Self::default()
            }
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let upgrades = value.get("upgrades");
        let level = |key: &str| {
            lenient_count(upgrades.and_then(|u| u.get(key)))
                .map(|n| n.min(u32::MAX as u64) as u32)
                .unwrap_or(0)
        };
        Self {
            coins: lenient_count(value.get("coins")).unwrap_or(0),
            upgrades: MetaUpgrades {
                max_health: level("maxHealth"),
                damage: level("damage"),
                coin_gain: level("coinGain"),
            },
        }
    }

    /// Load from disk, substituting defaults for anything unreadable
    pub fn load(store: &JsonStore) -> Self {
        match store.read_string() {
            Ok(Some(text)) => {
                let meta = Self::from_json_str(&text);
                log::info!("Loaded save: {} coins", meta.coins);
                meta
            }
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("Failed to read save ({e}), using defaults");
                Self::default()
            }
        }
    }

    pub fn level(&self, item: ShopItem) -> u32 {
        match item {
            ShopItem::MaxHealth => self.upgrades.max_health,
            ShopItem::Damage => self.upgrades.damage,
            ShopItem::CoinGain => self.upgrades.coin_gain,
        }
    }

    /// Price of the next level
    pub fn cost(&self, item: ShopItem) -> u64 {
        item.cost_base() * (self.level(item) as u64 + 1)
    }

    /// Spend coins on the next level. Returns the new level.
    pub fn purchase(&mut self, item: ShopItem) -> Result<u32, PurchaseError> {
        let cost = self.cost(item);
        if self.coins < cost {
            return Err(PurchaseError::InsufficientCoins {
                cost,
                available: self.coins,
            });
        }
        self.coins -= cost;
        let slot = match item {
            ShopItem::MaxHealth => &mut self.upgrades.max_health,
            ShopItem::Damage => &mut self.upgrades.damage,
            ShopItem::CoinGain => &mut self.upgrades.coin_gain,
        };
        *slot = slot.saturating_add(1);
        Ok(*slot)
    }
}

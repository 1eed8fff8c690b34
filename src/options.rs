use crate::events::Side;
use fuels::types::AssetId;

/// Allowance the game contract must hold before token wagers are accepted.
pub const REQUIRED_ALLOWANCE: u128 = 500_000_000_000_000_000_000_000;

/// Base-asset decimals used for the stake tier labels.
pub const UNITS_PER_COIN: u64 = 1_000_000_000;

/// Demo wager token, funded alongside the base asset in local runs.
pub fn chip_asset_id() -> AssetId {
    AssetId::from([1u8; 32])
}

/// The native asset wagers with attached value and skips approval entirely.
pub fn is_native(token: &AssetId) -> bool {
    *token == AssetId::zeroed()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SideOption {
    pub id: usize,
    pub name: &'static str,
    pub value: Side,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakeOption {
    pub id: usize,
    pub name: String,
    pub value: u64,
}

pub fn side_options() -> Vec<SideOption> {
    vec![
        SideOption {
            id: 0,
            name: "HEADS",
            value: Side::Heads,
        },
        SideOption {
            id: 1,
            name: "TAILS",
            value: Side::Tails,
        },
    ]
}

/// Ordered stake tiers for a wager token. Unknown tokens have no tiers and the
/// selection phase stays unreachable for them.
pub fn stake_options(token: &AssetId) -> Vec<StakeOption> {
    let tiers: &[(&str, u64)] = if is_native(token) {
        &[
            ("0.1 ETH", UNITS_PER_COIN / 10),
            ("0.25 ETH", UNITS_PER_COIN / 4),
            ("0.5 ETH", UNITS_PER_COIN / 2),
            ("1 ETH", UNITS_PER_COIN),
        ]
    } else if *token == chip_asset_id() {
        &[
            ("100 CHIP", 100 * UNITS_PER_COIN),
            ("250 CHIP", 250 * UNITS_PER_COIN),
            ("500 CHIP", 500 * UNITS_PER_COIN),
        ]
    } else {
        &[]
    };
    tiers
        .iter()
        .enumerate()
        .map(|(id, (name, value))| StakeOption {
            id,
            name: (*name).to_string(),
            value: *value,
        })
        .collect()
}

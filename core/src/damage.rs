//! Static type and element effectiveness tables.
//!
//! Both tables are square and indexed by [`Category::index`]. A missing key on
//! either side is neutral, never an error.

use serde::{Deserialize, Serialize};

/// Label that indexes one axis of an effectiveness table.
pub trait Category: Copy {
    /// Row/column of the label inside its table.
    fn index(self) -> usize;
}

/// How a creature delivers its attacks, used as the first damage-table key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackType {
    /// Close-quarters attacker.
    Melee,
    /// Attacker that fires projectiles.
    Ranged,
    /// Splash attacker.
    Area,
    /// Mounted charger.
    Cavalry,
    /// Airborne attacker.
    Flying,
}

impl Category for AttackType {
    fn index(self) -> usize {
        self as usize
    }
}

/// Elemental affinity, used as the second damage-table key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    /// Fire affinity.
    Fire,
    /// Water affinity.
    Water,
    /// Earth affinity.
    Earth,
    /// Wind affinity.
    Wind,
    /// Thunder affinity.
    Thunder,
    /// Dark affinity.
    Dark,
    /// Light affinity.
    Light,
}

impl Category for Element {
    fn index(self) -> usize {
        self as usize
    }
}

/// Rows are attackers, columns defenders, in [`AttackType`] declaration order.
pub const TYPE_EFFECTIVENESS: [[f32; 5]; 5] = [
    [0.0, -0.2, 0.0, 0.0, 0.2],
    [0.2, 0.0, 0.0, -0.2, 0.0],
    [0.0, 0.0, 0.0, 0.2, -0.2],
    [0.0, 0.2, -0.2, 0.0, 0.0],
    [-0.2, 0.0, 0.2, 0.0, 0.0],
];

/// Rows are attackers, columns defenders, in [`Element`] declaration order.
pub const ELEMENT_EFFECTIVENESS: [[f32; 7]; 7] = [
    [0.0, -0.4, 0.4, 0.0, 0.0, 0.0, 0.0],
    [0.4, 0.0, 0.0, 0.0, -0.4, 0.0, 0.0],
    [-0.4, 0.0, 0.0, 0.4, 0.0, 0.0, 0.0],
    [0.0, 0.0, -0.4, 0.0, 0.4, 0.0, 0.0],
    [0.0, 0.4, 0.0, -0.4, 0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 0.0, 0.0, -0.4, 0.4],
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.4, -0.4],
];

/// Attack type and element of a combatant; either may be absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatProfile {
    /// Delivery style used as the type-table key.
    pub attack_type: Option<AttackType>,
    /// Affinity used as the element-table key.
    pub element: Option<Element>,
}

impl CombatProfile {
    /// Creates a profile from its two optional keys.
    #[must_use]
    pub const fn new(attack_type: Option<AttackType>, element: Option<Element>) -> Self {
        Self {
            attack_type,
            element,
        }
    }
}

/// Looks up the modifier for `attacker` striking `defender`.
///
/// Returns 0 when either key is absent.
#[must_use]
pub fn effectiveness<C, const N: usize>(
    table: &[[f32; N]; N],
    attacker: Option<C>,
    defender: Option<C>,
) -> f32
where
    C: Category,
{
    let (Some(attacker), Some(defender)) = (attacker, defender) else {
        return 0.0;
    };
    table
        .get(attacker.index())
        .and_then(|row| row.get(defender.index()))
        .copied()
        .unwrap_or(0.0)
}

/// Applies both effectiveness modifiers to `base` damage.
///
/// The result is `base × (1 + type + element)`, never negative.
#[must_use]
pub fn modified_damage(base: f32, attacker: CombatProfile, defender: CombatProfile) -> f32 {
    let type_modifier = effectiveness(
        &TYPE_EFFECTIVENESS,
        attacker.attack_type,
        defender.attack_type,
    );
    let element_modifier = effectiveness(
        &ELEMENT_EFFECTIVENESS,
        attacker.element,
        defender.element,
    );
    (base * (1.0 + type_modifier + element_modifier)).max(0.0)
}

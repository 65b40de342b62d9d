//! Weapon profiles and the four-slot loadout

use serde::{Deserialize, Serialize};

use crate::error::IntentError;

/// Weapons, in slot order (slot 1 = pistol)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    Pistol,
    Smg,
    Shotgun,
    Carbine,
}

/// Static weapon profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponStats {
    /// Damage per round
    pub damage: f32,
    /// Magazine capacity
    pub mag_size: u32,
    /// Seconds to refill the magazine
    pub reload_time: f32,
    /// Seconds between trigger pulls
    pub rof: f32,
    /// Effective radius around the aim point (px)
    pub spread: f32,
    /// Rounds consumed per trigger pull; only pellet weapons fire more than one
    pub burst: u32,
    /// Pellet weapons hit everything inside `spread`, not just the top target
    pub pellets: bool,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 4] = [
        WeaponKind::Pistol,
        WeaponKind::Smg,
        WeaponKind::Shotgun,
        WeaponKind::Carbine,
    ];

    pub fn stats(&self) -> WeaponStats {
        match self {
            WeaponKind::Pistol => WeaponStats {
                damage: 25.0,
                mag_size: 12,
                reload_time: 1.0,
                rof: 0.2,
                spread: 2.0,
                burst: 1,
                pellets: false,
            },
            WeaponKind::Smg => WeaponStats {
                damage: 18.0,
                mag_size: 32,
                reload_time: 1.1,
                rof: 0.08,
                spread: 4.0,
                burst: 1,
                pellets: false,
            },
            WeaponKind::Shotgun => WeaponStats {
                damage: 6.0,
                mag_size: 8,
                reload_time: 1.3,
                rof: 0.5,
                spread: 40.0,
                burst: 2,
                pellets: true,
            },
            WeaponKind::Carbine => WeaponStats {
                damage: 35.0,
                mag_size: 20,
                reload_time: 1.4,
                rof: 0.15,
                spread: 1.5,
                burst: 1,
                pellets: false,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponKind::Pistol => "pistol",
            WeaponKind::Smg => "smg",
            WeaponKind::Shotgun => "shotgun",
            WeaponKind::Carbine => "carbine",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.as_str() == s)
    }

    /// 1-based slot number
    pub fn slot(&self) -> u8 {
        match self {
            WeaponKind::Pistol => 1,
            WeaponKind::Smg => 2,
            WeaponKind::Shotgun => 3,
            WeaponKind::Carbine => 4,
        }
    }

    pub fn from_slot(slot: u8) -> Option<Self> {
        match slot {
            1..=4 => Some(Self::ALL[usize::from(slot - 1)]),
            _ => None,
        }
    }
}

/// One loadout slot; each slot keeps its own magazine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponSlot {
    pub kind: WeaponKind,
    pub unlocked: bool,
    pub ammo: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loadout {
    slots: [WeaponSlot; 4],
    active: usize,
}

impl Loadout {
    /// Loadout with `unlocked` weapons available. The pistol is always unlocked.
    pub fn new(unlocked: &[WeaponKind]) -> Self {
        let slots = WeaponKind::ALL.map(|kind| WeaponSlot {
            kind,
            unlocked: kind == WeaponKind::Pistol || unlocked.contains(&kind),
            ammo: kind.stats().mag_size,
        });
        Self { slots, active: 0 }
    }

    pub fn active(&self) -> &WeaponSlot {
        &self.slots[self.active]
    }

    pub fn active_mut(&mut self) -> &mut WeaponSlot {
        &mut self.slots[self.active]
    }

    pub fn active_stats(&self) -> WeaponStats {
        self.active().kind.stats()
    }

    /// Make `slot` (1-4) the active weapon
    pub fn select(&mut self, slot: u8) -> Result<WeaponKind, IntentError> {
        let kind = WeaponKind::from_slot(slot).ok_or(IntentError::NoSuchSlot(slot))?;
        let index = usize::from(slot - 1);
        if !self.slots[index].unlocked {
            return Err(IntentError::LockedWeapon(slot));
        }
        if index == self.active {
            return Err(IntentError::AlreadyActive(slot));
        }
        self.active = index;
        Ok(kind)
    }

    /// Refill the active magazine to exactly its capacity
    pub fn refill_active(&mut self) {
        let capacity = self.active_stats().mag_size;
        self.active_mut().ammo = capacity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_mapping() {
        for kind in WeaponKind::ALL {
            assert_eq!(WeaponKind::from_slot(kind.slot()), Some(kind));
            assert_eq!(WeaponKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(WeaponKind::from_slot(0), None);
        assert_eq!(WeaponKind::from_slot(5), None);
    }

    #[test]
    fn test_select_rules() {
        let mut loadout = Loadout::new(&[WeaponKind::Shotgun]);
        assert_eq!(loadout.active().kind, WeaponKind::Pistol);
        assert_eq!(loadout.select(1), Err(IntentError::AlreadyActive(1)));
        assert_eq!(loadout.select(2), Err(IntentError::LockedWeapon(2)));
        assert_eq!(loadout.select(9), Err(IntentError::NoSuchSlot(9)));
        assert_eq!(loadout.active().kind, WeaponKind::Pistol);
        assert_eq!(loadout.select(3), Ok(WeaponKind::Shotgun));
        assert_eq!(loadout.active().kind, WeaponKind::Shotgun);
    }

    #[test]
    fn test_magazines_are_per_slot() {
        let mut loadout = Loadout::new(&[WeaponKind::Carbine]);
        loadout.active_mut().ammo = 3;
        loadout.select(4).unwrap();
        assert_eq!(loadout.active().ammo, 20);
        loadout.select(1).unwrap();
        assert_eq!(loadout.active().ammo, 3);
        loadout.refill_active();
        assert_eq!(loadout.active().ammo, 12);
    }
}

//! Common test utilities - roster builders for combat scenario tests

use skirmish::{
    AbilityScores, ClassKind, ClassProfile, Combatant, DamageType, DiceRoll, Weapon,
    WeaponCategory,
};

/// Initialize tracing output for a test (safe to call repeatedly)
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skirmish=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

pub fn longsword() -> Weapon {
    Weapon::new(
        "longsword",
        DiceRoll::new(1, 8, 0),
        WeaponCategory::Martial,
        DamageType::Slashing,
    )
}

/// Fighter with +2 attack bonus, +1 Strength modifier, AC 16, 20 hp
pub fn fighter(name: &str, side: &str) -> Combatant {
    let mut abilities = AbilityScores::uniform(10);
    abilities.strength = 12;
    Combatant::new(
        name,
        side,
        ClassProfile::new(ClassKind::Fighter, 8, 2, 14),
        abilities,
    )
    .with_hit_points(20)
    .with_armor_class(16)
}

/// Lightly armored monster, easy to hit
pub fn goblin(name: &str, hit_points: i32) -> Combatant {
    Combatant::new(
        name,
        "monsters",
        ClassProfile::new(ClassKind::Monster, 6, 2, 16),
        AbilityScores::uniform(10),
    )
    .with_hit_points(hit_points)
    .with_armor_class(5)
}

/// Magic-user with the given spell slots per level, AC 10, 12 hp
pub fn wizard(name: &str, side: &str, slots: &[u32]) -> Combatant {
    Combatant::new(
        name,
        side,
        ClassProfile::new(ClassKind::MagicUser, 4, 0, 15),
        AbilityScores::uniform(10),
    )
    .with_hit_points(12)
    .with_spell_slots(slots)
}

#[cfg(test)]
mod tests {
    use glam::DVec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use defender_core::components::Telegraph;
    use defender_core::constants::*;
    use defender_core::enums::{EnemyKind, TelegraphKind};

    use crate::fsm::{evaluate, EnemyAction, EnemyContext};
    use crate::profiles::get_profile;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    /// Ship at the origin, player straight down (+y) at `distance`.
    fn make_context(kind: EnemyKind, distance: f64, now: f64) -> EnemyContext {
        EnemyContext {
            kind,
            position: DVec2::ZERO,
            velocity: DVec2::ZERO,
            player_position: DVec2::new(0.0, distance),
            player_velocity: DVec2::ZERO,
            now,
            dt: DT,
            stunned: false,
            next_fire_at: 0.0,
            next_grenade_at: 0.0,
            next_snap_at: 0.0,
            telegraph: None,
        }
    }

    #[test]
    fn test_fighter_fires_in_range() {
        let ctx = make_context(EnemyKind::Fighter, 300.0, 1.0);
        let update = evaluate(&ctx, &mut rng());
        assert_eq!(update.actions.len(), 1);
        match update.actions[0] {
            EnemyAction::Shoot { direction, damage, .. } => {
                assert!((direction - DVec2::Y).length() < 1e-9);
                assert_eq!(damage, get_profile(EnemyKind::Fighter).shot_damage);
            }
            other => panic!("expected Shoot, got {other:?}"),
        }
        let cooldown = get_profile(EnemyKind::Fighter).fire_cooldown;
        assert!(update.next_fire_at >= 1.0 + cooldown * 0.9);
        assert!(update.next_fire_at <= 1.0 + cooldown * 1.1);
    }

    #[test]
    fn test_fighter_holds_fire_out_of_range() {
        let range = get_profile(EnemyKind::Fighter).engage_range;
        let ctx = make_context(EnemyKind::Fighter, range + 10.0, 1.0);
        let update = evaluate(&ctx, &mut rng());
        assert!(update.actions.is_empty());
        assert_eq!(update.next_fire_at, 0.0);
    }

    #[test]
    fn test_cooldown_gates_fire() {
        let mut ctx = make_context(EnemyKind::Fighter, 300.0, 1.0);
        ctx.next_fire_at = 1.5;
        let update = evaluate(&ctx, &mut rng());
        assert!(update.actions.is_empty());
        assert_eq!(update.next_fire_at, 1.5);
    }

    #[test]
    fn test_approach_when_far_and_retreat_when_close() {
        let far = evaluate(&make_context(EnemyKind::Fighter, 700.0, 0.0), &mut rng());
        assert!(far.velocity.y > 0.0, "should close in");

        let near = evaluate(&make_context(EnemyKind::Fighter, 100.0, 0.0), &mut rng());
        assert!(near.velocity.y < 0.0, "should back off");

        let band = evaluate(&make_context(EnemyKind::Fighter, 320.0, 0.0), &mut rng());
        assert_eq!(band.velocity, DVec2::ZERO);
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut ctx = make_context(EnemyKind::Fighter, 700.0, 0.0);
        ctx.velocity = DVec2::new(0.0, 10_000.0);
        let update = evaluate(&ctx, &mut rng());
        assert!(update.velocity.length() <= get_profile(EnemyKind::Fighter).speed + 1e-9);
    }

    #[test]
    fn test_sniper_begins_charge_with_lead() {
        let mut ctx = make_context(EnemyKind::Sniper, 500.0, 2.0);
        ctx.player_velocity = DVec2::new(100.0, 0.0);
        let update = evaluate(&ctx, &mut rng());
        assert_eq!(update.actions.len(), 1);
        match update.actions[0] {
            EnemyAction::BeginTelegraph { kind, aim, fires_at } => {
                assert_eq!(kind, TelegraphKind::SniperBeam);
                assert!((aim.x - 100.0 * SNIPER_LEAD_SECS).abs() < 1e-9);
                assert!((fires_at - (2.0 + SNIPER_CHARGE_SECS)).abs() < 1e-9);
            }
            other => panic!("expected telegraph, got {other:?}"),
        }
    }

    #[test]
    fn test_sniper_does_not_restart_charge() {
        let mut ctx = make_context(EnemyKind::Sniper, 500.0, 2.0);
        ctx.telegraph = Some(Telegraph {
            kind: TelegraphKind::SniperBeam,
            aim: DVec2::new(0.0, 500.0),
            started_at: 1.5,
            fires_at: 3.0,
        });
        let update = evaluate(&ctx, &mut rng());
        assert!(update.actions.is_empty());
        assert_eq!(update.next_fire_at, 0.0);
    }

    #[test]
    fn test_sniper_freezes_late_in_charge() {
        let mut ctx = make_context(EnemyKind::Sniper, 800.0, 2.8);
        ctx.velocity = DVec2::new(0.0, 50.0);
        ctx.telegraph = Some(Telegraph {
            kind: TelegraphKind::SniperBeam,
            aim: DVec2::new(0.0, 800.0),
            started_at: 1.5,
            fires_at: 3.0,
        });
        let update = evaluate(&ctx, &mut rng());
        assert_eq!(update.velocity, DVec2::ZERO);

        // Early in the charge it still moves.
        ctx.now = 2.0;
        let update = evaluate(&ctx, &mut rng());
        assert_ne!(update.velocity, DVec2::ZERO);
    }

    #[test]
    fn test_aggressive_fires_fan() {
        let ctx = make_context(EnemyKind::Aggressive, 200.0, 1.0);
        let update = evaluate(&ctx, &mut rng());
        assert_eq!(update.actions.len(), AGGRESSIVE_FAN_SHOTS);

        let angles: Vec<f64> = update
            .actions
            .iter()
            .map(|a| match a {
                EnemyAction::Shoot { direction, .. } => direction.y.atan2(direction.x),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        let spread = angles[angles.len() - 1] - angles[0];
        assert!((spread - AGGRESSIVE_FAN_ARC).abs() < 1e-9);
    }

    #[test]
    fn test_grenadier_launches_grenade() {
        let ctx = make_context(EnemyKind::Grenadier, 400.0, 1.0);
        let update = evaluate(&ctx, &mut rng());
        assert!(matches!(
            update.actions.as_slice(),
            [EnemyAction::LaunchGrenade { .. }]
        ));
    }

    #[test]
    fn test_tank_runs_all_attacks() {
        let ctx = make_context(EnemyKind::Tank, 260.0, 1.0);
        let update = evaluate(&ctx, &mut rng());
        assert_eq!(update.actions.len(), 3);
        assert!(matches!(update.actions[0], EnemyAction::Shoot { .. }));
        assert!(matches!(
            update.actions[1],
            EnemyAction::LobStunGrenade { .. }
        ));
        assert!(matches!(
            update.actions[2],
            EnemyAction::BeginTelegraph {
                kind: TelegraphKind::SnapBeam,
                ..
            }
        ));
        assert_eq!(update.next_grenade_at, 1.0 + TANK_GRENADE_COOLDOWN_SECS);
        assert_eq!(update.next_snap_at, 1.0 + TANK_SNAP_COOLDOWN_SECS);
    }

    #[test]
    fn test_stunned_ship_skips_everything() {
        let mut ctx = make_context(EnemyKind::Tank, 260.0, 1.0);
        ctx.stunned = true;
        ctx.velocity = DVec2::new(5.0, 0.0);
        let update = evaluate(&ctx, &mut rng());
        assert!(update.actions.is_empty());
        assert_eq!(update.velocity, ctx.velocity);
        assert_eq!(update.next_fire_at, ctx.next_fire_at);
    }

    #[test]
    fn test_every_archetype_has_positive_profile() {
        for kind in EnemyKind::ALL {
            let p = get_profile(kind);
            assert!(p.max_hp > 0.0, "{kind:?}");
            assert!(p.speed > 0.0, "{kind:?}");
            assert!(p.engage_range > p.standoff, "{kind:?}");
            assert!(p.score > 0, "{kind:?}");
        }
    }
}

//! Simulation constants and tuning parameters.
//!
//! Distances are pixels, speeds are px/s, times are simulation seconds.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Playfield ---

/// Default playfield width.
pub const PLAYFIELD_WIDTH: f64 = 1280.0;

/// Default playfield height.
pub const PLAYFIELD_HEIGHT: f64 = 720.0;

/// Entities this far outside the playfield are culled.
pub const CULL_MARGIN: f64 = 100.0;

/// How far outside the edge asteroids appear.
pub const ASTEROID_SPAWN_OFFSET: f64 = 50.0;

/// How far outside the edge enemy ships appear.
pub const ENEMY_SPAWN_OFFSET: f64 = 40.0;

// --- Player ship ---

pub const PLAYER_MAX_HP: f64 = 100.0;

/// Collision radius of the player ship.
pub const PLAYER_RADIUS: f64 = 20.0;

/// Thrust acceleration.
pub const PLAYER_ACCEL: f64 = 1080.0;

/// Velocity multiplier applied each tick.
pub const PLAYER_FRICTION: f64 = 0.92;

pub const PLAYER_MAX_SPEED: f64 = 180.0;

/// The ship is kept this far inside the playfield edges.
pub const PLAYER_EDGE_MARGIN: f64 = 30.0;

/// Resurrection charges at run start.
pub const PLAYER_RESURRECTIONS: u32 = 1;

// --- Player defense ---

/// Regenerating base shield cap.
pub const BASE_SHIELD_MAX: f64 = 50.0;

/// Extra capacity an overshield pickup can stack above the base cap.
pub const OVERSHIELD_MAX: f64 = 50.0;

/// Seconds without damage before the base shield regenerates.
pub const SHIELD_REGEN_DELAY_SECS: f64 = 3.0;

/// Base shield regeneration rate (points per second).
pub const SHIELD_REGEN_RATE: f64 = 10.0;

/// Shield points spent per point of damage absorbed while rapid-fire is active.
pub const RAPID_FIRE_SHIELD_COST: f64 = 1.5;

/// Damage an asteroid deals on contact with the player.
pub const ASTEROID_CONTACT_DAMAGE: f64 = 20.0;

/// Invulnerability after an asteroid contact.
pub const CONTACT_INVULNERABLE_SECS: f64 = 2.0;

/// Invulnerability and time-dilation window after a resurrection.
pub const RESURRECT_GRACE_SECS: f64 = 3.0;

/// Time-dilation factor during resurrection grace.
pub const RESURRECT_DILATION: f64 = 0.3;

// --- Abilities ---

pub const TIME_SLOW_DURATION_SECS: f64 = 3.0;

pub const TIME_SLOW_COOLDOWN_SECS: f64 = 15.0;

/// Time-dilation factor while time-slow is active.
pub const TIME_SLOW_FACTOR: f64 = 0.3;

pub const MISSILE_SALVO_COUNT: usize = 4;

pub const MISSILE_SALVO_COOLDOWN_SECS: f64 = 10.0;

/// Launch spread of a salvo (radians, total).
pub const MISSILE_SALVO_SPREAD: f64 = 0.8;

pub const MISSILE_SPEED: f64 = 420.0;

pub const MISSILE_DAMAGE: f64 = 6.0;

pub const MISSILE_LIFETIME_SECS: f64 = 4.0;

/// Full steering authority (rad/s), reached after `MISSILE_STEER_RAMP_SECS`.
pub const MISSILE_TURN_RATE: f64 = 5.0;

pub const MISSILE_STEER_RAMP_SECS: f64 = 1.0;

pub const MISSILE_RADIUS: f64 = 5.0;

/// Chance that a missile striking a shielded ship ricochets.
pub const MISSILE_RICOCHET_CHANCE: f64 = 0.5;

/// Damage multiplier per ricochet.
pub const MISSILE_RICOCHET_DAMAGE_FACTOR: f64 = 0.7;

pub const MISSILE_MAX_RICOCHETS: u32 = 3;

// --- Weapons ---

/// Holds shorter than this fire a bullet; anything longer fires a charged beam.
pub const CHARGE_TAP_THRESHOLD_SECS: f64 = 0.1;

/// Hold time at which the charged beam is fully charged.
pub const CHARGE_MAX_HOLD_SECS: f64 = 1.0;

/// Effective charge multiplier when released while stunned.
pub const CHARGE_STUN_PENALTY: f64 = 0.5;

/// Minimum delay between tap-fired bullets.
pub const TAP_FIRE_INTERVAL_SECS: f64 = 0.25;

pub const BULLET_SPEED: f64 = 360.0;

pub const BULLET_DAMAGE: f64 = 2.0;

pub const BULLET_RANGE: f64 = 900.0;

pub const PROJECTILE_RADIUS: f64 = 3.0;

pub const RAIL_MIN_DAMAGE: f64 = 2.0;

pub const RAIL_MAX_DAMAGE: f64 = 14.0;

/// Extra targets a fully charged beam can pass through.
pub const RAIL_MAX_EXTRA_HITS: u32 = 4;

pub const RAIL_MIN_LENGTH: f64 = 400.0;

pub const RAIL_MAX_LENGTH: f64 = 1200.0;

pub const RAIL_HALF_WIDTH: f64 = 10.0;

pub const RAIL_DURATION_SECS: f64 = 0.2;

/// Score multiplier for asteroids destroyed by a charged beam.
pub const RAIL_SCORE_MULTIPLIER: u64 = 2;

/// Rapid-fire interval at buff start.
pub const RAPID_FIRE_START_INTERVAL_SECS: f64 = 0.1;

/// Rapid-fire interval once the spin-up ramp completes.
pub const RAPID_FIRE_END_INTERVAL_SECS: f64 = 0.01;

pub const RAPID_FIRE_RAMP_SECS: f64 = 15.0;

/// Maximum angular jitter per rapid-fire shot at zero spin (radians).
pub const RAPID_FIRE_MAX_JITTER: f64 = 0.12;

pub const SPREAD_START_INTERVAL_SECS: f64 = 0.25;

pub const SPREAD_END_INTERVAL_SECS: f64 = 0.15;

pub const SPREAD_RAMP_SECS: f64 = 5.0;

pub const SPREAD_PELLETS: usize = 5;

/// Angle between adjacent pellets (radians).
pub const SPREAD_ANGLE_STEP: f64 = 0.15;

pub const SPREAD_DAMAGE: f64 = 1.0;

pub const SPREAD_RANGE: f64 = 320.0;

pub const SPREAD_PIERCE: u32 = 1;

/// Radius of the shrapnel pop around a pellet kill.
pub const SHRAPNEL_RADIUS: f64 = 60.0;

pub const SHRAPNEL_DAMAGE: f64 = 1.0;

/// Spin gained per second of sustained fire.
pub const SPIN_UP_RATE: f64 = 0.6;

/// Spin lost per second while not firing.
pub const SPIN_DECAY_RATE: f64 = 1.2;

/// Fraction the fire interval shrinks at full spin.
pub const SPIN_INTERVAL_BONUS: f64 = 0.5;

/// Upper bound on shots emitted in a single tick by continuous fire.
pub const MAX_SHOTS_PER_TICK: u32 = 4;

// --- Damage ---

/// Blows of at least this much damage bypass shields.
pub const INSTANT_KILL_THRESHOLD: f64 = 12.0;

// --- Asteroids ---

pub const ASTEROID_SPAWN_INTERVAL_SECS: f64 = 3.0;

/// Asteroids staggered at run start.
pub const ASTEROID_INITIAL_COUNT: u32 = 3;

pub const ASTEROID_INITIAL_STAGGER_SECS: f64 = 0.8;

pub const ASTEROID_MIN_SPEED: f64 = 18.0;

pub const ASTEROID_MAX_SPEED: f64 = 48.0;

/// Maximum rotation rate (rad/s, either direction).
pub const ASTEROID_MAX_SPIN: f64 = 1.05;

pub const SPLIT_CHILD_COUNT: usize = 3;

pub const SPLIT_CHILD_SIZE: f64 = 20.0;

pub const SPLIT_CHILD_HP: f64 = 1.0;

pub const SPLIT_CHILD_MIN_SPEED: f64 = 60.0;

pub const SPLIT_CHILD_MAX_SPEED: f64 = 150.0;

/// Angular jitter added to each split child heading (radians).
pub const SPLIT_CHILD_JITTER: f64 = 0.5;

/// Damage an enemy ship and an asteroid deal each other when they first touch.
pub const RAM_DAMAGE: f64 = 4.0;

// --- Drops ---

pub const ASTEROID_DROP_CHANCE: f64 = 0.2;

pub const SHIP_DROP_CHANCE: f64 = 0.3;

/// Independent roll on every ship kill for a rare overshield.
pub const SHIP_OVERSHIELD_CHANCE: f64 = 0.04;

pub const POWER_UP_MIN_DRIFT: f64 = 18.0;

pub const POWER_UP_MAX_DRIFT: f64 = 48.0;

pub const POWER_UP_PICKUP_RADIUS: f64 = 30.0;

pub const POWER_UP_HEAL: f64 = 25.0;

pub const POWER_UP_SHIELD: f64 = 25.0;

pub const POWER_UP_OVERSHIELD: f64 = 50.0;

pub const RAPID_FIRE_DURATION_SECS: f64 = 45.0;

pub const SPREAD_DURATION_SECS: f64 = 30.0;

// --- Enemy specials ---

/// Sniper telegraph length before the beam fires.
pub const SNIPER_CHARGE_SECS: f64 = 1.5;

/// The sniper stops moving this long before its beam fires.
pub const SNIPER_FREEZE_SECS: f64 = 0.4;

pub const SNIPER_BEAM_DAMAGE: f64 = 30.0;

pub const SNIPER_BEAM_HALF_WIDTH: f64 = 6.0;

pub const ENEMY_BEAM_LENGTH: f64 = 1600.0;

/// How long a fired enemy beam stays visible.
pub const ENEMY_BEAM_VISIBLE_SECS: f64 = 0.25;

/// Lead applied to the sniper's aim point (seconds of player velocity).
pub const SNIPER_LEAD_SECS: f64 = 0.3;

pub const AGGRESSIVE_FAN_SHOTS: usize = 5;

/// Total arc covered by the aggressive fan burst (radians).
pub const AGGRESSIVE_FAN_ARC: f64 = 0.6;

pub const GRENADE_SPEED: f64 = 140.0;

/// How long a homing grenade steers before flying straight.
pub const GRENADE_TRACKING_SECS: f64 = 2.5;

pub const GRENADE_TURN_RATE: f64 = 1.6;

pub const GRENADE_DAMAGE: f64 = 18.0;

pub const GRENADE_LIFETIME_SECS: f64 = 8.0;

pub const GRENADE_RADIUS: f64 = 7.0;

pub const TANK_GRENADE_COOLDOWN_SECS: f64 = 9.0;

pub const STUN_GRENADE_SPEED: f64 = 260.0;

pub const STUN_GRENADE_FUSE_SECS: f64 = 1.2;

pub const STUN_GRENADE_RADIUS: f64 = 140.0;

pub const STUN_DURATION_SECS: f64 = 2.0;

pub const TANK_SNAP_COOLDOWN_SECS: f64 = 7.0;

pub const SNAP_TELEGRAPH_SECS: f64 = 0.6;

pub const SNAP_BEAM_DAMAGE: f64 = 12.0;

pub const SNAP_BEAM_HALF_WIDTH: f64 = 8.0;

pub const SNAP_STUN_SECS: f64 = 0.8;

pub const ENEMY_SHOT_RADIUS: f64 = 4.0;

/// Steering responsiveness of enemy ships (fraction of velocity error closed per second).
pub const ENEMY_STEER_RESPONSE: f64 = 3.0;

// --- Waves ---

/// Delay from run start to the first wave announcement.
pub const FIRST_WAVE_DELAY_SECS: f64 = 3.0;

/// Delay between the incoming cue and the wave start.
pub const WAVE_INCOMING_LEAD_SECS: f64 = 2.0;

pub const WAVE_INTERMISSION_SECS: f64 = 6.0;

/// Re-check interval while a boss blocks the next wave.
pub const WAVE_BOSS_RECHECK_SECS: f64 = 1.0;

/// A wave ends this long after its last spawn even if ships remain.
pub const WAVE_MAX_DURATION_SECS: f64 = 25.0;

/// Every Nth wave carries a tank.
pub const BOSS_WAVE_INTERVAL: u32 = 5;

pub const WAVE_BASE_GAP_SECS: f64 = 1.2;

pub const WAVE_GAP_STEP_SECS: f64 = 0.05;

pub const WAVE_MIN_GAP_SECS: f64 = 0.35;

// --- Particles ---

pub const PARTICLE_MIN_COUNT: u32 = 8;

pub const PARTICLE_MAX_COUNT: u32 = 12;

pub const PARTICLE_MIN_SPEED: f64 = 120.0;

pub const PARTICLE_MAX_SPEED: f64 = 300.0;

/// Life lost per tick (life starts at 1.0).
pub const PARTICLE_DECAY_PER_TICK: f64 = 0.02;

/// Velocity multiplier applied each tick.
pub const PARTICLE_DAMPING: f64 = 0.98;

// --- Targeting ---

/// Radius around the aim point searched for a target lock.
pub const TARGET_LOCK_RADIUS: f64 = 150.0;

/// Lead time used for the target-lock lead point.
pub const TARGET_LEAD_SECS: f64 = 0.5;

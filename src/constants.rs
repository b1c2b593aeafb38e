// --- Arena ---
pub const ARENA_HALF_EXTENT: f64 = 60.0;
pub const MAX_FRAME_DT: f64 = 0.1; // Seconds; longer frames are clamped

// --- Player ---
pub const PLAYER_SPEED: f64 = 12.0; // Units per second
pub const PLAYER_MAX_HEALTH: f64 = 100.0;

// --- Enemies ---
pub const ENEMY_SPEED: f64 = 4.0;
pub const ENEMY_MAX_HEALTH: f64 = 30.0;
pub const DETECTION_RADIUS: f64 = 40.0;
pub const STANDOFF_DISTANCE: f64 = 1.5; // Enemies stop here instead of overlapping the player
pub const PURSUIT_EASE: f64 = 0.5; // Up to +50% speed when right next to the player
pub const WANDER_JITTER: f64 = 2.0;
pub const ENEMY_ATTACK_RANGE: f64 = 2.0;
pub const ENEMY_DAMAGE: f64 = 10.0;
pub const ENEMY_ATTACK_COOLDOWN: f64 = 1.0;
pub const CORPSE_LINGER: f64 = 2.0; // Seconds a dead enemy stays before removal

// --- Melee ---
pub const MELEE_RANGE: f64 = 3.0;
pub const MELEE_ACCURACY: f64 = 0.5; // cos(60 deg)
pub const MELEE_DAMAGE: f64 = 10.0;
pub const MELEE_COOLDOWN: f64 = 0.6;
pub const KNOCKBACK_SPEED: f64 = 8.0;
pub const RAGDOLL_DURATION: f64 = 0.5;

// --- Scoring ---
pub const KILL_SCORE_BASE: u32 = 100;
pub const DISTANCE_BONUS_PER_UNIT: f64 = 2.0;

// --- Waves ---
pub const INITIAL_SPAWN_INTERVAL: f64 = 3.0;
pub const MIN_SPAWN_INTERVAL: f64 = 0.5;
pub const SPAWN_INTERVAL_DAMPING: f64 = 0.9; // Shrink spawn interval by 10% per wave
pub const DIFFICULTY_INTERVAL: f64 = 30.0;
pub const MAX_ENEMIES: usize = 40;
pub const BATCH_BASE: u32 = 3;
pub const BATCH_PER_WAVE: u32 = 2;
pub const BATCH_STAGGER: f64 = 0.4;
pub const SPEED_MULTIPLIER_STEP: f64 = 1.05;
pub const HEALTH_MULTIPLIER_STEP: f64 = 1.1;
pub const MAX_SPEED_MULTIPLIER: f64 = 2.0;
pub const MAX_HEALTH_MULTIPLIER: f64 = 3.0;
pub const SPAWN_MIN_RADIUS: f64 = 25.0;
pub const SPAWN_MAX_RADIUS: f64 = 45.0;

// --- Respawn ---
pub const RESPAWN_COUNTDOWN: f64 = 5.0;
pub const MANUAL_RESPAWN_DELAY: f64 = 1.0;
pub const SAFE_SPAWN_DISTANCE: f64 = 15.0;
pub const SPAWN_ATTEMPTS: u32 = 30;

// --- Pickups ---
pub const PICKUP_INTERVAL: f64 = 20.0;
pub const PICKUP_RADIUS: f64 = 2.0;
pub const MAX_PICKUPS: usize = 3;

// --- Network ---
pub const PEER_TIMEOUT: f64 = 5.0; // Seconds before a silent peer is dropped

// --- Terminal ---
pub const TERMINAL_ASPECT_RATIO_COMPENSATION: f64 = 2.0; // Terminal cells are about twice as tall as wide
pub const FRAME_POLL_MILLIS: u64 = 33;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Facing {
    North,
    South,
    NorthEast,
    SouthEast,
    NorthWest,
    SouthWest,
}

impl Facing {
    /// The animation suffix for this facing and whether the sprite is drawn
    /// mirrored. NW and SW reuse the NE and SE art flipped.
    fn animation_slot(self) -> (&'static str, bool) {
        match self {
            Facing::North => ("N", false),
            Facing::South => ("S", false),
            Facing::NorthEast => ("NE", false),
            Facing::NorthWest => ("NE", true),
            Facing::SouthEast => ("SE", false),
            Facing::SouthWest => ("SE", true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerticalHint {
    North,
    South,
}

/// Per-scene player state: the resolved facing, the remembered vertical
/// direction used for horizontal-only input, and the speed tunable.
#[derive(Debug, Clone, Copy)]
struct PlayerController {
    facing: Facing,
    last_vertical: VerticalHint,
    move_speed: f32,
}

impl Default for PlayerController {
    fn default() -> Self {
        Self {
            facing: Facing::South,
            last_vertical: VerticalHint::South,
            move_speed: PLAYER_SPEED_DEFAULT,
        }
    }
}

impl PlayerController {
    fn apply_speed_steps(&mut self, steps: i32) {
        if steps == 0 {
            return;
        }
        self.move_speed = (self.move_speed + steps as f32 * PLAYER_SPEED_STEP)
            .clamp(PLAYER_SPEED_MIN, PLAYER_SPEED_MAX);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NpcMode {
    Following,
    Wandering,
    Stationary,
}

#[derive(Debug, Clone, Copy)]
struct NpcBehavior {
    mode: NpcMode,
    stationary: bool,
    wander_angle: f32,
    wander_timer: f32,
}

impl NpcBehavior {
    fn new() -> Self {
        Self {
            mode: NpcMode::Wandering,
            stationary: false,
            wander_angle: 0.0,
            wander_timer: 0.0,
        }
    }

    /// Latches the stationary designation. Applying it again is a no-op.
    fn mark_stationary(&mut self) {
        if !self.stationary {
            self.stationary = true;
            self.mode = NpcMode::Stationary;
        }
    }
}

/// Behavior entries are keyed by kind and spawn point, so several NPCs of
/// the same kind keep independent state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BehaviorKey {
    kind: String,
    spawn_point: (i32, i32),
}

/// Lives for the whole level: entries are created lazily on first sight of
/// an NPC and never removed. The RNG feeds wander-direction redraws.
struct BehaviorTable {
    entries: HashMap<BehaviorKey, NpcBehavior>,
    rng: StdRng,
}

impl BehaviorTable {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            rng: StdRng::from_os_rng(),
        }
    }

    #[cfg(test)]
    fn with_seed(seed: u64) -> Self {
        Self {
            entries: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

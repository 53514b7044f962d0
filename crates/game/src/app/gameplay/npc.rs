/// One behavior tick for every non-player animated sprite. The player has
/// already moved this tick, so Following always sees the post-move
/// position. Behavior entries are created lazily and keep their state for
/// the life of the level.
fn update_npcs(
    world: &mut SpriteWorld,
    dt_seconds: f32,
    table: &mut BehaviorTable,
    animator: &mut Animator,
    library: &AnimationLibrary,
) {
    let player_center = world
        .find_by_name(PLAYER_KIND)
        .map(|player| player.foot_center());
    let world_size = world.world_size();

    for sprite in world.sprites_mut() {
        if sprite.name == PLAYER_KIND || sprite.name == BACKGROUND_NAME || !sprite.animated {
            continue;
        }

        let key = BehaviorKey {
            kind: sprite.name.clone(),
            spawn_point: sprite.spawn_point,
        };
        let behavior = table.entries.entry(key).or_insert_with(NpcBehavior::new);
        if STATIONARY_KINDS.contains(&sprite.name.as_str()) {
            behavior.mark_stationary();
        }

        let npc_center = sprite.foot_center();
        let to_player = player_center.map(|pc| (pc.x - npc_center.x, pc.y - npc_center.y));
        let distance = to_player.map(|(dx, dy)| (dx * dx + dy * dy).sqrt());
        let in_follow_window = matches!(
            distance,
            Some(d) if d > FOLLOW_MIN_DISTANCE && d < DETECTION_RADIUS
        );

        behavior.mode = if in_follow_window {
            NpcMode::Following
        } else if behavior.stationary {
            NpcMode::Stationary
        } else {
            NpcMode::Wandering
        };

        let mut mx = 0.0f32;
        let mut my = 0.0f32;
        match behavior.mode {
            // Stationary kinds can resolve to Following but never move.
            NpcMode::Following if !behavior.stationary => {
                if let (Some((dx, dy)), Some(d)) = (to_player, distance) {
                    if d > 0.0 {
                        let mut speed = NPC_SPEED * dt_seconds;
                        if d < FOLLOW_SLOWDOWN_DISTANCE {
                            speed *= FOLLOW_SLOWDOWN_SCALE;
                        }
                        mx = dx / d * speed;
                        my = dy / d * speed;
                    }
                }
            }
            NpcMode::Wandering => {
                behavior.wander_timer += dt_seconds;
                if behavior.wander_timer >= WANDER_CHANGE_SECONDS {
                    behavior.wander_angle = table.rng.random_range(0.0..TAU);
                    behavior.wander_timer = 0.0;
                }
                let speed = NPC_SPEED * WANDER_SPEED_SCALE * dt_seconds;
                mx = behavior.wander_angle.cos() * speed;
                my = behavior.wander_angle.sin() * speed;
            }
            _ => {}
        }

        if mx != 0.0 || my != 0.0 {
            let clamped = clamp_to_world(
                (
                    sprite.bounds.x + mx.round() as i32,
                    sprite.bounds.y + my.round() as i32,
                ),
                (sprite.bounds.w, sprite.bounds.h),
                world_size,
            );
            sprite.bounds.x = clamped.0;
            sprite.bounds.y = clamped.1;
        }

        // Deadzone keeps the mirror flag from flickering near zero velocity.
        if mx.abs() > MIRROR_DEADZONE {
            sprite.mirrored = mx < 0.0;
        }

        animator.advance(sprite, library, dt_seconds * 1000.0);
    }
}

/// Resolves the 8-way facing from the held movement keys. Horizontal-only
/// input borrows the remembered vertical direction for its diagonal; no
/// input at all keeps the previous facing.
fn resolve_facing(
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    last_vertical: VerticalHint,
    current: Facing,
) -> Facing {
    if up && !left && !right {
        Facing::North
    } else if down && !left && !right {
        Facing::South
    } else if up && right {
        Facing::NorthEast
    } else if up && left {
        Facing::NorthWest
    } else if down && right {
        Facing::SouthEast
    } else if down && left {
        Facing::SouthWest
    } else if right {
        match last_vertical {
            VerticalHint::North => Facing::NorthEast,
            VerticalHint::South => Facing::SouthEast,
        }
    } else if left {
        match last_vertical {
            VerticalHint::North => Facing::NorthWest,
            VerticalHint::South => Facing::SouthWest,
        }
    } else {
        current
    }
}

fn player_animation_name(kind: &str, facing: Facing, moving: bool) -> (String, bool) {
    let (suffix, mirrored) = facing.animation_slot();
    let verb = if moving { "Walk" } else { "Idle" };
    (format!("{kind}{verb}{suffix}"), mirrored)
}

/// One player tick: speed tunable, facing, movement with world clamping,
/// and the walk/idle animation selection.
fn update_player(
    world: &mut SpriteWorld,
    input: &InputSnapshot,
    dt_seconds: f32,
    controller: &mut PlayerController,
    animator: &mut Animator,
    library: &AnimationLibrary,
) {
    controller.apply_speed_steps(input.speed_delta_steps());

    let world_size = world.world_size();
    let Some(player) = world.find_by_name_mut(PLAYER_KIND) else {
        debug!("player sprite missing; player update skipped");
        return;
    };

    let up = input.is_down(InputAction::MoveUp);
    let down = input.is_down(InputAction::MoveDown);
    let left = input.is_down(InputAction::MoveLeft);
    let right = input.is_down(InputAction::MoveRight);

    if up {
        controller.last_vertical = VerticalHint::North;
    }
    if down {
        controller.last_vertical = VerticalHint::South;
    }

    let moving = up || down || left || right;
    let facing = resolve_facing(up, down, left, right, controller.last_vertical, controller.facing);
    if moving {
        controller.facing = facing;
    }

    if moving {
        let step = (controller.move_speed * dt_seconds).round() as i32;
        let mut dx = 0;
        let mut dy = 0;
        if left {
            dx -= step;
        }
        if right {
            dx += step;
        }
        if up {
            dy -= step;
        }
        if down {
            dy += step;
        }

        let clamped = clamp_to_world(
            (player.bounds.x + dx, player.bounds.y + dy),
            (player.bounds.w, player.bounds.h),
            world_size,
        );
        player.bounds.x = clamped.0;
        player.bounds.y = clamped.1;
    }

    let (animation_name, mirrored) = player_animation_name(PLAYER_KIND, facing, moving);
    player.moving = moving;
    player.mirrored = mirrored;
    animator.set_animation(player, library, &animation_name);
    animator.advance(player, library, dt_seconds * 1000.0);
}

/// Recenters the camera on the player's post-move bounds, clamped to world
/// bounds. Runs every tick so zoom changes take effect immediately.
fn refresh_camera(world: &mut SpriteWorld, viewport: (u32, u32)) {
    let Some(player) = world.find_by_name(PLAYER_KIND) else {
        return;
    };
    let bounds = player.bounds;
    let world_size = world.world_size();
    let zoom = world.camera().effective_zoom();
    world.camera_mut().origin = camera_origin(bounds, world_size, viewport, zoom);
}

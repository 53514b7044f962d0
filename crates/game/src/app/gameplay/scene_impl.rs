/// The running level: owns the controller state, the behavior table, the
/// animation library handed back by the loader, and the animator.
struct WorldScene {
    level_name: &'static str,
    conventions: SpawnConventions,
    controller: PlayerController,
    behaviors: BehaviorTable,
    animator: Animator,
    animations: AnimationLibrary,
}

impl WorldScene {
    fn new(level_name: &'static str) -> Self {
        Self {
            level_name,
            conventions: SpawnConventions::default()
                .with_initial_animation("aster", "asterIdleS")
                .with_initial_animation("maren", "marenIdleSE")
                .with_initial_animation("moth", "mothDrift"),
            controller: PlayerController::default(),
            behaviors: BehaviorTable::new(),
            animator: Animator::default(),
            animations: AnimationLibrary::default(),
        }
    }

    fn handle_picking(&self, input: &InputSnapshot, world: &SpriteWorld) {
        if !input.left_click_pressed() {
            return;
        }
        let Some(cursor) = input.cursor_position_px() else {
            return;
        };
        match world.pick_topmost_at(cursor) {
            Some(id) => {
                if let Some(sprite) = world.find(id) {
                    info!(
                        sprite = %sprite.name,
                        x = sprite.bounds.x,
                        y = sprite.bounds.y,
                        w = sprite.bounds.w,
                        h = sprite.bounds.h,
                        "sprite_picked"
                    );
                }
            }
            None => info!("nothing_under_cursor"),
        }
    }
}

impl Scene for WorldScene {
    fn load(&mut self, paths: &AppPaths, world: &mut SpriteWorld) -> Result<(), LevelError> {
        self.animations = load_level(paths, self.level_name, &self.conventions, world)?;
        Ok(())
    }

    fn update(&mut self, dt_seconds: f32, input: &InputSnapshot, world: &mut SpriteWorld) {
        world.camera_mut().apply_zoom_steps(input.zoom_delta_steps());

        update_player(
            world,
            input,
            dt_seconds,
            &mut self.controller,
            &mut self.animator,
            &self.animations,
        );
        refresh_camera(world, input.window_size());
        self.handle_picking(input, world);
        update_npcs(
            world,
            dt_seconds,
            &mut self.behaviors,
            &mut self.animator,
            &self.animations,
        );
    }

    fn unload(&mut self, world: &mut SpriteWorld) {
        let mut keys: Vec<&BehaviorKey> = self.behaviors.entries.keys().collect();
        keys.sort_by_key(|key| (key.kind.clone(), key.spawn_point));
        for key in keys {
            info!(
                kind = %key.kind,
                spawn_x = key.spawn_point.0,
                spawn_y = key.spawn_point.1,
                "npc_behavior_state"
            );
        }
        info!(behavior_entries = self.behaviors.len(), "scene_unloaded");
        world.clear();
    }
}

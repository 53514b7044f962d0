use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::content::LevelError;
use crate::{resolve_app_paths, AppPaths, StartupError};

use super::input::{ActionStates, InputAction, InputSnapshot};
use super::metrics::FrameStats;
use super::rendering::Renderer;
use super::world::{SpriteWorld, Vec2};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub world_width: i32,
    pub world_height: i32,
    pub max_frame_delta: Duration,
    pub stats_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Windmere".to_string(),
            window_width: 800,
            window_height: 600,
            world_width: 1600,
            world_height: 1200,
            max_frame_delta: Duration::from_millis(250),
            stats_log_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("failed to load level: {0}")]
    LoadLevel(#[from] LevelError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// One simulated world driven by the loop: `load` populates the world from
/// level content, `update` runs one tick, `unload` runs at shutdown.
pub trait Scene {
    fn load(&mut self, paths: &AppPaths, world: &mut SpriteWorld) -> Result<(), LevelError>;
    fn update(&mut self, dt_seconds: f32, input: &InputSnapshot, world: &mut SpriteWorld);
    fn unload(&mut self, world: &mut SpriteWorld);
}

pub fn run_app(config: LoopConfig, mut scene: Box<dyn Scene>) -> Result<(), AppError> {
    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        assets_dir = %app_paths.assets_dir.display(),
        "startup"
    );

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let mut world = SpriteWorld::new((config.world_width, config.world_height));
    scene.load(&app_paths, &mut world)?;
    info!(sprite_count = world.sprite_count(), "scene_loaded");

    let max_frame_delta = normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let stats_log_interval =
        normalize_non_zero_duration(config.stats_log_interval, Duration::from_secs(1));
    let mut input_collector = InputCollector::new(config.window_width, config.window_height);
    let mut frame_stats = FrameStats::default();
    let mut last_frame_instant = Instant::now();
    let mut last_stats_log = Instant::now();

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        input_collector.set_window_size(new_size.width, new_size.height);
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window.inner_size();
                        input_collector.set_window_size(size.width, size.height);
                        if let Err(error) = renderer.resize(size.width, size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        input_collector
                            .set_cursor_position_px(position.x as f32, position.y as f32);
                    }
                    WindowEvent::CursorLeft { .. } => {
                        input_collector.clear_cursor_position();
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        input_collector.handle_mouse_input(button, state);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        input_collector.handle_keyboard_input(&event);
                        if input_collector.quit_requested {
                            info!(reason = "escape_key", "shutdown_requested");
                            window_target.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                        last_frame_instant = now;
                        let frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);

                        let snapshot = input_collector.snapshot_for_tick();
                        if snapshot.quit_requested() {
                            window_target.exit();
                            return;
                        }

                        scene.update(frame_dt.as_secs_f32(), &snapshot, &mut world);

                        if let Err(error) =
                            renderer.render_world(&world, snapshot.cursor_position_px())
                        {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }

                        frame_stats.record(raw_frame_dt.as_secs_f32());
                        if now.saturating_duration_since(last_stats_log) >= stats_log_interval {
                            info!(
                                fps = frame_stats.average_fps(),
                                sprite_count = world.sprite_count(),
                                "loop_metrics"
                            );
                            last_stats_log = now;
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                scene.unload(&mut world);
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    cursor_position_px: Option<Vec2>,
    left_mouse_is_down: bool,
    left_click_pressed_edge: bool,
    speed_up_key_is_down: bool,
    speed_down_key_is_down: bool,
    pending_speed_steps: i32,
    zoom_in_key_is_down: bool,
    zoom_out_key_is_down: bool,
    pending_zoom_steps: i32,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn handle_keyboard_input(&mut self, key_event: &winit::event::KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        match key_event.physical_key {
            PhysicalKey::Code(KeyCode::KeyW) => {
                self.action_states.set(InputAction::MoveUp, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyS) => {
                self.action_states.set(InputAction::MoveDown, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyA) => {
                self.action_states.set(InputAction::MoveLeft, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyD) => {
                self.action_states.set(InputAction::MoveRight, is_pressed);
            }
            PhysicalKey::Code(KeyCode::ArrowRight) => {
                self.handle_speed_up_key_state(key_event.state);
            }
            PhysicalKey::Code(KeyCode::ArrowLeft) => {
                self.handle_speed_down_key_state(key_event.state);
            }
            PhysicalKey::Code(KeyCode::ArrowUp) => {
                self.handle_zoom_in_key_state(key_event.state);
            }
            PhysicalKey::Code(KeyCode::ArrowDown) => {
                self.handle_zoom_out_key_state(key_event.state);
            }
            PhysicalKey::Code(KeyCode::Escape) => {
                if is_pressed {
                    self.quit_requested = true;
                }
            }
            _ => {}
        }
    }

    fn handle_speed_up_key_state(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.speed_up_key_is_down {
                    self.pending_speed_steps = self.pending_speed_steps.saturating_add(1);
                }
                self.speed_up_key_is_down = true;
            }
            ElementState::Released => self.speed_up_key_is_down = false,
        }
    }

    fn handle_speed_down_key_state(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.speed_down_key_is_down {
                    self.pending_speed_steps = self.pending_speed_steps.saturating_sub(1);
                }
                self.speed_down_key_is_down = true;
            }
            ElementState::Released => self.speed_down_key_is_down = false,
        }
    }

    fn handle_zoom_in_key_state(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.zoom_in_key_is_down {
                    self.pending_zoom_steps = self.pending_zoom_steps.saturating_add(1);
                }
                self.zoom_in_key_is_down = true;
            }
            ElementState::Released => self.zoom_in_key_is_down = false,
        }
    }

    fn handle_zoom_out_key_state(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.zoom_out_key_is_down {
                    self.pending_zoom_steps = self.pending_zoom_steps.saturating_sub(1);
                }
                self.zoom_out_key_is_down = true;
            }
            ElementState::Released => self.zoom_out_key_is_down = false,
        }
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.left_mouse_is_down {
                    self.left_click_pressed_edge = true;
                }
                self.left_mouse_is_down = true;
            }
            ElementState::Released => self.left_mouse_is_down = false,
        }
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_position_px = Some(Vec2 { x, y });
    }

    fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.action_states,
            self.cursor_position_px,
            self.left_click_pressed_edge,
            self.pending_speed_steps,
            self.pending_zoom_steps,
            self.window_width,
            self.window_height,
        );
        self.left_click_pressed_edge = false;
        self.pending_speed_steps = 0;
        self.pending_zoom_steps = 0;
        snapshot
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

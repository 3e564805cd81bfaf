mod core;
mod input;
mod playback;
mod speech;
mod ui;

use crate::core::{johny_johny, CueTable};
use input::load_cue_file;
use playback::{PlaybackConfig, PlaybackController, PlaybackState};
use speech::{EspeakEngine, NarrationDevice, SpeechManager, DEFAULT_VOICE_PREFERENCES};
use ui::controls::toggle_label;
use ui::{
    AboutDialog, ControlAction, ControlsWindow, FileDialogs, NarrationLogWindow, ShortcutAction,
    ShortcutManager, StageWindow, TimelineAction, TimelineWindow,
};
use anyhow::{Context as _, Result};
use imgui::{Context, FontConfig, FontSource};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::ModifiersState;
use winit::window::WindowBuilder;

use glutin::prelude::*;
use glutin::display::GetGlDisplay;
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasRawWindowHandle;
use glow::HasContext;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use serde::{Deserialize, Serialize};

/// How often an idle window wakes to pick up speech worker events
const IDLE_REFRESH: Duration = Duration::from_millis(250);

/// How often settings are written while running
const SETTINGS_SAVE_INTERVAL: Duration = Duration::from_secs(30);

/// Persistent application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct AppSettings {
    show_stage: bool,
    show_lyrics: bool,
    show_controls: bool,
    show_timeline: bool,
    show_narration_log: bool,
    show_shortcuts: bool,
    narration_enabled: bool,
    preferred_voices: Vec<String>,
    /// Speech program to use instead of probing espeak-ng / espeak
    speech_program: Option<String>,
    last_cue_sheet: Option<PathBuf>,
    playback: PlaybackConfig,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            show_stage: true,
            show_lyrics: true,
            show_controls: true,
            show_timeline: true,
            show_narration_log: false,
            show_shortcuts: false,
            narration_enabled: true,
            preferred_voices: DEFAULT_VOICE_PREFERENCES.iter().map(|p| p.to_string()).collect(),
            speech_program: None,
            last_cue_sheet: None,
            playback: PlaybackConfig::default(),
        }
    }
}

impl AppSettings {
    fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rhyme-stage")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("settings.json")
    }

    /// Load settings, falling back to defaults when missing or unreadable
    fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring settings: {:#}", e);
                Self::default()
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read settings '{}'", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("parse settings '{}'", path.display()))
    }

    fn save(&self) {
        if let Err(e) = self.save_to(&Self::config_path()) {
            warn!("Failed to save settings: {:#}", e);
        }
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create settings directory '{}'", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("write settings '{}'", path.display()))
    }
}

/// Pick the event loop wait mode from the controller's needs
fn control_flow_for(wants_frame: bool, deadline: Option<Instant>, now: Instant) -> ControlFlow {
    if wants_frame {
        return ControlFlow::Poll;
    }
    let idle = now + IDLE_REFRESH;
    ControlFlow::WaitUntil(deadline.map_or(idle, |d| d.min(idle)))
}

struct AppState {
    controller: PlaybackController<SpeechManager>,
    stage: StageWindow,
    controls: ControlsWindow,
    timeline: TimelineWindow,
    narration_log: NarrationLogWindow,
    shortcut_manager: ShortcutManager,
    about_dialog: AboutDialog,
    settings: AppSettings,
    status_message: Option<String>,
    show_file_open_pending: bool,
    quit_requested: bool,
}

impl AppState {
    fn new(settings: AppSettings, handle: &tokio::runtime::Handle) -> Self {
        let mut speech = SpeechManager::new(settings.preferred_voices.clone());
        speech.set_enabled(settings.narration_enabled);
        match &settings.speech_program {
            Some(program) => speech.start(handle, EspeakEngine::with_program(program)),
            None => speech.start(handle, EspeakEngine::new()),
        }

        let cues = johny_johny();
        let timeline = TimelineWindow::new(&cues);
        let controller = PlaybackController::new(cues, settings.playback.clone(), speech);

        let mut state = Self {
            controller,
            stage: StageWindow::new(),
            controls: ControlsWindow::new(settings.narration_enabled),
            timeline,
            narration_log: NarrationLogWindow::new(),
            shortcut_manager: ShortcutManager::new(),
            about_dialog: AboutDialog::new(),
            settings,
            status_message: None,
            show_file_open_pending: false,
            quit_requested: false,
        };

        if let Some(path) = state.settings.last_cue_sheet.clone() {
            state.load_cue_sheet(&path);
        }
        state
    }

    fn save_settings(&mut self) {
        self.settings.playback = self.controller.config().clone();
        self.settings.save();
    }

    fn load_cue_sheet(&mut self, path: &Path) {
        match load_cue_file(path) {
            Ok(cues) => {
                self.status_message = Some(format!(
                    "Loaded '{}' ({} cues, {:.1}s)",
                    cues.name(),
                    cues.len(),
                    cues.total_duration().as_secs_f32()
                ));
                self.set_cues(cues);
                self.settings.last_cue_sheet = Some(path.to_path_buf());
            }
            Err(e) => {
                warn!("Failed to load cue sheet: {:#}", e);
                self.status_message = Some(format!("Failed to load cue sheet: {:#}", e));
            }
        }
    }

    fn set_cues(&mut self, cues: CueTable) {
        self.timeline.set_cues(&cues);
        self.controller.set_cues(cues);
    }

    fn use_builtin_rhyme(&mut self) {
        self.set_cues(johny_johny());
        self.settings.last_cue_sheet = None;
        self.status_message = Some("Using the built-in rhyme".to_string());
    }

    fn process_file_dialogs(&mut self) {
        if self.show_file_open_pending {
            self.show_file_open_pending = false;
            if let Some(path) = FileDialogs::open_cue_sheet(self.settings.last_cue_sheet.as_deref()) {
                self.load_cue_sheet(&path);
            }
        }
    }

    fn set_narration(&mut self, enabled: bool) {
        self.settings.narration_enabled = enabled;
        self.controls.set_narration_enabled(enabled);
        self.controller.narrator_mut().set_enabled(enabled);
        info!("Narration {}", if enabled { "enabled" } else { "disabled" });
    }

    fn handle_control(&mut self, action: ControlAction, now: Instant) {
        match action {
            ControlAction::Start => self.controller.start(),
            ControlAction::Toggle => self.controller.toggle(now),
            ControlAction::Replay => self.controller.replay(now),
            ControlAction::Stop => self.controller.stop(),
            ControlAction::SetNarration(enabled) => self.set_narration(enabled),
        }
    }

    fn handle_shortcut(&mut self, action: ShortcutAction, now: Instant) {
        match action {
            ShortcutAction::OpenCueSheet => self.show_file_open_pending = true,
            ShortcutAction::Start => self.handle_control(ControlAction::Start, now),
            ShortcutAction::Toggle => self.handle_control(ControlAction::Toggle, now),
            ShortcutAction::Replay => self.handle_control(ControlAction::Replay, now),
            ShortcutAction::Stop => self.handle_control(ControlAction::Stop, now),
            ShortcutAction::ToggleNarration => {
                let enabled = !self.settings.narration_enabled;
                self.set_narration(enabled);
            }
            ShortcutAction::ToggleLyrics => self.settings.show_lyrics = !self.settings.show_lyrics,
            ShortcutAction::ToggleNarrationLog => {
                self.settings.show_narration_log = !self.settings.show_narration_log
            }
            ShortcutAction::ShowHelp => self.settings.show_shortcuts = true,
            ShortcutAction::Quit => self.quit_requested = true,
        }
    }

    /// Drain speech events and advance playback; returns the wait mode
    fn update(&mut self, now: Instant) -> ControlFlow {
        self.controller.narrator_mut().poll();
        let wants_frame = self.controller.update(now);
        self.timeline.update(
            self.controller.progress(),
            self.controller.active_cue(),
            self.controller.is_playing(),
        );
        control_flow_for(wants_frame, self.controller.next_deadline(), now)
    }

    fn status_line(&self) -> String {
        if let Some(msg) = &self.status_message {
            return msg.clone();
        }
        let cues = self.controller.cues();
        let state = match self.controller.state() {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Finished => "Finished",
        };
        format!(
            "{} | {} | {:.0}% | Narration: {}",
            cues.name(),
            state,
            self.controller.progress() * 100.0,
            if self.controller.narrator().is_available() { "on" } else { "off" }
        )
    }
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Speech runs on the tokio runtime; the UI stays on the main thread
    let rt = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");

    let event_loop = EventLoop::new().expect("Failed to create EventLoop");

    // Build the window and GL display using glutin-winit
    let (window, gl_config) = DisplayBuilder::new()
        .with_window_builder(Some(
            WindowBuilder::new()
                .with_title("Rhyme Stage")
                .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0))
        ))
        .build(&event_loop, glutin::config::ConfigTemplateBuilder::new(), |mut iter| {
            iter.next().expect("No GL config available")
        })
        .expect("Failed to create window and display");

    let window = window.expect("Failed to create window");
    let gl_display = gl_config.display();

    let context = unsafe {
        gl_display.create_context(
            &gl_config,
            &glutin::context::ContextAttributesBuilder::new()
                .build(Some(window.raw_window_handle())),
        )
    }.expect("Failed to create GL context");

    let attrs = window.build_surface_attributes(
        glutin::surface::SurfaceAttributesBuilder::<glutin::surface::WindowSurface>::new()
    );

    let surface = unsafe {
        gl_display.create_window_surface(&gl_config, &attrs)
    }.expect("Failed to create surface");

    let context = context.make_current(&surface).expect("Failed to make context current");

    let load_gl = || unsafe {
        glow::Context::from_loader_function(|ptr| {
            let name = std::ffi::CString::new(ptr).expect("GL symbol name contains NUL");
            gl_display.get_proc_address(&name) as *const _
        })
    };
    let gl = load_gl();

    // Set up imgui
    let mut imgui = Context::create();
    imgui.set_log_filename(None::<PathBuf>);

    // Window layout lives next to the settings
    let ini_path = AppSettings::config_dir().join("layout.ini");
    if let Some(parent) = ini_path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    imgui.set_ini_filename(Some(ini_path));

    imgui.io_mut().config_flags |= imgui::ConfigFlags::DOCKING_ENABLE;

    let hidpi_factor = window.scale_factor();
    let font_size = (16.0 * hidpi_factor) as f32;
    imgui.fonts().add_font(&[FontSource::DefaultFontData {
        config: Some(FontConfig {
            size_pixels: font_size,
            ..FontConfig::default()
        }),
    }]);
    imgui.io_mut().font_global_scale = (1.0 / hidpi_factor) as f32;

    let mut platform = WinitPlatform::init(&mut imgui);
    platform.attach_window(imgui.io_mut(), &window, HiDpiMode::Default);

    let mut renderer = imgui_glow_renderer::AutoRenderer::initialize(gl, &mut imgui)
        .expect("Failed to initialize renderer");

    // Second glow context for clearing (both reference the same GL context)
    let gl_clear = load_gl();

    let mut state = AppState::new(AppSettings::load(), rt.handle());
    let mut modifiers = ModifiersState::empty();
    let mut last_frame_time = Instant::now();
    let mut last_settings_save = Instant::now();

    event_loop.run(move |event, window_target| {
        match event {
            Event::NewEvents(_) => {
                let now = Instant::now();
                imgui.io_mut().update_delta_time(now - last_frame_time);
                last_frame_time = now;
            }
            Event::AboutToWait => {
                state.process_file_dialogs();

                let control_flow = state.update(Instant::now());
                window_target.set_control_flow(control_flow);

                if last_settings_save.elapsed() >= SETTINGS_SAVE_INTERVAL {
                    state.save_settings();
                    last_settings_save = Instant::now();
                }

                if state.quit_requested {
                    state.save_settings();
                    window_target.exit();
                }

                platform.prepare_frame(imgui.io_mut(), &window)
                    .expect("Failed to prepare frame");
                window.request_redraw();
            }
            Event::WindowEvent { event: WindowEvent::ModifiersChanged(ref new), .. } => {
                modifiers = new.state();
            }
            Event::WindowEvent { event: WindowEvent::KeyboardInput { event: ref key_event, .. }, .. } => {
                // Typing into a widget is not a shortcut
                if !imgui.io().want_capture_keyboard {
                    let action = state.shortcut_manager.process_event(
                        key_event,
                        modifiers.control_key(),
                        modifiers.shift_key(),
                        modifiers.alt_key(),
                    );
                    if let Some(action) = action {
                        state.handle_shortcut(action, Instant::now());
                    }
                }
            }
            Event::WindowEvent { event: WindowEvent::RedrawRequested, .. } => {
                let ui = imgui.new_frame();
                let now = Instant::now();

                let mut control_action = None;
                let mut use_builtin = false;

                ui.main_menu_bar(|| {
                    ui.menu("File", || {
                        if ui.menu_item_config("Open Cue Sheet...").shortcut("Ctrl+O").build() {
                            state.show_file_open_pending = true;
                        }
                        if ui.menu_item("Use Built-in Rhyme") {
                            use_builtin = true;
                        }
                        ui.separator();
                        if ui.menu_item_config("Exit").shortcut("Ctrl+Q").build() {
                            state.quit_requested = true;
                        }
                    });

                    ui.menu("Playback", || {
                        if ui.menu_item_config("Start").shortcut("Enter").build() {
                            control_action = Some(ControlAction::Start);
                        }
                        let toggle = toggle_label(state.controller.state());
                        let finished = state.controller.state() == PlaybackState::Finished;
                        if ui.menu_item_config(toggle).shortcut("Space").enabled(!finished).build() {
                            control_action = Some(ControlAction::Toggle);
                        }
                        if ui.menu_item_config("Replay").shortcut("R").build() {
                            control_action = Some(ControlAction::Replay);
                        }
                        if ui.menu_item_config("Stop").shortcut("Esc").build() {
                            control_action = Some(ControlAction::Stop);
                        }
                    });

                    ui.menu("Narration", || {
                        let enabled = state.settings.narration_enabled;
                        if ui.menu_item_config("Enabled").shortcut("Ctrl+N").selected(enabled).build() {
                            control_action = Some(ControlAction::SetNarration(!enabled));
                        }

                        let mut config = state.controller.config().clone();
                        if ui.slider("Volume", 0.0, 1.0, &mut config.volume) {
                            state.controller.set_config(config);
                        }

                        let voice = state.controller.narrator().voice()
                            .map(|v| format!("Voice: {} ({})", v.name, v.lang))
                            .unwrap_or_else(|| "Voice: engine default".to_string());
                        ui.text_disabled(voice);
                    });

                    ui.menu("View", || {
                        ui.menu_item_config("Stage").build_with_ref(&mut state.settings.show_stage);
                        ui.menu_item_config("Lyrics").shortcut("L").build_with_ref(&mut state.settings.show_lyrics);
                        ui.menu_item_config("Controls").build_with_ref(&mut state.settings.show_controls);
                        ui.menu_item_config("Timeline").build_with_ref(&mut state.settings.show_timeline);
                        ui.menu_item_config("Narration Log").shortcut("H").build_with_ref(&mut state.settings.show_narration_log);
                    });

                    ui.menu("Help", || {
                        if ui.menu_item_config("Keyboard Shortcuts").shortcut("F1").build() {
                            state.settings.show_shortcuts = true;
                        }
                        ui.separator();
                        if ui.menu_item("About Rhyme Stage") {
                            state.about_dialog.show();
                        }
                    });
                });

                if use_builtin {
                    state.use_builtin_rhyme();
                }

                // Status bar
                let window_size = window.inner_size();
                ui.set_cursor_pos([0.0, window_size.height as f32 / hidpi_factor as f32 - 25.0]);
                ui.child_window("Status")
                    .size([window_size.width as f32 / hidpi_factor as f32, 25.0])
                    .build(|| {
                        ui.text(state.status_line());
                    });

                let playback_state = state.controller.state();
                let active = state.controller.active_cue();

                if state.settings.show_stage {
                    state.stage.render(
                        ui,
                        &mut state.settings.show_stage,
                        state.controller.cues(),
                        playback_state,
                        active,
                    );
                }

                if state.settings.show_lyrics {
                    state.stage.render_lyrics(
                        ui,
                        &mut state.settings.show_lyrics,
                        state.controller.cues(),
                        active,
                    );
                }

                if state.settings.show_controls {
                    let available = state.controller.narrator().is_available();
                    if let Some(action) = state.controls.render(
                        ui,
                        &mut state.settings.show_controls,
                        playback_state,
                        available,
                    ) {
                        control_action = Some(action);
                    }
                }

                if state.settings.show_timeline {
                    match state.timeline.render(ui, &mut state.settings.show_timeline) {
                        TimelineAction::Toggle => control_action = Some(ControlAction::Toggle),
                        TimelineAction::Replay => control_action = Some(ControlAction::Replay),
                        TimelineAction::None => {}
                    }
                }

                if state.settings.show_narration_log {
                    state.narration_log.render(
                        ui,
                        &mut state.settings.show_narration_log,
                        state.controller.narrator_mut(),
                    );
                }

                if state.settings.show_shortcuts {
                    state.shortcut_manager.render_help(ui, &mut state.settings.show_shortcuts);
                }

                state.about_dialog.render(ui);

                if let Some(action) = control_action {
                    state.status_message = None;
                    state.handle_control(action, now);
                }

                platform.prepare_render(ui, &window);
                let draw_data = imgui.render();

                unsafe {
                    gl_clear.clear_color(0.12, 0.1, 0.16, 1.0);
                    gl_clear.clear(glow::COLOR_BUFFER_BIT);
                }

                renderer.render(draw_data).expect("Rendering failed");

                surface.swap_buffers(&context).expect("Failed to swap buffers");
            }
            Event::WindowEvent { event: WindowEvent::CloseRequested, .. } => {
                state.save_settings();
                window_target.exit();
            }
            Event::LoopExiting => {
                state.controller.narrator_mut().shutdown();
            }
            _ => {}
        }

        platform.handle_event(imgui.io_mut(), &window, &event);
    }).expect("EventLoop error");
}

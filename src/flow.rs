//! Application event loop.
//!
//! The [`App`] owns the scene graph and viewer state from the start and the GPU
//! side once the window exists. Loads run detached (tokio natively, the
//! browser executor on WASM) and report back as [`ViewerEvent`]s through the
//! event loop proxy.
//!
//! # Lifecycle
//!
//! Each redraw:
//! 1. Build the panel and collect its actions
//! 2. Apply the actions to the viewer state
//! 3. Advance animation, rotation and colour pulse by the frame delta
//! 4. Step the orbit controller and upload camera and lights
//! 5. Sync the scene graph to the GPU and draw scene then panel
//! 6. Request the next frame

use std::sync::Arc;

use instant::Instant;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    config::ViewerConfig,
    context::Context,
    data_structures::scene_graph::SceneGraph,
    gui::Gui,
    render,
    resources::{LoadEvent, LoadReporter, LoadSink, LoadedAsset, Task, load_avatar},
    viewer::{
        animation::AnimationDriver,
        binder::apply_textures,
        color_pulse,
        framing::center_model,
        panel::ControlPanel,
        state::{EffectFlags, ViewerState},
        textures::TextureRegistry,
    },
};

/// GPU-bound state, created once the window exists.
pub(crate) struct AppState {
    ctx: Context,
    gui: Gui,
}

impl AppState {
    async fn new(window: Arc<Window>, config: &ViewerConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window, config).await?;
        let gui = Gui::new(&ctx.window, &ctx.device, ctx.config.format);
        Ok(Self { ctx, gui })
    }
}

pub(crate) enum ViewerEvent {
    /// The GPU context finished initialising on the browser executor.
    #[cfg(target_arch = "wasm32")]
    Initialized(anyhow::Result<Box<AppState>>),
    Load(LoadEvent),
}

impl std::fmt::Debug for ViewerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(target_arch = "wasm32")]
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::Load(event) => f.debug_tuple("Load").field(event).finish(),
        }
    }
}

impl LoadSink for EventLoopProxy<ViewerEvent> {
    fn send(&self, event: LoadEvent) {
        if self.send_event(ViewerEvent::Load(event)).is_err() {
            warn!("Load event dropped: the event loop has exited");
        }
    }
}

struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<ViewerEvent>,
    config: ViewerConfig,
    state: Option<AppState>,
    scene: SceneGraph,
    viewer: ViewerState,
    panel: ControlPanel,
    textures: TextureRegistry,
    /// The model arrived before the camera existed; fit it once it does.
    needs_fit: bool,
    started: bool,
    last_time: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<ViewerEvent>, config: ViewerConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        let viewer = ViewerState::new(
            EffectFlags {
                rotation_speed: config.rotation_speed,
                ..Default::default()
            },
            AnimationDriver::default(),
        );
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config,
            state: None,
            scene: SceneGraph::new(),
            viewer,
            panel: ControlPanel::default(),
            textures: TextureRegistry::default(),
            needs_fit: false,
            started: false,
            last_time: Instant::now(),
        })
    }

    fn spawn(&self, task: Task) {
        #[cfg(not(target_arch = "wasm32"))]
        self.async_runtime.spawn(task);
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(task);
    }

    /// Kick off the avatar and image loads. Runs once.
    fn start_loading(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        let (textures, tasks) = TextureRegistry::request(&self.config);
        self.textures = textures;
        for task in tasks {
            self.spawn(task);
        }

        let reporter = LoadReporter::new(self.proxy.clone());
        self.spawn(Box::pin(load_avatar(
            self.config.assets.clone(),
            self.config.model_file.clone(),
            reporter,
        )));
    }

    fn on_load_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Progress(fraction) => {
                info!("{}% loaded", (fraction * 100.0).floor());
            }
            LoadEvent::Loaded(asset) => self.install(*asset),
            LoadEvent::Failed(e) => {
                error!("An error happened while loading the model: {e:#}");
            }
        }
    }

    fn install(&mut self, asset: LoadedAsset) {
        let LoadedAsset {
            mut scene,
            animations,
        } = asset;

        for id in scene.drawables() {
            if let Some(node) = scene.get(id) {
                info!("Found mesh: {}", node.name);
            }
        }
        let bound = apply_textures(&mut scene, &self.textures);
        info!("Bound textures to {bound} meshes");

        self.viewer.driver = AnimationDriver::new(&scene, animations);
        self.panel = ControlPanel::bind(&scene);
        self.scene = scene;
        self.needs_fit = true;
        self.fit();
    }

    fn fit(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if !self.needs_fit {
            return;
        }
        self.needs_fit = false;
        let camera = &mut state.ctx.camera;
        center_model(
            &mut self.scene,
            &mut camera.camera,
            &state.ctx.projection,
            &mut camera.controller,
        );
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = (now - self.last_time).as_secs_f32();
        self.last_time = now;

        let Some(state) = self.state.as_mut() else {
            return;
        };

        let mut actions = Vec::new();
        let full_output = {
            let ctx = &mut state.ctx;
            let panel = &self.panel;
            let scene = &mut self.scene;
            let effects = &self.viewer.effects;
            state.gui.run(&ctx.window, |egui_ctx| {
                actions = panel.show(
                    egui_ctx,
                    scene,
                    &mut ctx.camera.camera,
                    &mut ctx.light.ambient,
                    &mut ctx.light.directional,
                    effects,
                );
            })
        };
        for action in actions {
            self.viewer.apply(action, &mut self.scene);
        }

        self.viewer.tick(&mut self.scene, dt, color_pulse::now_ms());
        state.ctx.update_view();
        render::prepare(&mut state.ctx, &mut self.scene);

        match render::render(&state.ctx, &self.scene, &mut state.gui, full_output) {
            Ok(()) => {}
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = state.ctx.window.inner_size();
                state.ctx.resize(size.width, size.height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("Out of GPU memory, exiting");
                event_loop.exit();
            }
            Err(e) => {
                error!("Unable to render {}", e);
            }
        }
        state.ctx.window.request_redraw();
    }

    fn on_initialized(&mut self, state: AppState) {
        let size = state.ctx.window.inner_size();
        self.state = Some(state);
        if let Some(state) = self.state.as_mut() {
            state.ctx.resize(size.width, size.height);
            state.ctx.window.request_redraw();
        }
        self.fit();
    }
}

impl ApplicationHandler<ViewerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("Avatar Viewer");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let canvas = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(CANVAS_ID))
                .and_then(|canvas| canvas.dyn_into::<web_sys::HtmlCanvasElement>().ok());
            match canvas {
                Some(canvas) => window_attributes = window_attributes.with_canvas(Some(canvas)),
                None => warn!("No <canvas id=\"{CANVAS_ID}\"> found, letting winit create one"),
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Could not create a window: {e}");
                event_loop.exit();
                return;
            }
        };

        self.start_loading();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let init = AppState::new(window, &self.config);
            match self.async_runtime.block_on(init) {
                Ok(state) => self.on_initialized(state),
                Err(e) => {
                    error!("Could not set up the renderer: {e:#}");
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            let config = self.config.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let state = AppState::new(window, &config).await.map(Box::new);
                if proxy.send_event(ViewerEvent::Initialized(state)).is_err() {
                    warn!("Renderer ready after the event loop exited");
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            #[cfg(target_arch = "wasm32")]
            ViewerEvent::Initialized(result) => match result {
                Ok(state) => self.on_initialized(*state),
                Err(e) => error!("Could not set up the renderer: {e:#}"),
            },
            ViewerEvent::Load(event) => self.on_load_event(event),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::RedrawRequested = event {
            self.redraw(event_loop);
            return;
        }

        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        let consumed = state.gui.on_window_event(&state.ctx.window, &event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.ctx.resize(size.width, size.height),
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => {
                let pressed = button_state.is_pressed();
                // a release always ends a drag, even over the panel
                if !pressed || !(consumed || state.gui.wants_pointer()) {
                    state.ctx.camera.controller.handle_mouse_button(pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let height = state.ctx.config.height;
                state
                    .ctx
                    .camera
                    .controller
                    .handle_cursor_moved(position, height);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if !(consumed || state.gui.wants_pointer()) {
                    state.ctx.camera.controller.handle_scroll(&delta);
                }
            }
            _ => {}
        }
    }
}

pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let env = env_logger::Env::default().default_filter_or("avatar_viewer=info,warn");
        if let Err(e) = env_logger::Builder::from_env(env).try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| anyhow::anyhow!("could not initialize logger: {e}"))?;
    }

    let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop, config)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}

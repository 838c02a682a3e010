
//! The rendering context: window, element registry and the frame loop.

use std::ffi::CStr;

use glfw::fail_on_errors;
use glfw::{Action, Context, Key, Modifiers, OpenGlProfileHint, WindowHint, WindowMode};
use log::{info, warn};

use crate::color::Color;
use crate::element::Element;
use crate::error::{RenderError, Result};
use crate::graphics;
use crate::shader::Reload;

/// Window and GL setup parameters. The defaults ask for a fixed-size window
/// with a GL 4.1 core, forward-compatible context.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub gl_version: (u32, u32),
}

impl Default for WindowConfig {
    fn default() -> WindowConfig {
        WindowConfig {
            title: String::from("easel"),
            width: 800,
            height: 800,
            resizable: false,
            gl_version: (4, 1),
        }
    }
}

/// The insertion-ordered element registry. Append-only: elements are drawn
/// in registration order every frame and live until the context is dropped.
pub struct Scene {
    elements: Vec<Element>,
}

impl Scene {
    fn new() -> Scene {
        Scene {
            elements: Vec::new(),
        }
    }

    /// Registers an element and returns its index in registration order.
    pub fn add(&mut self, element: Element) -> usize {
        self.elements.push(element);
        self.elements.len() - 1
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.elements.get_mut(index)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.elements.iter_mut()
    }
}

/// An application driven by [`RenderContext::run`].
///
/// `update` runs every frame before the elements are drawn, `render` after;
/// both default to doing nothing.
pub trait App: Sized {
    /// Called once, after the window and GL context exist. Create shaders
    /// and elements here; an error aborts startup.
    fn setup(ctx: &mut RenderContext) -> Result<Self>;

    /// Per-frame hook, runs before drawing.
    fn update(&mut self, _scene: &mut Scene) {}

    /// Per-frame hook, runs after drawing. Overlays and UI go here.
    fn render(&mut self, _scene: &mut Scene) {}
}

type KeyHandler = Box<dyn FnMut(&mut glfw::Window, Key, Action, Modifiers)>;

/// Owns the window, the GL context and the scene, and drives the frame
/// loop. Constructed exactly once; the context thread is the only thread
/// that ever touches GL state.
pub struct RenderContext {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    scene: Scene,
    clear_color: Color,
    key_handler: Option<KeyHandler>,
}

impl RenderContext {
    /// Initializes the windowing system, creates the window, makes its
    /// context current and loads the GL function pointers. Every failure in
    /// here is fatal; nothing can be rendered without a context.
    pub fn new(config: WindowConfig) -> Result<RenderContext> {
        let mut glfw = glfw::init(glfw::fail_on_errors!())
            .map_err(|err| RenderError::Init(format!("glfw: {}", err)))?;

        let (major, minor) = config.gl_version;
        glfw.window_hint(WindowHint::ContextVersion(major, minor));
        glfw.window_hint(WindowHint::OpenGlProfile(OpenGlProfileHint::Core));
        glfw.window_hint(WindowHint::OpenGlForwardCompat(true));
        glfw.window_hint(WindowHint::Resizable(config.resizable));

        let (mut window, events) = glfw
            .create_window(config.width, config.height, &config.title, WindowMode::Windowed)
            .ok_or_else(|| RenderError::Init(String::from("failed to create window")))?;

        window.make_current();
        window.set_key_polling(true);

        gl::load_with(|symbol| window.get_proc_address(symbol) as *const _);

        unsafe {
            let version = gl::GetString(gl::VERSION);
            if !version.is_null() {
                let version = CStr::from_ptr(version as *const _);
                info!("OpenGL version: {}", version.to_string_lossy());
            }
        }

        graphics::viewport(0, 0, config.width, config.height);
        graphics::set_depth_testing(true);

        Ok(RenderContext {
            glfw,
            window,
            events,
            scene: Scene::new(),
            clear_color: Color::rgb(0.2, 0.2, 0.2),
            key_handler: None,
        })
    }

    pub fn scene(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Registers an element; see [`Scene::add`].
    pub fn add_element(&mut self, element: Element) -> usize {
        self.scene.add(element)
    }

    /// The color each frame is cleared to. Defaults to dark grey.
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Registers the handler invoked for every key event the window
    /// delivers. The handler may flag the window for closing.
    pub fn set_key_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&mut glfw::Window, Key, Action, Modifiers) + 'static,
    {
        self.key_handler = Some(Box::new(handler));
    }

    /// Builds the app and runs the frame loop until the window close flag
    /// is set: clear, update hook, draw every element and poll its shader
    /// for reloads, render hook, present, process input.
    ///
    /// Only startup can return an error; once the loop is running, a failed
    /// shader reload is logged and the last good program keeps drawing.
    pub fn run<A: App>(mut self) -> Result<()> {
        let mut app = A::setup(&mut self)?;

        while !self.window.should_close() {
            graphics::clear(Some(self.clear_color), true, false);

            app.update(&mut self.scene);

            for element in self.scene.elements.iter() {
                element.draw();

                let reload = element.shader().borrow_mut().poll_and_reload();
                match reload {
                    Ok(Reload::Swapped) => {
                        let shader = element.shader().borrow();
                        let (vertex, fragment) = shader.source_paths();
                        info!("reloaded shader ({} + {})", vertex.display(), fragment.display());
                    }
                    Ok(Reload::UpToDate) => {}
                    // Not fatal: the element keeps drawing with the last
                    // good program, and the next save retries.
                    Err(err) => warn!("shader reload failed: {}", err),
                }
            }

            app.render(&mut self.scene);

            graphics::log_errors();

            self.window.swap_buffers();
            self.glfw.poll_events();

            for (_, event) in glfw::flush_messages(&self.events) {
                if let glfw::WindowEvent::Key(key, _, action, modifiers) = event {
                    if let Some(handler) = self.key_handler.as_mut() {
                        handler(&mut self.window, key, action, modifiers);
                    }
                }
            }
        }

        Ok(())
    }
}


//! Draws the reference quad with hot-reloadable shaders. Edit
//! `assets/shaders/quad.frag` while this is running and save to see the
//! program swap; save a broken version and the quad keeps rendering with
//! the previous one. Escape closes the window.

use easel::{
    Action, App, Color, Element, Key, Mesh, RenderContext, Result, Scene, ShaderProgram,
    WindowConfig,
};

struct SpinningQuad {
    quad: usize,
    time: f32,
}

impl App for SpinningQuad {
    fn setup(ctx: &mut RenderContext) -> Result<SpinningQuad> {
        let shader = ShaderProgram::new(
            "assets/shaders/quad.vert",
            "assets/shaders/quad.frag",
        )?
        .shared();
        let quad = ctx.add_element(Element::new(&Mesh::quad(), shader)?);

        ctx.set_clear_color(Color::hex("#22252b").unwrap_or(Color::rgb(0.2, 0.2, 0.2)));
        ctx.set_key_handler(|window, key, action, _modifiers| {
            if key == Key::Escape && action == Action::Press {
                window.set_should_close(true);
            }
        });

        Ok(SpinningQuad { quad, time: 0.0 })
    }

    fn update(&mut self, scene: &mut Scene) {
        self.time += 0.016;

        if let Some(quad) = scene.get_mut(self.quad) {
            quad.transform.rotation.z += 0.8;

            let shader = quad.shader().borrow();
            shader.bind();
            shader.set_uniform("time", self.time);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = WindowConfig {
        title: String::from("spinning quad"),
        ..WindowConfig::default()
    };
    RenderContext::new(config)?.run::<SpinningQuad>()
}

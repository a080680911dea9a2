use ember_core::draw::{DrawLayer, DrawList, Renderer, Visual};
use ember_core::geometry::Rect;
use ember_core::input::{InputEvent, Key};
use glam::Vec2;

use crate::level::LevelError;
use crate::states::{State, StateContext, StateFlow, StateId};

const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
const OPTION_SIZE: [f32; 2] = [200.0, 60.0];
const PLAY_CENTER: [f32; 2] = [400.0, 325.0];
const QUIT_CENTER: [f32; 2] = [400.0, 400.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Play,
    Quit,
}

/// Title menu: "play" enters the game, "quit" ends the loop.
pub struct Menu {
    selected: MenuChoice,
    flow: StateFlow,
}

impl Menu {
    pub fn new() -> Self {
        Self {
            selected: MenuChoice::Play,
            flow: StateFlow::new(StateId::Game),
        }
    }

    pub fn selected(&self) -> MenuChoice {
        self.selected
    }

    fn compose(&self, viewport: Vec2) -> DrawList {
        let mut layer = DrawLayer::new(Vec2::ZERO);
        // Options are laid out for an 800x640 screen and scaled to the viewport.
        let scale = viewport / Vec2::new(800.0, 640.0);
        for (choice, center) in [
            (MenuChoice::Play, PLAY_CENTER),
            (MenuChoice::Quit, QUIT_CENTER),
        ] {
            let rect = Rect::from_center(
                Vec2::from(center) * scale,
                OPTION_SIZE[0] * scale.x,
                OPTION_SIZE[1] * scale.y,
            );
            layer.push(
                Visual::MenuOption {
                    selected: self.selected == choice,
                },
                rect,
            );
        }
        let mut frame = DrawList::new(BACKGROUND);
        frame.layers.push(layer);
        frame
    }
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

impl State for Menu {
    fn startup(&mut self, _ctx: &mut StateContext<'_>) -> Result<(), LevelError> {
        self.selected = MenuChoice::Play;
        Ok(())
    }

    fn get_event(&mut self, event: InputEvent, _ctx: &mut StateContext<'_>) {
        match event {
            InputEvent::Quit | InputEvent::KeyDown(Key::Escape) => self.flow.quit = true,
            InputEvent::KeyDown(Key::W) => self.selected = MenuChoice::Play,
            InputEvent::KeyDown(Key::S) => self.selected = MenuChoice::Quit,
            InputEvent::KeyDown(Key::Return | Key::Space) => match self.selected {
                MenuChoice::Play => self.flow.done = true,
                MenuChoice::Quit => self.flow.quit = true,
            },
            _ => {}
        }
    }

    fn update(
        &mut self,
        ctx: &mut StateContext<'_>,
        renderer: &mut dyn Renderer,
    ) -> Result<(), LevelError> {
        let viewport = Vec2::new(
            ctx.config.display_width as f32,
            ctx.config.display_height as f32,
        );
        renderer.submit(self.compose(viewport));
        Ok(())
    }

    fn flow(&self) -> &StateFlow {
        &self.flow
    }

    fn flow_mut(&mut self) -> &mut StateFlow {
        &mut self.flow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::rng::SimRng;
    use ember_core::audio::RecordingAudio;
    use ember_core::draw::RecordingRenderer;
    use ember_core::input::InputState;

    fn with_ctx(f: impl FnOnce(&mut StateContext<'_>)) {
        let config = GameConfig::default();
        let input = InputState::new();
        let mut rng = SimRng::seeded(0, 0);
        let mut audio = RecordingAudio::default();
        let mut ctx = StateContext {
            config: &config,
            input: &input,
            now_us: 0,
            rng: &mut rng,
            audio: &mut audio,
        };
        f(&mut ctx);
    }

    #[test]
    fn confirm_on_play_finishes_menu() {
        with_ctx(|ctx| {
            let mut menu = Menu::new();
            menu.get_event(InputEvent::KeyDown(Key::S), ctx);
            menu.get_event(InputEvent::KeyDown(Key::W), ctx);
            menu.get_event(InputEvent::KeyDown(Key::Return), ctx);
            assert!(menu.flow().done);
            assert!(!menu.flow().quit);
            assert_eq!(menu.flow().next, StateId::Game);
        });
    }

    #[test]
    fn confirm_on_quit_requests_quit() {
        with_ctx(|ctx| {
            let mut menu = Menu::new();
            menu.get_event(InputEvent::KeyDown(Key::S), ctx);
            assert_eq!(menu.selected(), MenuChoice::Quit);
            menu.get_event(InputEvent::KeyDown(Key::Space), ctx);
            assert!(menu.flow().quit);
            assert!(!menu.flow().done);
        });
    }

    #[test]
    fn highlights_the_selected_option() {
        with_ctx(|ctx| {
            let mut menu = Menu::new();
            let mut renderer = RecordingRenderer::default();
            menu.get_event(InputEvent::KeyDown(Key::S), ctx);
            menu.update(ctx, &mut renderer).expect("menu update");

            let frame = renderer.last.expect("frame submitted");
            assert_eq!(frame.clear_color, BACKGROUND);
            let items = &frame.layers[0].items;
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].visual, Visual::MenuOption { selected: false });
            assert_eq!(items[1].visual, Visual::MenuOption { selected: true });
            assert_eq!(items[0].rect.center(), Vec2::new(400.0, 325.0));
        });
    }
}

//! SDL2 Window Display Module
//! Shows color and colorized depth side by side, with a Snap button.
//! Uses the sdl2 crate for window management and rendering.

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use sdl2::pixels::{Color, PixelFormatEnum};
use sdl2::rect::Rect;
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

use tracing::info;

use crate::capture::frame::{FrameBundle, PixelFormat, VideoFrame};
use crate::display::PreviewRenderer;
use crate::pipeline::trigger::SnapshotTrigger;
use crate::{DisplayConfig, Error, Result};

const BUTTON_WIDTH: u32 = 120;
const BUTTON_HEIGHT: u32 = 44;
const BUTTON_MARGIN: i32 = 12;
const FLASH_FRAMES: u8 = 6;

fn display_err(e: impl std::fmt::Display) -> Error {
    Error::Display(e.to_string())
}

/// SDL2 Window Display
/// Handles window creation, event polling, and frame rendering.
pub struct Sdl2Display {
    canvas: Canvas<Window>,
    texture_creator: TextureCreator<WindowContext>,
    event_pump: EventPump,
    width: u32,
    height: u32,
    button: Rect,
    flash: u8,
    _sdl: sdl2::Sdl,
}

impl Sdl2Display {
    pub fn new(config: &DisplayConfig) -> Result<Self> {
        let sdl_context = sdl2::init().map_err(display_err)?;
        let video_subsystem = sdl_context.video().map_err(display_err)?;

        let window = video_subsystem
            .window(&config.title, config.width, config.height)
            .position_centered()
            .build()
            .map_err(display_err)?;

        let canvas = window
            .into_canvas()
            .present_vsync()
            .build()
            .map_err(display_err)?;
        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump().map_err(display_err)?;

        let button = Rect::new(
            BUTTON_MARGIN,
            config.height as i32 - BUTTON_HEIGHT as i32 - BUTTON_MARGIN,
            BUTTON_WIDTH,
            BUTTON_HEIGHT,
        );

        info!("Preview window {}x{} open", config.width, config.height);
        Ok(Self {
            canvas,
            texture_creator,
            event_pump,
            width: config.width,
            height: config.height,
            button,
            flash: 0,
            _sdl: sdl_context,
        })
    }

    fn snap(&mut self, trigger: &SnapshotTrigger) {
        trigger.request();
        self.flash = FLASH_FRAMES;
    }

    fn draw_frame(&mut self, frame: &VideoFrame, target: Rect) -> Result<()> {
        let format = match frame.format {
            PixelFormat::Rgb8 => PixelFormatEnum::RGB24,
            PixelFormat::Bgr8 => PixelFormatEnum::BGR24,
            PixelFormat::Rgba8 => PixelFormatEnum::ABGR8888,
            PixelFormat::Bgra8 => PixelFormatEnum::ARGB8888,
            // Raw depth and mono have no direct texture format
            PixelFormat::Y8 | PixelFormat::Z16 => return Ok(()),
        };
        if !frame.is_valid() {
            return Ok(());
        }

        let mut texture = self
            .texture_creator
            .create_texture_streaming(format, frame.width, frame.height)
            .map_err(display_err)?;
        texture
            .update(None, &frame.data, frame.stride as usize)
            .map_err(display_err)?;

        self.canvas
            .copy(&texture, None, Some(target))
            .map_err(display_err)
    }

    fn draw_button(&mut self) -> Result<()> {
        let fill = if self.flash > 0 {
            self.flash -= 1;
            Color::RGB(60, 170, 80)
        } else {
            Color::RGB(70, 70, 80)
        };
        self.canvas.set_draw_color(fill);
        self.canvas.fill_rect(self.button).map_err(display_err)?;
        self.canvas.set_draw_color(Color::RGB(230, 230, 230));
        self.canvas.draw_rect(self.button).map_err(display_err)
    }
}

impl PreviewRenderer for Sdl2Display {
    fn poll_events(&mut self, trigger: &SnapshotTrigger) -> Result<bool> {
        let events: Vec<Event> = self.event_pump.poll_iter().collect();
        for event in events {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => {
                    info!("Quit event received");
                    return Ok(false);
                }
                Event::KeyDown {
                    keycode: Some(Keycode::S | Keycode::Space),
                    repeat: false,
                    ..
                } => self.snap(trigger),
                Event::MouseButtonDown {
                    mouse_btn: MouseButton::Left,
                    x,
                    y,
                    ..
                } if self.button.contains_point((x, y)) => self.snap(trigger),
                _ => {}
            }
        }
        Ok(true)
    }

    fn wants_colorized_depth(&self) -> bool {
        true
    }

    fn show(&mut self, bundle: &FrameBundle, colorized_depth: Option<&VideoFrame>) -> Result<()> {
        let half = self.width / 2;
        let left = Rect::new(0, 0, half, self.height);
        let right = Rect::new(half as i32, 0, half, self.height);

        self.canvas.set_draw_color(Color::RGB(0, 0, 0));
        self.canvas.clear();
        if let Some(color) = &bundle.color {
            self.draw_frame(color, left)?;
        }
        if let Some(depth) = colorized_depth {
            self.draw_frame(depth, right)?;
        }
        self.draw_button()?;

        self.canvas.present();
        Ok(())
    }
}

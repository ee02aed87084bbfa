use anyhow::Context;
use clap::Parser;
use julia_preview::{
    config::Config, display::Display, screen::Size, session::Session, surface::Surface, Error,
};
use log::{error, info};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent},
    event_loop::EventLoop,
    window::WindowBuilder,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::parse();
    let initial_size = config.window_size();

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("Julia preview")
        .with_inner_size(PhysicalSize::new(initial_size.width, initial_size.height))
        .build(&event_loop)
        .context("failed to create window")?;

    let mut display = Display::new(&window).context("failed to set up the display")?;
    let mut session = Session::new(&config, display.size());
    session
        .redraw(&mut display)
        .context("failed to draw the initial frame")?;

    info!("entering main loop");
    event_loop.run(move |event, _, control_flow| {
        control_flow.set_wait();

        let result = match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    control_flow.set_exit();
                    Ok(())
                }
                WindowEvent::Resized(size) => resize(&mut display, &mut session, size.into()),
                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    resize(&mut display, &mut session, Size::from(*new_inner_size))
                }
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => match key {
                    VirtualKeyCode::Escape => {
                        control_flow.set_exit();
                        Ok(())
                    }
                    VirtualKeyCode::Up => adjust_period(&mut display, &mut session, 1),
                    VirtualKeyCode::Down => adjust_period(&mut display, &mut session, -1),
                    _ => Ok(()),
                },
                WindowEvent::CursorMoved { position, .. } => session
                    .pointer_moved(position.into(), &mut display)
                    .map(|_| ()),
                WindowEvent::CursorLeft { .. } => {
                    session.pointer_left();
                    Ok(())
                }
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => session
                    .pointer_button(state == ElementState::Pressed, &mut display)
                    .map(|_| ()),
                _ => Ok(()),
            },
            Event::RedrawRequested(window_id) if window_id == window.id() => display.refresh(),
            _ => Ok(()),
        };

        if let Err(error) = result {
            error!("{}", error);
            control_flow.set_exit_with_code(1);
        }
    });
}

fn resize(display: &mut Display, session: &mut Session, size: Size) -> Result<(), Error> {
    display.resize(size);
    session.resize(size);
    session.redraw(display)
}

fn adjust_period(display: &mut Display, session: &mut Session, delta: i32) -> Result<(), Error> {
    if session.adjust_period(delta) {
        session.redraw(display)?;
    }
    Ok(())
}

//! Hand a built frame to a backend

use crate::backend::{BackendError, MatrixBackend};
use crate::frame::{RenderFrame, MAX_ENTRIES};

/// Most backend calls one frame can take
pub const MAX_COMMANDS: usize = MAX_ENTRIES + 2;

/// Backend calls [`present`] makes for `frame`
pub fn command_count(frame: &RenderFrame) -> usize {
    frame.len() + 2
}

/// Clear, draw every entry in order, then swap
pub fn present<B: MatrixBackend + ?Sized>(
    frame: &RenderFrame,
    backend: &mut B,
) -> Result<(), BackendError> {
    backend.clear()?;
    for entry in frame.entries() {
        backend.draw_text(entry.font, entry.position, entry.color, &entry.text)?;
    }
    backend.swap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ALT_YELLOW, YELLOW};
    use crate::font::FontFace;
    use embedded_graphics::pixelcolor::Rgb888;
    use embedded_graphics::prelude::Point;
    use std::string::{String, ToString};
    use std::vec::Vec;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        fail_on_draw: bool,
    }

    impl MatrixBackend for Recorder {
        fn clear(&mut self) -> Result<(), BackendError> {
            self.calls.push("clear".to_string());
            Ok(())
        }

        fn draw_text(
            &mut self,
            font: FontFace,
            position: Point,
            _color: Rgb888,
            text: &str,
        ) -> Result<i32, BackendError> {
            if self.fail_on_draw {
                return Err(BackendError::Communication);
            }
            self.calls.push(std::format!("{text}@{},{}", position.x, position.y));
            Ok(font.text_width(text))
        }

        fn swap(&mut self) -> Result<(), BackendError> {
            self.calls.push("swap".to_string());
            Ok(())
        }
    }

    fn frame() -> RenderFrame {
        let mut frame = RenderFrame::new();
        frame
            .push_fmt(format_args!("2"), YELLOW, Point::new(1, 13), FontFace::Bold)
            .unwrap();
        frame
            .push_fmt(format_args!("YRS"), ALT_YELLOW, Point::new(8, 13), FontFace::Bold)
            .unwrap();
        frame
    }

    #[test]
    fn test_order() {
        let mut backend = Recorder::default();
        present(&frame(), &mut backend).unwrap();
        assert_eq!(backend.calls, ["clear", "2@1,13", "YRS@8,13", "swap"]);
    }

    #[test]
    fn test_command_count_matches_calls() {
        let mut backend = Recorder::default();
        let frame = frame();
        present(&frame, &mut backend).unwrap();
        assert_eq!(command_count(&frame), backend.calls.len());

        let mut backend = Recorder::default();
        present(&RenderFrame::new(), &mut backend).unwrap();
        assert_eq!(command_count(&RenderFrame::new()), backend.calls.len());
    }

    #[test]
    fn test_error_stops_before_swap() {
        let mut backend = Recorder {
            fail_on_draw: true,
            ..Recorder::default()
        };
        assert_eq!(present(&frame(), &mut backend), Err(BackendError::Communication));
        assert_eq!(backend.calls, ["clear"]);
    }
}

//! Shape generation for 2D primitives

use super::commands::DrawCommand;
use super::vertex::{Vertex, colors};
use crate::sim::Rect;

/// Two triangles covering a rectangle
pub fn rect(rect: &Rect, color: [f32; 4]) -> [Vertex; 6] {
    let (l, r, t, b) = (rect.left(), rect.right(), rect.top(), rect.bottom());
    [
        Vertex::new(l, t, color),
        Vertex::new(l, b, color),
        Vertex::new(r, t, color),
        Vertex::new(r, t, color),
        Vertex::new(l, b, color),
        Vertex::new(r, b, color),
    ]
}

/// Flatten draw commands into a clear color and a triangle list.
/// A later `Clear` discards everything drawn before it.
pub fn tessellate(commands: &[DrawCommand]) -> ([f32; 4], Vec<Vertex>) {
    let mut clear = colors::BACKGROUND;
    let mut vertices = Vec::with_capacity(commands.len() * 6);
    for command in commands {
        match command {
            DrawCommand::Clear { color } => {
                clear = *color;
                vertices.clear();
            }
            DrawCommand::Rect { rect: r, color } => vertices.extend_from_slice(&rect(r, *color)),
        }
    }
    (clear, vertices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_corners() {
        let vertices = rect(&Rect::new(10.0, 20.0, 40.0, 20.0), [1.0; 4]);
        let xs: Vec<f32> = vertices.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = vertices.iter().map(|v| v.position[1]).collect();
        assert!(xs.iter().all(|&x| x == 10.0 || x == 50.0));
        assert!(ys.iter().all(|&y| y == 20.0 || y == 40.0));
    }

    #[test]
    fn test_tessellate() {
        let red = [1.0, 0.0, 0.0, 1.0];
        let commands = vec![
            DrawCommand::Rect {
                rect: Rect::new(0.0, 0.0, 1.0, 1.0),
                color: red,
            },
            DrawCommand::Clear { color: red },
            DrawCommand::Rect {
                rect: Rect::new(0.0, 0.0, 1.0, 1.0),
                color: colors::PLAYER,
            },
        ];
        let (clear, vertices) = tessellate(&commands);
        assert_eq!(clear, red);
        assert_eq!(vertices.len(), 6);
        assert!(vertices.iter().all(|v| v.color == colors::PLAYER));
    }
}

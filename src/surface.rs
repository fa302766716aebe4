//! Drawing-surface abstraction and the in-memory backends.

/// An sRGB colour with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }
}

/// How a filled shape is coloured.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Linear gradient between two points; stop offsets lie in `[0, 1]`.
    Linear {
        from: (f64, f64),
        to: (f64, f64),
        stops: Vec<(f64, Color)>,
    },
    /// Radial gradient between two concentric circles.
    Radial {
        center: (f64, f64),
        r_inner: f64,
        r_outer: f64,
        stops: Vec<(f64, Color)>,
    },
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    /// Quadratic curve through a control point to an end point.
    QuadTo { cx: f64, cy: f64, x: f64, y: f64 },
}

/// An open polyline of straight and quadratic segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, x: f64, y: f64) -> Self {
        self.segments.push(Segment::MoveTo(x, y));
        self
    }

    pub fn line_to(mut self, x: f64, y: f64) -> Self {
        self.segments.push(Segment::LineTo(x, y));
        self
    }

    pub fn quad_to(mut self, cx: f64, cy: f64, x: f64, y: f64) -> Self {
        self.segments.push(Segment::QuadTo { cx, cy, x, y });
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

/// A 2D raster target. Shapes are painted in call order, so later calls
/// cover earlier ones.
pub trait Surface {
    /// Start a new frame of the given size, discarding the previous one.
    fn begin_frame(&mut self, width: f64, height: f64);

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: &Paint);

    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, paint: &Paint);

    /// Fill an ellipse rotated by `rotation` radians about its centre.
    fn fill_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, rotation: f64, paint: &Paint);

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke);

    /// Draw `text` with its baseline starting at `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f64, y: f64, size: f64, color: Color);

    fn end_frame(&mut self) {}
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect { x: f64, y: f64, w: f64, h: f64, paint: Paint },
    Circle { cx: f64, cy: f64, r: f64, paint: Paint },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64, rotation: f64, paint: Paint },
    Path { path: Path, stroke: Stroke },
    Text { text: String, x: f64, y: f64, size: f64, color: Color },
}

/// Surface that keeps the calls of the current frame.
#[derive(Debug, Default)]
pub struct Recording {
    ops: Vec<DrawOp>,
    n_frames: usize,
    size: (f64, f64),
}

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls of the most recent frame.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Number of frames begun so far.
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    pub fn size(&self) -> (f64, f64) {
        self.size
    }
}

impl Surface for Recording {
    fn begin_frame(&mut self, width: f64, height: f64) {
        self.ops.clear();
        self.n_frames += 1;
        self.size = (width, height);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: &Paint) {
        let paint = paint.clone();
        self.ops.push(DrawOp::Rect { x, y, w, h, paint });
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, paint: &Paint) {
        let paint = paint.clone();
        self.ops.push(DrawOp::Circle { cx, cy, r, paint });
    }

    fn fill_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, rotation: f64, paint: &Paint) {
        let paint = paint.clone();
        self.ops.push(DrawOp::Ellipse {
            cx,
            cy,
            rx,
            ry,
            rotation,
            paint,
        });
    }

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke) {
        self.ops.push(DrawOp::Path {
            path: path.clone(),
            stroke: *stroke,
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, size: f64, color: Color) {
        let text = text.to_string();
        self.ops.push(DrawOp::Text {
            text,
            x,
            y,
            size,
            color,
        });
    }
}

/// Surface that paints nothing. Stands in when no real target is available.
#[derive(Debug, Default)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn begin_frame(&mut self, _width: f64, _height: f64) {}
    fn fill_rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64, _paint: &Paint) {}
    fn fill_circle(&mut self, _cx: f64, _cy: f64, _r: f64, _paint: &Paint) {}
    fn fill_ellipse(&mut self, _: f64, _: f64, _: f64, _: f64, _: f64, _paint: &Paint) {}
    fn stroke_path(&mut self, _path: &Path, _stroke: &Stroke) {}
    fn fill_text(&mut self, _text: &str, _x: f64, _y: f64, _size: f64, _color: Color) {}
}

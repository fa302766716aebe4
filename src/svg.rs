use crate::surface::{Color, Paint, Path, Segment, Stroke, Surface};
use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path as FsPath,
};

/// Surface that renders each frame into an SVG document.
#[derive(Debug, Default)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    body: String,
    n_gradients: usize,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current frame as a complete SVG document.
    pub fn document(&self) -> String {
        let (w, h) = (self.width, self.height);
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" \
             viewBox=\"0 0 {w} {h}\">\n{}</svg>\n",
            self.body
        )
    }

    /// Write the current frame to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer
            .write_all(self.document().as_bytes())
            .context("failed to write svg document")?;
        writer.flush().context("failed to flush writer stream")?;
        Ok(())
    }

    /// Write the current frame to a new file.
    pub fn save<P: AsRef<FsPath>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        self.write_to(&mut BufWriter::new(file))
    }

    /// Emit the fill attributes for `paint`, defining a gradient first when needed.
    fn fill_attrs(&mut self, paint: &Paint) -> String {
        match paint {
            Paint::Solid(color) => color_attrs("fill", *color),
            Paint::Linear { from, to, stops } => {
                let id = self.next_gradient_id();
                self.push_elem(format!(
                    "<defs><linearGradient id=\"{id}\" gradientUnits=\"userSpaceOnUse\" \
                     x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\">{}</linearGradient></defs>",
                    from.0,
                    from.1,
                    to.0,
                    to.1,
                    stop_elems(stops)
                ));
                format!("fill=\"url(#{id})\"")
            }
            Paint::Radial {
                center,
                r_inner,
                r_outer,
                stops,
            } => {
                let id = self.next_gradient_id();
                self.push_elem(format!(
                    "<defs><radialGradient id=\"{id}\" gradientUnits=\"userSpaceOnUse\" \
                     cx=\"{0}\" cy=\"{1}\" fx=\"{0}\" fy=\"{1}\" r=\"{2}\" fr=\"{3}\">{4}\
                     </radialGradient></defs>",
                    center.0,
                    center.1,
                    r_outer,
                    r_inner,
                    stop_elems(stops)
                ));
                format!("fill=\"url(#{id})\"")
            }
        }
    }

    fn push_elem(&mut self, elem: String) {
        self.body.push_str(&elem);
        self.body.push('\n');
    }

    fn next_gradient_id(&mut self) -> String {
        self.n_gradients += 1;
        format!("g{}", self.n_gradients)
    }
}

impl Surface for SvgSurface {
    fn begin_frame(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.body.clear();
        self.n_gradients = 0;
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: &Paint) {
        let fill = self.fill_attrs(paint);
        self.push_elem(format!(
            "<rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" {fill}/>"
        ));
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, paint: &Paint) {
        let fill = self.fill_attrs(paint);
        self.push_elem(format!("<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\" {fill}/>"));
    }

    fn fill_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, rotation: f64, paint: &Paint) {
        let fill = self.fill_attrs(paint);
        let deg = rotation.to_degrees();
        self.push_elem(format!(
            "<ellipse cx=\"{cx}\" cy=\"{cy}\" rx=\"{rx}\" ry=\"{ry}\" \
             transform=\"rotate({deg} {cx} {cy})\" {fill}/>"
        ));
    }

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke) {
        let d = path
            .segments()
            .iter()
            .map(|segment| match *segment {
                Segment::MoveTo(x, y) => format!("M{x} {y}"),
                Segment::LineTo(x, y) => format!("L{x} {y}"),
                Segment::QuadTo { cx, cy, x, y } => format!("Q{cx} {cy} {x} {y}"),
            })
            .collect::<Vec<_>>()
            .join(" ");
        self.push_elem(format!(
            "<path d=\"{d}\" fill=\"none\" {} stroke-width=\"{}\"/>",
            color_attrs("stroke", stroke.color),
            stroke.width
        ));
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, size: f64, color: Color) {
        self.push_elem(format!(
            "<text x=\"{x}\" y=\"{y}\" font-size=\"{size}\" \
             font-family=\"Inter, sans-serif\" {}>{}</text>",
            color_attrs("fill", color),
            escape(text)
        ));
    }
}

fn color_attrs(attr: &str, color: Color) -> String {
    let Color { r, g, b, a } = color;
    if a >= 1.0 {
        format!("{attr}=\"rgb({r},{g},{b})\"")
    } else {
        format!("{attr}=\"rgb({r},{g},{b})\" {attr}-opacity=\"{a}\"")
    }
}

fn stop_elems(stops: &[(f64, Color)]) -> String {
    stops
        .iter()
        .map(|&(offset, Color { r, g, b, a })| {
            format!("<stop offset=\"{offset}\" stop-color=\"rgb({r},{g},{b})\" stop-opacity=\"{a}\"/>")
        })
        .collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

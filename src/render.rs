//! Painting the world onto a [`Surface`].
//!
//! Layers are painted back to front: sky, sun glow, river (swim mode only),
//! ground, shrubs, seeds, plants and finally the deer.

use crate::config::LayoutConfig;
use crate::model::{Actor, Controls, Plant, Seed, World};
use crate::surface::{Color, Paint, Path, Stroke, Surface};

const SKY_TOP: Color = Color::rgb(0x07, 0x14, 0x27);
const SKY_MID: Color = Color::rgb(0x0a, 0x1f, 0x3f);
const SKY_BOTTOM: Color = Color::rgb(0x0b, 0x21, 0x3b);
const SUN: Color = Color::rgba(255, 240, 180, 0.85);
const RIVER: Color = Color::rgba(64, 186, 235, 0.25);
const RIPPLE: Color = Color::rgba(160, 220, 255, 0.25);
const GROUND: Color = Color::rgb(0x0d, 0x2a, 0x22);
const SHRUB: Color = Color::rgba(77, 219, 166, 0.12);
const SEED: Color = Color::rgb(0xa8, 0xda, 0xdc);
const SPROUT: Color = Color::rgb(0x4d, 0xdb, 0xa6);
const FUR: Color = Color::rgb(0xc4, 0x9a, 0x6c);
const EAR: Color = Color::rgb(0xd8, 0xb8, 0x92);
const LEGS: Color = Color::rgb(0x9b, 0x7a, 0x52);
const LABEL: Color = Color::rgb(0x90, 0xe0, 0xef);

const N_SHRUBS: usize = 12;
const N_RIPPLES: usize = 6;

/// Stateless painter for a given landscape layout.
#[derive(Debug, Clone)]
pub struct Renderer {
    layout: LayoutConfig,
}

impl Renderer {
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    /// Paint one complete frame of `world`. Never modifies the world.
    pub fn render<S: Surface + ?Sized>(&self, world: &World, controls: &Controls, surface: &mut S) {
        let (w, h) = (world.width, world.height);
        let ground_y = self.layout.ground_y(h);
        let river_y = self.layout.river_y(h);

        surface.begin_frame(w, h);
        draw_sky(surface, w, h);
        if controls.swim {
            draw_river(surface, w, river_y);
        }
        draw_ground(surface, w, h, ground_y);
        for seed in world.seeds.iter().filter(|seed| !seed.sprouted()) {
            draw_seed(surface, seed);
        }
        for plant in &world.plants {
            draw_plant(surface, plant);
        }
        draw_actor(surface, &world.actor);
        surface.end_frame();
    }
}

fn draw_sky<S: Surface + ?Sized>(surface: &mut S, w: f64, h: f64) {
    let sky = Paint::Linear {
        from: (0.0, 0.0),
        to: (0.0, h),
        stops: vec![(0.0, SKY_TOP), (0.5, SKY_MID), (1.0, SKY_BOTTOM)],
    };
    surface.fill_rect(0.0, 0.0, w, h, &sky);

    // Soft morning light.
    let center = (w * 0.15, h * 0.18);
    let glow = Paint::Radial {
        center,
        r_inner: 6.0,
        r_outer: 60.0,
        stops: vec![(0.0, SUN), (1.0, SUN.with_alpha(0.0))],
    };
    surface.fill_circle(center.0, center.1, 46.0, &glow);
}

fn draw_river<S: Surface + ?Sized>(surface: &mut S, w: f64, river_y: f64) {
    surface.fill_rect(0.0, river_y - 24.0, w, 48.0, &RIVER.into());

    let stroke = Stroke {
        color: RIPPLE,
        width: 1.0,
    };
    for i_ripple in 0..N_RIPPLES {
        let y = river_y - 20.0 + i_ripple as f64 * 8.0;
        let mut path = Path::new().move_to(10.0, y);
        let mut x = 10.0;
        while x < w - 10.0 {
            path = path.quad_to(x + 8.0, y + 2.0, x + 16.0, y);
            x += 24.0;
        }
        surface.stroke_path(&path, &stroke);
    }
}

fn draw_ground<S: Surface + ?Sized>(surface: &mut S, w: f64, h: f64, ground_y: f64) {
    surface.fill_rect(0.0, ground_y, w, h - ground_y, &GROUND.into());

    let shrub = Paint::from(SHRUB);
    for i_shrub in 0..N_SHRUBS {
        let (sx, sy) = shrub_position(i_shrub, w, ground_y);
        surface.fill_ellipse(sx, sy, 24.0, 12.0, 0.0, &shrub);
    }
}

/// Fixed position of background shrub `i_shrub`.
pub fn shrub_position(i_shrub: usize, w: f64, ground_y: f64) -> (f64, f64) {
    let sx = (i_shrub as f64 * 83.0) % (w + 60.0) - 30.0;
    let sy = ground_y - 10.0 - (i_shrub % 3) as f64 * 6.0;
    (sx, sy)
}

fn draw_seed<S: Surface + ?Sized>(surface: &mut S, seed: &Seed) {
    surface.fill_circle(seed.x, seed.y, 2.0, &SEED.into());
}

fn draw_plant<S: Surface + ?Sized>(surface: &mut S, plant: &Plant) {
    let stroke = Stroke {
        color: SPROUT,
        width: 2.0,
    };
    let (x, y) = (plant.x, plant.y);
    let stem = Path::new().move_to(x, y).line_to(x, y - 12.0);
    surface.stroke_path(&stem, &stroke);

    let leaves = Path::new()
        .move_to(x, y - 12.0)
        .quad_to(x - 6.0, y - 18.0, x - 2.0, y - 12.0)
        .move_to(x, y - 12.0)
        .quad_to(x + 6.0, y - 18.0, x + 2.0, y - 12.0);
    surface.stroke_path(&leaves, &stroke);
}

fn draw_actor<S: Surface + ?Sized>(surface: &mut S, actor: &Actor) {
    let (x, y, r) = (actor.x, actor.y, actor.radius);
    let fur = Paint::from(FUR);

    surface.fill_circle(x, y, r, &fur);
    surface.fill_circle(x + 16.0, y - 10.0, 8.0, &fur);
    surface.fill_ellipse(x + 20.0, y - 16.0, 3.0, 5.0, 0.6, &EAR.into());

    let legs = Path::new()
        .move_to(x - 6.0, y + r)
        .line_to(x - 8.0, y + r + 10.0)
        .move_to(x + 4.0, y + r)
        .line_to(x + 6.0, y + r + 10.0);
    let stroke = Stroke {
        color: LEGS,
        width: 3.0,
    };
    surface.stroke_path(&legs, &stroke);

    let n_seeds = actor.seeds_carried();
    if n_seeds > 0 {
        let label = format!("Beej: {n_seeds}");
        surface.fill_text(&label, x - 20.0, y - 20.0, 12.0, LABEL);
    }
}

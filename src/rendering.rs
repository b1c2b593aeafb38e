use std::io::{self, Write};
use log::info;
use crossterm::{
    cursor::MoveTo,
    execute,
};

use crate::constants::TERMINAL_ASPECT_RATIO_COMPENSATION;
use crate::entities::WeaponKind;
use crate::pickups::{Pickup, PickupKind};
use crate::types::Vector2D;
use crate::world::{ActorKind, ActorView};

// --- ScreenBuffer for headless rendering ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    pub cursor_x: u16,
    pub cursor_y: u16,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.set_char(self.cursor_x, self.cursor_y, c);
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
    }

    pub fn set_char(&mut self, x: u16, y: u16, c: char) {
        if y < self.height && x < self.width {
            self.buffer[y as usize][x as usize] = c;
        }
    }

    pub fn row(&self, y: u16) -> String {
        self.buffer.get(y as usize).map(|row| row.iter().collect()).unwrap_or_default()
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for row in &self.buffer {
            info!("{}", row.iter().collect::<String>());
        }
        info!("---------------------");
    }
}

// --- OutputTarget enum to handle stdout or ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn execute_move_to(&mut self, command: MoveTo) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            }
        }
    }

    pub fn execute_other_command(&mut self, command: impl crossterm::Command) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(_) => Ok(()), // Nothing to do headless
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => {
                let s = String::from_utf8_lossy(buf);
                sb.write_str(&s);
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(_) => Ok(()),
        }
    }
}

// --- Glyphs ---

/// Arrow pointing along `facing`, screen-up being +z.
pub fn facing_glyph(facing: Vector2D) -> char {
    let angle = facing.z.atan2(facing.x).rem_euclid(2.0 * std::f64::consts::PI);
    let octant = (angle / std::f64::consts::FRAC_PI_4).round() as u8 % 8;
    match octant {
        0 => '>',
        1 | 2 | 3 => '^',
        4 => '<',
        _ => 'v',
    }
}

pub fn actor_glyph(actor: &ActorView) -> char {
    match actor.kind {
        ActorKind::Player if actor.alive => '@',
        ActorKind::Player => '%',
        ActorKind::Enemy(_) if !actor.alive => 'x',
        ActorKind::Enemy(_) if actor.ragdoll => 'z',
        ActorKind::Enemy(_) => 'Z',
    }
}

pub fn pickup_glyph(pickup: &Pickup) -> char {
    match pickup.kind {
        PickupKind::WeaponCrate(WeaponKind::Pistol) => 'P',
        PickupKind::WeaponCrate(WeaponKind::Rifle) => 'R',
        PickupKind::WeaponCrate(WeaponKind::Shotgun) => 'S',
        PickupKind::AmmoCrate => 'A',
    }
}

pub const PEER_GLYPH: char = '&';

// --- GameGrid: player-centred top-down view ---
pub struct GameGrid {
    pub grid: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    camera: Vector2D,
}

impl GameGrid {
    pub fn new(width: u16, height: u16) -> Self {
        GameGrid {
            grid: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            camera: Vector2D::ZERO,
        }
    }

    pub fn set_camera(&mut self, camera: Vector2D) {
        self.camera = camera;
    }

    /// Screen cell for a world point: one column per unit across, one row per
    /// `TERMINAL_ASPECT_RATIO_COMPENSATION` units deep.
    pub fn project(&self, point: Vector2D) -> Option<(u16, u16)> {
        let col = f64::from(self.width) / 2.0 + (point.x - self.camera.x);
        let row = f64::from(self.height) / 2.0 - (point.z - self.camera.z) / TERMINAL_ASPECT_RATIO_COMPENSATION;
        let (col, row) = (col.round(), row.round());
        if col < 0.0 || row < 0.0 || col >= f64::from(self.width) || row >= f64::from(self.height) {
            return None;
        }
        Some((col as u16, row as u16))
    }

    pub fn plot(&mut self, point: Vector2D, c: char) {
        if let Some((x, y)) = self.project(point) {
            self.set_char(x, y, c);
        }
    }

    pub fn set_char(&mut self, x: u16, y: u16, c: char) {
        if y < self.height && x < self.width {
            self.grid[y as usize][x as usize] = c;
        }
    }

    pub fn clear(&mut self) {
        self.grid = vec![vec![' '; self.width as usize]; self.height as usize];
    }

    /// Arena border, pickups, peers, corpses, enemies, then the player on top.
    pub fn draw_scene(&mut self, actors: &[ActorView], pickups: &[Pickup], peers: &[Vector2D], arena_half_extent: f64) {
        self.draw_border(arena_half_extent);
        for pickup in pickups {
            self.plot(pickup.position, pickup_glyph(pickup));
        }
        for &peer in peers {
            self.plot(peer, PEER_GLYPH);
        }
        let mut ordered: Vec<&ActorView> = actors.iter().collect();
        ordered.sort_by_key(|actor| (actor.kind == ActorKind::Player, actor.alive));
        for actor in ordered {
            self.plot(actor.position, actor_glyph(actor));
            if actor.kind == ActorKind::Player && actor.alive {
                let aim = actor.position.add(actor.facing.scale(4.0));
                self.plot(aim, facing_glyph(actor.facing));
            }
        }
    }

    fn draw_border(&mut self, half_extent: f64) {
        let steps = (half_extent * 2.0).ceil() as i64;
        for i in 0..=steps {
            let t = -half_extent + i as f64;
            self.plot(Vector2D::new(t, half_extent), '-');
            self.plot(Vector2D::new(t, -half_extent), '-');
            self.plot(Vector2D::new(-half_extent, t), '|');
            self.plot(Vector2D::new(half_extent, t), '|');
        }
    }

    pub fn render(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", self.grid[y as usize].iter().collect::<String>())?;
        }
        Ok(())
    }

    pub fn clear_screen_manual(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", " ".repeat(self.width as usize))?;
        }
        stdout.execute_move_to(MoveTo(0, 0))?;
        Ok(())
    }
}

// --- Minimap: whole arena overview in the top-right corner ---
pub struct Minimap {
    buffer: Vec<Vec<char>>,
    width: u16,
    height: u16,
    x_offset: u16,
    y_offset: u16,
}

impl Minimap {
    pub fn new(width: u16, height: u16, screen_width: u16) -> Self {
        Minimap {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            x_offset: screen_width.saturating_sub(width), // Top-right corner
            y_offset: 1,
        }
    }

    pub fn set_char(&mut self, x: u16, y: u16, c: char) {
        if y < self.height && x < self.width {
            self.buffer[y as usize][x as usize] = c;
        }
    }

    pub fn clear(&mut self) {
        self.buffer = vec![vec!['.'; self.width as usize]; self.height as usize];
    }

    pub fn plot(&mut self, point: Vector2D, arena_half_extent: f64, c: char) {
        if self.width == 0 || self.height == 0 || arena_half_extent <= 0.0 {
            return;
        }
        let u = ((point.x + arena_half_extent) / (2.0 * arena_half_extent)).clamp(0.0, 1.0);
        let v = ((arena_half_extent - point.z) / (2.0 * arena_half_extent)).clamp(0.0, 1.0);
        let x = (u * f64::from(self.width - 1)).round() as u16;
        let y = (v * f64::from(self.height - 1)).round() as u16;
        self.set_char(x, y, c);
    }

    pub fn draw_actors(&mut self, actors: &[ActorView], arena_half_extent: f64) {
        for actor in actors.iter().filter(|a| a.alive && a.kind != ActorKind::Player) {
            self.plot(actor.position, arena_half_extent, 'z');
        }
        for actor in actors.iter().filter(|a| a.kind == ActorKind::Player) {
            self.plot(actor.position, arena_half_extent, '@');
        }
    }

    pub fn render(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(self.x_offset, self.y_offset + y))?;
            write!(stdout, "{}", self.buffer[y as usize].iter().collect::<String>())?;
        }
        Ok(())
    }
}

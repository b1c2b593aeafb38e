use std::io::{self, Write};
use std::time::{Duration, Instant};
use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEventKind},
};
use log::{debug, error, info};

use crate::constants::FRAME_POLL_MILLIS;
use crate::hud::HudState;
use crate::input::{InputSnapshot, ScriptedInput};
use crate::net::{NetSession, Snapshot};
use crate::rendering::{GameGrid, Minimap, OutputTarget};
use crate::types::Vector2D;
use crate::world::{FrameEvent, World};

const DEBUG_FRAME_DT: f64 = 1.0 / 30.0;
const MINIMAP_SIZE: u16 = 16;

pub struct Game {
    pub terminal_width: u16,
    pub terminal_height: u16,
    pub stdout_target: OutputTarget,
    world: World,
    net: NetSession,
    scripted_input: Option<ScriptedInput>,
    debug_mode_active: bool,
    max_frames: Option<u64>,
}

impl Game {
    pub fn new(
        world: World,
        net: NetSession,
        terminal_width: u16,
        terminal_height: u16,
        stdout_target: OutputTarget,
        scripted_input: Option<ScriptedInput>,
        max_frames: Option<u64>,
    ) -> Self {
        Game {
            terminal_width,
            terminal_height,
            stdout_target,
            world,
            net,
            debug_mode_active: scripted_input.is_some(),
            scripted_input,
            max_frames,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn run(&mut self) -> io::Result<()> {
        if !self.debug_mode_active {
            self.show_title_screen()?;
        }

        let mut game_grid = GameGrid::new(self.terminal_width, self.terminal_height);
        let mut minimap = Minimap::new(MINIMAP_SIZE * 2, MINIMAP_SIZE, self.terminal_width);
        let mut last_frame = Instant::now();
        let mut frame_count: u64 = 0;

        while self.max_frames.is_none_or(|max| frame_count < max) {
            let input = self.handle_input(frame_count)?;
            if input.quit {
                info!("Quit requested at frame {}", frame_count);
                break;
            }

            let dt = if self.debug_mode_active {
                DEBUG_FRAME_DT
            } else {
                let now = Instant::now();
                let elapsed = now.duration_since(last_frame).as_secs_f64();
                last_frame = now;
                elapsed
            };

            let events = self.world.step(&input, dt);
            for event in &events {
                log_event(event);
            }

            let snapshot = self.snapshot();
            self.net.exchange(&snapshot, self.world.clock());

            game_grid.clear();
            minimap.clear();
            let actors = self.world.actors();
            let peers: Vec<Vector2D> = self.net.peers().map(|peer| peer.snapshot.position).collect();
            game_grid.set_camera(self.world.player.position);
            game_grid.draw_scene(&actors, &self.world.pickups.pickups, &peers, self.world.config.arena_half_extent);
            minimap.draw_actors(&actors, self.world.config.arena_half_extent);

            self.render(&game_grid, &minimap, &self.world.hud())?;

            frame_count += 1;
            if self.world.is_game_over() {
                break;
            }
        }

        let hud = self.world.hud();
        info!(
            "Session over after {} frames: score {}, kills {}, wave {}",
            frame_count, hud.score, hud.kills, hud.wave
        );
        if self.debug_mode_active {
            if let OutputTarget::ScreenBuffer(sb) = &self.stdout_target {
                sb.print_to_log();
            }
        } else {
            self.show_game_over_screen(&hud)?;
        }
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            player_id: self.net.local_id(),
            position: self.world.player.position,
            facing: self.world.player.facing,
            alive: self.world.life.is_alive(),
            score: self.world.stats.score,
            wave: self.world.waves.wave,
        }
    }

    /// Collect every key pressed during this frame's poll window into one snapshot.
    fn handle_input(&mut self, frame_count: u64) -> io::Result<InputSnapshot> {
        if let Some(script) = &mut self.scripted_input {
            return Ok(script.poll(frame_count));
        }

        let mut input = InputSnapshot::idle();
        let mut timeout = Duration::from_millis(FRAME_POLL_MILLIS);
        let deadline = Instant::now() + timeout;
        while event::poll(timeout).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
            let event = event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?;
            match event {
                Event::Key(key_event) if key_event.kind != KeyEventKind::Release => match key_event.code {
                    KeyCode::Char('q') | KeyCode::Esc => input.quit = true,
                    KeyCode::Up | KeyCode::Char('w') => input.movement.z += 1.0,
                    KeyCode::Down | KeyCode::Char('s') => input.movement.z -= 1.0,
                    KeyCode::Left | KeyCode::Char('a') => input.movement.x -= 1.0,
                    KeyCode::Right | KeyCode::Char('d') => input.movement.x += 1.0,
                    KeyCode::Char(' ') => input.fire = true,
                    KeyCode::Char('f') => input.melee = true,
                    KeyCode::Char('r') => {
                        // Reload while alive, respawn while dead; the world ignores the other.
                        input.reload = true;
                        input.respawn = true;
                    }
                    _ => {}
                },
                Event::Resize(new_width, new_height) => {
                    self.terminal_width = new_width;
                    self.terminal_height = new_height;
                }
                _ => {}
            }
            timeout = deadline.saturating_duration_since(Instant::now());
        }
        Ok(input)
    }

    fn render(&mut self, game_grid: &GameGrid, minimap: &Minimap, hud: &HudState) -> io::Result<()> {
        game_grid.render(&mut self.stdout_target)?;
        minimap.render(&mut self.stdout_target)?;

        self.stdout_target.execute_move_to(MoveTo(0, 0))?;
        write!(self.stdout_target, "{}", hud.status_line())?;
        if self.net.is_online() {
            write!(self.stdout_target, "  Peers: {}", self.net.peers().count())?;
        }

        let controls_text = [
            "WASD/Arrows: Move",
            "Space: Fire  F: Melee",
            "R: Reload/Respawn  Q: Quit",
        ];
        let controls_start_y = self.terminal_height.saturating_sub(controls_text.len() as u16);
        for (i, line) in controls_text.iter().enumerate() {
            self.stdout_target.execute_move_to(MoveTo(0, controls_start_y.saturating_add(i as u16)))?;
            write!(self.stdout_target, "{}", line)?;
        }

        if let Some(message) = hud.banner() {
            let banner_x = (self.terminal_width / 2).saturating_sub(message.len() as u16 / 2);
            let banner_y = (self.terminal_height / 2).saturating_sub(5);
            self.stdout_target.execute_move_to(MoveTo(banner_x, banner_y))?;
            write!(self.stdout_target, "{}", message)?;
        }

        self.stdout_target.flush()?;
        Ok(())
    }

    fn wait_for_key(&mut self) -> io::Result<()> {
        loop {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press {
                    return Ok(());
                }
            }
        }
    }

    fn write_centered(&mut self, y: u16, text: &str) -> io::Result<()> {
        let x = (self.terminal_width / 2).saturating_sub(text.len() as u16 / 2);
        self.stdout_target.execute_move_to(MoveTo(x, y))?;
        write!(self.stdout_target, "{}", text)
    }

    fn show_title_screen(&mut self) -> io::Result<()> {
        let title_art = [
            r" _   _  ___  ____  ____  _____",
            r"| | | |/ _ \|  _ \|  _ \| ____|",
            r"| |_| | | | | |_) | | | |  _|",
            r"|  _  | |_| |  _ <| |_| | |___",
            r"|_| |_|\___/|_| \_\____/|_____|",
            r"",
            r"SURVIVE THE WAVES",
        ];

        let title_start_y = (self.terminal_height / 2).saturating_sub(title_art.len() as u16 / 2);
        for (i, line) in title_art.iter().enumerate() {
            self.write_centered(title_start_y + i as u16, line)?;
        }
        self.write_centered(self.terminal_height.saturating_sub(5), "Press any key to start...")?;
        self.stdout_target.flush()?;

        self.wait_for_key()?;

        GameGrid::new(self.terminal_width, self.terminal_height).clear_screen_manual(&mut self.stdout_target)?;
        self.stdout_target.flush()?;
        Ok(())
    }

    fn show_game_over_screen(&mut self, hud: &HudState) -> io::Result<()> {
        GameGrid::new(self.terminal_width, self.terminal_height).clear_screen_manual(&mut self.stdout_target)?;

        let middle = self.terminal_height / 2;
        self.write_centered(middle.saturating_sub(2), "GAME OVER!")?;
        self.write_centered(middle, &format!("Final Score: {}  Kills: {}  Wave: {}", hud.score, hud.kills, hud.wave))?;
        self.write_centered(middle + 2, "Press any key to exit...")?;
        self.stdout_target.flush()?;

        self.wait_for_key()
    }
}

fn log_event(event: &FrameEvent) {
    match event {
        FrameEvent::PlayerDied | FrameEvent::GameOver | FrameEvent::WaveStarted(_) | FrameEvent::PlayerRespawned(_) => {
            info!("{:?}", event)
        }
        _ => debug!("{:?}", event),
    }
}

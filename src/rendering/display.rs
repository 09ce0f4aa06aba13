//! # Display Management
//!
//! Draws a [`GameSnapshot`] with macroquad using solid-color cells.

use crate::game::{
    boss_footprint, CombatPhase, CombatSession, GameSnapshot, GameStatus, Position, Tile,
};
use crate::input::InputMode;
use macroquad::prelude::*;

const WALL_COLOR: Color = Color::new(0.25, 0.22, 0.2, 1.0);
const FLOOR_COLOR: Color = Color::new(0.55, 0.5, 0.42, 1.0);
const DIM: Color = Color::new(0.0, 0.0, 0.0, 0.7);

/// Macroquad display manager for the game.
///
/// Handles the grid, the HUD line, the combat panel, the end screens and the
/// message log.
pub struct MacroquadDisplay {
    /// Tile size in pixels
    pub tile_size: f32,
    /// Height of the HUD line above the grid
    pub hud_height: f32,
    /// Message history
    pub messages: Vec<String>,
    /// Maximum number of messages to keep
    pub max_messages: usize,
}

impl Default for MacroquadDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroquadDisplay {
    /// Creates a new display manager.
    ///
    /// # Examples
    ///
    /// ```
    /// use descent::MacroquadDisplay;
    ///
    /// let mut display = MacroquadDisplay::new();
    /// display.add_message("You enter floor 1".to_string());
    /// assert_eq!(display.messages.len(), 1);
    /// ```
    pub fn new() -> Self {
        Self {
            tile_size: 24.0,
            hud_height: 40.0,
            messages: Vec::new(),
            max_messages: 50,
        }
    }

    /// Window size in pixels needed for a grid of the given dimensions.
    pub fn window_size(&self, grid_width: i32, grid_height: i32) -> (f32, f32) {
        (
            grid_width as f32 * self.tile_size,
            self.hud_height + grid_height as f32 * self.tile_size + 90.0,
        )
    }

    /// Renders the complete frame.
    pub fn render(&self, snapshot: &GameSnapshot, mode: InputMode) {
        clear_background(BLACK);

        if snapshot.status == GameStatus::Title {
            self.render_title();
            return;
        }

        self.render_hud(snapshot);
        self.render_grid(snapshot);
        self.render_messages(mode);

        match snapshot.status {
            GameStatus::Lost => self.render_end_screen("GAME OVER", RED),
            GameStatus::Won => self.render_end_screen("VICTORY!", GOLD),
            _ => {
                if let Some(combat) = &snapshot.combat {
                    self.render_combat(snapshot, combat);
                }
            }
        }
    }

    fn render_title(&self) {
        let (w, h) = (screen_width(), screen_height());
        draw_text("ENTER THE DUNGEON", w / 2.0 - 220.0, h / 2.0 - 40.0, 48.0, RED);
        draw_text(
            InputMode::Title.prompt(),
            w / 2.0 - 170.0,
            h / 2.0 + 20.0,
            22.0,
            WHITE,
        );
    }

    fn render_hud(&self, snapshot: &GameSnapshot) {
        let seed_label = match &snapshot.seed_entry {
            Some(text) => format!("Seed: {}_", text),
            None if snapshot.seed_editable => format!("Seed: {} (S to edit)", snapshot.seed),
            None => format!("Seed: {}", snapshot.seed),
        };
        draw_text(&seed_label, 10.0, 26.0, 22.0, WHITE);
        draw_text(
            &format!("Floor {}", snapshot.floor),
            360.0,
            26.0,
            22.0,
            SKYBLUE,
        );
        draw_text(
            &format!("HP {}/{}", snapshot.player.hp, snapshot.player.max_hp),
            500.0,
            26.0,
            22.0,
            hp_color(snapshot.player.hp, snapshot.player.max_hp),
        );
    }

    fn cell(&self, pos: Position) -> (f32, f32) {
        (
            pos.x as f32 * self.tile_size,
            self.hud_height + pos.y as f32 * self.tile_size,
        )
    }

    fn fill_cell(&self, pos: Position, inset: f32, color: Color) {
        let (x, y) = self.cell(pos);
        let size = self.tile_size - inset * 2.0;
        draw_rectangle(x + inset, y + inset, size, size, color);
    }

    fn render_grid(&self, snapshot: &GameSnapshot) {
        for (y, row) in snapshot.grid.rows().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                self.fill_cell(Position::new(x as i32, y as i32), 0.0, tile_color(*tile));
            }
        }

        if let Some(anchor) = snapshot.boss {
            let (x, y) = self.cell(anchor);
            let size = self.tile_size * 2.0;
            draw_rectangle(x + 2.0, y + 2.0, size - 4.0, size - 4.0, MAROON);
            for pos in boss_footprint(anchor) {
                self.fill_cell(pos, 8.0, RED);
            }
        }
        for &pos in &snapshot.roaming {
            self.fill_cell(pos, 4.0, GREEN);
        }
        if let Some(pos) = snapshot.tracked {
            self.fill_cell(pos, 3.0, PURPLE);
        }
        self.fill_cell(snapshot.player.position, 3.0, YELLOW);
    }

    fn render_combat(&self, snapshot: &GameSnapshot, combat: &CombatSession) {
        let (w, h) = (screen_width(), screen_height());
        let (panel_w, panel_h) = (420.0, 240.0);
        let (px, py) = ((w - panel_w) / 2.0, (h - panel_h) / 2.0);

        draw_rectangle(0.0, 0.0, w, h, Color::new(0.0, 0.0, 0.0, 0.4));
        draw_rectangle(px, py, panel_w, panel_h, Color::new(0.1, 0.1, 0.15, 1.0));
        draw_rectangle_lines(px, py, panel_w, panel_h, 2.0, WHITE);
        draw_text("EN GARDE!", px + 150.0, py + 34.0, 30.0, WHITE);

        draw_text("You", px + 20.0, py + 80.0, 20.0, WHITE);
        self.health_bar(px + 120.0, py + 66.0, snapshot.player.hp, snapshot.player.max_hp, GREEN);
        draw_text(combat.enemy_kind.name(), px + 20.0, py + 120.0, 20.0, WHITE);
        self.health_bar(px + 120.0, py + 106.0, combat.enemy_hp, combat.enemy_max_hp, RED);

        if let Some(damage) = combat.last_damage {
            draw_text(&format!("Damage: {}", damage), px + 20.0, py + 160.0, 20.0, ORANGE);
        }

        let prompt = match combat.phase {
            CombatPhase::PlayerTurn => InputMode::CombatTurn.prompt(),
            CombatPhase::EnemyTurn { .. } => InputMode::CombatBusy.prompt(),
            CombatPhase::Victory => "Victory! Press any key",
            CombatPhase::Fled => "You got away! Press any key",
        };
        draw_text(prompt, px + 20.0, py + 210.0, 20.0, YELLOW);
    }

    fn health_bar(&self, x: f32, y: f32, current: i32, max: i32, color: Color) {
        let (width, height) = (260.0, 18.0);
        draw_rectangle(x, y, width, height, DARKGRAY);
        draw_rectangle(x, y, width * hp_fraction(current, max), height, color);
        draw_text(
            &format!("{}/{}", current.max(0), max),
            x + width / 2.0 - 24.0,
            y + 14.0,
            16.0,
            WHITE,
        );
    }

    fn render_end_screen(&self, title: &str, color: Color) {
        let (w, h) = (screen_width(), screen_height());
        draw_rectangle(0.0, 0.0, w, h, DIM);
        draw_text(title, w / 2.0 - 150.0, h / 2.0 - 30.0, 64.0, color);
        draw_text(
            InputMode::Ended.prompt(),
            w / 2.0 - 140.0,
            h / 2.0 + 20.0,
            22.0,
            WHITE,
        );
    }

    /// Renders the prompt line and the message area.
    fn render_messages(&self, mode: InputMode) {
        let area_y = screen_height() - 80.0;
        let line_height = 18.0;
        let message_count = 3;

        draw_text(mode.prompt(), 10.0, area_y, 16.0, LIGHTGRAY);

        let start = self.messages.len().saturating_sub(message_count);
        for (i, message) in self.messages[start..].iter().enumerate() {
            let y = area_y + (i + 1) as f32 * line_height;
            draw_text(message, 10.0, y, 16.0, WHITE);
        }
    }

    /// Adds a message to the message history.
    pub fn add_message(&mut self, message: String) {
        self.messages.push(message);

        // Keep only the most recent messages
        if self.messages.len() > self.max_messages {
            self.messages.remove(0);
        }
    }
}

/// Fill color for a tile.
pub fn tile_color(tile: Tile) -> Color {
    match tile {
        Tile::Wall => WALL_COLOR,
        Tile::Floor => FLOOR_COLOR,
        Tile::StairsUp => LIGHTGRAY,
        Tile::StairsDown => ORANGE,
    }
}

/// Health as a 0..=1 bar fill.
pub fn hp_fraction(current: i32, max: i32) -> f32 {
    if max <= 0 {
        return 0.0;
    }
    (current as f32 / max as f32).clamp(0.0, 1.0)
}

fn hp_color(current: i32, max: i32) -> Color {
    match hp_fraction(current, max) {
        f if f > 0.5 => GREEN,
        f if f > 0.25 => YELLOW,
        _ => RED,
    }
}

//! HUD layout: which text goes where for each phase
//!
//! Font sizes scale with (width + height) so the HUD tracks the viewport the
//! same way circle sizes do.

use crate::game_loop::GameContext;
use crate::palette::Color;
use crate::ports::{Renderer, TextStyle};
use crate::sim::GamePhase;

/// Font sizes for the current viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSizes {
    pub big: f32,
    pub medium: f32,
    pub small: f32,
}

impl FontSizes {
    pub fn for_viewport(width: f32, height: f32) -> Self {
        let extent = width + height;
        Self {
            big: extent / 60.0,
            medium: extent / 80.0,
            small: extent / 110.0,
        }
    }
}

/// Dim layer behind round-result messages
const RESULT_DIM: Color = Color::rgba(0.0, 0.0, 0.0, 0.4);
/// Lighter dim behind the pause message
const PAUSE_DIM: Color = Color::rgba(0.0, 0.0, 0.0, 0.2);
/// Line spacing for stacked center messages
const LINE: f32 = 40.0;

/// Scores plus the message for the current phase
pub fn draw_hud(renderer: &mut dyn Renderer, ctx: &GameContext) {
    let round = &ctx.round;
    let view = ctx.viewport();
    let (w, h) = (view.x, view.y);
    let fonts = FontSizes::for_viewport(w, h);
    let font_color = round.theme().font;
    let (cx, cy) = (w / 2.0, h / 2.0);

    let small = TextStyle::left(fonts.small);
    renderer.draw_text(
        &format!("Level Goal: {} out of {}", round.round_score(), round.score_goal()),
        20.0,
        20.0,
        small,
        font_color,
    );
    renderer.draw_text(
        &format!("Total Score: {}", round.total_score()),
        w - 260.0,
        20.0,
        small,
        font_color,
    );
    renderer.draw_text(
        &format!("High Score: {}", round.best_score()),
        w - 260.0,
        60.0,
        small,
        font_color,
    );

    let big = TextStyle::centered(fonts.big);
    let medium = TextStyle::centered(fonts.medium);

    match round.phase() {
        GamePhase::MainScreen => {
            renderer.draw_text("Chain Pop", cx, cy - LINE, big, Color::PURPLE);
            renderer.draw_text("Click to play", cx, cy + LINE, medium, font_color);
        }
        GamePhase::Begin => {
            renderer.draw_text("To begin, click a circle", cx, cy, big, font_color);
        }
        GamePhase::Default | GamePhase::Exploding => {}
        GamePhase::RoundOver => {
            renderer.fill_background(RESULT_DIM);
            renderer.draw_text("Nicely done!", cx, cy - LINE, big, Color::GREEN);
            renderer.draw_text("Click to continue", cx, cy, medium, font_color);
            renderer.draw_text(
                &format!("Next round there are {} circles", round.next_round_circles()),
                cx,
                cy + LINE,
                medium,
                font_color,
            );
        }
        GamePhase::RepeatLevel => {
            renderer.fill_background(RESULT_DIM);
            let missed = round.score_goal().saturating_sub(round.round_score());
            renderer.draw_text(
                &format!("You missed {} out of {}", missed, round.score_goal()),
                cx,
                cy - LINE,
                big,
                Color::YELLOW,
            );
            renderer.draw_text("Click to retry this level", cx, cy + LINE, medium, font_color);
        }
        GamePhase::End => {
            renderer.fill_background(RESULT_DIM);
            let win_color = if round.num_circles() > 60 {
                Color::WIN_GREEN
            } else {
                Color::PURPLE
            };
            renderer.draw_text("You Win!", cx, cy - LINE, big, win_color);
            renderer.draw_text(
                &format!("This game's score was {}", round.total_score()),
                cx,
                cy,
                medium,
                font_color,
            );
            renderer.draw_text(
                &format!("Your BEST score is {}", round.best_score()),
                cx,
                cy + LINE,
                medium,
                font_color,
            );
            renderer.draw_text(
                "Click to start a new game",
                cx,
                cy + LINE * 2.0,
                TextStyle::centered(fonts.small),
                font_color,
            );
        }
    }
}

pub fn draw_pause_overlay(renderer: &mut dyn Renderer, ctx: &GameContext) {
    let view = ctx.viewport();
    renderer.fill_background(PAUSE_DIM);
    renderer.draw_text(
        "... PAUSED ...",
        view.x / 2.0,
        view.y / 2.0,
        TextStyle::centered(40.0),
        Color::WHITE,
    );
}

/// Frame time readout in the bottom right corner
pub fn draw_debug(renderer: &mut dyn Renderer, ctx: &GameContext, dt: f32) {
    let view = ctx.viewport();
    renderer.draw_text(
        &format!("dt: {:.3}", dt),
        view.x - 150.0,
        view.y - 10.0,
        TextStyle::left(18.0),
        ctx.round.theme().font,
    );
}

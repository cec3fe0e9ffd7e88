//! Stage colors derived from the gauge values.

use super::sequencer::SequencerState;
use super::stage::Stage;
use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const STAGE_BASE: Rgb = Rgb(74, 85, 104);
pub const MARKER: Rgb = Rgb(245, 101, 101);
pub const CONNECTION: Rgb = Rgb(113, 128, 150);

const CHANNEL_CAP: u16 = 200;

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    }
}

fn intensify(base: u8, progress: u8) -> u8 {
    // Capped at 200, so the narrowing is lossless.
    (u16::from(base) + u16::from(progress)).min(CHANNEL_CAP) as u8
}

pub fn tokenizer_color(tokenize_progress: u8) -> Rgb {
    Rgb(
        intensify(STAGE_BASE.0, tokenize_progress),
        STAGE_BASE.1,
        STAGE_BASE.2,
    )
}

pub fn attention_color(attention_score: u8) -> Rgb {
    Rgb(
        STAGE_BASE.0,
        intensify(STAGE_BASE.1, attention_score),
        STAGE_BASE.2,
    )
}

pub fn stage_color(stage: Stage, state: &SequencerState) -> Rgb {
    match stage {
        Stage::Tokenizer if state.tokenize_progress > 0 => tokenizer_color(state.tokenize_progress),
        Stage::AttentionMechanism if state.attention_score > 0 => {
            attention_color(state.attention_score)
        }
        _ => STAGE_BASE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenizer_color_caps_at_200() {
        assert_eq!(tokenizer_color(20), Rgb(94, 85, 104));
        assert_eq!(tokenizer_color(100), Rgb(174, 85, 104));
        assert_eq!(tokenizer_color(255), Rgb(200, 85, 104));
    }

    #[test]
    fn test_attention_color_caps_at_200() {
        assert_eq!(attention_color(10), Rgb(74, 95, 104));
        assert_eq!(attention_color(100), Rgb(74, 185, 104));
        assert_eq!(attention_color(200), Rgb(74, 200, 104));
    }

    #[test]
    fn test_stage_color_uses_base_until_progress() {
        let mut state = SequencerState::default();
        for stage in Stage::all() {
            assert_eq!(stage_color(stage, &state), STAGE_BASE);
        }

        state.tokenize_progress = 60;
        state.attention_score = 30;
        assert_eq!(stage_color(Stage::Tokenizer, &state), Rgb(134, 85, 104));
        assert_eq!(
            stage_color(Stage::AttentionMechanism, &state),
            Rgb(74, 115, 104)
        );
        assert_eq!(stage_color(Stage::EmbeddingLayer, &state), STAGE_BASE);
    }

    #[test]
    fn test_rgb_into_color() {
        assert_eq!(Color::from(MARKER), Color::Rgb(245, 101, 101));
    }
}

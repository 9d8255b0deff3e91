use crate::color::Color;
use crate::theme::TERMINAL_SLOTS;

/// WCAG AA for normal text; background/text must always reach it.
pub const MIN_TEXT_CONTRAST: f32 = 4.5;
/// WCAG AA for large text; terminal accents are nudged toward it.
pub const MIN_ACCENT_CONTRAST: f32 = 3.0;

/// Oklch lightness moved per adjustment step.
pub const LIGHTNESS_STEP: f32 = 0.02;
/// Total lightness the text color may move.
pub const TEXT_BUDGET: f32 = 0.5;
/// Total lightness the background may move once the text budget is spent.
pub const BACKGROUND_BUDGET: f32 = 0.3;
/// Total lightness a terminal accent may move.
pub const ACCENT_BUDGET: f32 = 0.4;

/// Neutral pair used when adjustment cannot reach `MIN_TEXT_CONTRAST`.
pub const NEUTRAL_BACKGROUND: Color = Color::new(0x12, 0x12, 0x12);
pub const NEUTRAL_TEXT: Color = Color::new(0xee, 0xee, 0xee);

/// Step `color`'s Oklch lightness in `direction` (+1 lighter, -1 darker)
/// until its contrast against `against` reaches `target` or `budget` is spent.
///
/// Returns the best color found and whether it met the target. Hue is held.
pub fn push_lightness(
    color: Color,
    against: Color,
    target: f32,
    direction: f32,
    budget: f32,
) -> (Color, bool) {
    if Color::contrast_ratio(&color, &against) >= target {
        return (color, true);
    }
    let steps = (budget / LIGHTNESS_STEP).round() as usize;
    let mut best = color;
    let mut best_ratio = Color::contrast_ratio(&color, &against);
    for step in 1..=steps {
        let candidate = color.adjust_lightness(direction * step as f32 * LIGHTNESS_STEP);
        let ratio = Color::contrast_ratio(&candidate, &against);
        if ratio > best_ratio {
            best = candidate;
            best_ratio = ratio;
        }
        if ratio >= target {
            return (candidate, true);
        }
    }
    (best, false)
}

/// Move the text (first) and then the background away from each other until
/// they reach `MIN_TEXT_CONTRAST`. Best effort: the caller re-validates.
pub fn separate_text(background: Color, text: Color) -> (Color, Color) {
    let direction = if text.relative_luminance() >= background.relative_luminance() {
        1.0
    } else {
        -1.0
    };
    let (text, met) = push_lightness(text, background, MIN_TEXT_CONTRAST, direction, TEXT_BUDGET);
    if met {
        return (background, text);
    }
    let (background, _) = push_lightness(
        background,
        text,
        MIN_TEXT_CONTRAST,
        -direction,
        BACKGROUND_BUDGET,
    );
    (background, text)
}

/// Nudge the chromatic terminal slots (1-6, 9-14) away from the background
/// until they reach `MIN_ACCENT_CONTRAST`.
pub fn enforce_accent_contrast(slots: &mut [Color; TERMINAL_SLOTS], background: Color) {
    let direction = if background.is_dark() { 1.0 } else { -1.0 };
    for slot in (1..=6).chain(9..=14) {
        let (adjusted, _) = push_lightness(
            slots[slot],
            background,
            MIN_ACCENT_CONTRAST,
            direction,
            ACCENT_BUDGET,
        );
        slots[slot] = adjusted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_contrasting_pair_is_untouched() {
        let bg = Color::new(20, 20, 30);
        let text = Color::new(230, 230, 220);
        assert_eq!(separate_text(bg, text), (bg, text));
    }

    #[test]
    fn low_contrast_text_is_lightened() {
        let bg = Color::new(30, 30, 40);
        let text = Color::new(80, 80, 90);
        let (new_bg, new_text) = separate_text(bg, text);
        assert_eq!(new_bg, bg, "background should only move if text budget runs out");
        assert!(Color::contrast_ratio(&new_bg, &new_text) >= MIN_TEXT_CONTRAST);
        assert!(new_text.relative_luminance() > text.relative_luminance());
    }

    #[test]
    fn background_darkens_once_text_budget_is_spent() {
        let bg = Color::new(150, 150, 150);
        let text = Color::new(170, 170, 170);
        let (new_bg, new_text) = separate_text(bg, text);
        assert!(new_bg.relative_luminance() < bg.relative_luminance());
        assert!(Color::contrast_ratio(&new_bg, &new_text) >= MIN_TEXT_CONTRAST);
    }

    #[test]
    fn very_light_pair_cannot_be_separated() {
        let bg = Color::new(235, 235, 235);
        let text = Color::new(245, 245, 245);
        let (new_bg, new_text) = separate_text(bg, text);
        assert!(Color::contrast_ratio(&new_bg, &new_text) < MIN_TEXT_CONTRAST);
    }

    #[test]
    fn push_lightness_reports_failure_with_best_attempt() {
        let white = Color::WHITE;
        let (result, met) = push_lightness(Color::new(250, 250, 250), white, 4.5, 1.0, 0.2);
        assert!(!met);
        assert!(Color::contrast_ratio(&result, &white) >= 1.0);
    }

    #[test]
    fn accents_reach_three_to_one_on_dark_background() {
        let bg = Color::new(15, 15, 20);
        let mut slots = [Color::new(60, 20, 20); TERMINAL_SLOTS];
        enforce_accent_contrast(&mut slots, bg);
        for slot in (1..=6).chain(9..=14) {
            let ratio = Color::contrast_ratio(&slots[slot], &bg);
            assert!(ratio >= MIN_ACCENT_CONTRAST, "slot {slot}: {ratio:.2}");
        }
        assert_eq!(slots[0], Color::new(60, 20, 20));
    }
}

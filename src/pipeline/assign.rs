use palette::Oklch;

use crate::color::{hue_distance, Color};
use crate::error::PaletteWarning;
use crate::pipeline::contrast::{
    enforce_accent_contrast, separate_text, MIN_TEXT_CONTRAST, NEUTRAL_BACKGROUND, NEUTRAL_TEXT,
};
use crate::pipeline::extract::{CandidatePalette, Swatch};
use crate::theme::{RoleColors, TERMINAL_SLOTS};

/// Canonical Oklch hues of the six chromatic terminal slots
/// (red, green, yellow, blue, magenta, cyan).
const CANONICAL_HUES: [(usize, f32); 6] = [
    (1, 29.0),
    (2, 142.0),
    (3, 110.0),
    (4, 264.0),
    (5, 328.0),
    (6, 195.0),
];

/// An extracted color only claims a terminal slot within this hue distance.
const MAX_SLOT_HUE_DISTANCE: f32 = 60.0;
/// Below this Oklch chroma a color counts as gray.
const ACHROMATIC_CHROMA: f32 = 0.03;
/// Chroma floor for synthesized terminal colors.
const MIN_SYNTH_CHROMA: f32 = 0.1;
/// Lightness window for normal (non-bright) chromatic terminal slots.
const SLOT_LIGHTNESS: (f32, f32) = (0.55, 0.8);
/// Lightness of a synthesized primary.
const PRIMARY_LIGHTNESS: f32 = 0.65;
/// Oklch lightness offset between a slot and its bright variant.
const BRIGHT_OFFSET: f32 = 0.1;
/// Lightness step between rungs of a monochrome ladder.
const LADDER_STEP: f32 = 0.12;
/// Saturation gap between the top two candidates that counts as unambiguous.
const STANDOUT_GAP: f32 = 0.25;

/// Roles assigned from one candidate palette.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub roles: RoleColors,
    /// How unambiguous the mapping was, in [0, 1].
    pub confidence: f32,
    pub warnings: Vec<PaletteWarning>,
}

/// Map a candidate's colors onto the semantic roles.
///
/// Background takes the darkest color and text the lightest; both are
/// adjusted (text first) until they reach 4.5:1. Primary is the most
/// saturated remaining color, secondary and accent the next two by saturation
/// and hue separation from primary. Anything missing is synthesized, so every
/// role is always filled. A single-color candidate becomes a monochrome ladder.
pub fn assign_roles(candidate: &CandidatePalette) -> Assignment {
    let mut warnings = Vec::new();
    if candidate.is_exhaustive() && candidate.len() < candidate.requested() {
        warnings.push(PaletteWarning::ExtractionDegenerate {
            distinct: candidate.len(),
            requested: candidate.requested(),
        });
    }

    let mut swatches: Vec<Swatch> = candidate.swatches().to_vec();
    swatches.sort_by(|a, b| {
        a.color
            .relative_luminance()
            .total_cmp(&b.color.relative_luminance())
            .then_with(|| a.color.cmp(&b.color))
    });

    // Monochrome input: frame the single color with a deep shade and a
    // light tint and let it become primary.
    let monochrome = swatches.len() < 2;
    let (darkest, lightest, middle) = match swatches.as_slice() {
        [] => (NEUTRAL_BACKGROUND, NEUTRAL_TEXT, Vec::new()),
        [only] => (
            only.color.with_lightness(0.18),
            only.color.with_lightness(0.95),
            vec![*only],
        ),
        [first, rest @ .., last] => (first.color, last.color, rest.to_vec()),
    };

    // 1. background / text
    let (mut background, mut text) = separate_text(darkest, lightest);

    // 2. primary, secondary, accent
    let mut extracted_roles = 0usize;
    let mut remaining = middle.clone();
    let primary = match take_most_saturated(&mut remaining) {
        Some(color) => {
            extracted_roles += 1;
            color
        }
        None => synthesize_primary(darkest, lightest),
    };
    let (secondary, accent) = {
        let mut ranked = rank_by_separation(&remaining, primary).into_iter();
        let secondary = ranked.next();
        let accent = ranked.next();
        extracted_roles += secondary.is_some() as usize + accent.is_some() as usize;
        let (shade, tint) = (
            primary.adjust_lightness(-LADDER_STEP),
            primary.adjust_lightness(LADDER_STEP),
        );
        let fallback_secondary = if monochrome {
            tint
        } else if primary.to_oklch().l > 0.6 {
            shade
        } else {
            tint
        };
        let fallback_accent = if monochrome {
            shade
        } else {
            primary.rotate_hue(180.0)
        };
        (
            secondary.unwrap_or(fallback_secondary),
            accent.unwrap_or(fallback_accent),
        )
    };

    // 3. terminal slots
    let (mut terminal, paired_slots) =
        terminal_slots(&middle, primary, background, text, monochrome);

    // 4. re-validate, falling back to the neutral pair
    let mut fallback = false;
    let ratio = Color::contrast_ratio(&background, &text);
    if ratio < MIN_TEXT_CONTRAST {
        warnings.push(PaletteWarning::ContrastUnsatisfiable { best_ratio: ratio });
        background = NEUTRAL_BACKGROUND;
        text = NEUTRAL_TEXT;
        terminal[0] = background.adjust_lightness(0.06);
        terminal[8] = background.adjust_lightness(0.3);
        terminal[7] = text.adjust_lightness(-0.12);
        terminal[15] = text;
        enforce_accent_contrast(&mut terminal, background);
        fallback = true;
    }

    let standout = saturation_standout(&middle);
    let filled = (extracted_roles + paired_slots) as f32 / (3 + CANONICAL_HUES.len()) as f32;
    let mut confidence = 0.5 * standout + 0.5 * filled;
    if fallback {
        confidence *= 0.5;
    }

    Assignment {
        roles: RoleColors {
            background,
            text,
            primary,
            secondary,
            accent,
            terminal,
        },
        confidence: confidence.clamp(0.0, 1.0),
        warnings,
    }
}

/// Remove and return the most saturated swatch; heavier swatches win ties.
fn take_most_saturated(swatches: &mut Vec<Swatch>) -> Option<Color> {
    let index = swatches
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| {
            a.color
                .hsl_saturation()
                .total_cmp(&b.color.hsl_saturation())
                .then_with(|| a.weight.total_cmp(&b.weight))
                // earlier entries win full ties
                .then_with(|| ib.cmp(ia))
        })
        .map(|(i, _)| i)?;
    Some(swatches.remove(index).color)
}

/// Primary for candidates with no mid-luminance colors: the more saturated
/// endpoint, moved to mid lightness.
fn synthesize_primary(darkest: Color, lightest: Color) -> Color {
    let base = if lightest.hsl_saturation() > darkest.hsl_saturation() {
        lightest
    } else {
        darkest
    };
    base.with_lightness(PRIMARY_LIGHTNESS)
}

/// Order swatches by 0.5·saturation + 0.5·(hue distance from primary / 180°).
/// Grays get no credit for hue distance.
fn rank_by_separation(swatches: &[Swatch], primary: Color) -> Vec<Color> {
    let primary_hue = primary.hue();
    let primary_gray = primary.chroma() < ACHROMATIC_CHROMA;
    let mut scored: Vec<(f32, Color)> = swatches
        .iter()
        .map(|s| {
            let separation = if primary_gray || s.color.chroma() < ACHROMATIC_CHROMA {
                0.0
            } else {
                hue_distance(primary_hue, s.color.hue()) / 180.0
            };
            (0.5 * s.color.hsl_saturation() + 0.5 * separation, s.color)
        })
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, color)| color).collect()
}

/// Saturation gap between the two most saturated mid colors, normalized.
fn saturation_standout(swatches: &[Swatch]) -> f32 {
    let mut saturations: Vec<f32> = swatches.iter().map(|s| s.color.hsl_saturation()).collect();
    saturations.sort_by(|a, b| b.total_cmp(a));
    match saturations.as_slice() {
        [] => 0.0,
        [_] => 1.0,
        [first, second, ..] => ((first - second) / STANDOUT_GAP).clamp(0.0, 1.0),
    }
}

/// Build the 16 terminal slots and report how many chromatic slots came
/// straight from extracted colors. A monochrome candidate fills slots 1-6
/// with a lightness ladder of `primary` instead of synthesized hues.
fn terminal_slots(
    swatches: &[Swatch],
    primary: Color,
    background: Color,
    text: Color,
    monochrome: bool,
) -> ([Color; TERMINAL_SLOTS], usize) {
    // Pair chromatic swatches, heaviest first, with the nearest free hue.
    let mut chromatic: Vec<&Swatch> = swatches
        .iter()
        .filter(|s| s.color.chroma() >= ACHROMATIC_CHROMA)
        .collect();
    chromatic.sort_by(|a, b| b.weight.total_cmp(&a.weight).then_with(|| a.color.cmp(&b.color)));

    let mut extracted: [Option<Color>; 7] = [None; 7];
    for swatch in chromatic {
        let hue = swatch.color.hue();
        let nearest = CANONICAL_HUES
            .iter()
            .filter(|(slot, _)| extracted[*slot].is_none())
            .map(|&(slot, canonical)| (slot, hue_distance(hue, canonical)))
            .filter(|&(_, distance)| distance <= MAX_SLOT_HUE_DISTANCE)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((slot, _)) = nearest {
            extracted[slot] = Some(swatch.color);
        }
    }
    let paired = extracted.iter().filter(|c| c.is_some()).count();

    let direction = if text.relative_luminance() >= background.relative_luminance() {
        1.0
    } else {
        -1.0
    };

    let mut slots = [Color::BLACK; TERMINAL_SLOTS];
    slots[0] = background.adjust_lightness(direction * 0.06);
    slots[8] = background.adjust_lightness(direction * 0.3);
    slots[7] = text.adjust_lightness(-direction * 0.12);
    slots[15] = text;

    let (low, high) = SLOT_LIGHTNESS;
    for &(slot, canonical) in &CANONICAL_HUES {
        if monochrome {
            let rung = (slot - 1) as f32 / 5.0;
            slots[slot] = primary.with_lightness(low + rung * (high - low));
            slots[slot + 8] = slots[slot].adjust_lightness(BRIGHT_OFFSET);
            continue;
        }
        let color = match extracted[slot] {
            Some(color) => color,
            None => match extracted[opposite_slot(slot)] {
                Some(opposite) => opposite.rotate_hue(180.0),
                None => {
                    let base = primary.to_oklch();
                    Color::from_oklch(Oklch::new(
                        base.l,
                        base.chroma.max(MIN_SYNTH_CHROMA),
                        canonical,
                    ))
                }
            },
        };
        let l = color.to_oklch().l.clamp(low, high);
        let normal = color.with_lightness(l);
        slots[slot] = normal;
        slots[slot + 8] = normal.adjust_lightness(BRIGHT_OFFSET);
    }

    enforce_accent_contrast(&mut slots, background);
    (slots, paired)
}

/// red ↔ cyan, green ↔ magenta, yellow ↔ blue
fn opposite_slot(slot: usize) -> usize {
    7 - slot
}

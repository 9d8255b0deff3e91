use log::debug;

use crate::color::Color;
use crate::pipeline::Deadline;

use super::{ExtractError, Extractor, Method, Swatch};

/// Deterministic median-cut quantizer over sRGB channels.
pub struct MedianCut;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    fn of(self, color: &Color) -> u8 {
        match self {
            Channel::Red => color.r,
            Channel::Green => color.g,
            Channel::Blue => color.b,
        }
    }
}

/// Widest channel of a bucket and its range.
fn widest_channel(bucket: &[Color]) -> (Channel, u8) {
    [Channel::Red, Channel::Green, Channel::Blue]
        .into_iter()
        .map(|channel| {
            let (min, max) = bucket.iter().fold((u8::MAX, u8::MIN), |(lo, hi), c| {
                let v = channel.of(c);
                (lo.min(v), hi.max(v))
            });
            (channel, max.saturating_sub(min))
        })
        // max_by_key keeps the last maximum; reverse so red wins ties.
        .rev()
        .max_by_key(|&(_, range)| range)
        .unwrap_or((Channel::Red, 0))
}

fn mean_color(bucket: &[Color]) -> Color {
    let n = bucket.len().max(1) as u64;
    let (r, g, b) = bucket.iter().fold((0u64, 0u64, 0u64), |(r, g, b), c| {
        (r + c.r as u64, g + c.g as u64, b + c.b as u64)
    });
    let avg = |sum: u64| ((sum + n / 2) / n) as u8;
    Color::new(avg(r), avg(g), avg(b))
}

impl Extractor for MedianCut {
    fn method(&self) -> Method {
        Method::MedianCut
    }

    fn cluster(
        &self,
        samples: &[Color],
        k: usize,
        deadline: Deadline,
    ) -> Result<Vec<Swatch>, ExtractError> {
        let mut buckets: Vec<Vec<Color>> = vec![samples.to_vec()];

        while buckets.len() < k {
            if deadline.expired() {
                debug!(
                    "median_cut: deadline hit with {} of {k} buckets",
                    buckets.len()
                );
                break;
            }

            // Split the bucket with the widest channel range; first one wins ties.
            let Some((index, channel)) = buckets
                .iter()
                .enumerate()
                .map(|(i, bucket)| (i, widest_channel(bucket)))
                .filter(|(_, (_, range))| *range > 0)
                .fold(None, |best: Option<(usize, Channel, u8)>, (i, (channel, range))| {
                    match best {
                        Some((_, _, best_range)) if best_range >= range => best,
                        _ => Some((i, channel, range)),
                    }
                })
                .map(|(i, channel, _)| (i, channel))
            else {
                break;
            };

            let mut bucket = buckets.swap_remove(index);
            bucket.sort_unstable_by_key(|c| (channel.of(c), *c));
            let upper = bucket.split_off(bucket.len() / 2);
            buckets.insert(index, upper);
            buckets.insert(index, bucket);
        }

        let total = samples.len() as f32;
        Ok(buckets
            .iter()
            .map(|bucket| Swatch {
                color: mean_color(bucket),
                weight: bucket.len() as f32 / total,
            })
            .collect())
    }
}

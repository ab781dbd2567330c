use super::ColorMap;

/// Entries in every continuous ramp.
pub const RAMP_LEN: usize = 256;

type Rgb = [f32; 3];

const DEFAULT_STOPS: &[Rgb] = &[
    [0.267, 0.005, 0.329],
    [0.283, 0.141, 0.458],
    [0.254, 0.265, 0.530],
    [0.207, 0.372, 0.553],
    [0.164, 0.471, 0.558],
    [0.128, 0.567, 0.551],
    [0.135, 0.659, 0.518],
    [0.267, 0.749, 0.441],
    [0.478, 0.821, 0.318],
    [0.741, 0.873, 0.150],
    [0.993, 0.906, 0.144],
];

const RED_STOPS: &[Rgb] = &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.8, 0.8]];

const MOOD_STOPS: &[Rgb] = &[[0.2, 0.1, 0.5], [0.9, 0.3, 0.5], [1.0, 0.85, 0.4]];

const HEAT_STOPS: &[Rgb] = &[
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [1.0, 1.0, 1.0],
];

const BLUE_STOPS: &[Rgb] = &[[0.0, 0.0, 0.0], [0.0, 0.3, 0.8], [0.8, 0.9, 1.0]];

/// Categorical palette; not interpolated.
const COLORS: &[Rgb] = &[
    [0.122, 0.467, 0.706],
    [1.000, 0.498, 0.055],
    [0.173, 0.627, 0.173],
    [0.839, 0.153, 0.157],
    [0.580, 0.404, 0.741],
    [0.549, 0.337, 0.294],
    [0.890, 0.467, 0.761],
    [0.498, 0.498, 0.498],
    [0.737, 0.741, 0.133],
    [0.090, 0.745, 0.812],
];

/// RGBA entries of `map`, opaque.
pub fn ramp(map: ColorMap) -> Vec<[f32; 4]> {
    match map {
        ColorMap::Default => interpolate(DEFAULT_STOPS),
        ColorMap::Spectrum => (0..RAMP_LEN)
            .map(|i| {
                // red → violet, stopping short of wrapping back to red
                let h = 0.8 * i as f32 / (RAMP_LEN - 1) as f32;
                opaque(hsv_to_rgb(h, 1.0, 1.0))
            })
            .collect(),
        ColorMap::Colors => COLORS.iter().copied().map(opaque).collect(),
        ColorMap::Red => interpolate(RED_STOPS),
        ColorMap::Mood => interpolate(MOOD_STOPS),
        ColorMap::Heat => interpolate(HEAT_STOPS),
        ColorMap::Blue => interpolate(BLUE_STOPS),
    }
}

fn opaque([r, g, b]: Rgb) -> [f32; 4] {
    [r, g, b, 1.0]
}

fn interpolate(stops: &[Rgb]) -> Vec<[f32; 4]> {
    let segments = (stops.len() - 1) as f32;
    (0..RAMP_LEN)
        .map(|i| {
            let t = i as f32 / (RAMP_LEN - 1) as f32 * segments;
            let k = (t.floor() as usize).min(stops.len() - 2);
            let f = t - k as f32;
            let (a, b) = (stops[k], stops[k + 1]);
            opaque([
                a[0] + (b[0] - a[0]) * f,
                a[1] + (b[1] - a[1]) * f,
                a[2] + (b[2] - a[2]) * f,
            ])
        })
        .collect()
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let h6 = (h.fract() * 6.0).max(0.0);
    let sector = h6.floor() as u32 % 6;
    let f = h6 - h6.floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuous_ramps_span_their_stops() {
        let heat = ramp(ColorMap::Heat);
        assert_eq!(heat.len(), RAMP_LEN);
        assert_eq!(heat[0], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(heat[RAMP_LEN - 1], [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn all_entries_are_in_range() {
        for map in ColorMap::ALL {
            for entry in ramp(map) {
                assert!(entry.iter().all(|c| (0.0..=1.0).contains(c)), "{map:?}: {entry:?}");
            }
        }
    }

    #[test]
    fn colors_is_categorical() {
        assert_eq!(ramp(ColorMap::Colors).len(), COLORS.len());
    }

    #[test]
    fn spectrum_starts_red() {
        assert_eq!(ramp(ColorMap::Spectrum)[0], [1.0, 0.0, 0.0, 1.0]);
    }
}
